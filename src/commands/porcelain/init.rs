use crate::areas::config::Config;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::index::stage::Stage;
use crate::artifacts::objects::commit::Commit;
use crate::errors::Precondition;
use anyhow::Context;
use std::io::Write;

impl Repository {
    pub async fn init(&mut self) -> crate::errors::Result<()> {
        if self.is_initialized() {
            return Err(Precondition::AlreadyInitialized.into());
        }

        let initial_commit = self
            .database()
            .store_commit(&Commit::initial())
            .context("Failed to store the initial commit")?;

        let default_branch = BranchName::default_branch();
        self.refs()
            .create_branch(default_branch.clone(), initial_commit)?;

        let index = self.index();
        let mut index = index.lock().await;
        index.replace(Stage::new(default_branch.clone()));
        index.write_updates()?;

        Config::default().save(self.storage())?;

        // HEAD goes last: its presence marks the repository as initialized
        self.refs()
            .set_current(&default_branch)
            .context("Failed to create HEAD")?;

        writeln!(
            self.writer(),
            "Initialized empty Bitlet repository in {}",
            self.path().display()
        )?;

        Ok(())
    }
}
