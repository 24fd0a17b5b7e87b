use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::errors::Precondition;
use std::io::Write;

impl Repository {
    pub async fn commit(&mut self, message: &str) -> crate::errors::Result<()> {
        let branch = self.current_branch()?;

        if message.is_empty() {
            return Err(Precondition::EmptyCommitMessage.into());
        }

        let index = self.index();
        let mut index = index.lock().await;
        self.rehydrate_stage(&mut index, branch.name())?;

        if !index.stage().is_changed() {
            return Err(Precondition::NothingStaged.into());
        }

        let commit = Commit::new(message.to_string(), index.stage(), branch.head().clone());
        let commit_id = self.database().store_commit(&commit)?;

        index.stage_mut().apply_commit();
        index.write_updates()?;
        self.refs().set_head(branch.name(), commit_id.clone())?;

        writeln!(
            self.writer(),
            "[{} {}] {}",
            branch.name(),
            commit_id.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
