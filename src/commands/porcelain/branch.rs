use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::{NotFound, Precondition};

impl Repository {
    /// Create a branch at the current head; it starts with a copy of the current stage
    pub async fn branch(&mut self, branch_name: &str) -> crate::errors::Result<()> {
        let current = self.current_branch()?;
        let branch_name = BranchName::try_parse(branch_name.to_string())?;

        let index = self.index();
        let mut index = index.lock().await;
        self.rehydrate_stage(&mut index, current.name())?;

        self.refs()
            .create_branch(branch_name.clone(), current.head().clone())?;

        let mut stage = index.stage().clone();
        stage.set_branch_name(branch_name);
        index.save_stage(&stage)?;
        index.write_updates()?;

        Ok(())
    }

    pub async fn rm_branch(&mut self, branch_name: &str) -> crate::errors::Result<()> {
        let current = self.current_branch()?;
        let branch_name = BranchName::try_parse(branch_name.to_string()).map_err(|_| NotFound::Branch)?;

        if !self.refs().exists(&branch_name) {
            return Err(NotFound::Branch.into());
        }
        if &branch_name == current.name() {
            return Err(Precondition::RemovingCurrentBranch.into());
        }

        let index = self.index();
        let index = index.lock().await;
        self.refs().remove(&branch_name)?;
        index.remove(&branch_name)?;

        Ok(())
    }
}
