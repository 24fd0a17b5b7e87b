use crate::areas::repository::Repository;
use crate::artifacts::checkout::migration::Migration;

impl Repository {
    /// Move the current branch to a commit and check out all of its files
    pub async fn reset(&mut self, commit: &str) -> crate::errors::Result<()> {
        let branch = self.current_branch()?;
        let commit_id = self.database().resolve_commit(commit)?;
        let commit = self.load_commit(&commit_id)?;

        let index = self.index();
        let mut index = index.lock().await;
        self.rehydrate_stage(&mut index, branch.name())?;

        Migration::new(self.database(), self.workspace(), index.stage_mut())
            .checkout_commit(&commit)?;
        index.write_updates()?;
        self.refs().set_head(branch.name(), commit_id)?;

        Ok(())
    }
}
