use crate::areas::repository::Repository;
use crate::areas::workspace::Workspace;
use crate::errors::Precondition;

impl Repository {
    /// Unstage a file, or stage it for removal and delete it when tracked
    pub async fn rm(&mut self, file_name: &str) -> crate::errors::Result<()> {
        let branch = self.current_branch()?;
        let file_name = &Workspace::file_name_of(file_name).ok_or(Precondition::NoReasonToRemove)?;

        let index = self.index();
        let mut index = index.lock().await;
        self.rehydrate_stage(&mut index, branch.name())?;

        if index.stage_mut().unstage(file_name)? {
            self.workspace().remove_file(file_name)?;
        }

        index.write_updates()?;

        Ok(())
    }
}
