use crate::areas::repository::Repository;
use crate::areas::workspace::Workspace;
use crate::errors::Precondition;

impl Repository {
    pub async fn add(&mut self, file_name: &str) -> crate::errors::Result<()> {
        let branch = self.current_branch()?;
        let file_name = &Workspace::file_name_of(file_name).ok_or(Precondition::MissingWorkingFile)?;

        if !self.workspace().exists(file_name) {
            return Err(Precondition::MissingWorkingFile.into());
        }

        let index = self.index();
        let mut index = index.lock().await;
        self.rehydrate_stage(&mut index, branch.name())?;

        let blob = self.workspace().parse_blob(file_name)?;
        let oid = self.database().store_blob(&blob)?;
        index.stage_mut().add(file_name, oid);

        index.write_updates()?;

        Ok(())
    }
}
