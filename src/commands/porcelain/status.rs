use crate::areas::repository::Repository;
use crate::artifacts::status::status_info::StatusInfo;

impl Repository {
    pub async fn status(&mut self) -> crate::errors::Result<()> {
        let branch = self.current_branch()?;

        let index = self.index();
        let mut index = index.lock().await;
        self.rehydrate_stage(&mut index, branch.name())?;

        let status = StatusInfo::inspect(index.stage(), self.workspace())?;
        let branches = self
            .refs()
            .list_branches()?
            .into_iter()
            .map(|branch| branch.name().clone())
            .collect::<Vec<_>>();

        status.write_report(&mut **self.writer(), &branches, branch.name())?;
        index.write_updates()?;

        Ok(())
    }
}
