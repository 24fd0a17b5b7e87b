use crate::areas::repository::Repository;

impl Repository {
    /// Fetch `branch` of `remote` and merge it into the current branch
    pub async fn pull(&mut self, remote: &str, branch: &str) -> crate::errors::Result<()> {
        self.ensure_initialized()?;

        let tracking = self.fetch_branch(remote, branch).await?;
        self.merge(tracking.as_ref()).await
    }
}
