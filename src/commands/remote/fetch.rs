use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::remote::RemoteRoot;
use crate::artifacts::remote::replicator::Replicator;
use crate::errors::NotFound;

impl Repository {
    pub async fn fetch(&mut self, remote: &str, branch: &str) -> crate::errors::Result<()> {
        self.ensure_initialized()?;
        self.fetch_branch(remote, branch).await?;

        Ok(())
    }

    /// Copy `branch` of `remote` into the local `<remote>/<branch>`
    pub(crate) async fn fetch_branch(
        &self,
        remote: &str,
        branch: &str,
    ) -> crate::errors::Result<BranchName> {
        let config = self.config()?;
        let remote = config.find_remote(remote)?;
        let root = RemoteRoot::open(&remote.root(self.path()))?;

        let branch_name =
            BranchName::try_parse(branch.to_string()).map_err(|_| NotFound::RemoteBranch)?;
        let remote_branch = root
            .refs()
            .load(&branch_name)?
            .ok_or(NotFound::RemoteBranch)?;

        Replicator::new(root.database(), self.database())
            .replicate_history(remote_branch.head())?;

        let tracking = BranchName::remote_tracking(remote.name(), &branch_name)?;
        let index = self.index();
        let index = index.lock().await;
        // a stale stage would describe the previous head
        if !self.refs().is_current(&tracking)? {
            index.remove(&tracking)?;
        }
        self.refs().set_head(&tracking, remote_branch.head().clone())?;
        self.refs().set_fetch_head(&tracking)?;

        Ok(tracking)
    }
}
