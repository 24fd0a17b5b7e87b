use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::index::stage::Stage;
use crate::artifacts::log::history::CommitHistory;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::remote::RemoteRoot;
use crate::artifacts::remote::replicator::Replicator;
use crate::errors::Precondition;
use anyhow::Context;

impl Repository {
    /// Copy the current branch's history into `branch` of `remote`
    ///
    /// The remote branch must not have moved past what was last fetched: its
    /// head has to be part of the local history.
    pub async fn push(&mut self, remote: &str, branch: &str) -> crate::errors::Result<()> {
        let current = self.current_branch()?;

        let config = self.config()?;
        let remote = config.find_remote(remote)?;
        let root = RemoteRoot::open(&remote.root(self.path()))?;

        let branch_name = BranchName::try_parse(branch.to_string())?;
        let tracking = BranchName::remote_tracking(remote.name(), &branch_name)?;
        if !self.refs().exists(&tracking) {
            return Err(Precondition::PushWithoutPull.into());
        }

        if let Some(remote_branch) = root.refs().load(&branch_name)? {
            let history =
                CommitHistory::collect(current.head(), |oid: &ObjectId| self.parents_of(oid))?;
            if !history.contains(remote_branch.head()) {
                return Err(Precondition::PushWithoutPull.into());
            }
        }

        Replicator::new(self.database(), root.database()).replicate_history(current.head())?;

        let commit = self.load_commit(current.head())?;
        for blob_id in commit.files().values() {
            let blob = root
                .database()
                .load_blob(blob_id)?
                .with_context(|| format!("Missing blob {blob_id} in remote"))?;
            root.workspace().write_file(blob.file_name(), blob.content())?;
        }
        for file_name in commit.removed().keys() {
            root.workspace().remove_file(file_name)?;
        }

        root.index()
            .save_stage(&Stage::from_commit(branch_name.clone(), &commit))?;
        root.refs().set_head(&branch_name, current.head().clone())?;
        self.refs().set_head(&tracking, current.head().clone())?;

        Ok(())
    }
}
