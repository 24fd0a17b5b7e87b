use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{NotFound, Precondition};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutTarget {
    /// Switch the working directory to another branch
    Branch(String),
    /// Restore one file from the current head commit
    File(String),
    /// Restore one file from a (possibly abbreviated) commit
    CommitFile { commit: String, file_name: String },
}

impl Repository {
    pub async fn checkout(&mut self, target: CheckoutTarget) -> crate::errors::Result<()> {
        match target {
            CheckoutTarget::Branch(name) => self.checkout_branch(&name).await,
            CheckoutTarget::File(file_name) => {
                let head = self.current_branch()?.head().clone();
                self.checkout_file(&head, &file_name).await
            }
            CheckoutTarget::CommitFile { commit, file_name } => {
                self.ensure_initialized()?;
                let commit_id = self.database().resolve_commit(&commit)?;
                self.checkout_file(&commit_id, &file_name).await
            }
        }
    }

    async fn checkout_file(
        &mut self,
        commit_id: &ObjectId,
        file_name: &str,
    ) -> crate::errors::Result<()> {
        let branch = self.current_branch()?;
        let commit = self.load_commit(commit_id)?;
        let blob_id = commit
            .file_hash(file_name)
            .ok_or(NotFound::FileInCommit)?;

        let index = self.index();
        let mut index = index.lock().await;
        self.rehydrate_stage(&mut index, branch.name())?;

        Migration::new(self.database(), self.workspace(), index.stage_mut())
            .checkout_blob(blob_id)?;
        index.write_updates()?;

        Ok(())
    }

    pub(crate) async fn checkout_branch(&mut self, name: &str) -> crate::errors::Result<()> {
        let current = self.current_branch()?;
        let name = BranchName::try_parse(name.to_string()).map_err(|_| NotFound::CheckoutBranch)?;

        let target = self
            .refs()
            .load(&name)?
            .ok_or(NotFound::CheckoutBranch)?;
        if target.name() == current.name() {
            return Err(Precondition::CheckingOutCurrentBranch.into());
        }

        let index = self.index();
        let mut index = index.lock().await;
        self.rehydrate_stage(&mut index, current.name())?;

        let commit = self.load_commit(target.head())?;
        Migration::new(self.database(), self.workspace(), index.stage_mut())
            .checkout_commit(&commit)?;
        index.stage_mut().set_branch_name(target.name().clone());
        index.write_updates()?;

        self.refs().set_current(target.name())?;

        Ok(())
    }
}
