use crate::areas::repository::Repository;
use crate::artifacts::branch::Branch;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::conflict;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::merge::resolve::Resolver;
use crate::artifacts::merge::split_point::SplitPointFinder;
use crate::artifacts::merge::three_way::plan_file_merge;
use crate::artifacts::objects::commit::{Commit, FileMap};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{MergeAdvisory, NotFound, Precondition};
use std::io::Write;

impl Repository {
    /// Merge the head of `given` into the current branch
    pub async fn merge(&mut self, given: &str) -> crate::errors::Result<()> {
        let current = self.current_branch()?;
        let given = self.check_merge_preconditions(&current, given).await?;

        let strategy = self.config()?.merge.split_point;
        let split_point = SplitPointFinder::new(strategy, |oid: &ObjectId| self.parents_of(oid))
            .find(current.head(), given.head())?;

        let Some(split_point) = split_point else {
            return Ok(());
        };

        if &split_point == given.head() {
            return Err(MergeAdvisory::GivenIsAncestor.into());
        }

        if &split_point == current.head() {
            self.checkout_branch(given.name().as_ref()).await?;
            return Err(MergeAdvisory::FastForwarded.into());
        }

        let split_files = self.load_commit(&split_point)?.files();
        let current_files = self.load_commit(current.head())?.files();
        let given_files = self.load_commit(given.head())?.files();

        self.merge_files(&current, &given, &split_files, &current_files, &given_files)
            .await
    }

    /// Nothing is changed until every check has passed
    async fn check_merge_preconditions(
        &self,
        current: &Branch,
        given: &str,
    ) -> crate::errors::Result<Branch> {
        let index = self.index();
        let mut index = index.lock().await;
        self.rehydrate_stage(&mut index, current.name())?;

        if index.stage().is_changed() {
            return Err(Precondition::UncommittedChanges.into());
        }

        let given_name =
            BranchName::try_parse(given.to_string()).map_err(|_| NotFound::Branch)?;
        let given = self.refs().load(&given_name)?.ok_or(NotFound::Branch)?;

        if given.name() == current.name() {
            return Err(Precondition::MergingWithItself.into());
        }

        let given_files = self.load_commit(given.head())?.files();
        conflict::ensure_nothing_in_the_way(
            index.stage(),
            &self.workspace().list_files()?,
            Some(&given_files),
        )?;

        Ok(given)
    }

    async fn merge_files(
        &self,
        current: &Branch,
        given: &Branch,
        split_files: &FileMap,
        current_files: &FileMap,
        given_files: &FileMap,
    ) -> crate::errors::Result<()> {
        let plan = plan_file_merge(split_files, current_files, given_files);

        let index = self.index();
        let mut index = index.lock().await;
        self.rehydrate_stage(&mut index, current.name())?;
        index
            .stage_mut()
            .set_merged_branch_name(Some(given.name().clone()));

        let conflicts = {
            let mut migration =
                Migration::new(self.database(), self.workspace(), index.stage_mut());
            Resolver::new(&mut migration).execute(plan)?
        };

        let commit = Commit::merge(index.stage(), current.head().clone(), given.head().clone());
        if !conflicts.is_empty() {
            writeln!(self.writer(), "Encountered a merge conflict.")?;
        }

        let commit_id = self.database().store_commit(&commit)?;
        index.stage_mut().apply_commit();
        index.write_updates()?;
        self.refs().set_head(current.name(), commit_id)?;

        Ok(())
    }
}
