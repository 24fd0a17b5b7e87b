//! Branch registry
//!
//! Maps branch names to their head commits and remembers which branch is
//! checked out.
//!
//! ## Keys
//!
//! - `HEAD`: logical name of the current branch
//! - `FETCH_HEAD`: logical name of the last fetched remote-tracking branch
//! - `heads/<flattened name>`: head commit and logical name of each branch

use crate::areas::storage::Storage;
use crate::artifacts::branch::Branch;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Precondition;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::sync::Arc;

pub const HEAD_REF_NAME: &str = "HEAD";
pub const FETCH_HEAD_REF_NAME: &str = "FETCH_HEAD";
const HEADS_NAMESPACE: &str = "heads";

#[derive(Debug, Clone, new)]
pub struct Refs {
    storage: Arc<dyn Storage>,
}

impl Refs {
    fn branch_key(name: &BranchName) -> String {
        format!("{HEADS_NAMESPACE}/{}", name.to_key())
    }

    pub fn exists(&self, name: &BranchName) -> bool {
        self.storage.exists(&Self::branch_key(name))
    }

    /// Create a branch pointing at `head`; fails when the name is taken
    pub fn create_branch(&self, name: BranchName, head: ObjectId) -> crate::errors::Result<Branch> {
        if self.exists(&name) {
            return Err(Precondition::BranchAlreadyExists.into());
        }

        let branch = Branch::new(name, head);
        self.save(&branch)?;
        Ok(branch)
    }

    /// Point `name` at `head`, creating the branch when needed
    pub fn set_head(&self, name: &BranchName, head: ObjectId) -> anyhow::Result<Branch> {
        let branch = Branch::new(name.clone(), head);
        self.save(&branch)?;
        Ok(branch)
    }

    fn save(&self, branch: &Branch) -> anyhow::Result<()> {
        self.storage
            .put(&Self::branch_key(branch.name()), branch.serialize()?)
            .with_context(|| format!("failed to update branch {}", branch.name()))
    }

    pub fn load(&self, name: &BranchName) -> anyhow::Result<Option<Branch>> {
        match self.storage.get(&Self::branch_key(name))? {
            Some(content) => Ok(Some(Branch::deserialize(std::io::Cursor::new(content))?)),
            None => Ok(None),
        }
    }

    pub fn remove(&self, name: &BranchName) -> anyhow::Result<bool> {
        self.storage.remove(&Self::branch_key(name))
    }

    /// All branches, sorted by their flattened on-disk name
    pub fn list_branches(&self) -> anyhow::Result<Vec<Branch>> {
        self.storage
            .list_keys(HEADS_NAMESPACE)?
            .into_iter()
            .map(|key| {
                let content = self
                    .storage
                    .get(&format!("{HEADS_NAMESPACE}/{key}"))?
                    .with_context(|| format!("branch {key} vanished while listing"))?;
                Branch::deserialize(std::io::Cursor::new(content))
            })
            .collect()
    }

    pub fn current_branch_name(&self) -> anyhow::Result<Option<BranchName>> {
        self.read_name(HEAD_REF_NAME)
    }

    pub fn set_current(&self, name: &BranchName) -> anyhow::Result<()> {
        self.storage
            .put(HEAD_REF_NAME, Bytes::from(name.to_string()))
    }

    /// The checked-out branch; `None` before `init`
    pub fn load_current(&self) -> anyhow::Result<Option<Branch>> {
        match self.current_branch_name()? {
            Some(name) => Ok(Some(self.load(&name)?.with_context(|| {
                format!("HEAD points at missing branch {name}")
            })?)),
            None => Ok(None),
        }
    }

    pub fn is_current(&self, name: &BranchName) -> anyhow::Result<bool> {
        Ok(self.current_branch_name()?.as_ref() == Some(name))
    }

    pub fn set_fetch_head(&self, name: &BranchName) -> anyhow::Result<()> {
        self.storage
            .put(FETCH_HEAD_REF_NAME, Bytes::from(name.to_string()))
    }

    pub fn read_fetch_head(&self) -> anyhow::Result<Option<BranchName>> {
        self.read_name(FETCH_HEAD_REF_NAME)
    }

    fn read_name(&self, key: &str) -> anyhow::Result<Option<BranchName>> {
        match self.storage.get(key)? {
            Some(content) => {
                let name = String::from_utf8(content.to_vec())
                    .with_context(|| format!("{key} is not valid UTF-8"))?;
                Ok(Some(BranchName::try_parse(name.trim().to_string())?))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::storage::MemoryStorage;
    use rstest::{fixture, rstest};

    #[fixture]
    fn refs() -> Refs {
        Refs::new(Arc::new(MemoryStorage::new()))
    }

    fn oid(seed: &str) -> ObjectId {
        ObjectId::digest(seed.as_bytes()).unwrap()
    }

    fn name(name: &str) -> BranchName {
        BranchName::try_parse(name.to_string()).unwrap()
    }

    #[rstest]
    fn create_branch_rejects_duplicates(refs: Refs) {
        refs.create_branch(name("feature"), oid("a")).unwrap();

        let duplicate = refs.create_branch(name("feature"), oid("b"));
        assert!(matches!(
            duplicate,
            Err(crate::errors::RepositoryError::Precondition(
                Precondition::BranchAlreadyExists
            ))
        ));
        pretty_assertions::assert_eq!(
            refs.load(&name("feature")).unwrap().map(|b| b.head().clone()),
            Some(oid("a"))
        );
    }

    #[rstest]
    fn remote_tracking_branches_keep_their_logical_name(refs: Refs) {
        let tracking = BranchName::remote_tracking("origin", &name("master")).unwrap();
        refs.set_head(&tracking, oid("remote")).unwrap();
        refs.set_head(&name("master"), oid("local")).unwrap();

        let names = refs
            .list_branches()
            .unwrap()
            .into_iter()
            .map(|branch| branch.name().to_string())
            .collect::<Vec<_>>();
        pretty_assertions::assert_eq!(names, vec!["master", "origin/master"]);
    }

    #[rstest]
    fn head_and_fetch_head_store_branch_names(refs: Refs) {
        assert!(refs.load_current().unwrap().is_none());

        refs.set_head(&name("master"), oid("a")).unwrap();
        refs.set_current(&name("master")).unwrap();
        refs.set_fetch_head(&name("origin/master")).unwrap();

        pretty_assertions::assert_eq!(
            refs.load_current().unwrap(),
            Some(Branch::new(name("master"), oid("a")))
        );
        assert!(refs.is_current(&name("master")).unwrap());
        pretty_assertions::assert_eq!(
            refs.read_fetch_head().unwrap(),
            Some(name("origin/master"))
        );
    }

    #[rstest]
    fn removing_a_branch_forgets_it(refs: Refs) {
        refs.set_head(&name("topic"), oid("a")).unwrap();

        assert!(refs.remove(&name("topic")).unwrap());
        assert!(!refs.exists(&name("topic")));
        assert!(refs.load(&name("topic")).unwrap().is_none());
    }
}
