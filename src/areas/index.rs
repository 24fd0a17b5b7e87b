//! Staging areas of all branches
//!
//! Each branch owns one stage persisted under `stage/<flattened branch name>`
//! in the binary format described in [`crate::artifacts::index`]. The index
//! keeps the stage of the branch being worked on in memory and writes it back
//! when it changed.

use crate::areas::storage::Storage;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::index::stage::Stage;
use crate::artifacts::objects::object::{Packable, Unpackable};
use anyhow::Context;
use std::sync::Arc;

const STAGE_NAMESPACE: &str = "stage";

#[derive(Debug)]
pub struct Index {
    storage: Arc<dyn Storage>,
    /// Stage of the branch loaded by the last `rehydrate`
    stage: Stage,
    /// Flag indicating if the stage has been modified since loading
    changed: bool,
}

impl Index {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Index {
            storage,
            stage: Stage::new(BranchName::default_branch()),
            changed: false,
        }
    }

    fn stage_key(branch_name: &BranchName) -> String {
        format!("{STAGE_NAMESPACE}/{}", branch_name.to_key())
    }

    /// Load the stage of `branch_name`
    ///
    /// Returns false when the branch has no stage yet; the loaded stage is
    /// then empty.
    pub fn rehydrate(&mut self, branch_name: &BranchName) -> anyhow::Result<bool> {
        self.changed = false;

        match self.load_stage(branch_name)? {
            Some(stage) => {
                self.stage = stage;
                Ok(true)
            }
            None => {
                self.stage = Stage::new(branch_name.clone());
                Ok(false)
            }
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        self.changed = true;
        &mut self.stage
    }

    pub fn replace(&mut self, stage: Stage) {
        self.stage = stage;
        self.changed = true;
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        if !self.changed {
            return Ok(());
        }

        self.save_stage(&self.stage)?;
        self.changed = false;

        Ok(())
    }

    /// Persist a stage under its own branch name
    pub fn save_stage(&self, stage: &Stage) -> anyhow::Result<()> {
        self.storage
            .put(&Self::stage_key(stage.branch_name()), stage.serialize()?)
            .with_context(|| format!("Unable to write stage of {}", stage.branch_name()))
    }

    pub fn load_stage(&self, branch_name: &BranchName) -> anyhow::Result<Option<Stage>> {
        match self.storage.get(&Self::stage_key(branch_name))? {
            Some(content) => Ok(Some(
                Stage::deserialize(std::io::Cursor::new(content))
                    .with_context(|| format!("Unable to read stage of {branch_name}"))?,
            )),
            None => Ok(None),
        }
    }

    pub fn exists(&self, branch_name: &BranchName) -> bool {
        self.storage.exists(&Self::stage_key(branch_name))
    }

    pub fn remove(&self, branch_name: &BranchName) -> anyhow::Result<bool> {
        self.storage.remove(&Self::stage_key(branch_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::storage::MemoryStorage;
    use crate::artifacts::objects::object_id::ObjectId;

    #[test]
    fn only_changed_stages_are_written_back() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let mut index = Index::new(storage.clone());
        let master = BranchName::default_branch();

        assert!(!index.rehydrate(&master).unwrap());
        index.write_updates().unwrap();
        assert!(!index.exists(&master));

        index
            .stage_mut()
            .add("a.txt", ObjectId::digest(b"a").unwrap());
        index.write_updates().unwrap();
        assert!(!index.is_changed());

        let mut reloaded = Index::new(storage);
        assert!(reloaded.rehydrate(&master).unwrap());
        pretty_assertions::assert_eq!(reloaded.stage(), index.stage());
    }

    #[test]
    fn stages_are_kept_per_branch() {
        let mut index = Index::new(Arc::new(MemoryStorage::new()));
        let topic = BranchName::try_parse("origin/topic".to_string()).unwrap();

        let mut stage = Stage::new(topic.clone());
        stage.add("t.txt", ObjectId::digest(b"t").unwrap());
        index.save_stage(&stage).unwrap();

        assert!(!index.rehydrate(&BranchName::default_branch()).unwrap());
        assert!(index.stage().added().is_empty());
        pretty_assertions::assert_eq!(index.load_stage(&topic).unwrap(), Some(stage));

        assert!(index.remove(&topic).unwrap());
        assert!(!index.exists(&topic));
    }
}
