//! Applying a planned file merge to the working directory and stage

use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::index::stage::ConflictEntry;
use crate::artifacts::merge::three_way::{FileMergeAction, conflict_content};
use crate::artifacts::objects::object_id::ObjectId;
use bytes::Bytes;
use std::collections::BTreeMap;

pub struct Resolver<'m, 'r> {
    migration: &'m mut Migration<'r>,
}

impl<'m, 'r> Resolver<'m, 'r> {
    pub fn new(migration: &'m mut Migration<'r>) -> Self {
        Self { migration }
    }

    /// Carry out every action; returns the names of the conflicted files
    pub fn execute(
        &mut self,
        plan: BTreeMap<String, FileMergeAction>,
    ) -> crate::errors::Result<Vec<String>> {
        let mut conflicts = Vec::new();

        for (file_name, action) in plan {
            match action {
                FileMergeAction::TakeGiven(oid) => {
                    self.migration.checkout_blob(&oid)?;
                    self.migration.stage_mut().add(&file_name, oid);
                }
                FileMergeAction::Remove => self.migration.unstage(&file_name)?,
                FileMergeAction::Conflict { ours, theirs } => {
                    self.record_conflict(&file_name, ours, theirs)?;
                    conflicts.push(file_name);
                }
            }
        }

        Ok(conflicts)
    }

    fn record_conflict(
        &mut self,
        file_name: &str,
        ours: Option<ObjectId>,
        theirs: Option<ObjectId>,
    ) -> anyhow::Result<()> {
        let ours_content = self.content_of(ours.as_ref())?;
        let theirs_content = self.content_of(theirs.as_ref())?;
        let content = conflict_content(&ours_content, &theirs_content);

        let merged = self
            .migration
            .stage_content(file_name, Bytes::from(content))?;
        self.migration
            .stage_mut()
            .add_conflict(file_name, ConflictEntry::new(merged, ours, theirs));

        Ok(())
    }

    fn content_of(&self, oid: Option<&ObjectId>) -> anyhow::Result<Bytes> {
        match oid {
            Some(oid) => Ok(self.migration.load_blob(oid)?.content().clone()),
            None => Ok(Bytes::new()),
        }
    }
}
