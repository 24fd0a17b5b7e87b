//! Working directory migrations
//!
//! A migration rewrites working files from stored blobs and keeps the stage
//! of the checked-out branch in step with what it wrote.
//!
//! ## Operations
//!
//! - `checkout_blob`: restore one file; it is no longer staged
//! - `checkout_commit`: switch the whole working directory to a commit, after
//!   making sure no untracked file is in the way
//! - `reset`: the same switch without the safety check
//! - `stage_content` / `unstage`: record merge results

use crate::areas::database::Database;
use crate::areas::workspace::Workspace;
use crate::artifacts::checkout::conflict;
use crate::artifacts::index::stage::Stage;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use bytes::Bytes;

pub struct Migration<'r> {
    database: &'r Database,
    workspace: &'r Workspace,
    stage: &'r mut Stage,
}

impl<'r> Migration<'r> {
    pub fn new(database: &'r Database, workspace: &'r Workspace, stage: &'r mut Stage) -> Self {
        Self {
            database,
            workspace,
            stage,
        }
    }

    pub fn stage(&self) -> &Stage {
        &*self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut *self.stage
    }

    pub fn load_blob(&self, oid: &ObjectId) -> anyhow::Result<Blob> {
        self.database
            .load_blob(oid)?
            .with_context(|| format!("Missing blob {oid}"))
    }

    /// Write the blob to its working file and drop the file from the stage
    pub fn checkout_blob(&mut self, oid: &ObjectId) -> anyhow::Result<()> {
        let blob = self.load_blob(oid)?;

        self.workspace.write_file(blob.file_name(), blob.content())?;
        self.stage.record_checkout(blob.file_name());

        Ok(())
    }

    pub fn checkout_commit(&mut self, commit: &Commit) -> crate::errors::Result<()> {
        let working_files = self.workspace.list_files()?;
        conflict::ensure_nothing_in_the_way(&*self.stage, &working_files, None)?;

        Ok(self.reset(commit)?)
    }

    /// Make the working directory and the stage match `commit`
    pub fn reset(&mut self, commit: &Commit) -> anyhow::Result<()> {
        let files = commit.files();

        for file_name in self.workspace.list_files()? {
            if !files.contains_key(&file_name) {
                self.workspace.remove_file(&file_name)?;
            }
        }

        for oid in files.values() {
            let blob = self.load_blob(oid)?;
            self.workspace.write_file(blob.file_name(), blob.content())?;
        }

        self.stage.replace_with(commit);

        Ok(())
    }

    /// Write `content` as a working file, store it and stage it for addition
    pub fn stage_content(&mut self, file_name: &str, content: Bytes) -> anyhow::Result<ObjectId> {
        self.workspace.write_file(file_name, &content)?;

        let blob = Blob::new(file_name.to_string(), content);
        let oid = self.database.store_blob(&blob)?;
        self.stage.add(file_name, oid.clone());

        Ok(oid)
    }

    /// Stage `file_name` for removal, deleting its working copy when tracked
    pub fn unstage(&mut self, file_name: &str) -> crate::errors::Result<()> {
        if self.stage.unstage(file_name)? {
            self.workspace.remove_file(file_name)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::storage::MemoryStorage;
    use crate::artifacts::branch::branch_name::BranchName;
    use crate::artifacts::objects::object::Object;
    use crate::errors::RepositoryError;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    struct Fixture {
        _dir: TempDir,
        database: Database,
        workspace: Workspace,
    }

    #[fixture]
    fn fixture() -> Fixture {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let workspace = Workspace::new(dir.path().into());
        Fixture {
            database: Database::new(Arc::new(MemoryStorage::new())),
            workspace,
            _dir: dir,
        }
    }

    fn commit_files(fixture: &Fixture, files: &[(&str, &str)]) -> Commit {
        let mut stage = Stage::new(BranchName::default_branch());
        for (file_name, content) in files {
            let blob = Blob::new(file_name.to_string(), Bytes::from(content.to_string()));
            stage.add(file_name, fixture.database.store_blob(&blob).unwrap());
        }
        Commit::new(
            "snapshot".to_string(),
            &stage,
            Commit::initial().object_id().unwrap(),
        )
    }

    #[rstest]
    fn checkout_commit_reproduces_its_files(fixture: Fixture) {
        let commit = commit_files(&fixture, &[("a.txt", "a\n"), ("b.txt", "b\n")]);
        let mut stage = Stage::new(BranchName::default_branch());
        stage.add("old.txt", ObjectId::digest(b"old").unwrap());
        fixture.workspace.write_file("old.txt", b"old").unwrap();

        Migration::new(&fixture.database, &fixture.workspace, &mut stage)
            .checkout_commit(&commit)
            .unwrap();

        let hashes = fixture
            .workspace
            .list_files()
            .unwrap()
            .into_iter()
            .map(|name| {
                let oid = fixture.workspace.hash_file(&name).unwrap().unwrap();
                (name, oid)
            })
            .collect();
        pretty_assertions::assert_eq!(commit.files(), hashes);
        pretty_assertions::assert_eq!(stage.tracked(), &commit.files());
        assert!(!stage.is_changed());
    }

    #[rstest]
    fn checkout_commit_refuses_to_clobber_untracked_files(fixture: Fixture) {
        let commit = commit_files(&fixture, &[("a.txt", "a\n")]);
        let mut stage = Stage::new(BranchName::default_branch());
        fixture
            ._dir
            .child("stray.txt")
            .write_str("precious")
            .unwrap();

        let result = Migration::new(&fixture.database, &fixture.workspace, &mut stage)
            .checkout_commit(&commit);

        assert!(matches!(result, Err(RepositoryError::UntrackedFileInTheWay)));
        assert!(fixture.workspace.exists("stray.txt"));
        assert!(!fixture.workspace.exists("a.txt"));
    }

    #[rstest]
    fn checkout_blob_unstages_the_file(fixture: Fixture) {
        let commit = commit_files(&fixture, &[("a.txt", "committed\n")]);
        let mut stage = Stage::new(BranchName::default_branch());
        stage.add("a.txt", ObjectId::digest(b"draft").unwrap());

        let mut migration = Migration::new(&fixture.database, &fixture.workspace, &mut stage);
        migration
            .checkout_blob(commit.file_hash("a.txt").unwrap())
            .unwrap();

        assert!(!stage.is_changed());
        pretty_assertions::assert_eq!(
            fixture.workspace.read_file("a.txt").unwrap(),
            Bytes::from("committed\n")
        );
    }
}
