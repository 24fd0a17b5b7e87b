//! History replication between object databases
//!
//! Copies every commit reachable from a head, and every blob those commits
//! contain, from a source database into a target database. Objects already in
//! the target are skipped. Blobs go before the commit that names them and
//! ancestors before their descendants, so an interrupted copy leaves the
//! target with complete, if older, history.
//!
//! Build with `--features debug_sync` to trace the objects copied.

use crate::areas::database::Database;
use crate::artifacts::log::history::CommitHistory;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;

/// Macro for debug logging that is enabled with the debug_sync feature flag
macro_rules! sync_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug_sync")]
        {
            eprintln!($($arg)*);
        }
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplicationReport {
    pub commits: usize,
    pub blobs: usize,
}

#[derive(new)]
pub struct Replicator<'d> {
    source: &'d Database,
    target: &'d Database,
}

impl Replicator<'_> {
    pub fn replicate_history(&self, head: &ObjectId) -> anyhow::Result<ReplicationReport> {
        let history = CommitHistory::collect(head, |oid| {
            Ok(self
                .source
                .load_commit(oid)?
                .with_context(|| format!("Missing commit {oid}"))?
                .parents()
                .to_vec())
        })?;

        let mut report = ReplicationReport::default();

        for commit_id in history.commits().iter().rev() {
            let commit = self
                .source
                .load_commit(commit_id)?
                .with_context(|| format!("Missing commit {commit_id}"))?;

            for blob_id in commit.files().values() {
                if self.target.contains_blob(blob_id) {
                    continue;
                }

                let blob = self
                    .source
                    .load_blob(blob_id)?
                    .with_context(|| format!("Missing blob {blob_id}"))?;
                self.target.store_blob(&blob)?;
                report.blobs += 1;
                sync_log!("Copied blob {} ({})", blob_id.to_short_oid(), blob.file_name());
            }

            if !self.target.contains_commit(commit_id) {
                self.target.store_commit(&commit)?;
                report.commits += 1;
                sync_log!("Copied commit {}", commit_id.to_short_oid());
            }
        }

        sync_log!(
            "Replicated {} commits and {} blobs from {}",
            report.commits,
            report.blobs,
            head.to_short_oid()
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::storage::MemoryStorage;
    use crate::artifacts::branch::branch_name::BranchName;
    use crate::artifacts::index::stage::Stage;
    use crate::artifacts::objects::blob::Blob;
    use crate::artifacts::objects::commit::Commit;
    use crate::artifacts::objects::object::Object;
    use bytes::Bytes;
    use std::sync::Arc;

    fn database() -> Database {
        Database::new(Arc::new(MemoryStorage::new()))
    }

    /// initial <- first(a.txt) <- second(a.txt, b.txt)
    fn history(source: &Database) -> ObjectId {
        let initial = source.store_commit(&Commit::initial()).unwrap();
        let mut stage = Stage::new(BranchName::default_branch());

        let a = source
            .store_blob(&Blob::new("a.txt".into(), Bytes::from("a")))
            .unwrap();
        stage.add("a.txt", a);
        let first = source
            .store_commit(&Commit::new("first".into(), &stage, initial))
            .unwrap();
        stage.apply_commit();

        let b = source
            .store_blob(&Blob::new("b.txt".into(), Bytes::from("b")))
            .unwrap();
        stage.add("b.txt", b);
        source
            .store_commit(&Commit::new("second".into(), &stage, first))
            .unwrap()
    }

    #[test]
    fn copies_reachable_commits_and_their_blobs() {
        let source = database();
        let target = database();
        let head = history(&source);

        let report = Replicator::new(&source, &target)
            .replicate_history(&head)
            .unwrap();

        pretty_assertions::assert_eq!(report, ReplicationReport { commits: 3, blobs: 2 });
        let copied = target.load_commit(&head).unwrap().unwrap();
        pretty_assertions::assert_eq!(copied.object_id().unwrap(), head);
        assert!(copied.files().values().all(|oid| target.contains_blob(oid)));
    }

    #[test]
    fn second_replication_copies_nothing() {
        let source = database();
        let target = database();
        let head = history(&source);
        let replicator = Replicator::new(&source, &target);

        replicator.replicate_history(&head).unwrap();

        pretty_assertions::assert_eq!(
            replicator.replicate_history(&head).unwrap(),
            ReplicationReport::default()
        );
    }
}
