use crate::areas::workspace::Workspace;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::index::stage::Stage;
use crate::artifacts::status::file_change::WorkspaceChange;
use colored::Colorize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

// Terminology:
// - staged files: staged for addition and unchanged on disk since
// - removed files: staged for removal
// - changed files: known to the stage but deleted or edited without staging
// - untracked files: on disk but neither tracked nor staged for addition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusInfo {
    pub staged: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    pub changed: BTreeMap<String, WorkspaceChange>,
    pub untracked: BTreeSet<String>,
}

impl StatusInfo {
    pub fn inspect(stage: &Stage, workspace: &Workspace) -> anyhow::Result<Self> {
        let mut status = StatusInfo {
            removed: stage.removed().keys().cloned().collect(),
            ..Default::default()
        };

        for (file_name, oid) in stage.added() {
            match workspace.hash_file(file_name)? {
                Some(current) if &current == oid => {
                    status.staged.insert(file_name.clone());
                }
                Some(_) => status.record(file_name, WorkspaceChange::Modified),
                None => status.record(file_name, WorkspaceChange::Deleted),
            }
        }

        for (file_name, oid) in stage.tracked() {
            if stage.added().contains_key(file_name) || stage.removed().contains_key(file_name) {
                continue;
            }

            match workspace.hash_file(file_name)? {
                Some(current) if &current == oid => {}
                Some(_) => status.record(file_name, WorkspaceChange::Modified),
                None => status.record(file_name, WorkspaceChange::Deleted),
            }
        }

        status.untracked = workspace
            .list_files()?
            .into_iter()
            .filter(|file_name| !stage.is_known(file_name))
            .collect();

        Ok(status)
    }

    fn record(&mut self, file_name: &str, change: WorkspaceChange) {
        self.changed.insert(file_name.to_string(), change);
    }

    /// Files with the given kind of unstaged change, in name order
    pub fn changes_of(&self, kind: WorkspaceChange) -> impl Iterator<Item = &str> {
        self.changed
            .iter()
            .filter(move |(_, change)| **change == kind)
            .map(|(file_name, _)| file_name.as_str())
    }

    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.removed.is_empty()
            && self.changed.is_empty()
            && self.untracked.is_empty()
    }

    /// Render the status report; every section ends with a blank line
    pub fn write_report(
        &self,
        writer: &mut dyn Write,
        branches: &[BranchName],
        current: &BranchName,
    ) -> anyhow::Result<()> {
        writeln!(writer, "=== Branches ===")?;
        for branch in branches {
            if branch == current {
                writeln!(writer, "{}{}", "*".green(), branch)?;
            } else {
                writeln!(writer, "{branch}")?;
            }
        }
        writeln!(writer)?;

        writeln!(writer, "=== Staged Files ===")?;
        for file_name in &self.staged {
            writeln!(writer, "{}", file_name.green())?;
        }
        writeln!(writer)?;

        writeln!(writer, "=== Removed Files ===")?;
        for file_name in &self.removed {
            writeln!(writer, "{}", file_name.green())?;
        }
        writeln!(writer)?;

        writeln!(writer, "=== Modifications Not Staged For Commit ===")?;
        for kind in [WorkspaceChange::Deleted, WorkspaceChange::Modified] {
            for file_name in self.changes_of(kind) {
                writeln!(writer, "{file_name} {kind}")?;
            }
        }
        writeln!(writer)?;

        writeln!(writer, "=== Untracked Files ===")?;
        for file_name in &self.untracked {
            writeln!(writer, "{}", file_name.red())?;
        }
        writeln!(writer)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::object_id::ObjectId;
    use assert_fs::TempDir;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    struct Fixture {
        _dir: TempDir,
        workspace: Workspace,
        stage: Stage,
    }

    impl Fixture {
        fn oid_of(&self, file_name: &str) -> ObjectId {
            self.workspace.hash_file(file_name).unwrap().unwrap()
        }

        /// Track `file_name` as if it had been committed with `content`
        fn commit_file(&mut self, file_name: &str, content: &str) {
            self.workspace.write_file(file_name, content.as_bytes()).unwrap();
            let oid = self.oid_of(file_name);
            self.stage.add(file_name, oid);
            self.stage.apply_commit();
        }
    }

    #[fixture]
    fn fixture() -> Fixture {
        colored::control::set_override(false);
        let dir = TempDir::new().expect("Failed to create temp dir");
        Fixture {
            workspace: Workspace::new(dir.path().into()),
            stage: Stage::new(BranchName::default_branch()),
            _dir: dir,
        }
    }

    #[rstest]
    fn a_committed_and_untouched_file_is_clean(mut fixture: Fixture) {
        fixture.commit_file("a.txt", "a");

        let status = StatusInfo::inspect(&fixture.stage, &fixture.workspace).unwrap();

        assert!(status.is_clean());
    }

    #[rstest]
    fn classifies_every_kind_of_change(mut fixture: Fixture) {
        fixture.commit_file("edited.txt", "v1");
        fixture.commit_file("gone.txt", "gone");
        fixture.commit_file("removed.txt", "removed");
        fixture.workspace.write_file("edited.txt", b"v2").unwrap();
        fixture.workspace.remove_file("gone.txt").unwrap();
        fixture.stage.unstage("removed.txt").unwrap();
        fixture.workspace.remove_file("removed.txt").unwrap();

        fixture.workspace.write_file("new.txt", b"new").unwrap();
        let oid = fixture.oid_of("new.txt");
        fixture.stage.add("new.txt", oid);
        fixture.workspace.write_file("later.txt", b"first").unwrap();
        let oid = fixture.oid_of("later.txt");
        fixture.stage.add("later.txt", oid);
        fixture.workspace.write_file("later.txt", b"second").unwrap();
        fixture.workspace.write_file("stray.txt", b"stray").unwrap();

        let status = StatusInfo::inspect(&fixture.stage, &fixture.workspace).unwrap();

        assert_eq!(status.staged, BTreeSet::from(["new.txt".to_string()]));
        assert_eq!(status.removed, BTreeSet::from(["removed.txt".to_string()]));
        assert_eq!(
            status.changes_of(WorkspaceChange::Deleted).collect::<Vec<_>>(),
            vec!["gone.txt"]
        );
        assert_eq!(
            status.changes_of(WorkspaceChange::Modified).collect::<Vec<_>>(),
            vec!["edited.txt", "later.txt"]
        );
        assert_eq!(status.untracked, BTreeSet::from(["stray.txt".to_string()]));
    }

    #[rstest]
    fn report_lists_sections_in_order(mut fixture: Fixture) {
        fixture.commit_file("gone.txt", "gone");
        fixture.workspace.remove_file("gone.txt").unwrap();
        fixture
            .workspace
            .write_file("stray.txt", &Bytes::from("stray"))
            .unwrap();
        let status = StatusInfo::inspect(&fixture.stage, &fixture.workspace).unwrap();
        let other = BranchName::try_parse("other".to_string()).unwrap();

        let mut output = Vec::new();
        status
            .write_report(
                &mut output,
                &[BranchName::default_branch(), other],
                &BranchName::default_branch(),
            )
            .unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "=== Branches ===\n*master\nother\n\n\
             === Staged Files ===\n\n\
             === Removed Files ===\n\n\
             === Modifications Not Staged For Commit ===\ngone.txt (deleted)\n\n\
             === Untracked Files ===\nstray.txt\n\n"
        );
    }
}
