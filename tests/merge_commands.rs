use crate::common::command::{
    bitlet_commit, commit_file, committed_repository_dir, head_commit_id, log_commit_ids,
    run_bitlet_command,
};
use crate::common::file::{FileSpec, read_file, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

/// Diverge master and other from "Add a and b":
///
///   master: ... <- "Add a and b" <- <master message>
///   other:  ... <- "Add a and b" <- <other message>
fn diverge(
    dir: &std::path::Path,
    master_change: (&str, &str),
    other_change: (&str, &str),
) {
    run_bitlet_command(dir, &["branch", "other"]).assert().success();
    commit_file(dir, master_change.0, master_change.1, "On master");
    run_bitlet_command(dir, &["checkout", "other"]).assert().success();
    commit_file(dir, other_change.0, other_change.1, "On other");
    run_bitlet_command(dir, &["checkout", "master"]).assert().success();
}

#[rstest]
fn merging_an_ancestor_changes_nothing(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    run_bitlet_command(dir, &["branch", "other"]).assert().success();
    commit_file(dir, "c.txt", "c\n", "Add c");
    let head = head_commit_id(dir);

    run_bitlet_command(dir, &["merge", "other"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Given branch is an ancestor of the current branch.",
        ));

    assert_eq!(head_commit_id(dir), head);
}

#[rstest]
fn merging_a_descendant_fast_forwards(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    run_bitlet_command(dir, &["branch", "other"]).assert().success();
    run_bitlet_command(dir, &["checkout", "other"]).assert().success();
    commit_file(dir, "c.txt", "c\n", "Add c");
    let other_head = head_commit_id(dir);
    run_bitlet_command(dir, &["checkout", "master"]).assert().success();
    let commits_before = log_commit_ids(dir).len();

    run_bitlet_command(dir, &["merge", "other"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current branch is fast-forwarded."));

    assert_eq!(read_file(&dir.join("c.txt")), "c\n");
    assert_eq!(head_commit_id(dir), other_head);
    assert_eq!(log_commit_ids(dir).len(), commits_before + 1);
    run_bitlet_command(dir, &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merge:").not());
}

#[rstest]
fn clean_merge_takes_changes_from_both_sides(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    diverge(dir, ("c.txt", "c\n"), ("a.txt", "a, from other\n"));

    run_bitlet_command(dir, &["merge", "other"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Encountered a merge conflict.").not());

    assert_eq!(read_file(&dir.join("a.txt")), "a, from other\n");
    assert_eq!(read_file(&dir.join("c.txt")), "c\n");
    run_bitlet_command(dir, &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merge: "))
        .stdout(predicate::str::contains("Merged other into master."));
}

#[rstest]
fn merge_applies_deletions_from_the_given_branch(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    run_bitlet_command(dir, &["branch", "other"]).assert().success();
    commit_file(dir, "c.txt", "c\n", "On master");
    run_bitlet_command(dir, &["checkout", "other"]).assert().success();
    run_bitlet_command(dir, &["rm", "b.txt"]).assert().success();
    bitlet_commit(dir, "Remove b").assert().success();
    run_bitlet_command(dir, &["checkout", "master"]).assert().success();

    run_bitlet_command(dir, &["merge", "other"])
        .assert()
        .success();

    assert!(!dir.join("b.txt").exists());
    assert!(dir.join("c.txt").exists());
}

#[rstest]
fn divergent_edits_conflict(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    diverge(dir, ("a.txt", "ours\n"), ("a.txt", "theirs\n"));
    let parents_before = log_commit_ids(dir).len();

    run_bitlet_command(dir, &["merge", "other"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Encountered a merge conflict."));

    assert_eq!(
        read_file(&dir.join("a.txt")),
        "<<<<<<< HEAD\nours\n=======\ntheirs\n>>>>>>>\n"
    );
    assert_eq!(log_commit_ids(dir).len(), parents_before + 1);
    run_bitlet_command(dir, &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merge: "))
        .stdout(predicate::str::contains("Merged other into master."));
}

#[rstest]
fn a_deleted_side_is_empty_in_the_conflict(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    run_bitlet_command(dir, &["branch", "other"]).assert().success();
    commit_file(dir, "a.txt", "ours\n", "Edit a");
    run_bitlet_command(dir, &["checkout", "other"]).assert().success();
    run_bitlet_command(dir, &["rm", "a.txt"]).assert().success();
    bitlet_commit(dir, "Remove a").assert().success();
    run_bitlet_command(dir, &["checkout", "master"]).assert().success();

    run_bitlet_command(dir, &["merge", "other"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Encountered a merge conflict."));

    assert_eq!(
        read_file(&dir.join("a.txt")),
        "<<<<<<< HEAD\nours\n=======\n>>>>>>>\n"
    );
}

#[rstest]
#[case("master", "Cannot merge a branch with itself.")]
#[case("nowhere", "A branch with that name does not exist.")]
fn merge_rejects_invalid_branches(
    committed_repository_dir: TempDir,
    #[case] branch: &str,
    #[case] message: &str,
) {
    run_bitlet_command(committed_repository_dir.path(), &["merge", branch])
        .assert()
        .failure()
        .stderr(predicate::str::contains(message));
}

#[rstest]
fn merge_requires_a_clean_stage(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    run_bitlet_command(dir, &["branch", "other"]).assert().success();
    write_file(FileSpec::new(dir.join("c.txt"), "c\n".to_string()));
    run_bitlet_command(dir, &["add", "c.txt"]).assert().success();

    run_bitlet_command(dir, &["merge", "other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("You have uncommitted changes."));
}

#[rstest]
fn merge_refuses_to_clobber_untracked_files(committed_repository_dir: TempDir) {
    let dir = committed_repository_dir.path();
    diverge(dir, ("c.txt", "c\n"), ("d.txt", "d from other\n"));
    write_file(FileSpec::new(dir.join("d.txt"), "precious".to_string()));

    run_bitlet_command(dir, &["merge", "other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "There is an untracked file in the way; delete it, or add and commit it first.",
        ));

    assert_eq!(read_file(&dir.join("d.txt")), "precious");
}
