use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_bitlet_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

/// A repository whose master branch holds `a.txt` ("a") and `b.txt` ("b")
#[fixture]
pub fn committed_repository_dir(init_repository_dir: TempDir) -> TempDir {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("a.txt"), "a\n".to_string()));
    write_file(FileSpec::new(dir.join("b.txt"), "b\n".to_string()));
    run_bitlet_command(dir, &["add", "a.txt"]).assert().success();
    run_bitlet_command(dir, &["add", "b.txt"]).assert().success();
    bitlet_commit(dir, "Add a and b").assert().success();

    init_repository_dir
}

pub fn run_bitlet_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("bitlet").expect("Failed to find bitlet binary");
    cmd.envs(vec![("NO_PAGER", "1"), ("NO_COLOR", "1")]);
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn bitlet_commit(dir: &Path, message: &str) -> Command {
    run_bitlet_command(dir, &["commit", message])
}

/// Write, stage and commit one file
pub fn commit_file(dir: &Path, file_name: &str, content: &str, message: &str) {
    write_file(FileSpec::new(dir.join(file_name), content.to_string()));
    run_bitlet_command(dir, &["add", file_name])
        .assert()
        .success();
    bitlet_commit(dir, message).assert().success();
}

/// Commit IDs printed by `log`, newest first
pub fn log_commit_ids(dir: &Path) -> Vec<String> {
    let output = run_bitlet_command(dir, &["log"])
        .output()
        .expect("Failed to run bitlet log");
    let stdout = String::from_utf8(output.stdout).expect("log output is not UTF-8");

    stdout
        .lines()
        .filter_map(|line| line.strip_prefix("commit "))
        .map(str::to_string)
        .collect()
}

pub fn head_commit_id(dir: &Path) -> String {
    log_commit_ids(dir)
        .into_iter()
        .next()
        .expect("log printed no commits")
}
