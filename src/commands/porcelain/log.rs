use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::NotFound;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// First-parent history of the current branch, newest first
    pub async fn log(&mut self) -> crate::errors::Result<()> {
        let branch = self.current_branch()?;

        let mut next = Some(branch.head().clone());
        while let Some(commit_id) = next {
            let commit = self.load_commit(&commit_id)?;
            self.show_commit(&commit_id, &commit)?;
            next = commit.parent().cloned();
        }

        Ok(())
    }

    /// Every stored commit, in no particular order
    pub async fn global_log(&mut self) -> crate::errors::Result<()> {
        self.ensure_initialized()?;

        for commit_id in self.database().commit_ids()? {
            let commit = self.load_commit(&commit_id)?;
            self.show_commit(&commit_id, &commit)?;
        }

        Ok(())
    }

    /// Print the ID of every commit whose message is exactly `message`
    pub async fn find(&mut self, message: &str) -> crate::errors::Result<()> {
        self.ensure_initialized()?;

        let mut found = false;
        for commit_id in self.database().commit_ids()? {
            if self.load_commit(&commit_id)?.message() == message {
                writeln!(self.writer(), "{commit_id}")?;
                found = true;
            }
        }

        if !found {
            return Err(NotFound::CommitWithMessage.into());
        }

        Ok(())
    }

    fn show_commit(&self, commit_id: &ObjectId, commit: &Commit) -> crate::errors::Result<()> {
        let mut writer = self.writer();

        writeln!(writer, "===")?;
        writeln!(writer, "{}", format!("commit {commit_id}").yellow())?;
        if let (Some(first), Some(second)) = (commit.parent(), commit.second_parent()) {
            writeln!(
                writer,
                "Merge: {} {}",
                first.to_short_oid(),
                second.to_short_oid()
            )?;
        }
        writeln!(writer, "Date: {}", commit.readable_timestamp())?;
        writeln!(writer, "{}", commit.message())?;
        writeln!(writer)?;

        Ok(())
    }
}
