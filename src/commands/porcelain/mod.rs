//! Local commands
//!
//! Every command is an `async fn` on [`Repository`](crate::areas::repository::Repository)
//! that locks the index while it reads or writes the current stage.
//!
//! ## Commands
//!
//! - `init`: create the repository with its initial commit
//! - `add` / `rm`: stage files for addition or removal
//! - `commit`: snapshot the stage
//! - `log`: history of the current branch, every commit, or commits by message
//! - `status`: branches and the state of working files
//! - `checkout`: switch branches or restore files
//! - `branch`: create and remove branches
//! - `reset`: move the current branch to another commit
//! - `merge`: three-way merge of another branch

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod init;
pub mod log;
pub mod merge;
pub mod reset;
pub mod rm;
pub mod status;
