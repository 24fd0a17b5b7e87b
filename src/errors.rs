//! Errors surfaced by repository commands
//!
//! Every command returns [`Result`]. The variants carry the exact message shown
//! to the user; infrastructure failures (I/O, corrupt objects) are kept as
//! `anyhow` errors inside [`RepositoryError::Internal`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RepositoryError>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Incorrect operands.")]
    IncorrectOperands,

    #[error("Not in an initialized Bitlet directory.")]
    NotInitialized,

    #[error(transparent)]
    Precondition(#[from] Precondition),

    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedFileInTheWay,

    /// Normal merge outcomes that still end the command early
    #[error(transparent)]
    Advisory(#[from] MergeAdvisory),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl RepositoryError {
    pub fn is_advisory(&self) -> bool {
        matches!(self, RepositoryError::Advisory(_))
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, RepositoryError::Internal(_) | RepositoryError::Io(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Precondition {
    #[error("A Bitlet version-control system already exists in the current directory.")]
    AlreadyInitialized,

    #[error("File does not exist.")]
    MissingWorkingFile,

    #[error("Please enter a commit message.")]
    EmptyCommitMessage,

    #[error("No changes added to the commit.")]
    NothingStaged,

    #[error("No reason to remove the file.")]
    NoReasonToRemove,

    #[error("A branch with that name already exists.")]
    BranchAlreadyExists,

    #[error("Invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("Cannot remove the current branch.")]
    RemovingCurrentBranch,

    #[error("No need to checkout the current branch.")]
    CheckingOutCurrentBranch,

    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    #[error("Cannot merge a branch with itself.")]
    MergingWithItself,

    #[error("A remote with that name already exists.")]
    RemoteAlreadyExists,

    #[error("Please pull down remote changes before pushing.")]
    PushWithoutPull,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFound {
    #[error("No such branch exists.")]
    CheckoutBranch,

    #[error("A branch with that name does not exist.")]
    Branch,

    #[error("No commit with that id exists.")]
    Commit,

    #[error("File does not exist in that commit.")]
    FileInCommit,

    #[error("Found no commit with that message.")]
    CommitWithMessage,

    #[error("A remote with that name does not exist.")]
    Remote,

    #[error("Remote directory not found.")]
    RemoteDirectory,

    #[error("That remote does not have that branch.")]
    RemoteBranch,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeAdvisory {
    #[error("Given branch is an ancestor of the current branch.")]
    GivenIsAncestor,

    #[error("Current branch is fast-forwarded.")]
    FastForwarded,
}
