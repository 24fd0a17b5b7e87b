use crate::artifacts::branch::{DEFAULT_BRANCH, INVALID_BRANCH_NAME_REGEX};
use crate::errors::Precondition;
use anyhow::Context;

/// Logical branch name, e.g. `master` or the remote-tracking `origin/master`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> Result<Self, Precondition> {
        if name.is_empty() || Self::is_invalid(&name) {
            return Err(Precondition::InvalidBranchName(name));
        }

        Ok(Self(name))
    }

    fn is_invalid(name: &str) -> bool {
        regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))
            .map(|re| re.is_match(name))
            .unwrap_or(true)
    }

    /// The `<remote>/<branch>` name a fetched branch is recorded under
    pub fn remote_tracking(remote: &str, branch: &BranchName) -> Result<Self, Precondition> {
        Self::try_parse(format!("{remote}/{branch}"))
    }

    pub fn default_branch() -> Self {
        Self(DEFAULT_BRANCH.to_string())
    }

    pub fn is_default_branch(&self) -> bool {
        self.0 == DEFAULT_BRANCH
    }

    /// Flat storage key: path separators become `-`
    pub fn to_key(&self) -> String {
        self.0.replace(['/', '\\'], "-")
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
