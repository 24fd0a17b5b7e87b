use colored::Colorize;

/// A change to a known file that is not staged for the next commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkspaceChange {
    /// Deleted from the working directory without `rm`
    Deleted,
    /// Contents differ from the tracked or staged version
    Modified,
}

impl From<&WorkspaceChange> for &str {
    fn from(change: &WorkspaceChange) -> Self {
        match change {
            WorkspaceChange::Deleted => "deleted",
            WorkspaceChange::Modified => "modified",
        }
    }
}

impl std::fmt::Display for WorkspaceChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label: &str = self.into();
        write!(f, "({})", label.red())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deletions_sort_before_modifications() {
        assert!(WorkspaceChange::Deleted < WorkspaceChange::Modified);
    }

    #[test]
    fn labels_are_lowercase() {
        let label: &str = (&WorkspaceChange::Modified).into();
        assert_eq!(label, "modified");
    }
}
