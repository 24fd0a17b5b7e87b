//! Untracked-file safety checks
//!
//! Commands that rewrite the working directory refuse to run when doing so
//! would clobber a file the stage knows nothing about.

use crate::artifacts::index::stage::Stage;
use crate::artifacts::objects::commit::FileMap;
use crate::errors::RepositoryError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConflictType {
    /// A working file that is neither tracked nor staged for addition
    Untracked,
    /// An untracked working file the incoming commit would overwrite
    UntrackedOverwritten,
}

impl ConflictType {
    pub fn get_conflict_type(stage: &Stage, file_name: &str, incoming: Option<&FileMap>) -> Option<Self> {
        match incoming {
            None if !stage.is_known(file_name) => Some(ConflictType::Untracked),
            Some(files) if !stage.is_tracked(file_name) && files.contains_key(file_name) => {
                Some(ConflictType::UntrackedOverwritten)
            }
            _ => None,
        }
    }
}

/// Fail when any working file is in the way
///
/// Without `incoming` every unknown file is in the way; with it only the
/// untracked files that commit would overwrite are.
pub fn ensure_nothing_in_the_way(
    stage: &Stage,
    working_files: &[String],
    incoming: Option<&FileMap>,
) -> Result<(), RepositoryError> {
    match working_files
        .iter()
        .find_map(|file_name| ConflictType::get_conflict_type(stage, file_name, incoming))
    {
        Some(_) => Err(RepositoryError::UntrackedFileInTheWay),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::branch::branch_name::BranchName;
    use crate::artifacts::objects::object_id::ObjectId;
    use rstest::{fixture, rstest};

    fn oid(seed: &str) -> ObjectId {
        ObjectId::digest(seed.as_bytes()).unwrap()
    }

    #[fixture]
    fn stage() -> Stage {
        let mut stage = Stage::new(BranchName::default_branch());
        stage.add("tracked.txt", oid("t"));
        stage.apply_commit();
        stage.add("added.txt", oid("a"));
        stage
    }

    #[rstest]
    #[case("tracked.txt", None, None)]
    #[case("added.txt", None, None)]
    #[case("stray.txt", None, Some(ConflictType::Untracked))]
    #[case("stray.txt", Some("other.txt"), None)]
    #[case("stray.txt", Some("stray.txt"), Some(ConflictType::UntrackedOverwritten))]
    #[case("added.txt", Some("added.txt"), Some(ConflictType::UntrackedOverwritten))]
    fn test_conflict_type(
        stage: Stage,
        #[case] file_name: &str,
        #[case] incoming: Option<&str>,
        #[case] expected: Option<ConflictType>,
    ) {
        let incoming = incoming.map(|name| FileMap::from([(name.to_string(), oid("in"))]));

        pretty_assertions::assert_eq!(
            ConflictType::get_conflict_type(&stage, file_name, incoming.as_ref()),
            expected
        );
    }

    #[rstest]
    fn test_untracked_file_blocks_checkout(stage: Stage) {
        let files = vec!["tracked.txt".to_string(), "stray.txt".to_string()];

        assert!(matches!(
            ensure_nothing_in_the_way(&stage, &files, None),
            Err(RepositoryError::UntrackedFileInTheWay)
        ));
        assert!(ensure_nothing_in_the_way(&stage, &files[..1], None).is_ok());
    }
}
