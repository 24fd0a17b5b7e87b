//! Three-way file merge decisions
//!
//! Each file is judged by its blob at the split point, in the current commit
//! ("ours") and in the given commit ("theirs"); `None` means the file is
//! absent there.
//!
//! | split vs ours | split vs theirs | result                         |
//! |---------------|-----------------|--------------------------------|
//! | any           | ours == theirs  | keep                           |
//! | any           | unchanged       | keep ours (even a deletion)    |
//! | unchanged     | changed         | take theirs, or remove it      |
//! | changed       | changed         | conflict                       |

use crate::artifacts::objects::commit::FileMap;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileMergeAction {
    /// Check out and stage the given branch's version
    TakeGiven(ObjectId),
    /// The given branch deleted a file the current branch left untouched
    Remove,
    Conflict {
        ours: Option<ObjectId>,
        theirs: Option<ObjectId>,
    },
}

/// The action for one file, or `None` when the current version stays
pub fn decide(
    split: Option<&ObjectId>,
    ours: Option<&ObjectId>,
    theirs: Option<&ObjectId>,
) -> Option<FileMergeAction> {
    if ours == theirs || split == theirs {
        return None;
    }

    if split == ours {
        return Some(match theirs {
            Some(oid) => FileMergeAction::TakeGiven(oid.clone()),
            None => FileMergeAction::Remove,
        });
    }

    Some(FileMergeAction::Conflict {
        ours: ours.cloned(),
        theirs: theirs.cloned(),
    })
}

/// Decide every file present in any of the three snapshots
pub fn plan_file_merge(
    split: &FileMap,
    ours: &FileMap,
    theirs: &FileMap,
) -> BTreeMap<String, FileMergeAction> {
    let file_names = split
        .keys()
        .chain(ours.keys())
        .chain(theirs.keys())
        .collect::<BTreeSet<_>>();

    file_names
        .into_iter()
        .filter_map(|file_name| {
            decide(
                split.get(file_name),
                ours.get(file_name),
                theirs.get(file_name),
            )
            .map(|action| (file_name.clone(), action))
        })
        .collect()
}

/// Working file content recorded for a conflicted file; a deleted side is empty
pub fn conflict_content(ours: &[u8], theirs: &[u8]) -> Vec<u8> {
    let mut content = Vec::with_capacity(ours.len() + theirs.len() + 32);
    content.extend_from_slice(b"<<<<<<< HEAD\n");
    content.extend_from_slice(ours);
    content.extend_from_slice(b"=======\n");
    content.extend_from_slice(theirs);
    content.extend_from_slice(b">>>>>>>\n");
    content
}
