//! Commit history traversal
//!
//! - `history`: depth-first walk of everything reachable from a commit, used by
//!   the split-point search and by remote replication

pub mod history;
