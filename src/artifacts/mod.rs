//! Version-control data structures and algorithms
//!
//! - `branch`: branches and branch names
//! - `checkout`: working directory migrations and the untracked-file check
//! - `core`: shared utilities (pager wrapper)
//! - `index`: the staging area and its binary format
//! - `log`: commit history traversal
//! - `merge`: split point search and three-way file merge
//! - `objects`: blobs, commits and object IDs
//! - `remote`: remotes and history replication
//! - `status`: working directory status

pub mod branch;
pub mod checkout;
pub mod core;
pub mod index;
pub mod log;
pub mod merge;
pub mod objects;
pub mod remote;
pub mod status;
