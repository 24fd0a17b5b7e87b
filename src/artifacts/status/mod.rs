//! Working directory status
//!
//! Classifies working files by comparing their content hashes with the records
//! of the current stage.
//!
//! ## Components
//!
//! - `file_change`: kinds of unstaged changes
//! - `status_info`: the classification and its rendering

pub mod file_change;
pub mod status_info;
