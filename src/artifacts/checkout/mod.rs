//! Checkout operations and conflict handling
//!
//! This module switches the working directory between snapshots by:
//! - Refusing to run when an untracked file would be lost
//! - Rewriting working files from stored blobs
//! - Updating the stage of the checked-out branch to match

pub mod conflict;
pub mod migration;
