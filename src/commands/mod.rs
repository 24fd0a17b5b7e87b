//! Command implementations
//!
//! - `porcelain`: commands that work on the local repository
//! - `remote`: remote management and synchronization with other storage roots

pub mod porcelain;
pub mod remote;
