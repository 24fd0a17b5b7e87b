//! Repository areas
//!
//! - `config`: remotes and merge settings
//! - `database`: content-addressed blobs and commits
//! - `index`: the per-branch staging areas
//! - `refs`: branch heads, `HEAD` and `FETCH_HEAD`
//! - `repository`: the context every command runs against
//! - `storage`: keyed byte storage on disk or in memory
//! - `workspace`: the working directory

pub mod config;
pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod storage;
pub mod workspace;
