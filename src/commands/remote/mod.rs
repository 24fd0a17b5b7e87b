//! Remote commands
//!
//! Remotes are other repositories on the local file system, registered by the
//! path of their `.bitlet` directory.
//!
//! - `config`: `add-remote` / `rm-remote`
//! - `fetch`: copy a remote branch into `<remote>/<branch>`
//! - `push`: copy the current branch into a remote branch
//! - `pull`: fetch, then merge the fetched branch

pub mod config;
pub mod fetch;
pub mod pull;
pub mod push;
