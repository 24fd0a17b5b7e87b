//! Remotes
//!
//! A remote is another repository directory reachable on the local file
//! system. Its storage root is the `.bitlet` directory; its working directory
//! is the parent of that root.
//!
//! - `replicator`: copies commits and blobs from one object database to another

pub mod replicator;

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::storage::{FsStorage, Storage};
use crate::areas::workspace::Workspace;
use crate::errors::NotFound;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct Remote {
    name: String,
    /// Storage root as given by the user; relative paths are resolved
    /// against the local working directory
    path: PathBuf,
}

impl Remote {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The remote's storage root as seen from `working_dir`
    pub fn root(&self, working_dir: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            working_dir.join(&self.path)
        }
    }
}

/// The areas of a remote repository that synchronization touches
#[derive(Debug)]
pub struct RemoteRoot {
    database: Database,
    index: Index,
    refs: Refs,
    workspace: Workspace,
}

impl RemoteRoot {
    /// Open the storage root at `root`; it must already exist
    pub fn open(root: &Path) -> crate::errors::Result<Self> {
        if !root.is_dir() {
            return Err(NotFound::RemoteDirectory.into());
        }

        let working_dir = root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        let storage: Arc<dyn Storage> = Arc::new(FsStorage::new(root.into()));

        Ok(RemoteRoot {
            database: Database::new(storage.clone()),
            index: Index::new(storage.clone()),
            refs: Refs::new(storage),
            workspace: Workspace::new(working_dir.into_boxed_path()),
        })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }
}
