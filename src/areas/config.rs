//! Repository configuration stored as TOML under the `config` key.

use crate::areas::storage::Storage;
use crate::artifacts::remote::Remote;
use crate::errors::{NotFound, Precondition};
use anyhow::Context;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const CONFIG_KEY: &str = "config";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Merge settings.
    #[serde(default)]
    pub merge: MergeConfig,

    /// Named remotes, keyed by remote name.
    #[serde(default)]
    pub remotes: BTreeMap<String, Remote>,
}

impl Config {
    /// Load the config; a repository without one uses the defaults.
    pub fn load(storage: &dyn Storage) -> anyhow::Result<Self> {
        let Some(content) = storage.get(CONFIG_KEY)? else {
            return Ok(Self::default());
        };

        let content = String::from_utf8(content.to_vec()).context("config is not valid UTF-8")?;
        toml::from_str(&content).context("Unable to parse config")
    }

    pub fn save(&self, storage: &dyn Storage) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self).context("Unable to serialize config")?;
        storage.put(CONFIG_KEY, Bytes::from(content))
    }

    pub fn find_remote(&self, name: &str) -> Result<&Remote, NotFound> {
        self.remotes.get(name).ok_or(NotFound::Remote)
    }

    pub fn add_remote(&mut self, remote: Remote) -> Result<(), Precondition> {
        if self.remotes.contains_key(remote.name()) {
            return Err(Precondition::RemoteAlreadyExists);
        }

        self.remotes.insert(remote.name().to_string(), remote);
        Ok(())
    }

    pub fn remove_remote(&mut self, name: &str) -> Result<Remote, NotFound> {
        self.remotes.remove(name).ok_or(NotFound::Remote)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// How the common ancestor of two branches is picked.
    #[serde(default)]
    pub split_point: SplitPointStrategy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitPointStrategy {
    /// Depth-first distances where the first visit of a commit wins.
    #[default]
    Heuristic,
    /// Breadth-first shortest distances.
    Exact,
}
