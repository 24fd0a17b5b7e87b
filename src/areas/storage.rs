//! Key-value persistence rooted at one repository directory
//!
//! Every area of the repository (objects, commits, refs, stages, config) is
//! addressed through string keys such as `heads/master` or `objects/<oid>`.
//! Keys use `/` as the namespace separator regardless of platform.
//!
//! ## Implementations
//!
//! - [`FsStorage`]: files below a `.bitlet` directory, guarded by advisory locks
//! - [`MemoryStorage`]: a sorted map, used to exercise repository logic without touching disk

use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use file_guard::Lock;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::ops::DerefMut;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use walkdir::WalkDir;

const TEMP_PREFIX: &str = "tmp-obj-";

pub trait Storage: std::fmt::Debug + Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<Bytes>>;

    /// Replace the value stored under `key`.
    fn put(&self, key: &str, data: Bytes) -> anyhow::Result<()>;

    /// Store `data` unless `key` is already present; returns whether it was written.
    fn put_if_absent(&self, key: &str, data: Bytes) -> anyhow::Result<bool>;

    fn exists(&self, key: &str) -> bool;

    /// Keys directly below `namespace`, sorted, without the namespace prefix.
    fn list_keys(&self, namespace: &str) -> anyhow::Result<Vec<String>>;

    fn remove(&self, key: &str) -> anyhow::Result<bool>;
}

#[derive(Debug)]
pub struct FsStorage {
    path: Box<Path>,
}

impl FsStorage {
    pub fn new(path: Box<Path>) -> Self {
        FsStorage { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn key_path(&self, key: &str) -> PathBuf {
        key.split('/')
            .fold(self.path.to_path_buf(), |path, segment| path.join(segment))
    }

    fn ensure_parent(path: &Path) -> anyhow::Result<()> {
        let parent = path
            .parent()
            .with_context(|| format!("Invalid storage path {}", path.display()))?;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Unable to create directory {}", parent.display()))
    }

    fn generate_temp_name() -> String {
        format!("{TEMP_PREFIX}{}", rand::random::<u32>())
    }
}

impl Storage for FsStorage {
    fn get(&self, key: &str) -> anyhow::Result<Option<Bytes>> {
        let path = self.key_path(key);
        if !path.is_file() {
            return Ok(None);
        }

        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .open(&path)
            .with_context(|| format!("Unable to open {}", path.display()))?;
        let mut lock = file_guard::lock(&mut file, Lock::Shared, 0, 1)?;

        let mut content = Vec::new();
        lock.deref_mut()
            .read_to_end(&mut content)
            .with_context(|| format!("Unable to read {}", path.display()))?;

        Ok(Some(content.into()))
    }

    fn put(&self, key: &str, data: Bytes) -> anyhow::Result<()> {
        let path = self.key_path(key);
        Self::ensure_parent(&path)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Unable to open {}", path.display()))?;
        let mut lock = file_guard::lock(&mut file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut()
            .write_all(&data)
            .with_context(|| format!("Unable to write {}", path.display()))?;

        Ok(())
    }

    fn put_if_absent(&self, key: &str, data: Bytes) -> anyhow::Result<bool> {
        let path = self.key_path(key);
        if path.exists() {
            return Ok(false);
        }
        Self::ensure_parent(&path)?;

        let temp_path = path.with_file_name(Self::generate_temp_name());
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("Unable to open {}", temp_path.display()))?;
        file.write_all(&data)
            .with_context(|| format!("Unable to write {}", temp_path.display()))?;

        // the rename publishes the object in one step
        std::fs::rename(&temp_path, &path)
            .with_context(|| format!("Unable to rename object file to {}", path.display()))?;

        Ok(true)
    }

    fn exists(&self, key: &str) -> bool {
        self.key_path(key).is_file()
    }

    fn list_keys(&self, namespace: &str) -> anyhow::Result<Vec<String>> {
        let dir = self.key_path(namespace);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        Ok(WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .filter(|name| !name.starts_with(TEMP_PREFIX))
            .collect())
    }

    fn remove(&self, key: &str) -> anyhow::Result<bool> {
        let path = self.key_path(key);
        if !path.is_file() {
            return Ok(false);
        }

        std::fs::remove_file(&path)
            .with_context(|| format!("Unable to remove {}", path.display()))?;
        Ok(true)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, Bytes>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> anyhow::Result<Option<Bytes>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, data: Bytes) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        entries.insert(key.to_string(), data);
        Ok(())
    }

    fn put_if_absent(&self, key: &str, data: Bytes) -> anyhow::Result<bool> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), data);
        Ok(true)
    }

    fn exists(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }

    fn list_keys(&self, namespace: &str) -> anyhow::Result<Vec<String>> {
        let prefix = format!("{namespace}/");
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;

        Ok(entries
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter(|name| !name.contains('/'))
            .map(String::from)
            .collect())
    }

    fn remove(&self, key: &str) -> anyhow::Result<bool> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        Ok(entries.remove(key).is_some())
    }
}
