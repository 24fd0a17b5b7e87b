//! Working directory access
//!
//! Only plain files directly inside the working directory are versioned;
//! subdirectories (including the `.bitlet` repository directory) are ignored.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use bytes::Bytes;
use std::io::Write;
use std::path::{Component, Path};
use walkdir::WalkDir;

pub const REPOSITORY_DIR: &str = ".bitlet";

#[derive(Debug, Clone)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of the working files, sorted
    pub fn list_files(&self) -> anyhow::Result<Vec<String>> {
        if !self.path.is_dir() {
            anyhow::bail!("The working directory does not exist: {:?}", self.path);
        }

        Ok(WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.file_name().to_str().map(String::from))
            .filter(|name| name != REPOSITORY_DIR)
            .collect())
    }

    pub fn exists(&self, file_name: &str) -> bool {
        self.path.join(file_name).is_file()
    }

    pub fn read_file(&self, file_name: &str) -> anyhow::Result<Bytes> {
        let file_path = self.path.join(file_name);

        let content = std::fs::read(&file_path)
            .with_context(|| format!("Failed to read file: {:?}", file_path))?;

        Ok(content.into())
    }

    pub fn write_file(&self, file_name: &str, content: &[u8]) -> anyhow::Result<()> {
        let file_path = self.path.join(file_name);

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&file_path)
            .with_context(|| format!("Failed to open file: {:?}", file_path))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to file: {:?}", file_path))
    }

    /// Delete a working file; a missing file is not an error
    pub fn remove_file(&self, file_name: &str) -> anyhow::Result<()> {
        let file_path = self.path.join(file_name);

        if file_path.is_file() {
            std::fs::remove_file(&file_path)
                .with_context(|| format!("Failed to remove file: {:?}", file_path))?;
        }

        Ok(())
    }

    pub fn parse_blob(&self, file_name: &str) -> anyhow::Result<Blob> {
        let data = self.read_file(file_name)?;
        Ok(Blob::new(file_name.to_string(), data))
    }

    /// Blob ID the working file would be stored under, if it exists
    pub fn hash_file(&self, file_name: &str) -> anyhow::Result<Option<ObjectId>> {
        if !self.exists(file_name) {
            return Ok(None);
        }

        Ok(Some(self.parse_blob(file_name)?.object_id()?))
    }

    /// The working file name an argument refers to
    ///
    /// `./f.txt` and `f.txt` name the same file. Anything inside a
    /// subdirectory, or outside the working directory, names no file.
    pub fn file_name_of(path: &str) -> Option<String> {
        let mut components = Path::new(path)
            .components()
            .filter(|component| *component != Component::CurDir);

        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => name.to_str().map(String::from),
            _ => None,
        }
    }
}
