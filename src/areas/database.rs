//! Content-addressed object database
//!
//! Blobs live under `objects/<oid>` and commits under `commits/<oid>`, both
//! zlib-compressed. The same code serves the local repository and any remote
//! storage root; only the [`Storage`] differs.

use crate::areas::storage::Storage;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::NotFound;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::io::{Cursor, Read, Write};
use std::sync::Arc;

#[derive(Debug, Clone, new)]
pub struct Database {
    storage: Arc<dyn Storage>,
}

impl Database {
    fn key(object_type: &ObjectType, object_id: &ObjectId) -> String {
        format!("{}/{}", object_type.namespace(), object_id)
    }

    pub fn store_blob(&self, blob: &Blob) -> anyhow::Result<ObjectId> {
        self.store(blob)
    }

    pub fn store_commit(&self, commit: &Commit) -> anyhow::Result<ObjectId> {
        self.store(commit)
    }

    /// Write `object` unless it is already stored; returns its ID either way
    fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        let key = Self::key(&object.object_type(), &object_id);

        // stored objects never change
        if !self.storage.exists(&key) {
            let content = Self::compress(object.serialize()?)?;
            self.storage.put_if_absent(&key, content)?;
        }

        Ok(object_id)
    }

    pub fn load_blob(&self, object_id: &ObjectId) -> anyhow::Result<Option<Blob>> {
        self.load(ObjectType::Blob, object_id)
    }

    pub fn load_commit(&self, object_id: &ObjectId) -> anyhow::Result<Option<Commit>> {
        self.load(ObjectType::Commit, object_id)
    }

    fn load<T: Object + Unpackable>(
        &self,
        expected_type: ObjectType,
        object_id: &ObjectId,
    ) -> anyhow::Result<Option<T>> {
        let key = Self::key(&expected_type, object_id);
        let Some(content) = self.storage.get(&key)? else {
            return Ok(None);
        };

        let content = Self::decompress(content)
            .with_context(|| format!("Unable to read object {object_id}"))?;
        let mut reader = Cursor::new(content);

        let object_type = ObjectType::parse_object_type(&mut reader)?;
        if object_type != expected_type {
            anyhow::bail!("Object {object_id} is a {object_type}, expected a {expected_type}");
        }

        let object = T::deserialize(reader)?;
        if object.object_id()? != *object_id {
            anyhow::bail!("Corrupt object {object_id}: content does not match its ID");
        }

        Ok(Some(object))
    }

    pub fn contains_blob(&self, object_id: &ObjectId) -> bool {
        self.storage.exists(&Self::key(&ObjectType::Blob, object_id))
    }

    pub fn contains_commit(&self, object_id: &ObjectId) -> bool {
        self.storage
            .exists(&Self::key(&ObjectType::Commit, object_id))
    }

    /// IDs of every stored commit, sorted
    pub fn commit_ids(&self) -> anyhow::Result<Vec<ObjectId>> {
        self.storage
            .list_keys(ObjectType::Commit.namespace())?
            .into_iter()
            .map(ObjectId::try_parse)
            .collect()
    }

    /// Resolve a full or abbreviated commit ID to a stored commit
    ///
    /// Abbreviations need at least six hex characters and must match exactly
    /// one commit.
    pub fn resolve_commit(&self, id: &str) -> crate::errors::Result<ObjectId> {
        if !ObjectId::is_abbreviation(id) {
            return Err(NotFound::Commit.into());
        }

        let mut matches = self
            .commit_ids()?
            .into_iter()
            .filter(|object_id| object_id.starts_with(id));

        match (matches.next(), matches.next()) {
            (Some(object_id), None) => Ok(object_id),
            _ => Err(NotFound::Commit.into()),
        }
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }
}
