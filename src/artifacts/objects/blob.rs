//! Blob object
//!
//! Blobs store a snapshot of one working file. Unlike plain content stores the
//! file name is part of the blob, so two files with identical bytes but
//! different names have different IDs.
//!
//! ## Format
//!
//! On disk: `blob <size>\0<file name>\0<content>`

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Read, Write};

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Blob {
    file_name: String,
    content: Bytes,
}

impl Blob {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();
        content_bytes.write_all(self.file_name.as_bytes())?;
        content_bytes.write_all(b"\0")?;
        content_bytes.write_all(&self.content)?;

        let mut blob_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        blob_bytes.write_all(header.as_bytes())?;
        blob_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(blob_bytes))
    }
}

impl Unpackable for Blob {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been read
        let mut file_name = Vec::new();
        reader.read_until(b'\0', &mut file_name)?;
        if file_name.pop() != Some(0) {
            anyhow::bail!("Invalid blob object: missing file name terminator");
        }
        let file_name = String::from_utf8(file_name).context("Invalid blob file name")?;

        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;

        Ok(Self::new(file_name, content.into()))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.content).to_string()
    }
}
