use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Result;
use bytes::Bytes;
use std::io::BufRead;

pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    /// Bytes the object ID is derived from; the full serialization unless
    /// the object excludes some of its fields from its identity.
    fn digest_content(&self) -> Result<Bytes> {
        self.serialize()
    }

    fn object_id(&self) -> Result<ObjectId> {
        ObjectId::digest(&self.digest_content()?)
    }
}
