//! Branches and branch names
//!
//! A branch is a logical name plus the commit it currently points at. Only the
//! head is ever reassigned.
//!
//! ## File Format
//!
//! `heads/<flattened name>` holds two lines: the head commit ID and the
//! logical branch name, so remote-tracking branches such as `origin/master`
//! survive the flattening to `origin-master`.

pub mod branch_name;

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::io::BufRead;

pub const DEFAULT_BRANCH: &str = "master";

pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Branch {
    name: BranchName,
    head: ObjectId,
}

impl Branch {
    pub fn name(&self) -> &BranchName {
        &self.name
    }

    pub fn head(&self) -> &ObjectId {
        &self.head
    }
}

impl Packable for Branch {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(Bytes::from(format!("{}\n{}\n", self.head, self.name)))
    }
}

impl Unpackable for Branch {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut lines = reader.lines();

        let head = lines
            .next()
            .context("Invalid branch file: missing head")??;
        let head = ObjectId::try_parse(head.trim().to_string())?;

        let name = lines
            .next()
            .context("Invalid branch file: missing name")??;
        let name = BranchName::try_parse(name.trim().to_string())?;

        Ok(Branch { name, head })
    }
}
