//! Per-branch staging area
//!
//! A stage remembers what the last commit of its branch tracked and what the
//! next commit will add or remove. `added` and `removed` never share a key.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::stage_header::StageHeader;
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::commit::{Commit, FileMap};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Precondition;
use anyhow::anyhow;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

const OID_SIZE: usize = 20;

const KIND_TRACKED: u8 = 0;
const KIND_ADDED: u8 = 1;
const KIND_REMOVED: u8 = 2;
const KIND_CONFLICTED: u8 = 3;

const HAS_OURS: u8 = 0b01;
const HAS_THEIRS: u8 = 0b10;

/// Blob versions recorded for a file whose merge produced conflict markers
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct ConflictEntry {
    /// The blob holding the conflict markers
    pub merged: ObjectId,
    pub ours: Option<ObjectId>,
    pub theirs: Option<ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    branch_name: BranchName,
    merged_branch_name: Option<BranchName>,
    tracked: FileMap,
    added: FileMap,
    removed: FileMap,
    conflicted: BTreeMap<String, ConflictEntry>,
}

impl Stage {
    pub fn new(branch_name: BranchName) -> Self {
        Stage {
            branch_name,
            merged_branch_name: None,
            tracked: FileMap::new(),
            added: FileMap::new(),
            removed: FileMap::new(),
            conflicted: BTreeMap::new(),
        }
    }

    /// A clean stage whose tracked files are the effective files of `commit`
    pub fn from_commit(branch_name: BranchName, commit: &Commit) -> Self {
        let mut stage = Self::new(branch_name);
        stage.replace_with(commit);
        stage
    }

    pub fn branch_name(&self) -> &BranchName {
        &self.branch_name
    }

    pub fn set_branch_name(&mut self, branch_name: BranchName) {
        self.branch_name = branch_name;
    }

    pub fn merged_branch_name(&self) -> Option<&BranchName> {
        self.merged_branch_name.as_ref()
    }

    pub fn set_merged_branch_name(&mut self, merged_branch_name: Option<BranchName>) {
        self.merged_branch_name = merged_branch_name;
    }

    pub fn tracked(&self) -> &FileMap {
        &self.tracked
    }

    pub fn added(&self) -> &FileMap {
        &self.added
    }

    pub fn removed(&self) -> &FileMap {
        &self.removed
    }

    pub fn conflicted(&self) -> &BTreeMap<String, ConflictEntry> {
        &self.conflicted
    }

    /// Stage `file_name` at `oid`
    ///
    /// A file staged for removal is only un-removed. Staging the tracked
    /// version again cancels a pending addition.
    pub fn add(&mut self, file_name: &str, oid: ObjectId) {
        if self.removed.remove(file_name).is_some() {
            return;
        }

        if self.tracked.get(file_name) == Some(&oid) {
            self.added.remove(file_name);
        } else {
            self.added.insert(file_name.to_string(), oid);
        }
    }

    /// Drop `file_name` from the next commit
    ///
    /// Returns whether the file was tracked, in which case it is now staged
    /// for removal and its working copy should be deleted.
    pub fn unstage(&mut self, file_name: &str) -> Result<bool, Precondition> {
        let was_added = self.added.remove(file_name).is_some();

        match self.tracked.get(file_name) {
            Some(oid) => {
                self.removed.insert(file_name.to_string(), oid.clone());
                Ok(true)
            }
            None if was_added => Ok(false),
            None => Err(Precondition::NoReasonToRemove),
        }
    }

    pub fn is_changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }

    pub fn is_conflicted(&self) -> bool {
        !self.conflicted.is_empty()
    }

    pub fn is_tracked(&self, file_name: &str) -> bool {
        self.tracked.contains_key(file_name)
    }

    /// Whether the file is known to the stage: tracked or staged for addition
    pub fn is_known(&self, file_name: &str) -> bool {
        self.tracked.contains_key(file_name) || self.added.contains_key(file_name)
    }

    /// Fold the staged changes into the tracked set after a commit
    pub fn apply_commit(&mut self) {
        let added = std::mem::take(&mut self.added);
        self.tracked.extend(added);

        let removed = std::mem::take(&mut self.removed);
        for file_name in removed.keys() {
            self.tracked.remove(file_name);
        }

        self.conflicted.clear();
        self.merged_branch_name = None;
    }

    /// Replace every file map with the ones recorded by `commit`
    pub fn replace_with(&mut self, commit: &Commit) {
        self.tracked = commit.tracked().clone();
        self.added = commit.added().clone();
        self.removed = commit.removed().clone();
        self.apply_commit();
    }

    /// A single file was restored from a commit; it is no longer staged
    pub fn record_checkout(&mut self, file_name: &str) {
        self.added.remove(file_name);
        self.removed.remove(file_name);
    }

    pub fn add_conflict(&mut self, file_name: &str, entry: ConflictEntry) {
        self.conflicted.insert(file_name.to_string(), entry);
    }

    /// The files the next commit would contain
    pub fn files(&self) -> FileMap {
        self.tracked
            .iter()
            .chain(self.added.iter())
            .filter(|(file_name, _)| !self.removed.contains_key(*file_name))
            .map(|(file_name, oid)| (file_name.clone(), oid.clone()))
            .collect()
    }

    fn entries_count(&self) -> u32 {
        (self.tracked.len() + self.added.len() + self.removed.len() + self.conflicted.len()) as u32
    }

    fn write_name(bytes: &mut Vec<u8>, name: &str) -> anyhow::Result<()> {
        let length = u16::try_from(name.len())
            .map_err(|_| anyhow!("Name too long for stage file: {name}"))?;
        bytes.write_u16::<byteorder::NetworkEndian>(length)?;
        bytes.write_all(name.as_bytes())?;
        Ok(())
    }

    fn write_entry(
        bytes: &mut Vec<u8>,
        kind: u8,
        file_name: &str,
        oid: &ObjectId,
    ) -> anyhow::Result<()> {
        bytes.write_u8(kind)?;
        Self::write_name(bytes, file_name)?;
        oid.write_h40_to(bytes)
    }

    fn read_name<R: BufRead>(reader: &mut Checksum<R>) -> anyhow::Result<String> {
        let length = byteorder::NetworkEndian::read_u16(&reader.read(2)?);
        let name = reader.read(length as usize)?;

        String::from_utf8(name.to_vec()).map_err(|_| anyhow!("Invalid name in stage file"))
    }

    fn read_oid<R: BufRead>(reader: &mut Checksum<R>) -> anyhow::Result<ObjectId> {
        let bytes = reader.read(OID_SIZE)?;
        ObjectId::read_h40_from(&mut std::io::Cursor::new(bytes))
    }

    fn parse_header<R: BufRead>(reader: &mut Checksum<R>) -> anyhow::Result<u32> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = StageHeader::deserialize(std::io::Cursor::new(header_bytes))?;

        if header.marker != SIGNATURE {
            return Err(anyhow!("Invalid stage file signature"));
        }

        if header.version != VERSION {
            return Err(anyhow!(
                "Unsupported stage file version: {}",
                header.version
            ));
        }

        Ok(header.entries_count)
    }
}

impl Packable for Stage {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut writer = Checksum::new(Vec::new());
        writer.write(&StageHeader::with_entries(self.entries_count()).serialize()?)?;

        let mut bytes = Vec::new();
        Self::write_name(&mut bytes, self.branch_name.as_ref())?;
        Self::write_name(
            &mut bytes,
            self.merged_branch_name
                .as_ref()
                .map(|name| name.as_ref())
                .unwrap_or(""),
        )?;

        for (kind, files) in [
            (KIND_TRACKED, &self.tracked),
            (KIND_ADDED, &self.added),
            (KIND_REMOVED, &self.removed),
        ] {
            for (file_name, oid) in files {
                Self::write_entry(&mut bytes, kind, file_name, oid)?;
            }
        }

        for (file_name, conflict) in &self.conflicted {
            Self::write_entry(&mut bytes, KIND_CONFLICTED, file_name, &conflict.merged)?;

            let mut presence = 0u8;
            if conflict.ours.is_some() {
                presence |= HAS_OURS;
            }
            if conflict.theirs.is_some() {
                presence |= HAS_THEIRS;
            }
            bytes.write_u8(presence)?;

            for oid in conflict.ours.iter().chain(conflict.theirs.iter()) {
                oid.write_h40_to(&mut bytes)?;
            }
        }

        writer.write(&bytes)?;
        writer.write_checksum()?;

        Ok(Bytes::from(writer.into_inner()))
    }
}

impl Unpackable for Stage {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut reader = Checksum::new(reader);
        let entries_count = Self::parse_header(&mut reader)?;

        let branch_name = BranchName::try_parse(Self::read_name(&mut reader)?)?;
        let merged_branch_name = match Self::read_name(&mut reader)? {
            name if name.is_empty() => None,
            name => Some(BranchName::try_parse(name)?),
        };

        let mut stage = Stage::new(branch_name);
        stage.merged_branch_name = merged_branch_name;

        for _ in 0..entries_count {
            let kind = reader.read(1)?[0];
            let file_name = Self::read_name(&mut reader)?;
            let oid = Self::read_oid(&mut reader)?;

            match kind {
                KIND_TRACKED => {
                    stage.tracked.insert(file_name, oid);
                }
                KIND_ADDED => {
                    stage.added.insert(file_name, oid);
                }
                KIND_REMOVED => {
                    stage.removed.insert(file_name, oid);
                }
                KIND_CONFLICTED => {
                    let presence = reader.read(1)?[0];
                    let ours = match presence & HAS_OURS {
                        0 => None,
                        _ => Some(Self::read_oid(&mut reader)?),
                    };
                    let theirs = match presence & HAS_THEIRS {
                        0 => None,
                        _ => Some(Self::read_oid(&mut reader)?),
                    };
                    stage
                        .conflicted
                        .insert(file_name, ConflictEntry::new(oid, ours, theirs));
                }
                _ => return Err(anyhow!("Unknown stage entry kind: {kind}")),
            }
        }

        reader.verify()?;

        Ok(stage)
    }
}
