//! Commit object
//!
//! A commit is an immutable snapshot of the staging area of one branch at a
//! point in time. It records the maps the stage held when the commit was made:
//!
//! - `tracked`: files as of the previous commit
//! - `added`: files staged for addition
//! - `removed`: files staged for removal
//!
//! The effective file set of the commit is `tracked + added - removed`.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! timestamp <unix millis> <utc offset seconds>
//! parent <first-parent-sha>
//! parent <second-parent-sha>
//! tracked <blob-sha> <file name>
//! added <blob-sha> <file name>
//! removed <blob-sha> <file name>
//!
//! <commit message>
//! ```
//!
//! ## Identity
//!
//! The commit ID covers the timestamp, message and the three file maps but not
//! the parent links. The very first commit of every repository has the epoch
//! timestamp and empty maps, which makes it identical across repositories.

use crate::artifacts::index::stage::Stage;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, SubsecRound, Utc};
use std::collections::BTreeMap;
use std::io::{BufRead, Read, Write};

/// File name to blob ID
pub type FileMap = BTreeMap<String, ObjectId>;

pub const INITIAL_COMMIT_MESSAGE: &str = "initial commit";

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    timestamp: DateTime<FixedOffset>,
    message: String,
    tracked: FileMap,
    added: FileMap,
    removed: FileMap,
    /// First parent, then the merged-in parent for merge commits
    parents: Vec<ObjectId>,
}

impl Commit {
    /// The root commit every repository starts from
    pub fn initial() -> Self {
        Commit {
            timestamp: DateTime::<Utc>::UNIX_EPOCH.fixed_offset(),
            message: INITIAL_COMMIT_MESSAGE.to_string(),
            tracked: FileMap::new(),
            added: FileMap::new(),
            removed: FileMap::new(),
            parents: Vec::new(),
        }
    }

    /// Snapshot the given stage on top of `parent`
    pub fn new(message: String, stage: &Stage, parent: ObjectId) -> Self {
        Self::with_timestamp(Self::now(), message, stage, vec![parent])
    }

    /// Snapshot a stage holding the result of merging `given` into `current`
    pub fn merge(stage: &Stage, current: ObjectId, given: ObjectId) -> Self {
        let merged_branch_name = stage
            .merged_branch_name()
            .map(|name| name.to_string())
            .unwrap_or_else(|| given.to_short_oid());
        let message = format!(
            "Merged {} into {}.",
            merged_branch_name,
            stage.branch_name()
        );

        Self::with_timestamp(Self::now(), message, stage, vec![current, given])
    }

    /// Local time at the millisecond precision commits are stored with
    fn now() -> DateTime<FixedOffset> {
        chrono::Local::now().fixed_offset().trunc_subsecs(3)
    }

    pub fn with_timestamp(
        timestamp: DateTime<FixedOffset>,
        message: String,
        stage: &Stage,
        parents: Vec<ObjectId>,
    ) -> Self {
        Commit {
            timestamp,
            message,
            tracked: stage.tracked().clone(),
            added: stage.added().clone(),
            removed: stage.removed().clone(),
            parents,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// Format timestamp in human-readable form
    ///
    /// # Returns
    ///
    /// String like "Thu Jan 1 00:00:00 1970 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
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

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn second_parent(&self) -> Option<&ObjectId> {
        self.parents.get(1)
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// The effective file set: tracked plus added, minus removed
    pub fn files(&self) -> FileMap {
        self.tracked
            .iter()
            .chain(self.added.iter())
            .filter(|(file_name, _)| !self.removed.contains_key(*file_name))
            .map(|(file_name, oid)| (file_name.clone(), oid.clone()))
            .collect()
    }

    pub fn file_hash(&self, file_name: &str) -> Option<&ObjectId> {
        if self.removed.contains_key(file_name) {
            return None;
        }
        self.added
            .get(file_name)
            .or_else(|| self.tracked.get(file_name))
    }

    pub fn contains_file(&self, file_name: &str) -> bool {
        self.file_hash(file_name).is_some()
    }

    fn body(&self, with_parents: bool) -> Vec<String> {
        let mut lines = vec![format!(
            "timestamp {} {}",
            self.timestamp.timestamp_millis(),
            self.timestamp.offset().local_minus_utc()
        )];

        if with_parents {
            for parent in &self.parents {
                lines.push(format!("parent {}", parent.as_ref()));
            }
        }
        for (label, files) in [
            ("tracked", &self.tracked),
            ("added", &self.added),
            ("removed", &self.removed),
        ] {
            for (file_name, oid) in files {
                lines.push(format!("{label} {oid} {file_name}"));
            }
        }
        lines.push(String::new());
        lines.push(self.message.to_string());

        lines
    }

    fn pack(&self, with_parents: bool) -> anyhow::Result<Bytes> {
        let content = self.body(with_parents).join("\n");

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(content.as_bytes())?;

        Ok(Bytes::from(commit_bytes))
    }

    fn parse_timestamp(line: &str) -> anyhow::Result<DateTime<FixedOffset>> {
        let (millis, offset) = line
            .strip_prefix("timestamp ")
            .and_then(|rest| rest.split_once(' '))
            .context("Invalid commit object: invalid timestamp line")?;

        let millis = millis
            .parse::<i64>()
            .context("Invalid commit object: invalid timestamp")?;
        let offset = offset
            .parse::<i32>()
            .context("Invalid commit object: invalid timezone")?;
        let offset =
            FixedOffset::east_opt(offset).context("Invalid commit object: invalid timezone")?;

        Ok(DateTime::from_timestamp_millis(millis)
            .context("Invalid commit object: timestamp out of range")?
            .with_timezone(&offset))
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        self.pack(true)
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        let (header, message) = content
            .split_once("\n\n")
            .context("Invalid commit object: missing message separator")?;
        let mut lines = header.lines();

        let timestamp = Self::parse_timestamp(
            lines
                .next()
                .context("Invalid commit object: missing timestamp line")?,
        )?;

        let mut commit = Commit {
            timestamp,
            message: message.to_string(),
            tracked: FileMap::new(),
            added: FileMap::new(),
            removed: FileMap::new(),
            parents: Vec::new(),
        };

        for line in lines {
            let (label, rest) = line
                .split_once(' ')
                .context("Invalid commit object: malformed line")?;

            if label == "parent" {
                commit.parents.push(ObjectId::try_parse(rest.to_string())?);
                continue;
            }

            let (oid, file_name) = rest
                .split_once(' ')
                .context("Invalid commit object: malformed file line")?;
            let oid = ObjectId::try_parse(oid.to_string())?;
            let files = match label {
                "tracked" => &mut commit.tracked,
                "added" => &mut commit.added,
                "removed" => &mut commit.removed,
                _ => anyhow::bail!("Invalid commit object: unknown field {label:?}"),
            };
            files.insert(file_name.to_string(), oid);
        }

        Ok(commit)
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        self.body(true).join("\n")
    }

    fn digest_content(&self) -> anyhow::Result<Bytes> {
        self.pack(false)
    }
}
