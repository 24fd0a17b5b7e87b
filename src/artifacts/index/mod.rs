//! Staging area file format
//!
//! Each branch owns one stage stored under `stage/<flattened branch name>`.
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "STGE" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Branch names:
//!   - Branch name length (2 bytes) + UTF-8 name
//!   - Merged branch name length (2 bytes, 0 when absent) + UTF-8 name
//!
//! Entries (entry count times):
//!   - Kind: tracked, added, removed or conflicted (1 byte)
//!   - File name length (2 bytes) + UTF-8 file name
//!   - Blob ID (20 bytes)
//!   - Conflicts only: presence flags (1 byte), then the ours/theirs blob IDs present
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod stage;
pub mod stage_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of stage header in bytes
pub const HEADER_SIZE: usize = 12;

/// Magic signature identifying stage files
pub const SIGNATURE: &str = "STGE";

/// Stage file format version
pub const VERSION: u32 = 1;
