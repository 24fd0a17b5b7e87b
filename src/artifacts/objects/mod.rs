//! Stored object types and operations
//!
//! Two kinds of objects are content-addressed by a SHA-1 digest:
//!
//! - **Blob**: a named file snapshot (file name and raw bytes)
//! - **Commit**: an immutable snapshot of tracked/added/removed file maps plus metadata
//!
//! All objects serialize as `<type> <size>\0<content>` and are zlib-compressed
//! on disk.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Shortest prefix accepted when resolving abbreviated commit ids
pub const MIN_ABBREV_LENGTH: usize = 6;
