//! Merge engine
//!
//! - `split_point`: common ancestor search between two branch heads
//! - `three_way`: per-file decisions against the split point
//! - `resolve`: applying those decisions to the working directory and stage

pub mod resolve;
pub mod split_point;
pub mod three_way;
