//! Cache module for storing rate snapshots on disk
//!
//! This module provides a file-backed store that persists JSON artifacts under a
//! single cache root, one file per key. Freshness is not decided here; the store
//! only reads, writes, and deletes what it is told to.

mod store;

pub use store::{CacheError, CacheStore};
