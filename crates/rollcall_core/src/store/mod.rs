//! Key-value persistence boundary.
//!
//! # Responsibility
//! - Define the raw `get/set by key` contract every higher layer builds on.
//! - Keep SQLite details inside the store implementation.
//!
//! # Invariants
//! - Values are opaque text; typing/serialization belongs to `repo`.
//! - `set_many` writes all entries or none.

pub mod kv_store;
