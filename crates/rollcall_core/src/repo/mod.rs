//! Typed repository over the key-value store.
//!
//! # Responsibility
//! - Expose each stored collection as an ordered `Vec` of domain entities.
//! - Issue entity ids from a persisted monotonic sequence.
//!
//! # Invariants
//! - Absent keys read as empty collections, never as errors.
//! - Undecodable stored values surface as `RepoError::InvalidData`.

pub mod school_repo;
