//! Domain model for stages, people, schedules and attendance.
//!
//! # Responsibility
//! - Define the entities persisted under the store keys.
//! - Keep serialized field names stable (`camelCase`), matching the data
//!   layout already written by earlier app versions.
//!
//! # Invariants
//! - Every entity is identified by an `EntityId` issued by the repository
//!   id sequence.

pub mod attendance;
pub mod schedule;
pub mod school;

use once_cell::sync::Lazy;
use regex::Regex;

/// Identifier shared by every persisted entity kind.
pub type EntityId = i64;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Trims and collapses runs of whitespace in user-entered labels.
///
/// Returns `None` when nothing but whitespace was provided.
pub fn normalize_label(value: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(value.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}
