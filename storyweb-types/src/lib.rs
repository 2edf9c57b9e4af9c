//! Core type definitions for storyweb.
//!
//! This crate defines the identity types every other crate keys on:
//! - Normalized identity keys for users, stories, and lists
//! - The [`EntityKind`] discriminant used by the schema registry and cache
//!
//! Keys are normalized once, at construction, so that two keys built from
//! `"Alice"` and `"alice"` compare, hash, and display identically.

mod keys;
mod kind;

pub use keys::{ListKey, StoryKey, UserKey};
pub use kind::EntityKind;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building identity keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("empty {0} key")]
    EmptyKey(EntityKind),

    #[error("invalid {kind} key: {reason}")]
    InvalidKey { kind: EntityKind, reason: String },
}
