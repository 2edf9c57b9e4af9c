//! Normalized identity keys.
//!
//! Every key is case-folded at construction. The remote API treats usernames
//! and story ids case-insensitively, so `"Alice"` and `"alice"` must resolve to
//! the same cached entity.

use crate::{EntityKind, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Folds a raw identifier into its canonical form.
fn normalize(kind: EntityKind, raw: &str) -> Result<String> {
    if raw.is_empty() {
        return Err(Error::EmptyKey(kind));
    }
    if raw.contains('/') || raw.chars().any(char::is_whitespace) {
        return Err(Error::InvalidKey {
            kind,
            reason: format!("{raw:?} contains a path separator or whitespace"),
        });
    }
    Ok(raw.to_lowercase())
}

/// Reads an identifier out of a JSON payload value. Ids arrive as strings
/// for users and stories but as integers for lists.
fn normalize_json(kind: EntityKind, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => normalize(kind, s),
        Value::Number(n) => normalize(kind, &n.to_string()),
        other => Err(Error::InvalidKey {
            kind,
            reason: format!("expected a string or integer, got {other}"),
        }),
    }
}

macro_rules! normalized_key {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Builds a key from a raw identifier, case-folding it.
            pub fn new(raw: &str) -> Result<Self> {
                Ok(Self(normalize($kind, raw)?))
            }

            /// Builds a key from the identifying value of a JSON payload.
            pub fn from_json(value: &Value) -> Result<Self> {
                Ok(Self(normalize_json($kind, value)?))
            }

            /// Returns the normalized identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The entity kind this key identifies.
            #[must_use]
            pub const fn kind(&self) -> EntityKind {
                $kind
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(s: String) -> Result<Self> {
                Self::new(&s)
            }
        }

        impl From<$name> for String {
            fn from(key: $name) -> String {
                key.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

normalized_key!(
    /// Identity of a user: the lowercased username.
    UserKey,
    EntityKind::User
);

normalized_key!(
    /// Identity of a story: the lowercased story id.
    StoryKey,
    EntityKind::Story
);

normalized_key!(
    /// Identity of a reading list. Lists use integer ids on the wire; a
    /// textual id is compared case-insensitively.
    ListKey,
    EntityKind::List
);

impl From<u64> for ListKey {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}
