use serde::{Deserialize, Serialize};
use std::fmt;

/// The three entity kinds that carry identity.
///
/// Value types (parts, languages, tag rankings, ...) have no identity and
/// are never cached, so they have no kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Story,
    List,
}

impl EntityKind {
    /// All kinds, in registry order.
    pub const ALL: [EntityKind; 3] = [EntityKind::User, EntityKind::Story, EntityKind::List];

    /// Lowercase name, as used in log output and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Story => "story",
            EntityKind::List => "list",
        }
    }

    /// The wire field that identifies an entity of this kind in a payload.
    #[must_use]
    pub const fn key_field(self) -> &'static str {
        match self {
            EntityKind::User => "username",
            EntityKind::Story | EntityKind::List => "id",
        }
    }

    /// The wrapper used by collection endpoints returning this kind
    /// (`users(...)`, `stories(...)`, `lists(...)`).
    #[must_use]
    pub const fn collection_name(self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Story => "stories",
            EntityKind::List => "lists",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
