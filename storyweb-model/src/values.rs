//! Value types embedded in entity payloads.
//!
//! These have no identity: they are stored exactly as the API returned them
//! and decoded on access. Every field is optional because a caller may have
//! asked for a sub-selection (e.g. `parts(id)`).

use serde::{Deserialize, Serialize};

/// A chapter of a story.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Part {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub modify_date: Option<String>,
    pub create_date: Option<String>,
    pub comment_count: Option<u64>,
    pub vote_count: Option<u64>,
    pub read_count: Option<u64>,
}

/// The first or most recent published part of a story.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PublishedPart {
    pub id: Option<u64>,
    pub create_date: Option<String>,
}

/// A story's language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Language {
    pub id: Option<u64>,
    pub name: Option<String>,
}

/// A story's rank within one of its tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagRanking {
    pub name: Option<String>,
    pub rank: Option<u64>,
    pub total: Option<u64>,
}

/// Unread/total message counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inbox {
    pub unread: Option<u64>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notifications {
    pub unread: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectedServices {
    pub facebook: Option<bool>,
    pub twitter: Option<bool>,
}
