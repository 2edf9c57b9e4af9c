//! Request URL building.
//!
//! The API takes its field selection as a raw `fields=` query parameter.
//! Endpoints returning a single entity take the selection as is; endpoints
//! returning a collection want it wrapped in the collection's name, e.g.
//! `users/{name}/followers?fields=users(username,name)`.

use crate::selection::FieldSelection;
use std::fmt::Write as _;
use storyweb_types::{EntityKind, StoryKey, UserKey};

/// How the selection is placed in the `fields=` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// `fields=<selection>`.
    Default,
    /// `fields=<collection>(<selection>)`, where the collection name comes
    /// from the kind (`users`, `stories`, `lists`).
    Collection(EntityKind),
}

/// A request path plus its query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUrl {
    path: String,
    fields: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl RequestUrl {
    /// A request for `path`, relative to the API root.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fields: None,
            limit: None,
            offset: None,
        }
    }

    pub fn user(key: &UserKey) -> Self {
        Self::new(format!("users/{}", segment(key.as_str())))
    }

    pub fn user_stories(key: &UserKey) -> Self {
        Self::new(format!("users/{}/stories", segment(key.as_str())))
    }

    pub fn followers(key: &UserKey) -> Self {
        Self::new(format!("users/{}/followers", segment(key.as_str())))
    }

    pub fn following(key: &UserKey) -> Self {
        Self::new(format!("users/{}/following", segment(key.as_str())))
    }

    pub fn user_lists(key: &UserKey) -> Self {
        Self::new(format!("users/{}/lists", segment(key.as_str())))
    }

    pub fn story(key: &StoryKey) -> Self {
        Self::new(format!("stories/{}", segment(key.as_str())))
    }

    pub fn recommended(key: &StoryKey) -> Self {
        Self::new(format!("stories/{}/recommended", segment(key.as_str())))
    }

    /// Attaches a field selection. An empty selection leaves the parameter
    /// off so the server applies its defaults; a collection wrapper is always
    /// emitted.
    #[must_use]
    pub fn with_fields(mut self, selection: &FieldSelection, convention: Convention) -> Self {
        let serialized = selection.to_query();
        self.fields = match convention {
            Convention::Default if serialized.is_empty() => None,
            Convention::Default => Some(serialized),
            Convention::Collection(kind) => Some(format!("{}({serialized})", kind.collection_name())),
        };
        self
    }

    /// Zero counts as absent, as does a zero offset.
    #[must_use]
    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit.filter(|n| *n > 0);
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: Option<u32>) -> Self {
        self.offset = offset.filter(|n| *n > 0);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The serialized `fields=` value, if any.
    pub fn fields(&self) -> Option<&str> {
        self.fields.as_deref()
    }

    /// Path and query string, relative to the API root.
    pub fn relative(&self) -> String {
        let mut params = Vec::with_capacity(3);
        if let Some(fields) = &self.fields {
            params.push(format!("fields={fields}"));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={limit}"));
        }
        if let Some(offset) = self.offset {
            params.push(format!("offset={offset}"));
        }

        let mut url = self.path.clone();
        if !params.is_empty() {
            let _ = write!(url, "?{}", params.join("&"));
        }
        url
    }

    /// Absolute URL under `base` (e.g. `https://www.wattpad.com/api/v3`).
    pub fn absolute(&self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.relative())
    }
}

fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}
