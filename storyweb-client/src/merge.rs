//! Merge engine.
//!
//! Merging runs in two phases. Decoding turns a complete response into
//! patches and fails on anything malformed before a single entity is
//! touched. Committing a patch cannot fail: it resolves every key through the
//! identity cache, writes the plain fields, and records the references.
//!
//! Committing never holds two entity locks at once; each entity method takes
//! and releases its own lock.

use crate::cache::IdentityCache;
use crate::entity::{Entity, List, Story, User};
use crate::error::{ClientError, ClientResult};
use serde_json::{Map, Value};
use std::sync::Arc;
use storyweb_model::{Partial, SchemaSource};
use storyweb_types::{EntityKind, ListKey, StoryKey, UserKey};

type Fields = Map<String, Value>;

pub(crate) struct UserPatch {
    key: UserKey,
    fields: Fields,
}

pub(crate) struct StoryPatch {
    key: StoryKey,
    fields: Fields,
    author: Option<UserPatch>,
}

pub(crate) struct ListPatch {
    key: ListKey,
    fields: Fields,
    stories: Vec<StoryPatch>,
}

/// What to do with the `user` object embedded in a story payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Author {
    Decode,
    Ignore,
}

/// Entities written by a merge.
///
/// The identity cache only holds weak references, so whatever a fetch
/// populates lives exactly as long as someone keeps it. A `Touched` keeps
/// every user, story, and list a merge wrote to.
#[derive(Debug, Default)]
pub struct Touched {
    users: Vec<Arc<User>>,
    stories: Vec<Arc<Story>>,
    lists: Vec<Arc<List>>,
}

impl Touched {
    pub fn users(&self) -> &[Arc<User>] {
        &self.users
    }

    pub fn stories(&self) -> &[Arc<Story>] {
        &self.stories
    }

    pub fn lists(&self) -> &[Arc<List>] {
        &self.lists
    }

    pub fn len(&self) -> usize {
        self.users.len() + self.stories.len() + self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Applies decoded payloads to entities resolved through an [`IdentityCache`].
pub struct MergeEngine<'a> {
    cache: &'a IdentityCache,
    schema: &'a dyn SchemaSource,
}

impl<'a> MergeEngine<'a> {
    pub fn new(cache: &'a IdentityCache, schema: &'a dyn SchemaSource) -> Self {
        Self { cache, schema }
    }

    /// Merges a user payload into `user`. Returns how many fields were
    /// written. A `username` in the payload is ignored: identity is the key.
    pub fn apply_user(&self, user: &User, payload: Value) -> ClientResult<usize> {
        let mut map = object(EntityKind::User, payload)?;
        map.remove(EntityKind::User.key_field());
        Ok(user.merge_fields(self.split(EntityKind::User, map).fields))
    }

    /// Merges a story payload into `story`, resolving its author.
    pub fn apply_story(&self, story: &Story, payload: Value) -> ClientResult<Touched> {
        let patch = self.decode_story_for(story.key(), payload, Author::Decode)?;
        let mut touched = Touched::default();
        self.commit_story_into(story, patch, &mut touched);
        Ok(touched)
    }

    /// Merges a list payload into `list`, resolving its stories.
    pub fn apply_list(&self, list: &List, payload: Value) -> ClientResult<Touched> {
        let mut map = object(EntityKind::List, payload)?;
        map.remove(EntityKind::List.key_field());
        let patch = self.decode_list_body(list.key().clone(), map)?;
        let mut touched = Touched::default();
        self.commit_list_into(list, patch, &mut touched);
        Ok(touched)
    }

    /// Resolves the user a payload identifies and merges the payload into it.
    pub fn resolve_user(&self, payload: Value) -> ClientResult<Arc<User>> {
        let patch = self.decode_user(payload)?;
        let mut touched = Touched::default();
        Ok(self.commit_user(patch, &mut touched))
    }

    // ── decoding ─────────────────────────────────────────────────

    fn split(&self, kind: EntityKind, map: Fields) -> Partial {
        Partial::split(self.schema, kind, map)
    }

    pub(crate) fn decode_user(&self, payload: Value) -> ClientResult<UserPatch> {
        let mut map = object(EntityKind::User, payload)?;
        let key = UserKey::from_json(&take_key(EntityKind::User, &mut map)?)?;
        let fields = self.split(EntityKind::User, map).fields;
        Ok(UserPatch { key, fields })
    }

    pub(crate) fn decode_story(&self, payload: Value, author: Author) -> ClientResult<StoryPatch> {
        let mut map = object(EntityKind::Story, payload)?;
        let key = StoryKey::from_json(&take_key(EntityKind::Story, &mut map)?)?;
        self.decode_story_body(key, map, author)
    }

    /// Decodes a story payload whose key is already known; any `id` it
    /// carries is dropped.
    pub(crate) fn decode_story_for(
        &self,
        key: &StoryKey,
        payload: Value,
        author: Author,
    ) -> ClientResult<StoryPatch> {
        let mut map = object(EntityKind::Story, payload)?;
        map.remove(EntityKind::Story.key_field());
        self.decode_story_body(key.clone(), map, author)
    }

    fn decode_story_body(&self, key: StoryKey, map: Fields, author: Author) -> ClientResult<StoryPatch> {
        let mut partial = self.split(EntityKind::Story, map);
        let author = match (author, partial.take_link("user")) {
            (Author::Decode, Some(link)) if !link.payload.is_null() => Some(self.decode_user(link.payload)?),
            _ => None,
        };
        Ok(StoryPatch {
            key,
            fields: partial.fields,
            author,
        })
    }

    pub(crate) fn decode_list(&self, payload: Value) -> ClientResult<ListPatch> {
        let mut map = object(EntityKind::List, payload)?;
        let key = ListKey::from_json(&take_key(EntityKind::List, &mut map)?)?;
        self.decode_list_body(key, map)
    }

    fn decode_list_body(&self, key: ListKey, map: Fields) -> ClientResult<ListPatch> {
        let mut partial = self.split(EntityKind::List, map);
        let stories = match partial.take_link("stories").map(|l| l.payload) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| self.decode_story(item, Author::Decode))
                .collect::<ClientResult<_>>()?,
            Some(other) => {
                return Err(ClientError::Decode(format!(
                    "list {key} has non-array stories: {}",
                    json_type(&other)
                )));
            }
        };
        Ok(ListPatch {
            key,
            fields: partial.fields,
            stories,
        })
    }

    // ── committing ───────────────────────────────────────────────

    pub(crate) fn commit_user(&self, patch: UserPatch, touched: &mut Touched) -> Arc<User> {
        let user = self.cache.user(&patch.key);
        user.merge_fields(patch.fields);
        touched.users.push(Arc::clone(&user));
        user
    }

    pub(crate) fn commit_story(&self, patch: StoryPatch, touched: &mut Touched) -> Arc<Story> {
        let story = self.cache.story(&patch.key);
        self.commit_story_into(&story, patch, touched);
        touched.stories.push(Arc::clone(&story));
        story
    }

    fn commit_story_into(&self, story: &Story, patch: StoryPatch, touched: &mut Touched) {
        story.merge_fields(patch.fields);
        if let Some(author) = patch.author {
            let author = self.commit_user(author, touched);
            story.set_author(author.key().clone());
        }
    }

    /// Commits a list under `owner`, creating it if needed and re-pointing
    /// its owner otherwise.
    pub(crate) fn commit_list(&self, owner: &UserKey, patch: ListPatch, touched: &mut Touched) -> Arc<List> {
        let list = self.cache.list(&patch.key, owner);
        list.set_owner(owner.clone());
        self.commit_list_into(&list, patch, touched);
        touched.lists.push(Arc::clone(&list));
        list
    }

    fn commit_list_into(&self, list: &List, patch: ListPatch, touched: &mut Touched) {
        list.merge_fields(patch.fields);
        let keys: Vec<StoryKey> = patch
            .stories
            .into_iter()
            .map(|story| self.commit_story(story, touched).key().clone())
            .collect();
        list.add_stories(keys);
    }
}

/// Extracts the array a collection endpoint wraps its items in.
pub(crate) fn collection(raw: &Value, name: &str) -> ClientResult<Vec<Value>> {
    match raw.get(name) {
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(other) => Err(ClientError::Decode(format!(
            "expected {name:?} to be an array, got {}",
            json_type(other)
        ))),
        None => Err(ClientError::Decode(format!("response has no {name:?} collection"))),
    }
}

fn object(kind: EntityKind, payload: Value) -> ClientResult<Fields> {
    match payload {
        Value::Object(map) => Ok(map),
        other => Err(ClientError::Decode(format!(
            "expected a {kind} object, got {}",
            json_type(&other)
        ))),
    }
}

fn take_key(kind: EntityKind, map: &mut Fields) -> ClientResult<Value> {
    let field = kind.key_field();
    map.remove(field)
        .ok_or_else(|| ClientError::Decode(format!("{kind} payload has no {field:?}")))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
