//! Entity handles.
//!
//! A [`User`], [`Story`], or [`List`] is always obtained through the
//! [`IdentityCache`] and shared as `Arc<_>`, so two handles for the same key
//! are the same object. Relationships are stored as keys and resolved through
//! the cache on access; no entity owns another, so the follower/following and
//! author/story cycles never become ownership cycles.
//!
//! Mutation happens only inside the crate (the merge engine). Each entity's
//! state sits behind its own lock, which is never held while another
//! entity's lock is taken.

use crate::cache::IdentityCache;
use crate::error::ClientResult;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use storyweb_model::{FieldStore, Language, Part, StoryModel, TagRanking, UserModel};
use storyweb_types::{EntityKind, ListKey, StoryKey, UserKey};

/// Common surface of the three entity kinds.
pub trait Entity: Send + Sync + 'static {
    type Key: Clone + Eq + Hash + fmt::Display + Send + Sync;

    const KIND: EntityKind;

    fn key(&self) -> &Self::Key;

    /// A copy of every known plain field.
    fn data(&self) -> FieldStore;
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

// ── User ─────────────────────────────────────────────────────────

#[derive(Default)]
struct UserState {
    data: FieldStore,
    stories: Vec<StoryKey>,
    followers: BTreeSet<UserKey>,
    following: BTreeSet<UserKey>,
    lists: BTreeSet<ListKey>,
}

/// A user, unique per lowercased username.
pub struct User {
    key: UserKey,
    state: RwLock<UserState>,
}

impl User {
    pub(crate) fn new(key: UserKey, seed: Map<String, Value>) -> Self {
        let mut state = UserState::default();
        state.data.merge(seed);
        Self {
            key,
            state: RwLock::new(state),
        }
    }

    /// Lowercased username.
    pub fn username(&self) -> &str {
        self.key.as_str()
    }

    /// A known field by internal name.
    pub fn get(&self, name: &str) -> Option<Value> {
        read(&self.state).data.get(name).cloned()
    }

    /// Typed snapshot of every known field.
    pub fn model(&self) -> ClientResult<UserModel> {
        Ok(read(&self.state).data.snapshot()?)
    }

    pub fn name(&self) -> Option<String> {
        read(&self.state).data.get_str("name").map(str::to_string)
    }

    pub fn description(&self) -> Option<String> {
        read(&self.state).data.get_str("description").map(str::to_string)
    }

    pub fn avatar(&self) -> Option<String> {
        read(&self.state).data.get_str("avatar").map(str::to_string)
    }

    pub fn is_private(&self) -> Option<bool> {
        read(&self.state).data.get_bool("is_private")
    }

    pub fn num_followers(&self) -> Option<u64> {
        read(&self.state).data.get_u64("num_followers")
    }

    pub fn num_following(&self) -> Option<u64> {
        read(&self.state).data.get_u64("num_following")
    }

    pub fn num_stories_published(&self) -> Option<u64> {
        read(&self.state).data.get_u64("num_stories_published")
    }

    pub fn num_lists(&self) -> Option<u64> {
        read(&self.state).data.get_u64("num_lists")
    }

    /// Keys of users known to follow this user.
    pub fn follower_keys(&self) -> Vec<UserKey> {
        read(&self.state).followers.iter().cloned().collect()
    }

    /// Keys of users this user is known to follow.
    pub fn following_keys(&self) -> Vec<UserKey> {
        read(&self.state).following.iter().cloned().collect()
    }

    /// Keys of authored stories, in the order last fetched.
    pub fn story_keys(&self) -> Vec<StoryKey> {
        read(&self.state).stories.clone()
    }

    pub fn list_keys(&self) -> Vec<ListKey> {
        read(&self.state).lists.iter().cloned().collect()
    }

    pub fn is_followed_by(&self, key: &UserKey) -> bool {
        read(&self.state).followers.contains(key)
    }

    pub fn follows(&self, key: &UserKey) -> bool {
        read(&self.state).following.contains(key)
    }

    pub fn followers(&self, cache: &IdentityCache) -> Vec<Arc<User>> {
        self.follower_keys().iter().map(|k| cache.user(k)).collect()
    }

    pub fn following(&self, cache: &IdentityCache) -> Vec<Arc<User>> {
        self.following_keys().iter().map(|k| cache.user(k)).collect()
    }

    pub fn stories(&self, cache: &IdentityCache) -> Vec<Arc<Story>> {
        self.story_keys().iter().map(|k| cache.story(k)).collect()
    }

    pub fn lists(&self, cache: &IdentityCache) -> Vec<Arc<List>> {
        self.list_keys().iter().map(|k| cache.list(k, &self.key)).collect()
    }

    pub(crate) fn merge_fields(&self, fields: Map<String, Value>) -> usize {
        write(&self.state).data.merge(fields)
    }

    pub(crate) fn set_field(&self, name: &str, value: impl Into<Value>) {
        write(&self.state).data.set(name, value);
    }

    /// Adds followers, returning the new follower count.
    pub(crate) fn add_followers(&self, keys: impl IntoIterator<Item = UserKey>) -> usize {
        let mut state = write(&self.state);
        state.followers.extend(keys);
        state.followers.len()
    }

    /// Adds followed users, returning the new following count.
    pub(crate) fn add_following(&self, keys: impl IntoIterator<Item = UserKey>) -> usize {
        let mut state = write(&self.state);
        state.following.extend(keys);
        state.following.len()
    }

    pub(crate) fn set_stories(&self, keys: Vec<StoryKey>) -> usize {
        let mut state = write(&self.state);
        state.stories = keys;
        state.stories.len()
    }

    pub(crate) fn add_lists(&self, keys: impl IntoIterator<Item = ListKey>) -> usize {
        let mut state = write(&self.state);
        state.lists.extend(keys);
        state.lists.len()
    }
}

impl Entity for User {
    type Key = UserKey;

    const KIND: EntityKind = EntityKind::User;

    fn key(&self) -> &UserKey {
        &self.key
    }

    fn data(&self) -> FieldStore {
        read(&self.state).data.clone()
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("username", &self.key.as_str())
            .finish_non_exhaustive()
    }
}

// ── Story ────────────────────────────────────────────────────────

#[derive(Default)]
struct StoryState {
    data: FieldStore,
    user: Option<UserKey>,
    recommended: Vec<StoryKey>,
}

/// A story, unique per lowercased id.
pub struct Story {
    key: StoryKey,
    state: RwLock<StoryState>,
}

impl Story {
    pub(crate) fn new(key: StoryKey, seed: Map<String, Value>) -> Self {
        let mut state = StoryState::default();
        state.data.merge(seed);
        Self {
            key,
            state: RwLock::new(state),
        }
    }

    /// Lowercased story id.
    pub fn id(&self) -> &str {
        self.key.as_str()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        read(&self.state).data.get(name).cloned()
    }

    pub fn model(&self) -> ClientResult<StoryModel> {
        Ok(read(&self.state).data.snapshot()?)
    }

    pub fn title(&self) -> Option<String> {
        read(&self.state).data.get_str("title").map(str::to_string)
    }

    pub fn description(&self) -> Option<String> {
        read(&self.state).data.get_str("description").map(str::to_string)
    }

    pub fn tags(&self) -> Option<Vec<String>> {
        read(&self.state).data.decode("tags")
    }

    pub fn vote_count(&self) -> Option<u64> {
        read(&self.state).data.get_u64("vote_count")
    }

    pub fn read_count(&self) -> Option<u64> {
        read(&self.state).data.get_u64("read_count")
    }

    pub fn completed(&self) -> Option<bool> {
        read(&self.state).data.get_bool("completed")
    }

    pub fn mature(&self) -> Option<bool> {
        read(&self.state).data.get_bool("mature")
    }

    pub fn is_paywalled(&self) -> Option<bool> {
        read(&self.state).data.get_bool("is_paywalled")
    }

    pub fn language(&self) -> Option<Language> {
        read(&self.state).data.decode("language")
    }

    /// Parts as last fetched; replaced wholesale on every fetch that includes them.
    pub fn parts(&self) -> Option<Vec<Part>> {
        read(&self.state).data.decode("parts")
    }

    pub fn tag_rankings(&self) -> Option<Vec<TagRanking>> {
        read(&self.state).data.decode("tag_rankings")
    }

    pub fn author_key(&self) -> Option<UserKey> {
        read(&self.state).user.clone()
    }

    /// The author, resolved through the cache.
    pub fn author(&self, cache: &IdentityCache) -> Option<Arc<User>> {
        self.author_key().map(|k| cache.user(&k))
    }

    pub fn recommended_keys(&self) -> Vec<StoryKey> {
        read(&self.state).recommended.clone()
    }

    pub fn recommended(&self, cache: &IdentityCache) -> Vec<Arc<Story>> {
        self.recommended_keys().iter().map(|k| cache.story(k)).collect()
    }

    pub(crate) fn merge_fields(&self, fields: Map<String, Value>) -> usize {
        write(&self.state).data.merge(fields)
    }

    pub(crate) fn set_author(&self, key: UserKey) {
        write(&self.state).user = Some(key);
    }

    pub(crate) fn set_recommended(&self, keys: Vec<StoryKey>) {
        write(&self.state).recommended = keys;
    }
}

impl Entity for Story {
    type Key = StoryKey;

    const KIND: EntityKind = EntityKind::Story;

    fn key(&self) -> &StoryKey {
        &self.key
    }

    fn data(&self) -> FieldStore {
        read(&self.state).data.clone()
    }
}

impl fmt::Debug for Story {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Story")
            .field("id", &self.key.as_str())
            .finish_non_exhaustive()
    }
}

// ── List ─────────────────────────────────────────────────────────

struct ListState {
    data: FieldStore,
    user: UserKey,
    stories: BTreeSet<StoryKey>,
}

/// A user's reading list.
pub struct List {
    key: ListKey,
    state: RwLock<ListState>,
}

impl List {
    pub(crate) fn new(key: ListKey, owner: UserKey) -> Self {
        Self {
            key,
            state: RwLock::new(ListState {
                data: FieldStore::new(),
                user: owner,
                stories: BTreeSet::new(),
            }),
        }
    }

    pub fn id(&self) -> &str {
        self.key.as_str()
    }

    pub fn name(&self) -> Option<String> {
        read(&self.state).data.get_str("name").map(str::to_string)
    }

    pub fn owner_key(&self) -> UserKey {
        read(&self.state).user.clone()
    }

    pub fn owner(&self, cache: &IdentityCache) -> Arc<User> {
        cache.user(&self.owner_key())
    }

    pub fn story_keys(&self) -> Vec<StoryKey> {
        read(&self.state).stories.iter().cloned().collect()
    }

    pub fn stories(&self, cache: &IdentityCache) -> Vec<Arc<Story>> {
        self.story_keys().iter().map(|k| cache.story(k)).collect()
    }

    pub(crate) fn merge_fields(&self, fields: Map<String, Value>) -> usize {
        write(&self.state).data.merge(fields)
    }

    pub(crate) fn set_owner(&self, key: UserKey) {
        write(&self.state).user = key;
    }

    pub(crate) fn add_stories(&self, keys: impl IntoIterator<Item = StoryKey>) -> usize {
        let mut state = write(&self.state);
        state.stories.extend(keys);
        state.stories.len()
    }
}

impl Entity for List {
    type Key = ListKey;

    const KIND: EntityKind = EntityKind::List;

    fn key(&self) -> &ListKey {
        &self.key
    }

    fn data(&self) -> FieldStore {
        read(&self.state).data.clone()
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("id", &self.key.as_str())
            .finish_non_exhaustive()
    }
}
