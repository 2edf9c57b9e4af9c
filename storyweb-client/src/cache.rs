//! Identity cache.
//!
//! One registry per entity kind maps a normalized key to the single live
//! instance for that key. The registry holds [`Weak`] references only:
//! callers own the entities, and once every caller has let go the entry is
//! dead. The next lookup for that key builds a fresh, empty entity.
//!
//! The registry mutex is held only for the check-and-insert, never across a
//! network call or a merge.

use crate::entity::{Entity, List, Story, User};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use storyweb_types::{EntityKind, ListKey, StoryKey, UserKey};
use tracing::trace;

/// Dead entries a registry may accumulate before the insert path sweeps.
const MIN_SWEEP: usize = 64;

struct Entries<E: Entity> {
    map: HashMap<E::Key, Weak<E>>,
    // Map size at which the next insert sweeps dead entries.
    sweep_at: usize,
}

impl<E: Entity> Entries<E> {
    fn sweep(&mut self) -> usize {
        let before = self.map.len();
        self.map.retain(|_, w| w.strong_count() > 0);
        self.sweep_at = (self.map.len() * 2).max(MIN_SWEEP);
        before - self.map.len()
    }
}

/// The live entities of one kind.
pub struct KindRegistry<E: Entity> {
    entries: Mutex<Entries<E>>,
}

impl<E: Entity> Default for KindRegistry<E> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                sweep_at: MIN_SWEEP,
            }),
        }
    }
}

impl<E: Entity> KindRegistry<E> {
    /// Returns the live entity for `key`, or registers the one built by
    /// `make`. `make` runs only on a miss, under the registry lock, so it
    /// must not block.
    ///
    /// Entries whose entity was dropped are swept here once the map reaches
    /// twice its last live size, so the map stays proportional to the live set.
    pub fn get_or_create(&self, key: &E::Key, make: impl FnOnce() -> E) -> Arc<E> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(live) = entries.map.get(key).and_then(Weak::upgrade) {
            return live;
        }

        let created = Arc::new(make());
        debug_assert!(
            created.key() == key,
            "{} constructor produced a different key",
            E::KIND
        );
        if entries.map.insert(key.clone(), Arc::downgrade(&created)).is_some() {
            trace!("re-synthesized reclaimed {} entry", E::KIND);
        }
        if entries.map.len() >= entries.sweep_at {
            let swept = entries.sweep();
            trace!("swept {} dead {} entries", swept, E::KIND);
        }
        created
    }

    /// Returns the live entity for `key` without creating one.
    pub fn get(&self, key: &E::Key) -> Option<Arc<E>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.map.get(key).and_then(Weak::upgrade)
    }

    /// Number of entities that are still owned somewhere.
    pub fn live_count(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.map.values().filter(|w| w.strong_count() > 0).count()
    }

    /// Number of keys tracked, including ones whose entity is gone but has
    /// not been swept yet.
    pub fn tracked_count(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.map.len()
    }

    /// Removes entries whose entity has been dropped. Returns how many.
    pub fn purge(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.sweep()
    }
}

/// The identity cache: one [`KindRegistry`] per entity kind.
///
/// Owned by a [`Session`](crate::Session); independent sessions never share
/// entities.
#[derive(Default)]
pub struct IdentityCache {
    users: KindRegistry<User>,
    stories: KindRegistry<Story>,
    lists: KindRegistry<List>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user for `key`, created empty on a miss.
    pub fn user(&self, key: &UserKey) -> Arc<User> {
        self.user_with(key, Map::new())
    }

    /// The user for `key`. `seed` fields are applied only if the user is
    /// created here; an existing user keeps its data.
    pub fn user_with(&self, key: &UserKey, seed: Map<String, Value>) -> Arc<User> {
        self.users.get_or_create(key, || User::new(key.clone(), seed))
    }

    pub fn story(&self, key: &StoryKey) -> Arc<Story> {
        self.story_with(key, Map::new())
    }

    /// The story for `key`; `seed` applies only on creation.
    pub fn story_with(&self, key: &StoryKey, seed: Map<String, Value>) -> Arc<Story> {
        self.stories.get_or_create(key, || Story::new(key.clone(), seed))
    }

    /// The list for `key`. `owner` is recorded only if the list is created here.
    pub fn list(&self, key: &ListKey, owner: &UserKey) -> Arc<List> {
        self.lists.get_or_create(key, || List::new(key.clone(), owner.clone()))
    }

    pub fn get_user(&self, key: &UserKey) -> Option<Arc<User>> {
        self.users.get(key)
    }

    pub fn get_story(&self, key: &StoryKey) -> Option<Arc<Story>> {
        self.stories.get(key)
    }

    pub fn get_list(&self, key: &ListKey) -> Option<Arc<List>> {
        self.lists.get(key)
    }

    /// Live entity count for one kind.
    pub fn live_count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::User => self.users.live_count(),
            EntityKind::Story => self.stories.live_count(),
            EntityKind::List => self.lists.live_count(),
        }
    }

    /// Keys tracked for `kind`, dead or alive.
    pub fn tracked_count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::User => self.users.tracked_count(),
            EntityKind::Story => self.stories.tracked_count(),
            EntityKind::List => self.lists.tracked_count(),
        }
    }

    /// Drops dead entries across all kinds. Returns how many were removed.
    pub fn purge(&self) -> usize {
        self.users.purge() + self.stories.purge() + self.lists.purge()
    }
}
