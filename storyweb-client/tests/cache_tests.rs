mod common;

use common::MockTransport;
use futures::future::join_all;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use storyweb_client::{Entity, IdentityCache};
use storyweb_types::{EntityKind, ListKey, StoryKey, UserKey};

fn user_key(name: &str) -> UserKey {
    UserKey::new(name).unwrap()
}

fn seed(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

// ── Identity ─────────────────────────────────────────────────────

#[test]
fn same_key_yields_same_instance() {
    let cache = IdentityCache::new();
    let a = cache.user(&user_key("alice"));
    let b = cache.user(&user_key("alice"));
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn lookups_are_case_insensitive() {
    let session = common::session(&MockTransport::new());
    let a = session.user("Alice").unwrap();
    let b = session.user("ALICE").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.username(), "alice");

    let s1 = session.story("AbC123").unwrap();
    let s2 = session.story("abc123").unwrap();
    assert!(Arc::ptr_eq(&s1, &s2));
}

#[test]
fn kinds_do_not_share_keys() {
    let cache = IdentityCache::new();
    let _story = cache.story(&StoryKey::new("42").unwrap());
    let _list = cache.list(&ListKey::new("42").unwrap(), &user_key("alice"));
    assert_eq!(cache.live_count(EntityKind::Story), 1);
    assert_eq!(cache.live_count(EntityKind::List), 1);
    assert_eq!(cache.live_count(EntityKind::User), 0);
}

#[test]
fn sessions_have_isolated_caches() {
    let mock = MockTransport::new();
    let first = common::session(&mock);
    let second = common::session(&mock);
    let a = first.user("alice").unwrap();
    let b = second.user("alice").unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn invalid_keys_are_rejected() {
    let session = common::session(&MockTransport::new());
    assert!(session.user("").is_err());
    assert!(session.story("a/b").is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_lookups_yield_one_instance() {
    let cache = Arc::new(IdentityCache::new());
    let tasks = (0..32).map(|i| {
        let cache = Arc::clone(&cache);
        let name = if i % 2 == 0 { "Alice" } else { "alice" };
        tokio::spawn(async move { cache.user(&user_key(name)) })
    });

    let users: Vec<_> = join_all(tasks).await.into_iter().map(Result::unwrap).collect();
    assert!(users.iter().all(|u| Arc::ptr_eq(u, &users[0])));
    assert_eq!(cache.live_count(EntityKind::User), 1);
}

// ── Seeds ────────────────────────────────────────────────────────

#[test]
fn seed_applies_only_on_creation() {
    let cache = IdentityCache::new();
    let key = user_key("alice");
    let first = cache.user_with(&key, seed(json!({"name": "Alice"})));
    let second = cache.user_with(&key, seed(json!({"name": "Someone Else"})));
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.name().as_deref(), Some("Alice"));
}

#[test]
fn list_owner_is_recorded_on_creation() {
    let cache = IdentityCache::new();
    let key = ListKey::from(7u64);
    let list = cache.list(&key, &user_key("alice"));
    let again = cache.list(&key, &user_key("bob"));
    assert!(Arc::ptr_eq(&list, &again));
    assert_eq!(again.owner_key(), user_key("alice"));
}

// ── Reclamation ──────────────────────────────────────────────────

#[test]
fn dropped_entities_are_reclaimed() {
    let cache = IdentityCache::new();
    let key = user_key("alice");
    {
        let user = cache.user_with(&key, seed(json!({"name": "Alice"})));
        assert_eq!(user.key(), &key);
        assert_eq!(cache.live_count(EntityKind::User), 1);
    }
    assert_eq!(cache.live_count(EntityKind::User), 0);
    assert!(cache.get_user(&key).is_none());
}

#[test]
fn reclaimed_key_is_resynthesized_empty() {
    let cache = IdentityCache::new();
    let key = StoryKey::new("abc123").unwrap();
    drop(cache.story_with(&key, seed(json!({"title": "Old"}))));

    let fresh = cache.story(&key);
    assert_eq!(fresh.title(), None);
    assert!(fresh.data().is_empty());
}

#[test]
fn get_does_not_create() {
    let cache = IdentityCache::new();
    assert!(cache.get_story(&StoryKey::new("nope").unwrap()).is_none());
    assert_eq!(cache.live_count(EntityKind::Story), 0);
}

#[test]
fn purge_drops_dead_entries_only() {
    let cache = IdentityCache::new();
    let keep = cache.user(&user_key("alice"));
    drop(cache.user(&user_key("bob")));
    drop(cache.story(&StoryKey::new("s1").unwrap()));

    assert_eq!(cache.purge(), 2);
    assert_eq!(cache.purge(), 0);
    assert!(Arc::ptr_eq(&keep, &cache.get_user(&user_key("alice")).unwrap()));
}

#[test]
fn churned_keys_do_not_accumulate() {
    let cache = IdentityCache::new();
    for i in 0..10_000 {
        drop(cache.user(&user_key(&format!("reader{i}"))));
    }

    assert_eq!(cache.live_count(EntityKind::User), 0);
    assert!(cache.tracked_count(EntityKind::User) <= 64);
    assert!(cache.purge() <= 64);
}

#[test]
fn insert_sweep_keeps_live_entries() {
    let cache = IdentityCache::new();
    let kept: Vec<_> = (0..100)
        .map(|i| cache.user(&user_key(&format!("keep{i}"))))
        .collect();
    for i in 0..5_000 {
        drop(cache.user(&user_key(&format!("gone{i}"))));
    }

    assert_eq!(cache.live_count(EntityKind::User), 100);
    assert!(cache.tracked_count(EntityKind::User) <= 200);
    for user in &kept {
        assert!(Arc::ptr_eq(user, &cache.get_user(user.key()).unwrap()));
    }
}
