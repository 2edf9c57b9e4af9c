use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{Map, Value, json};
use storyweb_model::{FieldStore, Language, Part, Partial, Registry, StoryModel, UserModel};
use storyweb_types::EntityKind;

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

// ── Partial::split ───────────────────────────────────────────────

#[test]
fn split_translates_aliases() {
    let partial = Partial::split(
        &Registry,
        EntityKind::User,
        object(json!({"numFollowers": 12, "name": "Alice"})),
    );
    assert_eq!(partial.fields["num_followers"], 12);
    assert_eq!(partial.fields["name"], "Alice");
    assert!(partial.links.is_empty());
}

#[test]
fn split_lifts_entity_fields_into_links() {
    let mut partial = Partial::split(
        &Registry,
        EntityKind::Story,
        object(json!({
            "title": "Night",
            "user": {"username": "SomeAuthor", "name": "S"},
            "parts": [{"id": 1}]
        })),
    );
    assert!(!partial.fields.contains_key("user"));
    assert_eq!(partial.fields["parts"], json!([{"id": 1}]));

    let link = partial.take_link("user").unwrap();
    assert_eq!(link.kind, EntityKind::User);
    assert!(!link.many);
    assert_eq!(link.payload["username"], "SomeAuthor");
    assert!(partial.take_link("user").is_none());
}

#[test]
fn split_marks_collections() {
    let partial = Partial::split(
        &Registry,
        EntityKind::List,
        object(json!({"id": 7, "stories": [{"id": "a"}]})),
    );
    assert_eq!(partial.links.len(), 1);
    assert!(partial.links[0].many);
    assert_eq!(partial.links[0].kind, EntityKind::Story);
}

#[test]
fn split_keeps_unknown_keys() {
    let partial = Partial::split(&Registry, EntityKind::User, object(json!({"highlight_colour": "#fff"})));
    assert_eq!(partial.fields["highlight_colour"], "#fff");
}

// ── FieldStore merge ─────────────────────────────────────────────

#[test]
fn merge_is_additive() {
    let mut store = FieldStore::new();
    store.merge(object(json!({"a": 1})));
    store.merge(object(json!({"b": 2})));
    assert_eq!(store.get_u64("a"), Some(1));
    assert_eq!(store.get_u64("b"), Some(2));
}

#[test]
fn merge_overwrites_present_fields() {
    let mut store = FieldStore::new();
    store.merge(object(json!({"a": 1})));
    store.merge(object(json!({"a": 2})));
    assert_eq!(store.get_u64("a"), Some(2));
}

#[test]
fn merge_overwrites_with_empty_values() {
    let mut store = FieldStore::new();
    store.merge(object(json!({"description": "long bio", "tags": ["x"], "mature": true})));
    store.merge(object(json!({"description": "", "tags": [], "mature": null})));
    assert_eq!(store.get_str("description"), Some(""));
    assert_eq!(store.get("tags"), Some(&json!([])));
    assert!(store.contains("mature"));
    assert_eq!(store.get_bool("mature"), None);
}

#[test]
fn merge_reports_written_count() {
    let mut store = FieldStore::new();
    assert_eq!(store.merge(object(json!({"a": 1, "b": 2}))), 2);
    assert_eq!(store.len(), 2);
    assert!(!store.is_empty());
}

// ── Typed access ─────────────────────────────────────────────────

#[test]
fn decode_value_types() {
    let mut store = FieldStore::new();
    store.merge(object(json!({
        "language": {"id": 1, "name": "English"},
        "parts": [{"id": 10, "title": "One", "voteCount": 3}, {"id": 11}]
    })));

    let language: Language = store.decode("language").unwrap();
    assert_eq!(language.name.as_deref(), Some("English"));

    let parts: Vec<Part> = store.decode("parts").unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].vote_count, Some(3));
    assert_eq!(parts[1].title, None);
}

#[test]
fn decode_null_is_none() {
    let mut store = FieldStore::new();
    store.set("language", Value::Null);
    assert_eq!(store.decode::<Language>("language"), None);
}

#[test]
fn user_snapshot_from_translated_fields() {
    let partial = Partial::split(
        &Registry,
        EntityKind::User,
        object(json!({
            "name": "Alice",
            "numFollowers": 4,
            "isPrivate": false,
            "inbox": {"unread": 2, "total": 9}
        })),
    );
    let mut store = FieldStore::new();
    store.merge(partial.fields);

    let model: UserModel = store.snapshot().unwrap();
    assert_eq!(model.name.as_deref(), Some("Alice"));
    assert_eq!(model.num_followers, Some(4));
    assert_eq!(model.is_private, Some(false));
    assert_eq!(model.inbox.unwrap().total, Some(9));
    assert_eq!(model.description, None);
}

#[test]
fn story_snapshot_ignores_unknown_fields() {
    let mut store = FieldStore::new();
    store.merge(object(json!({"title": "T", "tag_rankings": [{"name": "x", "rank": 1}], "brand_new": 1})));
    let model: StoryModel = store.snapshot().unwrap();
    assert_eq!(model.title.as_deref(), Some("T"));
    assert_eq!(model.tag_rankings.unwrap()[0].rank, Some(1));
}

proptest! {
    #[test]
    fn disjoint_merges_commute(a in 0u64..1000, b in 0u64..1000) {
        let mut left = FieldStore::new();
        left.merge(object(json!({"a": a})));
        left.merge(object(json!({"b": b})));

        let mut right = FieldStore::new();
        right.merge(object(json!({"b": b})));
        right.merge(object(json!({"a": a})));

        prop_assert_eq!(left, right);
    }

    #[test]
    fn merge_is_idempotent(a in 0u64..1000, s in "[a-z]{0,8}") {
        let payload = object(json!({"a": a, "s": s}));
        let mut once = FieldStore::new();
        once.merge(payload.clone());
        let mut twice = once.clone();
        twice.merge(payload);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn last_overlapping_write_wins(first in 0u64..1000, second in 0u64..1000) {
        let mut store = FieldStore::new();
        store.merge(object(json!({"a": first})));
        store.merge(object(json!({"a": second})));
        prop_assert_eq!(store.get_u64("a"), Some(second));
    }
}
