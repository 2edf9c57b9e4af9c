use serde::Serialize;
use storyweb_types::EntityKind;

/// The shape of a declared field.
///
/// Only entity-valued fields are *compound*: asking for them with `true`
/// expands to the nested kind's full schema. Value-typed fields carry their
/// own field list but are requested as opaque scalars unless the caller
/// spells out a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldShape {
    Scalar,
    Value(ValueType),
    Entity(EntityKind),
    Entities(EntityKind),
}

impl FieldShape {
    /// Whether a `true` selection for this field expands to a nested schema.
    #[must_use]
    pub const fn is_compound(self) -> bool {
        matches!(self, FieldShape::Entity(_) | FieldShape::Entities(_))
    }

    /// The nested entity kind, for compound fields.
    #[must_use]
    pub const fn nested_kind(self) -> Option<EntityKind> {
        match self {
            FieldShape::Entity(kind) | FieldShape::Entities(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Value types embedded in entity payloads. They have no identity and are
/// always replaced wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Part,
    Language,
    TagRanking,
    PublishedPart,
    Inbox,
    Notifications,
    ConnectedServices,
}

impl ValueType {
    /// Declared fields of this value type, in wire order.
    #[must_use]
    pub const fn fields(self) -> &'static [FieldSpec] {
        match self {
            ValueType::Part => PART_FIELDS,
            ValueType::Language => LANGUAGE_FIELDS,
            ValueType::TagRanking => TAG_RANKING_FIELDS,
            ValueType::PublishedPart => PUBLISHED_PART_FIELDS,
            ValueType::Inbox => INBOX_FIELDS,
            ValueType::Notifications => NOTIFICATIONS_FIELDS,
            ValueType::ConnectedServices => CONNECTED_SERVICES_FIELDS,
        }
    }
}

/// A declared field: its wire name (alias), the internal attribute name it
/// is stored under, and its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub wire: &'static str,
    pub name: &'static str,
    pub shape: FieldShape,
}

impl FieldSpec {
    /// A scalar field whose wire name and internal name agree.
    pub const fn scalar(name: &'static str) -> Self {
        Self { wire: name, name, shape: FieldShape::Scalar }
    }

    /// A scalar field with a wire alias.
    pub const fn aliased(wire: &'static str, name: &'static str) -> Self {
        Self { wire, name, shape: FieldShape::Scalar }
    }

    /// A field holding a value type (or a list of them).
    pub const fn value(wire: &'static str, name: &'static str, value: ValueType) -> Self {
        Self { wire, name, shape: FieldShape::Value(value) }
    }

    /// A field holding a single nested entity.
    pub const fn entity(name: &'static str, kind: EntityKind) -> Self {
        Self { wire: name, name, shape: FieldShape::Entity(kind) }
    }

    /// A field holding a collection of nested entities.
    pub const fn entities(name: &'static str, kind: EntityKind) -> Self {
        Self { wire: name, name, shape: FieldShape::Entities(kind) }
    }
}

/// Source of "known fields per entity kind".
///
/// The built-in [`Registry`] mirrors the remote API's declared models.
/// Tests and embedders can supply their own table.
pub trait SchemaSource: Send + Sync {
    /// Ordered declared fields for `kind`.
    fn fields(&self, kind: EntityKind) -> &[FieldSpec];

    /// Looks up a field by its wire name.
    fn by_wire(&self, kind: EntityKind, wire: &str) -> Option<&FieldSpec> {
        self.fields(kind).iter().find(|f| f.wire == wire)
    }

    /// Translates a wire name to the internal attribute name. Unknown names
    /// pass through unchanged; the local schema is not authoritative.
    fn internal_name<'a>(&'a self, kind: EntityKind, wire: &'a str) -> &'a str {
        self.by_wire(kind, wire).map_or(wire, |f| f.name)
    }
}

/// The static schema registry for the remote API.
#[derive(Debug, Clone, Copy, Default)]
pub struct Registry;

impl SchemaSource for Registry {
    fn fields(&self, kind: EntityKind) -> &[FieldSpec] {
        match kind {
            EntityKind::User => USER_FIELDS,
            EntityKind::Story => STORY_FIELDS,
            EntityKind::List => LIST_FIELDS,
        }
    }
}

const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::scalar("username"),
    FieldSpec::scalar("avatar"),
    FieldSpec::aliased("isPrivate", "is_private"),
    FieldSpec::aliased("backgroundUrl", "background_url"),
    FieldSpec::scalar("follower"),
    FieldSpec::scalar("following"),
    FieldSpec::scalar("name"),
    FieldSpec::scalar("description"),
    FieldSpec::scalar("status"),
    FieldSpec::scalar("gender"),
    FieldSpec::aliased("genderCode", "gender_code"),
    FieldSpec::scalar("language"),
    FieldSpec::scalar("locale"),
    FieldSpec::aliased("createDate", "create_date"),
    FieldSpec::aliased("modifyDate", "modify_date"),
    FieldSpec::scalar("location"),
    FieldSpec::scalar("verified"),
    FieldSpec::scalar("ambassador"),
    FieldSpec::scalar("facebook"),
    FieldSpec::scalar("twitter"),
    FieldSpec::scalar("website"),
    FieldSpec::scalar("lulu"),
    FieldSpec::scalar("smashwords"),
    FieldSpec::scalar("bubok"),
    FieldSpec::aliased("votesReceived", "votes_received"),
    FieldSpec::aliased("numStoriesPublished", "num_stories_published"),
    FieldSpec::aliased("numFollowing", "num_following"),
    FieldSpec::aliased("numFollowers", "num_followers"),
    FieldSpec::aliased("numMessages", "num_messages"),
    FieldSpec::aliased("numLists", "num_lists"),
    FieldSpec::scalar("verified_email"),
    FieldSpec::scalar("preferred_categories"),
    FieldSpec::aliased("allowCrawler", "allow_crawler"),
    FieldSpec::scalar("deeplink"),
    FieldSpec::aliased("isMuted", "is_muted"),
    FieldSpec::scalar("birthdate"),
    FieldSpec::value("inbox", "inbox", ValueType::Inbox),
    FieldSpec::value("notifications", "notifications", ValueType::Notifications),
    FieldSpec::value("connectedServices", "connected_services", ValueType::ConnectedServices),
    FieldSpec::scalar("age"),
    FieldSpec::scalar("email"),
    FieldSpec::scalar("has_password"),
];

const STORY_FIELDS: &[FieldSpec] = &[
    FieldSpec::scalar("id"),
    FieldSpec::scalar("title"),
    FieldSpec::aliased("createDate", "create_date"),
    FieldSpec::aliased("modifyDate", "modify_date"),
    FieldSpec::aliased("voteCount", "vote_count"),
    FieldSpec::aliased("readCount", "read_count"),
    FieldSpec::aliased("commentCount", "comment_count"),
    FieldSpec::scalar("description"),
    FieldSpec::scalar("completed"),
    FieldSpec::scalar("tags"),
    FieldSpec::scalar("rating"),
    FieldSpec::scalar("mature"),
    FieldSpec::scalar("url"),
    FieldSpec::aliased("isPaywalled", "is_paywalled"),
    FieldSpec::scalar("cover"),
    FieldSpec::scalar("cover_timestamp"),
    FieldSpec::scalar("categories"),
    FieldSpec::scalar("copyright"),
    FieldSpec::aliased("firstPartId", "first_part_id"),
    FieldSpec::aliased("numParts", "num_parts"),
    FieldSpec::scalar("deleted"),
    FieldSpec::value("firstPublishedPart", "first_published_part", ValueType::PublishedPart),
    FieldSpec::value("lastPublishedPart", "last_published_part", ValueType::PublishedPart),
    FieldSpec::value("language", "language", ValueType::Language),
    FieldSpec::entity("user", EntityKind::User),
    FieldSpec::value("parts", "parts", ValueType::Part),
    FieldSpec::value("tagRankings", "tag_rankings", ValueType::TagRanking),
];

const LIST_FIELDS: &[FieldSpec] = &[
    FieldSpec::scalar("id"),
    FieldSpec::scalar("name"),
    FieldSpec::entities("stories", EntityKind::Story),
];

const PART_FIELDS: &[FieldSpec] = &[
    FieldSpec::scalar("id"),
    FieldSpec::scalar("title"),
    FieldSpec::scalar("url"),
    FieldSpec::aliased("modifyDate", "modify_date"),
    FieldSpec::aliased("createDate", "create_date"),
    FieldSpec::aliased("commentCount", "comment_count"),
    FieldSpec::aliased("voteCount", "vote_count"),
    FieldSpec::aliased("readCount", "read_count"),
];

const LANGUAGE_FIELDS: &[FieldSpec] = &[FieldSpec::scalar("id"), FieldSpec::scalar("name")];

const TAG_RANKING_FIELDS: &[FieldSpec] = &[
    FieldSpec::scalar("name"),
    FieldSpec::scalar("rank"),
    FieldSpec::scalar("total"),
];

const PUBLISHED_PART_FIELDS: &[FieldSpec] = &[
    FieldSpec::scalar("id"),
    FieldSpec::aliased("createDate", "create_date"),
];

const INBOX_FIELDS: &[FieldSpec] = &[FieldSpec::scalar("unread"), FieldSpec::scalar("total")];

const NOTIFICATIONS_FIELDS: &[FieldSpec] = &[FieldSpec::scalar("unread")];

const CONNECTED_SERVICES_FIELDS: &[FieldSpec] =
    &[FieldSpec::scalar("facebook"), FieldSpec::scalar("twitter")];
