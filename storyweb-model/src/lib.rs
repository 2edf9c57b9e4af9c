//! Entity model for storyweb.
//!
//! Defines what the client knows about each entity kind, independent of the
//! network and of identity:
//! - [`Registry`] — the static schema: ordered wire fields per kind, their
//!   internal names, and which of them nest another entity
//! - [`FieldStore`] — the per-entity map of known fields with last-writer-wins
//!   per-field merge
//! - [`Partial`] — a decoded payload split into plain fields and entity links
//! - value types ([`Part`], [`Language`], ...) and typed snapshots
//!   ([`UserModel`], [`StoryModel`])

mod models;
mod schema;
mod store;
mod values;

pub use models::{StoryModel, UserModel};
pub use schema::{FieldShape, FieldSpec, Registry, SchemaSource, ValueType};
pub use store::{FieldStore, Link, Partial};
pub use values::{ConnectedServices, Inbox, Language, Notifications, Part, PublishedPart, TagRanking};
