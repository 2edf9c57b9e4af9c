//! Field selection and request building for storyweb.
//!
//! Turns "which fields do I want" into the API's recursive selection
//! grammar:
//!
//! ```
//! use storyweb_model::Registry;
//! use storyweb_query::{FieldSelection, Include};
//! use storyweb_types::EntityKind;
//!
//! let include = Include::fields([
//!     ("tags", Include::All),
//!     ("id", Include::All),
//!     ("parts", Include::only(["id"])),
//!     ("tagRankings", Include::All),
//! ]);
//! let selection = FieldSelection::resolve(&Registry, EntityKind::Story, &include).unwrap();
//! assert_eq!(selection.to_query(), "tags,id,parts(id),tagRankings");
//! ```

mod error;
mod selection;
mod url;

pub use error::{QueryError, QueryResult};
pub use selection::{FieldSelection, Include, Selection};
pub use url::{Convention, RequestUrl};
