//! Identity-mapped client for the Wattpad REST API.
//!
//! A [`Session`] owns an [`IdentityCache`], a [`Transport`], and the schema.
//! Entity handles ([`User`], [`Story`], [`List`]) come from the session and
//! are unique per key: fetching the same user through two different
//! endpoints fills in the same object.
//!
//! ```no_run
//! use storyweb_client::{ClientConfig, Entity, Session};
//! use storyweb_query::Include;
//!
//! # async fn run() -> storyweb_client::ClientResult<()> {
//! let session = Session::new(ClientConfig::from_env())?;
//! let alice = session.user("Alice")?;
//! let page = session.fetch_followers(&alice, &Include::None, Some(50), None).await?;
//! for follower in &page.items {
//!     assert!(follower.follows(alice.key()));
//! }
//! # Ok(())
//! # }
//! ```

mod cache;
mod config;
mod entity;
mod error;
mod merge;
mod session;
mod transport;

pub use cache::{IdentityCache, KindRegistry};
pub use config::{ClientConfig, ENV_API_BASE_URL, ENV_SKIP_CACHE};
pub use entity::{Entity, List, Story, User};
pub use error::{ClientError, ClientResult};
pub use merge::{MergeEngine, Touched};
pub use session::{Fetched, Session};
pub use transport::{CachedTransport, HttpTransport, Transport};
