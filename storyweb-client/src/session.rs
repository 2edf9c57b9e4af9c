//! The session: configuration, transport, schema, and identity cache, plus
//! every fetch operation.
//!
//! Each fetch builds its field selection, forces the fields the merge step
//! cannot do without, performs one GET, decodes the whole response, and only
//! then commits it to the entity graph.

use crate::cache::IdentityCache;
use crate::config::ClientConfig;
use crate::entity::{Entity, List, Story, User};
use crate::error::{ClientError, ClientResult};
use crate::merge::{collection, Author, MergeEngine, Touched};
use crate::transport::{CachedTransport, HttpTransport, Transport};
use serde_json::Value;
use std::sync::Arc;
use storyweb_model::{Registry, SchemaSource};
use storyweb_query::{Convention, FieldSelection, Include, RequestUrl};
use storyweb_types::{EntityKind, ListKey, StoryKey, UserKey};
use tracing::{debug, info};

/// The result of a fetch that populated more than its target entity.
#[derive(Debug)]
pub struct Fetched<T> {
    /// The entities the endpoint returned, in response order.
    pub items: T,
    /// The decoded response body.
    pub raw: Value,
    /// Every entity the merge wrote to. Dropping this lets the cache reclaim
    /// entities nobody else holds.
    pub touched: Touched,
}

/// A client session.
///
/// Independent sessions have independent caches and never share entities.
pub struct Session {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    schema: Arc<dyn SchemaSource>,
    cache: IdentityCache,
}

impl Session {
    /// Creates a session talking HTTP to `config.api_base_url`.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let http = HttpTransport::new(&config)?;
        let transport: Arc<dyn Transport> = if config.cache_responses {
            Arc::new(CachedTransport::new(http))
        } else {
            Arc::new(http)
        };
        Ok(Self::with_transport(config, transport))
    }

    /// Creates a session over any transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            schema: Arc::new(Registry),
            cache: IdentityCache::new(),
        }
    }

    /// Replaces the built-in schema registry.
    pub fn with_schema(mut self, schema: Arc<dyn SchemaSource>) -> Self {
        self.schema = schema;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    pub fn schema(&self) -> &dyn SchemaSource {
        self.schema.as_ref()
    }

    /// A merge engine bound to this session's cache and schema.
    pub fn merger(&self) -> MergeEngine<'_> {
        MergeEngine::new(&self.cache, self.schema.as_ref())
    }

    /// The user named `username`. No request is made.
    pub fn user(&self, username: &str) -> ClientResult<Arc<User>> {
        Ok(self.cache.user(&UserKey::new(username)?))
    }

    pub fn story(&self, id: &str) -> ClientResult<Arc<Story>> {
        Ok(self.cache.story(&StoryKey::new(id)?))
    }

    /// The list `id`, owned by `owner` if it is created by this call.
    pub fn list(&self, id: &str, owner: &str) -> ClientResult<Arc<List>> {
        Ok(self.cache.list(&ListKey::new(id)?, &UserKey::new(owner)?))
    }

    fn selection(&self, kind: EntityKind, include: &Include) -> ClientResult<FieldSelection> {
        Ok(FieldSelection::resolve(self.schema(), kind, include)?)
    }

    async fn get(&self, url: &RequestUrl) -> ClientResult<Value> {
        let url = url.absolute(&self.config.api_base_url);
        debug!("fetching {}", url);
        self.transport.fetch(&url).await
    }

    // ── users ────────────────────────────────────────────────────

    /// Fetches `users/{name}` and merges the result into `user`.
    pub async fn fetch_user(&self, user: &User, include: &Include) -> ClientResult<Value> {
        let fields = self.selection(EntityKind::User, include)?;
        let url = RequestUrl::user(user.key()).with_fields(&fields, Convention::Default);

        let mut raw = self.get(&url).await?;
        // Identity is the key; the echoed username is not part of the profile.
        if let Value::Object(map) = &mut raw {
            map.remove(EntityKind::User.key_field());
        }
        let written = self.merger().apply_user(user, raw.clone())?;
        debug!("merged {} fields into user {}", written, user.key());
        Ok(raw)
    }

    /// Fetches the stories `user` wrote. The user's story list is replaced
    /// in response order, and every story's author is set to `user`.
    pub async fn fetch_user_stories(
        &self,
        user: &User,
        include: &Include,
    ) -> ClientResult<Fetched<Vec<Arc<Story>>>> {
        let mut fields = self.selection(EntityKind::Story, include)?;
        fields.require("id");
        fields.require_within("tagRankings", "name");
        fields.require_within("parts", "id");
        let url = RequestUrl::user_stories(user.key())
            .with_fields(&fields, Convention::Collection(EntityKind::Story));

        let raw = self.get(&url).await?;
        let merger = self.merger();
        let patches = collection(&raw, EntityKind::Story.collection_name())?
            .into_iter()
            .map(|item| merger.decode_story(item, Author::Ignore))
            .collect::<ClientResult<Vec<_>>>()?;

        let mut touched = Touched::default();
        let stories: Vec<Arc<Story>> = patches
            .into_iter()
            .map(|patch| {
                let story = merger.commit_story(patch, &mut touched);
                story.set_author(user.key().clone());
                story
            })
            .collect();
        let count = user.set_stories(stories.iter().map(|s| s.key().clone()).collect());
        user.set_field("num_stories_published", count as u64);

        info!("fetched {} stories of {}", count, user.key());
        Ok(Fetched {
            items: stories,
            raw,
            touched,
        })
    }

    /// Fetches one page of `user`'s followers. Each follower gains `user`
    /// in its following set; `user` gains every follower.
    pub async fn fetch_followers(
        &self,
        user: &User,
        include: &Include,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> ClientResult<Fetched<Vec<Arc<User>>>> {
        let url = RequestUrl::followers(user.key());
        let (users, raw, touched) = self.fetch_users(url, include, limit, offset).await?;

        for follower in &users {
            follower.add_following([user.key().clone()]);
        }
        let count = user.add_followers(users.iter().map(|u| u.key().clone()));
        user.set_field("num_followers", count as u64);

        info!("fetched {} followers of {} ({} known)", users.len(), user.key(), count);
        Ok(Fetched {
            items: users,
            raw,
            touched,
        })
    }

    /// Fetches one page of the users `user` follows. Each of them gains
    /// `user` as a follower; `user` follows every one.
    pub async fn fetch_following(
        &self,
        user: &User,
        include: &Include,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> ClientResult<Fetched<Vec<Arc<User>>>> {
        let url = RequestUrl::following(user.key());
        let (users, raw, touched) = self.fetch_users(url, include, limit, offset).await?;

        for followed in &users {
            followed.add_followers([user.key().clone()]);
        }
        let count = user.add_following(users.iter().map(|u| u.key().clone()));
        user.set_field("num_following", count as u64);

        info!("fetched {} followed by {} ({} known)", users.len(), user.key(), count);
        Ok(Fetched {
            items: users,
            raw,
            touched,
        })
    }

    async fn fetch_users(
        &self,
        url: RequestUrl,
        include: &Include,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> ClientResult<(Vec<Arc<User>>, Value, Touched)> {
        let mut fields = self.selection(EntityKind::User, include)?;
        fields.require(EntityKind::User.key_field());
        let url = url
            .with_fields(&fields, Convention::Collection(EntityKind::User))
            .with_limit(limit)
            .with_offset(offset);

        let raw = self.get(&url).await?;
        let merger = self.merger();
        let patches = collection(&raw, EntityKind::User.collection_name())?
            .into_iter()
            .map(|item| merger.decode_user(item))
            .collect::<ClientResult<Vec<_>>>()?;

        let mut touched = Touched::default();
        let users = patches
            .into_iter()
            .map(|patch| merger.commit_user(patch, &mut touched))
            .collect();
        Ok((users, raw, touched))
    }

    /// Fetches one page of `user`'s reading lists, with their stories.
    pub async fn fetch_lists(
        &self,
        user: &User,
        include: &Include,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> ClientResult<Fetched<Vec<Arc<List>>>> {
        let mut fields = self.selection(EntityKind::List, include)?;
        fields.require("id");
        fields.require_within("stories", "id");
        let url = RequestUrl::user_lists(user.key())
            .with_fields(&fields, Convention::Collection(EntityKind::List))
            .with_limit(limit)
            .with_offset(offset);

        let raw = self.get(&url).await?;
        let merger = self.merger();
        let patches = collection(&raw, EntityKind::List.collection_name())?
            .into_iter()
            .map(|item| merger.decode_list(item))
            .collect::<ClientResult<Vec<_>>>()?;

        let mut touched = Touched::default();
        let lists: Vec<Arc<List>> = patches
            .into_iter()
            .map(|patch| merger.commit_list(user.key(), patch, &mut touched))
            .collect();
        let count = user.add_lists(lists.iter().map(|l| l.key().clone()));
        user.set_field("num_lists", count as u64);

        info!("fetched {} lists of {}", lists.len(), user.key());
        Ok(Fetched {
            items: lists,
            raw,
            touched,
        })
    }

    // ── stories ──────────────────────────────────────────────────

    /// Fetches `stories/{id}` and merges it into `story`. The author is
    /// always requested, at least by username, and resolved through the
    /// cache.
    pub async fn fetch_story(
        &self,
        story: &Story,
        include: &Include,
    ) -> ClientResult<Fetched<Option<Arc<User>>>> {
        let mut fields = self.selection(EntityKind::Story, include)?;
        fields.require_nested("user", EntityKind::User.key_field());
        let url = RequestUrl::story(story.key()).with_fields(&fields, Convention::Default);

        let raw = self.get(&url).await?;
        let touched = self.merger().apply_story(story, raw.clone())?;
        let author = story.author_key().and_then(|key| {
            touched.users().iter().find(|u| *u.key() == key).cloned()
        });

        debug!("merged story {} ({} entities touched)", story.key(), touched.len());
        Ok(Fetched {
            items: author,
            raw,
            touched,
        })
    }

    /// Fetches stories recommended alongside `story`, replacing its
    /// recommendation list.
    pub async fn fetch_recommended(
        &self,
        story: &Story,
        include: &Include,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> ClientResult<Fetched<Vec<Arc<Story>>>> {
        let mut fields = self.selection(EntityKind::Story, include)?;
        fields.require("id");
        fields.require_nested("user", EntityKind::User.key_field());
        let url = RequestUrl::recommended(story.key())
            .with_fields(&fields, Convention::Default)
            .with_limit(limit)
            .with_offset(offset);

        let raw = self.get(&url).await?;
        let items = match &raw {
            Value::Array(items) => items.clone(),
            Value::Object(_) => collection(&raw, EntityKind::Story.collection_name())?,
            _ => {
                return Err(ClientError::Decode(format!(
                    "recommendations for {} are neither an array nor an object",
                    story.key()
                )));
            }
        };
        let merger = self.merger();
        let patches = items
            .into_iter()
            .map(|item| merger.decode_story(item, Author::Decode))
            .collect::<ClientResult<Vec<_>>>()?;

        let mut touched = Touched::default();
        let stories: Vec<Arc<Story>> = patches
            .into_iter()
            .map(|patch| merger.commit_story(patch, &mut touched))
            .collect();
        story.set_recommended(stories.iter().map(|s| s.key().clone()).collect());

        info!("fetched {} recommendations for {}", stories.len(), story.key());
        Ok(Fetched {
            items: stories,
            raw,
            touched,
        })
    }
}
