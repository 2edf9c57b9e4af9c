//! Argument parsing and command dispatch for the `storyweb` binary.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::iter::Peekable;
use std::str::Chars;
use storyweb_client::{ClientConfig, Session};
use storyweb_query::Include;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "storyweb")]
#[command(about = "Fetch users, stories, and reading lists from the Wattpad API")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// API root, overriding STORYWEB_API_BASE_URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Disable the in-memory response cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Args {
    /// Environment config overlaid with command-line flags.
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(base) = &self.base_url {
            config.api_base_url = base.clone();
        }
        if self.no_cache {
            config.cache_responses = false;
        }
        config
    }
}

/// Which fields to request.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct Select {
    /// Request every known field
    #[arg(long, conflicts_with = "fields")]
    pub all: bool,

    /// Field selection, e.g. `title,parts(id,title)`
    #[arg(long)]
    pub fields: Option<String>,
}

impl Select {
    pub fn include(&self) -> Result<Include> {
        match (&self.fields, self.all) {
            (Some(spec), _) => parse_include(spec),
            (None, true) => Ok(Include::All),
            (None, false) => Ok(Include::None),
        }
    }
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct Page {
    #[arg(long)]
    pub limit: Option<u32>,

    #[arg(long)]
    pub offset: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// A user's profile
    User {
        username: String,
        #[command(flatten)]
        select: Select,
    },
    /// Stories a user wrote
    Stories {
        username: String,
        #[command(flatten)]
        select: Select,
    },
    /// A user's followers
    Followers {
        username: String,
        #[command(flatten)]
        select: Select,
        #[command(flatten)]
        page: Page,
    },
    /// Users a user follows
    Following {
        username: String,
        #[command(flatten)]
        select: Select,
        #[command(flatten)]
        page: Page,
    },
    /// A user's reading lists
    Lists {
        username: String,
        #[command(flatten)]
        select: Select,
        #[command(flatten)]
        page: Page,
    },
    /// A story
    Story {
        id: String,
        #[command(flatten)]
        select: Select,
    },
    /// Stories recommended alongside a story
    Recommended {
        id: String,
        #[command(flatten)]
        select: Select,
        #[command(flatten)]
        page: Page,
    },
}

/// Runs one command and returns the decoded response body.
pub async fn run(session: &Session, command: &Command) -> Result<Value> {
    let raw = match command {
        Command::User { username, select } => {
            let user = session.user(username)?;
            session
                .fetch_user(&user, &select.include()?)
                .await
                .with_context(|| format!("fetching user {username}"))?
        }
        Command::Stories { username, select } => {
            let user = session.user(username)?;
            let fetched = session
                .fetch_user_stories(&user, &select.include()?)
                .await
                .with_context(|| format!("fetching stories of {username}"))?;
            info!("{} has {} stories", username, fetched.items.len());
            fetched.raw
        }
        Command::Followers {
            username,
            select,
            page,
        } => {
            let user = session.user(username)?;
            session
                .fetch_followers(&user, &select.include()?, page.limit, page.offset)
                .await
                .with_context(|| format!("fetching followers of {username}"))?
                .raw
        }
        Command::Following {
            username,
            select,
            page,
        } => {
            let user = session.user(username)?;
            session
                .fetch_following(&user, &select.include()?, page.limit, page.offset)
                .await
                .with_context(|| format!("fetching users followed by {username}"))?
                .raw
        }
        Command::Lists {
            username,
            select,
            page,
        } => {
            let user = session.user(username)?;
            session
                .fetch_lists(&user, &select.include()?, page.limit, page.offset)
                .await
                .with_context(|| format!("fetching lists of {username}"))?
                .raw
        }
        Command::Story { id, select } => {
            let story = session.story(id)?;
            let fetched = session
                .fetch_story(&story, &select.include()?)
                .await
                .with_context(|| format!("fetching story {id}"))?;
            if let Some(author) = &fetched.items {
                info!("story {} is by {}", id, author.username());
            }
            fetched.raw
        }
        Command::Recommended { id, select, page } => {
            let story = session.story(id)?;
            session
                .fetch_recommended(&story, &select.include()?, page.limit, page.offset)
                .await
                .with_context(|| format!("fetching recommendations for {id}"))?
                .raw
        }
    };
    Ok(raw)
}

/// Parses the selection grammar (`a,b(c,d)`) back into an [`Include`] tree.
/// Every named leaf is requested in full.
pub fn parse_include(spec: &str) -> Result<Include> {
    let mut chars = spec.chars().peekable();
    let include = parse_entries(&mut chars, spec)?;
    if chars.next().is_some() {
        bail!("unbalanced ')' in field selection {spec:?}");
    }
    Ok(include)
}

fn parse_entries(chars: &mut Peekable<Chars<'_>>, spec: &str) -> Result<Include> {
    let mut entries = Vec::new();
    loop {
        let mut name = String::new();
        while let Some(&c) = chars.peek() {
            if matches!(c, ',' | '(' | ')') {
                break;
            }
            name.push(c);
            chars.next();
        }
        let name = name.trim().to_string();
        if name.is_empty() {
            bail!("empty field name in field selection {spec:?}");
        }

        let sub = if chars.peek() == Some(&'(') {
            chars.next();
            let inner = parse_entries(chars, spec)?;
            if chars.next() != Some(')') {
                bail!("missing ')' in field selection {spec:?}");
            }
            inner
        } else {
            Include::All
        };
        entries.push((name, sub));

        if chars.peek() == Some(&',') {
            chars.next();
        } else {
            break;
        }
    }
    Ok(Include::Fields(entries))
}
