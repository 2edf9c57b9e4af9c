//! Typed snapshots of an entity's known fields.
//!
//! Field names are the internal attribute names (the store is keyed by them
//! after alias translation). Every field is optional: a snapshot only holds
//! what has been fetched so far.

use crate::values::{ConnectedServices, Inbox, Language, Notifications, Part, PublishedPart, TagRanking};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserModel {
    pub avatar: Option<String>,
    pub is_private: Option<bool>,
    pub background_url: Option<String>,
    pub follower: Option<bool>,
    pub following: Option<bool>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub gender: Option<String>,
    pub gender_code: Option<String>,
    pub language: Option<u64>,
    pub locale: Option<String>,
    pub create_date: Option<String>,
    pub modify_date: Option<String>,
    pub location: Option<String>,
    pub verified: Option<bool>,
    pub ambassador: Option<bool>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub website: Option<String>,
    pub lulu: Option<String>,
    pub smashwords: Option<String>,
    pub bubok: Option<String>,
    pub votes_received: Option<u64>,
    pub num_stories_published: Option<u64>,
    pub num_following: Option<u64>,
    pub num_followers: Option<u64>,
    pub num_messages: Option<u64>,
    pub num_lists: Option<u64>,
    pub verified_email: Option<bool>,
    pub preferred_categories: Option<Vec<serde_json::Value>>,
    pub allow_crawler: Option<bool>,
    pub deeplink: Option<String>,
    pub is_muted: Option<bool>,
    pub birthdate: Option<String>,
    pub inbox: Option<Inbox>,
    pub notifications: Option<Notifications>,
    pub connected_services: Option<ConnectedServices>,
    pub age: Option<u64>,
    pub email: Option<String>,
    pub has_password: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryModel {
    pub title: Option<String>,
    pub create_date: Option<String>,
    pub modify_date: Option<String>,
    pub vote_count: Option<u64>,
    pub read_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub rating: Option<u64>,
    pub mature: Option<bool>,
    pub url: Option<String>,
    pub is_paywalled: Option<bool>,
    pub cover: Option<String>,
    pub cover_timestamp: Option<String>,
    pub categories: Option<Vec<u64>>,
    pub copyright: Option<u64>,
    pub first_part_id: Option<u64>,
    pub num_parts: Option<u64>,
    pub deleted: Option<bool>,
    pub first_published_part: Option<PublishedPart>,
    pub last_published_part: Option<PublishedPart>,
    pub language: Option<Language>,
    pub parts: Option<Vec<Part>>,
    pub tag_rankings: Option<Vec<TagRanking>>,
}
