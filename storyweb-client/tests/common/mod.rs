#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use storyweb_client::{ClientConfig, ClientError, ClientResult, Session, Transport};

pub const BASE: &str = "http://api.test/v3";

/// Answers requests from canned bodies keyed by path, and records every URL
/// it was asked for.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, Value>>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sets the body returned for `path` (relative to [`BASE`], no query).
    pub fn respond(&self, path: &str, body: Value) {
        self.responses.lock().unwrap().insert(path.to_string(), body);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> String {
        self.requests.lock().unwrap().last().cloned().expect("no request recorded")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, url: &str) -> ClientResult<Value> {
        self.requests.lock().unwrap().push(url.to_string());
        let path = url
            .strip_prefix(BASE)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(url);
        let path = path.split('?').next().unwrap_or(path);
        self.responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| ClientError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}

pub fn config() -> ClientConfig {
    ClientConfig {
        api_base_url: BASE.to_string(),
        ..Default::default()
    }
}

pub fn session(mock: &Arc<MockTransport>) -> Session {
    Session::with_transport(config(), mock.clone())
}

pub fn url(relative: &str) -> String {
    format!("{BASE}/{relative}")
}
