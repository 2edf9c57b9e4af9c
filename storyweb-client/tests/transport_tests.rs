use serde_json::json;
use storyweb_client::{CachedTransport, ClientConfig, ClientError, Entity, HttpTransport, Session, Transport};
use storyweb_query::Include;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        api_base_url: server.uri(),
        timeout_secs: 5,
        ..Default::default()
    }
}

// ── HttpTransport ───────────────────────────────────────────────

#[tokio::test]
async fn http_fetch_decodes_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"username": "alice"})))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&config_for(&server)).unwrap();
    let body = transport
        .fetch(&format!("{}/users/alice", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, json!({"username": "alice"}));
}

#[tokio::test]
async fn http_fetch_sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "storyweb-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig {
        user_agent: "storyweb-test/1.0".to_string(),
        ..config_for(&server)
    };
    let transport = HttpTransport::new(&config).unwrap();
    transport.fetch(&format!("{}/anything", server.uri())).await.unwrap();
}

#[tokio::test]
async fn http_non_success_is_a_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&config_for(&server)).unwrap();
    let err = transport
        .fetch(&format!("{}/users/ghost", server.uri()))
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert!(!err.is_decode());
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn http_invalid_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&config_for(&server)).unwrap();
    let err = transport
        .fetch(&format!("{}/stories/abc123", server.uri()))
        .await
        .unwrap_err();

    assert!(err.is_decode());
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn http_connection_failure_is_a_transport_error() {
    let transport = HttpTransport::new(&ClientConfig::default()).unwrap();
    let err = transport.fetch("http://127.0.0.1:1/users/alice").await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(err.status(), None);
}

// ── CachedTransport ─────────────────────────────────────────────

#[tokio::test]
async fn cached_transport_serves_repeat_requests_from_memory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stories/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "abc123"})))
        .expect(1)
        .mount(&server)
        .await;

    let cached = CachedTransport::new(HttpTransport::new(&config_for(&server)).unwrap());
    let url = format!("{}/stories/abc123", server.uri());

    let first = cached.fetch(&url).await.unwrap();
    let second = cached.fetch(&url).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(cached.len().await, 1);

    cached.clear().await;
    assert!(cached.is_empty().await);
}

#[tokio::test]
async fn cached_transport_does_not_keep_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let cached = CachedTransport::new(HttpTransport::new(&config_for(&server)).unwrap());
    let url = format!("{}/users/alice", server.uri());

    assert!(cached.fetch(&url).await.is_err());
    assert!(cached.fetch(&url).await.is_err());
    assert!(cached.is_empty().await);
}

// ── Session over HTTP ───────────────────────────────────────────

#[tokio::test]
async fn session_fetches_followers_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/alice/followers"))
        .and(query_param("fields", "users(username)"))
        .and(query_param("limit", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"users": [{"username": "bob"}, {"username": "carol"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new(config_for(&server)).unwrap();
    let alice = session.user("alice").unwrap();
    let page = session
        .fetch_followers(&alice, &Include::None, Some(2), None)
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert!(page.items.iter().all(|u| u.follows(alice.key())));
    assert_eq!(alice.num_followers(), Some(2));
}

#[tokio::test]
async fn session_rejects_invalid_config() {
    let config = ClientConfig {
        api_base_url: "ftp://example.com".to_string(),
        ..Default::default()
    };
    let err = Session::new(config).err().unwrap();
    assert!(matches!(err, ClientError::Config(_)));
}
