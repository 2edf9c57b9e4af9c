use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::json;
use storyweb_cli::{parse_include, run, Args, Command};
use storyweb_client::{ClientConfig, Session};
use storyweb_query::Include;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Selection grammar ────────────────────────────────────────────

#[test]
fn parses_flat_selection() {
    assert_eq!(parse_include("id,title").unwrap(), Include::only(["id", "title"]));
}

#[test]
fn parses_nested_selection() {
    let include = parse_include("tags,parts(id,title),user(name)").unwrap();
    assert_eq!(
        include,
        Include::fields([
            ("tags", Include::All),
            ("parts", Include::only(["id", "title"])),
            ("user", Include::only(["name"])),
        ])
    );
}

#[test]
fn rejects_malformed_selection() {
    assert!(parse_include("").is_err());
    assert!(parse_include("a,,b").is_err());
    assert!(parse_include("parts(id").is_err());
    assert!(parse_include("id)").is_err());
}

// ── Arguments ────────────────────────────────────────────────────

#[test]
fn parses_followers_command() {
    let args = Args::try_parse_from([
        "storyweb", "followers", "alice", "--limit", "10", "--fields", "name", "--no-cache",
    ])
    .unwrap();

    assert!(args.no_cache);
    assert!(!args.config().cache_responses);
    match args.command {
        Command::Followers {
            username,
            select,
            page,
        } => {
            assert_eq!(username, "alice");
            assert_eq!(page.limit, Some(10));
            assert_eq!(page.offset, None);
            assert_eq!(select.include().unwrap(), Include::only(["name"]));
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn all_and_fields_conflict() {
    assert!(Args::try_parse_from(["storyweb", "story", "1", "--all", "--fields", "id"]).is_err());
}

#[test]
fn base_url_flag_overrides_config() {
    let args = Args::try_parse_from(["storyweb", "--base-url", "http://localhost:1234", "user", "bob"]).unwrap();
    assert_eq!(args.config().api_base_url, "http://localhost:1234");
}

// ── Dispatch ─────────────────────────────────────────────────────

#[tokio::test]
async fn story_command_returns_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stories/abc123"))
        .and(query_param("fields", "title,user(username)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "T",
            "user": {"username": "someauthor"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new(ClientConfig {
        api_base_url: server.uri(),
        ..Default::default()
    })
    .unwrap();
    let args = Args::try_parse_from(["storyweb", "story", "ABC123", "--fields", "title"]).unwrap();

    let body = run(&session, &args.command).await.unwrap();
    assert_eq!(body["title"], "T");
}
