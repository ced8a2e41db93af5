//! End-to-end tests of the content API, driven in-process with `oneshot`

use std::io;
use std::path::Path;

use axum::Router;
use axum::body::Body;
use content_server::content::{ContentService, ContentStore, DocumentFs, MenuNormalizer, StdFs};
use content_server::{Config, ServerState, build_app};
use http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const CSRF: &str = "csrf-token-for-tests";

struct Harness {
    dir: TempDir,
    state: ServerState,
    app: Router,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_work_dir(dir.path());
        let state = ServerState::initialize(&config);
        Self::with_state(dir, state)
    }

    fn with_state(dir: TempDir, state: ServerState) -> Self {
        let app = build_app(&state).with_state(state.clone());
        Self { dir, state, app }
    }

    fn content_path(&self) -> std::path::PathBuf {
        self.dir.path().join("content.json")
    }

    fn write_document(&self, document: Value) {
        std::fs::write(self.content_path(), serde_json::to_vec_pretty(&document).unwrap()).unwrap();
    }

    fn read_document(&self) -> Value {
        serde_json::from_slice(&std::fs::read(self.content_path()).unwrap()).unwrap()
    }

    /// Stored file text without the `last_updated` line
    fn stored_text_without_timestamp(&self) -> String {
        std::fs::read_to_string(self.content_path())
            .unwrap()
            .lines()
            .filter(|line| !line.trim_start().starts_with("\"last_updated\""))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn token(&self, role: &str) -> String {
        self.state
            .session_service
            .issue("1", "owner", role, CSRF)
            .unwrap()
    }

    fn admin_token(&self) -> String {
        self.token("admin")
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn save(&self, body: Value) -> (StatusCode, Value) {
        let request = json_request(Method::POST, "/api/content/save", Some(&self.admin_token()), body);
        self.send(request).await
    }
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn save_body(section: &str, content: Value) -> Value {
    json!({"csrf_token": CSRF, "section": section, "content": content})
}

#[tokio::test]
async fn test_end_to_end_menu_save() {
    let h = Harness::new();

    let (status, body) = h
        .save(save_body(
            "menu",
            json!([{"id": "sides", "title": "Sides", "items": [{"title": "Fries", "price": "3"}]}]),
        ))
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Content saved successfully");
    assert!(body["timestamp"].is_string());

    let document = h.read_document();
    assert_eq!(document["menu"][0]["items"][0]["price"], "3.00");
    assert_eq!(document["menu"][0]["items"][0]["quantity"], 0);
    assert_eq!(document["last_updated"], body["timestamp"]);
}

#[tokio::test]
async fn test_keyed_merge_and_unknown_keys_preserved() {
    let h = Harness::new();
    h.write_document(json!({
        "business_info": {"name": "A", "phone": "1"},
        "seo": {"title": "Harbor Grill"}
    }));

    let (status, _) = h.save(save_body("business_info", json!({"phone": "2"}))).await;
    assert_eq!(status, StatusCode::OK);

    let document = h.read_document();
    assert_eq!(document["business_info"], json!({"name": "A", "phone": "2"}));
    assert_eq!(document["seo"], json!({"title": "Harbor Grill"}));
}

#[tokio::test]
async fn test_sequential_payload_replaces() {
    let h = Harness::new();
    h.write_document(json!({"images": [{"id": 1}, {"id": 2}]}));

    let (status, _) = h.save(save_body("images", json!([{"id": 9}]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.read_document()["images"], json!([{"id": 9}]));
}

#[tokio::test]
async fn test_save_is_idempotent() {
    let h = Harness::new();
    let body = save_body("hours", json!({"monday": "11-9", "weekend": {"sat": "10-10"}}));

    h.save(body.clone()).await;
    let mut first = h.read_document();
    h.save(body).await;
    let mut second = h.read_document();

    first.as_object_mut().unwrap().remove("last_updated");
    second.as_object_mut().unwrap().remove("last_updated");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_resaving_normalized_menu_is_byte_identical() {
    let h = Harness::new();
    let menu = json!([
        {"id": "wings-tenders", "title": "Wings", "items": [
            {"title": "Wings", "short": "Crispy", "quantities": [
                {"label": "6 pc", "value": "6", "price": "$8.5"},
                {"label": "12 pc", "value": 12, "price": ""}
            ]},
            {"title": "Tenders", "price": 9}
        ]},
        {"id": "current-ice-cream-flavors", "items": [{"title": "Vanilla", "price": "2"}]},
        {"id": "sides", "items": [{"title": "Fries", "price": "3.456", "quantity": "2"}]}
    ]);

    let (status, body) = h.save(save_body("menu", menu.clone())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let first = h.stored_text_without_timestamp();

    let stored_menu = h.read_document()["menu"].clone();
    let (status, _) = h.save(save_body("menu", stored_menu)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.stored_text_without_timestamp(), first);

    let (status, _) = h.save(save_body("menu", menu)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.stored_text_without_timestamp(), first);
}

#[tokio::test]
async fn test_missing_session_is_forbidden() {
    let h = Harness::new();
    h.write_document(json!({"hero": {"headline": "Old"}}));

    let request = json_request(
        Method::POST,
        "/api/content/save",
        None,
        save_body("hero", json!({"headline": "New"})),
    );
    let (status, body) = h.send(request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 1001);
    assert_eq!(h.read_document()["hero"]["headline"], "Old");
}

#[tokio::test]
async fn test_invalid_or_non_admin_session_is_forbidden() {
    let h = Harness::new();
    let body = save_body("hero", json!({"headline": "New"}));

    let (status, _) = h
        .send(json_request(Method::POST, "/api/content/save", Some("garbage"), body.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let editor = h.token("editor");
    let (status, body) = h
        .send(json_request(Method::POST, "/api/content/save", Some(&editor), body))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2003);
    assert!(!h.content_path().exists());
}

#[tokio::test]
async fn test_csrf_checks() {
    let h = Harness::new();
    let token = h.admin_token();

    let missing = json!({"section": "hero", "content": {"headline": "x"}});
    let (status, body) = h
        .send(json_request(Method::POST, "/api/content/save", Some(&token), missing.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 1010);

    let wrong = json!({"csrf_token": "nope", "section": "hero", "content": {"headline": "x"}});
    let (status, body) = h
        .send(json_request(Method::POST, "/api/content/save", Some(&token), wrong))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 1011);
    assert!(!h.content_path().exists());

    // header token is accepted when the body has none
    let mut request = json_request(Method::POST, "/api/content/save", Some(&token), missing);
    request.headers_mut().insert("x-csrf-token", CSRF.parse().unwrap());
    let (status, _) = h.send(request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_cookie_session() {
    let h = Harness::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/content/save")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, format!("admin_session={}", h.admin_token()))
        .body(Body::from(save_body("about", json!({"text": "Since 1987"})).to_string()))
        .unwrap();

    let (status, _) = h.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.read_document()["about"]["text"], "Since 1987");
}

#[tokio::test]
async fn test_wrong_method_is_405_before_auth() {
    let h = Harness::new();

    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let request = Request::builder()
            .method(method.clone())
            .uri("/api/content/save")
            .body(Body::empty())
            .unwrap();
        let (status, body) = h.send(request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], 9);
    }
}

#[tokio::test]
async fn test_missing_fields_and_malformed_body() {
    let h = Harness::new();
    let token = h.admin_token();

    let (status, body) = h.save(json!({"csrf_token": CSRF, "content": {}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing section");

    let (status, body) = h.save(json!({"csrf_token": CSRF, "section": "hero"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing content");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/content/save")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = h.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6);

    let (status, _) = h.save(save_body("last_updated", json!("2020-01-01 00:00:00"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_validation_error_keeps_document() {
    let h = Harness::new();
    let original = json!({"menu": [{"id": "wings-tenders", "items": [
        {"title": "Wings", "quantities": [{"label": "6 pc", "value": 6, "price": "8.00"}]}
    ]}]});
    h.write_document(original.clone());

    let (status, body) = h
        .save(save_body(
            "menu",
            json!([{"id": "wings-tenders", "items": [
                {"title": "Wings", "quantities": [{"value": 0, "price": "5.00"}]}
            ]}]),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Quantity must be at least 1 for wings & tenders item: Wings"
    );
    assert_eq!(body["details"]["section"], "wings-tenders");
    assert_eq!(body["details"]["item"], "Wings");
    assert_eq!(h.read_document(), original);
}

#[tokio::test]
async fn test_flavor_prices_stripped() {
    let h = Harness::new();
    let (status, _) = h
        .save(save_body(
            "menu",
            json!([{"id": "current-ice-cream-flavors", "items": [
                {"title": "Vanilla", "price": "3.50"},
                {"title": "Mint", "price": "junk"}
            ]}]),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let items = &h.read_document()["menu"][0]["items"];
    assert!(items[0].get("price").is_none());
    assert!(items[1].get("price").is_none());
}

#[tokio::test]
async fn test_form_encoded_save() {
    let h = Harness::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/content/save")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::AUTHORIZATION, format!("Bearer {}", h.admin_token()))
        .body(Body::from(format!(
            "csrf_token={CSRF}&section=hero&headline=Welcome+aboard&cta=Order+now"
        )))
        .unwrap();

    let (status, body) = h.send(request).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(
        h.read_document()["hero"],
        json!({"headline": "Welcome aboard", "cta": "Order now"})
    );
}

/// Rename always fails
struct ReadOnlyTarget;

impl DocumentFs for ReadOnlyTarget {
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        StdFs.read(path)
    }
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        StdFs.write(path, bytes)
    }
    fn rename(&self, _from: &Path, _to: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }
    fn remove(&self, path: &Path) -> io::Result<()> {
        StdFs.remove(path)
    }
    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        StdFs.set_mode(path, mode)
    }
}

#[tokio::test]
async fn test_persistence_failure_is_500_and_atomic() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_work_dir(dir.path());
    let store = ContentStore::new(config.content_path.clone(), config.business_timezone)
        .with_fs(ReadOnlyTarget);
    let service = ContentService::new(store, MenuNormalizer::default());
    let state = ServerState::with_content(&config, service);
    let h = Harness::with_state(dir, state);

    let original = json!({"hero": {"headline": "Old"}});
    h.write_document(original.clone());

    let (status, body) = h.save(save_body("hero", json!({"headline": "New"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Failed to save content");
    assert!(body.get("details").is_none());
    assert_eq!(h.read_document(), original);
    assert!(!h.dir.path().join("content.json.tmp").exists());
}

#[tokio::test]
async fn test_read_endpoints() {
    let h = Harness::new();
    h.write_document(json!({"hero": {"headline": "Hi"}}));

    let (status, body) = h.send(get("/api/content")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["hero"]["headline"], "Hi");

    let (status, body) = h.send(get("/api/content/hero")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"headline": "Hi"}));

    let (status, body) = h.send(get("/api/content/about")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 3);
}

#[tokio::test]
async fn test_migrate_endpoint() {
    let h = Harness::new();
    h.write_document(json!({"menu": [{"id": "sides", "items": [
        {"title": "Fries", "quantity": 2, "short": "Crispy"}
    ]}]}));

    let migrate = |token: &str| {
        json_request(
            Method::POST,
            "/api/content/migrate",
            Some(token),
            json!({"csrf_token": CSRF}),
        )
    };

    let (status, body) = h.send(migrate(&h.admin_token())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["quantities_upgraded"], 1);
    assert!(body["timestamp"].is_string());

    let item = &h.read_document()["menu"][0]["items"][0];
    assert_eq!(item["quantities"], json!([{"label": "", "value": 2, "price": ""}]));
    assert_eq!(item["description"], "Crispy");
    assert!(item.get("quantity").is_none());

    let (status, body) = h.send(migrate(&h.admin_token())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Nothing to migrate");
    assert!(body.get("timestamp").is_none());
}

#[tokio::test]
async fn test_health() {
    let h = Harness::new();
    let (status, body) = h.send(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["document"], "ok");
}
