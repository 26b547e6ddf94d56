use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{StatusCode, Url, header};
use serde_json::json;

use binventory_api::app::{ApiSettings, AppServices, build_app};
use binventory_auth::{Hs256TokenService, OAuthError, OAuthProvider};
use binventory_infra::{SqliteInventoryStore, db};

const SECRET: &str = "test-secret";
const FRONTEND: &str = "http://frontend.test";

/// Stands in for GitHub: code "good" resolves to `login`.
struct FakeGitHub {
    login: String,
}

#[async_trait]
impl OAuthProvider for FakeGitHub {
    fn authorize_url(&self, redirect_uri: &str, state: &str) -> Result<String, OAuthError> {
        let url = Url::parse_with_params(
            "https://github.test/login/oauth/authorize",
            &[("redirect_uri", redirect_uri), ("state", state)],
        )
        .map_err(|e| OAuthError::Endpoint(e.to_string()))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str, _redirect_uri: &str) -> Result<String, OAuthError> {
        match code {
            "good" => Ok("gh-access-token".to_string()),
            _ => Err(OAuthError::Rejected("bad_verification_code".to_string())),
        }
    }

    async fn fetch_login(&self, _access_token: &str) -> Result<String, OAuthError> {
        Ok(self.login.clone())
    }
}

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

struct Options {
    login: &'static str,
    allowed_users: Option<Vec<String>>,
    static_files_dir: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            login: "octocat",
            allowed_users: None,
            static_files_dir: None,
        }
    }
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(Options::default()).await
    }

    async fn spawn_with(options: Options) -> Self {
        let pool = db::connect_in_memory().await.expect("in-memory database");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let services = AppServices::new(
            Arc::new(SqliteInventoryStore::new(pool)),
            Arc::new(Hs256TokenService::new(SECRET)),
            Arc::new(FakeGitHub {
                login: options.login.to_string(),
            }),
            ApiSettings {
                frontend_url: FRONTEND.to_string(),
                oauth_redirect_uri: format!("{base_url}/api/auth/callback"),
                allowed_users: options.allowed_users,
                static_files_dir: options.static_files_dir,
            },
        );
        let app = build_app(services);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(subject: &str, lifetime: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = json!({
        "sub": subject,
        "iat": now.timestamp(),
        "exp": (now + lifetime).timestamp(),
    });

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn token() -> String {
    mint_jwt("octocat", ChronoDuration::minutes(10))
}

fn no_redirects() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

async fn create(client: &reqwest::Client, srv: &TestServer, body: serde_json::Value) -> serde_json::Value {
    let res = client
        .post(srv.url("/api/items"))
        .bearer_auth(token())
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn healthcheck_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/api/healthcheck")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/api/items")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");

    let expired = mint_jwt("octocat", ChronoDuration::minutes(-5));
    let res = client
        .get(srv.url("/api/whoami"))
        .bearer_auth(expired)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/api/whoami"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_reports_token_subject() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .get(srv.url("/api/whoami"))
        .bearer_auth(mint_jwt("hubot", ChronoDuration::minutes(10)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["username"], "hubot");
}

#[tokio::test]
async fn item_lifecycle() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(
        &client,
        &srv,
        json!({
            "name": "  Cordless drill ",
            "description": "18V with two batteries",
            "area": "Garage",
            "container": "Shelf",
            "bin": "Bin A",
            "tags": ["tools", "power", "tools"],
        }),
    )
    .await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["name"], "Cordless drill");
    assert_eq!(created["quantity"], 1);
    assert_eq!(created["tags"].as_array().unwrap().len(), 2);

    let res = client
        .put(srv.url(&format!("/api/items/{id}")))
        .bearer_auth(token())
        .json(&json!({ "quantity": 3, "bin": "", "tags": ["garden"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["quantity"], 3);
    assert_eq!(updated["bin"], serde_json::Value::Null);
    assert_eq!(updated["container"], "Shelf");
    assert_eq!(updated["tags"][0]["tag"], "garden");

    let res = client
        .get(srv.url(&format!("/api/items/{id}")))
        .bearer_auth(token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched, updated);

    let res = client
        .delete(srv.url(&format!("/api/items/{id}")))
        .bearer_auth(token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Item deleted successfully");

    let res = client
        .get(srv.url(&format!("/api/items/{id}")))
        .bearer_auth(token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn bad_requests_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/api/items/abc"))
        .bearer_auth(token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");

    let res = client
        .post(srv.url("/api/items"))
        .bearer_auth(token())
        .json(&json!({ "name": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(srv.url("/api/items?skip=-1"))
        .bearer_auth(token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(srv.url("/api/items?limit=lots"))
        .bearer_auth(token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_query");
}

#[tokio::test]
async fn search_filters_and_autocomplete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create(&client, &srv, json!({ "name": "Drill", "area": "Garage", "tags": ["tools"] })).await;
    create(&client, &srv, json!({ "name": "Drill bits", "area": "Garage", "container": "Toolbox" })).await;
    create(&client, &srv, json!({ "name": "Blender", "area": "Kitchen" })).await;

    let res = client
        .get(srv.url("/api/items?search=drill&limit=1"))
        .bearer_auth(token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let res = client
        .get(srv.url("/api/items?area=Kitchen&search="))
        .bearer_auth(token())
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["name"], "Blender");

    let res = client
        .get(srv.url("/api/search/autocomplete?q=dri"))
        .bearer_auth(token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"], json!(["Drill", "Drill bits"]));
    assert_eq!(body["areas"], json!([]));

    let res = client
        .get(srv.url("/api/search/autocomplete?q=gar"))
        .bearer_auth(token())
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["areas"], json!(["Garage"]));
}

#[tokio::test]
async fn location_browsing_with_unknown_parents() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create(&client, &srv, json!({ "name": "Hammer", "area": "Garage", "container": "Shelf", "bin": "Bin A", "quantity": 2 })).await;
    create(&client, &srv, json!({ "name": "Nails", "area": "Garage", "container": "Shelf", "bin": "Bin B", "tags": ["hardware"] })).await;
    create(&client, &srv, json!({ "name": "Loose screws", "bin": "Jar" })).await;

    let get = |path: &str| {
        client
            .get(srv.url(path))
            .bearer_auth(token())
            .send()
    };

    let areas: serde_json::Value = get("/api/areas").await.unwrap().json().await.unwrap();
    assert_eq!(areas, json!(["Garage"]));

    let area: serde_json::Value = get("/api/areas/Garage").await.unwrap().json().await.unwrap();
    assert_eq!(area["item_count"], 2);
    assert_eq!(area["total_quantity"], 3);
    assert_eq!(area["containers"][0]["name"], "Shelf");

    let containers: serde_json::Value = get("/api/containers?area=Garage").await.unwrap().json().await.unwrap();
    assert_eq!(containers, json!([{ "name": "Shelf", "area": "Garage" }]));

    let container: serde_json::Value = get("/api/containers/Shelf").await.unwrap().json().await.unwrap();
    assert_eq!(container["area"], "Garage");
    assert_eq!(container["bins"], json!(["Bin A", "Bin B"]));

    let bin: serde_json::Value = get("/api/bins/Jar").await.unwrap().json().await.unwrap();
    assert_eq!(bin["area"], "Unknown");
    assert_eq!(bin["container"], "Unknown");

    let tag: serde_json::Value = get("/api/tags/hardware").await.unwrap().json().await.unwrap();
    assert_eq!(tag["item_count"], 1);
    assert_eq!(tag["bins"], json!(["Bin B"]));

    let res = get("/api/areas/Attic").await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let locations: serde_json::Value = get("/api/locations").await.unwrap().json().await.unwrap();
    assert_eq!(locations["bins"], json!(["Bin A", "Bin B", "Jar"]));

    let suggestions: serde_json::Value = get("/api/search-suggestions").await.unwrap().json().await.unwrap();
    let words = suggestions["suggestions"].as_array().unwrap();
    assert!(words.iter().any(|w| w == "Loose screws"));
    assert!(words.iter().any(|w| w == "Garage"));
}

#[tokio::test]
async fn legacy_endpoints_need_no_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create(&client, &srv, json!({ "name": "Garden hose", "area": "Shed" })).await;

    let res = client.get(srv.url("/api/locations")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let locations: serde_json::Value = res.json().await.unwrap();
    assert_eq!(locations["areas"], json!(["Shed"]));

    let res = client.get(srv.url("/api/search-suggestions")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["suggestions"].as_array().unwrap().iter().any(|w| w == "Garden hose"));
}

/// Follow the login redirect and pull out the state GitHub would echo back.
async fn start_login(client: &reqwest::Client, srv: &TestServer) -> String {
    let res = client.get(srv.url("/api/auth/login")).send().await.unwrap();
    assert!(res.status().is_redirection());
    let location = Url::parse(res.headers()[header::LOCATION].to_str().unwrap()).unwrap();
    assert_eq!(location.host_str(), Some("github.test"));
    location
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .expect("state in authorize url")
}

#[tokio::test]
async fn oauth_login_issues_a_usable_token() {
    let srv = TestServer::spawn().await;
    let client = no_redirects();

    let state = start_login(&client, &srv).await;
    let res = client
        .get(srv.url(&format!("/api/auth/callback?code=good&state={state}")))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_redirection());
    let location = res.headers()[header::LOCATION].to_str().unwrap().to_string();
    let prefix = format!("{FRONTEND}/login?access_token=");
    assert!(location.starts_with(&prefix), "unexpected redirect {location}");
    let issued = &location[prefix.len()..];

    let res = client
        .get(srv.url("/api/whoami"))
        .bearer_auth(issued)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["username"], "octocat");

    // A state is good for one callback only.
    let res = client
        .get(srv.url(&format!("/api/auth/callback?code=good&state={state}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oauth_callback_failures() {
    let srv = TestServer::spawn().await;
    let client = no_redirects();

    let res = client
        .get(srv.url("/api/auth/callback?code=good&state=forged"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_state");

    let res = client
        .get(srv.url("/api/auth/callback?error=access_denied"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let state = start_login(&client, &srv).await;
    let res = client
        .get(srv.url(&format!("/api/auth/callback?code=bad&state={state}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn allow_list_refuses_other_accounts() {
    let srv = TestServer::spawn_with(Options {
        login: "mallory",
        allowed_users: Some(vec!["octocat".to_string()]),
        ..Options::default()
    })
    .await;
    let client = no_redirects();

    let state = start_login(&client, &srv).await;
    let res = client
        .get(srv.url(&format!("/api/auth/callback?code=good&state={state}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn client_routes_fall_back_to_index_html() {
    let dir = std::env::temp_dir().join(format!("binventory-static-{}", uuid::Uuid::new_v4().simple()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<html>binventory</html>").unwrap();
    std::fs::write(dir.join("app.js"), "console.log('hi')").unwrap();

    let srv = TestServer::spawn_with(Options {
        static_files_dir: Some(dir.clone()),
        ..Options::default()
    })
    .await;

    let res = reqwest::get(srv.url("/app.js")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "console.log('hi')");

    let res = reqwest::get(srv.url("/areas/Garage")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "<html>binventory</html>");

    let res = reqwest::get(srv.url("/api/healthcheck")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    std::fs::remove_dir_all(&dir).ok();
}
