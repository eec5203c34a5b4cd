//! In-process fake of the SnippetVault REST API.
#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use snippetvault::app::AppContext;
use snippetvault::http::RecordingNavigator;
use snippetvault::storage::LocalStorage;
use snippetvault::Config;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TOKEN: &str = "tok-1";
pub const PASSWORD: &str = "secret";

/// Knobs and recorded traffic of the fake server.
#[derive(Debug, Default)]
pub struct FakeApi {
    pub snippets: Vec<Value>,
    pub fail_logout: bool,
    pub fail_tags: bool,
    pub reject_sessions: bool,
    pub malformed_list: bool,
    pub last_query: Option<HashMap<String, String>>,
    pub last_auth_header: Option<String>,
    pub register_bodies: Vec<String>,
}

pub type Shared = Arc<Mutex<FakeApi>>;

type Reply = (StatusCode, Json<Value>);

pub fn user_json() -> Value {
    json!({
        "_id": "u1",
        "username": "ada",
        "email": "ada@example.com",
        "fullName": "Ada Lovelace",
        "avatar": "http://img.example/ada.png"
    })
}

pub fn snippet_json(id: &str, title: &str) -> Value {
    json!({
        "_id": id,
        "title": title,
        "code": format!("// {title}"),
        "codeLanguage": "rust",
        "description": "",
        "tags": ["rust"],
        "isPublic": false,
        "isFavorited": false,
        "favoriteCount": 0,
        "owner": "u1"
    })
}

fn ok(data: Value) -> Reply {
    (StatusCode::OK, Json(json!({ "success": true, "data": data })))
}

fn fail(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "success": false, "message": message })))
}

fn page(snippets: Vec<Value>, page: u64, limit: u64) -> Value {
    let total = snippets.len() as u64;
    json!({
        "snippets": snippets,
        "pagination": {
            "total": total,
            "page": page,
            "limit": limit,
            "totalPages": total.div_ceil(limit.max(1)).max(1)
        }
    })
}

async fn register(State(api): State<Shared>, body: Bytes) -> Reply {
    let body = String::from_utf8_lossy(&body).into_owned();
    if body.contains("taken") {
        return fail(StatusCode::CONFLICT, "Username taken");
    }
    api.lock().unwrap().register_bodies.push(body);
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": { "user": user_json(), "accessToken": TOKEN, "refreshToken": "ref-1" }
        })),
    )
}

async fn login(Json(body): Json<Value>) -> Reply {
    if body["password"] == PASSWORD {
        ok(json!({ "user": user_json(), "accessToken": TOKEN }))
    } else {
        fail(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

async fn logout(State(api): State<Shared>) -> Reply {
    if api.lock().unwrap().fail_logout {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "logout exploded");
    }
    ok(Value::Null)
}

async fn profile(State(api): State<Shared>) -> Reply {
    if api.lock().unwrap().reject_sessions {
        return fail(StatusCode::UNAUTHORIZED, "jwt expired");
    }
    ok(user_json())
}

async fn update_profile(Json(body): Json<Value>) -> Reply {
    let mut user = user_json();
    if let Some(full_name) = body.get("fullName") {
        user["fullName"] = full_name.clone();
    }
    if let Some(email) = body.get("email") {
        user["email"] = email.clone();
    }
    ok(user)
}

async fn list(
    State(api): State<Shared>,
    headers: axum::http::HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let search = query.get("search").cloned().unwrap_or_default();
    let page_no = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(6);

    let (rejected, malformed, snippets) = {
        let mut state = api.lock().unwrap();
        state.last_query = Some(query);
        state.last_auth_header = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .map(String::from);
        (state.reject_sessions, state.malformed_list, state.snippets.clone())
    };

    if rejected {
        return fail(StatusCode::UNAUTHORIZED, "jwt expired");
    }
    if malformed {
        return ok(json!({ "items": [] }));
    }

    match search.as_str() {
        "slow" => {
            tokio::time::sleep(Duration::from_millis(300)).await;
            ok(page(vec![snippet_json("slow-1", "stale result")], page_no, limit))
        }
        "fast" => ok(page(vec![snippet_json("fast-1", "fresh result")], page_no, limit)),
        _ => ok(page(snippets, page_no, limit)),
    }
}

async fn favorites(State(api): State<Shared>) -> Reply {
    let favorites = api
        .lock()
        .unwrap()
        .snippets
        .iter()
        .filter(|s| s["isFavorited"] == true)
        .cloned()
        .collect();
    ok(page(favorites, 1, 10))
}

async fn create(Json(body): Json<Value>) -> Reply {
    let mut snippet = snippet_json("new-1", body["title"].as_str().unwrap_or_default());
    for field in ["code", "codeLanguage", "description", "tags", "isPublic"] {
        snippet[field] = body[field].clone();
    }
    (StatusCode::CREATED, Json(json!({ "success": true, "data": snippet })))
}

/// Answers with the doubly nested envelope some endpoints use.
async fn by_id(State(api): State<Shared>, Path(id): Path<String>) -> Reply {
    let found = api
        .lock()
        .unwrap()
        .snippets
        .iter()
        .find(|s| s["_id"] == id.as_str())
        .cloned();
    match found {
        Some(snippet) => ok(json!({ "data": snippet, "success": true })),
        None => fail(StatusCode::NOT_FOUND, "Snippet not found"),
    }
}

async fn update(Path(id): Path<String>, Json(body): Json<Value>) -> Reply {
    let mut snippet = snippet_json(&id, body["title"].as_str().unwrap_or_default());
    for field in ["code", "codeLanguage", "description", "tags", "isPublic"] {
        snippet[field] = body[field].clone();
    }
    ok(snippet)
}

async fn remove(State(api): State<Shared>, Path(id): Path<String>) -> Reply {
    if id == "locked" {
        return ok_unconfirmed("Snippet is locked");
    }
    let mut state = api.lock().unwrap();
    let before = state.snippets.len();
    state.snippets.retain(|s| s["_id"] != id.as_str());
    if state.snippets.len() == before {
        return fail(StatusCode::NOT_FOUND, "Snippet not found");
    }
    (StatusCode::OK, Json(json!({ "success": true, "message": "Snippet deleted" })))
}

fn ok_unconfirmed(message: &str) -> Reply {
    (StatusCode::OK, Json(json!({ "success": false, "message": message })))
}

async fn favorite(State(api): State<Shared>, Path(id): Path<String>) -> Reply {
    let mut state = api.lock().unwrap();
    let Some(snippet) = state.snippets.iter_mut().find(|s| s["_id"] == id.as_str()) else {
        return fail(StatusCode::NOT_FOUND, "Snippet not found");
    };
    let now = !snippet["isFavorited"].as_bool().unwrap_or(false);
    let count = snippet["favoriteCount"].as_u64().unwrap_or(0);
    let count = if now { count + 1 } else { count.saturating_sub(1) };
    snippet["isFavorited"] = json!(now);
    snippet["favoriteCount"] = json!(count);
    ok(json!({ "isFavorited": now, "favoriteCount": count }))
}

async fn tags(State(api): State<Shared>) -> Reply {
    if api.lock().unwrap().fail_tags {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "tags exploded");
    }
    ok(json!({ "tags": ["rust", "async"] }))
}

async fn public_list() -> Reply {
    let mut shared = snippet_json("pub-1", "public one");
    shared["isPublic"] = json!(true);
    shared["owner"] = json!({ "_id": "u2", "username": "grace" });
    ok(page(vec![shared], 1, 10))
}

async fn fork(Path(id): Path<String>) -> Reply {
    if id != "pub-1" {
        return fail(StatusCode::NOT_FOUND, "Public snippet not found");
    }
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": snippet_json("fork-1", "public one") })),
    )
}

async fn stats() -> Reply {
    ok(json!({
        "totalSnippets": 3,
        "storageUsage": { "total": 1200 },
        "mostUsedLanguages": [{ "_id": "rust", "count": 2 }]
    }))
}

pub fn router(api: Shared) -> Router {
    let routes = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/profile", get(profile))
        .route("/auth/update-profile", axum::routing::patch(update_profile))
        .route("/snippets", get(list))
        .route("/snippets/create", post(create))
        .route("/snippets/favorites", get(favorites))
        .route("/snippets/tags", get(tags))
        .route("/snippets/public", get(public_list))
        .route("/snippets/stats", get(stats))
        .route("/snippets/:id", get(by_id).put(update).delete(remove))
        .route("/snippets/:id/favorite", post(favorite))
        .route("/snippets/:id/fork", post(fork))
        .with_state(api);

    Router::new().nest("/api/v1", routes)
}

/// Binds the fake API on an ephemeral port and returns its base URL.
pub async fn serve(api: Shared) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(api);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/v1")
}

pub fn config(base_url: &str, data_dir: &std::path::Path) -> Config {
    Config {
        base_url: base_url.to_string(),
        data_dir: data_dir.to_path_buf(),
        request_timeout_secs: 5,
        ..Config::default()
    }
}

/// Fake server, context and navigator wired together.
pub struct Harness {
    pub api: Shared,
    pub ctx: AppContext,
    pub navigator: Arc<RecordingNavigator>,
    pub base_url: String,
    pub dir: tempfile::TempDir,
}

impl Harness {
    pub async fn start(storage: Arc<dyn LocalStorage>, current_path: &str) -> Self {
        Self::start_with(Shared::default(), storage, current_path).await
    }

    pub async fn start_with(api: Shared, storage: Arc<dyn LocalStorage>, current_path: &str) -> Self {
        let base_url = serve(Arc::clone(&api)).await;
        let dir = tempfile::tempdir().unwrap();
        let navigator = Arc::new(RecordingNavigator::starting_at(current_path));
        let ctx = AppContext::new(&config(&base_url, dir.path()), storage, navigator.clone()).unwrap();
        Self {
            api,
            ctx,
            navigator,
            base_url,
            dir,
        }
    }

    pub fn seed(&self, snippets: Vec<Value>) {
        self.api.lock().unwrap().snippets = snippets;
    }
}
