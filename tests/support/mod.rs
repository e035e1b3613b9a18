//! In-process stand-in for the portal REST backend, served by axum on an ephemeral port.
//! Records every request line so tests can assert on paths, queries and headers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use campus_portal::config::{parse_api_url, PortalConfig};
use campus_portal::session::{MemorySessionStore, SessionStore};
use campus_portal::Portal;

pub const STUDENT_TOKEN: &str = "tok-student";
pub const ADMIN_TOKEN: &str = "tok-admin";

#[derive(Debug, Clone, PartialEq)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct Backend {
    pub seen: Mutex<Vec<Seen>>,
    /// When set, `/auth/me` waits this long before answering.
    pub me_delay: Mutex<Option<Duration>>,
    /// Number of upcoming `GET /bus/` calls that answer 503.
    pub bus_failures: Mutex<u32>,
}

impl Backend {
    pub fn seen(&self) -> Vec<Seen> { self.seen.lock().clone() }

    pub fn paths(&self) -> Vec<String> { self.seen.lock().iter().map(|s| format!("{} {}", s.method, s.path)).collect() }

    pub fn last(&self, path_prefix: &str) -> Option<Seen> {
        self.seen.lock().iter().rev().find(|s| s.path.starts_with(path_prefix)).cloned()
    }

    fn record(&self, method: &str, path: String, query: Option<String>, headers: &HeaderMap, body: Option<Value>) {
        let authorization = headers.get("authorization").and_then(|v| v.to_str().ok()).map(str::to_string);
        self.seen.lock().push(Seen { method: method.to_string(), path, query, authorization, body });
    }
}

type Shared = Arc<Backend>;

fn detail(status: StatusCode, msg: &str) -> Response { (status, Json(json!({ "detail": msg }))).into_response() }

fn user_for(headers: &HeaderMap) -> Option<Value> {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(h) if h == format!("Bearer {}", STUDENT_TOKEN) => Some(json!({
            "id": 1, "username": "asha", "email": "asha@campus.edu", "is_admin": false, "is_active": true,
            "created_at": "2024-01-01T00:00:00"
        })),
        Some(h) if h == format!("Bearer {}", ADMIN_TOKEN) => Some(json!({
            "id": 2, "username": "root", "email": "root@campus.edu", "is_admin": true, "is_active": true,
            "created_at": "2024-01-01T00:00:00"
        })),
        _ => None,
    }
}

fn require_admin(headers: &HeaderMap) -> Result<(), Response> {
    match user_for(headers) {
        None => Err(detail(StatusCode::UNAUTHORIZED, "Not authenticated")),
        Some(u) if u["is_admin"] != json!(true) => Err(detail(StatusCode::FORBIDDEN, "Not enough permissions")),
        Some(_) => Ok(()),
    }
}

fn timetable_rows() -> Vec<Value> {
    vec![
        json!({"id": 1, "day": "Monday", "time": "10:00", "subject": "Physics", "room": "B2", "created_at": ""}),
        json!({"id": 2, "day": "Monday", "time": "9:00", "subject": "Maths", "room": "A1", "created_at": ""}),
        json!({"id": 3, "day": "Tuesday", "time": "11:00", "subject": "Chemistry", "room": "C3", "created_at": ""}),
    ]
}

fn bus_rows() -> Vec<Value> {
    vec![
        json!({"id": 1, "route": "Route 12A", "time": "08:30", "bus_no": "KA-01", "created_at": ""}),
        json!({"id": 2, "route": "Route 5", "time": "07:45", "bus_no": "KA-02", "created_at": ""}),
        json!({"id": 3, "route": "Route 12A", "time": "07:15", "bus_no": "KA-03", "created_at": ""}),
    ]
}

fn canteen_rows() -> Vec<Value> {
    vec![
        json!({"id": 1, "day": "Monday", "item": "Idli", "price": 30.0, "category": "breakfast", "created_at": ""}),
        json!({"id": 2, "day": "Monday", "item": "Thali", "price": 80.0, "category": "lunch", "created_at": ""}),
        json!({"id": 3, "day": "Monday", "item": "Tea", "price": 10.0, "category": "", "created_at": ""}),
        json!({"id": 4, "day": "Friday", "item": "Dosa", "price": 45.5, "category": "breakfast", "created_at": ""}),
    ]
}

fn category_of(query: &Option<String>) -> Option<String> {
    let q = query.as_deref()?;
    q.split('&').find_map(|kv| kv.strip_prefix("category=")).map(str::to_string)
}

async fn token(State(b): State<Shared>, headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
    b.record("POST", "/auth/token".into(), None, &headers, Some(json!(form)));
    let user = form.get("username").map(String::as_str).unwrap_or("");
    let pass = form.get("password").map(String::as_str).unwrap_or("");
    let tok = match (user, pass) {
        ("asha", "pw") => STUDENT_TOKEN,
        ("root", "pw") => ADMIN_TOKEN,
        ("ghost", "pw") => "tok-ghost",
        _ => return detail(StatusCode::UNAUTHORIZED, "Incorrect username or password"),
    };
    Json(json!({ "access_token": tok, "token_type": "bearer" })).into_response()
}

async fn me(State(b): State<Shared>, headers: HeaderMap) -> Response {
    b.record("GET", "/auth/me".into(), None, &headers, None);
    let delay = *b.me_delay.lock();
    if let Some(d) = delay {
        tokio::time::sleep(d).await;
    }
    match user_for(&headers) {
        Some(u) => Json(u).into_response(),
        None => detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"),
    }
}

async fn register(State(b): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("POST", "/auth/register".into(), None, &headers, Some(body.clone()));
    if body["username"] == json!("asha") {
        return detail(StatusCode::BAD_REQUEST, "Username already registered");
    }
    Json(json!({
        "id": 7, "username": body["username"], "email": body["email"], "is_admin": false, "is_active": true,
        "created_at": "2024-01-01T00:00:00"
    }))
    .into_response()
}

async fn timetable_all(State(b): State<Shared>, headers: HeaderMap) -> Response {
    b.record("GET", "/timetable/".into(), None, &headers, None);
    Json(timetable_rows()).into_response()
}

async fn timetable_day(State(b): State<Shared>, headers: HeaderMap, Path(day): Path<String>) -> Response {
    b.record("GET", format!("/timetable/{}", day), None, &headers, None);
    let rows: Vec<Value> = timetable_rows().into_iter().filter(|r| r["day"] == json!(day)).collect();
    Json(rows).into_response()
}

async fn timetable_create(State(b): State<Shared>, headers: HeaderMap, Json(mut body): Json<Value>) -> Response {
    b.record("POST", "/timetable/".into(), None, &headers, Some(body.clone()));
    if let Err(r) = require_admin(&headers) {
        return r;
    }
    body["id"] = json!(99);
    body["created_at"] = json!("2024-01-02T00:00:00");
    Json(body).into_response()
}

async fn timetable_update(State(b): State<Shared>, headers: HeaderMap, Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    b.record("PUT", format!("/timetable/{}", id), None, &headers, Some(body.clone()));
    if let Err(r) = require_admin(&headers) {
        return r;
    }
    let Some(mut row) = timetable_rows().into_iter().find(|r| r["id"] == json!(id)) else {
        return detail(StatusCode::NOT_FOUND, "Timetable entry not found");
    };
    if let Some(obj) = body.as_object() {
        for (k, v) in obj {
            row[k] = v.clone();
        }
    }
    Json(row).into_response()
}

async fn bus_all(State(b): State<Shared>, headers: HeaderMap) -> Response {
    b.record("GET", "/bus/".into(), None, &headers, None);
    {
        let mut left = b.bus_failures.lock();
        if *left > 0 {
            *left -= 1;
            return detail(StatusCode::SERVICE_UNAVAILABLE, "Bus feed unavailable");
        }
    }
    Json(bus_rows()).into_response()
}

async fn bus_delete(State(b): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    b.record("DELETE", format!("/bus/{}", id), None, &headers, None);
    if let Err(r) = require_admin(&headers) {
        return r;
    }
    if id == "404" {
        return detail(StatusCode::NOT_FOUND, "Bus schedule not found");
    }
    Json(json!({ "message": "Bus schedule deleted successfully" })).into_response()
}

async fn canteen_all(State(b): State<Shared>, headers: HeaderMap, RawQuery(q): RawQuery) -> Response {
    b.record("GET", "/canteen/".into(), q.clone(), &headers, None);
    let cat = category_of(&q);
    let rows: Vec<Value> = canteen_rows().into_iter().filter(|r| cat.as_ref().map(|c| r["category"] == json!(c)).unwrap_or(true)).collect();
    Json(rows).into_response()
}

async fn canteen_day(State(b): State<Shared>, headers: HeaderMap, Path(day): Path<String>, RawQuery(q): RawQuery) -> Response {
    b.record("GET", format!("/canteen/{}", day), q.clone(), &headers, None);
    let cat = category_of(&q);
    let rows: Vec<Value> = canteen_rows()
        .into_iter()
        .filter(|r| r["day"] == json!(day))
        .filter(|r| cat.as_ref().map(|c| r["category"] == json!(c)).unwrap_or(true))
        .collect();
    Json(rows).into_response()
}

async fn canteen_create(State(b): State<Shared>, headers: HeaderMap, Json(mut body): Json<Value>) -> Response {
    b.record("POST", "/canteen/".into(), None, &headers, Some(body.clone()));
    if let Err(r) = require_admin(&headers) {
        return r;
    }
    if body["item"] == json!("") {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": [{ "loc": ["body", "item"], "msg": "item must not be empty", "type": "value_error" }] })),
        )
            .into_response();
    }
    body["id"] = json!(50);
    Json(body).into_response()
}

async fn broken(State(b): State<Shared>, headers: HeaderMap) -> Response {
    b.record("GET", "/broken".into(), None, &headers, None);
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}

pub struct MockServer {
    pub base: String,
    pub backend: Shared,
}

/// Bind 127.0.0.1:0 and serve the mock routes on a background task.
pub async fn spawn_backend() -> MockServer {
    let backend: Shared = Arc::new(Backend::default());
    let app = Router::new()
        .route("/auth/token", post(token))
        .route("/auth/me", get(me))
        .route("/auth/register", post(register))
        .route("/timetable/", get(timetable_all).post(timetable_create))
        .route("/timetable/{day}", get(timetable_day).put(timetable_update))
        .route("/bus/", get(bus_all))
        .route("/bus/{id}", axum::routing::delete(bus_delete))
        .route("/canteen/", get(canteen_all).post(canteen_create))
        .route("/canteen/{day}", get(canteen_day))
        .route("/broken", get(broken))
        .with_state(backend.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind mock backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    MockServer { base: format!("http://{}", addr), backend }
}

pub fn config_for(base: &str, session_file: std::path::PathBuf) -> PortalConfig {
    PortalConfig {
        api_url: parse_api_url(base).expect("mock base url"),
        session_file,
        request_timeout: Duration::from_secs(5),
    }
}

/// Portal over an in-memory session store.
pub fn memory_portal(base: &str) -> (Portal, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    let dyn_store: Arc<dyn SessionStore> = store.clone();
    let portal = Portal::with_store(config_for(base, "unused-session.json".into()), dyn_store).expect("portal");
    (portal, store)
}
