//! Test harness for the console: an in-process stub of the brokerage REST
//! backend, plus a helper to spawn an in-process console instance.
//!
//! The stub backend implements the backend contract the console consumes:
//!
//! - `POST /auth/login` issuing bearer tokens, `POST /auth/me`
//! - `GET/POST /users`, `PATCH/DELETE /users/{id}`
//! - `GET/POST /customer`, `PATCH/DELETE /customer/{id}`
//! - `GET/POST /producer`, `PATCH/DELETE /producer/{id}`
//! - `GET/POST /insurance`, `PATCH/DELETE /insurance/{id}`
//! - `GET /productions`, `POST /production`, `PUT /service/{id}`,
//!   `DELETE /production/{id}`
//!
//! On top of the contract it records every `Authorization` header and list
//! fetch (so tests can assert what the console actually sent) and supports
//! one-shot failure injection for mutation requests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete as delete_route, get, patch, post, put},
};
use serde_json::{Value, json};

use harper_console::config::ConsoleConfig;
use harper_console::state::AppState;

/// Fixed timestamp the stub stamps onto created records.
pub const STUB_TIMESTAMP: &str = "2026-01-01T00:00:00Z";

/// Password accepted for every seeded account.
pub const PASSWORD: &str = "secret";

/// Seeded administrator account.
pub const ADMIN_EMAIL: &str = "a@b.com";

/// Seeded regular staff account.
pub const STAFF_EMAIL: &str = "staff@harper.example";

/// Shared state of the stub backend.
pub struct BackendState {
    collections: Mutex<HashMap<&'static str, Vec<Value>>>,
    tokens: Mutex<HashMap<String, String>>,
    next_id: AtomicI64,
    next_token: AtomicI64,
    /// Every `Authorization` header value the backend received, in order.
    authorization_headers: Mutex<Vec<Option<String>>>,
    /// Count of data fetches per collection (list GETs, plus "auth/me").
    fetch_counts: Mutex<HashMap<&'static str, usize>>,
    /// One-shot failure for the next mutation request.
    fail_next_mutation: Mutex<Option<(u16, Option<String>)>>,
}

impl BackendState {
    fn new() -> Self {
        let mut collections = HashMap::new();
        collections.insert(
            "users",
            vec![
                json!({
                    "id": 1,
                    "name": "Alda Braga",
                    "email": ADMIN_EMAIL,
                    "role": 1,
                    "createdAt": STUB_TIMESTAMP,
                    "updatedAt": STUB_TIMESTAMP,
                }),
                json!({
                    "id": 2,
                    "name": "Silvio Prado",
                    "email": STAFF_EMAIL,
                    "role": 2,
                    "createdAt": STUB_TIMESTAMP,
                    "updatedAt": STUB_TIMESTAMP,
                }),
            ],
        );
        collections.insert("customer", Vec::new());
        collections.insert("producer", Vec::new());
        collections.insert("insurance", Vec::new());
        collections.insert("productions", Vec::new());

        Self {
            collections: Mutex::new(collections),
            tokens: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(100),
            next_token: AtomicI64::new(123),
            authorization_headers: Mutex::new(Vec::new()),
            fetch_counts: Mutex::new(HashMap::new()),
            fail_next_mutation: Mutex::new(None),
        }
    }

    /// Arrange for the next mutation (POST/PATCH/PUT/DELETE on an entity)
    /// to fail with the given status and optional `message` body field.
    pub fn fail_next_mutation(&self, status: u16, message: Option<&str>) {
        *self.fail_next_mutation.lock().expect("lock") =
            Some((status, message.map(ToString::to_string)));
    }

    /// Number of fetches received for a collection ("auth/me" counts the
    /// profile endpoint).
    #[must_use]
    pub fn fetch_count(&self, collection: &str) -> usize {
        self.fetch_counts
            .lock()
            .expect("lock")
            .get(collection)
            .copied()
            .unwrap_or(0)
    }

    /// All `Authorization` header values received so far.
    #[must_use]
    pub fn authorization_headers(&self) -> Vec<Option<String>> {
        self.authorization_headers.lock().expect("lock").clone()
    }

    /// The records of a collection, as the backend currently holds them.
    #[must_use]
    pub fn records(&self, collection: &str) -> Vec<Value> {
        self.collections
            .lock()
            .expect("lock")
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn record_request(&self, headers: &HeaderMap) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        self.authorization_headers.lock().expect("lock").push(auth);
    }

    fn bump_fetch_count(&self, collection: &'static str) {
        *self
            .fetch_counts
            .lock()
            .expect("lock")
            .entry(collection)
            .or_insert(0) += 1;
    }

    fn take_failure(&self) -> Option<(u16, Option<String>)> {
        self.fail_next_mutation.lock().expect("lock").take()
    }

    fn profile_for_token(&self, headers: &HeaderMap) -> Option<Value> {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())?
            .strip_prefix("Bearer ")?
            .to_string();
        let email = self.tokens.lock().expect("lock").get(&token).cloned()?;
        self.collections
            .lock()
            .expect("lock")
            .get("users")?
            .iter()
            .find(|u| u["email"] == json!(email))
            .cloned()
    }
}

type Shared = Arc<BackendState>;

fn failure_response(status: u16, message: Option<String>) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match message {
        Some(message) => (status, Json(json!({ "message": message }))).into_response(),
        None => (status, Json(json!({}))).into_response(),
    }
}

// =============================================================================
// Shared handler bodies
// =============================================================================

fn list(state: &Shared, headers: &HeaderMap, collection: &'static str) -> Response {
    state.record_request(headers);
    state.bump_fetch_count(collection);
    Json(Value::Array(state.records(collection))).into_response()
}

fn create(state: &Shared, headers: &HeaderMap, collection: &'static str, body: Value) -> Response {
    state.record_request(headers);
    if let Some((status, message)) = state.take_failure() {
        return failure_response(status, message);
    }

    let mut record = body;
    let id = state.next_id.fetch_add(1, Ordering::SeqCst);
    record["id"] = json!(id);
    record["createdAt"] = json!(STUB_TIMESTAMP);
    record["updatedAt"] = json!(STUB_TIMESTAMP);
    if collection == "users" && record.get("role").is_none() {
        record["role"] = json!(2);
    }

    let mut collections = state.collections.lock().expect("lock");
    if let Some(records) = collections.get_mut(collection) {
        records.push(record.clone());
    }
    (StatusCode::CREATED, Json(record)).into_response()
}

fn update(
    state: &Shared,
    headers: &HeaderMap,
    collection: &'static str,
    id: i64,
    body: &Value,
) -> Response {
    state.record_request(headers);
    if let Some((status, message)) = state.take_failure() {
        return failure_response(status, message);
    }

    let mut collections = state.collections.lock().expect("lock");
    let Some(records) = collections.get_mut(collection) else {
        return failure_response(404, None);
    };
    let Some(record) = records.iter_mut().find(|r| r["id"] == json!(id)) else {
        return failure_response(404, Some("Record not found".to_string()));
    };
    if let (Some(target), Some(changes)) = (record.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(record.clone()).into_response()
}

fn remove(state: &Shared, headers: &HeaderMap, collection: &'static str, id: i64) -> Response {
    state.record_request(headers);
    if let Some((status, message)) = state.take_failure() {
        return failure_response(status, message);
    }

    let mut collections = state.collections.lock().expect("lock");
    let Some(records) = collections.get_mut(collection) else {
        return failure_response(404, None);
    };
    let before = records.len();
    records.retain(|r| r["id"] != json!(id));
    if records.len() == before {
        return failure_response(404, Some("Record not found".to_string()));
    }
    Json(json!({})).into_response()
}

// =============================================================================
// Route handlers
// =============================================================================

async fn login(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record_request(&headers);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();

    let known = state
        .records("users")
        .iter()
        .any(|u| u["email"] == json!(email));
    if !known || password != PASSWORD {
        return failure_response(401, Some("Invalid credentials".to_string()));
    }

    let token = format!("tok{}", state.next_token.fetch_add(1, Ordering::SeqCst));
    state
        .tokens
        .lock()
        .expect("lock")
        .insert(token.clone(), email);
    Json(json!({ "accessToken": token })).into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    state.record_request(&headers);
    state.bump_fetch_count("auth/me");
    match state.profile_for_token(&headers) {
        Some(profile) => Json(profile).into_response(),
        None => failure_response(401, Some("Invalid or expired token".to_string())),
    }
}

macro_rules! collection_handlers {
    ($list:ident, $create:ident, $update:ident, $remove:ident, $collection:literal) => {
        async fn $list(State(state): State<Shared>, headers: HeaderMap) -> Response {
            list(&state, &headers, $collection)
        }

        async fn $create(
            State(state): State<Shared>,
            headers: HeaderMap,
            Json(body): Json<Value>,
        ) -> Response {
            create(&state, &headers, $collection, body)
        }

        async fn $update(
            State(state): State<Shared>,
            headers: HeaderMap,
            Path(id): Path<i64>,
            Json(body): Json<Value>,
        ) -> Response {
            update(&state, &headers, $collection, id, &body)
        }

        async fn $remove(
            State(state): State<Shared>,
            headers: HeaderMap,
            Path(id): Path<i64>,
        ) -> Response {
            remove(&state, &headers, $collection, id)
        }
    };
}

collection_handlers!(list_users, create_user, update_user, remove_user, "users");
collection_handlers!(
    list_customers,
    create_customer,
    update_customer,
    remove_customer,
    "customer"
);
collection_handlers!(
    list_producers,
    create_producer,
    update_producer,
    remove_producer,
    "producer"
);
collection_handlers!(
    list_insurers,
    create_insurer,
    update_insurer,
    remove_insurer,
    "insurance"
);
collection_handlers!(
    list_productions,
    create_production,
    update_production,
    remove_production,
    "productions"
);

fn backend_router(state: Shared) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", post(me))
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            patch(update_user).delete(remove_user),
        )
        .route("/customer", get(list_customers).post(create_customer))
        .route(
            "/customer/{id}",
            patch(update_customer).delete(remove_customer),
        )
        .route("/producer", get(list_producers).post(create_producer))
        .route(
            "/producer/{id}",
            patch(update_producer).delete(remove_producer),
        )
        .route("/insurance", get(list_insurers).post(create_insurer))
        .route(
            "/insurance/{id}",
            patch(update_insurer).delete(remove_insurer),
        )
        .route("/productions", get(list_productions))
        .route("/production", post(create_production))
        .route("/service/{id}", put(update_production))
        .route("/production/{id}", delete_route(remove_production))
        .with_state(state)
}

/// A running stub backend.
pub struct StubBackend {
    pub state: Shared,
    pub addr: SocketAddr,
}

impl StubBackend {
    /// Spawn the stub on an ephemeral local port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind (no free ports).
    pub async fn spawn() -> Self {
        let state = Arc::new(BackendState::new());
        let router = backend_router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub backend addr");

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("stub backend");
        });

        Self { state, addr }
    }

    /// Base URL of the stub, with trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }
}

/// A running console instance wired to a stub backend.
pub struct TestConsole {
    pub addr: SocketAddr,
}

impl TestConsole {
    /// Spawn a console on an ephemeral local port, pointing at `backend`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind or the backend URL is invalid.
    pub async fn spawn(backend: &StubBackend) -> Self {
        let config = ConsoleConfig {
            backend_url: url::Url::parse(&backend.base_url()).expect("backend url"),
            host: "127.0.0.1".parse().expect("host"),
            port: 0,
            base_url: "http://localhost".to_string(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };
        let state = AppState::new(config);
        let router = harper_console::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind console");
        let addr = listener.local_addr().expect("console addr");

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("console");
        });

        Self { addr }
    }

    /// Console URL for a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

/// An HTTP client that holds cookies and does not follow redirects, so
/// tests can assert on `Location` headers explicitly.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("build client")
}
