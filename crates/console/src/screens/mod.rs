//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Health check
//!
//! # Auth
//! GET  /login                   - Sign-in screen
//! POST /login                   - Sign in against the backend
//! POST /logout                  - Sign out
//!
//! # Dashboard
//! GET  /                        - Dashboard
//!
//! # Users (administrators only)
//! GET  /users                   - User console
//! POST /users                   - Create user (inline dialog)
//! POST /users/{id}              - Update user
//! POST /users/{id}/delete       - Delete user (confirmed)
//!
//! # Customers
//! GET  /customers               - Customer console
//! GET  /customers/new           - Dedicated creation screen
//! POST /customers               - Create customer
//! POST /customers/{id}          - Update customer
//! POST /customers/{id}/delete   - Delete customer (confirmed)
//!
//! # Producers
//! GET  /producers               - Producer console
//! GET  /producers/new           - Dedicated creation screen
//! POST /producers               - Create producer
//! POST /producers/{id}          - Update producer
//! POST /producers/{id}/delete   - Delete producer (confirmed)
//!
//! # Insurers
//! GET  /insurers                - Insurer console
//! GET  /insurers/new            - Dedicated creation screen
//! POST /insurers                - Create insurer
//! POST /insurers/{id}           - Update insurer
//! POST /insurers/{id}/delete    - Delete insurer (confirmed)
//!
//! # Productions
//! GET  /productions             - Production console
//! POST /productions             - Create production (inline dialog)
//! POST /productions/{id}        - Update production
//! POST /productions/{id}/delete - Delete production (confirmed)
//! ```

use askama::Template;
use axum::{
    Router,
    response::Html,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::api::Profile;
use crate::console::{ConsoleView, FormView};
use crate::session::{self, Flash};
use crate::state::AppState;

pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod insurers;
pub mod producers;
pub mod productions;
pub mod users;

/// Everything the base layout renders around a screen: title, navigation
/// state, the account box, and pending flash notifications.
#[derive(Debug, Clone)]
pub struct PageChrome {
    pub title: String,
    pub signed_in: bool,
    pub is_admin: bool,
    pub operator_name: String,
    pub operator_email: String,
    pub flashes: Vec<Flash>,
}

impl PageChrome {
    /// Chrome for the sign-in screen.
    #[must_use]
    pub fn signed_out(title: &str, flashes: Vec<Flash>) -> Self {
        Self {
            title: title.to_string(),
            signed_in: false,
            is_admin: false,
            operator_name: String::new(),
            operator_email: String::new(),
            flashes,
        }
    }
}

/// Chrome for an authenticated screen, consuming pending flashes.
pub async fn chrome(title: &str, profile: &Profile, session: &Session) -> PageChrome {
    PageChrome {
        title: title.to_string(),
        signed_in: true,
        is_admin: profile.role.is_admin(),
        operator_name: profile.name.clone(),
        operator_email: profile.email.to_string(),
        flashes: session::take_flashes(session).await,
    }
}

/// Render a template to a response body.
pub fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {e}");
        "Internal Server Error".to_string()
    }))
}

/// Shared list screen for every entity console.
#[derive(Template)]
#[template(path = "console/index.html")]
pub struct ConsoleIndexTemplate {
    pub page: PageChrome,
    pub view: ConsoleView,
}

/// Shared dedicated creation screen.
#[derive(Template)]
#[template(path = "console/new.html")]
pub struct ConsoleNewTemplate {
    pub page: PageChrome,
    pub heading: String,
    pub singular: String,
    pub action: String,
    pub cancel_path: String,
    pub form: FormView,
}

/// List screen in its errored state: no data, a retry affordance.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErroredTemplate {
    pub page: PageChrome,
    pub heading: String,
    pub message: String,
    pub retry_path: String,
}

/// All console routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Dashboard
        .route("/", get(dashboard::index))
        // Auth
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", post(auth::logout))
        // Users
        .route("/users", get(users::index).post(users::create))
        .route("/users/{id}", post(users::update))
        .route("/users/{id}/delete", post(users::delete))
        // Customers
        .route("/customers", get(customers::index).post(customers::create))
        .route("/customers/new", get(customers::new_form))
        .route("/customers/{id}", post(customers::update))
        .route("/customers/{id}/delete", post(customers::delete))
        // Producers
        .route("/producers", get(producers::index).post(producers::create))
        .route("/producers/new", get(producers::new_form))
        .route("/producers/{id}", post(producers::update))
        .route("/producers/{id}/delete", post(producers::delete))
        // Insurers
        .route("/insurers", get(insurers::index).post(insurers::create))
        .route("/insurers/new", get(insurers::new_form))
        .route("/insurers/{id}", post(insurers::update))
        .route("/insurers/{id}/delete", post(insurers::delete))
        // Productions
        .route(
            "/productions",
            get(productions::index).post(productions::create),
        )
        .route("/productions/{id}", post(productions::update))
        .route("/productions/{id}/delete", post(productions::delete))
}
