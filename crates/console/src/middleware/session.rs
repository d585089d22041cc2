//! Session middleware configuration.
//!
//! Sessions live in an in-memory store behind a session-lifetime cookie
//! (SameSite=Strict, http-only). There is no persistent session state: the
//! cookie dies with the browser, and a console restart signs everyone out -
//! the same lifetime the original per-tab token storage had.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::ConsoleConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "harper_console_session";

/// Create the session layer with the in-memory store.
#[must_use]
pub fn create_session_layer(config: &ConsoleConfig) -> SessionManagerLayer<MemoryStore> {
    let store = MemoryStore::default();

    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        // Session cookie: destroyed when the browser closes.
        .with_expiry(Expiry::OnSessionEnd)
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
