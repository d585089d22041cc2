//! Middleware: authentication extractors and the session layer.

pub mod auth;
pub mod session;

pub use auth::{CurrentOperator, RequireAdmin};
pub use session::create_session_layer;
