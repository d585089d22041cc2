//! Session-stored state: the access token and flash notifications.
//!
//! The operator session holds exactly two things: the backend access token
//! (the only durable client-side state in the system) and the pending flash
//! notifications. Both live in the in-memory session store behind a
//! session-lifetime cookie, so closing the browser destroys them.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session keys for operator state.
pub mod keys {
    /// Key for the backend access token.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// Key for pending flash notifications.
    pub const FLASHES: &str = "flashes";
}

/// Severity of a flash notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Error,
}

/// A transient notification rendered once on the next page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    /// Success notification.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    /// Error notification.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    /// CSS class for the template.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.level {
            FlashLevel::Success => "flash flash-success",
            FlashLevel::Error => "flash flash-error",
        }
    }
}

/// Queue a flash for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn push_flash(
    session: &Session,
    flash: Flash,
) -> Result<(), tower_sessions::session::Error> {
    let mut pending: Vec<Flash> = session.get(keys::FLASHES).await?.unwrap_or_default();
    pending.push(flash);
    session.insert(keys::FLASHES, pending).await
}

/// Take all pending flashes, clearing them from the session.
pub async fn take_flashes(session: &Session) -> Vec<Flash> {
    session
        .remove::<Vec<Flash>>(keys::FLASHES)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Read the stored access token, if the operator is signed in.
pub async fn access_token(session: &Session) -> Option<String> {
    session
        .get::<String>(keys::ACCESS_TOKEN)
        .await
        .ok()
        .flatten()
}

/// Store the access token at sign-in.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn store_access_token(
    session: &Session,
    token: &str,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::ACCESS_TOKEN, token.to_string()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_constructors() {
        let flash = Flash::success("Saved");
        assert_eq!(flash.level, FlashLevel::Success);
        assert_eq!(flash.message, "Saved");
        assert_eq!(flash.css_class(), "flash flash-success");

        let flash = Flash::error("Nope");
        assert_eq!(flash.css_class(), "flash flash-error");
    }
}
