//! Authentication operations: sign-in and the operator profile.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use harper_core::{Email, Role, UserId};

use super::{ApiClient, ApiError};

/// Sign-in request body for `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    /// Staff email address.
    pub email: Email,
    /// Staff password, forwarded verbatim.
    pub password: String,
}

/// Successful sign-in response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    /// Bearer token for subsequent requests.
    pub access_token: String,
}

/// The signed-in operator, as returned by `POST /auth/me`.
///
/// Fetched once per session and cached until sign-out; the derived
/// [`Role::is_admin`] flag gates the user-management screen and the
/// admin-only navigation entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub birth_at: Option<NaiveDate>,
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApiClient {
    /// Exchange credentials for an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the credentials or the
    /// request fails.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<SessionToken, ApiError> {
        self.post_json("auth/login", credentials).await
    }

    /// Fetch the signed-in operator's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing/expired or the request
    /// fails.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<Profile, ApiError> {
        self.post_json_empty("auth/me").await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_wire_shape() {
        let token: SessionToken = serde_json::from_str(r#"{"accessToken":"tok123"}"#).unwrap();
        assert_eq!(token.access_token, "tok123");
    }

    #[test]
    fn test_credentials_serialize_as_plain_fields() {
        let credentials = Credentials {
            email: Email::parse("a@b.com").unwrap(),
            password: "secret".to_string(),
        };
        let json = serde_json::to_value(&credentials).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"email": "a@b.com", "password": "secret"})
        );
    }

    #[test]
    fn test_profile_tolerates_missing_timestamps() {
        let profile: Profile = serde_json::from_str(
            r#"{"id":1,"name":"Dana","email":"dana@harper.example","role":1}"#,
        )
        .unwrap();
        assert!(profile.role.is_admin());
        assert!(profile.created_at.is_none());
        assert!(profile.birth_at.is_none());
    }
}
