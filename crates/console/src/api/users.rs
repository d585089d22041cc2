//! Staff user management operations (administrators only).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use harper_core::{Email, Role, UserId};

use super::{ApiClient, ApiError};

/// A staff user as listed by `GET /users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub birth_at: Option<NaiveDate>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation payload for `POST /users`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password: String,
}

/// Partial update payload for `PATCH /users/{id}`.
///
/// Only present fields are sent; a blank password in the edit dialog is
/// omitted entirely so the backend keeps the current one.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ApiClient {
    /// List all staff users.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// decoded.
    #[instrument(skip(self))]
    pub async fn get_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("users").await
    }

    /// Create a staff user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the payload or the request
    /// fails.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create_user(&self, user: &NewUser) -> Result<(), ApiError> {
        self.post("users", user).await
    }

    /// Apply changes to an existing user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the payload or the request
    /// fails.
    #[instrument(skip(self, changes))]
    pub async fn update_user(&self, id: UserId, changes: &UserChanges) -> Result<(), ApiError> {
        self.patch(&format!("users/{id}"), changes).await
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the deletion or the request
    /// fails.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.delete(&format!("users/{id}")).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_wire_shape() {
        let user: User = serde_json::from_str(
            r#"{
                "id": 3,
                "name": "Sam",
                "email": "sam@harper.example",
                "birthAt": "1990-04-02",
                "role": 2,
                "createdAt": "2026-01-05T12:00:00Z",
                "updatedAt": "2026-01-06T12:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(user.id, UserId::new(3));
        assert!(!user.role.is_admin());
        assert_eq!(user.birth_at.unwrap().to_string(), "1990-04-02");
    }

    #[test]
    fn test_changes_skip_absent_fields() {
        let changes = UserChanges {
            name: Some("Sam".to_string()),
            email: None,
            password: None,
        };
        let json = serde_json::to_string(&changes).unwrap();
        assert_eq!(json, r#"{"name":"Sam"}"#);
    }
}
