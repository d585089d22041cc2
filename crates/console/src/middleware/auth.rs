//! Authentication extractors.
//!
//! Provides extractors for requiring a signed-in operator (and, for the
//! user-management screen, an administrator) in route handlers.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use tower_sessions::Session;

use crate::api::Profile;
use crate::session;
use crate::state::AppState;

/// Extractor that requires a signed-in operator.
///
/// If no access token is stored in the session, the request is redirected
/// to the sign-in screen and nothing else renders. If a token is present it
/// is attached to the backend client before the handler runs, and the
/// operator's profile is resolved through the query cache (fetched once per
/// session, served from cache afterwards).
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     CurrentOperator(profile): CurrentOperator,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", profile.name)
/// }
/// ```
pub struct CurrentOperator(pub Profile);

/// Rejection for unauthenticated or unresolvable operators.
pub enum AuthRejection {
    /// No token, or the backend no longer accepts it.
    RedirectToLogin,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
        }
    }
}

impl FromRequestParts<AppState> for CurrentOperator {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::RedirectToLogin)?;

        let token = session::access_token(session)
            .await
            .ok_or(AuthRejection::RedirectToLogin)?;

        // Attach the token to the backend client before rendering children.
        state.api().set_token(SecretString::from(token)).await;

        // Resolve the profile through the cache. A failure here means the
        // token went bad (expired, revoked, backend restart), so the only
        // sensible place to send the operator is the sign-in screen.
        let profile = state
            .cache()
            .profile(state.api())
            .await
            .map_err(|_| AuthRejection::RedirectToLogin)?;

        Ok(Self(profile))
    }
}

/// Extractor that requires an administrator.
///
/// Builds on [`CurrentOperator`]: unauthenticated requests redirect to the
/// sign-in screen, and authenticated non-administrators are sent back to
/// the dashboard *after* the profile query resolves - the role is not known
/// before that, so no privileged UI can flash first.
pub struct RequireAdmin(pub Profile);

/// Rejection for the administrator gate.
pub enum AdminRejection {
    /// Not signed in.
    RedirectToLogin,
    /// Signed in, but not an administrator.
    RedirectToDashboard,
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::RedirectToDashboard => Redirect::to("/").into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentOperator(profile) = CurrentOperator::from_request_parts(parts, state)
            .await
            .map_err(|AuthRejection::RedirectToLogin| AdminRejection::RedirectToLogin)?;

        if !profile.role.is_admin() {
            return Err(AdminRejection::RedirectToDashboard);
        }

        Ok(Self(profile))
    }
}
