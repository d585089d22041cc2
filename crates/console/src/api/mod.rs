//! Brokerage backend REST client.
//!
//! This module provides a type-safe client for the brokerage REST API that
//! every screen talks to. One submodule per entity wraps the shared
//! [`ApiClient`] with typed request/response shapes; nothing outside this
//! module builds raw requests or inspects raw responses.
//!
//! # Architecture
//!
//! - `reqwest` for HTTP, JSON bodies only
//! - A process-wide bearer-token slot, set at sign-in and cleared at
//!   sign-out; every request attaches `Authorization: Bearer <token>` while a
//!   token is present
//! - Errors are classified exactly once, here, into [`ApiError`]; callers
//!   branch on the variant, never on response internals
//!
//! # Example
//!
//! ```rust,ignore
//! use harper_console::api::ApiClient;
//!
//! let client = ApiClient::new(config.backend_url.clone());
//!
//! let token = client.sign_in(&credentials).await?;
//! client.set_token(token.access_token.into()).await;
//!
//! let users = client.get_users().await?;
//! ```

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::sync::RwLock;
use url::Url;

mod auth;
mod customers;
mod insurers;
mod producers;
mod productions;
mod users;

pub use auth::{Credentials, Profile, SessionToken};
pub use customers::{Customer, CustomerChanges, CustomerPayload};
pub use insurers::{Insurer, InsurerPayload};
pub use producers::{Producer, ProducerPayload};
pub use productions::{Production, ProductionPayload};
pub use users::{NewUser, User, UserChanges};

/// Notification text for transport failures where no response was received.
pub const NO_RESPONSE_MESSAGE: &str = "No response from the server. Check your connection.";

/// Errors that can occur when talking to the brokerage backend.
///
/// The three spec-relevant outcomes are distinguishable by variant: success
/// (no error), an API error carrying the response (`Api`), and a transport
/// failure where no response arrived (`NoResponse`). Screens convert these
/// to operator-facing notifications via [`ApiError::user_message`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status. `message` holds the
    /// server-provided `{"message": ...}` body field when one was present.
    #[error("backend returned {status}")]
    Api {
        /// HTTP status of the response.
        status: StatusCode,
        /// Parsed `message` field of the error body, if any.
        message: Option<String>,
    },

    /// The request produced no response (connection refused, DNS failure,
    /// timeout, connection dropped mid-body).
    #[error("no response from the backend")]
    NoResponse(#[source] reqwest::Error),

    /// A 2xx response body failed to decode into the expected shape.
    #[error("failed to decode backend response")]
    Parse(#[from] serde_json::Error),
}

/// Error-body shape the backend uses for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// The notification text for this error.
    ///
    /// API errors surface the server-provided message when present, falling
    /// back to the HTTP status text. Transport failures surface the
    /// designated connection message, never a server message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { status, message } => message.clone().unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unexpected server error")
                    .to_string()
            }),
            Self::NoResponse(_) => NO_RESPONSE_MESSAGE.to_string(),
            Self::Parse(_) => "The server sent an unreadable response.".to_string(),
        }
    }

    /// Whether the backend rejected the operator's credentials/token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}

/// Client for the brokerage REST backend.
///
/// Cheap to clone; all clones share the HTTP connection pool and the
/// bearer-token slot. The token slot is process-wide mutable state with a
/// single writer at a time: sign-in sets it, sign-out clears it.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    /// Backend base URL, normalized to end with `/` so joins are relative.
    base_url: Url,
    /// Access token attached to every request while present.
    token: RwLock<Option<SecretString>>,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// `base_url` must end with a trailing slash (the config layer
    /// normalizes this) so that relative joins resolve under it.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                http: reqwest::Client::new(),
                base_url,
                token: RwLock::new(None),
            }),
        }
    }

    /// Attach an access token; subsequent requests send it as a bearer header.
    pub async fn set_token(&self, token: SecretString) {
        *self.inner.token.write().await = Some(token);
    }

    /// Clear the access token (sign-out).
    pub async fn clear_token(&self) {
        *self.inner.token.write().await = None;
    }

    /// Whether a token is currently attached.
    pub async fn has_token(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    fn endpoint(&self, path: &str) -> Url {
        // Paths are static, relative, and known-joinable against the
        // normalized base; a failure here is a programming error.
        self.inner
            .base_url
            .join(path)
            .unwrap_or_else(|_| self.inner.base_url.clone())
    }

    /// Issue a request and classify the outcome.
    ///
    /// Returns the raw body text of a 2xx response; every non-2xx response
    /// becomes [`ApiError::Api`] with the parsed `message` field when the
    /// body carries one, and transport failures become
    /// [`ApiError::NoResponse`].
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<String, ApiError> {
        let mut request = self.inner.http.request(method, self.endpoint(path));

        if let Some(token) = self.inner.token.read().await.as_ref() {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::NoResponse)?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::NoResponse)?;

        if status.is_success() {
            return Ok(text);
        }

        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message);
        Err(ApiError::Api { status, message })
    }

    /// GET a JSON resource.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let text = self.send::<()>(Method::GET, path, None).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// POST a JSON body and decode the JSON response.
    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let text = self.send(Method::POST, path, Some(body)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// POST with no request body, decoding the JSON response.
    pub(crate) async fn post_json_empty<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ApiError> {
        let text = self.send::<()>(Method::POST, path, None).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// POST a JSON body, discarding the response body.
    pub(crate) async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.send(Method::POST, path, Some(body)).await.map(|_| ())
    }

    /// PATCH a JSON body, discarding the response body.
    pub(crate) async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.send(Method::PATCH, path, Some(body)).await.map(|_| ())
    }

    /// PUT a JSON body, discarding the response body.
    pub(crate) async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.send(Method::PUT, path, Some(body)).await.map(|_| ())
    }

    /// DELETE a resource, discarding the response body.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send::<()>(Method::DELETE, path, None).await.map(|_| ())
    }
}
