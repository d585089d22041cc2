//! Sign-in and sign-out.

use askama::Template;
use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use std::collections::HashMap;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{ApiError, Credentials, NO_RESPONSE_MESSAGE};
use crate::cache::QueryKey;
use crate::console::FormView;
use crate::error::AppError;
use crate::forms::{FieldErrors, FieldSchema, FormSchema};
use crate::session::{self, Flash};
use crate::state::AppState;

use super::{PageChrome, render};

/// Sign-in screen template.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub page: PageChrome,
    pub form: FormView,
}

fn login_schema() -> FormSchema {
    FormSchema::new()
        .field(FieldSchema::email("email", "Your e-mail").required())
        .field(FieldSchema::password("password", "Your password").required())
}

/// Sign-in screen.
#[instrument(skip(session))]
pub async fn login_form(session: Session) -> Response {
    // Already signed in: straight to the dashboard.
    if session::access_token(&session).await.is_some() {
        return Redirect::to("/").into_response();
    }

    let page = PageChrome::signed_out("Sign in", session::take_flashes(&session).await);
    render(&LoginTemplate {
        page,
        form: FormView::blank(&login_schema()),
    })
    .into_response()
}

/// Handle a sign-in submission.
///
/// Validation failures never reach the backend; they re-render the form
/// with field errors. Backend rejections re-render with a notification and
/// the e-mail preserved.
#[instrument(skip(state, session, raw))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(raw): Form<HashMap<String, String>>,
) -> Response {
    let schema = login_schema();
    let form = match schema.validate(&raw) {
        Ok(form) => form,
        Err(errors) => {
            let page = PageChrome::signed_out("Sign in", Vec::new());
            return render(&LoginTemplate {
                page,
                form: FormView::build(&schema, &raw, &errors),
            })
            .into_response();
        }
    };

    let (Some(email), Some(password)) = (form.email("email"), form.text("password")) else {
        return AppError::Internal("validated sign-in form missing fields".to_string())
            .into_response();
    };

    match state.api().sign_in(&Credentials { email, password }).await {
        Ok(token) => {
            if let Err(e) = session::store_access_token(&session, &token.access_token).await {
                return AppError::Session(e).into_response();
            }
            state
                .api()
                .set_token(SecretString::from(token.access_token))
                .await;
            let _ = session::push_flash(&session, Flash::success("Welcome back.")).await;
            Redirect::to("/").into_response()
        }
        Err(err) => {
            // A rejected sign-in reads as bad credentials; only a transport
            // failure gets the connection message.
            let message = match err {
                ApiError::NoResponse(_) => NO_RESPONSE_MESSAGE.to_string(),
                _ => "Invalid credentials.".to_string(),
            };
            let page = PageChrome::signed_out("Sign in", vec![Flash::error(message)]);
            render(&LoginTemplate {
                page,
                form: FormView::build(&schema, &raw, &FieldErrors::default()),
            })
            .into_response()
        }
    }
}

/// Sign out: clear the client token, drop the cached profile, destroy the
/// session, and return to the sign-in screen.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    state.api().clear_token().await;
    state.cache().invalidate(QueryKey::Profile).await;
    let _ = session.flush().await;
    Redirect::to("/login").into_response()
}
