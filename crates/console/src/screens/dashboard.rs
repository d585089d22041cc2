//! Dashboard: the landing screen after sign-in.

use askama::Template;
use axum::response::{IntoResponse, Response};
use tower_sessions::Session;
use tracing::instrument;

use crate::middleware::CurrentOperator;

use super::{PageChrome, chrome, render};

/// Dashboard template.
///
/// The quick links and the navigation are driven by `page.is_admin`:
/// non-administrators never see the user-management entry.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: PageChrome,
}

/// Dashboard handler.
#[instrument(skip(operator, session))]
pub async fn index(operator: CurrentOperator, session: Session) -> Response {
    let CurrentOperator(profile) = operator;
    let page = chrome("Dashboard", &profile, &session).await;
    render(&DashboardTemplate { page }).into_response()
}
