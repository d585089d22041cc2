//! Staff user console (administrators only).
//!
//! Users are created and edited in dialogs on the list screen. The whole
//! screen sits behind [`RequireAdmin`]: non-administrators are redirected
//! to the dashboard once their profile resolves.

use std::collections::HashMap;

use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use harper_core::UserId;

use crate::api::{NewUser, User, UserChanges};
use crate::cache::QueryKey;
use crate::console::{ConsoleView, FormView, RowView};
use crate::error::AppError;
use crate::format;
use crate::forms::{FieldErrors, FieldSchema, FormSchema};
use crate::middleware::RequireAdmin;
use crate::session::{self, Flash};
use crate::state::AppState;

use super::{ConsoleIndexTemplate, ErroredTemplate, chrome, render};

const LIST_PATH: &str = "/users";
const TITLE: &str = "Users";
const COLUMNS: &[&str] = &["ID", "Created", "Role", "Name", "E-mail"];

fn create_schema() -> FormSchema {
    FormSchema::new()
        .field(FieldSchema::text("name", "Name").required())
        .field(FieldSchema::email("email", "E-mail").required())
        .field(FieldSchema::password("password", "Password").required())
}

fn edit_schema() -> FormSchema {
    FormSchema::new()
        .field(FieldSchema::text("name", "Name"))
        .field(FieldSchema::email("email", "E-mail"))
        .field(FieldSchema::password("password", "Password"))
}

fn edit_values(user: &User) -> HashMap<String, String> {
    HashMap::from([
        ("name".to_string(), user.name.clone()),
        ("email".to_string(), user.email.to_string()),
    ])
}

fn row(user: &User) -> RowView {
    RowView {
        cells: vec![
            user.id.to_string(),
            format::date(&user.created_at),
            user.role.label().to_string(),
            user.name.clone(),
            user.email.to_string(),
        ],
        edit_action: format!("{LIST_PATH}/{}", user.id),
        edit_open: false,
        edit: FormView::prefilled(&edit_schema(), &edit_values(user)),
        delete_action: format!("{LIST_PATH}/{}/delete", user.id),
        delete_prompt: format!("Permanently delete {}? This cannot be undone.", user.name),
    }
}

fn view(users: &[User], create_form: FormView, create_open: bool) -> ConsoleView {
    ConsoleView::new(TITLE, "user", COLUMNS)
        .rows(users.iter().map(row).collect())
        .create_dialog(LIST_PATH, create_form, create_open)
}

fn view_with_edit_open(
    users: &[User],
    id: UserId,
    raw: &HashMap<String, String>,
    errors: &FieldErrors,
) -> ConsoleView {
    let rows = users
        .iter()
        .map(|user| {
            let mut r = row(user);
            if user.id == id {
                r.edit_open = true;
                r.edit = FormView::build(&edit_schema(), raw, errors);
            }
            r
        })
        .collect();
    ConsoleView::new(TITLE, "user", COLUMNS)
        .rows(rows)
        .create_dialog(LIST_PATH, FormView::blank(&create_schema()), false)
}

/// User list screen.
#[instrument(skip(admin, state, session))]
pub async fn index(
    admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> Response {
    let RequireAdmin(profile) = admin;
    let page = chrome(TITLE, &profile, &session).await;
    match state.cache().users(state.api()).await {
        Ok(users) => render(&ConsoleIndexTemplate {
            page,
            view: view(&users, FormView::blank(&create_schema()), false),
        })
        .into_response(),
        Err(err) => render(&ErroredTemplate {
            page,
            heading: TITLE.to_string(),
            message: err.user_message(),
            retry_path: LIST_PATH.to_string(),
        })
        .into_response(),
    }
}

/// Create a user from the inline dialog.
#[instrument(skip(admin, state, session, raw))]
pub async fn create(
    admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(raw): Form<HashMap<String, String>>,
) -> Response {
    let RequireAdmin(profile) = admin;
    let schema = create_schema();

    let form = match schema.validate(&raw) {
        Ok(form) => form,
        Err(errors) => {
            // Validation blocks the backend call; re-render with the dialog
            // open and the operator's input preserved.
            let page = chrome(TITLE, &profile, &session).await;
            let users = state.cache().users(state.api()).await.unwrap_or_default();
            return render(&ConsoleIndexTemplate {
                page,
                view: view(&users, FormView::build(&schema, &raw, &errors), true),
            })
            .into_response();
        }
    };

    let (Some(name), Some(email), Some(password)) = (
        form.text("name"),
        form.email("email"),
        form.text("password"),
    ) else {
        return AppError::Internal("validated user form missing fields".to_string())
            .into_response();
    };

    match state
        .api()
        .create_user(&NewUser {
            name,
            email,
            password,
        })
        .await
    {
        Ok(()) => {
            state.cache().invalidate(QueryKey::Users).await;
            let _ = session::push_flash(&session, Flash::success("User created.")).await;
            Redirect::to(LIST_PATH).into_response()
        }
        Err(err) => {
            let mut page = chrome(TITLE, &profile, &session).await;
            page.flashes.push(Flash::error(err.user_message()));
            let users = state.cache().users(state.api()).await.unwrap_or_default();
            render(&ConsoleIndexTemplate {
                page,
                view: view(
                    &users,
                    FormView::build(&schema, &raw, &FieldErrors::default()),
                    true,
                ),
            })
            .into_response()
        }
    }
}

/// Apply changes from a row's edit dialog.
#[instrument(skip(admin, state, session, raw))]
pub async fn update(
    admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Form(raw): Form<HashMap<String, String>>,
) -> Response {
    let RequireAdmin(profile) = admin;
    let id = UserId::new(id);
    let schema = edit_schema();

    let form = match schema.validate(&raw) {
        Ok(form) => form,
        Err(errors) => {
            let page = chrome(TITLE, &profile, &session).await;
            let users = state.cache().users(state.api()).await.unwrap_or_default();
            return render(&ConsoleIndexTemplate {
                page,
                view: view_with_edit_open(&users, id, &raw, &errors),
            })
            .into_response();
        }
    };

    // A blank password means "keep the current one": the field is omitted
    // from the payload entirely.
    let changes = UserChanges {
        name: form.text("name"),
        email: form.email("email"),
        password: form.text("password"),
    };

    match state.api().update_user(id, &changes).await {
        Ok(()) => {
            state.cache().invalidate(QueryKey::Users).await;
            let _ = session::push_flash(&session, Flash::success("User updated.")).await;
            Redirect::to(LIST_PATH).into_response()
        }
        Err(err) => {
            // Keep the dialog open with the submitted values so the edit is
            // not lost; surface the backend's message.
            let mut page = chrome(TITLE, &profile, &session).await;
            page.flashes.push(Flash::error(err.user_message()));
            let users = state.cache().users(state.api()).await.unwrap_or_default();
            render(&ConsoleIndexTemplate {
                page,
                view: view_with_edit_open(&users, id, &raw, &FieldErrors::default()),
            })
            .into_response()
        }
    }
}

/// Delete a user after the confirmation step.
#[instrument(skip(admin, state, session))]
pub async fn delete(
    admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Response {
    let RequireAdmin(_) = admin;
    match state.api().delete_user(UserId::new(id)).await {
        Ok(()) => {
            state.cache().invalidate(QueryKey::Users).await;
            let _ = session::push_flash(&session, Flash::success("User deleted.")).await;
        }
        Err(err) => {
            let _ = session::push_flash(&session, Flash::error(err.user_message())).await;
        }
    }
    Redirect::to(LIST_PATH).into_response()
}
