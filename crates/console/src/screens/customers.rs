//! Customer console.
//!
//! The list renders the slim shape the backend returns; creation happens on
//! a dedicated screen that collects the full personal/address/contact set.
//! The backend persists whatever subset it supports - the list never shows
//! the extra fields, and the console does not try to read them back.

use std::collections::HashMap;

use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use harper_core::CustomerId;

use crate::api::{Customer, CustomerChanges, CustomerPayload};
use crate::cache::QueryKey;
use crate::console::{ConsoleView, FormView, RowView};
use crate::error::AppError;
use crate::format;
use crate::forms::{FieldErrors, FieldSchema, FormSchema, ValidatedForm};
use crate::middleware::CurrentOperator;
use crate::session::{self, Flash};
use crate::state::AppState;

use super::{ConsoleIndexTemplate, ConsoleNewTemplate, ErroredTemplate, chrome, render};

const LIST_PATH: &str = "/customers";
const NEW_PATH: &str = "/customers/new";
const TITLE: &str = "Customers";
const COLUMNS: &[&str] = &["ID", "Name", "E-mail", "Created"];

/// The extended creation form: a superset of the list shape.
fn create_schema() -> FormSchema {
    FormSchema::new()
        .field(FieldSchema::text("name", "Name").required())
        .field(FieldSchema::email("email", "E-mail").required())
        .field(FieldSchema::text("gender", "Gender"))
        .field(FieldSchema::tax_id("cpfOrCnpj", "CPF/CNPJ"))
        .field(FieldSchema::text("identityDocNumber", "Identity document"))
        .field(FieldSchema::text("profession", "Profession"))
        .field(FieldSchema::text("averageBilling", "Average income"))
        .field(FieldSchema::text("maritalStatus", "Marital status"))
        .field(FieldSchema::text("postalCode", "Postal code"))
        .field(FieldSchema::text("street", "Street"))
        .field(FieldSchema::text("addressNumber", "Number"))
        .field(FieldSchema::text("neighborhood", "Neighborhood"))
        .field(FieldSchema::text("city", "City"))
        .field(FieldSchema::text("state", "State"))
        .field(FieldSchema::text("addressComplement", "Complement"))
        .field(FieldSchema::text("phone", "Phone"))
}

/// The edit dialog exposes only what the list shape carries.
fn edit_schema() -> FormSchema {
    FormSchema::new()
        .field(FieldSchema::text("name", "Name"))
        .field(FieldSchema::email("email", "E-mail"))
}

fn payload(form: &ValidatedForm) -> Option<CustomerPayload> {
    let (name, email) = (form.text("name")?, form.email("email")?);
    let mut payload = CustomerPayload::new(name, email);
    payload.gender = form.text("gender");
    payload.tax_id = form.tax_id("cpfOrCnpj");
    payload.identity_doc_number = form.text("identityDocNumber");
    payload.profession = form.text("profession");
    payload.average_billing = form.text("averageBilling");
    payload.marital_status = form.text("maritalStatus");
    payload.postal_code = form.text("postalCode");
    payload.street = form.text("street");
    payload.address_number = form.text("addressNumber");
    payload.neighborhood = form.text("neighborhood");
    payload.city = form.text("city");
    payload.state = form.text("state");
    payload.address_complement = form.text("addressComplement");
    payload.phone = form.text("phone");
    Some(payload)
}

fn edit_values(customer: &Customer) -> HashMap<String, String> {
    HashMap::from([
        ("name".to_string(), customer.name.clone()),
        ("email".to_string(), customer.email.to_string()),
    ])
}

fn row(customer: &Customer) -> RowView {
    RowView {
        cells: vec![
            customer.id.to_string(),
            customer.name.clone(),
            customer.email.to_string(),
            format::date(&customer.created_at),
        ],
        edit_action: format!("{LIST_PATH}/{}", customer.id),
        edit_open: false,
        edit: FormView::prefilled(&edit_schema(), &edit_values(customer)),
        delete_action: format!("{LIST_PATH}/{}/delete", customer.id),
        delete_prompt: format!(
            "Permanently delete {}? This cannot be undone.",
            customer.name
        ),
    }
}

fn view(customers: &[Customer]) -> ConsoleView {
    ConsoleView::new(TITLE, "customer", COLUMNS)
        .rows(customers.iter().map(row).collect())
        .new_screen(NEW_PATH)
}

fn view_with_edit_open(
    customers: &[Customer],
    id: CustomerId,
    raw: &HashMap<String, String>,
    errors: &FieldErrors,
) -> ConsoleView {
    let rows = customers
        .iter()
        .map(|customer| {
            let mut r = row(customer);
            if customer.id == id {
                r.edit_open = true;
                r.edit = FormView::build(&edit_schema(), raw, errors);
            }
            r
        })
        .collect();
    ConsoleView::new(TITLE, "customer", COLUMNS)
        .rows(rows)
        .new_screen(NEW_PATH)
}

fn new_screen_template(page: super::PageChrome, form: FormView) -> ConsoleNewTemplate {
    ConsoleNewTemplate {
        page,
        heading: "New customer".to_string(),
        singular: "customer".to_string(),
        action: LIST_PATH.to_string(),
        cancel_path: LIST_PATH.to_string(),
        form,
    }
}

/// Customer list screen.
#[instrument(skip(operator, state, session))]
pub async fn index(
    operator: CurrentOperator,
    State(state): State<AppState>,
    session: Session,
) -> Response {
    let CurrentOperator(profile) = operator;
    let page = chrome(TITLE, &profile, &session).await;
    match state.cache().customers(state.api()).await {
        Ok(customers) => render(&ConsoleIndexTemplate {
            page,
            view: view(&customers),
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

/// Dedicated creation screen.
#[instrument(skip(operator, session))]
pub async fn new_form(operator: CurrentOperator, session: Session) -> Response {
    let CurrentOperator(profile) = operator;
    let page = chrome("New customer", &profile, &session).await;
    render(&new_screen_template(
        page,
        FormView::blank(&create_schema()),
    ))
    .into_response()
}

/// Create a customer from the dedicated screen.
#[instrument(skip(operator, state, session, raw))]
pub async fn create(
    operator: CurrentOperator,
    State(state): State<AppState>,
    session: Session,
    Form(raw): Form<HashMap<String, String>>,
) -> Response {
    let CurrentOperator(profile) = operator;
    let schema = create_schema();

    let form = match schema.validate(&raw) {
        Ok(form) => form,
        Err(errors) => {
            let page = chrome("New customer", &profile, &session).await;
            return render(&new_screen_template(
                page,
                FormView::build(&schema, &raw, &errors),
            ))
            .into_response();
        }
    };

    let Some(payload) = payload(&form) else {
        return AppError::Internal("validated customer form missing fields".to_string())
            .into_response();
    };

    match state.api().create_customer(&payload).await {
        Ok(()) => {
            state.cache().invalidate(QueryKey::Customers).await;
            let _ = session::push_flash(&session, Flash::success("Customer created.")).await;
            Redirect::to(LIST_PATH).into_response()
        }
        Err(err) => {
            let mut page = chrome("New customer", &profile, &session).await;
            page.flashes.push(Flash::error(err.user_message()));
            render(&new_screen_template(
                page,
                FormView::build(&schema, &raw, &FieldErrors::default()),
            ))
            .into_response()
        }
    }
}

/// Apply changes from a row's edit dialog.
#[instrument(skip(operator, state, session, raw))]
pub async fn update(
    operator: CurrentOperator,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Form(raw): Form<HashMap<String, String>>,
) -> Response {
    let CurrentOperator(profile) = operator;
    let id = CustomerId::new(id);
    let schema = edit_schema();

    let form = match schema.validate(&raw) {
        Ok(form) => form,
        Err(errors) => {
            let page = chrome(TITLE, &profile, &session).await;
            let customers = state
                .cache()
                .customers(state.api())
                .await
                .unwrap_or_default();
            return render(&ConsoleIndexTemplate {
                page,
                view: view_with_edit_open(&customers, id, &raw, &errors),
            })
            .into_response();
        }
    };

    let changes = CustomerChanges {
        name: form.text("name"),
        email: form.email("email"),
    };

    match state.api().update_customer(id, &changes).await {
        Ok(()) => {
            state.cache().invalidate(QueryKey::Customers).await;
            let _ = session::push_flash(&session, Flash::success("Customer updated.")).await;
            Redirect::to(LIST_PATH).into_response()
        }
        Err(err) => {
            let mut page = chrome(TITLE, &profile, &session).await;
            page.flashes.push(Flash::error(err.user_message()));
            let customers = state
                .cache()
                .customers(state.api())
                .await
                .unwrap_or_default();
            render(&ConsoleIndexTemplate {
                page,
                view: view_with_edit_open(&customers, id, &raw, &FieldErrors::default()),
            })
            .into_response()
        }
    }
}

/// Delete a customer after the confirmation step.
#[instrument(skip(operator, state, session))]
pub async fn delete(
    operator: CurrentOperator,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Response {
    let CurrentOperator(_) = operator;
    match state.api().delete_customer(CustomerId::new(id)).await {
        Ok(()) => {
            state.cache().invalidate(QueryKey::Customers).await;
            let _ = session::push_flash(&session, Flash::success("Customer deleted.")).await;
        }
        Err(err) => {
            let _ = session::push_flash(&session, Flash::error(err.user_message())).await;
        }
    }
    Redirect::to(LIST_PATH).into_response()
}
