//! Insurer console.
//!
//! Creation happens on a dedicated screen; name and policy number are
//! required, the company document must be a CNPJ, and the insurance-types
//! and certificates inputs are comma-split into arrays before submission.

use std::collections::HashMap;

use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use tower_sessions::Session;
use tracing::instrument;

use harper_core::InsurerId;

use crate::api::{Insurer, InsurerPayload};
use crate::cache::QueryKey;
use crate::console::{ConsoleView, FormView, RowView};
use crate::error::AppError;
use crate::format;
use crate::forms::{FieldErrors, FieldSchema, FormSchema, ValidatedForm};
use crate::middleware::CurrentOperator;
use crate::session::{self, Flash};
use crate::state::AppState;

use super::{ConsoleIndexTemplate, ConsoleNewTemplate, ErroredTemplate, chrome, render};

const LIST_PATH: &str = "/insurers";
const NEW_PATH: &str = "/insurers/new";
const TITLE: &str = "Insurers";
const COLUMNS: &[&str] = &[
    "ID",
    "Name",
    "Policy number",
    "Types",
    "Max coverage",
    "Status",
    "Created",
];

fn schema() -> FormSchema {
    FormSchema::new()
        .field(FieldSchema::text("name", "Name").required())
        .field(FieldSchema::text("policyNumber", "Policy number").required())
        .field(FieldSchema::cnpj("companyCnpj", "Company CNPJ"))
        .field(FieldSchema::text("address", "Address"))
        .field(FieldSchema::text("mainContact", "Main contact"))
        .field(FieldSchema::text("contactPhone", "Contact phone"))
        .field(FieldSchema::email("contactEmail", "Contact e-mail"))
        .field(FieldSchema::comma_list("insuranceTypes", "Insurance types"))
        .field(FieldSchema::date("establishmentDate", "Establishment date"))
        .field(
            FieldSchema::decimal("maxCoverageAmount", "Max coverage amount").min(Decimal::ZERO),
        )
        .field(FieldSchema::text("marketRating", "Market rating"))
        .field(FieldSchema::comma_list(
            "certificatesLicenses",
            "Certificates and licenses",
        ))
        .field(FieldSchema::text_area("additionalNotes", "Additional notes"))
        .field(FieldSchema::text("operatingStatus", "Operating status"))
}

fn payload(form: &ValidatedForm) -> Option<InsurerPayload> {
    let (name, policy_number) = (form.text("name")?, form.text("policyNumber")?);
    let mut payload = InsurerPayload::new(name, policy_number);
    payload.company_cnpj = form.tax_id("companyCnpj");
    payload.address = form.text("address");
    payload.main_contact = form.text("mainContact");
    payload.contact_phone = form.text("contactPhone");
    payload.contact_email = form.email("contactEmail");
    payload.insurance_types = form.list("insuranceTypes");
    payload.establishment_date = form.date("establishmentDate");
    payload.max_coverage_amount = form.decimal("maxCoverageAmount");
    payload.market_rating = form.text("marketRating");
    payload.certificates_licenses = form.list("certificatesLicenses");
    payload.additional_notes = form.text("additionalNotes");
    payload.operating_status = form.text("operatingStatus");
    Some(payload)
}

fn edit_values(insurer: &Insurer) -> HashMap<String, String> {
    let mut values = HashMap::from([
        ("name".to_string(), insurer.name.clone()),
        ("policyNumber".to_string(), insurer.policy_number.clone()),
        (
            "establishmentDate".to_string(),
            format::opt_day(insurer.establishment_date),
        ),
        (
            "insuranceTypes".to_string(),
            format::list(insurer.insurance_types.as_ref()),
        ),
        (
            "certificatesLicenses".to_string(),
            format::list(insurer.certificates_licenses.as_ref()),
        ),
        (
            "maxCoverageAmount".to_string(),
            format::opt_decimal(insurer.max_coverage_amount),
        ),
    ]);
    if let Some(cnpj) = &insurer.company_cnpj {
        values.insert("companyCnpj".to_string(), cnpj.to_string());
    }
    if let Some(email) = &insurer.contact_email {
        values.insert("contactEmail".to_string(), email.to_string());
    }
    for (key, value) in [
        ("address", &insurer.address),
        ("mainContact", &insurer.main_contact),
        ("contactPhone", &insurer.contact_phone),
        ("marketRating", &insurer.market_rating),
        ("additionalNotes", &insurer.additional_notes),
        ("operatingStatus", &insurer.operating_status),
    ] {
        if let Some(value) = value {
            values.insert(key.to_string(), value.clone());
        }
    }
    values
}

fn row(insurer: &Insurer) -> RowView {
    RowView {
        cells: vec![
            insurer.id.to_string(),
            insurer.name.clone(),
            insurer.policy_number.clone(),
            format::list(insurer.insurance_types.as_ref()),
            format::opt_amount(insurer.max_coverage_amount),
            format::opt(insurer.operating_status.as_ref()),
            format::date(&insurer.created_at),
        ],
        edit_action: format!("{LIST_PATH}/{}", insurer.id),
        edit_open: false,
        edit: FormView::prefilled(&schema(), &edit_values(insurer)),
        delete_action: format!("{LIST_PATH}/{}/delete", insurer.id),
        delete_prompt: format!(
            "Permanently delete {}? This cannot be undone.",
            insurer.name
        ),
    }
}

fn view(insurers: &[Insurer]) -> ConsoleView {
    ConsoleView::new(TITLE, "insurer", COLUMNS)
        .rows(insurers.iter().map(row).collect())
        .new_screen(NEW_PATH)
}

fn view_with_edit_open(
    insurers: &[Insurer],
    id: InsurerId,
    raw: &HashMap<String, String>,
    errors: &FieldErrors,
) -> ConsoleView {
    let rows = insurers
        .iter()
        .map(|insurer| {
            let mut r = row(insurer);
            if insurer.id == id {
                r.edit_open = true;
                r.edit = FormView::build(&schema(), raw, errors);
            }
            r
        })
        .collect();
    ConsoleView::new(TITLE, "insurer", COLUMNS)
        .rows(rows)
        .new_screen(NEW_PATH)
}

fn new_screen_template(page: super::PageChrome, form: FormView) -> ConsoleNewTemplate {
    ConsoleNewTemplate {
        page,
        heading: "New insurer".to_string(),
        singular: "insurer".to_string(),
        action: LIST_PATH.to_string(),
        cancel_path: LIST_PATH.to_string(),
        form,
    }
}

/// Insurer list screen.
#[instrument(skip(operator, state, session))]
pub async fn index(
    operator: CurrentOperator,
    State(state): State<AppState>,
    session: Session,
) -> Response {
    let CurrentOperator(profile) = operator;
    let page = chrome(TITLE, &profile, &session).await;
    match state.cache().insurers(state.api()).await {
        Ok(insurers) => render(&ConsoleIndexTemplate {
            page,
            view: view(&insurers),
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
    let page = chrome("New insurer", &profile, &session).await;
    render(&new_screen_template(page, FormView::blank(&schema()))).into_response()
}

/// Register an insurer from the dedicated screen.
#[instrument(skip(operator, state, session, raw))]
pub async fn create(
    operator: CurrentOperator,
    State(state): State<AppState>,
    session: Session,
    Form(raw): Form<HashMap<String, String>>,
) -> Response {
    let CurrentOperator(profile) = operator;
    let form_schema = schema();

    let form = match form_schema.validate(&raw) {
        Ok(form) => form,
        Err(errors) => {
            let page = chrome("New insurer", &profile, &session).await;
            return render(&new_screen_template(
                page,
                FormView::build(&form_schema, &raw, &errors),
            ))
            .into_response();
        }
    };

    let Some(payload) = payload(&form) else {
        return AppError::Internal("validated insurer form missing fields".to_string())
            .into_response();
    };

    match state.api().create_insurer(&payload).await {
        Ok(()) => {
            state.cache().invalidate(QueryKey::Insurers).await;
            let _ = session::push_flash(&session, Flash::success("Insurer registered.")).await;
            Redirect::to(LIST_PATH).into_response()
        }
        Err(err) => {
            let mut page = chrome("New insurer", &profile, &session).await;
            page.flashes.push(Flash::error(err.user_message()));
            render(&new_screen_template(
                page,
                FormView::build(&form_schema, &raw, &FieldErrors::default()),
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
    let id = InsurerId::new(id);
    let form_schema = schema();

    let form = match form_schema.validate(&raw) {
        Ok(form) => form,
        Err(errors) => {
            let page = chrome(TITLE, &profile, &session).await;
            let insurers = state.cache().insurers(state.api()).await.unwrap_or_default();
            return render(&ConsoleIndexTemplate {
                page,
                view: view_with_edit_open(&insurers, id, &raw, &errors),
            })
            .into_response();
        }
    };

    let Some(payload) = payload(&form) else {
        return AppError::Internal("validated insurer form missing fields".to_string())
            .into_response();
    };

    match state.api().update_insurer(id, &payload).await {
        Ok(()) => {
            state.cache().invalidate(QueryKey::Insurers).await;
            let _ = session::push_flash(&session, Flash::success("Insurer updated.")).await;
            Redirect::to(LIST_PATH).into_response()
        }
        Err(err) => {
            let mut page = chrome(TITLE, &profile, &session).await;
            page.flashes.push(Flash::error(err.user_message()));
            let insurers = state.cache().insurers(state.api()).await.unwrap_or_default();
            render(&ConsoleIndexTemplate {
                page,
                view: view_with_edit_open(&insurers, id, &raw, &FieldErrors::default()),
            })
            .into_response()
        }
    }
}

/// Delete an insurer after the confirmation step.
#[instrument(skip(operator, state, session))]
pub async fn delete(
    operator: CurrentOperator,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Response {
    let CurrentOperator(_) = operator;
    match state.api().delete_insurer(InsurerId::new(id)).await {
        Ok(()) => {
            state.cache().invalidate(QueryKey::Insurers).await;
            let _ = session::push_flash(&session, Flash::success("Insurer deleted.")).await;
        }
        Err(err) => {
            let _ = session::push_flash(&session, Flash::error(err.user_message())).await;
        }
    }
    Redirect::to(LIST_PATH).into_response()
}
