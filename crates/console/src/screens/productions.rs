//! Production console.
//!
//! Production records are created and edited in dialogs on the list screen.
//! The coverage window and the total amount are required; the amount is
//! decimal-parsed and must be non-negative. Updates go through the
//! backend's `PUT /service/{id}` route.

use std::collections::HashMap;

use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use tower_sessions::Session;
use tracing::instrument;

use harper_core::ProductionId;

use crate::api::{Production, ProductionPayload};
use crate::cache::QueryKey;
use crate::console::{ConsoleView, FormView, RowView};
use crate::error::AppError;
use crate::format;
use crate::forms::{FieldErrors, FieldSchema, FormSchema, ValidatedForm};
use crate::middleware::CurrentOperator;
use crate::session::{self, Flash};
use crate::state::AppState;

use super::{ConsoleIndexTemplate, ErroredTemplate, chrome, render};

const LIST_PATH: &str = "/productions";
const TITLE: &str = "Production";
const COLUMNS: &[&str] = &[
    "ID",
    "Service",
    "Insurer",
    "Producer",
    "Coverage start",
    "Coverage end",
    "Total amount",
    "Created",
];

fn schema() -> FormSchema {
    FormSchema::new()
        .field(FieldSchema::text("serviceName", "Service name").required())
        .field(FieldSchema::text("insuranceCompany", "Insurer").required())
        .field(FieldSchema::text("producer", "Producer").required())
        .field(FieldSchema::date("coverageStartDate", "Coverage start").required())
        .field(FieldSchema::date("coverageEndDate", "Coverage end").required())
        .field(
            FieldSchema::decimal("totalCoverageAmount", "Total coverage amount")
                .required()
                .min(Decimal::ZERO),
        )
        .field(FieldSchema::text_area(
            "additionalDescription",
            "Additional description",
        ))
        .field(FieldSchema::text("aggregatedTo", "Aggregated to"))
}

fn payload(form: &ValidatedForm) -> Option<ProductionPayload> {
    Some(ProductionPayload {
        service_name: form.text("serviceName")?,
        insurance_company: form.text("insuranceCompany")?,
        producer: form.text("producer")?,
        coverage_start_date: form.date("coverageStartDate")?,
        coverage_end_date: form.date("coverageEndDate")?,
        total_coverage_amount: form.decimal("totalCoverageAmount")?,
        additional_description: form.text("additionalDescription"),
        aggregated_to: form.text("aggregatedTo"),
    })
}

fn edit_values(production: &Production) -> HashMap<String, String> {
    let mut values = HashMap::from([
        ("serviceName".to_string(), production.service_name.clone()),
        (
            "insuranceCompany".to_string(),
            production.insurance_company.clone(),
        ),
        ("producer".to_string(), production.producer.clone()),
        (
            "coverageStartDate".to_string(),
            format::day(production.coverage_start_date),
        ),
        (
            "coverageEndDate".to_string(),
            format::day(production.coverage_end_date),
        ),
        (
            "totalCoverageAmount".to_string(),
            production.total_coverage_amount.to_string(),
        ),
    ]);
    if let Some(description) = &production.additional_description {
        values.insert("additionalDescription".to_string(), description.clone());
    }
    if let Some(aggregated_to) = &production.aggregated_to {
        values.insert("aggregatedTo".to_string(), aggregated_to.clone());
    }
    values
}

fn row(production: &Production) -> RowView {
    RowView {
        cells: vec![
            production.id.to_string(),
            production.service_name.clone(),
            production.insurance_company.clone(),
            production.producer.clone(),
            format::day(production.coverage_start_date),
            format::day(production.coverage_end_date),
            format::amount(production.total_coverage_amount),
            format::date(&production.created_at),
        ],
        edit_action: format!("{LIST_PATH}/{}", production.id),
        edit_open: false,
        edit: FormView::prefilled(&schema(), &edit_values(production)),
        delete_action: format!("{LIST_PATH}/{}/delete", production.id),
        delete_prompt: format!(
            "Permanently delete {}? This cannot be undone.",
            production.service_name
        ),
    }
}

fn view(productions: &[Production], create_form: FormView, create_open: bool) -> ConsoleView {
    ConsoleView::new(TITLE, "production record", COLUMNS)
        .rows(productions.iter().map(row).collect())
        .create_dialog(LIST_PATH, create_form, create_open)
}

fn view_with_edit_open(
    productions: &[Production],
    id: ProductionId,
    raw: &HashMap<String, String>,
    errors: &FieldErrors,
) -> ConsoleView {
    let rows = productions
        .iter()
        .map(|production| {
            let mut r = row(production);
            if production.id == id {
                r.edit_open = true;
                r.edit = FormView::build(&schema(), raw, errors);
            }
            r
        })
        .collect();
    ConsoleView::new(TITLE, "production record", COLUMNS)
        .rows(rows)
        .create_dialog(LIST_PATH, FormView::blank(&schema()), false)
}

/// Production list screen.
#[instrument(skip(operator, state, session))]
pub async fn index(
    operator: CurrentOperator,
    State(state): State<AppState>,
    session: Session,
) -> Response {
    let CurrentOperator(profile) = operator;
    let page = chrome(TITLE, &profile, &session).await;
    match state.cache().productions(state.api()).await {
        Ok(productions) => render(&ConsoleIndexTemplate {
            page,
            view: view(&productions, FormView::blank(&schema()), false),
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

/// Create a production record from the inline dialog.
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
            let page = chrome(TITLE, &profile, &session).await;
            let productions = state
                .cache()
                .productions(state.api())
                .await
                .unwrap_or_default();
            return render(&ConsoleIndexTemplate {
                page,
                view: view(
                    &productions,
                    FormView::build(&form_schema, &raw, &errors),
                    true,
                ),
            })
            .into_response();
        }
    };

    let Some(payload) = payload(&form) else {
        return AppError::Internal("validated production form missing fields".to_string())
            .into_response();
    };

    match state.api().create_production(&payload).await {
        Ok(()) => {
            state.cache().invalidate(QueryKey::Productions).await;
            let _ =
                session::push_flash(&session, Flash::success("Production record created.")).await;
            Redirect::to(LIST_PATH).into_response()
        }
        Err(err) => {
            let mut page = chrome(TITLE, &profile, &session).await;
            page.flashes.push(Flash::error(err.user_message()));
            let productions = state
                .cache()
                .productions(state.api())
                .await
                .unwrap_or_default();
            render(&ConsoleIndexTemplate {
                page,
                view: view(
                    &productions,
                    FormView::build(&form_schema, &raw, &FieldErrors::default()),
                    true,
                ),
            })
            .into_response()
        }
    }
}

/// Replace a production record from a row's edit dialog.
#[instrument(skip(operator, state, session, raw))]
pub async fn update(
    operator: CurrentOperator,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Form(raw): Form<HashMap<String, String>>,
) -> Response {
    let CurrentOperator(profile) = operator;
    let id = ProductionId::new(id);
    let form_schema = schema();

    let form = match form_schema.validate(&raw) {
        Ok(form) => form,
        Err(errors) => {
            let page = chrome(TITLE, &profile, &session).await;
            let productions = state
                .cache()
                .productions(state.api())
                .await
                .unwrap_or_default();
            return render(&ConsoleIndexTemplate {
                page,
                view: view_with_edit_open(&productions, id, &raw, &errors),
            })
            .into_response();
        }
    };

    let Some(payload) = payload(&form) else {
        return AppError::Internal("validated production form missing fields".to_string())
            .into_response();
    };

    match state.api().update_production(id, &payload).await {
        Ok(()) => {
            state.cache().invalidate(QueryKey::Productions).await;
            let _ =
                session::push_flash(&session, Flash::success("Production record updated.")).await;
            Redirect::to(LIST_PATH).into_response()
        }
        Err(err) => {
            let mut page = chrome(TITLE, &profile, &session).await;
            page.flashes.push(Flash::error(err.user_message()));
            let productions = state
                .cache()
                .productions(state.api())
                .await
                .unwrap_or_default();
            render(&ConsoleIndexTemplate {
                page,
                view: view_with_edit_open(&productions, id, &raw, &FieldErrors::default()),
            })
            .into_response()
        }
    }
}

/// Delete a production record after the confirmation step.
#[instrument(skip(operator, state, session))]
pub async fn delete(
    operator: CurrentOperator,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Response {
    let CurrentOperator(_) = operator;
    match state.api().delete_production(ProductionId::new(id)).await {
        Ok(()) => {
            state.cache().invalidate(QueryKey::Productions).await;
            let _ =
                session::push_flash(&session, Flash::success("Production record deleted.")).await;
        }
        Err(err) => {
            let _ = session::push_flash(&session, Flash::error(err.user_message())).await;
        }
    }
    Redirect::to(LIST_PATH).into_response()
}
