//! Producer console.
//!
//! Producers carry the largest attribute set in the system, so creation
//! gets a dedicated screen. The edit dialog reuses the same schema,
//! prefilled from the row. Free-text list inputs are comma-split and
//! numeric inputs decimal-parsed before anything reaches the backend.

use std::collections::HashMap;

use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use tower_sessions::Session;
use tracing::instrument;

use harper_core::ProducerId;

use crate::api::{Producer, ProducerPayload};
use crate::cache::QueryKey;
use crate::console::{ConsoleView, FormView, RowView};
use crate::error::AppError;
use crate::format;
use crate::forms::{FieldErrors, FieldSchema, FormSchema, ValidatedForm};
use crate::middleware::CurrentOperator;
use crate::session::{self, Flash};
use crate::state::AppState;

use super::{ConsoleIndexTemplate, ConsoleNewTemplate, ErroredTemplate, chrome, render};

const LIST_PATH: &str = "/producers";
const NEW_PATH: &str = "/producers/new";
const TITLE: &str = "Producers";
const COLUMNS: &[&str] = &["ID", "Name", "CPF/CNPJ", "E-mail", "Phone", "Created"];

fn schema() -> FormSchema {
    FormSchema::new()
        .field(FieldSchema::text("fullName", "Full name").required())
        .field(FieldSchema::tax_id("cpfCnpj", "CPF/CNPJ").required())
        .field(FieldSchema::date("birthDate", "Birth date"))
        .field(FieldSchema::text("identityDocument", "Identity document"))
        .field(FieldSchema::text("address", "Address"))
        .field(FieldSchema::text("phone", "Phone"))
        .field(FieldSchema::email("email", "E-mail"))
        .field(FieldSchema::text("companyName", "Company"))
        .field(FieldSchema::text("position", "Position"))
        .field(FieldSchema::text(
            "professionalRegistrationNumber",
            "Professional registration",
        ))
        .field(FieldSchema::text("operatingSegment", "Operating segment"))
        .field(FieldSchema::text("operatingRegion", "Operating region"))
        .field(FieldSchema::text("contractType", "Contract type"))
        .field(FieldSchema::text("contactPreference", "Contact preference"))
        .field(FieldSchema::text(
            "availableContactHours",
            "Available contact hours",
        ))
        .field(
            FieldSchema::integer("capturedClientCount", "Captured clients").min(Decimal::ZERO),
        )
        .field(FieldSchema::comma_list(
            "capturedInsuranceTypes",
            "Captured insurance types",
        ))
        .field(FieldSchema::date("startOfActivitiesDate", "Start of activities"))
        .field(
            FieldSchema::decimal("generatedBusinessVolume", "Generated business volume")
                .min(Decimal::ZERO),
        )
        .field(FieldSchema::decimal("conversionRate", "Conversion rate").min(Decimal::ZERO))
        .field(FieldSchema::checkbox("signedContract", "Signed contract"))
        .field(FieldSchema::comma_list(
            "certificatesLicenses",
            "Certificates and licenses",
        ))
        .field(FieldSchema::comma_list("references", "References"))
        .field(FieldSchema::text_area("additionalNotes", "Additional notes"))
        .field(FieldSchema::date("registrationDate", "Registration date"))
        .field(FieldSchema::text(
            "registrationResponsible",
            "Registered by",
        ))
}

fn payload(form: &ValidatedForm) -> Option<ProducerPayload> {
    let (full_name, tax_id) = (form.text("fullName")?, form.tax_id("cpfCnpj")?);
    let mut payload = ProducerPayload::new(full_name, tax_id);
    payload.birth_date = form.date("birthDate");
    payload.identity_document = form.text("identityDocument");
    payload.address = form.text("address");
    payload.phone = form.text("phone");
    payload.email = form.email("email");
    payload.company_name = form.text("companyName");
    payload.position = form.text("position");
    payload.professional_registration_number = form.text("professionalRegistrationNumber");
    payload.operating_segment = form.text("operatingSegment");
    payload.operating_region = form.text("operatingRegion");
    payload.contract_type = form.text("contractType");
    payload.contact_preference = form.text("contactPreference");
    payload.available_contact_hours = form.text("availableContactHours");
    payload.captured_client_count = form.integer("capturedClientCount");
    payload.captured_insurance_types = form.list("capturedInsuranceTypes");
    payload.start_of_activities_date = form.date("startOfActivitiesDate");
    payload.generated_business_volume = form.decimal("generatedBusinessVolume");
    payload.conversion_rate = form.decimal("conversionRate");
    payload.signed_contract = Some(form.flag("signedContract"));
    payload.certificates_licenses = form.list("certificatesLicenses");
    payload.references = form.list("references");
    payload.additional_notes = form.text("additionalNotes");
    payload.registration_date = form.date("registrationDate");
    payload.registration_responsible = form.text("registrationResponsible");
    Some(payload)
}

fn edit_values(producer: &Producer) -> HashMap<String, String> {
    let mut values = HashMap::from([
        ("fullName".to_string(), producer.full_name.clone()),
        ("cpfCnpj".to_string(), producer.tax_id.to_string()),
        ("birthDate".to_string(), format::opt_day(producer.birth_date)),
        (
            "startOfActivitiesDate".to_string(),
            format::opt_day(producer.start_of_activities_date),
        ),
        (
            "registrationDate".to_string(),
            format::opt_day(producer.registration_date),
        ),
        (
            "capturedInsuranceTypes".to_string(),
            format::list(producer.captured_insurance_types.as_ref()),
        ),
        (
            "certificatesLicenses".to_string(),
            format::list(producer.certificates_licenses.as_ref()),
        ),
        (
            "references".to_string(),
            format::list(producer.references.as_ref()),
        ),
        (
            "capturedClientCount".to_string(),
            producer
                .captured_client_count
                .map(|c| c.to_string())
                .unwrap_or_default(),
        ),
        (
            "generatedBusinessVolume".to_string(),
            format::opt_decimal(producer.generated_business_volume),
        ),
        (
            "conversionRate".to_string(),
            format::opt_decimal(producer.conversion_rate),
        ),
    ]);
    if producer.signed_contract == Some(true) {
        values.insert("signedContract".to_string(), "on".to_string());
    }
    if let Some(email) = &producer.email {
        values.insert("email".to_string(), email.to_string());
    }
    for (key, value) in [
        ("identityDocument", &producer.identity_document),
        ("address", &producer.address),
        ("phone", &producer.phone),
        ("companyName", &producer.company_name),
        ("position", &producer.position),
        (
            "professionalRegistrationNumber",
            &producer.professional_registration_number,
        ),
        ("operatingSegment", &producer.operating_segment),
        ("operatingRegion", &producer.operating_region),
        ("contractType", &producer.contract_type),
        ("contactPreference", &producer.contact_preference),
        ("availableContactHours", &producer.available_contact_hours),
        ("additionalNotes", &producer.additional_notes),
        ("registrationResponsible", &producer.registration_responsible),
    ] {
        if let Some(value) = value {
            values.insert(key.to_string(), value.clone());
        }
    }
    values
}

fn row(producer: &Producer) -> RowView {
    RowView {
        cells: vec![
            producer.id.to_string(),
            producer.full_name.clone(),
            producer.tax_id.to_string(),
            producer
                .email
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            format::opt(producer.phone.as_ref()),
            format::date(&producer.created_at),
        ],
        edit_action: format!("{LIST_PATH}/{}", producer.id),
        edit_open: false,
        edit: FormView::prefilled(&schema(), &edit_values(producer)),
        delete_action: format!("{LIST_PATH}/{}/delete", producer.id),
        delete_prompt: format!(
            "Permanently delete {}? This cannot be undone.",
            producer.full_name
        ),
    }
}

fn view(producers: &[Producer]) -> ConsoleView {
    ConsoleView::new(TITLE, "producer", COLUMNS)
        .rows(producers.iter().map(row).collect())
        .new_screen(NEW_PATH)
}

fn view_with_edit_open(
    producers: &[Producer],
    id: ProducerId,
    raw: &HashMap<String, String>,
    errors: &FieldErrors,
) -> ConsoleView {
    let rows = producers
        .iter()
        .map(|producer| {
            let mut r = row(producer);
            if producer.id == id {
                r.edit_open = true;
                r.edit = FormView::build(&schema(), raw, errors);
            }
            r
        })
        .collect();
    ConsoleView::new(TITLE, "producer", COLUMNS)
        .rows(rows)
        .new_screen(NEW_PATH)
}

fn new_screen_template(page: super::PageChrome, form: FormView) -> ConsoleNewTemplate {
    ConsoleNewTemplate {
        page,
        heading: "New producer".to_string(),
        singular: "producer".to_string(),
        action: LIST_PATH.to_string(),
        cancel_path: LIST_PATH.to_string(),
        form,
    }
}

/// Producer list screen.
#[instrument(skip(operator, state, session))]
pub async fn index(
    operator: CurrentOperator,
    State(state): State<AppState>,
    session: Session,
) -> Response {
    let CurrentOperator(profile) = operator;
    let page = chrome(TITLE, &profile, &session).await;
    match state.cache().producers(state.api()).await {
        Ok(producers) => render(&ConsoleIndexTemplate {
            page,
            view: view(&producers),
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
    let page = chrome("New producer", &profile, &session).await;
    render(&new_screen_template(page, FormView::blank(&schema()))).into_response()
}

/// Register a producer from the dedicated screen.
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
            let page = chrome("New producer", &profile, &session).await;
            return render(&new_screen_template(
                page,
                FormView::build(&form_schema, &raw, &errors),
            ))
            .into_response();
        }
    };

    let Some(payload) = payload(&form) else {
        return AppError::Internal("validated producer form missing fields".to_string())
            .into_response();
    };

    match state.api().create_producer(&payload).await {
        Ok(()) => {
            state.cache().invalidate(QueryKey::Producers).await;
            let _ = session::push_flash(&session, Flash::success("Producer registered.")).await;
            Redirect::to(LIST_PATH).into_response()
        }
        Err(err) => {
            let mut page = chrome("New producer", &profile, &session).await;
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
    let id = ProducerId::new(id);
    let form_schema = schema();

    let form = match form_schema.validate(&raw) {
        Ok(form) => form,
        Err(errors) => {
            let page = chrome(TITLE, &profile, &session).await;
            let producers = state
                .cache()
                .producers(state.api())
                .await
                .unwrap_or_default();
            return render(&ConsoleIndexTemplate {
                page,
                view: view_with_edit_open(&producers, id, &raw, &errors),
            })
            .into_response();
        }
    };

    let Some(payload) = payload(&form) else {
        return AppError::Internal("validated producer form missing fields".to_string())
            .into_response();
    };

    match state.api().update_producer(id, &payload).await {
        Ok(()) => {
            state.cache().invalidate(QueryKey::Producers).await;
            let _ = session::push_flash(&session, Flash::success("Producer updated.")).await;
            Redirect::to(LIST_PATH).into_response()
        }
        Err(err) => {
            let mut page = chrome(TITLE, &profile, &session).await;
            page.flashes.push(Flash::error(err.user_message()));
            let producers = state
                .cache()
                .producers(state.api())
                .await
                .unwrap_or_default();
            render(&ConsoleIndexTemplate {
                page,
                view: view_with_edit_open(&producers, id, &raw, &FieldErrors::default()),
            })
            .into_response()
        }
    }
}

/// Delete a producer after the confirmation step.
#[instrument(skip(operator, state, session))]
pub async fn delete(
    operator: CurrentOperator,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Response {
    let CurrentOperator(_) = operator;
    match state.api().delete_producer(ProducerId::new(id)).await {
        Ok(()) => {
            state.cache().invalidate(QueryKey::Producers).await;
            let _ = session::push_flash(&session, Flash::success("Producer deleted.")).await;
        }
        Err(err) => {
            let _ = session::push_flash(&session, Flash::error(err.user_message())).await;
        }
    }
    Redirect::to(LIST_PATH).into_response()
}
