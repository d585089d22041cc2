//! Producer (broker/agent) management operations.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use harper_core::{Email, ProducerId, TaxId};

use super::{ApiClient, ApiError};

/// A producer as listed by `GET /producer`.
///
/// Producers carry a large optional attribute set: identity documents,
/// address, contract terms, captured-business metrics, certificates, and
/// registration metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Producer {
    pub id: ProducerId,
    pub full_name: String,
    #[serde(rename = "cpfCnpj")]
    pub tax_id: TaxId,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub identity_document: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub professional_registration_number: Option<String>,
    #[serde(default)]
    pub operating_segment: Option<String>,
    #[serde(default)]
    pub operating_region: Option<String>,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub contact_preference: Option<String>,
    #[serde(default)]
    pub available_contact_hours: Option<String>,
    #[serde(default)]
    pub captured_client_count: Option<i64>,
    #[serde(default)]
    pub captured_insurance_types: Option<Vec<String>>,
    #[serde(default)]
    pub start_of_activities_date: Option<NaiveDate>,
    #[serde(default)]
    pub generated_business_volume: Option<Decimal>,
    #[serde(default)]
    pub conversion_rate: Option<Decimal>,
    #[serde(default)]
    pub signed_contract: Option<bool>,
    #[serde(default)]
    pub certificates_licenses: Option<Vec<String>>,
    #[serde(default)]
    pub references: Option<Vec<String>>,
    #[serde(default)]
    pub additional_notes: Option<String>,
    #[serde(default)]
    pub registration_date: Option<NaiveDate>,
    #[serde(default)]
    pub registration_responsible: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full payload for `POST /producer` and `PATCH /producer/{id}`.
///
/// Free-text list inputs (captured insurance types, certificates,
/// references) arrive here already comma-split into arrays, and numeric
/// inputs already decimal-parsed - the backend expects typed JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerPayload {
    pub full_name: String,
    #[serde(rename = "cpfCnpj")]
    pub tax_id: TaxId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professional_registration_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_segment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_preference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_contact_hours: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_client_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_insurance_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_of_activities_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_business_volume: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_contract: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificates_licenses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_responsible: Option<String>,
}

impl ProducerPayload {
    /// Payload with only the required fields set.
    #[must_use]
    pub const fn new(full_name: String, tax_id: TaxId) -> Self {
        Self {
            full_name,
            tax_id,
            email: None,
            phone: None,
            address: None,
            birth_date: None,
            identity_document: None,
            company_name: None,
            position: None,
            professional_registration_number: None,
            operating_segment: None,
            operating_region: None,
            contract_type: None,
            contact_preference: None,
            available_contact_hours: None,
            captured_client_count: None,
            captured_insurance_types: None,
            start_of_activities_date: None,
            generated_business_volume: None,
            conversion_rate: None,
            signed_contract: None,
            certificates_licenses: None,
            references: None,
            additional_notes: None,
            registration_date: None,
            registration_responsible: None,
        }
    }
}

impl ApiClient {
    /// List all producers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// decoded.
    #[instrument(skip(self))]
    pub async fn get_producers(&self) -> Result<Vec<Producer>, ApiError> {
        self.get_json("producer").await
    }

    /// Register a producer.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the payload or the request
    /// fails.
    #[instrument(skip(self, producer), fields(full_name = %producer.full_name))]
    pub async fn create_producer(&self, producer: &ProducerPayload) -> Result<(), ApiError> {
        self.post("producer", producer).await
    }

    /// Apply changes to an existing producer.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the payload or the request
    /// fails.
    #[instrument(skip(self, producer))]
    pub async fn update_producer(
        &self,
        id: ProducerId,
        producer: &ProducerPayload,
    ) -> Result<(), ApiError> {
        self.patch(&format!("producer/{id}"), producer).await
    }

    /// Delete a producer.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the deletion or the request
    /// fails.
    #[instrument(skip(self))]
    pub async fn delete_producer(&self, id: ProducerId) -> Result<(), ApiError> {
        self.delete(&format!("producer/{id}")).await
    }
}
