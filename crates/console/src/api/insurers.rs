//! Insurer (insurance company) management operations.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use harper_core::{Email, InsurerId, TaxId};

use super::{ApiClient, ApiError};

/// An insurer as listed by `GET /insurance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insurer {
    pub id: InsurerId,
    pub name: String,
    pub policy_number: String,
    #[serde(default)]
    pub company_cnpj: Option<TaxId>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub main_contact: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<Email>,
    #[serde(default)]
    pub insurance_types: Option<Vec<String>>,
    #[serde(default)]
    pub establishment_date: Option<NaiveDate>,
    #[serde(default)]
    pub max_coverage_amount: Option<Decimal>,
    #[serde(default)]
    pub market_rating: Option<String>,
    #[serde(default)]
    pub certificates_licenses: Option<Vec<String>>,
    #[serde(default)]
    pub additional_notes: Option<String>,
    #[serde(default)]
    pub operating_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full payload for `POST /insurance` and `PATCH /insurance/{id}`.
///
/// `insurance_types` and `certificates_licenses` arrive here already
/// comma-split; `max_coverage_amount` is already decimal-parsed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsurerPayload {
    pub name: String,
    pub policy_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_cnpj: Option<TaxId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub establishment_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_coverage_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificates_licenses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_status: Option<String>,
}

impl InsurerPayload {
    /// Payload with only the required fields set.
    #[must_use]
    pub const fn new(name: String, policy_number: String) -> Self {
        Self {
            name,
            policy_number,
            company_cnpj: None,
            address: None,
            main_contact: None,
            contact_phone: None,
            contact_email: None,
            insurance_types: None,
            establishment_date: None,
            max_coverage_amount: None,
            market_rating: None,
            certificates_licenses: None,
            additional_notes: None,
            operating_status: None,
        }
    }
}

impl ApiClient {
    /// List all insurers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// decoded.
    #[instrument(skip(self))]
    pub async fn get_insurers(&self) -> Result<Vec<Insurer>, ApiError> {
        self.get_json("insurance").await
    }

    /// Register an insurer.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the payload or the request
    /// fails.
    #[instrument(skip(self, insurer), fields(name = %insurer.name))]
    pub async fn create_insurer(&self, insurer: &InsurerPayload) -> Result<(), ApiError> {
        self.post("insurance", insurer).await
    }

    /// Apply changes to an existing insurer.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the payload or the request
    /// fails.
    #[instrument(skip(self, insurer))]
    pub async fn update_insurer(
        &self,
        id: InsurerId,
        insurer: &InsurerPayload,
    ) -> Result<(), ApiError> {
        self.patch(&format!("insurance/{id}"), insurer).await
    }

    /// Delete an insurer.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the deletion or the request
    /// fails.
    #[instrument(skip(self))]
    pub async fn delete_insurer(&self, id: InsurerId) -> Result<(), ApiError> {
        self.delete(&format!("insurance/{id}")).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_serializes_arrays_and_numbers() {
        let mut payload =
            InsurerPayload::new("Atlas Seguros".to_string(), "POL-0042".to_string());
        payload.company_cnpj = Some(TaxId::parse_cnpj("12.345.678/0001-95").unwrap());
        payload.insurance_types = Some(vec!["auto".to_string(), "home".to_string()]);
        payload.max_coverage_amount = Some(Decimal::new(500_000_00, 2));

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["companyCnpj"], "12345678000195");
        assert_eq!(json["insuranceTypes"], serde_json::json!(["auto", "home"]));
        assert!(json["maxCoverageAmount"].is_number());
        assert!(json.get("marketRating").is_none());
    }

    #[test]
    fn test_insurer_wire_shape() {
        let insurer: Insurer = serde_json::from_str(
            r#"{
                "id": 2,
                "name": "Atlas Seguros",
                "policyNumber": "POL-0042",
                "insuranceTypes": ["auto"],
                "maxCoverageAmount": 500000.0,
                "createdAt": "2026-01-10T10:00:00Z",
                "updatedAt": "2026-01-11T10:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(insurer.id, InsurerId::new(2));
        assert_eq!(insurer.insurance_types.unwrap(), vec!["auto".to_string()]);
        assert!(insurer.max_coverage_amount.is_some());
    }
}
