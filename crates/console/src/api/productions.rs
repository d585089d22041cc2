//! Production (policy/service record) management operations.
//!
//! The production resource has asymmetric backend routes: records are listed
//! from `/productions`, created at `/production`, updated through
//! `/service/{id}`, and deleted through `/production/{id}`. The paths are
//! preserved exactly as the backend exposes them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use harper_core::ProductionId;

use super::{ApiClient, ApiError};

/// A production record as listed by `GET /productions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Production {
    pub id: ProductionId,
    pub service_name: String,
    pub insurance_company: String,
    pub producer: String,
    pub coverage_start_date: NaiveDate,
    pub coverage_end_date: NaiveDate,
    pub total_coverage_amount: Decimal,
    #[serde(default)]
    pub additional_description: Option<String>,
    #[serde(default)]
    pub aggregated_to: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for `POST /production` and `PUT /service/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionPayload {
    pub service_name: String,
    pub insurance_company: String,
    pub producer: String,
    pub coverage_start_date: NaiveDate,
    pub coverage_end_date: NaiveDate,
    pub total_coverage_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregated_to: Option<String>,
}

impl ApiClient {
    /// List all production records.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// decoded.
    #[instrument(skip(self))]
    pub async fn get_productions(&self) -> Result<Vec<Production>, ApiError> {
        self.get_json("productions").await
    }

    /// Create a production record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the payload or the request
    /// fails.
    #[instrument(skip(self, production), fields(service = %production.service_name))]
    pub async fn create_production(&self, production: &ProductionPayload) -> Result<(), ApiError> {
        self.post("production", production).await
    }

    /// Replace an existing production record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the payload or the request
    /// fails.
    #[instrument(skip(self, production))]
    pub async fn update_production(
        &self,
        id: ProductionId,
        production: &ProductionPayload,
    ) -> Result<(), ApiError> {
        self.put(&format!("service/{id}"), production).await
    }

    /// Delete a production record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the deletion or the request
    /// fails.
    #[instrument(skip(self))]
    pub async fn delete_production(&self, id: ProductionId) -> Result<(), ApiError> {
        self.delete(&format!("production/{id}")).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_amount_is_a_number() {
        let payload = ProductionPayload {
            service_name: "Fleet coverage".to_string(),
            insurance_company: "Atlas Seguros".to_string(),
            producer: "Rui Alves".to_string(),
            coverage_start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            coverage_end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            total_coverage_amount: Decimal::new(250_000_00, 2),
            additional_description: None,
            aggregated_to: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["totalCoverageAmount"].is_number());
        assert_eq!(json["coverageStartDate"], "2026-01-01");
        assert!(json.get("aggregatedTo").is_none());
    }

    #[test]
    fn test_production_wire_shape() {
        let production: Production = serde_json::from_str(
            r#"{
                "id": 9,
                "serviceName": "Fleet coverage",
                "insuranceCompany": "Atlas Seguros",
                "producer": "Rui Alves",
                "coverageStartDate": "2026-01-01",
                "coverageEndDate": "2026-12-31",
                "totalCoverageAmount": 250000.0,
                "createdAt": "2026-01-02T00:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(production.id, ProductionId::new(9));
        assert_eq!(production.coverage_end_date.to_string(), "2026-12-31");
    }
}
