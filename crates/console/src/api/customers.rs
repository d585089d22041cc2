//! Customer management operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use harper_core::{CustomerId, Email, TaxId};

use super::{ApiClient, ApiError};

/// A customer as listed by `GET /customer`.
///
/// The list endpoint returns only this slim shape even though creation
/// collects the full [`CustomerPayload`]; whether the backend persists and
/// can return the extra fields is an open backend contract gap, so the
/// console neither displays nor re-fetches them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: Email,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation payload for `POST /customer`.
///
/// The "new customer" screen collects this superset of the list shape:
/// personal details, the full address, and contact data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    pub name: String,
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(rename = "cpfOrCnpj", skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<TaxId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_doc_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_billing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_complement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl CustomerPayload {
    /// Payload with only the required fields set.
    #[must_use]
    pub const fn new(name: String, email: Email) -> Self {
        Self {
            name,
            email,
            gender: None,
            tax_id: None,
            identity_doc_number: None,
            profession: None,
            average_billing: None,
            marital_status: None,
            postal_code: None,
            street: None,
            address_number: None,
            neighborhood: None,
            city: None,
            state: None,
            address_complement: None,
            phone: None,
        }
    }
}

/// Partial update payload for `PATCH /customer/{id}`.
///
/// The edit dialog exposes only the fields the list view renders.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
}

impl ApiClient {
    /// List all customers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// decoded.
    #[instrument(skip(self))]
    pub async fn get_customers(&self) -> Result<Vec<Customer>, ApiError> {
        self.get_json("customer").await
    }

    /// Create a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the payload or the request
    /// fails.
    #[instrument(skip(self, customer), fields(email = %customer.email))]
    pub async fn create_customer(&self, customer: &CustomerPayload) -> Result<(), ApiError> {
        self.post("customer", customer).await
    }

    /// Apply changes to an existing customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the payload or the request
    /// fails.
    #[instrument(skip(self, changes))]
    pub async fn update_customer(
        &self,
        id: CustomerId,
        changes: &CustomerChanges,
    ) -> Result<(), ApiError> {
        self.patch(&format!("customer/{id}"), changes).await
    }

    /// Delete a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the deletion or the request
    /// fails.
    #[instrument(skip(self))]
    pub async fn delete_customer(&self, id: CustomerId) -> Result<(), ApiError> {
        self.delete(&format!("customer/{id}")).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_uses_backend_field_names() {
        let mut payload = CustomerPayload::new(
            "Ana".to_string(),
            Email::parse("ana@example.com").unwrap(),
        );
        payload.tax_id = Some(TaxId::parse("123.456.789-09").unwrap());
        payload.neighborhood = Some("Centro".to_string());
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["cpfOrCnpj"], "12345678909");
        assert_eq!(json["neighborhood"], "Centro");
        assert!(json.get("phone").is_none());
    }

    #[test]
    fn test_customer_wire_shape() {
        let customer: Customer = serde_json::from_str(
            r#"{
                "id": 12,
                "name": "Ana",
                "email": "ana@example.com",
                "createdAt": "2026-02-01T09:30:00Z",
                "updatedAt": "2026-02-01T09:30:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(customer.id, CustomerId::new(12));
    }
}
