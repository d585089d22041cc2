//! Form schemas: submit-time validation and coercion.
//!
//! Each entity screen declares a [`FormSchema`] - an ordered set of
//! [`FieldSchema`] descriptors built with the same config-object style the
//! console views use. The schema drives three things:
//!
//! - rendering (label, input type, required marker),
//! - submit-time validation with field-scoped error messages that block the
//!   backend call entirely,
//! - coercion from raw form strings into the typed values the wire payloads
//!   need: comma-separated text into trimmed arrays, decimal text into
//!   [`Decimal`], `YYYY-MM-DD` text into dates, emails and tax documents
//!   into their validated core types.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use harper_core::{Email, TaxId};

/// How a field is typed, validated, and coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Free text rendered as a multi-line input.
    TextArea,
    /// Validated email address.
    Email,
    /// Password input (validated as text, rendered masked).
    Password,
    /// CPF or CNPJ, normalized to digits.
    TaxId,
    /// CNPJ only (14 digits), normalized to digits.
    Cnpj,
    /// `YYYY-MM-DD` date.
    Date,
    /// Decimal number, optionally bounded.
    Decimal,
    /// Whole number, optionally bounded.
    Integer,
    /// Checkbox; absent means `false`.
    Bool,
    /// Comma-separated text coerced into a trimmed string array.
    CommaList,
}

impl FieldKind {
    /// The HTML input type used to render this field.
    #[must_use]
    pub const fn input_type(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::Date => "date",
            Self::Bool => "checkbox",
            Self::Text
            | Self::TextArea
            | Self::TaxId
            | Self::Cnpj
            | Self::Decimal
            | Self::Integer
            | Self::CommaList => "text",
        }
    }
}

/// One field descriptor inside a [`FormSchema`].
#[derive(Debug, Clone)]
pub struct FieldSchema {
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    required: bool,
    min_len: Option<usize>,
    min: Option<Decimal>,
    max: Option<Decimal>,
}

impl FieldSchema {
    const fn with_kind(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            min_len: None,
            min: None,
            max: None,
        }
    }

    /// Free-text field.
    #[must_use]
    pub const fn text(name: &'static str, label: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::Text)
    }

    /// Multi-line text field.
    #[must_use]
    pub const fn text_area(name: &'static str, label: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::TextArea)
    }

    /// Email field.
    #[must_use]
    pub const fn email(name: &'static str, label: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::Email)
    }

    /// Password field.
    #[must_use]
    pub const fn password(name: &'static str, label: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::Password)
    }

    /// CPF/CNPJ field.
    #[must_use]
    pub const fn tax_id(name: &'static str, label: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::TaxId)
    }

    /// CNPJ-only field.
    #[must_use]
    pub const fn cnpj(name: &'static str, label: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::Cnpj)
    }

    /// Date field (`YYYY-MM-DD`).
    #[must_use]
    pub const fn date(name: &'static str, label: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::Date)
    }

    /// Decimal number field.
    #[must_use]
    pub const fn decimal(name: &'static str, label: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::Decimal)
    }

    /// Whole-number field.
    #[must_use]
    pub const fn integer(name: &'static str, label: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::Integer)
    }

    /// Checkbox field.
    #[must_use]
    pub const fn checkbox(name: &'static str, label: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::Bool)
    }

    /// Comma-separated list field.
    #[must_use]
    pub const fn comma_list(name: &'static str, label: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::CommaList)
    }

    /// Mark the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Require at least `len` characters (text kinds).
    #[must_use]
    pub const fn min_len(mut self, len: usize) -> Self {
        self.min_len = Some(len);
        self
    }

    /// Lower bound for numeric kinds.
    #[must_use]
    pub const fn min(mut self, min: Decimal) -> Self {
        self.min = Some(min);
        self
    }

    /// Upper bound for numeric kinds.
    #[must_use]
    pub const fn max(mut self, max: Decimal) -> Self {
        self.max = Some(max);
        self
    }

    /// Field name, as submitted.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Field kind.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Whether the field is required.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }
}

/// A coerced, validated field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Email(Email),
    TaxId(TaxId),
    Date(NaiveDate),
    Decimal(Decimal),
    Integer(i64),
    Bool(bool),
    List(Vec<String>),
}

/// Validated, coerced form values keyed by field name.
///
/// Optional fields submitted blank have no entry; the typed accessors
/// return `None` for them so payload mapping stays uniform.
#[derive(Debug, Clone, Default)]
pub struct ValidatedForm {
    values: BTreeMap<&'static str, FieldValue>,
}

impl ValidatedForm {
    /// Text value of a text-like field.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<String> {
        match self.values.get(name) {
            Some(FieldValue::Text(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Validated email value.
    #[must_use]
    pub fn email(&self, name: &str) -> Option<Email> {
        match self.values.get(name) {
            Some(FieldValue::Email(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Validated tax-document value.
    #[must_use]
    pub fn tax_id(&self, name: &str) -> Option<TaxId> {
        match self.values.get(name) {
            Some(FieldValue::TaxId(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Coerced date value.
    #[must_use]
    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.values.get(name) {
            Some(FieldValue::Date(value)) => Some(*value),
            _ => None,
        }
    }

    /// Coerced decimal value.
    #[must_use]
    pub fn decimal(&self, name: &str) -> Option<Decimal> {
        match self.values.get(name) {
            Some(FieldValue::Decimal(value)) => Some(*value),
            _ => None,
        }
    }

    /// Coerced integer value.
    #[must_use]
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(FieldValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    /// Checkbox state; unchecked/absent is `false`.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(FieldValue::Bool(true)))
    }

    /// Coerced list value.
    #[must_use]
    pub fn list(&self, name: &str) -> Option<Vec<String>> {
        match self.values.get(name) {
            Some(FieldValue::List(value)) => Some(value.clone()),
            _ => None,
        }
    }
}

/// Field-scoped validation errors, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, String>,
}

impl FieldErrors {
    /// The error message for a field, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    /// Whether any field failed validation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn insert(&mut self, name: &'static str, message: String) {
        self.errors.entry(name).or_insert(message);
    }
}

/// An ordered set of field descriptors for one entity form.
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    fields: Vec<FieldSchema>,
}

impl FormSchema {
    /// Empty schema.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Append a field.
    #[must_use]
    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// The field descriptors, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Validate and coerce raw form values.
    ///
    /// Runs at submit time. Missing optional fields yield no entry; any
    /// failure blocks submission with a message per offending field.
    ///
    /// # Errors
    ///
    /// Returns the field-scoped messages when any field fails.
    pub fn validate(&self, raw: &HashMap<String, String>) -> Result<ValidatedForm, FieldErrors> {
        let mut form = ValidatedForm::default();
        let mut errors = FieldErrors::default();

        for field in &self.fields {
            let raw_value = raw.get(field.name).map_or("", |s| s.trim());

            if raw_value.is_empty() {
                if field.kind == FieldKind::Bool {
                    // Unchecked checkboxes are absent from the submission.
                    form.values.insert(field.name, FieldValue::Bool(false));
                } else if field.required {
                    errors.insert(field.name, format!("{} is required", field.label));
                }
                continue;
            }

            match Self::coerce(field, raw_value) {
                Ok(value) => {
                    form.values.insert(field.name, value);
                }
                Err(message) => errors.insert(field.name, message),
            }
        }

        if errors.is_empty() { Ok(form) } else { Err(errors) }
    }

    fn coerce(field: &FieldSchema, raw: &str) -> Result<FieldValue, String> {
        match field.kind {
            FieldKind::Text | FieldKind::TextArea | FieldKind::Password => {
                if let Some(min_len) = field.min_len
                    && raw.chars().count() < min_len
                {
                    return Err(format!(
                        "{} must have at least {min_len} characters",
                        field.label
                    ));
                }
                Ok(FieldValue::Text(raw.to_string()))
            }
            FieldKind::Email => Email::parse(raw)
                .map(FieldValue::Email)
                .map_err(|e| e.to_string()),
            FieldKind::TaxId => TaxId::parse(raw)
                .map(FieldValue::TaxId)
                .map_err(|e| e.to_string()),
            FieldKind::Cnpj => TaxId::parse_cnpj(raw)
                .map(FieldValue::TaxId)
                .map_err(|e| e.to_string()),
            FieldKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(FieldValue::Date)
                .map_err(|_| format!("{} must be a date in YYYY-MM-DD format", field.label)),
            FieldKind::Decimal => {
                let value: Decimal = raw
                    .parse()
                    .map_err(|_| format!("{} must be a number", field.label))?;
                Self::check_bounds(field, value)?;
                Ok(FieldValue::Decimal(value))
            }
            FieldKind::Integer => {
                let value: i64 = raw
                    .parse()
                    .map_err(|_| format!("{} must be a whole number", field.label))?;
                Self::check_bounds(field, Decimal::from(value))?;
                Ok(FieldValue::Integer(value))
            }
            FieldKind::Bool => Ok(FieldValue::Bool(matches!(raw, "on" | "true" | "1"))),
            FieldKind::CommaList => {
                let items: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(ToString::to_string)
                    .collect();
                if items.is_empty() {
                    return Err(format!("{} must list at least one item", field.label));
                }
                Ok(FieldValue::List(items))
            }
        }
    }

    fn check_bounds(field: &FieldSchema, value: Decimal) -> Result<(), String> {
        if let Some(min) = field.min
            && value < min
        {
            return Err(format!("{} must be at least {min}", field.label));
        }
        if let Some(max) = field.max
            && value > max
        {
            return Err(format!("{} must be at most {max}", field.label));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_required_field_blocks_submission() {
        let schema = FormSchema::new().field(FieldSchema::text("name", "Name").required());
        let errors = schema.validate(&raw(&[("name", "  ")])).unwrap_err();
        assert_eq!(errors.get("name"), Some("Name is required"));
    }

    #[test]
    fn test_optional_blank_field_has_no_entry() {
        let schema = FormSchema::new()
            .field(FieldSchema::text("name", "Name").required())
            .field(FieldSchema::text("notes", "Notes"));
        let form = schema.validate(&raw(&[("name", "Ana"), ("notes", "")])).unwrap();
        assert_eq!(form.text("name").as_deref(), Some("Ana"));
        assert!(form.text("notes").is_none());
    }

    #[test]
    fn test_malformed_email_is_field_scoped() {
        let schema = FormSchema::new().field(FieldSchema::email("email", "E-mail").required());
        let errors = schema.validate(&raw(&[("email", "not-an-email")])).unwrap_err();
        assert!(errors.get("email").unwrap().contains('@'));

        let form = schema.validate(&raw(&[("email", "a@b.com")])).unwrap();
        assert_eq!(form.email("email").unwrap().as_str(), "a@b.com");
    }

    #[test]
    fn test_comma_list_is_split_and_trimmed() {
        let schema = FormSchema::new().field(FieldSchema::comma_list("types", "Insurance types"));
        let form = schema
            .validate(&raw(&[("types", " auto , home ,, life ")]))
            .unwrap();
        assert_eq!(
            form.list("types").unwrap(),
            vec!["auto".to_string(), "home".to_string(), "life".to_string()]
        );
    }

    #[test]
    fn test_decimal_rejects_non_numeric_input() {
        let schema = FormSchema::new().field(FieldSchema::decimal("amount", "Amount"));
        let errors = schema.validate(&raw(&[("amount", "a lot")])).unwrap_err();
        assert_eq!(errors.get("amount"), Some("Amount must be a number"));
    }

    #[test]
    fn test_decimal_enforces_declared_bounds() {
        let schema = FormSchema::new()
            .field(FieldSchema::decimal("amount", "Amount").min(Decimal::ZERO));
        let errors = schema.validate(&raw(&[("amount", "-5")])).unwrap_err();
        assert_eq!(errors.get("amount"), Some("Amount must be at least 0"));

        let form = schema.validate(&raw(&[("amount", "1250.75")])).unwrap();
        assert_eq!(form.decimal("amount").unwrap().to_string(), "1250.75");
    }

    #[test]
    fn test_integer_field() {
        let schema = FormSchema::new()
            .field(FieldSchema::integer("count", "Client count").min(Decimal::ZERO));
        let errors = schema.validate(&raw(&[("count", "3.5")])).unwrap_err();
        assert!(errors.get("count").is_some());

        let form = schema.validate(&raw(&[("count", "42")])).unwrap();
        assert_eq!(form.integer("count"), Some(42));
    }

    #[test]
    fn test_date_parsing() {
        let schema = FormSchema::new().field(FieldSchema::date("start", "Start date").required());
        let errors = schema.validate(&raw(&[("start", "01/02/2026")])).unwrap_err();
        assert!(errors.get("start").unwrap().contains("YYYY-MM-DD"));

        let form = schema.validate(&raw(&[("start", "2026-02-01")])).unwrap();
        assert_eq!(form.date("start").unwrap().to_string(), "2026-02-01");
    }

    #[test]
    fn test_unchecked_checkbox_is_false() {
        let schema = FormSchema::new().field(FieldSchema::checkbox("signed", "Signed contract"));
        let form = schema.validate(&raw(&[])).unwrap();
        assert!(!form.flag("signed"));

        let form = schema.validate(&raw(&[("signed", "on")])).unwrap();
        assert!(form.flag("signed"));
    }

    #[test]
    fn test_cnpj_field_rejects_cpf() {
        let schema = FormSchema::new().field(FieldSchema::cnpj("companyCnpj", "Company CNPJ"));
        let errors = schema
            .validate(&raw(&[("companyCnpj", "123.456.789-09")]))
            .unwrap_err();
        assert!(errors.get("companyCnpj").unwrap().contains("CNPJ"));

        let form = schema
            .validate(&raw(&[("companyCnpj", "12.345.678/0001-95")]))
            .unwrap();
        assert_eq!(form.tax_id("companyCnpj").unwrap().as_str(), "12345678000195");
    }

    #[test]
    fn test_min_len_on_text() {
        let schema =
            FormSchema::new().field(FieldSchema::password("password", "Password").min_len(8));
        let errors = schema.validate(&raw(&[("password", "short")])).unwrap_err();
        assert!(errors.get("password").unwrap().contains("at least 8"));
    }

    #[test]
    fn test_multiple_errors_reported_together() {
        let schema = FormSchema::new()
            .field(FieldSchema::text("name", "Name").required())
            .field(FieldSchema::email("email", "E-mail").required())
            .field(FieldSchema::decimal("amount", "Amount"));
        let errors = schema
            .validate(&raw(&[("email", "bad"), ("amount", "x")]))
            .unwrap_err();
        assert!(errors.get("name").is_some());
        assert!(errors.get("email").is_some());
        assert!(errors.get("amount").is_some());
    }
}
