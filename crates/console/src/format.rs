//! Display formatting for table cells.
//!
//! Screens hand askama fully formatted strings, so all cell formatting
//! lives here.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Timestamp as a calendar date, e.g. `2026-01-05`.
#[must_use]
pub fn date(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// Calendar date as `YYYY-MM-DD`, the same shape the date inputs use.
#[must_use]
pub fn day(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// Optional calendar date; empty when absent.
#[must_use]
pub fn opt_day(value: Option<NaiveDate>) -> String {
    value.map(day).unwrap_or_default()
}

/// Monetary amount, e.g. `$250000.00`.
#[must_use]
pub fn amount(value: Decimal) -> String {
    format!("${}", value.round_dp(2))
}

/// Optional monetary amount; empty when absent.
#[must_use]
pub fn opt_amount(value: Option<Decimal>) -> String {
    value.map(amount).unwrap_or_default()
}

/// Optional decimal without currency prefix; empty when absent.
#[must_use]
pub fn opt_decimal(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Comma-joined list; empty when absent.
#[must_use]
pub fn list(value: Option<&Vec<String>>) -> String {
    value.map(|items| items.join(", ")).unwrap_or_default()
}

/// Optional text; empty when absent.
#[must_use]
pub fn opt(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_date_formats() {
        let ts: DateTime<Utc> = "2026-01-05T12:30:00Z".parse().unwrap();
        assert_eq!(date(&ts), "2026-01-05");

        let d = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(day(d), "2026-03-09");
        assert_eq!(opt_day(Some(d)), "2026-03-09");
        assert_eq!(opt_day(None), "");
    }

    #[test]
    fn test_amount_rounds_to_cents() {
        assert_eq!(amount(Decimal::new(250_000_567, 3)), "$250000.57");
        assert_eq!(amount(Decimal::new(1_500, 0)), "$1500");
        assert_eq!(opt_amount(None), "");
    }

    #[test]
    fn test_list_joins() {
        let items = vec!["auto".to_string(), "home".to_string()];
        assert_eq!(list(Some(&items)), "auto, home");
        assert_eq!(list(None), "");
    }
}
