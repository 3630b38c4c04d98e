//! Pure input handling for the page controllers: fallback defaults,
//! presence checks, and the landing-form navigation target. Everything here
//! runs before any network call.

use chrono::{Months, NaiveDate};
use thiserror::Error;

use api_client::QueryParams;

use crate::DEFAULT_SYMBOL;

pub const DATE_FMT: &str = "%Y-%m-%d";

/// Validation failures, worded exactly as the pages surface them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Please enter valid inputs.")]
    InvalidSimulation,
    #[error("Please enter a valid date.")]
    MissingDate,
    #[error("Please select a valid symbol and date range")]
    IncompleteSelection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Six months back from `today`, both ends formatted `%Y-%m-%d`.
pub fn default_date_range(today: NaiveDate) -> DateRange {
    let start = today.checked_sub_months(Months::new(6)).unwrap_or(today);
    DateRange {
        start: start.format(DATE_FMT).to_string(),
        end: today.format(DATE_FMT).to_string(),
    }
}

/// Raw field values with a per-field fallback to the default range.
pub fn resolve_date_range(start_raw: &str, end_raw: &str, today: NaiveDate) -> DateRange {
    let defaults = default_date_range(today);
    DateRange {
        start: if start_raw.trim().is_empty() {
            defaults.start
        } else {
            start_raw.trim().to_string()
        },
        end: if end_raw.trim().is_empty() {
            defaults.end
        } else {
            end_raw.trim().to_string()
        },
    }
}

/// A missing or empty selector falls back to the default symbol.
pub fn resolve_symbol(raw: Option<&str>) -> String {
    match raw {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => DEFAULT_SYMBOL.to_string(),
    }
}

/// The simulator refuses to hit the network with a non-numeric amount.
pub fn parse_amount(raw: &str) -> Result<f64, InputError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(InputError::InvalidSimulation)
}

pub fn require_date(raw: &str) -> Result<String, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(InputError::MissingDate)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Start date and amount for a simulation run; one message covers both
/// fields, matching the form's single status line.
pub fn simulator_inputs(start_raw: &str, amount_raw: &str) -> Result<(String, f64), InputError> {
    let start = start_raw.trim();
    if start.is_empty() {
        return Err(InputError::InvalidSimulation);
    }
    let amount = parse_amount(amount_raw)?;
    Ok((start.to_string(), amount))
}

/// Destination for the landing form: `/result` carrying the selection.
pub fn home_destination(
    symbol_raw: Option<&str>,
    start_raw: &str,
    end_raw: &str,
    today: NaiveDate,
) -> Result<String, InputError> {
    let symbol = resolve_symbol(symbol_raw);
    let range = resolve_date_range(start_raw, end_raw, today);
    if symbol.is_empty() || range.start.is_empty() || range.end.is_empty() {
        return Err(InputError::IncompleteSelection);
    }
    let query = QueryParams::new()
        .set("symbol", symbol)
        .set("start_date", range.start)
        .set("end_date", range.end);
    Ok(format!("/result?{}", query.encode()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FMT).unwrap()
    }

    #[test]
    fn default_range_spans_six_months() {
        let range = default_date_range(day("2025-05-05"));
        assert_eq!(range.start, "2024-11-05");
        assert_eq!(range.end, "2025-05-05");
    }

    #[test]
    fn explicit_dates_win_over_defaults_per_field() {
        let range = resolve_date_range("2025-01-01", "", day("2025-05-05"));
        assert_eq!(range.start, "2025-01-01");
        assert_eq!(range.end, "2025-05-05");
    }

    #[test]
    fn empty_symbol_falls_back_to_default() {
        assert_eq!(resolve_symbol(None), DEFAULT_SYMBOL);
        assert_eq!(resolve_symbol(Some("  ")), DEFAULT_SYMBOL);
        assert_eq!(resolve_symbol(Some("TCS.NS")), "TCS.NS");
    }

    #[test]
    fn non_numeric_amount_is_rejected_before_any_fetch() {
        assert_eq!(parse_amount("abc"), Err(InputError::InvalidSimulation));
        assert_eq!(parse_amount(""), Err(InputError::InvalidSimulation));
        assert_eq!(parse_amount("NaN"), Err(InputError::InvalidSimulation));
        assert_eq!(parse_amount(" 5000 "), Ok(5000.0));
    }

    #[test]
    fn simulator_needs_both_start_and_amount() {
        assert_eq!(
            simulator_inputs("", "5000"),
            Err(InputError::InvalidSimulation)
        );
        assert_eq!(
            simulator_inputs("2025-01-01", "abc"),
            Err(InputError::InvalidSimulation)
        );
        assert_eq!(
            simulator_inputs("2025-01-01", "5000"),
            Ok(("2025-01-01".to_string(), 5000.0))
        );
    }

    #[test]
    fn missing_buy_date_is_an_error() {
        assert_eq!(require_date(" "), Err(InputError::MissingDate));
        assert_eq!(require_date("2025-01-01"), Ok("2025-01-01".to_string()));
    }

    #[test]
    fn home_destination_carries_the_selection() {
        let url = home_destination(Some("TCS.NS"), "2025-01-01", "2025-02-01", day("2025-05-05"))
            .unwrap();
        assert_eq!(
            url,
            "/result?symbol=TCS.NS&start_date=2025-01-01&end_date=2025-02-01"
        );
    }

    #[test]
    fn home_destination_defaults_everything_when_blank() {
        let url = home_destination(None, "", "", day("2025-05-05")).unwrap();
        assert_eq!(
            url,
            "/result?symbol=AXISBANK.NS&start_date=2024-11-05&end_date=2025-05-05"
        );
    }

    #[test]
    fn validation_messages_match_the_page_copy() {
        assert_eq!(
            InputError::InvalidSimulation.to_string(),
            "Please enter valid inputs."
        );
        assert_eq!(InputError::MissingDate.to_string(), "Please enter a valid date.");
    }
}
