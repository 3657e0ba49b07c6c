// 🧹 Entity Normalizers
//
// Raw source payloads are open-ended JSON documents (or HTML table cells).
// Each normalizer turns one raw record into a strictly-typed canonical record
// or an explicit Drop. Missing fields are never an error: every field has a
// documented default, and records that cannot be keyed or referenced are
// dropped with a reason the pipeline logs.

pub mod legislator;
pub mod motion;
pub mod spending;
pub mod transparency;

use crate::models::MotionClassification;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

pub use legislator::normalize_legislator;
pub use motion::{normalize_motion, summarize_votes, VoteSummary};
pub use spending::{expand_spending_row, fiscal_period_label, parse_spending_row, SpendingRow};
pub use transparency::normalize_transparency_row;

// ============================================================================
// OUTCOME
// ============================================================================

/// Result of normalizing one raw record.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<T> {
    Keep(T),
    /// Explicit exclusion; not an error.
    Drop(String),
}

impl<T> Normalized<T> {
    pub fn drop(reason: impl Into<String>) -> Self {
        Normalized::Drop(reason.into())
    }

    pub fn keep(self) -> Option<T> {
        match self {
            Normalized::Keep(record) => Some(record),
            Normalized::Drop(_) => None,
        }
    }

    pub fn is_drop(&self) -> bool {
        matches!(self, Normalized::Drop(_))
    }
}

// ============================================================================
// FIELD POLICIES
// ============================================================================

/// Text of a possibly-localized value: a plain string, or `{"en": .., "fr": ..}`
/// (English preferred). Blank text counts as missing.
pub fn localized(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map
            .get("en")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .or_else(|| map.get("fr").and_then(Value::as_str)),
        _ => None,
    }?;

    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Follow `path` through nested objects and return its localized text.
pub fn text_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    localized(current)
}

/// Integer from a JSON number or numeric string.
pub fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse an ISO 8601 date or datetime, or anything with a `YYYY-MM-DD`
/// prefix. `None` when nothing usable is present.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }

    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// First parseable date among `fields` of `record`, else `today`.
/// Defaulting to the run date is a documented approximation.
pub fn date_or_today(record: &Value, fields: &[&str], today: NaiveDate) -> NaiveDate {
    fields
        .iter()
        .filter_map(|field| record.get(field).and_then(Value::as_str))
        .find_map(parse_date)
        .unwrap_or(today)
}

/// Category tags in source order with blank entries stripped.
pub fn clean_categories(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(localized)
            .collect(),
        Some(single @ Value::String(_)) => localized(single).into_iter().collect(),
        _ => Vec::new(),
    }
}

/// Classification, defaulting to substantive when absent or unrecognised.
pub fn classification(value: Option<&Value>) -> MotionClassification {
    value
        .and_then(Value::as_str)
        .and_then(MotionClassification::parse)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 2);

        assert_eq!(parse_date("2024-05-02"), expected);
        assert_eq!(parse_date("2024-05-02T13:45:00Z"), expected);
        assert_eq!(parse_date("2024-05-02T13:45:00"), expected);
        assert_eq!(parse_date("2024-05-02 (second reading)"), expected);
        assert_eq!(parse_date("May 2, 2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_unparseable_date_defaults_to_today() {
        let record = json!({"introduced": "sometime", "date": null});
        assert_eq!(date_or_today(&record, &["introduced", "date"], today()), today());

        let record = json!({"introduced": "bad", "date": "2023-01-09"});
        assert_eq!(
            date_or_today(&record, &["introduced", "date"], today()),
            NaiveDate::from_ymd_opt(2023, 1, 9).unwrap()
        );
    }

    #[test]
    fn test_clean_categories_strips_blanks() {
        let value = json!(["  health ", "", "   ", "trade", 7, null]);
        assert_eq!(clean_categories(Some(&value)), vec!["health", "trade"]);
        assert!(clean_categories(None).is_empty());
        assert!(clean_categories(Some(&json!(null))).is_empty());
    }

    #[test]
    fn test_classification_default() {
        assert_eq!(classification(None), MotionClassification::Substantive);
        assert_eq!(
            classification(Some(&json!("unknown-kind"))),
            MotionClassification::Substantive
        );
        assert_eq!(classification(Some(&json!(3))), MotionClassification::Substantive);
        assert_eq!(
            classification(Some(&json!("Incidental"))),
            MotionClassification::Incidental
        );
    }

    #[test]
    fn test_localized_prefers_english() {
        assert_eq!(localized(&json!({"en": "Liberal", "fr": "Libéral"})), Some("Liberal".to_string()));
        assert_eq!(localized(&json!({"en": "", "fr": "Libéral"})), Some("Libéral".to_string()));
        assert_eq!(localized(&json!("  ")), None);
        assert_eq!(text_at(&json!({"a": {"b": {"en": "x"}}}), &["a", "b"]), Some("x".to_string()));
    }

    #[test]
    fn test_integer() {
        assert_eq!(integer(&json!(12)), Some(12));
        assert_eq!(integer(&json!(" 34 ")), Some(34));
        assert_eq!(integer(&json!("n/a")), None);
    }

    #[test]
    fn test_normalized_keep_and_drop() {
        assert_eq!(Normalized::Keep(3).keep(), Some(3));
        let dropped: Normalized<i32> = Normalized::drop("no sponsor");
        assert!(dropped.is_drop());
        assert_eq!(dropped.keep(), None);
    }
}
