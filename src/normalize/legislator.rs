// 👤 Legislator normalizer
// Politician detail document → Legislator.

use super::{integer, parse_date, text_at, Normalized};
use crate::client::absolute_url;
use crate::identity::{assign_id, NaturalKey};
use crate::models::Legislator;
use chrono::{Datelike, NaiveDate};
use serde_json::Value;

pub const UNKNOWN_DISTRICT: &str = "Unknown Riding";
pub const DEFAULT_PARTY: &str = "Independent";

/// Authoritative parliamentary id: `other_info.parl_mp_id`, else
/// `other_info.parl_affil_id`; first parseable positive entry wins.
pub fn native_id(detail: &Value) -> Option<i64> {
    let other = detail.get("other_info")?;

    let candidates = ["parl_mp_id", "parl_affil_id"]
        .iter()
        .filter_map(|key| other.get(key).and_then(Value::as_array))
        .find(|list| !list.is_empty())?;

    candidates.iter().filter_map(integer).find(|id| *id > 0)
}

/// Native id, else a surrogate derived from the politician URL
/// (`detail.url`, or `fallback_url` when the document omits it).
pub fn legislator_id(detail: &Value, fallback_url: &str) -> i64 {
    if let Some(id) = native_id(detail) {
        return id;
    }
    let url = detail
        .get("url")
        .and_then(Value::as_str)
        .filter(|u| !u.trim().is_empty())
        .unwrap_or(fallback_url);
    assign_id(&NaturalKey::LegislatorUrl(url))
}

fn memberships(detail: &Value) -> &[Value] {
    detail
        .get("memberships")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn district(detail: &Value) -> String {
    memberships(detail)
        .last()
        .and_then(|latest| text_at(latest, &["riding", "name"]))
        .or_else(|| text_at(detail, &["current_riding", "name"]))
        .unwrap_or_else(|| UNKNOWN_DISTRICT.to_string())
}

fn party(detail: &Value) -> String {
    text_at(detail, &["current_party", "short_name"])
        .or_else(|| {
            memberships(detail)
                .last()
                .and_then(|latest| text_at(latest, &["party", "short_name"]))
        })
        .unwrap_or_else(|| DEFAULT_PARTY.to_string())
}

/// Whole years since the earliest membership start, floored at zero.
fn years_in_office(detail: &Value, today: NaiveDate) -> Option<i64> {
    let earliest = memberships(detail)
        .iter()
        .filter_map(|m| m.get("start_date").and_then(Value::as_str))
        .filter_map(parse_date)
        .min()?;

    Some(i64::from(today.year() - earliest.year()).max(0))
}

pub fn normalize_legislator(detail: &Value, base: &str, today: NaiveDate) -> Normalized<Legislator> {
    let url = detail
        .get("url")
        .and_then(Value::as_str)
        .filter(|u| !u.trim().is_empty());

    if native_id(detail).is_none() && url.is_none() {
        return Normalized::drop("politician has neither a parliamentary id nor a url");
    }

    Normalized::Keep(Legislator {
        id: legislator_id(detail, url.unwrap_or_default()),
        name: text_at(detail, &["name"]).unwrap_or_else(|| "Unknown".to_string()),
        district: district(detail),
        party: party(detail),
        photo_url: detail
            .get("image")
            .and_then(Value::as_str)
            .filter(|p| !p.trim().is_empty())
            .map(|p| absolute_url(base, p)),
        attendance_rate: None,
        party_line_voting_rate: None,
        years_in_office: years_in_office(detail, today),
    })
}
