// 📜 Motion normalizer
//
// Bill detail + its vote details → Motion. The sponsor must resolve to a
// locally known legislator (directly or via the resolver's fallback);
// otherwise the motion is dropped, never stored dangling.

use super::{classification, clean_categories, date_or_today, integer, localized, text_at, Normalized};
use crate::identity::{assign_id, NaturalKey};
use crate::models::{Motion, VoteChoice, VoteTally};
use crate::resolver::SponsorResolver;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

/// Result text that means the motion carried.
const PASSED_KEYWORDS: [&str; 4] = ["passed", "agreed", "adopted", "royal assent"];

/// Result text that explicitly means the motion did not carry.
/// Checked first so "not agreed" and "disagreed" are not read as "agreed".
const FAILED_KEYWORDS: [&str; 8] = [
    "disagreed",
    "not passed",
    "not agreed",
    "not adopted",
    "negatived",
    "defeated",
    "failed",
    "rejected",
];

// ============================================================================
// VOTE SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VoteSummary {
    pub tally: VoteTally,
    pub passed: Option<bool>,
}

/// Party tally of one vote-detail source.
///
/// Accepts either a ready-made `party_tally` / `vote_results_by_party` map
/// (`{party: {choice: count}}`) or a `party_votes` list of
/// `{party, vote, count?}` entries (count defaults to 1).
pub fn party_tally(source: &Value) -> VoteTally {
    let mut tally = VoteTally::new();

    let ready_made = ["party_tally", "vote_results_by_party"]
        .iter()
        .find_map(|key| source.get(key).and_then(Value::as_object));

    if let Some(parties) = ready_made {
        for (party, choices) in parties {
            let Some(choices) = choices.as_object() else {
                continue;
            };
            for (choice, count) in choices {
                if let Some(count) = integer(count) {
                    add_count(&mut tally, party.trim().to_string(), choice, count);
                }
            }
        }
    } else if let Some(entries) = source.get("party_votes").and_then(Value::as_array) {
        for entry in entries {
            let party = text_at(entry, &["party", "short_name"])
                .or_else(|| entry.get("party").and_then(localized));
            let choice = entry.get("vote").and_then(localized);
            let (Some(party), Some(choice)) = (party, choice) else {
                continue;
            };
            let count = entry.get("count").and_then(integer).unwrap_or(1);

            add_count(&mut tally, party, &choice, count);
        }
    }

    tally.retain(|_, choices| !choices.is_empty());
    tally
}

/// Negative counts are ignored; sums saturate instead of overflowing.
fn add_count(tally: &mut VoteTally, party: String, choice: &str, count: i64) {
    if count < 0 {
        debug!(party = %party, choice, count, "negative vote count ignored");
        return;
    }
    let slot = tally
        .entry(party)
        .or_default()
        .entry(VoteChoice::tally_key(choice))
        .or_default();
    *slot = slot.saturating_add(count);
}

/// Free-text result status of a vote-detail source.
fn result_text(source: &Value) -> Option<String> {
    ["result", "status", "status_text"]
        .iter()
        .find_map(|key| source.get(key).and_then(localized))
}

/// Keyword reading of a result status; `None` when it says neither.
pub fn outcome_from_status(status: &str) -> Option<bool> {
    let lower = status.to_lowercase();

    if FAILED_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(false);
    }
    if PASSED_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(true);
    }
    None
}

/// Scan vote-detail sources in priority order.
///
/// The first source with a non-empty party tally supplies both the tally and
/// the status used for `passed`. With no tally anywhere, the first status
/// that reads as an outcome decides. Otherwise `passed` stays undetermined.
pub fn summarize_votes<'a, I>(sources: I) -> VoteSummary
where
    I: IntoIterator<Item = &'a Value>,
{
    let sources: Vec<&Value> = sources.into_iter().collect();

    for source in &sources {
        let tally = party_tally(source);
        if !tally.is_empty() {
            let passed = result_text(source).and_then(|s| outcome_from_status(&s));
            return VoteSummary { tally, passed };
        }
    }

    let passed = sources
        .iter()
        .filter_map(|source| result_text(source))
        .find_map(|status| outcome_from_status(&status));

    VoteSummary {
        tally: VoteTally::new(),
        passed,
    }
}

// ============================================================================
// MOTION
// ============================================================================

/// Native legislative id, else surrogate from the bill URL.
pub fn motion_id(detail: &Value) -> Option<i64> {
    if let Some(id) = detail
        .get("legisinfo_id")
        .and_then(integer)
        .filter(|id| *id > 0)
    {
        return Some(id);
    }

    detail
        .get("url")
        .and_then(Value::as_str)
        .filter(|u| !u.trim().is_empty())
        .map(|url| assign_id(&NaturalKey::MotionUrl(url)))
}

/// Sponsor reference as published by the source.
pub fn sponsor_reference(detail: &Value) -> Option<&str> {
    ["sponsor_politician_url", "sponsor_url"]
        .iter()
        .find_map(|key| detail.get(key).and_then(Value::as_str))
}

/// Normalize a bill detail. `vote_details` are the fetched vote documents
/// in the order the bill lists them; the bill itself is scanned first.
pub fn normalize_motion(
    detail: &Value,
    vote_details: &[Value],
    resolver: &mut SponsorResolver<'_>,
    today: NaiveDate,
) -> Normalized<Motion> {
    let Some(id) = motion_id(detail) else {
        return Normalized::drop("bill has neither a legislative id nor a url");
    };

    let Some(title) = text_at(detail, &["name"])
        .or_else(|| text_at(detail, &["title"]))
        .or_else(|| text_at(detail, &["short_title"]))
        .or_else(|| text_at(detail, &["number"]))
    else {
        return Normalized::drop(format!("bill {id} has no title"));
    };

    let Some(sponsor_id) = resolver.resolve(sponsor_reference(detail)) else {
        return Normalized::drop(format!("bill {id} sponsor could not be resolved"));
    };

    let sponsor_party = text_at(detail, &["sponsor_party"])
        .or_else(|| resolver.party_of(sponsor_id).map(str::to_string));

    let description = text_at(detail, &["description"])
        .or_else(|| text_at(detail, &["summary"]))
        .or_else(|| text_at(detail, &["short_title"]).filter(|s| *s != title));

    let votes = summarize_votes(std::iter::once(detail).chain(vote_details.iter()));

    Normalized::Keep(Motion {
        id,
        title,
        description,
        sponsor_id,
        sponsor_party,
        vote_tally: votes.tally,
        passed: votes.passed,
        categories: clean_categories(detail.get("categories")),
        classification: classification(detail.get("classification")),
        date: date_or_today(detail, &["introduced", "date"], today),
    })
}
