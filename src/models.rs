// 🏛️ Canonical civic records
// Strictly-typed output of the normalizers, input of the upsert engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// party name → vote choice (or raw source value) → count
pub type VoteTally = BTreeMap<String, BTreeMap<String, i64>>;

// ============================================================================
// ENTITY KIND
// ============================================================================

/// The four record kinds, in the order the orchestrator ingests them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Legislator,
    Motion,
    SpendingEntry,
    TransparencyEntry,
}

impl EntityKind {
    /// Dependency order: later kinds reference legislators.
    pub const ORDERED: [EntityKind; 4] = [
        EntityKind::Legislator,
        EntityKind::Motion,
        EntityKind::SpendingEntry,
        EntityKind::TransparencyEntry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Legislator => "legislator",
            EntityKind::Motion => "motion",
            EntityKind::SpendingEntry => "spending_entry",
            EntityKind::TransparencyEntry => "transparency_entry",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// MOTION CLASSIFICATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionClassification {
    #[default]
    Substantive,
    Subsidiary,
    Privileged,
    Incidental,
}

impl MotionClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionClassification::Substantive => "substantive",
            MotionClassification::Subsidiary => "subsidiary",
            MotionClassification::Privileged => "privileged",
            MotionClassification::Incidental => "incidental",
        }
    }

    /// Lenient parse: case-insensitive, tolerates a `MotionClassification.` prefix.
    /// Anything unrecognised is `None`; callers fall back to the default.
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_lowercase();
        let value = lower
            .strip_prefix("motionclassification.")
            .unwrap_or(&lower);

        match value {
            "substantive" => Some(MotionClassification::Substantive),
            "subsidiary" => Some(MotionClassification::Subsidiary),
            "privileged" => Some(MotionClassification::Privileged),
            "incidental" => Some(MotionClassification::Incidental),
            _ => None,
        }
    }
}

// ============================================================================
// VOTE CHOICE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChoice {
    Yea,
    Nay,
    Abstain,
}

impl VoteChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteChoice::Yea => "yea",
            VoteChoice::Nay => "nay",
            VoteChoice::Abstain => "abstain",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "yea" | "yes" | "y" | "aye" | "for" => Some(VoteChoice::Yea),
            "nay" | "no" | "n" | "against" => Some(VoteChoice::Nay),
            "abstain" | "abstention" | "paired" => Some(VoteChoice::Abstain),
            _ => None,
        }
    }

    /// Tally key for a source vote value: the canonical choice, or the raw
    /// lowercased value when it is not one we recognise.
    pub fn tally_key(raw: &str) -> String {
        match VoteChoice::parse(raw) {
            Some(choice) => choice.as_str().to_string(),
            None => raw.trim().to_lowercase(),
        }
    }
}

// ============================================================================
// ENTITIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legislator {
    pub id: i64,
    pub name: String,
    pub district: String,
    pub party: String,
    pub photo_url: Option<String>,
    pub attendance_rate: Option<f64>,
    pub party_line_voting_rate: Option<f64>,
    pub years_in_office: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub sponsor_id: i64,
    pub sponsor_party: Option<String>,
    pub vote_tally: VoteTally,
    /// `None` = undetermined. Never guessed.
    pub passed: Option<bool>,
    pub categories: Vec<String>,
    pub classification: MotionClassification,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingEntry {
    pub id: i64,
    pub legislator_id: i64,
    pub category: String,
    pub amount: f64,
    pub fiscal_period: String,
    pub details_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransparencyEntry {
    pub id: i64,
    pub legislator_id: i64,
    pub registry_type: String,
    pub details: Option<String>,
    pub filed_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_parse_variants() {
        assert_eq!(
            MotionClassification::parse("Privileged"),
            Some(MotionClassification::Privileged)
        );
        assert_eq!(
            MotionClassification::parse("MotionClassification.SUBSIDIARY"),
            Some(MotionClassification::Subsidiary)
        );
        assert_eq!(MotionClassification::parse("emergency"), None);
        assert_eq!(MotionClassification::default(), MotionClassification::Substantive);
    }

    #[test]
    fn test_vote_choice_tally_key() {
        assert_eq!(VoteChoice::tally_key("Yes"), "yea");
        assert_eq!(VoteChoice::tally_key(" NO "), "nay");
        assert_eq!(VoteChoice::tally_key("Paired"), "abstain");
        assert_eq!(VoteChoice::tally_key("Didn't vote"), "didn't vote");
    }

    #[test]
    fn test_entity_kind_order() {
        let names: Vec<&str> = EntityKind::ORDERED.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["legislator", "motion", "spending_entry", "transparency_entry"]
        );
    }
}
