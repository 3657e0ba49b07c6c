// 💰 Spending normalizer
//
// One disclosure table row (name, district, party, then one amount column per
// category) expands into one SpendingEntry per category. The source keys
// nothing, so ids come from (legislator id, category, fiscal period).

use super::Normalized;
use crate::identity::{assign_id, NaturalKey};
use crate::models::SpendingEntry;
use crate::resolver::{normalize_person_name, NameIndex};

/// Amount columns, in table order after name, district and party. Only the
/// name identifies the legislator; district and party are not kept.
pub const CATEGORIES: [&str; 4] = ["Salaries", "Travel", "Hospitality", "Contracts"];

const MIN_CELLS: usize = 3 + CATEGORIES.len();

#[derive(Debug, Clone, PartialEq)]
pub struct SpendingRow {
    pub name: String,
    pub amounts: Vec<(&'static str, f64)>,
}

/// "$1,234.50" → 1234.5; blank or unparseable → 0.0
pub fn parse_currency(value: &str) -> f64 {
    let cleaned: String = value
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    cleaned.trim().parse().unwrap_or(0.0)
}

/// Structured view of a table row; `None` for rows too short to be data.
pub fn parse_spending_row(cells: &[String]) -> Option<SpendingRow> {
    if cells.len() < MIN_CELLS {
        return None;
    }

    Some(SpendingRow {
        name: normalize_person_name(&cells[0]),
        amounts: CATEGORIES
            .iter()
            .zip(&cells[3..])
            .map(|(category, cell)| (*category, parse_currency(cell)))
            .collect(),
    })
}

pub fn fiscal_period_label(year: i32, quarter: u8) -> String {
    format!("{year}-Q{quarter}")
}

/// Expand a row into per-category entries; dropped when the legislator is
/// not known locally.
pub fn expand_spending_row(
    row: &SpendingRow,
    index: &NameIndex,
    fiscal_period: &str,
    details_url: &str,
) -> Normalized<Vec<SpendingEntry>> {
    let Some(legislator_id) = index.lookup(&row.name) else {
        return Normalized::drop(format!("no legislator named {:?}", row.name));
    };

    let entries = row
        .amounts
        .iter()
        .map(|&(category, amount)| SpendingEntry {
            id: assign_id(&NaturalKey::Spending {
                legislator_id,
                category,
                fiscal_period,
            }),
            legislator_id,
            category: category.to_string(),
            amount,
            fiscal_period: fiscal_period.to_string(),
            details_url: Some(details_url.to_string()),
        })
        .collect();

    Normalized::Keep(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Legislator;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn index() -> NameIndex {
        NameIndex::from_legislators(&[Legislator {
            id: 1,
            name: "Jane Smith".to_string(),
            district: "Halifax".to_string(),
            party: "Liberal".to_string(),
            photo_url: None,
            attendance_rate: None,
            party_line_voting_rate: None,
            years_in_office: None,
        }])
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("$1,234.50"), 1234.5);
        assert_eq!(parse_currency("  "), 0.0);
        assert_eq!(parse_currency("n/a"), 0.0);
        assert_eq!(parse_currency("-$12.00"), -12.0);
    }

    #[test]
    fn test_short_rows_are_not_data() {
        assert!(parse_spending_row(&cells(&["Total", "", "$5"])).is_none());
    }

    #[test]
    fn test_row_keeps_name_and_amounts() {
        let row = parse_spending_row(&cells(&[
            "Smith, Jane", "Halifax", "Liberal", "$1.00", "$2.00", "$3.00", "$4.00", "extra",
        ]))
        .unwrap();

        assert_eq!(
            row,
            SpendingRow {
                name: "Jane Smith".to_string(),
                amounts: vec![
                    ("Salaries", 1.0),
                    ("Travel", 2.0),
                    ("Hospitality", 3.0),
                    ("Contracts", 4.0),
                ],
            }
        );
    }

    #[test]
    fn test_row_expands_per_category() {
        let row = parse_spending_row(&cells(&[
            "Smith, Jane", "Halifax", "Liberal", "$100,000.00", "$2,500.25", "", "$40",
        ]))
        .unwrap();
        assert_eq!(row.name, "Jane Smith");

        let entries = expand_spending_row(&row, &index(), "2026-Q1", "https://example.test/2026/1")
            .keep()
            .unwrap();

        assert_eq!(entries.len(), 4);
        let travel = entries.iter().find(|e| e.category == "Travel").unwrap();
        assert_eq!(travel.amount, 2500.25);
        assert_eq!(travel.legislator_id, 1);
        assert_eq!(travel.fiscal_period, "2026-Q1");
        assert_eq!(
            travel.id,
            assign_id(&NaturalKey::Spending {
                legislator_id: 1,
                category: "Travel",
                fiscal_period: "2026-Q1",
            })
        );
        let hospitality = entries.iter().find(|e| e.category == "Hospitality").unwrap();
        assert_eq!(hospitality.amount, 0.0);
    }

    #[test]
    fn test_unknown_legislator_dropped() {
        let row = parse_spending_row(&cells(&["Nobody, Some", "X", "Y", "1", "2", "3", "4"])).unwrap();
        assert!(expand_spending_row(&row, &index(), "2026-Q1", "u").is_drop());
    }

    #[test]
    fn test_fiscal_period_label() {
        assert_eq!(fiscal_period_label(2026, 1), "2026-Q1");
    }
}
