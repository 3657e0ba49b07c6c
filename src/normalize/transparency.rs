// 🔍 Transparency normalizer
// Public registry table row (name, registry type, details, filed date)
// → TransparencyEntry.

use super::{parse_date, Normalized};
use crate::identity::{assign_id, NaturalKey};
use crate::models::TransparencyEntry;
use crate::resolver::NameIndex;
use chrono::NaiveDate;

pub fn normalize_transparency_row(
    cells: &[String],
    index: &NameIndex,
    today: NaiveDate,
) -> Normalized<TransparencyEntry> {
    if cells.len() < 3 {
        return Normalized::drop(format!("registry row has {} cells", cells.len()));
    }

    let name = cells[0].trim();
    let Some(legislator_id) = index.lookup(name) else {
        return Normalized::drop(format!("no legislator named {name:?}"));
    };

    let registry_type = cells[1].trim();
    if registry_type.is_empty() {
        return Normalized::drop(format!("registry row for {name:?} has no type"));
    }

    let details = cells[2].trim();
    let raw_filed = cells.get(3).map(|c| c.trim()).unwrap_or_default();

    // The id uses the raw filed text so a missing date does not produce a
    // different id on every run.
    let id = assign_id(&NaturalKey::Transparency {
        legislator_id,
        registry_type,
        filed_date: raw_filed,
        details,
    });

    Normalized::Keep(TransparencyEntry {
        id,
        legislator_id,
        registry_type: registry_type.to_string(),
        details: (!details.is_empty()).then(|| details.to_string()),
        filed_date: parse_date(raw_filed).unwrap_or(today),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Legislator;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn index() -> NameIndex {
        NameIndex::from_legislators(&[Legislator {
            id: 9,
            name: "Pat Lee".to_string(),
            district: "Yukon".to_string(),
            party: "Green".to_string(),
            photo_url: None,
            attendance_rate: None,
            party_line_voting_rate: None,
            years_in_office: None,
        }])
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_full_row() {
        let entry = normalize_transparency_row(
            &cells(&["Lee, Pat", "Gift", "Hockey tickets", "2025-12-01"]),
            &index(),
            today(),
        )
        .keep()
        .unwrap();

        assert_eq!(entry.legislator_id, 9);
        assert_eq!(entry.registry_type, "Gift");
        assert_eq!(entry.details.as_deref(), Some("Hockey tickets"));
        assert_eq!(entry.filed_date, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
    }

    #[test]
    fn test_missing_date_keeps_stable_id() {
        let row = cells(&["Pat Lee", "Travel", "Sponsored trip"]);
        let first = normalize_transparency_row(&row, &index(), today()).keep().unwrap();
        let later = normalize_transparency_row(
            &row,
            &index(),
            NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
        )
        .keep()
        .unwrap();

        assert_eq!(first.filed_date, today());
        assert_eq!(first.id, later.id);
    }

    #[test]
    fn test_drops() {
        assert!(normalize_transparency_row(&cells(&["Pat Lee", "Gift"]), &index(), today()).is_drop());
        assert!(normalize_transparency_row(&cells(&["Unknown", "Gift", "x"]), &index(), today()).is_drop());
        assert!(normalize_transparency_row(&cells(&["Pat Lee", " ", "x"]), &index(), today()).is_drop());
    }
}
