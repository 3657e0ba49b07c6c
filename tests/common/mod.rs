// Shared fixture: a small parliament served entirely from a FakeSource.
#![allow(dead_code)]

use chrono::NaiveDate;
use civic_ingest::{setup_database, FakeSource, Ingestor, SourceSettings};
use rusqlite::Connection;
use serde_json::json;

pub const BASE: &str = "https://api.example.test";
pub const SPENDING_URL: &str = "https://disclosure.example.test/members/2026/1";
pub const REGISTRY_URL: &str = "https://registry.example.test/public";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

pub fn settings() -> SourceSettings {
    SourceSettings {
        api_base: BASE.to_string(),
        page_size: 2,
        max_legislators: None,
        max_motions: None,
        spending_url: SPENDING_URL.to_string(),
        fiscal_period: "2026-Q1".to_string(),
        transparency_url: REGISTRY_URL.to_string(),
        ..SourceSettings::default()
    }
}

pub fn ingestor(source: &FakeSource) -> Ingestor<&FakeSource> {
    Ingestor::new(source, settings()).with_today(today())
}

pub fn open_memory() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    setup_database(&conn).unwrap();
    conn
}

fn politician(slug: &str, name: &str, party: &str, riding: &str, mp_id: &str) -> serde_json::Value {
    json!({
        "name": name,
        "url": format!("/politicians/{slug}/"),
        "image": format!("/media/polpics/{slug}.jpg"),
        "current_party": {"short_name": {"en": party}},
        "current_riding": {"name": {"en": riding}},
        "other_info": {"parl_mp_id": [mp_id]},
        "memberships": [{"start_date": "2019-10-21", "riding": {"name": {"en": riding}}}]
    })
}

/// Three politicians over two listing pages, three bills (one sponsored by
/// someone not in storage), two votes, one spending table, one registry.
pub fn parliament() -> FakeSource {
    FakeSource::new()
        // --- politicians ---
        .with_json(
            "https://api.example.test/politicians/?limit=2&format=json",
            json!({
                "objects": [{"url": "/politicians/ann-arbour/"}, {"url": "/politicians/bo-bay/"}],
                "pagination": {"next_url": "/politicians/?limit=2&offset=2"}
            }),
        )
        .with_json(
            "https://api.example.test/politicians/?limit=2&offset=2&format=json",
            json!({
                "objects": [{"url": "/politicians/cy-cove/"}],
                "pagination": {"next_url": null}
            }),
        )
        .with_json(
            "https://api.example.test/politicians/ann-arbour/?format=json",
            politician("ann-arbour", "Ann Arbour", "Liberal", "Kings—Hants", "300"),
        )
        .with_json(
            "https://api.example.test/politicians/bo-bay/?format=json",
            politician("bo-bay", "Bo Bay", "Conservative", "Calgary Centre", "200"),
        )
        .with_json(
            "https://api.example.test/politicians/cy-cove/?format=json",
            politician("cy-cove", "Cy Cove", "NDP", "Nunavut", "100"),
        )
        .with_json(
            "https://api.example.test/politicians/retired/?format=json",
            politician("retired", "Old Timer", "Reform", "Elsewhere", "999"),
        )
        // --- bills ---
        .with_json(
            "https://api.example.test/bills/?limit=2&format=json",
            json!({
                "objects": [{"url": "/bills/44-1/C-1/"}, {"url": "/bills/44-1/C-2/"}],
                "pagination": {"next_url": "/bills/?limit=2&offset=2"}
            }),
        )
        .with_json(
            "https://api.example.test/bills/?limit=2&offset=2&format=json",
            json!({"objects": [{"url": "/bills/44-1/C-3/"}], "pagination": {}}),
        )
        .with_json(
            "https://api.example.test/bills/44-1/C-1/?format=json",
            json!({
                "url": "/bills/44-1/C-1/",
                "legisinfo_id": 11111,
                "name": {"en": "An Act respecting clean water"},
                "short_title": {"en": "Clean Water Act"},
                "sponsor_politician_url": "/politicians/ann-arbour/",
                "introduced": "2026-02-10",
                "categories": ["Environment", " "],
                "vote_urls": ["/votes/44-1/10/"]
            }),
        )
        .with_json(
            "https://api.example.test/bills/44-1/C-2/?format=json",
            json!({
                "url": "/bills/44-1/C-2/",
                "name": {"en": "An Act to amend the Criminal Code"},
                "sponsor_politician_url": "/politicians/bo-bay/",
                "introduced": "2026-03-01",
                "classification": "subsidiary",
                "vote_urls": ["/votes/44-1/11/"]
            }),
        )
        .with_json(
            "https://api.example.test/bills/44-1/C-3/?format=json",
            json!({
                "url": "/bills/44-1/C-3/",
                "name": {"en": "An Act from a former member"},
                "sponsor_politician_url": "/politicians/retired/",
                "introduced": "2026-04-01",
                "status": "Introduced"
            }),
        )
        // --- votes ---
        .with_json(
            "https://api.example.test/votes/44-1/10/?format=json",
            json!({
                "result": "Agreed To",
                "party_votes": [
                    {"party": {"short_name": {"en": "Liberal"}}, "vote": "Yes", "count": 150},
                    {"party": {"short_name": {"en": "NDP"}}, "vote": "Yes", "count": 24},
                    {"party": {"short_name": {"en": "Conservative"}}, "vote": "No", "count": 115}
                ]
            }),
        )
        .with_json(
            "https://api.example.test/votes/44-1/11/?format=json",
            json!({
                "result": "Negatived",
                "party_votes": [
                    {"party": {"short_name": {"en": "Conservative"}}, "vote": "Yes", "count": 115},
                    {"party": {"short_name": {"en": "Liberal"}}, "vote": "No", "count": 150}
                ]
            }),
        )
        // --- spending ---
        .with_html(
            SPENDING_URL,
            r#"<html><body>
            <table class="table">
              <thead><tr><th>Name</th><th>Constituency</th><th>Caucus</th>
                <th>Salaries</th><th>Travel</th><th>Hospitality</th><th>Contracts</th></tr></thead>
              <tbody>
                <tr><td><a href="/m/1">Arbour, Ann</a></td><td>Kings—Hants</td><td>Liberal</td>
                    <td>$98,000.00</td><td>$12,345.67</td><td>$150.00</td><td>$4,000.00</td></tr>
                <tr><td>Bay, Bo</td><td>Calgary Centre</td><td>Conservative</td>
                    <td>$91,500.00</td><td>$8,000.00</td><td>$0.00</td><td>$1,200.00</td></tr>
                <tr><td>Unknown, Person</td><td>Nowhere</td><td>None</td>
                    <td>$1.00</td><td>$1.00</td><td>$1.00</td><td>$1.00</td></tr>
              </tbody>
            </table></body></html>"#,
        )
        // --- transparency ---
        .with_html(
            REGISTRY_URL,
            r#"<table>
                <tr><th>Member</th><th>Type</th><th>Details</th><th>Filed</th></tr>
                <tr><td>Cove, Cy</td><td>Sponsored Travel</td><td>Trip to Ottawa&nbsp;conference</td><td>2026-01-15</td></tr>
                <tr><td>Arbour, Ann</td><td>Gift</td><td>Hockey tickets</td><td></td></tr>
                <tr><td>Someone Else</td><td>Gift</td><td>Flowers</td><td>2026-01-02</td></tr>
            </table>"#,
        )
}
