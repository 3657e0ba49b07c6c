// Re-running ingestion against unchanged sources must not change the store.

mod common;

use civic_ingest::{
    count_rows, list_legislators, list_motions, list_spending_entries,
    list_transparency_entries, setup_database, EntityKind,
};
use common::{ingestor, parliament};
use rusqlite::Connection;

fn snapshot(conn: &Connection) -> String {
    serde_json::json!({
        "legislators": list_legislators(conn).unwrap(),
        "motions": list_motions(conn).unwrap(),
        "spending": list_spending_entries(conn).unwrap(),
        "transparency": list_transparency_entries(conn).unwrap(),
    })
    .to_string()
}

#[test]
fn test_second_run_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("civic.db");
    let source = parliament();

    let first = {
        let mut conn = Connection::open(&db_path).unwrap();
        setup_database(&conn).unwrap();
        let report = ingestor(&source).run_all(&mut conn);
        assert!(report.is_complete());
        (snapshot(&conn), report)
    };

    // Fresh connection and fresh run, same sources.
    let mut conn = Connection::open(&db_path).unwrap();
    setup_database(&conn).unwrap();
    let report = ingestor(&source).run_all(&mut conn);

    assert!(report.is_complete());
    for kind in EntityKind::ORDERED {
        assert_eq!(report.count(kind), first.1.count(kind), "{kind}");
    }
    assert_eq!(snapshot(&conn), first.0);
    assert_eq!(count_rows(&conn, "spending_entries").unwrap(), 8);
}

#[test]
fn test_each_pipeline_twice_in_one_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut conn = Connection::open(dir.path().join("civic.db")).unwrap();
    setup_database(&conn).unwrap();
    let source = parliament();
    let ingestor = ingestor(&source);

    ingestor.ingest_legislators(&mut conn).unwrap();
    ingestor.ingest_legislators(&mut conn).unwrap();
    ingestor.ingest_transparency(&mut conn).unwrap();
    ingestor.ingest_transparency(&mut conn).unwrap();

    assert_eq!(count_rows(&conn, "legislators").unwrap(), 3);
    assert_eq!(count_rows(&conn, "transparency_entries").unwrap(), 2);
}

#[test]
fn test_source_edits_update_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let mut conn = Connection::open(dir.path().join("civic.db")).unwrap();
    setup_database(&conn).unwrap();

    let source = parliament();
    ingestor(&source).run_all(&mut conn);

    // Bo Bay crosses the floor.
    let edited = parliament().with_json(
        "https://api.example.test/politicians/bo-bay/?format=json",
        serde_json::json!({
            "name": "Bo Bay",
            "url": "/politicians/bo-bay/",
            "current_party": {"short_name": {"en": "Independent"}},
            "other_info": {"parl_mp_id": ["200"]}
        }),
    );
    ingestor(&edited).ingest_legislators(&mut conn).unwrap();

    let legislators = list_legislators(&conn).unwrap();
    assert_eq!(legislators.len(), 3);
    let bo = legislators.iter().find(|l| l.id == 200).unwrap();
    assert_eq!(bo.party, "Independent");
    // Not provided this time, so the stored photo survives.
    assert_eq!(
        bo.photo_url.as_deref(),
        Some("https://api.example.test/media/polpics/bo-bay.jpg")
    );
}
