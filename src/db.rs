// 🗄️ Storage - SQLite schema, record mapping, audit events
//
// Keyed-record store consumed by the upsert engine (get-by-id, insert,
// update, commit) and by the per-run lookup indices (list-all).

use crate::error::PipelineResult;
use crate::models::{
    EntityKind, Legislator, Motion, MotionClassification, SpendingEntry, TransparencyEntry,
    VoteTally,
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    // WAL for crash recovery; in-memory databases silently keep "memory"
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS legislators (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            district TEXT NOT NULL,
            party TEXT NOT NULL,
            photo_url TEXT,
            attendance_rate REAL,
            party_line_voting_rate REAL,
            years_in_office INTEGER
        );

        CREATE TABLE IF NOT EXISTS motions (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            sponsor_id INTEGER NOT NULL REFERENCES legislators(id),
            sponsor_party TEXT,
            vote_tally TEXT NOT NULL,
            passed INTEGER,
            categories TEXT NOT NULL,
            classification TEXT NOT NULL
                CHECK (classification IN ('substantive', 'subsidiary', 'privileged', 'incidental')),
            date TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS spending_entries (
            id INTEGER PRIMARY KEY,
            legislator_id INTEGER NOT NULL REFERENCES legislators(id),
            category TEXT NOT NULL,
            amount REAL NOT NULL,
            fiscal_period TEXT NOT NULL,
            details_url TEXT
        );

        CREATE TABLE IF NOT EXISTS transparency_entries (
            id INTEGER PRIMARY KEY,
            legislator_id INTEGER NOT NULL REFERENCES legislators(id),
            registry_type TEXT NOT NULL,
            details TEXT,
            filed_date TEXT NOT NULL
        );

        -- Audit trail: one event per completed pipeline run
        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_legislators_name ON legislators(name);
        CREATE INDEX IF NOT EXISTS idx_motions_sponsor ON motions(sponsor_id);
        CREATE INDEX IF NOT EXISTS idx_motions_date ON motions(date);
        CREATE INDEX IF NOT EXISTS idx_spending_legislator ON spending_entries(legislator_id);
        CREATE INDEX IF NOT EXISTS idx_transparency_legislator ON transparency_entries(legislator_id);
        CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id);
        CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp);",
    )?;

    Ok(())
}

// ============================================================================
// STORED RECORD - how each canonical kind maps onto its table
// ============================================================================

/// A canonical record the upsert engine can write.
///
/// `update` overwrites every field the record provides. Optional fields that
/// are `None` keep whatever is stored (another tool may have filled them).
pub trait StoredRecord {
    const KIND: EntityKind;
    const TABLE: &'static str;

    fn id(&self) -> i64;
    fn insert(&self, conn: &Connection) -> PipelineResult<()>;
    fn update(&self, conn: &Connection) -> PipelineResult<()>;
}

/// Whether a row with this primary key exists in `table`.
pub fn exists(conn: &Connection, table: &str, id: i64) -> rusqlite::Result<bool> {
    let sql = format!("SELECT 1 FROM {table} WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id], |_| Ok(()))
        .optional()?
        .is_some())
}

pub fn count_rows(conn: &Connection, table: &str) -> rusqlite::Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    conn.query_row(&sql, [], |row| row.get(0))
}

impl StoredRecord for Legislator {
    const KIND: EntityKind = EntityKind::Legislator;
    const TABLE: &'static str = "legislators";

    fn id(&self) -> i64 {
        self.id
    }

    fn insert(&self, conn: &Connection) -> PipelineResult<()> {
        conn.execute(
            "INSERT INTO legislators (
                id, name, district, party, photo_url,
                attendance_rate, party_line_voting_rate, years_in_office
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                self.id,
                self.name,
                self.district,
                self.party,
                self.photo_url,
                self.attendance_rate,
                self.party_line_voting_rate,
                self.years_in_office,
            ],
        )?;
        Ok(())
    }

    fn update(&self, conn: &Connection) -> PipelineResult<()> {
        conn.execute(
            "UPDATE legislators SET
                name = ?2,
                district = ?3,
                party = ?4,
                photo_url = COALESCE(?5, photo_url),
                attendance_rate = COALESCE(?6, attendance_rate),
                party_line_voting_rate = COALESCE(?7, party_line_voting_rate),
                years_in_office = COALESCE(?8, years_in_office)
             WHERE id = ?1",
            params![
                self.id,
                self.name,
                self.district,
                self.party,
                self.photo_url,
                self.attendance_rate,
                self.party_line_voting_rate,
                self.years_in_office,
            ],
        )?;
        Ok(())
    }
}

impl StoredRecord for Motion {
    const KIND: EntityKind = EntityKind::Motion;
    const TABLE: &'static str = "motions";

    fn id(&self) -> i64 {
        self.id
    }

    fn insert(&self, conn: &Connection) -> PipelineResult<()> {
        conn.execute(
            "INSERT INTO motions (
                id, title, description, sponsor_id, sponsor_party,
                vote_tally, passed, categories, classification, date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                self.id,
                self.title,
                self.description,
                self.sponsor_id,
                self.sponsor_party,
                serde_json::to_string(&self.vote_tally)?,
                self.passed,
                serde_json::to_string(&self.categories)?,
                self.classification.as_str(),
                self.date.format(DATE_FORMAT).to_string(),
            ],
        )?;
        Ok(())
    }

    fn update(&self, conn: &Connection) -> PipelineResult<()> {
        conn.execute(
            "UPDATE motions SET
                title = ?2,
                description = COALESCE(?3, description),
                sponsor_id = ?4,
                sponsor_party = COALESCE(?5, sponsor_party),
                vote_tally = ?6,
                passed = ?7,
                categories = ?8,
                classification = ?9,
                date = ?10
             WHERE id = ?1",
            params![
                self.id,
                self.title,
                self.description,
                self.sponsor_id,
                self.sponsor_party,
                serde_json::to_string(&self.vote_tally)?,
                self.passed,
                serde_json::to_string(&self.categories)?,
                self.classification.as_str(),
                self.date.format(DATE_FORMAT).to_string(),
            ],
        )?;
        Ok(())
    }
}

impl StoredRecord for SpendingEntry {
    const KIND: EntityKind = EntityKind::SpendingEntry;
    const TABLE: &'static str = "spending_entries";

    fn id(&self) -> i64 {
        self.id
    }

    fn insert(&self, conn: &Connection) -> PipelineResult<()> {
        conn.execute(
            "INSERT INTO spending_entries (
                id, legislator_id, category, amount, fiscal_period, details_url
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.id,
                self.legislator_id,
                self.category,
                self.amount,
                self.fiscal_period,
                self.details_url,
            ],
        )?;
        Ok(())
    }

    fn update(&self, conn: &Connection) -> PipelineResult<()> {
        conn.execute(
            "UPDATE spending_entries SET
                legislator_id = ?2,
                category = ?3,
                amount = ?4,
                fiscal_period = ?5,
                details_url = COALESCE(?6, details_url)
             WHERE id = ?1",
            params![
                self.id,
                self.legislator_id,
                self.category,
                self.amount,
                self.fiscal_period,
                self.details_url,
            ],
        )?;
        Ok(())
    }
}

impl StoredRecord for TransparencyEntry {
    const KIND: EntityKind = EntityKind::TransparencyEntry;
    const TABLE: &'static str = "transparency_entries";

    fn id(&self) -> i64 {
        self.id
    }

    fn insert(&self, conn: &Connection) -> PipelineResult<()> {
        conn.execute(
            "INSERT INTO transparency_entries (
                id, legislator_id, registry_type, details, filed_date
            ) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                self.id,
                self.legislator_id,
                self.registry_type,
                self.details,
                self.filed_date.format(DATE_FORMAT).to_string(),
            ],
        )?;
        Ok(())
    }

    fn update(&self, conn: &Connection) -> PipelineResult<()> {
        conn.execute(
            "UPDATE transparency_entries SET
                legislator_id = ?2,
                registry_type = ?3,
                details = COALESCE(?4, details),
                filed_date = ?5
             WHERE id = ?1",
            params![
                self.id,
                self.legislator_id,
                self.registry_type,
                self.details,
                self.filed_date.format(DATE_FORMAT).to_string(),
            ],
        )?;
        Ok(())
    }
}

// ============================================================================
// READS
// ============================================================================

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn json_column<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn classification_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<MotionClassification> {
    let raw: String = row.get(idx)?;
    Ok(MotionClassification::parse(&raw).unwrap_or_default())
}

const LEGISLATOR_COLUMNS: &str = "id, name, district, party, photo_url,
    attendance_rate, party_line_voting_rate, years_in_office";

fn legislator_from_row(row: &Row<'_>) -> rusqlite::Result<Legislator> {
    Ok(Legislator {
        id: row.get(0)?,
        name: row.get(1)?,
        district: row.get(2)?,
        party: row.get(3)?,
        photo_url: row.get(4)?,
        attendance_rate: row.get(5)?,
        party_line_voting_rate: row.get(6)?,
        years_in_office: row.get(7)?,
    })
}

const MOTION_COLUMNS: &str = "id, title, description, sponsor_id, sponsor_party,
    vote_tally, passed, categories, classification, date";

fn motion_from_row(row: &Row<'_>) -> rusqlite::Result<Motion> {
    let vote_tally: VoteTally = json_column(row, 5)?;
    let categories: Vec<String> = json_column(row, 7)?;

    Ok(Motion {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        sponsor_id: row.get(3)?,
        sponsor_party: row.get(4)?,
        vote_tally,
        passed: row.get(6)?,
        categories,
        classification: classification_column(row, 8)?,
        date: date_column(row, 9)?,
    })
}

fn spending_from_row(row: &Row<'_>) -> rusqlite::Result<SpendingEntry> {
    Ok(SpendingEntry {
        id: row.get(0)?,
        legislator_id: row.get(1)?,
        category: row.get(2)?,
        amount: row.get(3)?,
        fiscal_period: row.get(4)?,
        details_url: row.get(5)?,
    })
}

fn transparency_from_row(row: &Row<'_>) -> rusqlite::Result<TransparencyEntry> {
    Ok(TransparencyEntry {
        id: row.get(0)?,
        legislator_id: row.get(1)?,
        registry_type: row.get(2)?,
        details: row.get(3)?,
        filed_date: date_column(row, 4)?,
    })
}

pub fn get_legislator(conn: &Connection, id: i64) -> rusqlite::Result<Option<Legislator>> {
    conn.query_row(
        &format!("SELECT {LEGISLATOR_COLUMNS} FROM legislators WHERE id = ?1"),
        params![id],
        legislator_from_row,
    )
    .optional()
}

/// All legislators, ascending by id
pub fn list_legislators(conn: &Connection) -> rusqlite::Result<Vec<Legislator>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LEGISLATOR_COLUMNS} FROM legislators ORDER BY id"
    ))?;
    let rows = stmt
        .query_map([], legislator_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_motion(conn: &Connection, id: i64) -> rusqlite::Result<Option<Motion>> {
    conn.query_row(
        &format!("SELECT {MOTION_COLUMNS} FROM motions WHERE id = ?1"),
        params![id],
        motion_from_row,
    )
    .optional()
}

pub fn list_motions(conn: &Connection) -> rusqlite::Result<Vec<Motion>> {
    let mut stmt = conn.prepare(&format!("SELECT {MOTION_COLUMNS} FROM motions ORDER BY id"))?;
    let rows = stmt
        .query_map([], motion_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_spending_entries(conn: &Connection) -> rusqlite::Result<Vec<SpendingEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, legislator_id, category, amount, fiscal_period, details_url
         FROM spending_entries
         ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], spending_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_transparency_entries(conn: &Connection) -> rusqlite::Result<Vec<TransparencyEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, legislator_id, registry_type, details, filed_date
         FROM transparency_entries
         ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], transparency_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============================================================================
// AUDIT EVENTS
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

pub fn insert_event(conn: &Connection, event: &Event) -> PipelineResult<()> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let timestamp_str: String = row.get(1)?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);

    Ok(Event {
        event_id: row.get(0)?,
        timestamp,
        event_type: row.get(2)?,
        entity_type: row.get(3)?,
        entity_id: row.get(4)?,
        data: json_column(row, 5)?,
        actor: row.get(6)?,
    })
}

/// Events for one entity, newest first
pub fn get_events_for_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> rusqlite::Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY timestamp DESC, id DESC",
    )?;

    let events = stmt
        .query_map(params![entity_type, entity_id], event_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

pub fn recent_events(conn: &Connection, limit: usize) -> rusqlite::Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         ORDER BY id DESC
         LIMIT ?1",
    )?;

    let events = stmt
        .query_map(params![limit as i64], event_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}
