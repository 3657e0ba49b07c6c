// Civic Ingest - Core Library
// Pulls legislators, motions, spending and transparency records from public
// sources into one normalized SQLite store. Used by the CLI and tests.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod fake;
pub mod html;
pub mod identity;
pub mod models;
pub mod normalize;
pub mod paginate;
pub mod pipeline;
pub mod resolver;
pub mod upsert;

// Re-export commonly used types
pub use client::{api_url, HttpSourceClient, SourceClient, DEFAULT_TIMEOUT};
pub use config::IngestConfig;
pub use db::{
    count_rows, get_events_for_entity, get_legislator, get_motion, insert_event,
    list_legislators, list_motions, list_spending_entries, list_transparency_entries,
    recent_events, setup_database, Event, StoredRecord,
};
pub use error::{PipelineError, PipelineResult, TransportError};
pub use fake::FakeSource;
pub use identity::{assign_id, NaturalKey};
pub use models::{
    EntityKind, Legislator, Motion, MotionClassification, SpendingEntry, TransparencyEntry,
    VoteChoice, VoteTally,
};
pub use normalize::Normalized;
pub use paginate::Paginator;
pub use pipeline::{IngestReport, Ingestor, PipelineFailure, PipelineStats, SourceSettings};
pub use resolver::{NameIndex, SponsorResolver};
pub use upsert::{dedupe_by_id, upsert_batch};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
