// 🏛️ civic-ingest CLI
// Runs ingestion pipelines against the live sources and reports what landed.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rusqlite::Connection;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use civic_ingest::{
    count_rows, recent_events, setup_database, EntityKind, HttpSourceClient, IngestConfig,
    Ingestor, PipelineStats, StoredRecord, VERSION,
};
use civic_ingest::{Legislator, Motion, SpendingEntry, TransparencyEntry};

#[derive(Parser, Debug)]
#[command(name = "civic-ingest", version, about = "Civic data ingestion into SQLite")]
struct Cli {
    /// JSON config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, normalize and upsert records
    Ingest {
        #[arg(value_enum, default_value_t = Target::All)]
        target: Target,
    },
    /// Row counts per table and the latest audit events
    Summary {
        #[arg(long, default_value_t = 10)]
        events: usize,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    All,
    Legislators,
    Motions,
    Spending,
    Transparency,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = IngestConfig::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }

    init_tracing(&config.log_level);

    let mut conn = Connection::open(&config.database_path)
        .with_context(|| format!("Failed to open database: {:?}", config.database_path))?;
    setup_database(&conn).context("Failed to initialize database schema")?;

    match cli.command {
        Command::Ingest { target } => run_ingest(&config, &mut conn, target),
        Command::Summary { events } => run_summary(&conn, events),
    }
}

/// RUST_LOG wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn run_ingest(config: &IngestConfig, conn: &mut Connection, target: Target) -> Result<()> {
    println!("🏛️  civic-ingest v{VERSION}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let client = HttpSourceClient::new(config.timeout()).context("Failed to build HTTP client")?;
    let ingestor = Ingestor::new(client, config.source_settings());

    let stats = match target {
        Target::All => {
            let report = ingestor.run_all(conn);
            for stats in &report.stats {
                print_stats(stats);
            }
            for failure in &report.failures {
                println!("❌ {}: {}", failure.kind, failure.error);
            }
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!("{}", report.summary());

            if !report.is_complete() {
                bail!("{} pipeline(s) failed", report.failures.len());
            }
            return Ok(());
        }
        Target::Legislators => ingestor.ingest_legislators(conn),
        Target::Motions => ingestor.ingest_motions(conn),
        Target::Spending => ingestor.ingest_spending(conn),
        Target::Transparency => ingestor.ingest_transparency(conn),
    }
    .with_context(|| format!("{target:?} pipeline failed"))?;

    print_stats(&stats);
    Ok(())
}

fn print_stats(stats: &PipelineStats) {
    println!(
        "✓ {:<20} fetched {:>5}  skipped {:>4}  dropped {:>4}  upserted {:>5}",
        stats.kind.to_string(),
        stats.fetched,
        stats.skipped,
        stats.dropped,
        stats.upserted
    );
}

fn run_summary(conn: &Connection, events: usize) -> Result<()> {
    println!("📊 Store summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for (kind, table) in [
        (EntityKind::Legislator, Legislator::TABLE),
        (EntityKind::Motion, Motion::TABLE),
        (EntityKind::SpendingEntry, SpendingEntry::TABLE),
        (EntityKind::TransparencyEntry, TransparencyEntry::TABLE),
    ] {
        println!("{:<20} {:>8}", kind.to_string(), count_rows(conn, table)?);
    }

    println!("\n🕒 Latest events");
    for event in recent_events(conn, events)? {
        println!(
            "{}  {:<16} {:<20} {}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.event_type,
            event.entity_type,
            event.data
        );
    }

    Ok(())
}
