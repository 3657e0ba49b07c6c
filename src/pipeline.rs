// 🚦 Ingestion Orchestrator
//
// Runs the per-kind pipelines in dependency order:
//   legislators → motions → spending → transparency
// Each pipeline is fetch → normalize → dedupe → upsert, one item at a time
// in source order. Item-level failures are logged and skipped; a page fetch
// or storage failure ends that pipeline only. Nothing is retried: re-running
// is the retry.

use crate::client::{api_url, SourceClient};
use crate::db::{insert_event, Event, StoredRecord};
use crate::error::{PipelineError, PipelineResult};
use crate::html::first_table_rows;
use crate::models::{EntityKind, Legislator, Motion, SpendingEntry, TransparencyEntry};
use crate::normalize::{
    expand_spending_row, normalize_legislator, normalize_motion, normalize_transparency_row,
    parse_spending_row, Normalized,
};
use crate::paginate::Paginator;
use crate::resolver::{NameIndex, SponsorResolver};
use crate::upsert::{dedupe_by_id, upsert_batch};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

const ACTOR: &str = "ingest_orchestrator";

// ============================================================================
// SETTINGS
// ============================================================================

/// Explicit bounds and endpoints for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    /// Base of the structured listing/detail API
    pub api_base: String,
    pub legislators_path: String,
    pub motions_path: String,
    pub page_size: usize,
    pub max_legislators: Option<usize>,
    pub max_motions: Option<usize>,
    /// Disclosure page with one spending table
    pub spending_url: String,
    /// Label stored on every spending entry, e.g. "2026-Q1"
    pub fiscal_period: String,
    /// Registry page with one transparency table
    pub transparency_url: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings {
            api_base: "https://api.openparliament.ca".to_string(),
            legislators_path: "/politicians/".to_string(),
            motions_path: "/bills/".to_string(),
            page_size: 100,
            max_legislators: Some(400),
            max_motions: Some(200),
            spending_url: "https://www.ourcommons.ca/ProactiveDisclosure/en/members/2026/1"
                .to_string(),
            fiscal_period: "2026-Q1".to_string(),
            transparency_url:
                "https://prciec-rpccie.parl.gc.ca/EN/PublicRegistries/Pages/PublicRegistryCode.aspx"
                    .to_string(),
        }
    }
}

// ============================================================================
// REPORTING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStats {
    pub kind: EntityKind,
    /// Raw records seen (listing entries or table rows)
    pub fetched: usize,
    /// Items lost to transport failures
    pub skipped: usize,
    /// Items the normalizer excluded
    pub dropped: usize,
    /// Records written by the upsert engine
    pub upserted: usize,
}

impl PipelineStats {
    pub fn new(kind: EntityKind) -> Self {
        PipelineStats {
            kind,
            fetched: 0,
            skipped: 0,
            dropped: 0,
            upserted: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineFailure {
    pub kind: EntityKind,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub stats: Vec<PipelineStats>,
    pub failures: Vec<PipelineFailure>,
}

impl IngestReport {
    /// Records upserted for `kind` (0 when its pipeline failed)
    pub fn count(&self, kind: EntityKind) -> usize {
        self.stats
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| s.upserted)
            .unwrap_or(0)
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        let counts: Vec<String> = EntityKind::ORDERED
            .iter()
            .map(|kind| format!("{}={}", kind, self.count(*kind)))
            .collect();
        format!(
            "run {} | {} | failed pipelines: {}",
            self.run_id,
            counts.join(" "),
            self.failures.len()
        )
    }
}

// ============================================================================
// INGESTOR
// ============================================================================

/// One ingestion run against one source client.
pub struct Ingestor<C: SourceClient> {
    client: C,
    settings: SourceSettings,
    today: NaiveDate,
    run_id: String,
}

impl<C: SourceClient> Ingestor<C> {
    pub fn new(client: C, settings: SourceSettings) -> Self {
        Ingestor {
            client,
            settings,
            today: Utc::now().date_naive(),
            run_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Pin the date used for unparseable source dates.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn settings(&self) -> &SourceSettings {
        &self.settings
    }

    /// All pipelines in dependency order. A failed pipeline is recorded and
    /// the next one still runs; earlier commits are never rolled back.
    pub fn run_all(&self, conn: &mut Connection) -> IngestReport {
        let mut report = IngestReport {
            run_id: self.run_id.clone(),
            started_at: Utc::now(),
            stats: Vec::new(),
            failures: Vec::new(),
        };
        info!(run_id = %self.run_id, "starting ingestion run");

        for kind in EntityKind::ORDERED {
            let result = match kind {
                EntityKind::Legislator => self.ingest_legislators(conn),
                EntityKind::Motion => self.new_resolver(conn).and_then(|mut resolver| {
                    self.ingest_motions_with(conn, &mut resolver)
                }),
                EntityKind::SpendingEntry => self.ingest_spending(conn),
                EntityKind::TransparencyEntry => self.ingest_transparency(conn),
            };

            match result {
                Ok(stats) => report.stats.push(stats),
                Err(e) => {
                    error!(run_id = %self.run_id, kind = %kind, error = %e, "pipeline failed");
                    self.record_event(
                        conn,
                        "ingest_failed",
                        kind,
                        serde_json::json!({ "error": e.to_string() }),
                    );
                    report.failures.push(PipelineFailure {
                        kind,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!("{}", report.summary());
        report
    }

    /// Fresh resolver over the legislators currently in storage.
    pub fn new_resolver(&self, conn: &Connection) -> PipelineResult<SponsorResolver<'_>> {
        Ok(SponsorResolver::from_storage(
            &self.client,
            &self.settings.api_base,
            conn,
        )?)
    }

    // ------------------------------------------------------------------------
    // LEGISLATORS
    // ------------------------------------------------------------------------

    #[instrument(level = "info", skip_all, fields(run_id = %self.run_id))]
    pub fn ingest_legislators(&self, conn: &mut Connection) -> PipelineResult<PipelineStats> {
        let mut stats = PipelineStats::new(EntityKind::Legislator);
        let mut records: Vec<Legislator> = Vec::new();

        for summary in self.listing(
            &self.settings.legislators_path,
            self.settings.max_legislators,
        ) {
            let summary = summary?;
            stats.fetched += 1;

            let Some(detail) = self.fetch_detail(&summary, "politician") else {
                stats.skipped += 1;
                continue;
            };

            match normalize_legislator(&detail, &self.settings.api_base, self.today) {
                Normalized::Keep(legislator) => records.push(legislator),
                Normalized::Drop(reason) => {
                    debug!(url = summary_url(&summary), reason = %reason, "politician dropped");
                    stats.dropped += 1;
                }
            }
        }

        self.commit(conn, records, stats)
    }

    // ------------------------------------------------------------------------
    // MOTIONS
    // ------------------------------------------------------------------------

    /// Motions with a resolver built for this call.
    pub fn ingest_motions(&self, conn: &mut Connection) -> PipelineResult<PipelineStats> {
        let mut resolver = self.new_resolver(conn)?;
        self.ingest_motions_with(conn, &mut resolver)
    }

    /// Motions with a resolver supplied by the caller (one per run).
    #[instrument(level = "info", skip_all, fields(run_id = %self.run_id))]
    pub fn ingest_motions_with(
        &self,
        conn: &mut Connection,
        resolver: &mut SponsorResolver<'_>,
    ) -> PipelineResult<PipelineStats> {
        let mut stats = PipelineStats::new(EntityKind::Motion);
        let mut records: Vec<Motion> = Vec::new();

        for summary in self.listing(&self.settings.motions_path, self.settings.max_motions) {
            let summary = summary?;
            stats.fetched += 1;

            let Some(detail) = self.fetch_detail(&summary, "bill") else {
                stats.skipped += 1;
                continue;
            };
            let votes = self.fetch_vote_details(&detail);

            match normalize_motion(&detail, &votes, resolver, self.today) {
                Normalized::Keep(motion) => records.push(motion),
                Normalized::Drop(reason) => {
                    debug!(url = summary_url(&summary), reason = %reason, "bill dropped");
                    stats.dropped += 1;
                }
            }
        }

        self.commit(conn, records, stats)
    }

    /// Vote documents listed under `vote_urls`, in listed order. A vote that
    /// cannot be fetched is left out; the bill itself is kept.
    fn fetch_vote_details(&self, detail: &Value) -> Vec<Value> {
        let Some(urls) = detail.get("vote_urls").and_then(Value::as_array) else {
            return Vec::new();
        };

        urls.iter()
            .filter_map(Value::as_str)
            .filter_map(|path| {
                let url = api_url(&self.settings.api_base, path);
                match self.client.get_json(&url) {
                    Ok(vote) => Some(vote),
                    Err(e) => {
                        warn!(url = %url, error = %e, "failed to download vote detail");
                        None
                    }
                }
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // SPENDING
    // ------------------------------------------------------------------------

    #[instrument(level = "info", skip_all, fields(run_id = %self.run_id))]
    pub fn ingest_spending(&self, conn: &mut Connection) -> PipelineResult<PipelineStats> {
        let mut stats = PipelineStats::new(EntityKind::SpendingEntry);
        let url = &self.settings.spending_url;

        let rows = self.fetch_table(url)?;
        let index = NameIndex::from_storage(conn)?;
        let mut records: Vec<SpendingEntry> = Vec::new();

        for cells in &rows {
            let Some(row) = parse_spending_row(cells) else {
                debug!(url = %url, cells = cells.len(), "spending row skipped");
                continue;
            };
            stats.fetched += 1;

            match expand_spending_row(&row, &index, &self.settings.fiscal_period, url) {
                Normalized::Keep(entries) => records.extend(entries),
                Normalized::Drop(reason) => {
                    debug!(url = %url, reason = %reason, "spending row dropped");
                    stats.dropped += 1;
                }
            }
        }

        self.commit(conn, records, stats)
    }

    // ------------------------------------------------------------------------
    // TRANSPARENCY
    // ------------------------------------------------------------------------

    #[instrument(level = "info", skip_all, fields(run_id = %self.run_id))]
    pub fn ingest_transparency(&self, conn: &mut Connection) -> PipelineResult<PipelineStats> {
        let mut stats = PipelineStats::new(EntityKind::TransparencyEntry);
        let url = &self.settings.transparency_url;

        let rows = self.fetch_table(url)?;
        let index = NameIndex::from_storage(conn)?;
        let mut records: Vec<TransparencyEntry> = Vec::new();

        for cells in &rows {
            stats.fetched += 1;

            match normalize_transparency_row(cells, &index, self.today) {
                Normalized::Keep(entry) => records.push(entry),
                Normalized::Drop(reason) => {
                    debug!(url = %url, reason = %reason, "registry row dropped");
                    stats.dropped += 1;
                }
            }
        }

        self.commit(conn, records, stats)
    }

    // ------------------------------------------------------------------------
    // SHARED STEPS
    // ------------------------------------------------------------------------

    fn listing(&self, path: &str, cap: Option<usize>) -> Paginator<'_, C> {
        Paginator::new(
            &self.client,
            &self.settings.api_base,
            path,
            self.settings.page_size,
            cap,
        )
    }

    /// Detail document for a listing summary; `None` (logged) when the
    /// summary has no url or the fetch fails.
    fn fetch_detail(&self, summary: &Value, what: &str) -> Option<Value> {
        let Some(path) = summary.get("url").and_then(Value::as_str) else {
            warn!(summary = %summary, "{what} summary without url");
            return None;
        };

        let url = api_url(&self.settings.api_base, path);
        match self.client.get_json(&url) {
            Ok(detail) => Some(detail),
            Err(e) => {
                warn!(url = %url, error = %e, "failed to download {what} detail");
                None
            }
        }
    }

    /// Data rows of the page's table. The page fetch is page-scoped: its
    /// failure ends the pipeline. A page without a table yields no rows.
    fn fetch_table(&self, url: &str) -> PipelineResult<Vec<Vec<String>>> {
        let html = self
            .client
            .get_html(url)
            .map_err(PipelineError::page_fetch)?;

        Ok(first_table_rows(&html).unwrap_or_else(|| {
            warn!(url = %url, "no table found");
            Vec::new()
        }))
    }

    fn commit<T: StoredRecord>(
        &self,
        conn: &mut Connection,
        records: Vec<T>,
        mut stats: PipelineStats,
    ) -> PipelineResult<PipelineStats> {
        let batch = dedupe_by_id(records);
        stats.upserted = upsert_batch(conn, &batch)?;

        info!(
            kind = %stats.kind,
            fetched = stats.fetched,
            skipped = stats.skipped,
            dropped = stats.dropped,
            upserted = stats.upserted,
            "pipeline complete"
        );
        self.record_event(
            conn,
            "ingest_completed",
            stats.kind,
            serde_json::to_value(&stats).unwrap_or(Value::Null),
        );

        Ok(stats)
    }

    /// Audit trail is a side channel: failing to write it never fails a run.
    fn record_event(&self, conn: &Connection, event_type: &str, kind: EntityKind, data: Value) {
        let event = Event::new(event_type, kind.as_str(), &self.run_id, data, ACTOR);
        if let Err(e) = insert_event(conn, &event) {
            warn!(error = %e, event_type, "could not record audit event");
        }
    }
}

fn summary_url(summary: &Value) -> &str {
    summary.get("url").and_then(Value::as_str).unwrap_or("<no url>")
}
