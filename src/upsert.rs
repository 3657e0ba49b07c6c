// 🔁 Upsert Engine
//
// Merges a batch of canonical records into storage by id. The whole batch is
// one SQLite transaction: a storage failure rolls everything back, so a
// reader never sees half a batch.

use crate::db::{exists, StoredRecord};
use crate::error::PipelineResult;
use rusqlite::Connection;
use std::collections::HashSet;
use tracing::debug;

/// Drop repeated ids, keeping the first occurrence and source order.
pub fn dedupe_by_id<T: StoredRecord>(records: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.id()))
        .collect()
}

/// Insert-or-update every record, commit once.
///
/// Returns the number of records processed; inserts and updates are not
/// distinguished.
pub fn upsert_batch<T: StoredRecord>(conn: &mut Connection, records: &[T]) -> PipelineResult<usize> {
    let tx = conn.transaction()?;
    let mut processed = 0;

    for record in records {
        if exists(&tx, T::TABLE, record.id())? {
            record.update(&tx)?;
        } else {
            record.insert(&tx)?;
        }
        processed += 1;
    }

    // Dropping `tx` on an early return above rolls back.
    tx.commit()?;
    debug!(kind = %T::KIND, processed, "batch committed");

    Ok(processed)
}
