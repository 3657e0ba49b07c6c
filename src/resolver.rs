// 🔗 Cross-Reference Resolver
//
// Maps external legislator references onto local Legislator ids. Built fresh
// by the orchestrator for every run and handed to the pipelines that need
// it; nothing here outlives a run.
//
// Resolution never fails outright: when the reference is empty, the lookup
// errors, or the resolved id is unknown locally, the fallback id is used
// (the lowest stored legislator id, or none when storage is empty).

use crate::client::{api_url, SourceClient};
use crate::db::list_legislators;
use crate::models::Legislator;
use crate::normalize::legislator::legislator_id;
use rusqlite::Connection;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

// ============================================================================
// SPONSOR RESOLVER
// ============================================================================

pub struct SponsorResolver<'c> {
    client: &'c dyn SourceClient,
    base: String,
    /// Legislators present in storage when the run started: id → party
    known: BTreeMap<i64, String>,
    fallback: Option<i64>,
    cache: HashMap<String, Option<i64>>,
}

impl<'c> SponsorResolver<'c> {
    pub fn new(client: &'c dyn SourceClient, base: &str, legislators: &[Legislator]) -> Self {
        let known: BTreeMap<i64, String> = legislators
            .iter()
            .map(|l| (l.id, l.party.clone()))
            .collect();
        let fallback = known.keys().next().copied();

        SponsorResolver {
            client,
            base: base.to_string(),
            known,
            fallback,
            cache: HashMap::new(),
        }
    }

    /// Snapshot the legislator set currently in storage.
    pub fn from_storage(
        client: &'c dyn SourceClient,
        base: &str,
        conn: &Connection,
    ) -> rusqlite::Result<Self> {
        let legislators = list_legislators(conn)?;
        Ok(Self::new(client, base, &legislators))
    }

    pub fn fallback(&self) -> Option<i64> {
        self.fallback
    }

    /// Number of distinct references resolved so far this run
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Party of a known legislator
    pub fn party_of(&self, id: i64) -> Option<&str> {
        self.known.get(&id).map(String::as_str)
    }

    /// Resolve a politician reference (detail URL or path) to a local id.
    pub fn resolve(&mut self, key: Option<&str>) -> Option<i64> {
        let key = match key.map(str::trim) {
            Some(k) if !k.is_empty() => k,
            _ => return self.fallback,
        };

        if let Some(cached) = self.cache.get(key) {
            return *cached;
        }

        let resolved = self.lookup(key);
        self.cache.insert(key.to_string(), resolved);
        resolved
    }

    fn lookup(&self, key: &str) -> Option<i64> {
        let url = api_url(&self.base, key);

        let detail = match self.client.get_json(&url) {
            Ok(detail) => detail,
            Err(e) => {
                warn!(reference = key, error = %e, "sponsor lookup failed, using fallback");
                return self.fallback;
            }
        };

        let id = legislator_id(&detail, key);
        if self.known.contains_key(&id) {
            Some(id)
        } else {
            debug!(reference = key, id, "sponsor not in local storage, using fallback");
            self.fallback
        }
    }
}

// ============================================================================
// NAME INDEX
// ============================================================================

/// Per-run lookup of legislators by display name, for sources that only
/// reference people by name.
#[derive(Debug, Default)]
pub struct NameIndex {
    by_name: HashMap<String, i64>,
}

impl NameIndex {
    pub fn from_legislators(legislators: &[Legislator]) -> Self {
        let mut by_name = HashMap::new();
        for legislator in legislators {
            // Ascending id order: the first legislator with a name keeps it.
            by_name
                .entry(name_key(&legislator.name))
                .or_insert(legislator.id);
        }
        NameIndex { by_name }
    }

    pub fn from_storage(conn: &Connection) -> rusqlite::Result<Self> {
        Ok(Self::from_legislators(&list_legislators(conn)?))
    }

    pub fn lookup(&self, display_name: &str) -> Option<i64> {
        self.by_name.get(&name_key(display_name)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// "Smith, Jane" → "Jane Smith"; anything else is trimmed.
pub fn normalize_person_name(value: &str) -> String {
    match value.split_once(',') {
        Some((last, first)) => format!("{} {}", first.trim(), last.trim()),
        None => value.trim().to_string(),
    }
}

fn name_key(value: &str) -> String {
    normalize_person_name(value)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
