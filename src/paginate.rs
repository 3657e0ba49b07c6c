// 📄 Resource Paginator
//
// Lazily walks a `{objects: [...], pagination: {next_url}}` listing.
// Pages are fetched on demand; the sequence ends when `next_url` is absent,
// the record cap is reached, a page fails, or `next_url` points back at a
// page already fetched. A page failure is yielded once as an error and the
// iterator is then exhausted.

use crate::client::{api_url, SourceClient};
use crate::error::{PipelineError, PipelineResult};
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

pub struct Paginator<'a, C: SourceClient + ?Sized> {
    client: &'a C,
    base: String,
    next_url: Option<String>,
    buffer: VecDeque<Value>,
    visited: HashSet<String>,
    fetched: usize,
    max_records: Option<usize>,
    done: bool,
}

impl<'a, C: SourceClient + ?Sized> Paginator<'a, C> {
    /// Start at `<resource_path>?limit=<page_size>` on `base`.
    pub fn new(
        client: &'a C,
        base: &str,
        resource_path: &str,
        page_size: usize,
        max_records: Option<usize>,
    ) -> Self {
        let separator = if resource_path.contains('?') { '&' } else { '?' };
        Paginator {
            client,
            base: base.to_string(),
            next_url: Some(format!("{resource_path}{separator}limit={page_size}")),
            buffer: VecDeque::new(),
            visited: HashSet::new(),
            fetched: 0,
            max_records,
            done: max_records == Some(0),
        }
    }

    /// Number of records yielded so far
    pub fn fetched(&self) -> usize {
        self.fetched
    }

    fn fetch_next_page(&mut self) -> PipelineResult<()> {
        let Some(next) = self.next_url.take() else {
            return Ok(());
        };
        let url = api_url(&self.base, &next);
        if !self.visited.insert(url.clone()) {
            warn!(url = %url, "pagination revisits a fetched page, stopping");
            return Ok(());
        }

        let page = self
            .client
            .get_json(&url)
            .map_err(PipelineError::page_fetch)?;

        if let Some(objects) = page.get("objects").and_then(Value::as_array) {
            debug!(url = %url, count = objects.len(), "listing page fetched");
            self.buffer.extend(objects.iter().cloned());
        }

        self.next_url = page
            .get("pagination")
            .and_then(|p| p.get("next_url"))
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);

        Ok(())
    }
}

impl<'a, C: SourceClient + ?Sized> Iterator for Paginator<'a, C> {
    type Item = PipelineResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // Empty pages with a next link are skipped rather than ending the walk.
        while self.buffer.is_empty() {
            if self.next_url.is_none() {
                self.done = true;
                return None;
            }
            if let Err(e) = self.fetch_next_page() {
                self.done = true;
                return Some(Err(e));
            }
        }

        let record = self.buffer.pop_front()?;
        self.fetched += 1;
        if self.max_records.is_some_and(|cap| self.fetched >= cap) {
            self.done = true;
        }
        Some(Ok(record))
    }
}
