// In-memory SourceClient for tests and offline runs.
// Canned responses by exact URL; anything unregistered is a 404.

use crate::client::SourceClient;
use crate::error::TransportError;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Canned {
    Json(Value),
    Html(String),
    Fail(String),
}

#[derive(Debug, Default)]
pub struct FakeSource {
    responses: HashMap<String, Canned>,
    calls: RefCell<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, url: &str, body: Value) -> Self {
        self.responses.insert(url.to_string(), Canned::Json(body));
        self
    }

    pub fn with_html(mut self, url: &str, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), Canned::Html(body.to_string()));
        self
    }

    /// Make `url` fail with a network error
    pub fn with_failure(mut self, url: &str) -> Self {
        self.responses
            .insert(url.to_string(), Canned::Fail("connection reset".to_string()));
        self
    }

    /// Every URL requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.borrow().iter().filter(|u| u.as_str() == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }

    fn lookup(&self, url: &str) -> Result<&Canned, TransportError> {
        self.calls.borrow_mut().push(url.to_string());
        match self.responses.get(url) {
            Some(Canned::Fail(reason)) => Err(TransportError::Network {
                url: url.to_string(),
                reason: reason.clone(),
            }),
            Some(canned) => Ok(canned),
            None => Err(TransportError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

impl SourceClient for FakeSource {
    fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        match self.lookup(url)? {
            Canned::Json(body) => Ok(body.clone()),
            Canned::Html(body) => serde_json::from_str(body).map_err(|e| TransportError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Canned::Fail(_) => unreachable!("failures are returned by lookup"),
        }
    }

    fn get_html(&self, url: &str) -> Result<String, TransportError> {
        match self.lookup(url)? {
            Canned::Json(body) => Ok(body.to_string()),
            Canned::Html(body) => Ok(body.clone()),
            Canned::Fail(_) => unreachable!("failures are returned by lookup"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fake_source_records_calls() {
        let source = FakeSource::new()
            .with_json("https://a.test/x", json!({"ok": true}))
            .with_failure("https://a.test/down");

        assert_eq!(source.get_json("https://a.test/x").unwrap()["ok"], json!(true));
        assert!(matches!(
            source.get_json("https://a.test/down"),
            Err(TransportError::Network { .. })
        ));
        assert!(matches!(
            source.get_html("https://a.test/missing"),
            Err(TransportError::Status { status: 404, .. })
        ));
        assert_eq!(source.total_calls(), 3);
        assert_eq!(source.call_count("https://a.test/x"), 1);
    }
}
