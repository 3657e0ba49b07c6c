// ⚙️ Configuration
//
// Defaults → optional JSON file → CIVIC_* environment overrides.
// The library never reads configuration itself; `source_settings()` turns
// this into the explicit SourceSettings a run is constructed with.

use crate::normalize::fiscal_period_label;
use crate::pipeline::SourceSettings;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub database_path: PathBuf,
    pub log_level: String,
    pub api_base: String,
    pub page_size: usize,
    /// `None` means no cap
    pub max_legislators: Option<usize>,
    pub max_motions: Option<usize>,
    pub spending_year: i32,
    pub spending_quarter: u8,
    /// Disclosure page; `{year}` and `{quarter}` are substituted
    pub spending_url: String,
    pub transparency_url: String,
    pub timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        let sources = SourceSettings::default();
        IngestConfig {
            database_path: PathBuf::from("civic_ingest.db"),
            log_level: "info".to_string(),
            api_base: sources.api_base,
            page_size: sources.page_size,
            max_legislators: sources.max_legislators,
            max_motions: sources.max_motions,
            spending_year: 2026,
            spending_quarter: 1,
            spending_url: "https://www.ourcommons.ca/ProactiveDisclosure/en/members/{year}/{quarter}"
                .to_string(),
            transparency_url: sources.transparency_url,
            timeout_secs: 30,
        }
    }
}

impl IngestConfig {
    /// Defaults, overlaid with `path` when given, then with the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path.as_ref()))
    }

    /// Apply `CIVIC_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CIVIC_DATABASE_PATH") {
            self.database_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("CIVIC_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = lookup("CIVIC_API_BASE") {
            self.api_base = v;
        }
        if let Some(v) = lookup("CIVIC_PAGE_SIZE") {
            self.page_size = parse_number("CIVIC_PAGE_SIZE", &v)?;
        }
        if let Some(v) = lookup("CIVIC_MAX_LEGISLATORS") {
            self.max_legislators = parse_cap("CIVIC_MAX_LEGISLATORS", &v)?;
        }
        if let Some(v) = lookup("CIVIC_MAX_MOTIONS") {
            self.max_motions = parse_cap("CIVIC_MAX_MOTIONS", &v)?;
        }
        if let Some(v) = lookup("CIVIC_TIMEOUT_SECS") {
            self.timeout_secs = parse_number("CIVIC_TIMEOUT_SECS", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        if !(1..=4).contains(&self.spending_quarter) {
            bail!("spending_quarter must be 1-4, got {}", self.spending_quarter);
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn source_settings(&self) -> SourceSettings {
        SourceSettings {
            api_base: self.api_base.clone(),
            page_size: self.page_size,
            max_legislators: self.max_legislators,
            max_motions: self.max_motions,
            spending_url: self
                .spending_url
                .replace("{year}", &self.spending_year.to_string())
                .replace("{quarter}", &self.spending_quarter.to_string()),
            fiscal_period: fiscal_period_label(self.spending_year, self.spending_quarter),
            transparency_url: self.transparency_url.clone(),
            ..SourceSettings::default()
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a number, got {value:?}"))
}

/// "none" (or empty) lifts the cap.
fn parse_cap(key: &str, value: &str) -> Result<Option<usize>> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    parse_number(key, trimmed).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = IngestConfig::default();
        let sources = config.source_settings();

        assert_eq!(config.page_size, 100);
        assert_eq!(config.max_legislators, Some(400));
        assert_eq!(
            sources.spending_url,
            "https://www.ourcommons.ca/ProactiveDisclosure/en/members/2026/1"
        );
        assert_eq!(sources.fiscal_period, "2026-Q1");
        assert_eq!(sources.api_base, "https://api.openparliament.ca");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"page_size": 25, "spending_quarter": 3}}"#).unwrap();

        let config = IngestConfig::from_file(file.path()).unwrap();

        assert_eq!(config.page_size, 25);
        assert_eq!(config.source_settings().fiscal_period, "2026-Q3");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_bad_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = IngestConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config JSON"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = IngestConfig::default();
        config
            .apply_overrides(env(&[
                ("CIVIC_DATABASE_PATH", "/tmp/x.db"),
                ("CIVIC_PAGE_SIZE", "20"),
                ("CIVIC_MAX_LEGISLATORS", "none"),
                ("CIVIC_MAX_MOTIONS", "5"),
            ]))
            .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.page_size, 20);
        assert_eq!(config.max_legislators, None);
        assert_eq!(config.max_motions, Some(5));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut config = IngestConfig::default();
        let err = config
            .apply_overrides(env(&[("CIVIC_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("CIVIC_TIMEOUT_SECS"));
    }

    #[test]
    fn test_validate_quarter() {
        let config = IngestConfig {
            spending_quarter: 5,
            ..IngestConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
