use crate::environment::{BaseUrls, Environment};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Mock,
    Http,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Backend::Mock),
            "http" => Ok(Backend::Http),
            other => bail!("unknown backend '{}' (expected mock or http)", other),
        }
    }
}

/// Tuning for the simulated backend. These are demo constants, not contracts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    pub latency_min_ms: u64,
    /// Exclusive upper bound.
    pub latency_max_ms: u64,
    pub failure_rate: f64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            latency_min_ms: 800,
            latency_max_ms: 1800,
            failure_rate: 0.1,
        }
    }
}

impl MockConfig {
    /// No delay and no injected failures.
    pub fn instant() -> Self {
        Self {
            latency_min_ms: 0,
            latency_max_ms: 0,
            failure_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub model: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub backend: Backend,
    pub environment: Environment,
    pub base_urls: BaseUrls,
    pub mock: MockConfig,
    pub ai: AiConfig,
    /// Directory of extra page definitions (`*.yaml`).
    pub pages_dir: Option<PathBuf>,
    pub max_records: Option<usize>,
}

impl ConsoleConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = parse_var(&lookup, "FINCONSOLE_LATENCY_MIN_MS")? {
            config.mock.latency_min_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "FINCONSOLE_LATENCY_MAX_MS")? {
            config.mock.latency_max_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "FINCONSOLE_FAILURE_RATE")? {
            config.mock.failure_rate = v;
        }
        if let Some(v) = parse_var(&lookup, "FINCONSOLE_BACKEND")? {
            config.backend = v;
        }
        if let Some(v) = parse_var(&lookup, "FINCONSOLE_ENV")? {
            config.environment = v;
        }
        for env in Environment::ALL {
            let key = format!("FINCONSOLE_BASE_URL_{}", env.as_str());
            if let Some(url) = lookup(&key).filter(|s| !s.trim().is_empty()) {
                url::Url::parse(&url).with_context(|| format!("{} is not a valid URL", key))?;
                config.base_urls.set(env, url);
            }
        }
        if let Some(dir) = lookup("FINCONSOLE_PAGES_DIR").filter(|s| !s.trim().is_empty()) {
            config.pages_dir = Some(PathBuf::from(dir));
        }
        if let Some(model) = lookup("FINCONSOLE_AI_MODEL").filter(|s| !s.trim().is_empty()) {
            config.ai.model = model;
        }
        if let Some(url) = lookup("FINCONSOLE_AI_BASE_URL").filter(|s| !s.trim().is_empty()) {
            config.ai.base_url = url;
        }
        if let Some(v) = parse_var(&lookup, "FINCONSOLE_MAX_RECORDS")? {
            config.max_records = Some(v);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.mock.failure_rate) {
            bail!(
                "failure rate must be within [0, 1], got {}",
                self.mock.failure_rate
            );
        }
        if self.mock.latency_max_ms < self.mock.latency_min_ms {
            bail!(
                "latency range is inverted ({}ms > {}ms)",
                self.mock.latency_min_ms,
                self.mock.latency_max_ms
            );
        }
        if self.max_records == Some(0) {
            bail!("max records must be at least 1");
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = ConsoleConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.mock.latency_min_ms, 800);
        assert_eq!(config.mock.latency_max_ms, 1800);
        assert_eq!(config.mock.failure_rate, 0.1);
        assert_eq!(config.backend, Backend::Mock);
    }

    #[test]
    fn test_overrides() {
        let config = ConsoleConfig::from_lookup(lookup(&[
            ("FINCONSOLE_LATENCY_MIN_MS", "10"),
            ("FINCONSOLE_LATENCY_MAX_MS", "20"),
            ("FINCONSOLE_FAILURE_RATE", "0.5"),
            ("FINCONSOLE_BACKEND", "http"),
            ("FINCONSOLE_ENV", "test"),
            ("FINCONSOLE_BASE_URL_TEST", "http://localhost:9000/v1"),
            ("FINCONSOLE_MAX_RECORDS", "5"),
            ("FINCONSOLE_AI_MODEL", "gemini-2.0-pro"),
        ]))
        .unwrap();

        assert_eq!(config.mock.latency_min_ms, 10);
        assert_eq!(config.mock.failure_rate, 0.5);
        assert_eq!(config.backend, Backend::Http);
        assert_eq!(config.environment, Environment::Test);
        assert_eq!(
            config.base_urls.get(Environment::Test),
            "http://localhost:9000/v1"
        );
        assert_eq!(config.base_urls.get(Environment::Dev), Environment::Dev.default_base_url());
        assert_eq!(config.max_records, Some(5));
        assert_eq!(config.ai.model, "gemini-2.0-pro");
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = ConsoleConfig::from_lookup(lookup(&[("FINCONSOLE_LATENCY_MIN_MS", "fast")]))
            .unwrap_err();
        assert!(err.to_string().contains("FINCONSOLE_LATENCY_MIN_MS"));

        let err =
            ConsoleConfig::from_lookup(lookup(&[("FINCONSOLE_FAILURE_RATE", "1.5")])).unwrap_err();
        assert!(err.to_string().contains("failure rate"));

        let err = ConsoleConfig::from_lookup(lookup(&[("FINCONSOLE_BASE_URL_DEV", "not a url")]))
            .unwrap_err();
        assert!(err.to_string().contains("FINCONSOLE_BASE_URL_DEV"));
    }
}
