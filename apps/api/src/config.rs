use anyhow::{bail, Context, Result};

use crate::matching::engine::MAX_TOP_N;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Absent key disables LLM rationale wording; templated rationale is used instead.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub default_top_n: usize,
    /// Upper bound on concurrent rationale compositions per run.
    pub matching_concurrency: usize,
    pub rationale_timeout_ms: u64,
    /// Optional JSON file overriding the built-in `MatchingRules`.
    pub matching_rules_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            default_top_n: check_default_top_n(parse_env("MATCHING_DEFAULT_TOP_N", 3)?)?,
            matching_concurrency: parse_env("MATCHING_CONCURRENCY", 4)?,
            rationale_timeout_ms: parse_env("RATIONALE_TIMEOUT_MS", 8000)?,
            matching_rules_path: optional_env("MATCHING_RULES_PATH"),
        })
    }
}

/// A default outside 1..=MAX_TOP_N would turn every request without `top_n` into a 400.
fn check_default_top_n(value: usize) -> Result<usize> {
    if !(1..=MAX_TOP_N).contains(&value) {
        bail!("MATCHING_DEFAULT_TOP_N must be between 1 and {MAX_TOP_N}, got {value}");
    }
    Ok(value)
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_top_n_range() {
        assert_eq!(check_default_top_n(1).unwrap(), 1);
        assert_eq!(check_default_top_n(MAX_TOP_N).unwrap(), MAX_TOP_N);
        assert!(check_default_top_n(0).is_err());
        let err = check_default_top_n(MAX_TOP_N + 1).unwrap_err();
        assert!(err.to_string().contains("MATCHING_DEFAULT_TOP_N"));
    }
}
