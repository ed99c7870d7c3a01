use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use serde::Deserialize;
use shared::domain::{DrawPolicy, DEFAULT_HISTORY_LIMIT};

pub const DEFAULT_CONFIG_FILE: &str = "oracle.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub source: String,
    pub database_url: String,
    pub history_limit: usize,
    pub reset_hours: u64,
    pub fetch_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: "urls.txt".into(),
            database_url: "sqlite://./data/oracle.db".into(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            reset_hours: 24,
            fetch_timeout_secs: 10,
        }
    }
}

impl Settings {
    pub fn policy(&self) -> anyhow::Result<DrawPolicy> {
        if self.history_limit == 0 {
            bail!("history_limit must be at least 1");
        }
        if self.reset_hours == 0 {
            bail!("reset_hours must be at least 1");
        }
        Ok(DrawPolicy {
            history_limit: self.history_limit,
            reset_after: Duration::from_secs(self.reset_hours.saturating_mul(60 * 60)),
        })
    }

    pub fn fetch_timeout(&self) -> anyhow::Result<Duration> {
        if self.fetch_timeout_secs == 0 {
            bail!("fetch_timeout_secs must be at least 1");
        }
        Ok(Duration::from_secs(self.fetch_timeout_secs))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    source: Option<String>,
    database_url: Option<String>,
    history_limit: Option<usize>,
    reset_hours: Option<u64>,
    fetch_timeout_secs: Option<u64>,
}

/// Defaults, then the TOML file, then the environment. An explicit config
/// path must exist; the default one is optional.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = explicit_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if explicit_path.is_some() => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.source {
        settings.source = v;
    }
    if let Some(v) = file_cfg.database_url {
        settings.database_url = v;
    }
    if let Some(v) = file_cfg.history_limit {
        settings.history_limit = v;
    }
    if let Some(v) = file_cfg.reset_hours {
        settings.reset_hours = v;
    }
    if let Some(v) = file_cfg.fetch_timeout_secs {
        settings.fetch_timeout_secs = v;
    }
    Ok(())
}

fn apply_env(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("ORACLE_SOURCE") {
        settings.source = v;
    }
    if let Some(v) = lookup("APP__SOURCE") {
        settings.source = v;
    }

    if let Some(v) = lookup("ORACLE_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = lookup("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = lookup("APP__HISTORY_LIMIT") {
        settings.history_limit = parse_env("APP__HISTORY_LIMIT", &v)?;
    }
    if let Some(v) = lookup("APP__RESET_HOURS") {
        settings.reset_hours = parse_env("APP__RESET_HOURS", &v)?;
    }
    if let Some(v) = lookup("APP__FETCH_TIMEOUT_SECS") {
        settings.fetch_timeout_secs = parse_env("APP__FETCH_TIMEOUT_SECS", &v)?;
    }

    Ok(())
}

fn parse_env<T>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} has invalid value '{raw}'"))
}

pub fn prepare_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
