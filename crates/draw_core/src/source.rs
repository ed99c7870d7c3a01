use std::{
    fmt,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    header::{CACHE_CONTROL, PRAGMA},
    Client,
};
use shared::{domain::SourceList, error::SourceError};
use tracing::debug;
use url::Url;

/// Where the newline-delimited URL list lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Remote(Url),
    Local(PathBuf),
}

impl SourceLocation {
    pub fn parse(raw: &str) -> Result<Self, SourceError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(SourceError::InvalidLocation(raw.to_string()));
        }

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(raw).map_err(|_| SourceError::InvalidLocation(raw.to_string()))?;
            return Ok(Self::Remote(url));
        }

        if lower.starts_with("file://") {
            let path = Url::parse(raw)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| SourceError::InvalidLocation(raw.to_string()))?;
            return Ok(Self::Local(path));
        }

        Ok(Self::Local(PathBuf::from(raw)))
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{url}"),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// One entry per line; surrounding whitespace is trimmed, blank lines and
/// `#` comments are dropped.
pub fn parse_source_text(text: &str) -> SourceList {
    SourceList::from_entries(
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#')),
    )
}

#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self) -> Result<SourceList, SourceError>;
}

pub struct HttpSourceFetcher {
    http: Client,
    url: Url,
}

impl HttpSourceFetcher {
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for source list")?;
        Ok(Self { http, url })
    }
}

#[async_trait]
impl SourceFetcher for HttpSourceFetcher {
    async fn fetch(&self) -> Result<SourceList, SourceError> {
        let response = self
            .http
            .get(self.url.clone())
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|err| SourceError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|err| SourceError::Body(err.to_string()))?;
        let list = parse_source_text(&text);
        debug!(url = %self.url, entries = list.len(), "source: fetched list");
        Ok(list)
    }
}

pub struct FileSourceFetcher {
    path: PathBuf,
}

impl FileSourceFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SourceFetcher for FileSourceFetcher {
    async fn fetch(&self) -> Result<SourceList, SourceError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| SourceError::Io(format!("{}: {err}", self.path.display())))?;
        let list = parse_source_text(&text);
        debug!(path = %self.path.display(), entries = list.len(), "source: read list");
        Ok(list)
    }
}

pub fn fetcher_for(location: SourceLocation, timeout: Duration) -> Result<Arc<dyn SourceFetcher>> {
    Ok(match location {
        SourceLocation::Remote(url) => Arc::new(HttpSourceFetcher::new(url, timeout)?),
        SourceLocation::Local(path) => Arc::new(FileSourceFetcher::new(path)),
    })
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
