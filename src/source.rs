use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CACHE_CONTROL, LAST_MODIFIED};
use tracing::{debug, info, warn};

use crate::domain::{CatError, expand_path};
use crate::record::is_absolute_url;

const HTTP_TIMEOUT_SECS: u64 = 30;

/// Where the dataset snapshot lives.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Remote(String),
    Local(PathBuf),
}

impl Source {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if is_absolute_url(value) {
            Source::Remote(value.to_string())
        } else {
            Source::Local(expand_path(value))
        }
    }

    pub fn name(&self) -> String {
        match self {
            Source::Remote(url) => url.clone(),
            Source::Local(path) => path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("???")
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceFormat {
    Csv,
    Json,
    Gviz,
}

impl SourceFormat {
    /// Guess the format from the payload itself.
    pub fn detect(body: &str) -> Self {
        let head = body.trim_start();
        if head.starts_with('[') {
            SourceFormat::Json
        } else if head.starts_with("/*O_o*/") || head.contains("google.visualization") {
            SourceFormat::Gviz
        } else {
            SourceFormat::Csv
        }
    }
}

/// Best-effort "last updated" timestamp of the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastUpdated {
    Known(DateTime<Utc>),
    #[default]
    Unknown,
}

impl LastUpdated {
    /// Parse an HTTP `Last-Modified` header value.
    pub fn from_header(value: &str) -> Self {
        match DateTime::parse_from_rfc2822(value.trim()) {
            Ok(dt) => LastUpdated::Known(dt.with_timezone(&Utc)),
            Err(e) => {
                debug!("Unparseable Last-Modified \"{value}\": {e}");
                LastUpdated::Unknown
            }
        }
    }

    /// Commit listing as returned by the GitHub commits API: the first entry's
    /// committer date.
    pub fn from_commits_json(body: &str) -> Self {
        let parsed: Result<serde_json::Value, _> = serde_json::from_str(body);
        let date = parsed.ok().and_then(|v| {
            v.get(0)?
                .get("commit")?
                .get("committer")?
                .get("date")?
                .as_str()
                .map(str::to_string)
        });
        match date.map(|d| DateTime::parse_from_rfc3339(&d)) {
            Some(Ok(dt)) => LastUpdated::Known(dt.with_timezone(&Utc)),
            _ => LastUpdated::Unknown,
        }
    }

    pub fn or(self, other: LastUpdated) -> LastUpdated {
        match self {
            LastUpdated::Known(_) => self,
            LastUpdated::Unknown => other,
        }
    }
}

impl fmt::Display for LastUpdated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastUpdated::Known(dt) => write!(f, "Last Updated: {}", dt.format("%d %b %Y")),
            LastUpdated::Unknown => write!(f, "Last Updated: unknown"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Fetched {
    pub body: String,
    pub last_updated: LastUpdated,
}

fn http_client() -> Result<Client, CatError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(concat!("catview/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Fetch the raw dataset text once.
pub fn fetch(source: &Source) -> Result<Fetched, CatError> {
    let start_time = Instant::now();
    let fetched = match source {
        Source::Remote(url) => fetch_remote(url)?,
        Source::Local(path) => fetch_local(path)?,
    };
    info!(
        "Fetching {} took {}ms ({} bytes) ...",
        source.name(),
        start_time.elapsed().as_millis(),
        fetched.body.len()
    );
    Ok(fetched)
}

fn fetch_remote(url: &str) -> Result<Fetched, CatError> {
    let response = http_client()?
        .get(url)
        .header(CACHE_CONTROL, "no-store")
        .send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(CatError::HttpStatus(status.as_u16()));
    }
    let last_updated = response
        .headers()
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .map(LastUpdated::from_header)
        .unwrap_or_default();
    let body = response.text()?;
    Ok(Fetched { body, last_updated })
}

fn fetch_local(path: &Path) -> Result<Fetched, CatError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CatError::FileNotFound,
        ErrorKind::PermissionDenied => CatError::PermissionDenied,
        _ => CatError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(CatError::LoadingFailed("Not a file!".into()));
    }
    let body = fs::read_to_string(path)?;
    let last_updated = metadata
        .modified()
        .map(|t| LastUpdated::Known(DateTime::<Utc>::from(t)))
        .unwrap_or_default();
    Ok(Fetched { body, last_updated })
}

/// Query a commit-history endpoint for the last change. Never fails.
pub fn fetch_commit_date(url: &str) -> LastUpdated {
    let result = http_client().and_then(|client| {
        let response = client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()?;
        if !response.status().is_success() {
            return Err(CatError::HttpStatus(response.status().as_u16()));
        }
        Ok(response.text()?)
    });
    match result {
        Ok(body) => LastUpdated::from_commits_json(&body),
        Err(e) => {
            warn!("Commit history lookup failed: {e}");
            LastUpdated::Unknown
        }
    }
}
