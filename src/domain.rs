use std::fmt;
use std::io::Error;
use std::path::PathBuf;

use derive_setters::Setters;

use crate::dataset::DatasetKind;
use crate::source::{Source, SourceFormat};

pub const DEFAULT_BATCH_SIZE: usize = 500;
pub const DEFAULT_PREFS_PATH: &str = "~/.config/catview/prefs.json";

pub const HELP_TEXT: &str = "catview - catalogue viewer

Navigation
  Up/Down, PageUp/PageDown   move the selection
  Left/Right                 select column
  Home/End                   first/last row

View
  /        search (live, fuzzy)
  v        minimum views
  m        minimum videos / duration (seconds)
  c        cycle category
  s        sort by selected column (again to reverse)
  t        toggle thumbnails column
  l        toggle wide/narrow layout
  d        toggle dark/light theme

  Esc      close / cancel
  ?        this help
  q        quit";

#[derive(Debug)]
pub enum CatError {
    IoError(Error),
    HttpError(reqwest::Error),
    JsonError(serde_json::Error),
    HttpStatus(u16),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFormat,
}

impl fmt::Display for CatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatError::IoError(e) => write!(f, "io error: {e}"),
            CatError::HttpError(e) => write!(f, "http error: {e}"),
            CatError::JsonError(e) => write!(f, "json error: {e}"),
            CatError::HttpStatus(code) => write!(f, "HTTP {code}"),
            CatError::LoadingFailed(msg) => write!(f, "loading failed: {msg}"),
            CatError::FileNotFound => write!(f, "file not found"),
            CatError::PermissionDenied => write!(f, "permission denied"),
            CatError::UnknownFormat => write!(f, "unknown data format"),
        }
    }
}

impl std::error::Error for CatError {}

impl From<Error> for CatError {
    fn from(err: Error) -> Self {
        CatError::IoError(err)
    }
}

impl From<reqwest::Error> for CatError {
    fn from(err: reqwest::Error) -> Self {
        CatError::HttpError(err)
    }
}

impl From<serde_json::Error> for CatError {
    fn from(err: serde_json::Error) -> Self {
        CatError::JsonError(err)
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct CatConfig {
    pub source: Source,
    pub kind: DatasetKind,
    #[setters(strip_option)]
    pub format: Option<SourceFormat>,
    pub batch_size: usize,
    #[setters(strip_option)]
    pub search_threshold: Option<f64>,
    #[setters(strip_option)]
    pub asset_dir: Option<String>,
    pub prefs_path: PathBuf,
    #[setters(strip_option)]
    pub commits_url: Option<String>,
    pub event_poll_time: u64,
    pub max_column_width: usize,
}

impl CatConfig {
    pub fn new(source: Source, kind: DatasetKind) -> Self {
        CatConfig {
            source,
            kind,
            format: None,
            batch_size: DEFAULT_BATCH_SIZE,
            search_threshold: None,
            asset_dir: None,
            prefs_path: expand_path(DEFAULT_PREFS_PATH),
            commits_url: None,
            event_poll_time: 50,
            max_column_width: 40,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.search_threshold
            .unwrap_or_else(|| self.kind.default_threshold())
    }

    pub fn asset_dir(&self) -> &str {
        self.asset_dir
            .as_deref()
            .unwrap_or_else(|| self.kind.asset_dir())
    }
}

/// Expand `~` and environment variables; unexpandable input is kept as is.
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(p) => PathBuf::from(p.as_ref()),
        Err(_) => PathBuf::from(path),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CMDMode {
    Search,
    MinViews,
    MinSecondary,
}

impl CMDMode {
    pub fn prompt(&self) -> &'static str {
        match self {
            CMDMode::Search => "/",
            CMDMode::MinViews => "min views: ",
            CMDMode::MinSecondary => "min: ",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    Search,
    MinViews,
    MinSecondary,
    CycleCategory,
    SortSelected,
    ToggleThumbs,
    ToggleLayout,
    ToggleTheme,
    Help,
    Exit,
    Resize(usize, usize),
    RawKey(ratatui::crossterm::event::KeyEvent),
}
