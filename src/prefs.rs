use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::CatError;

pub const THEME_KEY: &str = "theme";
pub const LAYOUT_KEY: &str = "layoutMode";
pub const THUMBS_KEY: &str = "showThumbs";

/// String key/value storage for UI preferences.
pub trait PrefStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), CatError>;
}

/// Preferences kept as one flat JSON object on disk, rewritten on every set.
#[derive(Debug)]
pub struct FilePrefStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePrefStore {
    /// A missing or unreadable file starts out empty.
    pub fn open(path: &Path) -> Self {
        let values = match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!("Ignoring corrupt preferences {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Could not read preferences {}: {e}", path.display());
                BTreeMap::new()
            }
        };
        debug!("Loaded {} preferences from {}", values.len(), path.display());
        FilePrefStore {
            path: path.to_path_buf(),
            values,
        }
    }

    fn save(&self) -> Result<(), CatError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.values)?)?;
        Ok(())
    }
}

impl PrefStore for FilePrefStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CatError> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryPrefStore {
    values: BTreeMap<String, String>,
}

impl PrefStore for MemoryPrefStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CatError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Layout {
    #[default]
    Wide,
    Narrow,
}

impl Layout {
    fn as_str(&self) -> &'static str {
        match self {
            Layout::Wide => "wide",
            Layout::Narrow => "narrow",
        }
    }

    pub fn toggled(&self) -> Layout {
        match self {
            Layout::Wide => Layout::Narrow,
            Layout::Narrow => Layout::Wide,
        }
    }
}

/// Theme, layout and thumbnail visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiPrefs {
    pub theme: Theme,
    pub layout: Layout,
    pub show_thumbs: bool,
}

impl Default for UiPrefs {
    fn default() -> Self {
        UiPrefs {
            theme: Theme::Dark,
            layout: Layout::Wide,
            show_thumbs: true,
        }
    }
}

impl UiPrefs {
    /// Read the stored preferences; absent keys get their defaults written back.
    pub fn load(store: &mut dyn PrefStore) -> UiPrefs {
        let defaults = UiPrefs::default();
        let mut read = |key: &str, default: &str| match store.get(key) {
            Some(v) => v,
            None => {
                if let Err(e) = store.set(key, default) {
                    warn!("Could not store default for {key}: {e}");
                }
                default.to_string()
            }
        };

        let theme = if read(THEME_KEY, defaults.theme.as_str()) == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        };
        let layout = if read(LAYOUT_KEY, defaults.layout.as_str()) == "narrow" {
            Layout::Narrow
        } else {
            Layout::Wide
        };
        let show_thumbs = read(THUMBS_KEY, "true") == "true";
        UiPrefs {
            theme,
            layout,
            show_thumbs,
        }
    }

    pub fn save(&self, store: &mut dyn PrefStore) -> Result<(), CatError> {
        store.set(THEME_KEY, self.theme.as_str())?;
        store.set(LAYOUT_KEY, self.layout.as_str())?;
        store.set(THUMBS_KEY, if self.show_thumbs { "true" } else { "false" })?;
        Ok(())
    }

    /// The description column only fits the wide layout.
    pub fn show_description(&self) -> bool {
        self.layout == Layout::Wide
    }
}
