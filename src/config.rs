//! User preferences: the four frame directories and a few UI settings

use crate::error::{CalframesError, Result};
use crate::panel::{DirectoryStore, FrameCategory};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default refresh interval for directory listings
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 1000;

fn default_refresh_interval_ms() -> u64 {
    DEFAULT_REFRESH_INTERVAL_MS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub light: Option<String>,
    #[serde(default)]
    pub dark: Option<String>,
    #[serde(default)]
    pub flat: Option<String>,
    #[serde(default)]
    pub bias: Option<String>,
    /// Whether the welcome dialog has been shown
    #[serde(default)]
    pub welcome_shown: bool,
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Where `save` writes to; not serialized
    #[serde(skip)]
    location: Option<PathBuf>,
    /// Set when the backing file could not be moved aside; `save` is then a no-op
    #[serde(skip)]
    detached: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            light: None,
            dark: None,
            flat: None,
            bias: None,
            welcome_shown: false,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            location: None,
            detached: false,
        }
    }
}

impl Preferences {
    /// Get the default preferences path (~/.config/calframes/preferences.json)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("calframes").join("preferences.json"))
    }

    /// Load preferences from the default location, or defaults if none exist yet
    pub fn load() -> Result<Self> {
        let path = Self::default_path().ok_or_else(|| {
            CalframesError::ConfigError("Could not determine config directory".to_string())
        })?;
        Self::load_from(&path)
    }

    /// Default preferences that save to `path`
    pub fn at(path: &Path) -> Self {
        Self {
            location: Some(path.to_path_buf()),
            ..Self::default()
        }
    }

    /// Load preferences from `path`. A missing file yields defaults bound to `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no preferences at {}, using defaults", path.display());
            return Ok(Self::at(path));
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            CalframesError::ConfigError(format!("Failed to read preferences file: {}", e))
        })?;

        let mut prefs: Preferences = serde_json::from_str(&contents).map_err(|e| {
            CalframesError::ConfigError(format!("Failed to parse preferences file: {}", e))
        })?;
        prefs.location = Some(path.to_path_buf());

        log::debug!("loaded preferences from {}", path.display());
        Ok(prefs)
    }

    /// Defaults to use after `path` failed to load. The unreadable file is renamed to
    /// `<name>.bad` so later saves do not overwrite it. If it cannot be moved, the
    /// returned value never saves.
    pub fn recover(path: &Path) -> Self {
        let mut backup = path.as_os_str().to_owned();
        backup.push(".bad");
        let backup = PathBuf::from(backup);

        match fs::rename(path, &backup) {
            Ok(()) => {
                log::warn!(
                    "moved unreadable preferences {} to {}",
                    path.display(),
                    backup.display()
                );
                Self::at(path)
            }
            Err(e) => {
                log::warn!(
                    "cannot move {} aside ({}), preferences will not be saved",
                    path.display(),
                    e
                );
                Self {
                    detached: true,
                    ..Self::default()
                }
            }
        }
    }

    /// Save to the location this value was loaded from, or the default path
    pub fn save(&self) -> Result<()> {
        if self.detached {
            log::debug!("preferences are detached, not saving");
            return Ok(());
        }
        let path = match &self.location {
            Some(path) => path.clone(),
            None => Self::default_path().ok_or_else(|| {
                CalframesError::ConfigError("Could not determine config directory".to_string())
            })?,
        };
        self.save_to(&path)
    }

    /// Save preferences to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CalframesError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            CalframesError::ConfigError(format!("Failed to serialize preferences: {}", e))
        })?;

        fs::write(path, contents).map_err(|e| {
            CalframesError::ConfigError(format!("Failed to write preferences file: {}", e))
        })?;

        Ok(())
    }

    /// File this value is bound to, if any
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub fn directory(&self, category: FrameCategory) -> Option<PathBuf> {
        let value = match category {
            FrameCategory::Light => &self.light,
            FrameCategory::Dark => &self.dark,
            FrameCategory::Flat => &self.flat,
            FrameCategory::Bias => &self.bias,
        };
        value.as_ref().map(PathBuf::from)
    }

    pub fn set_directory(&mut self, category: FrameCategory, directory: Option<&Path>) {
        let value = directory.map(|p| p.to_string_lossy().into_owned());
        match category {
            FrameCategory::Light => self.light = value,
            FrameCategory::Dark => self.dark = value,
            FrameCategory::Flat => self.flat = value,
            FrameCategory::Bias => self.bias = value,
        }
    }
}

impl DirectoryStore for Preferences {
    fn save_directory(&mut self, category: FrameCategory, directory: Option<&Path>) {
        self.set_directory(category, directory);
        if let Err(e) = self.save() {
            log::warn!("failed to persist {} directory: {}", category.key(), e);
        }
    }
}
