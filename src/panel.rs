//! Per-category selection panels and the workspace that owns them
//!
//! A panel holds one optional directory, relists it on a fixed interval while
//! active, and exposes the results plus two status lines to the TUI. Nothing
//! here ever fails: a missing or unset directory becomes status text.

use crate::config::Preferences;
use crate::domain::{
    describe_image_count, inspect_directory, sort_by_name, DirectoryStatus, FileDescriptor,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// The four kinds of calibration frame sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameCategory {
    Light,
    Dark,
    Flat,
    Bias,
}

impl FrameCategory {
    pub const ALL: [FrameCategory; 4] = [
        FrameCategory::Light,
        FrameCategory::Dark,
        FrameCategory::Flat,
        FrameCategory::Bias,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            FrameCategory::Light => "Light Frames",
            FrameCategory::Dark => "Dark Frames",
            FrameCategory::Flat => "Flat Frames",
            FrameCategory::Bias => "Bias/Offset Frames",
        }
    }

    /// Preference key
    pub fn key(&self) -> &'static str {
        match self {
            FrameCategory::Light => "light",
            FrameCategory::Dark => "dark",
            FrameCategory::Flat => "flat",
            FrameCategory::Bias => "bias",
        }
    }

    /// Lights are mandatory for stacking, calibration sets are not
    pub fn kind(&self) -> PanelKind {
        match self {
            FrameCategory::Light => PanelKind::Required,
            _ => PanelKind::Optional,
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            FrameCategory::Light => 0,
            FrameCategory::Dark => 1,
            FrameCategory::Flat => 2,
            FrameCategory::Bias => 3,
        }
    }
}

/// Whether a panel starts enabled and whether the user may disable it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Required,
    Optional,
}

/// Icon shown next to the status lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    /// Not yet listed
    None,
    /// Unset or missing directory
    MissingDirectory,
    /// Valid directory
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelStatus {
    pub icon: StatusIcon,
    pub primary: String,
    pub secondary: String,
}

impl Default for PanelStatus {
    fn default() -> Self {
        Self {
            icon: StatusIcon::None,
            primary: String::new(),
            secondary: String::new(),
        }
    }
}

/// Outcome of the latest listing pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    /// No directory set
    Idle,
    /// Directory exists and was listed
    Valid,
    /// Directory is set but does not exist
    Invalid,
}

/// Relative directories are resolved against the working directory, without
/// touching symlinks
fn absolute_dir(dir: PathBuf) -> PathBuf {
    std::path::absolute(&dir).unwrap_or(dir)
}

/// Receives directory changes so they can be persisted
pub trait DirectoryStore {
    fn save_directory(&mut self, category: FrameCategory, directory: Option<&Path>);
}

#[derive(Debug)]
pub struct SelectionPanel {
    category: FrameCategory,
    kind: PanelKind,
    enabled: bool,
    show_images: bool,
    directory: Option<PathBuf>,
    images: Vec<FileDescriptor>,
    state: PanelState,
    status: PanelStatus,
    refresh_interval: Duration,
    last_refresh: Option<Instant>,
    active: bool,
}

impl SelectionPanel {
    /// Creates an inactive panel. No listing happens until `activate` or
    /// `set_directory`.
    pub fn new(
        category: FrameCategory,
        directory: Option<PathBuf>,
        refresh_interval: Duration,
    ) -> Self {
        let kind = category.kind();
        Self {
            category,
            kind,
            enabled: kind == PanelKind::Required,
            show_images: false,
            directory: directory.map(absolute_dir),
            images: Vec::new(),
            state: PanelState::Idle,
            status: PanelStatus::default(),
            refresh_interval,
            last_refresh: None,
            active: false,
        }
    }

    pub fn category(&self) -> FrameCategory {
        self.category
    }

    pub fn kind(&self) -> PanelKind {
        self.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn shows_images(&self) -> bool {
        self.show_images
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Images of the latest pass, sorted by name
    pub fn images(&self) -> &[FileDescriptor] {
        &self.images
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn status(&self) -> &PanelStatus {
        &self.status
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Changes the directory, relists immediately and reports the change to `store`.
    pub fn set_directory(&mut self, directory: Option<PathBuf>, store: &mut dyn DirectoryStore) {
        let directory = directory.map(absolute_dir);
        log::info!(
            "{} directory set to {}",
            self.category.key(),
            directory
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "<none>".to_string())
        );

        self.directory = directory;
        self.tick();
        store.save_directory(self.category, self.directory.as_deref());
    }

    /// Runs one listing pass, replacing the previous results unconditionally
    pub fn tick(&mut self) {
        let status = inspect_directory(self.directory.as_deref());

        match status {
            DirectoryStatus::NoDirectory => {
                self.images.clear();
                self.state = PanelState::Idle;
                self.status = PanelStatus {
                    icon: StatusIcon::MissingDirectory,
                    primary: "--".to_string(),
                    secondary: "No directory is set".to_string(),
                };
            }
            DirectoryStatus::Missing(path) => {
                self.images.clear();
                self.state = PanelState::Invalid;
                self.status = PanelStatus {
                    icon: StatusIcon::MissingDirectory,
                    primary: path.display().to_string(),
                    secondary: "The directory does not exist".to_string(),
                };
            }
            DirectoryStatus::Listed { path, mut images } => {
                sort_by_name(&mut images);
                let count = describe_image_count(images.len());
                if count != self.status.secondary {
                    log::debug!("{}: {}", self.category.key(), count);
                }
                self.images = images;
                self.state = PanelState::Valid;
                self.status = PanelStatus {
                    icon: StatusIcon::Folder,
                    primary: path.display().to_string(),
                    secondary: count,
                };
            }
        }
    }

    /// Relists if the panel is active and the refresh interval has elapsed.
    /// Returns whether a pass ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.active {
            return false;
        }

        let due = match self.last_refresh {
            Some(last) => now.saturating_duration_since(last) >= self.refresh_interval,
            None => true,
        };

        if due {
            self.tick();
            self.last_refresh = Some(now);
        }
        due
    }

    /// Lists immediately and starts the periodic refresh
    pub fn activate(&mut self, now: Instant) {
        self.active = true;
        self.tick();
        self.last_refresh = Some(now);
    }

    /// Stops the periodic refresh
    pub fn deactivate(&mut self) {
        self.active = false;
        self.last_refresh = None;
    }

    /// Toggles an optional panel on or off. Required panels stay enabled.
    pub fn toggle_enabled(&mut self) -> bool {
        if self.kind == PanelKind::Optional {
            self.enabled = !self.enabled;
        }
        self.enabled
    }

    pub fn toggle_images(&mut self) -> bool {
        self.show_images = !self.show_images;
        self.show_images
    }
}

/// One entry of the frame selection handed to the stacking tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedFrames {
    pub category: FrameCategory,
    pub title: &'static str,
    pub enabled: bool,
    pub directory: Option<PathBuf>,
    pub image_count: usize,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSelection {
    pub frames: Vec<SelectedFrames>,
}

impl FrameSelection {
    /// Ready when light frames exist and every enabled optional set is valid
    pub fn is_ready(&self) -> bool {
        self.frames.iter().all(|f| {
            if !f.enabled {
                return true;
            }
            f.directory.is_some() && f.image_count > 0
        })
    }
}

/// The four panels plus the preferences they persist into
#[derive(Debug)]
pub struct Workspace {
    panels: Vec<SelectionPanel>,
    preferences: Preferences,
}

impl Workspace {
    pub fn new(preferences: Preferences, refresh_interval: Duration) -> Self {
        let panels = FrameCategory::ALL
            .iter()
            .map(|&category| {
                SelectionPanel::new(category, preferences.directory(category), refresh_interval)
            })
            .collect();

        Self {
            panels,
            preferences,
        }
    }

    pub fn panels(&self) -> &[SelectionPanel] {
        &self.panels
    }

    pub fn panel(&self, category: FrameCategory) -> &SelectionPanel {
        &self.panels[category.index()]
    }

    pub fn panel_mut(&mut self, category: FrameCategory) -> &mut SelectionPanel {
        &mut self.panels[category.index()]
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.preferences
    }

    pub fn set_directory(&mut self, category: FrameCategory, directory: PathBuf) {
        self.panels[category.index()].set_directory(Some(directory), &mut self.preferences);
    }

    pub fn clear_directory(&mut self, category: FrameCategory) {
        self.panels[category.index()].set_directory(None, &mut self.preferences);
    }

    pub fn toggle_enabled(&mut self, category: FrameCategory) -> bool {
        self.panel_mut(category).toggle_enabled()
    }

    pub fn toggle_images(&mut self, category: FrameCategory) -> bool {
        self.panel_mut(category).toggle_images()
    }

    pub fn activate(&mut self, now: Instant) {
        for panel in &mut self.panels {
            panel.activate(now);
        }
    }

    pub fn deactivate(&mut self) {
        for panel in &mut self.panels {
            panel.deactivate();
        }
    }

    /// Polls every panel; returns whether any of them relisted
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut refreshed = false;
        for panel in &mut self.panels {
            refreshed |= panel.poll(now);
        }
        refreshed
    }

    /// Runs one listing pass on every panel regardless of activity
    pub fn refresh_all(&mut self) {
        for panel in &mut self.panels {
            panel.tick();
        }
    }

    pub fn selection(&self) -> FrameSelection {
        let frames = self
            .panels
            .iter()
            .map(|panel| SelectedFrames {
                category: panel.category(),
                title: panel.category().title(),
                enabled: panel.is_enabled(),
                directory: match panel.state() {
                    PanelState::Valid => panel.directory().map(Path::to_path_buf),
                    _ => None,
                },
                image_count: panel.images().len(),
                status: panel.status().secondary.clone(),
            })
            .collect();

        FrameSelection { frames }
    }
}
