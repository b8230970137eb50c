//! Calframes - a terminal-based calibration frame selector
//!
//! This crate provides the core functionality for the calframes application:
//! per-category directory panels that keep an up-to-date listing of the image
//! files they contain, persisted preferences and lazy image previews.

pub mod async_preview;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod file_opener;
pub mod logging;
pub mod panel;
pub mod preview;
pub mod tui;

// Re-export primary types for convenience
pub use config::Preferences;
pub use domain::{
    describe_image_count, inspect_directory, list_images, DirectoryStatus, FileDescriptor,
    ImageFormat, RawMaker,
};
pub use error::{CalframesError, Result};
pub use file_opener::open_file;
pub use panel::{
    DirectoryStore, FrameCategory, FrameSelection, PanelKind, PanelState, SelectedFrames,
    SelectionPanel, Workspace,
};
