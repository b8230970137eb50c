// CLI module for argument parsing and configuration

use crate::panel::FrameCategory;
use clap::{ArgAction, Parser};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

/// Accepted refresh intervals in milliseconds
pub const INTERVAL_RANGE_MS: RangeInclusive<u64> = 100..=60_000;

/// Calframes - pick the light, dark, flat and bias frames of an imaging session
///
/// Each frame set lives in its own directory; calframes keeps the listings up
/// to date while you shoot and remembers the directories between sessions.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "calframes")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory of the light frames (remembered for next time)
    #[arg(long, value_name = "DIR")]
    pub light: Option<PathBuf>,

    /// Directory of the dark frames (remembered for next time)
    #[arg(long, value_name = "DIR")]
    pub dark: Option<PathBuf>,

    /// Directory of the flat frames (remembered for next time)
    #[arg(long, value_name = "DIR")]
    pub flat: Option<PathBuf>,

    /// Directory of the bias/offset frames (remembered for next time)
    #[arg(long, value_name = "DIR")]
    pub bias: Option<PathBuf>,

    /// How often each directory is relisted, in milliseconds (100-60000)
    #[arg(short = 'i', long = "interval", value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Use this preferences file instead of the default one
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the status of every frame set and exit
    #[arg(short = 'l', long = "list", action = ArgAction::SetTrue)]
    pub list: bool,

    /// With --list, print the frame selection as JSON
    #[arg(long = "json", action = ArgAction::SetTrue, requires = "list")]
    pub json: bool,

    /// Write the log to this file instead of the default one
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log debug messages
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Show the welcome screen even if it was already seen
    #[arg(long = "welcome", action = ArgAction::SetTrue)]
    pub welcome: bool,

    /// Start with the preview pane hidden
    #[arg(long = "no-preview", action = ArgAction::SetTrue)]
    pub no_preview: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Directory overrides given on the command line, in panel order
    pub fn directory_overrides(&self) -> Vec<(FrameCategory, PathBuf)> {
        FrameCategory::ALL
            .iter()
            .filter_map(|&category| {
                let value = match category {
                    FrameCategory::Light => &self.light,
                    FrameCategory::Dark => &self.dark,
                    FrameCategory::Flat => &self.flat,
                    FrameCategory::Bias => &self.bias,
                };
                value.clone().map(|dir| (category, dir))
            })
            .collect()
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ms) = self.interval_ms {
            if !INTERVAL_RANGE_MS.contains(&ms) {
                return Err(format!(
                    "Invalid interval: {} ms. Use a value between {} and {}",
                    ms,
                    INTERVAL_RANGE_MS.start(),
                    INTERVAL_RANGE_MS.end()
                ));
            }
        }

        // A directory that does not exist yet is fine: the panel reports it
        for (category, dir) in self.directory_overrides() {
            if dir.exists() && !dir.is_dir() {
                return Err(format!(
                    "Path given for --{} is not a directory: {}",
                    category.key(),
                    dir.display()
                ));
            }
        }

        if self.json && !self.list {
            return Err("--json can only be used together with --list".to_string());
        }

        Ok(())
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub directories: Vec<(FrameCategory, PathBuf)>,
    /// Overrides the stored refresh interval when set
    pub refresh_interval: Option<Duration>,
    pub config_path: Option<PathBuf>,
    pub list: bool,
    pub json: bool,
    pub log_file: Option<PathBuf>,
    pub log_level: log::LevelFilter,
    pub show_welcome: bool,
    pub show_preview: bool,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        AppConfig {
            directories: args.directory_overrides(),
            refresh_interval: args.interval_ms.map(Duration::from_millis),
            config_path: args.config,
            list: args.list,
            json: args.json,
            log_file: args.log_file,
            log_level: if args.verbose {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            },
            show_welcome: args.welcome,
            show_preview: !args.no_preview,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig::from(Args::default())
    }
}
