//! Run configuration, filled from the command line by the binary.

use crate::browser::{BrowserOptions, DEFAULT_IDLE_TIMEOUT};
use crate::output::OutputMode;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OUTPUT_FOLDER_NAME: &str = "download";
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct Config {
    pub csv_file: Option<PathBuf>,
    pub output_folder_name: String,
    pub concatenate: bool,
    /// Pause after every URL.
    pub delay: Duration,
    pub browser: BrowserOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            csv_file: None,
            output_folder_name: DEFAULT_OUTPUT_FOLDER_NAME.to_string(),
            concatenate: true,
            delay: DEFAULT_DELAY,
            browser: BrowserOptions::default(),
        }
    }
}

impl Config {
    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from_concatenate(self.concatenate)
    }

    /// Browser options whose idle timeout outlasts the render wait plus the
    /// pause between URLs.
    pub fn browser_options(&self) -> BrowserOptions {
        let mut options = self.browser.clone();
        let needed = self.delay + options.ready_timeout + DEFAULT_IDLE_TIMEOUT;
        options.idle_timeout = options.idle_timeout.max(needed);
        options
    }

    /// The CSV path, unless it is missing or blank.
    pub fn csv_path(&self) -> Option<&PathBuf> {
        self.csv_file
            .as_ref()
            .filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty())
    }
}

/// Parses `true` or `false`, ignoring case. Everything else is rejected.
pub fn parse_bool_flag(s: &str) -> Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!("expected `true` or `false`, got `{s}`")),
    }
}

/// Parses a non-negative number of seconds, fractions allowed.
pub fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("`{s}` is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid duration `{s}`: {e}"))
}
