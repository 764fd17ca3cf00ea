//! Configuration loading and management.

use std::path::{Path, PathBuf};

use chrono::Local;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use ft_core::FocusConfig;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Focus scoring parameters.
    #[serde(default)]
    pub focus: FocusConfig,

    /// Settings for `ft demo`.
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Settings for the demo scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Length of the simulated work session, in minutes.
    pub session_minutes: i64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            session_minutes: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            focus: FocusConfig {
                utc_offset_minutes: local_offset_minutes(),
                ..FocusConfig::default()
            },
            demo: DemoConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (FT_FOCUS__IDEAL_MIN_MINUTES, ...)
        figment = figment.merge(Env::prefixed("FT_").split("__"));

        figment.extract()
    }
}

/// Current local offset from UTC, in minutes.
fn local_offset_minutes() -> i32 {
    Local::now().offset().local_minus_utc() / 60
}

/// Returns the platform-specific config directory for ft.
///
/// On Linux: `~/.config/ft`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ft"))
}
