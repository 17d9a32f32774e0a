//! Settings for the `hover` shell.
//!
//! Precedence (highest wins):
//! 1) Environment variables (prefix `HOVER__`, `__` as nested separator)
//! 2) Config file (`--config`, `HOVER_CONFIG_PATH` or the XDG default)
//! 3) Struct defaults

use std::{env, path::Path, path::PathBuf};

use hover_core::{RepeatMode, browser::ScanOptions};
use log::LevelFilter;
use serde::{Deserialize, Deserializer, de};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub library: LibrarySettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    #[serde(deserialize_with = "repeat_mode")]
    pub repeat_mode: RepeatMode,
    /// Fixed seed for shuffle order; random when unset.
    pub seed: Option<u64>,
    /// Wrap around the shuffle order even with repeat off.
    pub shuffle_wraps: bool,
}

/// Accepts any spelling `RepeatMode` parses: `off`, `one`, `all` and
/// aliases such as `repeat-all` or `loop`.
fn repeat_mode<'de, D>(deserializer: D) -> Result<RepeatMode, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse()
        .map_err(|_| de::Error::custom(format!("unknown repeat mode `{raw}`")))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
    /// Read audio durations while scanning (slower on large libraries).
    pub probe_durations: bool,
    /// Descend through symlinked directories.
    pub follow_links: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            recursive: true,
            include_hidden: false,
            max_depth: None,
            probe_durations: true,
            follow_links: true,
        }
    }
}

impl LibrarySettings {
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            recursive: self.recursive,
            include_hidden: self.include_hidden,
            max_depth: self.max_depth,
            probe_durations: self.probe_durations,
            follow_links: self.follow_links,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default log filter, `RUST_LOG` still wins when set.
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from environment and a config file.
    ///
    /// An explicit path must exist; the resolved default is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = explicit {
            builder = builder.add_source(::config::File::from(path).required(true));
        } else if let Some(path) = resolve_config_path() {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("HOVER")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.log
            .level
            .parse::<LevelFilter>()
            .map_err(|_| format!("log.level `{}` is not a log level", self.log.level))?;
        Ok(())
    }
}

/// Resolve the config path from `HOVER_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("HOVER_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// `$XDG_CONFIG_HOME/hover/config.toml`, or `~/.config/hover/config.toml`
/// when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("hover").join("config.toml"))
}

#[cfg(test)]
mod tests;
