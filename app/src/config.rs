//! Configuration management for the console host.

use std::env;
use std::path::PathBuf;
use vitrina_engine::{CarouselConfig, DuplicatePolicy, DEFAULT_AUTOPLAY_SPEED_MS};

/// Host configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the persisted product record
    pub data_dir: PathBuf,
    /// Whether the featured carousel advances on its own
    pub auto_play: bool,
    /// Autoplay interval in milliseconds
    pub auto_play_ms: u64,
    /// Initial viewport width in pixels
    pub viewport_width: u32,
    /// Refuse products whose codigo is already present
    pub reject_duplicates: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            auto_play: true,
            auto_play_ms: DEFAULT_AUTOPLAY_SPEED_MS,
            viewport_width: 1280,
            reject_duplicates: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_dir = lookup("VITRINA_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let auto_play = match lookup("VITRINA_AUTOPLAY") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidBool {
                var: "VITRINA_AUTOPLAY",
                value: raw,
            })?,
            None => defaults.auto_play,
        };

        let auto_play_ms = match lookup("VITRINA_AUTOPLAY_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => ms,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: "VITRINA_AUTOPLAY_MS",
                        value: raw,
                    })
                }
            },
            None => defaults.auto_play_ms,
        };

        let viewport_width = match lookup("VITRINA_VIEWPORT_WIDTH") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                var: "VITRINA_VIEWPORT_WIDTH",
                value: raw,
            })?,
            None => defaults.viewport_width,
        };

        let reject_duplicates = match lookup("VITRINA_REJECT_DUPLICATES") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidBool {
                var: "VITRINA_REJECT_DUPLICATES",
                value: raw,
            })?,
            None => defaults.reject_duplicates,
        };

        Ok(Self {
            data_dir,
            auto_play,
            auto_play_ms,
            viewport_width,
            reject_duplicates,
        })
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        if self.reject_duplicates {
            DuplicatePolicy::Reject
        } else {
            DuplicatePolicy::Accept
        }
    }

    /// Carousel configuration for a list of `item_count` products.
    pub fn carousel(&self, item_count: usize) -> CarouselConfig {
        CarouselConfig::new(item_count)
            .with_auto_play(self.auto_play)
            .with_speed(self.auto_play_ms)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a boolean, got '{value}'")]
    InvalidBool { var: &'static str, value: String },

    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}
