//! Fencekit Settings Crate
//!
//! Handles widget configuration: map defaults, timings, overlay styles and
//! plugin names, with JSON/TOML persistence.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, Config, MapSettings, MarkerStyle, PluginSettings, PolygonStyle,
    TimingSettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
