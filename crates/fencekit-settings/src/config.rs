//! Configuration for map drawing widgets
//!
//! Supports JSON and TOML files. Configuration is organized into sections:
//! - Map defaults (centre, zoom)
//! - Timing (debounce, capability polling, load timeouts)
//! - Polygon overlay style
//! - Marker overlay style
//! - Plugin names

use fencekit_core::constants::{
    DEFAULT_CAPABILITY_POLL_MS, DEFAULT_CAPABILITY_TIMEOUT_MS, DEFAULT_CENTER,
    DEFAULT_DEBOUNCE_MS, DEFAULT_PLUGIN_TIMEOUT_MS, DEFAULT_ZOOM, DRAW_TOOL_PLUGIN,
};
use fencekit_core::Coordinate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Where a freshly opened map looks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Initial centre as `[longitude, latitude]`
    pub center: [f64; 2],
    /// Initial zoom level
    pub zoom: u8,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl MapSettings {
    /// The configured centre as a validated coordinate
    pub fn center_coordinate(&self) -> ConfigResult<Coordinate> {
        Coordinate::try_from(self.center)
            .map_err(|_| ConfigError::out_of_range("map.center", format!("{:?}", self.center)))
    }
}

/// Timers and bounded waits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Quiet interval before a debounced ring reaches the host
    pub debounce_ms: u64,
    /// Interval between capability availability checks
    pub capability_poll_ms: u64,
    /// Give up waiting for the capability after this long
    pub capability_timeout_ms: u64,
    /// Give up waiting for the drawing-tool plugin after this long
    pub plugin_timeout_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            capability_poll_ms: DEFAULT_CAPABILITY_POLL_MS,
            capability_timeout_ms: DEFAULT_CAPABILITY_TIMEOUT_MS,
            plugin_timeout_ms: DEFAULT_PLUGIN_TIMEOUT_MS,
        }
    }
}

impl TimingSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn capability_poll(&self) -> Duration {
        Duration::from_millis(self.capability_poll_ms)
    }

    pub fn capability_timeout(&self) -> Duration {
        Duration::from_millis(self.capability_timeout_ms)
    }

    pub fn plugin_timeout(&self) -> Duration {
        Duration::from_millis(self.plugin_timeout_ms)
    }
}

/// Style of the editable polygon overlay and the drawing tool's sketch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolygonStyle {
    pub stroke_color: String,
    pub stroke_weight: u32,
    pub stroke_opacity: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub z_index: i32,
    /// Fill colour applied when the user starts dragging the overlay
    pub drag_fill_color: String,
}

impl Default for PolygonStyle {
    fn default() -> Self {
        Self {
            stroke_color: "#3366FF".to_string(),
            stroke_weight: 3,
            stroke_opacity: 0.8,
            fill_color: "#1791fc".to_string(),
            fill_opacity: 0.3,
            z_index: 50,
            drag_fill_color: "#1791fc".to_string(),
        }
    }
}

/// Style of the single-point marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    pub draggable: bool,
    pub cursor: String,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            draggable: true,
            cursor: "move".to_string(),
        }
    }
}

/// Names of the capability plugins the widgets load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginSettings {
    pub draw_tool: String,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            draw_tool: DRAW_TOOL_PLUGIN.to_string(),
        }
    }
}

/// Complete widget configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub map: MapSettings,
    pub timing: TimingSettings,
    pub polygon: PolygonStyle,
    pub marker: MarkerStyle,
    pub plugins: PluginSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load config from file, or fall back to defaults if the file is absent
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        self.map.center_coordinate()?;
        if self.map.zoom == 0 || self.map.zoom > 20 {
            return Err(ConfigError::out_of_range("map.zoom", self.map.zoom));
        }

        let timings = [
            ("timing.debounce_ms", self.timing.debounce_ms),
            ("timing.capability_poll_ms", self.timing.capability_poll_ms),
            ("timing.capability_timeout_ms", self.timing.capability_timeout_ms),
            ("timing.plugin_timeout_ms", self.timing.plugin_timeout_ms),
        ];
        for (key, value) in timings {
            if value == 0 {
                return Err(ConfigError::out_of_range(key, value));
            }
        }
        if self.timing.capability_poll_ms > self.timing.capability_timeout_ms {
            return Err(ConfigError::out_of_range(
                "timing.capability_poll_ms",
                self.timing.capability_poll_ms,
            ));
        }

        let opacities = [
            ("polygon.stroke_opacity", self.polygon.stroke_opacity),
            ("polygon.fill_opacity", self.polygon.fill_opacity),
        ];
        for (key, value) in opacities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::out_of_range(key, value));
            }
        }

        let required = [
            ("polygon.stroke_color", &self.polygon.stroke_color),
            ("polygon.fill_color", &self.polygon.fill_color),
            ("polygon.drag_fill_color", &self.polygon.drag_fill_color),
            ("plugins.draw_tool", &self.plugins.draw_tool),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingKey(key.to_string()));
            }
        }

        Ok(())
    }
}

/// Default location of the configuration file
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("fencekit").join("config.toml"))
        .ok_or_else(|| SettingsError::ConfigDirectory("no config directory".to_string()))
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("").to_string(),
            )),
        }
    }
}
