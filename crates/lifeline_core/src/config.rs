//! Timeline tunables and export settings.
//!
//! # Responsibility
//! - Hold every geometric and behavioural constant in one owned value.
//! - Provide serde defaults so partial config files stay valid.
//!
//! # Invariants
//! - `min_scale <= max_scale`, both strictly positive.
//! - `max_history >= 1`.
//! - Core code never reads configuration from the environment; callers pass it in.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// World x of the main axis.
pub const MAIN_AXIS_X: f64 = 2000.0;
/// Vertical pixels per year of age.
pub const YEAR_PX: f64 = 80.0;
pub const WORLD_WIDTH: f64 = 4000.0;
/// Extra world height below age zero.
pub const WORLD_PADDING: f64 = 500.0;
pub const DEFAULT_AGE_MAX: f64 = 100.0;
pub const DEFAULT_CURRENT_AGE: f64 = 25.0;
pub const MIN_SCALE: f64 = 0.2;
pub const MAX_SCALE: f64 = 3.0;
pub const MAX_HISTORY_LENGTH: usize = 50;
pub const SAVE_DEBOUNCE_MS: u64 = 10_000;
pub const WHEEL_SENSITIVITY: f64 = 0.001;
pub const NODE_RADIUS: f64 = 20.0;

/// Scene, interaction and history settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineConfig {
    pub line_x: f64,
    pub year_px: f64,
    pub world_width: f64,
    pub world_padding: f64,
    pub default_age_max: f64,
    pub default_current_age: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub max_history: usize,
    pub save_debounce_ms: u64,
    pub wheel_sensitivity: f64,
    pub node_radius: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            line_x: MAIN_AXIS_X,
            year_px: YEAR_PX,
            world_width: WORLD_WIDTH,
            world_padding: WORLD_PADDING,
            default_age_max: DEFAULT_AGE_MAX,
            default_current_age: DEFAULT_CURRENT_AGE,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            max_history: MAX_HISTORY_LENGTH,
            save_debounce_ms: SAVE_DEBOUNCE_MS,
            wheel_sensitivity: WHEEL_SENSITIVITY,
            node_radius: NODE_RADIUS,
        }
    }
}

impl TimelineConfig {
    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("yearPx", self.year_px),
            ("worldWidth", self.world_width),
            ("defaultAgeMax", self.default_age_max),
            ("minScale", self.min_scale),
            ("maxScale", self.max_scale),
            ("nodeRadius", self.node_radius),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive(field));
            }
        }
        if self.min_scale > self.max_scale {
            return Err(ConfigError::ScaleRange {
                min: self.min_scale,
                max: self.max_scale,
            });
        }
        if self.max_history == 0 {
            return Err(ConfigError::NotPositive("maxHistory"));
        }
        if !(0.0..=self.default_age_max).contains(&self.default_current_age) {
            return Err(ConfigError::CurrentAgeOutOfRange(self.default_current_age));
        }
        Ok(())
    }

    /// Total world height for a given maximum age.
    pub fn world_height(&self, age_max: f64) -> f64 {
        age_max * self.year_px + self.world_padding
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}

/// Settings for SVG/raster/PDF export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    pub padding_x: f64,
    pub padding_top: f64,
    pub padding_bottom: f64,
    /// Device pixel ratio applied when rasterizing.
    pub pixel_ratio: f32,
    pub jpeg_quality: u8,
    pub font_family: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            padding_x: 160.0,
            padding_top: 160.0,
            padding_bottom: 480.0,
            pixel_ratio: 1.0,
            jpeg_quality: 92,
            font_family: "Manrope, sans-serif".to_string(),
        }
    }
}

/// Top-level settings file shape used by front ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub timeline: TimelineConfig,
    pub export: ExportConfig,
}

impl Settings {
    /// Parses settings JSON; missing sections fall back to defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings =
            serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        settings.timeline.validate()?;
        if !(settings.export.pixel_ratio.is_finite() && settings.export.pixel_ratio > 0.0) {
            return Err(ConfigError::NotPositive("pixelRatio"));
        }
        Ok(settings)
    }
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    NotPositive(&'static str),
    ScaleRange { min: f64, max: f64 },
    CurrentAgeOutOfRange(f64),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid settings file: {message}"),
            Self::NotPositive(field) => write!(f, "`{field}` must be a positive number"),
            Self::ScaleRange { min, max } => {
                write!(f, "minScale {min} must not exceed maxScale {max}")
            }
            Self::CurrentAgeOutOfRange(age) => {
                write!(f, "defaultCurrentAge {age} is outside [0, defaultAgeMax]")
            }
        }
    }
}

impl Error for ConfigError {}
