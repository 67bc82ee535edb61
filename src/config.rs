//! Pipeline configuration.
//!
//! Handles loading, validating, and merging the `estate-media.toml` file.
//! A preset supplies the base values; keys in the file override them.
//!
//! ## Presets
//!
//! | Preset | Max edge | Quality ladder | Budget |
//! |--------|----------|----------------|--------|
//! | `canonical` | 1200 px | 0.82, 0.65, 0.50, 0.40, 0.35 | 700 000 B |
//! | `compact` | 800 px | 0.80, 0.60, 0.40 | 650 000 B |
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - canonical defaults shown below
//!
//! preset = "canonical"
//!
//! [compression]
//! max_dimension = 1200                          # Longest output edge (px)
//! quality_steps = [0.82, 0.65, 0.5, 0.4, 0.35]  # Tried in order, highest first
//! budget_bytes = 700000                         # Estimated encoded size ceiling
//! decode_timeout_ms = 10000                     # 0 disables the timeout
//!
//! [logging]
//! level = "info"                                # Overridden by RUST_LOG
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::rust_codec::MAX_SURFACE_EDGE;
use crate::imaging::{CompressionParams, QualityLadder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Named sets of base values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Admin uploader settings: 1200 px, five-step ladder.
    #[default]
    Canonical,
    /// Smaller images for the older project form.
    Compact,
}

impl Preset {
    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Canonical => "canonical",
            Preset::Compact => "compact",
        }
    }

    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "canonical" => Ok(Preset::Canonical),
            "compact" => Ok(Preset::Compact),
            other => Err(ConfigError::Validation(format!(
                "preset must be \"canonical\" or \"compact\", got {other:?}"
            ))),
        }
    }
}

/// Configuration loaded from `estate-media.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Which preset supplied the base values.
    pub preset: Preset,
    /// Resize and budget search settings.
    pub compression: CompressionConfig,
    /// Diagnostic log settings.
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_preset(Preset::Canonical)
    }
}

impl AppConfig {
    pub fn for_preset(preset: Preset) -> Self {
        Self {
            preset,
            compression: CompressionConfig::for_preset(preset),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.compression.validate()
    }
}

/// Resize and budget search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    /// Longest allowed output edge in pixels, at most `MAX_SURFACE_EDGE`.
    pub max_dimension: u32,
    /// JPEG qualities in `(0, 1]`, strictly decreasing.
    pub quality_steps: Vec<f32>,
    /// Estimated encoded size an image should fit under.
    pub budget_bytes: usize,
    /// Give up on a decode after this many milliseconds. `0` waits forever.
    pub decode_timeout_ms: u64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self::for_preset(Preset::Canonical)
    }
}

impl CompressionConfig {
    pub fn for_preset(preset: Preset) -> Self {
        match preset {
            Preset::Canonical => Self {
                max_dimension: 1200,
                quality_steps: vec![0.82, 0.65, 0.50, 0.40, 0.35],
                budget_bytes: 700_000,
                decode_timeout_ms: 10_000,
            },
            Preset::Compact => Self {
                max_dimension: 800,
                quality_steps: vec![0.80, 0.60, 0.40],
                budget_bytes: 650_000,
                decode_timeout_ms: 10_000,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "compression.max_dimension must be non-zero".into(),
            ));
        }
        if self.max_dimension > MAX_SURFACE_EDGE {
            return Err(ConfigError::Validation(format!(
                "compression.max_dimension must be at most {MAX_SURFACE_EDGE}, got {}",
                self.max_dimension
            )));
        }
        if self.budget_bytes == 0 {
            return Err(ConfigError::Validation(
                "compression.budget_bytes must be non-zero".into(),
            ));
        }
        if self.quality_steps.is_empty() {
            return Err(ConfigError::Validation(
                "compression.quality_steps must not be empty".into(),
            ));
        }
        if let Some(bad) = self
            .quality_steps
            .iter()
            .find(|q| !(**q > 0.0 && **q <= 1.0))
        {
            return Err(ConfigError::Validation(format!(
                "compression.quality_steps values must be in (0, 1], got {bad}"
            )));
        }
        if self.quality_steps.windows(2).any(|w| w[1] >= w[0]) {
            return Err(ConfigError::Validation(
                "compression.quality_steps must be strictly decreasing".into(),
            ));
        }
        Ok(())
    }

    pub fn to_params(&self) -> CompressionParams {
        CompressionParams {
            max_dimension: self.max_dimension,
            ladder: QualityLadder::new(&self.quality_steps),
            budget_bytes: self.budget_bytes,
        }
    }

    pub fn decode_timeout(&self) -> Option<Duration> {
        (self.decode_timeout_ms > 0).then(|| Duration::from_millis(self.decode_timeout_ms))
    }
}

/// Diagnostic log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns a preset's values as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn preset_defaults_value(preset: Preset) -> toml::Value {
    toml::Value::try_from(AppConfig::for_preset(preset)).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Pick the preset named in `overlay` (or `preset_override`), merge the
/// overlay onto that preset's values, then deserialize and validate.
pub fn resolve_config(
    overlay: Option<toml::Value>,
    preset_override: Option<Preset>,
) -> Result<AppConfig, ConfigError> {
    let named = overlay
        .as_ref()
        .and_then(|v| v.get("preset"))
        .map(|v| match v.as_str() {
            Some(s) => Preset::parse(s),
            None => Err(ConfigError::Validation("preset must be a string".into())),
        })
        .transpose()?;
    let preset = preset_override.or(named).unwrap_or_default();

    let base = preset_defaults_value(preset);
    let mut merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    if let toml::Value::Table(table) = &mut merged {
        table.insert("preset".into(), toml::Value::String(preset.as_str().into()));
    }

    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, or the canonical defaults when no path is given.
///
/// An explicit path that does not exist is an error.
pub fn load_config(
    path: Option<&Path>,
    preset_override: Option<Preset>,
) -> Result<AppConfig, ConfigError> {
    let overlay = path.map(load_raw_config).transpose()?;
    resolve_config(overlay, preset_override)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# estate-media configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the canonical defaults.
#
# Unknown keys will cause an error.

# Base values: "canonical" (1200 px, five quality steps, 700 kB)
# or "compact" (800 px, three quality steps, 650 kB).
# Keys in [compression] override the preset.
preset = "canonical"

# ---------------------------------------------------------------------------
# Compression
# ---------------------------------------------------------------------------
[compression]
# Longest output edge in pixels (1 to 16384). Smaller images are never upscaled.
max_dimension = 1200

# JPEG qualities tried in order until the encoding fits the budget.
# Values in (0, 1], strictly decreasing. If even the last step is too big,
# that encoding is kept anyway.
quality_steps = [0.82, 0.65, 0.5, 0.4, 0.35]

# Estimated encoded size (bytes) each image should fit under. Keep this
# below the document store's per-document limit.
budget_bytes = 700000

# Abort an upload if decoding a file takes longer than this. 0 disables.
decode_timeout_ms = 10000

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# tracing filter used when RUST_LOG is not set (e.g. "debug", "estate_media=trace").
level = "info"
"##
}
