//! TOML Configuration File Support
//!
//! Loads spinner configuration from `~/.config/glyph-rotor/rotor.toml`.
//!
//! # Configuration Priority
//!
//! Values are applied with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables (`ROTOR_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [spinner]
//! visible_count = 4
//! pool = ["wifi.circle.fill", "phone.circle.fill", "play.circle.fill", "house.circle.fill"]
//! seed = 42
//!
//! [timing]
//! animation_ms = 850
//! pause_ms = 450
//! buffer_ms = 100
//! first_tick_delay_ms = 100
//! settle_delay_ms = 500
//! exit_delay_ms = 400
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::SpinnerError;
use crate::model::{SymbolPoolModel, DEFAULT_POOL, DEFAULT_VISIBLE_COUNT};
use crate::source::RngGlyphSource;
use crate::timing::RotationTiming;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The loaded values do not describe a valid spinner
    #[error("Invalid configuration: {0}")]
    ValidationError(#[from] SpinnerError),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Spinner section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinnerToml {
    /// Number of glyphs shown at once
    pub visible_count: Option<usize>,

    /// Candidate glyph identifiers
    pub pool: Option<Vec<String>>,

    /// Seed for reproducible glyph draws
    pub seed: Option<u64>,
}

/// Timing section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingToml {
    /// Transition animation length in milliseconds
    pub animation_ms: Option<u64>,

    /// Pause after each transition in milliseconds
    pub pause_ms: Option<u64>,

    /// Buffer added to each cycle in milliseconds
    pub buffer_ms: Option<u64>,

    /// Delay before the first tick in milliseconds
    pub first_tick_delay_ms: Option<u64>,

    /// Delay before the started completion in milliseconds
    pub settle_delay_ms: Option<u64>,

    /// Delay before the stopped completion in milliseconds
    pub exit_delay_ms: Option<u64>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RotorToml {
    /// Spinner configuration section
    pub spinner: SpinnerToml,

    /// Timing configuration section
    pub timing: TimingToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved spinner configuration
///
/// Use [`load_config`] to load with proper priority handling and
/// [`RotorConfig::validate`] before building anything from it.
#[derive(Clone, Debug)]
pub struct RotorConfig {
    /// Number of glyphs shown at once
    pub visible_count: usize,

    /// Candidate glyph identifiers
    pub pool: Vec<String>,

    /// Seed for reproducible draws; entropy when `None`
    pub seed: Option<u64>,

    /// Rotation timing
    pub timing: RotationTiming,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for RotorConfig {
    fn default() -> Self {
        Self {
            visible_count: DEFAULT_VISIBLE_COUNT,
            pool: DEFAULT_POOL.iter().map(|g| (*g).to_string()).collect(),
            seed: None,
            timing: RotationTiming::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl RotorConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Check the values without building a model
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for a zero visible count, a
    /// pool with fewer distinct glyphs than the visible count, or a zero
    /// cadence.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.visible_count == 0 {
            return Err(SpinnerError::EmptyVisibleCount.into());
        }
        let mut distinct: Vec<&String> = self.pool.iter().collect();
        distinct.sort();
        distinct.dedup();
        if distinct.len() < self.visible_count {
            return Err(SpinnerError::Configuration {
                pool_size: distinct.len(),
                visible_count: self.visible_count,
            }
            .into());
        }
        self.timing.validate()?;
        Ok(())
    }

    /// Build the pool model this configuration describes
    ///
    /// # Errors
    ///
    /// Returns [`SpinnerError`] when the pool cannot back the visible count.
    pub fn build_model(&self) -> Result<SymbolPoolModel, SpinnerError> {
        let pool = self.pool.iter().cloned();
        match self.seed {
            Some(seed) => {
                SymbolPoolModel::with_source(self.visible_count, pool, RngGlyphSource::seeded(seed))
            }
            None => SymbolPoolModel::new(self.visible_count, pool),
        }
    }
}

/// Command-line overrides, applied last
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Override the visible count
    pub visible_count: Option<usize>,

    /// Override the draw seed
    pub seed: Option<u64>,

    /// Override the whole cadence (attributed to the animation phase)
    pub cadence_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Apply the overrides to `config`
    pub fn apply(&self, config: &mut RotorConfig) {
        if let Some(count) = self.visible_count {
            config.visible_count = count;
            config.source = ConfigSource::Cli;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
            config.source = ConfigSource::Cli;
        }
        if let Some(cadence) = self.cadence_ms {
            config.timing = RotationTiming {
                animation: Duration::from_millis(cadence),
                pause: Duration::ZERO,
                buffer: Duration::ZERO,
                ..config.timing
            };
            config.source = ConfigSource::Cli;
        }
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/glyph-rotor/rotor.toml` or
/// `~/.config/glyph-rotor/rotor.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("glyph-rotor").join("rotor.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<RotorConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<RotorConfig, ConfigError> {
    let mut config = RotorConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: RotorToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut RotorConfig, toml: &RotorToml) {
    if let Some(count) = toml.spinner.visible_count {
        config.visible_count = count;
    }
    if let Some(ref pool) = toml.spinner.pool {
        config.pool.clone_from(pool);
    }
    if toml.spinner.seed.is_some() {
        config.seed = toml.spinner.seed;
    }

    let timing = &mut config.timing;
    if let Some(ms) = toml.timing.animation_ms {
        timing.animation = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.timing.pause_ms {
        timing.pause = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.timing.buffer_ms {
        timing.buffer = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.timing.first_tick_delay_ms {
        timing.first_tick_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.timing.settle_delay_ms {
        timing.settle_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.timing.exit_delay_ms {
        timing.exit_delay = Duration::from_millis(ms);
    }
}

/// Apply environment variable overrides to the config
///
/// `lookup` resolves a variable name; unparsable values are ignored.
fn apply_env_config<F>(config: &mut RotorConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(count) = lookup("ROTOR_VISIBLE_COUNT").and_then(|v| v.parse::<usize>().ok()) {
        config.visible_count = count;
        config.source = ConfigSource::Env;
    }
    if let Some(pool) = lookup("ROTOR_POOL") {
        let glyphs: Vec<String> = pool
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect();
        if !glyphs.is_empty() {
            config.pool = glyphs;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(seed) = lookup("ROTOR_SEED").and_then(|v| v.parse::<u64>().ok()) {
        config.seed = Some(seed);
        config.source = ConfigSource::Env;
    }

    let millis = |key: &str| {
        lookup(key)
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
    };
    let timing = &mut config.timing;
    let mut from_env = false;
    if let Some(d) = millis("ROTOR_ANIMATION_MS") {
        timing.animation = d;
        from_env = true;
    }
    if let Some(d) = millis("ROTOR_PAUSE_MS") {
        timing.pause = d;
        from_env = true;
    }
    if let Some(d) = millis("ROTOR_BUFFER_MS") {
        timing.buffer = d;
        from_env = true;
    }
    if let Some(d) = millis("ROTOR_FIRST_TICK_DELAY_MS") {
        timing.first_tick_delay = d;
        from_env = true;
    }
    if let Some(d) = millis("ROTOR_SETTLE_DELAY_MS") {
        timing.settle_delay = d;
        from_env = true;
    }
    if let Some(d) = millis("ROTOR_EXIT_DELAY_MS") {
        timing.exit_delay = d;
        from_env = true;
    }
    if from_env {
        config.source = ConfigSource::Env;
    }
}
