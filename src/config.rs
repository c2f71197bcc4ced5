//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/h5ndiff/h5ndiff.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `H5NDIFF_*` prefix
//! 5. Command-line flags

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Unified configuration for h5ndiff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Datasets whose worst normalized difference is `<=` this are not reported
    pub precision: f64,
    /// Also enumerate file2 and report datasets missing from file1
    pub symmetric: bool,
    /// Warn about datasets that exist on one side only
    pub report_missing: bool,
    /// Exit with status 1 when any dataset differs or fails
    pub fail_on_diff: bool,
    /// Worker threads for dataset comparisons (0: one per core)
    pub jobs: usize,
    /// Maximum group nesting before traversal fails
    pub max_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            precision: 0.0,
            symmetric: false,
            report_missing: true,
            fail_on_diff: false,
            jobs: 0,
            max_depth: 64,
        }
    }
}

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RawSettings {
    pub precision: Option<f64>,
    pub symmetric: Option<bool>,
    pub report_missing: Option<bool>,
    pub fail_on_diff: Option<bool>,
    pub jobs: Option<usize>,
    pub max_depth: Option<usize>,
}

/// Get the XDG config directory for h5ndiff.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "h5ndiff").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("h5ndiff.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins wherever it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            precision: overlay.precision.unwrap_or(self.precision),
            symmetric: overlay.symmetric.unwrap_or(self.symmetric),
            report_missing: overlay.report_missing.unwrap_or(self.report_missing),
            fail_on_diff: overlay.fail_on_diff.unwrap_or(self.fail_on_diff),
            jobs: overlay.jobs.unwrap_or(self.jobs),
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; it must exist
    ///
    /// Command-line flags are applied afterwards by the caller via [`Settings::merge_with`].
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Explicit config file
        if let Some(path) = config_file {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.validate()?;
        Ok(current)
    }

    /// Apply H5NDIFF_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("H5NDIFF")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        let raw = RawSettings {
            precision: env_value(&config, "precision")?,
            symmetric: env_value(&config, "symmetric")?,
            report_missing: env_value(&config, "report_missing")?,
            fail_on_diff: env_value(&config, "fail_on_diff")?,
            jobs: env_value(&config, "jobs")?,
            max_depth: env_value(&config, "max_depth")?,
        };

        Ok(settings.merge_with(&raw))
    }

    /// Reject values the comparator cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if !self.precision.is_finite() {
            return Err(ApplicationError::Config {
                message: format!("precision must be a finite number, got {}", self.precision),
            });
        }
        if self.max_depth == 0 {
            return Err(ApplicationError::Config {
                message: "max_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# h5ndiff configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/h5ndiff/h5ndiff.toml
#   File:   --config <path>
#   Env:    H5NDIFF_* environment variables (e.g. H5NDIFF_PRECISION=1e-6)
#   Flags:  command-line options

# Report a dataset when its worst normalized difference is > precision
# precision = 0.0

# Also walk file2 and report datasets missing from file1
# symmetric = false

# Warn about datasets present on one side only
# report_missing = true

# Exit with status 1 when any dataset differs or fails
# fail_on_diff = false

# Worker threads (0: one per core)
# jobs = 0

# Maximum group nesting
# max_depth = 64
"#
        .to_string()
    }
}

/// Value of an environment key, `None` when unset.
fn env_value<T: DeserializeOwned>(config: &Config, key: &str) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::Config {
            message: format!("H5NDIFF_{}: {}", key.to_uppercase(), e),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
