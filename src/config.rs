//! Configuration loading for Summit.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.summit/config.toml`)
//! 3. User config (`~/.summit/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. A missing file is skipped; a malformed
//! file is an error, since tier and status cutoffs silently reverting to
//! defaults would change what users see.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::badge::{PhaseWeighting, TierThresholds, DEFAULT_ACQUISITION_WEIGHT};
use crate::catalog::{load_catalog, TemplateGraph};
use crate::diagnostic::{PhaseWeightProfiles, StatusThresholds};
use crate::error::{Result, SummitError};

/// Directory name for project and user config.
pub const CONFIG_DIR: &str = ".summit";

/// Main configuration struct for Summit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Badge tier cutoffs and phase weighting.
    pub tiers: TierConfig,
    /// Diagnostic weights and status thresholds.
    pub diagnostic: DiagnosticConfig,
    /// Template catalog source.
    pub catalog: CatalogConfig,
}

/// Badge tier configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TierConfig {
    pub bronze: f64,
    pub silver: f64,
    pub gold: f64,
    pub diamond: f64,
    /// Contribution weight of children still in acquisition.
    pub acquisition_weight: f64,
}

impl Default for TierConfig {
    fn default() -> Self {
        let thresholds = TierThresholds::default();
        Self {
            bronze: thresholds.bronze,
            silver: thresholds.silver,
            gold: thresholds.gold,
            diamond: thresholds.diamond,
            acquisition_weight: DEFAULT_ACQUISITION_WEIGHT,
        }
    }
}

impl TierConfig {
    /// Check if an acquisition weight is valid (strictly between 0 and 1).
    pub fn is_valid_acquisition_weight(value: f64) -> bool {
        value.is_finite() && value > 0.0 && value < 1.0
    }

    /// Tier thresholds as engine input.
    pub fn thresholds(&self) -> TierThresholds {
        TierThresholds::new(self.bronze, self.silver, self.gold, self.diamond)
    }

    /// Phase weighting as engine input.
    pub fn weighting(&self) -> PhaseWeighting {
        PhaseWeighting::new(self.acquisition_weight)
    }
}

/// Diagnostic configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiagnosticConfig {
    /// Status classification cutoffs.
    pub thresholds: StatusThresholds,
    /// Per-phase term weights.
    pub weights: PhaseWeightProfiles,
}

impl DiagnosticConfig {
    /// Check if a status cutoff is usable (0 < value <= 1).
    pub fn is_valid_status_cutoff(value: f64) -> bool {
        value.is_finite() && value > 0.0 && value <= 1.0
    }
}

/// Catalog source configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to a catalog TOML file. `None` uses the built-in catalog.
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration with full precedence chain from the current directory.
    pub fn load() -> Result<Self> {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config()? {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Result<Self> {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config()? {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd)? {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Load user config from `~/.summit/config.toml`.
    fn load_user_config() -> Result<Option<Config>> {
        match summit_home() {
            Some(home) => Self::load_optional(&home.join("config.toml")),
            None => Ok(None),
        }
    }

    /// Load project config from `.summit/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Result<Option<Config>> {
        Self::load_optional(&project_config_path(cwd))
    }

    fn load_optional(path: &Path) -> Result<Option<Config>> {
        if !path.exists() {
            return Ok(None);
        }
        let config = Self::load_from_file(path)?;
        tracing::debug!(path = %path.display(), "loaded config layer");
        Ok(Some(config))
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| SummitError::storage(path, e))?;
        toml::from_str(&content)
            .map_err(|e| SummitError::config(format!("{}: {}", path.display(), e)))
    }

    /// Apply environment variable overrides.
    ///
    /// Invalid values are ignored with a warning.
    fn apply_env_overrides(&mut self) {
        // SUMMIT_ACQUISITION_WEIGHT
        if let Ok(val) = env::var("SUMMIT_ACQUISITION_WEIGHT") {
            match val.parse::<f64>() {
                Ok(n) if TierConfig::is_valid_acquisition_weight(n) => {
                    self.tiers.acquisition_weight = n;
                }
                _ => tracing::warn!(
                    value = %val,
                    current = self.tiers.acquisition_weight,
                    "ignoring SUMMIT_ACQUISITION_WEIGHT, expected a number between 0 and 1"
                ),
            }
        }

        // SUMMIT_STATUS_LOW, SUMMIT_STATUS_MODERATE
        let mut thresholds = self.diagnostic.thresholds;
        let low = Self::status_cutoff_from_env("SUMMIT_STATUS_LOW", thresholds.low);
        let moderate = Self::status_cutoff_from_env("SUMMIT_STATUS_MODERATE", thresholds.moderate);
        if low.is_some() || moderate.is_some() {
            thresholds.low = low.unwrap_or(thresholds.low);
            thresholds.moderate = moderate.unwrap_or(thresholds.moderate);
            match thresholds.validate() {
                Ok(()) => self.diagnostic.thresholds = thresholds,
                Err(e) => tracing::warn!(
                    low = self.diagnostic.thresholds.low,
                    moderate = self.diagnostic.thresholds.moderate,
                    "ignoring SUMMIT_STATUS_LOW/SUMMIT_STATUS_MODERATE: {}",
                    e
                ),
            }
        }

        // SUMMIT_CATALOG
        if let Ok(val) = env::var("SUMMIT_CATALOG") {
            if val.is_empty() {
                tracing::warn!("ignoring empty SUMMIT_CATALOG");
            } else {
                self.catalog.path = Some(PathBuf::from(val));
            }
        }
    }

    /// Parse a status cutoff variable, warning when it is set but invalid.
    fn status_cutoff_from_env(var: &str, current: f64) -> Option<f64> {
        let val = env::var(var).ok()?;
        match val.parse::<f64>() {
            Ok(n) if DiagnosticConfig::is_valid_status_cutoff(n) => Some(n),
            _ => {
                tracing::warn!(
                    value = %val,
                    current,
                    "ignoring {}, expected a number in (0, 1]",
                    var
                );
                None
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// Values from `other` take precedence when they differ from the
    /// default. A layer that explicitly sets a default value cannot undo a
    /// lower layer's customization; each layer only needs to list what it
    /// changes.
    fn merge(mut self, other: Config) -> Self {
        let default_tiers = TierConfig::default();
        if other.tiers.bronze != default_tiers.bronze {
            self.tiers.bronze = other.tiers.bronze;
        }
        if other.tiers.silver != default_tiers.silver {
            self.tiers.silver = other.tiers.silver;
        }
        if other.tiers.gold != default_tiers.gold {
            self.tiers.gold = other.tiers.gold;
        }
        if other.tiers.diamond != default_tiers.diamond {
            self.tiers.diamond = other.tiers.diamond;
        }
        if other.tiers.acquisition_weight != default_tiers.acquisition_weight {
            self.tiers.acquisition_weight = other.tiers.acquisition_weight;
        }

        let default_thresholds = StatusThresholds::default();
        let theirs = other.diagnostic.thresholds;
        let ours = &mut self.diagnostic.thresholds;
        if theirs.low != default_thresholds.low {
            ours.low = theirs.low;
        }
        if theirs.moderate != default_thresholds.moderate {
            ours.moderate = theirs.moderate;
        }
        if theirs.high_weight != default_thresholds.high_weight {
            ours.high_weight = theirs.high_weight;
        }
        if theirs.neutral_weight != default_thresholds.neutral_weight {
            ours.neutral_weight = theirs.neutral_weight;
        }

        // Weight triples must sum to 1, so each profile merges as a unit.
        let default_weights = PhaseWeightProfiles::default();
        let theirs = other.diagnostic.weights;
        let ours = &mut self.diagnostic.weights;
        if theirs.acquisition != default_weights.acquisition {
            ours.acquisition = theirs.acquisition;
        }
        if theirs.consolidation != default_weights.consolidation {
            ours.consolidation = theirs.consolidation;
        }
        if theirs.graduated != default_weights.graduated {
            ours.graduated = theirs.graduated;
        }

        if other.catalog.path.is_some() {
            self.catalog.path = other.catalog.path;
        }

        self
    }

    /// Check every section against the engine's constraints.
    pub fn validate(&self) -> Result<()> {
        self.tiers.thresholds().validate()?;
        self.tiers.weighting().validate()?;
        self.diagnostic.thresholds.validate()?;
        self.diagnostic.weights.validate()?;
        Ok(())
    }

    /// Load the configured catalog, or the built-in one.
    pub fn load_catalog(&self) -> Result<TemplateGraph> {
        load_catalog(self.catalog.path.as_deref())
    }

    /// Save configuration to the project config file.
    ///
    /// Writes to `.summit/config.toml` in the given directory, creating the
    /// directory if needed. Uses atomic write (temp file, then rename).
    pub fn save_project(&self, cwd: &Path) -> Result<()> {
        self.validate()?;

        let summit_dir = cwd.join(CONFIG_DIR);
        if !summit_dir.exists() {
            fs::create_dir_all(&summit_dir).map_err(|e| SummitError::storage(&summit_dir, e))?;
        }

        let config_path = summit_dir.join("config.toml");
        let content =
            toml::to_string_pretty(self).map_err(|e| SummitError::config(e.to_string()))?;

        let temp_path = summit_dir.join(".config.toml.tmp");
        fs::write(&temp_path, &content).map_err(|e| SummitError::storage(&temp_path, e))?;

        let file = fs::File::open(&temp_path).map_err(|e| SummitError::storage(&temp_path, e))?;
        file.sync_all()
            .map_err(|e| SummitError::storage(&temp_path, e))?;
        drop(file);

        fs::rename(&temp_path, &config_path)
            .map_err(|e| SummitError::storage(&config_path, e))?;

        Ok(())
    }
}

/// Get the Summit home directory.
///
/// Uses `SUMMIT_HOME` when set and non-empty, otherwise `~/.summit`.
pub fn summit_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("SUMMIT_HOME") {
        if home.is_empty() {
            tracing::warn!("SUMMIT_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("SUMMIT_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    dirs::home_dir().map(|home| home.join(CONFIG_DIR))
}

/// Project config path for a working directory.
pub fn project_config_path(cwd: &Path) -> PathBuf {
    cwd.join(CONFIG_DIR).join("config.toml")
}
