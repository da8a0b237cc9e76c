//! Configuration loading
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. TOML file, when a path is given
//! 3. Environment variables: `TRIALS_*`
//!
//! Only tunable numbers live here. The transition graph and the guard
//! semantics are fixed.
//!
//! # Example Config
//!
//! ```toml
//! [enrollment]
//! futility_screening_multiplier = 3
//!
//! [logging]
//! filter = "trials_core=debug,info"
//! ```

use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{TransitionPolicy, Trial},
    Error, Result,
};

/// Overrides `enrollment.futility_screening_multiplier`
pub const ENV_FUTILITY_SCREENING_MULTIPLIER: &str = "TRIALS_FUTILITY_SCREENING_MULTIPLIER";
/// Overrides `logging.filter`
pub const ENV_LOG: &str = "TRIALS_LOG";

const DEFAULT_FUTILITY_SCREENING_MULTIPLIER: usize = 2;
const DEFAULT_LOG_FILTER: &str = "info";

// ═══════════════════════════════════════════════════════════════════════════
// CONFIG TYPES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrialsConfig {
    pub enrollment: EnrollmentConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnrollmentConfig {
    /// A Recruiting trial may be terminated for futility once
    /// `screened >= futility_screening_multiplier * target_enrollment`
    pub futility_screening_multiplier: usize,
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self {
            futility_screening_multiplier: DEFAULT_FUTILITY_SCREENING_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive string
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// LOADING
// ═══════════════════════════════════════════════════════════════════════════

impl TrialsConfig {
    /// Load defaults, then `path` if given, then the process environment.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The file cannot be read
    /// - The TOML is malformed or has unknown keys
    /// - An environment override cannot be parsed
    /// - The merged values are out of range
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Like [`TrialsConfig::load`] with an explicit environment lookup.
    ///
    /// # Errors
    ///
    /// Same as [`TrialsConfig::load`].
    pub fn load_with_env(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;

        tracing::debug!(
            futility_screening_multiplier = config.enrollment.futility_screening_multiplier,
            filter = %config.logging.filter,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` for malformed TOML and `Config` for out-of-range values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: PathBuf::from(path),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Apply `TRIALS_*` overrides from `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if a numeric override does not parse.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup(ENV_FUTILITY_SCREENING_MULTIPLIER) {
            self.enrollment.futility_screening_multiplier =
                value.trim().parse().map_err(|e| {
                    Error::Config(format!(
                        "invalid {ENV_FUTILITY_SCREENING_MULTIPLIER} value '{value}': {e}"
                    ))
                })?;
        }

        if let Some(value) = lookup(ENV_LOG) {
            self.logging.filter = value;
        }

        Ok(())
    }

    /// # Errors
    ///
    /// Returns `Config` if the multiplier is zero or the filter is blank.
    pub fn validate(&self) -> Result<()> {
        if self.enrollment.futility_screening_multiplier == 0 {
            return Err(Error::Config(
                "enrollment.futility_screening_multiplier must be at least 1".to_string(),
            ));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(Error::Config("logging.filter must not be empty".to_string()));
        }
        Ok(())
    }

    /// The transition policy these settings describe.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the multiplier is zero.
    pub fn policy(&self) -> Result<TransitionPolicy> {
        NonZeroUsize::new(self.enrollment.futility_screening_multiplier)
            .map(TransitionPolicy::new)
            .ok_or_else(|| {
                Error::Config(
                    "enrollment.futility_screening_multiplier must be at least 1".to_string(),
                )
            })
    }

    /// Create a Planning trial governed by this configuration's policy.
    ///
    /// # Errors
    ///
    /// Returns `Config` for an out-of-range multiplier and `Construction`
    /// for invalid enrollment targets.
    pub fn create_trial(
        &self,
        target_enrollment: usize,
        minimum_enrollment: usize,
    ) -> Result<Trial> {
        let policy = self.policy()?;
        Ok(Trial::with_policy(target_enrollment, minimum_enrollment, policy)?)
    }
}
