//! Configuration system for FlowForge.
//!
//! Load run configuration from TOML or YAML files to control solver limits
//! and model constants without code changes. Every value has a default, and
//! the input's Parameters table can override solver limits per scenario.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use flowforge_config::FlowConfig;
//! use std::time::Duration;
//!
//! let config = FlowConfig::from_toml_str(r#"
//!     [solver]
//!     max_run_time_secs = 120
//!     gap_limit = 0.05
//!
//!     [model]
//!     big_m = 100000.0
//! "#).unwrap();
//!
//! assert_eq!(config.time_limit(), Duration::from_secs(120));
//! assert_eq!(config.model.big_m, 100000.0);
//! ```
//!
//! Use the default config when the file is missing:
//!
//! ```
//! use flowforge_config::FlowConfig;
//!
//! let config = FlowConfig::load("flowforge.toml").unwrap_or_default();
//! assert!(config.run.parallel_scenarios);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default wall-clock limit per solver invocation, in seconds.
pub const DEFAULT_MAX_RUN_TIME_SECS: f64 = 3600.0;
/// Default relative optimality gap at which the solver stops.
pub const DEFAULT_GAP_LIMIT: f64 = 0.01;
/// Default big-M constant for indicator relations.
pub const DEFAULT_BIG_M: f64 = 1.0e6;

/// Parameter names recognised in the input's Parameters table.
pub const PARAM_MAX_RUN_TIME: &str = "Max Run Time";
pub const PARAM_GAP_LIMIT: &str = "Gap Limit";
pub const PARAM_BIG_M: &str = "Big M";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main run configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FlowConfig {
    /// Limits handed to the solver on every stage.
    #[serde(default)]
    pub solver: SolverSettings,

    /// Constants used while building models.
    #[serde(default)]
    pub model: ModelSettings,

    /// Run-level behavior.
    #[serde(default)]
    pub run: RunSettings,
}

impl FlowConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file, choosing the format by extension
    /// (`.yaml`/`.yml` for YAML, TOML otherwise).
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, fails to parse, or holds
    /// values outside their domain.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_file(path)?,
            _ => Self::from_toml_file(path)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the per-stage solver time limit.
    pub fn with_max_run_time_secs(mut self, seconds: f64) -> Self {
        self.solver.max_run_time_secs = seconds;
        self
    }

    /// Sets the relative optimality gap.
    pub fn with_gap_limit(mut self, gap: f64) -> Self {
        self.solver.gap_limit = gap;
        self
    }

    /// Sets the big-M constant.
    pub fn with_big_m(mut self, big_m: f64) -> Self {
        self.model.big_m = big_m;
        self
    }

    /// Sets the per-unit cost of dropped demand without an explicit cost.
    pub fn with_default_drop_cost(mut self, cost: f64) -> Self {
        self.model.default_drop_cost = cost;
        self
    }

    /// Enables or disables solving scenarios in parallel.
    pub fn with_parallel_scenarios(mut self, parallel: bool) -> Self {
        self.run.parallel_scenarios = parallel;
        self
    }

    /// Returns the per-stage solver time limit.
    pub fn time_limit(&self) -> Duration {
        self.solver.time_limit()
    }

    /// Checks every value against its domain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.solver;
        if Duration::try_from_secs_f64(s.max_run_time_secs).map_or(true, |d| d.is_zero()) {
            return Err(ConfigError::Invalid(format!(
                "max_run_time_secs must be a positive, representable duration, got {}",
                s.max_run_time_secs
            )));
        }
        if !(0.0..=1.0).contains(&s.gap_limit) {
            return Err(ConfigError::Invalid(format!(
                "gap_limit must lie in [0, 1], got {}",
                s.gap_limit
            )));
        }
        let m = &self.model;
        if !(m.big_m > 0.0 && m.big_m.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "big_m must be positive, got {}",
                m.big_m
            )));
        }
        if !(m.default_drop_cost >= 0.0 && m.freeze_tolerance >= 0.0) {
            return Err(ConfigError::Invalid(
                "default_drop_cost and freeze_tolerance must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns a copy with scenario parameters applied on top.
    ///
    /// Recognises `Max Run Time`, `Gap Limit` and `Big M` (case-insensitive);
    /// other names are ignored. The result is validated.
    pub fn with_parameters<'a>(
        &self,
        parameters: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Result<Self, ConfigError> {
        let mut out = self.clone();
        for (name, value) in parameters {
            if name.eq_ignore_ascii_case(PARAM_MAX_RUN_TIME) {
                out.solver.max_run_time_secs = value;
            } else if name.eq_ignore_ascii_case(PARAM_GAP_LIMIT) {
                out.solver.gap_limit = value;
            } else if name.eq_ignore_ascii_case(PARAM_BIG_M) {
                out.model.big_m = value;
            }
        }
        out.validate()?;
        Ok(out)
    }
}

/// Solver limits applied to every stage.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SolverSettings {
    /// Wall-clock limit per solver invocation, in seconds.
    pub max_run_time_secs: f64,

    /// Relative optimality gap in [0, 1].
    pub gap_limit: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_run_time_secs: DEFAULT_MAX_RUN_TIME_SECS,
            gap_limit: DEFAULT_GAP_LIMIT,
        }
    }
}

impl SolverSettings {
    /// Values that do not fit a `Duration` saturate to `Duration::MAX`;
    /// `FlowConfig::validate` rejects them.
    pub fn time_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.max_run_time_secs.max(0.0)).unwrap_or(Duration::MAX)
    }
}

/// Constants used by the model builder.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ModelSettings {
    /// Upper bound used in indicator (big-M) relations.
    pub big_m: f64,

    /// Per-unit cost of dropped demand when a Demand row declares none.
    pub default_drop_cost: f64,

    /// Absolute slack added when freezing a solved objective.
    pub freeze_tolerance: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            big_m: DEFAULT_BIG_M,
            default_drop_cost: 1000.0,
            freeze_tolerance: 1e-6,
        }
    }
}

/// Run-level behavior.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct RunSettings {
    /// Solve independent scenarios on the rayon thread pool.
    pub parallel_scenarios: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            parallel_scenarios: true,
        }
    }
}
