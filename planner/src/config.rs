//! Planner configuration file support.
//!
//! Reads solver limits, rule weights and dither cadence from a TOML file.
//! Every section is optional; an empty file yields the defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::circumstances::{
    SolverSettings, DEFAULT_MAX_FINAL_STEP_SECONDS, DEFAULT_MAX_REFINEMENT_DEPTH,
};
use crate::error::{PlannerError, PlannerResult};
use crate::scoring::RuleWeights;
use crate::sequence::DitherInjector;

/// Planner configuration from file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlannerConfig {
    #[serde(default)]
    pub solver: SolverSection,
    #[serde(default)]
    pub scoring: ScoringSection,
    #[serde(default)]
    pub dither: DitherSection,
}

/// `[solver]` settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverSection {
    #[serde(default = "default_max_final_step_seconds")]
    pub max_final_step_seconds: i64,
    #[serde(default = "default_max_refinement_depth")]
    pub max_refinement_depth: usize,
}

impl Default for SolverSection {
    fn default() -> Self {
        Self {
            max_final_step_seconds: default_max_final_step_seconds(),
            max_refinement_depth: default_max_refinement_depth(),
        }
    }
}

fn default_max_final_step_seconds() -> i64 {
    DEFAULT_MAX_FINAL_STEP_SECONDS
}

fn default_max_refinement_depth() -> usize {
    DEFAULT_MAX_REFINEMENT_DEPTH
}

/// `[scoring]` settings. Rules missing from `weights` keep their default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringSection {
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

/// `[dither]` settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DitherSection {
    /// Exposures per filter between dithers; 0 disables dithering.
    #[serde(default)]
    pub every: u32,
}

impl PlannerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> PlannerResult<Self> {
        let deserializer = toml::Deserializer::new(content);
        let config: PlannerConfig = serde_path_to_error::deserialize(deserializer)
            .map_err(|e| {
                PlannerError::Configuration(format!(
                    "Failed to parse config at '{}': {}",
                    e.path(),
                    e.inner()
                ))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load planner configuration from a TOML file.
    ///
    /// # Errors
    /// [`PlannerError::Configuration`] if the file cannot be read, parsed or
    /// validated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> PlannerResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PlannerError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        debug!("loading planner config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Load planner configuration from the default location.
    ///
    /// Searches for `planner.toml` in:
    /// 1. Current directory
    /// 2. `planner/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> PlannerResult<Self> {
        let search_paths = [
            PathBuf::from("planner.toml"),
            PathBuf::from("planner/planner.toml"),
            PathBuf::from("../planner.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(PlannerError::Configuration(
            "No planner.toml found in standard locations".to_string(),
        ))
    }

    /// Check every value with the same rules the typed constructors apply.
    pub fn validate(&self) -> PlannerResult<()> {
        self.solver_settings()?;
        self.rule_weights()?;
        Ok(())
    }

    pub fn solver_settings(&self) -> PlannerResult<SolverSettings> {
        if self.solver.max_final_step_seconds <= 0 {
            return Err(PlannerError::Configuration(format!(
                "solver.max_final_step_seconds must be positive, got {}",
                self.solver.max_final_step_seconds
            )));
        }
        if self.solver.max_refinement_depth == 0 {
            return Err(PlannerError::Configuration(
                "solver.max_refinement_depth must be at least 1".to_string(),
            ));
        }
        let max_final_step = Duration::try_seconds(self.solver.max_final_step_seconds)
            .ok_or_else(|| {
                PlannerError::Configuration(format!(
                    "solver.max_final_step_seconds out of range, got {}",
                    self.solver.max_final_step_seconds
                ))
            })?;
        Ok(SolverSettings {
            max_final_step,
            max_refinement_depth: self.solver.max_refinement_depth,
        })
    }

    pub fn rule_weights(&self) -> PlannerResult<RuleWeights> {
        RuleWeights::from_names(self.scoring.weights.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    pub fn dither_injector(&self) -> DitherInjector {
        DitherInjector::new(self.dither.every)
    }
}
