//! Error types for the planning core.
//!
//! Every variant here is a precondition or configuration failure. Outcomes
//! such as "the target never rises in this span" are modelled as `None`
//! values by the callers, not as errors.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for planning operations
pub type PlannerResult<T> = std::result::Result<T, PlannerError>;

/// Errors that can occur while solving circumstances, scoring or building plans
#[derive(Error, Debug)]
pub enum PlannerError {
    /// A time window whose start is not strictly before its end
    #[error("Invalid time range: start {start} is not before end {end}")]
    InvalidTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Altitude samples that cannot be used (empty, unordered, bad wrap period)
    #[error("Invalid altitude samples: {0}")]
    InvalidAltitudes(String),

    /// Observer location outside the valid coordinate ranges
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// Target coordinates outside the valid ranges
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// Refiner output that does not span the requested bracket
    #[error("Invalid refinement: {0}")]
    InvalidRefinement(String),

    /// Refinement recursed past the configured depth without converging
    #[error("Refinement did not converge after {depth} levels (bracket still {span_seconds:.1}s wide)")]
    RefinementLimitExceeded { depth: usize, span_seconds: f64 },

    /// Rule name not present in the scoring registry
    #[error("Unknown scoring rule: {0}")]
    UnknownRule(String),

    /// Negative or non-finite rule weight
    #[error("Invalid weight {weight} for rule '{rule}'")]
    InvalidWeight { rule: String, weight: f64 },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PlannerError {
    /// Build an [`PlannerError::InvalidTimeRange`] from the offending bounds.
    pub fn time_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::InvalidTimeRange { start, end }
    }

    /// Whether this error comes from a bad configuration value rather than
    /// from runtime inputs.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::UnknownRule(_) | Self::InvalidWeight { .. }
        )
    }
}
