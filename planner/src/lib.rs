//! # Target Planner
//!
//! Decision core of an automated imaging session: when a target rises, sets
//! and transits, which candidate to image next, and where to dither in the
//! chosen target's exposure sequence.
//!
//! ## Architecture
//!
//! - [`circumstances`]: Bracketed refinement of altitude events and nightly
//!   visibility windows
//! - [`scoring`]: Rule registry and weighted scoring engine
//! - [`sequence`]: Dither injection into instruction sequences
//! - [`models`]: Altitude samples, horizons, projects, targets and plan
//!   instructions
//! - [`config`]: TOML configuration
//! - [`error`]: Crate error type
//!
//! Every operation is synchronous and works on caller-owned inputs. The
//! ephemeris, persistence and execution runtime live outside this crate;
//! the ephemeris is plugged in through [`circumstances::EphemerisProvider`].
//!
//! Logging goes through the `log` facade; install any logger to see solver
//! steps and per-rule scores at `debug` level.

pub mod circumstances;
pub mod config;
pub mod error;
pub mod models;
pub mod scoring;
pub mod sequence;

pub use circumstances::{
    CircumstanceSolver, DailyCircumstances, EphemerisProvider, ImagingCircumstances,
    SampledEphemeris, SolverSettings, VisibilityStatus,
};
pub use config::PlannerConfig;
pub use error::{PlannerError, PlannerResult};
pub use scoring::{RuleWeights, ScoringContext, ScoringEngine, ScoringRule};
pub use sequence::DitherInjector;
