//! Altitude event solving.
//!
//! # Components
//!
//! - [`events`]: Event-detection functions (rising, setting, transit, threshold crossings)
//! - [`solver`]: Bracketed refinement to sub-step precision
//! - [`imaging`]: Nightly visibility window of a target against a horizon
//! - [`sampled`]: Function-backed ephemeris provider
//!
//! # Example
//!
//! ```ignore
//! use target_planner::circumstances::{CircumstanceSolver, SampledEphemeris};
//!
//! let ephemeris = SampledEphemeris::new(|t| altitude_and_azimuth(t));
//! let solver = CircumstanceSolver::new(&ephemeris);
//! if let Some(rise) = solver.find_rising(&hourly_samples)? {
//!     println!("rises at {}", rise.time());
//! }
//! ```

pub mod events;
pub mod imaging;
pub mod sampled;
pub mod solver;

pub use events::{BracketSide, EventFunction, EventKind};
pub use imaging::{DailyCircumstances, EphemerisProvider, ImagingCircumstances, VisibilityStatus};
pub use sampled::SampledEphemeris;
pub use solver::{
    AltitudeRefiner, CircumstanceSolver, SolverSettings, DEFAULT_MAX_FINAL_STEP_SECONDS,
    DEFAULT_MAX_REFINEMENT_DEPTH, REFINEMENT_POINTS,
};
