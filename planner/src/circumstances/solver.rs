//! Circumstance solver.
//!
//! Finds the time of an altitude event to within a configured precision by
//! bracketed refinement: locate the bracket in coarse samples, ask the
//! refiner for finer samples across exactly that bracket, and repeat until
//! the bracket is narrower than the maximum final step.

use chrono::Duration;
use log::{debug, warn};

use crate::circumstances::events::{BracketSide, EventFunction};
use crate::error::{PlannerError, PlannerResult};
use crate::models::{AltitudeAtTime, Altitudes, HorizonDefinition};

/// Interior samples requested from the refiner on each refinement.
pub const REFINEMENT_POINTS: usize = 10;

/// Default width under which a bracket is accepted as the answer.
pub const DEFAULT_MAX_FINAL_STEP_SECONDS: i64 = 60;

/// Default cap on refinement levels.
pub const DEFAULT_MAX_REFINEMENT_DEPTH: usize = 8;

/// Produces finer altitude samples across a bracket.
pub trait AltitudeRefiner {
    /// Return `step`'s two endpoints with `num_points` evenly spaced samples
    /// strictly between them. The result must start and end exactly where
    /// `step` does.
    fn refine(&self, step: &Altitudes, num_points: usize) -> PlannerResult<Altitudes>;
}

impl<R: AltitudeRefiner + ?Sized> AltitudeRefiner for &R {
    fn refine(&self, step: &Altitudes, num_points: usize) -> PlannerResult<Altitudes> {
        (**self).refine(step, num_points)
    }
}

/// Precision and safety limits for the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverSettings {
    pub max_final_step: Duration,
    pub max_refinement_depth: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_final_step: Duration::seconds(DEFAULT_MAX_FINAL_STEP_SECONDS),
            max_refinement_depth: DEFAULT_MAX_REFINEMENT_DEPTH,
        }
    }
}

/// Locates altitude events with sub-step precision.
pub struct CircumstanceSolver<'r, R: ?Sized> {
    refiner: &'r R,
    settings: SolverSettings,
}

impl<'r, R: AltitudeRefiner + ?Sized> CircumstanceSolver<'r, R> {
    pub fn new(refiner: &'r R) -> Self {
        Self::with_settings(refiner, SolverSettings::default())
    }

    pub fn with_settings(refiner: &'r R, settings: SolverSettings) -> Self {
        Self { refiner, settings }
    }

    pub fn settings(&self) -> SolverSettings {
        self.settings
    }

    pub fn find_rising(&self, altitudes: &Altitudes) -> PlannerResult<Option<AltitudeAtTime>> {
        self.find_event(EventFunction::Rising, altitudes)
    }

    pub fn find_setting(&self, altitudes: &Altitudes) -> PlannerResult<Option<AltitudeAtTime>> {
        self.find_event(EventFunction::Setting, altitudes)
    }

    pub fn find_transit(&self, altitudes: &Altitudes) -> PlannerResult<Option<AltitudeAtTime>> {
        self.find_event(EventFunction::Transit, altitudes)
    }

    pub fn find_rise_above_minimum(
        &self,
        altitudes: &Altitudes,
        horizon: &dyn HorizonDefinition,
    ) -> PlannerResult<Option<AltitudeAtTime>> {
        self.find_event(EventFunction::RiseAboveMinimum(horizon), altitudes)
    }

    pub fn find_set_below_minimum(
        &self,
        altitudes: &Altitudes,
        horizon: &dyn HorizonDefinition,
    ) -> PlannerResult<Option<AltitudeAtTime>> {
        self.find_event(EventFunction::SetBelowMinimum(horizon), altitudes)
    }

    /// Locate `event` in `altitudes`.
    ///
    /// Returns `Ok(None)` when the event does not occur in the span. The
    /// reported sample is the trailing sample of the final bracket for
    /// rising/transit events and the leading sample for setting events, so
    /// it always lies on the visible side of the crossing.
    ///
    /// # Errors
    /// [`PlannerError::InvalidRefinement`] if the refiner returns samples that
    /// do not span the bracket, [`PlannerError::RefinementLimitExceeded`] if
    /// the bracket is still too wide after the configured depth.
    pub fn find_event(
        &self,
        event: EventFunction<'_>,
        altitudes: &Altitudes,
    ) -> PlannerResult<Option<AltitudeAtTime>> {
        self.solve(event, altitudes, 0)
    }

    fn solve(
        &self,
        event: EventFunction<'_>,
        altitudes: &Altitudes,
        depth: usize,
    ) -> PlannerResult<Option<AltitudeAtTime>> {
        let Some(step) = event.determine_step(altitudes) else {
            if depth > 0 {
                debug!("{} bracket lost after {} refinements", event.kind(), depth);
            }
            return Ok(None);
        };

        let span = step.span();
        if span <= self.settings.max_final_step {
            let sample = match event.kind().reported_side() {
                BracketSide::Leading => step.first(),
                BracketSide::Trailing => step.last(),
            };
            debug!(
                "{} resolved at {} (altitude {:.3}) after {} refinements",
                event.kind(),
                sample.time(),
                sample.altitude().value(),
                depth
            );
            return Ok(Some(sample));
        }

        if depth >= self.settings.max_refinement_depth {
            return Err(PlannerError::RefinementLimitExceeded {
                depth,
                span_seconds: span.num_milliseconds() as f64 / 1000.0,
            });
        }

        let refined = self.refiner.refine(&step, REFINEMENT_POINTS)?;
        check_refinement(&step, &refined)?;
        if refined.len() < REFINEMENT_POINTS + 2 {
            warn!(
                "refiner returned {} samples for {} requested interior points",
                refined.len(),
                REFINEMENT_POINTS
            );
        }
        debug!(
            "refining {} bracket {} -> {} ({}s) into {} samples",
            event.kind(),
            step.start_time(),
            step.end_time(),
            span.num_seconds(),
            refined.len()
        );
        self.solve(event, &refined, depth + 1)
    }
}

/// The refined sequence must cover exactly the bracket and add samples
/// inside it, otherwise the next bracket is not guaranteed to be narrower.
fn check_refinement(step: &Altitudes, refined: &Altitudes) -> PlannerResult<()> {
    if refined.is_circular() {
        return Err(PlannerError::InvalidRefinement(
            "refined samples must be linear".to_string(),
        ));
    }
    if refined.start_time() != step.start_time() || refined.end_time() != step.end_time() {
        return Err(PlannerError::InvalidRefinement(format!(
            "refined samples span {} -> {}, expected {} -> {}",
            refined.start_time(),
            refined.end_time(),
            step.start_time(),
            step.end_time()
        )));
    }
    if refined.len() <= step.len() {
        return Err(PlannerError::InvalidRefinement(format!(
            "refiner returned {} samples for a {}-sample bracket",
            refined.len(),
            step.len()
        )));
    }
    Ok(())
}
