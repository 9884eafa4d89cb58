//! Imaging circumstances: a target's visibility window over one night.
//!
//! The ephemeris (how altitudes are actually computed) is an external
//! collaborator behind [`EphemerisProvider`]. This module only decides which
//! spans to search and combines the solver results.

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::circumstances::solver::{AltitudeRefiner, CircumstanceSolver, SolverSettings};
use crate::error::{PlannerError, PlannerResult};
use crate::models::{
    AltitudeAtTime, Altitudes, HorizonDefinition, ObserverLocation, TargetCoordinates,
};

/// Source of altitude samples for a target at a location.
pub trait EphemerisProvider {
    type Refiner: AltitudeRefiner;

    /// Refiner bound to one target and location.
    fn refiner(&self, location: &ObserverLocation, target: &TargetCoordinates) -> Self::Refiner;

    /// Linear altitude curve covering `[start, end]`, first and last samples
    /// exactly at the bounds.
    fn altitudes(
        &self,
        location: &ObserverLocation,
        target: &TargetCoordinates,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> PlannerResult<Altitudes>;

    /// Circular curve of 24 hourly samples starting at midnight UTC of `date`.
    fn hourly_altitudes_for_day(
        &self,
        location: &ObserverLocation,
        target: &TargetCoordinates,
        date: NaiveDate,
    ) -> PlannerResult<Altitudes>;

    fn rises_at_location(&self, location: &ObserverLocation, target: &TargetCoordinates) -> bool {
        location.target_rises(target)
    }

    fn circumpolar_at_location(
        &self,
        location: &ObserverLocation,
        target: &TargetCoordinates,
    ) -> bool {
        location.is_circumpolar(target)
    }
}

/// Outcome of a visibility analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisibilityStatus {
    PotentiallyVisible,
    NeverVisible,
    NeverAboveMinimumAltitude,
}

/// Rise/transit/set of a target against a horizon within a time window.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagingCircumstances {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: VisibilityStatus,
    rise_above_minimum: Option<AltitudeAtTime>,
    transit: Option<AltitudeAtTime>,
    set_below_minimum: Option<AltitudeAtTime>,
    above_at_start: bool,
    above_at_end: bool,
}

impl ImagingCircumstances {
    /// Analyze a target's visibility in `[start, end]`.
    ///
    /// # Errors
    /// [`PlannerError::InvalidTimeRange`] unless `start < end`; solver and
    /// provider errors are propagated.
    pub fn analyze<P: EphemerisProvider + ?Sized>(
        provider: &P,
        location: &ObserverLocation,
        target: &TargetCoordinates,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        horizon: &dyn HorizonDefinition,
        settings: SolverSettings,
    ) -> PlannerResult<Self> {
        if start >= end {
            return Err(PlannerError::time_range(start, end));
        }

        let mut circumstances = Self {
            start_time: start,
            end_time: end,
            status: VisibilityStatus::NeverVisible,
            rise_above_minimum: None,
            transit: None,
            set_below_minimum: None,
            above_at_start: false,
            above_at_end: false,
        };

        if !provider.rises_at_location(location, target) {
            debug!("target at dec {:.2} never rises", target.dec.value());
            return Ok(circumstances);
        }

        let curve = provider.altitudes(location, target, start, end)?;
        if !curve.samples().iter().any(|s| horizon.is_above(s)) {
            circumstances.status = VisibilityStatus::NeverAboveMinimumAltitude;
            return Ok(circumstances);
        }

        let refiner = provider.refiner(location, target);
        let solver = CircumstanceSolver::with_settings(&refiner, settings);

        let transit = solver.find_transit(&curve)?;
        let (rise_span, set_span) = match transit {
            Some(t) => (span_until(&curve, t), span_from(&curve, t)),
            None => (Some(curve.clone()), Some(curve.clone())),
        };

        let rise = match rise_span {
            Some(span) => solver.find_rise_above_minimum(&span, horizon)?,
            None => None,
        };
        let set = match set_span {
            Some(span) => solver.find_set_below_minimum(&span, horizon)?,
            None => None,
        };

        circumstances.status = VisibilityStatus::PotentiallyVisible;
        circumstances.rise_above_minimum = rise;
        circumstances.transit = transit;
        circumstances.set_below_minimum = set;
        circumstances.above_at_start = horizon.is_above(&curve.first());
        circumstances.above_at_end = horizon.is_above(&curve.last());
        debug!(
            "visible window {:?} -> {:?} (transit {:?})",
            circumstances.clipped_rise_time(),
            circumstances.clipped_set_time(),
            circumstances.transit_time()
        );
        Ok(circumstances)
    }

    pub fn status(&self) -> VisibilityStatus {
        self.status
    }

    pub fn is_visible(&self) -> bool {
        self.status == VisibilityStatus::PotentiallyVisible
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn rise_above_minimum_time(&self) -> Option<DateTime<Utc>> {
        self.rise_above_minimum.map(|s| s.time())
    }

    pub fn transit_time(&self) -> Option<DateTime<Utc>> {
        self.transit.map(|s| s.time())
    }

    pub fn set_below_minimum_time(&self) -> Option<DateTime<Utc>> {
        self.set_below_minimum.map(|s| s.time())
    }

    /// Start of visibility within the window: the window start if the target
    /// is already above the horizon there, else the rise time.
    pub fn clipped_rise_time(&self) -> Option<DateTime<Utc>> {
        if !self.is_visible() {
            return None;
        }
        if self.above_at_start {
            Some(self.start_time)
        } else {
            self.rise_above_minimum_time()
        }
    }

    /// End of visibility within the window: the window end if the target is
    /// still above the horizon there, else the set time.
    pub fn clipped_set_time(&self) -> Option<DateTime<Utc>> {
        if !self.is_visible() {
            return None;
        }
        if self.above_at_end {
            Some(self.end_time)
        } else {
            self.set_below_minimum_time()
        }
    }

    /// The clipped visibility window, if both ends are known.
    pub fn visible_window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.clipped_rise_time(), self.clipped_set_time()) {
            (Some(rise), Some(set)) if rise < set => Some((rise, set)),
            _ => None,
        }
    }
}

/// Curve samples before `transit`, closed by the transit sample itself.
fn span_until(curve: &Altitudes, transit: AltitudeAtTime) -> Option<Altitudes> {
    let mut samples: Vec<AltitudeAtTime> = curve
        .samples()
        .iter()
        .filter(|s| s.time() < transit.time())
        .copied()
        .collect();
    samples.push(transit);
    if samples.len() < 2 {
        return None;
    }
    Altitudes::new(samples).ok()
}

/// The transit sample followed by the curve samples after it.
fn span_from(curve: &Altitudes, transit: AltitudeAtTime) -> Option<Altitudes> {
    let samples: Vec<AltitudeAtTime> = std::iter::once(transit)
        .chain(
            curve
                .samples()
                .iter()
                .filter(|s| s.time() > transit.time())
                .copied(),
        )
        .collect();
    if samples.len() < 2 {
        return None;
    }
    Altitudes::new(samples).ok()
}

/// Zero-horizon rise, transit and set of a target over one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyCircumstances {
    pub date: NaiveDate,
    pub rising: Option<DateTime<Utc>>,
    pub transit: Option<DateTime<Utc>>,
    pub setting: Option<DateTime<Utc>>,
    pub circumpolar: bool,
    pub rises: bool,
}

impl DailyCircumstances {
    /// Search the day's circular hourly curve, so events in the last hour
    /// before midnight are found through the wraparound pair.
    pub fn for_day<P: EphemerisProvider + ?Sized>(
        provider: &P,
        location: &ObserverLocation,
        target: &TargetCoordinates,
        date: NaiveDate,
        settings: SolverSettings,
    ) -> PlannerResult<Self> {
        let rises = provider.rises_at_location(location, target);
        let circumpolar = provider.circumpolar_at_location(location, target);
        let mut daily = Self {
            date,
            rising: None,
            transit: None,
            setting: None,
            circumpolar,
            rises,
        };
        if !rises {
            return Ok(daily);
        }

        let curve = provider.hourly_altitudes_for_day(location, target, date)?;
        let refiner = provider.refiner(location, target);
        let solver = CircumstanceSolver::with_settings(&refiner, settings);

        daily.transit = solver.find_transit(&curve)?.map(|s| s.time());
        if !circumpolar {
            daily.rising = solver.find_rising(&curve)?.map(|s| s.time());
            daily.setting = solver.find_setting(&curve)?.map(|s| s.time());
        }
        Ok(daily)
    }
}
