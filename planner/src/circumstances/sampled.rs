//! Function-backed ephemeris.
//!
//! [`SampledEphemeris`] turns any `time -> (altitude, azimuth)` function into
//! an [`EphemerisProvider`]. It performs no astronomy of its own; hosts plug
//! their real ephemeris in here, and tests and benches use synthetic curves.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use qtty::Degrees;

use crate::circumstances::imaging::EphemerisProvider;
use crate::circumstances::solver::AltitudeRefiner;
use crate::error::{PlannerError, PlannerResult};
use crate::models::{AltitudeAtTime, Altitudes, ObserverLocation, TargetCoordinates};

type PositionFn = dyn Fn(DateTime<Utc>) -> (f64, f64) + Send + Sync;

/// Samples a position function at a fixed step.
#[derive(Clone)]
pub struct SampledEphemeris {
    position: Arc<PositionFn>,
    sample_step: Duration,
}

impl std::fmt::Debug for SampledEphemeris {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampledEphemeris")
            .field("sample_step", &self.sample_step)
            .finish_non_exhaustive()
    }
}

impl SampledEphemeris {
    /// `position` returns `(altitude, azimuth)` in degrees at a given time.
    pub fn new<F>(position: F) -> Self
    where
        F: Fn(DateTime<Utc>) -> (f64, f64) + Send + Sync + 'static,
    {
        Self {
            position: Arc::new(position),
            sample_step: Duration::hours(1),
        }
    }

    /// Spacing of samples produced by [`EphemerisProvider::altitudes`].
    pub fn with_sample_step(mut self, step: Duration) -> PlannerResult<Self> {
        if step <= Duration::zero() {
            return Err(PlannerError::Configuration(
                "sample step must be positive".to_string(),
            ));
        }
        self.sample_step = step;
        Ok(self)
    }

    pub fn sample(&self, time: DateTime<Utc>) -> AltitudeAtTime {
        let (altitude, azimuth) = (self.position)(time);
        AltitudeAtTime::new(Degrees::new(altitude), Degrees::new(azimuth), time)
    }
}

impl AltitudeRefiner for SampledEphemeris {
    fn refine(&self, step: &Altitudes, num_points: usize) -> PlannerResult<Altitudes> {
        let start = step.start_time();
        let end = step.end_time();
        let divisions = i32::try_from(num_points + 1).map_err(|_| {
            PlannerError::InvalidRefinement(format!("{} points is too many", num_points))
        })?;
        let width = (end - start) / divisions;
        if width <= Duration::zero() {
            return Err(PlannerError::InvalidRefinement(format!(
                "bracket {} -> {} too narrow for {} points",
                start, end, num_points
            )));
        }

        let mut samples = Vec::with_capacity(num_points + 2);
        samples.push(step.first());
        samples.extend((1..divisions).map(|i| self.sample(start + width * i)));
        samples.push(step.last());
        Altitudes::new(samples)
    }
}

impl EphemerisProvider for SampledEphemeris {
    type Refiner = SampledEphemeris;

    fn refiner(&self, _location: &ObserverLocation, _target: &TargetCoordinates) -> Self::Refiner {
        self.clone()
    }

    fn altitudes(
        &self,
        _location: &ObserverLocation,
        _target: &TargetCoordinates,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> PlannerResult<Altitudes> {
        if start >= end {
            return Err(PlannerError::time_range(start, end));
        }
        let mut samples = Vec::new();
        let mut time = start;
        while time < end {
            samples.push(self.sample(time));
            time += self.sample_step;
        }
        samples.push(self.sample(end));
        Altitudes::new(samples)
    }

    fn hourly_altitudes_for_day(
        &self,
        _location: &ObserverLocation,
        _target: &TargetCoordinates,
        date: NaiveDate,
    ) -> PlannerResult<Altitudes> {
        let midnight = date.and_time(chrono::NaiveTime::MIN).and_utc();
        let samples = (0..24)
            .map(|h| self.sample(midnight + Duration::hours(h)))
            .collect();
        Altitudes::circular(samples, Duration::hours(24))
    }
}
