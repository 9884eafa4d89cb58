//! Altitude samples and ordered sample sequences.
//!
//! An [`Altitudes`] sequence is either *linear* (a span of the night, or a
//! refined bracket) or *circular* (a full day curve whose last sample is
//! followed by the first sample of the next day). The circular case is an
//! explicit property of the sequence: the wrap period is stored, and indexing
//! past either end shifts the wrapped sample by whole periods so that every
//! adjacent pair handed to event detection is chronologically increasing.

use chrono::{DateTime, Duration, Utc};
use qtty::Degrees;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};

/// A single altitude sample of a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AltitudeAtTime {
    altitude: Degrees,
    azimuth: Degrees,
    time: DateTime<Utc>,
}

impl AltitudeAtTime {
    pub fn new(altitude: Degrees, azimuth: Degrees, time: DateTime<Utc>) -> Self {
        Self {
            altitude,
            azimuth,
            time,
        }
    }

    /// Altitude above the mathematical horizon; negative is below.
    pub fn altitude(&self) -> Degrees {
        self.altitude
    }

    pub fn azimuth(&self) -> Degrees {
        self.azimuth
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Same position, moved in time. Used when a circular sequence wraps.
    pub(crate) fn shifted(self, by: Duration) -> Self {
        Self {
            time: self.time + by,
            ..self
        }
    }
}

/// Ordered, non-empty sequence of altitude samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Altitudes {
    samples: Vec<AltitudeAtTime>,
    wrap_period: Option<Duration>,
}

impl Altitudes {
    /// Create a linear sequence.
    ///
    /// # Errors
    /// Returns [`PlannerError::InvalidAltitudes`] if `samples` is empty or the
    /// sample times are not strictly increasing.
    pub fn new(samples: Vec<AltitudeAtTime>) -> PlannerResult<Self> {
        validate_samples(&samples)?;
        Ok(Self {
            samples,
            wrap_period: None,
        })
    }

    /// Create a circular sequence that repeats every `period`.
    ///
    /// The period must be strictly longer than the span covered by the
    /// samples, otherwise the wrap pair would run backwards in time.
    pub fn circular(samples: Vec<AltitudeAtTime>, period: Duration) -> PlannerResult<Self> {
        validate_samples(&samples)?;
        let span = samples[samples.len() - 1].time - samples[0].time;
        if period <= span {
            return Err(PlannerError::InvalidAltitudes(format!(
                "wrap period of {}s does not exceed sample span of {}s",
                period.num_seconds(),
                span.num_seconds()
            )));
        }
        Ok(Self {
            samples,
            wrap_period: Some(period),
        })
    }

    /// Two-sample sequence bracketing an event.
    pub fn step(first: AltitudeAtTime, second: AltitudeAtTime) -> PlannerResult<Self> {
        Self::new(vec![first, second])
    }

    pub fn samples(&self) -> &[AltitudeAtTime] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Never true for a constructed sequence.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> AltitudeAtTime {
        self.samples[0]
    }

    pub fn last(&self) -> AltitudeAtTime {
        self.samples[self.samples.len() - 1]
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.first().time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.last().time
    }

    /// Time between the first and last sample.
    pub fn span(&self) -> Duration {
        self.end_time() - self.start_time()
    }

    pub fn is_circular(&self) -> bool {
        self.wrap_period.is_some()
    }

    pub fn wrap_period(&self) -> Option<Duration> {
        self.wrap_period
    }

    /// Sample at a logical index.
    ///
    /// For linear sequences `index` must be in `0..len`. For circular
    /// sequences any index is valid: it is reduced modulo the length and the
    /// sample is shifted by one wrap period per lap.
    pub fn sample_at(&self, index: isize) -> AltitudeAtTime {
        let n = self.samples.len() as isize;
        let lap = index.div_euclid(n);
        let sample = self.samples[index.rem_euclid(n) as usize];
        match self.wrap_period {
            Some(period) if lap != 0 => sample.shifted(period * lap as i32),
            _ => sample,
        }
    }

    /// Adjacent sample pairs in scan order, including the (last, first) pair
    /// when the sequence is circular.
    pub fn pairs(&self) -> impl Iterator<Item = (AltitudeAtTime, AltitudeAtTime)> + '_ {
        let n = self.samples.len() as isize;
        let count = if self.is_circular() { n } else { n - 1 };
        (0..count).map(move |i| (self.sample_at(i), self.sample_at(i + 1)))
    }

    /// Consecutive sample triples `(previous, current, next)` in scan order.
    /// Circular sequences yield one triple centered on every sample.
    pub fn triples(
        &self,
    ) -> impl Iterator<Item = (AltitudeAtTime, AltitudeAtTime, AltitudeAtTime)> + '_ {
        let n = self.samples.len() as isize;
        let centers = if self.is_circular() { 0..n } else { 1..n - 1 };
        centers.map(move |i| {
            (
                self.sample_at(i - 1),
                self.sample_at(i),
                self.sample_at(i + 1),
            )
        })
    }
}

fn validate_samples(samples: &[AltitudeAtTime]) -> PlannerResult<()> {
    if samples.is_empty() {
        return Err(PlannerError::InvalidAltitudes(
            "sequence must contain at least one sample".to_string(),
        ));
    }
    if let Some(w) = samples.windows(2).find(|w| w[1].time <= w[0].time) {
        return Err(PlannerError::InvalidAltitudes(format!(
            "samples out of order at {} -> {}",
            w[0].time, w[1].time
        )));
    }
    if let Some(s) = samples.iter().find(|s| !s.altitude.value().is_finite()) {
        return Err(PlannerError::InvalidAltitudes(format!(
            "non-finite altitude at {}",
            s.time
        )));
    }
    Ok(())
}
