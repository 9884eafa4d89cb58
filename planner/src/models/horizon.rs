//! Horizon definitions: the altitude a target must reach to count as visible.

use qtty::Degrees;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};
use crate::models::AltitudeAtTime;

/// Policy mapping a sample to the altitude threshold counted as "visible".
pub trait HorizonDefinition {
    /// Threshold altitude for the position described by `sample`.
    fn target_altitude(&self, sample: &AltitudeAtTime) -> Degrees;

    /// Whether the sample is at or above the threshold.
    fn is_above(&self, sample: &AltitudeAtTime) -> bool {
        sample.altitude().value() >= self.target_altitude(sample).value()
    }
}

/// Flat horizon at a fixed minimum altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinimumAltitudeHorizon {
    minimum: Degrees,
}

impl MinimumAltitudeHorizon {
    pub fn new(minimum: Degrees) -> Self {
        Self { minimum }
    }

    pub fn minimum(&self) -> Degrees {
        self.minimum
    }
}

impl HorizonDefinition for MinimumAltitudeHorizon {
    fn target_altitude(&self, _sample: &AltitudeAtTime) -> Degrees {
        self.minimum
    }
}

/// One measured point of a local horizon profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonPoint {
    pub azimuth: Degrees,
    pub altitude: Degrees,
}

impl HorizonPoint {
    pub fn new(azimuth: Degrees, altitude: Degrees) -> Self {
        Self { azimuth, altitude }
    }
}

/// Azimuth-dependent horizon.
///
/// The profile is linearly interpolated between points (wrapping through
/// north), raised by `offset`, and never allowed below `minimum`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCustomHorizon")]
pub struct CustomHorizon {
    points: Vec<HorizonPoint>,
    offset: Degrees,
    minimum: Degrees,
}

impl CustomHorizon {
    /// Build a horizon profile.
    ///
    /// # Errors
    /// Returns [`PlannerError::Configuration`] for an empty profile or a point
    /// with an azimuth outside `[0, 360)`.
    pub fn new(
        mut points: Vec<HorizonPoint>,
        offset: Degrees,
        minimum: Degrees,
    ) -> PlannerResult<Self> {
        if points.is_empty() {
            return Err(PlannerError::Configuration(
                "custom horizon requires at least one point".to_string(),
            ));
        }
        if let Some(p) = points
            .iter()
            .find(|p| !(0.0..360.0).contains(&p.azimuth.value()))
        {
            return Err(PlannerError::Configuration(format!(
                "horizon azimuth {} outside [0, 360)",
                p.azimuth.value()
            )));
        }
        points.sort_by(|a, b| a.azimuth.value().total_cmp(&b.azimuth.value()));
        Ok(Self {
            points,
            offset,
            minimum,
        })
    }

    pub fn points(&self) -> &[HorizonPoint] {
        &self.points
    }

    /// Interpolated profile altitude at `azimuth`, before offset and floor.
    pub fn profile_altitude(&self, azimuth: Degrees) -> Degrees {
        let az = azimuth.value().rem_euclid(360.0);
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];

        let (lo, hi, lo_az, hi_az) = match self
            .points
            .windows(2)
            .find(|w| az >= w[0].azimuth.value() && az < w[1].azimuth.value())
        {
            Some(w) => (w[0], w[1], w[0].azimuth.value(), w[1].azimuth.value()),
            None => {
                // Wrap segment from the last point through north to the first.
                let hi_az = first.azimuth.value() + 360.0;
                let az_unwrapped = if az < first.azimuth.value() { az + 360.0 } else { az };
                return Degrees::new(interpolate(
                    last.azimuth.value(),
                    last.altitude.value(),
                    hi_az,
                    first.altitude.value(),
                    az_unwrapped,
                ));
            }
        };
        Degrees::new(interpolate(
            lo_az,
            lo.altitude.value(),
            hi_az,
            hi.altitude.value(),
            az,
        ))
    }
}

#[derive(Deserialize)]
struct RawCustomHorizon {
    points: Vec<HorizonPoint>,
    offset: Degrees,
    minimum: Degrees,
}

impl TryFrom<RawCustomHorizon> for CustomHorizon {
    type Error = PlannerError;

    fn try_from(raw: RawCustomHorizon) -> PlannerResult<Self> {
        Self::new(raw.points, raw.offset, raw.minimum)
    }
}

fn interpolate(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    if (x1 - x0).abs() < f64::EPSILON {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

impl HorizonDefinition for CustomHorizon {
    fn target_altitude(&self, sample: &AltitudeAtTime) -> Degrees {
        let raised = self.profile_altitude(sample.azimuth()).value() + self.offset.value();
        Degrees::new(raised.max(self.minimum.value()))
    }
}
