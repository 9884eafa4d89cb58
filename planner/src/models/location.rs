//! Observer site and target coordinates, validated on construction and on
//! deserialization.

use qtty::Degrees;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};

/// Observer site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct ObserverLocation {
    /// Latitude (-90 to 90)
    pub latitude: Degrees,
    /// Longitude (-180 to 180), east positive
    pub longitude: Degrees,
    /// Elevation in meters above sea level
    #[serde(default)]
    pub elevation_m: f64,
}

impl ObserverLocation {
    pub fn new(latitude: Degrees, longitude: Degrees, elevation_m: f64) -> PlannerResult<Self> {
        if !(-90.0..=90.0).contains(&latitude.value()) {
            return Err(PlannerError::InvalidLocation(
                "Latitude must be between -90 and 90 degrees".to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&longitude.value()) {
            return Err(PlannerError::InvalidLocation(
                "Longitude must be between -180 and 180 degrees".to_string(),
            ));
        }
        Ok(Self {
            latitude,
            longitude,
            elevation_m,
        })
    }

    /// Whether a target at `coordinates` ever gets above the horizon here.
    ///
    /// Pure polar geometry: a target never rises when it sits within
    /// `|latitude|` degrees of the opposite celestial pole.
    pub fn target_rises(&self, coordinates: &TargetCoordinates) -> bool {
        let lat = self.latitude.value();
        let dec = coordinates.dec.value();
        if lat >= 0.0 {
            dec > -(90.0 - lat)
        } else {
            dec < 90.0 + lat
        }
    }

    /// Whether a target at `coordinates` never sets here.
    pub fn is_circumpolar(&self, coordinates: &TargetCoordinates) -> bool {
        let lat = self.latitude.value();
        let dec = coordinates.dec.value();
        if lat >= 0.0 {
            dec > 90.0 - lat
        } else {
            dec < -(90.0 + lat)
        }
    }
}

#[derive(Deserialize)]
struct RawLocation {
    latitude: Degrees,
    longitude: Degrees,
    #[serde(default)]
    elevation_m: f64,
}

impl TryFrom<RawLocation> for ObserverLocation {
    type Error = PlannerError;

    fn try_from(raw: RawLocation) -> PlannerResult<Self> {
        Self::new(raw.latitude, raw.longitude, raw.elevation_m)
    }
}

/// Equatorial coordinates of a target (J2000).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct TargetCoordinates {
    /// Right ascension (0 to 360)
    pub ra: Degrees,
    /// Declination (-90 to 90)
    pub dec: Degrees,
}

impl TargetCoordinates {
    pub fn new(ra: Degrees, dec: Degrees) -> PlannerResult<Self> {
        if !(0.0..360.0).contains(&ra.value()) {
            return Err(PlannerError::InvalidCoordinates(
                "Right ascension must be in [0, 360) degrees".to_string(),
            ));
        }
        if !(-90.0..=90.0).contains(&dec.value()) {
            return Err(PlannerError::InvalidCoordinates(
                "Declination must be between -90 and 90 degrees".to_string(),
            ));
        }
        Ok(Self { ra, dec })
    }
}

#[derive(Deserialize)]
struct RawCoordinates {
    ra: Degrees,
    dec: Degrees,
}

impl TryFrom<RawCoordinates> for TargetCoordinates {
    type Error = PlannerError;

    fn try_from(raw: RawCoordinates) -> PlannerResult<Self> {
        Self::new(raw.ra, raw.dec)
    }
}
