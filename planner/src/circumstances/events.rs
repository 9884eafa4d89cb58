//! Event-detection functions.
//!
//! Each function scans an [`Altitudes`] sequence for the first adjacent
//! bracket in which its directional condition flips, and returns that bracket
//! as a two-sample sequence. Circular sequences are scanned through the
//! wraparound pair as well. `None` means the event does not occur in the
//! supplied span.

use std::fmt;

use crate::models::{AltitudeAtTime, Altitudes, HorizonDefinition};

/// The named altitude events the solver can locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Rising,
    Setting,
    Transit,
    RiseAboveMinimum,
    SetBelowMinimum,
}

/// Which sample of the final bracket reports the event time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketSide {
    /// First sample: last instant still on the visible side.
    Leading,
    /// Second sample: first instant past the crossing.
    Trailing,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Setting => "setting",
            Self::Transit => "transit",
            Self::RiseAboveMinimum => "rise above minimum",
            Self::SetBelowMinimum => "set below minimum",
        }
    }

    pub fn reported_side(&self) -> BracketSide {
        match self {
            Self::Rising | Self::Transit | Self::RiseAboveMinimum => BracketSide::Trailing,
            Self::Setting | Self::SetBelowMinimum => BracketSide::Leading,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An event-detection function, carrying the horizon for threshold events.
#[derive(Clone, Copy)]
pub enum EventFunction<'h> {
    /// Altitude goes from `<= 0` to `> 0`.
    Rising,
    /// Altitude goes from `>= 0` to `< 0`.
    Setting,
    /// Altitude stops increasing and starts decreasing.
    Transit,
    /// Altitude goes from below the horizon threshold to at/above it.
    RiseAboveMinimum(&'h dyn HorizonDefinition),
    /// Altitude goes from at/above the horizon threshold to below it.
    SetBelowMinimum(&'h dyn HorizonDefinition),
}

impl fmt::Debug for EventFunction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventFunction({})", self.kind())
    }
}

impl<'h> EventFunction<'h> {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Rising => EventKind::Rising,
            Self::Setting => EventKind::Setting,
            Self::Transit => EventKind::Transit,
            Self::RiseAboveMinimum(_) => EventKind::RiseAboveMinimum,
            Self::SetBelowMinimum(_) => EventKind::SetBelowMinimum,
        }
    }

    /// Find the first bracket in which the event occurs.
    ///
    /// For crossing events the bracket is the adjacent pair whose condition
    /// flips. For transit it is the pair of samples on either side of the
    /// local maximum, so that the maximum itself lies inside the bracket.
    pub fn determine_step(&self, altitudes: &Altitudes) -> Option<Altitudes> {
        let (first, second) = match self {
            Self::Transit => altitudes
                .triples()
                .find(|(prev, cur, next)| is_local_maximum(prev, cur, next))
                .map(|(prev, _, next)| (prev, next))?,
            _ => altitudes.pairs().find(|(prev, next)| self.crosses(prev, next))?,
        };
        Altitudes::step(first, second).ok()
    }

    fn crosses(&self, prev: &AltitudeAtTime, next: &AltitudeAtTime) -> bool {
        let (p, n) = (prev.altitude().value(), next.altitude().value());
        match self {
            Self::Rising => p <= 0.0 && n > 0.0,
            Self::Setting => p >= 0.0 && n < 0.0,
            Self::RiseAboveMinimum(horizon) => !horizon.is_above(prev) && horizon.is_above(next),
            Self::SetBelowMinimum(horizon) => horizon.is_above(prev) && !horizon.is_above(next),
            Self::Transit => false,
        }
    }
}

fn is_local_maximum(prev: &AltitudeAtTime, cur: &AltitudeAtTime, next: &AltitudeAtTime) -> bool {
    let rising = cur.altitude().value() - prev.altitude().value();
    let falling = next.altitude().value() - cur.altitude().value();
    rising >= 0.0 && falling < 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomHorizon, HorizonPoint, MinimumAltitudeHorizon};
    use chrono::{Duration, TimeZone, Utc};
    use qtty::Degrees;

    fn curve(altitudes: &[f64]) -> Vec<AltitudeAtTime> {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        altitudes
            .iter()
            .enumerate()
            .map(|(i, alt)| {
                AltitudeAtTime::new(
                    Degrees::new(*alt),
                    Degrees::new(i as f64 * 15.0),
                    start + Duration::hours(i as i64),
                )
            })
            .collect()
    }

    fn linear(altitudes: &[f64]) -> Altitudes {
        Altitudes::new(curve(altitudes)).unwrap()
    }

    #[test]
    fn test_rising_bracket() {
        let step = EventFunction::Rising
            .determine_step(&linear(&[-10.0, -5.0, 0.0, 5.0, 10.0]))
            .unwrap();
        assert_eq!(step.len(), 2);
        assert_eq!(step.first().altitude().value(), 0.0);
        assert_eq!(step.last().altitude().value(), 5.0);
    }

    #[test]
    fn test_setting_bracket() {
        let step = EventFunction::Setting
            .determine_step(&linear(&[10.0, 5.0, 0.0, -5.0]))
            .unwrap();
        assert_eq!(step.first().altitude().value(), 0.0);
        assert_eq!(step.last().altitude().value(), -5.0);
    }

    #[test]
    fn test_transit_brackets_the_maximum() {
        let step = EventFunction::Transit
            .determine_step(&linear(&[10.0, 20.0, 30.0, 25.0, 15.0]))
            .unwrap();
        assert_eq!(step.first().altitude().value(), 20.0);
        assert_eq!(step.last().altitude().value(), 25.0);
        assert_eq!(step.span(), Duration::hours(2));
    }

    #[test]
    fn test_no_event_in_span() {
        let always_up = linear(&[10.0, 20.0, 30.0]);
        assert!(EventFunction::Rising.determine_step(&always_up).is_none());
        assert!(EventFunction::Setting.determine_step(&always_up).is_none());
        assert!(EventFunction::Transit.determine_step(&always_up).is_none());
    }

    #[test]
    fn test_rising_found_through_wraparound() {
        // Up all day except the last hour; it rises again between the last
        // sample and the first sample of the next day.
        let mut alts = vec![5.0; 24];
        alts[22] = -3.0;
        alts[23] = -1.0;
        let samples = curve(&alts);
        let first_time = samples[0].time();
        let day = Altitudes::circular(samples, Duration::hours(24)).unwrap();

        let step = EventFunction::Rising.determine_step(&day).unwrap();
        assert_eq!(step.first().altitude().value(), -1.0);
        assert_eq!(step.last().time(), first_time + Duration::hours(24));

        let linear_day = Altitudes::new(curve(&alts)).unwrap();
        assert!(EventFunction::Rising.determine_step(&linear_day).is_none());
    }

    #[test]
    fn test_transit_at_day_boundary() {
        let mut alts: Vec<f64> = (0..24).map(|h| 40.0 - f64::from(h)).collect();
        alts[23] = 39.5;
        let day = Altitudes::circular(curve(&alts), Duration::hours(24)).unwrap();
        let step = EventFunction::Transit.determine_step(&day).unwrap();
        // Maximum is the first sample; bracket runs from the wrapped last
        // sample (previous day) to the second sample.
        assert_eq!(step.first().altitude().value(), 39.5);
        assert_eq!(step.last().altitude().value(), 39.0);
    }

    #[test]
    fn test_threshold_events_use_horizon() {
        let horizon = MinimumAltitudeHorizon::new(Degrees::new(20.0));
        let alts = linear(&[10.0, 15.0, 20.0, 30.0, 25.0, 19.0]);

        let rise = EventFunction::RiseAboveMinimum(&horizon)
            .determine_step(&alts)
            .unwrap();
        assert_eq!(rise.first().altitude().value(), 15.0);
        assert_eq!(rise.last().altitude().value(), 20.0);

        let set = EventFunction::SetBelowMinimum(&horizon)
            .determine_step(&alts)
            .unwrap();
        assert_eq!(set.first().altitude().value(), 25.0);
        assert_eq!(set.last().altitude().value(), 19.0);
    }

    #[test]
    fn test_threshold_events_follow_azimuth() {
        // Samples step 15° in azimuth per hour; horizon is high in the east.
        let horizon = CustomHorizon::new(
            vec![
                HorizonPoint::new(Degrees::new(0.0), Degrees::new(40.0)),
                HorizonPoint::new(Degrees::new(45.0), Degrees::new(10.0)),
            ],
            Degrees::new(0.0),
            Degrees::new(0.0),
        )
        .unwrap();
        let alts = linear(&[31.0, 31.0, 31.0, 31.0]);
        let step = EventFunction::RiseAboveMinimum(&horizon)
            .determine_step(&alts)
            .unwrap();
        // 0° -> 40, 15° -> 30, so the crossing is between sample 0 and 1.
        assert_eq!(step.first().azimuth().value(), 0.0);
        assert_eq!(step.last().azimuth().value(), 15.0);
    }

    #[test]
    fn test_reported_sides() {
        assert_eq!(EventKind::Rising.reported_side(), BracketSide::Trailing);
        assert_eq!(EventKind::Transit.reported_side(), BracketSide::Trailing);
        assert_eq!(EventKind::Setting.reported_side(), BracketSide::Leading);
        assert_eq!(EventKind::SetBelowMinimum.reported_side(), BracketSide::Leading);
        assert_eq!(EventKind::RiseAboveMinimum.to_string(), "rise above minimum");
    }
}
