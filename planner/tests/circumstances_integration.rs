//! Integration tests for event solving and nightly visibility windows.

use std::f64::consts::PI;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use qtty::Degrees;
use target_planner::circumstances::{
    CircumstanceSolver, DailyCircumstances, EphemerisProvider, ImagingCircumstances,
    SampledEphemeris, SolverSettings, VisibilityStatus,
};
use target_planner::models::{
    Altitudes, CustomHorizon, HorizonPoint, MinimumAltitudeHorizon, ObserverLocation,
    TargetCoordinates,
};
use target_planner::PlannerError;

const PEAK: f64 = 40.0;
const BASE: f64 = 10.0;

/// Altitude oscillates between -30 and 50 degrees with a 24h period, peaking
/// at `transit`. Azimuth sweeps 15 degrees per hour.
fn sinusoid(transit: DateTime<Utc>) -> SampledEphemeris {
    SampledEphemeris::new(move |t| {
        let hours = (t - transit).num_milliseconds() as f64 / 3_600_000.0;
        let altitude = PEAK * (2.0 * PI * hours / 24.0).cos() + BASE;
        let azimuth = (180.0 + hours * 15.0).rem_euclid(360.0);
        (altitude, azimuth)
    })
}

/// Hours from transit at which the sinusoid crosses `altitude`.
fn half_width(altitude: f64) -> Duration {
    let hours = ((altitude - BASE) / PEAK).acos() * 24.0 / (2.0 * PI);
    Duration::milliseconds((hours * 3_600_000.0) as i64)
}

fn la_palma() -> ObserverLocation {
    ObserverLocation::new(Degrees::new(28.7624), Degrees::new(-17.8892), 2396.0).unwrap()
}

fn m42() -> TargetCoordinates {
    TargetCoordinates::new(Degrees::new(83.82), Degrees::new(-5.39)).unwrap()
}

fn midnight() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap()
}

fn tolerance() -> Duration {
    Duration::seconds(60)
}

#[test]
fn test_full_night_window() {
    let ephemeris = sinusoid(midnight());
    let horizon = MinimumAltitudeHorizon::new(Degrees::new(32.0));
    let start = midnight() - Duration::hours(6);
    let end = midnight() + Duration::hours(6);

    let circumstances = ImagingCircumstances::analyze(
        &ephemeris,
        &la_palma(),
        &m42(),
        start,
        end,
        &horizon,
        SolverSettings::default(),
    )
    .unwrap();

    assert_eq!(circumstances.status(), VisibilityStatus::PotentiallyVisible);

    let expected_rise = midnight() - half_width(32.0);
    let rise = circumstances.rise_above_minimum_time().unwrap();
    assert!(rise >= expected_rise, "rise {} before {}", rise, expected_rise);
    assert!(rise - expected_rise <= tolerance());

    let expected_set = midnight() + half_width(32.0);
    let set = circumstances.set_below_minimum_time().unwrap();
    assert!(set <= expected_set, "set {} after {}", set, expected_set);
    assert!(expected_set - set <= tolerance());

    let transit = circumstances.transit_time().unwrap();
    assert!((transit - midnight()).num_seconds().abs() <= 120);

    assert_eq!(circumstances.visible_window(), Some((rise, set)));
}

#[test]
fn test_window_clipped_when_already_up() {
    let ephemeris = sinusoid(midnight());
    let horizon = MinimumAltitudeHorizon::new(Degrees::new(32.0));
    let start = midnight() - Duration::minutes(90);
    let end = midnight() + Duration::hours(6);

    let circumstances = ImagingCircumstances::analyze(
        &ephemeris,
        &la_palma(),
        &m42(),
        start,
        end,
        &horizon,
        SolverSettings::default(),
    )
    .unwrap();

    assert!(circumstances.is_visible());
    assert_eq!(circumstances.rise_above_minimum_time(), None);
    assert_eq!(circumstances.clipped_rise_time(), Some(start));
    assert!(circumstances.clipped_set_time().unwrap() < end);
}

#[test]
fn test_window_clipped_when_still_up() {
    let ephemeris = sinusoid(midnight());
    let horizon = MinimumAltitudeHorizon::new(Degrees::new(32.0));
    let start = midnight() - Duration::hours(6);
    let end = midnight() + Duration::hours(2);

    let circumstances = ImagingCircumstances::analyze(
        &ephemeris,
        &la_palma(),
        &m42(),
        start,
        end,
        &horizon,
        SolverSettings::default(),
    )
    .unwrap();

    assert_eq!(circumstances.set_below_minimum_time(), None);
    assert_eq!(circumstances.clipped_set_time(), Some(end));
}

#[test]
fn test_never_above_minimum_altitude() {
    let ephemeris = sinusoid(midnight());
    let horizon = MinimumAltitudeHorizon::new(Degrees::new(60.0));
    let circumstances = ImagingCircumstances::analyze(
        &ephemeris,
        &la_palma(),
        &m42(),
        midnight() - Duration::hours(6),
        midnight() + Duration::hours(6),
        &horizon,
        SolverSettings::default(),
    )
    .unwrap();

    assert_eq!(
        circumstances.status(),
        VisibilityStatus::NeverAboveMinimumAltitude
    );
    assert_eq!(circumstances.clipped_rise_time(), None);
    assert_eq!(circumstances.visible_window(), None);
}

#[test]
fn test_never_visible_from_site() {
    let ephemeris = sinusoid(midnight());
    let horizon = MinimumAltitudeHorizon::new(Degrees::new(0.0));
    let south_pole_target =
        TargetCoordinates::new(Degrees::new(80.0), Degrees::new(-80.0)).unwrap();
    let circumstances = ImagingCircumstances::analyze(
        &ephemeris,
        &la_palma(),
        &south_pole_target,
        midnight() - Duration::hours(6),
        midnight() + Duration::hours(6),
        &horizon,
        SolverSettings::default(),
    )
    .unwrap();

    assert_eq!(circumstances.status(), VisibilityStatus::NeverVisible);
    assert!(!circumstances.is_visible());
}

#[test]
fn test_rejects_reversed_window() {
    let ephemeris = sinusoid(midnight());
    let horizon = MinimumAltitudeHorizon::new(Degrees::new(32.0));
    let result = ImagingCircumstances::analyze(
        &ephemeris,
        &la_palma(),
        &m42(),
        midnight(),
        midnight(),
        &horizon,
        SolverSettings::default(),
    );
    assert!(matches!(result, Err(PlannerError::InvalidTimeRange { .. })));
}

#[test]
fn test_custom_horizon_delays_rise() {
    let ephemeris = sinusoid(midnight());
    let flat = MinimumAltitudeHorizon::new(Degrees::new(20.0));
    // Trees in the east (azimuths the target rises through) push the
    // effective horizon to 35 degrees.
    let trees = CustomHorizon::new(
        vec![
            HorizonPoint::new(Degrees::new(0.0), Degrees::new(35.0)),
            HorizonPoint::new(Degrees::new(180.0), Degrees::new(35.0)),
            HorizonPoint::new(Degrees::new(181.0), Degrees::new(10.0)),
            HorizonPoint::new(Degrees::new(359.0), Degrees::new(10.0)),
        ],
        Degrees::new(0.0),
        Degrees::new(20.0),
    )
    .unwrap();

    let analyze = |horizon: &dyn target_planner::models::HorizonDefinition| {
        ImagingCircumstances::analyze(
            &ephemeris,
            &la_palma(),
            &m42(),
            midnight() - Duration::hours(6),
            midnight() + Duration::hours(6),
            horizon,
            SolverSettings::default(),
        )
        .unwrap()
    };

    let flat_rise = analyze(&flat).rise_above_minimum_time().unwrap();
    let tree_rise = analyze(&trees).rise_above_minimum_time().unwrap();
    assert!(tree_rise > flat_rise);
    let expected = midnight() - half_width(35.0);
    assert!(tree_rise >= expected && tree_rise - expected <= tolerance());
}

#[test]
fn test_daily_rising_found_across_midnight() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let day_start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
    let transit = day_start + Duration::minutes(390);
    let ephemeris = sinusoid(transit);

    let daily = DailyCircumstances::for_day(
        &ephemeris,
        &la_palma(),
        &m42(),
        date,
        SolverSettings::default(),
    )
    .unwrap();

    assert!(daily.rises);
    assert!(!daily.circumpolar);

    // The rise before the 06:30 transit falls in the previous evening, so on
    // this day's circular curve it is found in the 23:00 -> 24:00 wrap pair.
    let expected_rise = transit - half_width(0.0) + Duration::hours(24);
    let rising = daily.rising.unwrap();
    assert!(rising >= expected_rise && rising - expected_rise <= tolerance());

    let expected_set = transit + half_width(0.0);
    let setting = daily.setting.unwrap();
    assert!(setting <= expected_set && expected_set - setting <= tolerance());

    let found_transit = daily.transit.unwrap();
    assert!((found_transit - transit).num_seconds().abs() <= 120);
}

#[test]
fn test_daily_circumpolar_has_no_rise_or_set() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let ephemeris = sinusoid(midnight());
    let kochab = TargetCoordinates::new(Degrees::new(222.68), Degrees::new(74.16)).unwrap();

    let daily = DailyCircumstances::for_day(
        &ephemeris,
        &la_palma(),
        &kochab,
        date,
        SolverSettings::default(),
    )
    .unwrap();

    assert!(daily.circumpolar);
    assert_eq!(daily.rising, None);
    assert_eq!(daily.setting, None);
    assert!(daily.transit.is_some());
}

#[test]
fn test_no_event_in_monotonic_span() {
    let ephemeris = sinusoid(midnight());
    let curve = ephemeris
        .altitudes(
            &la_palma(),
            &m42(),
            midnight() - Duration::hours(3),
            midnight() - Duration::hours(1),
        )
        .unwrap();
    let refiner = ephemeris.refiner(&la_palma(), &m42());
    let solver = CircumstanceSolver::new(&refiner);

    assert_eq!(solver.find_setting(&curve).unwrap(), None);
    assert_eq!(solver.find_transit(&curve).unwrap(), None);
    assert_eq!(solver.find_rising(&curve).unwrap(), None);
}

fn ramp(crossing: DateTime<Utc>, rate: f64) -> SampledEphemeris {
    SampledEphemeris::new(move |t| {
        let hours = (t - crossing).num_milliseconds() as f64 / 3_600_000.0;
        (hours * rate, 90.0)
    })
}

fn hourly(ephemeris: &SampledEphemeris, start: DateTime<Utc>) -> Altitudes {
    ephemeris
        .altitudes(&la_palma(), &m42(), start, start + Duration::hours(6))
        .unwrap()
}

proptest! {
    #[test]
    fn prop_rising_reported_just_after_crossing(
        offset in 1i64..(6 * 3600 - 1),
        rate in 1.0f64..30.0,
    ) {
        let start = midnight() - Duration::hours(6);
        let crossing = start + Duration::seconds(offset);
        let ephemeris = ramp(crossing, rate);
        let solver = CircumstanceSolver::new(&ephemeris);

        let found = solver.find_rising(&hourly(&ephemeris, start)).unwrap().unwrap();
        prop_assert!(found.altitude().value() > 0.0);
        prop_assert!(found.time() >= crossing);
        prop_assert!(found.time() - crossing <= tolerance());
    }

    #[test]
    fn prop_setting_reported_just_before_crossing(
        offset in 1i64..(6 * 3600 - 1),
        rate in 1.0f64..30.0,
    ) {
        let start = midnight() - Duration::hours(6);
        let crossing = start + Duration::seconds(offset);
        let ephemeris = ramp(crossing, -rate);
        let solver = CircumstanceSolver::new(&ephemeris);

        let found = solver.find_setting(&hourly(&ephemeris, start)).unwrap().unwrap();
        prop_assert!(found.altitude().value() >= 0.0);
        prop_assert!(found.time() <= crossing);
        prop_assert!(crossing - found.time() <= tolerance());
    }

    #[test]
    fn prop_finer_final_step_is_respected(
        offset in 1i64..(6 * 3600 - 1),
        final_step in 5i64..120,
    ) {
        let start = midnight() - Duration::hours(6);
        let crossing = start + Duration::seconds(offset);
        let ephemeris = ramp(crossing, 10.0);
        let settings = SolverSettings {
            max_final_step: Duration::seconds(final_step),
            ..SolverSettings::default()
        };
        let solver = CircumstanceSolver::with_settings(&ephemeris, settings);

        let found = solver.find_rising(&hourly(&ephemeris, start)).unwrap().unwrap();
        prop_assert!(found.time() >= crossing);
        prop_assert!(found.time() - crossing <= Duration::seconds(final_step));
    }
}
