mod common;

use chrono::Duration;
use common::{at, ordinal_day, within, ScriptedProvider};
use urania::forecast::{StationKind, TransitSource};
use urania::{
    generate_yearly_forecast, merge_transits, CelestialBody, ForecastConfig, MeanElementsProvider,
    Significance, StaticTransit, ZodiacSign,
};

const YEAR: i32 = 2025;

fn day(t: chrono::DateTime<chrono::Utc>) -> f64 {
    common::days_into(YEAR, t)
}

/// Mars sits at 29.5 until day 100, reaches 30.5 on day 101 and stays there.
/// Every other body is unavailable.
fn mars_only() -> ScriptedProvider {
    ScriptedProvider::new(|body, t| {
        if body != CelestialBody::Mars {
            return None;
        }
        let d = day(t);
        let lon = if d <= 99.0 {
            29.5
        } else if d >= 100.0 {
            30.5
        } else {
            29.5 + (d - 99.0)
        };
        Some(lon)
    })
}

#[test]
fn test_single_mars_ingress_between_sample_days() {
    let provider = mars_only();
    let forecast = generate_yearly_forecast(&provider, YEAR, &ForecastConfig::default()).unwrap();

    assert_eq!(forecast.ingresses.len(), 1);
    let ingress = &forecast.ingresses[0];
    assert_eq!(ingress.body, CelestialBody::Mars);
    assert_eq!(ingress.from_sign, ZodiacSign::Aries);
    assert_eq!(ingress.to_sign, ZodiacSign::Taurus);
    assert!(!ingress.is_retrograde_reentry);
    assert!(ingress.exact_timestamp > ordinal_day(YEAR, 100));
    assert!(ingress.exact_timestamp < ordinal_day(YEAR, 101));
    // Linear motion crosses 30 deg at midday.
    let noon = ordinal_day(YEAR, 100) + Duration::hours(12);
    assert!((ingress.exact_timestamp - noon).num_seconds().abs() <= 60);

    assert!(forecast.conjunctions.is_empty());
    assert!(forecast.stations.is_empty());
    assert_eq!(forecast.unavailable_bodies().len(), 9);
}

#[test]
fn test_events_group_by_month() {
    let forecast =
        generate_yearly_forecast(&mars_only(), YEAR, &ForecastConfig::default()).unwrap();
    let months = forecast.by_month();
    assert_eq!(months.len(), 12);
    assert_eq!(months.iter().map(|m| m.month).collect::<Vec<_>>(), (1..=12).collect::<Vec<_>>());

    // The crossing falls on April 10.
    let april = &months[3];
    assert_eq!(april.ingresses(), 1);
    assert_eq!(april.conjunctions() + april.stations(), 0);
    let total: usize = months.iter().map(|m| m.events.len()).sum();
    assert_eq!(total, 1);
}

#[test]
fn test_unavailable_provider_yields_no_events() {
    let provider = ScriptedProvider::new(|_, _| None);
    let forecast = generate_yearly_forecast(&provider, YEAR, &ForecastConfig::default()).unwrap();
    assert!(forecast.ingresses.is_empty());
    assert!(forecast.conjunctions.is_empty());
    assert_eq!(forecast.unavailable_bodies(), CelestialBody::ALL.to_vec());
}

#[test]
fn test_skipped_samples_are_not_sign_changes() {
    // Venus is in mid-Gemini all year but the provider drops every third day.
    let provider = ScriptedProvider::new(|body, t| {
        if body != CelestialBody::Venus {
            return None;
        }
        let d = day(t).round() as i64;
        (d % 3 != 0).then_some(75.0)
    });
    let forecast = generate_yearly_forecast(&provider, YEAR, &ForecastConfig::default()).unwrap();
    assert!(forecast.ingresses.is_empty());
    assert!(!forecast.is_complete());
}

#[test]
fn test_gap_spanning_two_signs_yields_two_ingresses() {
    // Jupiter moves from 55 to 95 while the samples on days 201 and 202 fail.
    let provider = ScriptedProvider::new(|body, t| {
        if body != CelestialBody::Jupiter {
            return None;
        }
        let d = day(t);
        if d == 201.0 || d == 202.0 {
            return None;
        }
        Some(if d <= 200.0 {
            55.0
        } else if d >= 203.0 {
            95.0
        } else {
            55.0 + (d - 200.0) * 40.0 / 3.0
        })
    });
    let forecast = generate_yearly_forecast(&provider, YEAR, &ForecastConfig::default()).unwrap();
    let signs: Vec<_> = forecast
        .ingresses
        .iter()
        .map(|i| (i.from_sign, i.to_sign))
        .collect();
    assert_eq!(
        signs,
        vec![
            (ZodiacSign::Taurus, ZodiacSign::Gemini),
            (ZodiacSign::Gemini, ZodiacSign::Cancer),
        ]
    );
    assert!(forecast.ingresses[0].exact_timestamp < forecast.ingresses[1].exact_timestamp);
}

#[test]
fn test_long_moon_outage_yields_no_ingresses_inside_it() {
    // The Moon moves forward at its mean rate but nothing is available
    // between day 100.5 and day 116.5, more than half a turn of motion.
    let provider = ScriptedProvider::new(|body, t| {
        if body != CelestialBody::Moon {
            return None;
        }
        let d = day(t);
        (!(d > 100.5 && d < 116.5)).then(|| 10.0 + 13.176 * d)
    });
    let forecast = generate_yearly_forecast(&provider, YEAR, &ForecastConfig::default()).unwrap();

    let (gap_start, gap_end) = (ordinal_day(YEAR, 101), ordinal_day(YEAR, 118));
    assert!(forecast.ingresses.len() > 100);
    for ingress in &forecast.ingresses {
        assert_eq!(ingress.body, CelestialBody::Moon);
        assert!(!ingress.is_retrograde_reentry, "{:?}", ingress);
        assert_eq!(ingress.from_sign.next(), ingress.to_sign);
        assert!(
            ingress.exact_timestamp < gap_start || ingress.exact_timestamp > gap_end,
            "ingress reported inside the outage: {:?}",
            ingress
        );
    }
    let mut times: Vec<_> = forecast.ingresses.iter().map(|i| i.exact_timestamp).collect();
    times.dedup();
    assert_eq!(times.len(), forecast.ingresses.len());
}

#[test]
fn test_unrefinable_crossing_is_dropped() {
    // Mars only answers on whole days, so the crossing on day 100 cannot
    // be narrowed down and must not be reported at a guessed time.
    let provider = ScriptedProvider::new(|body, t| {
        if body != CelestialBody::Mars {
            return None;
        }
        let d = day(t);
        (d.fract() == 0.0).then(|| if d <= 100.0 { 29.5 } else { 30.5 })
    });
    let forecast = generate_yearly_forecast(&provider, YEAR, &ForecastConfig::default()).unwrap();
    assert!(forecast.ingresses.is_empty());
    assert!(forecast.stations.is_empty());
    assert_eq!(forecast.coverage[4].skipped, 0);
}

#[test]
fn test_events_outside_the_year_are_dropped() {
    // The Sun reaches Capricorn at noon on Dec 31 of the previous year,
    // inside the scan margin.
    let provider = ScriptedProvider::new(|body, t| {
        (body == CelestialBody::Sun).then(|| 270.5 + common::days_into(YEAR, t))
    });
    let forecast = generate_yearly_forecast(&provider, YEAR, &ForecastConfig::default()).unwrap();
    let first = &forecast.ingresses[0];
    assert!(first.exact_timestamp >= ordinal_day(YEAR, 1));
    assert_eq!(first.from_sign, ZodiacSign::Capricorn);
    assert_eq!(first.to_sign, ZodiacSign::Aquarius);
    assert!((first.exact_timestamp - at(YEAR, 1, 30, 12)).num_seconds().abs() <= 60);
}

#[test]
fn test_conjunction_is_reported_once_per_pair() {
    // Mars overtakes Venus at day 150, both in Gemini.
    let provider = ScriptedProvider::new(|body, t| {
        let d = day(t);
        match body {
            CelestialBody::Venus => Some(70.0 + 0.01 * (d - 150.0)),
            CelestialBody::Mars => Some(70.0 + 0.51 * (d - 150.0) + 0.3),
            _ => None,
        }
    });
    let config = ForecastConfig::default();
    let forecast = generate_yearly_forecast(&provider, YEAR, &config).unwrap();

    assert_eq!(forecast.conjunctions.len(), 1);
    let c = &forecast.conjunctions[0];
    assert_eq!((c.body_a, c.body_b), (CelestialBody::Venus, CelestialBody::Mars));
    assert!(c.is_pair(CelestialBody::Mars, CelestialBody::Venus));
    assert_eq!(c.sign, ZodiacSign::Gemini);
    assert_eq!(c.significance, Significance::Minor);
    assert!(c.angular_separation_degrees < 0.01);
    assert!(c.angular_separation_degrees <= 180.0);
    // Closest approach at d = 149.4
    let expected = ordinal_day(YEAR, 1) + Duration::minutes((149.4 * 1440.0) as i64);
    assert!((c.timestamp - expected).num_minutes().abs() <= 5);
}

#[test]
fn test_wide_approach_is_not_a_conjunction() {
    let provider = ScriptedProvider::new(|body, t| {
        let d = day(t);
        match body {
            CelestialBody::Jupiter => Some(100.0 + 0.2 * (d - 180.0)),
            CelestialBody::Saturn => Some(112.0 + 0.02 * (d - 180.0)),
            _ => None,
        }
    });
    let forecast = generate_yearly_forecast(&provider, YEAR, &ForecastConfig::default()).unwrap();
    // They meet on day 246.7, giving one conjunction rated major.
    assert_eq!(forecast.conjunctions.len(), 1);
    assert_eq!(forecast.conjunctions[0].significance, Significance::Major);

    let narrow = ForecastConfig {
        conjunction_threshold_deg: 3.0,
        ..ForecastConfig::default()
    };
    let parallel = ScriptedProvider::new(|body, t| {
        let d = day(t);
        match body {
            CelestialBody::Jupiter => Some(100.0 + 0.05 * d),
            CelestialBody::Saturn => Some(95.0 + 0.05 * d + 0.001 * (d - 180.0).powi(2) / 100.0),
            _ => None,
        }
    });
    let forecast = generate_yearly_forecast(&parallel, YEAR, &narrow).unwrap();
    assert!(forecast.conjunctions.is_empty());
}

#[test]
fn test_invalid_config_is_rejected() {
    let provider = mars_only();
    let config = ForecastConfig {
        cadence_hours: 7,
        ..ForecastConfig::default()
    };
    assert!(generate_yearly_forecast(&provider, YEAR, &config).is_err());
}

#[test]
fn test_finer_cadence_agrees() {
    let provider = mars_only();
    let config = ForecastConfig {
        cadence_hours: 6,
        ..ForecastConfig::default()
    };
    let forecast = generate_yearly_forecast(&provider, YEAR, &config).unwrap();
    assert_eq!(forecast.ingresses.len(), 1);
    let noon = ordinal_day(YEAR, 100) + Duration::hours(12);
    assert!((forecast.ingresses[0].exact_timestamp - noon).num_seconds().abs() <= 60);
}

#[test]
fn test_merge_prefers_computed_dates() {
    let provider = mars_only();
    let forecast = generate_yearly_forecast(&provider, YEAR, &ForecastConfig::default()).unwrap();
    let authored = vec![
        StaticTransit {
            body: CelestialBody::Mars,
            to_sign: ZodiacSign::Taurus,
            title: "Mars enters Taurus".to_string(),
            description: "Slow and steady.".to_string(),
            date_hint: chrono::NaiveDate::from_ymd_opt(YEAR, 4, 1),
        },
        StaticTransit {
            body: CelestialBody::Saturn,
            to_sign: ZodiacSign::Aries,
            title: "Saturn enters Aries".to_string(),
            description: String::new(),
            date_hint: None,
        },
    ];

    let merged = merge_transits(&forecast.ingresses, &authored);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].source, TransitSource::Both);
    assert_eq!(merged[0].timestamp, Some(forecast.ingresses[0].exact_timestamp));
    assert_eq!(merged[0].title.as_deref(), Some("Mars enters Taurus"));
    assert_eq!(merged[1].source, TransitSource::Authored);
    assert_eq!(merged[1].timestamp, None);
}

// The remaining tests run the built-in ephemeris over real years.

#[test]
fn test_mean_elements_2026_outer_planet_ingresses() {
    let provider = MeanElementsProvider::new();
    let forecast = generate_yearly_forecast(&provider, 2026, &ForecastConfig::default()).unwrap();

    let find = |body, to| {
        forecast
            .ingresses
            .iter()
            .find(|i| i.body == body && i.to_sign == to && !i.is_retrograde_reentry)
            .map(|i| i.exact_timestamp)
    };
    let expected = [
        (CelestialBody::Neptune, ZodiacSign::Aries, at(2026, 1, 27, 0)),
        (CelestialBody::Saturn, ZodiacSign::Aries, at(2026, 2, 13, 0)),
        (CelestialBody::Uranus, ZodiacSign::Gemini, at(2026, 4, 26, 0)),
        (CelestialBody::Jupiter, ZodiacSign::Leo, at(2026, 6, 30, 0)),
    ];
    for (body, sign, date) in expected {
        let found = find(body, sign).unwrap();
        assert!(within(found, date, 3), "{body} into {sign} at {found}");
    }

    let saturn_neptune = forecast
        .conjunctions
        .iter()
        .find(|c| c.is_pair(CelestialBody::Saturn, CelestialBody::Neptune))
        .unwrap();
    assert_eq!(saturn_neptune.significance, Significance::Major);
    assert_eq!(saturn_neptune.sign, ZodiacSign::Aries);
    assert!(within(saturn_neptune.timestamp, at(2026, 2, 20, 0), 2));
    assert!(saturn_neptune.angular_separation_degrees < 0.1);

    assert!(!forecast
        .conjunctions
        .iter()
        .any(|c| c.is_pair(CelestialBody::Jupiter, CelestialBody::Saturn)));

    for pair in forecast.ingresses.windows(2) {
        assert!(pair[0].exact_timestamp < pair[1].exact_timestamp);
    }
    for pair in forecast.conjunctions.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
    assert!(forecast.is_complete());
}

#[test]
fn test_mean_elements_2024_mercury_retrogrades() {
    let provider = MeanElementsProvider::new();
    let forecast = generate_yearly_forecast(&provider, 2024, &ForecastConfig::default()).unwrap();

    let mercury: Vec<_> = forecast
        .stations
        .iter()
        .filter(|s| s.body == CelestialBody::Mercury)
        .collect();
    let retro: Vec<_> = mercury
        .iter()
        .filter(|s| s.kind == StationKind::Retrograde)
        .map(|s| s.timestamp)
        .collect();
    assert_eq!(retro.len(), 3);
    assert!(within(retro[0], at(2024, 4, 2, 0), 2));
    assert!(within(retro[1], at(2024, 8, 5, 0), 2));
    assert!(within(retro[2], at(2024, 11, 26, 0), 2));

    // Mercury backs out of Virgo into Leo in mid-August.
    let reentry = forecast
        .ingresses
        .iter()
        .find(|i| i.body == CelestialBody::Mercury && i.is_retrograde_reentry)
        .unwrap();
    assert_eq!(
        (reentry.from_sign, reentry.to_sign),
        (ZodiacSign::Virgo, ZodiacSign::Leo)
    );
    assert!(within(reentry.exact_timestamp, at(2024, 8, 15, 0), 2));

    let summer = forecast
        .retrograde_periods
        .iter()
        .find(|p| {
            p.body == CelestialBody::Mercury && p.start.map_or(false, |s| s > at(2024, 7, 1, 0))
        })
        .unwrap();
    assert!(summer.changes_sign());
    assert!(forecast.stations.iter().all(|s| s.body.can_station()));

    let solstice = forecast
        .ingresses
        .iter()
        .find(|i| i.body == CelestialBody::Sun && i.to_sign == ZodiacSign::Cancer)
        .unwrap();
    assert!(solstice.season.is_some());
    assert!(within(solstice.exact_timestamp, at(2024, 6, 20, 21), 1));
}
