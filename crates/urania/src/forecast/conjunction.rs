use chrono::{DateTime, Utc};
use log::debug;

use super::sampling::{BodyTrack, YearWindow};
use super::search::{golden_section_min, Minimum};
use super::types::{Conjunction, ForecastConfig, Significance};
use crate::ephemeris::provider::checked_longitude;
use crate::ephemeris::{CelestialBody, PositionProvider};
use crate::zodiac::{circular_midpoint, separation, ZodiacSign};

/// Find conjunctions for every unordered pair of tracks.
///
/// Each pair is visited once with `a` before `b` in tracking order, so a
/// pair can never be reported twice in swapped order.
pub(crate) fn find_conjunctions<P: PositionProvider + ?Sized>(
    provider: &P,
    tracks: &[BodyTrack],
    grid: &[DateTime<Utc>],
    window: &YearWindow,
    config: &ForecastConfig,
) -> Vec<Conjunction> {
    let mut found = Vec::new();
    for (i, a) in tracks.iter().enumerate() {
        for b in &tracks[i + 1..] {
            found.extend(pair_conjunctions(provider, a, b, grid, window, config));
        }
    }
    found
}

fn pair_conjunctions<P: PositionProvider + ?Sized>(
    provider: &P,
    a: &BodyTrack,
    b: &BodyTrack,
    grid: &[DateTime<Utc>],
    window: &YearWindow,
    config: &ForecastConfig,
) -> Vec<Conjunction> {
    let (body_a, body_b) = ordered(a.body, b.body);
    let observer = config.observer;
    let positions = |t: DateTime<Utc>| -> Option<(f64, f64)> {
        let lon_a = checked_longitude(provider, body_a, t, &observer).ok()?;
        let lon_b = checked_longitude(provider, body_b, t, &observer).ok()?;
        Some((lon_a, lon_b))
    };

    // Separation at every grid index where both bodies were sampled.
    let series: Vec<(usize, f64, f64)> = a
        .longitudes
        .iter()
        .zip(&b.longitudes)
        .enumerate()
        .filter_map(|(k, (la, lb))| match (la, lb) {
            (Some(la), Some(lb)) => Some((k, *la, *lb)),
            _ => None,
        })
        .collect();

    let mut found = Vec::new();
    for w in series.windows(3) {
        let (k0, s0) = (w[0].0, separation(w[0].1, w[0].2));
        let (k1, s1) = (w[1].0, separation(w[1].1, w[1].2));
        let (k2, s2) = (w[2].0, separation(w[2].1, w[2].2));
        // Strict on the left so a flat bottom yields one candidate.
        if !(s0 > s1 && s1 <= s2) {
            continue;
        }
        let (t_0, t_2) = (grid[k0], grid[k2]);
        if !(a.span_is_resolvable(t_0, t_2) && b.span_is_resolvable(t_0, t_2)) {
            debug!(
                "{}-{} minimum between {} and {} spans too long a gap",
                body_a, body_b, t_0, t_2
            );
            continue;
        }

        let sampled = Minimum {
            timestamp: grid[k1],
            value: s1,
        };
        let best = golden_section_min(
            t_0,
            t_2,
            sampled,
            config.resolution(),
            config.max_iterations,
            |t| positions(t).map(|(la, lb)| separation(la, lb)),
        );

        if best.value > config.conjunction_threshold_deg || !window.contains(best.timestamp) {
            continue;
        }

        let Some((lon_a, lon_b)) = positions(best.timestamp) else {
            debug!(
                "{}-{} positions at {} unavailable",
                body_a, body_b, best.timestamp
            );
            continue;
        };
        let Ok(sign) = ZodiacSign::from_longitude(circular_midpoint(lon_a, lon_b)) else {
            continue;
        };
        let significance = if config.is_major_pair(body_a, body_b) {
            Significance::Major
        } else {
            Significance::Minor
        };
        debug!(
            "{}-{} conjunction at {} ({:.3} deg)",
            body_a, body_b, best.timestamp, best.value
        );
        found.push(Conjunction {
            body_a,
            body_b,
            timestamp: best.timestamp,
            sign,
            angular_separation_degrees: best.value,
            significance,
        });
    }
    found
}

fn ordered(a: CelestialBody, b: CelestialBody) -> (CelestialBody, CelestialBody) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
