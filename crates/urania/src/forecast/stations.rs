use chrono::{DateTime, Duration, Utc};
use log::debug;

use super::sampling::{BodyTrack, YearWindow};
use super::search::{bisect_sign_change, midpoint};
use super::types::{ForecastConfig, RetrogradePeriod, Station, StationKind};
use crate::ephemeris::provider::checked_longitude;
use crate::ephemeris::PositionProvider;
use crate::zodiac::{signed_delta, ZodiacSign};

/// Half-width of the centred difference used to locate a station.
const MOTION_HALF_SPAN_HOURS: i64 = 12;

/// Stations inside the year and the retrograde periods touching it.
#[derive(Debug, Default)]
pub(crate) struct StationScan {
    pub stations: Vec<Station>,
    pub periods: Vec<RetrogradePeriod>,
}

/// Locate the moments a body's apparent motion reverses.
///
/// Motion between consecutive valid samples is attributed to the midpoint
/// of that step; a change of direction between two steps brackets a
/// station, which is refined on the centred 24 hour difference.
pub(crate) fn find_stations<P: PositionProvider + ?Sized>(
    provider: &P,
    track: &BodyTrack,
    grid: &[DateTime<Utc>],
    window: &YearWindow,
    config: &ForecastConfig,
) -> StationScan {
    let body = track.body;
    if !body.can_station() {
        return StationScan::default();
    }
    let observer = config.observer;
    let half = Duration::hours(MOTION_HALF_SPAN_HOURS);
    let lon_at = |t: DateTime<Utc>| checked_longitude(provider, body, t, &observer).ok();
    let motion = |t: DateTime<Utc>| Some(signed_delta(lon_at(t + half)?, lon_at(t - half)?));

    let valid: Vec<(usize, f64)> = track.valid().collect();
    // A step across a gap too long to tell direction breaks the chain.
    let steps: Vec<Option<(DateTime<Utc>, bool)>> = valid
        .windows(2)
        .map(|w| {
            let (j, lj) = w[0];
            let (k, lk) = w[1];
            track
                .span_is_resolvable(grid[j], grid[k])
                .then(|| (midpoint(grid[j], grid[k]), signed_delta(lk, lj) < 0.0))
        })
        .collect();

    let mut all = Vec::new();
    for pair in steps.windows(2) {
        let (Some((m_a, retro_a)), Some((m_b, retro_b))) = (pair[0], pair[1]) else {
            continue;
        };
        if retro_a == retro_b {
            continue;
        }
        let refined = motion(m_a).and_then(|f_a| {
            bisect_sign_change(
                m_a,
                f_a,
                m_b,
                config.resolution(),
                config.max_iterations,
                motion,
            )
        });
        let Some(timestamp) = refined else {
            debug!(
                "{} station between {} and {} could not be refined",
                body, m_a, m_b
            );
            continue;
        };
        let Some(longitude) = lon_at(timestamp) else {
            debug!("{} position at station {} unavailable", body, timestamp);
            continue;
        };
        let Ok(sign) = ZodiacSign::from_longitude(longitude) else {
            continue;
        };
        all.push(Station {
            body,
            timestamp,
            kind: if retro_b {
                StationKind::Retrograde
            } else {
                StationKind::Direct
            },
            longitude,
            sign,
        });
    }

    let periods = retrograde_periods(&all)
        .into_iter()
        .filter(|p| {
            p.start.map_or(true, |s| s < window.end) && p.end.map_or(true, |e| e >= window.start)
        })
        .collect();
    let stations = all
        .into_iter()
        .filter(|s| window.contains(s.timestamp))
        .collect();

    StationScan { stations, periods }
}

/// Pair each retrograde station with the next direct one. Leading or
/// trailing unmatched stations give periods with an open end.
fn retrograde_periods(stations: &[Station]) -> Vec<RetrogradePeriod> {
    let mut periods = Vec::new();
    let mut open: Option<&Station> = None;
    for station in stations {
        match station.kind {
            StationKind::Retrograde => {
                open = Some(station);
            }
            StationKind::Direct => {
                periods.push(RetrogradePeriod {
                    body: station.body,
                    start: open.map(|s| s.timestamp),
                    end: Some(station.timestamp),
                    start_sign: open.map(|s| s.sign),
                    end_sign: Some(station.sign),
                });
                open = None;
            }
        }
    }
    if let Some(start) = open {
        periods.push(RetrogradePeriod {
            body: start.body,
            start: Some(start.timestamp),
            end: None,
            start_sign: Some(start.sign),
            end_sign: None,
        });
    }
    periods
}
