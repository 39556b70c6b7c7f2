use std::thread;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::debug;

use super::types::{ForecastConfig, SampleCoverage};
use crate::ephemeris::provider::checked_longitude;
use crate::ephemeris::{CelestialBody, PositionProvider};
use crate::error::{AstroError, Result};

/// Calendar year plus the margins scanned around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct YearWindow {
    /// Jan 1 00:00 UTC
    pub start: DateTime<Utc>,
    /// Jan 1 00:00 UTC of the following year
    pub end: DateTime<Utc>,
    pub scan_start: DateTime<Utc>,
    pub scan_end: DateTime<Utc>,
}

impl YearWindow {
    pub fn new(year: i32, config: &ForecastConfig) -> Result<Self> {
        let jan_first = |y: i32| {
            NaiveDate::from_ymd_opt(y, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
                .ok_or_else(|| AstroError::invalid("year", y))
        };
        let start = jan_first(year)?;
        let end = jan_first(year.checked_add(1).ok_or_else(|| AstroError::invalid("year", year))?)?;
        let margin = Duration::days(i64::from(config.margin_days));
        Ok(Self {
            start,
            end,
            scan_start: start - margin,
            scan_end: end + margin,
        })
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }

    /// Sample instants from `scan_start` through `scan_end` inclusive.
    pub fn grid(&self, cadence: Duration) -> Vec<DateTime<Utc>> {
        let mut times = Vec::new();
        let mut t = self.scan_start;
        while t <= self.scan_end {
            times.push(t);
            t += cadence;
        }
        times
    }
}

/// One body's longitudes on the shared grid; `None` marks a skipped sample.
#[derive(Debug, Clone)]
pub(crate) struct BodyTrack {
    pub body: CelestialBody,
    pub longitudes: Vec<Option<f64>>,
}

impl BodyTrack {
    pub fn coverage(&self) -> SampleCoverage {
        let sampled = self.longitudes.iter().filter(|l| l.is_some()).count();
        SampleCoverage {
            body: self.body,
            sampled,
            skipped: self.longitudes.len() - sampled,
        }
    }

    /// Grid indices with a valid sample, paired with the longitude.
    pub fn valid(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.longitudes
            .iter()
            .enumerate()
            .filter_map(|(k, lon)| lon.map(|l| (k, l)))
    }

    /// Whether the motion between samples taken at `from` and `to` can be
    /// read from their longitudes alone. Past half a turn at the body's
    /// top speed the direction, and so any crossing, is ambiguous.
    pub fn span_is_resolvable(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        let days = (to - from).num_seconds() as f64 / 86_400.0;
        days * self.body.max_daily_motion() < 180.0
    }
}

/// Sample every tracked body on `grid`, one worker thread per body.
pub(crate) fn sample_bodies<P: PositionProvider + ?Sized>(
    provider: &P,
    grid: &[DateTime<Utc>],
    config: &ForecastConfig,
) -> Vec<BodyTrack> {
    let observer = config.observer;
    thread::scope(|scope| {
        let handles: Vec<_> = CelestialBody::ALL
            .iter()
            .map(|&body| {
                let handle = scope.spawn(move || {
                    grid.iter()
                        .map(|&t| match checked_longitude(provider, body, t, &observer) {
                            Ok(lon) => Some(lon),
                            Err(err) => {
                                debug!("Skipping {} sample at {}: {}", body, t, err);
                                None
                            }
                        })
                        .collect::<Vec<_>>()
                });
                (body, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(body, handle)| BodyTrack {
                body,
                longitudes: handle.join().unwrap_or_else(|_| vec![None; grid.len()]),
            })
            .collect()
    })
}
