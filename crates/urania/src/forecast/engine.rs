use std::thread;
use std::time::Instant;

use log::{info, warn};

use super::conjunction::find_conjunctions;
use super::ingress::find_ingresses;
use super::sampling::{sample_bodies, YearWindow};
use super::stations::{find_stations, StationScan};
use super::types::{ForecastConfig, Ingress, YearlyForecast};
use crate::ephemeris::PositionProvider;
use crate::error::Result;

/// Scan one calendar year (UTC) for ingresses, conjunctions and stations.
///
/// Sampling runs in parallel per body, then each body's samples are walked
/// in order to find brackets, and every bracket is refined independently.
/// Samples the provider cannot compute are skipped; a body that is never
/// available contributes no events and shows up in `coverage`.
pub fn generate_yearly_forecast<P: PositionProvider + ?Sized>(
    provider: &P,
    year: i32,
    config: &ForecastConfig,
) -> Result<YearlyForecast> {
    config.validate()?;
    let started = Instant::now();
    let window = YearWindow::new(year, config)?;
    let grid = window.grid(config.cadence());

    let tracks = sample_bodies(provider, &grid, config);
    let coverage: Vec<_> = tracks.iter().map(|t| t.coverage()).collect();
    for c in coverage.iter().filter(|c| c.skipped > 0) {
        warn!(
            "{}: {} of {} samples unavailable for {}",
            c.body,
            c.skipped,
            c.sampled + c.skipped,
            year
        );
    }

    let per_body: Vec<(Vec<Ingress>, StationScan)> = thread::scope(|scope| {
        let handles: Vec<_> = tracks
            .iter()
            .map(|track| {
                let (grid, window) = (&grid, &window);
                scope.spawn(move || {
                    (
                        find_ingresses(provider, track, grid, window, config),
                        find_stations(provider, track, grid, window, config),
                    )
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_default())
            .collect()
    });

    let mut ingresses = Vec::new();
    let mut stations = Vec::new();
    let mut retrograde_periods = Vec::new();
    for (found, scan) in per_body {
        ingresses.extend(found);
        stations.extend(scan.stations);
        retrograde_periods.extend(scan.periods);
    }
    let mut conjunctions = find_conjunctions(provider, &tracks, &grid, &window, config);

    ingresses.sort_by_key(|i| (i.exact_timestamp, i.body));
    conjunctions.sort_by_key(|c| (c.timestamp, c.body_a, c.body_b));
    stations.sort_by_key(|s| (s.timestamp, s.body));
    retrograde_periods.sort_by_key(|p| (p.start, p.body));

    info!(
        "Forecast {}: {} ingresses, {} conjunctions, {} stations in {:.2?}",
        year,
        ingresses.len(),
        conjunctions.len(),
        stations.len(),
        started.elapsed()
    );

    Ok(YearlyForecast {
        year,
        ingresses,
        conjunctions,
        stations,
        retrograde_periods,
        coverage,
    })
}
