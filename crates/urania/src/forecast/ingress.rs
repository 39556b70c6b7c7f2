use chrono::{DateTime, Duration, Utc};
use log::debug;

use super::sampling::{BodyTrack, YearWindow};
use super::search::bisect_sign_change;
use super::types::{ForecastConfig, Ingress, IngressSignificance, SeasonMarker};
use crate::chart::assembler::RETROGRADE_LOOKBACK_HOURS;
use crate::ephemeris::provider::checked_longitude;
use crate::ephemeris::PositionProvider;
use crate::zodiac::{signed_delta, ZodiacSign};

/// Detect and refine every sign change of one body inside the year.
///
/// Consecutive valid samples in different signs bracket one or more
/// boundary crossings. Skipped samples never count as a change, and a
/// crossing is only reported once the provider has pinned it down.
pub(crate) fn find_ingresses<P: PositionProvider + ?Sized>(
    provider: &P,
    track: &BodyTrack,
    grid: &[DateTime<Utc>],
    window: &YearWindow,
    config: &ForecastConfig,
) -> Vec<Ingress> {
    let body = track.body;
    let observer = config.observer;
    let lon_at = |t: DateTime<Utc>| checked_longitude(provider, body, t, &observer).ok();

    let mut ingresses = Vec::new();
    let mut previous: Option<(usize, f64)> = None;

    for (k, lon) in track.valid() {
        let Some((j, prev_lon)) = previous.replace((k, lon)) else {
            continue;
        };
        let (Ok(from), Ok(to)) = (
            ZodiacSign::from_longitude(prev_lon),
            ZodiacSign::from_longitude(lon),
        ) else {
            continue;
        };
        if from == to {
            continue;
        }

        let (t_a, t_b) = (grid[j], grid[k]);
        if !track.span_is_resolvable(t_a, t_b) {
            debug!(
                "{}: {} to {} between {} and {} spans too long a gap to place an ingress",
                body, from, to, t_a, t_b
            );
            continue;
        }
        let forward = signed_delta(lon, prev_lon) >= 0.0;

        for (leaving, entering) in crossed_signs(from, to, forward) {
            let boundary = if forward {
                entering.start_longitude()
            } else {
                leaving.start_longitude()
            };
            let f_a = signed_delta(prev_lon, boundary);
            let Some(exact) = bisect_sign_change(
                t_a,
                f_a,
                t_b,
                config.resolution(),
                config.max_iterations,
                |t| lon_at(t).map(|l| signed_delta(l, boundary)),
            ) else {
                debug!(
                    "{} {} -> {} between {} and {} could not be refined",
                    body, leaving, entering, t_a, t_b
                );
                continue;
            };

            if !window.contains(exact) {
                continue;
            }

            let lookback = exact - Duration::hours(RETROGRADE_LOOKBACK_HOURS);
            let is_retrograde_reentry = match (lon_at(exact), lon_at(lookback)) {
                (Some(now), Some(past)) => signed_delta(now, past) < 0.0,
                _ => {
                    debug!(
                        "Retrograde state of {} at {} unavailable, using bracket direction",
                        body, exact
                    );
                    !forward
                }
            };

            ingresses.push(Ingress {
                body,
                from_sign: leaving,
                to_sign: entering,
                exact_timestamp: exact,
                is_retrograde_reentry,
                significance: IngressSignificance::for_body(body),
                season: SeasonMarker::for_ingress(body, entering),
            });
        }
    }
    ingresses
}

/// Successive `(leaving, entering)` sign pairs between `from` and `to`.
///
/// Usually a single pair; more when skipped samples leave a gap spanning
/// several signs.
fn crossed_signs(
    from: ZodiacSign,
    to: ZodiacSign,
    forward: bool,
) -> Vec<(ZodiacSign, ZodiacSign)> {
    let mut pairs = Vec::new();
    let mut current = from;
    while current != to && pairs.len() < 12 {
        let next = if forward {
            current.next()
        } else {
            current.previous()
        };
        pairs.push((current, next));
        current = next;
    }
    pairs
}
