use std::thread;

use chrono::{DateTime, Duration, Utc};
use log::warn;
use serde::{Serialize, Serializer};

use crate::ephemeris::provider::{checked_longitude, checked_phase_angle};
use crate::ephemeris::{CelestialBody, Observer, PositionProvider, ProviderError, DEFAULT_OBSERVER};
use crate::error::Result;
use crate::zodiac::{signed_delta, FormattedDegree, MoonPhase, MoonPhaseName, ZodiacSign};

/// Offset of the comparison sample used for retrograde detection.
pub const RETROGRADE_LOOKBACK_HOURS: i64 = 24;

/// One body's placement at the chart moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartEntry {
    pub body: CelestialBody,
    /// Ecliptic longitude in `[0, 360)`
    pub longitude: f64,
    pub sign: ZodiacSign,
    pub degree: FormattedDegree,
    pub retrograde: bool,
}

/// A body left out of a chart and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingBody {
    pub body: CelestialBody,
    #[serde(rename = "reason", serialize_with = "serialize_display")]
    pub error: ProviderError,
}

fn serialize_display<S: Serializer>(
    error: &ProviderError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Placements of every tracked body at one moment, in tracking order.
///
/// Bodies the provider could not compute are listed in `missing` instead of
/// `entries`; no placeholder values are ever inserted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub timestamp: DateTime<Utc>,
    pub observer: Observer,
    pub entries: Vec<ChartEntry>,
    pub missing: Vec<MissingBody>,
}

impl Chart {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn entry(&self, body: CelestialBody) -> Option<&ChartEntry> {
        self.entries.iter().find(|entry| entry.body == body)
    }

    pub fn missing_bodies(&self) -> Vec<CelestialBody> {
        self.missing.iter().map(|m| m.body).collect()
    }
}

/// Compute placements for all tracked bodies.
///
/// Bodies are queried concurrently; a failure for one body never affects the
/// others. Never fails as a whole.
pub fn compute_chart<P: PositionProvider + ?Sized>(
    provider: &P,
    timestamp: DateTime<Utc>,
    observer: Option<&Observer>,
) -> Chart {
    let observer = observer.copied().unwrap_or(DEFAULT_OBSERVER);

    let results: Vec<(CelestialBody, std::result::Result<ChartEntry, ProviderError>)> =
        thread::scope(|scope| {
            let handles: Vec<_> = CelestialBody::ALL
                .iter()
                .map(|&body| {
                    (
                        body,
                        scope.spawn(move || assemble_entry(provider, body, timestamp, &observer)),
                    )
                })
                .collect();

            handles
                .into_iter()
                .map(|(body, handle)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        Err(ProviderError::Unavailable {
                            body,
                            message: "provider panicked".to_string(),
                        })
                    });
                    (body, result)
                })
                .collect()
        });

    let mut entries = Vec::with_capacity(results.len());
    let mut missing = Vec::new();
    for (body, result) in results {
        match result {
            Ok(entry) => entries.push(entry),
            Err(error) => {
                warn!("Omitting {} from chart at {}: {}", body, timestamp, error);
                missing.push(MissingBody { body, error });
            }
        }
    }

    Chart {
        timestamp,
        observer,
        entries,
        missing,
    }
}

fn assemble_entry<P: PositionProvider + ?Sized>(
    provider: &P,
    body: CelestialBody,
    timestamp: DateTime<Utc>,
    observer: &Observer,
) -> std::result::Result<ChartEntry, ProviderError> {
    let now = checked_longitude(provider, body, timestamp, observer)?;
    let past = checked_longitude(
        provider,
        body,
        timestamp - Duration::hours(RETROGRADE_LOOKBACK_HOURS),
        observer,
    )?;
    // Both values are finite and normalised here, so classification is total.
    let sign = ZodiacSign::from_longitude(now).map_err(|_| ProviderError::NonFinite { body })?;
    let degree = FormattedDegree::from_longitude(now).map_err(|_| ProviderError::NonFinite { body })?;

    Ok(ChartEntry {
        body,
        longitude: now,
        sign,
        degree,
        retrograde: signed_delta(now, past) < 0.0,
    })
}

/// Named lunar phase at `timestamp`.
pub fn moon_phase_name<P: PositionProvider + ?Sized>(
    provider: &P,
    timestamp: DateTime<Utc>,
) -> Result<MoonPhaseName> {
    let angle = checked_phase_angle(provider, timestamp)?;
    MoonPhaseName::from_phase_angle(angle)
}

/// Lunar phase with illumination and age.
pub fn moon_phase<P: PositionProvider + ?Sized>(
    provider: &P,
    timestamp: DateTime<Utc>,
) -> Result<MoonPhase> {
    let angle = checked_phase_angle(provider, timestamp)?;
    MoonPhase::from_phase_angle(angle)
}
