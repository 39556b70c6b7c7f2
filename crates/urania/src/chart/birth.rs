use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::assembler::{compute_chart, Chart};
use super::store::{BirthChartStore, WriteMode};
use crate::ephemeris::{CelestialBody, Observer, PositionProvider};
use crate::error::{AstroError, Result};
use crate::zodiac::ZodiacSign;

/// Stored form of one body's natal placement.
///
/// Field names are part of the persisted format and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthPlacement {
    pub body: CelestialBody,
    pub sign: ZodiacSign,
    pub degree: u8,
    pub minute: u8,
    #[serde(rename = "eclipticLongitude")]
    pub ecliptic_longitude: f64,
    pub retrograde: bool,
}

/// A natal chart as persisted: a bare JSON list of placements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BirthChartRecord {
    placements: Vec<BirthPlacement>,
}

impl BirthChartRecord {
    /// Build a record from a complete chart. Partial charts are refused since
    /// a stored natal chart is never recomputed.
    pub fn from_chart(chart: &Chart) -> Result<Self> {
        if !chart.is_complete() {
            return Err(AstroError::IncompleteChart {
                missing: chart.missing_bodies(),
            });
        }
        let placements = chart
            .entries
            .iter()
            .map(|entry| BirthPlacement {
                body: entry.body,
                sign: entry.sign,
                degree: entry.degree.degree,
                minute: entry.degree.minute,
                ecliptic_longitude: entry.longitude,
                retrograde: entry.retrograde,
            })
            .collect();
        Ok(Self { placements })
    }

    /// Build a record from stored placements in any order.
    pub fn from_placements(mut placements: Vec<BirthPlacement>) -> Result<Self> {
        let mut seen = HashSet::new();
        for p in &placements {
            if !seen.insert(p.body) {
                return Err(AstroError::invalid("birth chart", format!("duplicate body {}", p.body)));
            }
            if p.degree > 29 || p.minute > 59 {
                return Err(AstroError::invalid(
                    "birth chart",
                    format!("{} at {}°{}'", p.body, p.degree, p.minute),
                ));
            }
            if !p.ecliptic_longitude.is_finite() {
                return Err(AstroError::invalid("ecliptic longitude", p.ecliptic_longitude));
            }
        }
        placements.sort_by_key(|p| p.body);
        Ok(Self { placements })
    }

    pub fn placements(&self) -> &[BirthPlacement] {
        &self.placements
    }

    pub fn placement(&self, body: CelestialBody) -> Option<&BirthPlacement> {
        self.placements.iter().find(|p| p.body == body)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse the persisted format. Entry order does not matter.
    pub fn from_json(text: &str) -> Result<Self> {
        let placements: Vec<BirthPlacement> = serde_json::from_str(text)?;
        Self::from_placements(placements)
    }
}

/// Compute the natal chart for a birth moment.
///
/// Deterministic for a given provider; fails with
/// [`AstroError::IncompleteChart`] when any body is unavailable.
pub fn generate_birth_chart<P: PositionProvider + ?Sized>(
    provider: &P,
    timestamp: DateTime<Utc>,
    observer: Option<&Observer>,
) -> Result<BirthChartRecord> {
    let chart = compute_chart(provider, timestamp, observer);
    BirthChartRecord::from_chart(&chart)
}

/// Generates natal charts and hands them to a store without ever replacing
/// an existing record unless told to.
pub struct BirthChartService<P, S> {
    provider: P,
    store: S,
}

impl<P: PositionProvider, S: BirthChartStore> BirthChartService<P, S> {
    pub fn new(provider: P, store: S) -> Self {
        Self { provider, store }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Return the stored chart for `identity`, computing and storing it only
    /// when none exists yet.
    pub fn ensure(
        &self,
        identity: &str,
        birth: DateTime<Utc>,
        observer: Option<&Observer>,
    ) -> Result<BirthChartRecord> {
        if let Some(existing) = self.store.load(identity)? {
            debug!("Birth chart for '{}' already stored, not recomputing", identity);
            return Ok(existing);
        }
        let record = generate_birth_chart(&self.provider, birth, observer)?;
        self.store.save(identity, &record, WriteMode::CreateOnly)?;
        info!("Stored birth chart for '{}'", identity);
        Ok(record)
    }

    /// Recompute and write a chart. With [`WriteMode::CreateOnly`] an existing
    /// record is left untouched and a conflict is returned.
    pub fn regenerate(
        &self,
        identity: &str,
        birth: DateTime<Utc>,
        observer: Option<&Observer>,
        mode: WriteMode,
    ) -> Result<BirthChartRecord> {
        let record = generate_birth_chart(&self.provider, birth, observer)?;
        self.store.save(identity, &record, mode)?;
        info!("Wrote birth chart for '{}' ({:?})", identity, mode);
        Ok(record)
    }
}
