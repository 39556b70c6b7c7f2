use std::env;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use swisseph::swe::calc_ut;
use thiserror::Error;

use super::provider::{PositionProvider, ProviderError};
use super::time::julian_day;
use super::types::{CelestialBody, Observer};
use crate::zodiac::normalize_degrees;

/// Errors raised while setting up the Swiss Ephemeris.
#[derive(Error, Debug)]
pub enum EphemerisError {
    #[error("Ephemeris file not found at path: {path}. {message}")]
    FileNotFound { path: String, message: String },
}

// FLG_SWIEPH
const FLAG_SWIEPH: u32 = 2;

fn swiss_code(body: CelestialBody) -> u32 {
    match body {
        CelestialBody::Sun => 0,
        CelestialBody::Moon => 1,
        CelestialBody::Mercury => 2,
        CelestialBody::Venus => 3,
        CelestialBody::Mars => 4,
        CelestialBody::Jupiter => 5,
        CelestialBody::Saturn => 6,
        CelestialBody::Uranus => 7,
        CelestialBody::Neptune => 8,
        CelestialBody::Pluto => 9,
    }
}

/// Position provider backed by the Swiss Ephemeris data files.
///
/// The underlying C library keeps global state, so calls are serialised.
pub struct SwissEphemerisAdapter {
    ephemeris_path: PathBuf,
    guard: Mutex<()>,
}

impl SwissEphemerisAdapter {
    pub const VERSION: &'static str = "swisseph/0.1";

    /// Resolve the data directory from the argument, `SWISS_EPHEMERIS_PATH`,
    /// or `/usr/local/share/swisseph`, in that order.
    pub fn new(ephemeris_path: Option<PathBuf>) -> Result<Self, EphemerisError> {
        let path = ephemeris_path.unwrap_or_else(|| {
            env::var("SWISS_EPHEMERIS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/usr/local/share/swisseph"))
        });

        if !path.exists() {
            return Err(EphemerisError::FileNotFound {
                path: path.display().to_string(),
                message: "Please ensure Swiss Ephemeris data files are installed.".to_string(),
            });
        }

        Ok(Self {
            ephemeris_path: path,
            guard: Mutex::new(()),
        })
    }

    pub fn ephemeris_path(&self) -> &PathBuf {
        &self.ephemeris_path
    }

    fn longitude_jd(&self, body: CelestialBody, jd: f64) -> Result<f64, ProviderError> {
        let _lock = self.guard.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let result = calc_ut(jd, swiss_code(body), FLAG_SWIEPH).map_err(|e| {
            ProviderError::Unavailable {
                body,
                message: format!("Swiss Ephemeris error: {}", e),
            }
        })?;
        let longitude = result.out[0];
        if !longitude.is_finite() {
            return Err(ProviderError::NonFinite { body });
        }
        Ok(normalize_degrees(longitude))
    }
}

impl PositionProvider for SwissEphemerisAdapter {
    fn longitude_at(
        &self,
        body: CelestialBody,
        timestamp: DateTime<Utc>,
        _observer: &Observer,
    ) -> Result<f64, ProviderError> {
        self.longitude_jd(body, julian_day(timestamp))
    }

    fn phase_angle_at(&self, timestamp: DateTime<Utc>) -> Result<f64, ProviderError> {
        let jd = julian_day(timestamp);
        let moon = self.longitude_jd(CelestialBody::Moon, jd)?;
        let sun = self.longitude_jd(CelestialBody::Sun, jd)?;
        Ok(normalize_degrees(moon - sun))
    }
}
