use chrono::{DateTime, Utc};
use thiserror::Error;

use super::types::{CelestialBody, Observer};
use crate::zodiac::normalize_degrees;

/// Failures reported by a position source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Position of {body} unavailable: {message}")]
    Unavailable {
        body: CelestialBody,
        message: String,
    },
    #[error("Position of {body} timed out: {message}")]
    Timeout {
        body: CelestialBody,
        message: String,
    },
    #[error("Timestamp {timestamp} is outside the provider's supported range")]
    OutOfRange { timestamp: DateTime<Utc> },
    #[error("Provider returned a non-finite value for {body}")]
    NonFinite { body: CelestialBody },
}

/// Source of geocentric ecliptic positions.
///
/// Implementations may ignore the observer when they only compute geocentric
/// positions. Returned longitudes may lie outside `[0, 360)`; callers
/// normalise them.
pub trait PositionProvider: Send + Sync {
    fn longitude_at(
        &self,
        body: CelestialBody,
        timestamp: DateTime<Utc>,
        observer: &Observer,
    ) -> Result<f64, ProviderError>;

    /// Sun-Earth-Moon phase angle: 0 is new moon, 180 is full moon.
    fn phase_angle_at(&self, timestamp: DateTime<Utc>) -> Result<f64, ProviderError>;
}

impl<P: PositionProvider + ?Sized> PositionProvider for Box<P> {
    fn longitude_at(
        &self,
        body: CelestialBody,
        timestamp: DateTime<Utc>,
        observer: &Observer,
    ) -> Result<f64, ProviderError> {
        (**self).longitude_at(body, timestamp, observer)
    }

    fn phase_angle_at(&self, timestamp: DateTime<Utc>) -> Result<f64, ProviderError> {
        (**self).phase_angle_at(timestamp)
    }
}

impl<P: PositionProvider + ?Sized> PositionProvider for std::sync::Arc<P> {
    fn longitude_at(
        &self,
        body: CelestialBody,
        timestamp: DateTime<Utc>,
        observer: &Observer,
    ) -> Result<f64, ProviderError> {
        (**self).longitude_at(body, timestamp, observer)
    }

    fn phase_angle_at(&self, timestamp: DateTime<Utc>) -> Result<f64, ProviderError> {
        (**self).phase_angle_at(timestamp)
    }
}

/// Query a longitude, rejecting NaN/infinite output and normalising into `[0, 360)`.
pub(crate) fn checked_longitude<P: PositionProvider + ?Sized>(
    provider: &P,
    body: CelestialBody,
    timestamp: DateTime<Utc>,
    observer: &Observer,
) -> Result<f64, ProviderError> {
    let raw = provider.longitude_at(body, timestamp, observer)?;
    if !raw.is_finite() {
        return Err(ProviderError::NonFinite { body });
    }
    Ok(normalize_degrees(raw))
}

pub(crate) fn checked_phase_angle<P: PositionProvider + ?Sized>(
    provider: &P,
    timestamp: DateTime<Utc>,
) -> Result<f64, ProviderError> {
    let raw = provider.phase_angle_at(timestamp)?;
    if !raw.is_finite() {
        return Err(ProviderError::NonFinite {
            body: CelestialBody::Moon,
        });
    }
    Ok(normalize_degrees(raw))
}
