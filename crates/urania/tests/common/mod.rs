#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use urania::{CelestialBody, Observer, PositionProvider, ProviderError};

type LongitudeFn = dyn Fn(CelestialBody, DateTime<Utc>) -> Option<f64> + Send + Sync;
type PhaseFn = dyn Fn(DateTime<Utc>) -> Option<f64> + Send + Sync;

/// Provider driven by closures; `None` is reported as an unavailable body.
pub struct ScriptedProvider {
    longitude: Box<LongitudeFn>,
    phase: Box<PhaseFn>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new<L>(longitude: L) -> Self
    where
        L: Fn(CelestialBody, DateTime<Utc>) -> Option<f64> + Send + Sync + 'static,
    {
        Self {
            longitude: Box::new(longitude),
            phase: Box::new(|_| None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_phase<F>(mut self, phase: F) -> Self
    where
        F: Fn(DateTime<Utc>) -> Option<f64> + Send + Sync + 'static,
    {
        self.phase = Box::new(phase);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PositionProvider for ScriptedProvider {
    fn longitude_at(
        &self,
        body: CelestialBody,
        timestamp: DateTime<Utc>,
        _observer: &Observer,
    ) -> Result<f64, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.longitude)(body, timestamp).ok_or_else(|| ProviderError::Unavailable {
            body,
            message: "scripted gap".to_string(),
        })
    }

    fn phase_angle_at(&self, timestamp: DateTime<Utc>) -> Result<f64, ProviderError> {
        (self.phase)(timestamp).ok_or_else(|| ProviderError::Timeout {
            body: CelestialBody::Moon,
            message: "scripted gap".to_string(),
        })
    }
}

/// Every body moves forward at its own constant rate from a fixed start.
pub fn uniform_motion() -> ScriptedProvider {
    ScriptedProvider::new(|body, t| {
        let days = days_since_epoch(t);
        let (start, rate) = match body {
            CelestialBody::Sun => (280.0, 0.9856),
            CelestialBody::Moon => (120.0, 13.176),
            CelestialBody::Mercury => (270.0, 1.2),
            CelestialBody::Venus => (240.0, 1.1),
            CelestialBody::Mars => (330.0, 0.52),
            CelestialBody::Jupiter => (25.0, 0.083),
            CelestialBody::Saturn => (40.0, 0.033),
            CelestialBody::Uranus => (315.0, 0.0117),
            CelestialBody::Neptune => (303.0, 0.006),
            CelestialBody::Pluto => (251.0, 0.004),
        };
        Some(start + rate * days)
    })
}

pub fn days_since_epoch(t: DateTime<Utc>) -> f64 {
    (t - epoch()).num_milliseconds() as f64 / 86_400_000.0
}

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap()
}

/// Midnight UTC of ordinal day `day` (Jan 1 is day 1).
pub fn ordinal_day(year: i32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_yo_opt(year, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Days (fractional) since midnight of Jan 1 of `year`; negative before it.
pub fn days_into(year: i32, t: DateTime<Utc>) -> f64 {
    (t - ordinal_day(year, 1)).num_milliseconds() as f64 / 86_400_000.0
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn within(t: DateTime<Utc>, center: DateTime<Utc>, days: i64) -> bool {
    (t - center).abs() <= Duration::days(days)
}
