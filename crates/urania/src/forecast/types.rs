use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::ephemeris::{CelestialBody, Observer, DEFAULT_OBSERVER};
use crate::error::{AstroError, Result};
use crate::zodiac::ZodiacSign;

/// Tuning for the yearly scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Hours between samples; must divide 24
    pub cadence_hours: u32,
    /// Days scanned before and after the year so edge events are bracketed
    pub margin_days: u32,
    /// Refinement stops once the bracket is this narrow
    pub resolution_seconds: u32,
    /// Upper bound on refinement steps per event
    pub max_iterations: u32,
    /// Widest separation still reported as a conjunction
    pub conjunction_threshold_deg: f64,
    /// Bodies whose mutual conjunctions are rated major
    pub major_bodies: Vec<CelestialBody>,
    pub observer: Observer,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            cadence_hours: 24,
            margin_days: 2,
            resolution_seconds: 60,
            max_iterations: 48,
            conjunction_threshold_deg: 8.0,
            major_bodies: vec![
                CelestialBody::Jupiter,
                CelestialBody::Saturn,
                CelestialBody::Uranus,
                CelestialBody::Neptune,
                CelestialBody::Pluto,
            ],
            observer: DEFAULT_OBSERVER,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cadence_hours == 0 || 24 % self.cadence_hours != 0 {
            return Err(AstroError::InvalidConfig(format!(
                "cadence_hours must divide 24, got {}",
                self.cadence_hours
            )));
        }
        if self.margin_days == 0 {
            return Err(AstroError::InvalidConfig(
                "margin_days must be at least 1".to_string(),
            ));
        }
        if self.resolution_seconds == 0 {
            return Err(AstroError::InvalidConfig(
                "resolution_seconds must be positive".to_string(),
            ));
        }
        if self.max_iterations == 0 || self.max_iterations > 128 {
            return Err(AstroError::InvalidConfig(format!(
                "max_iterations must be in 1..=128, got {}",
                self.max_iterations
            )));
        }
        let threshold = self.conjunction_threshold_deg;
        if !threshold.is_finite() || threshold <= 0.0 || threshold >= 180.0 {
            return Err(AstroError::InvalidConfig(format!(
                "conjunction_threshold_deg must be in (0, 180), got {}",
                threshold
            )));
        }
        Ok(())
    }

    pub fn cadence(&self) -> Duration {
        Duration::hours(i64::from(self.cadence_hours))
    }

    pub fn resolution(&self) -> Duration {
        Duration::seconds(i64::from(self.resolution_seconds))
    }

    pub fn is_major_pair(&self, a: CelestialBody, b: CelestialBody) -> bool {
        self.major_bodies.contains(&a) && self.major_bodies.contains(&b)
    }
}

/// Editorial weight of a sign change, by body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngressSignificance {
    Low,
    Medium,
    High,
    Extraordinary,
}

impl IngressSignificance {
    pub fn for_body(body: CelestialBody) -> Self {
        match body {
            CelestialBody::Moon | CelestialBody::Mercury => IngressSignificance::Low,
            CelestialBody::Sun | CelestialBody::Venus | CelestialBody::Mars => {
                IngressSignificance::Medium
            }
            CelestialBody::Jupiter | CelestialBody::Saturn => IngressSignificance::High,
            CelestialBody::Uranus | CelestialBody::Neptune | CelestialBody::Pluto => {
                IngressSignificance::Extraordinary
            }
        }
    }
}

/// Equinox or solstice marked by the Sun entering a cardinal sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonMarker {
    MarchEquinox,
    JuneSolstice,
    SeptemberEquinox,
    DecemberSolstice,
}

impl SeasonMarker {
    pub fn for_ingress(body: CelestialBody, to_sign: ZodiacSign) -> Option<Self> {
        if body != CelestialBody::Sun {
            return None;
        }
        match to_sign {
            ZodiacSign::Aries => Some(SeasonMarker::MarchEquinox),
            ZodiacSign::Cancer => Some(SeasonMarker::JuneSolstice),
            ZodiacSign::Libra => Some(SeasonMarker::SeptemberEquinox),
            ZodiacSign::Capricorn => Some(SeasonMarker::DecemberSolstice),
            _ => None,
        }
    }
}

/// A body crossing a sign boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingress {
    pub body: CelestialBody,
    pub from_sign: ZodiacSign,
    pub to_sign: ZodiacSign,
    pub exact_timestamp: DateTime<Utc>,
    /// Crossing made while moving backwards into the previous sign
    pub is_retrograde_reentry: bool,
    pub significance: IngressSignificance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<SeasonMarker>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    Minor,
    Major,
}

/// Closest approach of two bodies within the conjunction threshold.
///
/// `body_a` always precedes `body_b` in tracking order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conjunction {
    pub body_a: CelestialBody,
    pub body_b: CelestialBody,
    pub timestamp: DateTime<Utc>,
    /// Sign of the midpoint between the two bodies
    pub sign: ZodiacSign,
    pub angular_separation_degrees: f64,
    pub significance: Significance,
}

impl Conjunction {
    pub fn involves(&self, body: CelestialBody) -> bool {
        self.body_a == body || self.body_b == body
    }

    /// Whether this is the conjunction of `a` and `b`, in either order.
    pub fn is_pair(&self, a: CelestialBody, b: CelestialBody) -> bool {
        (self.body_a == a && self.body_b == b) || (self.body_a == b && self.body_b == a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationKind {
    /// Apparent motion turns backwards
    Retrograde,
    /// Apparent motion turns forwards again
    Direct,
}

/// Moment a body's apparent motion reverses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub body: CelestialBody,
    pub timestamp: DateTime<Utc>,
    pub kind: StationKind,
    pub longitude: f64,
    pub sign: ZodiacSign,
}

/// Interval between a retrograde station and the following direct station.
/// An end left open is not known from the scanned window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrogradePeriod {
    pub body: CelestialBody,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub start_sign: Option<ZodiacSign>,
    pub end_sign: Option<ZodiacSign>,
}

impl RetrogradePeriod {
    pub fn changes_sign(&self) -> bool {
        matches!((self.start_sign, self.end_sign), (Some(a), Some(b)) if a != b)
    }
}

/// How many samples of a body the scan obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleCoverage {
    pub body: CelestialBody,
    pub sampled: usize,
    pub skipped: usize,
}

/// Everything found for one calendar year (UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyForecast {
    pub year: i32,
    pub ingresses: Vec<Ingress>,
    pub conjunctions: Vec<Conjunction>,
    pub stations: Vec<Station>,
    pub retrograde_periods: Vec<RetrogradePeriod>,
    pub coverage: Vec<SampleCoverage>,
}

/// Borrowed view of one event for chronological listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForecastEvent<'a> {
    Ingress(&'a Ingress),
    Conjunction(&'a Conjunction),
    Station(&'a Station),
}

impl ForecastEvent<'_> {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ForecastEvent::Ingress(i) => i.exact_timestamp,
            ForecastEvent::Conjunction(c) => c.timestamp,
            ForecastEvent::Station(s) => s.timestamp,
        }
    }
}

/// Events of one calendar month, in time order.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyEvents<'a> {
    /// 1 = January
    pub month: u32,
    pub events: Vec<ForecastEvent<'a>>,
}

impl MonthlyEvents<'_> {
    pub fn ingresses(&self) -> usize {
        self.count(|e| matches!(e, ForecastEvent::Ingress(_)))
    }

    pub fn conjunctions(&self) -> usize {
        self.count(|e| matches!(e, ForecastEvent::Conjunction(_)))
    }

    pub fn stations(&self) -> usize {
        self.count(|e| matches!(e, ForecastEvent::Station(_)))
    }

    fn count(&self, pred: impl Fn(&ForecastEvent<'_>) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl YearlyForecast {
    /// Bodies for which no sample at all could be computed.
    pub fn unavailable_bodies(&self) -> Vec<CelestialBody> {
        self.coverage
            .iter()
            .filter(|c| c.sampled == 0)
            .map(|c| c.body)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.coverage.iter().all(|c| c.skipped == 0)
    }

    /// All events merged into one list, ordered by time.
    pub fn timeline(&self) -> Vec<ForecastEvent<'_>> {
        let mut events: Vec<ForecastEvent<'_>> = self
            .ingresses
            .iter()
            .map(ForecastEvent::Ingress)
            .chain(self.conjunctions.iter().map(ForecastEvent::Conjunction))
            .chain(self.stations.iter().map(ForecastEvent::Station))
            .collect();
        events.sort_by_key(|event| event.timestamp());
        events
    }

    /// The timeline split into the twelve months of the year. Months
    /// without events are kept, with an empty list.
    pub fn by_month(&self) -> Vec<MonthlyEvents<'_>> {
        let mut months: Vec<MonthlyEvents<'_>> = (1..=12)
            .map(|month| MonthlyEvents {
                month,
                events: Vec::new(),
            })
            .collect();
        for event in self.timeline() {
            let index = event.timestamp().month0() as usize;
            months[index].events.push(event);
        }
        months
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ForecastConfig::default().validate().is_ok());
    }

    #[test]
    fn cadence_must_divide_a_day() {
        let config = ForecastConfig {
            cadence_hours: 5,
            ..ForecastConfig::default()
        };
        assert!(matches!(config.validate(), Err(AstroError::InvalidConfig(_))));

        let config = ForecastConfig {
            cadence_hours: 6,
            ..ForecastConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.cadence(), Duration::hours(6));
    }

    #[test]
    fn threshold_bounds() {
        let config = ForecastConfig {
            conjunction_threshold_deg: f64::NAN,
            ..ForecastConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn significance_tiers() {
        assert_eq!(IngressSignificance::for_body(CelestialBody::Moon), IngressSignificance::Low);
        assert_eq!(IngressSignificance::for_body(CelestialBody::Mars), IngressSignificance::Medium);
        assert_eq!(IngressSignificance::for_body(CelestialBody::Saturn), IngressSignificance::High);
        assert_eq!(
            IngressSignificance::for_body(CelestialBody::Pluto),
            IngressSignificance::Extraordinary
        );
    }

    #[test]
    fn season_markers_only_for_the_sun() {
        assert_eq!(
            SeasonMarker::for_ingress(CelestialBody::Sun, ZodiacSign::Libra),
            Some(SeasonMarker::SeptemberEquinox)
        );
        assert_eq!(SeasonMarker::for_ingress(CelestialBody::Sun, ZodiacSign::Leo), None);
        assert_eq!(SeasonMarker::for_ingress(CelestialBody::Mars, ZodiacSign::Aries), None);
    }
}
