use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AstroError, Result};

/// Bodies tracked by the engine.
///
/// Declaration order is the tracking order used for charts and for pair
/// enumeration in the forecast scan; it is not astronomical distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CelestialBody {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl CelestialBody {
    pub const ALL: [CelestialBody; 10] = [
        CelestialBody::Sun,
        CelestialBody::Moon,
        CelestialBody::Mercury,
        CelestialBody::Venus,
        CelestialBody::Mars,
        CelestialBody::Jupiter,
        CelestialBody::Saturn,
        CelestialBody::Uranus,
        CelestialBody::Neptune,
        CelestialBody::Pluto,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CelestialBody::Sun => "Sun",
            CelestialBody::Moon => "Moon",
            CelestialBody::Mercury => "Mercury",
            CelestialBody::Venus => "Venus",
            CelestialBody::Mars => "Mars",
            CelestialBody::Jupiter => "Jupiter",
            CelestialBody::Saturn => "Saturn",
            CelestialBody::Uranus => "Uranus",
            CelestialBody::Neptune => "Neptune",
            CelestialBody::Pluto => "Pluto",
        }
    }

    /// Sun and Moon never appear to move backwards from Earth.
    pub fn can_station(self) -> bool {
        !matches!(self, CelestialBody::Sun | CelestialBody::Moon)
    }

    /// Upper bound on apparent geocentric speed, degrees per day.
    pub fn max_daily_motion(self) -> f64 {
        match self {
            CelestialBody::Sun => 1.02,
            CelestialBody::Moon => 15.5,
            CelestialBody::Mercury => 2.3,
            CelestialBody::Venus => 1.3,
            CelestialBody::Mars => 0.8,
            CelestialBody::Jupiter => 0.25,
            CelestialBody::Saturn => 0.14,
            CelestialBody::Uranus => 0.07,
            CelestialBody::Neptune => 0.04,
            CelestialBody::Pluto => 0.05,
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|body| body.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Observer location on the Earth's surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    /// Latitude in degrees, north positive
    pub latitude: f64,
    /// Longitude in degrees, east positive
    pub longitude: f64,
    /// Height above sea level in meters
    pub height: f64,
}

/// Royal Observatory, Greenwich.
pub const DEFAULT_OBSERVER: Observer = Observer {
    latitude: 51.4769,
    longitude: 0.0005,
    height: 0.0,
};

impl Observer {
    pub fn new(latitude: f64, longitude: f64, height: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AstroError::invalid("observer latitude", latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AstroError::invalid("observer longitude", longitude));
        }
        if !height.is_finite() {
            return Err(AstroError::invalid("observer height", height));
        }
        Ok(Self {
            latitude,
            longitude,
            height,
        })
    }
}

impl Default for Observer {
    fn default() -> Self {
        DEFAULT_OBSERVER
    }
}
