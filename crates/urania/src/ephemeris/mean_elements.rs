//! Built-in analytic ephemeris.
//!
//! Planets come from Keplerian mean elements with linear secular rates
//! (JPL "approximate positions of the planets", table 1, 1800 AD to 2050 AD),
//! the Moon from the principal periodic terms of the lunar longitude. Output
//! is geocentric, referred to the mean ecliptic and equinox of date, and good
//! to a few arcminutes for the outer planets. That is plenty for sign, degree
//! and retrograde classification but not for eclipse work.

use chrono::{DateTime, TimeZone, Utc};

use super::provider::{PositionProvider, ProviderError};
use super::time::julian_centuries;
use super::types::{CelestialBody, Observer};
use crate::zodiac::normalize_degrees;

/// General precession in longitude, degrees per Julian century.
const PRECESSION_PER_CENTURY: f64 = 1.396_971;
const KEPLER_TOLERANCE: f64 = 1e-12;
const KEPLER_MAX_ITERATIONS: usize = 30;

/// Orbital elements at J2000 and their rates per Julian century.
#[derive(Debug, Clone, Copy)]
struct OrbitalElements {
    semi_major_axis: [f64; 2],
    eccentricity: [f64; 2],
    inclination: [f64; 2],
    mean_longitude: [f64; 2],
    perihelion_longitude: [f64; 2],
    node_longitude: [f64; 2],
}

const fn elements(row: [f64; 12]) -> OrbitalElements {
    OrbitalElements {
        semi_major_axis: [row[0], row[1]],
        eccentricity: [row[2], row[3]],
        inclination: [row[4], row[5]],
        mean_longitude: [row[6], row[7]],
        perihelion_longitude: [row[8], row[9]],
        node_longitude: [row[10], row[11]],
    }
}

const MERCURY: OrbitalElements = elements([
    0.38709927, 0.00000037, 0.20563593, 0.00001906, 7.00497902, -0.00594749, 252.25032350,
    149472.67411175, 77.45779628, 0.16047689, 48.33076593, -0.12534081,
]);
const VENUS: OrbitalElements = elements([
    0.72333566, 0.00000390, 0.00677672, -0.00004107, 3.39467605, -0.00078890, 181.97909950,
    58517.81538729, 131.60246718, 0.00268329, 76.67984255, -0.27769418,
]);
// Earth-Moon barycenter.
const EARTH: OrbitalElements = elements([
    1.00000261, 0.00000562, 0.01671123, -0.00004392, -0.00001531, -0.01294668, 100.46457166,
    35999.37244981, 102.93768193, 0.32327364, 0.0, 0.0,
]);
const MARS: OrbitalElements = elements([
    1.52371034, 0.00001847, 0.09339410, 0.00007882, 1.84969142, -0.00813131, -4.55343205,
    19140.30268499, -23.94362959, 0.44441088, 49.55953891, -0.29257343,
]);
const JUPITER: OrbitalElements = elements([
    5.20288700, -0.00011607, 0.04838624, -0.00013253, 1.30439695, -0.00183714, 34.39644051,
    3034.74612775, 14.72847983, 0.21252668, 100.47390909, 0.20469106,
]);
const SATURN: OrbitalElements = elements([
    9.53667594, -0.00125060, 0.05386179, -0.00050991, 2.48599187, 0.00193609, 49.95424423,
    1222.49362201, 92.59887831, -0.41897216, 113.66242448, -0.28867794,
]);
const URANUS: OrbitalElements = elements([
    19.18916464, -0.00196176, 0.04725744, -0.00004397, 0.77263783, -0.00242939, 313.23810451,
    428.48202785, 170.95427630, 0.40805281, 74.01692503, 0.04240589,
]);
const NEPTUNE: OrbitalElements = elements([
    30.06992276, 0.00026291, 0.00859048, 0.00005105, 1.77004347, 0.00035372, -55.12002969,
    218.45945325, 44.96476227, -0.32241464, 131.78422574, -0.00508664,
]);
const PLUTO: OrbitalElements = elements([
    39.48211675, -0.00031596, 0.24882730, 0.00005170, 17.14001206, 0.00004818, 238.92903833,
    145.20780515, 224.06891629, -0.04062942, 110.30393684, -0.01183482,
]);

fn planet_elements(body: CelestialBody) -> Option<&'static OrbitalElements> {
    match body {
        CelestialBody::Mercury => Some(&MERCURY),
        CelestialBody::Venus => Some(&VENUS),
        CelestialBody::Mars => Some(&MARS),
        CelestialBody::Jupiter => Some(&JUPITER),
        CelestialBody::Saturn => Some(&SATURN),
        CelestialBody::Uranus => Some(&URANUS),
        CelestialBody::Neptune => Some(&NEPTUNE),
        CelestialBody::Pluto => Some(&PLUTO),
        CelestialBody::Sun | CelestialBody::Moon => None,
    }
}

#[inline]
fn at(pair: [f64; 2], t: f64) -> f64 {
    pair[0] + pair[1] * t
}

/// Heliocentric ecliptic (J2000) rectangular coordinates in AU.
fn heliocentric(el: &OrbitalElements, t: f64) -> [f64; 3] {
    let a = at(el.semi_major_axis, t);
    let e = at(el.eccentricity, t);
    let incl = at(el.inclination, t).to_radians();
    let mean_lon = at(el.mean_longitude, t);
    let peri = at(el.perihelion_longitude, t);
    let node = at(el.node_longitude, t);

    let arg_peri = (peri - node).to_radians();
    let mut mean_anomaly = (mean_lon - peri).rem_euclid(360.0);
    if mean_anomaly > 180.0 {
        mean_anomaly -= 360.0;
    }
    let m = mean_anomaly.to_radians();
    let ecc_anomaly = solve_kepler(m, e);

    let xp = a * (ecc_anomaly.cos() - e);
    let yp = a * (1.0 - e * e).sqrt() * ecc_anomaly.sin();

    let (sw, cw) = arg_peri.sin_cos();
    let (so, co) = node.to_radians().sin_cos();
    let (si, ci) = incl.sin_cos();

    [
        (cw * co - sw * so * ci) * xp + (-sw * co - cw * so * ci) * yp,
        (cw * so + sw * co * ci) * xp + (-sw * so + cw * co * ci) * yp,
        (sw * si) * xp + (cw * si) * yp,
    ]
}

/// Newton iteration on Kepler's equation `M = E - e sin E`.
fn solve_kepler(mean_anomaly: f64, e: f64) -> f64 {
    let mut ecc = mean_anomaly + e * mean_anomaly.sin();
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let delta = (mean_anomaly - (ecc - e * ecc.sin())) / (1.0 - e * ecc.cos());
        ecc += delta;
        if delta.abs() < KEPLER_TOLERANCE {
            break;
        }
    }
    ecc
}

/// Geocentric lunar longitude from the six largest periodic terms.
fn moon_longitude(t: f64) -> f64 {
    let mean_lon = 218.316_447_7 + 481_267.881_234_21 * t;
    let elong = (297.850_192_1 + 445_267.111_403_4 * t).to_radians();
    let sun_anom = (357.529_109_2 + 35_999.050_290_9 * t).to_radians();
    let moon_anom = (134.963_396_4 + 477_198.867_505_5 * t).to_radians();
    let arg_lat = (93.272_095_0 + 483_202.017_523_3 * t).to_radians();

    mean_lon + 6.288_774 * moon_anom.sin() + 1.274_027 * (2.0 * elong - moon_anom).sin()
        + 0.658_314 * (2.0 * elong).sin()
        + 0.213_618 * (2.0 * moon_anom).sin()
        - 0.185_116 * sun_anom.sin()
        - 0.114_332 * (2.0 * arg_lat).sin()
}

/// Analytic position provider with no external data files.
#[derive(Debug, Clone)]
pub struct MeanElementsProvider {
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
}

impl MeanElementsProvider {
    /// Identifies this model's numerics, for cache keys.
    pub const VERSION: &'static str = "mean-elements/1";

    pub fn new() -> Self {
        // The element table is fitted for 1800-2050.
        let valid_from = Utc.with_ymd_and_hms(1800, 1, 1, 0, 0, 0).single();
        let valid_until = Utc.with_ymd_and_hms(2051, 1, 1, 0, 0, 0).single();
        Self {
            valid_from: valid_from.unwrap_or(DateTime::<Utc>::MIN_UTC),
            valid_until: valid_until.unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn supports(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.valid_from && timestamp < self.valid_until
    }

    fn check_range(&self, timestamp: DateTime<Utc>) -> Result<f64, ProviderError> {
        if !self.supports(timestamp) {
            return Err(ProviderError::OutOfRange { timestamp });
        }
        Ok(julian_centuries(timestamp))
    }

    fn geocentric_longitude(body: CelestialBody, t: f64) -> f64 {
        let earth = heliocentric(&EARTH, t);
        let (x, y) = match body {
            CelestialBody::Moon => return normalize_degrees(moon_longitude(t)),
            CelestialBody::Sun => (-earth[0], -earth[1]),
            other => match planet_elements(other) {
                Some(el) => {
                    let p = heliocentric(el, t);
                    (p[0] - earth[0], p[1] - earth[1])
                }
                None => (-earth[0], -earth[1]),
            },
        };
        normalize_degrees(y.atan2(x).to_degrees() + PRECESSION_PER_CENTURY * t)
    }
}

impl Default for MeanElementsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionProvider for MeanElementsProvider {
    fn longitude_at(
        &self,
        body: CelestialBody,
        timestamp: DateTime<Utc>,
        _observer: &Observer,
    ) -> Result<f64, ProviderError> {
        let t = self.check_range(timestamp)?;
        Ok(Self::geocentric_longitude(body, t))
    }

    fn phase_angle_at(&self, timestamp: DateTime<Utc>) -> Result<f64, ProviderError> {
        let t = self.check_range(timestamp)?;
        let moon = Self::geocentric_longitude(CelestialBody::Moon, t);
        let sun = Self::geocentric_longitude(CelestialBody::Sun, t);
        Ok(normalize_degrees(moon - sun))
    }
}
