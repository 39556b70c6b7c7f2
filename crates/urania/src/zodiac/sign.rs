use std::fmt;

use serde::{Deserialize, Serialize};

use super::angles::normalize_degrees;
use super::ensure_finite;
use crate::error::Result;

/// The twelve 30° tropical signs, starting at the March equinox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// Sign containing `longitude`. Bins are `[n*30, (n+1)*30)`, so a
    /// longitude exactly on a boundary belongs to the later sign.
    pub fn from_longitude(longitude: f64) -> Result<Self> {
        let lon = normalize_degrees(ensure_finite("longitude", longitude)?);
        Ok(Self::from_index(split(lon).0))
    }

    /// Sign at position `index` counted from Aries, modulo 12.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Longitude of the sign's first degree.
    pub fn start_longitude(self) -> f64 {
        self.index() as f64 * 30.0
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Self {
        Self::from_index(self.index() + 11)
    }

    pub fn name(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|sign| sign.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Position within a sign, truncated to whole arcminutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormattedDegree {
    /// 0..=29
    pub degree: u8,
    /// 0..=59
    pub minute: u8,
}

impl FormattedDegree {
    pub fn from_longitude(longitude: f64) -> Result<Self> {
        let lon = normalize_degrees(ensure_finite("longitude", longitude)?);
        Ok(Self::from_within_sign(split(lon).1))
    }

    fn from_within_sign(within: f64) -> Self {
        let degree = within.floor().clamp(0.0, 29.0);
        let minute = ((within - degree) * 60.0).floor().clamp(0.0, 59.0);
        Self {
            degree: degree as u8,
            minute: minute as u8,
        }
    }

    /// Arcminutes from the start of the sign.
    pub fn total_minutes(self) -> u16 {
        u16::from(self.degree) * 60 + u16::from(self.minute)
    }
}

impl fmt::Display for FormattedDegree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°{:02}'", self.degree, self.minute)
    }
}

/// Sign and in-sign position for one longitude.
pub fn classify_longitude(longitude: f64) -> Result<(ZodiacSign, FormattedDegree)> {
    let lon = normalize_degrees(ensure_finite("longitude", longitude)?);
    let (index, within) = split(lon);
    Ok((
        ZodiacSign::from_index(index),
        FormattedDegree::from_within_sign(within),
    ))
}

/// Sign index and offset into that sign for a normalised longitude.
fn split(lon: f64) -> (usize, f64) {
    let index = (lon / 30.0).floor();
    let within = lon - index * 30.0;
    // Division can round up just below a boundary; keep the pair consistent.
    if within < 0.0 {
        ((index as usize + 11) % 12, within + 30.0)
    } else {
        (index as usize % 12, within)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_belongs_to_next_sign() {
        assert_eq!(ZodiacSign::from_longitude(30.0).unwrap(), ZodiacSign::Taurus);
        assert_eq!(ZodiacSign::from_longitude(29.999999).unwrap(), ZodiacSign::Aries);
        assert_eq!(ZodiacSign::from_longitude(30.0000001).unwrap(), ZodiacSign::Taurus);
        assert_eq!(ZodiacSign::from_longitude(0.0).unwrap(), ZodiacSign::Aries);
        assert_eq!(ZodiacSign::from_longitude(360.0).unwrap(), ZodiacSign::Aries);
    }

    #[test]
    fn negative_longitudes_wrap() {
        assert_eq!(ZodiacSign::from_longitude(-1.0).unwrap(), ZodiacSign::Pisces);
        assert_eq!(ZodiacSign::from_longitude(-330.0).unwrap(), ZodiacSign::Taurus);
    }

    #[test]
    fn rejects_nan_and_infinity() {
        assert!(ZodiacSign::from_longitude(f64::NAN).is_err());
        assert!(FormattedDegree::from_longitude(f64::INFINITY).is_err());
        assert!(classify_longitude(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn degree_and_minute() {
        let (sign, deg) = classify_longitude(45.5).unwrap();
        assert_eq!(sign, ZodiacSign::Taurus);
        assert_eq!(deg, FormattedDegree { degree: 15, minute: 30 });
        assert_eq!(deg.to_string(), "15°30'");

        let (_, deg) = classify_longitude(59.99999999).unwrap();
        assert_eq!(deg, FormattedDegree { degree: 29, minute: 59 });
    }

    #[test]
    fn sign_navigation() {
        assert_eq!(ZodiacSign::Pisces.next(), ZodiacSign::Aries);
        assert_eq!(ZodiacSign::Aries.previous(), ZodiacSign::Pisces);
        assert_eq!(ZodiacSign::Libra.start_longitude(), 180.0);
        assert_eq!(ZodiacSign::from_name("capricorn"), Some(ZodiacSign::Capricorn));
    }
}
