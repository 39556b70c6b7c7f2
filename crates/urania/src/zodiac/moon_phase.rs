use std::fmt;

use serde::{Deserialize, Serialize};

use super::angles::{normalize_degrees, separation};
use super::ensure_finite;
use crate::error::Result;

/// Mean length of a lunation in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.530_588_853;
/// Distance from an exact quarter within which a phase counts as significant.
const SIGNIFICANT_WINDOW_DEG: f64 = 2.0;

/// The eight named lunar phases, each a 45° bin centred on a multiple of 45°.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoonPhaseName {
    #[serde(rename = "New Moon")]
    NewMoon,
    #[serde(rename = "Waxing Crescent")]
    WaxingCrescent,
    #[serde(rename = "First Quarter")]
    FirstQuarter,
    #[serde(rename = "Waxing Gibbous")]
    WaxingGibbous,
    #[serde(rename = "Full Moon")]
    FullMoon,
    #[serde(rename = "Waning Gibbous")]
    WaningGibbous,
    #[serde(rename = "Last Quarter")]
    LastQuarter,
    #[serde(rename = "Waning Crescent")]
    WaningCrescent,
}

impl MoonPhaseName {
    const BINS: [MoonPhaseName; 8] = [
        MoonPhaseName::NewMoon,
        MoonPhaseName::WaxingCrescent,
        MoonPhaseName::FirstQuarter,
        MoonPhaseName::WaxingGibbous,
        MoonPhaseName::FullMoon,
        MoonPhaseName::WaningGibbous,
        MoonPhaseName::LastQuarter,
        MoonPhaseName::WaningCrescent,
    ];

    /// Classify a phase angle. New Moon is the single bin
    /// `[337.5, 360) ∪ [0, 22.5)`.
    pub fn from_phase_angle(angle: f64) -> Result<Self> {
        let angle = normalize_degrees(ensure_finite("phase angle", angle)?);
        let shifted = normalize_degrees(angle + 22.5);
        let index = (shifted / 45.0).floor() as usize;
        Ok(Self::BINS[index.min(7)])
    }

    pub fn name(self) -> &'static str {
        match self {
            MoonPhaseName::NewMoon => "New Moon",
            MoonPhaseName::WaxingCrescent => "Waxing Crescent",
            MoonPhaseName::FirstQuarter => "First Quarter",
            MoonPhaseName::WaxingGibbous => "Waxing Gibbous",
            MoonPhaseName::FullMoon => "Full Moon",
            MoonPhaseName::WaningGibbous => "Waning Gibbous",
            MoonPhaseName::LastQuarter => "Last Quarter",
            MoonPhaseName::WaningCrescent => "Waning Crescent",
        }
    }
}

impl fmt::Display for MoonPhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Phase name plus derived lunar quantities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoonPhase {
    pub name: MoonPhaseName,
    /// Degrees in `[0, 360)`
    pub phase_angle: f64,
    /// Illuminated fraction of the disc, 0..=1
    pub illumination: f64,
    /// Days since the last new moon, assuming a mean lunation
    pub age_days: f64,
    /// Within two degrees of new, first quarter, full or last quarter
    pub is_significant: bool,
}

impl MoonPhase {
    pub fn from_phase_angle(angle: f64) -> Result<Self> {
        let name = MoonPhaseName::from_phase_angle(angle)?;
        let phase_angle = normalize_degrees(angle);
        let illumination = (1.0 - phase_angle.to_radians().cos()) / 2.0;
        let is_significant = [0.0, 90.0, 180.0, 270.0]
            .iter()
            .any(|quarter| separation(phase_angle, *quarter) <= SIGNIFICANT_WINDOW_DEG);
        Ok(Self {
            name,
            phase_angle,
            illumination,
            age_days: phase_angle / 360.0 * SYNODIC_MONTH_DAYS,
            is_significant,
        })
    }
}
