use super::angles::signed_delta;
use super::ensure_finite;
use crate::error::Result;

/// Whether a body moved backwards between two samples of its longitude.
///
/// Uses the shortest signed rotation so forward motion through 0° Aries
/// (e.g. 358° to 2°) is not mistaken for a retrograde step.
pub fn is_retrograde(longitude_now: f64, longitude_past: f64) -> Result<bool> {
    let now = ensure_finite("current longitude", longitude_now)?;
    let past = ensure_finite("past longitude", longitude_past)?;
    Ok(signed_delta(now, past) < 0.0)
}
