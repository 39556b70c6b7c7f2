pub mod angles;
pub mod moon_phase;
pub mod retrograde;
pub mod sign;

pub use angles::{circular_midpoint, normalize_degrees, separation, signed_delta};
pub use moon_phase::{MoonPhase, MoonPhaseName, SYNODIC_MONTH_DAYS};
pub use retrograde::is_retrograde;
pub use sign::{classify_longitude, FormattedDegree, ZodiacSign};

use crate::error::{AstroError, Result};

/// Reject NaN and infinities before any classification.
pub(crate) fn ensure_finite(what: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AstroError::invalid(what, value))
    }
}
