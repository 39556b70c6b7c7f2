//! Circular arithmetic on ecliptic degrees.
//!
//! Every comparison that can straddle the 0°/360° seam goes through these
//! helpers.

/// Wrap any finite angle into `[0, 360)`.
#[inline]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round tiny negatives up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed shortest rotation from `past` to `now`, in `[-180, 180)`.
#[inline]
pub fn signed_delta(now: f64, past: f64) -> f64 {
    (now - past + 540.0).rem_euclid(360.0) - 180.0
}

/// Minimal circular distance between two longitudes, in `[0, 180]`.
#[inline]
pub fn separation(a: f64, b: f64) -> f64 {
    signed_delta(a, b).abs()
}

/// Point halfway along the shorter arc between `a` and `b`.
pub fn circular_midpoint(a: f64, b: f64) -> f64 {
    normalize_degrees(b + signed_delta(a, b) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_negatives_and_full_turns() {
        assert_eq!(normalize_degrees(-30.0), 330.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert_eq!(normalize_degrees(-1e-20), 0.0);
    }

    #[test]
    fn signed_delta_crosses_the_seam() {
        assert!((signed_delta(2.0, 358.0) - 4.0).abs() < 1e-12);
        assert!((signed_delta(358.0, 2.0) + 4.0).abs() < 1e-12);
        assert!((signed_delta(10.0, 10.0)).abs() < 1e-12);
    }

    #[test]
    fn separation_is_symmetric_and_bounded() {
        assert!((separation(350.0, 10.0) - 20.0).abs() < 1e-12);
        assert!((separation(10.0, 350.0) - 20.0).abs() < 1e-12);
        assert!((separation(0.0, 180.0) - 180.0).abs() < 1e-12);
        assert!(separation(123.0, 321.0) <= 180.0);
    }

    #[test]
    fn midpoint_uses_the_short_arc() {
        assert!((circular_midpoint(350.0, 10.0) - 0.0).abs() < 1e-9);
        assert!((circular_midpoint(100.0, 110.0) - 105.0).abs() < 1e-9);
    }
}
