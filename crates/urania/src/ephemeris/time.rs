use chrono::{DateTime, Utc};

/// Julian Day of the Unix epoch.
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Julian Day of J2000.0.
pub const J2000_JD: f64 = 2_451_545.0;
pub const DAYS_PER_CENTURY: f64 = 36_525.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Convert a UTC timestamp to a Julian Day (UT, ΔT ignored).
pub fn julian_day(timestamp: DateTime<Utc>) -> f64 {
    let secs = timestamp.timestamp() as f64 + f64::from(timestamp.timestamp_subsec_nanos()) * 1e-9;
    secs / SECONDS_PER_DAY + UNIX_EPOCH_JD
}

/// Julian centuries since J2000.0.
pub fn julian_centuries(timestamp: DateTime<Utc>) -> f64 {
    (julian_day(timestamp) - J2000_JD) / DAYS_PER_CENTURY
}

/// Convert a Julian Day back to UTC, to millisecond precision.
pub fn from_julian_day(jd: f64) -> Option<DateTime<Utc>> {
    if !jd.is_finite() {
        return None;
    }
    let millis = ((jd - UNIX_EPOCH_JD) * SECONDS_PER_DAY * 1000.0).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}
