//! Root and minimum refinement over time brackets.

use chrono::{DateTime, Duration, Utc};

/// Bisect `[t_a, t_b]` for a sign change of `f`, given `f(t_a)`.
///
/// `f` returns `None` when it cannot be evaluated. The search then gives
/// up and returns `None` rather than an unrefined midpoint. Hitting
/// `max_iterations` still yields the midpoint of the last bracket.
pub(crate) fn bisect_sign_change<F>(
    mut t_a: DateTime<Utc>,
    mut f_a: f64,
    mut t_b: DateTime<Utc>,
    resolution: Duration,
    max_iterations: u32,
    mut f: F,
) -> Option<DateTime<Utc>>
where
    F: FnMut(DateTime<Utc>) -> Option<f64>,
{
    for _ in 0..max_iterations {
        if t_b - t_a <= resolution {
            break;
        }
        let t_mid = midpoint(t_a, t_b);
        let f_mid = f(t_mid)?;
        if f_a * f_mid <= 0.0 {
            t_b = t_mid;
        } else {
            t_a = t_mid;
            f_a = f_mid;
        }
    }
    Some(midpoint(t_a, t_b))
}

/// Result of a minimum search.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Minimum {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Golden-section search for the minimum of a unimodal `f` on `[t_a, t_b]`.
///
/// `fallback` is a known evaluation inside the bracket; it is returned if
/// nothing better is found or `f` fails.
pub(crate) fn golden_section_min<F>(
    t_a: DateTime<Utc>,
    t_b: DateTime<Utc>,
    fallback: Minimum,
    resolution: Duration,
    max_iterations: u32,
    mut f: F,
) -> Minimum
where
    F: FnMut(DateTime<Utc>) -> Option<f64>,
{
    let span = seconds(t_b - t_a);
    let resolution = seconds(resolution);
    let at = |x: f64| t_a + Duration::milliseconds((x * 1000.0).round() as i64);

    let mut best = fallback;
    let consider = |t: DateTime<Utc>, v: f64, best: &mut Minimum| {
        if v < best.value {
            *best = Minimum {
                timestamp: t,
                value: v,
            };
        }
    };

    let (mut a, mut b) = (0.0, span);
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let (Some(mut fc), Some(mut fd)) = (f(at(c)), f(at(d))) else {
        return best;
    };
    consider(at(c), fc, &mut best);
    consider(at(d), fd, &mut best);

    for _ in 0..max_iterations {
        if b - a <= resolution {
            break;
        }
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            let Some(v) = f(at(c)) else { break };
            fc = v;
            consider(at(c), fc, &mut best);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            let Some(v) = f(at(d)) else { break };
            fd = v;
            consider(at(d), fd, &mut best);
        }
    }
    best
}

pub(crate) fn midpoint(a: DateTime<Utc>, b: DateTime<Utc>) -> DateTime<Utc> {
    a + (b - a) / 2
}

fn seconds(d: Duration) -> f64 {
    d.num_milliseconds() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn origin() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn hours_since(t: DateTime<Utc>) -> f64 {
        (t - origin()).num_milliseconds() as f64 / 3_600_000.0
    }

    #[test]
    fn bisection_finds_linear_root() {
        let root = bisect_sign_change(
            origin(),
            -10.0,
            origin() + Duration::hours(24),
            Duration::seconds(60),
            48,
            |t| Some(hours_since(t) - 10.0),
        )
        .unwrap();
        assert!((hours_since(root) - 10.0).abs() < 1.0 / 60.0);
    }

    #[test]
    fn bisection_gives_up_on_failure() {
        let end = origin() + Duration::hours(24);
        let root = bisect_sign_change(origin(), -1.0, end, Duration::seconds(60), 48, |_| None);
        assert_eq!(root, None);

        // A failure after a few good steps is still a failure.
        let mut calls = 0;
        let root = bisect_sign_change(origin(), -1.0, end, Duration::seconds(60), 48, |t| {
            calls += 1;
            (calls < 4).then(|| hours_since(t) - 10.0)
        });
        assert_eq!(root, None);
    }

    #[test]
    fn golden_section_finds_vertex() {
        let fallback = Minimum {
            timestamp: origin() + Duration::hours(24),
            value: 9.0,
        };
        let min = golden_section_min(
            origin(),
            origin() + Duration::hours(48),
            fallback,
            Duration::seconds(60),
            64,
            |t| Some((hours_since(t) - 30.0).abs()),
        );
        assert!((hours_since(min.timestamp) - 30.0).abs() < 0.05);
        assert!(min.value < 0.05);
    }
}
