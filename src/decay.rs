//! Exponential forgetting applied to event weights.
//!
//! Pure functions over (weight, age, rate); the batch form over arrays
//! lives in [`crate::batch`] and must agree with the scalar path.

/// `weight * exp(-rate * age_hours)`. Total over all float inputs.
pub fn decay(weight: f64, age_hours: f64, rate: f64) -> f64 {
    weight * (-rate * age_hours).exp()
}

/// Elapsed hours between an event timestamp and `now` (epoch seconds).
/// Signed so that future-dated events are not silently aged.
pub fn age_hours(now: u64, event_ts: u64) -> f64 {
    (now as f64 - event_ts as f64) / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_closed_form() {
        // 10 * e^-0.7 after one hour at rate 0.7
        let w = decay(10.0, 1.0, 0.7);
        assert!((w - 4.9658).abs() < 0.01, "got {}", w);
    }

    #[test]
    fn test_decay_monotone_in_age() {
        let mut prev = decay(8.0, 0.0, 0.3);
        for i in 1..50 {
            let next = decay(8.0, i as f64 * 0.5, 0.3);
            assert!(next <= prev, "decay grew at step {}", i);
            prev = next;
        }
    }

    #[test]
    fn test_decay_zero_age_identity() {
        assert_eq!(decay(6.5, 0.0, 0.7), 6.5);
    }

    #[test]
    fn test_age_hours_conversion() {
        assert_eq!(age_hours(7200, 3600), 1.0);
        assert_eq!(age_hours(3600, 3600), 0.0);
        // Future-dated event yields a negative age.
        assert_eq!(age_hours(0, 1800), -0.5);
    }
}
