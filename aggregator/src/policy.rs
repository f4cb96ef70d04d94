//! Fixed threshold policy turning a temperature mean into a frequency offset.

/// Means strictly above this reduce the frequency.
pub const HIGH_THRESHOLD: f64 = 70.0;
/// Means strictly below this raise the frequency.
pub const LOW_THRESHOLD: f64 = 65.0;
/// Magnitude of every non-zero offset.
pub const OFFSET_STEP: f64 = 0.05;

pub fn offset_for_mean(mean: f64) -> f64 {
    if mean > HIGH_THRESHOLD {
        -OFFSET_STEP
    } else if mean < LOW_THRESHOLD {
        OFFSET_STEP
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_exclusive() {
        assert_eq!(offset_for_mean(70.0), 0.0);
        assert_eq!(offset_for_mean(65.0), 0.0);
    }

    #[test]
    fn test_just_outside_boundaries() {
        assert_eq!(offset_for_mean(70.0001), -0.05);
        assert_eq!(offset_for_mean(64.9999), 0.05);
    }

    #[test]
    fn test_comfortable_band() {
        assert_eq!(offset_for_mean(67.5), 0.0);
    }
}
