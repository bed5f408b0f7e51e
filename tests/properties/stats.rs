//! Property tests for the rolling-median rate smoother.

use proptest::prelude::*;

use copier::stats::RollingMedian;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: The median never leaves the range of the samples currently
    /// in the window.
    #[test]
    fn property_median_stays_within_window_bounds(
        samples in proptest::collection::vec(0.0f64..10_000.0, 1..40),
        window in 1usize..12,
    ) {
        let mut median = RollingMedian::new(window);
        for s in &samples {
            median.add(*s);
        }

        let tail_start = samples.len().saturating_sub(window);
        let tail = &samples[tail_start..];
        let min = tail.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = tail.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let m = median.median();
        prop_assert!(m >= min && m <= max, "median {} outside [{}, {}]", m, min, max);
    }

    /// PROPERTY: Constant samples yield that constant as the median.
    #[test]
    fn property_constant_samples_are_fixed_point(
        value in 0.0f64..10_000.0,
        count in 1usize..30,
    ) {
        let mut median = RollingMedian::new(10);
        for _ in 0..count {
            median.add(value);
        }
        prop_assert_eq!(median.median(), value);
    }

    /// PROPERTY: One outlier in an otherwise steady window never drags the
    /// median away from the steady value.
    #[test]
    fn property_single_outlier_is_ignored(
        steady in 1.0f64..100.0,
        outlier in 10_000.0f64..100_000.0,
    ) {
        let mut median = RollingMedian::new(9);
        for _ in 0..8 {
            median.add(steady);
        }
        median.add(outlier);
        prop_assert_eq!(median.median(), steady);
    }
}
