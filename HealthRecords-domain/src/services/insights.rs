use crate::entities::trend::{TrendDirection, TrendResult};

/// Stability threshold for period-over-period vital averages
pub const VITAL_STABILITY_THRESHOLD_PERCENT: f64 = 5.0;

/// Stability threshold for point-to-point changes (vital cards and lab values)
pub const POINT_STABILITY_THRESHOLD_PERCENT: f64 = 3.0;

/// Classify the change from `previous` to `current`.
///
/// A change smaller than `stability_threshold_percent` is `Stable` even when
/// the values differ. With `previous == 0` the percent change is 0, so any
/// positive threshold yields `Stable`. The returned `is_inverse` is `false`;
/// callers apply their own with [`TrendResult::with_inverse`].
pub fn compute_trend(current: f64, previous: f64, stability_threshold_percent: f64) -> TrendResult {
    let change = current - previous;
    let percent = if previous != 0.0 {
        (change / previous).abs() * 100.0
    } else {
        0.0
    };

    let direction = if percent < stability_threshold_percent {
        TrendDirection::Stable
    } else if change > 0.0 {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    };

    TrendResult {
        direction,
        percent_change: percent.round(),
        is_inverse: false,
    }
}

/// Round to one decimal place, half away from zero
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_values_are_stable() {
        for threshold in [0.5, 3.0, 5.0, 50.0] {
            let trend = compute_trend(100.0, 100.0, threshold);
            assert_eq!(trend.direction, TrendDirection::Stable);
            assert_eq!(trend.percent_change, 0.0);
        }
    }

    #[test]
    fn test_increase_beyond_threshold_is_up() {
        let trend = compute_trend(110.0, 100.0, 5.0);
        assert_eq!(trend.direction, TrendDirection::Up);
        assert_eq!(trend.percent_change, 10.0);
        assert!(!trend.is_inverse);
    }

    #[test]
    fn test_change_within_threshold_is_stable() {
        let trend = compute_trend(103.0, 100.0, 5.0);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.percent_change, 3.0);
    }

    #[test]
    fn test_decrease_beyond_threshold_is_down() {
        let trend = compute_trend(90.0, 100.0, 5.0);
        assert_eq!(trend.direction, TrendDirection::Down);
        assert_eq!(trend.percent_change, 10.0);
    }

    #[test]
    fn test_zero_previous_reports_no_percent_change() {
        for current in [-20.0, 0.0, 0.1, 1000.0] {
            let trend = compute_trend(current, 0.0, 5.0);
            assert_eq!(trend.percent_change, 0.0);
            assert_eq!(trend.direction, TrendDirection::Stable);
        }
    }

    #[test]
    fn test_threshold_boundary_is_not_stable() {
        // Exactly at the threshold counts as a change.
        let trend = compute_trend(105.0, 100.0, 5.0);
        assert_eq!(trend.direction, TrendDirection::Up);
        assert_eq!(trend.percent_change, 5.0);
    }

    #[test]
    fn test_percent_change_is_a_rounded_magnitude() {
        let trend = compute_trend(80.0, 120.0, 3.0);
        assert_eq!(trend.direction, TrendDirection::Down);
        assert_eq!(trend.percent_change, 33.0);

        // 2.5 % rounds half up to 3 but still classifies against the raw value.
        let trend = compute_trend(102.5, 100.0, 3.0);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.percent_change, 3.0);

        // Negative baselines still report a non-negative magnitude.
        let trend = compute_trend(-90.0, -100.0, 5.0);
        assert!(trend.percent_change >= 0.0);
        assert_eq!(trend.direction, TrendDirection::Up);
    }

    #[test]
    fn test_thresholds_are_distinct() {
        let vital = compute_trend(104.0, 100.0, VITAL_STABILITY_THRESHOLD_PERCENT);
        let point = compute_trend(104.0, 100.0, POINT_STABILITY_THRESHOLD_PERCENT);
        assert_eq!(vital.direction, TrendDirection::Stable);
        assert_eq!(point.direction, TrendDirection::Up);
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(72.25), 72.3);
        assert_eq!(round_to_tenth(72.24), 72.2);
        assert_eq!(round_to_tenth(80.0), 80.0);
    }
}
