//! Grid strategy - level calculation and crossing detection

/// Fractional digits kept on every level so equality checks are deterministic
pub const LEVEL_PRECISION: i32 = 6;

/// Round a price to [`LEVEL_PRECISION`] fractional digits
pub fn round_level(price: f64) -> f64 {
    let factor = 10f64.powi(LEVEL_PRECISION);
    (price * factor).round() / factor
}

/// Calculate `count` evenly spaced prices from `price_min` to `price_max`, both included
///
/// Returns an empty vector for an unusable range (`price_min >= price_max` or
/// `count < 2`).
pub fn compute_levels(price_min: f64, price_max: f64, count: u32) -> Vec<f64> {
    if !(price_min < price_max) || count < 2 {
        return Vec::new();
    }

    let step = (price_max - price_min) / (count - 1) as f64;
    (0..count)
        .map(|i| round_level(price_min + step * i as f64))
        .collect()
}

/// Find the level crossed between two consecutive samples
///
/// A level `L` is crossed when `last < L <= current` or `last > L >= current`.
/// Levels are scanned in ascending order and the first match that is not
/// `last_crossed` wins. With no previous sample nothing is crossed.
pub fn detect_crossing(
    last_price: Option<f64>,
    current_price: f64,
    levels: &[f64],
    last_crossed: Option<f64>,
) -> Option<f64> {
    let last = last_price?;

    levels.iter().copied().find(|&level| {
        let crossed = (last < level && current_price >= level)
            || (last > level && current_price <= level);
        crossed && Some(level) != last_crossed
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::types::OrderSide;

    #[test]
    fn test_compute_levels_inclusive_bounds() {
        let levels = compute_levels(1.0, 1.2, 3);
        assert_eq!(levels, vec![1.0, 1.1, 1.2]);
    }

    #[test]
    fn test_compute_levels_properties() {
        let ranges = [(0.5, 3.7, 2), (1.0, 2.0, 10), (0.0123, 0.0456, 50), (100.0, 250.0, 7)];

        for (min, max, count) in ranges {
            let levels = compute_levels(min, max, count);
            assert_eq!(levels.len(), count as usize);
            assert!((levels[0] - min).abs() < 1e-6);
            assert!((levels[count as usize - 1] - max).abs() < 1e-6);
            assert!(levels.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_compute_levels_rounds_to_six_digits() {
        let levels = compute_levels(1.0, 2.0, 4);
        assert_eq!(levels[1], 1.333333);
        assert_eq!(levels[2], 1.666667);
    }

    #[test]
    fn test_compute_levels_invalid_range() {
        assert!(compute_levels(2.0, 1.0, 5).is_empty());
        assert!(compute_levels(1.0, 1.0, 5).is_empty());
        assert!(compute_levels(1.0, 2.0, 1).is_empty());
        assert!(compute_levels(1.0, 2.0, 0).is_empty());
        assert!(compute_levels(f64::NAN, 2.0, 5).is_empty());
    }

    #[test]
    fn test_crossing_upward_sells() {
        let levels = [1.0, 2.0, 3.0];
        assert_eq!(detect_crossing(Some(1.5), 2.5, &levels, None), Some(2.0));
        assert_eq!(OrderSide::from_move(1.5, 2.5), OrderSide::Sell);
    }

    #[test]
    fn test_crossing_downward_buys() {
        let levels = [1.0, 2.0, 3.0];
        assert_eq!(detect_crossing(Some(2.5), 1.5, &levels, None), Some(2.0));
        assert_eq!(OrderSide::from_move(2.5, 1.5), OrderSide::Buy);
    }

    #[test]
    fn test_no_crossing_without_movement() {
        let levels = [1.0, 2.0, 3.0];
        assert_eq!(detect_crossing(Some(2.0), 2.0, &levels, None), None);
    }

    #[test]
    fn test_first_sample_is_baseline() {
        let levels = [1.0, 2.0, 3.0];
        assert_eq!(detect_crossing(None, 2.5, &levels, None), None);
    }

    #[test]
    fn test_landing_on_level_counts_as_crossed() {
        let levels = [1.0, 2.0, 3.0];
        assert_eq!(detect_crossing(Some(1.5), 2.0, &levels, None), Some(2.0));
        // Leaving a level does not cross it again
        assert_eq!(detect_crossing(Some(2.0), 2.4, &levels, None), None);
    }

    #[test]
    fn test_same_level_suppressed_until_another_crossed() {
        let levels = [1.0, 2.0, 3.0];

        // Fired on 2 going down; bouncing back over 2 does not re-fire
        assert_eq!(detect_crossing(Some(2.5), 1.5, &levels, None), Some(2.0));
        assert_eq!(detect_crossing(Some(1.5), 2.5, &levels, Some(2.0)), None);
        assert_eq!(detect_crossing(Some(2.0), 1.5, &levels, Some(2.0)), None);

        // Crossing 3 clears the way for 2 again
        assert_eq!(detect_crossing(Some(2.5), 3.2, &levels, Some(2.0)), Some(3.0));
        assert_eq!(detect_crossing(Some(3.2), 1.8, &levels, Some(3.0)), Some(2.0));
    }

    #[test]
    fn test_multi_level_jump_reports_lowest_first() {
        let levels = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(detect_crossing(Some(1.5), 3.5, &levels, None), Some(2.0));
        assert_eq!(detect_crossing(Some(3.5), 1.5, &levels, None), Some(2.0));
        // Suppressed match is skipped, next one reported
        assert_eq!(detect_crossing(Some(1.5), 3.5, &levels, Some(2.0)), Some(3.0));
    }
}
