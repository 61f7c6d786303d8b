//! Rebalance policy - recenter the grid when price leaves its range

use super::strategy::compute_levels;
use super::types::GridBounds;

/// Lowest allowed grid floor after recentering
pub const MIN_GRID_PRICE: f64 = 0.000001;

/// True when `price` is strictly outside `[price_min, price_max]`
pub fn should_rebalance(price: f64, price_min: f64, price_max: f64) -> bool {
    price < price_min || price > price_max
}

/// Recenter a grid of the same width on `price`
///
/// The floor never drops to or below zero; it is clamped to [`MIN_GRID_PRICE`].
/// If clamping would collapse the range, the ceiling is pushed up so the old
/// width is kept above the floor.
pub fn rebalance(price: f64, old_min: f64, old_max: f64, grid_count: u32) -> GridBounds {
    let width = old_max - old_min;
    let half = width / 2.0;

    let price_min = (price - half).max(MIN_GRID_PRICE);
    let mut price_max = price + half;
    if price_max <= price_min {
        price_max = price_min + width;
    }

    GridBounds {
        price_min,
        price_max,
        levels: compute_levels(price_min, price_max, grid_count),
    }
}
