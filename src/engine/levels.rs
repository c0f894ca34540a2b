// src/engine/levels.rs
// KRX tick-size table and the round-number price ladder.

use crate::errors::EngineError;
use crate::types::{AdjacentLevels, RnLevel};

// KRX-mandated minimum price increments, descending by threshold. The
// first row whose threshold is <= price wins.
const TICK_TABLE: [(i64, i64); 9] = [
    (500_000, 1_000),
    (200_000, 500),
    (100_000, 100),
    (50_000, 100),
    (20_000, 50),
    (10_000, 50),
    (5_000, 10),
    (2_000, 5),
    (1_000, 1),
];

/// The fixed ladder of round-number anchors. Covers the practical KRX
/// price range (1,000 to 2,000,000 KRW) at the "1 / 1.5 / 2 / 3 / 5 / 7.5
/// x 10^n" multiples traders actually round to. Static configuration,
/// never mutated at runtime.
pub const RN_PRICES: [i64; 21] = [
    1_000, 1_500, 2_000, 3_000, 5_000, 7_500, 10_000, 15_000, 20_000, 30_000, 50_000, 75_000,
    100_000, 150_000, 200_000, 300_000, 500_000, 750_000, 1_000_000, 1_500_000, 2_000_000,
];

/// Minimum price increment at the given price. Total over all inputs;
/// prices below the lowest threshold fall through to 1 KRW.
pub fn tick_size(price: i64) -> i64 {
    for (threshold, tick) in TICK_TABLE {
        if price >= threshold {
            return tick;
        }
    }
    1
}

/// Human-readable anchor label ("7,500", "7.5만", "1.5백만").
fn format_label(price: i64) -> String {
    if price >= 10_000 {
        let man = price as f64 / 10_000.0;
        if man >= 100.0 {
            format!("{}백만", trim_trailing_zero(man / 100.0))
        } else {
            format!("{}만", trim_trailing_zero(man))
        }
    } else {
        format!("{},{:03}", price / 1_000, price % 1_000)
    }
}

fn trim_trailing_zero(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Annotate the full anchor ladder against one current price. Regenerated
/// per call because `distance_percent` depends on the caller's price.
pub fn generate_grid(current_price: i64) -> Result<Vec<RnLevel>, EngineError> {
    if current_price <= 0 {
        return Err(EngineError::InvalidPrice(current_price));
    }

    Ok(RN_PRICES
        .iter()
        .map(|&price| RnLevel {
            price,
            label: format_label(price),
            tick_size: tick_size(price),
            distance_percent: (price - current_price) as f64 / current_price as f64 * 100.0,
        })
        .collect())
}

/// Nearest anchor at/above (`upper`) and strictly below (`lower`) the
/// current price. Either side is absent past the ends of the ladder.
pub fn find_adjacent(current_price: i64) -> Result<AdjacentLevels, EngineError> {
    let grid = generate_grid(current_price)?;

    let upper = grid.iter().find(|l| l.price >= current_price).cloned();
    let lower = grid.iter().rev().find(|l| l.price < current_price).cloned();

    Ok(AdjacentLevels { upper, lower })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_size_table_boundaries() {
        assert_eq!(tick_size(500_000), 1_000);
        assert_eq!(tick_size(499_999), 500);
        assert_eq!(tick_size(200_000), 500);
        assert_eq!(tick_size(100_000), 100);
        assert_eq!(tick_size(50_000), 100);
        assert_eq!(tick_size(20_000), 50);
        assert_eq!(tick_size(10_000), 50);
        assert_eq!(tick_size(5_000), 10);
        assert_eq!(tick_size(2_000), 5);
        assert_eq!(tick_size(1_000), 1);
        assert_eq!(tick_size(999), 1);
        assert_eq!(tick_size(1), 1);
    }

    #[test]
    fn test_tick_size_monotonic_over_ladder() {
        let mut prev = 0;
        for price in RN_PRICES {
            let tick = tick_size(price);
            assert!(tick >= prev, "tick size decreased at {}", price);
            prev = tick;
        }
    }

    #[test]
    fn test_grid_covers_every_anchor_with_signed_distance() {
        let grid = generate_grid(100_000).unwrap();
        assert_eq!(grid.len(), RN_PRICES.len());

        let at_100k = grid.iter().find(|l| l.price == 100_000).unwrap();
        assert_eq!(at_100k.distance_percent, 0.0);

        let at_150k = grid.iter().find(|l| l.price == 150_000).unwrap();
        assert_eq!(at_150k.distance_percent, 50.0);

        let at_50k = grid.iter().find(|l| l.price == 50_000).unwrap();
        assert_eq!(at_50k.distance_percent, -50.0);
    }

    #[test]
    fn test_grid_rejects_non_positive_price() {
        assert_eq!(generate_grid(0), Err(EngineError::InvalidPrice(0)));
        assert_eq!(generate_grid(-500), Err(EngineError::InvalidPrice(-500)));
        assert!(find_adjacent(0).is_err());
    }

    #[test]
    fn test_adjacent_brackets_price() {
        let adj = find_adjacent(96_000).unwrap();
        assert_eq!(adj.upper.unwrap().price, 100_000);
        assert_eq!(adj.lower.unwrap().price, 75_000);
    }

    #[test]
    fn test_adjacent_exact_anchor_is_its_own_upper() {
        let adj = find_adjacent(50_000).unwrap();
        assert_eq!(adj.upper.unwrap().price, 50_000);
        assert_eq!(adj.lower.unwrap().price, 30_000);
    }

    #[test]
    fn test_adjacent_no_gap_between_bounds() {
        // No anchor may sit strictly between lower and upper.
        for price in [1_200, 8_000, 43_210, 96_000, 870_000] {
            let adj = find_adjacent(price).unwrap();
            let upper = adj.upper.unwrap().price;
            let lower = adj.lower.unwrap().price;
            assert!(upper >= price && lower < price);
            assert!(!RN_PRICES
                .iter()
                .any(|&p| p > lower && p < upper));
        }
    }

    #[test]
    fn test_adjacent_ladder_extremes() {
        let below = find_adjacent(500).unwrap();
        assert_eq!(below.upper.unwrap().price, 1_000);
        assert!(below.lower.is_none());

        let above = find_adjacent(2_500_000).unwrap();
        assert!(above.upper.is_none());
        assert_eq!(above.lower.unwrap().price, 2_000_000);
    }

    #[test]
    fn test_anchor_labels() {
        let grid = generate_grid(10_000).unwrap();
        let label_of = |price: i64| {
            grid.iter()
                .find(|l| l.price == price)
                .unwrap()
                .label
                .clone()
        };
        assert_eq!(label_of(7_500), "7,500");
        assert_eq!(label_of(10_000), "1만");
        assert_eq!(label_of(15_000), "1.5만");
        assert_eq!(label_of(100_000), "10만");
        assert_eq!(label_of(1_000_000), "1백만");
        assert_eq!(label_of(1_500_000), "1.5백만");
    }
}
