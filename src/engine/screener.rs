// src/engine/screener.rs
// Three-condition screening filter: capitalization tier, recent
// trading-value liquidity, upper-RN touch.

use crate::engine::levels::find_adjacent;
use crate::engine::rules::is_near_upper;
use crate::types::{Candle, FilterResult, MarketCapTier};

/// Trillion KRW floor for the large-cap tier.
const LARGE_CAP_FLOOR: f64 = 10.0;
/// Trillion KRW floor for the mid-cap tier (300 billion).
const MID_CAP_FLOOR: f64 = 0.3;
/// Hundred-million KRW: one session at/above this in the last 5 counts
/// as leader-grade liquidity.
const TRADING_VALUE_FLOOR: i64 = 1_500;
/// Sessions scanned for the liquidity check.
const TRADING_VALUE_WINDOW: usize = 5;
/// Sessions scanned for the upper-RN touch check.
const UPPER_TOUCH_WINDOW: usize = 20;

/// Evaluate one stock against the three screening conditions.
///
/// `market_cap` is in trillion KRW; `candles` ascending chronological.
/// Purely derived from the supplied snapshot -- no side effects.
pub fn screen_stock(market_cap: f64, candles: &[Candle]) -> FilterResult {
    // Condition 1: capitalization tier.
    let market_cap_tier = if market_cap >= LARGE_CAP_FLOOR {
        MarketCapTier::Large
    } else if market_cap >= MID_CAP_FLOOR {
        MarketCapTier::Mid
    } else {
        MarketCapTier::Small
    };
    let market_cap_ok = market_cap_tier != MarketCapTier::Small;

    // Condition 2: one-sided recency window, not an average. A single
    // leader-grade session in the last 5 passes.
    let trading_value_ok = last_n(candles, TRADING_VALUE_WINDOW)
        .iter()
        .any(|c| c.trading_value >= TRADING_VALUE_FLOOR);

    // Condition 3: a session high within the 4% band under the upper
    // anchor of the latest close, inside the last 20 sessions.
    let upper_touch_ok = match candles.last() {
        Some(latest) if latest.close > 0 => match find_adjacent(latest.close) {
            Ok(adjacent) => adjacent.upper.map_or(false, |u| {
                last_n(candles, UPPER_TOUCH_WINDOW)
                    .iter()
                    .any(|c| is_near_upper(c.high, u.price))
            }),
            Err(_) => false,
        },
        _ => false,
    };

    FilterResult {
        market_cap_ok,
        trading_value_ok,
        upper_touch_ok,
        all_passed: market_cap_ok && trading_value_ok && upper_touch_ok,
        market_cap_tier,
    }
}

fn last_n(candles: &[Candle], n: usize) -> &[Candle] {
    &candles[candles.len().saturating_sub(n)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn candle(day: u32, high: i64, close: i64, trading_value: i64) -> Candle {
        Candle {
            time: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close,
            high,
            low: close.min(high),
            close,
            trading_value,
        }
    }

    fn quiet_history() -> Vec<Candle> {
        // Mid-ladder drift, far from any anchor band, thin turnover.
        (1..=25)
            .map(|d| candle(d, 86_000, 85_000, 400))
            .collect()
    }

    #[test]
    fn test_market_cap_tiers() {
        assert_eq!(screen_stock(50.0, &[]).market_cap_tier, MarketCapTier::Large);
        assert_eq!(screen_stock(10.0, &[]).market_cap_tier, MarketCapTier::Large);
        assert_eq!(screen_stock(9.9, &[]).market_cap_tier, MarketCapTier::Mid);
        assert_eq!(screen_stock(0.3, &[]).market_cap_tier, MarketCapTier::Mid);
        assert_eq!(screen_stock(0.2, &[]).market_cap_tier, MarketCapTier::Small);
    }

    #[test]
    fn test_small_cap_fails_even_if_rest_passes() {
        let mut candles = quiet_history();
        candles.push(candle(26, 97_000, 96_500, 3_000)); // liquid + touching
        let result = screen_stock(0.2, &candles);
        assert!(result.trading_value_ok);
        assert!(result.upper_touch_ok);
        assert!(!result.market_cap_ok);
        assert!(!result.all_passed);
    }

    #[test]
    fn test_trading_value_window_is_last_five_only() {
        let mut candles = quiet_history();
        // Leader-grade session 6 sessions back: outside the window.
        let idx = candles.len() - 6;
        candles[idx].trading_value = 5_000;
        assert!(!screen_stock(12.0, &candles).trading_value_ok);

        // One qualifying session inside the window is enough.
        let idx = candles.len() - 2;
        candles[idx].trading_value = 1_500;
        assert!(screen_stock(12.0, &candles).trading_value_ok);
    }

    #[test]
    fn test_upper_touch_window_is_last_twenty() {
        let mut candles = quiet_history();
        // Touch 21 sessions back, then 4 quiet sessions appended: the
        // touch has scrolled out of the 20-session window.
        let idx = candles.len() - 21;
        candles[idx].high = 97_000; // within 4% of 100,000
        assert!(!screen_stock(12.0, &candles).upper_touch_ok);

        candles.last_mut().unwrap().high = 96_200;
        assert!(screen_stock(12.0, &candles).upper_touch_ok);
    }

    #[test]
    fn test_all_three_pass_together() {
        let mut candles = quiet_history();
        candles.push(candle(26, 96_800, 96_000, 2_200));
        let result = screen_stock(15.0, &candles);
        assert!(result.market_cap_ok);
        assert!(result.trading_value_ok);
        assert!(result.upper_touch_ok);
        assert!(result.all_passed);
        assert_eq!(result.market_cap_tier, MarketCapTier::Large);
    }

    #[test]
    fn test_empty_history_only_tier_can_pass() {
        let result = screen_stock(15.0, &[]);
        assert!(result.market_cap_ok);
        assert!(!result.trading_value_ok);
        assert!(!result.upper_touch_ok);
        assert!(!result.all_passed);
    }
}
