// src/data/mock.rs
// Deterministic mock candles for when no upstream provider is usable.
// Seeded per ticker code so the same code always draws the same series.

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::Candle;

/// Calendar days walked back from the end date; weekends are skipped, so
/// this yields roughly 8 weeks of sessions.
const LOOKBACK_DAYS: i64 = 40;

fn seed_for(code: &str) -> u64 {
    // Ticker codes are numeric ("005930"); anything else falls back to a
    // byte sum so the generator stays total.
    code.parse::<u64>()
        .unwrap_or_else(|_| code.bytes().map(u64::from).sum())
}

/// Mock daily candles ending today.
pub fn generate_mock_candles(code: &str) -> Vec<Candle> {
    generate_mock_candles_until(code, Utc::now().date_naive())
}

/// Deterministic variant: same `(code, end_date)` in, same series out.
pub fn generate_mock_candles_until(code: &str, end_date: NaiveDate) -> Vec<Candle> {
    let seed = seed_for(code);
    let mut rng = StdRng::seed_from_u64(seed);

    // Base price in the 50,000..550,000 band, derived from the code so
    // different tickers land on different ladder neighborhoods.
    let base_price = ((seed % 50) + 5) as i64 * 10_000;
    let mut price = base_price;
    let mut candles = Vec::new();

    for offset in (0..=LOOKBACK_DAYS).rev() {
        let day = end_date - Duration::days(offset);
        if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }

        // Slow sine drift plus per-session noise, in percent.
        let drift = ((seed as f64) + (offset as f64) * 0.3).sin() * 2.0;
        let noise = rng.gen_range(-0.5..0.5);
        let change = (drift + noise) / 100.0;

        let open = price;
        let close = ((price as f64) * (1.0 + change)).round() as i64;
        let high = ((open.max(close) as f64) * (1.0 + rng.gen_range(0.0..0.01))).round() as i64;
        let low = ((open.min(close) as f64) * (1.0 - rng.gen_range(0.0..0.01))).round() as i64;
        let trading_value: i64 = 1_000 + rng.gen_range(0..5_000);
        price = close;

        candles.push(Candle {
            time: day,
            open,
            high,
            low,
            close,
            trading_value,
        });
    }

    candles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
    }

    #[test]
    fn test_same_code_same_series() {
        let a = generate_mock_candles_until("005930", fixed_end());
        let b = generate_mock_candles_until("005930", fixed_end());
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_codes_differ() {
        let a = generate_mock_candles_until("005930", fixed_end());
        let b = generate_mock_candles_until("000660", fixed_end());
        assert_ne!(a, b);
    }

    #[test]
    fn test_candles_are_weekdays_ascending_and_positive() {
        let candles = generate_mock_candles_until("035420", fixed_end());
        assert!(!candles.is_empty());
        for window in candles.windows(2) {
            assert!(window[0].time < window[1].time);
        }
        for c in &candles {
            assert!(!matches!(c.time.weekday(), Weekday::Sat | Weekday::Sun));
            assert!(c.low > 0);
            assert!(c.low <= c.open && c.low <= c.close);
            assert!(c.high >= c.open && c.high >= c.close);
            assert!(c.trading_value >= 1_000);
        }
    }

    #[test]
    fn test_non_numeric_code_still_generates() {
        let candles = generate_mock_candles_until("DEMO", fixed_end());
        assert!(!candles.is_empty());
    }
}
