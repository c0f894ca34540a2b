// src/engine/rules.rs
// Proximity predicates and the 1:2-tranche position-sizing arithmetic.
// All rounding is f64::round, i.e. half-away-from-zero on the positive
// prices this engine works with.

use chrono::{Months, NaiveDate};

/// True iff `price` has risen to within 4% below the upper anchor
/// (breakout watch). Closed interval: 0% and 4% both count; a price
/// already past the anchor does not.
pub fn is_near_upper(price: i64, upper_rn: i64) -> bool {
    let gap = (upper_rn - price) as f64 / upper_rn as f64 * 100.0;
    (0.0..=4.0).contains(&gap)
}

/// True iff `price` sits within 4% above the lower anchor (entry zone).
/// Closed interval; a price below the anchor does not qualify.
pub fn is_in_entry_zone(price: i64, lower_rn: i64) -> bool {
    let premium = (price - lower_rn) as f64 / lower_rn as f64 * 100.0;
    (0.0..=4.0).contains(&premium)
}

/// Second-tranche entry: 20% under the first entry.
pub fn second_entry(first_entry_price: i64) -> i64 {
    (first_entry_price as f64 * 0.8).round() as i64
}

/// Average cost under the 1:2 sizing rule (second tranche carries twice
/// the weight of the first).
pub fn weighted_average(first_price: i64, second_price: i64) -> i64 {
    ((first_price + 2 * second_price) as f64 / 3.0).round() as i64
}

/// Profit-target band: +7% to +20% over the average cost.
pub fn target_range(avg_price: i64) -> (i64, i64) {
    (
        (avg_price as f64 * 1.07).round() as i64,
        (avg_price as f64 * 1.20).round() as i64,
    )
}

/// Calendar time-stop: three months after entry. Month overflow clamps
/// to the last day of the target month (Jan 31 -> Apr 30), per chrono's
/// `Months` arithmetic.
pub fn time_cut_date(entry_date: NaiveDate) -> Option<NaiveDate> {
    entry_date.checked_add_months(Months::new(3))
}
