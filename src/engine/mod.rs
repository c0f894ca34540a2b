// src/engine/mod.rs
// Pure RN-level computation: no I/O, no shared state, every function is a
// plain function of its inputs. Callers may use these from any number of
// threads without coordination.
pub mod executor;
pub mod levels;
pub mod rules;
pub mod screener;

pub use executor::evaluate_trade_state;
pub use levels::{find_adjacent, generate_grid, tick_size, RN_PRICES};
pub use rules::{
    is_in_entry_zone, is_near_upper, second_entry, target_range, time_cut_date, weighted_average,
};
pub use screener::screen_stock;
