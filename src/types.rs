// src/types.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// --- Market data ---

/// One daily session. Sequences handed to the engine are ascending by
/// `time`; the last element is the most recent session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub time: NaiveDate,
    pub open: i64,
    pub high: i64,
    pub low: i64,
    pub close: i64,
    /// Session trading value, in hundred-million KRW.
    pub trading_value: i64,
}

/// Snapshot quote for a single ticker, normalized across providers.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub price: i64,
    pub change: i64,
    pub change_rate: f64,
    pub volume: i64,
    /// Hundred-million KRW.
    pub trading_value: i64,
    /// Trillion KRW.
    pub market_cap: f64,
    pub high_52w: i64,
    pub low_52w: i64,
    pub per: f64,
    pub pbr: f64,
}

// --- RN levels ---

/// A single round-number price anchor, annotated for one current price.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RnLevel {
    pub price: i64,
    /// Display label (e.g. "10만"). Presentational only.
    pub label: String,
    pub tick_size: i64,
    /// Signed distance from the current price, in percent.
    pub distance_percent: f64,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct AdjacentLevels {
    /// Nearest anchor at or above the current price, if any.
    pub upper: Option<RnLevel>,
    /// Nearest anchor strictly below the current price, if any.
    pub lower: Option<RnLevel>,
}

// --- Trade state ---

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradePhase {
    Watching,
    Signal,
    EntryZone,
    /// Reserved for externally-confirmed fills; never emitted by the
    /// classifier.
    FirstBuy,
    SecondBuy,
    TakeProfit,
    /// Reserved for an external time-stop scheduler; never emitted by the
    /// classifier.
    TimeCut,
}

/// Full derived trade state for one candle history. Recomputed from
/// scratch on every evaluation; nothing here persists between calls.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeState {
    pub phase: TradePhase,
    pub upper_rn: Option<RnLevel>,
    pub lower_rn: Option<RnLevel>,
    pub upper_touched: bool,
    pub first_entry_price: Option<i64>,
    pub second_entry_price: Option<i64>,
    pub avg_price: Option<i64>,
    pub target_low: Option<i64>,
    pub target_high: Option<i64>,
    pub time_cut_date: Option<NaiveDate>,
}

impl TradeState {
    /// Zero-value state: the defined result for an empty candle history.
    pub fn empty() -> Self {
        Self {
            phase: TradePhase::Watching,
            upper_rn: None,
            lower_rn: None,
            upper_touched: false,
            first_entry_price: None,
            second_entry_price: None,
            avg_price: None,
            target_low: None,
            target_high: None,
            time_cut_date: None,
        }
    }
}

// --- Screening ---

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MarketCapTier {
    Large,
    Mid,
    Small,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterResult {
    pub market_cap_ok: bool,
    pub trading_value_ok: bool,
    pub upper_touch_ok: bool,
    pub all_passed: bool,
    pub market_cap_tier: MarketCapTier,
}

// --- Service-level value objects ---

/// Where a snapshot's data actually came from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    #[serde(rename = "kis")]
    Kis,
    #[serde(rename = "naver")]
    Naver,
    #[serde(rename = "mock")]
    Mock,
    /// Mock data served because a live provider failed mid-request.
    #[serde(rename = "mock-fallback")]
    MockFallback,
}

/// Master-list entry for a listed ticker.
#[derive(Serialize, Debug, Clone, Copy)]
pub struct ListedStock {
    pub code: &'static str,
    pub name: &'static str,
    pub sector: &'static str,
    pub tier: MarketCapTier,
}

/// One row of the trading-value leaders ranking.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LeaderEntry {
    pub code: String,
    pub name: String,
    /// Hundred-million KRW.
    pub trading_value: i64,
}

/// Lightweight quote row from a bulk lookup.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BulkQuote {
    pub code: String,
    pub name: String,
    pub price: i64,
    pub change: i64,
    pub change_rate: f64,
}

/// Everything the dashboard needs for one ticker, after provider
/// normalization. Owned by the request that asked for it.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshot {
    pub code: String,
    pub name: String,
    pub sector: String,
    pub tier: MarketCapTier,
    /// Trillion KRW.
    pub market_cap: f64,
    pub candles: Vec<Candle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trading_value: Option<i64>,
    pub source: DataSource,
}

impl StockSnapshot {
    /// Latest close, falling back to the live quote when candles are
    /// missing.
    pub fn latest_price(&self) -> Option<i64> {
        self.candles.last().map(|c| c.close).or(self.current_price)
    }
}
