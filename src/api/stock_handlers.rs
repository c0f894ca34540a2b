// src/api/stock_handlers.rs
// Ticker search, master list, per-stock detail and server health.

use actix_web::{web, HttpResponse, Responder};
use log::info;
use serde::{Deserialize, Serialize};

use crate::data::provider::MarketDataProvider;
use crate::data::stock_list::{find_by_code, search_stocks, STOCK_LIST};
use crate::engine::{evaluate_trade_state, generate_grid, screen_stock};
use crate::errors::ServiceError;
use crate::types::{FilterResult, RnLevel, StockSnapshot, TradeState};

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Snapshot plus everything the engine derives from it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDetailResponse {
    #[serde(flatten)]
    pub snapshot: StockSnapshot,
    /// The full annotated ladder for the chart's level overlay.
    pub rn_levels: Vec<RnLevel>,
    pub trade_state: TradeState,
    pub filter: FilterResult,
}

// GET /api/search?q=...
pub async fn search_handler(query: web::Query<SearchQuery>) -> impl Responder {
    HttpResponse::Ok().json(search_stocks(&query.q))
}

// GET /api/stocks
pub async fn stocks_handler() -> impl Responder {
    HttpResponse::Ok().json(STOCK_LIST)
}

// GET /api/stock/{code}
pub async fn stock_detail_handler(
    path: web::Path<String>,
    provider: web::Data<MarketDataProvider>,
) -> Result<HttpResponse, ServiceError> {
    let code = path.into_inner();
    let stock = find_by_code(&code).ok_or(ServiceError::NotFound)?;

    info!("[API] Fetching snapshot for {} ({})", stock.name, stock.code);
    let snapshot = provider.stock_snapshot(stock).await;

    let trade_state = evaluate_trade_state(&snapshot.candles)?;
    let filter = screen_stock(snapshot.market_cap, &snapshot.candles);
    let rn_levels = match snapshot.latest_price() {
        Some(price) => generate_grid(price)?,
        None => Vec::new(),
    };

    Ok(HttpResponse::Ok().json(StockDetailResponse {
        snapshot,
        rn_levels,
        trade_state,
        filter,
    }))
}

// GET /api/status
pub async fn status_handler(provider: web::Data<MarketDataProvider>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "kisConfigured": provider.mode() == "live",
        "mode": provider.mode(),
        "stockCount": STOCK_LIST.len(),
    }))
}
