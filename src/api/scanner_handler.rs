// src/api/scanner_handler.rs
// Leader-board scan: pulls today's trading-value leaders and keeps the
// ones sitting in an RN watch or entry band.

use actix_web::{web, HttpResponse};
use log::{info, warn};
use serde::Serialize;

use crate::data::provider::MarketDataProvider;
use crate::data::stock_list::{find_by_code, STOCK_LIST};
use crate::engine::levels::find_adjacent;
use crate::engine::rules::{is_in_entry_zone, is_near_upper};
use crate::errors::ServiceError;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// Within 4% under the upper RN: breakout watch.
    Watch,
    /// Within 4% over the lower RN: entry band.
    Entry,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScannerEntry {
    pub code: String,
    pub name: String,
    pub sector: String,
    pub status: ScanStatus,
    /// Percentage distance to the matched anchor.
    pub gap: f64,
    pub current_price: i64,
}

#[derive(Serialize, Debug)]
pub struct ScannerResponse {
    pub results: Vec<ScannerEntry>,
    pub mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Classify one quote against the ladder. None when the price sits in
/// neither band (or is unusable).
pub fn classify_price(price: i64) -> Option<(ScanStatus, f64)> {
    let adjacent = find_adjacent(price).ok()?;

    if let Some(upper) = &adjacent.upper {
        if is_near_upper(price, upper.price) {
            let gap = (upper.price - price) as f64 / upper.price as f64 * 100.0;
            return Some((ScanStatus::Watch, gap));
        }
    }
    if let Some(lower) = &adjacent.lower {
        if is_in_entry_zone(price, lower.price) {
            let gap = (price - lower.price) as f64 / lower.price as f64 * 100.0;
            return Some((ScanStatus::Entry, gap));
        }
    }
    None
}

// GET /api/scanner
pub async fn scanner_handler(
    provider: web::Data<MarketDataProvider>,
) -> Result<HttpResponse, ServiceError> {
    if provider.mode() == "mock" {
        // Deterministic stub so the dashboard stays demo-able offline.
        let results = STOCK_LIST
            .iter()
            .take(5)
            .map(|s| ScannerEntry {
                code: s.code.to_string(),
                name: s.name.to_string(),
                sector: s.sector.to_string(),
                status: ScanStatus::Entry,
                gap: 1.2,
                current_price: 50_000,
            })
            .collect();
        return Ok(HttpResponse::Ok().json(ScannerResponse {
            results,
            mode: "mock",
            message: None,
        }));
    }

    info!("[SCANNER] Scanning trading-value leaders...");

    let leaders = provider.market_leaders().await?;
    if leaders.is_empty() {
        return Ok(HttpResponse::Ok().json(ScannerResponse {
            results: Vec::new(),
            mode: "live",
            message: Some("no leader data available".to_string()),
        }));
    }

    let codes: Vec<String> = leaders.iter().map(|l| l.code.clone()).collect();
    let quotes = provider.bulk_quotes(&codes).await?;

    let mut results: Vec<ScannerEntry> = quotes
        .iter()
        .filter_map(|quote| {
            let (status, gap) = classify_price(quote.price)?;
            let sector = find_by_code(&quote.code)
                .map(|s| s.sector)
                .unwrap_or("기타");
            Some(ScannerEntry {
                code: quote.code.clone(),
                name: quote.name.clone(),
                sector: sector.to_string(),
                status,
                gap,
                current_price: quote.price,
            })
        })
        .collect();

    if results.len() < quotes.len() {
        warn!(
            "[SCANNER] {} of {} leaders outside RN bands",
            quotes.len() - results.len(),
            quotes.len()
        );
    }

    // Tightest setups first.
    results.sort_by(|a, b| a.gap.partial_cmp(&b.gap).unwrap_or(std::cmp::Ordering::Equal));

    info!(
        "[SCANNER] {} of {} leaders in an RN band",
        results.len(),
        leaders.len()
    );
    Ok(HttpResponse::Ok().json(ScannerResponse {
        results,
        mode: "live",
        message: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_watch_band() {
        // 96,500 is 3.5% under the 100,000 anchor.
        let (status, gap) = classify_price(96_500).unwrap();
        assert_eq!(status, ScanStatus::Watch);
        assert!((gap - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_classify_entry_band() {
        // 76,500 is 2% over the 75,000 anchor and 23.5% under 100,000.
        let (status, gap) = classify_price(76_500).unwrap();
        assert_eq!(status, ScanStatus::Entry);
        assert!((gap - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_classify_watch_wins_on_anchor_hit() {
        // Sitting exactly on an anchor is a 0-gap watch, not an entry.
        let (status, gap) = classify_price(50_000).unwrap();
        assert_eq!(status, ScanStatus::Watch);
        assert_eq!(gap, 0.0);
    }

    #[test]
    fn test_classify_outside_both_bands() {
        assert!(classify_price(86_000).is_none());
        assert!(classify_price(-1).is_none());
    }
}
