// src/data/naver.rs
// Public finance-site fallback client. No auth, no app keys -- used when
// the brokerage API is unconfigured or failing.

use log::warn;
use serde_json::Value;

use crate::errors::ServiceError;
use crate::types::{BulkQuote, Candle, LeaderEntry, Quote};

const QUOTE_BASE: &str = "https://api.stock.naver.com";
const CHART_BASE: &str = "https://fchart.stock.naver.com";

/// Quote plus the name/sector strings the public API bundles with it.
#[derive(Debug, Clone)]
pub struct NaverQuote {
    pub quote: Quote,
    pub name: String,
    pub sector: String,
}

pub struct NaverClient {
    http: reqwest::Client,
}

impl NaverClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Current quote and basic info for one ticker.
    pub async fn current_quote(&self, code: &str) -> Result<NaverQuote, ServiceError> {
        let res = self
            .http
            .get(format!("{}/stock/{}/basic", QUOTE_BASE, code))
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(ServiceError::UpstreamError(format!(
                "quote lookup for {} failed: {}",
                code,
                res.status()
            )));
        }

        let body: Value = res.json().await?;

        let quote = Quote {
            price: comma_int(&body, "closePrice"),
            change: comma_int(&body, "compareToPreviousClosePrice"),
            change_rate: comma_float(&body, "fluctuationsRatio"),
            volume: comma_int(&body, "accumulatedTradingVolume"),
            // KRW -> hundred-million KRW.
            trading_value: (comma_float(&body, "accumulatedTradingValue") / 100_000_000.0).round()
                as i64,
            // Hundred-million KRW -> trillion KRW.
            market_cap: (comma_float(&body, "marketCap") / 10_000.0).round(),
            high_52w: comma_int(&body, "high52WeeksPrice"),
            low_52w: comma_int(&body, "low52WeeksPrice"),
            per: comma_float(&body, "per"),
            pbr: comma_float(&body, "pbr"),
        };

        Ok(NaverQuote {
            quote,
            name: body
                .get("stockName")
                .and_then(Value::as_str)
                .unwrap_or(code)
                .to_string(),
            sector: body
                .get("industryName")
                .and_then(Value::as_str)
                .unwrap_or("기타")
                .to_string(),
        })
    }

    /// Daily candles, newest last. The chart endpoint speaks a
    /// pipe-delimited pseudo-XML: `<item data="20240226|o|h|l|c|vol" />`.
    pub async fn daily_candles(&self, code: &str, count: usize) -> Result<Vec<Candle>, ServiceError> {
        let url = format!(
            "{}/sise.nhn?symbol={}&timeframe=day&count={}&requestType=0",
            CHART_BASE, code, count
        );
        let text = self.http.get(&url).send().await?.text().await?;

        Ok(parse_chart_items(&text))
    }

    /// Trading-value leaders across KOSPI and KOSDAQ, merged and capped
    /// at 50.
    pub async fn market_leaders(&self) -> Result<Vec<LeaderEntry>, ServiceError> {
        let mut combined = Vec::new();
        for market in ["KOSPI", "KOSDAQ"] {
            let url = format!(
                "{}/ranking/stock/tradingValue/{}?page=1&pageSize=30",
                QUOTE_BASE, market
            );
            match self.fetch_ranking(&url).await {
                Ok(mut rows) => combined.append(&mut rows),
                Err(e) => warn!("[NAVER] {} ranking fetch failed: {}", market, e),
            }
        }

        combined.sort_by(|a, b| b.trading_value.cmp(&a.trading_value));
        combined.truncate(50);
        Ok(combined)
    }

    async fn fetch_ranking(&self, url: &str) -> Result<Vec<LeaderEntry>, ServiceError> {
        let body: Value = self.http.get(url).send().await?.json().await?;
        let rows = match body.get("stocks").and_then(Value::as_array) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        Ok(rows
            .iter()
            .filter_map(|row| {
                // "005930.KS" -> "005930"
                let reuters = row.get("reutersCode").and_then(Value::as_str)?;
                let code = reuters.split('.').next()?.to_string();
                Some(LeaderEntry {
                    code,
                    name: row
                        .get("stockName")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    trading_value: (comma_float(row, "accumulatedTradingValue") / 100.0).round()
                        as i64,
                })
            })
            .collect())
    }

    /// Bulk quotes via sequential single lookups. The public API rate-
    /// limits aggressive parallel callers, so failures skip the code
    /// rather than sinking the whole batch.
    pub async fn bulk_quotes(&self, codes: &[String]) -> Vec<BulkQuote> {
        let mut results = Vec::new();
        for code in codes {
            match self.current_quote(code).await {
                Ok(nq) => results.push(BulkQuote {
                    code: code.clone(),
                    name: nq.name,
                    price: nq.quote.price,
                    change: nq.quote.change,
                    change_rate: nq.quote.change_rate,
                }),
                Err(e) => warn!("[NAVER] skipping {} in bulk lookup: {}", code, e),
            }
        }
        results
    }
}

impl Default for NaverClient {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_chart_items(text: &str) -> Vec<Candle> {
    text.split("<item data=\"")
        .skip(1)
        .filter_map(|chunk| {
            let data = chunk.split('"').next()?;
            let mut parts = data.split('|');
            let time =
                chrono::NaiveDate::parse_from_str(parts.next()?, "%Y%m%d").ok()?;
            let open: i64 = parts.next()?.parse().ok()?;
            let high: i64 = parts.next()?.parse().ok()?;
            let low: i64 = parts.next()?.parse().ok()?;
            let close: i64 = parts.next()?.parse().ok()?;
            let volume: i64 = parts.next()?.parse().ok()?;

            Some(Candle {
                time,
                open,
                high,
                low,
                close,
                // The chart feed has no turnover column; estimate it from
                // close * volume, in hundred-million KRW.
                trading_value: ((close as f64 * volume as f64) / 100_000_000.0).round() as i64,
            })
        })
        .collect()
}

// The public API formats numbers as display strings ("1,234,500").

fn comma_float(v: &Value, key: &str) -> f64 {
    match v.get(key) {
        Some(Value::String(s)) => s.replace(',', "").trim().parse().unwrap_or(0.0),
        Some(n) => n.as_f64().unwrap_or(0.0),
        None => 0.0,
    }
}

fn comma_int(v: &Value, key: &str) -> i64 {
    comma_float(v, key).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chart_items() {
        let text = r#"<chartdata symbol="005930" count="2">
            <item data="20240226|80000|81000|79500|80500|1234567" />
            <item data="20240227|80500|82000|80100|81900|2345678" />
        </chartdata>"#;

        let candles = parse_chart_items(text);
        assert_eq!(candles.len(), 2);
        assert_eq!(
            candles[0].time,
            chrono::NaiveDate::from_ymd_opt(2024, 2, 26).unwrap()
        );
        assert_eq!(candles[0].close, 80_500);
        // 80,500 * 1,234,567 KRW ~= 994 hundred-million KRW.
        assert_eq!(candles[0].trading_value, 994);
        assert_eq!(candles[1].high, 82_000);
    }

    #[test]
    fn test_parse_chart_items_skips_malformed_rows() {
        let text = r#"<item data="20240226|80000|81000" /><item data="garbage" />"#;
        assert!(parse_chart_items(text).is_empty());
    }

    #[test]
    fn test_comma_number_parsing() {
        let v = serde_json::json!({"closePrice": "1,234,500", "per": 12.3, "bad": "-"});
        assert_eq!(comma_int(&v, "closePrice"), 1_234_500);
        assert_eq!(comma_float(&v, "per"), 12.3);
        assert_eq!(comma_float(&v, "bad"), 0.0);
    }
}
