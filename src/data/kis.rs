// src/data/kis.rs
// KIS (Korea Investment & Securities) open-API client. OAuth token
// issuance and refresh live here, in an expiry-timestamped credential
// owned by the client instance -- the token is never process-global.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::{info, warn};
use serde_json::Value;
use std::env;
use tokio::sync::Mutex;

use crate::errors::ServiceError;
use crate::types::{BulkQuote, Candle, LeaderEntry, Quote};

const BASE_URL_REAL: &str = "https://openapi.koreainvestment.com:9443";
const BASE_URL_MOCK: &str = "https://openapivts.koreainvestment.com:29443";
/// Tokens are documented to last 24h; renew an hour early.
const TOKEN_LIFETIME_HOURS: i64 = 23;

#[derive(Debug, Clone)]
pub struct KisConfig {
    pub app_key: String,
    pub app_secret: String,
    pub base_url: String,
}

impl KisConfig {
    pub fn from_env() -> Self {
        let app_key = env::var("KIS_APP_KEY").unwrap_or_default();
        let app_secret = env::var("KIS_APP_SECRET").unwrap_or_default();
        let is_mock = env::var("KIS_IS_MOCK")
            .map(|v| v.trim().to_lowercase() == "true")
            .unwrap_or(false);
        let base_url = if is_mock { BASE_URL_MOCK } else { BASE_URL_REAL }.to_string();

        Self {
            app_key,
            app_secret,
            base_url,
        }
    }

    /// Real keys are much longer than 10 chars; placeholders are not.
    pub fn is_configured(&self) -> bool {
        self.app_key.len() > 10 && self.app_secret.len() > 10
    }
}

/// Expiry-timestamped OAuth credential.
#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

pub struct KisClient {
    http: reqwest::Client,
    config: KisConfig,
    token: Mutex<Option<AccessToken>>,
}

impl KisClient {
    pub fn new(config: KisConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            token: Mutex::new(None),
        }
    }

    /// Issue a fresh client-credentials token.
    async fn issue_token(&self) -> Result<AccessToken, ServiceError> {
        info!("[KIS] Requesting access token...");
        let res = self
            .http
            .post(format!("{}/oauth2/tokenP", self.config.base_url))
            .json(&serde_json::json!({
                "grant_type": "client_credentials",
                "appkey": self.config.app_key,
                "appsecret": self.config.app_secret,
            }))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ServiceError::UpstreamError(format!(
                "token issuance failed: {} {}",
                status, body
            )));
        }

        let body: Value = res.json().await?;
        let value = body
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| ServiceError::ParseError("token response missing access_token".into()))?
            .to_string();

        info!("[KIS] Access token issued");
        Ok(AccessToken {
            value,
            expires_at: Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS),
        })
    }

    /// Current bearer token, reusing the cached credential while it is
    /// still valid. `force_refresh` discards the cache first.
    async fn bearer_token(&self, force_refresh: bool) -> Result<String, ServiceError> {
        let mut slot = self.token.lock().await;
        if !force_refresh {
            if let Some(token) = slot.as_ref() {
                if token.is_valid() {
                    return Ok(token.value.clone());
                }
            }
        }

        let fresh = self.issue_token().await?;
        let value = fresh.value.clone();
        *slot = Some(fresh);
        Ok(value)
    }

    /// GET with the KIS header set; a 401 forces one token refresh and
    /// a single retry.
    async fn request(
        &self,
        path: &str,
        tr_id: &str,
        params: &[(&str, String)],
    ) -> Result<Value, ServiceError> {
        let url = format!("{}{}", self.config.base_url, path);

        let mut res = self.send_once(&url, tr_id, params, false).await?;
        if res.status() == reqwest::StatusCode::UNAUTHORIZED {
            warn!("[KIS] 401 Unauthorized, refreshing token and retrying ({})", tr_id);
            res = self.send_once(&url, tr_id, params, true).await?;
        }

        if !res.status().is_success() {
            return Err(ServiceError::UpstreamError(format!(
                "{} request failed: {}",
                tr_id,
                res.status()
            )));
        }

        Ok(res.json().await?)
    }

    async fn send_once(
        &self,
        url: &str,
        tr_id: &str,
        params: &[(&str, String)],
        force_refresh: bool,
    ) -> Result<reqwest::Response, ServiceError> {
        let token = self.bearer_token(force_refresh).await?;
        Ok(self
            .http
            .get(url)
            .query(params)
            .header("Content-Type", "application/json; charset=utf-8")
            .bearer_auth(token)
            .header("appkey", &self.config.app_key)
            .header("appsecret", &self.config.app_secret)
            .header("tr_id", tr_id)
            .header("custtype", "P")
            .send()
            .await?)
    }

    /// Current quote for one ticker.
    pub async fn current_quote(&self, code: &str) -> Result<Quote, ServiceError> {
        let body = self
            .request(
                "/uapi/domestic-stock/v1/quotations/inquire-price",
                "FHKST01010100",
                &[
                    ("FID_COND_MRKT_DIV_CODE", "J".to_string()),
                    ("FID_INPUT_ISCD", code.to_string()),
                ],
            )
            .await?;

        if body.get("rt_cd").and_then(Value::as_str) != Some("0") {
            let msg = body.get("msg1").and_then(Value::as_str).unwrap_or("unknown");
            return Err(ServiceError::UpstreamError(format!(
                "quote lookup for {} rejected: {}",
                code, msg
            )));
        }

        let output = body
            .get("output")
            .ok_or_else(|| ServiceError::ParseError("quote response missing output".into()))?;

        Ok(Quote {
            price: int_field(output, "stck_prpr"),
            change: int_field(output, "prdy_vrss"),
            change_rate: float_field(output, "prdy_ctrt"),
            volume: int_field(output, "acml_vol"),
            // Accumulated trading value comes in KRW; report it in
            // hundred-million KRW like the rest of the system.
            trading_value: (float_field(output, "acml_tr_pbmn") / 100_000_000.0).round() as i64,
            // hts_avls is in hundred-million KRW; convert to trillions.
            market_cap: (float_field(output, "hts_avls") / 10_000.0).round(),
            high_52w: int_field(output, "stck_dryy_hgpr"),
            low_52w: int_field(output, "stck_dryy_lwpr"),
            per: float_field(output, "per"),
            pbr: float_field(output, "pbr"),
        })
    }

    /// Daily candles between two dates (upstream caps at 100 rows).
    /// Upstream returns newest-first; this reverses to the ascending
    /// order the engine expects.
    pub async fn daily_candles(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Candle>, ServiceError> {
        let body = self
            .request(
                "/uapi/domestic-stock/v1/quotations/inquire-daily-itemchartprice",
                "FHKST03010100",
                &[
                    ("FID_COND_MRKT_DIV_CODE", "J".to_string()),
                    ("FID_INPUT_ISCD", code.to_string()),
                    ("FID_INPUT_DATE_1", start.format("%Y%m%d").to_string()),
                    ("FID_INPUT_DATE_2", end.format("%Y%m%d").to_string()),
                    ("FID_PERIOD_DIV_CODE", "D".to_string()),
                    ("FID_ORG_ADJ_PRC", "0".to_string()),
                ],
            )
            .await?;

        let rows = match body.get("output2").and_then(Value::as_array) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        let mut candles: Vec<Candle> = rows
            .iter()
            .filter_map(|row| {
                let raw_date = row.get("stck_bsop_date").and_then(Value::as_str)?;
                let time = NaiveDate::parse_from_str(raw_date, "%Y%m%d").ok()?;
                Some(Candle {
                    time,
                    open: int_field(row, "stck_oprc"),
                    high: int_field(row, "stck_hgpr"),
                    low: int_field(row, "stck_lwpr"),
                    close: int_field(row, "stck_clpr"),
                    trading_value: (float_field(row, "acml_tr_pbmn") / 100_000_000.0).round()
                        as i64,
                })
            })
            .collect();

        candles.reverse();
        Ok(candles)
    }

    /// Today's trading-value leaders (top 50).
    pub async fn market_leaders(&self) -> Result<Vec<LeaderEntry>, ServiceError> {
        let body = self
            .request(
                "/uapi/domestic-stock/v1/quotations/volume-rank",
                "FHKST01013100",
                &[
                    ("FID_COND_MRKT_DIV_CODE", "J".to_string()),
                    ("FID_COND_SCR_DIV_CODE", "20131".to_string()),
                    ("FID_INPUT_ISCD", "0000".to_string()),
                    ("FID_DIV_CLS_CODE", "0".to_string()),
                    ("FID_BLNG_CLS_CODE", "0".to_string()),
                    ("FID_TRGT_CLS_CODE", "0".to_string()),
                    ("FID_TRGT_EXLS_CLS_CODE", "0".to_string()),
                    ("FID_INPUT_PRICE_1", String::new()),
                    ("FID_INPUT_PRICE_2", String::new()),
                    ("FID_VOL_CNT", String::new()),
                    ("FID_INPUT_DATE_1", String::new()),
                ],
            )
            .await?;

        let rows = match body.get("output").and_then(Value::as_array) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        Ok(rows
            .iter()
            .take(50)
            .map(|row| LeaderEntry {
                code: text_field(row, "mksc_shrn_iscd"),
                name: text_field(row, "hts_kor_isnm"),
                trading_value: (float_field(row, "hts_tr_pbmn") / 100.0).round() as i64,
            })
            .collect())
    }

    /// Bulk quote lookup (upstream caps at 50 codes per call).
    pub async fn bulk_quotes(&self, codes: &[String]) -> Result<Vec<BulkQuote>, ServiceError> {
        let body = self
            .request(
                "/uapi/domestic-stock/v1/quotations/interesting-items",
                "FHKST01010400",
                &[("FID_INPUT_ISCD_1", codes.join("|"))],
            )
            .await?;

        let rows = match body.get("output").and_then(Value::as_array) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        Ok(rows
            .iter()
            .map(|row| BulkQuote {
                code: text_field(row, "mksc_shrn_iscd"),
                name: text_field(row, "hts_kor_isnm"),
                price: int_field(row, "stck_prpr"),
                change: int_field(row, "prdy_vrss"),
                change_rate: float_field(row, "prdy_ctrt"),
            })
            .collect())
    }
}

// KIS encodes numbers as strings ("71200", "-1.23"); these fall back to
// raw JSON numbers and then to zero rather than failing a whole row.

fn text_field(v: &Value, key: &str) -> String {
    v.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn float_field(v: &Value, key: &str) -> f64 {
    match v.get(key) {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        Some(n) => n.as_f64().unwrap_or(0.0),
        None => 0.0,
    }
}

fn int_field(v: &Value, key: &str) -> i64 {
    float_field(v, key).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_helpers_accept_strings_and_numbers() {
        let v = serde_json::json!({
            "price": "71200",
            "rate": "-1.23",
            "raw": 42,
            "junk": "n/a"
        });
        assert_eq!(int_field(&v, "price"), 71_200);
        assert_eq!(float_field(&v, "rate"), -1.23);
        assert_eq!(int_field(&v, "raw"), 42);
        assert_eq!(float_field(&v, "junk"), 0.0);
        assert_eq!(int_field(&v, "missing"), 0);
    }

    #[test]
    fn test_config_detects_placeholder_keys() {
        let config = KisConfig {
            app_key: "short".into(),
            app_secret: "short".into(),
            base_url: BASE_URL_REAL.into(),
        };
        assert!(!config.is_configured());

        let config = KisConfig {
            app_key: "PSabcdefghijklmnop".into(),
            app_secret: "a-long-enough-secret".into(),
            base_url: BASE_URL_REAL.into(),
        };
        assert!(config.is_configured());
    }
}
