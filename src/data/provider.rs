// src/data/provider.rs
// Provider chain: brokerage API -> public finance API -> deterministic
// mock. Snapshot requests always succeed; the source tag says how.

use chrono::{Duration, Utc};
use log::{info, warn};
use std::env;

use crate::data::kis::{KisClient, KisConfig};
use crate::data::mock::generate_mock_candles;
use crate::data::naver::NaverClient;
use crate::errors::ServiceError;
use crate::types::{
    BulkQuote, DataSource, LeaderEntry, ListedStock, MarketCapTier, StockSnapshot,
};

/// Calendar days of daily candles requested from live providers.
const CANDLE_LOOKBACK_DAYS: i64 = 120;
/// Row count for the public chart endpoint (it caps around 100).
const NAVER_CANDLE_COUNT: usize = 100;

/// Placeholder capitalizations (trillion KRW) when no live quote is
/// available to supply a real one.
const MOCK_LARGE_CAP: f64 = 50.0;
const MOCK_MID_CAP: f64 = 5.0;

pub struct MarketDataProvider {
    kis: Option<KisClient>,
    naver: NaverClient,
    live_enabled: bool,
}

impl MarketDataProvider {
    pub fn from_env() -> Self {
        let live_enabled = env::var("ENABLE_LIVE_DATA")
            .unwrap_or_else(|_| "true".to_string())
            .trim()
            .to_lowercase()
            == "true";

        let config = KisConfig::from_env();
        let kis = if live_enabled && config.is_configured() {
            info!("[DATA] KIS API keys configured - live data mode");
            Some(KisClient::new(config))
        } else {
            if live_enabled {
                warn!("[DATA] KIS API keys missing - falling back to public/mock data");
            } else {
                warn!("[DATA] Live data disabled - mock data mode");
            }
            None
        };

        Self {
            kis,
            naver: NaverClient::new(),
            live_enabled,
        }
    }

    /// Reported on the health endpoint.
    pub fn mode(&self) -> &'static str {
        if self.kis.is_some() {
            "live"
        } else {
            "mock"
        }
    }

    /// Full snapshot for one listed ticker. Walks the provider chain and
    /// never fails: the mock generator is the floor.
    pub async fn stock_snapshot(&self, stock: &ListedStock) -> StockSnapshot {
        let mut live_attempted = false;

        if let Some(kis) = &self.kis {
            live_attempted = true;
            match self.snapshot_from_kis(kis, stock).await {
                Ok(snapshot) => return snapshot,
                Err(e) => warn!("[DATA] KIS fetch for {} failed: {}", stock.code, e),
            }
        }

        if self.live_enabled {
            live_attempted = true;
            match self.snapshot_from_naver(stock).await {
                Ok(snapshot) => return snapshot,
                Err(e) => warn!("[DATA] Naver fetch for {} failed: {}", stock.code, e),
            }
        }

        self.mock_snapshot(
            stock,
            if live_attempted {
                DataSource::MockFallback
            } else {
                DataSource::Mock
            },
        )
    }

    async fn snapshot_from_kis(
        &self,
        kis: &KisClient,
        stock: &ListedStock,
    ) -> Result<StockSnapshot, ServiceError> {
        let end = Utc::now().date_naive();
        let start = end - Duration::days(CANDLE_LOOKBACK_DAYS);

        let (quote, candles) = tokio::try_join!(
            kis.current_quote(stock.code),
            kis.daily_candles(stock.code, start, end)
        )?;

        Ok(StockSnapshot {
            code: stock.code.to_string(),
            name: stock.name.to_string(),
            sector: stock.sector.to_string(),
            tier: stock.tier,
            market_cap: quote.market_cap,
            candles,
            current_price: Some(quote.price),
            change: Some(quote.change),
            change_rate: Some(quote.change_rate),
            trading_value: Some(quote.trading_value),
            source: DataSource::Kis,
        })
    }

    async fn snapshot_from_naver(&self, stock: &ListedStock) -> Result<StockSnapshot, ServiceError> {
        let (quote, candles) = tokio::try_join!(
            self.naver.current_quote(stock.code),
            self.naver.daily_candles(stock.code, NAVER_CANDLE_COUNT)
        )?;

        if candles.is_empty() {
            return Err(ServiceError::UpstreamError(format!(
                "no chart data for {}",
                stock.code
            )));
        }

        Ok(StockSnapshot {
            code: stock.code.to_string(),
            name: stock.name.to_string(),
            sector: stock.sector.to_string(),
            tier: stock.tier,
            market_cap: quote.quote.market_cap,
            candles,
            current_price: Some(quote.quote.price),
            change: Some(quote.quote.change),
            change_rate: Some(quote.quote.change_rate),
            trading_value: Some(quote.quote.trading_value),
            source: DataSource::Naver,
        })
    }

    fn mock_snapshot(&self, stock: &ListedStock, source: DataSource) -> StockSnapshot {
        let market_cap = match stock.tier {
            MarketCapTier::Large => MOCK_LARGE_CAP,
            _ => MOCK_MID_CAP,
        };

        StockSnapshot {
            code: stock.code.to_string(),
            name: stock.name.to_string(),
            sector: stock.sector.to_string(),
            tier: stock.tier,
            market_cap,
            candles: generate_mock_candles(stock.code),
            current_price: None,
            change: None,
            change_rate: None,
            trading_value: None,
            source,
        }
    }

    /// Trading-value leaders for the scanner. Errors here are real: the
    /// scanner's mock path is handled by its caller.
    pub async fn market_leaders(&self) -> Result<Vec<LeaderEntry>, ServiceError> {
        if let Some(kis) = &self.kis {
            match kis.market_leaders().await {
                Ok(leaders) if !leaders.is_empty() => return Ok(leaders),
                Ok(_) => warn!("[DATA] KIS leaders ranking came back empty"),
                Err(e) => warn!("[DATA] KIS leaders fetch failed: {}", e),
            }
        }
        self.naver.market_leaders().await
    }

    /// Bulk quotes for the scanner's leader codes.
    pub async fn bulk_quotes(&self, codes: &[String]) -> Result<Vec<BulkQuote>, ServiceError> {
        if let Some(kis) = &self.kis {
            match kis.bulk_quotes(codes).await {
                Ok(quotes) if !quotes.is_empty() => return Ok(quotes),
                Ok(_) => warn!("[DATA] KIS bulk quote came back empty"),
                Err(e) => warn!("[DATA] KIS bulk quote failed: {}", e),
            }
        }
        Ok(self.naver.bulk_quotes(codes).await)
    }
}
