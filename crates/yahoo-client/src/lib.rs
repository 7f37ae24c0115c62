//! Yahoo Finance market data provider.
//!
//! Pulls the quoteSummary modules that carry the published fields: industry
//! from `assetProfile`, the price and volume aggregates from `summaryDetail`.
//! Field extraction is all-or-nothing: a symbol missing any required field
//! yields `None` rather than a partial record.

use async_trait::async_trait;
use pulse_core::{MarketDataProvider, MarketFields, PulseError, PulseResult};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://query1.finance.yahoo.com";
const MODULES: &str = "assetProfile,summaryDetail";

/// Yahoo rejects requests without a User-Agent.
const DEFAULT_USER_AGENT: &str = "stock-pulse/0.1";

#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    user_agent: String,
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT.to_string())
    }
}

impl YahooClient {
    pub fn new(user_agent: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, user_agent }
    }

    /// Send with a single courtesy retry on HTTP 429.
    async fn send_request(&self, url: &str, symbol: &str) -> PulseResult<reqwest::Response> {
        for attempt in 0..2u32 {
            let response = self
                .client
                .get(url)
                .header(reqwest::header::USER_AGENT, &self.user_agent)
                .query(&[("modules", MODULES)])
                .send()
                .await
                .map_err(|e| PulseError::MarketData(e.to_string()))?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }

            tracing::warn!(
                "Yahoo 429 rate limited for {}, waiting before retry {}/2",
                symbol,
                attempt + 1
            );
            tokio::time::sleep(Duration::from_secs(2)).await;
        }

        Err(PulseError::MarketData(format!(
            "rate limited by Yahoo for {}",
            symbol
        )))
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn market_fields(&self, ticker: &str) -> PulseResult<Option<MarketFields>> {
        let url = format!("{}/v10/finance/quoteSummary/{}", BASE_URL, ticker);

        let response = self.send_request(&url, ticker).await?;

        // Unknown symbols come back as 404; that's "no data", not a failure.
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(PulseError::MarketData(format!(
                "HTTP {} for {}",
                response.status(),
                ticker
            )));
        }

        let summary: QuoteSummaryResponse = response
            .json()
            .await
            .map_err(|e| PulseError::MarketData(e.to_string()))?;

        Ok(extract_fields(summary))
    }
}

fn extract_fields(response: QuoteSummaryResponse) -> Option<MarketFields> {
    let result = response
        .quote_summary
        .result
        .and_then(|mut results| (!results.is_empty()).then(|| results.remove(0)))?;

    let industry = result.asset_profile?.industry?;
    let detail = result.summary_detail?;
    let previous_close = detail.previous_close?.raw?;
    let fifty_day_average = detail.fifty_day_average?.raw?;
    let average_daily_volume_10d = detail.average_daily_volume_10_day?.raw?;

    Some(MarketFields {
        industry,
        previous_close,
        fifty_day_average,
        average_daily_volume_10d: average_daily_volume_10d as i64,
    })
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(rename = "assetProfile")]
    asset_profile: Option<AssetProfile>,
    #[serde(rename = "summaryDetail")]
    summary_detail: Option<SummaryDetail>,
}

#[derive(Debug, Deserialize)]
struct AssetProfile {
    industry: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryDetail {
    #[serde(rename = "previousClose")]
    previous_close: Option<RawValue>,
    #[serde(rename = "fiftyDayAverage")]
    fifty_day_average: Option<RawValue>,
    #[serde(rename = "averageDailyVolume10Day")]
    average_daily_volume_10_day: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}
