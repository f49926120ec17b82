//! Yahoo Finance API client

use crate::api::MarketDataProvider;
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::models::{CompanyProfile, PriceBar};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
///
/// History and company data go through `yahoo_finance_api`; the public chart
/// endpoint backs up name, exchange and currency when the quote summary is
/// unavailable.
#[derive(Clone)]
pub struct YahooFinanceClient {
    http: reqwest::Client,
    chart_url: String,
    timeout: std::time::Duration,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    currency: Option<String>,
    exchange_name: Option<String>,
    full_exchange_name: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new(config: &StockConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            chart_url: config.chart_url.clone(),
            timeout: config.request_timeout,
        })
    }

    fn connector(&self) -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| StockError::Provider(e.to_string()))
    }

    async fn quote_summary(&self, ticker: &str) -> Result<yahoo::YQuoteSummary> {
        let mut connector = self.connector()?;
        connector
            .get_ticker_info(ticker)
            .await
            .map_err(|e| StockError::Provider(e.to_string()))
    }

    async fn chart_meta(&self, ticker: &str) -> Result<Option<ChartMeta>> {
        let url = format!("{}/{}", self.chart_url.trim_end_matches('/'), ticker);
        let response = self
            .http
            .get(&url)
            .query(&[("range", "1d"), ("interval", "1d")])
            .send()
            .await?
            .error_for_status()?;
        let body: ChartResponse = response.json().await?;
        Ok(body
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .map(|r| r.meta))
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    async fn price_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        let provider = self.connector()?;

        // end is inclusive: ask up to the start of the following day
        let start_odt = to_offset_datetime(start)?;
        let end_odt = to_offset_datetime(end + Duration::days(1))?;

        let response = provider
            .get_quote_history(ticker, start_odt, end_odt)
            .await
            .map_err(|e| StockError::Provider(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| StockError::Provider(e.to_string()))?;

        let mut bars: Vec<PriceBar> = quotes
            .iter()
            .filter(|q| q.close.is_finite())
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                Some(PriceBar {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: q.volume,
                })
            })
            .filter(|b| b.date >= start && b.date <= end)
            .collect();

        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Ok(bars)
    }

    async fn company_profile(&self, ticker: &str) -> Result<Option<CompanyProfile>> {
        let summary = match self.quote_summary(ticker).await {
            Ok(summary) => summary_data(summary),
            Err(e) => {
                debug!(ticker, error = %e, "Quote summary failed");
                None
            }
        };

        let mut profile = summary.map_or_else(
            || CompanyProfile::new(ticker),
            |data| profile_from_summary(ticker, data),
        );

        if profile.name.is_none() || profile.exchange.is_none() || profile.currency.is_none() {
            match self.chart_meta(ticker).await {
                Ok(Some(meta)) => fill_from_meta(&mut profile, meta),
                Ok(None) => {}
                Err(e) => debug!(ticker, error = %e, "Chart endpoint failed"),
            }
        }

        if profile.is_empty() {
            return Err(StockError::DataUnavailable {
                symbol: ticker.to_string(),
                reason: "no company data returned".to_string(),
            });
        }
        Ok(Some(profile))
    }
}

fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime> {
    let timestamp = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| StockError::InvalidDate(date.to_string()))?
        .and_utc()
        .timestamp();
    OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| StockError::InvalidDate(format!("{date}: {e}")))
}

/// First result of a quote summary answer, if Yahoo returned one
fn summary_data(summary: yahoo::YQuoteSummary) -> Option<yahoo::YSummaryData> {
    summary
        .quote_summary?
        .result?
        .into_iter()
        .next()
}

fn profile_from_summary(ticker: &str, data: yahoo::YSummaryData) -> CompanyProfile {
    let mut profile = CompanyProfile::new(ticker);

    if let Some(quote) = data.quote_type {
        profile.name = quote.long_name.or(quote.short_name);
        profile.exchange = quote.exchange;
    }

    if let Some(asset) = data.asset_profile {
        profile.sector = asset.sector;
        profile.industry = asset.industry;
        profile.country = asset.country;
        profile.summary = asset.long_business_summary;
    }

    if let Some(detail) = data.summary_detail {
        profile.market_cap = detail.market_cap.map(|v| v as f64);
        profile.pe_ratio = detail.trailing_pe.filter(|v| v.is_finite());
        profile.dividend_yield = detail.dividend_yield;
        profile.fifty_two_week_high = detail.fifty_two_week_high;
        profile.fifty_two_week_low = detail.fifty_two_week_low;
        profile.currency = detail.currency;
    }

    if profile.currency.is_none() {
        profile.currency = data.financial_data.and_then(|f| f.financial_currency);
    }

    profile
}

/// Fill name, exchange and currency from the chart metadata where missing
fn fill_from_meta(profile: &mut CompanyProfile, meta: ChartMeta) {
    if profile.name.is_none() {
        profile.name = meta.long_name.or(meta.short_name);
    }
    if profile.exchange.is_none() {
        profile.exchange = meta.full_exchange_name.or(meta.exchange_name);
    }
    if profile.currency.is_none() {
        profile.currency = meta.currency;
    }
}
