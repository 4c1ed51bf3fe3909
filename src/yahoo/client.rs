// =============================================================================
// Yahoo Finance REST client — historical bars, quotes, options chains
// =============================================================================
//
// Talks to Yahoo Finance's unofficial JSON API:
//
//   /v8/finance/chart/{symbol}    — daily OHLCV history + dividend events
//   /v7/finance/quote             — company snapshot / financial metrics
//   /v7/finance/options/{symbol}  — expiry dates and per-expiry chains
//
// Data is delayed ~15 minutes and intended for personal use. Yahoo rejects
// requests without a browser-like User-Agent, so one is always set.
//
// Every method returns `anyhow::Result`; "the provider answered but had
// nothing" comes back as an empty collection or `None`, never as an error.
// =============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

use crate::market_data::{Bar, PriceSeries};
use crate::options::{ExpiryChain, OptionRow, OptionsData};

/// A single cash dividend event.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Dividend {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Company snapshot from the quote endpoint. Yahoo omits fields freely, so
/// everything is optional; absent values surface as `null` downstream.
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSnapshot {
    pub symbol: Option<String>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub regular_market_price: Option<f64>,
    pub regular_market_change_percent: Option<f64>,
    pub regular_market_volume: Option<f64>,
    pub average_daily_volume3_month: Option<f64>,
    pub market_cap: Option<f64>,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    pub eps_trailing_twelve_months: Option<f64>,
    pub trailing_annual_dividend_yield: Option<f64>,
    pub beta: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
}

impl QuoteSnapshot {
    /// A quote that names the instrument counts as a valid ticker.
    pub fn identifies_ticker(&self) -> bool {
        self.symbol.is_some() || self.short_name.is_some() || self.long_name.is_some()
    }
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartEntry>>,
}

#[derive(Deserialize)]
struct ChartEntry {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
    events: Option<ChartEvents>,
}

#[derive(Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

/// Column arrays aligned with `timestamp`; entries are null on half-days and
/// data gaps.
#[derive(Deserialize, Default)]
#[serde(default)]
struct ChartQuote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

#[derive(Deserialize)]
struct ChartEvents {
    dividends: Option<HashMap<String, DividendEvent>>,
}

#[derive(Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Deserialize)]
struct QuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteEnvelope,
}

#[derive(Deserialize)]
struct QuoteEnvelope {
    result: Vec<QuoteSnapshot>,
}

#[derive(Deserialize)]
struct OptionsResponse {
    #[serde(rename = "optionChain")]
    option_chain: OptionsEnvelope,
}

#[derive(Deserialize)]
struct OptionsEnvelope {
    result: Vec<OptionsEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsEntry {
    #[serde(default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    options: Vec<OptionsSlice>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsSlice {
    expiration_date: i64,
    #[serde(default)]
    calls: Vec<WireOption>,
    #[serde(default)]
    puts: Vec<WireOption>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireOption {
    contract_symbol: Option<String>,
    strike: f64,
    last_price: Option<f64>,
    bid: Option<f64>,
    ask: Option<f64>,
    volume: Option<f64>,
    open_interest: Option<f64>,
    in_the_money: Option<bool>,
}

impl From<WireOption> for OptionRow {
    fn from(w: WireOption) -> Self {
        OptionRow {
            contract_symbol: w.contract_symbol,
            strike: w.strike,
            last_price: w.last_price,
            bid: w.bid,
            ask: w.ask,
            volume: w.volume,
            open_interest: w.open_interest,
            in_the_money: w.in_the_money,
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Yahoo Finance API client. Cheap to clone; holds only the HTTP client and
/// the base URL.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    /// Create a new client against the given base URL
    /// (normally `https://query1.finance.yahoo.com`).
    pub fn new(base_url: impl Into<String>, user_agent: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url} request failed"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("provider returned {status} for {url}");
        }

        resp.json::<T>()
            .await
            .with_context(|| format!("failed to parse response from {url}"))
    }

    async fn chart(&self, ticker: &str, period: &str) -> Result<Option<ChartEntry>> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d&events=div",
            self.base_url, ticker, period
        );
        let resp: ChartResponse = self.get_json(&url).await?;
        Ok(resp.chart.result.and_then(|mut r| {
            if r.is_empty() {
                None
            } else {
                Some(r.remove(0))
            }
        }))
    }

    /// Fetch daily OHLCV history for `period` (e.g. "1y").
    ///
    /// Bars with any missing OHLC column are dropped; a missing volume is
    /// treated as zero. An unknown ticker yields an empty series.
    #[instrument(skip(self), name = "yahoo::history")]
    pub async fn history(&self, ticker: &str, period: &str) -> Result<PriceSeries> {
        let entry = match self.chart(ticker, period).await? {
            Some(e) => e,
            None => return Ok(PriceSeries::default()),
        };

        let timestamps = entry.timestamp.unwrap_or_default();
        let quote = match entry.indicators.quote.into_iter().next() {
            Some(q) => q,
            None => return Ok(PriceSeries::default()),
        };

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = match DateTime::from_timestamp(ts, 0) {
                Some(dt) => dt.date_naive(),
                None => continue,
            };
            let ohlc = (
                quote.open.get(i).copied().flatten(),
                quote.high.get(i).copied().flatten(),
                quote.low.get(i).copied().flatten(),
                quote.close.get(i).copied().flatten(),
            );
            if let (Some(open), Some(high), Some(low), Some(close)) = ohlc {
                bars.push(Bar {
                    date,
                    open,
                    high,
                    low,
                    close,
                    volume: quote.volume.get(i).copied().flatten().unwrap_or(0.0),
                });
            }
        }

        debug!(ticker, period, bars = bars.len(), "history fetched");
        Ok(PriceSeries::new(bars))
    }

    /// Fetch dividend events within `period`, oldest first.
    #[instrument(skip(self), name = "yahoo::dividends")]
    pub async fn dividends(&self, ticker: &str, period: &str) -> Result<Vec<Dividend>> {
        let entry = match self.chart(ticker, period).await? {
            Some(e) => e,
            None => return Ok(Vec::new()),
        };

        let mut dividends: Vec<Dividend> = entry
            .events
            .and_then(|e| e.dividends)
            .unwrap_or_default()
            .into_values()
            .filter_map(|d| {
                DateTime::from_timestamp(d.date, 0).map(|dt| Dividend {
                    date: dt.date_naive(),
                    amount: d.amount,
                })
            })
            .collect();
        dividends.sort_by_key(|d| d.date);

        Ok(dividends)
    }

    /// Fetch the company snapshot for `ticker`. `None` when the provider
    /// does not know the symbol.
    #[instrument(skip(self), name = "yahoo::quote")]
    pub async fn quote(&self, ticker: &str) -> Result<Option<QuoteSnapshot>> {
        let url = format!("{}/v7/finance/quote?symbols={}", self.base_url, ticker);
        let resp: QuoteResponse = self.get_json(&url).await?;
        Ok(resp.quote_response.result.into_iter().next())
    }

    /// Fetch the listed option expiry dates for `ticker`, in provider order.
    #[instrument(skip(self), name = "yahoo::expiries")]
    pub async fn option_expiries(&self, ticker: &str) -> Result<Vec<NaiveDate>> {
        let url = format!("{}/v7/finance/options/{}", self.base_url, ticker);
        let resp: OptionsResponse = self.get_json(&url).await?;

        let entry = match resp.option_chain.result.into_iter().next() {
            Some(e) => e,
            None => return Ok(Vec::new()),
        };

        Ok(entry
            .expiration_dates
            .iter()
            .filter_map(|&ts| DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()))
            .collect())
    }

    /// Fetch the calls/puts chain for one expiry. `None` when the provider
    /// has no chain for that date.
    #[instrument(skip(self), name = "yahoo::chain")]
    pub async fn option_chain(&self, ticker: &str, expiry: NaiveDate) -> Result<Option<ExpiryChain>> {
        // Yahoo keys expiries at midnight UTC.
        let ts = expiry
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);
        let url = format!("{}/v7/finance/options/{}?date={}", self.base_url, ticker, ts);
        let resp: OptionsResponse = self.get_json(&url).await?;

        let entry = match resp.option_chain.result.into_iter().next() {
            Some(e) => e,
            None => return Ok(None),
        };
        let slice = match entry.options.into_iter().next() {
            Some(s) => s,
            None => return Ok(None),
        };

        let expiry = DateTime::from_timestamp(slice.expiration_date, 0)
            .map(|dt| dt.date_naive())
            .unwrap_or(expiry);

        Ok(Some(ExpiryChain {
            expiry,
            calls: slice.calls.into_iter().map(OptionRow::from).collect(),
            puts: slice.puts.into_iter().map(OptionRow::from).collect(),
        }))
    }

    /// Fetch every expiry's chain for `ticker`. A chain that fails to fetch
    /// is logged and skipped so one bad expiry does not sink the rest.
    #[instrument(skip(self), name = "yahoo::all_options")]
    pub async fn all_options(&self, ticker: &str) -> Result<OptionsData> {
        let expiry_dates = self.option_expiries(ticker).await?;
        let mut chains = Vec::with_capacity(expiry_dates.len());

        for &expiry in &expiry_dates {
            match self.option_chain(ticker, expiry).await {
                Ok(Some(chain)) => chains.push(chain),
                Ok(None) => {
                    debug!(ticker, %expiry, "no chain returned for expiry");
                }
                Err(e) => {
                    warn!(ticker, %expiry, error = %e, "skipping expiry chain");
                }
            }
        }

        Ok(OptionsData {
            expiry_dates,
            chains,
        })
    }
}

// =============================================================================
// Tests — wire-format parsing against captured response shapes
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_response_parses_and_skips_null_bars() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704153600, 1704240000, 1704326400],
                    "indicators": {
                        "quote": [{
                            "open":  [185.0, null, 187.0],
                            "high":  [186.0, null, 189.0],
                            "low":   [184.0, null, 186.5],
                            "close": [185.5, null, 188.0],
                            "volume": [1000000, null, null]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        let entry = resp.chart.result.unwrap().remove(0);
        let quote = &entry.indicators.quote[0];
        assert_eq!(quote.close.len(), 3);
        assert!(quote.close[1].is_none());
        // The third bar has prices but a null volume.
        assert!(quote.volume[2].is_none());
        assert_eq!(quote.close[2], Some(188.0));
    }

    #[test]
    fn chart_response_without_result_is_empty() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found"}}}"#;
        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        assert!(resp.chart.result.is_none());
    }

    #[test]
    fn quote_response_parses_partial_fields() {
        let body = r#"{
            "quoteResponse": {
                "result": [{
                    "symbol": "AAPL",
                    "shortName": "Apple Inc.",
                    "regularMarketPrice": 189.95,
                    "marketCap": 2950000000000,
                    "trailingPE": 31.2,
                    "fiftyTwoWeekHigh": 199.62
                }],
                "error": null
            }
        }"#;
        let resp: QuoteResponse = serde_json::from_str(body).unwrap();
        let q = &resp.quote_response.result[0];
        assert!(q.identifies_ticker());
        assert_eq!(q.regular_market_price, Some(189.95));
        assert!(q.beta.is_none());
        assert!(q.eps_trailing_twelve_months.is_none());
    }

    #[test]
    fn options_response_parses_chain() {
        let body = r#"{
            "optionChain": {
                "result": [{
                    "expirationDates": [1768521600, 1771200000],
                    "options": [{
                        "expirationDate": 1768521600,
                        "calls": [{
                            "contractSymbol": "AAPL260116C00190000",
                            "strike": 190.0,
                            "lastPrice": 12.5,
                            "bid": 12.3,
                            "ask": 12.7,
                            "volume": 140,
                            "openInterest": 5200,
                            "inTheMoney": true
                        }],
                        "puts": [{
                            "contractSymbol": "AAPL260116P00190000",
                            "strike": 190.0,
                            "lastPrice": 9.8,
                            "openInterest": 3100
                        }]
                    }]
                }],
                "error": null
            }
        }"#;
        let resp: OptionsResponse = serde_json::from_str(body).unwrap();
        let entry = resp.option_chain.result.into_iter().next().unwrap();
        assert_eq!(entry.expiration_dates.len(), 2);
        let slice = &entry.options[0];
        assert_eq!(slice.calls[0].open_interest, Some(5200.0));
        // Sparse put row: bid/ask/volume omitted entirely.
        assert!(slice.puts[0].bid.is_none());
        assert!(slice.puts[0].volume.is_none());
    }

    #[test]
    fn dividend_events_parse() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704153600],
                    "indicators": {"quote": [{"open": [1.0], "high": [1.0], "low": [1.0], "close": [1.0], "volume": [1]}]},
                    "events": {
                        "dividends": {
                            "1705017600": {"amount": 0.24, "date": 1705017600}
                        }
                    }
                }],
                "error": null
            }
        }"#;
        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        let entry = resp.chart.result.unwrap().remove(0);
        let divs = entry.events.unwrap().dividends.unwrap();
        assert_eq!(divs.len(), 1);
        assert!((divs["1705017600"].amount - 0.24).abs() < 1e-10);
    }
}
