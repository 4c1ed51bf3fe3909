// =============================================================================
// Analysis service — fetch from the provider, compute, shape for the API
// =============================================================================
//
// One stateless service object per process: it owns a cloneable HTTP client
// and a config snapshot, nothing else. Every method is a single
// fetch-then-compute cycle; results come back as `Fetched<T>` so the API
// layer can distinguish "no data for this ticker" from a provider failure
// without exceptions-as-control-flow.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::config::{AppConfig, IndicatorParams};
use crate::indicators::bollinger::{calculate_bollinger, BollingerSeries};
use crate::indicators::channels::{calculate_channels, ChannelSeries};
use crate::indicators::ema::calculate_ema;
use crate::indicators::levels::{identify_support_resistance, Levels};
use crate::indicators::macd::{calculate_macd, MacdSeries};
use crate::indicators::rsi::{calculate_rsi, current_rsi};
use crate::indicators::signals::generate_signals;
use crate::indicators::sma::{calculate_sma, current_sma};
use crate::indicators::stochastic::{calculate_stochastic, StochasticSeries};
use crate::indicators::volume::{calculate_volume_series, VolumeSeries};
use crate::market_data::PriceSeries;
use crate::options::{aggregate_chains, ChainAnalysis};
use crate::types::{Fetched, Signal};
use crate::yahoo::{Dividend, QuoteSnapshot, YahooClient};

/// History periods accepted by the provider's chart endpoint.
pub const VALID_PERIODS: &[&str] = &[
    "1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max",
];

pub fn is_valid_period(period: &str) -> bool {
    VALID_PERIODS.contains(&period)
}

/// Basic sanity check on a ticker symbol before it goes into a URL.
pub fn is_plausible_ticker(ticker: &str) -> bool {
    !ticker.is_empty()
        && ticker.len() <= 12
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
}

// =============================================================================
// Output shapes
// =============================================================================

/// One named moving-average series.
#[derive(Debug, Clone, Serialize)]
pub struct NamedSeries {
    pub period: usize,
    pub values: Vec<Option<f64>>,
}

/// Every indicator panel for one ticker, aligned to `dates`.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorReport {
    pub ticker: String,
    pub period: String,
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub moving_averages: Vec<NamedSeries>,
    pub exponential_averages: Vec<NamedSeries>,
    pub rsi: Vec<Option<f64>>,
    pub macd: MacdSeries,
    pub bollinger: BollingerSeries,
    pub stochastic: StochasticSeries,
    pub volume: VolumeSeries,
    pub channels: ChannelSeries,
}

/// Crossover signals aligned to `dates`, with the inputs that drove them.
#[derive(Debug, Clone, Serialize)]
pub struct SignalReport {
    pub ticker: String,
    pub period: String,
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub ma: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub signals: Vec<Signal>,
    /// State at the most recent bar, for the dashboard's headline widgets.
    pub latest: Option<SignalSnapshot>,
}

/// The most recent bar's signal inputs and verdict.
#[derive(Debug, Clone, Serialize)]
pub struct SignalSnapshot {
    pub date: NaiveDate,
    pub close: f64,
    pub ma: Option<f64>,
    pub rsi: Option<f64>,
    pub rsi_label: Option<&'static str>,
    pub signal: Signal,
}

/// Key financial metrics extracted from the company snapshot. Fields the
/// provider did not supply are `null`.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialMetrics {
    pub ticker: String,
    pub name: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub eps: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub volume: Option<f64>,
    pub avg_volume: Option<f64>,
}

/// Return/risk statistics over one fetched period.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetrics {
    pub total_return_pct: f64,
    pub annualized_volatility_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
    pub start_price: f64,
    pub end_price: f64,
}

/// Close prices for several tickers aligned on the union of trading dates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComparisonTable {
    pub dates: Vec<NaiveDate>,
    pub series: Vec<ComparisonColumn>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonColumn {
    pub ticker: String,
    /// Forward-filled closes; `null` before the ticker's first trading date.
    pub closes: Vec<Option<f64>>,
}

/// Options summary plus the expiry list it was computed from.
#[derive(Debug, Clone, Serialize)]
pub struct OptionsReport {
    pub ticker: String,
    pub expiry_dates: Vec<NaiveDate>,
    #[serde(flatten)]
    pub analysis: ChainAnalysis,
}

// =============================================================================
// Service
// =============================================================================

/// Stateless fetch-and-compute facade over the provider client.
#[derive(Clone)]
pub struct AnalysisService {
    client: YahooClient,
    params: IndicatorParams,
}

impl AnalysisService {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            client: YahooClient::new(
                config.provider_base_url.clone(),
                &config.provider_user_agent,
                config.request_timeout_secs,
            ),
            params: config.indicators.clone(),
        }
    }

    async fn fetch_series(&self, ticker: &str, period: &str) -> Fetched<PriceSeries> {
        match self.client.history(ticker, period).await {
            Ok(series) if series.is_empty() => Fetched::Empty,
            Ok(series) => Fetched::Data(series),
            Err(e) => Fetched::Failed(format!("{e:#}")),
        }
    }

    /// Raw OHLCV history.
    pub async fn history(&self, ticker: &str, period: &str) -> Fetched<PriceSeries> {
        self.fetch_series(ticker, period).await
    }

    /// All indicator panels for one ticker.
    pub async fn indicators(&self, ticker: &str, period: &str) -> Fetched<IndicatorReport> {
        self.fetch_series(ticker, period).await.map(|series| {
            let p = &self.params;
            let closes = series.closes();
            let highs = series.highs();
            let lows = series.lows();
            let volumes = series.volumes();

            let moving_averages = p
                .ma_periods
                .iter()
                .map(|&period| NamedSeries {
                    period,
                    values: calculate_sma(&closes, period),
                })
                .collect();
            let exponential_averages = p
                .ema_spans
                .iter()
                .map(|&span| NamedSeries {
                    period: span,
                    values: calculate_ema(&closes, span).into_iter().map(Some).collect(),
                })
                .collect();

            debug!(ticker, bars = series.len(), "indicator report computed");

            IndicatorReport {
                ticker: ticker.to_string(),
                period: period.to_string(),
                dates: series.dates(),
                moving_averages,
                exponential_averages,
                rsi: calculate_rsi(&closes, p.rsi_period),
                macd: calculate_macd(&closes, p.macd_fast, p.macd_slow, p.macd_signal),
                bollinger: calculate_bollinger(&closes, p.bollinger_period, p.bollinger_std),
                stochastic: calculate_stochastic(
                    &highs,
                    &lows,
                    &closes,
                    p.stochastic_k,
                    p.stochastic_d,
                ),
                volume: calculate_volume_series(&closes, &volumes, p.volume_ma_period),
                channels: calculate_channels(&highs, &lows, p.channel_period),
                close: closes,
            }
        })
    }

    /// Support/resistance levels; `window` falls back to the configured one.
    pub async fn levels(
        &self,
        ticker: &str,
        period: &str,
        window: Option<usize>,
    ) -> Fetched<Levels> {
        let window = window.unwrap_or(self.params.level_window);
        self.fetch_series(ticker, period)
            .await
            .map(|series| identify_support_resistance(&series.highs(), &series.lows(), window))
    }

    /// Crossover trading signals.
    pub async fn signals(&self, ticker: &str, period: &str) -> Fetched<SignalReport> {
        self.fetch_series(ticker, period).await.map(|series| {
            let closes = series.closes();
            let dates = series.dates();
            let signals = generate_signals(
                &closes,
                self.params.signal_ma_period,
                self.params.rsi_period,
            );

            let latest = match (dates.last(), closes.last()) {
                (Some(&date), Some(&close)) => {
                    let rsi_state = current_rsi(&closes, self.params.rsi_period);
                    Some(SignalSnapshot {
                        date,
                        close,
                        ma: current_sma(&closes, self.params.signal_ma_period),
                        rsi: rsi_state.map(|(v, _)| v),
                        rsi_label: rsi_state.map(|(_, label)| label),
                        signal: signals.last().copied().unwrap_or_default(),
                    })
                }
                _ => None,
            };

            SignalReport {
                ticker: ticker.to_string(),
                period: period.to_string(),
                dates,
                ma: calculate_sma(&closes, self.params.signal_ma_period),
                rsi: calculate_rsi(&closes, self.params.rsi_period),
                signals,
                latest,
                close: closes,
            }
        })
    }

    /// Return/risk statistics for the fetched period.
    pub async fn performance(&self, ticker: &str, period: &str) -> Fetched<PerformanceMetrics> {
        match self.fetch_series(ticker, period).await {
            Fetched::Data(series) => match performance_metrics(&series) {
                Some(metrics) => Fetched::Data(metrics),
                // Too short to compute anything meaningful.
                None => Fetched::Empty,
            },
            Fetched::Empty => Fetched::Empty,
            Fetched::Failed(reason) => Fetched::Failed(reason),
        }
    }

    /// Company snapshot shaped into the metrics table.
    pub async fn financial_metrics(&self, ticker: &str) -> Fetched<FinancialMetrics> {
        match self.client.quote(ticker).await {
            Ok(Some(quote)) => Fetched::Data(shape_metrics(ticker, quote)),
            Ok(None) => Fetched::Empty,
            Err(e) => Fetched::Failed(format!("{e:#}")),
        }
    }

    /// Whether the provider recognizes the symbol at all.
    pub async fn validate_ticker(&self, ticker: &str) -> Fetched<bool> {
        match self.client.quote(ticker).await {
            Ok(Some(quote)) => Fetched::Data(quote.identifies_ticker()),
            Ok(None) => Fetched::Data(false),
            Err(e) => Fetched::Failed(format!("{e:#}")),
        }
    }

    /// Dividend events over `period`, oldest first.
    pub async fn dividends(&self, ticker: &str, period: &str) -> Fetched<Vec<Dividend>> {
        match self.client.dividends(ticker, period).await {
            Ok(divs) if divs.is_empty() => Fetched::Empty,
            Ok(divs) => Fetched::Data(divs),
            Err(e) => Fetched::Failed(format!("{e:#}")),
        }
    }

    /// Close prices for several tickers, aligned and forward-filled.
    /// Tickers the provider has no data for are silently dropped; the result
    /// is `Empty` only when none survive.
    pub async fn compare(&self, tickers: &[String], period: &str) -> Fetched<ComparisonTable> {
        let mut fetched = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            match self.fetch_series(ticker, period).await {
                Fetched::Data(series) => fetched.push((ticker.clone(), series)),
                Fetched::Empty => {
                    debug!(ticker = %ticker, "no data for comparison, dropping");
                }
                Fetched::Failed(reason) => return Fetched::Failed(reason),
            }
        }
        if fetched.is_empty() {
            return Fetched::Empty;
        }
        Fetched::Data(align_closes(fetched))
    }

    /// Per-expiry options summary and enriched detail.
    pub async fn options(&self, ticker: &str) -> Fetched<OptionsReport> {
        match self.client.all_options(ticker).await {
            Ok(data) if data.is_empty() => Fetched::Empty,
            Ok(data) => Fetched::Data(OptionsReport {
                ticker: ticker.to_string(),
                expiry_dates: data.expiry_dates.clone(),
                analysis: aggregate_chains(&data),
            }),
            Err(e) => Fetched::Failed(format!("{e:#}")),
        }
    }

    /// Listed option expiry dates only.
    pub async fn option_expiries(&self, ticker: &str) -> Fetched<Vec<NaiveDate>> {
        match self.client.option_expiries(ticker).await {
            Ok(dates) if dates.is_empty() => Fetched::Empty,
            Ok(dates) => Fetched::Data(dates),
            Err(e) => Fetched::Failed(format!("{e:#}")),
        }
    }
}

// =============================================================================
// Pure helpers
// =============================================================================

/// Trading days per year, for annualization.
const TRADING_DAYS: f64 = 252.0;
/// Assumed annual risk-free rate for the Sharpe ratio.
const RISK_FREE_RATE: f64 = 0.02;

/// Compute return/risk statistics from daily closes. Needs at least three
/// bars (two daily returns) for a defined sample standard deviation.
pub fn performance_metrics(series: &PriceSeries) -> Option<PerformanceMetrics> {
    let closes = series.closes();
    let (start_price, end_price) = series.endpoints()?;
    if start_price == 0.0 {
        return None;
    }

    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    if returns.len() < 2 {
        return None;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();
    if std_dev == 0.0 {
        return None;
    }

    let annualized_volatility_pct = std_dev * TRADING_DAYS.sqrt() * 100.0;
    let sharpe_ratio = (mean * TRADING_DAYS - RISK_FREE_RATE) / (std_dev * TRADING_DAYS.sqrt());

    // Max drawdown over the cumulative return path.
    let mut cumulative = 1.0;
    let mut peak = f64::NEG_INFINITY;
    let mut max_drawdown = 0.0_f64;
    for r in &returns {
        cumulative *= 1.0 + r;
        peak = peak.max(cumulative);
        max_drawdown = max_drawdown.min((cumulative - peak) / peak);
    }

    Some(PerformanceMetrics {
        total_return_pct: (end_price - start_price) / start_price * 100.0,
        annualized_volatility_pct,
        sharpe_ratio,
        max_drawdown_pct: max_drawdown * 100.0,
        start_price,
        end_price,
    })
}

/// Align several tickers' closes on the union of their trading dates,
/// forward-filling gaps. Dates before a ticker's first bar stay `null`.
pub fn align_closes(fetched: Vec<(String, PriceSeries)>) -> ComparisonTable {
    let mut all_dates: Vec<NaiveDate> = fetched
        .iter()
        .flat_map(|(_, s)| s.dates())
        .collect();
    all_dates.sort();
    all_dates.dedup();

    let series = fetched
        .into_iter()
        .map(|(ticker, s)| {
            let by_date: HashMap<NaiveDate, f64> =
                s.bars().iter().map(|b| (b.date, b.close)).collect();
            let mut last = None;
            let closes = all_dates
                .iter()
                .map(|d| {
                    if let Some(&c) = by_date.get(d) {
                        last = Some(c);
                    }
                    last
                })
                .collect();
            ComparisonColumn { ticker, closes }
        })
        .collect();

    ComparisonTable {
        dates: all_dates,
        series,
    }
}

fn shape_metrics(ticker: &str, quote: QuoteSnapshot) -> FinancialMetrics {
    FinancialMetrics {
        ticker: ticker.to_string(),
        name: quote.long_name.or(quote.short_name),
        current_price: quote.regular_market_price,
        market_cap: quote.market_cap,
        pe_ratio: quote.trailing_pe,
        eps: quote.eps_trailing_twelve_months,
        dividend_yield: quote.trailing_annual_dividend_yield,
        beta: quote.beta,
        fifty_two_week_high: quote.fifty_two_week_high,
        fifty_two_week_low: quote.fifty_two_week_low,
        volume: quote.regular_market_volume,
        avg_volume: quote.average_daily_volume3_month,
    }
}

// =============================================================================
// Tests
// =============================================================================
