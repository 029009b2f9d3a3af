//! Backtest pipeline.
//!
//! prices -> returns -> volatility -> signal -> strategy returns -> equity ->
//! metrics. Each stage is a pure function over the previous stage's output;
//! a failing stage stops the run and is named in the error.

use chrono::NaiveDate;
use tracing::{debug, info};

use super::equity::{EquitySeries, equity_curve};
use super::error::{Stage, VoltimerError};
use super::metrics::{Comparison, Metrics, TRADING_DAYS_PER_YEAR, validate_annualization_factor};
use super::price::PriceSeries;
use super::returns::{ReturnSeries, log_returns};
use super::signal::{PositionSeries, ThresholdRule, generate_signals};
use super::strategy_returns::{StrategyReturns, apply_positions};
use super::volatility::{DEFAULT_WINDOW, VolatilitySeries, rolling_volatility};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub ticker: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub window: usize,
    pub annualization_factor: f64,
    pub threshold: ThresholdRule,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            ticker: "SPY".to_string(),
            start_date: None,
            end_date: None,
            window: DEFAULT_WINDOW,
            annualization_factor: TRADING_DAYS_PER_YEAR,
            threshold: ThresholdRule::FullSample,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub prices: PriceSeries,
    pub returns: ReturnSeries,
    pub volatility: VolatilitySeries,
    pub positions: PositionSeries,
    pub strategy_returns: StrategyReturns,
    pub strategy_equity: EquitySeries,
    pub benchmark_equity: EquitySeries,
    pub metrics: Comparison,
}

impl BacktestResult {
    /// The single threshold applied across the sample, `None` for expanding rules.
    pub fn threshold(&self) -> Option<f64> {
        self.positions.constant_threshold()
    }
}

pub fn run_backtest(
    prices: &PriceSeries,
    config: &BacktestConfig,
) -> Result<BacktestResult, VoltimerError> {
    validate_annualization_factor(config.annualization_factor)
        .map_err(|e| e.at(Stage::Metrics))?;

    info!(
        ticker = %config.ticker,
        prices = prices.len(),
        window = config.window,
        threshold = %config.threshold,
        "running backtest"
    );

    let returns = log_returns(prices).map_err(|e| e.at(Stage::Returns))?;
    debug!(returns = returns.len(), "log returns computed");

    let volatility =
        rolling_volatility(&returns, config.window).map_err(|e| e.at(Stage::Volatility))?;
    debug!(
        defined = volatility.defined_values().len(),
        "rolling volatility computed"
    );

    let positions =
        generate_signals(&volatility, &config.threshold).map_err(|e| e.at(Stage::Signal))?;
    if let Some(threshold) = positions.constant_threshold() {
        info!(threshold, "volatility threshold");
    }

    let strategy_returns =
        apply_positions(&positions, &returns).map_err(|e| e.at(Stage::StrategyReturns))?;

    let strategy_equity = equity_curve(&strategy_returns.strategy);
    let benchmark_equity = equity_curve(&strategy_returns.benchmark);

    let strategy = Metrics::compute(
        &strategy_returns.strategy,
        &strategy_equity,
        config.annualization_factor,
    )
    .map_err(|e| e.at(Stage::Metrics))?;
    let benchmark = Metrics::compute(
        &strategy_returns.benchmark,
        &benchmark_equity,
        config.annualization_factor,
    )
    .map_err(|e| e.at(Stage::Metrics))?;

    info!(
        strategy_sharpe = strategy.sharpe_ratio,
        benchmark_sharpe = benchmark.sharpe_ratio,
        "backtest complete"
    );

    Ok(BacktestResult {
        prices: prices.clone(),
        returns,
        volatility,
        positions,
        strategy_returns,
        strategy_equity,
        benchmark_equity,
        metrics: Comparison {
            strategy,
            benchmark,
        },
    })
}
