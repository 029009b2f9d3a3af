//! Performance metrics for a log-return series and its equity curve.

use super::equity::{EquitySeries, drawdown_series};
use super::error::VoltimerError;
use super::returns::ReturnSeries;
use super::stats::{mean, sample_std};
use tracing::warn;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// mean(r) * factor
    pub annual_return: f64,
    /// std(r) * sqrt(factor)
    pub annual_volatility: f64,
    /// NaN when annual volatility is zero.
    pub sharpe_ratio: f64,
    /// In [-1, 0].
    pub max_drawdown: f64,
}

impl Metrics {
    pub fn compute(
        returns: &ReturnSeries,
        equity: &EquitySeries,
        annualization_factor: f64,
    ) -> Result<Self, VoltimerError> {
        validate_annualization_factor(annualization_factor)?;

        let values = returns.values();
        let (daily_mean, daily_std) = match (mean(&values), sample_std(&values)) {
            (Some(m), Some(s)) => (m, s),
            _ => {
                return Err(VoltimerError::InsufficientData {
                    have: values.len(),
                    need: 2,
                });
            }
        };

        let annual_return = daily_mean * annualization_factor;
        let annual_volatility = daily_std * annualization_factor.sqrt();
        let sharpe_ratio = sharpe(annual_return, annual_volatility).unwrap_or_else(|e| {
            warn!("{e}; reporting NaN");
            f64::NAN
        });

        Ok(Metrics {
            annual_return,
            annual_volatility,
            sharpe_ratio,
            max_drawdown: max_drawdown(equity),
        })
    }
}

pub fn validate_annualization_factor(factor: f64) -> Result<(), VoltimerError> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(VoltimerError::invalid_parameter(
            "annualization_factor",
            format!("annualization factor must be positive, got {factor}"),
        ));
    }
    Ok(())
}

pub fn sharpe(annual_return: f64, annual_volatility: f64) -> Result<f64, VoltimerError> {
    if annual_volatility == 0.0 {
        return Err(VoltimerError::DegenerateMetric {
            metric: "sharpe_ratio".into(),
            reason: "annualized volatility is zero".into(),
        });
    }
    Ok(annual_return / annual_volatility)
}

/// Worst equity / running peak - 1. Zero for an empty or non-decreasing curve.
pub fn max_drawdown(equity: &EquitySeries) -> f64 {
    drawdown_series(equity).into_iter().fold(0.0, f64::min)
}

/// Metrics record for both sides of the comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub strategy: Metrics,
    pub benchmark: Metrics,
}

impl Comparison {
    pub const STRATEGY_LABEL: &'static str = "Strategy";
    pub const BENCHMARK_LABEL: &'static str = "Buy&Hold";

    /// Rows in display order, keyed by series label.
    pub fn rows(&self) -> [(&'static str, &Metrics); 2] {
        [
            (Self::STRATEGY_LABEL, &self.strategy),
            (Self::BENCHMARK_LABEL, &self.benchmark),
        ]
    }
}
