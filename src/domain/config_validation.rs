//! Configuration validation.
//!
//! Validates every config field before a backtest runs, then builds the
//! typed [`BacktestConfig`].

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::VoltimerError;
use crate::domain::metrics::TRADING_DAYS_PER_YEAR;
use crate::domain::signal::{ThresholdMode, ThresholdRule};
use crate::domain::volatility::DEFAULT_WINDOW;
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), VoltimerError> {
    validate_ticker(config)?;
    validate_window(config)?;
    validate_annualization(config)?;
    validate_threshold(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), VoltimerError> {
    match config.get_string("data", "dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(VoltimerError::ConfigMissing {
            section: "data".to_string(),
            key: "dir".to_string(),
        }),
    }
}

/// Trimmed, upper-cased ticker. The ticker names a file under the data
/// directory, so it may not be blank or contain path separators.
pub fn normalize_ticker(raw: &str) -> Result<String, &'static str> {
    let ticker = raw.trim();
    if ticker.is_empty() {
        return Err("ticker must not be blank");
    }
    if ticker.contains(['/', '\\']) || ticker == ".." {
        return Err("ticker must not contain path separators");
    }
    Ok(ticker.to_uppercase())
}

/// Build a [`BacktestConfig`] from validated settings, falling back to defaults
/// for unset keys.
pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, VoltimerError> {
    validate_backtest_config(config)?;

    let window = config.get_int("backtest", "window", DEFAULT_WINDOW as i64)? as usize;
    let threshold = match threshold_mode(config)? {
        ThresholdMode::FullSample => ThresholdRule::FullSample,
        ThresholdMode::Fixed => {
            ThresholdRule::Fixed(config.get_double("backtest", "threshold", 0.0)?)
        }
        ThresholdMode::Expanding => ThresholdRule::Expanding {
            min_periods: config.get_int("backtest", "min_periods", window as i64)? as usize,
        },
    };

    let ticker = match config.get_string("backtest", "ticker") {
        Some(raw) => normalize_ticker(&raw).map_err(|reason| invalid("ticker", reason))?,
        None => BacktestConfig::default().ticker,
    };

    Ok(BacktestConfig {
        ticker,
        start_date: config.get_date("backtest", "start_date")?,
        end_date: config.get_date("backtest", "end_date")?,
        window,
        annualization_factor: config.get_double(
            "backtest",
            "annualization_factor",
            TRADING_DAYS_PER_YEAR,
        )?,
        threshold,
    })
}

fn invalid(key: &str, reason: impl Into<String>) -> VoltimerError {
    VoltimerError::ConfigInvalid {
        section: "backtest".to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_ticker(config: &dyn ConfigPort) -> Result<(), VoltimerError> {
    if let Some(raw) = config.get_string("backtest", "ticker") {
        normalize_ticker(&raw).map_err(|reason| invalid("ticker", reason))?;
    }
    Ok(())
}

fn validate_window(config: &dyn ConfigPort) -> Result<(), VoltimerError> {
    let window = config.get_int("backtest", "window", DEFAULT_WINDOW as i64)?;
    if window < 2 {
        return Err(invalid("window", "window must be at least 2"));
    }
    Ok(())
}

fn validate_annualization(config: &dyn ConfigPort) -> Result<(), VoltimerError> {
    let factor = config.get_double("backtest", "annualization_factor", TRADING_DAYS_PER_YEAR)?;
    if !factor.is_finite() || factor <= 0.0 {
        return Err(invalid(
            "annualization_factor",
            "annualization_factor must be positive",
        ));
    }
    Ok(())
}

fn threshold_mode(config: &dyn ConfigPort) -> Result<ThresholdMode, VoltimerError> {
    match config.get_string("backtest", "threshold_mode") {
        Some(s) if !s.trim().is_empty() => s
            .parse::<ThresholdMode>()
            .map_err(|e| invalid("threshold_mode", e)),
        _ => {
            // A bare threshold implies a fixed rule.
            if config.get_string("backtest", "threshold").is_some() {
                Ok(ThresholdMode::Fixed)
            } else {
                Ok(ThresholdMode::FullSample)
            }
        }
    }
}

fn validate_threshold(config: &dyn ConfigPort) -> Result<(), VoltimerError> {
    match threshold_mode(config)? {
        ThresholdMode::FullSample => Ok(()),
        ThresholdMode::Fixed => {
            if config.get_string("backtest", "threshold").is_none() {
                return Err(VoltimerError::ConfigMissing {
                    section: "backtest".to_string(),
                    key: "threshold".to_string(),
                });
            }
            let value = config.get_double("backtest", "threshold", f64::NAN)?;
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(
                    "threshold",
                    "threshold must be a non-negative number",
                ));
            }
            Ok(())
        }
        ThresholdMode::Expanding => {
            if config.get_int("backtest", "min_periods", 1)? < 1 {
                return Err(invalid("min_periods", "min_periods must be at least 1"));
            }
            Ok(())
        }
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), VoltimerError> {
    let start = config.get_date("backtest", "start_date")?;
    let end = config.get_date("backtest", "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(invalid("start_date", "start_date must be before end_date"));
        }
    }
    Ok(())
}
