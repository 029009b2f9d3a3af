//! Volatility-threshold exposure signal.
//!
//! raw[t] = Long when vol[t] is defined and vol[t] <= threshold, else Flat.
//! The executed position lags the raw signal by one period: position[t] =
//! raw[t-1], and position[0] is always Flat.
//!
//! [`ThresholdRule::FullSample`] takes the median over the whole history,
//! including dates after each decision. That is look-ahead and flatters the
//! strategy; [`ThresholdRule::Expanding`] only uses volatility observed up to
//! the decision date.

use super::error::VoltimerError;
use super::stats::{median, median_sorted};
use super::volatility::VolatilitySeries;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Exposure {
    #[default]
    Flat,
    Long,
}

impl Exposure {
    pub fn as_f64(self) -> f64 {
        match self {
            Exposure::Flat => 0.0,
            Exposure::Long => 1.0,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Exposure::Flat => 0,
            Exposure::Long => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ThresholdRule {
    /// Median of every defined volatility value in the sample.
    #[default]
    FullSample,
    Fixed(f64),
    /// Median of defined volatility values up to and including each date.
    /// Flat until `min_periods` values have been observed.
    Expanding { min_periods: usize },
}

impl fmt::Display for ThresholdRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdRule::FullSample => write!(f, "full_sample"),
            ThresholdRule::Fixed(value) => write!(f, "fixed({})", value),
            ThresholdRule::Expanding { min_periods } => write!(f, "expanding({})", min_periods),
        }
    }
}

/// Threshold mode name as written in config files and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdMode {
    FullSample,
    Fixed,
    Expanding,
}

impl FromStr for ThresholdMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full_sample" | "full-sample" | "median" => Ok(ThresholdMode::FullSample),
            "fixed" => Ok(ThresholdMode::Fixed),
            "expanding" => Ok(ThresholdMode::Expanding),
            other => Err(format!(
                "unknown threshold mode '{}', expected full_sample, fixed or expanding",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalPoint {
    pub date: NaiveDate,
    /// Threshold in force on this date, `None` while an expanding rule warms up.
    pub threshold: Option<f64>,
    pub raw: Exposure,
    pub position: Exposure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionSeries {
    pub rule: ThresholdRule,
    pub points: Vec<SignalPoint>,
}

impl PositionSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Single threshold applied to every date, when the rule has one.
    pub fn constant_threshold(&self) -> Option<f64> {
        match self.rule {
            ThresholdRule::Expanding { .. } => None,
            _ => self.points.first().and_then(|p| p.threshold),
        }
    }

    /// Fraction of dates with a Long executed position.
    pub fn exposure(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        let long = self
            .points
            .iter()
            .filter(|p| p.position == Exposure::Long)
            .count();
        long as f64 / self.points.len() as f64
    }
}

pub fn full_sample_threshold(volatility: &VolatilitySeries) -> Result<f64, VoltimerError> {
    let defined = volatility.defined_values();
    median(&defined).ok_or(VoltimerError::InsufficientData {
        have: 0,
        need: 1,
    })
}

fn validate_threshold(value: f64) -> Result<f64, VoltimerError> {
    if !value.is_finite() || value < 0.0 {
        return Err(VoltimerError::invalid_parameter(
            "threshold",
            format!("threshold must be finite and non-negative, got {value}"),
        ));
    }
    Ok(value)
}

fn thresholds_for(
    volatility: &VolatilitySeries,
    rule: &ThresholdRule,
) -> Result<Vec<Option<f64>>, VoltimerError> {
    let n = volatility.len();
    match *rule {
        ThresholdRule::FullSample => {
            let t = full_sample_threshold(volatility)?;
            Ok(vec![Some(t); n])
        }
        ThresholdRule::Fixed(value) => {
            let t = validate_threshold(value)?;
            Ok(vec![Some(t); n])
        }
        ThresholdRule::Expanding { min_periods } => {
            if min_periods < 1 {
                return Err(VoltimerError::invalid_parameter(
                    "min_periods",
                    "min_periods must be at least 1",
                ));
            }
            // kept in ascending order so each step is one insertion
            let mut seen: Vec<f64> = Vec::with_capacity(n);
            Ok(volatility
                .points
                .iter()
                .map(|p| {
                    if let Some(v) = p.value {
                        let at = seen.partition_point(|&s| s.total_cmp(&v).is_le());
                        seen.insert(at, v);
                    }
                    if seen.len() >= min_periods {
                        median_sorted(&seen)
                    } else {
                        None
                    }
                })
                .collect())
        }
    }
}

pub fn generate_signals(
    volatility: &VolatilitySeries,
    rule: &ThresholdRule,
) -> Result<PositionSeries, VoltimerError> {
    let thresholds = thresholds_for(volatility, rule)?;

    let mut points = Vec::with_capacity(volatility.len());
    let mut prev_raw = Exposure::Flat;

    for (point, threshold) in volatility.points.iter().zip(thresholds) {
        let raw = match (point.value, threshold) {
            (Some(v), Some(t)) if v <= t => Exposure::Long,
            _ => Exposure::Flat,
        };
        points.push(SignalPoint {
            date: point.date,
            threshold,
            raw,
            position: prev_raw,
        });
        prev_raw = raw;
    }

    Ok(PositionSeries {
        rule: *rule,
        points,
    })
}
