//! Log-return series builder.
//!
//! r[t] = ln(close[t] / close[t-1]). The first price has no predecessor, so
//! the return series starts at the second price date.

use super::error::VoltimerError;
use super::price::PriceSeries;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReturnSeries {
    pub points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn new(points: Vec<ReturnPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }
}

pub fn log_returns(prices: &PriceSeries) -> Result<ReturnSeries, VoltimerError> {
    if prices.len() < 2 {
        return Err(VoltimerError::InsufficientData {
            have: prices.len(),
            need: 2,
        });
    }

    let points = prices
        .points()
        .windows(2)
        .map(|w| ReturnPoint {
            date: w[1].date,
            value: (w[1].close / w[0].close).ln(),
        })
        .collect();

    Ok(ReturnSeries { points })
}
