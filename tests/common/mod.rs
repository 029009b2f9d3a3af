#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use voltimer::domain::error::VoltimerError;
use voltimer::domain::price::{PricePoint, PriceSeries};
use voltimer::domain::returns::{ReturnPoint, ReturnSeries};
use voltimer::ports::data_port::{PriceDataPort, RawPrice};

pub struct MockDataPort {
    pub data: HashMap<String, Vec<RawPrice>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_closes(mut self, ticker: &str, start: &str, closes: &[f64]) -> Self {
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
        let prices = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| RawPrice {
                date: start + chrono::Duration::days(i as i64),
                close: Some(c),
            })
            .collect();
        self.data.insert(ticker.to_string(), prices);
        self
    }

    pub fn with_raw(mut self, ticker: &str, prices: Vec<RawPrice>) -> Self {
        self.data.insert(ticker.to_string(), prices);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PriceDataPort for MockDataPort {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<RawPrice>, VoltimerError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(VoltimerError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|p| start_date.is_none_or(|s| p.date >= s))
            .filter(|p| end_date.is_none_or(|e| p.date <= e))
            .collect())
    }

    fn data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, VoltimerError> {
        match self.data.get(ticker) {
            Some(p) if !p.is_empty() => Ok(Some((p[0].date, p[p.len() - 1].date, p.len()))),
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_prices(closes: &[f64]) -> PriceSeries {
    let start = date(2024, 1, 1);
    PriceSeries::new(
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                close,
            })
            .collect(),
    )
    .unwrap()
}

pub fn make_returns(values: &[f64]) -> ReturnSeries {
    let start = date(2024, 1, 2);
    ReturnSeries::new(
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| ReturnPoint {
                date: start + chrono::Duration::days(i as i64),
                value,
            })
            .collect(),
    )
}

/// Deterministic price path alternating calm and turbulent stretches.
pub fn regime_prices(count: usize) -> Vec<f64> {
    let mut price = 100.0;
    let mut closes = Vec::with_capacity(count);
    for i in 0..count {
        let turbulent = (i / 25) % 2 == 1;
        let amplitude = if turbulent { 0.03 } else { 0.004 };
        let sign = if (i * 7 + i / 3) % 2 == 0 { 1.0 } else { -1.0 };
        price *= 1.0 + sign * amplitude + 0.0005;
        closes.push(price);
    }
    closes
}
