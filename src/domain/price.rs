//! Daily closing price series.

use super::error::VoltimerError;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Closing prices indexed by strictly increasing dates, every close finite
/// and positive.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, VoltimerError> {
        for (i, point) in points.iter().enumerate() {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(VoltimerError::InvalidPrice {
                    date: point.date,
                    value: point.close,
                });
            }
            if i > 0 && points[i - 1].date >= point.date {
                return Err(VoltimerError::UnorderedDates { date: point.date });
            }
        }
        Ok(Self { points })
    }

    /// Build from raw provider observations, dropping missing closes first.
    pub fn from_raw(raw: Vec<(NaiveDate, Option<f64>)>) -> Result<Self, VoltimerError> {
        let points = raw
            .into_iter()
            .filter_map(|(date, close)| match close {
                Some(c) if !c.is_nan() => Some(PricePoint { date, close: c }),
                _ => None,
            })
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Closing price on `date`, if the series has one.
    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].close)
    }
}
