//! Rolling realized volatility.
//!
//! VOL(n)[t] = sample stddev of r[t-n+1..=t].
//! Warmup: the first (n-1) entries have no value.

use super::error::VoltimerError;
use super::returns::ReturnSeries;
use super::stats::sample_std;
use chrono::NaiveDate;

pub const DEFAULT_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolatilitySeries {
    pub window: usize,
    pub points: Vec<VolatilityPoint>,
}

impl VolatilitySeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Values past the warmup, in date order.
    pub fn defined_values(&self) -> Vec<f64> {
        self.points.iter().filter_map(|p| p.value).collect()
    }
}

pub fn rolling_volatility(
    returns: &ReturnSeries,
    window: usize,
) -> Result<VolatilitySeries, VoltimerError> {
    if window < 2 {
        return Err(VoltimerError::invalid_parameter(
            "window",
            format!("window must be at least 2, got {window}"),
        ));
    }
    if window > returns.len() {
        return Err(VoltimerError::invalid_parameter(
            "window",
            format!(
                "window {} exceeds the {} available returns",
                window,
                returns.len()
            ),
        ));
    }

    let values = returns.values();
    let warmup = window - 1;

    let points = returns
        .points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let value = if i >= warmup {
                sample_std(&values[i + 1 - window..=i])
            } else {
                None
            };
            VolatilityPoint {
                date: point.date,
                value,
            }
        })
        .collect();

    Ok(VolatilitySeries { window, points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::returns::ReturnPoint;
    use approx::assert_relative_eq;

    fn make_returns(values: &[f64]) -> ReturnSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
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

    #[test]
    fn warmup_is_absent() {
        let returns = make_returns(&[0.01, -0.02, 0.01, 0.03, -0.01]);
        let vol = rolling_volatility(&returns, 3).unwrap();

        assert_eq!(vol.len(), returns.len());
        assert!(vol.points[0].value.is_none());
        assert!(vol.points[1].value.is_none());
        assert!(vol.points[2..].iter().all(|p| p.value.is_some()));
    }

    #[test]
    fn window_two_first_value_at_second_return() {
        let r = [(1.01_f64).ln(), (99.0_f64 / 101.0).ln(), (100.0_f64 / 99.0).ln()];
        let returns = make_returns(&r);
        let vol = rolling_volatility(&returns, 2).unwrap();

        assert!(vol.points[0].value.is_none());
        let expected = (r[0] - r[1]).abs() / 2.0_f64.sqrt();
        assert_relative_eq!(vol.points[1].value.unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn constant_returns_have_zero_volatility() {
        let returns = make_returns(&[0.01; 6]);
        let vol = rolling_volatility(&returns, 4).unwrap();
        for v in vol.defined_values() {
            assert_relative_eq!(v, 0.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn window_below_two_rejected() {
        let returns = make_returns(&[0.01, 0.02]);
        let err = rolling_volatility(&returns, 1).unwrap_err();
        assert!(matches!(err, VoltimerError::InvalidParameter { name, .. } if name == "window"));
    }

    #[test]
    fn window_longer_than_series_rejected() {
        let returns = make_returns(&[0.01, 0.02, 0.03]);
        assert!(rolling_volatility(&returns, 4).is_err());
        assert!(rolling_volatility(&returns, 3).is_ok());
    }

    #[test]
    fn defined_values_skip_warmup() {
        let returns = make_returns(&[0.01, -0.01, 0.02, 0.0]);
        let vol = rolling_volatility(&returns, 2).unwrap();
        assert_eq!(vol.defined_values().len(), 3);
    }
}
