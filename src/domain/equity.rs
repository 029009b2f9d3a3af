//! Equity curves and drawdowns.
//!
//! equity[t] = exp(sum of r[0..=t]), starting from an implicit 1.0 before the
//! first return.

use super::returns::ReturnSeries;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EquitySeries {
    pub points: Vec<EquityPoint>,
}

impl EquitySeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn final_equity(&self) -> f64 {
        self.points.last().map(|p| p.equity).unwrap_or(1.0)
    }
}

pub fn equity_curve(returns: &ReturnSeries) -> EquitySeries {
    let mut cumulative = 0.0_f64;
    let points = returns
        .points
        .iter()
        .map(|r| {
            cumulative += r.value;
            EquityPoint {
                date: r.date,
                equity: cumulative.exp(),
            }
        })
        .collect();
    EquitySeries { points }
}

/// Relative decline from the running peak at each date, always <= 0.
pub fn drawdown_series(equity: &EquitySeries) -> Vec<f64> {
    let mut drawdowns = Vec::with_capacity(equity.len());
    let mut peak = f64::NEG_INFINITY;

    for point in &equity.points {
        if point.equity > peak {
            peak = point.equity;
        }
        drawdowns.push(point.equity / peak - 1.0);
    }

    drawdowns
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
    fn zero_returns_give_flat_equity() {
        let equity = equity_curve(&make_returns(&[0.0; 5]));
        assert_eq!(equity.len(), 5);
        assert!(equity.points.iter().all(|p| p.equity == 1.0));
    }

    #[test]
    fn equity_compounds_log_returns() {
        let equity = equity_curve(&make_returns(&[0.1, -0.05, 0.02]));
        assert_relative_eq!(equity.points[0].equity, 0.1_f64.exp());
        assert_relative_eq!(equity.points[2].equity, 0.07_f64.exp(), epsilon = 1e-12);
        assert_relative_eq!(equity.final_equity(), 0.07_f64.exp(), epsilon = 1e-12);
    }

    #[test]
    fn equity_is_pure() {
        let returns = make_returns(&[0.01, -0.03, 0.02]);
        assert_eq!(equity_curve(&returns), equity_curve(&returns));
    }

    #[test]
    fn empty_returns_give_empty_equity() {
        let equity = equity_curve(&ReturnSeries::default());
        assert!(equity.is_empty());
        assert_eq!(equity.final_equity(), 1.0);
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        let equity = EquitySeries {
            points: [1.0, 1.1, 0.99, 1.2]
                .iter()
                .enumerate()
                .map(|(i, &e)| EquityPoint {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).unwrap(),
                    equity: e,
                })
                .collect(),
        };
        let dd = drawdown_series(&equity);
        assert_relative_eq!(dd[0], 0.0);
        assert_relative_eq!(dd[1], 0.0);
        assert_relative_eq!(dd[2], 0.99 / 1.1 - 1.0);
        assert_relative_eq!(dd[3], 0.0);
    }
}
