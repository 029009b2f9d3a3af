//! Strategy and benchmark log returns.

use super::error::VoltimerError;
use super::returns::{ReturnPoint, ReturnSeries};
use super::signal::PositionSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyReturns {
    /// position[t] * r[t]
    pub strategy: ReturnSeries,
    /// r[t], buy and hold
    pub benchmark: ReturnSeries,
}

pub fn apply_positions(
    positions: &PositionSeries,
    returns: &ReturnSeries,
) -> Result<StrategyReturns, VoltimerError> {
    if positions.len() != returns.len() {
        return Err(VoltimerError::Alignment {
            index: positions.len().min(returns.len()),
            reason: format!(
                "{} positions against {} returns",
                positions.len(),
                returns.len()
            ),
        });
    }

    let mut strategy = Vec::with_capacity(returns.len());
    for (i, (signal, ret)) in positions.points.iter().zip(&returns.points).enumerate() {
        if signal.date != ret.date {
            return Err(VoltimerError::Alignment {
                index: i,
                reason: format!("position dated {} against return dated {}", signal.date, ret.date),
            });
        }
        strategy.push(ReturnPoint {
            date: ret.date,
            value: signal.position.as_f64() * ret.value,
        });
    }

    Ok(StrategyReturns {
        strategy: ReturnSeries::new(strategy),
        benchmark: returns.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::{Exposure, SignalPoint, ThresholdRule};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn make_positions(exposures: &[Exposure], start_day: u32) -> PositionSeries {
        PositionSeries {
            rule: ThresholdRule::Fixed(0.01),
            points: exposures
                .iter()
                .enumerate()
                .map(|(i, &position)| SignalPoint {
                    date: d(start_day + i as u32),
                    threshold: Some(0.01),
                    raw: Exposure::Flat,
                    position,
                })
                .collect(),
        }
    }

    fn make_returns(values: &[f64], start_day: u32) -> ReturnSeries {
        ReturnSeries::new(
            values
                .iter()
                .enumerate()
                .map(|(i, &value)| ReturnPoint {
                    date: d(start_day + i as u32),
                    value,
                })
                .collect(),
        )
    }

    #[test]
    fn strategy_masks_flat_days() {
        let positions = make_positions(&[Exposure::Flat, Exposure::Long, Exposure::Flat], 1);
        let returns = make_returns(&[0.01, -0.02, 0.03], 1);
        let result = apply_positions(&positions, &returns).unwrap();

        assert_eq!(result.strategy.values(), vec![0.0, -0.02, 0.0]);
        assert_eq!(result.benchmark, returns);
    }

    #[test]
    fn length_mismatch_is_alignment_error() {
        let positions = make_positions(&[Exposure::Long, Exposure::Long], 1);
        let returns = make_returns(&[0.01, 0.02, 0.03], 1);
        let err = apply_positions(&positions, &returns).unwrap_err();
        assert!(matches!(err, VoltimerError::Alignment { index: 2, .. }));
    }

    #[test]
    fn date_mismatch_is_alignment_error() {
        let positions = make_positions(&[Exposure::Long, Exposure::Long], 1);
        let returns = make_returns(&[0.01, 0.02], 2);
        let err = apply_positions(&positions, &returns).unwrap_err();
        assert!(matches!(err, VoltimerError::Alignment { index: 0, .. }));
    }
}
