//! Date-keyed tabular view of a backtest result for export.

use super::backtest::BacktestResult;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ResultRow {
    pub date: NaiveDate,
    pub close: f64,
    pub log_return: f64,
    pub vol: Option<f64>,
    pub threshold: Option<f64>,
    pub position_raw: u8,
    pub position: u8,
    pub strategy_log_return: f64,
    pub bh_log_return: f64,
    pub bh_equity: f64,
    pub strategy_equity: f64,
    pub strategy_drawdown: f64,
    pub bh_drawdown: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn from_result(result: &BacktestResult) -> Self {
        let strategy_dd = super::equity::drawdown_series(&result.strategy_equity);
        let bh_dd = super::equity::drawdown_series(&result.benchmark_equity);

        let rows = result
            .returns
            .points
            .iter()
            .enumerate()
            .map(|(i, ret)| {
                let signal = &result.positions.points[i];
                ResultRow {
                    date: ret.date,
                    close: result.prices.close_on(ret.date).unwrap_or(f64::NAN),
                    log_return: ret.value,
                    vol: result.volatility.points[i].value,
                    threshold: signal.threshold,
                    position_raw: signal.raw.as_u8(),
                    position: signal.position.as_u8(),
                    strategy_log_return: result.strategy_returns.strategy.points[i].value,
                    bh_log_return: result.strategy_returns.benchmark.points[i].value,
                    bh_equity: result.benchmark_equity.points[i].equity,
                    strategy_equity: result.strategy_equity.points[i].equity,
                    strategy_drawdown: strategy_dd[i],
                    bh_drawdown: bh_dd[i],
                }
            })
            .collect();

        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
