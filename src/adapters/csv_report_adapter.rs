//! CSV export of the per-date series table and the metrics record.
//!
//! Both reports render into memory; the caller decides when they reach disk.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::VoltimerError;
use crate::domain::metrics::Comparison;
use crate::domain::table::ResultTable;
use crate::ports::report_port::ReportPort;
use tracing::debug;

pub const METRIC_COLUMNS: [&str; 4] = [
    "Annual Return (%)",
    "Annual Vol (%)",
    "Sharpe",
    "Max DD (%)",
];

/// Per-date table: one row per return date, header row first.
pub struct SeriesCsvReport;

/// Two-row metrics table indexed by series label.
pub struct MetricsCsvReport;

pub fn render_series(table: &ResultTable) -> Result<Vec<u8>, VoltimerError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in &table.rows {
        wtr.serialize(row)?;
    }
    wtr.into_inner().map_err(|e| VoltimerError::Io(e.into_error()))
}

fn fmt_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        value.to_string()
    }
}

pub fn render_metrics(comparison: &Comparison) -> Result<Vec<u8>, VoltimerError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    let mut header = vec!["series"];
    header.extend(METRIC_COLUMNS);
    wtr.write_record(&header)?;

    for (label, m) in comparison.rows() {
        wtr.write_record([
            label.to_string(),
            fmt_value(m.annual_return * 100.0),
            fmt_value(m.annual_volatility * 100.0),
            fmt_value(m.sharpe_ratio),
            fmt_value(m.max_drawdown * 100.0),
        ])?;
    }
    wtr.into_inner().map_err(|e| VoltimerError::Io(e.into_error()))
}

impl ReportPort for SeriesCsvReport {
    fn render(&self, result: &BacktestResult) -> Result<Vec<u8>, VoltimerError> {
        let table = ResultTable::from_result(result);
        debug!(rows = table.len(), "series table rendered");
        render_series(&table)
    }
}

impl ReportPort for MetricsCsvReport {
    fn render(&self, result: &BacktestResult) -> Result<Vec<u8>, VoltimerError> {
        render_metrics(&result.metrics)
    }
}
