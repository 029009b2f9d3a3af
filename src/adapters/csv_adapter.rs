//! CSV file price data adapter.
//!
//! Reads `<dir>/<TICKER>.csv`. The header row must name a `Date` column and a
//! `Close` column (`Adj Close` is used when there is no plain close). Extra
//! columns are ignored, so provider downloads can be used as-is.

use crate::domain::error::VoltimerError;
use crate::ports::data_port::{PriceDataPort, RawPrice};
use chrono::NaiveDate;
use std::fs::File;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    fn read_all(&self, ticker: &str) -> Result<Vec<RawPrice>, VoltimerError> {
        let path = self.csv_path(ticker);
        let file = File::open(&path).map_err(|e| VoltimerError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
        let headers = rdr.headers()?.clone();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
        };

        let date_col = find("date").ok_or_else(|| VoltimerError::Data {
            reason: format!("{}: missing date column", path.display()),
        })?;
        let close_col = find("close")
            .or_else(|| find("adj close"))
            .ok_or_else(|| VoltimerError::Data {
                reason: format!("{}: missing close column", path.display()),
            })?;

        let mut prices = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result?;
            let date_str = record.get(date_col).unwrap_or_default();
            let date = parse_date(date_str).ok_or_else(|| VoltimerError::Data {
                reason: format!("row {}: invalid date '{}'", line + 1, date_str),
            })?;
            let close = parse_close(record.get(close_col).unwrap_or_default()).map_err(|raw| {
                VoltimerError::Data {
                    reason: format!("row {}: invalid close value '{}'", line + 1, raw),
                }
            })?;
            prices.push(RawPrice { date, close });
        }

        prices.sort_by_key(|p| p.date);
        debug!(ticker, rows = prices.len(), path = %path.display(), "read price file");
        Ok(prices)
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.split([' ', 'T']).next().unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Empty, `null` and `NaN` cells are missing observations, not errors.
fn parse_close(value: &str) -> Result<Option<f64>, String> {
    match value.to_ascii_lowercase().as_str() {
        "" | "null" | "nan" | "na" => Ok(None),
        _ => value.parse::<f64>().map(Some).map_err(|_| value.to_string()),
    }
}

impl PriceDataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<RawPrice>, VoltimerError> {
        Ok(self
            .read_all(ticker)?
            .into_iter()
            .filter(|p| start_date.is_none_or(|s| p.date >= s))
            .filter(|p| end_date.is_none_or(|e| p.date <= e))
            .collect())
    }

    fn data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, VoltimerError> {
        let prices: Vec<RawPrice> = self
            .read_all(ticker)?
            .into_iter()
            .filter(|p| p.close.is_some())
            .collect();
        match (prices.first(), prices.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, prices.len()))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        fs::write(
            path.join("SPY.csv"),
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-03,100,101,99,100.5,1000\n\
             2024-01-02,99,100,98,100.0,1000\n\
             2024-01-04,100,102,99,,1000\n\
             2024-01-05,100,102,99,101.25,1000\n",
        )
        .unwrap();
        fs::write(
            path.join("QQQ.csv"),
            "date,adj close\n2024-02-01 00:00:00,50\n2024-02-02,null\n",
        )
        .unwrap();
        fs::write(path.join("BAD.csv"), "date,close\n2024-01-02,abc\n").unwrap();
        fs::write(path.join("NOCLOSE.csv"), "date,open\n2024-01-02,1\n").unwrap();
        fs::write(path.join("EMPTY.csv"), "date,close\n").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_sorts_and_keeps_missing_as_none() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let prices = adapter.fetch_prices("SPY", None, None).unwrap();

        assert_eq!(prices.len(), 4);
        assert_eq!(prices[0].date, d(1, 2));
        assert_eq!(prices[0].close, Some(100.0));
        assert_eq!(prices[2].close, None);
        assert_eq!(prices[3].close, Some(101.25));
    }

    #[test]
    fn fetch_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let prices = adapter
            .fetch_prices("SPY", Some(d(1, 3)), Some(d(1, 4)))
            .unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].date, d(1, 3));
    }

    #[test]
    fn adj_close_and_timestamps_accepted() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let prices = adapter.fetch_prices("QQQ", None, None).unwrap();
        assert_eq!(prices[0].date, d(2, 1));
        assert_eq!(prices[0].close, Some(50.0));
        assert_eq!(prices[1].close, None);
    }

    #[test]
    fn missing_file_is_data_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let err = adapter.fetch_prices("XYZ", None, None).unwrap_err();
        assert!(matches!(err, VoltimerError::Data { .. }));
    }

    #[test]
    fn malformed_close_is_data_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(adapter.fetch_prices("BAD", None, None).is_err());
        assert!(adapter.fetch_prices("NOCLOSE", None, None).is_err());
    }

    #[test]
    fn data_range_counts_defined_closes() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(
            adapter.data_range("SPY").unwrap(),
            Some((d(1, 2), d(1, 5), 3))
        );
        assert_eq!(adapter.data_range("EMPTY").unwrap(), None);
    }
}
