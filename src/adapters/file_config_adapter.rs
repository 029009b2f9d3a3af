//! INI file configuration adapter.

use crate::domain::error::VoltimerError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, VoltimerError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| VoltimerError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, VoltimerError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| VoltimerError::ConfigParse {
                file: "<string>".into(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// Config with no sections; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[data]
dir = ./data

[backtest]
ticker = SPY
start_date = 2010-01-01
window = 20
annualization_factor = 252
threshold_mode = full_sample

[output]
series_csv = resultados_volatility.csv
chart_svg = equity.svg
"#;

    #[test]
    fn reads_all_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("data", "dir"), Some("./data".into()));
        assert_eq!(adapter.get_string("backtest", "ticker"), Some("SPY".into()));
        assert_eq!(adapter.get_int("backtest", "window", 0).unwrap(), 20);
        assert_eq!(
            adapter.get_double("backtest", "annualization_factor", 0.0).unwrap(),
            252.0
        );
        assert_eq!(
            adapter.get_string("output", "series_csv"),
            Some("resultados_volatility.csv".into())
        );
    }

    #[test]
    fn missing_keys_fall_back() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("backtest", "threshold"), None);
        assert_eq!(adapter.get_string("nope", "key"), None);
        assert_eq!(adapter.get_int("backtest", "min_periods", 7).unwrap(), 7);
        assert_eq!(adapter.get_double("backtest", "threshold", 0.5).unwrap(), 0.5);
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\nwindow = twenty\nthreshold = low\n")
                .unwrap();
        assert!(matches!(
            adapter.get_int("backtest", "window", 20),
            Err(VoltimerError::ConfigInvalid { key, .. }) if key == "window"
        ));
        assert!(matches!(
            adapter.get_double("backtest", "threshold", 0.01),
            Err(VoltimerError::ConfigInvalid { key, .. }) if key == "threshold"
        ));
    }

    #[test]
    fn blank_numeric_values_use_default() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nwindow =\n").unwrap();
        assert_eq!(adapter.get_int("backtest", "window", 20).unwrap(), 20);
    }

    #[test]
    fn get_date_parses_and_rejects() {
        let adapter = FileConfigAdapter::from_string(
            "[backtest]\nstart_date = 2010-01-04\nend_date = \nbad = 2010/01/04\n",
        )
        .unwrap();
        assert_eq!(
            adapter.get_date("backtest", "start_date").unwrap(),
            NaiveDate::from_ymd_opt(2010, 1, 4)
        );
        assert_eq!(adapter.get_date("backtest", "end_date").unwrap(), None);
        assert_eq!(adapter.get_date("backtest", "missing").unwrap(), None);
        assert!(matches!(
            adapter.get_date("backtest", "bad"),
            Err(VoltimerError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("output", "chart_svg"), Some("equity.svg".into()));
    }

    #[test]
    fn from_file_missing_is_config_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/voltimer.ini").unwrap_err();
        assert!(matches!(err, VoltimerError::ConfigParse { .. }));
    }

    #[test]
    fn empty_config_has_no_values() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("backtest", "ticker"), None);
        assert_eq!(adapter.get_int("backtest", "window", 20).unwrap(), 20);
    }
}
