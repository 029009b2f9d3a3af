//! Domain error types.

use chrono::NaiveDate;
use std::fmt;

/// Pipeline stage at which a failure was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Prices,
    Returns,
    Volatility,
    Signal,
    StrategyReturns,
    Equity,
    Metrics,
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Prices => "price series",
            Stage::Returns => "return series builder",
            Stage::Volatility => "volatility estimator",
            Stage::Signal => "signal generator",
            Stage::StrategyReturns => "strategy return calculator",
            Stage::Equity => "equity curve builder",
            Stage::Metrics => "performance metrics",
            Stage::Export => "report export",
        };
        f.write_str(name)
    }
}

/// Top-level error type for voltimer.
#[derive(Debug, thiserror::Error)]
pub enum VoltimerError {
    #[error("insufficient data: have {have} observations, need {need}")]
    InsufficientData { have: usize, need: usize },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("series misaligned at index {index}: {reason}")]
    Alignment { index: usize, reason: String },

    #[error("degenerate metric {metric}: {reason}")]
    DegenerateMetric { metric: String, reason: String },

    #[error("invalid price {value} on {date}: prices must be finite and positive")]
    InvalidPrice { date: NaiveDate, value: f64 },

    #[error("dates not strictly increasing at {date}")]
    UnorderedDates { date: NaiveDate },

    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<VoltimerError>,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("cannot write {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VoltimerError {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        VoltimerError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Tag the error with the stage that raised it. Already-tagged errors keep
    /// their original stage.
    pub fn at(self, stage: Stage) -> Self {
        match self {
            tagged @ VoltimerError::Stage { .. } => tagged,
            other => VoltimerError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The underlying error with any stage tag removed.
    pub fn root(&self) -> &VoltimerError {
        match self {
            VoltimerError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<&VoltimerError> for std::process::ExitCode {
    fn from(err: &VoltimerError) -> Self {
        let code: u8 = match err.root() {
            VoltimerError::Io(_) | VoltimerError::Csv(_) | VoltimerError::Output { .. } => 1,
            VoltimerError::ConfigParse { .. }
            | VoltimerError::ConfigMissing { .. }
            | VoltimerError::ConfigInvalid { .. } => 2,
            VoltimerError::Data { .. }
            | VoltimerError::InvalidPrice { .. }
            | VoltimerError::UnorderedDates { .. } => 3,
            VoltimerError::InvalidParameter { .. } => 4,
            VoltimerError::InsufficientData { .. }
            | VoltimerError::Alignment { .. }
            | VoltimerError::DegenerateMetric { .. } => 5,
            VoltimerError::Stage { .. } => 1,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_tag_names_the_stage() {
        let err = VoltimerError::InsufficientData { have: 1, need: 2 }.at(Stage::Returns);
        assert_eq!(
            err.to_string(),
            "return series builder failed: insufficient data: have 1 observations, need 2"
        );
    }

    #[test]
    fn stage_tag_is_not_nested() {
        let err = VoltimerError::invalid_parameter("window", "too small")
            .at(Stage::Volatility)
            .at(Stage::Metrics);
        assert!(matches!(
            err,
            VoltimerError::Stage {
                stage: Stage::Volatility,
                ..
            }
        ));
    }

    #[test]
    fn root_unwraps_stage() {
        let err = VoltimerError::Alignment {
            index: 3,
            reason: "date mismatch".into(),
        }
        .at(Stage::StrategyReturns);
        assert!(matches!(err.root(), VoltimerError::Alignment { index: 3, .. }));
    }

    #[test]
    fn output_error_names_the_path() {
        let err = VoltimerError::Output {
            path: "out/metrics.csv".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
        }
        .at(Stage::Export);
        assert_eq!(
            err.to_string(),
            "report export failed: cannot write out/metrics.csv: no such directory"
        );
    }
}
