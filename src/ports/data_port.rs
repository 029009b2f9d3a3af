//! Market data port trait.

use crate::domain::error::VoltimerError;
use chrono::NaiveDate;

/// One provider observation. `close` is `None` when the provider has no value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPrice {
    pub date: NaiveDate,
    pub close: Option<f64>,
}

pub trait PriceDataPort {
    /// Observations for `ticker` within the inclusive date bounds, sorted by date.
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<RawPrice>, VoltimerError>;

    fn data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, VoltimerError>;
}
