//! Bar data access port trait.

use crate::domain::bar::Bar;
use crate::domain::error::IbsError;
use chrono::NaiveDate;

/// Supplies daily bars for a symbol.
///
/// Implementations return bars in the order the source holds them; ordering
/// and price sanity are checked at `BarSeries::new`, not here.
pub trait DataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, IbsError>;

    fn list_symbols(&self) -> Result<Vec<String>, IbsError>;
}
