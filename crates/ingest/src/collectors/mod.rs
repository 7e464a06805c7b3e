//! Collectors for the tabular sources the outbreak datasets ship as.
//!
//! Rows arrive already split into `column -> cell` maps; reading the files
//! themselves is left to whatever CSV reader the caller uses.

use std::collections::BTreeMap;

pub mod country_timeseries;
pub mod guinea;

pub use country_timeseries::*;
pub use guinea::*;

/// One table row keyed by column header.
pub type Row = BTreeMap<String, String>;

/// Integer cell value, or `None` for blanks and non-numeric text.
pub(crate) fn parse_count(cell: &str) -> Option<u64> {
    cell.trim().replace(',', "").parse::<u64>().ok()
}

#[cfg(test)]
pub(crate) fn row(cells: &[(&str, &str)]) -> Row {
    cells
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
