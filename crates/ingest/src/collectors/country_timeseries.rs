use tracing::{debug, warn};

use super::{Row, parse_count};
use crate::canonical::{CanonicalRecord, Field, UNKNOWN_CITY, UNKNOWN_REGION, normalize_date};
use crate::collector::{BoxFuture, Collector, CollectorError};

const DATE_COLUMN: &str = "Date";

/// Column country suffix -> ISO 3166-1 code.
const COUNTRIES: &[(&str, &str)] = &[
    ("Guinea", "GN"),
    ("Liberia", "LR"),
    ("SierraLeone", "SL"),
    ("Nigeria", "NG"),
    ("Senegal", "SN"),
    ("Spain", "ES"),
    ("UnitedStates", "US"),
    ("Mali", "ML"),
];

/// Country-level time series with `Cases_<Country>` and `Deaths_<Country>`
/// columns. Every value lands on the `ZZ`/`Unknown` rollup of its country.
#[derive(Debug, Clone, Default)]
pub struct CountryTimeseriesCollector {
    rows: Vec<Row>,
}

impl CountryTimeseriesCollector {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn normalize(&self) -> CanonicalRecord {
        let mut record = CanonicalRecord::new();
        for row in &self.rows {
            let raw_date = row.get(DATE_COLUMN).map(String::as_str).unwrap_or_default();
            let Some(date) = normalize_date(raw_date) else {
                warn!(date = raw_date, "skipping timeseries row with unrecognized date");
                continue;
            };
            for (column, cell) in row {
                let Some((field, country)) = parse_column(column) else {
                    continue;
                };
                if let Some(value) = parse_count(cell) {
                    record
                        .tally_mut(&date, country, UNKNOWN_REGION, UNKNOWN_CITY)
                        .set(field, value);
                }
            }
        }
        record
    }
}

fn parse_column(column: &str) -> Option<(Field, &'static str)> {
    let (kind, name) = column.split_once('_')?;
    let field = match kind {
        "Cases" => Field::Cases,
        "Deaths" => Field::Deaths,
        _ => return None,
    };
    let name: String = name.chars().filter(|c| !c.is_whitespace() && *c != '_').collect();
    COUNTRIES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, code)| (field, *code))
}

impl Collector for CountryTimeseriesCollector {
    fn name(&self) -> &str {
        "country-timeseries"
    }

    fn collect(&self) -> BoxFuture<'_, Result<CanonicalRecord, CollectorError>> {
        Box::pin(async move {
            let record = self.normalize();
            debug!(rows = self.rows.len(), dates = record.date_count(), "normalized country timeseries");
            Ok(record)
        })
    }
}
