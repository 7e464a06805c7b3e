use tracing::{debug, warn};

use super::{Row, parse_count};
use crate::canonical::{CanonicalRecord, Field, UNKNOWN_CITY, UNKNOWN_REGION, normalize_date};
use crate::collector::{BoxFuture, Collector, CollectorError};

const COUNTRY: &str = "GN";
const DATE_COLUMN: &str = "Date";
const DESCRIPTION_COLUMN: &str = "Description";
const TOTALS_COLUMN: &str = "Totals";

/// Guinea ministry situation reports.
///
/// Each report is a table with one row per statistic (`Description`) and one
/// column per prefecture, plus a `Totals` column for the national figure.
/// Only confirmed case and death totals are kept.
#[derive(Debug, Clone, Default)]
pub struct GuineaCollector {
    tables: Vec<Vec<Row>>,
}

impl GuineaCollector {
    pub fn new(tables: Vec<Vec<Row>>) -> Self {
        Self { tables }
    }

    pub fn normalize(&self) -> CanonicalRecord {
        let mut record = CanonicalRecord::new();
        for table in &self.tables {
            for row in table {
                normalize_row(row, &mut record);
            }
        }
        record
    }
}

fn description_field(description: &str) -> Option<Field> {
    match description.trim() {
        "Total cases of confirmed" => Some(Field::Cases),
        "Total deaths of confirmed" => Some(Field::Deaths),
        _ => None,
    }
}

fn normalize_row(row: &Row, record: &mut CanonicalRecord) {
    let Some(field) = row.get(DESCRIPTION_COLUMN).and_then(|d| description_field(d)) else {
        return;
    };
    let raw_date = row.get(DATE_COLUMN).map(String::as_str).unwrap_or_default();
    let Some(date) = normalize_date(raw_date) else {
        warn!(date = raw_date, "skipping guinea row with unrecognized date");
        return;
    };

    for (column, cell) in row {
        if column == DATE_COLUMN || column == DESCRIPTION_COLUMN {
            continue;
        }
        let Some(value) = parse_count(cell) else {
            continue;
        };
        let city = if column == TOTALS_COLUMN {
            UNKNOWN_CITY
        } else {
            column.as_str()
        };
        record
            .tally_mut(&date, COUNTRY, UNKNOWN_REGION, city)
            .set(field, value);
    }
}

impl Collector for GuineaCollector {
    fn name(&self) -> &str {
        "guinea"
    }

    fn collect(&self) -> BoxFuture<'_, Result<CanonicalRecord, CollectorError>> {
        Box::pin(async move {
            let record = self.normalize();
            debug!(tables = self.tables.len(), dates = record.date_count(), "normalized guinea reports");
            Ok(record)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::GuineaCollector;
    use crate::canonical::Tally;
    use crate::collector::Collector;
    use crate::collectors::row;
    use pretty_assertions::assert_eq;

    fn report() -> Vec<crate::collectors::Row> {
        vec![
            row(&[
                ("Date", "2014-08-04"),
                ("Description", "Total cases of confirmed"),
                ("Conakry", "45"),
                ("Gueckedou", "n/a"),
                ("Totals", "351"),
            ]),
            row(&[
                ("Date", "2014-08-04"),
                ("Description", "Total deaths of confirmed"),
                ("Conakry", "12"),
                ("Totals", "228"),
            ]),
            row(&[
                ("Date", "2014-08-04"),
                ("Description", "New cases of suspects"),
                ("Totals", "9"),
            ]),
        ]
    }

    #[test]
    fn maps_totals_to_unknown_city() {
        let rec = GuineaCollector::new(vec![report()]).normalize();
        let date = "2014-08-04T00:00:00Z";
        assert_eq!(rec.get(date, "GN", "ZZ", "Unknown"), Some(&Tally::new(Some(351), Some(228))));
        assert_eq!(rec.get(date, "GN", "ZZ", "Conakry"), Some(&Tally::new(Some(45), Some(12))));
        assert_eq!(rec.get(date, "GN", "ZZ", "Gueckedou"), None);
        assert_eq!(rec.entries().count(), 2);
    }

    #[test]
    fn skips_rows_with_bad_dates() {
        let rows = vec![row(&[
            ("Date", "sometime"),
            ("Description", "Total cases of confirmed"),
            ("Totals", "3"),
        ])];
        assert!(GuineaCollector::new(vec![rows]).normalize().is_empty());
    }

    #[tokio::test]
    async fn merges_multiple_reports() {
        let later = vec![row(&[
            ("Date", "2014-08-27"),
            ("Description", "Total cases of confirmed"),
            ("Totals", "400"),
        ])];
        let c = GuineaCollector::new(vec![report(), later]);
        let rec = c.collect().await.expect("collect");
        assert_eq!(rec.date_count(), 2);
        assert_eq!(
            rec.get("2014-08-27T00:00:00Z", "GN", "ZZ", "Unknown"),
            Some(&Tally::cases(400))
        );
    }
}
