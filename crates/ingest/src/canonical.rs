use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use foundation::{Time, TimeSpan};
use serde::{Deserialize, Deserializer, Serialize};

pub use gazetteer::{UNKNOWN_CITY, UNKNOWN_REGION};

/// Case and death counts for one place on one date.
///
/// Either count may be missing; values that were not numbers in the source
/// are treated as missing rather than rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub cases: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub deaths: Option<u64>,
}

impl Tally {
    pub fn new(cases: Option<u64>, deaths: Option<u64>) -> Self {
        Self { cases, deaths }
    }

    pub fn cases(cases: u64) -> Self {
        Self::new(Some(cases), None)
    }

    pub fn deaths(deaths: u64) -> Self {
        Self::new(None, Some(deaths))
    }

    pub fn set(&mut self, field: Field, value: u64) {
        match field {
            Field::Cases => self.cases = Some(value),
            Field::Deaths => self.deaths = Some(value),
        }
    }

    pub fn get(&self, field: Field) -> Option<u64> {
        match field {
            Field::Cases => self.cases,
            Field::Deaths => self.deaths,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Cases,
    Deaths,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::Cases, Field::Deaths];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Cases => "cases",
            Field::Deaths => "deaths",
        }
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| {
                    f.is_finite() && *f >= 0.0 && *f < u64::MAX as f64 && f.fract() == 0.0
                })
                .map(|f| f as u64)
        }),
        _ => None,
    })
}

/// city -> counts
pub type RegionSlice = BTreeMap<String, Tally>;
/// region code (or `ZZ`) -> cities
pub type CountrySlice = BTreeMap<String, RegionSlice>;
/// country code -> regions
pub type DateSlice = BTreeMap<String, CountrySlice>;

/// `date -> country -> region -> city -> {cases, deaths}`.
///
/// Dates are ISO-8601 strings; sorted map iteration therefore visits them
/// chronologically as long as every key uses the same format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalRecord {
    pub dates: BTreeMap<String, DateSlice>,
}

/// The union of every collector's output. Same shape as a single record.
pub type AggregatedDataset = CanonicalRecord;

/// One flattened leaf of a [`CanonicalRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
    pub date: &'a str,
    pub country: &'a str,
    pub region: &'a str,
    pub city: &'a str,
    pub tally: &'a Tally,
}

impl CanonicalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn date_count(&self) -> usize {
        self.dates.len()
    }

    /// Mutable counts for a place, created empty if absent.
    pub fn tally_mut(&mut self, date: &str, country: &str, region: &str, city: &str) -> &mut Tally {
        self.dates
            .entry(date.to_string())
            .or_default()
            .entry(country.to_string())
            .or_default()
            .entry(region.to_string())
            .or_default()
            .entry(city.to_string())
            .or_default()
    }

    pub fn insert(&mut self, date: &str, country: &str, region: &str, city: &str, tally: Tally) {
        *self.tally_mut(date, country, region, city) = tally;
    }

    pub fn get(&self, date: &str, country: &str, region: &str, city: &str) -> Option<&Tally> {
        self.dates.get(date)?.get(country)?.get(region)?.get(city)
    }

    /// Every leaf in map order.
    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.dates.iter().flat_map(|(date, countries)| {
            countries.iter().flat_map(move |(country, regions)| {
                regions.iter().flat_map(move |(region, cities)| {
                    cities.iter().map(move |(city, tally)| Entry {
                        date,
                        country,
                        region,
                        city,
                        tally,
                    })
                })
            })
        })
    }

    /// Span covered by the date keys that parse as timestamps.
    pub fn time_span(&self) -> Option<TimeSpan> {
        self.dates
            .keys()
            .filter_map(|d| parse_date_key(d))
            .fold(None, |span: Option<TimeSpan>, t| {
                Some(span.map_or(TimeSpan::instant(t), |s| s.extend(t)))
            })
    }
}

/// Canonical date key for midnight UTC of `date`.
pub fn date_key(date: NaiveDate) -> String {
    let midnight = date.and_time(NaiveTime::default()).and_utc();
    midnight.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DD` and `M/D/YYYY`, returning the
/// canonical key form.
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(
            ts.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        );
    }
    ["%Y-%m-%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .map(date_key)
}

pub fn parse_date_key(key: &str) -> Option<Time> {
    DateTime::parse_from_rfc3339(key)
        .ok()
        .map(|ts| Time::from_unix(ts.timestamp()))
}
