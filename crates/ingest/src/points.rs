use std::collections::{BTreeMap, HashMap};

use foundation::Coordinates;
use gazetteer::Locator;
use serde::Serialize;
use tracing::debug;

use crate::canonical::{AggregatedDataset, Tally, UNKNOWN_CITY, UNKNOWN_REGION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceKind {
    Country,
    Region,
    City,
}

impl PlaceKind {
    /// Kind implied by the depth of a dot-joined place key.
    pub fn of_key(place_key: &str) -> Self {
        match place_key.splitn(3, '.').count() {
            1 => PlaceKind::Country,
            2 => PlaceKind::Region,
            _ => PlaceKind::City,
        }
    }
}

/// One plottable place with its per-date counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacePoint {
    pub place_key: String,
    pub kind: PlaceKind,
    pub series: BTreeMap<String, Tally>,
    pub coordinates: Option<Coordinates>,
}

/// Running extent of case and death counts, used to normalize point sizes.
///
/// A fresh range is empty: minimums start at `+inf` and maximums at `-inf`
/// until the first value is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatRange {
    pub cases_min: f64,
    pub cases_max: f64,
    pub deaths_min: f64,
    pub deaths_max: f64,
}

impl Default for StatRange {
    fn default() -> Self {
        Self {
            cases_min: f64::INFINITY,
            cases_max: f64::NEG_INFINITY,
            deaths_min: f64::INFINITY,
            deaths_max: f64::NEG_INFINITY,
        }
    }
}

impl StatRange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Widen with whichever counts are present.
    pub fn record(&mut self, tally: &Tally) {
        if let Some(c) = tally.cases {
            let c = c as f64;
            self.cases_min = self.cases_min.min(c);
            self.cases_max = self.cases_max.max(c);
        }
        if let Some(d) = tally.deaths {
            let d = d as f64;
            self.deaths_min = self.deaths_min.min(d);
            self.deaths_max = self.deaths_max.max(d);
        }
    }

    pub fn has_cases(&self) -> bool {
        self.cases_min <= self.cases_max
    }

    pub fn has_deaths(&self) -> bool {
        self.deaths_min <= self.deaths_max
    }

    pub fn normalize_cases(&self, value: u64) -> f64 {
        normalize(value as f64, self.cases_min, self.cases_max)
    }

    pub fn normalize_deaths(&self, value: u64) -> f64 {
        normalize(value as f64, self.deaths_min, self.deaths_max)
    }
}

fn normalize(v: f64, min: f64, max: f64) -> f64 {
    if min > max {
        return 0.0;
    }
    if max == min {
        return 1.0;
    }
    ((v - min) / (max - min)).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessedPoints {
    pub points: Vec<PlacePoint>,
    pub range: StatRange,
}

/// Pivot the date-major dataset into one point per place and geocode it.
///
/// Only country rollups (region `ZZ`, city `Unknown`) become points. Points
/// are ordered by first appearance while scanning dates, then countries, in
/// map order.
pub fn process(dataset: &AggregatedDataset, locator: &Locator) -> ProcessedPoints {
    let mut points: Vec<PlacePoint> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut range = StatRange::new();

    for (date, countries) in &dataset.dates {
        for (country, regions) in countries {
            let Some(tally) = regions
                .get(UNKNOWN_REGION)
                .and_then(|cities| cities.get(UNKNOWN_CITY))
            else {
                continue;
            };

            let slot = *index.entry(country.as_str()).or_insert_with(|| {
                points.push(PlacePoint {
                    place_key: country.clone(),
                    kind: PlaceKind::Country,
                    series: BTreeMap::new(),
                    coordinates: None,
                });
                points.len() - 1
            });
            points[slot].series.insert(date.clone(), *tally);
            range.record(tally);
        }
    }

    for point in &mut points {
        point.coordinates = locator.locate_key(&point.place_key);
        if point.coordinates.is_none() {
            debug!(place = %point.place_key, "no coordinates for place");
        }
    }

    ProcessedPoints { points, range }
}
