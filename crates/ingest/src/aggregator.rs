//! Merge stage: runs every collector, waits for all of them, and unions
//! their records into one [`AggregatedDataset`].

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::canonical::{AggregatedDataset, CanonicalRecord, Field, Tally};
use crate::collector::{Collector, CollectorError};

/// How records that share a date key are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Recursive merge at every level. When two sources report the same
    /// place and date, the first-seen value is kept, missing fields are
    /// filled from later sources, and disagreements are reported.
    #[default]
    DeepMerge,
    /// Date-level union: the first source to report a date owns that date's
    /// whole subtree and later sources' data for it is dropped.
    FirstWins,
}

impl std::str::FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "deep" | "deep-merge" => Ok(MergeStrategy::DeepMerge),
            "first-wins" | "legacy" => Ok(MergeStrategy::FirstWins),
            other => Err(format!("unknown merge strategy: {other}")),
        }
    }
}

/// Two sources disagree about one count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeConflict {
    pub date: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub field: Field,
    pub kept: u64,
    pub rejected: u64,
    pub source: String,
}

/// A date subtree discarded by [`MergeStrategy::FirstWins`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedDate {
    pub date: String,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub dataset: AggregatedDataset,
    pub conflicts: Vec<MergeConflict>,
    pub dropped: Vec<DroppedDate>,
}

/// Incremental merge of collector outputs in the order they are added.
#[derive(Debug, Default)]
pub struct Merger {
    strategy: MergeStrategy,
    outcome: MergeOutcome,
}

impl Merger {
    pub fn new(strategy: MergeStrategy) -> Self {
        Self {
            strategy,
            outcome: MergeOutcome::default(),
        }
    }

    pub fn add(&mut self, source: &str, record: CanonicalRecord) {
        for (date, countries) in record.dates {
            let dataset = &mut self.outcome.dataset;
            match self.strategy {
                MergeStrategy::FirstWins => {
                    if dataset.dates.contains_key(&date) {
                        warn!(source, date = %date, "date already collected; dropping this source's data for it");
                        self.outcome.dropped.push(DroppedDate {
                            date,
                            source: source.to_string(),
                        });
                    } else {
                        dataset.dates.insert(date, countries);
                    }
                }
                MergeStrategy::DeepMerge => {
                    // Every level is created up front so empty subtrees survive.
                    let merged_countries = dataset.dates.entry(date.clone()).or_default();
                    for (country, regions) in countries {
                        let merged_regions = merged_countries.entry(country.clone()).or_default();
                        for (region, cities) in regions {
                            let merged_cities = merged_regions.entry(region.clone()).or_default();
                            for (city, incoming) in cities {
                                let existing = merged_cities.entry(city.clone()).or_default();
                                for field in Field::ALL {
                                    let Some(rejected) = merge_field(existing, incoming, field) else {
                                        continue;
                                    };
                                    let kept = existing.get(field).unwrap_or_default();
                                    warn!(
                                        source,
                                        date = %date,
                                        country = %country,
                                        region = %region,
                                        city = %city,
                                        field = field.as_str(),
                                        kept,
                                        rejected,
                                        "conflicting values for the same place and date"
                                    );
                                    self.outcome.conflicts.push(MergeConflict {
                                        date: date.clone(),
                                        country: country.clone(),
                                        region: region.clone(),
                                        city: city.clone(),
                                        field,
                                        kept,
                                        rejected,
                                        source: source.to_string(),
                                    });
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    pub fn finish(self) -> MergeOutcome {
        self.outcome
    }
}

/// Fills `field` from `incoming` when absent; returns the incoming value when
/// it disagrees with one already present.
fn merge_field(existing: &mut Tally, incoming: Tally, field: Field) -> Option<u64> {
    match (existing.get(field), incoming.get(field)) {
        (None, Some(v)) => {
            existing.set(field, v);
            None
        }
        (Some(a), Some(b)) if a != b => Some(b),
        _ => None,
    }
}

/// Deep-merge already collected records in order.
pub fn aggregate(outputs: impl IntoIterator<Item = CanonicalRecord>) -> AggregatedDataset {
    let mut merger = Merger::new(MergeStrategy::DeepMerge);
    for (i, record) in outputs.into_iter().enumerate() {
        merger.add(&format!("#{i}"), record);
    }
    merger.finish().dataset
}

#[derive(Debug, Clone, Default)]
pub struct AggregatorConfig {
    /// Upper bound on each collector's run time. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub strategy: MergeStrategy,
}

#[derive(Debug)]
pub struct CollectorFailure {
    pub collector: String,
    pub error: CollectorError,
}

/// Result of one aggregation run. Failures degrade the dataset, they never
/// abort it; if every collector fails the dataset is simply empty.
#[derive(Debug, Default)]
pub struct Aggregation {
    pub dataset: AggregatedDataset,
    pub failures: Vec<CollectorFailure>,
    pub conflicts: Vec<MergeConflict>,
    pub dropped: Vec<DroppedDate>,
}

#[derive(Default)]
pub struct Aggregator {
    collectors: Vec<Arc<dyn Collector>>,
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self {
            collectors: Vec::new(),
            config,
        }
    }

    pub fn with_collector(mut self, collector: impl Collector + 'static) -> Self {
        self.add_collector(Arc::new(collector));
        self
    }

    pub fn add_collector(&mut self, collector: Arc<dyn Collector>) {
        self.collectors.push(collector);
    }

    pub fn collector_count(&self) -> usize {
        self.collectors.len()
    }

    /// Run every collector on its own task, wait for all of them, then merge
    /// the successful outputs in registration order.
    pub async fn collect(&self) -> Aggregation {
        let timeout = self.config.timeout;
        let handles: Vec<_> = self
            .collectors
            .iter()
            .map(|collector| {
                let collector = Arc::clone(collector);
                tokio::spawn(async move {
                    info!(collector = collector.name(), "collector started");
                    match timeout {
                        Some(limit) => tokio::time::timeout(limit, collector.collect())
                            .await
                            .unwrap_or(Err(CollectorError::TimedOut(limit.as_millis()))),
                        None => collector.collect().await,
                    }
                })
            })
            .collect();

        let mut outputs = Vec::with_capacity(handles.len());
        for (collector, handle) in self.collectors.iter().zip(handles) {
            let result = handle
                .await
                .unwrap_or_else(|e| Err(CollectorError::Panicked(e.to_string())));
            outputs.push((collector.name().to_string(), result));
        }

        let mut merger = Merger::new(self.config.strategy);
        let mut failures = Vec::new();
        for (name, result) in outputs {
            match result {
                Ok(record) => {
                    info!(collector = %name, dates = record.date_count(), "collector finished");
                    merger.add(&name, record);
                }
                Err(error) => {
                    warn!(collector = %name, %error, "collector failed");
                    failures.push(CollectorFailure {
                        collector: name,
                        error,
                    });
                }
            }
        }

        let MergeOutcome {
            dataset,
            conflicts,
            dropped,
        } = merger.finish();
        info!(
            dates = dataset.date_count(),
            failures = failures.len(),
            conflicts = conflicts.len(),
            "aggregation complete"
        );
        Aggregation {
            dataset,
            failures,
            conflicts,
            dropped,
        }
    }
}
