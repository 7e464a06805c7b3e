//! Outbreak record ingestion: the canonical nested record shape, the source
//! collectors that produce it, the merge stage that unions their outputs, and
//! the point processor that turns the merged dataset into plottable places.
//!
//! Collectors do not read spreadsheets themselves. A caller that has already
//! parsed a source into header-keyed [`collectors::Row`]s registers it with
//! [`Aggregator::add_collector`], e.g.
//! `Arc::new(CountryTimeseriesCollector::new(rows))` or
//! `Arc::new(GuineaCollector::new(tables))`. Pre-normalized JSON goes through
//! [`JsonFileCollector`], which is what the server binary uses.

pub mod aggregator;
pub mod canonical;
pub mod collector;
pub mod collectors;
pub mod points;

pub use aggregator::*;
pub use canonical::*;
pub use collector::*;
pub use points::*;
