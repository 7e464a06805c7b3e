use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use foundation::TimeSpan;
use ingest::{AggregatedDataset, Aggregation, DroppedDate, MergeConflict, ProcessedPoints};

use crate::AppState;

/// Everything the renderer reads, computed once per aggregation run.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub dataset: AggregatedDataset,
    pub points: ProcessedPoints,
    pub span: Option<TimeSpan>,
    pub report: IngestReport,
}

#[derive(Debug, Default, Serialize)]
pub struct IngestReport {
    pub failures: Vec<FailureView>,
    pub conflicts: Vec<MergeConflict>,
    pub dropped: Vec<DroppedDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureView {
    pub collector: String,
    pub error: String,
}

impl Snapshot {
    pub fn build(aggregation: Aggregation, locator: &gazetteer::Locator) -> Self {
        let Aggregation {
            dataset,
            failures,
            conflicts,
            dropped,
        } = aggregation;
        let points = ingest::process(&dataset, locator);
        let span = dataset.time_span();
        let failures = failures
            .into_iter()
            .map(|f| FailureView {
                collector: f.collector,
                error: f.error.to_string(),
            })
            .collect();
        Self {
            dataset,
            points,
            span,
            report: IngestReport {
                failures,
                conflicts,
                dropped,
            },
        }
    }
}

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

pub async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

pub async fn get_points(State(state): State<AppState>) -> Json<ProcessedPoints> {
    Json(state.snapshot.points.clone())
}

pub async fn get_dataset(State(state): State<AppState>) -> Json<AggregatedDataset> {
    Json(state.snapshot.dataset.clone())
}

pub async fn get_report(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.snapshot.report))
}

pub async fn get_span(
    State(state): State<AppState>,
) -> Result<Json<TimeSpan>, (StatusCode, Json<Value>)> {
    state
        .snapshot
        .span
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "dataset has no dated records"))
}

#[derive(Debug, Deserialize)]
pub struct LocateQuery {
    pub country: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

pub async fn locate(
    State(state): State<AppState>,
    Query(q): Query<LocateQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state
        .locator
        .locate(&q.country, q.region.as_deref(), q.city.as_deref())
    {
        Some(c) => Ok(Json(json!(c))),
        None => Err(api_error(StatusCode::NOT_FOUND, "place not found")),
    }
}
