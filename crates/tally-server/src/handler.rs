use axum::extract::{Path, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use tally_indexer::{HistoryOrder, RefreshReport, ViewEntry};
use tally_node::{AppendOutcome, Record, TxId};

use crate::auth::{Credentials, RequestSubmitter};
use crate::error::{ServerError, ServerResult};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct AppendRequest {
    pub name: String,
    #[serde(default)]
    pub sum: u64,
}

#[derive(Debug, Deserialize)]
pub struct NameOnlyRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SumOfTwoRequest {
    pub a: u64,
    pub b: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppendResponse {
    pub record: Record,
    pub tx: TxId,
}

impl From<AppendOutcome> for AppendResponse {
    fn from(outcome: AppendOutcome) -> Self {
        Self {
            record: outcome.record,
            tx: outcome.tx,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub order: Option<String>,
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub ledger_count: u64,
    pub entries: Vec<ViewEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
        }
    }
}

pub async fn append(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AppendRequest>,
) -> ServerResult<Json<AppendResponse>> {
    let submitter = submitter_for(&state, &headers).await?;
    let outcome = state
        .node
        .append(&submitter, &request.name, request.sum)
        .await?;
    Ok(Json(outcome.into()))
}

pub async fn append_name_only(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<NameOnlyRequest>,
) -> ServerResult<Json<AppendResponse>> {
    let submitter = submitter_for(&state, &headers).await?;
    let outcome = state
        .node
        .append_name_only(&submitter, &request.name)
        .await?;
    Ok(Json(outcome.into()))
}

pub async fn append_sum_of_two(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SumOfTwoRequest>,
) -> ServerResult<Json<AppendResponse>> {
    let submitter = submitter_for(&state, &headers).await?;
    let outcome = state
        .node
        .append_sum_of_two(&submitter, request.a, request.b)
        .await?;
    Ok(Json(outcome.into()))
}

pub async fn record(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ServerResult<Json<Record>> {
    let record = state.node.record(id).await?;
    Ok(Json(record))
}

pub async fn count(State(state): State<AppState>) -> ServerResult<Json<CountResponse>> {
    let count = state.node.count().await?;
    Ok(Json(CountResponse { count }))
}

/// Serve the published view. `?refresh=true` rebuilds it first;
/// `?order=oldest` flips to chronological order.
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ServerResult<Json<HistoryResponse>> {
    let order = match query.order.as_deref() {
        Some(raw) => raw.parse::<HistoryOrder>().map_err(ServerError::BadRequest)?,
        None => HistoryOrder::default(),
    };

    if query.refresh {
        state.node.refresh().await?;
    }

    let view = state.node.history();
    Ok(Json(HistoryResponse {
        ledger_count: view.ledger_count,
        entries: view.in_order(order).into_iter().cloned().collect(),
    }))
}

pub async fn refresh(State(state): State<AppState>) -> ServerResult<Json<RefreshReport>> {
    let report = state.node.refresh().await?;
    Ok(Json(report))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

pub async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": "tally-server",
        "version": env!("CARGO_PKG_VERSION"),
        "allow_anonymous_append": state.config.allow_anonymous_append,
    }))
}

async fn submitter_for(state: &AppState, headers: &HeaderMap) -> ServerResult<RequestSubmitter> {
    let credentials = credentials_from(headers);
    let identity = state.auth.authenticate(&credentials).await?;
    Ok(RequestSubmitter::new(
        identity,
        state.config.allow_anonymous_append,
    ))
}

fn credentials_from(headers: &HeaderMap) -> Credentials {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| Credentials::Bearer(token.to_string()))
        .unwrap_or(Credentials::Anonymous)
}
