//! HTTP front ends for the three stages.
//!
//! Each service is a thin axum router over one stage function. Handlers keep
//! no state between requests beyond the shared store handle and the
//! configuration they were started with.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::error::{PipelineError, PipelineResult};
use crate::stage;
use crate::store::ObjectStore;
use crate::DEFAULT_CHUNK_COUNT;

/// Shared handler state.
#[derive(Clone)]
pub struct StageState {
    store: Arc<dyn ObjectStore>,
    chunk_count: usize,
    default_bucket: Option<String>,
}

impl StageState {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            chunk_count: DEFAULT_CHUNK_COUNT,
            default_bucket: None,
        }
    }

    pub fn with_chunk_count(mut self, chunk_count: usize) -> Self {
        self.chunk_count = chunk_count;
        self
    }

    pub fn with_default_bucket(mut self, bucket: Option<String>) -> Self {
        self.default_bucket = bucket;
        self
    }
}

/////////////////////////////////////////////////////////////////////////////
// Wire types
/////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SplitParams {
    pub source_url: Option<String>,
    pub chunk_count: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SplitResponse {
    pub chunk_urls: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MapParams {
    pub chunk_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MapResponse {
    pub result_url: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReduceRequest {
    /// Required. An empty list is a valid, zero-result run.
    pub mapper_urls: Option<Vec<String>>,
    /// Where to write the final table, ahead of the service default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_bucket: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReduceResponse {
    pub final_result_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = match &self {
            PipelineError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!("{}", self);
        let body = ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/////////////////////////////////////////////////////////////////////////////
// Routers
/////////////////////////////////////////////////////////////////////////////

pub fn splitter_router(state: StageState) -> Router {
    Router::new()
        .route("/", get(|| async { "Splitter service is running!" }))
        .route("/split", get(handle_split))
        .with_state(state)
}

pub fn mapper_router(state: StageState) -> Router {
    Router::new()
        .route("/", get(|| async { "Mapper service is running!" }))
        .route("/map", get(handle_map))
        .with_state(state)
}

pub fn reducer_router(state: StageState) -> Router {
    Router::new()
        .route("/", get(|| async { "Reducer service is running!" }))
        .route("/reduce", post(handle_reduce))
        .with_state(state)
}

/// Serve `router` on `addr` until the process is stopped.
pub async fn serve(addr: &str, router: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}

/////////////////////////////////////////////////////////////////////////////
// Handlers
/////////////////////////////////////////////////////////////////////////////

fn required(value: Option<String>, name: &str) -> PipelineResult<String> {
    value.ok_or_else(|| PipelineError::bad_request(format!("{name} parameter required")))
}

async fn handle_split(
    State(state): State<StageState>,
    params: Result<Query<SplitParams>, QueryRejection>,
) -> PipelineResult<Json<SplitResponse>> {
    let Query(params) = params.map_err(|e| PipelineError::bad_request(e.body_text()))?;
    let source = required(params.source_url, "source_url")?;
    let chunk_count = params.chunk_count.unwrap_or(state.chunk_count);

    let span = info_span!("split", request_id = %Uuid::new_v4(), %source);
    let chunks = stage::split(state.store.as_ref(), &source, chunk_count)
        .instrument(span)
        .await?;
    Ok(Json(SplitResponse {
        chunk_urls: chunks.iter().map(ToString::to_string).collect(),
    }))
}

async fn handle_map(
    State(state): State<StageState>,
    params: Result<Query<MapParams>, QueryRejection>,
) -> PipelineResult<Json<MapResponse>> {
    let Query(params) = params.map_err(|e| PipelineError::bad_request(e.body_text()))?;
    let chunk = required(params.chunk_url, "chunk_url")?;

    let span = info_span!("map", request_id = %Uuid::new_v4(), %chunk);
    let table = stage::map_chunk(state.store.as_ref(), &chunk)
        .instrument(span)
        .await?;
    Ok(Json(MapResponse {
        result_url: table.to_string(),
    }))
}

async fn handle_reduce(
    State(state): State<StageState>,
    request: Result<Json<ReduceRequest>, JsonRejection>,
) -> PipelineResult<Json<ReduceResponse>> {
    let Json(request) = request.map_err(|e| PipelineError::bad_request(e.body_text()))?;
    let tables = request
        .mapper_urls
        .ok_or_else(|| PipelineError::bad_request("mapper_urls is required"))?;
    let bucket = request.default_bucket.or(state.default_bucket);

    let span = info_span!("reduce", request_id = %Uuid::new_v4(), tables = tables.len());
    let output = stage::reduce(state.store.as_ref(), &tables, bucket.as_deref())
        .instrument(span)
        .await?;
    Ok(Json(ReduceResponse {
        final_result_url: output.to_string(),
    }))
}
