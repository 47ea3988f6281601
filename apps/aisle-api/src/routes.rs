use aisle_pipeline::{RecommendRequest, RecommendResponse, ServiceError, Trace};
use axum::{
	Json, Router,
	extract::{Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/recommend", post(recommend))
		.route("/v1/traces", get(traces))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn recommend(
	State(state): State<AppState>,
	Json(payload): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, ApiError> {
	let response = state.service.recommend(payload).await?;

	Ok(Json(response))
}

fn default_trace_limit() -> usize {
	10
}

#[derive(Debug, Deserialize)]
pub struct TracesQuery {
	#[serde(default = "default_trace_limit")]
	pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct TracesResponse {
	pub traces: Vec<Trace>,
}

async fn traces(
	State(state): State<AppState>,
	Query(query): Query<TracesQuery>,
) -> Json<TracesResponse> {
	Json(TracesResponse { traces: state.service.traces.recent(query.limit) })
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let (status, error_code) = match &err {
			ServiceError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
			ServiceError::Provider { .. } => (StatusCode::BAD_GATEWAY, "provider_error"),
			ServiceError::Catalog { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "catalog_error"),
		};

		Self { status, error_code: error_code.to_string(), message: err.to_string() }
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
