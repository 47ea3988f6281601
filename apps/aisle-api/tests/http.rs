use std::sync::Arc;

use aisle_api::{routes, state::AppState};
use aisle_pipeline::AisleService;
use aisle_testkit::{TEST_DIMENSIONS, seeded_catalog, stub_providers, test_config};
use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use tower::util::ServiceExt;

async fn app() -> Router {
	let catalog = seeded_catalog(TEST_DIMENSIONS as usize).await;
	let service = AisleService::with_providers(test_config(), catalog, stub_providers());

	routes::router(AppState { service: Arc::new(service) })
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&bytes).expect("Failed to parse response.")
}

fn post_recommend(payload: &serde_json::Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri("/v1/recommend")
		.header("content-type", "application/json")
		.body(Body::from(payload.to_string()))
		.expect("Failed to build request.")
}

#[tokio::test]
async fn health_ok() {
	let app = app().await;
	let response = app
		.oneshot(Request::builder().uri("/health").body(Body::empty()).expect("Failed to build request."))
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn recommend_returns_ranked_products() {
	let app = app().await;
	let payload = serde_json::json!({ "query": "blue nike sneakers for a marathon" });
	let response = app.oneshot(post_recommend(&payload)).await.expect("Failed to call recommend.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = json_body(response).await;

	assert_eq!(json["intent"]["primary_category"], "Clothing & Accessories");
	assert_eq!(json["ranked_products"][0]["sku_id"], "SKU-ATHL-001");
	assert!(json["trace_id"].as_str().is_some_and(|id| id.starts_with("trace_")));
	assert_eq!(json["trace"]["steps"].as_array().map(|steps| steps.len()), Some(6));
	assert!(json["response"].as_str().is_some_and(|text| !text.is_empty()));
}

#[tokio::test]
async fn blank_query_is_a_bad_request() {
	let app = app().await;
	let payload = serde_json::json!({ "query": "  " });
	let response = app.oneshot(post_recommend(&payload)).await.expect("Failed to call recommend.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let json = json_body(response).await;

	assert_eq!(json["error_code"], "invalid_request");
}

#[tokio::test]
async fn traces_lists_recent_invocations() {
	let catalog = seeded_catalog(TEST_DIMENSIONS as usize).await;
	let service = AisleService::with_providers(test_config(), catalog, stub_providers());
	let state = AppState { service: Arc::new(service) };
	let payload = serde_json::json!({ "query": "moisturizer" });
	let _ = routes::router(state.clone())
		.oneshot(post_recommend(&payload))
		.await
		.expect("Failed to call recommend.");
	let response = routes::router(state)
		.oneshot(
			Request::builder()
				.uri("/v1/traces?limit=5")
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call traces.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = json_body(response).await;
	let traces = json["traces"].as_array().expect("traces is not an array.");

	assert_eq!(traces.len(), 1);
	assert_eq!(traces[0]["query"], "moisturizer");
	assert_eq!(traces[0]["status"], "completed");
}
