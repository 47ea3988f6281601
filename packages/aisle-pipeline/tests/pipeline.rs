use std::sync::Arc;

use aisle_catalog::InMemoryCatalog;
use aisle_domain::{intent::RawExtraction, weather::WeatherReading};
use aisle_pipeline::{
	AisleService, IntentMode, RecommendRequest, SearchMode, ServiceError, StepStatus,
	respond::APOLOGY,
};
use aisle_testkit::{
	FailingProvider, StubDrafter, StubExtractor, StubWeather, TEST_DIMENSIONS, seeded_catalog,
	stub_providers, test_config, test_llm_config, test_weather_config,
};

async fn service() -> AisleService {
	let catalog = seeded_catalog(TEST_DIMENSIONS as usize).await;

	AisleService::with_providers(test_config(), catalog, stub_providers())
}

fn request(query: &str) -> RecommendRequest {
	RecommendRequest {
		query: query.to_string(),
		user_id: None,
		session_id: None,
		location: None,
		top_n: None,
	}
}

#[tokio::test]
async fn full_pipeline_recommends_the_matching_sneaker() {
	let service = service().await;
	let result = service
		.recommend(request("blue nike sneakers for a marathon for men"))
		.await
		.expect("pipeline failed");

	assert_eq!(result.intent.primary_category, "Clothing & Accessories");
	assert_eq!(result.intent.product_type, "Sneakers");
	assert_eq!(result.intent.filters.brand.as_deref(), Some("Nike"));

	let candidates = result.candidates.expect("no candidate block");

	assert_eq!(candidates.search_mode, SearchMode::Strict);
	assert_eq!(result.ranked_products[0].product.sku_id, "SKU-ATHL-001");
	assert_eq!(result.response_source.as_deref(), Some("template_fallback"));
	assert!(result.response.contains("AeroStride Marathon Sneakers"));
	assert!(result.error.is_none());

	assert_eq!(result.trace.steps.len(), 6);
	assert!(result.trace.steps.iter().all(|step| step.status == StepStatus::Success));
	assert!(result.trace_id.starts_with("trace_"));
	assert_eq!(service.traces.len(), 1);
}

#[tokio::test]
async fn dollar_amount_narrows_the_price_band() {
	let service = service().await;
	let result = service.recommend(request("sneakers under $100")).await.expect("pipeline failed");
	let constraints = result.constraints.expect("no constraint block");

	// The dollar-amount pattern wins over the "under" phrasing, so $100
	// becomes the 80..120 band rather than a pure ceiling.
	assert_eq!(constraints.price.min_price, Some(80.0));
	assert_eq!(constraints.price.max_price, 120.0);
	assert_eq!(constraints.price.label, "specific");

	assert_eq!(result.ranked_products.len(), 1);
	assert_eq!(result.ranked_products[0].product.sku_id, "SKU-ATHL-002");
}

#[tokio::test]
async fn impossible_strict_filter_relaxes_to_the_category() {
	let service = service().await;
	let mut req = request("sneakers under $5");

	req.top_n = Some(2);

	let result = service.recommend(req).await.expect("pipeline failed");
	let candidates = result.candidates.expect("no candidate block");

	assert_eq!(candidates.search_mode, SearchMode::Relaxed);
	// All in-stock Clothing & Accessories items, not just athletic wear.
	assert_eq!(candidates.total_candidates, 3);
	assert_eq!(result.ranked_products.len(), 2);
}

#[tokio::test]
async fn empty_catalog_gets_the_apology() {
	let catalog = Arc::new(InMemoryCatalog::new(TEST_DIMENSIONS as usize));
	let service = AisleService::with_providers(test_config(), catalog, stub_providers());
	let result = service.recommend(request("sneakers")).await.expect("pipeline failed");

	assert!(result.ranked_products.is_empty());
	assert_eq!(result.response, APOLOGY);
	assert!(result.response_source.is_none());
	assert!(result.error.is_none());
}

#[tokio::test]
async fn drafter_outage_falls_back_to_the_template() {
	let catalog = seeded_catalog(TEST_DIMENSIONS as usize).await;
	let mut cfg = test_config();

	cfg.providers.drafter = Some(test_llm_config());

	let service = AisleService::with_providers(cfg, catalog, stub_providers());
	let result = service.recommend(request("sneakers")).await.expect("pipeline failed");

	assert_eq!(result.response_source.as_deref(), Some("template_fallback"));
	assert!(result.response.starts_with("Here are my top recommendations"));
	assert!(
		result
			.response_error
			.as_deref()
			.is_some_and(|err| err.contains("drafter not configured"))
	);
	assert!(result.error.is_none());
}

#[tokio::test]
async fn drafter_success_returns_the_model_text() {
	let catalog = seeded_catalog(TEST_DIMENSIONS as usize).await;
	let mut cfg = test_config();

	cfg.providers.drafter = Some(test_llm_config());

	let mut providers = stub_providers();

	providers.drafter = Arc::new(StubDrafter("Three great picks for you!".to_string()));

	let service = AisleService::with_providers(cfg, catalog, providers);
	let result = service.recommend(request("sneakers")).await.expect("pipeline failed");

	assert_eq!(result.response, "Three great picks for you!");
	assert!(result.response_source.is_none());
	assert!(result.response_error.is_none());
}

#[tokio::test]
async fn model_extraction_steers_retrieval() {
	let catalog = seeded_catalog(TEST_DIMENSIONS as usize).await;
	let mut cfg = test_config();

	cfg.providers.extractor = Some(test_llm_config());

	let mut providers = stub_providers();

	providers.extractor = Arc::new(StubExtractor(RawExtraction {
		product_category: Some("Beauty & Personal Care".to_string()),
		product_subcategory: Some("Skincare".to_string()),
		product_type: Some("Moisturizer".to_string()),
		confidence: Some(0.9),
		..RawExtraction::default()
	}));

	let service = AisleService::with_providers(cfg, catalog, providers);

	assert_eq!(service.intent_mode(), IntentMode::Model);

	let result =
		service.recommend(request("something for my dry skin")).await.expect("pipeline failed");

	assert_eq!(result.intent.primary_category, "Beauty & Personal Care");
	assert_eq!(result.ranked_products[0].product.sku_id, "SKU-SKIN-001");
}

#[tokio::test]
async fn live_weather_reading_drives_the_suggested_tags() {
	let catalog = seeded_catalog(TEST_DIMENSIONS as usize).await;
	let mut cfg = test_config();

	cfg.providers.weather = Some(test_weather_config());

	let mut providers = stub_providers();

	providers.weather = Arc::new(StubWeather(WeatherReading {
		location: "Brisbane, AU".to_string(),
		temp_c: 33,
		condition: "Sunny".to_string(),
		humidity: 40,
		season: "summer".to_string(),
		source: "live".to_string(),
	}));

	let service = AisleService::with_providers(cfg, catalog, providers);
	let mut req = request("sneakers");

	req.location = Some("Brisbane, AU".to_string());

	let result = service.recommend(req).await.expect("pipeline failed");
	let context = result.context.expect("no context block");

	assert_eq!(context.weather.source, "live");
	assert_eq!(context.weather.temp_c, 33);
	assert_eq!(context.weather_suggested_tags.first().map(String::as_str), Some("summer"));
}

#[tokio::test]
async fn extractor_outage_degrades_to_pattern_rules() {
	let catalog = seeded_catalog(TEST_DIMENSIONS as usize).await;
	let mut cfg = test_config();

	cfg.providers.extractor = Some(test_llm_config());

	let service = AisleService::with_providers(cfg, catalog, stub_providers());
	let result = service.recommend(request("cheap sneakers")).await.expect("pipeline failed");

	// The failing extractor never surfaces; the pattern strategy covers it.
	assert_eq!(result.intent.primary_category, "Clothing & Accessories");
	assert!(result.error.is_none());
	assert_eq!(result.trace.steps.len(), 6);
}

#[tokio::test]
async fn embedding_outage_produces_an_error_response_and_trace() {
	let catalog = seeded_catalog(TEST_DIMENSIONS as usize).await;
	let mut providers = stub_providers();

	providers.embedding = Arc::new(FailingProvider("embedding offline"));

	let service = AisleService::with_providers(test_config(), catalog, providers);
	let result = service.recommend(request("sneakers")).await.expect("pipeline failed");

	assert!(result.response.starts_with("An error occurred:"));
	assert!(result.error.as_deref().is_some_and(|err| err.contains("embedding offline")));
	assert!(result.ranked_products.is_empty());

	// Three successful stages, the failed retrieval, and the orchestrator.
	assert_eq!(result.trace.steps.len(), 5);
	assert_eq!(result.trace.steps[3].status, StepStatus::Error);
	assert_eq!(result.trace.steps[4].agent, "Orchestrator");

	// The failed run is still recorded.
	assert_eq!(service.traces.len(), 1);
}

#[tokio::test]
async fn blank_queries_are_rejected() {
	let service = service().await;
	let result = service.recommend(request("   ")).await;

	assert!(matches!(result, Err(ServiceError::InvalidRequest { .. })));
	assert!(service.traces.is_empty());
}

#[tokio::test]
async fn session_history_accumulates_across_requests() {
	let service = service().await;
	let mut req = request("sneakers");

	req.session_id = Some("sess-1".to_string());

	let first = service.recommend(req.clone()).await.expect("pipeline failed");
	let first_context = first.context.expect("no context block");

	assert_eq!(first_context.session_history.map(|h| h.len()), Some(0));

	req.query = "moisturizer".to_string();

	let second = service.recommend(req).await.expect("pipeline failed");
	let second_context = second.context.expect("no context block");
	let history = second_context.session_history.expect("no session history");

	assert_eq!(history.len(), 1);
	assert_eq!(history[0].category.as_deref(), Some("Clothing & Accessories"));

	let preferences = second_context.user_preferences.expect("no preferences");

	assert!(preferences.preferred_categories.contains(&"Clothing & Accessories".to_string()));
}
