//! Deterministic doubles for pipeline and API tests: a hashed embedding
//! scheme, a small seeded catalog, stub providers, and a valid config that
//! needs no network or model access.

use std::sync::Arc;

use aisle_catalog::{CatalogStore, InMemoryCatalog, Product};
use aisle_config::{
	Catalog, Config, EmbeddingProviderConfig, LlmProviderConfig, Pipeline,
	Providers as ProviderConfigs, RankingWeights, Service, Session, Trace, WeatherProviderConfig,
};
use aisle_domain::{intent::RawExtraction, weather::WeatherReading};
use aisle_pipeline::{
	BoxFuture, DrafterProvider, EmbeddingProvider, ExtractorProvider, Providers, WeatherProvider,
};
use color_eyre::eyre::eyre;

pub const TEST_DIMENSIONS: u32 = 32;

/// Bag-of-words vector hashed per token, L2 normalized. Identical texts map
/// to identical vectors and token overlap raises cosine similarity, which is
/// all the retrieval tests need.
pub fn hash_embedding(text: &str, dimensions: usize) -> Vec<f32> {
	let dimensions = dimensions.max(1);
	let mut vector = vec![0.0_f32; dimensions];

	for token in text.split_whitespace() {
		let token = token.to_lowercase();
		let mut hash = 0xcbf2_9ce4_8422_2325_u64;

		for byte in token.bytes() {
			hash ^= u64::from(byte);
			hash = hash.wrapping_mul(0x100_0000_01b3);
		}

		vector[(hash % dimensions as u64) as usize] += 1.0;
	}

	let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();

	if norm > 0.0 {
		for value in &mut vector {
			*value /= norm;
		}
	}

	vector
}

/// Text a product is embedded under, mirroring what a real seeding job would
/// send to the embedding provider.
pub fn product_text(product: &Product) -> String {
	format!(
		"{} {} {} {} {}",
		product.title,
		product.description,
		product.category,
		product.subcategory,
		product.tags.join(" ")
	)
}

fn product(
	sku_id: &str,
	title: &str,
	description: &str,
	category: &str,
	subcategory: &str,
	brand: &str,
	gender: &str,
	color: &str,
	size: &str,
	price_aud: f64,
	stock_quantity: u32,
	tags: &[&str],
) -> Product {
	Product {
		sku_id: sku_id.to_string(),
		title: title.to_string(),
		description: description.to_string(),
		category: category.to_string(),
		subcategory: subcategory.to_string(),
		brand: brand.to_string(),
		gender: gender.to_string(),
		color: color.to_string(),
		size: size.to_string(),
		price_aud,
		stock_quantity,
		tags: tags.iter().map(|tag| tag.to_string()).collect(),
		embedding: Vec::new(),
	}
}

pub fn seed_products() -> Vec<Product> {
	vec![
		product(
			"SKU-ATHL-001",
			"AeroStride Marathon Sneakers",
			"Lightweight blue sneakers built for marathon training and long runs",
			"Clothing & Accessories",
			"Athletic Wear",
			"Nike",
			"Men",
			"Blue",
			"10",
			129.99,
			42,
			&["running", "marathon", "breathable"],
		),
		product(
			"SKU-ATHL-002",
			"TrailStride Running Shoes",
			"Cushioned running shoes for daily training",
			"Clothing & Accessories",
			"Athletic Wear",
			"TrailStride",
			"Unisex",
			"Grey",
			"9",
			89.50,
			15,
			&["running"],
		),
		product(
			"SKU-ATHL-003",
			"SprintFlex Racing Flats",
			"Featherweight racing flats for race day",
			"Clothing & Accessories",
			"Athletic Wear",
			"SprintFlex",
			"Women",
			"Red",
			"8",
			149.0,
			0,
			&["racing", "running"],
		),
		product(
			"SKU-SKIN-001",
			"FreshSkin Daily Moisturizer",
			"Hydrating face moisturizer with SPF",
			"Beauty & Personal Care",
			"Skincare",
			"FreshSkin",
			"Unisex",
			"White",
			"One Size",
			34.95,
			80,
			&["hydrating", "spf"],
		),
		product(
			"SKU-SKIN-002",
			"GlowLab Gentle Cleanser",
			"Fragrance free cleanser for sensitive skin",
			"Beauty & Personal Care",
			"Skincare",
			"GlowLab",
			"Women",
			"Pink",
			"One Size",
			28.0,
			64,
			&["gentle", "cleanser"],
		),
		product(
			"SKU-DECO-001",
			"Amber Ceramic Vase",
			"Hand glazed ceramic vase for shelves and mantels",
			"Home & Living",
			"Decor",
			"Hearth & Co",
			"Unisex",
			"Amber",
			"One Size",
			59.0,
			23,
			&["ceramic", "decor"],
		),
		product(
			"SKU-FRAM-001",
			"Oak Photo Frame 8x10",
			"Solid oak photo frame with glass front",
			"Gifts & Photo Products",
			"Photo Frames",
			"FrameCraft",
			"Unisex",
			"Brown",
			"8x10",
			24.5,
			120,
			&["gift", "photo"],
		),
		product(
			"SKU-ACCS-001",
			"Meridian Automatic Watch",
			"Sapphire crystal automatic watch with leather strap",
			"Clothing & Accessories",
			"Accessories",
			"Meridian",
			"Men",
			"Silver",
			"One Size",
			1_899.0,
			5,
			&["luxury", "watch"],
		),
	]
}

/// In-memory catalog preloaded with [`seed_products`], each embedded through
/// [`hash_embedding`] at `dimensions`.
pub async fn seeded_catalog(dimensions: usize) -> Arc<InMemoryCatalog> {
	let catalog = Arc::new(InMemoryCatalog::new(dimensions));
	let products = seed_products()
		.into_iter()
		.map(|mut product| {
			product.embedding = hash_embedding(&product_text(&product), dimensions);

			product
		})
		.collect();

	if let Err(err) = catalog.upsert(products).await {
		unreachable!("seed products match the catalog dimensions: {err}");
	}

	catalog
}

/// Embeds with [`hash_embedding`] at the configured dimension count.
pub struct StubEmbedding;

impl EmbeddingProvider for StubEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		let vectors = texts
			.iter()
			.map(|text| hash_embedding(text, cfg.dimensions as usize))
			.collect();

		Box::pin(async move { Ok(vectors) })
	}
}

/// Always returns the same raw extraction.
pub struct StubExtractor(pub RawExtraction);

impl ExtractorProvider for StubExtractor {
	fn extract<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_query: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<RawExtraction>> {
		Box::pin(async move { Ok(self.0.clone()) })
	}
}

/// Always returns the same draft text.
pub struct StubDrafter(pub String);

impl DrafterProvider for StubDrafter {
	fn draft<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_system: &'a str,
		_user: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(async move { Ok(self.0.clone()) })
	}
}

/// Always returns the same reading.
pub struct StubWeather(pub WeatherReading);

impl WeatherProvider for StubWeather {
	fn fetch<'a>(
		&'a self,
		_cfg: &'a WeatherProviderConfig,
		_location: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<WeatherReading>> {
		Box::pin(async move { Ok(self.0.clone()) })
	}
}

/// Fails every call with its message. Implements all four provider seams so
/// one instance can stand in wherever a test wants an outage.
pub struct FailingProvider(pub &'static str);

impl EmbeddingProvider for FailingProvider {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Err(eyre!("{}", self.0)) })
	}
}

impl ExtractorProvider for FailingProvider {
	fn extract<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_query: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<RawExtraction>> {
		Box::pin(async move { Err(eyre!("{}", self.0)) })
	}
}

impl DrafterProvider for FailingProvider {
	fn draft<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_system: &'a str,
		_user: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(async move { Err(eyre!("{}", self.0)) })
	}
}

impl WeatherProvider for FailingProvider {
	fn fetch<'a>(
		&'a self,
		_cfg: &'a WeatherProviderConfig,
		_location: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<WeatherReading>> {
		Box::pin(async move { Err(eyre!("{}", self.0)) })
	}
}

/// Default provider set for tests: hashed embeddings plus failing stubs for
/// the seams [`test_config`] leaves unconfigured, so an unexpected call shows
/// up as a loud error instead of silent fake data.
pub fn stub_providers() -> Providers {
	Providers::new(
		Arc::new(StubEmbedding),
		Arc::new(FailingProvider("extractor not configured for this test")),
		Arc::new(FailingProvider("drafter not configured for this test")),
		Arc::new(FailingProvider("weather not configured for this test")),
	)
}

/// Valid config with only the embedding provider set, so intent extraction
/// runs in rules mode, responses use the template, and weather is simulated.
pub fn test_config() -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "warn".to_string(),
		},
		providers: ProviderConfigs {
			embedding: EmbeddingProviderConfig {
				provider_id: "stub".to_string(),
				api_base: "http://localhost:9".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "stub-embed".to_string(),
				dimensions: TEST_DIMENSIONS,
				timeout_ms: 1_000,
				default_headers: Default::default(),
			},
			extractor: None,
			drafter: None,
			weather: None,
		},
		catalog: Catalog {
			vector_dim: TEST_DIMENSIONS,
			seed_path: None,
			default_location: "Melbourne, AU".to_string(),
		},
		pipeline: Pipeline { top_k: 50, top_n: 5, min_stock: 1, max_price_cap: 5_000.0 },
		ranking: RankingWeights::default(),
		session: Session::default(),
		trace: Trace::default(),
	}
}

/// LLM provider config for tests that switch on the extractor or drafter.
pub fn test_llm_config() -> LlmProviderConfig {
	LlmProviderConfig {
		provider_id: "stub".to_string(),
		api_base: "http://localhost:9".to_string(),
		api_key: "test-key".to_string(),
		path: "/v1/chat/completions".to_string(),
		model: "stub-chat".to_string(),
		temperature: 0.2,
		max_tokens: 512,
		timeout_ms: 1_000,
		default_headers: Default::default(),
	}
}

/// Weather provider config for tests that switch on live weather.
pub fn test_weather_config() -> WeatherProviderConfig {
	WeatherProviderConfig { api_base: "http://localhost:9".to_string(), timeout_ms: 1_000 }
}
