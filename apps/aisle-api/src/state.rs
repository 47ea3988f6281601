use std::{fs, sync::Arc};

use aisle_catalog::{CatalogStore, InMemoryCatalog, Product};
use aisle_pipeline::AisleService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<AisleService>,
}
impl AppState {
	pub async fn new(config: aisle_config::Config) -> color_eyre::Result<Self> {
		let catalog = Arc::new(InMemoryCatalog::new(config.catalog.vector_dim as usize));
		let service = AisleService::new(config, catalog);
		let seeded = seed_catalog(&service).await?;
		let total = service.catalog.len().await?;

		tracing::info!(seeded, total, "Catalog ready.");

		Ok(Self { service: Arc::new(service) })
	}
}

const SEED_BATCH: usize = 32;

/// Loads the seed file into the catalog. Rows shipped without a vector (or
/// with one at the wrong dimension) are re-embedded through the provider in
/// batches before the upsert.
async fn seed_catalog(service: &AisleService) -> color_eyre::Result<usize> {
	let Some(path) = service.cfg.catalog.seed_path.as_deref() else {
		return Ok(0);
	};
	let raw = fs::read_to_string(path)?;
	let mut products: Vec<Product> = serde_json::from_str(&raw)?;
	let dimensions = service.cfg.catalog.vector_dim as usize;
	let missing: Vec<usize> = products
		.iter()
		.enumerate()
		.filter(|(_, product)| product.embedding.len() != dimensions)
		.map(|(index, _)| index)
		.collect();

	for chunk in missing.chunks(SEED_BATCH) {
		let texts: Vec<String> =
			chunk.iter().map(|&index| embedding_text(&products[index])).collect();
		let vectors = service
			.providers
			.embedding
			.embed(&service.cfg.providers.embedding, &texts)
			.await?;

		for (&index, vector) in chunk.iter().zip(vectors) {
			products[index].embedding = vector;
		}
	}

	let count = products.len();

	service.catalog.upsert(products).await?;

	Ok(count)
}

fn embedding_text(product: &Product) -> String {
	format!(
		"{} {} {} {} {}",
		product.title,
		product.description,
		product.category,
		product.subcategory,
		product.tags.join(" ")
	)
}
