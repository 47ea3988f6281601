pub mod filter;
pub mod memory;

use std::{future::Future, pin::Pin};

use serde::{Deserialize, Serialize};

pub use filter::ProductFilter;
pub use memory::InMemoryCatalog;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Vector has {got} dimensions, catalog expects {expected}.")]
	DimensionMismatch { expected: usize, got: usize },
	#[error("No product with sku {sku}.")]
	UnknownSku { sku: String },
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Product {
	pub sku_id: String,
	pub title: String,
	pub description: String,
	pub category: String,
	pub subcategory: String,
	pub brand: String,
	pub gender: String,
	pub color: String,
	pub size: String,
	pub price_aud: f64,
	pub stock_quantity: u32,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default, skip_serializing)]
	pub embedding: Vec<f32>,
}

/// Product plus its query similarity, as returned by a search.
#[derive(Clone, Debug, Serialize)]
pub struct ScoredProduct {
	#[serde(flatten)]
	pub product: Product,
	pub similarity_score: f32,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct CategoryStats {
	pub total_products: usize,
	pub in_stock_count: usize,
	pub avg_stock: f64,
	pub min_price: f64,
	pub max_price: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct SubcategoryStat {
	pub name: String,
	pub count: usize,
	pub brands: usize,
}

/// Search and inventory seam. The service only talks to this trait so tests
/// and future backends swap in without touching the pipeline.
pub trait CatalogStore
where
	Self: Send + Sync,
{
	fn upsert<'a>(&'a self, products: Vec<Product>) -> BoxFuture<'a, Result<()>>;

	/// Filtered similarity search, best match first, at most `top_k` rows.
	fn search<'a>(
		&'a self,
		query_vector: &'a [f32],
		filter: &'a ProductFilter,
		top_k: usize,
	) -> BoxFuture<'a, Result<Vec<ScoredProduct>>>;

	/// Neighbors of an existing product by its stored embedding, excluding
	/// the product itself.
	fn find_similar_to_product<'a>(
		&'a self,
		sku: &'a str,
		top_k: usize,
	) -> BoxFuture<'a, Result<Vec<ScoredProduct>>>;

	fn category_stats<'a>(&'a self, category: &'a str) -> BoxFuture<'a, Result<CategoryStats>>;

	fn subcategory_breakdown<'a>(
		&'a self,
		category: &'a str,
		limit: usize,
	) -> BoxFuture<'a, Result<Vec<SubcategoryStat>>>;

	fn len<'a>(&'a self) -> BoxFuture<'a, Result<usize>>;
}
