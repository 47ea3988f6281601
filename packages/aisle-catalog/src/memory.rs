use std::{
	collections::{BTreeMap, HashSet},
	sync::Mutex,
};

use crate::{
	BoxFuture, CatalogStore, CategoryStats, Error, Product, ProductFilter, Result, ScoredProduct,
	SubcategoryStat,
};

/// Vector catalog held entirely in memory. Search is a filtered linear scan
/// with cosine ordering, which is plenty for catalog sizes in the thousands.
pub struct InMemoryCatalog {
	vector_dim: usize,
	products: Mutex<Vec<Product>>,
}
impl InMemoryCatalog {
	pub fn new(vector_dim: usize) -> Self {
		Self { vector_dim, products: Mutex::new(Vec::new()) }
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Product>> {
		self.products.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
		if vector.len() != self.vector_dim {
			return Err(Error::DimensionMismatch { expected: self.vector_dim, got: vector.len() });
		}

		Ok(())
	}

	fn ranked_scan(
		products: &[Product],
		query_vector: &[f32],
		keep: impl Fn(&Product) -> bool,
		top_k: usize,
	) -> Vec<ScoredProduct> {
		let mut scored: Vec<ScoredProduct> = products
			.iter()
			.filter(|product| keep(product))
			.map(|product| ScoredProduct {
				product: product.clone(),
				similarity_score: cosine_similarity(&product.embedding, query_vector),
			})
			.collect();

		scored.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
		scored.truncate(top_k);

		scored
	}
}

impl CatalogStore for InMemoryCatalog {
	fn upsert<'a>(&'a self, products: Vec<Product>) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			for product in &products {
				self.check_dimensions(&product.embedding)?;
			}

			let mut stored = self.lock();

			for product in products {
				match stored.iter_mut().find(|existing| existing.sku_id == product.sku_id) {
					Some(existing) => *existing = product,
					None => stored.push(product),
				}
			}

			Ok(())
		})
	}

	fn search<'a>(
		&'a self,
		query_vector: &'a [f32],
		filter: &'a ProductFilter,
		top_k: usize,
	) -> BoxFuture<'a, Result<Vec<ScoredProduct>>> {
		Box::pin(async move {
			self.check_dimensions(query_vector)?;

			let products = self.lock();

			Ok(Self::ranked_scan(&products, query_vector, |product| filter.matches(product), top_k))
		})
	}

	fn find_similar_to_product<'a>(
		&'a self,
		sku: &'a str,
		top_k: usize,
	) -> BoxFuture<'a, Result<Vec<ScoredProduct>>> {
		Box::pin(async move {
			let products = self.lock();
			let anchor = products
				.iter()
				.find(|product| product.sku_id == sku)
				.ok_or_else(|| Error::UnknownSku { sku: sku.to_string() })?
				.clone();

			Ok(Self::ranked_scan(
				&products,
				&anchor.embedding,
				|product| product.sku_id != anchor.sku_id && product.stock_quantity >= 1,
				top_k,
			))
		})
	}

	fn category_stats<'a>(&'a self, category: &'a str) -> BoxFuture<'a, Result<CategoryStats>> {
		Box::pin(async move {
			let products = self.lock();
			let mut stats = CategoryStats::default();
			let mut stock_total = 0u64;

			for product in products.iter().filter(|product| product.category.contains(category)) {
				if stats.total_products == 0 {
					stats.min_price = product.price_aud;
					stats.max_price = product.price_aud;
				} else {
					stats.min_price = stats.min_price.min(product.price_aud);
					stats.max_price = stats.max_price.max(product.price_aud);
				}

				stats.total_products += 1;
				stock_total += u64::from(product.stock_quantity);

				if product.stock_quantity > 0 {
					stats.in_stock_count += 1;
				}
			}

			if stats.total_products > 0 {
				stats.avg_stock = stock_total as f64 / stats.total_products as f64;
			}

			Ok(stats)
		})
	}

	fn subcategory_breakdown<'a>(
		&'a self,
		category: &'a str,
		limit: usize,
	) -> BoxFuture<'a, Result<Vec<SubcategoryStat>>> {
		Box::pin(async move {
			let products = self.lock();
			let mut grouped: BTreeMap<String, (usize, HashSet<String>)> = BTreeMap::new();

			for product in products.iter().filter(|product| product.category.contains(category)) {
				let entry = grouped.entry(product.subcategory.clone()).or_default();

				entry.0 += 1;
				entry.1.insert(product.brand.clone());
			}

			let mut breakdown: Vec<SubcategoryStat> = grouped
				.into_iter()
				.map(|(name, (count, brands))| SubcategoryStat {
					name,
					count,
					brands: brands.len(),
				})
				.collect();

			breakdown.sort_by(|a, b| b.count.cmp(&a.count));
			breakdown.truncate(limit);

			Ok(breakdown)
		})
	}

	fn len<'a>(&'a self) -> BoxFuture<'a, Result<usize>> {
		Box::pin(async move { Ok(self.lock().len()) })
	}
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
	let mut dot = 0.0f32;
	let mut norm_a = 0.0f32;
	let mut norm_b = 0.0f32;

	for (x, y) in a.iter().zip(b) {
		dot += x * y;
		norm_a += x * x;
		norm_b += y * y;
	}

	if norm_a == 0.0 || norm_b == 0.0 {
		return 0.0;
	}

	dot / (norm_a.sqrt() * norm_b.sqrt())
}
