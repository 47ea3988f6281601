use aisle_catalog::{CategoryStats, ProductFilter, SubcategoryStat};
use aisle_domain::intent::Intent;
use serde::Serialize;

use crate::AisleService;

#[derive(Clone, Debug, Serialize)]
pub struct PriceConstraint {
	pub min_price: Option<f64>,
	pub max_price: f64,
	pub label: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InventoryStatus {
	Available(CategoryStats),
	Unknown { message: String },
	Error { message: String },
}

#[derive(Clone, Debug, Serialize)]
pub struct ConstraintBlock {
	pub price: PriceConstraint,
	pub inventory: InventoryStatus,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category_stats: Option<Vec<SubcategoryStat>>,
	pub filter_clause: String,
	#[serde(skip)]
	pub filter: ProductFilter,
}

/// Stage 3: business rules into a concrete filter. Statistics are advisory;
/// their failure becomes metadata, never an error.
pub async fn apply(service: &AisleService, intent: &Intent) -> ConstraintBlock {
	let price = resolve_price(intent, service.cfg.pipeline.max_price_cap);
	let (inventory, category_stats) = if intent.has_known_category() {
		let category = intent.primary_category.as_str();
		let inventory = match service.catalog.category_stats(category).await {
			Ok(stats) => InventoryStatus::Available(stats),
			Err(err) => InventoryStatus::Error { message: err.to_string() },
		};
		let breakdown = match service.catalog.subcategory_breakdown(category, 10).await {
			Ok(breakdown) => Some(breakdown),
			Err(err) => {
				tracing::warn!("Subcategory breakdown unavailable: {err}");

				None
			},
		};

		(inventory, breakdown)
	} else {
		(InventoryStatus::Unknown { message: "No category identified.".to_string() }, None)
	};
	let filter = build_filter(service, intent, &price);

	ConstraintBlock { price, inventory, category_stats, filter_clause: filter.describe(), filter }
}

/// Clamps the extracted band to business limits: ceiling at the safety cap,
/// floor at zero, and an inverted band is normalized by swapping its bounds.
pub fn resolve_price(intent: &Intent, max_price_cap: f64) -> PriceConstraint {
	let range = intent.attributes.price_range.as_ref();
	let mut min_price = range.and_then(|range| range.min).map(|min| min.max(0.0));
	let mut max_price = range
		.and_then(|range| range.max)
		.filter(|max| *max <= max_price_cap)
		.unwrap_or(max_price_cap);

	if let Some(min) = min_price
		&& min > max_price
	{
		(min_price, max_price) = (Some(max_price), min.min(max_price_cap));
	}

	PriceConstraint {
		min_price,
		max_price,
		label: range.map(|range| range.label.clone()).unwrap_or_else(|| "any".to_string()),
	}
}

fn build_filter(service: &AisleService, intent: &Intent, price: &PriceConstraint) -> ProductFilter {
	ProductFilter {
		min_stock: service.cfg.pipeline.min_stock,
		min_price: price.min_price,
		max_price: Some(price.max_price),
		category: intent.has_known_category().then(|| intent.primary_category.clone()),
		subcategory: intent.filters.subcategory.clone(),
		brand: intent.filters.brand.clone(),
		color: intent.filters.color.clone(),
	}
}

pub fn summarize(block: &ConstraintBlock) -> String {
	format!("filter: {}", block.filter_clause)
}
