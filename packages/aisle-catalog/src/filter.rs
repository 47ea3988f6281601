use serde::Serialize;

use crate::Product;

/// Hard predicate applied before similarity ordering. Category and
/// subcategory match by containment since catalog categories can be
/// hierarchical strings; brand and color match exactly.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ProductFilter {
	pub min_stock: u32,
	pub min_price: Option<f64>,
	pub max_price: Option<f64>,
	pub category: Option<String>,
	pub subcategory: Option<String>,
	pub brand: Option<String>,
	pub color: Option<String>,
}
impl ProductFilter {
	pub fn matches(&self, product: &Product) -> bool {
		if product.stock_quantity < self.min_stock {
			return false;
		}
		if let Some(min) = self.min_price
			&& product.price_aud < min
		{
			return false;
		}
		if let Some(max) = self.max_price
			&& product.price_aud > max
		{
			return false;
		}
		if let Some(category) = &self.category
			&& !product.category.contains(category.as_str())
		{
			return false;
		}
		if let Some(subcategory) = &self.subcategory
			&& !product.subcategory.contains(subcategory.as_str())
			&& !product.category.contains(subcategory.as_str())
		{
			return false;
		}
		if let Some(brand) = &self.brand
			&& product.brand != *brand
		{
			return false;
		}
		if let Some(color) = &self.color
			&& product.color != *color
		{
			return false;
		}

		true
	}

	/// Fallback predicate for the second search pass: keep only the stock
	/// floor and the category.
	pub fn relaxed(&self) -> Self {
		Self {
			min_stock: self.min_stock.max(1),
			category: self.category.clone(),
			..Self::default()
		}
	}

	/// Human-readable clause for traces and logs.
	pub fn describe(&self) -> String {
		let mut clauses = vec![format!("stock_quantity >= {}", self.min_stock)];

		if let Some(min) = self.min_price {
			clauses.push(format!("price_aud >= {min}"));
		}
		if let Some(max) = self.max_price {
			clauses.push(format!("price_aud <= {max}"));
		}
		if let Some(category) = &self.category {
			clauses.push(format!("category ~ '{category}'"));
		}
		if let Some(subcategory) = &self.subcategory {
			clauses.push(format!("subcategory ~ '{subcategory}'"));
		}
		if let Some(brand) = &self.brand {
			clauses.push(format!("brand = '{brand}'"));
		}
		if let Some(color) = &self.color {
			clauses.push(format!("color = '{color}'"));
		}

		clauses.join(" AND ")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn product() -> Product {
		Product {
			sku_id: "SKU-1".to_string(),
			title: "Trail Runner".to_string(),
			description: "Cushioned running shoe".to_string(),
			category: "Clothing & Accessories".to_string(),
			subcategory: "Athletic Wear".to_string(),
			brand: "Nike".to_string(),
			gender: "Unisex".to_string(),
			color: "Blue".to_string(),
			size: "M".to_string(),
			price_aud: 89.0,
			stock_quantity: 40,
			tags: vec![],
			embedding: vec![],
		}
	}

	#[test]
	fn empty_filter_accepts_everything_in_stock() {
		let filter = ProductFilter { min_stock: 1, ..ProductFilter::default() };

		assert!(filter.matches(&product()));

		let mut out_of_stock = product();

		out_of_stock.stock_quantity = 0;

		assert!(!filter.matches(&out_of_stock));
	}

	#[test]
	fn price_bounds_are_inclusive() {
		let filter = ProductFilter {
			min_price: Some(89.0),
			max_price: Some(89.0),
			..ProductFilter::default()
		};

		assert!(filter.matches(&product()));

		let filter =
			ProductFilter { max_price: Some(88.99), ..ProductFilter::default() };

		assert!(!filter.matches(&product()));
	}

	#[test]
	fn subcategory_matches_against_either_field() {
		let filter = ProductFilter {
			subcategory: Some("Accessories".to_string()),
			..ProductFilter::default()
		};

		// "Accessories" is a substring of the category, not the subcategory.
		assert!(filter.matches(&product()));
	}

	#[test]
	fn brand_and_color_are_exact() {
		let filter = ProductFilter { brand: Some("Nik".to_string()), ..ProductFilter::default() };

		assert!(!filter.matches(&product()));

		let filter = ProductFilter { color: Some("Blue".to_string()), ..ProductFilter::default() };

		assert!(filter.matches(&product()));
	}

	#[test]
	fn relaxed_keeps_only_stock_and_category() {
		let filter = ProductFilter {
			min_stock: 1,
			min_price: Some(20.0),
			max_price: Some(50.0),
			category: Some("Clothing & Accessories".to_string()),
			brand: Some("Adidas".to_string()),
			..ProductFilter::default()
		};
		let relaxed = filter.relaxed();

		assert_eq!(relaxed.min_stock, 1);
		assert_eq!(relaxed.category.as_deref(), Some("Clothing & Accessories"));
		assert!(relaxed.min_price.is_none());
		assert!(relaxed.brand.is_none());
		// The strict filter rejects on price, the relaxed one accepts.
		assert!(!filter.matches(&product()));
		assert!(relaxed.matches(&product()));
	}

	#[test]
	fn describe_lists_active_clauses() {
		let filter = ProductFilter {
			min_stock: 1,
			max_price: Some(100.0),
			brand: Some("Nike".to_string()),
			..ProductFilter::default()
		};

		assert_eq!(filter.describe(), "stock_quantity >= 1 AND price_aud <= 100 AND brand = 'Nike'");
	}
}
