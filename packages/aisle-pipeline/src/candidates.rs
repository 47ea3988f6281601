use aisle_catalog::ScoredProduct;
use aisle_domain::intent::{Intent, UNKNOWN_PRODUCT};
use serde::Serialize;

use crate::{AisleService, ConstraintBlock, ContextBlock, ServiceError, ServiceResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
	Strict,
	Relaxed,
}

#[derive(Clone, Debug, Serialize)]
pub struct CandidateBlock {
	pub search_text: String,
	pub search_mode: SearchMode,
	pub total_candidates: usize,
	pub products: Vec<ScoredProduct>,
}

/// Stage 4: embed the retrieval text and run the two-phase search. This is
/// the only stage whose failure is fatal to the request; without candidates
/// nothing downstream can degrade gracefully.
pub async fn retrieve(
	service: &AisleService,
	intent: &Intent,
	context: &ContextBlock,
	constraints: &ConstraintBlock,
	top_k: usize,
) -> ServiceResult<CandidateBlock> {
	let search_text = build_search_text(intent, context);
	let vectors = service
		.providers
		.embedding
		.embed(&service.cfg.providers.embedding, &[search_text.clone()])
		.await?;
	let query_vector = vectors.into_iter().next().ok_or_else(|| ServiceError::Provider {
		message: "Embedding provider returned no vector.".to_string(),
	})?;
	let strict = service.catalog.search(&query_vector, &constraints.filter, top_k).await?;

	// At most one relaxation, and only when strict matched nothing.
	if !strict.is_empty() {
		return Ok(CandidateBlock {
			search_text,
			search_mode: SearchMode::Strict,
			total_candidates: strict.len(),
			products: strict,
		});
	}

	let relaxed = service.catalog.search(&query_vector, &constraints.filter.relaxed(), top_k).await?;

	Ok(CandidateBlock {
		search_text,
		search_mode: SearchMode::Relaxed,
		total_candidates: relaxed.len(),
		products: relaxed,
	})
}

/// Retrieval text assembled in fixed priority order, empty parts omitted.
pub fn build_search_text(intent: &Intent, context: &ContextBlock) -> String {
	let mut parts: Vec<String> = Vec::new();

	if !intent.product_type.is_empty() && intent.product_type != UNKNOWN_PRODUCT {
		parts.push(intent.product_type.clone());
	}
	if intent.has_known_category() {
		parts.push(intent.primary_category.clone());
	}
	if let Some(subcategory) = &intent.subcategory {
		parts.push(subcategory.clone());
	}
	if let Some(use_case) = &intent.attributes.use_case {
		parts.push(format!("for {use_case}"));
	}
	if let Some(color) = &intent.filters.color {
		parts.push(color.clone());
	}
	if let Some(brand) = &intent.filters.brand {
		parts.push(brand.clone());
	}
	if let Some(gender) = &intent.filters.gender {
		parts.push(format!("for {gender}"));
	}

	parts.extend(context.weather_suggested_tags.iter().take(3).cloned());

	if parts.is_empty() { "products".to_string() } else { parts.join(" ") }
}

pub fn summarize(block: &CandidateBlock) -> String {
	format!("{} candidates ({:?})", block.total_candidates, block.search_mode)
}

#[cfg(test)]
mod tests {
	use aisle_domain::weather::WeatherReading;

	use super::*;
	use crate::context::Temporal;

	fn context(tags: Vec<&str>) -> ContextBlock {
		ContextBlock {
			weather: WeatherReading {
				location: "Melbourne, AU".to_string(),
				temp_c: 20,
				condition: "Clear".to_string(),
				humidity: 50,
				season: "spring".to_string(),
				source: "simulated".to_string(),
			},
			location: "Melbourne, AU".to_string(),
			weather_suggested_tags: tags.into_iter().map(str::to_string).collect(),
			session_history: None,
			user_preferences: None,
			temporal: Temporal {
				day_of_week: "Monday".to_string(),
				hour: 9,
				is_weekend: false,
				date: "2026-08-17".to_string(),
			},
		}
	}

	#[test]
	fn search_text_follows_priority_order() {
		let intent =
			aisle_domain::slots::extract_intent("blue nike sneakers for a marathon for men");
		let text = build_search_text(&intent, &context(vec!["spring", "light layers", "comfortable", "extra"]));

		assert_eq!(
			text,
			"Sneakers Clothing & Accessories Athletic Wear for marathon Blue Nike for Men \
			 spring light layers comfortable"
		);
	}

	#[test]
	fn empty_intent_searches_for_products() {
		let intent = aisle_domain::intent::Intent {
			product_type: UNKNOWN_PRODUCT.to_string(),
			..aisle_domain::intent::Intent::fallback("")
		};

		assert_eq!(build_search_text(&intent, &context(vec![])), "products");
	}
}
