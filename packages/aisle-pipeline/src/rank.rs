//! Stage 5: weighted feature scoring. Pure, deterministic, no external
//! calls; the weights come from configuration so a learned model can slot in
//! later without changing the pipeline shape.

use aisle_catalog::{Product, ScoredProduct};
use aisle_config::RankingWeights;
use aisle_domain::intent::{Intent, IntentFilters};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct RankedProduct {
	#[serde(flatten)]
	pub product: Product,
	pub similarity_score: f32,
	pub ranking_score: f64,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ScoreRange {
	pub min: f64,
	pub max: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct RankingMeta {
	pub total_candidates: usize,
	pub top_n: usize,
	pub score_range: ScoreRange,
}

#[derive(Clone, Debug, Serialize)]
pub struct RankedBlock {
	pub ranked_products: Vec<RankedProduct>,
	pub ranking_meta: RankingMeta,
}

/// Scores every candidate and keeps the best `top_n`. The sort is stable so
/// equal scores keep their retrieval order. The target band is the user's
/// extracted price range clamped by the safety cap; candidates were already
/// hard-filtered, this only grades how well they fit.
pub fn rank(
	candidates: &[ScoredProduct],
	intent: &Intent,
	max_price_cap: f64,
	weights: &RankingWeights,
	top_n: usize,
) -> RankedBlock {
	let (target_min, target_max) = target_band(intent, max_price_cap);
	let mut scored: Vec<RankedProduct> = candidates
		.iter()
		.map(|candidate| RankedProduct {
			product: candidate.product.clone(),
			similarity_score: candidate.similarity_score,
			ranking_score: score_product(candidate, &intent.filters, target_min, target_max, weights),
		})
		.collect();

	scored.sort_by(|a, b| b.ranking_score.total_cmp(&a.ranking_score));

	let score_range = match (scored.last(), scored.first()) {
		(Some(worst), Some(best)) =>
			ScoreRange { min: worst.ranking_score, max: best.ranking_score },
		_ => ScoreRange::default(),
	};

	scored.truncate(top_n);

	RankedBlock {
		ranked_products: scored,
		ranking_meta: RankingMeta { total_candidates: candidates.len(), top_n, score_range },
	}
}

/// Extracted price band for fit scoring. An inverted band is normalized by
/// swapping; no band at all stays (None, None) so fit scores neutral.
fn target_band(intent: &Intent, max_price_cap: f64) -> (Option<f64>, Option<f64>) {
	let Some(range) = intent.attributes.price_range.as_ref() else {
		return (None, None);
	};
	let min = range.min.map(|min| min.max(0.0));
	let max = range.max.map(|max| max.min(max_price_cap));

	match (min, max) {
		(Some(min), Some(max)) if min > max => (Some(max), Some(min)),
		band => band,
	}
}

fn score_product(
	candidate: &ScoredProduct,
	filters: &IntentFilters,
	target_min: Option<f64>,
	target_max: Option<f64>,
	weights: &RankingWeights,
) -> f64 {
	let similarity = f64::from(candidate.similarity_score);
	let price_fit = price_fit_score(candidate.product.price_aud, target_min, target_max);
	let stock = candidate.product.stock_quantity;
	let stock_score = if stock > 0 { (f64::from(stock) / 100.0).min(1.0) } else { 0.0 };
	let popularity = if stock > 0 { (f64::from(stock) / 200.0).min(1.0) } else { 0.0 };
	let relevance = filter_match_score(&candidate.product, filters);

	weights.similarity * similarity
		+ weights.price_fit * price_fit
		+ weights.stock * stock_score
		+ weights.relevance * relevance
		+ weights.popularity * popularity
}

/// 1.0 inside the band, linear decay by relative distance past the nearer
/// bound outside it, 0.5 neutral when no band was requested.
fn price_fit_score(price: f64, target_min: Option<f64>, target_max: Option<f64>) -> f64 {
	match (target_min, target_max) {
		(None, None) => 0.5,
		(Some(min), Some(max)) =>
			if price < min {
				if min > 0.0 { (1.0 - (min - price) / min).max(0.0) } else { 0.5 }
			} else if price > max {
				if max > 0.0 { (1.0 - (price - max) / max).max(0.0) } else { 0.0 }
			} else {
				1.0
			},
		(None, Some(max)) =>
			if price <= max {
				1.0
			} else if max > 0.0 {
				(1.0 - (price - max) / max).max(0.0)
			} else {
				0.0
			},
		(Some(min), None) =>
			if price >= min {
				1.0
			} else if min > 0.0 {
				(price / min).max(0.0)
			} else {
				0.5
			},
	}
}

/// Fraction of the filters the user actually set that the product matches,
/// case-insensitive containment; neutral 0.5 when none were set.
fn filter_match_score(product: &Product, filters: &IntentFilters) -> f64 {
	let pairs = [
		(filters.brand.as_deref(), product.brand.as_str()),
		(filters.color.as_deref(), product.color.as_str()),
		(filters.gender.as_deref(), product.gender.as_str()),
		(filters.subcategory.as_deref(), product.subcategory.as_str()),
	];
	let mut total = 0u32;
	let mut matches = 0u32;

	for (wanted, actual) in pairs {
		let Some(wanted) = wanted else {
			continue;
		};

		total += 1;

		if actual.to_lowercase().contains(&wanted.to_lowercase()) {
			matches += 1;
		}
	}

	if total == 0 { 0.5 } else { f64::from(matches) / f64::from(total) }
}

pub fn summarize(block: &RankedBlock) -> String {
	format!(
		"{} top products, scores {:.4}..{:.4}",
		block.ranked_products.len(),
		block.ranking_meta.score_range.min,
		block.ranking_meta.score_range.max
	)
}
