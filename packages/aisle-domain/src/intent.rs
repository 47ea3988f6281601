use serde::{Deserialize, Serialize};

pub const UNKNOWN_CATEGORY: &str = "Unknown";
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PriceRange {
	pub min: Option<f64>,
	pub max: Option<f64>,
	pub label: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct IntentAttributes {
	pub use_case: Option<String>,
	pub price_range: Option<PriceRange>,
	pub urgency: String,
	pub timeline_days: Option<u32>,
}
impl Default for IntentAttributes {
	fn default() -> Self {
		Self { use_case: None, price_range: None, urgency: "normal".to_string(), timeline_days: None }
	}
}

/// Hard filters the user stated. An absent field means "no constraint", so
/// downstream predicates must skip absent fields rather than match on them.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct IntentFilters {
	pub gender: Option<String>,
	pub size: Option<String>,
	pub color: Option<String>,
	pub brand: Option<String>,
	pub subcategory: Option<String>,
}

/// One audited extraction. The slot trail is append-only and carries its own
/// per-slot confidence, independent of the overall intent confidence.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ExtractedSlot {
	pub slot: String,
	pub value: String,
	pub normalized: serde_json::Value,
	pub confidence: f32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Intent {
	pub primary_category: String,
	pub subcategory: Option<String>,
	pub product_type: String,
	pub attributes: IntentAttributes,
	pub filters: IntentFilters,
	pub intent_confidence: f32,
	pub extracted_slots: Vec<ExtractedSlot>,
}
impl Intent {
	/// Minimal intent for a query nothing could be extracted from. Keeps the
	/// raw query as the product type so retrieval still has a search term.
	pub fn fallback(query: &str) -> Self {
		Self {
			primary_category: UNKNOWN_CATEGORY.to_string(),
			subcategory: None,
			product_type: query.to_string(),
			attributes: IntentAttributes::default(),
			filters: IntentFilters::default(),
			intent_confidence: 0.5,
			extracted_slots: Vec::new(),
		}
	}

	pub fn has_known_category(&self) -> bool {
		!self.primary_category.is_empty() && self.primary_category != UNKNOWN_CATEGORY
	}
}

/// Shape the extraction model is asked to emit. Every field is optional so a
/// partially filled response still normalizes.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RawExtraction {
	pub product_category: Option<String>,
	pub product_subcategory: Option<String>,
	pub product_type: Option<String>,
	pub budget_term: Option<String>,
	pub urgency_term: Option<String>,
	pub use_case: Option<String>,
	pub gender: Option<String>,
	pub size: Option<String>,
	pub color: Option<String>,
	pub brand: Option<String>,
	pub confidence: Option<f32>,
}
impl RawExtraction {
	/// Stand-in when the model output never parsed. The query itself becomes
	/// the product type and confidence drops to 0.5.
	pub fn unparsed(query: &str) -> Self {
		Self {
			product_type: Some(query.to_string()),
			confidence: Some(0.5),
			..Self::default()
		}
	}

	/// Normalizes the raw model output into a full intent. A missing category
	/// is re-detected from the query with the taxonomy scan, so a weak model
	/// answer degrades to the same quality as the pattern strategy.
	pub fn normalize(self, query: &str) -> Intent {
		use serde_json::json;

		use crate::taxonomy;

		let mut slots = Vec::new();
		let (mut category, mut subcategory) = (self.product_category, self.product_subcategory);

		if category.is_none() {
			if let Some((detected_category, detected_subcategory, _)) =
				taxonomy::detect_category(query)
			{
				category = Some(detected_category.to_string());
				subcategory = Some(detected_subcategory.to_string());
			}
		}

		if let Some(category) = &category {
			slots.push(ExtractedSlot {
				slot: "category".to_string(),
				value: category.clone(),
				normalized: json!(category),
				confidence: self.confidence.unwrap_or(0.8),
			});
		}

		let price_range = self.budget_term.as_deref().map(taxonomy::normalize_price_term);

		if let (Some(term), Some(range)) = (&self.budget_term, &price_range) {
			slots.push(ExtractedSlot {
				slot: "budget".to_string(),
				value: term.clone(),
				normalized: json!({ "min": range.min, "max": range.max, "label": range.label }),
				confidence: 0.9,
			});
		}

		let (urgency, timeline_days) = match &self.urgency_term {
			Some(term) => {
				let (urgency, days) = taxonomy::normalize_urgency(term);

				slots.push(ExtractedSlot {
					slot: "urgency".to_string(),
					value: term.clone(),
					normalized: json!({ "urgency": urgency, "days": days }),
					confidence: 0.85,
				});

				(urgency, days)
			},
			None => ("normal".to_string(), None),
		};

		Intent {
			primary_category: category.unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
			subcategory: subcategory.clone(),
			product_type: self.product_type.unwrap_or_else(|| UNKNOWN_PRODUCT.to_string()),
			attributes: IntentAttributes {
				use_case: self.use_case,
				price_range,
				urgency,
				timeline_days,
			},
			filters: IntentFilters {
				gender: self.gender,
				size: self.size,
				color: self.color,
				brand: self.brand,
				subcategory,
			},
			intent_confidence: self.confidence.unwrap_or(0.7).clamp(0.0, 1.0),
			extracted_slots: slots,
		}
	}
}
