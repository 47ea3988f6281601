//! Pattern-based slot extraction. This is the always-available strategy:
//! every rule here must work offline, so it leans on the fixed vocabularies
//! in [`crate::taxonomy`] and a small set of regex tables.

use regex::Regex;
use serde_json::json;

use crate::{
	intent::{
		ExtractedSlot, Intent, IntentAttributes, IntentFilters, PriceRange, UNKNOWN_CATEGORY,
		UNKNOWN_PRODUCT,
	},
	taxonomy,
};

enum PriceKind {
	Specific,
	Max,
	Min,
	Between,
}

// Scanned in order. A bare "$X" is read as a target price and widened into a
// 0.8x..1.2x band, so it deliberately shadows the bounded phrasings when both
// appear with a dollar sign.
const PRICE_PATTERNS: &[(&str, PriceKind)] = &[
	(r"\$(\d+)", PriceKind::Specific),
	(r"(?:under|below|less than) \$?(\d+)", PriceKind::Max),
	(r"(?:over|above|more than) \$?(\d+)", PriceKind::Min),
	(r"between \$?(\d+) and \$?(\d+)", PriceKind::Between),
];

const URGENCY_PATTERNS: &[(&str, &str, Option<u32>)] = &[
	(r"\b(urgent|asap|immediately|now)\b", "urgent", Some(0)),
	(r"\btoday\b", "urgent", Some(0)),
	(r"\btomorrow\b", "high", Some(1)),
	(r"\bthis week\b", "high", Some(7)),
	(r"\bnext week\b", "high", Some(7)),
	(r"\bsoon\b", "moderate", Some(14)),
	(r"\bno rush\b", "low", None),
];

const GENDER_PATTERNS: &[(&str, &str)] = &[
	(r"\b(men's|mens|male|for men|for him)\b", "Men"),
	(r"\b(women's|womens|female|for women|for her)\b", "Women"),
	(r"\b(kids|children|child|boys|girls)\b", "Kids"),
	(r"\b(unisex|all)\b", "Unisex"),
];

const BRANDS: &[&str] =
	&["nike", "adidas", "apple", "samsung", "sony", "kmart", "urbancare", "freshskin"];
const COLORS: &[&str] = &[
	"black", "white", "red", "blue", "green", "yellow", "pink", "purple", "orange", "brown",
	"gray", "grey",
];
const SIZES: &[&str] =
	&["xs", "s", "m", "l", "xl", "xxl", "small", "medium", "large", "one size"];

// Words that end a use-case phrase; they open urgency, price, or a new
// prepositional clause.
const USE_CASE_STOPS: &[&str] = &[
	"for", "under", "over", "below", "above", "between", "around", "next", "this", "today",
	"tomorrow", "soon", "asap", "urgent", "cheap", "budget", "affordable", "premium", "expensive",
	"luxury",
];
const USE_CASE_ARTICLES: &[&str] = &["a", "an", "the"];
const USE_CASE_PRONOUNS: &[&str] = &["me", "my", "her", "him", "them", "us"];

/// Extracts a full intent from the query using pattern rules only. Confidence
/// is fixed at 0.75; the per-slot confidences record how reliable each rule
/// family is.
pub fn extract_intent(query: &str) -> Intent {
	let mut slots = Vec::new();
	let detected = taxonomy::detect_category(query);
	let (primary_category, subcategory, product_type) = match &detected {
		Some((category, subcategory, product_type)) =>
			(category.to_string(), Some(subcategory.to_string()), product_type.clone()),
		None => (UNKNOWN_CATEGORY.to_string(), None, UNKNOWN_PRODUCT.to_string()),
	};

	if let Some((category, ..)) = &detected {
		slots.push(ExtractedSlot {
			slot: "category".to_string(),
			value: category.to_string(),
			normalized: json!(category),
			confidence: 0.85,
		});
	}

	let price_range = extract_price(query);

	if let Some(range) = &price_range {
		slots.push(ExtractedSlot {
			slot: "price_range".to_string(),
			value: range.label.clone(),
			normalized: json!({ "min": range.min, "max": range.max, "label": range.label }),
			confidence: 0.9,
		});
	}

	let (urgency, timeline_days) = extract_urgency(query);

	if urgency != "normal" {
		slots.push(ExtractedSlot {
			slot: "urgency".to_string(),
			value: urgency.clone(),
			normalized: json!({ "urgency": urgency, "days": timeline_days }),
			confidence: 0.8,
		});
	}

	Intent {
		primary_category,
		subcategory: subcategory.clone(),
		product_type,
		attributes: IntentAttributes {
			use_case: extract_use_case(query),
			price_range,
			urgency,
			timeline_days,
		},
		filters: IntentFilters {
			gender: extract_gender(query),
			size: extract_size(query),
			color: extract_color(query),
			brand: extract_brand(query),
			subcategory,
		},
		intent_confidence: 0.75,
		extracted_slots: slots,
	}
}

pub fn extract_price(query: &str) -> Option<PriceRange> {
	let query = query.to_lowercase();

	for (pattern, kind) in PRICE_PATTERNS {
		let Some(capture) = capture(pattern, &query) else {
			continue;
		};

		return match kind {
			PriceKind::Specific => {
				let price = parse_amount(&capture[1])?;

				Some(PriceRange {
					min: Some(price * 0.8),
					max: Some(price * 1.2),
					label: "specific".to_string(),
				})
			},
			PriceKind::Max => Some(PriceRange {
				min: None,
				max: parse_amount(&capture[1]),
				label: "budget".to_string(),
			}),
			PriceKind::Min => Some(PriceRange {
				min: parse_amount(&capture[1]),
				max: None,
				label: "premium".to_string(),
			}),
			PriceKind::Between => Some(PriceRange {
				min: parse_amount(&capture[1]),
				max: parse_amount(&capture[2]),
				label: "custom".to_string(),
			}),
		};
	}

	taxonomy::detect_price_keyword(&query)
}

pub fn extract_urgency(query: &str) -> (String, Option<u32>) {
	let query = query.to_lowercase();

	for (pattern, urgency, days) in URGENCY_PATTERNS {
		if is_match(pattern, &query) {
			return (urgency.to_string(), *days);
		}
	}

	("normal".to_string(), None)
}

pub fn extract_gender(query: &str) -> Option<String> {
	let query = query.to_lowercase();

	GENDER_PATTERNS
		.iter()
		.find(|(pattern, _)| is_match(pattern, &query))
		.map(|(_, gender)| gender.to_string())
}

pub fn extract_brand(query: &str) -> Option<String> {
	let lowered = query.to_lowercase();

	if let Some(brand) = BRANDS.iter().find(|brand| contains_word(&lowered, brand)) {
		return Some(taxonomy::title_case(brand));
	}

	// Unlisted brands still surface through "from X" or "by X" mentions.
	capture(r"\b(?:from|by)\s+([A-Z][a-zA-Z]+)\b", query).map(|capture| capture[1].to_string())
}

pub fn extract_color(query: &str) -> Option<String> {
	let query = query.to_lowercase();

	COLORS
		.iter()
		.find(|color| contains_word(&query, color))
		.map(|color| taxonomy::title_case(color))
}

pub fn extract_size(query: &str) -> Option<String> {
	let query = query.to_lowercase();

	SIZES.iter().find(|size| contains_word(&query, size)).map(|size| {
		if size.len() <= 3 { size.to_uppercase() } else { taxonomy::title_case(size) }
	})
}

/// Phrase after "for ...", with leading articles and bare pronouns dropped and
/// the capture cut at the first urgency or price word.
pub fn extract_use_case(query: &str) -> Option<String> {
	let capture = capture(r"\bfor\s+([a-zA-Z\s]+)", query)?;
	let mut words = Vec::new();

	for word in capture[1].split_whitespace() {
		let lowered = word.to_lowercase();

		if words.is_empty() && USE_CASE_ARTICLES.contains(&lowered.as_str()) {
			continue;
		}
		if USE_CASE_STOPS.contains(&lowered.as_str()) {
			break;
		}

		words.push(word);
	}

	if words.is_empty() {
		return None;
	}

	let phrase = words.join(" ");

	if words.len() == 1 && USE_CASE_PRONOUNS.contains(&phrase.to_lowercase().as_str()) {
		return None;
	}

	Some(phrase)
}

fn is_match(pattern: &str, text: &str) -> bool {
	Regex::new(pattern).map(|re| re.is_match(text)).unwrap_or(false)
}

fn capture<'a>(pattern: &str, text: &'a str) -> Option<regex::Captures<'a>> {
	Regex::new(pattern).ok().and_then(|re| re.captures(text))
}

// Whole-word containment; "s" must not match inside "shoes".
fn contains_word(haystack: &str, needle: &str) -> bool {
	haystack.match_indices(needle).any(|(start, _)| {
		let before_ok = start == 0
			|| !haystack[..start]
				.chars()
				.next_back()
				.map(|ch| ch.is_alphanumeric())
				.unwrap_or(false);
		let end = start + needle.len();
		let after_ok = end == haystack.len()
			|| !haystack[end..].chars().next().map(|ch| ch.is_alphanumeric()).unwrap_or(false);

		before_ok && after_ok
	})
}

fn parse_amount(digits: &str) -> Option<f64> {
	digits.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn marathon_query_extracts_every_slot_family() {
		let intent = extract_intent("I need cheap running shoes for a marathon next week");

		assert_eq!(intent.primary_category, "Clothing & Accessories");
		assert_eq!(intent.subcategory.as_deref(), Some("Athletic Wear"));
		assert_eq!(intent.product_type, "Running Shoes");
		assert_eq!(intent.attributes.use_case.as_deref(), Some("marathon"));
		assert_eq!(intent.attributes.urgency, "high");
		assert_eq!(intent.attributes.timeline_days, Some(7));

		let range = intent.attributes.price_range.unwrap();

		assert_eq!(range.max, Some(50.));
		assert_eq!(range.label, "budget");
		assert!((intent.intent_confidence - 0.75).abs() < f32::EPSILON);
		assert_eq!(intent.extracted_slots.len(), 3);
	}

	#[test]
	fn dollar_amount_widens_into_a_band() {
		let range = extract_price("sneakers around $100").unwrap();

		assert_eq!(range.min, Some(80.));
		assert_eq!(range.max, Some(120.));
		assert_eq!(range.label, "specific");
	}

	#[test]
	fn bounded_price_phrases_parse_without_dollar_sign() {
		let range = extract_price("something under 60").unwrap();

		assert_eq!(range.min, None);
		assert_eq!(range.max, Some(60.));
		assert_eq!(range.label, "budget");

		let range = extract_price("between 20 and 80").unwrap();

		assert_eq!(range.min, Some(20.));
		assert_eq!(range.max, Some(80.));
		assert_eq!(range.label, "custom");
	}

	#[test]
	fn urgency_table_is_first_match() {
		assert_eq!(extract_urgency("need it asap"), ("urgent".to_string(), Some(0)));
		assert_eq!(extract_urgency("by tomorrow please"), ("high".to_string(), Some(1)));
		assert_eq!(extract_urgency("sometime soon"), ("moderate".to_string(), Some(14)));
		assert_eq!(extract_urgency("no rush at all"), ("low".to_string(), None));
		assert_eq!(extract_urgency("plain query"), ("normal".to_string(), None));
	}

	#[test]
	fn size_matching_requires_word_boundaries() {
		// "s" appears inside "shoes" and must not match as a size.
		assert_eq!(extract_size("running shoes"), None);
		assert_eq!(extract_size("a size m shirt"), Some("M".to_string()));
		assert_eq!(extract_size("large backpack"), Some("Large".to_string()));
		assert_eq!(extract_size("one size hat"), Some("One Size".to_string()));
	}

	#[test]
	fn brand_comes_from_vocabulary_or_mention() {
		assert_eq!(extract_brand("blue nike sneakers"), Some("Nike".to_string()));
		assert_eq!(extract_brand("a watch from Casio"), Some("Casio".to_string()));
		assert_eq!(extract_brand("some watch"), None);
	}

	#[test]
	fn gender_patterns_do_not_cross_match() {
		assert_eq!(extract_gender("women's running shoes"), Some("Women".to_string()));
		assert_eq!(extract_gender("men's watch"), Some("Men".to_string()));
		assert_eq!(extract_gender("toys for kids"), Some("Kids".to_string()));
	}

	#[test]
	fn use_case_skips_articles_and_pronouns() {
		assert_eq!(
			extract_use_case("shoes for a marathon next week"),
			Some("marathon".to_string())
		);
		assert_eq!(extract_use_case("a gift for her"), None);
		assert_eq!(extract_use_case("plain query"), None);
	}

	#[test]
	fn unknown_query_still_builds_an_intent() {
		let intent = extract_intent("zzz");

		assert_eq!(intent.primary_category, "Unknown");
		assert_eq!(intent.product_type, "Unknown Product");
		assert!(intent.extracted_slots.is_empty());
	}
}
