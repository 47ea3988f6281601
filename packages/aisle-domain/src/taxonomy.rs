//! Fixed retail taxonomy and the keyword vocabularies that map free text
//! onto it. Tables are ordered and scanned first-match, so earlier entries
//! win ties.

use crate::intent::PriceRange;

pub struct Subcategory {
	pub name: &'static str,
	pub keywords: &'static [&'static str],
}

pub struct Category {
	pub name: &'static str,
	pub subcategories: &'static [Subcategory],
}

pub const CATEGORIES: &[Category] = &[
	Category {
		name: "Beauty & Personal Care",
		subcategories: &[
			Subcategory {
				name: "Haircare",
				keywords: &[
					"shampoo",
					"conditioner",
					"hair oil",
					"hair product",
					"haircare",
					"hair mask",
				],
			},
			Subcategory {
				name: "Skincare",
				keywords: &[
					"moisturizer",
					"cleanser",
					"serum",
					"skincare",
					"face cream",
					"lotion",
				],
			},
			Subcategory {
				name: "Grooming Kits",
				keywords: &["grooming kit", "grooming set", "shaving kit"],
			},
			Subcategory {
				name: "Fragrances",
				keywords: &["perfume", "cologne", "fragrance", "scent", "deodorant"],
			},
		],
	},
	Category {
		name: "Clothing & Accessories",
		subcategories: &[
			Subcategory {
				name: "Athletic Wear",
				keywords: &[
					"running shoes",
					"sneakers",
					"trainers",
					"athletic shoes",
					"sports shoes",
				],
			},
			Subcategory {
				name: "Casual Wear",
				keywords: &["t-shirt", "jeans", "casual wear", "shirt", "pants"],
			},
			Subcategory {
				name: "Accessories",
				keywords: &["watch", "belt", "wallet", "bag", "sunglasses"],
			},
		],
	},
	Category {
		name: "Home & Living",
		subcategories: &[
			Subcategory {
				name: "Kitchenware",
				keywords: &["cookware", "utensils", "kitchen", "pots", "pans"],
			},
			Subcategory {
				name: "Furniture",
				keywords: &["chair", "table", "sofa", "bed", "furniture"],
			},
			Subcategory { name: "Decor", keywords: &["artwork", "vase", "decoration", "decor"] },
		],
	},
	Category {
		name: "Gifts & Photo Products",
		subcategories: &[
			Subcategory {
				name: "Photo Frames",
				keywords: &["photo frame", "picture frame", "frame"],
			},
			Subcategory { name: "Gift Sets", keywords: &["gift set", "gift pack", "gift"] },
		],
	},
	Category {
		name: "Nursery & Kids",
		subcategories: &[
			Subcategory {
				name: "Toys",
				keywords: &["toy", "toys", "playset", "action figure", "doll"],
			},
			Subcategory {
				name: "Kids Furniture",
				keywords: &["crib", "changing table", "kids bed"],
			},
		],
	},
];

pub struct PriceKeyword {
	pub keyword: &'static str,
	pub min: Option<f64>,
	pub max: Option<f64>,
	pub label: &'static str,
}

pub const PRICE_KEYWORDS: &[PriceKeyword] = &[
	PriceKeyword { keyword: "cheap", min: None, max: Some(50.), label: "budget" },
	PriceKeyword { keyword: "budget", min: None, max: Some(50.), label: "budget" },
	PriceKeyword { keyword: "affordable", min: None, max: Some(80.), label: "affordable" },
	PriceKeyword { keyword: "mid-range", min: Some(50.), max: Some(150.), label: "mid-range" },
	PriceKeyword { keyword: "moderate", min: Some(50.), max: Some(150.), label: "mid-range" },
	PriceKeyword { keyword: "premium", min: Some(150.), max: Some(500.), label: "premium" },
	PriceKeyword { keyword: "expensive", min: Some(150.), max: Some(500.), label: "premium" },
	PriceKeyword { keyword: "luxury", min: Some(500.), max: None, label: "luxury" },
];

/// Scans the taxonomy for the first keyword contained in the query and
/// returns `(category, subcategory, product type)`. The product type is the
/// matched keyword title-cased, not the raw query text.
pub fn detect_category(query: &str) -> Option<(&'static str, &'static str, String)> {
	let query = query.to_lowercase();

	for category in CATEGORIES {
		for subcategory in category.subcategories {
			for keyword in subcategory.keywords {
				if query.contains(keyword) {
					return Some((category.name, subcategory.name, title_case(keyword)));
				}
			}
		}
	}

	None
}

/// First price vocabulary word found in the query, as a concrete band.
pub fn detect_price_keyword(query: &str) -> Option<PriceRange> {
	let query = query.to_lowercase();

	PRICE_KEYWORDS.iter().find(|entry| query.contains(entry.keyword)).map(|entry| PriceRange {
		min: entry.min,
		max: entry.max,
		label: entry.label.to_string(),
	})
}

/// Normalizes a model-reported budget term. Unknown terms get the open
/// "any" band rather than failing the extraction.
pub fn normalize_price_term(term: &str) -> PriceRange {
	let term = term.to_lowercase();
	let term = term.trim();

	PRICE_KEYWORDS
		.iter()
		.find(|entry| entry.keyword == term)
		.map(|entry| PriceRange {
			min: entry.min.or(Some(0.)),
			max: entry.max,
			label: entry.label.to_string(),
		})
		.unwrap_or(PriceRange { min: Some(0.), max: None, label: "any".to_string() })
}

const URGENCY_TERMS: &[(&str, &str)] = &[
	("asap", "urgent"),
	("urgent", "urgent"),
	("need now", "urgent"),
	("immediately", "urgent"),
	("today", "urgent"),
	("this week", "high"),
	("next week", "high"),
	("soon", "moderate"),
	("eventually", "low"),
	("no rush", "low"),
];

/// Normalizes a model-reported urgency phrase into a level and a day count.
pub fn normalize_urgency(term: &str) -> (String, Option<u32>) {
	let term = term.to_lowercase();
	let urgency = URGENCY_TERMS
		.iter()
		.find(|(pattern, _)| term.contains(pattern))
		.map(|(_, urgency)| *urgency)
		.unwrap_or("normal");
	let days = if term.contains("today") || term.contains("now") {
		Some(0)
	} else if term.contains("tomorrow") {
		Some(1)
	} else if term.contains("this week") || term.contains("next week") {
		Some(7)
	} else if term.contains("month") {
		Some(30)
	} else {
		None
	};

	(urgency.to_string(), days)
}

pub fn category_names() -> Vec<&'static str> {
	CATEGORIES.iter().map(|category| category.name).collect()
}

pub fn subcategory_names(category: &str) -> Vec<&'static str> {
	CATEGORIES
		.iter()
		.filter(|entry| entry.name == category)
		.flat_map(|entry| entry.subcategories.iter().map(|subcategory| subcategory.name))
		.collect()
}

pub fn title_case(phrase: &str) -> String {
	phrase
		.split_whitespace()
		.map(|word| {
			let mut chars = word.chars();

			match chars.next() {
				Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
				None => String::new(),
			}
		})
		.collect::<Vec<_>>()
		.join(" ")
}
