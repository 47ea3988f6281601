use aisle_domain::intent::Intent;
use serde::Serialize;

use crate::{AisleService, ContextBlock, RankedBlock, RankedProduct};

pub const APOLOGY: &str = "Sorry, I couldn't find any products matching your request. Could you \
                           try rephrasing your query?";

const TEMPLATE_FALLBACK: &str = "template_fallback";
const SYSTEM_PROMPT: &str = "You are a helpful shopping assistant for an Australian retail store.";

#[derive(Clone, Debug, Serialize)]
pub struct ResponseBlock {
	pub response: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub response_source: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub response_error: Option<String>,
}
impl ResponseBlock {
	pub fn failure(message: String) -> Self {
		Self { response: message, response_source: None, response_error: None }
	}
}

/// Stage 6: natural-language reply. Zero products short-circuit to a fixed
/// apology; any drafting trouble lands on the deterministic template, which
/// needs no external calls and cannot fail.
pub async fn compose(
	service: &AisleService,
	intent: &Intent,
	context: &ContextBlock,
	ranked: &RankedBlock,
) -> ResponseBlock {
	let products = &ranked.ranked_products;

	if products.is_empty() {
		return ResponseBlock {
			response: APOLOGY.to_string(),
			response_source: None,
			response_error: None,
		};
	}

	let Some(cfg) = service.cfg.providers.drafter.as_ref() else {
		return ResponseBlock {
			response: template_response(intent, products),
			response_source: Some(TEMPLATE_FALLBACK.to_string()),
			response_error: None,
		};
	};
	let prompt = draft_prompt(intent, context, products);

	match service.providers.drafter.draft(cfg, SYSTEM_PROMPT, &prompt).await {
		Ok(draft) => ResponseBlock { response: draft, response_source: None, response_error: None },
		Err(err) => {
			tracing::warn!("Drafting model unavailable, using template: {err}");

			ResponseBlock {
				response: template_response(intent, products),
				response_source: Some(TEMPLATE_FALLBACK.to_string()),
				response_error: Some(err.to_string()),
			}
		},
	}
}

fn draft_prompt(intent: &Intent, context: &ContextBlock, products: &[RankedProduct]) -> String {
	let mut prompt = format!(
		"The customer asked about: {}\nCategory: {}\n",
		intent.product_type, intent.primary_category
	);

	if let Some(use_case) = &intent.attributes.use_case {
		prompt.push_str(&format!("Use case: {use_case}\n"));
	}

	prompt.push_str(&format!(
		"Current weather: {}C, {}\n\nHere are the top matching products:\n",
		context.weather.temp_c, context.weather.condition
	));

	for (position, ranked) in products.iter().enumerate() {
		let product = &ranked.product;

		prompt.push_str(&format!(
			"\n{}. **{}**\n   - Brand: {}\n   - Price: ${:.2} AUD\n   - Color: {}\n   - Stock: \
			 {} units\n   - Match Score: {:.0}%\n",
			position + 1,
			product.title,
			product.brand,
			product.price_aud,
			product.color,
			product.stock_quantity,
			ranked.ranking_score * 100.0,
		));
	}

	prompt.push_str(
		"\nWrite a friendly, concise response (3-5 sentences) that:\n1. Acknowledges what \
		 they're looking for\n2. Highlights the top 2-3 recommendations with key details (name, \
		 price)\n3. Mentions why they're good matches\n4. Keeps it conversational and helpful\n\n\
		 Do NOT use markdown formatting. Write plain text only.",
	);

	prompt
}

/// Deterministic fallback listing the picks in rank order.
pub fn template_response(intent: &Intent, products: &[RankedProduct]) -> String {
	let mut lines =
		vec![format!("Here are my top recommendations for {}:\n", intent.product_type)];

	for (position, ranked) in products.iter().take(5).enumerate() {
		let product = &ranked.product;

		lines.push(format!(
			"{}. {} - ${:.2} AUD ({}, {})",
			position + 1,
			product.title,
			product.price_aud,
			product.brand,
			product.color
		));
	}

	lines.push(format!(
		"\nAll {} products are currently in stock and ready to ship!",
		products.len()
	));

	lines.join("\n")
}

pub fn summarize(block: &ResponseBlock) -> String {
	block.response.clone()
}
