use std::time::Duration;

use color_eyre::Result;
use reqwest::Client;
use serde_json::Value;

use aisle_domain::{intent::RawExtraction, taxonomy};

/// Asks the extraction model to slot-fill the query. Transport failures
/// bubble up so the caller can switch strategy; unparseable content is
/// retried and, if it never parses, degraded to [`RawExtraction::unparsed`].
pub async fn extract(cfg: &aisle_config::LlmProviderConfig, query: &str) -> Result<RawExtraction> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": [
			{ "role": "system", "content": system_prompt() },
			{ "role": "user", "content": format!("USER QUERY: \"{query}\"") },
		],
	});

	for _ in 0..3 {
		let res = client
			.post(&url)
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;

		if let Some(raw) = parse_extraction(&json) {
			return Ok(raw);
		}
	}

	Ok(RawExtraction::unparsed(query))
}

fn system_prompt() -> String {
	let categories = taxonomy::category_names();
	let subcategories: Vec<String> = categories
		.iter()
		.map(|category| format!("{category}: {}", taxonomy::subcategory_names(category).join(", ")))
		.collect();

	format!(
		"You are a product intent extraction assistant for an e-commerce platform.\n\
		Analyze the user query and extract structured information.\n\n\
		AVAILABLE CATEGORIES:\n{}\n\n\
		AVAILABLE SUBCATEGORIES (by category):\n{}\n\n\
		OUTPUT FORMAT (STRICT JSON):\n\
		{{\n\
		  \"product_category\": \"category name or null\",\n\
		  \"product_subcategory\": \"subcategory name or null\",\n\
		  \"product_type\": \"specific product name\",\n\
		  \"budget_term\": \"price term or null\",\n\
		  \"urgency_term\": \"urgency indicator or null\",\n\
		  \"use_case\": \"use case or null\",\n\
		  \"gender\": \"gender or null\",\n\
		  \"size\": \"size or null\",\n\
		  \"color\": \"color or null\",\n\
		  \"brand\": \"brand or null\",\n\
		  \"confidence\": 0.0\n\
		}}\n\n\
		Return ONLY the JSON object, no explanations.",
		categories.join("\n"),
		subcategories.join("\n"),
	)
}

fn parse_extraction(json: &Value) -> Option<RawExtraction> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())?;

	serde_json::from_str(strip_fences(content)).ok()
}

// Models wrap JSON in markdown fences often enough to handle it here.
fn strip_fences(content: &str) -> &str {
	let content = content.trim();
	let content = content.strip_prefix("```json").unwrap_or(content);
	let content = content.strip_prefix("```").unwrap_or(content);
	let content = content.strip_suffix("```").unwrap_or(content);

	content.trim()
}
