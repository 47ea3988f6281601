use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

/// Single chat completion returning the assistant text. Prompt assembly is
/// the caller's job; this only speaks the wire protocol.
pub async fn draft(
	cfg: &aisle_config::LlmProviderConfig,
	system: &str,
	user: &str,
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": [
			{ "role": "system", "content": system },
			{ "role": "user", "content": user },
		],
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_draft(&json)
}

fn parse_draft(json: &Value) -> Result<String> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.map(|content| content.trim().to_string())
		.filter(|content| !content.is_empty())
		.ok_or_else(|| eyre::eyre!("Draft response is missing text content."))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn extracts_trimmed_text() {
		let json = serde_json::json!({
			"choices": [{ "message": { "content": "  Here are some picks.  " } }]
		});

		assert_eq!(parse_draft(&json).expect("parse failed"), "Here are some picks.");
	}

	#[test]
	fn empty_content_is_an_error() {
		let json = serde_json::json!({
			"choices": [{ "message": { "content": "" } }]
		});

		assert!(parse_draft(&json).is_err());
	}
}
