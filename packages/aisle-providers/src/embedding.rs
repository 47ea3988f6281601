use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde::Deserialize;

#[derive(Deserialize)]
struct EmbeddingResponse {
	data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
	index: Option<usize>,
	embedding: Vec<f32>,
}

pub async fn embed(
	cfg: &aisle_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let response: EmbeddingResponse = res.error_for_status()?.json().await?;

	align_embeddings(response, texts.len(), cfg.dimensions as usize)
}

// Providers may return items out of order, so realign by index and check the
// batch is complete before handing vectors to the catalog.
fn align_embeddings(
	response: EmbeddingResponse,
	expected: usize,
	dimensions: usize,
) -> Result<Vec<Vec<f32>>> {
	if response.data.len() != expected {
		return Err(eyre::eyre!(
			"Embedding response returned {} vectors for {expected} inputs.",
			response.data.len()
		));
	}

	let mut ordered: Vec<(usize, Vec<f32>)> = response
		.data
		.into_iter()
		.enumerate()
		.map(|(fallback, item)| (item.index.unwrap_or(fallback), item.embedding))
		.collect();

	ordered.sort_by_key(|(index, _)| *index);

	for (_, vector) in &ordered {
		if vector.len() != dimensions {
			return Err(eyre::eyre!(
				"Embedding vector has {} dimensions, expected {dimensions}.",
				vector.len()
			));
		}
	}

	Ok(ordered.into_iter().map(|(_, vector)| vector).collect())
}
