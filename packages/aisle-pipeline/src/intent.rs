use aisle_domain::{intent::Intent, slots};

use crate::{AisleService, IntentMode};

/// Stage 1: free text to structured intent. Never fails; a model transport
/// error degrades to the pattern rules for this request only.
pub async fn extract(service: &AisleService, query: &str) -> Intent {
	match service.intent_mode() {
		IntentMode::Model => {
			let Some(cfg) = service.cfg.providers.extractor.as_ref() else {
				// Mode selection guarantees the config exists; stay safe anyway.
				return slots::extract_intent(query);
			};

			match service.providers.extractor.extract(cfg, query).await {
				Ok(raw) => raw.normalize(query),
				Err(err) => {
					tracing::warn!("Extraction model unavailable, using pattern rules: {err}");

					slots::extract_intent(query)
				},
			}
		},
		IntentMode::Rules => slots::extract_intent(query),
	}
}

pub fn summarize(intent: &Intent) -> String {
	format!(
		"category={} type={} confidence={:.2}",
		intent.primary_category, intent.product_type, intent.intent_confidence
	)
}
