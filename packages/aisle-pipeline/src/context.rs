use aisle_domain::{
	intent::Intent,
	weather::{self, WeatherReading},
};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{AisleService, Interaction, Preferences};

#[derive(Clone, Debug, Serialize)]
pub struct Temporal {
	pub day_of_week: String,
	pub hour: u8,
	pub is_weekend: bool,
	pub date: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ContextBlock {
	pub weather: WeatherReading,
	pub location: String,
	pub weather_suggested_tags: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub session_history: Option<Vec<Interaction>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_preferences: Option<Preferences>,
	pub temporal: Temporal,
}

/// Stage 2: pure augmentation around the intent. Weather falls back to the
/// seasonal simulation on any provider failure; a session id is the only
/// thing that mutates state, by appending this lookup to the history.
pub async fn enrich(
	service: &AisleService,
	intent: &Intent,
	location: &str,
	session_id: Option<&str>,
) -> ContextBlock {
	let weather = match service.cfg.providers.weather.as_ref() {
		Some(cfg) => match service.providers.weather.fetch(cfg, location).await {
			Ok(reading) => reading,
			Err(err) => {
				tracing::warn!("Weather provider unavailable, simulating: {err}");

				weather::simulated_weather(location)
			},
		},
		None => weather::simulated_weather(location),
	};
	let weather_suggested_tags = weather::weather_tags(&weather);
	let (session_history, user_preferences) = match session_id {
		Some(session_id) => {
			let history = service
				.sessions
				.history(session_id, service.cfg.session.history_limit as usize);
			let preferences = service
				.sessions
				.preferences(session_id, service.cfg.session.preference_window as usize);

			service.sessions.add_interaction(session_id, Interaction {
				query_type: "search".to_string(),
				category: Some(intent.primary_category.clone()),
				product_type: Some(intent.product_type.clone()),
				brand: intent.filters.brand.clone(),
				price: None,
				timestamp: OffsetDateTime::now_utc(),
			});

			(Some(history), Some(preferences))
		},
		None => (None, None),
	};

	ContextBlock {
		weather,
		location: location.to_string(),
		weather_suggested_tags,
		session_history,
		user_preferences,
		temporal: temporal_now(),
	}
}

fn temporal_now() -> Temporal {
	let now = OffsetDateTime::now_utc();
	let weekday = now.weekday();

	Temporal {
		day_of_week: weekday.to_string(),
		hour: now.hour(),
		is_weekend: matches!(weekday, time::Weekday::Saturday | time::Weekday::Sunday),
		date: format!("{:04}-{:02}-{:02}", now.year(), u8::from(now.month()), now.day()),
	}
}

pub fn summarize(context: &ContextBlock) -> String {
	format!(
		"weather={} {}C source={} tags={}",
		context.weather.condition,
		context.weather.temp_c,
		context.weather.source,
		context.weather_suggested_tags.len()
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn temporal_block_is_consistent() {
		let temporal = temporal_now();

		assert!(!temporal.day_of_week.is_empty());
		assert!(temporal.hour < 24);
		assert_eq!(temporal.date.len(), 10);
	}
}
