use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use aisle_domain::weather::{WeatherReading, current_season};

/// Fetches current conditions from a wttr.in style endpoint. Callers fall
/// back to [`aisle_domain::weather::simulated_weather`] on any failure.
pub async fn fetch(cfg: &aisle_config::WeatherProviderConfig, location: &str) -> Result<WeatherReading> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}/{location}?format=j1", cfg.api_base);
	let res = client.get(url).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_conditions(&json, location)
}

fn parse_conditions(json: &Value, location: &str) -> Result<WeatherReading> {
	let current = json
		.get("current_condition")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.ok_or_else(|| eyre::eyre!("Weather response is missing current_condition."))?;
	let temp_c = current
		.get("temp_C")
		.and_then(|v| v.as_str())
		.and_then(|raw| raw.parse::<i32>().ok())
		.ok_or_else(|| eyre::eyre!("Weather response is missing temp_C."))?;
	let humidity = current
		.get("humidity")
		.and_then(|v| v.as_str())
		.and_then(|raw| raw.parse::<u32>().ok())
		.ok_or_else(|| eyre::eyre!("Weather response is missing humidity."))?;
	let condition = current
		.get("weatherDesc")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|desc| desc.get("value"))
		.and_then(|v| v.as_str())
		.ok_or_else(|| eyre::eyre!("Weather response is missing a description."))?;

	Ok(WeatherReading {
		location: location.to_string(),
		temp_c,
		condition: condition.to_string(),
		humidity,
		season: current_season().to_string(),
		source: "live".to_string(),
	})
}
