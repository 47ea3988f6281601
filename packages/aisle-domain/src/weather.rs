//! Weather context and the mapping from conditions to product tags. Seasons
//! follow the southern hemisphere since the storefront is Australian.

use serde::{Deserialize, Serialize};
use time::{Month, OffsetDateTime};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WeatherReading {
	pub location: String,
	pub temp_c: i32,
	pub condition: String,
	pub humidity: u32,
	pub season: String,
	pub source: String,
}

pub fn season_for_month(month: Month) -> &'static str {
	match month {
		Month::December | Month::January | Month::February => "summer",
		Month::March | Month::April | Month::May => "autumn",
		Month::June | Month::July | Month::August => "winter",
		Month::September | Month::October | Month::November => "spring",
	}
}

pub fn current_season() -> &'static str {
	season_for_month(OffsetDateTime::now_utc().month())
}

/// Plausible reading for the current season, used whenever the live provider
/// is unconfigured or fails.
pub fn simulated_weather(location: &str) -> WeatherReading {
	let season = current_season();
	let (temp_c, condition, humidity) = match season {
		"summer" => (32, "Sunny", 45),
		"winter" => (8, "Cloudy", 70),
		"autumn" => (15, "Windy", 60),
		_ => (20, "Partly Cloudy", 55),
	};

	WeatherReading {
		location: location.to_string(),
		temp_c,
		condition: condition.to_string(),
		humidity,
		season: season.to_string(),
		source: "simulated".to_string(),
	}
}

/// Product tags suggested by the weather. Temperature picks one band, then
/// condition keywords append extras; duplicates collapse keeping first
/// occurrence so the output order is stable.
pub fn weather_tags(weather: &WeatherReading) -> Vec<String> {
	let mut tags: Vec<&str> = if weather.temp_c >= 30 {
		vec!["summer", "lightweight", "breathable", "cooling", "UV protection"]
	} else if weather.temp_c >= 20 {
		vec!["spring", "light layers", "comfortable"]
	} else if weather.temp_c >= 10 {
		vec!["autumn", "layering", "warm"]
	} else {
		vec!["winter", "insulated", "warm", "waterproof"]
	};
	let condition = weather.condition.to_lowercase();

	if condition.contains("rain") {
		tags.extend(["waterproof", "rain gear"]);
	}
	if condition.contains("sun") {
		tags.extend(["sun protection", "outdoor"]);
	}
	if condition.contains("wind") {
		tags.extend(["windproof"]);
	}

	let mut deduped = Vec::new();

	for tag in tags {
		if !deduped.iter().any(|seen: &String| seen == tag) {
			deduped.push(tag.to_string());
		}
	}

	deduped
}

#[cfg(test)]
mod tests {
	use super::*;

	fn reading(temp_c: i32, condition: &str) -> WeatherReading {
		WeatherReading {
			location: "Melbourne, AU".to_string(),
			temp_c,
			condition: condition.to_string(),
			humidity: 50,
			season: "summer".to_string(),
			source: "simulated".to_string(),
		}
	}

	#[test]
	fn seasons_follow_the_southern_hemisphere() {
		assert_eq!(season_for_month(Month::January), "summer");
		assert_eq!(season_for_month(Month::April), "autumn");
		assert_eq!(season_for_month(Month::July), "winter");
		assert_eq!(season_for_month(Month::October), "spring");
	}

	#[test]
	fn hot_sunny_weather_suggests_cooling_gear() {
		let tags = weather_tags(&reading(32, "Sunny"));

		assert_eq!(
			tags,
			vec![
				"summer",
				"lightweight",
				"breathable",
				"cooling",
				"UV protection",
				"sun protection",
				"outdoor"
			]
		);
	}

	#[test]
	fn cold_rain_dedups_waterproof() {
		let tags = weather_tags(&reading(5, "Light rain"));

		// "waterproof" appears in both the band and the rain extras.
		assert_eq!(tags.iter().filter(|tag| *tag == "waterproof").count(), 1);
		assert_eq!(tags.first().map(String::as_str), Some("winter"));
		assert!(tags.contains(&"rain gear".to_string()));
	}

	#[test]
	fn mild_weather_uses_the_middle_bands() {
		assert_eq!(weather_tags(&reading(22, "Clear")), vec![
			"spring",
			"light layers",
			"comfortable"
		]);
		assert_eq!(weather_tags(&reading(12, "Overcast")), vec!["autumn", "layering", "warm"]);
	}
}
