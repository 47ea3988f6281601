use std::{
	collections::HashMap,
	sync::{Arc, Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One logged lookup within a session. Prices are only present when a later
/// interaction records one, so preference aggregation must tolerate gaps.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Interaction {
	pub query_type: String,
	pub category: Option<String>,
	pub product_type: Option<String>,
	pub brand: Option<String>,
	pub price: Option<f64>,
	#[serde(with = "crate::time_serde")]
	pub timestamp: OffsetDateTime,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct Preferences {
	pub preferred_categories: Vec<String>,
	pub preferred_brands: Vec<String>,
	pub avg_price: Option<f64>,
}
impl Preferences {
	pub fn is_empty(&self) -> bool {
		self.preferred_categories.is_empty()
			&& self.preferred_brands.is_empty()
			&& self.avg_price.is_none()
	}
}

/// Append-only per-session history, shared across concurrent requests. Each
/// request only appends under its own session key.
#[derive(Clone, Default)]
pub struct SessionStore {
	sessions: Arc<Mutex<HashMap<String, Vec<Interaction>>>>,
}
impl SessionStore {
	fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Interaction>>> {
		self.sessions.lock().unwrap_or_else(|err| err.into_inner())
	}

	pub fn add_interaction(&self, session_id: &str, interaction: Interaction) {
		self.lock().entry(session_id.to_string()).or_default().push(interaction);
	}

	/// Most recent `limit` interactions, oldest first.
	pub fn history(&self, session_id: &str, limit: usize) -> Vec<Interaction> {
		let sessions = self.lock();
		let Some(entries) = sessions.get(session_id) else {
			return Vec::new();
		};
		let start = entries.len().saturating_sub(limit);

		entries[start..].to_vec()
	}

	/// Aggregates the last `window` interactions into a preference summary.
	/// Distinct values keep first-seen order; an empty window yields an empty
	/// summary rather than dividing by zero.
	pub fn preferences(&self, session_id: &str, window: usize) -> Preferences {
		let history = self.history(session_id, window);
		let mut preferences = Preferences::default();
		let mut prices = Vec::new();

		for interaction in &history {
			if let Some(category) = &interaction.category
				&& !preferences.preferred_categories.contains(category)
			{
				preferences.preferred_categories.push(category.clone());
			}
			if let Some(brand) = &interaction.brand
				&& !preferences.preferred_brands.contains(brand)
			{
				preferences.preferred_brands.push(brand.clone());
			}
			if let Some(price) = interaction.price {
				prices.push(price);
			}
		}

		if !prices.is_empty() {
			preferences.avg_price = Some(prices.iter().sum::<f64>() / prices.len() as f64);
		}

		preferences
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn interaction(category: &str, price: Option<f64>) -> Interaction {
		Interaction {
			query_type: "search".to_string(),
			category: Some(category.to_string()),
			product_type: None,
			brand: None,
			price,
			timestamp: OffsetDateTime::UNIX_EPOCH,
		}
	}

	#[test]
	fn history_returns_the_most_recent_entries() {
		let store = SessionStore::default();

		for i in 0..8 {
			store.add_interaction("s1", interaction(&format!("cat{i}"), None));
		}

		let recent = store.history("s1", 5);

		assert_eq!(recent.len(), 5);
		assert_eq!(recent[0].category.as_deref(), Some("cat3"));
		assert_eq!(recent[4].category.as_deref(), Some("cat7"));
		assert!(store.history("other", 5).is_empty());
	}

	#[test]
	fn preferences_dedup_and_average() {
		let store = SessionStore::default();

		store.add_interaction("s1", interaction("Home & Living", Some(40.0)));
		store.add_interaction("s1", interaction("Home & Living", Some(60.0)));
		store.add_interaction("s1", interaction("Nursery & Kids", None));

		let prefs = store.preferences("s1", 10);

		assert_eq!(prefs.preferred_categories, vec!["Home & Living", "Nursery & Kids"]);
		assert_eq!(prefs.avg_price, Some(50.0));
	}

	#[test]
	fn empty_session_yields_empty_preferences() {
		let store = SessionStore::default();

		assert!(store.preferences("nobody", 10).is_empty());
	}
}
