use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	pub catalog: Catalog,
	pub pipeline: Pipeline,
	#[serde(default)]
	pub ranking: RankingWeights,
	#[serde(default)]
	pub session: Session,
	#[serde(default)]
	pub trace: Trace,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	/// Structured-extraction LLM. Absent means the rule-based intent
	/// extractor is used for every request.
	pub extractor: Option<LlmProviderConfig>,
	/// Drafting LLM for the final reply. Absent means the deterministic
	/// template is used for every request.
	pub drafter: Option<LlmProviderConfig>,
	/// Weather provider. Absent means weather is always simulated.
	pub weather: Option<WeatherProviderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub max_tokens: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherProviderConfig {
	pub api_base: String,
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
	pub vector_dim: u32,
	/// Products JSON seeded into the in-memory store at startup. Rows without
	/// an embedding are backfilled through the embedding provider.
	pub seed_path: Option<String>,
	#[serde(default = "default_location")]
	pub default_location: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pipeline {
	#[serde(default = "default_top_k")]
	pub top_k: u32,
	#[serde(default = "default_top_n")]
	pub top_n: u32,
	#[serde(default = "default_min_stock")]
	pub min_stock: u32,
	#[serde(default = "default_max_price_cap")]
	pub max_price_cap: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
	pub similarity: f64,
	pub price_fit: f64,
	pub stock: f64,
	pub relevance: f64,
	pub popularity: f64,
}
impl Default for RankingWeights {
	fn default() -> Self {
		Self { similarity: 0.45, price_fit: 0.20, stock: 0.10, relevance: 0.15, popularity: 0.10 }
	}
}
impl RankingWeights {
	pub fn sum(&self) -> f64 {
		self.similarity + self.price_fit + self.stock + self.relevance + self.popularity
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Session {
	pub history_limit: u32,
	pub preference_window: u32,
}
impl Default for Session {
	fn default() -> Self {
		Self { history_limit: 5, preference_window: 10 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Trace {
	pub history_limit: u32,
	pub summary_max_chars: u32,
}
impl Default for Trace {
	fn default() -> Self {
		Self { history_limit: 50, summary_max_chars: 100 }
	}
}

fn default_location() -> String {
	"Melbourne, AU".to_string()
}

fn default_top_k() -> u32 {
	50
}

fn default_top_n() -> u32 {
	5
}

fn default_min_stock() -> u32 {
	1
}

fn default_max_price_cap() -> f64 {
	5_000.0
}
