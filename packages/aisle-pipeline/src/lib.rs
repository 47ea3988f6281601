pub mod candidates;
pub mod constraints;
pub mod context;
pub mod intent;
pub mod rank;
pub mod respond;
pub mod run;
pub mod session;
pub mod time_serde;
pub mod trace;

use std::{future::Future, pin::Pin, sync::Arc};

use aisle_catalog::CatalogStore;
use aisle_config::{Config, EmbeddingProviderConfig, LlmProviderConfig, WeatherProviderConfig};
use aisle_domain::{intent::RawExtraction, weather::WeatherReading};
use aisle_providers::{drafter, embedding, extractor, weather};

pub use candidates::{CandidateBlock, SearchMode};
pub use constraints::{ConstraintBlock, InventoryStatus, PriceConstraint};
pub use context::{ContextBlock, Temporal};
pub use rank::{RankedBlock, RankedProduct, RankingMeta};
pub use respond::ResponseBlock;
pub use run::{PipelineRecord, RecommendRequest, RecommendResponse};
pub use session::{Interaction, Preferences, SessionStore};
pub use trace::{StepStatus, Trace, TraceLog, TraceRecorder, TraceStatus, TraceStep};

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait ExtractorProvider
where
	Self: Send + Sync,
{
	fn extract<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		query: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<RawExtraction>>;
}

pub trait DrafterProvider
where
	Self: Send + Sync,
{
	fn draft<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		system: &'a str,
		user: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

pub trait WeatherProvider
where
	Self: Send + Sync,
{
	fn fetch<'a>(
		&'a self,
		cfg: &'a WeatherProviderConfig,
		location: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<WeatherReading>>;
}

#[derive(Debug)]
pub enum ServiceError {
	InvalidRequest { message: String },
	Provider { message: String },
	Catalog { message: String },
}

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::Provider { message } => write!(f, "Provider error: {message}"),
			Self::Catalog { message } => write!(f, "Catalog error: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<color_eyre::Report> for ServiceError {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<aisle_catalog::Error> for ServiceError {
	fn from(err: aisle_catalog::Error) -> Self {
		Self::Catalog { message: err.to_string() }
	}
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub extractor: Arc<dyn ExtractorProvider>,
	pub drafter: Arc<dyn DrafterProvider>,
	pub weather: Arc<dyn WeatherProvider>,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl ExtractorProvider for DefaultProviders {
	fn extract<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		query: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<RawExtraction>> {
		Box::pin(extractor::extract(cfg, query))
	}
}

impl DrafterProvider for DefaultProviders {
	fn draft<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		system: &'a str,
		user: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(drafter::draft(cfg, system, user))
	}
}

impl WeatherProvider for DefaultProviders {
	fn fetch<'a>(
		&'a self,
		cfg: &'a WeatherProviderConfig,
		location: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<WeatherReading>> {
		Box::pin(weather::fetch(cfg, location))
	}
}

impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		extractor: Arc<dyn ExtractorProvider>,
		drafter: Arc<dyn DrafterProvider>,
		weather: Arc<dyn WeatherProvider>,
	) -> Self {
		Self { embedding, extractor, drafter, weather }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self {
			embedding: provider.clone(),
			extractor: provider.clone(),
			drafter: provider.clone(),
			weather: provider,
		}
	}
}

/// Extraction strategy, fixed when the service is built. Model mode requires
/// an extractor provider in the config; rules mode always works.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntentMode {
	Model,
	Rules,
}

pub struct AisleService {
	pub cfg: Config,
	pub catalog: Arc<dyn CatalogStore>,
	pub providers: Providers,
	pub sessions: SessionStore,
	pub traces: TraceLog,
	intent_mode: IntentMode,
}
impl AisleService {
	pub fn new(cfg: Config, catalog: Arc<dyn CatalogStore>) -> Self {
		Self::with_providers(cfg, catalog, Providers::default())
	}

	pub fn with_providers(
		cfg: Config,
		catalog: Arc<dyn CatalogStore>,
		providers: Providers,
	) -> Self {
		let intent_mode =
			if cfg.providers.extractor.is_some() { IntentMode::Model } else { IntentMode::Rules };
		let traces = TraceLog::new(cfg.trace.history_limit as usize);

		Self { cfg, catalog, providers, sessions: SessionStore::default(), traces, intent_mode }
	}

	pub fn intent_mode(&self) -> IntentMode {
		self.intent_mode
	}
}
