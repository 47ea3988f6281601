mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Catalog, Config, EmbeddingProviderConfig, LlmProviderConfig, Pipeline, Providers,
	RankingWeights, Service, Session, Trace, WeatherProviderConfig,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.catalog.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match catalog.vector_dim.".to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.api_key must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (label, provider) in [
		("extractor", cfg.providers.extractor.as_ref()),
		("drafter", cfg.providers.drafter.as_ref()),
	] {
		let Some(provider) = provider else {
			continue;
		};

		if provider.timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.timeout_ms must be greater than zero."),
			});
		}
		if !provider.temperature.is_finite() || provider.temperature < 0.0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.temperature must be zero or greater."),
			});
		}
		if provider.max_tokens == 0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.max_tokens must be greater than zero."),
			});
		}
	}

	if let Some(weather) = cfg.providers.weather.as_ref() {
		if weather.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: "providers.weather.api_base must be non-empty.".to_string(),
			});
		}
		if weather.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "providers.weather.timeout_ms must be greater than zero.".to_string(),
			});
		}
	}

	if cfg.pipeline.top_n == 0 {
		return Err(Error::Validation {
			message: "pipeline.top_n must be greater than zero.".to_string(),
		});
	}
	if cfg.pipeline.top_k < cfg.pipeline.top_n {
		return Err(Error::Validation {
			message: "pipeline.top_k must be at least pipeline.top_n.".to_string(),
		});
	}
	if !cfg.pipeline.max_price_cap.is_finite() || cfg.pipeline.max_price_cap <= 0.0 {
		return Err(Error::Validation {
			message: "pipeline.max_price_cap must be greater than zero.".to_string(),
		});
	}

	for (label, weight) in [
		("similarity", cfg.ranking.similarity),
		("price_fit", cfg.ranking.price_fit),
		("stock", cfg.ranking.stock),
		("relevance", cfg.ranking.relevance),
		("popularity", cfg.ranking.popularity),
	] {
		if !weight.is_finite() || weight < 0.0 {
			return Err(Error::Validation {
				message: format!("ranking.{label} must be a finite number, zero or greater."),
			});
		}
	}
	if (cfg.ranking.sum() - 1.0).abs() > 1e-6 {
		return Err(Error::Validation {
			message: "ranking weights must sum to 1.0.".to_string(),
		});
	}

	if cfg.session.preference_window == 0 {
		return Err(Error::Validation {
			message: "session.preference_window must be greater than zero.".to_string(),
		});
	}
	if cfg.trace.history_limit == 0 {
		return Err(Error::Validation {
			message: "trace.history_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.trace.summary_max_chars == 0 {
		return Err(Error::Validation {
			message: "trace.summary_max_chars must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	// An optional provider with a blank key is treated as absent, so the
	// availability probe at service construction sees one signal.
	if cfg
		.providers
		.extractor
		.as_ref()
		.map(|provider| provider.api_key.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.extractor = None;
	}
	if cfg
		.providers
		.drafter
		.as_ref()
		.map(|provider| provider.api_key.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.drafter = None;
	}
	if cfg.catalog.seed_path.as_deref().map(|path| path.trim().is_empty()).unwrap_or(false) {
		cfg.catalog.seed_path = None;
	}
}
