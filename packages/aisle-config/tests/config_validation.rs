use toml::Value;

use aisle_config::{Config, Error};

const SAMPLE_CONFIG_TOML: &str = r#"
[service]
http_bind = "127.0.0.1:8080"
log_level = "info"

[providers.embedding]
provider_id = "openai"
api_base = "http://localhost:9000"
api_key = "key"
path = "/v1/embeddings"
model = "text-embedding-3-small"
dimensions = 32
timeout_ms = 5000

[providers.extractor]
provider_id = "openai"
api_base = "http://localhost:9000"
api_key = "key"
path = "/v1/chat/completions"
model = "gpt-4o-mini"
temperature = 0.1
max_tokens = 2048
timeout_ms = 8000

[providers.drafter]
provider_id = "openai"
api_base = "http://localhost:9000"
api_key = "key"
path = "/v1/chat/completions"
model = "gpt-4o-mini"
temperature = 0.7
max_tokens = 1024
timeout_ms = 8000

[providers.weather]
api_base = "https://wttr.in"
timeout_ms = 5000

[catalog]
vector_dim = 32
default_location = "Melbourne, AU"

[pipeline]
top_k = 50
top_n = 5
min_stock = 1
max_price_cap = 5000.0

[ranking]
similarity = 0.45
price_fit = 0.20
stock = 0.10
relevance = 0.15
popularity = 0.10
"#;

fn parse(payload: &str) -> Config {
	toml::from_str(payload).expect("Failed to parse sample config.")
}

fn with_table_entry(section: &[&str], key: &str, entry: Value) -> String {
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let mut table = value.as_table_mut().expect("Sample config must be a table.");

	for segment in section {
		table = table
			.get_mut(*segment)
			.and_then(Value::as_table_mut)
			.expect("Sample config must include the requested section.");
	}

	table.insert(key.to_string(), entry);

	toml::to_string(&value).expect("Failed to render sample config.")
}

fn expect_validation_error(payload: String, needle: &str) {
	let cfg = parse(&payload);
	let err = aisle_config::validate(&cfg).expect_err("Validation must fail.");

	match err {
		Error::Validation { message } => {
			assert!(message.contains(needle), "unexpected message: {message}")
		},
		other => panic!("unexpected error: {other}"),
	}
}

#[test]
fn sample_config_passes_validation() {
	let cfg = parse(SAMPLE_CONFIG_TOML);

	aisle_config::validate(&cfg).expect("Sample config must validate.");
}

#[test]
fn rejects_dimension_mismatch() {
	expect_validation_error(
		with_table_entry(&["catalog"], "vector_dim", Value::Integer(64)),
		"must match catalog.vector_dim",
	);
}

#[test]
fn rejects_zero_embedding_dimensions() {
	let payload = with_table_entry(&["providers", "embedding"], "dimensions", Value::Integer(0));
	let payload = {
		let mut value: Value = toml::from_str(&payload).expect("Failed to parse sample config.");
		let root = value.as_table_mut().expect("Sample config must be a table.");
		let catalog = root
			.get_mut("catalog")
			.and_then(Value::as_table_mut)
			.expect("Sample config must include [catalog].");

		catalog.insert("vector_dim".to_string(), Value::Integer(0));

		toml::to_string(&value).expect("Failed to render sample config.")
	};

	expect_validation_error(payload, "dimensions must be greater than zero");
}

#[test]
fn rejects_weights_not_summing_to_one() {
	expect_validation_error(
		with_table_entry(&["ranking"], "similarity", Value::Float(0.6)),
		"must sum to 1.0",
	);
}

#[test]
fn rejects_top_k_below_top_n() {
	expect_validation_error(
		with_table_entry(&["pipeline"], "top_k", Value::Integer(2)),
		"top_k must be at least",
	);
}

#[test]
fn ranking_defaults_apply_when_section_absent() {
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let root = value.as_table_mut().expect("Sample config must be a table.");

	root.remove("ranking");

	let payload = toml::to_string(&value).expect("Failed to render sample config.");
	let cfg = parse(&payload);

	assert!((cfg.ranking.sum() - 1.0).abs() < 1e-9);
	assert_eq!(cfg.ranking.similarity, 0.45);

	aisle_config::validate(&cfg).expect("Defaults must validate.");
}
