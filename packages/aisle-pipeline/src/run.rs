use aisle_domain::intent::Intent;
use serde::{Deserialize, Serialize};

use crate::{
	AisleService, CandidateBlock, ConstraintBlock, ContextBlock, RankedBlock, RankedProduct,
	ResponseBlock, ServiceError, ServiceResult, Trace, TraceRecorder, candidates, constraints,
	context, intent, rank,
	rank::RankingMeta,
	respond,
};

#[derive(Clone, Debug, Deserialize)]
pub struct RecommendRequest {
	pub query: String,
	#[serde(default)]
	pub user_id: Option<String>,
	#[serde(default)]
	pub session_id: Option<String>,
	#[serde(default)]
	pub location: Option<String>,
	#[serde(default)]
	pub top_n: Option<usize>,
}

/// Accumulator threaded through the stages. Each field is written by exactly
/// one stage; a stage failure leaves everything written so far intact for the
/// trace and the degraded response.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PipelineRecord {
	pub intent: Option<Intent>,
	pub context: Option<ContextBlock>,
	pub constraints: Option<ConstraintBlock>,
	pub candidates: Option<CandidateBlock>,
	pub ranking: Option<RankedBlock>,
	pub response: Option<ResponseBlock>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RecommendResponse {
	pub query: String,
	pub intent: Intent,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub context: Option<ContextBlock>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub constraints: Option<ConstraintBlock>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub candidates: Option<CandidateBlock>,
	pub ranked_products: Vec<RankedProduct>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ranking_meta: Option<RankingMeta>,
	pub response: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub response_source: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub response_error: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	pub trace_id: String,
	pub trace: Trace,
}

impl AisleService {
	/// Runs the full pipeline. Stage-internal degradation is preferred; an
	/// error escaping a stage aborts the rest, is recorded in the trace, and
	/// forces a generic failure response. A response string is always
	/// produced for a valid request.
	pub async fn recommend(&self, request: RecommendRequest) -> ServiceResult<RecommendResponse> {
		let query = request.query.trim().to_string();

		if query.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "query must be non-empty.".to_string(),
			});
		}

		let location = request
			.location
			.filter(|location| !location.trim().is_empty())
			.unwrap_or_else(|| self.cfg.catalog.default_location.clone());
		let top_n = request.top_n.unwrap_or(self.cfg.pipeline.top_n as usize).max(1);
		let top_k = (self.cfg.pipeline.top_k as usize).max(top_n);
		let mut recorder = TraceRecorder::start(
			&query,
			request.user_id.as_deref(),
			request.session_id.as_deref(),
			self.cfg.trace.summary_max_chars as usize,
		);
		let mut record = PipelineRecord::default();
		let outcome = self
			.run_stages(
				&mut recorder,
				&mut record,
				&query,
				&location,
				request.session_id.as_deref(),
				top_k,
				top_n,
			)
			.await;
		let mut error = None;

		if let Err(err) = outcome {
			recorder.error_step("Orchestrator", &query, &err);
			record.response = Some(ResponseBlock::failure(format!("An error occurred: {err}")));
			error = Some(err.to_string());
		}

		let response = record.response.take().unwrap_or_else(|| {
			ResponseBlock::failure("An error occurred: no response was produced.".to_string())
		});
		let trace = recorder.finish(Some(&response.response));
		let trace_id = trace.trace_id.clone();

		self.traces.push(trace.clone());

		let intent = record.intent.unwrap_or_else(|| Intent::fallback(&query));
		let (ranked_products, ranking_meta) = match record.ranking {
			Some(block) => (block.ranked_products, Some(block.ranking_meta)),
			None => (Vec::new(), None),
		};

		Ok(RecommendResponse {
			query,
			intent,
			context: record.context,
			constraints: record.constraints,
			candidates: record.candidates,
			ranked_products,
			ranking_meta,
			response: response.response,
			response_source: response.response_source,
			response_error: response.response_error,
			error,
			trace_id,
			trace,
		})
	}

	#[allow(clippy::too_many_arguments)]
	async fn run_stages(
		&self,
		recorder: &mut TraceRecorder,
		record: &mut PipelineRecord,
		query: &str,
		location: &str,
		session_id: Option<&str>,
		top_k: usize,
		top_n: usize,
	) -> ServiceResult<()> {
		let intent = recorder
			.measured(
				"IntentExtractor",
				query,
				async { Ok::<_, ServiceError>(intent::extract(self, query).await) },
				intent::summarize,
			)
			.await?;

		record.intent = Some(intent.clone());

		let context = recorder
			.measured(
				"ContextEnricher",
				&intent::summarize(&intent),
				async {
					Ok::<_, ServiceError>(context::enrich(self, &intent, location, session_id).await)
				},
				context::summarize,
			)
			.await?;

		record.context = Some(context.clone());

		let constraints = recorder
			.measured(
				"ConstraintResolver",
				&intent::summarize(&intent),
				async { Ok::<_, ServiceError>(constraints::apply(self, &intent).await) },
				constraints::summarize,
			)
			.await?;

		record.constraints = Some(constraints.clone());

		let candidates = recorder
			.measured(
				"CandidateRetriever",
				&constraints.filter_clause,
				candidates::retrieve(self, &intent, &context, &constraints, top_k),
				candidates::summarize,
			)
			.await?;

		record.candidates = Some(candidates.clone());

		let ranking = recorder
			.measured(
				"Ranker",
				&format!("{} products", candidates.total_candidates),
				async {
					Ok::<_, ServiceError>(rank::rank(
						&candidates.products,
						&intent,
						self.cfg.pipeline.max_price_cap,
						&self.cfg.ranking,
						top_n,
					))
				},
				rank::summarize,
			)
			.await?;

		record.ranking = Some(ranking.clone());

		let response = recorder
			.measured(
				"ResponseComposer",
				&format!("{} products", ranking.ranked_products.len()),
				async {
					Ok::<_, ServiceError>(respond::compose(self, &intent, &context, &ranking).await)
				},
				respond::summarize,
			)
			.await?;

		record.response = Some(response);

		Ok(())
	}
}
