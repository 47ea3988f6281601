//! Governance trace: per-invocation step records plus a bounded in-memory
//! history. Injected as a handle so tests get isolated instances.

use std::{
	collections::VecDeque,
	fmt::Display,
	future::Future,
	sync::{Arc, Mutex, MutexGuard},
	time::Instant,
};

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
	Success,
	Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStatus {
	InProgress,
	Completed,
}

#[derive(Clone, Debug, Serialize)]
pub struct TraceStep {
	pub agent: String,
	#[serde(with = "crate::time_serde")]
	pub started_at: OffsetDateTime,
	pub duration_ms: f64,
	pub status: StepStatus,
	pub input_summary: String,
	pub output_summary: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Trace {
	pub trace_id: String,
	pub query: String,
	pub user_id: Option<String>,
	pub session_id: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub started_at: OffsetDateTime,
	#[serde(with = "crate::time_serde::option")]
	pub ended_at: Option<OffsetDateTime>,
	pub status: TraceStatus,
	pub steps: Vec<TraceStep>,
	pub final_response: Option<String>,
	pub total_duration_ms: f64,
}

/// Records one invocation. Stages run through [`TraceRecorder::measured`] so
/// timing and status capture cannot drift from the actual call.
pub struct TraceRecorder {
	trace: Trace,
	summary_max_chars: usize,
}
impl TraceRecorder {
	pub fn start(
		query: &str,
		user_id: Option<&str>,
		session_id: Option<&str>,
		summary_max_chars: usize,
	) -> Self {
		let trace_id = format!("trace_{}", Uuid::new_v4().simple());

		tracing::info!(trace_id, query, "trace start");

		Self {
			trace: Trace {
				trace_id,
				query: query.to_string(),
				user_id: user_id.map(str::to_string),
				session_id: session_id.map(str::to_string),
				started_at: OffsetDateTime::now_utc(),
				ended_at: None,
				status: TraceStatus::InProgress,
				steps: Vec::new(),
				final_response: None,
				total_duration_ms: 0.0,
			},
			summary_max_chars,
		}
	}

	pub fn trace_id(&self) -> &str {
		&self.trace.trace_id
	}

	/// Runs a stage, emitting a success or error step. The error is handed
	/// back untouched so the orchestrator decides whether it is fatal.
	pub async fn measured<T, E, F>(
		&mut self,
		agent: &str,
		input_summary: &str,
		stage: F,
		summarize: impl FnOnce(&T) -> String,
	) -> Result<T, E>
	where
		E: Display,
		F: Future<Output = Result<T, E>>,
	{
		let started_at = OffsetDateTime::now_utc();
		let clock = Instant::now();
		let outcome = stage.await;
		let duration_ms = clock.elapsed().as_secs_f64() * 1_000.0;
		let step = match &outcome {
			Ok(value) => TraceStep {
				agent: agent.to_string(),
				started_at,
				duration_ms,
				status: StepStatus::Success,
				input_summary: self.truncate(input_summary),
				output_summary: self.truncate(&summarize(value)),
				error: None,
			},
			Err(err) => TraceStep {
				agent: agent.to_string(),
				started_at,
				duration_ms,
				status: StepStatus::Error,
				input_summary: self.truncate(input_summary),
				output_summary: "null".to_string(),
				error: Some(err.to_string()),
			},
		};

		match step.status {
			StepStatus::Success => {
				tracing::info!(trace_id = self.trace.trace_id, agent, duration_ms, "stage done")
			},
			StepStatus::Error => tracing::error!(
				trace_id = self.trace.trace_id,
				agent,
				duration_ms,
				error = step.error.as_deref().unwrap_or_default(),
				"stage failed"
			),
		}

		self.trace.steps.push(step);

		outcome
	}

	/// Zero-duration error step for failures caught outside any stage.
	pub fn error_step(&mut self, agent: &str, input_summary: &str, error: &impl Display) {
		self.trace.steps.push(TraceStep {
			agent: agent.to_string(),
			started_at: OffsetDateTime::now_utc(),
			duration_ms: 0.0,
			status: StepStatus::Error,
			input_summary: self.truncate(input_summary),
			output_summary: "null".to_string(),
			error: Some(error.to_string()),
		});
	}

	/// Closes the trace with the total-duration rollup. Call exactly once.
	pub fn finish(mut self, final_response: Option<&str>) -> Trace {
		self.trace.ended_at = Some(OffsetDateTime::now_utc());
		self.trace.status = TraceStatus::Completed;
		self.trace.final_response =
			final_response.map(|response| response.chars().take(200).collect());
		self.trace.total_duration_ms =
			self.trace.steps.iter().map(|step| step.duration_ms).sum();

		tracing::info!(
			trace_id = self.trace.trace_id,
			total_ms = self.trace.total_duration_ms,
			steps = self.trace.steps.len(),
			"trace end"
		);

		self.trace
	}

	fn truncate(&self, text: &str) -> String {
		text.chars().take(self.summary_max_chars).collect()
	}
}

/// Bounded most-recent-N trace history.
#[derive(Clone)]
pub struct TraceLog {
	limit: usize,
	traces: Arc<Mutex<VecDeque<Trace>>>,
}
impl TraceLog {
	pub fn new(limit: usize) -> Self {
		Self { limit: limit.max(1), traces: Arc::new(Mutex::new(VecDeque::new())) }
	}

	fn lock(&self) -> MutexGuard<'_, VecDeque<Trace>> {
		self.traces.lock().unwrap_or_else(|err| err.into_inner())
	}

	pub fn push(&self, trace: Trace) {
		let mut traces = self.lock();

		while traces.len() >= self.limit {
			traces.pop_front();
		}

		traces.push_back(trace);
	}

	/// Most recent `limit` traces in chronological order.
	pub fn recent(&self, limit: usize) -> Vec<Trace> {
		let traces = self.lock();
		let start = traces.len().saturating_sub(limit);

		traces.iter().skip(start).cloned().collect()
	}

	pub fn last(&self) -> Option<Trace> {
		self.lock().back().cloned()
	}

	pub fn len(&self) -> usize {
		self.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.lock().is_empty()
	}
}
