//! One-artifact assessment session: rater fan-out, barrier, aggregation.
//!
//! The session mirrors the engine's control flow end to end: it issues up
//! to `concurrency` rater invocations at a time, bounds each with a
//! timeout, drains them cooperatively (checking an optional cancel flag
//! between completions), and only after that barrier runs the pure
//! aggregation — a cancelled session never yields a partial consensus.
//!
//! A failed or timed-out rater invalidates only itself; the session
//! proceeds with whatever assessments remain and lets the aggregator
//! decide whether they are enough.

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::axes::Axis;
use crate::consensus::{ConsensusAggregator, ConsensusResult, TieBreakPolicy};
use crate::error::EngineError;
use crate::planner::{TransformationPlan, TransformationPlanner};
use crate::rater::Rater;
use crate::trace::{now_epoch_ms, AssessmentTrace, TraceSink};
use crate::types::{Artifact, RaterAssessment, RatingVector};

/// Upper bound on concurrent rater invocations per session.
const MAX_RATER_CONCURRENCY: usize = 16;

// =============================================================================
// Configuration and report
// =============================================================================

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Minimum valid assessments required at aggregation time.
    pub min_raters: usize,
    /// Per-rater response window.
    pub rater_timeout: Duration,
    /// Concurrent rater invocations; clamped to 1..=16.
    pub concurrency: usize,
    pub tie_break: TieBreakPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_raters: ConsensusAggregator::DEFAULT_MIN_RATERS,
            rater_timeout: Duration::from_secs(30),
            concurrency: 4,
            tie_break: TieBreakPolicy::default(),
        }
    }
}

/// Why a rater contributed nothing to the barrier.
#[derive(Debug, Clone, Serialize)]
pub struct RaterFailure {
    pub rater_id: String,
    pub code: String,
    pub message: String,
    pub timed_out: bool,
}

/// Everything a finished session produced.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub consensus: ConsensusResult,
    pub assessments: Vec<RaterAssessment>,
    pub failures: Vec<RaterFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<TransformationPlan>,
    pub elapsed_ms: u128,
}

// =============================================================================
// Session
// =============================================================================

pub struct AssessmentSession {
    raters: Vec<Arc<dyn Rater>>,
    config: SessionConfig,
    trace: Option<Arc<dyn TraceSink>>,
}

impl AssessmentSession {
    pub fn new(raters: Vec<Arc<dyn Rater>>) -> Self {
        Self::with_config(raters, SessionConfig::default())
    }

    pub fn with_config(raters: Vec<Arc<dyn Rater>>, config: SessionConfig) -> Self {
        Self {
            raters,
            config,
            trace: None,
        }
    }

    pub fn with_trace(mut self, trace: Arc<dyn TraceSink>) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Assess `artifact` with every configured rater and aggregate.
    pub async fn run(&self, artifact: &Artifact) -> Result<SessionReport, EngineError> {
        self.run_with_cancel(artifact, None).await
    }

    /// Like [`AssessmentSession::run`], checking `cancel` cooperatively
    /// between rater completions. Cancellation fails the session before
    /// any consensus is constructed.
    pub async fn run_with_cancel(
        &self,
        artifact: &Artifact,
        cancel: Option<&AtomicBool>,
    ) -> Result<SessionReport, EngineError> {
        let started = Instant::now();
        let (assessments, failures) = self.collect(artifact, cancel).await?;

        let aggregator = ConsensusAggregator::new(self.config.min_raters)
            .with_tie_break(self.config.tie_break);
        let consensus = aggregator.aggregate(artifact.id(), &assessments)?;

        Ok(SessionReport {
            consensus,
            assessments,
            failures,
            plan: None,
            elapsed_ms: started.elapsed().as_millis(),
        })
    }

    /// Run a session and plan the walk from its consensus to `target`.
    pub async fn run_to_target(
        &self,
        artifact: &Artifact,
        target: &RatingVector,
        priority: Option<[Axis; 3]>,
    ) -> Result<SessionReport, EngineError> {
        let mut report = self.run(artifact).await?;
        let planner = TransformationPlanner::new();
        let plan = planner.plan_with_priority(
            &report.consensus.consensus,
            target,
            priority.unwrap_or(Axis::DEFAULT_PRIORITY),
        )?;
        report.plan = Some(plan);
        Ok(report)
    }

    async fn collect(
        &self,
        artifact: &Artifact,
        cancel: Option<&AtomicBool>,
    ) -> Result<(Vec<RaterAssessment>, Vec<RaterFailure>), EngineError> {
        if is_cancelled(cancel) {
            return Err(EngineError::cancelled(artifact.id()));
        }

        let concurrency = self.config.concurrency.clamp(1, MAX_RATER_CONCURRENCY);
        let window = self.config.rater_timeout;
        let digest = artifact.snapshot_digest();

        let mut completions = stream::iter(self.raters.iter().map(|rater| {
            let rater = Arc::clone(rater);
            async move {
                let invoked = Instant::now();
                let outcome = tokio::time::timeout(window, rater.assess(artifact)).await;
                (rater.id().to_string(), invoked.elapsed(), outcome)
            }
        }))
        .buffer_unordered(concurrency);

        let mut assessments = Vec::with_capacity(self.raters.len());
        let mut failures = Vec::new();

        while let Some((rater_id, latency, outcome)) = completions.next().await {
            if is_cancelled(cancel) {
                return Err(EngineError::cancelled(artifact.id()));
            }

            match outcome {
                Ok(Ok(assessment)) => {
                    self.record_trace(AssessmentTrace {
                        timestamp_ms: now_epoch_ms(),
                        artifact_id: artifact.id().to_string(),
                        snapshot_digest: digest.clone(),
                        rater_id,
                        notation: Some(assessment.vector().to_string()),
                        error: None,
                        timed_out: false,
                        latency_ms: latency.as_millis(),
                    });
                    assessments.push(assessment);
                }
                Ok(Err(err)) => {
                    tracing::warn!(
                        artifact = artifact.id(),
                        rater = %rater_id,
                        code = err.code(),
                        "rater failed: {err}"
                    );
                    self.record_trace(AssessmentTrace {
                        timestamp_ms: now_epoch_ms(),
                        artifact_id: artifact.id().to_string(),
                        snapshot_digest: digest.clone(),
                        rater_id: rater_id.clone(),
                        notation: None,
                        error: Some(err.to_string()),
                        timed_out: false,
                        latency_ms: latency.as_millis(),
                    });
                    failures.push(RaterFailure {
                        rater_id,
                        code: err.code().to_string(),
                        message: err.to_string(),
                        timed_out: false,
                    });
                }
                Err(_) => {
                    let err = EngineError::rater_timeout(artifact.id(), rater_id.clone(), window);
                    tracing::warn!(
                        artifact = artifact.id(),
                        rater = %rater_id,
                        "rater timed out after {window:?}"
                    );
                    self.record_trace(AssessmentTrace {
                        timestamp_ms: now_epoch_ms(),
                        artifact_id: artifact.id().to_string(),
                        snapshot_digest: digest.clone(),
                        rater_id: rater_id.clone(),
                        notation: None,
                        error: Some(err.to_string()),
                        timed_out: true,
                        latency_ms: latency.as_millis(),
                    });
                    failures.push(RaterFailure {
                        rater_id,
                        code: err.code().to_string(),
                        message: err.to_string(),
                        timed_out: true,
                    });
                }
            }
        }

        Ok((assessments, failures))
    }

    fn record_trace(&self, event: AssessmentTrace) {
        if let Some(sink) = &self.trace {
            if let Err(err) = sink.record(event) {
                tracing::warn!("trace sink rejected event: {err}");
            }
        }
    }
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|flag| flag.load(AtomicOrdering::Relaxed))
}
