#![forbid(unsafe_code)]

//! # ergo-harness
//!
//! Rate a code artifact along three independent ordinal axes, reconcile the
//! verdicts of independent raters into a consensus with a measurable
//! agreement level, and plan the stepwise path from one rating to another.
//!
//! The rating space is a 4×4×4 lattice: each axis owns four totally ordered
//! states, written with one-character symbols in a bracketed notation such
//! as `<RLG>`. Classification is a fixed decision tree per axis over a
//! structural scan of the artifact; consensus is exact mode counting with
//! an explicit tie-break policy; planning is a monotone, axis-grouped walk
//! through the lattice.
//!
//! Raters are external collaborators: the engine consumes their
//! assessments but never models their reasoning. [`AssessmentSession`]
//! fans invocations out concurrently, bounds each with a timeout, and
//! aggregates strictly after that barrier.

pub mod axes;
pub mod classifier;
pub mod consensus;
pub mod error;
pub mod notation;
pub mod planner;
pub mod rater;
pub mod session;
pub mod trace;
pub mod types;

pub use axes::{Axis, State};
pub use classifier::{AxisClassifier, BoundaryResolver, Classification};
pub use consensus::{AgreementCategory, ConsensusAggregator, ConsensusResult, TieBreakPolicy};
pub use error::EngineError;
pub use planner::{TransformationPlan, TransformationPlanner, TransformationStep};
pub use rater::{HttpRater, LocalRater, Rater, RaterError};
pub use session::{AssessmentSession, SessionConfig, SessionReport};
pub use trace::{AssessmentTrace, JsonlTraceSink, TraceSink, TraceWorker};
pub use types::{Artifact, AxisRating, Confidence, ContextTag, RaterAssessment, RatingVector};
