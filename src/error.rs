//! Engine-level error taxonomy.
//!
//! Every variant names the artifact involved where one exists at that
//! boundary. Planner inputs are bare rating vectors, which deliberately
//! carry no artifact identity, so domain violations there name the axis
//! and the offending state index instead.

use std::time::Duration;

use thiserror::Error;

use crate::axes::Axis;
use crate::notation::NotationError;

/// Errors surfaced by classification, aggregation, planning, and sessions.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The artifact is too sparse to evaluate any boundary test on this axis.
    #[error("artifact {artifact_id}: insufficient input for {axis} classification: {reason}")]
    InsufficientInput {
        artifact_id: String,
        axis: Axis,
        reason: String,
    },

    /// An external rater failed to respond within its window.
    #[error("artifact {artifact_id}: rater {rater_id} timed out after {elapsed:?}")]
    RaterTimeout {
        artifact_id: String,
        rater_id: String,
        elapsed: Duration,
    },

    /// Fewer than `required` valid assessments were available at aggregation.
    #[error("artifact {artifact_id}: only {available} of {required} required rater assessments available")]
    InsufficientRaters {
        artifact_id: String,
        available: usize,
        required: usize,
    },

    /// The planner was given a target state outside the axis domain.
    #[error("target state {index} is outside the {axis} domain (0..=3)")]
    UnreachableTarget { axis: Axis, index: u8 },

    /// The session was cancelled before the rater barrier completed.
    #[error("artifact {artifact_id}: session cancelled before aggregation")]
    Cancelled { artifact_id: String },

    /// A rating vector was constructed without an entry for every axis.
    #[error("rating vector is missing an entry for the {missing} axis")]
    PartialVector { missing: Axis },

    /// A state index outside 0..=3.
    #[error("state index {index} is outside the axis domain (0..=3)")]
    StateOutOfRange { index: u8 },

    /// An axis priority that is not a permutation of the three axes.
    #[error("axis priority must name each axis exactly once, got {got:?}")]
    InvalidAxisPriority { got: [Axis; 3] },

    /// A rating vector notation string failed to parse.
    #[error(transparent)]
    Notation(#[from] NotationError),
}

impl EngineError {
    pub fn insufficient_input(
        artifact_id: impl Into<String>,
        axis: Axis,
        reason: impl Into<String>,
    ) -> Self {
        Self::InsufficientInput {
            artifact_id: artifact_id.into(),
            axis,
            reason: reason.into(),
        }
    }

    pub fn rater_timeout(
        artifact_id: impl Into<String>,
        rater_id: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self::RaterTimeout {
            artifact_id: artifact_id.into(),
            rater_id: rater_id.into(),
            elapsed,
        }
    }

    pub fn insufficient_raters(
        artifact_id: impl Into<String>,
        available: usize,
        required: usize,
    ) -> Self {
        Self::InsufficientRaters {
            artifact_id: artifact_id.into(),
            available,
            required,
        }
    }

    pub fn unreachable_target(axis: Axis, index: u8) -> Self {
        Self::UnreachableTarget { axis, index }
    }

    pub fn cancelled(artifact_id: impl Into<String>) -> Self {
        Self::Cancelled {
            artifact_id: artifact_id.into(),
        }
    }

    /// Short error code for logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientInput { .. } => "insufficient_input",
            Self::RaterTimeout { .. } => "rater_timeout",
            Self::InsufficientRaters { .. } => "insufficient_raters",
            Self::UnreachableTarget { .. } => "unreachable_target",
            Self::Cancelled { .. } => "cancelled",
            Self::PartialVector { .. } => "partial_vector",
            Self::StateOutOfRange { .. } => "state_out_of_range",
            Self::InvalidAxisPriority { .. } => "invalid_axis_priority",
            Self::Notation(_) => "notation",
        }
    }

    /// The axis involved, where one applies.
    pub fn axis(&self) -> Option<Axis> {
        match self {
            Self::InsufficientInput { axis, .. }
            | Self::UnreachableTarget { axis, .. }
            | Self::PartialVector { missing: axis } => Some(*axis),
            _ => None,
        }
    }
}
