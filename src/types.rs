//! Immutable value types tying artifacts, ratings, and assessments together.
//!
//! Everything here is created once and read thereafter. A [`RatingVector`]
//! is fully populated by construction — there is no way to hold one with a
//! missing axis — and [`Artifact`] / [`RaterAssessment`] expose accessors
//! only, never mutators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::axes::{Axis, State};
use crate::error::EngineError;

// =============================================================================
// Context and confidence
// =============================================================================

/// Deployment context of the artifact under assessment.
///
/// Classifier thresholds shift with it: scripts are allowed to fail
/// abruptly where libraries are not, and frameworks are held to stricter
/// flow discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextTag {
    Library,
    Application,
    Script,
    Framework,
}

impl ContextTag {
    pub fn name(self) -> &'static str {
        match self {
            ContextTag::Library => "library",
            ContextTag::Application => "application",
            ContextTag::Script => "script",
            ContextTag::Framework => "framework",
        }
    }

    pub fn from_name(s: &str) -> Option<ContextTag> {
        match s {
            "library" => Some(ContextTag::Library),
            "application" => Some(ContextTag::Application),
            "script" => Some(ContextTag::Script),
            "framework" => Some(ContextTag::Framework),
            _ => None,
        }
    }
}

/// Rater confidence in a single axis rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

// =============================================================================
// Artifact
// =============================================================================

/// The thing being rated — never the rating itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    id: String,
    content_snapshot: String,
    context_tag: ContextTag,
}

impl Artifact {
    pub fn new(
        id: impl Into<String>,
        content_snapshot: impl Into<String>,
        context_tag: ContextTag,
    ) -> Self {
        Self {
            id: id.into(),
            content_snapshot: content_snapshot.into(),
            context_tag,
        }
    }

    /// Create an artifact with a freshly minted UUID v4 id.
    pub fn with_generated_id(content_snapshot: impl Into<String>, context_tag: ContextTag) -> Self {
        Self::new(Uuid::new_v4().to_string(), content_snapshot, context_tag)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content_snapshot(&self) -> &str {
        &self.content_snapshot
    }

    pub fn context_tag(&self) -> ContextTag {
        self.context_tag
    }

    /// Blake3 hex digest of the content snapshot, for trace and audit records.
    pub fn snapshot_digest(&self) -> String {
        blake3::hash(self.content_snapshot.as_bytes())
            .to_hex()
            .to_string()
    }
}

// =============================================================================
// Rating vector
// =============================================================================

/// One axis entry of a rating vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisRating {
    pub state: State,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl AxisRating {
    pub fn new(state: State) -> Self {
        Self {
            state,
            confidence: None,
            rationale: None,
        }
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }
}

/// Exactly one [`AxisRating`] per axis, stored in the fixed axis order.
///
/// Full population is a construction invariant: building from a sparse
/// per-axis list fails rather than producing a partial vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingVector {
    entries: [AxisRating; 3],
}

impl RatingVector {
    pub fn new(
        expressiveness: AxisRating,
        dependency_flow: AxisRating,
        error_surface: AxisRating,
    ) -> Self {
        Self {
            entries: [expressiveness, dependency_flow, error_surface],
        }
    }

    /// Vector of bare states, no confidence or rationale, in axis order.
    pub fn from_states(states: [State; 3]) -> Self {
        let [e, d, s] = states;
        Self::new(AxisRating::new(e), AxisRating::new(d), AxisRating::new(s))
    }

    /// Build from per-axis entries; fails with `PartialVector` if any axis
    /// is missing. Later entries for the same axis overwrite earlier ones.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (Axis, AxisRating)>,
    ) -> Result<Self, EngineError> {
        let mut slots: [Option<AxisRating>; 3] = [None, None, None];
        for (axis, rating) in entries {
            slots[axis.index()] = Some(rating);
        }
        let [e, d, s] = slots;
        Ok(Self {
            entries: [
                e.ok_or(EngineError::PartialVector {
                    missing: Axis::Expressiveness,
                })?,
                d.ok_or(EngineError::PartialVector {
                    missing: Axis::DependencyFlow,
                })?,
                s.ok_or(EngineError::PartialVector {
                    missing: Axis::ErrorSurface,
                })?,
            ],
        })
    }

    pub fn get(&self, axis: Axis) -> &AxisRating {
        &self.entries[axis.index()]
    }

    pub fn state(&self, axis: Axis) -> State {
        self.entries[axis.index()].state
    }

    /// The three states in axis order.
    pub fn states(&self) -> [State; 3] {
        [
            self.entries[0].state,
            self.entries[1].state,
            self.entries[2].state,
        ]
    }

    /// Iterate entries paired with their axis, in axis order.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, &AxisRating)> {
        Axis::ALL.into_iter().zip(self.entries.iter())
    }
}

// =============================================================================
// Rater assessment
// =============================================================================

/// One rater's verdict on one artifact; produced once, immutable after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaterAssessment {
    rater_id: String,
    artifact_id: String,
    vector: RatingVector,
    timestamp: DateTime<Utc>,
}

impl RaterAssessment {
    pub fn new(
        rater_id: impl Into<String>,
        artifact_id: impl Into<String>,
        vector: RatingVector,
    ) -> Self {
        Self::with_timestamp(rater_id, artifact_id, vector, Utc::now())
    }

    pub fn with_timestamp(
        rater_id: impl Into<String>,
        artifact_id: impl Into<String>,
        vector: RatingVector,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            rater_id: rater_id.into(),
            artifact_id: artifact_id.into(),
            vector,
            timestamp,
        }
    }

    pub fn rater_id(&self) -> &str {
        &self.rater_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn vector(&self) -> &RatingVector {
        &self.vector
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(state: u8) -> AxisRating {
        AxisRating::new(State::new(state).unwrap())
    }

    #[test]
    fn from_entries_rejects_sparse_vectors() {
        let result = RatingVector::from_entries([
            (Axis::Expressiveness, rating(2)),
            (Axis::ErrorSurface, rating(3)),
        ]);
        assert!(matches!(
            result,
            Err(EngineError::PartialVector {
                missing: Axis::DependencyFlow
            })
        ));
    }

    #[test]
    fn from_entries_accepts_full_vectors_in_any_order() {
        let vector = RatingVector::from_entries([
            (Axis::ErrorSurface, rating(3)),
            (Axis::Expressiveness, rating(1)),
            (Axis::DependencyFlow, rating(2)),
        ])
        .unwrap();
        assert_eq!(vector.state(Axis::Expressiveness).index(), 1);
        assert_eq!(vector.state(Axis::DependencyFlow).index(), 2);
        assert_eq!(vector.state(Axis::ErrorSurface).index(), 3);
    }

    #[test]
    fn snapshot_digest_is_stable_per_content() {
        let a = Artifact::new("a", "fn main() {}", ContextTag::Application);
        let b = Artifact::new("b", "fn main() {}", ContextTag::Library);
        let c = Artifact::new("c", "fn other() {}", ContextTag::Library);
        assert_eq!(a.snapshot_digest(), b.snapshot_digest());
        assert_ne!(a.snapshot_digest(), c.snapshot_digest());
    }

    #[test]
    fn generated_artifact_ids_are_unique() {
        let a = Artifact::with_generated_id("x", ContextTag::Script);
        let b = Artifact::with_generated_id("x", ContextTag::Script);
        assert_ne!(a.id(), b.id());
    }
}
