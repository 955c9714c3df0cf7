//! Consensus aggregation across independent rater assessments.
//!
//! Per axis the consensus state is the mode of the submitted states and the
//! agreement is the mode's share of the vote. Ties are never errors: they
//! resolve deterministically under an explicit [`TieBreakPolicy`] and are
//! flagged, not thrown. The whole computation is permutation-invariant —
//! the order assessments arrive in cannot affect the result.

use serde::Serialize;

use crate::axes::{Axis, State};
use crate::error::EngineError;
use crate::notation;
use crate::types::{AxisRating, Confidence, RaterAssessment, RatingVector};

// =============================================================================
// Categories and policies
// =============================================================================

/// Agreement categories, worst first so `Ord` picks the weakest link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementCategory {
    Unstable,
    Disputed,
    MostlyStable,
    Stable,
}

impl AgreementCategory {
    /// Fixed thresholds, inclusive lower bounds.
    pub fn from_agreement(agreement: f64) -> Self {
        if agreement >= 0.90 {
            AgreementCategory::Stable
        } else if agreement >= 0.70 {
            AgreementCategory::MostlyStable
        } else if agreement >= 0.50 {
            AgreementCategory::Disputed
        } else {
            AgreementCategory::Unstable
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AgreementCategory::Unstable => "unstable",
            AgreementCategory::Disputed => "disputed",
            AgreementCategory::MostlyStable => "mostly-stable",
            AgreementCategory::Stable => "stable",
        }
    }
}

/// How tied modes are resolved.
///
/// The default rounds toward the less desirable state: a conservative,
/// auditable rule. Callers wanting anything else must say so explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreakPolicy {
    #[default]
    TowardLeastDesirable,
    TowardMostDesirable,
}

// =============================================================================
// Result types
// =============================================================================

/// Per-axis agreement detail.
#[derive(Debug, Clone, Serialize)]
pub struct AxisConsensus {
    pub axis: Axis,
    pub state: State,
    pub agreement: f64,
    pub category: AgreementCategory,
    /// Set when two or more states tied for the mode on this axis.
    pub tie_broken: bool,
}

/// A minority position on one axis.
#[derive(Debug, Clone, Serialize)]
pub struct MinorityPosition {
    pub state: State,
    pub raters: usize,
    /// Rationales submitted for this state, ordered by rater id.
    pub rationales: Vec<String>,
}

/// Divergence detail for an axis where agreement fell short of 1.0.
#[derive(Debug, Clone, Serialize)]
pub struct Divergence {
    pub axis: Axis,
    pub minority: Vec<MinorityPosition>,
}

/// Aggregated verdict over one artifact's assessments.
///
/// Derived purely from a fixed assessment list; recomputed, never patched.
#[derive(Debug, Clone, Serialize)]
pub struct ConsensusResult {
    pub artifact_id: String,
    /// Notation form of the consensus vector, e.g. `<RLG>`.
    pub notation: String,
    pub consensus: RatingVector,
    /// Per-axis detail, in the fixed axis order.
    pub per_axis: Vec<AxisConsensus>,
    /// Worst of the three per-axis categories.
    pub category: AgreementCategory,
    /// One entry per axis with agreement below 1.0, in axis order.
    pub divergences: Vec<Divergence>,
    pub raters: usize,
}

impl ConsensusResult {
    pub fn agreement(&self, axis: Axis) -> f64 {
        self.per_axis[axis.index()].agreement
    }

    pub fn axis(&self, axis: Axis) -> &AxisConsensus {
        &self.per_axis[axis.index()]
    }
}

// =============================================================================
// Aggregator
// =============================================================================

/// Mode-based aggregator with an explicit tie-break policy.
#[derive(Debug, Clone)]
pub struct ConsensusAggregator {
    min_raters: usize,
    tie_break: TieBreakPolicy,
}

impl Default for ConsensusAggregator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_RATERS)
    }
}

impl ConsensusAggregator {
    pub const DEFAULT_MIN_RATERS: usize = 3;

    pub fn new(min_raters: usize) -> Self {
        Self {
            min_raters,
            tie_break: TieBreakPolicy::default(),
        }
    }

    pub fn with_tie_break(mut self, policy: TieBreakPolicy) -> Self {
        self.tie_break = policy;
        self
    }

    pub fn min_raters(&self) -> usize {
        self.min_raters
    }

    /// Aggregate all assessments for `artifact_id` into a consensus.
    ///
    /// Assessments for other artifacts are discarded first; duplicates by
    /// the same rater are deduplicated order-independently (earliest
    /// timestamp wins, notation string as final tie-break). Fails with
    /// `InsufficientRaters` when fewer than `min_raters` remain.
    pub fn aggregate(
        &self,
        artifact_id: &str,
        assessments: &[RaterAssessment],
    ) -> Result<ConsensusResult, EngineError> {
        let mut relevant: Vec<&RaterAssessment> = Vec::with_capacity(assessments.len());
        for assessment in assessments {
            if assessment.artifact_id() != artifact_id {
                continue;
            }
            match relevant
                .iter()
                .position(|kept| kept.rater_id() == assessment.rater_id())
            {
                Some(i) if prefers(assessment, relevant[i]) => relevant[i] = assessment,
                Some(_) => {}
                None => relevant.push(assessment),
            }
        }
        // Deterministic iteration order regardless of input order.
        relevant.sort_by(|a, b| a.rater_id().cmp(b.rater_id()));

        let total = relevant.len();
        if total < self.min_raters.max(1) {
            return Err(EngineError::insufficient_raters(
                artifact_id,
                total,
                self.min_raters.max(1),
            ));
        }

        let mut per_axis = Vec::with_capacity(3);
        let mut divergences = Vec::new();
        let mut consensus_entries = Vec::with_capacity(3);

        for axis in Axis::ALL {
            let mut counts = [0usize; State::COUNT];
            for assessment in &relevant {
                counts[assessment.vector().state(axis).index() as usize] += 1;
            }

            let mode_count = *counts.iter().max().unwrap_or(&0);
            let tied: Vec<State> = State::all()
                .into_iter()
                .filter(|s| counts[s.index() as usize] == mode_count)
                .collect();
            let tie_broken = tied.len() > 1;
            let state = match self.tie_break {
                TieBreakPolicy::TowardLeastDesirable => tied[0],
                TieBreakPolicy::TowardMostDesirable => tied[tied.len() - 1],
            };

            let agreement = mode_count as f64 / total as f64;
            per_axis.push(AxisConsensus {
                axis,
                state,
                agreement,
                category: AgreementCategory::from_agreement(agreement),
                tie_broken,
            });

            if mode_count < total {
                let minority = State::all()
                    .into_iter()
                    .filter(|s| *s != state && counts[s.index() as usize] > 0)
                    .map(|minority_state| MinorityPosition {
                        state: minority_state,
                        raters: counts[minority_state.index() as usize],
                        rationales: relevant
                            .iter()
                            .filter(|a| a.vector().state(axis) == minority_state)
                            .filter_map(|a| a.vector().get(axis).rationale.clone())
                            .collect(),
                    })
                    .collect();
                divergences.push(Divergence { axis, minority });
            }

            consensus_entries.push((
                axis,
                AxisRating::new(state)
                    .with_confidence(derived_confidence(agreement))
                    .with_rationale(format!("{mode_count}/{total} raters")),
            ));
        }

        let consensus = RatingVector::from_entries(consensus_entries)?;
        let category = per_axis
            .iter()
            .map(|a| a.category)
            .min()
            .unwrap_or(AgreementCategory::Unstable);

        Ok(ConsensusResult {
            artifact_id: artifact_id.to_string(),
            notation: notation::format(&consensus),
            consensus,
            per_axis,
            category,
            divergences,
            raters: total,
        })
    }
}

/// Order-independent preference between two assessments by the same rater.
fn prefers(candidate: &RaterAssessment, kept: &RaterAssessment) -> bool {
    match candidate.timestamp().cmp(&kept.timestamp()) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => {
            notation::format(candidate.vector()) < notation::format(kept.vector())
        }
    }
}

fn derived_confidence(agreement: f64) -> Confidence {
    if agreement >= 0.90 {
        Confidence::High
    } else if agreement >= 0.70 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_thresholds_are_inclusive_lower_bounds() {
        assert_eq!(
            AgreementCategory::from_agreement(1.0),
            AgreementCategory::Stable
        );
        assert_eq!(
            AgreementCategory::from_agreement(0.90),
            AgreementCategory::Stable
        );
        assert_eq!(
            AgreementCategory::from_agreement(0.89),
            AgreementCategory::MostlyStable
        );
        assert_eq!(
            AgreementCategory::from_agreement(0.70),
            AgreementCategory::MostlyStable
        );
        assert_eq!(
            AgreementCategory::from_agreement(0.50),
            AgreementCategory::Disputed
        );
        assert_eq!(
            AgreementCategory::from_agreement(0.49),
            AgreementCategory::Unstable
        );
    }

    #[test]
    fn overall_category_is_the_worst_per_axis_category() {
        assert!(AgreementCategory::Unstable < AgreementCategory::Disputed);
        assert!(AgreementCategory::Disputed < AgreementCategory::MostlyStable);
        assert!(AgreementCategory::MostlyStable < AgreementCategory::Stable);
    }
}
