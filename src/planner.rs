//! Stepwise transformation planning between two rating vectors.
//!
//! A plan is a monotone, axis-grouped walk through the 4×4×4 rating
//! lattice: all steps for the first-priority axis come before any for the
//! second, and within an axis every step moves exactly one state toward the
//! target, never skipping an intermediate. Planning is a pure computation —
//! it touches no artifact and has no side effects.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::axes::{Axis, State};
use crate::error::EngineError;
use crate::types::RatingVector;

// =============================================================================
// Steps and plans
// =============================================================================

/// A single adjacent-state move on one axis.
///
/// Invariant: `|to - from| == 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationStep {
    pub axis: Axis,
    pub from: State,
    pub to: State,
    pub rationale: &'static str,
}

impl TransformationStep {
    pub fn from_symbol(&self) -> char {
        self.axis.symbol(self.from)
    }

    pub fn to_symbol(&self) -> char {
        self.axis.symbol(self.to)
    }
}

// Serialized as `{axis, from_symbol, to_symbol, rationale}` — the wire
// form speaks symbols, not raw indices.
impl Serialize for TransformationStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("TransformationStep", 4)?;
        record.serialize_field("axis", &self.axis)?;
        record.serialize_field("from_symbol", &self.from_symbol())?;
        record.serialize_field("to_symbol", &self.to_symbol())?;
        record.serialize_field("rationale", &self.rationale)?;
        record.end()
    }
}

/// Ordered walk from a current vector to a target vector.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformationPlan {
    pub steps: Vec<TransformationStep>,
}

impl TransformationPlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransformationStep> {
        self.steps.iter()
    }
}

// =============================================================================
// Planner
// =============================================================================

/// Stateless planner over the rating lattice.
#[derive(Debug, Default, Clone, Copy)]
pub struct TransformationPlanner;

impl TransformationPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Plan under the default priority
    /// `[ErrorSurface, DependencyFlow, Expressiveness]`.
    pub fn plan(
        &self,
        current: &RatingVector,
        target: &RatingVector,
    ) -> Result<TransformationPlan, EngineError> {
        self.plan_with_priority(current, target, Axis::DEFAULT_PRIORITY)
    }

    /// Plan under an explicit axis priority.
    ///
    /// The priority must name each axis exactly once; the planner never
    /// infers it from context. `current == target` yields an empty plan.
    pub fn plan_with_priority(
        &self,
        current: &RatingVector,
        target: &RatingVector,
        priority: [Axis; 3],
    ) -> Result<TransformationPlan, EngineError> {
        validate_priority(priority)?;
        for axis in Axis::ALL {
            // States are domain-validated at construction; this re-checks
            // the planner's own contract on its target input.
            let index = target.state(axis).index();
            if usize::from(index) >= State::COUNT {
                return Err(EngineError::unreachable_target(axis, index));
            }
        }

        let mut steps = Vec::new();
        for axis in priority {
            let mut at = current.state(axis);
            let goal = target.state(axis);
            while at != goal {
                let next = if at < goal { at.up() } else { at.down() };
                let Some(next) = next else { break };
                steps.push(TransformationStep {
                    axis,
                    from: at,
                    to: next,
                    rationale: transition_rationale(axis, at, next),
                });
                at = next;
            }
        }
        Ok(TransformationPlan { steps })
    }

    /// Plan toward a target given as raw state indices in the fixed axis
    /// order — the entry point for external callers holding untrusted
    /// input. An index outside the axis domain fails with
    /// `UnreachableTarget`.
    pub fn plan_to_indices(
        &self,
        current: &RatingVector,
        target_indices: [u8; 3],
        priority: Option<[Axis; 3]>,
    ) -> Result<TransformationPlan, EngineError> {
        let mut states = [State::MIN; 3];
        for (slot, axis) in Axis::ALL.into_iter().enumerate() {
            let index = target_indices[slot];
            states[slot] = State::new(index)
                .map_err(|_| EngineError::unreachable_target(axis, index))?;
        }
        let target = RatingVector::from_states(states);
        self.plan_with_priority(current, &target, priority.unwrap_or(Axis::DEFAULT_PRIORITY))
    }
}

fn validate_priority(priority: [Axis; 3]) -> Result<(), EngineError> {
    let mut seen = [false; 3];
    for axis in priority {
        if seen[axis.index()] {
            return Err(EngineError::InvalidAxisPriority { got: priority });
        }
        seen[axis.index()] = true;
    }
    Ok(())
}

// =============================================================================
// Transition rationales
// =============================================================================

/// Static rationale per (axis, from, to) transition. Upward moves are
/// improvements; downward moves are deliberate concessions.
fn transition_rationale(axis: Axis, from: State, to: State) -> &'static str {
    match (axis, from.index(), to.index()) {
        (Axis::Expressiveness, 0, 1) => "name the moving parts so the mechanics can be followed",
        (Axis::Expressiveness, 1, 2) => "lift names from mechanism to intent",
        (Axis::Expressiveness, 2, 3) => "restate the logic in the problem domain's vocabulary",
        (Axis::Expressiveness, 3, 2) => "trade domain phrasing for plainer mechanics where readers need them",
        (Axis::Expressiveness, 2, 1) => "concede intent-level naming where the mechanism must show",
        (Axis::Expressiveness, 1, 0) => "strip naming down to bare mechanism",

        (Axis::DependencyFlow, 0, 1) => "break the reference cycle even if coupling stays implicit",
        (Axis::DependencyFlow, 1, 2) => "route shared state through one explicit traversal path",
        (Axis::DependencyFlow, 2, 3) => "split the single chain into explicit, separately traceable flows",
        (Axis::DependencyFlow, 3, 2) => "collapse the explicit fan-out back into one chain",
        (Axis::DependencyFlow, 2, 1) => "allow implicit sharing where an explicit path costs too much",
        (Axis::DependencyFlow, 1, 0) => "accept cyclic references between the parts",

        (Axis::ErrorSurface, 0, 1) => "stop swallowing failures; let them surface even if bluntly",
        (Axis::ErrorSurface, 1, 2) => "replace aborts and bare strings with typed failure values",
        (Axis::ErrorSurface, 2, 3) => "carry the failing operation's name and context in every error",
        (Axis::ErrorSurface, 3, 2) => "drop error context the caller cannot act on",
        (Axis::ErrorSurface, 2, 1) => "concede typed failures where aborting is acceptable",
        (Axis::ErrorSurface, 1, 0) => "suppress failure reporting entirely",

        _ => "adjacent-state move within the axis domain",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(e: u8, d: u8, s: u8) -> RatingVector {
        RatingVector::from_states([
            State::new(e).unwrap(),
            State::new(d).unwrap(),
            State::new(s).unwrap(),
        ])
    }

    #[test]
    fn every_real_transition_has_a_dedicated_rationale() {
        for axis in Axis::ALL {
            for from in State::all() {
                for to in [from.up(), from.down()].into_iter().flatten() {
                    let rationale = transition_rationale(axis, from, to);
                    assert_ne!(
                        rationale, "adjacent-state move within the axis domain",
                        "missing rationale for {axis} {from}->{to}"
                    );
                }
            }
        }
    }

    #[test]
    fn priority_validation_rejects_repeats() {
        let planner = TransformationPlanner::new();
        let v = vector(0, 0, 0);
        let err = planner
            .plan_with_priority(
                &v,
                &vector(1, 1, 1),
                [Axis::ErrorSurface, Axis::ErrorSurface, Axis::Expressiveness],
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAxisPriority { .. }));
    }

    #[test]
    fn downward_plans_walk_adjacent_states_too() {
        let planner = TransformationPlanner::new();
        let plan = planner.plan(&vector(3, 3, 3), &vector(3, 3, 1)).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.steps[0].from.index(), 3);
        assert_eq!(plan.steps[0].to.index(), 2);
        assert_eq!(plan.steps[1].from.index(), 2);
        assert_eq!(plan.steps[1].to.index(), 1);
        assert!(plan.steps.iter().all(|s| s.axis == Axis::ErrorSurface));
    }

    #[test]
    fn out_of_domain_target_indices_are_unreachable() {
        let planner = TransformationPlanner::new();
        let err = planner
            .plan_to_indices(&vector(0, 0, 0), [0, 4, 0], None)
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::UnreachableTarget {
                axis: Axis::DependencyFlow,
                index: 4
            }
        ));
    }

    #[test]
    fn step_serialization_speaks_symbols() {
        let planner = TransformationPlanner::new();
        let plan = planner.plan(&vector(0, 0, 0), &vector(1, 0, 0)).unwrap();
        let json = serde_json::to_value(&plan.steps[0]).unwrap();
        assert_eq!(json["axis"], "expressiveness");
        assert_eq!(json["from_symbol"], "O");
        assert_eq!(json["to_symbol"], "M");
        assert!(json["rationale"].is_string());
    }
}
