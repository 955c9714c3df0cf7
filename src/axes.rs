//! Static axis domain: three ordinal axes, four totally-ordered states each.
//!
//! The full rating space is a 4×4×4 lattice. Every axis binds each state to
//! a human label, a one-character display symbol, and a one-line summary,
//! and names exactly one ambiguous boundary between its two middle states.
//! Nothing mutates these tables at runtime.
//!
//! State `0` is always the least desirable end of an axis, `3` the most.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::EngineError;

// =============================================================================
// Axis
// =============================================================================

/// One of the three independent quality axes an artifact is rated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// How directly the artifact's intent reads from its text.
    Expressiveness,
    /// How traceably change propagates between the artifact's parts.
    DependencyFlow,
    /// How failures present themselves to the caller.
    ErrorSurface,
}

impl Axis {
    /// Fixed notation order: the position of each symbol in `<S1S2S3>`.
    pub const ALL: [Axis; 3] = [Axis::Expressiveness, Axis::DependencyFlow, Axis::ErrorSurface];

    /// Default improvement priority: failure behavior first, then flow
    /// discipline, then readability.
    pub const DEFAULT_PRIORITY: [Axis; 3] =
        [Axis::ErrorSurface, Axis::DependencyFlow, Axis::Expressiveness];

    pub fn name(self) -> &'static str {
        match self {
            Axis::Expressiveness => "expressiveness",
            Axis::DependencyFlow => "dependency-flow",
            Axis::ErrorSurface => "error-surface",
        }
    }

    pub fn from_name(s: &str) -> Option<Axis> {
        match s {
            "expressiveness" => Some(Axis::Expressiveness),
            "dependency-flow" | "dependency_flow" => Some(Axis::DependencyFlow),
            "error-surface" | "error_surface" => Some(Axis::ErrorSurface),
            _ => None,
        }
    }

    /// Position of this axis in the fixed notation order.
    pub fn index(self) -> usize {
        match self {
            Axis::Expressiveness => 0,
            Axis::DependencyFlow => 1,
            Axis::ErrorSurface => 2,
        }
    }

    /// The four state definitions of this axis, worst first.
    pub fn states(self) -> &'static [StateDef; 4] {
        match self {
            Axis::Expressiveness => &EXPRESSIVENESS_STATES,
            Axis::DependencyFlow => &DEPENDENCY_FLOW_STATES,
            Axis::ErrorSurface => &ERROR_SURFACE_STATES,
        }
    }

    pub fn state_def(self, state: State) -> &'static StateDef {
        &self.states()[state.index() as usize]
    }

    /// Display symbol for `state` on this axis.
    pub fn symbol(self, state: State) -> char {
        self.state_def(state).symbol
    }

    /// Inverse of [`Axis::symbol`]; `None` for characters outside this
    /// axis's 4-symbol alphabet.
    pub fn state_for_symbol(self, symbol: char) -> Option<State> {
        self.states()
            .iter()
            .position(|def| def.symbol == symbol)
            .map(|i| State(i as u8))
    }

    /// The axis's 4-symbol alphabet in state order.
    pub fn alphabet(self) -> String {
        self.states().iter().map(|def| def.symbol).collect()
    }

    /// The documented ambiguous boundary between this axis's middle states.
    pub fn boundary(self) -> &'static Boundary {
        match self {
            Axis::Expressiveness => &EXPRESSIVENESS_BOUNDARY,
            Axis::DependencyFlow => &DEPENDENCY_FLOW_BOUNDARY,
            Axis::ErrorSurface => &ERROR_SURFACE_BOUNDARY,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// State
// =============================================================================

/// One ordinal level within an axis: `0` (least desirable) through `3`.
///
/// Construction outside the domain fails; a `State` in hand is always valid
/// for every axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct State(u8);

impl State {
    pub const MIN: State = State(0);
    pub const MAX: State = State(3);

    /// Number of states per axis.
    pub const COUNT: usize = 4;

    pub fn new(index: u8) -> Result<State, EngineError> {
        if index <= Self::MAX.0 {
            Ok(State(index))
        } else {
            Err(EngineError::StateOutOfRange { index })
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// The adjacent state one step toward the desirable end.
    pub fn up(self) -> Option<State> {
        (self < Self::MAX).then(|| State(self.0 + 1))
    }

    /// The adjacent state one step toward the undesirable end.
    pub fn down(self) -> Option<State> {
        (self > Self::MIN).then(|| State(self.0 - 1))
    }

    pub fn all() -> [State; 4] {
        [State(0), State(1), State(2), State(3)]
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for State {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for State {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let index = u8::deserialize(deserializer)?;
        State::new(index).map_err(|_| {
            de::Error::invalid_value(
                de::Unexpected::Unsigned(index as u64),
                &"a state index in 0..=3",
            )
        })
    }
}

// =============================================================================
// State definitions
// =============================================================================

/// Label, display symbol, and summary for one state of one axis.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StateDef {
    pub label: &'static str,
    pub symbol: char,
    pub summary: &'static str,
}

const EXPRESSIVENESS_STATES: [StateDef; 4] = [
    StateDef {
        label: "Opaque",
        symbol: 'O',
        summary: "intent is unrecoverable from the text without outside knowledge",
    },
    StateDef {
        label: "Mechanical",
        symbol: 'M',
        summary: "intent can be reconstructed, but only by tracing the mechanics",
    },
    StateDef {
        label: "Readable",
        symbol: 'R',
        summary: "names and shape carry intent; tracing confirms rather than discovers",
    },
    StateDef {
        label: "Fluent",
        symbol: 'F',
        summary: "reads as a statement of the problem domain",
    },
];

const DEPENDENCY_FLOW_STATES: [StateDef; 4] = [
    StateDef {
        label: "Tangled",
        symbol: 'T',
        summary: "reference cycles tie the parts into a knot",
    },
    StateDef {
        label: "Diffuse",
        symbol: 'D',
        summary: "changes propagate along implicit, untraceable paths",
    },
    StateDef {
        label: "Linear",
        symbol: 'L',
        summary: "one explicit traversal path connects the parts",
    },
    StateDef {
        label: "Layered",
        symbol: 'Y',
        summary: "explicit fan-out with every path separately traceable",
    },
];

const ERROR_SURFACE_STATES: [StateDef; 4] = [
    StateDef {
        label: "Silent",
        symbol: 'S',
        summary: "failures are swallowed without a trace",
    },
    StateDef {
        label: "Abrupt",
        symbol: 'A',
        summary: "failures stop the world or surface as bare strings",
    },
    StateDef {
        label: "Guarded",
        symbol: 'G',
        summary: "failures are typed but shed context on the way out",
    },
    StateDef {
        label: "Explicit",
        symbol: 'E',
        summary: "every failure path is typed, named, and propagated",
    },
];

// =============================================================================
// Boundaries
// =============================================================================

/// The documented ambiguous boundary between an axis's two middle states.
///
/// Each boundary is a single forced yes/no question; the two answers map
/// 1:1 onto the two candidate states, and the chosen answer text is reused
/// verbatim as the rationale of the resulting rating.
#[derive(Debug, Clone, Copy)]
pub struct Boundary {
    pub axis: Axis,
    /// Candidate reached on a "no" answer (state 1).
    pub lower: State,
    /// Candidate reached on a "yes" answer (state 2).
    pub upper: State,
    pub question: &'static str,
    pub yes_answer: &'static str,
    pub no_answer: &'static str,
}

static EXPRESSIVENESS_BOUNDARY: Boundary = Boundary {
    axis: Axis::Expressiveness,
    lower: State(1),
    upper: State(2),
    question: "can a reader state the artifact's purpose from its names alone, \
               without tracing control flow?",
    yes_answer: "purpose is statable from names alone, without tracing control flow",
    no_answer: "purpose only emerges by tracing control flow through the mechanics",
};

static DEPENDENCY_FLOW_BOUNDARY: Boundary = Boundary {
    axis: Axis::DependencyFlow,
    lower: State(1),
    upper: State(2),
    question: "can every data path between two parts be followed as one explicit \
               chain of references?",
    yes_answer: "every data path between parts follows one explicit chain of references",
    no_answer: "at least one data path between parts cannot be followed explicitly",
};

static ERROR_SURFACE_BOUNDARY: Boundary = Boundary {
    axis: Axis::ErrorSurface,
    lower: State(1),
    upper: State(2),
    question: "does every failure path name the failing operation before control \
               leaves the artifact?",
    yes_answer: "every failure path names the failing operation before control leaves",
    no_answer: "failure paths leave the artifact without naming the failing operation",
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_axis_has_four_states_with_unique_symbols() {
        for axis in Axis::ALL {
            let symbols: HashSet<char> = axis.states().iter().map(|def| def.symbol).collect();
            assert_eq!(symbols.len(), State::COUNT, "{axis} has duplicate symbols");
        }
    }

    #[test]
    fn symbol_lookup_round_trips() {
        for axis in Axis::ALL {
            for state in State::all() {
                let symbol = axis.symbol(state);
                assert_eq!(axis.state_for_symbol(symbol), Some(state));
            }
            assert_eq!(axis.state_for_symbol('?'), None);
        }
    }

    #[test]
    fn boundaries_sit_between_the_middle_states() {
        for axis in Axis::ALL {
            let boundary = axis.boundary();
            assert_eq!(boundary.axis, axis);
            assert_eq!(boundary.lower, State(1));
            assert_eq!(boundary.upper, State(2));
            assert_ne!(boundary.yes_answer, boundary.no_answer);
        }
    }

    #[test]
    fn state_construction_enforces_the_domain() {
        assert!(State::new(3).is_ok());
        assert!(matches!(
            State::new(4),
            Err(EngineError::StateOutOfRange { index: 4 })
        ));
    }

    #[test]
    fn state_ordering_runs_worst_to_best() {
        assert!(State::MIN < State::MAX);
        assert_eq!(State::MIN.up(), Some(State(1)));
        assert_eq!(State::MAX.up(), None);
        assert_eq!(State::MIN.down(), None);
    }

    #[test]
    fn axis_names_round_trip() {
        for axis in Axis::ALL {
            assert_eq!(Axis::from_name(axis.name()), Some(axis));
        }
        assert_eq!(Axis::from_name("latency"), None);
    }
}
