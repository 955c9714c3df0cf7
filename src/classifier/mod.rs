//! Per-axis decision trees over the structural scan.
//!
//! Each axis has a fixed, ordered sequence of yes/no boundary tests, worst
//! conditions first. The middle test of every tree is three-valued: a clear
//! yes, a clear no, or the documented ambiguous band, which delegates to
//! [`BoundaryResolver`] instead of guessing. Classification is a pure
//! function of `(artifact, axis, context)`.

pub mod boundary;
pub mod scan;

use serde::Serialize;

use crate::axes::{Axis, State};
use crate::error::EngineError;
use crate::types::{Artifact, AxisRating, Confidence, ContextTag, RatingVector};

pub use boundary::{BoundaryOutcome, BoundaryResolver};
pub use scan::ContentScan;

// =============================================================================
// Thresholds
// =============================================================================

/// Below this many identifiers the expressiveness tests have nothing to
/// measure.
const MIN_IDENTIFIERS: usize = 5;

/// Opaque: more than half of identifiers are one or two characters.
const OPAQUE_SHORT_FRACTION: f64 = 0.5;
/// Opaque also requires near-total comment absence.
const OPAQUE_COMMENT_RATIO: f64 = 0.05;

/// Below this descriptive fraction, naming clearly tracks mechanism.
const MECHANICAL_DESCRIPTIVE_FRACTION: f64 = 0.25;
/// At or above this, naming clearly carries intent; in between is the
/// documented ambiguous band.
const READABLE_DESCRIPTIVE_FRACTION: f64 = 0.40;

/// Fluent requires most identifiers descriptive and shallow structure.
const FLUENT_DESCRIPTIVE_FRACTION: f64 = 0.60;
const FLUENT_MAX_NESTING: usize = 3;

/// Two or more shared globals is unambiguously diffuse coupling; exactly
/// one is the ambiguous band (for frameworks, one already counts).
const DIFFUSE_SHARED_GLOBALS: usize = 2;

/// Rationale recorded whenever an axis has no signal to measure.
const INSUFFICIENT_CONTEXT: &str = "insufficient context";

// =============================================================================
// Classification
// =============================================================================

/// Result of classifying one artifact on one axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub state: State,
    pub confidence: Confidence,
    pub rationale: String,
}

impl Classification {
    fn decided(state: State, confidence: Confidence, rationale: &str) -> Self {
        Self {
            state,
            confidence,
            rationale: rationale.to_string(),
        }
    }

    /// The no-signal outcome: a structurally implied state, never silent.
    fn insufficient(state: State) -> Self {
        Self::decided(state, Confidence::Low, INSUFFICIENT_CONTEXT)
    }

    pub fn into_axis_rating(self) -> AxisRating {
        AxisRating::new(self.state)
            .with_confidence(self.confidence)
            .with_rationale(self.rationale)
    }
}

/// Stateless classifier: a fixed decision tree per axis.
#[derive(Debug, Default, Clone, Copy)]
pub struct AxisClassifier {
    resolver: BoundaryResolver,
}

impl AxisClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `artifact` on `axis` under `context`.
    ///
    /// Fails with `InsufficientInput` when the snapshot has no classifiable
    /// structure at all; an axis that merely lacks its own signal gets the
    /// structurally implied state with `Low` confidence and an
    /// `"insufficient context"` rationale instead.
    pub fn classify(
        &self,
        artifact: &Artifact,
        axis: Axis,
        context: ContextTag,
    ) -> Result<Classification, EngineError> {
        let scan = ContentScan::analyze(artifact.content_snapshot());
        if scan.is_empty() {
            return Err(EngineError::insufficient_input(
                artifact.id(),
                axis,
                "no classifiable structure in snapshot",
            ));
        }
        Ok(match axis {
            Axis::Expressiveness => self.classify_expressiveness(&scan),
            Axis::DependencyFlow => self.classify_dependency_flow(&scan, context),
            Axis::ErrorSurface => self.classify_error_surface(&scan, context),
        })
    }

    /// Classify all three axes under the artifact's own context tag.
    pub fn classify_all(&self, artifact: &Artifact) -> Result<RatingVector, EngineError> {
        let context = artifact.context_tag();
        let entries = Axis::ALL
            .into_iter()
            .map(|axis| {
                self.classify(artifact, axis, context)
                    .map(|c| (axis, c.into_axis_rating()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        RatingVector::from_entries(entries)
    }

    fn classify_expressiveness(&self, scan: &ContentScan) -> Classification {
        let boundary = Axis::Expressiveness.boundary();
        if scan.identifiers < MIN_IDENTIFIERS {
            return Classification::insufficient(boundary.upper);
        }

        // Worst first: opaque identifiers with no commentary to lean on.
        if scan.short_ident_fraction() > OPAQUE_SHORT_FRACTION
            && scan.comment_ratio() < OPAQUE_COMMENT_RATIO
        {
            return Classification::decided(
                State::MIN,
                Confidence::High,
                "opaque identifiers dominate and comments are absent",
            );
        }

        let descriptive = scan.descriptive_fraction();
        if descriptive < MECHANICAL_DESCRIPTIVE_FRACTION {
            return Classification::decided(
                boundary.lower,
                Confidence::Medium,
                "naming tracks mechanism, not intent",
            );
        }
        if descriptive < READABLE_DESCRIPTIVE_FRACTION {
            // Documented ambiguous band between Mechanical and Readable.
            let outcome = self.resolver.resolve(scan, boundary);
            return Classification::decided(outcome.state, Confidence::Low, outcome.answer);
        }

        if descriptive >= FLUENT_DESCRIPTIVE_FRACTION && scan.max_nesting <= FLUENT_MAX_NESTING {
            return Classification::decided(
                State::MAX,
                Confidence::High,
                "naming and shape state the problem domain directly",
            );
        }
        Classification::decided(
            boundary.upper,
            Confidence::Medium,
            "names carry intent; structure still asks to be traced",
        )
    }

    fn classify_dependency_flow(&self, scan: &ContentScan, context: ContextTag) -> Classification {
        let boundary = Axis::DependencyFlow.boundary();
        if scan.units.len() < 2 {
            // A single unit is trivially one traversal path.
            return Classification::insufficient(boundary.upper);
        }

        if scan.has_reference_cycle() {
            return Classification::decided(
                State::MIN,
                Confidence::High,
                "reference cycle detected among declared units",
            );
        }

        // Frameworks are held to stricter flow discipline: one shared
        // global already counts as diffuse coupling.
        let diffuse_at = if context == ContextTag::Framework {
            1
        } else {
            DIFFUSE_SHARED_GLOBALS
        };
        if scan.shared_globals >= diffuse_at {
            return Classification::decided(
                boundary.lower,
                Confidence::Medium,
                "changes propagate through shared globals without an explicit path",
            );
        }
        if scan.shared_globals > 0 {
            // Exactly one shared global: the documented ambiguous band
            // between Diffuse and Linear.
            let outcome = self.resolver.resolve(scan, boundary);
            return Classification::decided(outcome.state, Confidence::Low, outcome.answer);
        }

        if scan.is_linear_chain() {
            return Classification::decided(
                boundary.upper,
                Confidence::Medium,
                "declared units form a single explicit traversal chain",
            );
        }
        Classification::decided(
            State::MAX,
            Confidence::High,
            "references fan out explicitly; every path is separately traceable",
        )
    }

    fn classify_error_surface(&self, scan: &ContentScan, context: ContextTag) -> Classification {
        let boundary = Axis::ErrorSurface.boundary();
        if scan.failure_signal() == 0 {
            return Classification::insufficient(boundary.upper);
        }

        if scan.silent_failures > 0 && scan.silent_failures >= scan.typed_failures {
            return Classification::decided(
                State::MIN,
                Confidence::High,
                "failures are swallowed without reaching the caller",
            );
        }

        if scan.typed_failures == 0 {
            return Classification::decided(
                boundary.lower,
                Confidence::Medium,
                "failures abort or surface as bare strings",
            );
        }

        // Typed and abrupt failures coexist: ambiguous when aborts rival the
        // typed paths, or whenever the context demands library discipline.
        let strict = matches!(context, ContextTag::Library | ContextTag::Framework);
        if scan.abrupt_failures > 0 && (strict || scan.abrupt_failures >= scan.typed_failures) {
            let outcome = self.resolver.resolve(scan, boundary);
            return Classification::decided(outcome.state, Confidence::Low, outcome.answer);
        }

        let required_context = match context {
            ContextTag::Library | ContextTag::Framework => 2,
            ContextTag::Application | ContextTag::Script => 1,
        };
        if scan.contextual_failures >= required_context {
            return Classification::decided(
                State::MAX,
                Confidence::High,
                "every failure path is typed and carries the failing operation",
            );
        }
        Classification::decided(
            boundary.upper,
            Confidence::Medium,
            "failures are typed but drop context on the way out",
        )
    }
}
