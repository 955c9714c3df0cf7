//! Forced resolution at the documented mid-scale boundaries.
//!
//! Each axis names exactly one ambiguous boundary, between its two middle
//! states. The resolver asks that boundary's single yes/no question of the
//! scan and always returns one of the two candidates — there is no third
//! outcome and no defer. The chosen answer text is reused verbatim as the
//! rationale of the resulting rating.

use crate::axes::{Axis, Boundary, State};

use super::scan::ContentScan;

/// Outcome of a forced boundary decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryOutcome {
    pub state: State,
    /// The boundary answer, reused verbatim as the rating rationale.
    pub answer: &'static str,
}

/// Resolver for the named ambiguous boundaries.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoundaryResolver;

impl BoundaryResolver {
    pub fn new() -> Self {
        Self
    }

    /// Answer `boundary`'s question against the scan and return the matching
    /// candidate state.
    pub fn resolve(&self, scan: &ContentScan, boundary: &'static Boundary) -> BoundaryOutcome {
        let yes = match boundary.axis {
            // Names alone carry the purpose when descriptive identifiers
            // outnumber cryptic ones.
            Axis::Expressiveness => scan.descriptive_identifiers > scan.short_identifiers,
            // The explicit reference edges must form one traceable chain.
            Axis::DependencyFlow => scan.is_linear_chain(),
            // A failure path names its operation when the artifact attaches
            // context to errors somewhere.
            Axis::ErrorSurface => scan.contextual_failures > 0,
        };
        if yes {
            BoundaryOutcome {
                state: boundary.upper,
                answer: boundary.yes_answer,
            }
        } else {
            BoundaryOutcome {
                state: boundary.lower,
                answer: boundary.no_answer,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_is_always_one_of_the_two_candidates() {
        let resolver = BoundaryResolver::new();
        for axis in Axis::ALL {
            let boundary = axis.boundary();
            for content in ["fn a() { b }\nfn b() { 1 }", "x y z"] {
                let scan = ContentScan::analyze(content);
                let outcome = resolver.resolve(&scan, boundary);
                assert!(
                    outcome.state == boundary.lower || outcome.state == boundary.upper,
                    "{axis} resolver escaped its candidate pair"
                );
                assert!(
                    outcome.answer == boundary.yes_answer || outcome.answer == boundary.no_answer
                );
            }
        }
    }

    #[test]
    fn error_surface_boundary_keys_on_contextual_failures() {
        let resolver = BoundaryResolver::new();
        let boundary = Axis::ErrorSurface.boundary();

        let with_context =
            ContentScan::analyze("fn load() -> Result<(), E> {\n    read().context(\"read\")?;\n    Ok(())\n}");
        assert_eq!(
            resolver.resolve(&with_context, boundary).state,
            boundary.upper
        );

        let without_context =
            ContentScan::analyze("fn load() -> Result<(), E> {\n    read()?;\n    Ok(())\n}");
        assert_eq!(
            resolver.resolve(&without_context, boundary).state,
            boundary.lower
        );
    }
}
