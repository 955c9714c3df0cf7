//! The rater boundary: anything that can assess an artifact.
//!
//! Raters are external collaborators from the engine's point of view —
//! only the shape of the assessment they return is contractual. Two
//! implementations ship here: [`LocalRater`], backed by the in-process
//! deterministic classifier, and [`HttpRater`], an adapter for
//! out-of-process rater services.

pub mod error;
pub mod http;

use crate::classifier::AxisClassifier;
use crate::types::{Artifact, RaterAssessment};

pub use error::{ErrorContext, RaterError};
pub use http::{HttpRater, HttpRaterConfig};

/// An independent assessor producing one assessment per artifact.
#[async_trait::async_trait]
pub trait Rater: Send + Sync {
    /// Stable identifier recorded on the assessments this rater produces.
    fn id(&self) -> &str;

    /// Assess one artifact.
    async fn assess(&self, artifact: &Artifact) -> Result<RaterAssessment, RaterError>;
}

/// In-process rater backed by the deterministic [`AxisClassifier`].
///
/// Useful as a baseline vote alongside external raters, and in tests.
#[derive(Debug, Clone)]
pub struct LocalRater {
    id: String,
    classifier: AxisClassifier,
}

impl LocalRater {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            classifier: AxisClassifier::new(),
        }
    }
}

#[async_trait::async_trait]
impl Rater for LocalRater {
    fn id(&self) -> &str {
        &self.id
    }

    async fn assess(&self, artifact: &Artifact) -> Result<RaterAssessment, RaterError> {
        let vector = self.classifier.classify_all(artifact)?;
        Ok(RaterAssessment::new(self.id.clone(), artifact.id(), vector))
    }
}
