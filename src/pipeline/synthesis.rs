//! Analytical synthesizer: turns a vector digest into a visual-structure
//! artifact.

use crate::error::Result;
use crate::pipeline::{Pipeline, prompt};

/// A vector-scoped visual payload (diagram or markup fragment).
///
/// The pipeline treats the content as opaque; rendering and any degradation
/// on malformed payloads belong to the presentation consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticalArtifact {
    pub title: String,
    pub content: String,
}

impl Pipeline {
    /// Derive one artifact from a vector's digest. No retry on malformed
    /// output: whatever the model returned is forwarded as-is.
    pub(crate) async fn synthesize_artifact(
        &self,
        query: &str,
        digest: &str,
    ) -> Result<AnalyticalArtifact> {
        let content = self
            .complete_one(prompt::artifact(self.config.artifact_format, query, digest))
            .await?;

        Ok(AnalyticalArtifact {
            title: query.to_string(),
            content: content.trim().to_string(),
        })
    }
}
