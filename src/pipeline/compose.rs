//! Report composer: writes each fixed section from the grounding context.

use crate::error::Result;
use crate::pipeline::{Pipeline, prompt};
use crate::report::{ReportSection, SectionSpec};

impl Pipeline {
    /// Compose one report section grounded in the concatenated digests.
    ///
    /// Only the first `compose_context_cap` characters of the grounding are
    /// embedded; anything beyond the cap is dropped, not summarized.
    pub(crate) async fn compose_section(
        &self,
        subject: &str,
        spec: &SectionSpec,
        grounding: &str,
    ) -> Result<ReportSection> {
        let context: String = grounding
            .chars()
            .take(self.config.compose_context_cap)
            .collect();
        let body = self
            .complete_one(prompt::section(subject, spec, &context))
            .await?;

        Ok(ReportSection {
            title: spec.title.to_string(),
            body: body.trim().to_string(),
        })
    }
}
