//! Pipeline configuration.

use std::time::Duration;

/// Target format for analytical artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtifactFormat {
    /// Strict Mermaid diagram notation
    #[default]
    Mermaid,
    /// Self-contained styled HTML fragment
    Markup,
}

/// Configuration for a research pipeline.
#[derive(Clone)]
pub struct PipelineConfig {
    /// The model to use for every completion request
    pub model: String,
    /// Number of research vectors the planner asks for. Earlier pipeline
    /// revisions shipped with 7; 3 is the current default.
    pub vector_count: usize,
    /// Search results requested per vector
    pub results_per_vector: usize,
    /// Per-page fetch timeout
    pub fetch_timeout: Duration,
    /// Character budget for the plain text kept from one fetched page
    pub evidence_budget: usize,
    /// Qualifying content images kept per page
    pub images_per_page: usize,
    /// Grounding-context character cap embedded in each section prompt
    pub compose_context_cap: usize,
    /// Grounding-context character cap embedded in the chart prompt
    pub chart_context_cap: usize,
    /// Target format for analytical artifacts
    pub artifact_format: ArtifactFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: "gpt-oss:120b".to_string(),
            vector_count: 3,
            results_per_vector: 3,
            fetch_timeout: Duration::from_secs(5),
            evidence_budget: 2000,
            images_per_page: 2,
            compose_context_cap: 10_000,
            chart_context_cap: 12_000,
            artifact_format: ArtifactFormat::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a config with the specified model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set the number of research vectors to plan.
    pub fn vector_count(mut self, n: usize) -> Self {
        self.vector_count = n;
        self
    }

    /// Set the number of search results fetched per vector.
    pub fn results_per_vector(mut self, n: usize) -> Self {
        self.results_per_vector = n;
        self
    }

    /// Set the per-page fetch timeout.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the per-page evidence character budget.
    pub fn evidence_budget(mut self, chars: usize) -> Self {
        self.evidence_budget = chars;
        self
    }

    /// Set the artifact target format.
    pub fn artifact_format(mut self, format: ArtifactFormat) -> Self {
        self.artifact_format = format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.vector_count, 3);
        assert_eq!(config.results_per_vector, 3);
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.evidence_budget, 2000);
        assert_eq!(config.compose_context_cap, 10_000);
        assert_eq!(config.chart_context_cap, 12_000);
        assert_eq!(config.artifact_format, ArtifactFormat::Mermaid);
    }

    #[test]
    fn builder_overrides() {
        let config = PipelineConfig::new("test-model")
            .vector_count(7)
            .artifact_format(ArtifactFormat::Markup);
        assert_eq!(config.model, "test-model");
        assert_eq!(config.vector_count, 7);
        assert_eq!(config.artifact_format, ArtifactFormat::Markup);
    }
}
