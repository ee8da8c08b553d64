//! Prompt templates for the pipeline's completion requests.

use crate::pipeline::config::ArtifactFormat;
use crate::report::SectionSpec;

/// Vector planning prompt. The response must carry a literal JSON array.
const PLAN_TEMPLATE: &str = "Generate a JSON array of exactly {count} distinct market research \
queries for deep due diligence on: {subject}. Return ONLY the JSON array of strings, nothing else.";

/// Per-vector evidence summarization prompt.
const SUMMARIZE_TEMPLATE: &str = "Summarize verified intelligence for: {query}.\n\n{evidence}";

/// Mermaid artifact prompt.
const MERMAID_TEMPLATE: &str = "Derive a Mermaid flowchart capturing the key entities, forces and \
relationships in the intelligence digest below. Use strict Mermaid syntax (`flowchart TD`), no \
commentary, no code fences.\n\nDigest for {query}:\n{digest}";

/// Styled-markup artifact prompt.
const MARKUP_TEMPLATE: &str = "Derive a self-contained styled HTML fragment (inline styles only, \
no external assets, no scripts) visualizing the structure of the intelligence digest below. \
Return ONLY the fragment.\n\nDigest for {query}:\n{digest}";

/// Report section prompt. Grounding beyond the context cap is dropped before
/// substitution.
const SECTION_TEMPLATE: &str = "Write the '{title}' section ({instruction}) for {subject} using \
ONLY the research data below:\n{context}";

/// Quantitative chart-data prompt. The response must be a bare JSON object.
const CHART_TEMPLATE: &str = r#"From the research data below, estimate quantitative indicators for {subject}.
Respond with ONLY a JSON object in exactly this shape, no commentary:

{"market_variation": {"labels": ["2020", "2021"], "values": [100, 120]}, "pestle": {"political": 6, "economic": 7, "social": 5, "technological": 8, "legal": 6, "environmental": 7}, "moat": {"brand": 8, "technology": 7, "network": 9, "cost": 6}}

Scores are 0-10. Research data:
{context}"#;

pub fn plan(subject: &str, count: usize) -> String {
    PLAN_TEMPLATE
        .replace("{count}", &count.to_string())
        .replace("{subject}", subject)
}

pub fn summarize(query: &str, evidence: &str) -> String {
    SUMMARIZE_TEMPLATE
        .replace("{query}", query)
        .replace("{evidence}", evidence)
}

pub fn artifact(format: ArtifactFormat, query: &str, digest: &str) -> String {
    let template = match format {
        ArtifactFormat::Mermaid => MERMAID_TEMPLATE,
        ArtifactFormat::Markup => MARKUP_TEMPLATE,
    };
    template.replace("{query}", query).replace("{digest}", digest)
}

pub fn section(subject: &str, spec: &SectionSpec, context: &str) -> String {
    SECTION_TEMPLATE
        .replace("{title}", spec.title)
        .replace("{instruction}", spec.instruction)
        .replace("{subject}", subject)
        .replace("{context}", context)
}

pub fn chart(subject: &str, context: &str) -> String {
    CHART_TEMPLATE
        .replace("{subject}", subject)
        .replace("{context}", context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_substitutes_count_and_subject() {
        let p = plan("Acme Corp", 3);
        assert!(p.contains("exactly 3 distinct"));
        assert!(p.contains("Acme Corp"));
        assert!(!p.contains('{'));
    }

    #[test]
    fn section_embeds_title_and_instruction() {
        let spec = SectionSpec {
            title: "SWOT Analysis",
            instruction: "Strengths, Weaknesses, Opportunities, Threats",
        };
        let p = section("Acme Corp", &spec, "digest one");
        assert!(p.contains("'SWOT Analysis'"));
        assert!(p.contains("Opportunities"));
        assert!(p.ends_with("digest one"));
    }

    #[test]
    fn artifact_prompt_tracks_format() {
        let mermaid = artifact(ArtifactFormat::Mermaid, "q", "d");
        assert!(mermaid.contains("Mermaid"));
        let markup = artifact(ArtifactFormat::Markup, "q", "d");
        assert!(markup.contains("HTML fragment"));
    }
}
