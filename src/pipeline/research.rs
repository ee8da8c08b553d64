//! Vector researcher: gathers web evidence for one query and summarizes it
//! into an intelligence digest.

use crate::error::Result;
use crate::fetch::{extract_image_urls, strip_markup};
use crate::pipeline::events::{EventSink, LogTag, PipelineEvent};
use crate::pipeline::{Pipeline, prompt};

/// Evidence gathered from a single fetched page.
struct Evidence {
    text: String,
    images: Vec<String>,
}

impl Pipeline {
    /// Research one vector: search, fetch each hit, summarize.
    ///
    /// Returns `None` when no usable text was gathered; partial coverage is
    /// an accepted outcome, not a failure. Search and per-source fetch
    /// errors are contained here; only the summarization completion can
    /// propagate an error.
    pub(crate) async fn research_vector(
        &self,
        query: &str,
        sink: &EventSink,
    ) -> Result<Option<String>> {
        let hits = match self
            .search
            .search(query, self.config.results_per_vector)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(query, error = %e, "search failed; vector yields no evidence");
                sink.log(LogTag::Warn, format!("search failed for '{query}': {e}"));
                return Ok(None);
            }
        };

        let mut snippets = Vec::new();
        let mut images = Vec::new();
        for hit in &hits {
            sink.emit(PipelineEvent::SourceFound {
                query: query.to_string(),
                url: hit.url.clone(),
            });

            match self.gather_source(&hit.url).await {
                Ok(evidence) => {
                    if !evidence.text.is_empty() {
                        snippets.push(evidence.text);
                    }
                    images.extend(evidence.images);
                }
                Err(e) => {
                    tracing::warn!(url = %hit.url, error = %e, "source skipped");
                    sink.log(LogTag::Warn, format!("skipping source {}: {e}", hit.url));
                }
            }
        }

        if snippets.is_empty() {
            return Ok(None);
        }

        let digest = self
            .complete_one(prompt::summarize(query, &snippets.join("\n")))
            .await?;

        for url in images {
            sink.emit(PipelineEvent::ImageFound {
                query: query.to_string(),
                url,
            });
        }
        sink.emit(PipelineEvent::DigestReady {
            query: query.to_string(),
            digest: digest.clone(),
        });

        Ok(Some(digest))
    }

    /// Fetch one source and extract bounded evidence from it.
    async fn gather_source(&self, url: &str) -> Result<Evidence> {
        let html = self.fetcher.fetch(url, self.config.fetch_timeout).await?;
        let text: String = strip_markup(&html)
            .chars()
            .take(self.config.evidence_budget)
            .collect();
        let images = extract_image_urls(&html, url, self.config.images_per_page);
        Ok(Evidence { text, images })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{
        collect_events, pipeline_parts, FailingFetcher, FailingSearch, ScriptedCompletion,
        StaticFetcher, StaticSearch,
    };
    use crate::search::SearchHit;

    fn hit(url: &str) -> SearchHit {
        SearchHit {
            title: String::new(),
            url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn zero_results_yield_no_digest() {
        let completion = ScriptedCompletion::failing();
        let (pipeline, sink, rx) =
            pipeline_parts(completion, StaticSearch::empty(), StaticFetcher::empty());

        let digest = pipeline.research_vector("acme", &sink).await.unwrap();
        assert!(digest.is_none());
        assert!(collect_events(rx).is_empty());
    }

    #[tokio::test]
    async fn search_errors_are_contained() {
        let completion = ScriptedCompletion::failing();
        let (pipeline, sink, rx) =
            pipeline_parts(completion, FailingSearch, StaticFetcher::empty());

        let digest = pipeline.research_vector("acme", &sink).await.unwrap();
        assert!(digest.is_none());

        let events = collect_events(rx);
        assert!(matches!(
            events.as_slice(),
            [PipelineEvent::Log { tag: LogTag::Warn, .. }]
        ));
    }

    #[tokio::test]
    async fn all_fetches_failing_yields_no_digest() {
        let completion = ScriptedCompletion::failing();
        let search = StaticSearch::new(vec![hit("https://a.example"), hit("https://b.example")]);
        let (pipeline, sink, rx) = pipeline_parts(completion, search, FailingFetcher);

        let digest = pipeline.research_vector("acme", &sink).await.unwrap();
        assert!(digest.is_none());

        // Two sources announced, two warnings, never a digest event.
        let events = collect_events(rx);
        let sources = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::SourceFound { .. }))
            .count();
        assert_eq!(sources, 2);
        assert!(
            events
                .iter()
                .all(|e| !matches!(e, PipelineEvent::DigestReady { .. }))
        );
    }

    #[tokio::test]
    async fn failing_source_is_skipped_not_fatal() {
        let completion = ScriptedCompletion::replying(["summarized intelligence"]);
        let search = StaticSearch::new(vec![hit("https://down.example"), hit("https://up.example")]);
        let fetcher = StaticFetcher::new([(
            "https://up.example",
            r#"<p>Acme grew revenue 40% in 2025.</p><img src="/charts/rev.png" width="640">"#,
        )]);
        let (pipeline, sink, rx) = pipeline_parts(completion, search, fetcher);

        let digest = pipeline.research_vector("acme", &sink).await.unwrap();
        assert_eq!(digest.as_deref(), Some("summarized intelligence"));

        let events = collect_events(rx);
        assert!(events.iter().any(
            |e| matches!(e, PipelineEvent::ImageFound { url, .. } if url.contains("rev.png"))
        ));
        assert!(events.iter().any(
            |e| matches!(e, PipelineEvent::DigestReady { query, .. } if query == "acme")
        ));
        // The dead source produced a warning, not an abort.
        assert!(events.iter().any(
            |e| matches!(e, PipelineEvent::Log { tag: LogTag::Warn, message } if message.contains("down.example"))
        ));
    }

    #[tokio::test]
    async fn evidence_is_truncated_to_budget() {
        let completion = ScriptedCompletion::replying(["digest"]);
        let long_page = format!("<p>{}</p>", "x".repeat(5000));
        let search = StaticSearch::new(vec![hit("https://long.example")]);
        let fetcher = StaticFetcher::new([("https://long.example", long_page.as_str())]);
        let (pipeline, sink, _rx) = pipeline_parts(completion.clone(), search, fetcher);

        pipeline.research_vector("acme", &sink).await.unwrap();

        let prompts = completion.prompts();
        let evidence_len = prompts[0].lines().last().unwrap().len();
        assert_eq!(evidence_len, pipeline.config.evidence_budget);
    }
}
