//! Vector planner: derives the run's research sub-queries from the subject.

use crate::error::Result;
use crate::pipeline::{Pipeline, prompt};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// First bracketed list-like substring of a completion response.
static BRACKETED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\[.*\]").unwrap());

impl Pipeline {
    /// Ask the model for `vector_count` distinct research queries.
    ///
    /// A malformed or missing list falls back to the deterministic two-query
    /// default; only completion transport errors propagate.
    pub(crate) async fn plan_vectors(&self, subject: &str) -> Result<Vec<String>> {
        let response = self
            .complete_one(prompt::plan(subject, self.config.vector_count))
            .await?;

        match parse_queries(&response) {
            Some(queries) => Ok(queries),
            None => {
                tracing::warn!(subject, "no parseable query list; using fallback vectors");
                Ok(fallback_queries(subject))
            }
        }
    }
}

/// Decode the first bracketed substring as a JSON array of queries.
///
/// Returns `None` when nothing decodes or nothing usable remains; the caller
/// applies the fallback. Blank entries are dropped and duplicates removed
/// with first-seen order preserved.
fn parse_queries(response: &str) -> Option<Vec<String>> {
    let payload = BRACKETED.find(response)?.as_str();
    let decoded: Vec<String> = serde_json::from_str(payload).ok()?;

    let mut seen = HashSet::new();
    let queries: Vec<String> = decoded
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty() && seen.insert(q.clone()))
        .collect();

    (!queries.is_empty()).then_some(queries)
}

/// Deterministic planner fallback. Must never fail.
fn fallback_queries(subject: &str) -> Vec<String> {
    vec![format!("{subject} analysis"), format!("{subject} competitors")]
}
