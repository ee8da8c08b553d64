//! Quantitative synthesizer: extracts structured numeric estimates from a
//! completion and emits chart-ready datasets.
//!
//! The model is the trust boundary here: the response is decoded through
//! typed structs, each data group validated independently, and anything
//! malformed degrades to a warning instead of failing the run.

use crate::error::Result;
use crate::pipeline::events::{EventSink, LogTag, PipelineEvent};
use crate::pipeline::{Pipeline, prompt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chart identifiers paired with the payload key they are decoded from.
const SERIES_GROUP: (&str, &str) = ("market_variation", "market_trend");
const SCORE_GROUPS: &[(&str, &str)] = &[("pestle", "pestle"), ("moat", "moat")];

/// A validated, chart-ready dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartData {
    /// Labeled time series with equal-length labels and values
    Series {
        labels: Vec<String>,
        values: Vec<f64>,
    },
    /// Category scores keyed by non-empty dimension names
    Scores(BTreeMap<String, f64>),
}

#[derive(Deserialize)]
struct SeriesGroup {
    labels: Vec<String>,
    values: Vec<f64>,
}

impl Pipeline {
    /// Run the chart-synthesis stage: one strict-JSON completion, one
    /// `ChartReady` event per valid group. Decode problems are warnings; the
    /// run completes without charts in the worst case.
    pub(crate) async fn synthesize_chart_data(
        &self,
        subject: &str,
        grounding: &str,
        sink: &EventSink,
    ) -> Result<()> {
        let context: String = grounding
            .chars()
            .take(self.config.chart_context_cap)
            .collect();
        let response = self
            .complete_one(prompt::chart(subject, &context))
            .await?;

        let Some(payload) = extract_braced(&response) else {
            tracing::warn!("no brace-delimited chart payload in response");
            sink.log(LogTag::Warn, "no structured chart payload; charts skipped");
            return Ok(());
        };
        let value: serde_json::Value = match serde_json::from_str(payload) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "chart payload is not valid JSON");
                sink.log(LogTag::Warn, format!("chart payload undecodable: {e}"));
                return Ok(());
            }
        };

        for (key, chart, data) in decode_groups(&value) {
            match data {
                Some(data) => sink.emit(PipelineEvent::ChartReady {
                    chart: chart.to_string(),
                    data,
                }),
                None => {
                    sink.log(
                        LogTag::Warn,
                        format!("chart group '{key}' missing or invalid; skipped"),
                    );
                }
            }
        }

        Ok(())
    }
}

/// First brace-delimited substring of a response (first `{` through the last
/// `}`).
fn extract_braced(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Decode the three data groups independently; `None` marks a group that
/// failed its validation and should be skipped with a warning.
fn decode_groups(value: &serde_json::Value) -> Vec<(&'static str, &'static str, Option<ChartData>)> {
    let mut groups = Vec::new();

    let (key, chart) = SERIES_GROUP;
    groups.push((key, chart, decode_series(value.get(key))));
    for &(key, chart) in SCORE_GROUPS {
        groups.push((key, chart, decode_scores(value.get(key))));
    }

    groups
}

fn decode_series(group: Option<&serde_json::Value>) -> Option<ChartData> {
    let series: SeriesGroup = serde_json::from_value(group?.clone()).ok()?;
    if series.labels.is_empty() || series.labels.len() != series.values.len() {
        return None;
    }
    Some(ChartData::Series {
        labels: series.labels,
        values: series.values,
    })
}

fn decode_scores(group: Option<&serde_json::Value>) -> Option<ChartData> {
    let raw: BTreeMap<String, f64> = serde_json::from_value(group?.clone()).ok()?;
    let scores: BTreeMap<String, f64> = raw
        .into_iter()
        .filter(|(k, _)| !k.trim().is_empty())
        .collect();
    (!scores.is_empty()).then_some(ChartData::Scores(scores))
}
