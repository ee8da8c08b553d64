//! Recursive sectional research pipeline.
//!
//! The orchestrator drives five stages in strict sequence (vector planning,
//! per-vector research and analytical synthesis, sectional report
//! composition, chart synthesis), emitting typed events throughout. Each
//! run executes on its own spawned task behind a single top-level failure
//! boundary: a fault becomes one `Failed` event, never an error returned to
//! the caller.

mod charts;
mod compose;
mod config;
mod events;
mod planner;
mod prompt;
mod research;
mod synthesis;

#[cfg(test)]
pub(crate) mod testing;

pub use charts::ChartData;
pub use config::{ArtifactFormat, PipelineConfig};
pub use events::{EventSink, LogTag, PipelineEvent};
pub use synthesis::AnalyticalArtifact;

use crate::completion::{CompletionClient, Message};
use crate::error::{Error, Result};
use crate::fetch::PageFetcher;
use crate::report::{FullReport, SECTION_TEMPLATES};
use crate::search::SearchProvider;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Stages of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Planning,
    Researching,
    Synthesizing,
    Composing,
    ChartSynthesis,
    Completed,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Planning => "planning",
            PipelineStage::Researching => "researching",
            PipelineStage::Synthesizing => "synthesizing",
            PipelineStage::Composing => "composing",
            PipelineStage::ChartSynthesis => "chart synthesis",
            PipelineStage::Completed => "completed",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Per-run mutable state, exclusively owned by the run task.
///
/// Consumers never see this value; they observe snapshots through events. A
/// new run always starts from a fresh `RunState`.
struct RunState {
    stage: PipelineStage,
    grounding: Vec<String>,
    report: FullReport,
    artifacts_seen: HashSet<(String, String)>,
    progress: u8,
}

impl RunState {
    fn new(subject: &str) -> Self {
        Self {
            stage: PipelineStage::Planning,
            grounding: Vec::new(),
            report: FullReport::new(subject),
            artifacts_seen: HashSet::new(),
            progress: 0,
        }
    }

    fn enter(&mut self, stage: PipelineStage, sink: &EventSink) {
        if self.stage != stage {
            self.stage = stage;
            tracing::info!(%stage, "pipeline stage");
            sink.log(LogTag::System, format!("stage: {stage}"));
        }
    }

    fn push_digest(&mut self, query: &str, digest: &str) {
        self.grounding.push(format!("{query}: {digest}"));
    }

    fn grounding_context(&self) -> String {
        self.grounding.join("\n\n")
    }

    /// Record an artifact for dedup; returns false if an identical
    /// (title, content) pair was already emitted this run.
    fn record_artifact(&mut self, artifact: &AnalyticalArtifact) -> bool {
        self.artifacts_seen
            .insert((artifact.title.clone(), artifact.content.clone()))
    }

    /// Advance progress, never backwards.
    fn advance(&mut self, sink: &EventSink, percent: u8) {
        let percent = percent.min(100);
        if percent > self.progress {
            self.progress = percent;
            sink.emit(PipelineEvent::Progress { percent });
        }
    }
}

/// Handle to a spawned pipeline run.
pub struct RunHandle {
    subject: String,
    /// Event stream for the presentation consumer, in strict stage order.
    pub events: UnboundedReceiver<PipelineEvent>,
    cancel: CancellationToken,
    task: JoinHandle<FullReport>,
}

impl RunHandle {
    /// Request cooperative cancellation; honored between stage boundaries
    /// and between per-vector / per-section steps.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the run to finish and take the (possibly partial) report.
    pub async fn join(self) -> FullReport {
        match self.task.await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, "run task aborted");
                FullReport::new(&self.subject)
            }
        }
    }
}

/// The research pipeline: owns the external collaborators and drives runs.
pub struct Pipeline {
    completion: Arc<dyn CompletionClient>,
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn PageFetcher>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            completion,
            search,
            fetcher,
            config: PipelineConfig::default(),
        }
    }

    /// Replace the default configuration.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Spawn one run on its own task and hand back its event stream.
    ///
    /// A second call starts an independent run with fresh state; runs share
    /// nothing but the collaborators.
    pub fn spawn(self: &Arc<Self>, subject: impl Into<String>) -> RunHandle {
        let subject = subject.into();
        let (tx, events) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let pipeline = Arc::clone(self);
        let sink = EventSink::new(tx);
        let run_subject = subject.clone();
        let run_cancel = cancel.clone();
        let task =
            tokio::spawn(async move { pipeline.run(&run_subject, sink, run_cancel).await });

        RunHandle {
            subject,
            events,
            cancel,
            task,
        }
    }

    /// Execute one full run. This is the top-level failure boundary: every
    /// escaping error is converted into a `Failed` event and the (possibly
    /// partial) report is returned regardless.
    pub async fn run(
        &self,
        subject: &str,
        sink: EventSink,
        cancel: CancellationToken,
    ) -> FullReport {
        let mut state = RunState::new(subject);

        match self.execute(subject, &mut state, &sink, &cancel).await {
            Ok(()) => {
                state.enter(PipelineStage::Completed, &sink);
                state.advance(&sink, 100);
                sink.emit(PipelineEvent::Completed);
                sink.log(
                    LogTag::Success,
                    "all sections, artifacts and charts generated",
                );
            }
            Err(e) => {
                state.stage = PipelineStage::Failed;
                tracing::error!(error = %e, subject, "pipeline run failed");
                sink.log(LogTag::Error, format!("agent error: {e}"));
                sink.emit(PipelineEvent::Failed {
                    message: e.to_string(),
                });
            }
        }

        state.report
    }

    async fn execute(
        &self,
        subject: &str,
        state: &mut RunState,
        sink: &EventSink,
        cancel: &CancellationToken,
    ) -> Result<()> {
        sink.log(LogTag::System, format!("agent deployed: {subject}"));
        state.enter(PipelineStage::Planning, sink);
        let vectors = self.plan_vectors(subject).await?;

        let total_vectors = vectors.len();
        for (idx, query) in vectors.iter().enumerate() {
            checkpoint(cancel)?;
            state.enter(PipelineStage::Researching, sink);
            sink.emit(PipelineEvent::VectorPlanned {
                query: query.clone(),
            });
            sink.log(LogTag::Model, format!("mining vector: {query}"));

            if let Some(digest) = self.research_vector(query, sink).await? {
                state.push_digest(query, &digest);

                state.enter(PipelineStage::Synthesizing, sink);
                let artifact = self.synthesize_artifact(query, &digest).await?;
                if state.record_artifact(&artifact) {
                    sink.emit(PipelineEvent::ArtifactReady {
                        title: artifact.title,
                        content: artifact.content,
                    });
                }
            }

            state.advance(sink, (((idx + 1) * 50) / total_vectors) as u8);
        }

        checkpoint(cancel)?;
        let grounding = state.grounding_context();
        let total_sections = SECTION_TEMPLATES.len();
        for (idx, spec) in SECTION_TEMPLATES.iter().enumerate() {
            checkpoint(cancel)?;
            state.enter(PipelineStage::Composing, sink);
            sink.log(LogTag::Model, format!("streaming section: {}", spec.title));

            match self.compose_section(subject, spec, &grounding).await {
                Ok(section) => {
                    state.report.push(section.clone());
                    sink.emit(PipelineEvent::SectionReady {
                        title: section.title,
                        body: section.body,
                    });
                }
                Err(e) => {
                    tracing::warn!(section = spec.title, error = %e, "section skipped");
                    sink.log(
                        LogTag::Warn,
                        format!("section '{}' failed: {e}", spec.title),
                    );
                }
            }

            state.advance(sink, 50 + (((idx + 1) * 48) / total_sections) as u8);
        }

        checkpoint(cancel)?;
        state.enter(PipelineStage::ChartSynthesis, sink);
        self.synthesize_chart_data(subject, &grounding, sink).await?;

        Ok(())
    }

    /// Single-prompt completion used by every stage.
    pub(crate) async fn complete_one(&self, prompt: String) -> Result<String> {
        self.completion
            .complete(&self.config.model, &[Message::user(prompt)])
            .await
    }
}

fn checkpoint(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}
