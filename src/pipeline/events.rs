//! Pipeline events streamed to the presentation consumer.
//!
//! Every observable moment of a run is a typed [`PipelineEvent`] delivered
//! over an unbounded channel. The pipeline never hands out live state: the
//! consumer only ever sees these snapshots, in strict stage order.

use crate::pipeline::charts::ChartData;
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

/// Category tag for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    /// Orchestration milestones (deploy, stage transitions)
    System,
    /// Model activity narration
    Model,
    /// Degraded-path notices (skipped sources, dropped chart groups)
    Warn,
    /// Faults reported through the run boundary
    Error,
    /// Terminal success notice
    Success,
}

impl fmt::Display for LogTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            LogTag::System => "SYSTEM",
            LogTag::Model => "MODEL",
            LogTag::Warn => "WARN",
            LogTag::Error => "ERROR",
            LogTag::Success => "SUCCESS",
        };
        f.write_str(tag)
    }
}

/// Events emitted during a pipeline run.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Free-form log line
    Log { tag: LogTag, message: String },
    /// A research vector is about to be mined
    VectorPlanned { query: String },
    /// A source link was discovered for a vector
    SourceFound { query: String, url: String },
    /// A content image link survived filtering
    ImageFound { query: String, url: String },
    /// A vector's intelligence digest is ready
    DigestReady { query: String, digest: String },
    /// A visual-structure artifact is ready (deduplicated per run)
    ArtifactReady { title: String, content: String },
    /// A report section was composed and appended to the full report
    SectionReady { title: String, body: String },
    /// A chart dataset was decoded and validated
    ChartReady { chart: String, data: ChartData },
    /// Overall progress, non-decreasing within a run
    Progress { percent: u8 },
    /// The run finished successfully
    Completed,
    /// The run ended at the top-level failure boundary
    Failed { message: String },
}

/// Sending half of the event stream, held by the run task.
///
/// Cloneable and cheap. A departed consumer is not an error; events are
/// simply dropped once the receiver is gone.
#[derive(Clone)]
pub struct EventSink {
    tx: UnboundedSender<PipelineEvent>,
}

impl EventSink {
    pub fn new(tx: UnboundedSender<PipelineEvent>) -> Self {
        Self { tx }
    }

    /// Emit an event to the consumer, mirroring it to tracing.
    pub fn emit(&self, event: PipelineEvent) {
        tracing::debug!(?event, "pipeline event");
        let _ = self.tx.send(event);
    }

    /// Emit a tagged log event.
    pub fn log(&self, tag: LogTag, message: impl Into<String>) {
        self.emit(PipelineEvent::Log {
            tag,
            message: message.into(),
        });
    }
}
