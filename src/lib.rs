//! Dossier - recursive sectional research pipeline
//!
//! Dossier turns a subject name into a streamed intelligence report: it
//! plans research sub-queries, gathers and summarizes web evidence for each,
//! derives visual artifacts, composes a fixed set of narrative report
//! sections, and extracts chart-ready numeric estimates. A presentation
//! surface (terminal, dashboard, GUI) consumes the typed event stream as it
//! arrives; the pipeline itself degrades instead of crashing.
//!
//! # Quick Start
//!
//! ```ignore
//! use dossier::{ExaSearch, HttpFetcher, OllamaClient, Pipeline, PipelineEvent};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pipeline = Arc::new(Pipeline::new(
//!         Arc::new(OllamaClient::from_env()),
//!         Arc::new(ExaSearch::from_env().unwrap()),
//!         Arc::new(HttpFetcher::new()),
//!     ));
//!
//!     let mut handle = pipeline.spawn("Acme Corp");
//!     while let Some(event) = handle.events.recv().await {
//!         match event {
//!             PipelineEvent::SectionReady { title, .. } => println!("section: {title}"),
//!             PipelineEvent::Completed => break,
//!             PipelineEvent::Failed { message } => {
//!                 eprintln!("{message}");
//!                 break;
//!             }
//!             _ => {}
//!         }
//!     }
//!     handle.join().await.save("report.md").unwrap();
//! }
//! ```

mod completion;
mod error;
mod fetch;
mod pipeline;
mod report;
mod search;

pub use completion::{CompletionClient, Message, OllamaClient, Role};
pub use error::{Error, Result};
pub use fetch::{HttpFetcher, PageFetcher};
pub use pipeline::{
    AnalyticalArtifact, ArtifactFormat, ChartData, EventSink, LogTag, Pipeline, PipelineConfig,
    PipelineEvent, PipelineStage, RunHandle,
};
pub use report::{FullReport, ReportSection, SectionSpec, SECTION_TEMPLATES};
pub use search::{ExaSearch, SearchHit, SearchProvider};
