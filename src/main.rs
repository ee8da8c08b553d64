//! Terminal consumer for the Dossier pipeline.
//!
//! Renders the event stream as log lines and saves the assembled report.
//!
//! Run with:
//!   OLLAMA_API_KEY=... EXA_API_KEY=... dossier "Acme Corp" [report.md]

use dossier::{ExaSearch, HttpFetcher, LogTag, OllamaClient, Pipeline, PipelineEvent};
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let Some(subject) = env::args().nth(1) else {
        eprintln!("usage: dossier <subject> [report-path]");
        std::process::exit(2);
    };
    let report_path = env::args()
        .nth(2)
        .unwrap_or_else(|| "dossier_report.md".to_string());

    let search = match ExaSearch::from_env() {
        Ok(search) => search,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let pipeline = Arc::new(Pipeline::new(
        Arc::new(OllamaClient::from_env()),
        Arc::new(search),
        Arc::new(HttpFetcher::new()),
    ));

    let mut handle = pipeline.spawn(subject);
    let mut failed = false;

    while let Some(event) = handle.events.recv().await {
        match event {
            PipelineEvent::Log { tag, message } => match tag {
                LogTag::Warn | LogTag::Error => eprintln!("[{tag}] {message}"),
                _ => println!("[{tag}] {message}"),
            },
            PipelineEvent::VectorPlanned { query } => {
                println!("VEC: {}", query.to_uppercase());
            }
            PipelineEvent::SourceFound { url, .. } => {
                println!("  └─ {url}");
            }
            PipelineEvent::ImageFound { url, .. } => {
                println!("  img: {url}");
            }
            PipelineEvent::DigestReady { query, digest } => {
                // Lead sentence as the vector headline, full digest below.
                let headline = digest.split('.').next().unwrap_or(&digest);
                println!("\n── {query}: {headline}\n{digest}\n");
            }
            PipelineEvent::ArtifactReady { title, .. } => {
                println!("artifact ready: {title}");
            }
            PipelineEvent::SectionReady { title, body } => {
                println!("\n## {title}\n\n{body}\n");
            }
            PipelineEvent::ChartReady { chart, .. } => {
                println!("chart dataset ready: {chart}");
            }
            PipelineEvent::Progress { percent } => {
                println!("... {percent}%");
            }
            PipelineEvent::Completed => {
                println!("analysis complete");
            }
            PipelineEvent::Failed { message } => {
                eprintln!("run failed: {message}");
                failed = true;
            }
        }
    }

    let report = handle.join().await;
    if !report.is_empty() {
        match report.save(&report_path) {
            Ok(()) => println!("report exported to {report_path}"),
            Err(e) => eprintln!("could not export report: {e}"),
        }
    }

    if failed {
        std::process::exit(1);
    }
}
