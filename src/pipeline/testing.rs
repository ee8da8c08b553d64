//! Mock collaborators shared by the pipeline test modules.

use crate::completion::{CompletionClient, Message};
use crate::error::{Error, Result};
use crate::fetch::PageFetcher;
use crate::pipeline::events::{EventSink, PipelineEvent};
use crate::pipeline::{Pipeline, PipelineConfig};
use crate::search::{SearchHit, SearchProvider};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Completion client that replays a scripted sequence of responses and
/// records every prompt it was sent.
#[derive(Clone)]
pub(crate) struct ScriptedCompletion {
    inner: Arc<ScriptedInner>,
}

struct ScriptedInner {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub(crate) fn script(entries: Vec<String>) -> Self {
        Self {
            inner: Arc::new(ScriptedInner {
                script: Mutex::new(entries.into_iter().map(Ok).collect()),
                prompts: Mutex::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn replying<'a>(entries: impl IntoIterator<Item = &'a str>) -> Self {
        Self::script(entries.into_iter().map(String::from).collect())
    }

    /// Script where the call at `index` fails instead of replying.
    pub(crate) fn script_failing_at(entries: Vec<String>, index: usize) -> Self {
        let scripted = Self::script(entries);
        let mut script = scripted.inner.script.lock().unwrap();
        if let Some(entry) = script.get_mut(index) {
            *entry = Err("scripted failure".to_string());
        }
        drop(script);
        scripted
    }

    /// Client that fails every call.
    pub(crate) fn failing() -> Self {
        Self::script(Vec::new())
    }

    /// Prompts seen so far, in call order.
    pub(crate) fn prompts(&self) -> Vec<String> {
        self.inner.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, _model: &str, messages: &[Message]) -> Result<String> {
        let prompt = messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.inner.prompts.lock().unwrap().push(prompt);

        match self.inner.script.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(Error::Decode(message)),
            None => Err(Error::Decode("script exhausted".to_string())),
        }
    }
}

/// Search provider returning a fixed hit list for every query.
pub(crate) struct StaticSearch {
    hits: Vec<SearchHit>,
}

impl StaticSearch {
    pub(crate) fn new(hits: Vec<SearchHit>) -> Self {
        Self { hits }
    }

    pub(crate) fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        Ok(self.hits.iter().take(max_results).cloned().collect())
    }
}

/// Search provider that always fails.
pub(crate) struct FailingSearch;

#[async_trait]
impl SearchProvider for FailingSearch {
    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchHit>> {
        Err(Error::Search("search unavailable".to_string()))
    }
}

/// Fetcher serving canned HTML by URL; unknown URLs fail like dead links.
pub(crate) struct StaticFetcher {
    pages: HashMap<String, String>,
}

impl StaticFetcher {
    pub(crate) fn new<'a>(pages: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(url, html)| (url.to_string(), html.to_string()))
                .collect(),
        }
    }

    pub(crate) fn empty() -> Self {
        Self::new([])
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<String> {
        self.pages.get(url).cloned().ok_or(Error::Api {
            status: 404,
            body: format!("fetching {url}"),
        })
    }
}

/// Fetcher that fails every URL.
pub(crate) struct FailingFetcher;

#[async_trait]
impl PageFetcher for FailingFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<String> {
        Err(Error::Api {
            status: 503,
            body: format!("fetching {url}"),
        })
    }
}

/// Assemble a pipeline from mock collaborators.
pub(crate) fn build_pipeline(
    completion: impl CompletionClient + 'static,
    search: impl SearchProvider + 'static,
    fetcher: impl PageFetcher + 'static,
    config: PipelineConfig,
) -> Pipeline {
    Pipeline::new(Arc::new(completion), Arc::new(search), Arc::new(fetcher)).with_config(config)
}

/// Pipeline with only a completion mock, for stages that never search.
pub(crate) fn pipeline_with(completion: impl CompletionClient + 'static) -> Pipeline {
    build_pipeline(
        completion,
        StaticSearch::empty(),
        StaticFetcher::empty(),
        PipelineConfig::default(),
    )
}

/// Pipeline plus a connected sink/receiver pair.
pub(crate) fn pipeline_parts(
    completion: impl CompletionClient + 'static,
    search: impl SearchProvider + 'static,
    fetcher: impl PageFetcher + 'static,
) -> (Pipeline, EventSink, UnboundedReceiver<PipelineEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        build_pipeline(completion, search, fetcher, PipelineConfig::default()),
        EventSink::new(tx),
        rx,
    )
}

/// Drain every event currently buffered in the receiver.
pub(crate) fn collect_events(mut rx: UnboundedReceiver<PipelineEvent>) -> Vec<PipelineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
