//! Search provider: turns a query string into an ordered list of candidate
//! result links.
//!
//! [`ExaSearch`] implements the seam over the Exa search API. The provider
//! may return fewer results than requested or fail outright; the research
//! stage treats any error as "no results for this vector".

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SEARCH_ENDPOINT: &str = "https://api.exa.ai/search";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

/// One search result link.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
}

/// Web search seam consumed by the vector researcher.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Return up to `max_results` hits for `query`, best first.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaSearchRequest<'a> {
    query: &'a str,
    num_results: u32,
    #[serde(rename = "type")]
    search_type: &'a str,
}

#[derive(Deserialize)]
struct ExaSearchResponse {
    results: Vec<ExaResult>,
}

#[derive(Deserialize)]
struct ExaResult {
    #[serde(default)]
    title: String,
    url: String,
}

/// Search provider backed by the Exa API.
pub struct ExaSearch {
    http: reqwest::Client,
    api_key: String,
}

impl ExaSearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .user_agent(concat!("dossier/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            http,
            api_key: api_key.into(),
        }
    }

    /// Build a provider from the `EXA_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var("EXA_API_KEY")
            .map_err(|_| Error::Search("EXA_API_KEY not set".to_string()))?;
        Ok(Self::new(key))
    }
}

#[async_trait]
impl SearchProvider for ExaSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let request = ExaSearchRequest {
            query,
            num_results: max_results.clamp(1, 10) as u32,
            search_type: "auto",
        };

        let response = self
            .http
            .post(SEARCH_ENDPOINT)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let data: ExaSearchResponse = response.json().await?;
        Ok(data
            .results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
            })
            .collect())
    }
}
