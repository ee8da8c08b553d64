//! Content fetcher: retrieves raw HTML for a URL with a bounded timeout and
//! extracts plain text plus a filtered list of content image links.
//!
//! Fetching is a trait seam so the research stage can be exercised without a
//! network; the markup-stripping and image-filtering helpers are pure
//! functions. Filtering heuristics (dimension threshold, non-content path
//! markers) live here with the extraction they qualify.

use crate::error::{Error, Result};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

/// Images whose declared width or height falls below this are dropped as
/// icons/thumbnails.
const MIN_IMAGE_DIMENSION: u32 = 150;

/// Path substrings that mark non-content imagery (logos, icons, ad pixels).
const NON_CONTENT_MARKERS: &[&str] = &[
    "logo", "icon", "sprite", "banner", "pixel", "avatar", "advert", "/ads/",
];

static SCRIPT_BLOCKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</(script|style|noscript)>").unwrap());
static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static IMG_TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").unwrap());
static SRC_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bsrc\s*=\s*["']([^"']+)["']"#).unwrap());
static WIDTH_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bwidth\s*=\s*["']?(\d+)"#).unwrap());
static HEIGHT_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bheight\s*=\s*["']?(\d+)"#).unwrap());

/// Page fetch seam consumed by the vector researcher.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Retrieve the raw HTML body of `url`, failing after `timeout`.
    ///
    /// Timeout and connection errors are expected and non-fatal to the run.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String>;
}

/// Fetcher backed by a shared reqwest client.
#[derive(Default)]
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("dossier/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self { http }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String> {
        let response = self.http.get(url).timeout(timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body: format!("fetching {url}"),
            });
        }
        Ok(response.text().await?)
    }
}

/// Strip markup from an HTML document, leaving collapsed plain text.
///
/// Script, style, and noscript blocks are removed wholesale so their bodies
/// do not leak into the evidence text.
pub fn strip_markup(html: &str) -> String {
    let without_blocks = SCRIPT_BLOCKS.replace_all(html, " ");
    let without_tags = TAGS.replace_all(&without_blocks, " ");
    WHITESPACE.replace_all(&without_tags, " ").trim().to_string()
}

/// Extract up to `max` content image URLs from a page.
///
/// Relative links are resolved against `page_url`. Images with a declared
/// dimension under [`MIN_IMAGE_DIMENSION`] and paths carrying
/// [`NON_CONTENT_MARKERS`] are excluded.
pub fn extract_image_urls(html: &str, page_url: &str, max: usize) -> Vec<String> {
    let base = Url::parse(page_url).ok();
    let mut urls = Vec::new();

    for tag in IMG_TAGS.find_iter(html) {
        if urls.len() >= max {
            break;
        }
        let tag = tag.as_str();

        let Some(src) = SRC_ATTR.captures(tag).map(|c| c[1].to_string()) else {
            continue;
        };
        if src.starts_with("data:") {
            continue;
        }
        if below_dimension_threshold(tag) {
            continue;
        }

        let Some(resolved) = resolve(base.as_ref(), &src) else {
            continue;
        };
        if is_non_content_path(&resolved) {
            continue;
        }

        urls.push(resolved);
    }

    urls
}

fn below_dimension_threshold(tag: &str) -> bool {
    let declared = |re: &Regex| {
        re.captures(tag)
            .and_then(|c| c[1].parse::<u32>().ok())
    };
    for dim in [declared(&WIDTH_ATTR), declared(&HEIGHT_ATTR)].into_iter().flatten() {
        if dim < MIN_IMAGE_DIMENSION {
            return true;
        }
    }
    false
}

fn is_non_content_path(url: &str) -> bool {
    let lowered = url.to_lowercase();
    NON_CONTENT_MARKERS.iter().any(|m| lowered.contains(m))
}

fn resolve(base: Option<&Url>, src: &str) -> Option<String> {
    let resolved = match base {
        Some(base) => base.join(src).ok()?,
        None => Url::parse(src).ok()?,
    };
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}
