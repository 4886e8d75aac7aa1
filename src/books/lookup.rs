//! Book metadata lookup against the Google Books volumes API.

use anyhow::{Context, Result};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::config::BooksConfig;

/// Metadata filled into a manual book entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMetadata {
    pub author: Option<String>,
    pub total_pages: Option<u32>,
    pub cover_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    volume_info: VolumeInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VolumeInfo {
    title: String,
    subtitle: Option<String>,
    authors: Vec<String>,
    page_count: Option<u32>,
    language: Option<String>,
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ImageLinks {
    thumbnail: Option<String>,
    #[serde(rename = "smallThumbnail")]
    small_thumbnail: Option<String>,
}

impl VolumeInfo {
    /// Study guides and summaries of the book rather than the book itself.
    fn is_derivative(&self) -> bool {
        let mentions = |s: &str| {
            let s = s.to_lowercase();
            s.contains("summary") || s.contains("analysis")
        };
        mentions(&self.title)
            || self.subtitle.as_deref().is_some_and(mentions)
            || self.authors.iter().any(|a| mentions(a))
    }

    fn is_english(&self) -> bool {
        self.language.as_deref() == Some("en")
    }

    fn into_metadata(self) -> BookMetadata {
        let cover_url = self
            .image_links
            .and_then(|links| links.thumbnail.or(links.small_thumbnail))
            .map(|url| url.replacen("http://", "https://", 1));
        BookMetadata {
            author: (!self.authors.is_empty()).then(|| self.authors.join(", ")),
            total_pages: self.page_count.filter(|&p| p > 0),
            cover_url,
        }
    }
}

/// Drop derivatives, prefer English when any English candidate survives, take the first.
fn select_best_match(volumes: Vec<Volume>) -> Option<VolumeInfo> {
    let originals: Vec<VolumeInfo> = volumes
        .into_iter()
        .map(|v| v.volume_info)
        .filter(|info| !info.is_derivative())
        .collect();

    if let Some(english) = originals.iter().find(|info| info.is_english()) {
        return Some(english.clone());
    }
    originals.into_iter().next()
}

pub struct BookLookup {
    client: Client,
    url: String,
}

impl BookLookup {
    pub fn new(config: &BooksConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            url: config.lookup_url.clone(),
        })
    }

    /// Best metadata match for `title` (and `author`, when known). `Ok(None)` when
    /// nothing usable came back.
    pub async fn lookup(&self, title: &str, author: Option<&str>) -> Result<Option<BookMetadata>> {
        let mut query = format!("intitle:{}", title.trim());
        if let Some(author) = author.map(str::trim).filter(|a| !a.is_empty()) {
            query.push_str(&format!(" inauthor:{author}"));
        }
        let url = Url::parse_with_params(&self.url, &[("q", query.as_str())])
            .with_context(|| format!("invalid lookup URL {}", self.url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("book lookup request failed")?;
        anyhow::ensure!(
            response.status().is_success(),
            "book lookup failed with HTTP {}",
            response.status()
        );

        let body: VolumesResponse = response
            .json()
            .await
            .context("book lookup returned unexpected JSON")?;
        let found = select_best_match(body.items).map(VolumeInfo::into_metadata);
        tracing::debug!(title, found = found.is_some(), "book lookup");
        Ok(found)
    }
}
