//! Data models for scraped pages and their enriched representations.
//!
//! This module defines the core data structures used throughout the application:
//! - [`FetchResult`]: Raw per-ID extraction output from the headless browser
//! - [`Noticia`]: A fully enriched, publish-ready article record
//! - [`NoticiaBatch`]: The collection of articles produced by a single run
//!
//! `Noticia` serializes with the Portuguese field names used by the FCV
//! publishing pipeline (`titulo`, `resumo`, `conteudo`, ...).

use serde::{Deserialize, Serialize};

/// Raw extraction output for a single article ID.
///
/// Produced once per ID by the page fetcher and consumed once by the
/// aggregation loop. All content fields are `None` when the fetch failed;
/// `error` then carries a human-readable description of what went wrong.
#[derive(Debug)]
pub struct FetchResult {
    /// The numeric article ID on the FCV site.
    pub id: u32,
    /// Trimmed text of the title region, if present and non-empty.
    pub title: Option<String>,
    /// Trimmed text of the publish-date region, if present and non-empty.
    pub date: Option<String>,
    /// Trimmed text of the article body region, if present and non-empty.
    pub body: Option<String>,
    /// Absolute URLs of the gallery thumbnails found on the page.
    pub image_links: Option<Vec<String>>,
    /// Human-readable failure description; set only on the failure path.
    pub error: Option<String>,
}

impl FetchResult {
    /// Build the failure-path result: ID and error message, no content.
    pub fn failed(id: u32, error: String) -> Self {
        Self {
            id,
            title: None,
            date: None,
            body: None,
            image_links: None,
            error: Some(error),
        }
    }

    /// Whether this result carries everything needed for enrichment.
    ///
    /// True iff no error was recorded and title, date, and body are all
    /// present and non-empty.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
            && [&self.title, &self.date, &self.body]
                .iter()
                .all(|field| field.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

/// A publish-ready article record.
///
/// Only constructed once a fetch has produced title, date, and body, both
/// enrichment calls have succeeded, and the publish date has normalized;
/// the aggregation loop skips the ID otherwise.
#[derive(Debug, Deserialize, Serialize)]
pub struct Noticia {
    /// Article headline.
    pub titulo: String,
    /// LLM-generated summary, at most a few lines.
    pub resumo: String,
    /// Full article body text.
    pub conteudo: String,
    /// Publish timestamp in Unix epoch seconds.
    pub data_publicacao: i64,
    /// The article's numeric ID on the source site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_id: Option<u32>,
    /// LLM-generated topic tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Gallery image URLs extracted from the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagens: Option<Vec<String>>,
}

/// The collection of articles produced by a single run.
///
/// Serialized as-is to the JSON output file.
#[derive(Debug, Deserialize, Serialize)]
pub struct NoticiaBatch {
    /// The run date in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The exact local time the run started.
    pub local_time: String,
    /// Every article that survived fetching and enrichment.
    pub noticias: Vec<Noticia>,
}
