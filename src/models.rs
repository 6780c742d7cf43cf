//! Data models for the day's matched news items.
//!
//! - [`SummaryRecord`]: listing-derived metadata for one news item
//! - [`EnrichedRecord`]: a summary plus the extracted full article text
//!
//! Serialized field names follow the document layout already present in the
//! archive collection (`datetime`, `source_url`, `article`), which is also
//! what the digest template iterates over.

use serde::{Deserialize, Serialize};

/// One matched news item published today.
///
/// Only built by the listing filter, and only for items carrying both a
/// relative source path and a publication timestamp dated today.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SummaryRecord {
    /// The headline.
    pub title: String,
    /// Publication timestamp as provided by the aggregator
    /// (`YYYY-MM-DD HH:MM:SS`).
    #[serde(rename = "datetime")]
    pub published_at: String,
    /// Publisher name.
    pub source: String,
    /// Short teaser text.
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Absolute article URL: aggregator origin + relative path.
    #[serde(rename = "source_url")]
    pub article_url: String,
}

/// A [`SummaryRecord`] with its full article text attached.
///
/// Created once per summary after the detail page was fetched and decoded,
/// persisted once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub summary: SummaryRecord,
    /// Plain article text, `None` when the detail page could not be fetched
    /// or decoded.
    #[serde(rename = "article")]
    pub article_text: Option<String>,
}

impl EnrichedRecord {
    pub fn new(summary: SummaryRecord, article_text: Option<String>) -> Self {
        Self {
            summary,
            article_text,
        }
    }
}
