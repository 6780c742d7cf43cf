//! Collaborator interfaces used by the pipeline.
//!
//! The pipeline only talks to the outside world through these traits:
//! - [`Aggregator`]: the news search API and its article pages
//! - [`MailTransport`]: the mail account the digest is sent from
//! - [`DocumentStore`]: the archive that receives enriched records
//!
//! Production implementations live in [`crate::scrapers`] and
//! [`crate::outputs`]; tests substitute in-memory stubs.

use crate::models::EnrichedRecord;
use serde_json::Value;
use std::error::Error;

/// Source of listing pages and article detail pages.
pub trait Aggregator {
    /// Fetch one page of raw search results starting at `offset`.
    ///
    /// Returns `Ok(None)` once the listing is exhausted. A connection failure
    /// also yields `Ok(None)`, so callers cannot tell the two apart.
    async fn fetch_page(&self, offset: u32) -> Result<Option<Vec<Value>>, Box<dyn Error>>;

    /// Fetch the raw markup of an article page, `None` on any failure.
    async fn fetch_detail(&self, url: &str) -> Option<String>;
}

/// Mail account able to deliver an HTML message.
pub trait MailTransport {
    /// Whether outbound (SMTP) delivery works for this account.
    async fn smtp_able(&self) -> bool;

    /// Whether inbound (POP) access works for this account.
    async fn pop_able(&self) -> bool;

    /// Send one HTML message, reporting whether the server accepted it.
    async fn send_html(&self, to: &str, subject: &str, html: &str)
    -> Result<bool, Box<dyn Error>>;
}

/// Archive for enriched records.
pub trait DocumentStore {
    /// Insert the record as a single document.
    async fn insert_one(&self, record: &EnrichedRecord) -> Result<(), Box<dyn Error>>;
}
