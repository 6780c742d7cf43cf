//! Aggregator search listing: paginated fetch and today's filter.
//!
//! The search endpoint is an AJAX API returning JSON of the shape
//! `{"data": [ {...}, {...} ], ...}`. Only `offset` changes between pages; an
//! empty or missing `data` field marks the end of the listing.

use crate::config::SearchConfig;
use crate::models::SummaryRecord;
use crate::utils::date_part;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Build the search URL for the page starting at `offset`.
pub fn search_url(search: &SearchConfig, offset: u32) -> Result<Url, Box<dyn Error>> {
    let mut url = Url::parse(&search.origin)?.join(&search.path)?;
    url.query_pairs_mut()
        .append_pair("offset", &offset.to_string())
        .append_pair("format", "json")
        .append_pair("keyword", &search.keyword)
        .append_pair("autoload", "true")
        .append_pair("count", &search.page_size.to_string())
        .append_pair("cur_tab", "1")
        .append_pair("from", "search_tab");
    Ok(url)
}

/// Fetch one listing page.
///
/// Returns `Ok(None)` when the listing is exhausted, when the server answers
/// with anything but 200, and when the transfer fails (refused, reset or
/// closed before the response completed). A 200 response whose body is not
/// JSON is an error, as is a request that cannot be built.
#[instrument(level = "info", skip(client, search))]
pub async fn fetch_listing_page(
    client: &Client,
    search: &SearchConfig,
    offset: u32,
) -> Result<Option<Vec<Value>>, Box<dyn Error>> {
    let url = search_url(search, offset)?;
    debug!(%url, "Requesting listing page");

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) if e.is_builder() => return Err(e.into()),
        Err(e) => {
            warn!(error = %e, "Listing request failed; treating as end of listing");
            return Ok(None);
        }
    };

    let status = response.status();
    if status != StatusCode::OK {
        warn!(%status, "Listing request was not answered with 200");
        return Ok(None);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Listing body was cut off; treating as end of listing");
            return Ok(None);
        }
    };
    parse_listing_body(&body)
}

/// Pull the `data` array out of a listing response body.
pub fn parse_listing_body(body: &str) -> Result<Option<Vec<Value>>, Box<dyn Error>> {
    let mut document: Value = serde_json::from_str(body)?;
    match document.get_mut("data").map(Value::take) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) if items.is_empty() => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(other) => Err(format!("listing `data` field is not an array: {other}").into()),
    }
}

/// Keep the items published on `reference_date` and map them to summaries.
///
/// An item is kept only if it has a non-empty `source_url`, a non-empty
/// `datetime` and that datetime falls on `reference_date`. Everything else is
/// dropped silently. Order is preserved.
///
/// A kept item without a `title`, `source` or `abstract` key is an error.
pub fn filter_listing(
    items: &[Value],
    reference_date: NaiveDate,
    origin: &str,
) -> Result<Vec<SummaryRecord>, Box<dyn Error>> {
    let today = reference_date.format("%Y-%m-%d").to_string();
    let mut records = Vec::new();

    for item in items {
        let Some(path) = non_empty_str(item, "source_url") else {
            continue;
        };
        let Some(datetime) = non_empty_str(item, "datetime") else {
            continue;
        };
        if date_part(datetime) != Some(today.as_str()) {
            continue;
        }

        records.push(SummaryRecord {
            title: required_text(item, "title")?,
            published_at: datetime.to_string(),
            source: required_text(item, "source")?,
            abstract_text: required_text(item, "abstract")?,
            article_url: format!("{origin}{path}"),
        });
    }

    info!(
        received = items.len(),
        kept = records.len(),
        dropped = items.len() - records.len(),
        "Filtered listing page"
    );
    Ok(records)
}

fn non_empty_str<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

fn required_text(item: &Value, key: &str) -> Result<String, Box<dyn Error>> {
    match item.get(key) {
        None => Err(format!("listing item is missing the `{key}` field").into()),
        Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Ok(other.to_string()),
    }
}
