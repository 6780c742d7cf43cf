//! Scraping of the news aggregator.
//!
//! Scraping happens in two phases, mirroring how the site is built:
//!
//! 1. **Listing**: the search API is paged by `offset` until it runs dry and
//!    every page is filtered down to today's items ([`listing`]).
//! 2. **Detail**: each kept item's article page is downloaded and its
//!    embedded article body decoded to text ([`detail`]).
//!
//! [`AggregatorClient`] ties both to one HTTP client so every request carries
//! the configured browser user agent.

pub mod detail;
pub mod listing;
#[cfg(test)]
mod test_server;

use crate::api::Aggregator;
use crate::config::SearchConfig;
use reqwest::Client;
use serde_json::Value;
use std::error::Error;

/// HTTP client for the aggregator's search API and article pages.
///
/// No request timeout is set: a stalled server stalls the run.
#[derive(Debug, Clone)]
pub struct AggregatorClient {
    client: Client,
    search: SearchConfig,
}

impl AggregatorClient {
    pub fn new(search: SearchConfig) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder().user_agent(&search.user_agent).build()?;
        Ok(Self { client, search })
    }
}

impl Aggregator for AggregatorClient {
    async fn fetch_page(&self, offset: u32) -> Result<Option<Vec<Value>>, Box<dyn Error>> {
        listing::fetch_listing_page(&self.client, &self.search, offset).await
    }

    async fn fetch_detail(&self, url: &str) -> Option<String> {
        detail::fetch_detail_page(&self.client, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::test_server::{response, serve_once};

    #[tokio::test]
    async fn test_requests_carry_configured_user_agent() {
        let (origin, server) = serve_once(response("200 OK", "<html></html>")).await;
        let search = SearchConfig {
            origin: origin.clone(),
            user_agent: "digest-test-agent/1.0".to_string(),
            ..SearchConfig::default()
        };
        let aggregator = AggregatorClient::new(search).unwrap();

        let body = aggregator.fetch_detail(&format!("{origin}/a/1/")).await;
        assert_eq!(body.as_deref(), Some("<html></html>"));

        let head = server.await.unwrap().to_ascii_lowercase();
        assert!(head.contains("user-agent: digest-test-agent/1.0\r\n"));
    }
}
