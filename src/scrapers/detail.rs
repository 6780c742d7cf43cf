//! Article detail pages.
//!
//! The aggregator does not render the article body as markup. It ships it
//! inside a script block as an entity-escaped string literal:
//!
//! ```text
//! articleInfo: {
//!     title: '...',
//!     content: '&lt;div&gt;&lt;p&gt;First paragraph&lt;/p&gt;...&lt;/div&gt;',
//!     groupId: '6592...',
//! ```
//!
//! [`extract_article`] pulls that literal out, unescapes the angle brackets,
//! drops image containers and flattens what is left to text. It is tied to
//! this one page layout; a miss yields `None` and the caller carries on.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode};
use scraper::Html;
use tracing::{debug, instrument, warn};

static ARTICLE_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)articleInfo:.*?content: '(.*?&gt;)',.*?groupId:")
        .expect("article content pattern is valid")
});

// Matches up to the first closing div, so nested divs are only partly removed.
static DIV_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<div class.*?/div>").expect("div block pattern is valid"));

/// Fetch the raw markup of an article page.
///
/// Anything other than a 200 response with a readable body yields `None`.
#[instrument(level = "info", skip(client))]
pub async fn fetch_detail_page(client: &Client, url: &str) -> Option<String> {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Detail request failed");
            return None;
        }
    };

    let status = response.status();
    if status != StatusCode::OK {
        warn!(%status, "Detail request was not answered with 200");
        return None;
    }

    match response.text().await {
        Ok(body) => {
            debug!(bytes = body.len(), "Fetched detail page");
            Some(body)
        }
        Err(e) => {
            warn!(error = %e, "Failed to read detail body");
            None
        }
    }
}

/// Decode the embedded article of a detail page into plain text.
///
/// Text nodes are joined with newlines. Returns `None` when the page does not
/// carry the embedded `articleInfo` block.
pub fn extract_article(raw_html: &str) -> Option<String> {
    let captured = ARTICLE_CONTENT.captures(raw_html)?.get(1)?.as_str();

    let markup = captured.replace("&lt;", "<").replace("&gt;", ">");
    let markup = DIV_BLOCK.replace_all(&markup, "");

    let fragment = Html::parse_fragment(&markup);
    Some(fragment.root_element().text().join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::test_server::{client, refused_origin, response, serve_once};

    fn page(content: &str) -> String {
        format!(
            "<html><head><script>\nvar BASE_DATA = {{\n  articleInfo: {{\n    title: 'x',\n    content: '{content}',\n    groupId: '6592',\n  }}\n}};\n</script></head><body></body></html>"
        )
    }

    #[test]
    fn test_extracts_single_paragraph() {
        let html = "articleInfo: foo, content: '&lt;p&gt;Hello&lt;/p&gt;', groupId: bar";
        assert_eq!(extract_article(html).as_deref(), Some("Hello"));
    }

    #[test]
    fn test_missing_block_yields_none() {
        assert_eq!(extract_article("<html><body><p>Hello</p></body></html>"), None);
        assert_eq!(extract_article("articleInfo: foo, title: 'x', groupId: bar"), None);
        assert_eq!(extract_article(""), None);
    }

    #[test]
    fn test_joins_text_nodes_with_newlines() {
        let html = page("&lt;p&gt;One&lt;/p&gt;&lt;p&gt;Two &lt;strong&gt;bold&lt;/strong&gt;&lt;/p&gt;");
        assert_eq!(extract_article(&html).as_deref(), Some("One\nTwo \nbold"));
    }

    #[test]
    fn test_spans_newlines_between_markers() {
        let html = page("&lt;p&gt;Body&lt;/p&gt;");
        assert!(html.contains('\n'));
        assert_eq!(extract_article(&html).as_deref(), Some("Body"));
    }

    #[test]
    fn test_strips_image_containers() {
        let html = page(
            "&lt;div class=&quot;pgc-img&quot;&gt;&lt;img src=&quot;a.jpg&quot;&gt;&lt;p class=&quot;pgc-img-caption&quot;&gt;caption&lt;/p&gt;&lt;/div&gt;&lt;p&gt;Text&lt;/p&gt;",
        );
        assert_eq!(extract_article(&html).as_deref(), Some("Text"));
    }

    #[test]
    fn test_strips_image_containers_across_lines() {
        let html = page("&lt;div class=&quot;pgc-img&quot;&gt;\nimage\n&lt;/div&gt;&lt;p&gt;After&lt;/p&gt;");
        assert_eq!(extract_article(&html).as_deref(), Some("After"));
    }

    #[test]
    fn test_only_angle_bracket_entities_are_decoded_before_parsing() {
        // `&amp;` survives the substitution and is decoded by the HTML parser.
        let html = page("&lt;p&gt;Tom &amp;amp; Jerry&lt;/p&gt;");
        assert_eq!(extract_article(&html).as_deref(), Some("Tom &amp; Jerry"));
    }

    #[test]
    fn test_capture_stops_at_first_quote_after_closing_entity() {
        let html = "articleInfo: a, content: '&lt;p&gt;First&lt;/p&gt;', title: 'y', content: '&lt;p&gt;Second&lt;/p&gt;', groupId: z";
        assert_eq!(extract_article(html).as_deref(), Some("First"));
    }

    #[tokio::test]
    async fn test_fetch_detail_page_returns_body() {
        let (origin, server) = serve_once(response("200 OK", &page("&lt;p&gt;Hi&lt;/p&gt;"))).await;
        let body = fetch_detail_page(&client(), &format!("{origin}/a/6592/"))
            .await
            .unwrap();
        assert_eq!(extract_article(&body).as_deref(), Some("Hi"));
        assert!(server.await.unwrap().starts_with("GET /a/6592/ "));
    }

    #[tokio::test]
    async fn test_fetch_detail_page_non_200_is_none() {
        let (origin, _server) = serve_once(response("404 Not Found", "gone")).await;
        assert_eq!(fetch_detail_page(&client(), &format!("{origin}/a/1/")).await, None);
    }

    #[tokio::test]
    async fn test_fetch_detail_page_refused_connection_is_none() {
        let origin = refused_origin().await;
        assert_eq!(fetch_detail_page(&client(), &format!("{origin}/a/1/")).await, None);
    }

    #[tokio::test]
    async fn test_fetch_detail_page_connection_closed_before_reply_is_none() {
        let (origin, _server) = serve_once(String::new()).await;
        assert_eq!(fetch_detail_page(&client(), &format!("{origin}/a/1/")).await, None);
    }
}
