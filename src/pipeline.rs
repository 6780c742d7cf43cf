//! The daily run: collect, notify, enrich, persist.
//!
//! ```text
//! paginate ──► filter (per page) ──► compose ──► notify
//!                                                  │
//!            persist ◄── extract ◄── fetch detail ◄┘  (per record, in order)
//! ```
//!
//! Every step runs sequentially on the calling task. Only listing JSON that
//! cannot be parsed, a kept item with missing fields, or a broken template
//! aborts the run; every other failure is logged and the run moves on.

use crate::api::{Aggregator, DocumentStore, MailTransport};
use crate::config::Config;
use crate::models::{EnrichedRecord, SummaryRecord};
use crate::outputs::digest::DigestComposer;
use crate::outputs::mail::notify;
use crate::outputs::store::persist;
use crate::scrapers::detail::extract_article;
use crate::scrapers::listing::filter_listing;
use crate::utils::{local_today, truncate_for_log};
use chrono::NaiveDate;
use std::error::Error;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// One configured run of the digest job.
pub struct Pipeline<'a, A, M, S> {
    aggregator: &'a A,
    mailer: &'a M,
    store: &'a S,
    composer: &'a DigestComposer,
    config: &'a Config,
    send_email: bool,
}

impl<'a, A, M, S> Pipeline<'a, A, M, S>
where
    A: Aggregator,
    M: MailTransport,
    S: DocumentStore,
{
    pub fn new(
        aggregator: &'a A,
        mailer: &'a M,
        store: &'a S,
        composer: &'a DigestComposer,
        config: &'a Config,
    ) -> Self {
        Self {
            aggregator,
            mailer,
            store,
            composer,
            config,
            send_email: true,
        }
    }

    /// Compose the digest but don't send it.
    pub fn without_email(mut self) -> Self {
        self.send_email = false;
        self
    }

    /// Run the whole job against today's local date.
    #[instrument(level = "info", skip_all, fields(keyword = %self.config.search.keyword))]
    pub async fn run(&self) -> Result<(), Box<dyn Error>> {
        let started = Instant::now();

        let records = self.collect(local_today).await?;
        info!(count = records.len(), "Collected today's news");

        let html = self.composer.compose(&records)?;
        if self.send_email {
            let mail = &self.config.mail;
            if notify(self.mailer, &mail.recipient, &mail.subject, &html).await {
                info!(recipient = %mail.recipient, "Digest e-mail delivered");
            }
        } else {
            info!("E-mail disabled; digest not sent");
            debug!(preview = %truncate_for_log(&html, 300), "Digest");
        }

        let collected = records.len();
        let (persisted, failed) = self.enrich(records).await;

        let elapsed = started.elapsed();
        info!(
            collected,
            persisted,
            failed,
            secs = elapsed.as_secs(),
            millis = elapsed.subsec_millis(),
            "Run complete"
        );
        Ok(())
    }

    /// Page through the listing until it runs dry, keeping today's items.
    ///
    /// `today` is consulted once per page, at the moment that page is
    /// filtered.
    pub async fn collect(
        &self,
        today: impl Fn() -> NaiveDate,
    ) -> Result<Vec<SummaryRecord>, Box<dyn Error>> {
        let search = &self.config.search;
        let mut offset = 0;
        let mut records = Vec::new();

        while let Some(items) = self.aggregator.fetch_page(offset).await? {
            info!(
                page = offset / search.page_size,
                items = items.len(),
                "Received listing page"
            );
            records.extend(filter_listing(&items, today(), &search.origin)?);

            sleep(search.page_delay()).await;
            offset += search.page_size;
        }

        info!(offset, "Listing exhausted");
        Ok(records)
    }

    /// Fetch, decode and persist every record, one after the other.
    ///
    /// Returns how many records were stored and how many failed to store.
    pub async fn enrich(&self, records: Vec<SummaryRecord>) -> (usize, usize) {
        let mut persisted = 0;
        let mut failed = 0;

        for summary in records {
            let article_text = match self.aggregator.fetch_detail(&summary.article_url).await {
                Some(html) => extract_article(&html),
                None => None,
            };
            if article_text.is_none() {
                warn!(url = %summary.article_url, "No article text extracted");
            }

            let record = EnrichedRecord::new(summary, article_text);
            if persist(self.store, &record).await {
                persisted += 1;
            } else {
                failed += 1;
            }
        }

        (persisted, failed)
    }
}
