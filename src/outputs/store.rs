//! Archiving of enriched records in MongoDB.

use crate::api::DocumentStore;
use crate::config::StoreConfig;
use crate::models::EnrichedRecord;
use mongodb::Client;
use std::error::Error;
use tracing::{error, info, instrument};

/// Insert `record` into the store, logging instead of propagating failures.
///
/// Returns whether the insert succeeded so the caller can keep count; a
/// failure never stops the run.
#[instrument(level = "info", skip_all, fields(url = %record.summary.article_url))]
pub async fn persist<S: DocumentStore>(store: &S, record: &EnrichedRecord) -> bool {
    match store.insert_one(record).await {
        Ok(()) => {
            info!("Stored record");
            true
        }
        Err(e) => {
            error!(error = %e, "Failed to store record");
            false
        }
    }
}

/// One collection in one MongoDB database.
///
/// A fresh client is opened for every insert.
#[derive(Debug, Clone)]
pub struct MongoStore {
    store: StoreConfig,
}

impl MongoStore {
    pub fn new(store: StoreConfig) -> Self {
        Self { store }
    }
}

impl DocumentStore for MongoStore {
    async fn insert_one(&self, record: &EnrichedRecord) -> Result<(), Box<dyn Error>> {
        let client = Client::with_uri_str(&self.store.uri).await?;
        let collection = client
            .database(&self.store.database)
            .collection::<EnrichedRecord>(&self.store.collection);
        collection.insert_one(record).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SummaryRecord;
    use std::cell::RefCell;

    struct FlakyStore {
        fail_on: &'static str,
        attempts: RefCell<Vec<String>>,
    }

    impl DocumentStore for FlakyStore {
        async fn insert_one(&self, record: &EnrichedRecord) -> Result<(), Box<dyn Error>> {
            self.attempts.borrow_mut().push(record.summary.title.clone());
            if record.summary.title == self.fail_on {
                return Err("duplicate key".into());
            }
            Ok(())
        }
    }

    fn record(title: &str) -> EnrichedRecord {
        EnrichedRecord::new(
            SummaryRecord {
                title: title.to_string(),
                published_at: "2018-08-21 10:00:00".to_string(),
                source: "s".to_string(),
                abstract_text: "a".to_string(),
                article_url: "https://www.toutiao.com/a/1/".to_string(),
            },
            None,
        )
    }

    #[tokio::test]
    async fn test_persist_reports_success() {
        let store = FlakyStore {
            fail_on: "",
            attempts: RefCell::new(Vec::new()),
        };
        assert!(persist(&store, &record("ok")).await);
        assert_eq!(*store.attempts.borrow(), ["ok"]);
    }

    #[tokio::test]
    async fn test_persist_swallows_errors() {
        let store = FlakyStore {
            fail_on: "bad",
            attempts: RefCell::new(Vec::new()),
        };
        assert!(!persist(&store, &record("bad")).await);
        assert!(persist(&store, &record("next")).await);
        assert_eq!(*store.attempts.borrow(), ["bad", "next"]);
    }
}
