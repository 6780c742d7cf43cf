//! # Daily News Digest
//!
//! Harvests the day's news for a keyword from a content aggregator's search
//! API, mails a digest of the matches and archives every article with its
//! full text in MongoDB.
//!
//! ## Usage
//!
//! ```sh
//! MAIL_PASSWORD=... daily_news_digest -c news_digest.yaml
//! ```
//!
//! ## Architecture
//!
//! The job is a single sequential pass:
//! 1. **Listing**: page through the search API until it returns no data,
//!    keeping items published today
//! 2. **Digest**: render the kept items into HTML and mail it
//! 3. **Enrichment**: fetch each article page and decode its embedded body
//! 4. **Archive**: store each enriched record as one document

use clap::Parser;
use std::error::Error;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::Cli;
use config::Config;
use outputs::digest::DigestComposer;
use outputs::mail::SmtpPopMailer;
use outputs::store::MongoStore;
use pipeline::Pipeline;
use scrapers::AggregatorClient;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("daily_news_digest starting up");

    let args = Cli::parse();
    debug!(config = %args.config.display(), skip_email = args.skip_email, "Parsed CLI arguments");

    let mut config = Config::load_or_default(&args.config)?;
    if let Some(password) = args.mail_password {
        config.mail.password = password;
    }

    let aggregator = AggregatorClient::new(config.search.clone())?;
    let mailer = SmtpPopMailer::new(config.mail.clone());
    let store = MongoStore::new(config.store.clone());
    let composer = DigestComposer::from_dir(&config.digest.template_dir, config.digest.template_name.clone());
    info!(
        template_dir = %config.digest.template_dir,
        template = %config.digest.template_name,
        database = %config.store.database,
        collection = %config.store.collection,
        "Collaborators ready"
    );

    let pipeline = Pipeline::new(&aggregator, &mailer, &store, &composer, &config);
    let pipeline = if args.skip_email {
        pipeline.without_email()
    } else {
        pipeline
    };

    pipeline.run().await
}
