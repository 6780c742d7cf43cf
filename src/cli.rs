//! Command-line interface definitions for the daily news digest.
//!
//! Everything about the run lives in the YAML configuration; the command line
//! only points at it and carries the mail password so it can stay off disk.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Use ./news_digest.yaml
/// daily_news_digest
///
/// # Explicit config, password from the environment
/// MAIL_PASSWORD=... daily_news_digest -c /etc/news_digest.yaml
///
/// # Archive only
/// daily_news_digest --skip-email
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "news_digest.yaml")]
    pub config: PathBuf,

    /// Password of the sending mail account (overrides the config file)
    #[arg(long, env = "MAIL_PASSWORD", hide_env_values = true)]
    pub mail_password: Option<String>,

    /// Collect and archive without sending the digest e-mail
    #[arg(long)]
    pub skip_email: bool,
}
