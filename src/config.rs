//! Run configuration loaded from a YAML file.
//!
//! Every section falls back to defaults, so a file only needs the values that
//! differ (typically the mail account). The mail password may instead come
//! from the `MAIL_PASSWORD` environment variable via the CLI.
//!
//! ```yaml
//! search:
//!   keyword: 西安教育
//!   page_delay_secs: 3
//! mail:
//!   sender: someone@163.com
//!   recipient: reader@example.com
//! store:
//!   uri: mongodb://localhost:27017
//! ```

use serde::Deserialize;
use std::fmt;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument, warn};
use url::Url;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/68.0.3440.106 Safari/537.36";

/// Top-level configuration handed to the pipeline at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub mail: MailConfig,
    pub digest: DigestConfig,
    pub store: StoreConfig,
}

/// Aggregator search settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Scheme and host of the aggregator, also prefixed to article paths.
    pub origin: String,
    /// Path of the search endpoint below `origin`.
    pub path: String,
    pub keyword: String,
    pub page_size: u32,
    /// Pause between two listing requests.
    pub page_delay_secs: u64,
    /// Sent on every request; the aggregator rejects obvious bots.
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            origin: "https://www.toutiao.com".to_string(),
            path: "/search_content/".to_string(),
            keyword: "西安教育".to_string(),
            page_size: 20,
            page_delay_secs: 3,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl SearchConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_secs(self.page_delay_secs)
    }
}

/// Mail account used to send the digest.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub sender: String,
    pub password: String,
    pub recipient: String,
    pub subject: String,
    /// Defaults to `smtp.<sender domain>`.
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    /// Defaults to `pop.<sender domain>`.
    pub pop_host: Option<String>,
    pub pop_port: u16,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: String::new(),
            password: String::new(),
            recipient: String::new(),
            subject: "***youker每日新闻推送服务***".to_string(),
            smtp_host: None,
            smtp_port: 465,
            pop_host: None,
            pop_port: 995,
        }
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .field("recipient", &self.recipient)
            .field("subject", &self.subject)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("pop_host", &self.pop_host)
            .field("pop_port", &self.pop_port)
            .finish()
    }
}

impl MailConfig {
    fn sender_domain(&self) -> Option<&str> {
        self.sender
            .rsplit_once('@')
            .map(|(_, domain)| domain)
            .filter(|domain| !domain.is_empty())
    }

    /// Outbound host, derived from the sender's domain unless configured.
    pub fn smtp_host(&self) -> Option<String> {
        self.smtp_host
            .clone()
            .or_else(|| self.sender_domain().map(|d| format!("smtp.{d}")))
    }

    /// Inbound host, derived from the sender's domain unless configured.
    pub fn pop_host(&self) -> Option<String> {
        self.pop_host
            .clone()
            .or_else(|| self.sender_domain().map(|d| format!("pop.{d}")))
    }
}

/// Location of the digest template.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    pub template_dir: String,
    pub template_name: String,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            template_dir: "templates".to_string(),
            template_name: "email_content.html".to_string(),
        }
    }
}

/// Document store endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "news_spider_db".to_string(),
            collection: "news".to_string(),
        }
    }
}

impl Config {
    /// Parse a configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, Box<dyn Error>> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration file at `path`, or defaults if it doesn't exist.
    ///
    /// A file that exists but fails to parse is an error.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load_or_default(path: &Path) -> Result<Self, Box<dyn Error>> {
        if !path.exists() {
            warn!("Configuration file not found; using defaults");
            let config = Config::default();
            config.validate()?;
            return Ok(config);
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)?;
        info!(keyword = %config.search.keyword, "Loaded configuration");
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.search.page_size == 0 {
            return Err("search.page_size must be greater than zero".into());
        }
        if self.search.keyword.trim().is_empty() {
            return Err("search.keyword must not be empty".into());
        }
        let origin = Url::parse(&self.search.origin)
            .map_err(|e| format!("search.origin {:?} is not a URL: {e}", self.search.origin))?;
        if origin.cannot_be_a_base() {
            return Err(format!("search.origin {:?} is not an absolute URL", self.search.origin).into());
        }
        Ok(())
    }
}
