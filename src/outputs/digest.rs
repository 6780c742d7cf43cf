//! Rendering of the daily digest e-mail.
//!
//! The digest is a Jinja template rendered with a single binding,
//! `news_list`, holding the day's [`SummaryRecord`]s. Each record exposes
//! `title`, `datetime`, `source`, `abstract` and `source_url`.

use crate::models::SummaryRecord;
use minijinja::{Environment, context, path_loader};
use std::error::Error;
use std::path::Path;
use tracing::{debug, instrument};

/// Renders [`SummaryRecord`]s into the HTML body of the digest.
pub struct DigestComposer {
    environment: Environment<'static>,
    template_name: String,
}

impl DigestComposer {
    /// Look templates up by name below `template_dir`.
    pub fn from_dir(template_dir: impl AsRef<Path>, template_name: impl Into<String>) -> Self {
        let mut environment = Environment::new();
        environment.set_loader(path_loader(template_dir));
        Self {
            environment,
            template_name: template_name.into(),
        }
    }

    /// Use an in-memory template.
    #[cfg(test)]
    pub fn from_source(
        template_name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, minijinja::Error> {
        let template_name = template_name.into();
        let mut environment = Environment::new();
        environment.add_template_owned(template_name.clone(), source.into())?;
        Ok(Self {
            environment,
            template_name,
        })
    }

    /// Render the digest for `records`.
    #[instrument(level = "info", skip_all, fields(template = %self.template_name, records = records.len()))]
    pub fn compose(&self, records: &[SummaryRecord]) -> Result<String, Box<dyn Error>> {
        let template = self.environment.get_template(&self.template_name)?;
        let html = template.render(context! { news_list => records })?;
        debug!(bytes = html.len(), "Rendered digest");
        Ok(html)
    }
}
