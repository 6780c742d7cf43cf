//! Everything the pipeline produces for the outside world.
//!
//! # Submodules
//!
//! - [`digest`]: renders the day's summaries into the HTML digest
//! - [`mail`]: checks the mail account and sends the digest
//! - [`store`]: archives each enriched record in MongoDB

pub mod digest;
pub mod mail;
pub mod store;
