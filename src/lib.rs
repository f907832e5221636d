//! Quote Scraper - product quotation tables from shop pages
//!
//! Turns pasted product links from GGM Gastro and Gastro-Hero into
//! normalized quotation rows with cropped product images. The caller owns a
//! [`QuoteSession`] and hands it to [`QuotePipeline`] by `&mut`.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{BatchReport, FailedUrl, QuotePipeline};
pub use domain::{ProductImage, ProductRow, QuoteSession, SourceKind};
pub use infrastructure::{AppConfig, ScrapeError, init_logging_with_config};
