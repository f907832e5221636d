//! Product page parsing infrastructure
//!
//! One `SiteParser` per supported shop. Parsers never fail on missing page
//! elements; only fetching can fail.

pub mod config;
pub mod description;
pub mod gastro_hero_parser;
pub mod ggm_parser;
pub mod price;
pub mod url_extractor;

pub use config::{GastroHeroSelectors, GgmSelectors, MissingPrice};
pub use gastro_hero_parser::GastroHeroParser;
pub use ggm_parser::GgmParser;
pub use price::{PriceExtractor, normalize_price};
pub use url_extractor::extract_urls;

use async_trait::async_trait;
use scraper::Selector;
use tracing::debug;

use crate::domain::{ProductRow, ScrapedProduct, SourceKind};
use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

/// Row plus the image the page pointed at
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub row: ProductRow,
    pub image_url: Option<String>,
}

#[async_trait]
pub trait SiteParser: Send + Sync {
    fn source(&self) -> SourceKind;

    /// Retrieve the page HTML for `url`
    async fn fetch_document(&self, url: &str) -> ScrapeResult<String>;

    /// Extract product fields from page HTML
    fn parse_document(&self, html: &str) -> ScrapedProduct;

    /// Fetch and parse `url` into the row at `position`
    async fn extract(&self, url: &str, position: u32) -> ScrapeResult<Extraction> {
        let html = self.fetch_document(url).await?;
        let mut product = self.parse_document(&html);
        debug!(
            "Parsed {} page {}: article={:?}, price={:?}",
            self.source().manufacturer_tag(),
            url,
            product.article_number,
            product.unit_price
        );

        let image_url = product.image_url.take();
        Ok(Extraction {
            row: ProductRow::from_scraped(position, self.source(), &product),
            image_url,
        })
    }
}

/// Compile a configured selector string
pub(crate) fn compile_selector(field: &str, selector: &str) -> ScrapeResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| ScrapeError::configuration(format!("Invalid selector for {field} '{selector}': {e}")))
}

/// Compile a configured regex string
pub(crate) fn compile_pattern(field: &str, pattern: &str) -> ScrapeResult<regex::Regex> {
    regex::Regex::new(pattern)
        .map_err(|e| ScrapeError::configuration(format!("Invalid pattern for {field} '{pattern}': {e}")))
}

/// `img[src*="<host>"]` for a given asset host token
pub(crate) fn image_selector(host: &str) -> ScrapeResult<Selector> {
    compile_selector("image", &format!(r#"img[src*="{host}"]"#))
}
