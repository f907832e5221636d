//! GGM Gastro product pages
//!
//! Pages are server-rendered, so a plain GET is enough.

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::debug;

use super::config::GgmSelectors;
use super::description::headed_sections_text;
use super::price::PriceExtractor;
use super::{SiteParser, compile_pattern, compile_selector, image_selector};
use crate::domain::{ScrapedProduct, SourceKind};
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::parsing_error::ScrapeResult;

pub struct GgmParser {
    http: Arc<HttpClient>,
    article_number: Selector,
    article_number_pattern: Regex,
    title: Selector,
    description: Selector,
    price: Selector,
    price_extractor: PriceExtractor,
    image: Selector,
    selectors: GgmSelectors,
}

impl GgmParser {
    pub fn new(http: Arc<HttpClient>) -> ScrapeResult<Self> {
        Self::with_selectors(http, GgmSelectors::default())
    }

    pub fn with_selectors(http: Arc<HttpClient>, selectors: GgmSelectors) -> ScrapeResult<Self> {
        Ok(Self {
            http,
            article_number: compile_selector("article_number", &selectors.article_number)?,
            article_number_pattern: compile_pattern("article_number", &selectors.article_number_pattern)?,
            title: compile_selector("title", &selectors.title)?,
            description: compile_selector("description", &selectors.description)?,
            price: compile_selector("price", &selectors.price)?,
            price_extractor: PriceExtractor::new(compile_pattern("price", &selectors.price_pattern)?),
            image: image_selector(&selectors.image_host)?,
            selectors,
        })
    }

    fn extract_article_number(&self, document: &Html) -> Option<String> {
        let text = document
            .select(&self.article_number)
            .next()
            .map(|element| element.text().collect::<String>())?;

        self.article_number_pattern
            .captures(&text)
            .and_then(|captures| captures.get(1))
            .map(|value| value.as_str().trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn extract_price(&self, document: &Html) -> Option<f64> {
        let text = document
            .select(&self.price)
            .next()
            .map(|element| element.text().collect::<String>())?;
        self.price_extractor.extract(text.trim())
    }
}

#[async_trait]
impl SiteParser for GgmParser {
    fn source(&self) -> SourceKind {
        SourceKind::GgmGastro
    }

    async fn fetch_document(&self, url: &str) -> ScrapeResult<String> {
        self.http.get_text(url).await
    }

    fn parse_document(&self, html: &str) -> ScrapedProduct {
        let document = Html::parse_document(html);

        let article_number = self.extract_article_number(&document);
        if article_number.is_none() {
            debug!("No article number found on GGM page");
        }

        let title = document
            .select(&self.title)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let description = headed_sections_text(document.select(&self.description).next());

        let unit_price = self.selectors.missing_price.apply(self.extract_price(&document));

        let image_url = document
            .select(&self.image)
            .next()
            .and_then(|element| element.value().attr("src"))
            .map(str::to_string);

        ScrapedProduct {
            article_number,
            title,
            description,
            unit_price,
            image_url,
        }
    }
}
