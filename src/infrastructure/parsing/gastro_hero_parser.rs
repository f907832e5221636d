//! Gastro-Hero product pages
//!
//! Product data is filled in client-side, so pages go through the remote
//! renderer before parsing.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;

use super::config::GastroHeroSelectors;
use super::description::section_after_heading_text;
use super::price::PriceExtractor;
use super::{SiteParser, compile_pattern, compile_selector, image_selector};
use crate::domain::{ScrapedProduct, SourceKind};
use crate::infrastructure::parsing_error::ScrapeResult;
use crate::infrastructure::render_client::RenderClient;

pub struct GastroHeroParser {
    renderer: Arc<RenderClient>,
    article_number: Selector,
    title: Selector,
    description_container: Selector,
    description_content: Selector,
    price_display: Selector,
    price_extractor: PriceExtractor,
    image: Selector,
    selectors: GastroHeroSelectors,
}

impl GastroHeroParser {
    pub fn new(renderer: Arc<RenderClient>) -> ScrapeResult<Self> {
        Self::with_selectors(renderer, GastroHeroSelectors::default())
    }

    pub fn with_selectors(renderer: Arc<RenderClient>, selectors: GastroHeroSelectors) -> ScrapeResult<Self> {
        Ok(Self {
            renderer,
            article_number: compile_selector("article_number", &selectors.article_number)?,
            title: compile_selector("title", &selectors.title)?,
            description_container: compile_selector("description_container", &selectors.description_container)?,
            description_content: compile_selector("description_content", &selectors.description_content)?,
            price_display: compile_selector("price_display", &selectors.price_display)?,
            price_extractor: PriceExtractor::new(compile_pattern("price", &selectors.price_pattern)?),
            image: image_selector(&selectors.image_host)?,
            selectors,
        })
    }

    fn first_text(document: &Html, selector: &Selector) -> Option<String> {
        document
            .select(selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
    }

    fn extract_description(&self, document: &Html) -> String {
        let content = document
            .select(&self.description_container)
            .next()
            .and_then(|container| container.select(&self.description_content).next());

        section_after_heading_text(content, &self.selectors.description_start_phrase)
    }

    /// Price from the display box's own text nodes.
    ///
    /// Text nested in child elements (struck-through list prices, unit
    /// prices) is ignored. No box or no currency text means no price.
    fn extract_price(&self, document: &Html) -> Option<f64> {
        let display = document.select(&self.price_display).next()?;
        let raw = direct_text_nodes(display)
            .map(str::trim)
            .find(|text| text.contains(self.selectors.currency_symbol.as_str()))?;
        self.price_extractor.extract(raw)
    }
}

fn direct_text_nodes<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    element
        .children()
        .filter_map(|child| child.value().as_text().map(|text| &**text))
}

#[async_trait]
impl SiteParser for GastroHeroParser {
    fn source(&self) -> SourceKind {
        SourceKind::GastroHero
    }

    async fn fetch_document(&self, url: &str) -> ScrapeResult<String> {
        self.renderer.render(url).await
    }

    fn parse_document(&self, html: &str) -> ScrapedProduct {
        let document = Html::parse_document(html);

        let article_number = Self::first_text(&document, &self.article_number);
        let title = Self::first_text(&document, &self.title).unwrap_or_default();
        let description = self.extract_description(&document);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::render_client::RenderApiConfig;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <h1> Kombidämpfer 10x GN 1/1 </h1>
  <span class="inner-sku"> GH-100234 </span>
  <div class="buy-box-price__display">
    <span class="strike">3.199,00 €</span>
    2.849,95 €
    <div class="unit">zzgl. MwSt.</div>
  </div>
  <img src="https://api.gastro-hero.de/media/kombi.jpg">
  <div data-tracking="product.tab-container.description">
    <div class="tab-content tab-content--have-gradient">
      <p>Einleitung</p>
      <p><strong>Produktvorteile im Überblick</strong></p>
      <ul><li>Kurz</li></ul>
      <p>Leistungsstark und sparsam.</p>
      <ul><li>10 Einschübe</li><li>Reinigungsprogramm</li></ul>
    </div>
  </div>
</body></html>"#;

    fn parser() -> GastroHeroParser {
        let renderer = Arc::new(RenderClient::new(RenderApiConfig::default()).unwrap());
        GastroHeroParser::new(renderer).unwrap()
    }

    #[test]
    fn test_parse_rendered_page() {
        let product = parser().parse_document(PAGE);

        assert_eq!(product.article_number.as_deref(), Some("GH-100234"));
        assert_eq!(product.title, "Kombidämpfer 10x GN 1/1");
        assert_eq!(
            product.description,
            "Leistungsstark und sparsam.\n• 10 Einschübe\n• Reinigungsprogramm"
        );
        assert_eq!(product.unit_price, Some(2849.95));
        assert_eq!(product.image_url.as_deref(), Some("https://api.gastro-hero.de/media/kombi.jpg"));
    }

    #[test]
    fn test_price_ignores_nested_compare_price() {
        let page = PAGE.replace("2.849,95 €", "");
        assert_eq!(parser().parse_document(&page).unit_price, None);
    }

    #[test]
    fn test_missing_price_box_is_null() {
        let page = PAGE.replace("buy-box-price__display", "something-else");
        assert_eq!(parser().parse_document(&page).unit_price, None);
    }

    #[test]
    fn test_missing_description_heading_is_empty() {
        let page = PAGE.replace("Produktvorteile im Überblick", "Technische Daten");
        assert_eq!(parser().parse_document(&page).description, "");
    }

    #[test]
    fn test_empty_page_yields_empty_fields() {
        let product = parser().parse_document("<html></html>");

        assert_eq!(product, ScrapedProduct::default());
    }
}
