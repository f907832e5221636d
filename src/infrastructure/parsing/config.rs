//! Parsing configuration for product page extraction
//!
//! Centralized CSS selectors and patterns per supported shop.

use serde::{Deserialize, Serialize};

/// What a parser reports when no price could be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPrice {
    /// Report `0.0`
    Zero,
    /// Leave the price empty
    Null,
}

impl MissingPrice {
    pub fn apply(self, price: Option<f64>) -> Option<f64> {
        match (price, self) {
            (Some(price), _) => Some(price),
            (None, Self::Zero) => Some(0.0),
            (None, Self::Null) => None,
        }
    }
}

/// Selectors for GGM Gastro product pages (plain HTML)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GgmSelectors {
    /// Element whose text holds "Art.-Nr. <value>"
    pub article_number: String,
    pub article_number_pattern: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub price_pattern: String,
    /// Host token an image `src` must contain
    pub image_host: String,
    pub missing_price: MissingPrice,
}

impl Default for GgmSelectors {
    fn default() -> Self {
        Self {
            article_number: r#"div[class="text-sm font-light text-[#332e2e]"]"#.to_string(),
            article_number_pattern: r"Art\.-Nr\.\s*([\S\s]+)".to_string(),
            title: "h1".to_string(),
            description: "div.ggmDescription".to_string(),
            price: r#"span[class*="product-text-shadow"]"#.to_string(),
            price_pattern: r"(\d{1,3}(?:\.\d{3})*,\d{2})".to_string(),
            image_host: "ggm.bynder.com".to_string(),
            missing_price: MissingPrice::Zero,
        }
    }
}

/// Selectors for Gastro-Hero product pages (browser rendered)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GastroHeroSelectors {
    pub article_number: String,
    pub title: String,
    pub description_container: String,
    pub description_content: String,
    /// Heading that opens the wanted description section, compared lowercase
    pub description_start_phrase: String,
    pub price_display: String,
    pub currency_symbol: String,
    pub price_pattern: String,
    pub image_host: String,
    pub missing_price: MissingPrice,
}

impl Default for GastroHeroSelectors {
    fn default() -> Self {
        Self {
            article_number: "span.inner-sku".to_string(),
            title: "h1".to_string(),
            description_container: r#"div[data-tracking="product.tab-container.description"]"#.to_string(),
            description_content: ".tab-content--have-gradient".to_string(),
            description_start_phrase: "produktvorteile im überblick".to_string(),
            price_display: "div.buy-box-price__display".to_string(),
            currency_symbol: "€".to_string(),
            price_pattern: r"[\d.,]+".to_string(),
            image_host: "api.gastro-hero.de".to_string(),
            missing_price: MissingPrice::Null,
        }
    }
}
