use serde::{Deserialize, Serialize};
use std::fmt;

use super::source::SourceKind;

/// Manufacturer column value, one tag per supported source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManufacturerTag {
    #[serde(rename = "GGM")]
    Ggm,
    #[serde(rename = "GH")]
    GastroHero,
}

impl ManufacturerTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ggm => "GGM",
            Self::GastroHero => "GH",
        }
    }
}

impl fmt::Display for ManufacturerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw fields pulled from a product page before they become a table row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedProduct {
    pub article_number: Option<String>,
    pub title: String,
    pub description: String,
    pub unit_price: Option<f64>,
    pub image_url: Option<String>,
}

/// One line item of the quotation table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRow {
    pub position: Option<u32>,
    pub secondary_position: Option<String>,
    pub article_number: Option<String>,
    pub title: String,
    pub description: String,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub total_price: Option<f64>,
    pub manufacturer_tag: ManufacturerTag,
    pub is_alternative: bool,
}

impl ProductRow {
    /// Empty row for a source, quantity 1 and nothing else filled in
    pub const fn new(position: u32, manufacturer_tag: ManufacturerTag) -> Self {
        Self {
            position: Some(position),
            secondary_position: None,
            article_number: None,
            title: String::new(),
            description: String::new(),
            quantity: Some(1.0),
            unit_price: None,
            total_price: None,
            manufacturer_tag,
            is_alternative: false,
        }
    }

    /// Build the canonical row for freshly scraped fields.
    ///
    /// `total_price` starts out equal to `unit_price`; the quantity-aware
    /// total is only applied when edits are committed.
    pub fn from_scraped(position: u32, source: SourceKind, product: &ScrapedProduct) -> Self {
        Self {
            article_number: product.article_number.clone(),
            title: product.title.trim().to_string(),
            description: product.description.clone(),
            unit_price: product.unit_price,
            total_price: product.unit_price,
            ..Self::new(position, source.manufacturer_tag())
        }
    }

    /// Recompute `total_price` from quantity and unit price
    pub fn recompute_total(&mut self) {
        self.total_price = match (self.quantity, self.unit_price) {
            (_, None) => None,
            (None, Some(price)) => Some(price),
            (Some(quantity), Some(price)) if quantity == 0.0 => Some(price),
            (Some(quantity), Some(price)) => Some(quantity * price),
        };
    }

    /// Names of required columns that are empty on this row
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.position.is_none() {
            missing.push("position");
        }
        if self.article_number.as_deref().is_none_or(|value| value.trim().is_empty()) {
            missing.push("article_number");
        }
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.unit_price.is_none_or(f64::is_nan) {
            missing.push("unit_price");
        }
        missing
    }

    /// Registry key for this row's image, if it has a usable article number
    pub fn image_key(&self) -> Option<&str> {
        self.article_number
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraped(price: Option<f64>) -> ScrapedProduct {
        ScrapedProduct {
            article_number: Some("ABC-1".to_string()),
            title: "  Kühlschrank  ".to_string(),
            description: "• Edelstahl".to_string(),
            unit_price: price,
            image_url: None,
        }
    }

    #[test]
    fn test_from_scraped_sets_total_equal_to_unit_price() {
        let row = ProductRow::from_scraped(3, SourceKind::GgmGastro, &scraped(Some(12.5)));

        assert_eq!(row.position, Some(3));
        assert_eq!(row.title, "Kühlschrank");
        assert_eq!(row.quantity, Some(1.0));
        assert_eq!(row.unit_price, Some(12.5));
        assert_eq!(row.total_price, Some(12.5));
        assert_eq!(row.manufacturer_tag, ManufacturerTag::Ggm);
        assert!(row.secondary_position.is_none());
        assert!(!row.is_alternative);
    }

    #[test]
    fn test_recompute_total_uses_quantity() {
        let mut row = ProductRow::from_scraped(1, SourceKind::GastroHero, &scraped(Some(10.0)));
        row.quantity = Some(3.0);
        row.recompute_total();
        assert_eq!(row.total_price, Some(30.0));

        row.recompute_total();
        assert_eq!(row.total_price, Some(30.0));
    }

    #[test]
    fn test_recompute_total_falls_back_to_unit_price() {
        let mut row = ProductRow::from_scraped(1, SourceKind::GastroHero, &scraped(Some(7.25)));
        row.quantity = Some(0.0);
        row.recompute_total();
        assert_eq!(row.total_price, Some(7.25));

        row.quantity = None;
        row.recompute_total();
        assert_eq!(row.total_price, Some(7.25));

        row.unit_price = None;
        row.recompute_total();
        assert_eq!(row.total_price, None);
    }

    #[test]
    fn test_missing_required_fields() {
        let mut row = ProductRow::new(1, ManufacturerTag::GastroHero);
        assert_eq!(
            row.missing_required_fields(),
            vec!["article_number", "title", "unit_price"]
        );

        row.article_number = Some("  ".to_string());
        row.title = "Spülmaschine".to_string();
        row.unit_price = Some(0.0);
        assert_eq!(row.missing_required_fields(), vec!["article_number"]);
    }

    #[test]
    fn test_manufacturer_tag_serializes_short_code() {
        let json = serde_json::to_string(&ManufacturerTag::GastroHero).unwrap();
        assert_eq!(json, "\"GH\"");
        assert_eq!(ManufacturerTag::Ggm.to_string(), "GGM");
    }
}
