//! Caller-owned quotation state: the product table and its image registry

use std::cmp::Ordering;
use thiserror::Error;
use tracing::{debug, info};

use super::product::ProductRow;
use super::product_image::{ImageRegistry, ProductImage};

/// A row that failed edit validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub index: usize,
    pub position: Option<u32>,
    pub missing: Vec<&'static str>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{} row(s) have empty required fields", .rows.len())]
    MissingRequiredFields { rows: Vec<RowIssue> },
}

/// Ordered product rows of one quotation
#[derive(Debug, Clone, Default)]
pub struct ProductTable {
    rows: Vec<ProductRow>,
}

impl ProductTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[ProductRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position the next appended product gets
    pub fn next_position(&self) -> u32 {
        u32::try_from(self.rows.len()).map_or(u32::MAX, |len| len.saturating_add(1))
    }

    pub fn push(&mut self, row: ProductRow) {
        self.rows.push(row);
    }

    /// Stable sort by position, then secondary position, empty values last
    pub fn sort_by_position(&mut self) {
        self.rows.sort_by(|a, b| {
            compare_missing_last(a.position, b.position, u32::cmp).then_with(|| {
                compare_missing_last(
                    a.secondary_position.as_deref(),
                    b.secondary_position.as_deref(),
                    compare_secondary,
                )
            })
        });
    }
}

fn compare_missing_last<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(&a, &b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Numbers first in numeric order, then everything else lexically.
///
/// Equal numbers fall back to the text so the order stays total.
fn compare_secondary(a: &&str, b: &&str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Everything one interactive quotation run accumulates
#[derive(Debug, Clone, Default)]
pub struct QuoteSession {
    pub table: ProductTable,
    pub images: ImageRegistry,
}

impl QuoteSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scraped row and register its image under the article number
    pub fn add_product(&mut self, row: ProductRow, image: Option<ProductImage>) {
        if let Some(image) = image {
            match row.image_key() {
                Some(key) => {
                    if self.images.insert(key, image).is_some() {
                        debug!("Replaced existing image for article {}", key);
                    }
                }
                None => debug!("Dropping image for row without article number"),
            }
        }
        self.table.push(row);
    }

    /// Replace the table with an edited version.
    ///
    /// Every row must carry position, article number, title and unit price;
    /// otherwise nothing changes. On success totals are recomputed and rows
    /// without an image get a copy of `placeholder`.
    pub fn commit_edits(
        &mut self,
        mut edited: Vec<ProductRow>,
        placeholder: &ProductImage,
    ) -> Result<(), ValidationError> {
        let issues: Vec<RowIssue> = edited
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let missing = row.missing_required_fields();
                (!missing.is_empty()).then_some(RowIssue {
                    index,
                    position: row.position,
                    missing,
                })
            })
            .collect();

        if !issues.is_empty() {
            return Err(ValidationError::MissingRequiredFields { rows: issues });
        }

        for row in &mut edited {
            row.recompute_total();
            if let Some(key) = row.image_key() {
                if !self.images.contains(key) {
                    self.images.insert(key, placeholder.clone());
                }
            }
        }

        info!("Committed {} edited product rows", edited.len());
        self.table.rows = edited;
        Ok(())
    }
}
