//! Domain module - quotation rows, product images and session state
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod product;
pub mod product_image;
pub mod session;
pub mod source;

pub use product::{ManufacturerTag, ProductRow, ScrapedProduct};
pub use product_image::{ImageError, ImageRegistry, ProductImage};
pub use session::{ProductTable, QuoteSession, RowIssue, ValidationError};
pub use source::SourceKind;
