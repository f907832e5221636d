//! Processed product images and the registry that keys them by article number

use image::{DynamicImage, ImageFormat, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image download failed: {0}")]
    Download(String),

    #[error("Image decoding failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Failed to load segmentation model {path}: {message}")]
    ModelLoad { path: String, message: String },

    #[error("Background removal failed: {0}")]
    BackgroundRemoval(String),

    #[error("Image has no visible content after background removal")]
    EmptyImage,

    #[error("Image processing task failed: {0}")]
    Task(String),
}

/// PNG-encoded product image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductImage {
    png: Vec<u8>,
    width: u32,
    height: u32,
}

impl ProductImage {
    /// Encode an RGBA buffer as PNG
    pub fn from_rgba(image: &RgbaImage) -> Result<Self, ImageError> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(Self {
            png: buffer.into_inner(),
            width: image.width(),
            height: image.height(),
        })
    }

    /// Accept any encoded image the decoder understands and normalize it to PNG
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, ImageError> {
        let decoded = image::load_from_memory(bytes)?;
        Self::from_rgba(&decoded.to_rgba8())
    }

    /// Load an image file from disk, e.g. the placeholder logo
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let decoded = image::open(path)?;
        Self::from_rgba(&decoded.to_rgba8())
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn into_png_bytes(self) -> Vec<u8> {
        self.png
    }

    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Decode back into a pixel buffer for display
    pub fn decode(&self) -> Result<DynamicImage, ImageError> {
        Ok(image::load_from_memory_with_format(&self.png, ImageFormat::Png)?)
    }
}

/// Images keyed by article number.
///
/// Inserting under an existing key replaces the previous image. Removing a
/// row from the table leaves its image in place.
#[derive(Debug, Clone, Default)]
pub struct ImageRegistry {
    images: HashMap<String, ProductImage>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an image, returning the one it replaced
    pub fn insert(&mut self, article_number: impl Into<String>, image: ProductImage) -> Option<ProductImage> {
        self.images.insert(article_number.into(), image)
    }

    pub fn get(&self, article_number: &str) -> Option<&ProductImage> {
        self.images.get(article_number)
    }

    pub fn contains(&self, article_number: &str) -> bool {
        self.images.contains_key(article_number)
    }

    pub fn remove(&mut self, article_number: &str) -> Option<ProductImage> {
        self.images.remove(article_number)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProductImage)> {
        self.images.iter().map(|(key, image)| (key.as_str(), image))
    }
}
