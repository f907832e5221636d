//! Product image post-processing: download, background removal, auto-crop
//!
//! Failures never leave this module. A product whose image cannot be
//! processed simply gets no custom image.

pub mod segmentation;

pub use segmentation::SegmentationRemover;

use image::{Rgba, RgbaImage, imageops};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{ImageError, ProductImage};
use crate::infrastructure::config::ImageProcessingConfig;
use crate::infrastructure::http_client::HttpClient;

/// Produces an alpha-masked version of a product photo
pub trait BackgroundRemover: Send + Sync {
    fn remove_background(&self, image: RgbaImage) -> Result<RgbaImage, ImageError>;
}

/// Clears the background region connected to the image border.
///
/// Each opaque corner is a backdrop sample; border-connected pixels within
/// `tolerance` of any sample per channel become fully transparent. Fallback
/// for plain studio backdrops when no segmentation model is configured.
#[derive(Debug, Clone, Copy)]
pub struct BorderFloodRemover {
    pub tolerance: u8,
}

impl BorderFloodRemover {
    pub const fn new(tolerance: u8) -> Self {
        Self { tolerance }
    }

    fn reference_colors(image: &RgbaImage) -> Vec<[u8; 3]> {
        let (width, height) = image.dimensions();
        let mut colors: Vec<[u8; 3]> = Vec::with_capacity(4);
        for (x, y) in [(0, 0), (width - 1, 0), (0, height - 1), (width - 1, height - 1)] {
            let pixel = image.get_pixel(x, y);
            let color = [pixel[0], pixel[1], pixel[2]];
            if pixel[3] > 0 && !colors.contains(&color) {
                colors.push(color);
            }
        }
        colors
    }

    fn is_background(&self, pixel: &Rgba<u8>, references: &[[u8; 3]]) -> bool {
        if pixel[3] == 0 {
            return true;
        }
        references.iter().any(|reference| {
            reference
                .iter()
                .zip(pixel.0.iter())
                .all(|(expected, actual)| expected.abs_diff(*actual) <= self.tolerance)
        })
    }
}

impl BackgroundRemover for BorderFloodRemover {
    fn remove_background(&self, mut image: RgbaImage) -> Result<RgbaImage, ImageError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Ok(image);
        }

        let references = Self::reference_colors(&image);
        let mut visited = vec![false; width as usize * height as usize];
        let mut queue: VecDeque<(u32, u32)> = VecDeque::new();

        for x in 0..width {
            queue.push_back((x, 0));
            queue.push_back((x, height - 1));
        }
        for y in 0..height {
            queue.push_back((0, y));
            queue.push_back((width - 1, y));
        }

        while let Some((x, y)) = queue.pop_front() {
            let index = y as usize * width as usize + x as usize;
            if visited[index] {
                continue;
            }
            visited[index] = true;

            let pixel = *image.get_pixel(x, y);
            if !self.is_background(&pixel, &references) {
                continue;
            }
            image.put_pixel(x, y, Rgba([pixel[0], pixel[1], pixel[2], 0]));

            if x > 0 {
                queue.push_back((x - 1, y));
            }
            if x + 1 < width {
                queue.push_back((x + 1, y));
            }
            if y > 0 {
                queue.push_back((x, y - 1));
            }
            if y + 1 < height {
                queue.push_back((x, y + 1));
            }
        }

        Ok(image)
    }
}

/// Smallest `(x, y, width, height)` box holding every pixel with alpha above
/// `alpha_threshold`
pub fn content_bounding_box(image: &RgbaImage, alpha_threshold: u8) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] <= alpha_threshold {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y)),
        });
    }

    bounds.map(|(min_x, min_y, max_x, max_y)| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Decode, mask, crop and re-encode one downloaded image
pub fn crop_product_image(
    bytes: &[u8],
    remover: &dyn BackgroundRemover,
    alpha_threshold: u8,
) -> Result<ProductImage, ImageError> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    let masked = remover.remove_background(decoded)?;
    let (x, y, width, height) = content_bounding_box(&masked, alpha_threshold).ok_or(ImageError::EmptyImage)?;

    debug!("Cropping {}x{} image to {}x{} at ({}, {})", masked.width(), masked.height(), width, height, x, y);
    let cropped = imageops::crop_imm(&masked, x, y, width, height).to_image();
    ProductImage::from_rgba(&cropped)
}

pub struct ImagePostProcessor {
    http: Arc<HttpClient>,
    remover: Arc<dyn BackgroundRemover>,
    config: ImageProcessingConfig,
}

impl ImagePostProcessor {
    pub fn new(http: Arc<HttpClient>, config: ImageProcessingConfig) -> Self {
        let remover = Arc::new(BorderFloodRemover::new(config.background_tolerance));
        Self::with_remover(http, remover, config)
    }

    /// Segmentation model when one is configured, border flood fill otherwise
    pub fn from_config(http: Arc<HttpClient>, config: ImageProcessingConfig) -> Result<Self, ImageError> {
        let Some(model_path) = config.model_path.clone() else {
            info!("No segmentation model configured, using border flood fill");
            return Ok(Self::new(http, config));
        };

        let remover = Arc::new(SegmentationRemover::load(&model_path, config.model_input_size)?);
        Ok(Self::with_remover(http, remover, config))
    }

    pub fn with_remover(
        http: Arc<HttpClient>,
        remover: Arc<dyn BackgroundRemover>,
        config: ImageProcessingConfig,
    ) -> Self {
        Self { http, remover, config }
    }

    /// Download and crop the image at `image_url`; `None` on any failure
    pub async fn process(&self, image_url: &str) -> Option<ProductImage> {
        if !self.config.enabled {
            debug!("Image processing disabled, skipping {}", image_url);
            return None;
        }
        if image_url.trim().is_empty() {
            debug!("No product image URL found");
            return None;
        }

        match self.try_process(image_url).await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Image cropping failed for {}: {}", image_url, e);
                None
            }
        }
    }

    async fn try_process(&self, image_url: &str) -> Result<ProductImage, ImageError> {
        let bytes = self
            .http
            .get_bytes(image_url)
            .await
            .map_err(|e| ImageError::Download(e.to_string()))?;

        let remover = Arc::clone(&self.remover);
        let alpha_threshold = self.config.alpha_threshold;
        tokio::task::spawn_blocking(move || crop_product_image(&bytes, remover.as_ref(), alpha_threshold))
            .await
            .map_err(|e| ImageError::Task(e.to_string()))?
    }
}
