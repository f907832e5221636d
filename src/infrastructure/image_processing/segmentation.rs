//! Salient-object segmentation with an ONNX/rten model
//!
//! Expects the u2net family contract: one `[1, 3, S, S]` float input with
//! ImageNet normalization, first output a `[1, 1, S, S]` saliency map.

use image::{GrayImage, RgbaImage, imageops, imageops::FilterType};
use rten::Model;
use rten_tensor::prelude::*;
use rten_tensor::{NdTensorView, Tensor};
use std::path::Path;
use tracing::{debug, info};

use super::BackgroundRemover;
use crate::domain::ImageError;

const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

pub struct SegmentationRemover {
    model: Model,
    input_size: u32,
}

impl SegmentationRemover {
    pub fn load(path: &Path, input_size: u32) -> Result<Self, ImageError> {
        let model = Model::load_file(path).map_err(|e| ImageError::ModelLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        info!("Loaded segmentation model {} ({}px input)", path.display(), input_size);
        Ok(Self { model, input_size })
    }

    fn predict_mask(&self, image: &RgbaImage) -> Result<GrayImage, ImageError> {
        let size = self.input_size as usize;
        let input = Tensor::from_vec(segmentation_input(image, self.input_size)).into_shape([1, 3, size, size]);

        let input_id = self
            .model
            .input_ids()
            .first()
            .copied()
            .ok_or_else(|| ImageError::BackgroundRemoval("Model has no input".to_string()))?;
        let output_id = self
            .model
            .output_ids()
            .first()
            .copied()
            .ok_or_else(|| ImageError::BackgroundRemoval("Model has no output".to_string()))?;

        let outputs = self
            .model
            .run_n(vec![(input_id, input.view().into())], [output_id], None)
            .map_err(|e| ImageError::BackgroundRemoval(format!("Model execution failed: {e}")))?;

        let prediction: Tensor<f32> = outputs[0]
            .as_view()
            .try_into()
            .map(|v: NdTensorView<f32, 4>| v.to_tensor().into())
            .map_err(|_| ImageError::BackgroundRemoval("Model output is not a 4D float tensor".to_string()))?;

        let shape = prediction.shape();
        let (height, width) = (shape[2], shape[3]);
        let data = prediction
            .data()
            .ok_or_else(|| ImageError::BackgroundRemoval("Model output is not contiguous".to_string()))?;
        debug!("Segmentation map {}x{}", width, height);

        mask_from_prediction(&data[..width * height], width as u32, height as u32)
    }
}

impl BackgroundRemover for SegmentationRemover {
    fn remove_background(&self, image: RgbaImage) -> Result<RgbaImage, ImageError> {
        let mask = self.predict_mask(&image)?;
        Ok(apply_mask(image, &mask))
    }
}

/// Resize to `size`x`size` and lay out as normalized CHW floats
pub fn segmentation_input(image: &RgbaImage, size: u32) -> Vec<f32> {
    let resized = imageops::resize(image, size, size, FilterType::Lanczos3);
    let max = resized
        .pixels()
        .flat_map(|pixel| pixel.0[..3].iter().copied())
        .max()
        .map_or(1.0, |value| f32::from(value).max(1.0));

    let plane = (size * size) as usize;
    let mut data = vec![0.0f32; 3 * plane];
    for (index, pixel) in resized.pixels().enumerate() {
        for channel in 0..3 {
            let value = f32::from(pixel[channel]) / max;
            data[channel * plane + index] = (value - MEAN[channel]) / STD[channel];
        }
    }
    data
}

/// Min-max scale a saliency map into an 8-bit mask.
///
/// A flat map carries no foreground and becomes fully transparent.
pub fn mask_from_prediction(prediction: &[f32], width: u32, height: u32) -> Result<GrayImage, ImageError> {
    let (min, max) = prediction
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &value| (min.min(value), max.max(value)));
    let range = max - min;

    let bytes = prediction
        .iter()
        .map(|&value| {
            if range > f32::EPSILON {
                (((value - min) / range) * 255.0).round() as u8
            } else {
                0
            }
        })
        .collect();

    GrayImage::from_raw(width, height, bytes)
        .ok_or_else(|| ImageError::BackgroundRemoval(format!("Mask size does not match {width}x{height}")))
}

/// Scale the mask to the photo and use it as alpha, keeping existing transparency
pub fn apply_mask(mut image: RgbaImage, mask: &GrayImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    let scaled;
    let mask = if mask.dimensions() == (width, height) {
        mask
    } else {
        scaled = imageops::resize(mask, width, height, FilterType::Lanczos3);
        &scaled
    };

    for (pixel, alpha) in image.pixels_mut().zip(mask.pixels()) {
        pixel[3] = pixel[3].min(alpha[0]);
    }
    image
}
