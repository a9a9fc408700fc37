//! Image pre-processing ahead of OCR.
//!
//! The stages always run in this order:
//!
//! 1. single-channel grayscale
//! 2. 3x3 median blur
//! 3. contrast-limited adaptive histogram equalization (clip limit 2.0, 8x8 tiles)
//! 4. Gaussian-weighted adaptive threshold (block 11, offset 2), producing a 0/255 image
//!
//! Border pixels replicate the nearest edge pixel in every stage.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::median_filter;

use super::error::OcrError;
use crate::types::ImageDimensions;

pub const MEDIAN_KERNEL_RADIUS: u32 = 1;
pub const CLAHE_CLIP_LIMIT: f64 = 2.0;
pub const CLAHE_TILE_GRID: u32 = 8;
pub const THRESHOLD_BLOCK_SIZE: u32 = 11;
pub const THRESHOLD_OFFSET: i32 = 2;

/// A decoded source image after the full pre-processing pipeline.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub binary: GrayImage,
    pub dimensions: ImageDimensions,
}

/// Decode `bytes` and run the pre-processing pipeline.
pub fn prepare_image_bytes(bytes: &[u8]) -> Result<PreparedImage, OcrError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| OcrError::ImageProcessingFailed(format!("Failed to decode image: {}", e)))?;

    let dimensions = ImageDimensions {
        width: decoded.width(),
        height: decoded.height(),
    };
    if dimensions.width == 0 || dimensions.height == 0 {
        return Err(OcrError::ImageProcessingFailed("Image has zero area".to_string()));
    }

    Ok(PreparedImage {
        binary: preprocess_for_ocr(&decoded),
        dimensions,
    })
}

/// Grayscale, denoise, equalize and binarize.
pub fn preprocess_for_ocr(image: &DynamicImage) -> GrayImage {
    let gray = image.to_luma8();
    let denoised = median_filter(&gray, MEDIAN_KERNEL_RADIUS, MEDIAN_KERNEL_RADIUS);
    let enhanced = clahe(&denoised, CLAHE_CLIP_LIMIT, CLAHE_TILE_GRID);
    adaptive_threshold_gaussian(&enhanced, THRESHOLD_BLOCK_SIZE, THRESHOLD_OFFSET)
}

/// Contrast-limited adaptive histogram equalization.
///
/// Each tile gets a clipped-histogram equalization LUT; every pixel is mapped through a
/// bilinear blend of the LUTs of its four nearest tile centres.
pub fn clahe(image: &GrayImage, clip_limit: f64, tile_grid: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let tiles_x = tile_grid.clamp(1, width);
    let tiles_y = tile_grid.clamp(1, height);

    let mut luts: Vec<[u8; 256]> = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        let (y0, y1) = tile_span(ty, tiles_y, height);
        for tx in 0..tiles_x {
            let (x0, x1) = tile_span(tx, tiles_x, width);

            let mut hist = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[image.get_pixel(x, y)[0] as usize] += 1;
                }
            }

            let area = (x1 - x0) * (y1 - y0);
            let limit = ((clip_limit * area as f64 / 256.0) as u32).max(1);
            clip_histogram(&mut hist, limit);
            luts.push(equalization_lut(&hist, area));
        }
    }

    let tile_w = width as f64 / tiles_x as f64;
    let tile_h = height as f64 / tiles_y as f64;
    let lut_at = |tx: u32, ty: u32| &luts[(ty * tiles_x + tx) as usize];

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        let (ty1, ty2, ya) = neighbour_tiles(y as f64 / tile_h - 0.5, tiles_y);
        for x in 0..width {
            let (tx1, tx2, xa) = neighbour_tiles(x as f64 / tile_w - 0.5, tiles_x);
            let v = image.get_pixel(x, y)[0] as usize;

            let top = lut_at(tx1, ty1)[v] as f64 * (1.0 - xa) + lut_at(tx2, ty1)[v] as f64 * xa;
            let bottom = lut_at(tx1, ty2)[v] as f64 * (1.0 - xa) + lut_at(tx2, ty2)[v] as f64 * xa;
            let blended = top * (1.0 - ya) + bottom * ya;

            out.put_pixel(x, y, Luma([blended.round().clamp(0.0, 255.0) as u8]));
        }
    }

    out
}

fn tile_span(index: u32, tiles: u32, extent: u32) -> (u32, u32) {
    let start = (index as u64 * extent as u64 / tiles as u64) as u32;
    let end = ((index as u64 + 1) * extent as u64 / tiles as u64) as u32;
    (start, end)
}

fn neighbour_tiles(position: f64, tiles: u32) -> (u32, u32, f64) {
    let lower = position.floor();
    let weight = position - lower;
    let last = tiles as i64 - 1;
    let first = (lower as i64).clamp(0, last) as u32;
    let second = (lower as i64 + 1).clamp(0, last) as u32;
    (first, second, weight)
}

/// Clip every bin at `limit` and spread the excess evenly, remainder first-come.
fn clip_histogram(hist: &mut [u32; 256], limit: u32) {
    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }

    let batch = excess / 256;
    let mut residual = excess % 256;
    for bin in hist.iter_mut() {
        *bin += batch;
    }

    if residual > 0 {
        let step = (256 / residual).max(1) as usize;
        let mut i = 0;
        while i < 256 && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

fn equalization_lut(hist: &[u32; 256], area: u32) -> [u8; 256] {
    let scale = 255.0 / area.max(1) as f64;
    let mut lut = [0u8; 256];
    let mut sum = 0u64;
    for (i, count) in hist.iter().enumerate() {
        sum += *count as u64;
        lut[i] = (sum as f64 * scale).round().min(255.0) as u8;
    }
    lut
}

/// Binarize against a Gaussian-weighted local mean.
///
/// A pixel becomes 255 when it is brighter than `local_mean - offset`, 0 otherwise.
/// `block_size` is forced odd; sigma follows the usual `0.3 * ((k - 1) / 2 - 1) + 0.8` rule.
pub fn adaptive_threshold_gaussian(image: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let block = if block_size % 2 == 0 { block_size + 1 } else { block_size.max(3) };
    let kernel = gaussian_kernel(block);
    let radius = (block / 2) as i64;

    let clamp_x = |x: i64| x.clamp(0, width as i64 - 1) as u32;
    let clamp_y = |y: i64| y.clamp(0, height as i64 - 1) as usize;

    let mut horizontal = vec![0f64; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let sx = clamp_x(x as i64 + k as i64 - radius);
                acc += w * image.get_pixel(sx, y)[0] as f64;
            }
            horizontal[(y * width + x) as usize] = acc;
        }
    }

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let sy = clamp_y(y as i64 + k as i64 - radius);
                acc += w * horizontal[sy * width as usize + x as usize];
            }
            let mean = acc.round().clamp(0.0, 255.0) as i32;
            let value = image.get_pixel(x, y)[0] as i32;
            let binary = if value - mean > -offset { 255 } else { 0 };
            out.put_pixel(x, y, Luma([binary]));
        }
    }

    out
}

fn gaussian_kernel(size: u32) -> Vec<f64> {
    let sigma = 0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let radius = (size / 2) as f64;
    let mut weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - radius;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= total;
    }
    weights
}
