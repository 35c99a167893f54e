// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel filters used by the normalizer: contrast-limited adaptive histogram
// equalization, bilateral smoothing and Gaussian-weighted adaptive
// thresholding, plus the sharpening kernel. All filters replicate edge pixels
// at the border.

use image::{GrayImage, Luma};

// -- Contrast-limited adaptive histogram equalization -------------------------

/// Equalize local contrast over a `grid` x `grid` tile layout, limiting each
/// tile's histogram to `clip_limit` times the uniform bin height.
///
/// Each tile gets its own clipped-and-redistributed equalization table; every
/// pixel is mapped through the four nearest tile tables, bilinearly weighted
/// by its distance to the tile centres. The grid is clamped so that every
/// tile holds at least one pixel.
pub fn clahe(image: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let tiles_x = grid.clamp(1, width);
    let tiles_y = grid.clamp(1, height);
    let x_bounds = tile_bounds(width, tiles_x);
    let y_bounds = tile_bounds(height, tiles_y);

    let mut tables = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y as usize {
        for tx in 0..tiles_x as usize {
            let mut histogram = [0u32; 256];
            for y in y_bounds[ty]..y_bounds[ty + 1] {
                for x in x_bounds[tx]..x_bounds[tx + 1] {
                    histogram[image.get_pixel(x, y).0[0] as usize] += 1;
                }
            }
            let area = (x_bounds[tx + 1] - x_bounds[tx]) * (y_bounds[ty + 1] - y_bounds[ty]);
            tables.push(clipped_equalization(&mut histogram, area, clip_limit));
        }
    }

    let tile_w = width as f32 / tiles_x as f32;
    let tile_h = height as f32 / tiles_y as f32;
    let columns: Vec<(usize, usize, f32)> = (0..width)
        .map(|x| interpolation_cell(x, tile_w, tiles_x))
        .collect();

    let mut output = GrayImage::new(width, height);
    for y in 0..height {
        let (ty0, ty1, wy) = interpolation_cell(y, tile_h, tiles_y);
        let row0 = ty0 * tiles_x as usize;
        let row1 = ty1 * tiles_x as usize;
        for x in 0..width {
            let (tx0, tx1, wx) = columns[x as usize];
            let value = image.get_pixel(x, y).0[0] as usize;

            let top = tables[row0 + tx0][value] as f32 * (1.0 - wx)
                + tables[row0 + tx1][value] as f32 * wx;
            let bottom = tables[row1 + tx0][value] as f32 * (1.0 - wx)
                + tables[row1 + tx1][value] as f32 * wx;
            let mapped = top * (1.0 - wy) + bottom * wy;

            output.put_pixel(x, y, Luma([mapped.round().clamp(0.0, 255.0) as u8]));
        }
    }

    output
}

/// Split `0..len` into `tiles` contiguous, non-empty spans.
fn tile_bounds(len: u32, tiles: u32) -> Vec<u32> {
    (0..=tiles)
        .map(|i| (i as u64 * len as u64 / tiles as u64) as u32)
        .collect()
}

/// Locate the two tile indices bracketing `pos` and the weight of the second.
fn interpolation_cell(pos: u32, tile_size: f32, tiles: u32) -> (usize, usize, f32) {
    let f = (pos as f32 + 0.5) / tile_size - 0.5;
    if f <= 0.0 {
        return (0, 0, 0.0);
    }
    let first = f.floor() as u32;
    if first >= tiles - 1 {
        let last = (tiles - 1) as usize;
        return (last, last, 0.0);
    }
    (first as usize, first as usize + 1, f - first as f32)
}

/// Clip the histogram, spread the excess over all bins and return the
/// resulting cumulative mapping table.
fn clipped_equalization(histogram: &mut [u32; 256], area: u32, clip_limit: f32) -> [u8; 256] {
    let limit = ((clip_limit * area as f32 / 256.0) as u32).max(1);

    let mut excess = 0u32;
    for count in histogram.iter_mut() {
        if *count > limit {
            excess += *count - limit;
            *count = limit;
        }
    }

    let bonus = excess / 256;
    let residual = (excess % 256) as usize;
    for count in histogram.iter_mut() {
        *count += bonus;
    }
    if residual > 0 {
        let step = (256 / residual).max(1);
        for count in histogram.iter_mut().step_by(step).take(residual) {
            *count += 1;
        }
    }

    let scale = 255.0 / area.max(1) as f32;
    let mut table = [0u8; 256];
    let mut cumulative = 0u32;
    for (entry, &count) in table.iter_mut().zip(histogram.iter()) {
        cumulative += count;
        *entry = (cumulative as f32 * scale).round().min(255.0) as u8;
    }
    table
}

// -- Bilateral filter ---------------------------------------------------------

/// Edge-preserving smoothing over a circular neighbourhood of the given
/// diameter.
///
/// Each neighbour is weighted by a spatial Gaussian (`sigma_space`) and by a
/// Gaussian of its intensity difference to the centre pixel (`sigma_color`),
/// so flat areas are averaged while strokes across a large step stay sharp.
pub fn bilateral_filter(
    image: &GrayImage,
    diameter: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> GrayImage {
    let (width, height) = image.dimensions();
    let radius = (diameter / 2) as i64;
    if width == 0 || height == 0 || radius == 0 {
        return image.clone();
    }

    let space_coeff = -0.5 / (sigma_space * sigma_space);
    let color_coeff = -0.5 / (sigma_color * sigma_color);

    let mut offsets = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let dist_sq = dx * dx + dy * dy;
            if dist_sq > radius * radius {
                continue;
            }
            offsets.push((dx, dy, (dist_sq as f32 * space_coeff).exp()));
        }
    }

    let color_weight: Vec<f32> = (0..256u32)
        .map(|diff| ((diff * diff) as f32 * color_coeff).exp())
        .collect();

    let src = image.as_raw();
    let stride = width as usize;
    let (max_x, max_y) = (width as i64 - 1, height as i64 - 1);
    let mut output = GrayImage::new(width, height);

    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let center = src[y as usize * stride + x as usize];
            let mut sum = 0.0f32;
            let mut norm = 0.0f32;

            for &(dx, dy, spatial) in &offsets {
                let nx = (x + dx).clamp(0, max_x) as usize;
                let ny = (y + dy).clamp(0, max_y) as usize;
                let neighbour = src[ny * stride + nx];
                let weight = spatial * color_weight[center.abs_diff(neighbour) as usize];
                sum += weight * neighbour as f32;
                norm += weight;
            }

            let value = (sum / norm).round().clamp(0.0, 255.0) as u8;
            output.put_pixel(x as u32, y as u32, Luma([value]));
        }
    }

    output
}

// -- Adaptive thresholding ----------------------------------------------------

/// Binarize against a Gaussian-weighted local mean.
///
/// The mean is taken over a `block_size` x `block_size` neighbourhood with
/// `sigma = 0.3 * ((block_size - 1) / 2 - 1) + 0.8`. A pixel becomes white
/// (255) when it is brighter than `mean - offset`, otherwise black (0).
pub fn adaptive_gaussian_threshold(image: &GrayImage, block_size: u32, offset: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let kernel = gaussian_kernel(block_size);
    let local_mean = separable_convolve(image, &kernel);

    let mut output = GrayImage::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels() {
        let mean = local_mean[y as usize * width as usize + x as usize];
        let threshold = mean - offset;
        let binary = if pixel.0[0] as f32 > threshold { 255u8 } else { 0u8 };
        output.put_pixel(x, y, Luma([binary]));
    }
    output
}

/// Normalized 1-D Gaussian with `size` taps.
fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = size.max(1) | 1;
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f32;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Apply `kernel` horizontally then vertically; returns means rounded to the
/// 8-bit grid, row-major.
fn separable_convolve(image: &GrayImage, kernel: &[f32]) -> Vec<f32> {
    let (width, height) = (image.width() as i64, image.height() as i64);
    let radius = (kernel.len() / 2) as i64;
    let src = image.as_raw();
    let idx = |x: i64, y: i64| (y * width + x) as usize;

    let mut horizontal = vec![0.0f32; src.len()];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = (x + k as i64 - radius).clamp(0, width - 1);
                acc += weight * src[idx(sx, y)] as f32;
            }
            horizontal[idx(x, y)] = acc;
        }
    }

    let mut output = vec![0.0f32; src.len()];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = (y + k as i64 - radius).clamp(0, height - 1);
                acc += weight * horizontal[idx(x, sy)];
            }
            output[idx(x, y)] = acc.round().clamp(0.0, 255.0);
        }
    }
    output
}

// -- Sharpening ---------------------------------------------------------------

/// High-pass kernel for `imageproc::filter::filter3x3`: centre 9, the eight
/// neighbours -1.
pub const SHARPEN_KERNEL: [i32; 9] = [-1, -1, -1, -1, 9, -1, -1, -1, -1];

// -- Tests --------------------------------------------------------------------
