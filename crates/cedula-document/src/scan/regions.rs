// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region geometry: resolve fractional field rectangles to pixel rectangles
// and crop them out of the card image.

use cedula_core::{PixelRect, RegionDescriptor};
use image::GrayImage;
use image::imageops;

/// Resolve a fractional region against a `width` x `height` image.
///
/// Offsets and extents are truncated to whole pixels, then the rectangle is
/// clipped to the image. Returns `None` when nothing of it remains.
pub fn resolve_region(region: &RegionDescriptor, width: u32, height: u32) -> Option<PixelRect> {
    let to_px = |fraction: f64, extent: u32| (extent as f64 * fraction).floor().max(0.0) as u32;

    let x = to_px(region.x, width).min(width);
    let y = to_px(region.y, height).min(height);
    let w = to_px(region.width, width).min(width - x);
    let h = to_px(region.height, height).min(height - y);

    if w == 0 || h == 0 {
        return None;
    }
    Some(PixelRect {
        x,
        y,
        width: w,
        height: h,
    })
}

/// Copy the pixels under `rect` into a new buffer.
pub fn crop_region(image: &GrayImage, rect: PixelRect) -> GrayImage {
    imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cedula_core::config::default_regions;
    use image::Luma;

    #[test]
    fn default_regions_resolve_on_a_card_sized_image() {
        let rects: Vec<_> = default_regions()
            .iter()
            .map(|r| resolve_region(r, 1000, 630).unwrap())
            .collect();

        assert_eq!(rects[0], PixelRect { x: 300, y: 63, width: 400, height: 94 });
        assert_eq!(rects[1], PixelRect { x: 100, y: 189, width: 800, height: 63 });
        assert_eq!(rects[2], PixelRect { x: 100, y: 252, width: 800, height: 63 });
        assert_eq!(rects[3], PixelRect { x: 100, y: 378, width: 800, height: 189 });
    }

    #[test]
    fn resolved_regions_stay_in_bounds() {
        for (w, h) in [(1000, 630), (37, 23), (3, 1000), (1, 1)] {
            for region in default_regions() {
                if let Some(rect) = resolve_region(&region, w, h) {
                    assert!(rect.x + rect.width <= w);
                    assert!(rect.y + rect.height <= h);
                    assert!(rect.width > 0 && rect.height > 0);
                }
            }
        }
    }

    #[test]
    fn tiny_image_yields_empty_regions() {
        for region in default_regions() {
            assert_eq!(resolve_region(&region, 2, 2), None);
        }
    }

    #[test]
    fn overhanging_region_is_clipped() {
        let region = RegionDescriptor::new("edge", 0.9, 0.9, 0.5, 0.5);
        let rect = resolve_region(&region, 100, 100).unwrap();
        assert_eq!(rect, PixelRect { x: 90, y: 90, width: 10, height: 10 });
    }

    #[test]
    fn crop_copies_the_rectangle() {
        let img = GrayImage::from_fn(10, 10, |x, y| Luma([(y * 10 + x) as u8]));
        let crop = crop_region(&img, PixelRect { x: 2, y: 3, width: 4, height: 2 });
        assert_eq!(crop.dimensions(), (4, 2));
        assert_eq!(crop.get_pixel(0, 0).0[0], 32);
        assert_eq!(crop.get_pixel(3, 1).0[0], 45);
    }
}
