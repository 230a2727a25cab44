//! Resize guard for oversized icons.
//!
//! Each axis is clamped to `max_dimension` on its own, so an image that is
//! only too large along one axis is squashed rather than scaled uniformly.
//!
//! Resampling happens on premultiplied alpha. Masked pixels keep their RGB
//! with alpha 0, and straight-alpha filtering would bleed that hidden colour
//! into the visible edge.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba, Rgba32FImage, RgbaImage};
use log::debug;

/// Largest width or height an icon may keep after cleaning
pub const DEFAULT_MAX_DIMENSION: u32 = 512;

/// Target size after clamping, or `None` when the image already fits
pub fn clamped_dimensions(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    if width <= max_dimension && height <= max_dimension {
        return None;
    }
    Some((width.min(max_dimension), height.min(max_dimension)))
}

/// Downscale `img` with Lanczos3 if either side exceeds `max_dimension`.
///
/// Returns the (possibly unchanged) image and whether a resize happened.
pub fn clamp_to_max(img: RgbaImage, max_dimension: u32) -> (RgbaImage, bool) {
    let (width, height) = img.dimensions();

    match clamped_dimensions(width, height, max_dimension) {
        Some((new_width, new_height)) => {
            debug!(
                "Resizing {}x{} -> {}x{} (Lanczos3)",
                width, height, new_width, new_height
            );
            let premultiplied = premultiply(&img);
            let resized = imageops::resize(&premultiplied, new_width, new_height, FilterType::Lanczos3);
            (unpremultiply(&resized), true)
        }
        None => (img, false),
    }
}

fn premultiply(img: &RgbaImage) -> Rgba32FImage {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        let p = img.get_pixel(x, y);
        let a = p[3] as f32 / 255.0;
        Rgba([
            p[0] as f32 / 255.0 * a,
            p[1] as f32 / 255.0 * a,
            p[2] as f32 / 255.0 * a,
            a,
        ])
    })
}

fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Back to straight alpha; fully transparent pixels keep the filtered RGB
fn unpremultiply(img: &Rgba32FImage) -> RgbaImage {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        let p = img.get_pixel(x, y);
        let alpha = to_u8(p[3]);
        if alpha == 0 {
            return Rgba([to_u8(p[0]), to_u8(p[1]), to_u8(p[2]), 0]);
        }
        let a = p[3].clamp(0.0, 1.0);
        Rgba([to_u8(p[0] / a), to_u8(p[1] / a), to_u8(p[2] / a), alpha])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_image_untouched() {
        let img: RgbaImage = ImageBuffer::from_pixel(512, 300, Rgba([10, 20, 30, 255]));
        let (out, resized) = clamp_to_max(img.clone(), DEFAULT_MAX_DIMENSION);
        assert!(!resized);
        assert_eq!(out, img);
    }

    #[test]
    fn test_square_clamped() {
        let img: RgbaImage = ImageBuffer::from_pixel(600, 600, Rgba([0, 0, 0, 255]));
        let (out, resized) = clamp_to_max(img, DEFAULT_MAX_DIMENSION);
        assert!(resized);
        assert_eq!(out.dimensions(), (512, 512));
    }

    #[test]
    fn test_axes_clamped_independently() {
        // Only the width is too large; height is kept as-is
        assert_eq!(clamped_dimensions(1000, 200, 512), Some((512, 200)));
        assert_eq!(clamped_dimensions(200, 1000, 512), Some((200, 512)));
        assert_eq!(clamped_dimensions(513, 513, 512), Some((512, 512)));
        assert_eq!(clamped_dimensions(512, 512, 512), None);
    }

    #[test]
    fn test_non_square_is_not_aspect_preserving() {
        let img: RgbaImage = ImageBuffer::from_pixel(1024, 100, Rgba([200, 0, 0, 255]));
        let (out, resized) = clamp_to_max(img, DEFAULT_MAX_DIMENSION);
        assert!(resized);
        assert_eq!(out.dimensions(), (512, 100));
    }

    #[test]
    fn test_transparent_rgb_does_not_bleed_into_edges() {
        // Opaque black left half, white hidden behind alpha 0 on the right
        let img: RgbaImage = ImageBuffer::from_fn(1024, 64, |x, _| {
            if x < 512 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 0])
            }
        });
        let (out, resized) = clamp_to_max(img, DEFAULT_MAX_DIMENSION);
        assert!(resized);
        for pixel in out.pixels().filter(|p| p[3] > 0) {
            assert!(pixel[0] <= 2 && pixel[1] <= 2 && pixel[2] <= 2, "fringe pixel {:?}", pixel);
        }
    }

    #[test]
    fn test_opaque_colour_survives_premultiplied_resize() {
        let img: RgbaImage = ImageBuffer::from_pixel(600, 40, Rgba([200, 100, 50, 255]));
        let (out, _) = clamp_to_max(img, DEFAULT_MAX_DIMENSION);
        assert_eq!(*out.get_pixel(100, 20), Rgba([200, 100, 50, 255]));
    }
}
