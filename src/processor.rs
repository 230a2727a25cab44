//! Background Removal for Icons
//!
//! Pipeline (single pass, no retries):
//! 1. Sample - Read eight border points to infer the background colour(s)
//! 2. Mask - Make every pixel within `tolerance` of a background colour transparent
//! 3. Resize - Clamp oversized icons (see `downscaler`)
//! 4. Save - Size-optimised PNG, written in one call
//!
//! The individual steps are public and operate on in-memory `RgbaImage`
//! data, so callers can sample or mask without touching the filesystem.

use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::RgbaImage;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::downscaler::{self, DEFAULT_MAX_DIMENSION};
use crate::error::{CleanerError, Result};

// ============================================================================
// SETTINGS
// ============================================================================

/// Default maximum Euclidean RGB distance still treated as background
pub const DEFAULT_TOLERANCE: u32 = 20;

/// Border samples with alpha below this say nothing about an opaque background
const SAMPLE_ALPHA_CUTOFF: u8 = 128;

/// Used when every border sample is (mostly) transparent
const FALLBACK_BACKGROUND: [u8; 3] = [0, 0, 0];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanerSettings {
    /// Inclusive Euclidean RGB distance for background matches (default: 20)
    pub tolerance: u32,
    /// Largest width/height kept after cleaning (default: 512)
    pub max_dimension: u32,
}

impl Default for CleanerSettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl CleanerSettings {
    pub fn validate(&self) -> Result<()> {
        if self.max_dimension == 0 {
            return Err(CleanerError::InvalidParameter(
                "max_dimension must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result from the masking step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MaskResult {
    /// Pixels with alpha > 0 that were compared against the background set
    pub pixels_examined: usize,
    /// Pixels whose alpha was set to 0
    pub pixels_masked: usize,
}

/// Summary of one full clean
#[derive(Debug, Clone, Serialize)]
pub struct CleanResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub original_size: (u32, u32),
    pub final_size: (u32, u32),
    pub background_colors: Vec<[u8; 3]>,
    pub pixels_masked: usize,
    pub resized: bool,
    pub bytes_written: u64,
}

// ============================================================================
// BACKGROUND COLOUR SAMPLING
// ============================================================================

/// Ordered, deduplicated set of background colours. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundColors(Vec<[u8; 3]>);

impl BackgroundColors {
    pub fn as_slice(&self) -> &[[u8; 3]] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<[u8; 3]> {
        self.0
    }

    /// First background colour within `tolerance` of `rgb`, in sampling order
    pub fn first_match(&self, rgb: [u8; 3], tolerance: u32) -> Option<[u8; 3]> {
        let limit = u64::from(tolerance) * u64::from(tolerance);
        self.0
            .iter()
            .copied()
            .find(|bg| squared_distance(&rgb, bg) <= limit)
    }
}

/// The eight fixed sample points: corners, then top/bottom/left/right midpoints
fn sample_points(width: u32, height: u32) -> [(u32, u32); 8] {
    let (right, bottom) = (width - 1, height - 1);
    let (mid_x, mid_y) = (width / 2, height / 2);
    [
        (0, 0),
        (right, 0),
        (0, bottom),
        (right, bottom),
        (mid_x, 0),
        (mid_x, bottom),
        (0, mid_y),
        (right, mid_y),
    ]
}

/// Infer background colour(s) from the image border.
///
/// Samples with alpha < 128 are skipped. Remaining colours are deduplicated
/// by exact RGB, keeping first-seen order. Falls back to pure black when no
/// sample survives, so icons with transparent borders only lose black.
pub fn sample_background_colors(img: &RgbaImage) -> BackgroundColors {
    let (width, height) = img.dimensions();
    let mut colors: Vec<[u8; 3]> = Vec::with_capacity(8);

    if width > 0 && height > 0 {
        for (x, y) in sample_points(width, height) {
            let pixel = img.get_pixel(x, y);
            if pixel[3] < SAMPLE_ALPHA_CUTOFF {
                continue;
            }
            let rgb = [pixel[0], pixel[1], pixel[2]];
            if !colors.contains(&rgb) {
                colors.push(rgb);
            }
        }
    }

    if colors.is_empty() {
        debug!("No opaque border samples, falling back to black");
        colors.push(FALLBACK_BACKGROUND);
    }

    BackgroundColors(colors)
}

// ============================================================================
// TRANSPARENCY MASKING
// ============================================================================

fn squared_distance(c1: &[u8; 3], c2: &[u8; 3]) -> u64 {
    c1.iter()
        .zip(c2.iter())
        .map(|(&a, &b)| {
            let d = i64::from(a) - i64::from(b);
            (d * d) as u64
        })
        .sum()
}

/// Euclidean distance over the RGB channels (alpha excluded)
pub fn color_distance(c1: &[u8; 3], c2: &[u8; 3]) -> f64 {
    (squared_distance(c1, c2) as f64).sqrt()
}

/// Set alpha to 0 on every pixel within `tolerance` of a background colour.
///
/// RGB values are kept. Pixels that are already fully transparent are not
/// examined, which makes the operation idempotent.
pub fn mask_background(img: &mut RgbaImage, colors: &BackgroundColors, tolerance: u32) -> MaskResult {
    let mut result = MaskResult {
        pixels_examined: 0,
        pixels_masked: 0,
    };

    for pixel in img.pixels_mut() {
        if pixel[3] == 0 {
            continue;
        }
        result.pixels_examined += 1;

        let rgb = [pixel[0], pixel[1], pixel[2]];
        if colors.first_match(rgb, tolerance).is_some() {
            pixel[3] = 0;
            result.pixels_masked += 1;
        }
    }

    result
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// Load, sample, mask, clamp and save one icon.
///
/// `input_path` and `output_path` may be the same file, in which case the
/// icon is overwritten in place. Nothing is written unless every prior step
/// succeeded.
pub fn remove_background(
    input_path: &Path,
    output_path: &Path,
    settings: &CleanerSettings,
) -> Result<CleanResult> {
    settings.validate()?;

    let mut rgba = load_image(input_path)?;
    let original_size = rgba.dimensions();
    debug!("Loaded {} ({}x{})", input_path.display(), original_size.0, original_size.1);

    let colors = sample_background_colors(&rgba);
    debug!("Background colours: {:?}", colors.as_slice());

    let mask = mask_background(&mut rgba, &colors, settings.tolerance);
    info!(
        "Masked {} of {} visible pixels (tolerance {})",
        mask.pixels_masked, mask.pixels_examined, settings.tolerance
    );

    let (rgba, resized) = downscaler::clamp_to_max(rgba, settings.max_dimension);
    let bytes_written = save_png(&rgba, output_path)?;

    Ok(CleanResult {
        input: input_path.to_path_buf(),
        output: output_path.to_path_buf(),
        original_size,
        final_size: rgba.dimensions(),
        background_colors: colors.into_vec(),
        pixels_masked: mask.pixels_masked,
        resized,
        bytes_written,
    })
}

// ============================================================================
// LOADING / SAVING
// ============================================================================

/// Load an image from disk as RGBA8
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)
        .map_err(|e| CleanerError::Processing(format!("Failed to load {}: {}", path.display(), e)))?;
    Ok(img.to_rgba8())
}

/// Encode image as size-optimised PNG bytes
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, PngFilter::Adaptive);
    img.write_with_encoder(encoder)?;
    Ok(buffer)
}

/// Encode, then overwrite `path` with the PNG. Returns bytes written.
pub fn save_png(img: &RgbaImage, path: &Path) -> Result<u64> {
    let bytes = encode_png(img)?;
    std::fs::write(path, &bytes)?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(bytes.len() as u64)
}

// ============================================================================
// TESTS
// ============================================================================
