// ============================================================================
// icon-cleaner CLI
// ============================================================================
//
// Usage examples:
//   icon-cleaner                                  (cleans <cwd>/public/ticketbi-icon.png in place)
//   icon-cleaner --root ../site --icon logo.png   (cleans ../site/public/logo.png in place)
//   icon-cleaner raw.png -o public/icon.png -t 30
//   icon-cleaner raw.png --json

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::downscaler::DEFAULT_MAX_DIMENSION;
use crate::processor::{self, CleanResult, CleanerSettings, DEFAULT_TOLERANCE};
use crate::error::Result;

/// Icon file cleaned when no input is given
pub const DEFAULT_ICON_NAME: &str = "ticketbi-icon.png";

/// Directory under the project root that holds the icon
pub const PUBLIC_DIR: &str = "public";

/// Strip a solid background colour from a PNG icon.
///
/// Border pixels are sampled to find the background, matching pixels are
/// made transparent, and icons larger than 512px on a side are clamped.
#[derive(Parser, Debug)]
#[command(name = "icon-cleaner", version)]
pub struct CliArgs {
    /// Input PNG. Defaults to <ROOT>/public/<ICON>.
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Output PNG. Defaults to the input path (overwritten in place).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Maximum Euclidean RGB distance treated as background.
    #[arg(short, long, default_value_t = DEFAULT_TOLERANCE)]
    pub tolerance: u32,

    /// Largest width or height kept; each axis is clamped independently.
    #[arg(long, default_value_t = DEFAULT_MAX_DIMENSION, value_name = "PX")]
    pub max_size: u32,

    /// Project root used to resolve the default input. Defaults to the
    /// current working directory; pass it explicitly when running from elsewhere.
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub root: PathBuf,

    /// Icon file name under <ROOT>/public used when INPUT is omitted.
    #[arg(long, default_value = DEFAULT_ICON_NAME, value_name = "NAME")]
    pub icon: String,

    /// Print the result as JSON instead of the summary line.
    #[arg(long)]
    pub json: bool,

    /// Show debug output (sampled colours, resize decisions).
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    pub fn settings(&self) -> CleanerSettings {
        CleanerSettings {
            tolerance: self.tolerance,
            max_dimension: self.max_size,
        }
    }

    /// Explicit input, or `<root>/public/<icon>`
    pub fn input_path(&self) -> PathBuf {
        match &self.input {
            Some(path) => path.clone(),
            None => default_icon_path(&self.root, &self.icon),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.input_path())
    }
}

pub fn default_icon_path(root: &Path, icon: &str) -> PathBuf {
    root.join(PUBLIC_DIR).join(icon)
}

/// Summary printed after a successful save
pub fn summary_line(result: &CleanResult) -> String {
    format!(
        "Saved to {} ({} KB)",
        result.output.display(),
        result.bytes_written / 1024
    )
}

/// Clean the icon described by `args` and return the text to print.
pub fn run(args: &CliArgs) -> Result<String> {
    let input = args.input_path();
    let output = args.output_path();

    let result = processor::remove_background(&input, &output, &args.settings())?;

    if args.json {
        Ok(serde_json::to_string_pretty(&result)?)
    } else {
        Ok(summary_line(&result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba, RgbaImage};

    #[test]
    fn test_zero_args_resolve_default_icon() {
        let args = CliArgs::parse_from(["icon-cleaner"]);
        assert_eq!(args.root, PathBuf::from("."));
        assert_eq!(args.input_path(), Path::new(".").join("public").join("ticketbi-icon.png"));
        assert_eq!(args.output_path(), args.input_path());
        assert_eq!(args.tolerance, 20);
        assert_eq!(args.max_size, 512);
        assert!(!args.json);
    }

    #[test]
    fn test_explicit_paths_and_tolerance() {
        let args = CliArgs::parse_from(["icon-cleaner", "in.png", "-o", "out.png", "-t", "35"]);
        assert_eq!(args.input_path(), PathBuf::from("in.png"));
        assert_eq!(args.output_path(), PathBuf::from("out.png"));
        assert_eq!(args.settings().tolerance, 35);
    }

    #[test]
    fn test_root_and_icon_override() {
        let args = CliArgs::parse_from(["icon-cleaner", "--root", "site", "--icon", "logo.png"]);
        assert_eq!(args.input_path(), PathBuf::from("site/public/logo.png"));
    }

    #[test]
    fn test_summary_line_uses_whole_kilobytes() {
        let result = CleanResult {
            input: PathBuf::from("a.png"),
            output: PathBuf::from("b.png"),
            original_size: (10, 10),
            final_size: (10, 10),
            background_colors: vec![[0, 0, 0]],
            pixels_masked: 0,
            resized: false,
            bytes_written: 2047,
        };
        assert_eq!(summary_line(&result), "Saved to b.png (1 KB)");
    }

    #[test]
    fn test_run_cleans_default_icon_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let public = dir.path().join("public");
        std::fs::create_dir(&public).unwrap();
        let icon = public.join(DEFAULT_ICON_NAME);

        let mut img: RgbaImage = ImageBuffer::from_pixel(32, 32, Rgba([255, 255, 255, 255]));
        img.put_pixel(16, 16, Rgba([0, 0, 0, 255]));
        img.save(&icon).unwrap();

        let root = dir.path().to_str().unwrap();
        let args = CliArgs::parse_from(["icon-cleaner", "--root", root, "--json"]);
        let report = run(&args).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(parsed["pixels_masked"], 32 * 32 - 1);
        assert_eq!(parsed["resized"], false);

        let saved = image::open(&icon).unwrap().to_rgba8();
        assert_eq!(saved.get_pixel(0, 0)[3], 0);
        assert_eq!(*saved.get_pixel(16, 16), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_run_missing_default_icon_fails() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let args = CliArgs::parse_from(["icon-cleaner", "--root", root]);
        assert!(run(&args).is_err());
    }
}
