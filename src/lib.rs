pub mod cli;
pub mod downscaler;
pub mod error;
pub mod logger;
pub mod processor;

pub use error::{CleanerError, Result};
pub use processor::{
    mask_background, remove_background, sample_background_colors, BackgroundColors,
    CleanResult, CleanerSettings, MaskResult,
};
