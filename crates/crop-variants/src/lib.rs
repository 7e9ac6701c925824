//! Crop variant configuration and persisted crop state
//!
//! - [`normalize`] turns the merged `cropVariants` configuration of a field
//!   into a usable [`CropVariantsConfig`], applying the built-in default
//!   variant and dropping disabled ratios and variants.
//! - [`CropVariantCollection`] parses a persisted crop string against that
//!   configuration and serializes it back.

pub mod area;
pub mod collection;
pub mod config;
pub mod error;
pub mod ratio;
pub mod variant;

pub use area::Area;
pub use collection::CropVariantCollection;
pub use config::{
    CropVariantsConfig, DEFAULT_FILE_FIELD, DEFAULT_IMAGE_FILE_EXTENSIONS, default_crop_variants,
    normalize, normalize_variants,
};
pub use error::{Error, Result};
pub use ratio::{FREE_RATIO, Ratio};
pub use variant::CropVariant;
