//! Normalizing crop variant configuration
//!
//! The merged configuration of an image field may omit crop variants
//! entirely, disable individual ratios or variants, or leave out the crop
//! area. [`normalize`] applies the defaults and filters so that every
//! surviving variant can be instantiated.

use crop_tree::{ConfigTree, is_truthy};
use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use crate::area::Area;
use crate::error::{Error, Result};

/// Image extensions allowed when neither the field nor the settings name any
pub const DEFAULT_IMAGE_FILE_EXTENSIONS: &str = "gif,jpg,jpeg,tif,tiff,bmp,pcx,tga,png,pdf,ai,svg,webp";

/// Column of the file reference pointing at the file itself
pub const DEFAULT_FILE_FIELD: &str = "uid_local";

const CROP_VARIANTS_KEY: &str = "cropVariants";
const LABELS: &str = "LLL:EXT:core/Resources/Private/Language/locallang_wizards.xlf";

/// The usable crop variant configuration of one field
#[derive(Debug, Clone, PartialEq)]
pub struct CropVariantsConfig {
    /// Variant id to definition, in declaration order
    pub variants: IndexMap<String, ConfigTree>,
    pub allowed_extensions: String,
    pub file_field: String,
}

impl CropVariantsConfig {
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn variant(&self, id: &str) -> Option<&ConfigTree> {
        self.variants.get(id)
    }

    pub fn variant_ids(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    /// `cropVariants` map as a JSON object
    pub fn variants_json(&self) -> Value {
        Value::Object(
            self.variants
                .iter()
                .map(|(id, tree)| (id.clone(), tree.clone().into_json()))
                .collect(),
        )
    }

    /// Full configuration in the shape it was read from
    pub fn to_json(&self) -> Value {
        json!({
            "file_field": self.file_field,
            "allowedExtensions": self.allowed_extensions,
            "cropVariants": self.variants_json(),
        })
    }
}

/// The variant used when a field configures none
pub fn default_crop_variants() -> ConfigTree {
    let ratio = |label: &str, value: f64| {
        json!({
            "title": format!("{LABELS}:imwizard.ratio.{label}"),
            "value": value,
        })
    };

    let variants = json!({
        "default": {
            "title": format!("{LABELS}:imwizard.crop_variant.default"),
            "allowedAspectRatios": {
                "16:9": ratio("16_9", 16.0 / 9.0),
                "3:2": ratio("3_2", 3.0 / 2.0),
                "4:3": ratio("4_3", 4.0 / 3.0),
                "1:1": ratio("1_1", 1.0),
                "NaN": ratio("free", 0.0),
            },
            "selectedRatio": "NaN",
            "cropArea": Area::full().to_value(),
        }
    });

    ConfigTree::from_json_lossy(variants)
}

/// Normalize a field configuration holding `cropVariants` and optionally
/// `allowedExtensions` and `file_field`.
///
/// # Errors
///
/// - [`Error::VariantsNotAMap`] when `cropVariants` is not a map
/// - [`Error::NoAllowedAspectRatios`] when an enabled variant has no
///   enabled ratio left
/// - [`Error::InvalidVariant`] when a variant entry is not a map
pub fn normalize(raw: &ConfigTree, image_file_extensions: &str) -> Result<CropVariantsConfig> {
    let variants = match raw.get(CROP_VARIANTS_KEY) {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(variants)) => variants.clone(),
        Some(Value::Array(list)) if list.is_empty() => Map::new(),
        Some(_) => return Err(Error::VariantsNotAMap),
    };

    let variants = if variants.is_empty() {
        tracing::debug!("No crop variants configured, using the default variant");
        default_crop_variants().into_map()
    } else {
        variants
    };

    let mut normalized = IndexMap::new();
    for (id, variant) in variants {
        let Value::Object(variant) = variant else {
            return Err(Error::invalid(&id, "variant configuration must be a map"));
        };
        if let Some(variant) = normalize_variant(&id, variant)? {
            normalized.insert(id, ConfigTree::from(variant));
        }
    }

    let allowed_extensions = match raw.get("allowedExtensions") {
        Some(Value::String(extensions)) => extensions.clone(),
        None | Some(Value::Null) => image_file_extensions.to_string(),
        Some(other) => other.to_string(),
    };

    let file_field = raw
        .get_str("file_field")
        .filter(|field| !field.is_empty())
        .unwrap_or(DEFAULT_FILE_FIELD)
        .to_string();

    Ok(CropVariantsConfig {
        variants: normalized,
        allowed_extensions,
        file_field,
    })
}

/// Normalize a bare `cropVariants` tree
pub fn normalize_variants(crop_variants: &ConfigTree, image_file_extensions: &str) -> Result<CropVariantsConfig> {
    let mut raw = ConfigTree::new();
    raw.insert(CROP_VARIANTS_KEY, crop_variants.clone().into_json());
    normalize(&raw, image_file_extensions)
}

/// `None` when the variant is disabled
fn normalize_variant(id: &str, mut variant: Map<String, Value>) -> Result<Option<Map<String, Value>>> {
    let ratios: Map<String, Value> = match variant.get("allowedAspectRatios") {
        Some(Value::Object(ratios)) => ratios
            .iter()
            .filter(|(_, ratio)| !ratio.get("disabled").is_some_and(is_truthy))
            .map(|(key, ratio)| (key.clone(), ratio.clone()))
            .collect(),
        _ => Map::new(),
    };

    if variant.get("disabled").is_some_and(is_truthy) {
        tracing::debug!(variant = id, "Skipping disabled crop variant");
        return Ok(None);
    }

    if ratios.is_empty() {
        return Err(Error::NoAllowedAspectRatios { id: id.to_string() });
    }

    // Existing keys keep their position on insert
    variant.insert("allowedAspectRatios".to_string(), Value::Object(ratios));

    if !variant.get("cropArea").is_some_and(is_truthy) {
        variant.insert("cropArea".to_string(), Area::full().to_value());
    }

    Ok(Some(variant))
}
