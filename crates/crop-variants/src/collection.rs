//! Persisted crop state

use crop_tree::deep_merge;
use serde_json::{Map, Value};

use crate::area::Area;
use crate::config::CropVariantsConfig;
use crate::error::Result;
use crate::variant::CropVariant;

/// The crop variants of one file reference, read from the persisted crop
/// string and the field's configuration
///
/// Serialization starts from the persisted entries: an entry is rewritten
/// only where its variant's selected ratio or crop area changed, so
/// untouched entries keep their exact persisted form.
#[derive(Debug, Clone, PartialEq)]
pub struct CropVariantCollection {
    variants: Vec<CropVariant>,
    /// Parsed persisted entries, in persisted order
    persisted: Map<String, Value>,
    /// Selection of each variant as read, to tell which ones changed
    baseline: Vec<(Option<String>, Area)>,
}

impl CropVariantCollection {
    pub fn new(variants: Vec<CropVariant>) -> Self {
        Self::with_persisted(variants, Map::new())
    }

    fn with_persisted(variants: Vec<CropVariant>, persisted: Map<String, Value>) -> Self {
        let baseline = variants
            .iter()
            .map(|variant| (variant.selected_ratio.clone(), variant.crop_area))
            .collect();
        Self {
            variants,
            persisted,
            baseline,
        }
    }

    /// Parse a persisted crop string against the configured variants.
    ///
    /// Every configured variant appears in configuration order, with its
    /// persisted entry deep-merged over the definition. Persisted entries
    /// for unknown variants are ignored. Without any configured variants the
    /// persisted entries are taken as they are.
    ///
    /// An empty string is an empty state. JSON that is not an object is
    /// treated the same way.
    pub fn create(persisted: &str, config: &CropVariantsConfig) -> Result<Self> {
        let persisted = parse_persisted(persisted)?;

        let merged: Vec<(String, Value)> = if config.is_empty() {
            persisted.clone().into_iter().collect()
        } else {
            config
                .variants
                .iter()
                .map(|(id, definition)| {
                    let mut variant = definition.clone().into_json();
                    if let Some(state) = persisted.get(id) {
                        deep_merge(&mut variant, state);
                    }
                    (id.clone(), variant)
                })
                .collect()
        };

        let variants = merged
            .iter()
            .map(|(id, variant)| CropVariant::from_config(id, variant))
            .collect::<Result<_>>()?;

        Ok(Self::with_persisted(variants, persisted))
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn first(&self) -> Option<&CropVariant> {
        self.variants.first()
    }

    pub fn get(&self, id: &str) -> Option<&CropVariant> {
        self.variants.iter().find(|variant| variant.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CropVariant> {
        self.variants.iter()
    }

    pub fn variants_mut(&mut self) -> &mut [CropVariant] {
        &mut self.variants
    }

    /// Persisted JSON: `{id: {cropArea, selectedRatio, focusArea}}`.
    ///
    /// Variants come in configuration order. A variant with a persisted
    /// entry keeps that entry, with `cropArea` and `selectedRatio` replaced
    /// only when they changed; a variant without one is written in full.
    /// Persisted entries of unconfigured variants are kept at the end.
    pub fn to_persisted_json(&self) -> Value {
        let mut state = Map::new();

        for (variant, baseline) in self.variants.iter().zip(&self.baseline) {
            let entry = match self.persisted.get(&variant.id) {
                Some(Value::Object(entry)) => {
                    let mut entry = entry.clone();
                    if (&variant.selected_ratio, variant.crop_area) != (&baseline.0, baseline.1) {
                        entry.insert("cropArea".to_string(), variant.crop_area.to_value());
                        entry.insert("selectedRatio".to_string(), variant.selected_json());
                    }
                    Value::Object(entry)
                }
                _ => variant.persisted_json(),
            };
            state.insert(variant.id.clone(), entry);
        }

        for (id, entry) in &self.persisted {
            if !state.contains_key(id) {
                state.insert(id.clone(), entry.clone());
            }
        }

        Value::Object(state)
    }

    /// Serialized form written back to the crop column
    pub fn to_persisted_string(&self) -> String {
        self.to_persisted_json().to_string()
    }

    /// Full form of every variant, keyed by id
    pub fn as_json(&self) -> Value {
        Value::Object(
            self.variants
                .iter()
                .map(|variant| (variant.id.clone(), variant.as_json()))
                .collect(),
        )
    }
}

fn parse_persisted(persisted: &str) -> Result<Map<String, Value>> {
    if persisted.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(persisted)? {
        Value::Object(map) => Ok(map),
        other => {
            tracing::debug!(kind = ?other, "Persisted crop state is not an object, ignoring it");
            Ok(Map::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::normalize_variants;
    use crate::error::Error;
    use crop_tree::ConfigTree;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config() -> CropVariantsConfig {
        let variants = json!({
            "default": {
                "title": "Default",
                "allowedAspectRatios": {
                    "16:9": {"title": "16:9", "value": 1.7777777777777777},
                    "4:3": {"title": "4:3", "value": 1.3333333333333333}
                },
                "selectedRatio": "16:9"
            },
            "mobile": {
                "title": "Mobile",
                "allowedAspectRatios": {"4:3": {"title": "4:3", "value": 1.3333333333333333}}
            }
        });
        normalize_variants(&ConfigTree::from_json(variants).unwrap(), "jpg").unwrap()
    }

    #[test]
    fn test_empty_state_uses_configuration() {
        let collection = CropVariantCollection::create("", &config()).unwrap();

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.first().unwrap().id, "default");
        assert_eq!(collection.first().unwrap().crop_area, Area::full());
        assert_eq!(collection.get("mobile").unwrap().selected_ratio(), Some("4:3"));
    }

    #[test]
    fn test_persisted_values_override_configuration() {
        let persisted = r#"{"mobile":{"cropArea":{"x":0.1,"y":0.2,"width":0.5,"height":0.4},"selectedRatio":"4:3","focusArea":null}}"#;
        let collection = CropVariantCollection::create(persisted, &config()).unwrap();

        let mobile = collection.get("mobile").unwrap();
        assert_eq!(mobile.crop_area, Area::new(0.1, 0.2, 0.5, 0.4));
        assert!(mobile.focus_area.is_none());
    }

    #[test]
    fn test_configuration_order_wins() {
        let persisted = r#"{"mobile":{"selectedRatio":"4:3"},"default":{"selectedRatio":"4:3"}}"#;
        let collection = CropVariantCollection::create(persisted, &config()).unwrap();

        let ids: Vec<_> = collection.iter().map(|variant| variant.id.as_str()).collect();
        assert_eq!(ids, vec!["default", "mobile"]);
        assert_eq!(collection.first().unwrap().selected_ratio(), Some("4:3"));
    }

    #[test]
    fn test_unknown_persisted_variants_are_ignored() {
        let persisted = r#"{"retired":{"cropArea":{"x":0,"y":0,"width":1,"height":1}}}"#;
        let collection = CropVariantCollection::create(persisted, &config()).unwrap();
        assert!(collection.get("retired").is_none());
    }

    #[test]
    fn test_malformed_state() {
        let err = CropVariantCollection::create("{not json", &config()).unwrap_err();
        assert!(matches!(err, Error::MalformedState(_)));
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn test_non_object_state_is_empty() {
        let collection = CropVariantCollection::create("[1, 2]", &config()).unwrap();
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_invalid_persisted_area() {
        let persisted = r#"{"default":{"cropArea":{"x":"left","y":0,"width":1,"height":1}}}"#;
        let err = CropVariantCollection::create(persisted, &config()).unwrap_err();
        assert!(matches!(err, Error::InvalidVariant { ref id, .. } if id == "default"));
    }

    #[test]
    fn test_to_persisted_string() {
        let collection = CropVariantCollection::create("", &config()).unwrap();
        assert_eq!(
            collection.to_persisted_string(),
            concat!(
                r#"{"default":{"cropArea":{"x":0.0,"y":0.0,"width":1.0,"height":1.0},"selectedRatio":"16:9","focusArea":null},"#,
                r#""mobile":{"cropArea":{"x":0.0,"y":0.0,"width":1.0,"height":1.0},"selectedRatio":"4:3","focusArea":null}}"#
            )
        );
    }

    #[test]
    fn test_untouched_entries_keep_persisted_form() {
        let persisted = r#"{"default":{"cropArea":{"x":0,"y":0,"width":1,"height":0.5},"selectedRatio":"16:9"},"mobile":{"cropArea":{"x":0,"y":0,"width":1,"height":1},"selectedRatio":"4:3","note":"kept"}}"#;
        let mut collection = CropVariantCollection::create(persisted, &config()).unwrap();
        assert_eq!(collection.to_persisted_string(), persisted);

        let canonical = collection.first().unwrap().clone();
        collection.variants_mut()[1].adopt(&canonical);
        assert_eq!(
            collection.to_persisted_string(),
            concat!(
                r#"{"default":{"cropArea":{"x":0,"y":0,"width":1,"height":0.5},"selectedRatio":"16:9"},"#,
                r#""mobile":{"cropArea":{"x":0.0,"y":0.0,"width":1.0,"height":0.5},"selectedRatio":"16:9","note":"kept"}}"#
            )
        );
    }

    #[test]
    fn test_stale_selected_ratio_is_kept_when_untouched() {
        let persisted = r#"{"mobile":{"cropArea":{"x":0,"y":0,"width":1,"height":1},"selectedRatio":"16:9"}}"#;
        let collection = CropVariantCollection::create(persisted, &config()).unwrap();

        assert_eq!(collection.get("mobile").unwrap().selected_ratio(), Some("4:3"));
        let state = collection.to_persisted_json();
        assert_eq!(state["mobile"]["selectedRatio"], json!("16:9"));
        // Missing variants are filled in from the configuration
        assert_eq!(state["default"]["selectedRatio"], json!("16:9"));
    }

    #[test]
    fn test_unconfigured_entries_are_kept() {
        let persisted = r#"{"retired":{"cropArea":{"x":0,"y":0,"width":1,"height":1}}}"#;
        let collection = CropVariantCollection::create(persisted, &config()).unwrap();

        let state = collection.to_persisted_json();
        let ids: Vec<_> = state.as_object().unwrap().keys().cloned().collect();
        assert_eq!(ids, vec!["default", "mobile", "retired"]);
    }

    #[test]
    fn test_as_json_includes_ratios() {
        let collection = CropVariantCollection::create("", &config()).unwrap();
        let json = collection.as_json();
        assert_eq!(json["mobile"]["title"], json!("Mobile"));
        assert_eq!(json["mobile"]["allowedAspectRatios"]["4:3"]["id"], json!("4:3"));
    }
}
