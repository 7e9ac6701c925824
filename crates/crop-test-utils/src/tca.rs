//! Table schema fixtures.
//!
//! `tt_content` carries crop variants in three places:
//!
//! - `image`: column-level variants `default`, `mobile`, `square`
//! - `pi_flexform`: a gallery structure whose `slides` element declares
//!   `desktop`, `tablet`, `phone`
//! - `assets`: a file column without variants (built-in default applies)
//!
//! The `textpic` subtype disables `square` through `columnsOverrides`.

use serde_json::{Value, json};

/// Ratio definition for a label like `16:9`, or the free ratio for `NaN`
pub fn ratio(id: &str) -> Value {
    let value = match id {
        "NaN" => 0.0,
        _ => id
            .split_once(':')
            .and_then(|(w, h)| Some(w.parse::<f64>().ok()? / h.parse::<f64>().ok()?))
            .unwrap_or(1.0),
    };
    let title = if id == "NaN" { "Free" } else { id };
    json!({"title": title, "value": value})
}

/// Crop variant with the given ratios, selecting the first one
pub fn variant(title: &str, ratios: &[&str]) -> Value {
    let allowed: serde_json::Map<String, Value> = ratios
        .iter()
        .map(|id| (id.to_string(), ratio(id)))
        .collect();
    json!({
        "title": title,
        "allowedAspectRatios": allowed,
        "selectedRatio": ratios.first().copied().unwrap_or("NaN"),
        "cropArea": {"x": 0.0, "y": 0.0, "width": 1.0, "height": 1.0},
    })
}

/// `config.overrideChildTca.columns.crop.config.cropVariants` wrapper
pub fn with_crop_variants(mut config: Value, variants: Value) -> Value {
    config["overrideChildTca"] = json!({"columns": {"crop": {"config": {"cropVariants": variants}}}});
    config
}

pub fn image_variants() -> Value {
    json!({
        "default": variant("Default", &["16:9", "4:3", "NaN"]),
        "mobile": variant("Mobile", &["4:3", "NaN"]),
        "square": variant("Square", &["1:1"]),
    })
}

pub fn slide_variants() -> Value {
    json!({
        "desktop": variant("Desktop", &["16:9", "NaN"]),
        "tablet": variant("Tablet", &["16:9", "4:3"]),
        "phone": variant("Phone", &["1:1"]),
    })
}

pub fn tt_content() -> Value {
    json!({
        "ctrl": {"type": "CType", "title": "Content"},
        "columns": {
            "CType": {"config": {"type": "select"}},
            "header": {"config": {"type": "input"}},
            "header_layout": {"config": {"type": "select"}},
            "list_type": {"config": {"type": "select"}},
            "image": {"config": with_crop_variants(
                json!({"type": "file", "allowed": "common-image-types", "maxitems": 10}),
                image_variants(),
            )},
            "assets": {"config": {"type": "file", "allowed": "common-media-types"}},
            "pi_flexform": {"config": {
                "type": "flex",
                "ds_pointerField": "list_type,CType",
                "ds": {
                    "*,gallery": {"sheets": {
                        "sDEF": {"ROOT": {"el": {
                            "columns": {"config": {"type": "number"}}
                        }}},
                        "media": {"ROOT": {"el": {
                            "slides": {"config": with_crop_variants(
                                json!({"type": "file", "maxitems": 20}),
                                slide_variants(),
                            )}
                        }}}
                    }},
                    "default": {"ROOT": {"el": {
                        "note": {"config": {"type": "text"}}
                    }}}
                }
            }}
        },
        "types": {
            "textmedia": {"showitem": "--palette--;;headers, image, assets"},
            "textpic": {
                "showitem": "CType, header, image",
                "columnsOverrides": {
                    "image": {"config": {"overrideChildTca": {"columns": {"crop": {"config": {
                        "cropVariants": {"square": {"disabled": true}}
                    }}}}}}
                }
            },
            "gallery": {"showitem": "CType, header, pi_flexform"},
            "text": {"showitem": "CType, header"}
        },
        "palettes": {
            "headers": {"showitem": "CType, header, header_layout"}
        }
    })
}

pub fn sys_file_reference() -> Value {
    json!({
        "ctrl": {"title": "File reference", "hideTable": true},
        "columns": {
            "uid_local": {"config": {"type": "group", "allowed": "sys_file"}},
            "tablenames": {"config": {"type": "input"}},
            "fieldname": {"config": {"type": "input"}},
            "crop": {"config": {"type": "imageManipulation"}},
            "sync_crop_area": {"config": {"type": "check", "default": 1}}
        }
    })
}

/// A page table whose layout is selected by a foreign type pointer
pub fn pages() -> Value {
    json!({
        "ctrl": {"type": "doktype"},
        "columns": {
            "doktype": {"config": {"type": "select"}},
            "media": {"config": {"type": "file"}}
        },
        "types": {
            "1": {"showitem": "doktype, media"}
        }
    })
}

/// All tables keyed by name
pub fn tca() -> Value {
    json!({
        "tt_content": tt_content(),
        "sys_file_reference": sys_file_reference(),
        "pages": pages(),
    })
}

/// Page overrides: page 2 restricts `image` variants, page 3 tweaks a
/// subtype-specific ratio
pub fn page_config() -> Value {
    json!({
        "2": {"TCEFORM": {"tt_content": {"image": {"config": {"maxitems": 1}}}}},
        "3": {"TCEFORM": {"tt_content": {"image": {
            "types": {"textmedia": {"config": {"maxitems": 2}}}
        }}}}
    })
}
