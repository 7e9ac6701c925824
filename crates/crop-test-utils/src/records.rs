//! Record fixtures

use serde_json::{Map, Value, json};

/// Persisted crop string for `(variant, selectedRatio, [x, y, width, height])`
/// entries, in the given order
pub fn crop_state(entries: &[(&str, &str, [f64; 4])]) -> String {
    let state: Map<String, Value> = entries
        .iter()
        .map(|(id, ratio, [x, y, width, height])| {
            (
                id.to_string(),
                json!({
                    "cropArea": {"x": x, "y": y, "width": width, "height": height},
                    "selectedRatio": ratio,
                    "focusArea": null,
                }),
            )
        })
        .collect();
    Value::Object(state).to_string()
}

/// A `sys_file_reference` row with synchronization enabled
pub fn file_reference(uid: u64, table: &str, field: &str, owner: u64, pid: u64, crop: &str) -> Value {
    json!({
        "uid": uid,
        "pid": pid,
        "uid_local": 100 + uid,
        "tablenames": table,
        "fieldname": field,
        "uid_foreign": owner,
        "crop": crop,
        "sync_crop_area": 1,
    })
}

/// A `tt_content` row of the given subtype on page 1
pub fn content_element(uid: u64, ctype: &str) -> Value {
    json!({
        "uid": uid,
        "pid": 1,
        "CType": ctype,
        "list_type": "",
        "header": format!("Element {uid}"),
    })
}

/// Owning rows and file references covering the column, composite and
/// default-variant cases
pub fn records() -> Value {
    let image_crop = crop_state(&[
        ("default", "4:3", [0.1, 0.0, 0.8, 0.6]),
        ("mobile", "NaN", [0.0, 0.0, 1.0, 1.0]),
        ("square", "1:1", [0.2, 0.0, 0.6, 0.6]),
    ]);
    let slides_crop = crop_state(&[("desktop", "16:9", [0.0, 0.1, 1.0, 0.5])]);

    json!({
        "tt_content": [
            content_element(1, "textmedia"),
            content_element(2, "gallery"),
            content_element(3, "text"),
        ],
        "sys_file_reference": [
            file_reference(10, "tt_content", "image", 1, 1, &image_crop),
            file_reference(11, "tt_content", "slides", 2, 1, &slides_crop),
            file_reference(12, "tt_content", "assets", 1, 1, &slides_crop),
        ]
    })
}
