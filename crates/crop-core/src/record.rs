//! File reference rows as seen by the synchronizer

use crop_schema::Record;
use crop_schema::records::int_value;
use crop_tree::is_truthy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::settings::CROP_FIELD;

/// A file reference row with the columns the synchronizer reads.
///
/// Column values are read loosely (ids may be numeric strings, the sync flag
/// may be `"1"`). All other columns are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncableRecord {
    #[serde(default, deserialize_with = "loose_u64")]
    pub uid: u64,

    /// Table of the record owning this reference
    #[serde(rename = "tablenames", default, deserialize_with = "loose_string")]
    pub table: String,

    /// Field of the owning record
    #[serde(rename = "fieldname", default, deserialize_with = "loose_string")]
    pub field: String,

    #[serde(rename = "uid_foreign", default, deserialize_with = "loose_u64")]
    pub parent_record_id: u64,

    #[serde(rename = "pid", default, deserialize_with = "loose_u64")]
    pub page_id: u64,

    /// Persisted crop JSON
    #[serde(rename = "crop", default, deserialize_with = "loose_string")]
    pub crop_state: String,

    #[serde(
        rename = "sync_crop_area",
        default,
        deserialize_with = "loose_bool",
        serialize_with = "bool_as_int"
    )]
    pub sync_enabled: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SyncableRecord {
    /// Read a stored row whose crop state lives in `crop_field`
    pub fn from_row(mut row: Record, crop_field: &str) -> serde_json::Result<Self> {
        if crop_field != CROP_FIELD {
            if let Some(crop) = row.shift_remove(crop_field) {
                row.insert(CROP_FIELD.to_string(), crop);
            }
        }
        serde_json::from_value(Value::Object(row))
    }

    /// Whether the row carries everything needed to synchronize
    pub fn is_eligible(&self) -> bool {
        self.sync_enabled
            && !self.crop_state.is_empty()
            && !self.table.is_empty()
            && !self.field.is_empty()
            && self.parent_record_id != 0
            && self.page_id != 0
    }

    /// Back into a stored row
    pub fn into_row(self) -> serde_json::Result<Record> {
        match serde_json::to_value(self)? {
            Value::Object(row) => Ok(row),
            _ => Ok(Record::new()),
        }
    }
}

fn loose_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(int_value(&Value::deserialize(deserializer)?).unwrap_or_default())
}

fn loose_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(is_truthy(&Value::deserialize(deserializer)?))
}

fn loose_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "1".to_string(),
        other => other.to_string(),
    })
}

fn bool_as_int<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*flag))
}
