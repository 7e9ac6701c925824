//! Aspect ratios

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::area::number;
use crate::error::{Error, Result};

/// Label of the free-form ratio, whose value is 0
pub const FREE_RATIO: &str = "NaN";

/// An allowed aspect ratio of a crop variant
#[derive(Debug, Clone, PartialEq)]
pub struct Ratio {
    pub id: String,
    pub title: String,
    pub value: f64,
}

impl Ratio {
    /// Read a ratio from `{title, value}`
    pub fn from_value(variant: &str, id: &str, value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::invalid(variant, format!("ratio '{}' must be a map", id)));
        };

        let title = map
            .get("title")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::invalid(variant, format!("ratio '{}' has no title", id)))?;
        let ratio_value = map
            .get("value")
            .and_then(number)
            .ok_or_else(|| Error::invalid(variant, format!("ratio '{}' has no numeric value", id)))?;

        Ok(Self {
            id: id.to_string(),
            title: title.to_string(),
            value: ratio_value,
        })
    }

    /// Read all ratios of a variant in declaration order
    pub fn from_map(variant: &str, ratios: &Map<String, Value>) -> Result<IndexMap<String, Ratio>> {
        ratios
            .iter()
            .map(|(id, value)| Ok((id.clone(), Ratio::from_value(variant, id, value)?)))
            .collect()
    }

    /// A free ratio places no constraint on the crop shape
    pub fn is_free(&self) -> bool {
        self.value == 0.0
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "title": self.title,
            "value": self.value,
        })
    }
}
