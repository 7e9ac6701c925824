//! Relative image areas

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A rectangle in fractions of the source image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Area {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The full image, used whenever no crop area is configured
    pub const fn full() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    pub fn is_full(&self) -> bool {
        *self == Self::full()
    }

    /// Read an area from `{x, y, width, height}`.
    ///
    /// All four keys must be present; numeric strings are accepted.
    pub fn from_value(owner: &str, value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::invalid(owner, "area must be a map"));
        };

        let coordinate = |key: &str| -> Result<f64> {
            let raw = map
                .get(key)
                .ok_or_else(|| Error::invalid(owner, format!("area is missing '{}'", key)))?;
            number(raw).ok_or_else(|| Error::invalid(owner, format!("area '{}' is not a number", key)))
        };

        Ok(Self::new(
            coordinate("x")?,
            coordinate("y")?,
            coordinate("width")?,
            coordinate("height")?,
        ))
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "x": self.x,
            "y": self.y,
            "width": self.width,
            "height": self.height,
        })
    }
}

impl Default for Area {
    fn default() -> Self {
        Self::full()
    }
}

/// Loose numeric reading used for coordinates; only finite values count
pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|number| number.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_area_is_default() {
        assert!(Area::default().is_full());
        assert_eq!(Area::full(), Area::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_from_value_accepts_integers_and_strings() {
        let area = Area::from_value("default", &json!({"x": 0, "y": "0.25", "width": 1, "height": 0.5}))
            .unwrap();
        assert_eq!(area, Area::new(0.0, 0.25, 1.0, 0.5));
    }

    #[test]
    fn test_from_value_rejects_non_finite_strings() {
        for text in ["NaN", "inf", "-infinity"] {
            let err = Area::from_value("default", &json!({"x": text, "y": 0, "width": 1, "height": 1}))
                .unwrap_err();
            assert!(err.to_string().contains("'x' is not a number"), "{}", text);
        }
    }

    #[test]
    fn test_from_value_requires_all_coordinates() {
        let err = Area::from_value("mobile", &json!({"x": 0, "y": 0, "width": 1})).unwrap_err();
        assert!(err.to_string().contains("height"));
        assert!(err.to_string().contains("mobile"));
        assert!(Area::from_value("mobile", &json!("full")).is_err());
    }

    #[test]
    fn test_to_value_key_order() {
        let value = Area::new(0.0, 0.0, 1.0, 0.5).to_value();
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"x":0.0,"y":0.0,"width":1.0,"height":0.5}"#
        );
    }
}
