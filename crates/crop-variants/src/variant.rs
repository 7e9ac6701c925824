//! A single crop variant

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::area::Area;
use crate::error::{Error, Result};
use crate::ratio::Ratio;

/// One crop variant of an image, with its configured ratios and current
/// selection
#[derive(Debug, Clone, PartialEq)]
pub struct CropVariant {
    pub id: String,
    pub title: String,
    pub crop_area: Area,
    pub allowed_aspect_ratios: IndexMap<String, Ratio>,
    pub selected_ratio: Option<String>,
    pub focus_area: Option<Area>,
    pub cover_areas: Vec<Area>,
}

impl CropVariant {
    /// Build a variant from its merged configuration map.
    ///
    /// `title` and `cropArea` are required. A `selectedRatio` that is not
    /// among the allowed ratios falls back to the first allowed ratio.
    pub fn from_config(id: &str, config: &Value) -> Result<Self> {
        let Value::Object(config) = config else {
            return Err(Error::invalid(id, "configuration must be a map"));
        };

        let title = match config.get("title") {
            Some(Value::String(title)) => title.clone(),
            Some(Value::Number(number)) => number.to_string(),
            _ => return Err(Error::invalid(id, "missing title")),
        };

        let crop_area = config
            .get("cropArea")
            .ok_or_else(|| Error::invalid(id, "missing cropArea"))
            .and_then(|area| Area::from_value(id, area))?;

        let allowed_aspect_ratios = match config.get("allowedAspectRatios") {
            None | Some(Value::Null) => IndexMap::new(),
            Some(Value::Object(ratios)) => Ratio::from_map(id, ratios)?,
            Some(Value::Array(ratios)) if ratios.is_empty() => IndexMap::new(),
            Some(_) => return Err(Error::invalid(id, "allowedAspectRatios must be a map")),
        };

        let requested = config.get("selectedRatio").and_then(ratio_key);
        let selected_ratio = match requested {
            Some(key) if allowed_aspect_ratios.contains_key(&key) => Some(key),
            _ => allowed_aspect_ratios.keys().next().cloned(),
        };

        let focus_area = match config.get("focusArea") {
            None | Some(Value::Null) => None,
            Some(area) => Some(Area::from_value(id, area)?),
        };

        let cover_areas = match config.get("coverAreas") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(areas)) => areas
                .iter()
                .map(|area| Area::from_value(id, area))
                .collect::<Result<_>>()?,
            Some(_) => return Err(Error::invalid(id, "coverAreas must be a list")),
        };

        Ok(Self {
            id: id.to_string(),
            title,
            crop_area,
            allowed_aspect_ratios,
            selected_ratio,
            focus_area,
            cover_areas,
        })
    }

    pub fn allows_ratio(&self, ratio: &str) -> bool {
        self.allowed_aspect_ratios.contains_key(ratio)
    }

    pub fn selected_ratio(&self) -> Option<&str> {
        self.selected_ratio.as_deref()
    }

    /// Adopt the selection and crop area of another variant
    pub fn adopt(&mut self, canonical: &CropVariant) {
        self.selected_ratio = canonical.selected_ratio.clone();
        self.crop_area = canonical.crop_area;
    }

    /// The persisted form: `{cropArea, selectedRatio, focusArea}`
    pub fn persisted_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("cropArea".to_string(), self.crop_area.to_value());
        map.insert("selectedRatio".to_string(), self.selected_json());
        map.insert("focusArea".to_string(), self.focus_json());
        Value::Object(map)
    }

    /// The full form including title and ratios
    pub fn as_json(&self) -> Value {
        let ratios: Map<String, Value> = self
            .allowed_aspect_ratios
            .iter()
            .map(|(id, ratio)| (id.clone(), ratio.to_value()))
            .collect();

        let mut map = Map::new();
        map.insert("id".to_string(), Value::String(self.id.clone()));
        map.insert("title".to_string(), Value::String(self.title.clone()));
        map.insert("cropArea".to_string(), self.crop_area.to_value());
        map.insert("allowedAspectRatios".to_string(), Value::Object(ratios));
        map.insert("selectedRatio".to_string(), self.selected_json());
        map.insert("focusArea".to_string(), self.focus_json());
        map.insert(
            "coverAreas".to_string(),
            if self.cover_areas.is_empty() {
                Value::Null
            } else {
                Value::Array(self.cover_areas.iter().map(Area::to_value).collect())
            },
        );
        Value::Object(map)
    }

    pub(crate) fn selected_json(&self) -> Value {
        self.selected_ratio
            .as_ref()
            .map_or(Value::Null, |ratio| Value::String(ratio.clone()))
    }

    fn focus_json(&self) -> Value {
        self.focus_area.as_ref().map_or(Value::Null, Area::to_value)
    }
}

/// Ratio keys may be persisted as numbers (`1` for "1")
fn ratio_key(value: &Value) -> Option<String> {
    match value {
        Value::String(key) if !key.is_empty() => Some(key.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
