//! Fixture files holding schema, page overrides and records

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crop_schema::{MemoryRecords, PageConfigRegistry, SchemaRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CliError, Result};

/// File format, picked by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureFormat {
    Json,
    Toml,
    Yaml,
}

impl FixtureFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(CliError::user(format!(
                "Unsupported fixture format: {} (expected .json, .toml, .yaml or .yml)",
                path.display()
            ))),
        }
    }
}

/// A materialized site: table schemas, page overrides and stored rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    /// Table name to schema
    pub tca: Map<String, Value>,

    /// Page id to override tree
    #[serde(default)]
    pub page_config: Map<String, Value>,

    /// Table name to rows
    #[serde(default)]
    pub records: Map<String, Value>,
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self> {
        let format = FixtureFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;
        let fixture = match format {
            FixtureFormat::Json => serde_json::from_str(&content)?,
            FixtureFormat::Toml => toml::from_str(&content)?,
            FixtureFormat::Yaml => serde_yaml::from_str(&content)?,
        };
        tracing::debug!(path = %path.display(), ?format, "Loaded fixture");
        Ok(fixture)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match FixtureFormat::from_path(path)? {
            FixtureFormat::Json => serde_json::to_string_pretty(self)? + "\n",
            FixtureFormat::Toml => toml::to_string_pretty(self)?,
            FixtureFormat::Yaml => serde_yaml::to_string(self)?,
        };
        fs::write(path, content)?;
        Ok(())
    }

    pub fn registry(&self) -> Result<Arc<SchemaRegistry>> {
        Ok(Arc::new(SchemaRegistry::from_json(Value::Object(self.tca.clone()))?))
    }

    pub fn pages(&self) -> Result<Arc<PageConfigRegistry>> {
        Ok(Arc::new(PageConfigRegistry::from_json(Value::Object(
            self.page_config.clone(),
        ))?))
    }

    pub fn records(&self) -> Result<MemoryRecords> {
        Ok(MemoryRecords::from_json(Value::Object(self.records.clone()))?)
    }

    /// Replace the rows with the contents of `records`
    pub fn set_records(&mut self, records: &MemoryRecords) {
        if let Value::Object(tables) = records.to_json() {
            self.records = tables;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crop_test_utils::TestWorkspace;
    use pretty_assertions::assert_eq;

    fn fixture() -> Fixture {
        serde_json::from_value(TestWorkspace::default_fixture()).unwrap()
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FixtureFormat::from_path(Path::new("a.json")).unwrap(), FixtureFormat::Json);
        assert_eq!(FixtureFormat::from_path(Path::new("a.yml")).unwrap(), FixtureFormat::Yaml);
        assert!(FixtureFormat::from_path(Path::new("a.xml")).is_err());
        assert!(FixtureFormat::from_path(Path::new("fixture")).is_err());
    }

    #[test]
    fn test_round_trip_through_every_format() {
        let workspace = TestWorkspace::new();
        let original = fixture();

        for name in ["site.json", "site.toml", "site.yaml"] {
            let path = workspace.path(name);
            original.save(&path).unwrap();
            assert_eq!(Fixture::load(&path).unwrap(), original, "format of {}", name);
        }
    }

    #[test]
    fn test_builds_sources() {
        let fixture = fixture();
        assert!(fixture.registry().unwrap().table("tt_content").is_some());
        assert_eq!(fixture.records().unwrap().rows("sys_file_reference").len(), 3);
        fixture.pages().unwrap();
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let fixture: Fixture = serde_json::from_str(r#"{"tca": {}}"#).unwrap();
        assert!(fixture.page_config.is_empty());
        assert!(fixture.records.is_empty());
    }
}
