//! [`TestWorkspace`] for tests that read fixture and settings files.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

use crate::{records, tca};

/// A temporary directory holding fixture files
///
/// # Example
///
/// ```rust,no_run
/// use crop_test_utils::TestWorkspace;
///
/// let workspace = TestWorkspace::new();
/// let fixture = workspace.write_default_fixture("site.json");
/// assert!(fixture.exists());
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// The fixture document with schema, page config and records
    pub fn default_fixture() -> Value {
        json!({
            "tca": tca::tca(),
            "page_config": tca::page_config(),
            "records": records::records(),
        })
    }

    /// Write `fixture` as pretty JSON
    pub fn write_json(&self, name: &str, fixture: &Value) -> PathBuf {
        self.write(name, &serde_json::to_string_pretty(fixture).unwrap())
    }

    pub fn write_default_fixture(&self, name: &str) -> PathBuf {
        self.write_json(name, &Self::default_fixture())
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).unwrap()
    }

    pub fn read_json(&self, name: &str) -> Value {
        serde_json::from_str(&self.read(name)).unwrap()
    }

    /// Look up a row by table and uid in a fixture document
    pub fn row<'a>(fixture: &'a Value, table: &str, uid: u64) -> Option<&'a Value> {
        fixture["records"][table]
            .as_array()?
            .iter()
            .find(|row| row["uid"].as_u64() == Some(uid))
    }
}
