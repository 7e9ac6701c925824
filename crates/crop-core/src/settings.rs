//! Synchronization settings
//!
//! Settings come from `crop-sync.toml`. Every key is optional; keys present
//! in the file replace the defaults, and `override_allow_list` entries are
//! added per config type on top of the built-in list.
//!
//! ```toml
//! image_file_extensions = "jpg,png,webp"
//!
//! [override_allow_list]
//! imageManipulation = ["ratios", "cropVariants", "allowedExtensions"]
//! ```

use std::fs;
use std::path::Path;

use crop_schema::OverrideAllowList;
use crop_schema::field::FILE_REFERENCE_TABLE;
use crop_variants::DEFAULT_IMAGE_FILE_EXTENSIONS;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the settings file looked up in the working directory
pub const SETTINGS_FILE_NAME: &str = "crop-sync.toml";

/// Column of the file reference table holding the persisted crop state
pub const CROP_FIELD: &str = "crop";

/// Effective settings of the synchronizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Extensions allowed when a field does not restrict them
    pub image_file_extensions: String,
    /// Table holding file references
    pub file_reference_table: String,
    /// Column of the file reference table holding crop state; its schema
    /// supplies the generic crop variants
    pub crop_field: String,
    /// Keys page overrides may add to a field's `config`
    pub override_allow_list: OverrideAllowList,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            image_file_extensions: DEFAULT_IMAGE_FILE_EXTENSIONS.to_string(),
            file_reference_table: FILE_REFERENCE_TABLE.to_string(),
            crop_field: CROP_FIELD.to_string(),
            override_allow_list: OverrideAllowList::default(),
        }
    }
}

/// One settings file as written; absent keys keep the defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub image_file_extensions: Option<String>,
    pub file_reference_table: Option<String>,
    pub crop_field: Option<String>,
    pub override_allow_list: Option<OverrideAllowList>,
}

impl SettingsFile {
    /// Parse a settings file from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

impl SyncSettings {
    /// Parse TOML content and layer it over the defaults
    ///
    /// # Example
    ///
    /// ```
    /// use crop_core::SyncSettings;
    ///
    /// let settings = SyncSettings::parse(r#"image_file_extensions = "jpg""#).unwrap();
    /// assert_eq!(settings.image_file_extensions, "jpg");
    /// assert_eq!(settings.crop_field, "crop");
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let mut settings = Self::default();
        settings.merge(SettingsFile::parse(content)?);
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::SettingsUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loaded settings file");
        Self::parse(&content)
    }

    /// Load `path` when given, else `crop-sync.toml` in `dir` when present,
    /// else the defaults
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let candidate = dir.join(SETTINGS_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Layer a settings file over these settings
    pub fn merge(&mut self, file: SettingsFile) {
        if let Some(extensions) = file.image_file_extensions {
            self.image_file_extensions = extensions;
        }
        if let Some(table) = file.file_reference_table {
            self.file_reference_table = table;
        }
        if let Some(field) = file.crop_field {
            self.crop_field = field;
        }
        if let Some(allow_list) = file.override_allow_list {
            self.override_allow_list.extend(allow_list);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = SyncSettings::default();
        assert_eq!(settings.file_reference_table, "sys_file_reference");
        assert_eq!(settings.crop_field, "crop");
        assert!(settings.image_file_extensions.contains("webp"));
        assert!(
            settings
                .override_allow_list
                .allows(Some("file"), "overrideChildTca")
        );
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        assert_eq!(SyncSettings::parse("").unwrap(), SyncSettings::default());
    }

    #[test]
    fn test_allow_list_entries_extend_defaults() {
        let settings = SyncSettings::parse(
            r#"
[override_allow_list]
file = ["maxitems"]
imageManipulation = ["allowedExtensions"]
"#,
        )
        .unwrap();

        let allow = &settings.override_allow_list;
        assert!(allow.allows(Some("imageManipulation"), "allowedExtensions"));
        assert!(allow.allows(Some("imageManipulation"), "cropVariants"));
        assert!(allow.allows(Some("file"), "maxitems"));
        assert!(allow.allows(Some("file"), "overrideChildTca"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = SyncSettings::parse("image_extensions = \"jpg\"").unwrap_err();
        assert!(matches!(err, Error::TomlDe(_)));
    }

    #[test]
    fn test_discover() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            SyncSettings::discover(None, dir.path()).unwrap(),
            SyncSettings::default()
        );

        fs::write(dir.path().join(SETTINGS_FILE_NAME), "crop_field = \"crop_state\"\n").unwrap();
        let settings = SyncSettings::discover(None, dir.path()).unwrap();
        assert_eq!(settings.crop_field, "crop_state");

        let missing = dir.path().join("missing.toml");
        let err = SyncSettings::discover(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, Error::SettingsUnreadable { .. }));
    }
}
