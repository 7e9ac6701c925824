//! Error types for crop-core

use std::path::PathBuf;

/// Result type for crop-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while synchronizing crop state
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A record could not be read from or written to the store
    #[error("Record store error for {table}:{uid}: {message}")]
    Store {
        table: String,
        uid: u64,
        message: String,
    },

    /// Settings file could not be read
    #[error("Settings not readable at {path}: {source}")]
    SettingsUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Transparent wrappers for underlying crate errors
    /// Crop variant configuration or state error from crop-variants
    #[error(transparent)]
    Variants(#[from] crop_variants::Error),

    /// Schema or record error from crop-schema
    #[error(transparent)]
    Schema(#[from] crop_schema::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    /// Whether the error comes from a field's crop variant configuration
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Error::Variants(err) if err.is_configuration_error())
    }
}
