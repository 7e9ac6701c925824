//! Error types for crop-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from crop-core
    #[error(transparent)]
    Core(#[from] crop_core::Error),

    /// Error from crop-schema
    #[error(transparent)]
    Schema(#[from] crop_schema::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON fixture error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML fixture parse error
    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML fixture write error
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// YAML fixture error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
