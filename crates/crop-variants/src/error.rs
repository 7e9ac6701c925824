//! Error types for crop-variants

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while normalizing configuration or reading crop state.
///
/// Only configuration errors are fatal for a field; state errors mean a
/// single persisted value cannot be synchronized.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A variant has no usable aspect ratio left after filtering
    #[error("Crop variants configuration {id} contains no allowed aspect ratios")]
    NoAllowedAspectRatios { id: String },

    /// `cropVariants` is present but not a map
    #[error("Crop variants configuration must be a map")]
    VariantsNotAMap,

    /// A variant definition or persisted variant cannot be interpreted
    #[error("Invalid crop variant {id}: {reason}")]
    InvalidVariant { id: String, reason: String },

    /// The persisted crop string is not valid JSON
    #[error("Persisted crop state is not valid JSON: {0}")]
    MalformedState(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error reflects a configuration authoring mistake that
    /// must be surfaced instead of absorbed
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Error::NoAllowedAspectRatios { .. } | Error::VariantsNotAMap)
    }

    pub(crate) fn invalid(id: &str, reason: impl Into<String>) -> Self {
        Error::InvalidVariant {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
