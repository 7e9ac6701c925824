//! Error types for crop-schema
//!
//! Resolution itself never fails; missing layers are `None`. These errors
//! only cover building registries from raw input.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid schema registry: {message}")]
    InvalidRegistry { message: String },

    #[error("Invalid page configuration for page {page_id}: {message}")]
    InvalidPageConfig { page_id: String, message: String },

    #[error("Invalid record in table {table}: {message}")]
    InvalidRecord { table: String, message: String },
}
