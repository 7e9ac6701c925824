//! Command implementations for crop-cli

pub mod resolve;
pub mod sync;

pub use resolve::run_resolve;
pub use sync::run_sync;
