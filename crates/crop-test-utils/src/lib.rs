//! Shared test fixtures for the crop synchronization workspace.
//!
//! Fixtures are plain JSON values so that every crate can load them into its
//! own types. This crate is a dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`tca`]: table schemas with crop variants at column and composite level
//! - [`records`]: owning rows, file references and persisted crop strings
//! - [`workspace`]: [`TestWorkspace`] writing fixture files to a temp dir

pub mod records;
pub mod tca;
pub mod workspace;

pub use workspace::TestWorkspace;
