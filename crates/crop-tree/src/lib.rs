//! Ordered configuration trees for crop synchronization
//!
//! Schema registries, page overrides and crop variant definitions are all
//! modelled as [`ConfigTree`]s: ordered string-keyed maps whose values are
//! scalars or nested trees. This crate provides:
//!
//! - **Path lookup**: dotted (`config.cropVariants`) or segment paths that
//!   return `None` for absent nodes instead of failing
//! - **Deep merge**: recursive overlay where the overlay wins on scalars and
//!   base-only keys survive
//! - **Known-key override**: a shallow merge that only replaces keys the base
//!   already knows about (or that an allow list admits)
//!
//! # Example
//!
//! ```
//! use crop_tree::ConfigTree;
//! use serde_json::json;
//!
//! let mut base = ConfigTree::from_json(json!({"config": {"a": 1, "b": 2}})).unwrap();
//! let overlay = ConfigTree::from_json(json!({"config": {"b": 3, "c": 4}})).unwrap();
//! base.deep_merge(&overlay);
//!
//! assert_eq!(base.get("config.b"), Some(&json!(3)));
//! assert_eq!(base.get("config.a"), Some(&json!(1)));
//! assert_eq!(base.get("config.missing"), None);
//! ```

pub mod merge;
pub mod path;
pub mod tree;

pub use merge::{deep_merge, override_known};
pub use path::{ConfigPath, get_at_path, get_at_path_mut, remove_at_path, set_at_path};
pub use tree::{ConfigTree, is_truthy};
