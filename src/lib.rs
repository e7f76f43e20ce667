//! Confyglot - cascading configuration loader for TOML, JSON, YAML and INI.
//!
//! This library provides:
//! - Discovery of `.project.<ext>` files from a root directory down to a target
//! - Format adapters producing one [`Value`](value::Value) tree
//! - Normalization so the same document loads identically from any format
//! - Optional JSON schema validation and shallow cascading merge
//!
//! # Example
//!
//! ```no_run
//! use confyglot::config::{LoadOptions, Loader, Options};
//! use std::path::Path;
//!
//! let loader = Loader::new(Options::default()).unwrap();
//! let config = loader
//!     .load(
//!         Path::new("/work/repo/packages/app"),
//!         &LoadOptions {
//!             root: Some("/work/repo".into()),
//!         },
//!     )
//!     .unwrap();
//!
//! if let Some(config) = config {
//!     println!("title: {:?}", config.get("title"));
//! }
//! ```

pub mod config;
pub mod error;
pub mod formats;
pub mod fs;
pub mod normalize;
pub mod schema;
pub mod value;

pub use config::{LoadOptions, Loader, Options, load};
pub use error::{ConfyglotError, FileError, NormalizeError, Result};
pub use value::{Map, Number, Value};
