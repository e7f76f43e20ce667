use std::path::PathBuf;
use std::sync::Arc;

use crate::formats::Format;
use crate::fs::{FileSystem, OsFileSystem};
use crate::value::Map;

/// How normalized dates are represented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateMode {
	/// ISO-8601 text in UTC with milliseconds, e.g. `1985-10-21T19:30:00.000Z`.
	/// Lets a TOML or YAML date compare equal to the same date written as a
	/// JSON or INI string.
	#[default]
	Iso8601String,

	/// Keep [`Value::Datetime`](crate::value::Value::Datetime).
	Native,
}

/// Configuration of a [`Loader`](crate::config::Loader). Read-only once the loader is built.
#[derive(Debug, Clone)]
pub struct Options {
	/// File name without extension used to recognize configuration files.
	/// The leading dot is literal.
	pub config_prefix: String,

	/// Reconcile type differences between formats.
	pub normalize: bool,

	/// TOML has no null. Replace strings that are exactly `"null"` with null.
	pub transform_null_string_to_null: bool,

	/// TOML forbids mixed-type arrays. Enforce the same rule for every format.
	pub forbid_mixed_arrays: bool,

	/// Representation of dates after normalization.
	pub date_mode: DateMode,

	/// Where configuration files are listed and read from.
	pub fs: Arc<dyn FileSystem>,

	/// JSON schema every normalized fragment must satisfy.
	pub schema: Option<serde_json::Value>,

	/// Base values that discovered files override key by key.
	/// Returned as-is when no file is found.
	pub defaults: Option<Map>,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			config_prefix: ".project".to_string(),
			normalize: true,
			transform_null_string_to_null: true,
			forbid_mixed_arrays: true,
			date_mode: DateMode::default(),
			fs: Arc::new(OsFileSystem),
			schema: None,
			defaults: None,
		}
	}
}

impl Options {
	pub fn with_fs(mut self, fs: impl FileSystem + 'static) -> Self {
		self.fs = Arc::new(fs);
		self
	}
}

/// Per-call options for [`Loader::load`](crate::config::Loader::load).
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
	/// Directory above which no configuration is searched for. Must be the
	/// target directory or one of its ancestors. Defaults to the target
	/// directory itself.
	pub root: Option<PathBuf>,
}

/// A configuration file found by the finder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
	/// Path the file was found at.
	pub path: PathBuf,

	/// Format implied by its extension.
	pub format: Format,
}

/// A parsed and normalized configuration with its source path for display.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The normalized fragment.
	pub config: Map,

	/// The path this config was loaded from.
	pub path: PathBuf,
}
