use std::path::Path;

use rayon::prelude::*;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::finder::find_configs;
use crate::config::parser::parse_config_file;
use crate::config::types::{ConfigFile, LoadOptions, LoadedConfig, Options};
use crate::error::{ConfyglotError, Result};
use crate::schema::SchemaValidator;
use crate::value::{Map, map_to_json};

/// Finds, parses and merges cascading configuration files.
///
/// The schema, if any, is compiled once in [`Loader::new`] and shared by
/// every [`Loader::load`] call.
#[derive(Debug)]
pub struct Loader {
	options: Options,
	validator: Option<SchemaValidator>,
}

impl Loader {
	/// Build a loader. Fails with [`ConfyglotError::InvalidSchema`] if the schema does not compile.
	pub fn new(options: Options) -> Result<Self> {
		let validator = options
			.schema
			.as_ref()
			.map(SchemaValidator::compile)
			.transpose()?;
		Ok(Self { options, validator })
	}

	pub fn options(&self) -> &Options {
		&self.options
	}

	/// Configuration files from the root down to `directory`, in cascade order.
	pub fn find(&self, directory: &Path, load_options: &LoadOptions) -> Result<Vec<ConfigFile>> {
		find_configs(directory, load_options.root.as_deref(), &self.options)
	}

	/// Discover and parse every file in the cascade without merging.
	///
	/// Files are parsed in parallel; the result keeps cascade order. Any
	/// single failure fails the whole call.
	pub fn discover(&self, directory: &Path, load_options: &LoadOptions) -> Result<Vec<LoadedConfig>> {
		let files = self.find(directory, load_options)?;
		files
			.par_iter()
			.map(|file| -> Result<LoadedConfig> {
				let config = parse_config_file(file, &self.options, self.validator.as_ref())?;
				Ok(LoadedConfig {
					config,
					path: file.path.clone(),
				})
			})
			.collect()
	}

	/// Load the merged configuration for `directory`.
	///
	/// Returns the defaults (possibly `None`) when no file is found.
	/// Otherwise folds every file over the defaults, root first, with a
	/// shallow top-level merge.
	pub fn load(&self, directory: &Path, load_options: &LoadOptions) -> Result<Option<Map>> {
		let configs = self.discover(directory, load_options)?;
		if configs.is_empty() {
			debug!(directory = %directory.display(), "no configuration files found");
			return Ok(self.options.defaults.clone());
		}

		let merged = merge_configs(self.options.defaults.clone().unwrap_or_default(), configs);
		debug!(directory = %directory.display(), keys = merged.len(), "merged configuration");
		Ok(Some(merged))
	}

	/// Load and deserialize the merged configuration into `T`.
	pub fn load_as<T: DeserializeOwned>(&self, directory: &Path, load_options: &LoadOptions) -> Result<Option<T>> {
		self.load(directory, load_options)?
			.map(|map| {
				serde_json::from_value(serde_json::Value::Object(map_to_json(&map)))
					.map_err(|source| ConfyglotError::Deserialize { source })
			})
			.transpose()
	}
}

/// Fold configs in order: later keys replace earlier ones at the top level only.
pub fn merge_configs(base: Map, configs: impl IntoIterator<Item = LoadedConfig>) -> Map {
	configs.into_iter().fold(base, |mut acc, loaded| {
		for (key, value) in loaded.config {
			acc.insert(key, value);
		}
		acc
	})
}

/// Convenience function: build a loader from `options` and load once.
pub fn load(directory: &Path, options: Options, root: Option<&Path>) -> Result<Option<Map>> {
	let load_options = LoadOptions {
		root: root.map(Path::to_path_buf),
	};
	Loader::new(options)?.load(directory, &load_options)
}
