use std::path::Path;

use tracing::debug;

use crate::config::types::{ConfigFile, Options};
use crate::error::{ConfyglotError, FileError, Result};
use crate::formats::Format;
use crate::normalize::normalize;
use crate::schema::SchemaValidator;
use crate::value::Map;

/// Read, parse, normalize and validate one configuration file.
///
/// Every failure is wrapped in [`ConfyglotError::Config`] so the message names the file.
pub fn parse_config_file(
	file: &ConfigFile,
	options: &Options,
	validator: Option<&SchemaValidator>,
) -> Result<Map> {
	let wrap = |source| ConfyglotError::Config {
		path: file.path.clone(),
		source,
	};

	let content = options
		.fs
		.read_to_string(&file.path)
		.map_err(|source| wrap(FileError::Read { source }))?;

	let config = parse_config_str(&content, file.format, options, validator).map_err(wrap)?;
	debug!(path = %file.path.display(), keys = config.len(), "parsed configuration");
	Ok(config)
}

/// Parse a config from a string (useful for testing).
pub fn parse_config_str(
	content: &str,
	format: Format,
	options: &Options,
	validator: Option<&SchemaValidator>,
) -> std::result::Result<Map, FileError> {
	let parsed = format.parse(content)?;
	let config = normalize(format, parsed, options)?;

	if let Some(validator) = validator {
		validator
			.validate(&config)
			.map_err(|message| FileError::Schema { message })?;
	}

	Ok(config)
}

/// Parse a single file by path, inferring its format from the extension.
pub fn parse_config_path(path: &Path, options: &Options) -> Result<Map> {
	let format = Format::from_path(path).ok_or_else(|| ConfyglotError::UnknownFormat {
		path: path.to_path_buf(),
	})?;
	let validator = options.schema.as_ref().map(SchemaValidator::compile).transpose()?;
	parse_config_file(
		&ConfigFile {
			path: path.to_path_buf(),
			format,
		},
		options,
		validator.as_ref(),
	)
}
