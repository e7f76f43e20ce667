use std::path::PathBuf;

use crate::formats::Format;

/// Library-level structured errors for confyglot.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum ConfyglotError {
	#[error("root '{}' is not related to given directory {}", .root.display(), .directory.display())]
	Path { root: PathBuf, directory: PathBuf },

	#[error(
		"multiple possible configurations found in '{}': {}",
		.directory.display(),
		join_paths(.paths)
	)]
	AmbiguousConfig {
		directory: PathBuf,
		paths: Vec<PathBuf>,
	},

	#[error("cannot read directory '{}': {source}", .path.display())]
	ReadDirectory {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("error with configuration '{}': {source}", .path.display())]
	Config {
		path: PathBuf,
		#[source]
		source: FileError,
	},

	#[error("no configuration format for '{}'", .path.display())]
	UnknownFormat { path: PathBuf },

	#[error("invalid schema: {message}")]
	InvalidSchema { message: String },

	#[error("failed to convert configuration: {source}")]
	Deserialize {
		#[source]
		source: serde_json::Error,
	},
}

/// Failure while turning one configuration file into a fragment.
///
/// Always surfaced wrapped in [`ConfyglotError::Config`], which adds the path.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
	#[error("{source}")]
	Read {
		#[source]
		source: std::io::Error,
	},

	#[error("{message}")]
	Parse { format: Format, message: String },

	#[error(transparent)]
	Normalize(#[from] NormalizeError),

	#[error("{message}")]
	Schema { message: String },
}

/// Failure inside the normalizer. Rendered with the `normalization failed: ` prefix.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
	#[error(
		"normalization failed: with forbid_mixed_arrays=true, arrays must be of a single type, not a mix of {found} and {first}: value of '{path}' is approximately {approximately}"
	)]
	MixedArray {
		path: String,
		first: &'static str,
		found: &'static str,
		approximately: String,
	},

	#[error("normalization failed: attempted to convert '{text}' to a number, got a non-finite value")]
	NonFiniteNumber { text: String },
}

fn join_paths(paths: &[PathBuf]) -> String {
	paths
		.iter()
		.map(|p| p.display().to_string())
		.collect::<Vec<_>>()
		.join(", ")
}

/// Result type alias using ConfyglotError.
pub type Result<T> = std::result::Result<T, ConfyglotError>;
