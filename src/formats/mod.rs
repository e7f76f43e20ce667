//! Format adapters: raw text in, plain [`Map`] out.
//!
//! Each adapter wraps a third-party parser and converts its native tree into
//! [`Value`](crate::value::Value) by construction. No adapter applies any
//! cross-format coercion; that is the normalizer's job.

mod ini;
mod json;
mod toml;
mod yaml;

use std::fmt;
use std::path::Path;

use crate::error::FileError;
use crate::value::Map;

/// A recognized configuration format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
	Ini,
	Json,
	Toml,
	Yaml,
	/// Recognized so that a stray `.project.js` still counts toward ambiguity,
	/// but never parsed.
	JavaScript,
}

impl Format {
	/// Every extension the finder matches, in the order used to build its pattern.
	pub const EXTENSIONS: &'static [&'static str] = &["js", "json", "yaml", "yml", "toml", "ini"];

	/// Map a file extension (case-insensitive, without the dot) to its format.
	pub fn from_extension(ext: &str) -> Option<Format> {
		match ext.to_ascii_lowercase().as_str() {
			"ini" => Some(Format::Ini),
			"json" => Some(Format::Json),
			"toml" => Some(Format::Toml),
			"yaml" | "yml" => Some(Format::Yaml),
			"js" => Some(Format::JavaScript),
			_ => None,
		}
	}

	pub fn from_path(path: &Path) -> Option<Format> {
		path.extension()
			.and_then(|ext| ext.to_str())
			.and_then(Format::from_extension)
	}

	pub fn name(self) -> &'static str {
		match self {
			Format::Ini => "ini",
			Format::Json => "json",
			Format::Toml => "toml",
			Format::Yaml => "yaml",
			Format::JavaScript => "javascript",
		}
	}

	/// Parse text in this format into a plain fragment.
	pub fn parse(self, text: &str) -> Result<Map, FileError> {
		let parsed = match self {
			Format::Ini => ini::parse(text),
			Format::Json => json::parse(text),
			Format::Toml => toml::parse(text),
			Format::Yaml => yaml::parse(text),
			Format::JavaScript => Err("javascript configurations are not supported".to_string()),
		};
		parsed.map_err(|message| FileError::Parse {
			format: self,
			message,
		})
	}
}

impl fmt::Display for Format {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
