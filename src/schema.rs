//! JSON schema validation of normalized fragments.

use std::fmt;

use jsonschema::Validator;

use crate::error::{ConfyglotError, Result};
use crate::value::{Map, map_to_json};

/// A schema compiled once and reused for every fragment a loader parses.
pub struct SchemaValidator {
	validator: Validator,
}

impl SchemaValidator {
	/// Compile a schema. Fails with [`ConfyglotError::InvalidSchema`].
	pub fn compile(schema: &serde_json::Value) -> Result<Self> {
		let validator = jsonschema::validator_for(schema).map_err(|e| ConfyglotError::InvalidSchema {
			message: e.to_string(),
		})?;
		Ok(Self { validator })
	}

	/// Validate a fragment. On failure, every violation message joined with newlines.
	pub fn validate(&self, fragment: &Map) -> std::result::Result<(), String> {
		let instance = serde_json::Value::Object(map_to_json(fragment));
		let messages: Vec<String> = self
			.validator
			.iter_errors(&instance)
			.map(|error| error.to_string())
			.collect();
		if messages.is_empty() {
			Ok(())
		} else {
			Err(messages.join("\n"))
		}
	}
}

impl fmt::Debug for SchemaValidator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SchemaValidator").finish_non_exhaustive()
	}
}
