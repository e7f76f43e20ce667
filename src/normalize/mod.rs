//! Cross-format normalization.
//!
//! Each format's parser hands back differently typed scalars for the same
//! logical value. [`normalize`] is the single place where they are reconciled:
//!
//! 1. With `normalize = false` the fragment is returned untouched.
//! 2. Outside JSON, dates are rendered per [`DateMode`].
//! 3. Format-specific scalar coercions run over every leaf (INI number
//!    strings, TOML `"null"` strings).
//! 4. With `forbid_mixed_arrays`, every array is checked for a single
//!    element type after its elements have been coerced.
//!
//! Keys are never transformed.

mod coerce;
mod mixed;

pub use mixed::render_path;

use crate::config::types::{DateMode, Options};
use crate::error::NormalizeError;
use crate::formats::Format;
use crate::value::{Map, Value};

/// One transformation applied to every node during the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
	DatesToIsoStrings,
	NumberStrings,
	NullStrings,
	ForbidMixedArrays,
}

impl Step {
	fn apply(self, value: Value, path: &[String]) -> Result<Value, NormalizeError> {
		match self {
			Step::DatesToIsoStrings => Ok(coerce::dates_to_iso_strings(value)),
			Step::NumberStrings => coerce::number_strings(value),
			Step::NullStrings => Ok(coerce::null_strings(value)),
			Step::ForbidMixedArrays => {
				if let Value::Array(ref items) = value {
					mixed::check_array(items, path)?;
				}
				Ok(value)
			}
		}
	}
}

fn steps_for(format: Format, options: &Options) -> Vec<Step> {
	let mut steps = Vec::new();
	if format != Format::Json && options.date_mode == DateMode::Iso8601String {
		steps.push(Step::DatesToIsoStrings);
	}
	match format {
		Format::Ini => steps.push(Step::NumberStrings),
		Format::Toml if options.transform_null_string_to_null => steps.push(Step::NullStrings),
		Format::Toml | Format::Json | Format::Yaml | Format::JavaScript => {}
	}
	if options.forbid_mixed_arrays {
		steps.push(Step::ForbidMixedArrays);
	}
	steps
}

/// Normalize a parsed fragment from `format` according to `options`.
///
/// Pure: no I/O, and normalizing an already normalized fragment is a no-op.
pub fn normalize(format: Format, fragment: Map, options: &Options) -> Result<Map, NormalizeError> {
	if !options.normalize {
		return Ok(fragment);
	}

	let steps = steps_for(format, options);
	if steps.is_empty() {
		return Ok(fragment);
	}

	let mut path = Vec::new();
	transform_map(fragment, &steps, &mut path)
}

fn transform_map(map: Map, steps: &[Step], path: &mut Vec<String>) -> Result<Map, NormalizeError> {
	let mut out = Map::with_capacity(map.len());
	for (key, value) in map {
		path.push(key);
		let value = transform(value, steps, path)?;
		let key = path.pop().unwrap_or_default();
		out.insert(key, value);
	}
	Ok(out)
}

/// Depth-first: children are transformed before their parent array is checked.
fn transform(value: Value, steps: &[Step], path: &mut Vec<String>) -> Result<Value, NormalizeError> {
	let value = match value {
		Value::Object(map) => return Ok(Value::Object(transform_map(map, steps, path)?)),
		Value::Array(items) => {
			let mut out = Vec::with_capacity(items.len());
			for (i, item) in items.into_iter().enumerate() {
				path.push(i.to_string());
				let item = transform(item, steps, path);
				path.pop();
				out.push(item?);
			}
			Value::Array(out)
		}
		leaf @ (Value::Null
		| Value::Bool(_)
		| Value::Number(_)
		| Value::String(_)
		| Value::Datetime(_)) => leaf,
	};

	steps
		.iter()
		.try_fold(value, |value, step| step.apply(value, &path[..]))
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::DateTime;

	fn map(entries: Vec<(&str, Value)>) -> Map {
		entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
	}

	fn strict() -> Options {
		Options::default()
	}

	fn lenient() -> Options {
		Options {
			forbid_mixed_arrays: false,
			..Options::default()
		}
	}

	#[test]
	fn test_disabled_normalization_is_identity() {
		let options = Options {
			normalize: false,
			..Options::default()
		};
		let fragment = map(vec![
			("n", Value::from("1")),
			("mixed", Value::Array(vec![Value::from(1), Value::from("x")])),
		]);
		assert_eq!(normalize(Format::Ini, fragment.clone(), &options).unwrap(), fragment);
	}

	#[test]
	fn test_ini_numbers_are_coerced_deeply() {
		let fragment = map(vec![(
			"section",
			Value::Object(map(vec![
				("num", Value::from("-1234.0e7")),
				("a", Value::Array(vec![Value::from("1"), Value::from("1.234e5")])),
				("notnum", Value::Array(vec![Value::from("+123"), Value::from("01234")])),
				("1234", Value::from("notnum")),
			])),
		)]);
		let out = normalize(Format::Ini, fragment, &lenient()).unwrap();
		let section = out["section"].as_object().unwrap();
		assert_eq!(section["num"], Value::from(-1234.0e7));
		assert_eq!(section["a"], Value::Array(vec![Value::from(1), Value::from(1.234e5)]));
		assert_eq!(
			section["notnum"],
			Value::Array(vec![Value::from("+123"), Value::from("01234")])
		);
		assert!(section.contains_key("1234"));
	}

	#[test]
	fn test_number_strings_only_apply_to_ini() {
		let fragment = map(vec![("port", Value::from("143"))]);
		for format in [Format::Json, Format::Toml, Format::Yaml] {
			let out = normalize(format, fragment.clone(), &strict()).unwrap();
			assert_eq!(out["port"], Value::from("143"), "{format}");
		}
	}

	#[test]
	fn test_toml_null_strings() {
		let fragment = map(vec![
			("b", Value::from("null")),
			("null", Value::from("another key")),
			(
				"someArray",
				Value::Array(vec![Value::from("null"), Value::from("not null"), Value::from("NULL")]),
			),
		]);
		let out = normalize(Format::Toml, fragment.clone(), &lenient()).unwrap();
		assert_eq!(out["b"], Value::Null);
		assert_eq!(out["null"], Value::from("another key"));
		assert_eq!(
			out["someArray"],
			Value::Array(vec![Value::Null, Value::from("not null"), Value::from("NULL")])
		);

		let keep = Options {
			transform_null_string_to_null: false,
			..lenient()
		};
		assert_eq!(normalize(Format::Toml, fragment, &keep).unwrap()["b"], Value::from("null"));
	}

	#[test]
	fn test_null_strings_not_applied_outside_toml() {
		let fragment = map(vec![("b", Value::from("null"))]);
		let out = normalize(Format::Json, fragment, &strict()).unwrap();
		assert_eq!(out["b"], Value::from("null"));
	}

	#[test]
	fn test_dates_become_iso_strings_except_in_native_mode() {
		let date = DateTime::parse_from_rfc3339("1985-10-21T14:30:00-05:00").unwrap();
		let fragment = map(vec![("Date", Value::Datetime(date))]);

		let out = normalize(Format::Toml, fragment.clone(), &strict()).unwrap();
		assert_eq!(out["Date"], Value::from("1985-10-21T19:30:00.000Z"));

		let native = Options {
			date_mode: DateMode::Native,
			..Options::default()
		};
		let out = normalize(Format::Toml, fragment, &native).unwrap();
		assert_eq!(out["Date"], Value::Datetime(date));
	}

	#[test]
	fn test_mixed_array_path_includes_indices() {
		let fragment = map(vec![(
			"array",
			Value::Array(vec![
				Value::Array(vec![Value::from(1), Value::from(2)]),
				Value::Array(vec![Value::from("ok"), Value::from(true)]),
			]),
		)]);
		let err = normalize(Format::Yaml, fragment, &strict()).unwrap_err();
		match err {
			NormalizeError::MixedArray { path, first, found, .. } => {
				assert_eq!(path, "array.1");
				assert_eq!(first, "string");
				assert_eq!(found, "boolean");
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[test]
	fn test_mixed_array_checked_after_coercion() {
		// "1" and "2" become integers before the array is inspected.
		let fragment = map(vec![(
			"a",
			Value::Array(vec![Value::from("1"), Value::from(2)]),
		)]);
		assert!(normalize(Format::Ini, fragment.clone(), &strict()).is_ok());
		assert!(normalize(Format::Json, fragment, &strict()).is_err());
	}

	#[test]
	fn test_mixed_arrays_allowed_when_disabled() {
		let fragment = map(vec![(
			"array",
			Value::Array(vec![Value::from(1), Value::from(1.2), Value::from("string")]),
		)]);
		let out = normalize(Format::Json, fragment.clone(), &lenient()).unwrap();
		assert_eq!(out, fragment);
	}

	#[test]
	fn test_normalize_is_idempotent() {
		let date = DateTime::parse_from_rfc3339("2012-08-06T00:00:00Z").unwrap();
		let fragment = map(vec![
			("n", Value::from("-0.3")),
			("s", Value::from("null")),
			("d", Value::Datetime(date)),
			("nested", Value::Object(map(vec![("list", Value::Array(vec![Value::from("1")]))]))),
		]);
		for format in [Format::Ini, Format::Toml, Format::Yaml, Format::Json] {
			let once = normalize(format, fragment.clone(), &strict()).unwrap();
			let twice = normalize(format, once.clone(), &strict()).unwrap();
			assert_eq!(once, twice, "{format}");
		}
	}

	#[test]
	fn test_normalize_is_idempotent_with_special_floats() {
		let fragment = Format::Yaml
			.parse("nan: .nan\ninf: -.inf\nlist: [.nan, .nan]\n")
			.unwrap();
		let once = normalize(Format::Yaml, fragment, &strict()).unwrap();
		let twice = normalize(Format::Yaml, once.clone(), &strict()).unwrap();
		assert_eq!(once, twice);
	}

	#[test]
	fn test_keys_keep_order() {
		let fragment = map(vec![
			("someKey", Value::from("a")),
			("SOMEKEY", Value::from("b")),
			("somekey", Value::from("c")),
		]);
		let out = normalize(Format::Ini, fragment, &strict()).unwrap();
		let keys: Vec<_> = out.keys().map(String::as_str).collect();
		assert_eq!(keys, vec!["someKey", "SOMEKEY", "somekey"]);
	}
}
