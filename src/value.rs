//! Format-independent configuration values.
//!
//! Every format adapter produces a [`Map`] of [`Value`]s by construction, so
//! the normalizer only ever pattern-matches over this one sum type.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// An insertion-ordered mapping. Keys keep their original case.
pub type Map = IndexMap<String, Value>;

/// A single configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Null,
	Bool(bool),
	Number(Number),
	String(String),
	Datetime(DateTime<FixedOffset>),
	Array(Vec<Value>),
	Object(Map),
}

/// A numeric value.
///
/// Integers and floats compare by exact mathematical value, so `1` equals
/// `1.0` but `2^53 + 1` does not equal the float `2^53`. NaN equals NaN, so
/// a tree always equals itself.
#[derive(Debug, Clone, Copy)]
pub enum Number {
	Integer(i64),
	Float(f64),
}

impl Number {
	pub fn as_f64(self) -> f64 {
		match self {
			Number::Integer(i) => i as f64,
			Number::Float(f) => f,
		}
	}

	/// True when the value has no fractional part, regardless of how it was written.
	pub fn is_integral(self) -> bool {
		match self {
			Number::Integer(_) => true,
			Number::Float(f) => f.is_finite() && f.fract() == 0.0,
		}
	}
}

impl PartialEq for Number {
	fn eq(&self, other: &Self) -> bool {
		match (*self, *other) {
			(Number::Integer(a), Number::Integer(b)) => a == b,
			(Number::Float(a), Number::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
			(Number::Integer(i), Number::Float(f)) | (Number::Float(f), Number::Integer(i)) => {
				integer_equals_float(i, f)
			}
		}
	}
}

/// `i64::MIN` is exactly representable; `i64::MAX + 1` is the first float past the range.
fn integer_equals_float(i: i64, f: f64) -> bool {
	const LOWER: f64 = i64::MIN as f64;
	const UPPER: f64 = -(i64::MIN as f64);
	f.fract() == 0.0 && (LOWER..UPPER).contains(&f) && f as i64 == i
}

impl From<i64> for Number {
	fn from(i: i64) -> Self {
		Number::Integer(i)
	}
}

impl From<f64> for Number {
	fn from(f: f64) -> Self {
		Number::Float(f)
	}
}

/// Render a date the way JavaScript's `toISOString` does: UTC, milliseconds, `Z`.
pub fn to_iso_string(date: &DateTime<FixedOffset>) -> String {
	date.with_timezone(&Utc)
		.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Value {
	/// Short type label used in diagnostics.
	pub fn type_name(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "boolean",
			Value::Number(n) if n.is_integral() => "integer",
			Value::Number(_) => "float",
			Value::String(_) => "string",
			Value::Datetime(_) => "other",
			Value::Array(_) => "array",
			Value::Object(_) => "object",
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<&Map> {
		match self {
			Value::Object(map) => Some(map),
			_ => None,
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Convert into JSON. Dates become RFC 3339 text and non-finite floats become null.
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			Value::Null => serde_json::Value::Null,
			Value::Bool(b) => serde_json::Value::Bool(*b),
			Value::Number(Number::Integer(i)) => serde_json::Value::from(*i),
			Value::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
				.map(serde_json::Value::Number)
				.unwrap_or(serde_json::Value::Null),
			Value::String(s) => serde_json::Value::String(s.clone()),
			Value::Datetime(d) => serde_json::Value::String(d.to_rfc3339()),
			Value::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
			Value::Object(map) => serde_json::Value::Object(map_to_json(map)),
		}
	}
}

/// Build a [`Map`] from key/value pairs.
pub fn map_of<K: Into<String>, V: Into<Value>>(entries: impl IntoIterator<Item = (K, V)>) -> Map {
	entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

pub fn map_to_json(map: &Map) -> serde_json::Map<String, serde_json::Value> {
	map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Value::Null,
			serde_json::Value::Bool(b) => Value::Bool(b),
			serde_json::Value::Number(n) => Value::Number(match n.as_i64() {
				Some(i) => Number::Integer(i),
				// u64 beyond i64 and all fractional numbers
				None => Number::Float(n.as_f64().unwrap_or(f64::NAN)),
			}),
			serde_json::Value::String(s) => Value::String(s),
			serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
			serde_json::Value::Object(map) => Value::Object(map_from_json(map)),
		}
	}
}

pub fn map_from_json(map: serde_json::Map<String, serde_json::Value>) -> Map {
	map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::String(s.to_string())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::String(s)
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}

impl From<i64> for Value {
	fn from(i: i64) -> Self {
		Value::Number(Number::Integer(i))
	}
}

impl From<i32> for Value {
	fn from(i: i32) -> Self {
		Value::Number(Number::Integer(i64::from(i)))
	}
}

impl From<f64> for Value {
	fn from(f: f64) -> Self {
		Value::Number(Number::Float(f))
	}
}

impl From<Map> for Value {
	fn from(map: Map) -> Self {
		Value::Object(map)
	}
}

impl From<Vec<Value>> for Value {
	fn from(items: Vec<Value>) -> Self {
		Value::Array(items)
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Value::Null => serializer.serialize_unit(),
			Value::Bool(b) => serializer.serialize_bool(*b),
			Value::Number(Number::Integer(i)) => serializer.serialize_i64(*i),
			Value::Number(Number::Float(f)) => serializer.serialize_f64(*f),
			Value::String(s) => serializer.serialize_str(s),
			Value::Datetime(d) => serializer.serialize_str(&d.to_rfc3339()),
			Value::Array(items) => {
				let mut seq = serializer.serialize_seq(Some(items.len()))?;
				for item in items {
					seq.serialize_element(item)?;
				}
				seq.end()
			}
			Value::Object(map) => {
				let mut out = serializer.serialize_map(Some(map.len()))?;
				for (k, v) in map {
					out.serialize_entry(k, v)?;
				}
				out.end()
			}
		}
	}
}
