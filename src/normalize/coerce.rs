use std::sync::LazyLock;

use regex::Regex;

use crate::error::NormalizeError;
use crate::value::{Number, Value, to_iso_string};

/// JSON number literal grammar. Stricter than a general float parser: no
/// leading `+`, no leading zeros, no bare `.5`.
static JSON_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^-?(?:[1-9]\d*|0)(?:\.\d+)?(?:[Ee][+-]?\d+)?$").expect("valid number regex")
});

/// Turn a JSON-number-looking string into a number. Other values pass through.
pub fn number_strings(value: Value) -> Result<Value, NormalizeError> {
	let Value::String(text) = value else {
		return Ok(value);
	};
	if !JSON_NUMBER_RE.is_match(&text) {
		return Ok(Value::String(text));
	}
	Ok(Value::Number(parse_number(&text)?))
}

fn parse_number(text: &str) -> Result<Number, NormalizeError> {
	if !text.contains(['.', 'e', 'E'])
		&& let Ok(i) = text.parse::<i64>()
	{
		return Ok(Number::Integer(i));
	}
	match text.parse::<f64>() {
		Ok(f) if f.is_finite() => Ok(Number::Float(f)),
		_ => Err(NormalizeError::NonFiniteNumber {
			text: text.to_string(),
		}),
	}
}

/// Replace the exact string `"null"` with null. Substrings are left alone.
pub fn null_strings(value: Value) -> Value {
	match value {
		Value::String(s) if s == "null" => Value::Null,
		other => other,
	}
}

/// Render dates as ISO-8601 text in UTC.
pub fn dates_to_iso_strings(value: Value) -> Value {
	match value {
		Value::Datetime(date) => Value::String(to_iso_string(&date)),
		other => other,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn coerce(s: &str) -> Value {
		number_strings(Value::from(s)).unwrap()
	}

	#[test]
	fn test_number_strings_accepts_json_grammar() {
		assert_eq!(coerce("1"), Value::from(1));
		assert_eq!(coerce("0"), Value::from(0));
		assert_eq!(coerce("-1234.0e7"), Value::from(-1234.0e7));
		assert_eq!(coerce("1.234e5"), Value::from(1.234e5));
		assert_eq!(coerce("-0.3"), Value::from(-0.3));
		assert_eq!(coerce("-1.0E-2"), Value::from(-1.0e-2));
		assert_eq!(coerce("1.2E+3"), Value::from(1.2e3));
		assert_eq!(coerce("10.12345"), Value::from(10.12345));
		assert_eq!(coerce("1E2"), Value::from(100));
		assert_eq!(coerce("1e3"), Value::from(1000));
	}

	#[test]
	fn test_number_strings_rejects_other_shapes() {
		for s in ["+123", "01234", ".5", "1.", "0x10", "1_000", "NaN", "Infinity", " 1", "192.0.2.62", ""] {
			assert_eq!(coerce(s), Value::from(s), "{s:?}");
		}
	}

	#[test]
	fn test_number_strings_keeps_integers_exact() {
		assert_eq!(
			coerce("9007199254740993"),
			Value::Number(Number::Integer(9_007_199_254_740_993))
		);
		// Too large for i64, still a finite float.
		assert_eq!(coerce("123456789012345678901234"), Value::from(1.2345678901234568e23));
	}

	#[test]
	fn test_number_strings_fails_loudly_on_overflow() {
		let err = number_strings(Value::from("1e400")).unwrap_err();
		assert!(matches!(err, NormalizeError::NonFiniteNumber { ref text } if text == "1e400"));
		assert!(err.to_string().starts_with("normalization failed: "));
	}

	#[test]
	fn test_number_strings_ignores_non_strings() {
		assert_eq!(number_strings(Value::Bool(true)).unwrap(), Value::Bool(true));
		assert_eq!(number_strings(Value::Null).unwrap(), Value::Null);
	}

	#[test]
	fn test_null_strings_exact_match_only() {
		assert_eq!(null_strings(Value::from("null")), Value::Null);
		assert_eq!(null_strings(Value::from("NULL")), Value::from("NULL"));
		assert_eq!(null_strings(Value::from("not null")), Value::from("not null"));
		assert_eq!(
			null_strings(Value::from(r#"this is not "null" here"#)),
			Value::from(r#"this is not "null" here"#)
		);
	}
}
