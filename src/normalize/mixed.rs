use crate::error::NormalizeError;
use crate::value::Value;

/// Reject arrays whose elements do not all share one type label.
///
/// Integers and floats are told apart by integrality, so `[1, 1.0]` is fine
/// but `[1, 1.5]` is not.
pub fn check_array(items: &[Value], path: &[String]) -> Result<(), NormalizeError> {
	let Some(first) = items.first().map(Value::type_name) else {
		return Ok(());
	};
	match items.iter().map(Value::type_name).find(|found| *found != first) {
		None => Ok(()),
		Some(found) => Err(NormalizeError::MixedArray {
			path: render_path(path),
			first,
			found,
			approximately: serde_json::to_string(items).unwrap_or_else(|_| "[...]".to_string()),
		}),
	}
}

/// Keys joined with `.`; array positions appear as bare indices (`a.b.0.c`).
pub fn render_path(path: &[String]) -> String {
	path.join(".")
}
