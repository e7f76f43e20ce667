use crate::value::{Map, map_from_json};

pub(super) fn parse(text: &str) -> Result<Map, String> {
	match serde_json::from_str::<serde_json::Value>(text).map_err(|e| e.to_string())? {
		serde_json::Value::Object(map) => Ok(map_from_json(map)),
		_ => Err("json file does not contain an object".to_string()),
	}
}
