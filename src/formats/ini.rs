use ::ini::{Ini, ParseOption};

use crate::value::{Map, Value};

/// INI has no types of its own. Follow the usual loader conventions: sections
/// nest on `.`, `key[]` repeats build an array, and the bare words `true`,
/// `false` and `null` are typed. A key alone on its line is `true`.
/// Everything else stays a string.
pub(super) fn parse(text: &str) -> Result<Map, String> {
	let option = ParseOption {
		enabled_escape: false,
		..ParseOption::default()
	};
	let ini = Ini::load_from_str_opt(&expand_bare_keys(text), option).map_err(|e| e.to_string())?;

	let mut root = Map::new();
	for (section, properties) in ini.iter() {
		let target = match section {
			Some(name) if !name.is_empty() => section_map(&mut root, name),
			_ => &mut root,
		};
		for (key, value) in properties.iter() {
			insert_property(target, key, value);
		}
	}
	Ok(root)
}

/// The tokenizer would run a separator-less key into the following line,
/// so spell each one out as `key = true` first.
fn expand_bare_keys(text: &str) -> String {
	text.lines()
		.map(|line| {
			let trimmed = line.trim();
			let bare = !trimmed.is_empty()
				&& !trimmed.starts_with([';', '#', '['])
				&& !trimmed.contains(['=', ':']);
			if bare {
				format!("{trimmed} = true")
			} else {
				line.to_string()
			}
		})
		.collect::<Vec<_>>()
		.join("\n")
}

fn section_map<'a>(root: &'a mut Map, name: &str) -> &'a mut Map {
	let mut current = root;
	for part in name.split('.') {
		let entry = current
			.entry(unquote(part).to_string())
			.or_insert_with(|| Value::Object(Map::new()));
		if !matches!(entry, Value::Object(_)) {
			*entry = Value::Object(Map::new());
		}
		current = match entry {
			Value::Object(map) => map,
			_ => unreachable!("section entry was just made an object"),
		};
	}
	current
}

fn insert_property(map: &mut Map, key: &str, raw: &str) {
	let value = literal(unquote(raw.trim()));
	match key.trim().strip_suffix("[]") {
		Some(name) => {
			let name = unquote(name);
			match map.get_mut(name) {
				Some(Value::Array(items)) => items.push(value),
				_ => {
					map.insert(name.to_string(), Value::Array(vec![value]));
				}
			}
		}
		None => {
			map.insert(unquote(key.trim()).to_string(), value);
		}
	}
}

fn literal(s: &str) -> Value {
	match s {
		"true" => Value::Bool(true),
		"false" => Value::Bool(false),
		"null" => Value::Null,
		_ => Value::String(s.to_string()),
	}
}

fn unquote(s: &str) -> &str {
	for quote in ['"', '\''] {
		if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
			return &s[1..s.len() - 1];
		}
	}
	s
}
