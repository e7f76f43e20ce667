use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use regex::Regex;
use yaml_rust2::parser::{Event, EventReceiver, Parser};
use yaml_rust2::scanner::TScalarStyle;

use crate::value::{Map, Number, Value};

/// Date-only form of the YAML 1.1 timestamp type.
static DATE_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid date regex"));

/// Full form of the YAML 1.1 timestamp type. A missing zone means UTC.
static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[Tt]|[ \t]+)(\d{1,2}):(\d{2}):(\d{2})(?:\.(\d*))?(?:[ \t]*(Z|([-+])(\d{1,2})(?::(\d{2}))?))?$",
	)
	.expect("valid timestamp regex")
});

/// Plain integers in decimal, `0x` hex or `0o` octal.
static INT_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(?:[-+]?[0-9]+|0x[0-9a-fA-F]+|0o[0-7]+)$").expect("valid int regex")
});

static FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(?:[-+]?(?:\.[0-9]+|[0-9]+(?:\.[0-9]*)?)(?:[eE][-+]?[0-9]+)?|[-+]?\.(?:inf|Inf|INF)|\.(?:nan|NaN|NAN))$")
		.expect("valid float regex")
});

/// Handle the parser gives `!!` once resolved.
const CORE_TAG_HANDLES: &[&str] = &["!!", "tag:yaml.org,2002:"];

pub(super) fn parse(text: &str) -> Result<Map, String> {
	let mut builder = TreeBuilder::default();
	Parser::new_from_str(text)
		.load(&mut builder, false)
		.map_err(|e| e.to_string())?;
	match builder.finish()? {
		Some(Value::Object(map)) => Ok(map),
		_ => Err("yaml file does not contain an object".to_string()),
	}
}

enum Key {
	/// The plain `<<` key.
	Merge,
	Name(String),
}

enum Frame {
	Sequence {
		anchor: usize,
		items: Vec<Value>,
	},
	Mapping {
		anchor: usize,
		map: Map,
		key: Option<Key>,
	},
}

/// Builds one document from parser events.
///
/// Events carry the scalar style, so only plain scalars are resolved to
/// null, booleans, numbers or timestamps. Quoted and block scalars stay strings.
#[derive(Default)]
struct TreeBuilder {
	stack: Vec<Frame>,
	anchors: HashMap<usize, Value>,
	root: Option<Value>,
	error: Option<String>,
}

impl EventReceiver for TreeBuilder {
	fn on_event(&mut self, event: Event) {
		if self.error.is_some() {
			return;
		}
		let result = match event {
			Event::Scalar(text, style, anchor, tag) => {
				let tag = tag.as_ref().map(|t| (t.handle.as_str(), t.suffix.as_str()));
				let plain = matches!(style, TScalarStyle::Plain);
				let merge_key = plain && tag.is_none() && text == "<<";
				self.complete(scalar(text, plain, tag), anchor, merge_key)
			}
			Event::Alias(id) => match self.anchors.get(&id).cloned() {
				Some(value) => self.push(value, false),
				None => Err(format!("unknown anchor {id}")),
			},
			Event::SequenceStart(anchor, _) => {
				self.stack.push(Frame::Sequence {
					anchor,
					items: Vec::new(),
				});
				Ok(())
			}
			Event::MappingStart(anchor, _) => {
				self.stack.push(Frame::Mapping {
					anchor,
					map: Map::new(),
					key: None,
				});
				Ok(())
			}
			Event::SequenceEnd | Event::MappingEnd => match self.stack.pop() {
				Some(Frame::Sequence { anchor, items }) => self.complete(Value::Array(items), anchor, false),
				Some(Frame::Mapping { anchor, map, .. }) => self.complete(Value::Object(map), anchor, false),
				None => Err("unbalanced collection end".to_string()),
			},
			_ => Ok(()),
		};
		if let Err(message) = result {
			self.error = Some(message);
		}
	}
}

impl TreeBuilder {
	fn finish(self) -> Result<Option<Value>, String> {
		match self.error {
			Some(message) => Err(message),
			None => Ok(self.root),
		}
	}

	fn complete(&mut self, value: Value, anchor: usize, merge_key: bool) -> Result<(), String> {
		if anchor > 0 {
			self.anchors.insert(anchor, value.clone());
		}
		self.push(value, merge_key)
	}

	fn push(&mut self, value: Value, merge_key: bool) -> Result<(), String> {
		match self.stack.last_mut() {
			None => {
				self.root.get_or_insert(value);
				Ok(())
			}
			Some(Frame::Sequence { items, .. }) => {
				items.push(value);
				Ok(())
			}
			Some(Frame::Mapping { map, key, .. }) => match key.take() {
				None => {
					*key = Some(if merge_key { Key::Merge } else { Key::Name(key_to_string(value)) });
					Ok(())
				}
				Some(Key::Name(name)) => {
					map.insert(name, value);
					Ok(())
				}
				Some(Key::Merge) => merge_into(map, value),
			},
		}
	}
}

/// Keys already present win, and so do earlier mappings in a merge sequence.
/// Keys written after the merge still override it.
fn merge_into(map: &mut Map, value: Value) -> Result<(), String> {
	let sources = match value {
		Value::Object(source) => vec![source],
		Value::Array(items) => items
			.into_iter()
			.map(|item| match item {
				Value::Object(source) => Ok(source),
				_ => Err("expected a mapping for merging".to_string()),
			})
			.collect::<Result<_, _>>()?,
		_ => return Err("expected a mapping or list of mappings for merging".to_string()),
	};
	for source in sources {
		for (k, v) in source {
			if !map.contains_key(&k) {
				map.insert(k, v);
			}
		}
	}
	Ok(())
}

fn scalar(text: String, plain: bool, tag: Option<(&str, &str)>) -> Value {
	match tag {
		Some((handle, "str")) if CORE_TAG_HANDLES.contains(&handle) => Value::String(text),
		// Any other tag is dropped and the scalar read as if untagged.
		_ if plain => resolve_plain(text),
		_ => Value::String(text),
	}
}

fn resolve_plain(text: String) -> Value {
	match text.as_str() {
		"" | "~" | "null" | "Null" | "NULL" => return Value::Null,
		"true" | "True" | "TRUE" => return Value::Bool(true),
		"false" | "False" | "FALSE" => return Value::Bool(false),
		_ => {}
	}
	if INT_RE.is_match(&text) {
		if let Some(number) = parse_int(&text) {
			return Value::Number(number);
		}
	}
	if FLOAT_RE.is_match(&text) {
		if let Some(f) = parse_float(&text) {
			return Value::Number(Number::Float(f));
		}
	}
	match parse_timestamp(&text) {
		Some(date) => Value::Datetime(date),
		None => Value::String(text),
	}
}

/// Integers past `i64` keep their magnitude as floats.
fn parse_int(text: &str) -> Option<Number> {
	let parsed = if let Some(hex) = text.strip_prefix("0x") {
		i64::from_str_radix(hex, 16)
	} else if let Some(octal) = text.strip_prefix("0o") {
		i64::from_str_radix(octal, 8)
	} else {
		text.parse::<i64>()
	};
	match parsed {
		Ok(i) => Some(Number::Integer(i)),
		Err(_) => text.parse::<f64>().ok().map(Number::Float),
	}
}

fn parse_float(text: &str) -> Option<f64> {
	let (negative, unsigned) = match text.strip_prefix('-') {
		Some(rest) => (true, rest),
		None => (false, text.strip_prefix('+').unwrap_or(text)),
	};
	let magnitude = match unsigned {
		".inf" | ".Inf" | ".INF" => f64::INFINITY,
		".nan" | ".NaN" | ".NAN" => return Some(f64::NAN),
		_ => unsigned.parse::<f64>().ok()?,
	};
	Some(if negative { -magnitude } else { magnitude })
}

/// Mapping keys may be any node in YAML; render them as the text a reader would see.
fn key_to_string(key: Value) -> String {
	match key {
		Value::String(s) => s,
		Value::Null => "null".to_string(),
		Value::Bool(b) => b.to_string(),
		Value::Number(Number::Integer(i)) => i.to_string(),
		Value::Number(Number::Float(f)) => f.to_string(),
		Value::Datetime(d) => d.to_rfc3339(),
		other => serde_json::to_string(&other).unwrap_or_default(),
	}
}

fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
	if let Some(caps) = DATE_RE.captures(s) {
		let day = NaiveDate::from_ymd_opt(
			caps[1].parse().ok()?,
			caps[2].parse().ok()?,
			caps[3].parse().ok()?,
		)?;
		let utc = FixedOffset::east_opt(0)?;
		return utc.from_local_datetime(&day.and_hms_opt(0, 0, 0)?).single();
	}

	let caps = TIMESTAMP_RE.captures(s)?;
	let day = NaiveDate::from_ymd_opt(
		caps[1].parse().ok()?,
		caps[2].parse().ok()?,
		caps[3].parse().ok()?,
	)?;
	let nanos = match caps.get(7) {
		Some(fraction) => fraction_to_nanos(fraction.as_str())?,
		None => 0,
	};
	let time = NaiveTime::from_hms_nano_opt(
		caps[4].parse().ok()?,
		caps[5].parse().ok()?,
		caps[6].parse().ok()?,
		nanos,
	)?;

	let offset_seconds = match caps.get(9) {
		Some(sign) => {
			let hours: i32 = caps[10].parse().ok()?;
			let minutes: i32 = caps.get(11).map_or(Some(0), |m| m.as_str().parse().ok())?;
			let total = hours * 3600 + minutes * 60;
			if sign.as_str() == "-" { -total } else { total }
		}
		None => 0,
	};
	FixedOffset::east_opt(offset_seconds)?
		.from_local_datetime(&NaiveDateTime::new(day, time))
		.single()
}

/// Scale a fractional-seconds digit string to nanoseconds, dropping digits past nine.
fn fraction_to_nanos(fraction: &str) -> Option<u32> {
	let digits: String = fraction.chars().take(9).collect();
	if digits.is_empty() {
		return Some(0);
	}
	let value: u32 = digits.parse().ok()?;
	Some(value * 10u32.pow(9 - digits.len() as u32))
}
