use ::toml::value::{Datetime, Offset};
use chrono::{FixedOffset, NaiveDate, NaiveTime};

use crate::value::{Map, Number, Value};

pub(super) fn parse(text: &str) -> Result<Map, String> {
	let table: ::toml::Table = ::toml::from_str(text).map_err(|e| e.message().to_string())?;
	Ok(convert_table(table))
}

fn convert_table(table: ::toml::Table) -> Map {
	table.into_iter().map(|(k, v)| (k, convert(v))).collect()
}

fn convert(value: ::toml::Value) -> Value {
	match value {
		::toml::Value::String(s) => Value::String(s),
		::toml::Value::Integer(i) => Value::Number(Number::Integer(i)),
		::toml::Value::Float(f) => Value::Number(Number::Float(f)),
		::toml::Value::Boolean(b) => Value::Bool(b),
		::toml::Value::Datetime(d) => convert_datetime(&d),
		::toml::Value::Array(items) => Value::Array(items.into_iter().map(convert).collect()),
		::toml::Value::Table(table) => Value::Object(convert_table(table)),
	}
}

/// Offset date-times keep their offset, local date-times are read as UTC and
/// local dates as UTC midnight. A bare local time has no date, so it stays text.
fn convert_datetime(d: &Datetime) -> Value {
	let Some(date) = d.date else {
		return Value::String(d.to_string());
	};
	let Some(day) = NaiveDate::from_ymd_opt(date.year as i32, date.month as u32, date.day as u32)
	else {
		return Value::String(d.to_string());
	};
	let time = match d.time {
		Some(t) => NaiveTime::from_hms_nano_opt(
			t.hour as u32,
			t.minute as u32,
			t.second as u32,
			t.nanosecond,
		),
		None => NaiveTime::from_hms_opt(0, 0, 0),
	};
	let Some(time) = time else {
		return Value::String(d.to_string());
	};
	let offset_seconds = match d.offset {
		Some(Offset::Custom { minutes }) => i32::from(minutes) * 60,
		Some(Offset::Z) | None => 0,
	};
	match FixedOffset::east_opt(offset_seconds)
		.and_then(|offset| day.and_time(time).and_local_timezone(offset).single())
	{
		Some(dt) => Value::Datetime(dt),
		None => Value::String(d.to_string()),
	}
}
