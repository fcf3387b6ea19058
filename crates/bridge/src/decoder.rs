//! Record decoder: definition + raw payload -> ordered name/value map.

use indexmap::IndexMap;
use serde::Serialize;
use simlink_proto::reader::Reader;
use simlink_proto::{DataType, InitPosition, LatLonAlt, MarkerState, Status, Waypoint, Xyz};

use crate::definitions::DataDefinition;
use crate::error::DecodeError;

/// One decoded field value.
///
/// Serializes untagged, so a record converts to a flat JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
	Int(i64),
	Float(f64),
	String(String),
	LatLonAlt(LatLonAlt),
	Xyz(Xyz),
	InitPosition(InitPosition),
	MarkerState(MarkerState),
	Waypoint(Waypoint),
}

impl Value {
	/// Numeric view of `Int` and `Float` values.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Int(v) => Some(*v as f64),
			Self::Float(v) => Some(*v),
			_ => None,
		}
	}

	/// Text view of `String` values.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}
}

/// Decoded record in definition field order.
pub type Record = IndexMap<String, Value>;

/// Decodes `payload` against `definition`.
///
/// `payload` starts at the data origin of the message. Variable-length
/// strings sit `string_padding` bytes past the cursor and are extracted
/// through `retrieve`, which reports the bytes they occupy. Any failure
/// aborts the whole record.
pub fn decode_record<F>(definition: &DataDefinition, payload: &[u8], string_padding: usize, retrieve: F) -> Result<Record, DecodeError>
where
	F: Fn(&[u8], usize) -> Result<(String, usize), Status>,
{
	let mut record = Record::with_capacity(definition.fields.len());
	let mut cursor = 0usize;
	for field in &definition.fields {
		let value = if field.data_type == DataType::StringV {
			cursor = cursor.saturating_add(string_padding);
			let (text, consumed) = retrieve(payload, cursor).map_err(|status| DecodeError::StringRetrieval {
				field: field.name.clone(),
				status,
			})?;
			cursor = cursor.saturating_add(consumed);
			Value::String(text)
		} else {
			let mut r = Reader::at(payload, cursor);
			let value = read_fixed(&mut r, field.data_type).map_err(|source| DecodeError::Overrun {
				field: field.name.clone(),
				source,
			})?;
			cursor = r.position();
			value
		};
		record.insert(field.name.clone(), value);
	}
	Ok(record)
}

fn read_fixed(r: &mut Reader<'_>, data_type: DataType) -> simlink_proto::Result<Value> {
	Ok(match data_type {
		DataType::Int32 => Value::Int(i64::from(r.i32()?)),
		DataType::Int64 => Value::Int(r.i64()?),
		DataType::Float32 => Value::Float(f64::from(r.f32()?)),
		DataType::Float64 => Value::Float(r.f64()?),
		DataType::InitPosition => Value::InitPosition(InitPosition::read(r)?),
		DataType::MarkerState => Value::MarkerState(MarkerState::read(r)?),
		DataType::Waypoint => Value::Waypoint(Waypoint::read(r)?),
		DataType::LatLonAlt => Value::LatLonAlt(LatLonAlt::read(r)?),
		DataType::Xyz => Value::Xyz(Xyz::read(r)?),
		fixed_str => {
			// Fixed-width strings; StringV never reaches here.
			let width = fixed_str.width().unwrap_or_default();
			Value::String(r.fixed_str(width)?)
		}
	})
}

#[cfg(test)]
mod tests;
