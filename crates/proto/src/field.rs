//! Field specifications for data definitions.

use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::types::DataType;

/// One field of a data definition.
///
/// On the host side a field is the tuple `[name, unit-or-null, type?,
/// epsilon?, datum_id?]`; each trailing element refines the add-field call.
/// A `None` unit is how string fields are requested.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
	pub name: String,
	pub unit: Option<String>,
	pub data_type: DataType,
	/// Change threshold for "only when changed" requests.
	pub epsilon: f32,
	/// Caller-chosen datum id for tagged requests.
	pub datum_id: Option<u32>,
}

impl FieldSpec {
	/// A `Float64` field in `unit`.
	pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			unit: Some(unit.into()),
			data_type: DataType::Float64,
			epsilon: 0.0,
			datum_id: None,
		}
	}

	/// A unitless field of `data_type`, typically a string.
	pub fn unitless(name: impl Into<String>, data_type: DataType) -> Self {
		Self {
			name: name.into(),
			unit: None,
			data_type,
			epsilon: 0.0,
			datum_id: None,
		}
	}

	/// Overrides the data type.
	pub fn with_type(mut self, data_type: DataType) -> Self {
		self.data_type = data_type;
		self
	}

	/// Sets the change threshold.
	pub fn with_epsilon(mut self, epsilon: f32) -> Self {
		self.epsilon = epsilon;
		self
	}

	/// Sets the datum id.
	pub fn with_datum_id(mut self, datum_id: u32) -> Self {
		self.datum_id = Some(datum_id);
		self
	}
}

impl<'de> Deserialize<'de> for FieldSpec {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_seq(FieldTupleVisitor)
	}
}

struct FieldTupleVisitor;

impl<'de> Visitor<'de> for FieldTupleVisitor {
	type Value = FieldSpec;

	fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("a field tuple [name, unit-or-null, type?, epsilon?, datum_id?]")
	}

	fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<FieldSpec, A::Error> {
		let name: String = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(0, &self))?;
		// A lone name is not enough: the unit slot must be present, even if null.
		let unit: Option<String> = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(1, &self))?;
		let data_type: Option<DataType> = seq.next_element()?;
		let epsilon: Option<f32> = seq.next_element()?;
		let datum_id: Option<u32> = seq.next_element()?;
		if seq.next_element::<de::IgnoredAny>()?.is_some() {
			return Err(de::Error::invalid_length(6, &self));
		}
		Ok(FieldSpec {
			name,
			unit,
			data_type: data_type.unwrap_or_default(),
			epsilon: epsilon.unwrap_or(0.0),
			datum_id,
		})
	}
}

impl Serialize for FieldSpec {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let len = if self.datum_id.is_some() { 5 } else { 4 };
		let mut seq = serializer.serialize_seq(Some(len))?;
		seq.serialize_element(&self.name)?;
		seq.serialize_element(&self.unit)?;
		seq.serialize_element(&self.data_type)?;
		seq.serialize_element(&self.epsilon)?;
		if let Some(id) = self.datum_id {
			seq.serialize_element(&id)?;
		}
		seq.end()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn minimal_tuple_defaults_to_float64() {
		let field: FieldSpec = serde_json::from_value(json!(["Airspeed", "knots"])).unwrap();
		assert_eq!(field, FieldSpec::new("Airspeed", "knots"));
	}

	#[test]
	fn null_unit_with_string_type() {
		let field: FieldSpec = serde_json::from_value(json!(["Title", null, 11])).unwrap();
		assert_eq!(field, FieldSpec::unitless("Title", DataType::StringV));
	}

	#[test]
	fn full_tuple_sets_every_refinement() {
		let field: FieldSpec = serde_json::from_value(json!(["Altitude", "feet", 3, 0.5, 42])).unwrap();
		assert_eq!(field.data_type, DataType::Float32);
		assert_eq!(field.epsilon, 0.5);
		assert_eq!(field.datum_id, Some(42));
		assert_eq!(
			field,
			FieldSpec::new("Altitude", "feet").with_type(DataType::Float32).with_epsilon(0.5).with_datum_id(42)
		);
	}

	#[test]
	fn rejects_malformed_tuples() {
		assert!(serde_json::from_value::<FieldSpec>(json!(["Airspeed"])).is_err());
		assert!(serde_json::from_value::<FieldSpec>(json!([])).is_err());
		assert!(serde_json::from_value::<FieldSpec>(json!(["A", "b", 4, 0, 1, "extra"])).is_err());
		assert!(serde_json::from_value::<FieldSpec>(json!(["A", "b", 77])).is_err());
	}
}
