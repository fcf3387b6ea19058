use pretty_assertions::assert_eq;
use proptest::prelude::*;
use simlink_proto::fixtures::PayloadBuilder;
use simlink_proto::{DefinitionId, retrieve_string};

use super::*;

fn def(fields: &[(&str, DataType)]) -> DataDefinition {
	DataDefinition::from_fields(DefinitionId(0), fields.iter().copied())
}

#[test]
fn airspeed_and_title_in_definition_order() {
	let definition = def(&[("Airspeed", DataType::Float64), ("Title", DataType::StringV)]);
	let payload = PayloadBuilder::new().f64(123.4).string_v("Cessna 172", 8).build();

	let record = decode_record(&definition, &payload, 8, retrieve_string).unwrap();

	let expected: Record = [
		("Airspeed".to_owned(), Value::Float(123.4)),
		("Title".to_owned(), Value::String("Cessna 172".to_owned())),
	]
	.into_iter()
	.collect();
	assert_eq!(record, expected);
	assert_eq!(
		serde_json::to_value(&record).unwrap(),
		serde_json::json!({"Airspeed": 123.4, "Title": "Cessna 172"})
	);
}

#[test]
fn numeric_fields_use_declared_widths() {
	let definition = def(&[
		("Gear", DataType::Int32),
		("Ticks", DataType::Int64),
		("Flaps", DataType::Float32),
		("Alt", DataType::Float64),
	]);
	let payload = PayloadBuilder::new().i32(-1).i64(1 << 40).f32(0.5).f64(3500.25).build();

	let record = decode_record(&definition, &payload, 8, retrieve_string).unwrap();

	assert_eq!(record["Gear"], Value::Int(-1));
	assert_eq!(record["Ticks"], Value::Int(1 << 40));
	assert_eq!(record["Flaps"], Value::Float(0.5));
	assert_eq!(record["Alt"].as_f64(), Some(3500.25));
}

#[test]
fn strings_interleave_with_fixed_fields() {
	let definition = def(&[
		("Title", DataType::StringV),
		("Heading", DataType::Float64),
		("Atc", DataType::String8),
		("Livery", DataType::StringV),
		("Lat", DataType::Float64),
	]);
	let payload = PayloadBuilder::new()
		.string_v("Boeing 747-8", 8)
		.f64(270.0)
		.fixed_str("N123", 8)
		.string_v("", 8)
		.f64(47.5)
		.build();

	let record = decode_record(&definition, &payload, 8, retrieve_string).unwrap();

	assert_eq!(record["Title"].as_str(), Some("Boeing 747-8"));
	assert_eq!(record["Heading"], Value::Float(270.0));
	assert_eq!(record["Atc"].as_str(), Some("N123"));
	assert_eq!(record["Livery"].as_str(), Some(""));
	assert_eq!(record["Lat"], Value::Float(47.5));
}

#[test]
fn padding_is_configurable() {
	let definition = def(&[("Title", DataType::StringV), ("N", DataType::Int32)]);
	let payload = PayloadBuilder::new().string_v("A320", 4).i32(7).build();

	let record = decode_record(&definition, &payload, 4, retrieve_string).unwrap();

	assert_eq!(record["Title"].as_str(), Some("A320"));
	assert_eq!(record["N"], Value::Int(7));
}

#[test]
fn struct_types_decode_to_struct_values() {
	let position = LatLonAlt {
		latitude: 47.25,
		longitude: -122.3,
		altitude: 430.0,
	};
	let velocity = Xyz { x: 1.0, y: -2.0, z: 0.5 };
	let definition = def(&[("Pos", DataType::LatLonAlt), ("Vel", DataType::Xyz)]);
	let payload = PayloadBuilder::new().lat_lon_alt(position).xyz(velocity).build();

	let record = decode_record(&definition, &payload, 8, retrieve_string).unwrap();

	assert_eq!(record["Pos"], Value::LatLonAlt(position));
	assert_eq!(record["Vel"], Value::Xyz(velocity));
}

#[test]
fn overrun_aborts_whole_record() {
	let definition = def(&[("A", DataType::Float64), ("B", DataType::Float64)]);
	let payload = PayloadBuilder::new().f64(1.0).i32(0).build();

	let err = decode_record(&definition, &payload, 8, retrieve_string).unwrap_err();

	assert!(matches!(err, DecodeError::Overrun { ref field, .. } if field == "B"));
}

#[test]
fn string_retrieval_failure_carries_status() {
	let definition = def(&[("Title", DataType::StringV)]);
	let payload = PayloadBuilder::new().string_v("x", 8).build();

	let err = decode_record(&definition, &payload, 8, |_, _| Err(Status::E_FAIL)).unwrap_err();

	assert_eq!(
		err,
		DecodeError::StringRetrieval {
			field: "Title".to_owned(),
			status: Status::E_FAIL
		}
	);
}

#[derive(Debug, Clone)]
enum Sample {
	Int32(i32),
	Int64(i64),
	Float32(f32),
	Float64(f64),
	String32(String),
	StringV(String),
}

impl Sample {
	fn data_type(&self) -> DataType {
		match self {
			Self::Int32(_) => DataType::Int32,
			Self::Int64(_) => DataType::Int64,
			Self::Float32(_) => DataType::Float32,
			Self::Float64(_) => DataType::Float64,
			Self::String32(_) => DataType::String32,
			Self::StringV(_) => DataType::StringV,
		}
	}

	fn encode(&self, b: PayloadBuilder, padding: usize) -> PayloadBuilder {
		match self {
			Self::Int32(v) => b.i32(*v),
			Self::Int64(v) => b.i64(*v),
			Self::Float32(v) => b.f32(*v),
			Self::Float64(v) => b.f64(*v),
			Self::String32(s) => b.fixed_str(s, 32),
			Self::StringV(s) => b.string_v(s, padding),
		}
	}

	fn expected(&self) -> Value {
		match self {
			Self::Int32(v) => Value::Int(i64::from(*v)),
			Self::Int64(v) => Value::Int(*v),
			Self::Float32(v) => Value::Float(f64::from(*v)),
			Self::Float64(v) => Value::Float(*v),
			Self::String32(s) | Self::StringV(s) => Value::String(s.clone()),
		}
	}
}

fn sample() -> impl Strategy<Value = Sample> {
	prop_oneof![
		any::<i32>().prop_map(Sample::Int32),
		any::<i64>().prop_map(Sample::Int64),
		(-1.0e6f32..1.0e6).prop_map(Sample::Float32),
		(-1.0e12f64..1.0e12).prop_map(Sample::Float64),
		"[a-zA-Z0-9 ]{0,31}".prop_map(Sample::String32),
		"[a-zA-Z0-9 ./-]{0,80}".prop_map(Sample::StringV),
	]
}

proptest! {
	#[test]
	fn decode_preserves_names_values_and_order(samples in proptest::collection::vec(sample(), 1..12), padding in 0usize..16) {
		let definition = DataDefinition::from_fields(
			DefinitionId(1),
			samples.iter().enumerate().map(|(i, s)| (format!("field{i}"), s.data_type())),
		);
		let payload = samples.iter().fold(PayloadBuilder::new(), |b, s| s.encode(b, padding)).build();

		let record = decode_record(&definition, &payload, padding, retrieve_string).unwrap();

		let names: Vec<_> = record.keys().cloned().collect();
		let expected_names: Vec<_> = (0..samples.len()).map(|i| format!("field{i}")).collect();
		prop_assert_eq!(names, expected_names);
		for (value, sample) in record.values().zip(&samples) {
			prop_assert_eq!(value, &sample.expected());
		}
	}
}
