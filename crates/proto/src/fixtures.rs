//! Builders for engine messages and record payloads.
//!
//! Used by this crate's tests and, through the `test-util` feature, by
//! dependent crates that script a fake engine.

use crate::recv::{APP_NAME_LEN, HEADER_LEN, MAX_PATH, RecvId, Version};
use crate::types::{InitPosition, LatLonAlt, Xyz};

/// Protocol version stamped into built headers.
pub const TEST_VERSION: u32 = 4;

/// Wraps `body` in a header of the given raw kind.
pub fn message_raw(kind: u32, body: &[u8]) -> Vec<u8> {
	let size = u32::try_from(HEADER_LEN + body.len()).unwrap_or(u32::MAX);
	let mut out = Vec::with_capacity(HEADER_LEN + body.len());
	out.extend_from_slice(&size.to_le_bytes());
	out.extend_from_slice(&TEST_VERSION.to_le_bytes());
	out.extend_from_slice(&kind.to_le_bytes());
	out.extend_from_slice(body);
	out
}

/// Wraps `body` in a header of the given kind.
pub fn message(kind: RecvId, body: &[u8]) -> Vec<u8> {
	message_raw(kind.raw(), body)
}

pub fn null() -> Vec<u8> {
	message(RecvId::Null, &[])
}

pub fn quit() -> Vec<u8> {
	message(RecvId::Quit, &[])
}

pub fn open(name: &str, application: Version, simconnect: Version) -> Vec<u8> {
	let mut body = PayloadBuilder::new().fixed_str(name, APP_NAME_LEN);
	for v in [application, simconnect] {
		body = body.u32(v.major).u32(v.minor).u32(v.build_major).u32(v.build_minor);
	}
	message(RecvId::Open, &body.u32(0).u32(0).build())
}

pub fn exception(code: u32, send_id: u32, index: u32) -> Vec<u8> {
	message(RecvId::Exception, &PayloadBuilder::new().u32(code).u32(send_id).u32(index).build())
}

pub fn event(event_id: u32, data: u32) -> Vec<u8> {
	message(RecvId::Event, &PayloadBuilder::new().u32(0).u32(event_id).u32(data).build())
}

pub fn event_filename(event_id: u32, file_name: &str, flags: u32) -> Vec<u8> {
	let body = PayloadBuilder::new().u32(0).u32(event_id).u32(0).fixed_str(file_name, MAX_PATH).u32(flags);
	message(RecvId::EventFilename, &body.build())
}

pub fn event_frame(event_id: u32, frame_rate: f32, sim_speed: f32) -> Vec<u8> {
	let body = PayloadBuilder::new().u32(0).u32(event_id).u32(0).f32(frame_rate).f32(sim_speed);
	message(RecvId::EventFrame, &body.build())
}

pub fn system_state(request_id: u32, integer: u32, float: f32, string: &str) -> Vec<u8> {
	let body = PayloadBuilder::new().u32(request_id).u32(integer).f32(float).fixed_str(string, MAX_PATH);
	message(RecvId::SystemState, &body.build())
}

/// Parameters of an object-data message besides its payload.
#[derive(Debug, Clone, Copy)]
pub struct ObjectDataHeader {
	pub request_id: u32,
	pub object_id: u32,
	pub define_id: u32,
	pub entry_number: u32,
	pub out_of: u32,
	pub define_count: u32,
}

impl ObjectDataHeader {
	/// A single-entry response on the user object.
	pub const fn new(request_id: u32, define_id: u32) -> Self {
		Self {
			request_id,
			object_id: 0,
			define_id,
			entry_number: 1,
			out_of: 1,
			define_count: 1,
		}
	}

	/// Marks this as entry `entry_number` of `out_of`.
	pub const fn entry(mut self, entry_number: u32, out_of: u32) -> Self {
		self.entry_number = entry_number;
		self.out_of = out_of;
		self
	}

	fn body(self, payload: &[u8]) -> Vec<u8> {
		PayloadBuilder::new()
			.u32(self.request_id)
			.u32(self.object_id)
			.u32(self.define_id)
			.u32(0)
			.u32(self.entry_number)
			.u32(self.out_of)
			.u32(self.define_count)
			.bytes(payload)
			.build()
	}
}

pub fn sim_object_data(header: ObjectDataHeader, payload: &[u8]) -> Vec<u8> {
	message(RecvId::SimObjectData, &header.body(payload))
}

pub fn sim_object_data_by_type(header: ObjectDataHeader, payload: &[u8]) -> Vec<u8> {
	message(RecvId::SimObjectDataByType, &header.body(payload))
}

/// Little-endian byte builder for record payloads and message bodies.
#[derive(Debug, Clone, Default)]
pub struct PayloadBuilder {
	buf: Vec<u8>,
}

impl PayloadBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn u32(mut self, v: u32) -> Self {
		self.buf.extend_from_slice(&v.to_le_bytes());
		self
	}

	pub fn i32(mut self, v: i32) -> Self {
		self.buf.extend_from_slice(&v.to_le_bytes());
		self
	}

	pub fn i64(mut self, v: i64) -> Self {
		self.buf.extend_from_slice(&v.to_le_bytes());
		self
	}

	pub fn f32(mut self, v: f32) -> Self {
		self.buf.extend_from_slice(&v.to_le_bytes());
		self
	}

	pub fn f64(mut self, v: f64) -> Self {
		self.buf.extend_from_slice(&v.to_le_bytes());
		self
	}

	pub fn bytes(mut self, v: &[u8]) -> Self {
		self.buf.extend_from_slice(v);
		self
	}

	/// NUL-padded text truncated to `width` bytes.
	pub fn fixed_str(mut self, s: &str, width: usize) -> Self {
		let start = self.buf.len();
		self.buf.extend(s.bytes().take(width));
		self.buf.resize(start + width, 0);
		self
	}

	/// A variable-length string preceded by `padding` zero bytes.
	pub fn string_v(mut self, s: &str, padding: usize) -> Self {
		self.buf.resize(self.buf.len() + padding, 0);
		self.buf.extend_from_slice(s.as_bytes());
		self.buf.push(0);
		self
	}

	pub fn lat_lon_alt(self, v: LatLonAlt) -> Self {
		self.f64(v.latitude).f64(v.longitude).f64(v.altitude)
	}

	pub fn xyz(self, v: Xyz) -> Self {
		self.f64(v.x).f64(v.y).f64(v.z)
	}

	pub fn init_position(self, v: &InitPosition) -> Self {
		self.bytes(&v.to_bytes())
	}

	pub fn build(self) -> Vec<u8> {
		self.buf
	}
}
