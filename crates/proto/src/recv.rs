//! Inbound message layouts.
//!
//! Every message starts with a 12-byte header `{ size, version, kind }`
//! followed by a kind-specific packed body. [`Message::parse`] classifies a
//! raw buffer into one variant per kind, borrowing variable payloads.

use serde::Serialize;

use crate::error::Result;
use crate::exception::exception_name;
use crate::reader::{Reader, latin1_until_nul};
use crate::status::Status;
use crate::types::{DefinitionId, EventId, ObjectId, RequestId};

/// Size of the common message header.
pub const HEADER_LEN: usize = 12;

/// Width of the application name buffer in an open message.
pub const APP_NAME_LEN: usize = 256;

/// Width of path-sized string buffers.
pub const MAX_PATH: usize = 260;

/// Offset of the first data byte in an object-data message.
pub const OBJECT_DATA_ORIGIN: usize = 40;

/// Message kind discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecvId {
	Null,
	Exception,
	Open,
	Quit,
	Event,
	EventObjectAddRemove,
	EventFilename,
	EventFrame,
	SimObjectData,
	SimObjectDataByType,
	WeatherObservation,
	CloudState,
	AssignedObjectId,
	ReservedKey,
	CustomAction,
	SystemState,
	ClientData,
}

impl RecvId {
	/// Maps a raw discriminant; `None` for kinds this crate does not know.
	pub const fn from_raw(raw: u32) -> Option<Self> {
		Some(match raw {
			0 => Self::Null,
			1 => Self::Exception,
			2 => Self::Open,
			3 => Self::Quit,
			4 => Self::Event,
			5 => Self::EventObjectAddRemove,
			6 => Self::EventFilename,
			7 => Self::EventFrame,
			8 => Self::SimObjectData,
			9 => Self::SimObjectDataByType,
			10 => Self::WeatherObservation,
			11 => Self::CloudState,
			12 => Self::AssignedObjectId,
			13 => Self::ReservedKey,
			14 => Self::CustomAction,
			15 => Self::SystemState,
			16 => Self::ClientData,
			_ => return None,
		})
	}

	/// Returns the raw discriminant.
	pub const fn raw(self) -> u32 {
		self as u32
	}
}

/// Common header of every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
	pub size: u32,
	pub version: u32,
	pub kind: u32,
}

impl Header {
	/// Reads the header from the start of a message.
	pub fn read(r: &mut Reader<'_>) -> Result<Self> {
		Ok(Self {
			size: r.u32()?,
			version: r.u32()?,
			kind: r.u32()?,
		})
	}
}

/// Four-part version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Version {
	pub major: u32,
	pub minor: u32,
	pub build_major: u32,
	pub build_minor: u32,
}

impl Version {
	fn read(r: &mut Reader<'_>) -> Result<Self> {
		Ok(Self {
			major: r.u32()?,
			minor: r.u32()?,
			build_major: r.u32()?,
			build_minor: r.u32()?,
		})
	}
}

impl std::fmt::Display for Version {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}.{}.{}", self.major, self.minor, self.build_major, self.build_minor)
	}
}

/// Body of an open acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
	pub application_name: String,
	pub application_version: Version,
	pub simconnect_version: Version,
}

/// Body of an exception report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionInfo {
	/// Numeric exception code.
	pub exception: u32,
	/// Symbolic name of [`Self::exception`].
	pub name: &'static str,
	/// Packet id of the failing call.
	pub send_id: u32,
	/// Index of the offending argument, if the engine reports one.
	pub index: u32,
	/// Total message size as received.
	pub size: u32,
	/// Protocol version from the message header.
	pub version: u32,
}

/// Body of a plain event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventData {
	pub group_id: u32,
	pub event_id: EventId,
	pub data: u32,
}

/// Body of a filename-carrying event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameEvent {
	pub group_id: u32,
	pub event_id: EventId,
	pub file_name: String,
	pub flags: u32,
}

/// Body of a frame event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEvent {
	pub group_id: u32,
	pub event_id: EventId,
	pub frame_rate: f32,
	pub sim_speed: f32,
}

/// Body of a system-state response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemState {
	#[serde(skip)]
	pub request_id: RequestId,
	pub integer: u32,
	pub float: f32,
	pub string: String,
}

/// Body of an object-data response, with the raw record payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimObjectData<'a> {
	pub request_id: RequestId,
	pub object_id: ObjectId,
	pub define_id: DefinitionId,
	pub flags: u32,
	/// 1-based index of this entry within a multi-object response.
	pub entry_number: u32,
	/// Total entries in a multi-object response.
	pub out_of: u32,
	pub define_count: u32,
	/// Record bytes starting at the data origin.
	pub data: &'a [u8],
}

impl SimObjectData<'_> {
	/// Returns true when no further entries follow for this request.
	pub const fn is_last_entry(&self) -> bool {
		self.entry_number >= self.out_of
	}
}

/// A classified inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message<'a> {
	Null,
	Exception(ExceptionInfo),
	Open(OpenInfo),
	Quit,
	Event(EventData),
	EventFilename(FilenameEvent),
	EventFrame(FrameEvent),
	SimObjectData(SimObjectData<'a>),
	SimObjectDataByType(SimObjectData<'a>),
	SystemState(SystemState),
	/// A kind this crate knows but does not decode.
	Unhandled(RecvId),
	/// A discriminant outside the known enumeration.
	Unrecognized(u32),
}

impl<'a> Message<'a> {
	/// Classifies and decodes a raw message.
	pub fn parse(buf: &'a [u8]) -> Result<Self> {
		let mut r = Reader::new(buf);
		let header = Header::read(&mut r)?;
		let Some(kind) = RecvId::from_raw(header.kind) else {
			return Ok(Self::Unrecognized(header.kind));
		};
		Ok(match kind {
			RecvId::Null => Self::Null,
			RecvId::Quit => Self::Quit,
			RecvId::Exception => {
				let exception = r.u32()?;
				Self::Exception(ExceptionInfo {
					exception,
					name: exception_name(exception),
					send_id: r.u32()?,
					index: r.u32()?,
					size: u32::try_from(buf.len()).unwrap_or(u32::MAX),
					version: header.version,
				})
			}
			RecvId::Open => {
				let application_name = r.fixed_str(APP_NAME_LEN)?;
				Self::Open(OpenInfo {
					application_name,
					application_version: Version::read(&mut r)?,
					simconnect_version: Version::read(&mut r)?,
				})
			}
			RecvId::Event => Self::Event(read_event(&mut r)?),
			RecvId::EventFilename => {
				let event = read_event(&mut r)?;
				Self::EventFilename(FilenameEvent {
					group_id: event.group_id,
					event_id: event.event_id,
					file_name: r.fixed_str(MAX_PATH)?,
					flags: r.u32()?,
				})
			}
			RecvId::EventFrame => {
				let event = read_event(&mut r)?;
				Self::EventFrame(FrameEvent {
					group_id: event.group_id,
					event_id: event.event_id,
					frame_rate: r.f32()?,
					sim_speed: r.f32()?,
				})
			}
			RecvId::SimObjectData => Self::SimObjectData(read_object_data(&mut r)?),
			RecvId::SimObjectDataByType => Self::SimObjectDataByType(read_object_data(&mut r)?),
			RecvId::SystemState => Self::SystemState(SystemState {
				request_id: RequestId(r.u32()?),
				integer: r.u32()?,
				float: r.f32()?,
				string: r.fixed_str(MAX_PATH)?,
			}),
			other => Self::Unhandled(other),
		})
	}
}

fn read_event(r: &mut Reader<'_>) -> Result<EventData> {
	Ok(EventData {
		group_id: r.u32()?,
		event_id: EventId(r.u32()?),
		data: r.u32()?,
	})
}

fn read_object_data<'a>(r: &mut Reader<'a>) -> Result<SimObjectData<'a>> {
	let request_id = RequestId(r.u32()?);
	let object_id = ObjectId(r.u32()?);
	let define_id = DefinitionId(r.u32()?);
	let flags = r.u32()?;
	let entry_number = r.u32()?;
	let out_of = r.u32()?;
	let define_count = r.u32()?;
	debug_assert_eq!(r.position(), OBJECT_DATA_ORIGIN);
	Ok(SimObjectData {
		request_id,
		object_id,
		define_id,
		flags,
		entry_number,
		out_of,
		define_count,
		data: r.rest(),
	})
}

/// Reads a variable-length string at `offset` within a record payload.
///
/// Returns the text and the bytes it occupies, terminator included. Fails
/// with [`Status::E_FAIL`] when the offset is outside the payload or the
/// string is unterminated, matching the engine's own retrieval helper.
pub fn retrieve_string(data: &[u8], offset: usize) -> std::result::Result<(String, usize), Status> {
	let tail = data.get(offset..).ok_or(Status::E_FAIL)?;
	let nul = tail.iter().position(|&b| b == 0).ok_or(Status::E_FAIL)?;
	Ok((latin1_until_nul(&tail[..nul]), nul + 1))
}
