//! Identifiers, enumerations and fixed-shape structs of the engine API.

use serde::{Deserialize, Serialize};

use crate::error::{ProtoError, Result};
use crate::reader::Reader;

/// Identifier of a data definition registered with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DefinitionId(pub u32);

/// Identifier of a client event or system event subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u32);

/// Identifier correlating a data or system-state request with its responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u32);

/// Identifier of a simulation object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
	/// The user's own aircraft.
	pub const USER: Self = Self(0);
}

impl Default for ObjectId {
	fn default() -> Self {
		Self::USER
	}
}

/// Group priority used when transmitting client events.
pub const GROUP_PRIORITY_HIGHEST: u32 = 1;

/// Transmit flag: interpret the group id argument as a priority.
pub const EVENT_FLAG_GROUPID_IS_PRIORITY: u32 = 0x0000_0010;

/// Native data types a definition field can be serialized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum DataType {
	Int32,
	Int64,
	Float32,
	#[default]
	Float64,
	String8,
	String32,
	String64,
	String128,
	String256,
	String260,
	/// Variable-length, NUL-terminated string.
	StringV,
	InitPosition,
	MarkerState,
	Waypoint,
	LatLonAlt,
	Xyz,
}

impl DataType {
	/// Returns the engine's numeric code.
	pub const fn code(self) -> u32 {
		match self {
			Self::Int32 => 1,
			Self::Int64 => 2,
			Self::Float32 => 3,
			Self::Float64 => 4,
			Self::String8 => 5,
			Self::String32 => 6,
			Self::String64 => 7,
			Self::String128 => 8,
			Self::String256 => 9,
			Self::String260 => 10,
			Self::StringV => 11,
			Self::InitPosition => 12,
			Self::MarkerState => 13,
			Self::Waypoint => 14,
			Self::LatLonAlt => 15,
			Self::Xyz => 16,
		}
	}

	/// Serialized width in bytes; `None` for [`DataType::StringV`].
	///
	/// Must match the engine's packed struct sizes exactly.
	pub const fn width(self) -> Option<usize> {
		Some(match self {
			Self::Int32 | Self::Float32 => 4,
			Self::Int64 | Self::Float64 | Self::String8 => 8,
			Self::String32 => 32,
			Self::String64 => 64,
			Self::String128 => 128,
			Self::String256 => 256,
			Self::String260 => 260,
			Self::StringV => return None,
			Self::InitPosition => InitPosition::WIDTH,
			Self::MarkerState => MarkerState::WIDTH,
			Self::Waypoint => Waypoint::WIDTH,
			Self::LatLonAlt => LatLonAlt::WIDTH,
			Self::Xyz => Xyz::WIDTH,
		})
	}
}

impl TryFrom<u32> for DataType {
	type Error = ProtoError;

	fn try_from(code: u32) -> Result<Self> {
		Ok(match code {
			1 => Self::Int32,
			2 => Self::Int64,
			3 => Self::Float32,
			4 => Self::Float64,
			5 => Self::String8,
			6 => Self::String32,
			7 => Self::String64,
			8 => Self::String128,
			9 => Self::String256,
			10 => Self::String260,
			11 => Self::StringV,
			12 => Self::InitPosition,
			13 => Self::MarkerState,
			14 => Self::Waypoint,
			15 => Self::LatLonAlt,
			16 => Self::Xyz,
			other => return Err(ProtoError::UnknownDataType(other)),
		})
	}
}

impl From<DataType> for u32 {
	fn from(ty: DataType) -> Self {
		ty.code()
	}
}

/// How often the engine sends data for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Period {
	Never,
	Once,
	VisualFrame,
	#[default]
	SimFrame,
	Second,
}

impl TryFrom<u32> for Period {
	type Error = ProtoError;

	fn try_from(code: u32) -> Result<Self> {
		Ok(match code {
			0 => Self::Never,
			1 => Self::Once,
			2 => Self::VisualFrame,
			3 => Self::SimFrame,
			4 => Self::Second,
			other => return Err(ProtoError::UnknownPeriod(other)),
		})
	}
}

impl From<Period> for u32 {
	fn from(period: Period) -> Self {
		match period {
			Period::Never => 0,
			Period::Once => 1,
			Period::VisualFrame => 2,
			Period::SimFrame => 3,
			Period::Second => 4,
		}
	}
}

/// Object category filter for by-type requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SimObjectType {
	#[default]
	User,
	All,
	Aircraft,
	Helicopter,
	Boat,
	Ground,
}

impl TryFrom<u32> for SimObjectType {
	type Error = ProtoError;

	fn try_from(code: u32) -> Result<Self> {
		Ok(match code {
			0 => Self::User,
			1 => Self::All,
			2 => Self::Aircraft,
			3 => Self::Helicopter,
			4 => Self::Boat,
			5 => Self::Ground,
			other => return Err(ProtoError::UnknownObjectType(other)),
		})
	}
}

impl From<SimObjectType> for u32 {
	fn from(ty: SimObjectType) -> Self {
		match ty {
			SimObjectType::User => 0,
			SimObjectType::All => 1,
			SimObjectType::Aircraft => 2,
			SimObjectType::Helicopter => 3,
			SimObjectType::Boat => 4,
			SimObjectType::Ground => 5,
		}
	}
}

/// Parameters of a recurring data request on one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataRequest {
	pub object_id: ObjectId,
	pub period: Period,
	/// Request flags (`1` = only when changed, `2` = tagged format).
	pub flags: u32,
	/// Periods to skip before the first send.
	pub origin: u32,
	/// Periods between sends.
	pub interval: u32,
	/// Number of sends before the request stops; `0` means unlimited.
	pub limit: u32,
}

/// Latitude/longitude/altitude triple.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLonAlt {
	pub latitude: f64,
	pub longitude: f64,
	pub altitude: f64,
}

impl LatLonAlt {
	pub const WIDTH: usize = 24;

	/// Reads the packed layout.
	pub fn read(r: &mut Reader<'_>) -> Result<Self> {
		Ok(Self {
			latitude: r.f64()?,
			longitude: r.f64()?,
			altitude: r.f64()?,
		})
	}
}

/// Cartesian vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Xyz {
	pub x: f64,
	pub y: f64,
	pub z: f64,
}

impl Xyz {
	pub const WIDTH: usize = 24;

	/// Reads the packed layout.
	pub fn read(r: &mut Reader<'_>) -> Result<Self> {
		Ok(Self {
			x: r.f64()?,
			y: r.f64()?,
			z: r.f64()?,
		})
	}
}

/// Initial placement of an aircraft.
///
/// Every field is optional on input and defaults to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InitPosition {
	pub latitude: f64,
	pub longitude: f64,
	/// Feet.
	pub altitude: f64,
	pub pitch: f64,
	pub bank: f64,
	pub heading: f64,
	/// `1` to force the aircraft onto the ground.
	pub on_ground: u32,
	/// Knots; the engine also accepts its cruise/keep sentinels here.
	pub airspeed: u32,
}

impl InitPosition {
	pub const WIDTH: usize = 56;

	/// Reads the packed layout.
	pub fn read(r: &mut Reader<'_>) -> Result<Self> {
		Ok(Self {
			latitude: r.f64()?,
			longitude: r.f64()?,
			altitude: r.f64()?,
			pitch: r.f64()?,
			bank: r.f64()?,
			heading: r.f64()?,
			on_ground: r.u32()?,
			airspeed: r.u32()?,
		})
	}

	/// Serializes to the packed layout expected by a set-data call.
	pub fn to_bytes(&self) -> [u8; Self::WIDTH] {
		let mut out = [0u8; Self::WIDTH];
		let doubles = [self.latitude, self.longitude, self.altitude, self.pitch, self.bank, self.heading];
		for (chunk, value) in out.chunks_exact_mut(8).zip(doubles) {
			chunk.copy_from_slice(&value.to_le_bytes());
		}
		out[48..52].copy_from_slice(&self.on_ground.to_le_bytes());
		out[52..56].copy_from_slice(&self.airspeed.to_le_bytes());
		out
	}
}

/// Named on/off marker.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarkerState {
	pub name: String,
	pub state: u32,
}

impl MarkerState {
	pub const WIDTH: usize = 68;

	/// Reads the packed layout.
	pub fn read(r: &mut Reader<'_>) -> Result<Self> {
		Ok(Self {
			name: r.fixed_str(64)?,
			state: r.u32()?,
		})
	}
}

/// One leg of an AI flight plan.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Waypoint {
	pub latitude: f64,
	pub longitude: f64,
	pub altitude: f64,
	pub flags: u32,
	pub speed_knots: f64,
	pub percent_throttle: f64,
}

impl Waypoint {
	pub const WIDTH: usize = 44;

	/// Reads the packed layout.
	pub fn read(r: &mut Reader<'_>) -> Result<Self> {
		Ok(Self {
			latitude: r.f64()?,
			longitude: r.f64()?,
			altitude: r.f64()?,
			flags: r.u32()?,
			speed_knots: r.f64()?,
			percent_throttle: r.f64()?,
		})
	}
}
