//! Wire model of the simulation engine API.
//!
//! Identifiers, result codes, data types and the packed message layouts the
//! engine delivers through its poll call. Everything here is pure data; the
//! connection itself lives behind the `Engine` trait in the bridge crate.

mod error;
mod exception;
mod field;
pub mod reader;
pub mod recv;
mod status;
mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod fixtures;

pub use error::{ProtoError, Result};
pub use exception::exception_name;
pub use field::FieldSpec;
pub use recv::{ExceptionInfo, Message, OpenInfo, RecvId, SimObjectData, SystemState, Version, retrieve_string};
pub use status::Status;
pub use types::{
	DataRequest, DataType, DefinitionId, EVENT_FLAG_GROUPID_IS_PRIORITY, EventId, GROUP_PRIORITY_HIGHEST, InitPosition, LatLonAlt,
	MarkerState, ObjectId, Period, RequestId, SimObjectType, Waypoint, Xyz,
};
