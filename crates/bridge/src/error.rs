//! Error types for the bridge.

use std::path::PathBuf;

use simlink_proto::{DefinitionId, ProtoError, Status};
use thiserror::Error;

/// Errors that can occur while loading bridge configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},
}

/// Errors that can occur while turning a data payload into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
	/// The message names a definition this session never created.
	#[error("unknown data definition {0:?}")]
	UnknownDefinition(DefinitionId),

	/// A fixed-width field ran past the end of the payload.
	#[error("field {field:?}: {source}")]
	Overrun {
		/// Name of the field being read.
		field: String,
		/// Underlying wire error.
		source: ProtoError,
	},

	/// The engine could not produce a variable-length string.
	#[error("field {field:?}: string retrieval failed with {status}")]
	StringRetrieval {
		/// Name of the field being read.
		field: String,
		/// Status returned by the retrieval call.
		status: Status,
	},
}

/// Errors surfaced by session operations and reported to the error handler.
#[derive(Debug, Error)]
pub enum BridgeError {
	/// No connection is open.
	#[error("not connected")]
	NotConnected,

	/// `open` was called while a connection is already open.
	#[error("already connected")]
	AlreadyConnected,

	/// An engine call returned a failing status.
	#[error("{op} failed: {status}")]
	Status {
		/// Name of the engine call.
		op: &'static str,
		/// Status it returned.
		status: Status,
	},

	/// A field list was rejected before reaching the engine.
	#[error("invalid data definition: {0}")]
	InvalidDefinition(String),

	/// A definition id that was never created.
	#[error("unknown data definition {0:?}")]
	UnknownDefinition(DefinitionId),

	/// A received message could not be decoded.
	#[error("decode failed: {0}")]
	Decode(#[from] DecodeError),

	/// A received message was malformed.
	#[error("malformed message: {0}")]
	Malformed(#[from] ProtoError),

	/// Configuration could not be loaded.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// The dispatch thread could not be started.
	#[error("failed to spawn dispatch thread: {0}")]
	Spawn(#[source] std::io::Error),
}

impl BridgeError {
	/// Returns the engine status carried by this error, if any.
	pub fn status(&self) -> Option<Status> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::Decode(DecodeError::StringRetrieval { status, .. }) => Some(*status),
			_ => None,
		}
	}
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
