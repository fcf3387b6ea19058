//! Error types for wire parsing.

use thiserror::Error;

/// Errors that can occur while reading engine messages or host field specs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtoError {
	/// A read ran past the end of the buffer.
	#[error("truncated message: need {needed} bytes at offset {offset}, have {len}")]
	Truncated {
		/// Bytes the read required.
		needed: usize,
		/// Offset the read started at.
		offset: usize,
		/// Total buffer length.
		len: usize,
	},

	/// A data type code outside the engine's enumeration.
	#[error("unknown data type code: {0}")]
	UnknownDataType(u32),

	/// A period code outside the engine's enumeration.
	#[error("unknown period code: {0}")]
	UnknownPeriod(u32),

	/// A simulation object type code outside the engine's enumeration.
	#[error("unknown object type code: {0}")]
	UnknownObjectType(u32),
}

/// Result type for wire operations.
pub type Result<T> = std::result::Result<T, ProtoError>;
