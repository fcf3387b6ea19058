//! Engine result codes.

use std::fmt;

/// A 32-bit result code returned by every engine call.
///
/// The top two bits carry the severity: `00` success, `01` informational,
/// `10` warning, `11` error. Only error severity is fatal to a connection;
/// the poll call reports "nothing ready" with a warning-severity code.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(pub u32);

impl Status {
	/// Plain success.
	pub const OK: Self = Self(0);
	/// Generic failure; also what the poll call returns when no message is ready.
	pub const E_FAIL: Self = Self(0x8000_4005);
	/// The pipe to the engine broke.
	pub const PIPE_BROKEN: Self = Self(0xC000_014B);
	/// The engine reset the connection.
	pub const CONNECTION_RESET: Self = Self(0xC000_020D);
	/// The engine side went away.
	pub const REMOTE_DISCONNECT: Self = Self(0xC000_013C);

	/// Reinterprets a signed result code.
	pub const fn from_hresult(hr: i32) -> Self {
		Self(hr as u32)
	}

	/// Returns true when the sign bit is clear.
	pub const fn is_success(self) -> bool {
		self.0 & 0x8000_0000 == 0
	}

	/// Returns true for error-severity codes.
	pub const fn is_fatal(self) -> bool {
		self.0 >> 30 == 0b11
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{:08X}", self.0)
	}
}

impl fmt::Debug for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Status({self})")
	}
}
