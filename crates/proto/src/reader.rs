//! Little-endian cursor over engine message bytes.

use crate::error::{ProtoError, Result};

/// Bounds-checked little-endian reader.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
	buf: &'a [u8],
	pos: usize,
}

impl<'a> Reader<'a> {
	/// Creates a reader positioned at the start of `buf`.
	pub const fn new(buf: &'a [u8]) -> Self {
		Self { buf, pos: 0 }
	}

	/// Creates a reader positioned at `pos`.
	pub const fn at(buf: &'a [u8], pos: usize) -> Self {
		Self { buf, pos }
	}

	/// Current offset from the start of the buffer.
	pub const fn position(&self) -> usize {
		self.pos
	}

	/// Returns the unread tail without advancing.
	pub fn rest(&self) -> &'a [u8] {
		self.buf.get(self.pos..).unwrap_or_default()
	}

	/// Reads a little-endian `u32`.
	pub fn u32(&mut self) -> Result<u32> {
		Ok(u32::from_le_bytes(self.array()?))
	}

	/// Reads a little-endian `i32`.
	pub fn i32(&mut self) -> Result<i32> {
		Ok(i32::from_le_bytes(self.array()?))
	}

	/// Reads a little-endian `i64`.
	pub fn i64(&mut self) -> Result<i64> {
		Ok(i64::from_le_bytes(self.array()?))
	}

	/// Reads a little-endian `f32`.
	pub fn f32(&mut self) -> Result<f32> {
		Ok(f32::from_le_bytes(self.array()?))
	}

	/// Reads a little-endian `f64`.
	pub fn f64(&mut self) -> Result<f64> {
		Ok(f64::from_le_bytes(self.array()?))
	}

	/// Reads a NUL-padded fixed-width character array.
	pub fn fixed_str(&mut self, width: usize) -> Result<String> {
		self.take(width).map(latin1_until_nul)
	}

	fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let bytes = self.take(N)?;
		let mut out = [0u8; N];
		out.copy_from_slice(bytes);
		Ok(out)
	}

	fn take(&mut self, n: usize) -> Result<&'a [u8]> {
		let end = self.pos.checked_add(n).filter(|&end| end <= self.buf.len()).ok_or(ProtoError::Truncated {
			needed: n,
			offset: self.pos,
			len: self.buf.len(),
		})?;
		let bytes = &self.buf[self.pos..end];
		self.pos = end;
		Ok(bytes)
	}
}

/// Decodes engine text up to the first NUL.
///
/// The engine speaks single-byte ANSI text; every byte maps to the code point
/// of the same value so no input is rejected.
pub fn latin1_until_nul(bytes: &[u8]) -> String {
	let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
	bytes[..end].iter().map(|&b| char::from(b)).collect()
}
