// Copyright 2019-2021 Parity Technologies (UK) Ltd.
// This file is part of descale.
//
// descale is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// descale is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with descale.  If not, see <http://www.gnu.org/licenses/>.

//! Bounds checked reading and writing of raw bytes.
//!
//! Reading is split in two: [`ByteReader::read`] looks at bytes without moving,
//! and [`ByteReader::confirm`] commits to having consumed them. Decoders read the
//! smallest prefix that decides the shape of what follows, then confirm.

use crate::Error;

/// A cursor over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
	data: &'a [u8],
	cursor: usize,
}

impl<'a> ByteReader<'a> {
	pub fn new(data: &'a [u8]) -> Self {
		Self { data, cursor: 0 }
	}

	/// Peek at the next `n` bytes without advancing.
	pub fn read(&self, n: usize) -> Result<&'a [u8], Error> {
		let remaining = self.remaining();
		if n > remaining {
			return Err(Error::OutOfBounds { needed: n, remaining });
		}
		Ok(&self.data[self.cursor..self.cursor + n])
	}

	/// Advance past `n` bytes.
	pub fn confirm(&mut self, n: usize) -> Result<(), Error> {
		let remaining = self.remaining();
		if n > remaining {
			return Err(Error::OutOfBounds { needed: n, remaining });
		}
		self.cursor += n;
		Ok(())
	}

	pub fn read_and_confirm(&mut self, n: usize) -> Result<&'a [u8], Error> {
		let bytes = Self::read(self, n)?;
		self.cursor += n;
		Ok(bytes)
	}

	/// Read exactly `N` bytes into an array.
	pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
		let mut out = [0u8; N];
		out.copy_from_slice(self.read_and_confirm(N)?);
		Ok(out)
	}

	pub fn remaining(&self) -> usize {
		self.data.len() - self.cursor
	}

	pub fn position(&self) -> usize {
		self.cursor
	}

	pub fn is_empty(&self) -> bool {
		self.remaining() == 0
	}
}

impl<'a> codec::Input for ByteReader<'a> {
	fn remaining_len(&mut self) -> Result<Option<usize>, codec::Error> {
		Ok(Some(self.remaining()))
	}

	fn read(&mut self, into: &mut [u8]) -> Result<(), codec::Error> {
		let bytes = self.read_and_confirm(into.len()).map_err(|_| codec::Error::from("Not enough data to fill buffer"))?;
		into.copy_from_slice(bytes);
		Ok(())
	}
}

/// An append only byte buffer that encoders write into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteWriter {
	bytes: Vec<u8>,
}

impl ByteWriter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn append(&mut self, bytes: &[u8]) {
		self.bytes.extend_from_slice(bytes);
	}

	pub fn push(&mut self, byte: u8) {
		self.bytes.push(byte);
	}

	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	pub fn into_bytes(self) -> Vec<u8> {
		self.bytes
	}
}

impl codec::Output for ByteWriter {
	fn write(&mut self, bytes: &[u8]) {
		self.append(bytes)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use codec::{Decode, Encode};

	#[test]
	fn read_does_not_advance() {
		let data = [1u8, 2, 3, 4];
		let mut reader = ByteReader::new(&data);
		assert_eq!(reader.read(2).unwrap(), &[1, 2]);
		assert_eq!(reader.read(2).unwrap(), &[1, 2]);
		reader.confirm(1).unwrap();
		assert_eq!(reader.read_and_confirm(2).unwrap(), &[2, 3]);
		assert_eq!(reader.position(), 3);
		assert_eq!(reader.remaining(), 1);
	}

	#[test]
	fn reading_past_the_end_fails() {
		let data = [1u8, 2];
		let mut reader = ByteReader::new(&data);
		reader.confirm(1).unwrap();
		assert!(matches!(reader.read(2), Err(Error::OutOfBounds { needed: 2, remaining: 1 })));
		assert!(matches!(reader.confirm(3), Err(Error::OutOfBounds { needed: 3, remaining: 1 })));
		// Failed reads leave the position alone.
		assert_eq!(reader.position(), 1);
	}

	#[test]
	fn codec_traits_work_on_cursors() {
		let mut writer = ByteWriter::new();
		(7u32, String::from("hi")).encode_to(&mut writer);
		assert_eq!(writer.as_bytes(), &[7, 0, 0, 0, 8, b'h', b'i']);

		let bytes = writer.into_bytes();
		let mut reader = ByteReader::new(&bytes);
		let decoded = <(u32, String)>::decode(&mut reader).unwrap();
		assert_eq!(decoded, (7, "hi".to_string()));
		assert!(reader.is_empty());
	}
}
