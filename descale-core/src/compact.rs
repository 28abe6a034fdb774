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

//! The variable length integer encoding.
//!
//! The two low bits of the first byte select the mode:
//!
//! - `0b00`: single byte, values below 2^6.
//! - `0b01`: two bytes, values below 2^14.
//! - `0b10`: four bytes, values below 2^30.
//! - `0b11`: the upper six bits hold the number of following bytes minus four,
//!   then the little endian magnitude in at least four bytes.

use crate::{ByteReader, ByteWriter, Error};
use sp_core::U256;

/// The four encoding modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactMode {
	SingleByte,
	TwoByte,
	FourByte,
	BigInt,
}

impl CompactMode {
	pub fn of(value: U256) -> Self {
		if value < U256::from(1u64 << 6) {
			CompactMode::SingleByte
		} else if value < U256::from(1u64 << 14) {
			CompactMode::TwoByte
		} else if value < U256::from(1u64 << 30) {
			CompactMode::FourByte
		} else {
			CompactMode::BigInt
		}
	}

	fn from_prefix(byte: u8) -> Self {
		match byte & 0b11 {
			0b00 => CompactMode::SingleByte,
			0b01 => CompactMode::TwoByte,
			0b10 => CompactMode::FourByte,
			_ => CompactMode::BigInt,
		}
	}
}

pub fn encode_compact(value: U256, out: &mut ByteWriter) {
	match CompactMode::of(value) {
		CompactMode::SingleByte => out.push((value.low_u32() as u8) << 2),
		CompactMode::TwoByte => out.append(&(((value.low_u32() as u16) << 2) | 0b01).to_le_bytes()),
		CompactMode::FourByte => out.append(&((value.low_u32() << 2) | 0b10).to_le_bytes()),
		CompactMode::BigInt => {
			let mut bytes = [0u8; 32];
			value.to_little_endian(&mut bytes);
			let len = std::cmp::max(4, 32 - bytes.iter().rev().take_while(|b| **b == 0).count());
			out.push((((len - 4) as u8) << 2) | 0b11);
			out.append(&bytes[..len]);
		}
	}
}

pub fn encode_compact_u64(value: u64, out: &mut ByteWriter) {
	encode_compact(U256::from(value), out)
}

/// Decode a compact integer of up to 256 bits.
pub fn decode_compact(input: &mut ByteReader) -> Result<U256, Error> {
	let prefix = input.read(1)?[0];
	let value = match CompactMode::from_prefix(prefix) {
		CompactMode::SingleByte => {
			input.confirm(1)?;
			U256::from(prefix >> 2)
		}
		CompactMode::TwoByte => {
			let bytes = input.read_and_confirm(2)?;
			U256::from(u16::from_le_bytes([bytes[0], bytes[1]]) >> 2)
		}
		CompactMode::FourByte => {
			let bytes = input.read_and_confirm(4)?;
			U256::from(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) >> 2)
		}
		CompactMode::BigInt => {
			let len = (prefix >> 2) as usize + 4;
			if len > 32 {
				return Err(Error::IntegerOverflow { value: format!("{}-byte compact", len), ty: crate::Primitive::U256 });
			}
			let bytes = input.read_and_confirm(1 + len)?;
			U256::from_little_endian(&bytes[1..])
		}
	};
	Ok(value)
}

/// Decode a compact length prefix.
pub fn decode_compact_len(input: &mut ByteReader) -> Result<usize, Error> {
	let len = decode_compact(input)?;
	if len > U256::from(u32::MAX) {
		return Err(Error::IntegerOverflow { value: len.to_string(), ty: crate::Primitive::U32 });
	}
	Ok(len.low_u64() as usize)
}

#[cfg(test)]
mod tests {
	use super::*;
	use codec::{Compact, Encode};

	fn encoded(value: u128) -> Vec<u8> {
		let mut out = ByteWriter::new();
		encode_compact(U256::from(value), &mut out);
		out.into_bytes()
	}

	#[test]
	fn mode_boundaries() {
		let cases: &[(u128, CompactMode, usize)] = &[
			(0, CompactMode::SingleByte, 1),
			(63, CompactMode::SingleByte, 1),
			(64, CompactMode::TwoByte, 2),
			(16383, CompactMode::TwoByte, 2),
			(16384, CompactMode::FourByte, 4),
			((1 << 30) - 1, CompactMode::FourByte, 4),
			(1 << 30, CompactMode::BigInt, 5),
		];
		for (value, mode, len) in cases {
			let bytes = encoded(*value);
			assert_eq!(CompactMode::of(U256::from(*value)), *mode, "mode of {}", value);
			assert_eq!(CompactMode::from_prefix(bytes[0]), *mode, "prefix of {}", value);
			assert_eq!(bytes.len(), *len, "length of {}", value);
			assert_eq!(bytes, Compact(*value).encode(), "bytes of {}", value);

			let mut input = ByteReader::new(&bytes);
			assert_eq!(decode_compact(&mut input).unwrap(), U256::from(*value));
			assert!(input.is_empty());
		}
	}

	#[test]
	fn big_values_use_minimal_bytes() {
		assert_eq!(encoded(u64::MAX as u128), Compact(u64::MAX).encode());
		assert_eq!(encoded(u128::MAX), Compact(u128::MAX).encode());
		assert_eq!(encoded(u128::MAX).len(), 17);

		let mut out = ByteWriter::new();
		encode_compact(U256::MAX, &mut out);
		let bytes = out.into_bytes();
		assert_eq!(bytes[0], (28 << 2) | 0b11);
		assert_eq!(decode_compact(&mut ByteReader::new(&bytes)).unwrap(), U256::MAX);
	}

	#[test]
	fn truncated_input_is_out_of_bounds() {
		let bytes = [0b01u8];
		assert!(matches!(decode_compact(&mut ByteReader::new(&bytes)), Err(Error::OutOfBounds { needed: 2, .. })));
		assert!(matches!(decode_compact(&mut ByteReader::new(&[])), Err(Error::OutOfBounds { needed: 1, .. })));
	}
}
