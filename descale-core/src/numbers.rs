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

//! Fixed width integers, up to 256 bits, to and from [`Value`]s.
//!
//! Everything goes through a 256 bit two's complement intermediate. Integers
//! wider than 64 bits are represented as decimal strings.

use crate::{Error, Primitive, Value};
use sp_core::U256;

fn width(p: Primitive) -> Result<usize, Error> {
	p.byte_width().ok_or_else(|| Error::ShapeMismatch { expected: "fixed width integer".into(), got: p.to_string() })
}

/// `2^bit`
fn pow2(bit: usize) -> U256 {
	let mut bytes = [0u8; 32];
	bytes[bit / 8] = 1 << (bit % 8);
	U256::from_little_endian(&bytes)
}

fn parse_decimal(s: &str) -> Result<U256, Error> {
	U256::from_dec_str(s.trim()).map_err(|_| Error::InvalidNumber(s.to_string()))
}

/// Read an unsigned integer of type `p` out of a value, checking that it fits.
pub(crate) fn unsigned(p: Primitive, value: &Value) -> Result<U256, Error> {
	let n = match value {
		Value::UInt(n) => U256::from(*n),
		Value::Int(n) if *n >= 0 => U256::from(*n as u64),
		Value::Str(s) => parse_decimal(s)?,
		v => return Err(Error::mismatch(p.to_string(), v)),
	};
	let width = width(p)?;
	let mut bytes = [0u8; 32];
	n.to_little_endian(&mut bytes);
	if bytes[width..].iter().any(|b| *b != 0) {
		return Err(Error::IntegerOverflow { value: n.to_string(), ty: p });
	}
	Ok(n)
}

/// Read a signed integer of type `p` out of a value, returning its 256 bit two's complement.
pub(crate) fn signed(p: Primitive, value: &Value) -> Result<U256, Error> {
	let (negative, magnitude) = match value {
		Value::Int(n) => (*n < 0, U256::from(n.unsigned_abs())),
		Value::UInt(n) => (false, U256::from(*n)),
		Value::Str(s) => match s.trim().strip_prefix('-') {
			Some(rest) => (true, parse_decimal(rest)?),
			None => (false, parse_decimal(s)?),
		},
		v => return Err(Error::mismatch(p.to_string(), v)),
	};
	let limit = pow2(width(p)? * 8 - 1);
	let fits = if negative { magnitude <= limit } else { magnitude < limit };
	if !fits {
		let sign = if negative { "-" } else { "" };
		return Err(Error::IntegerOverflow { value: format!("{}{}", sign, magnitude), ty: p });
	}
	if negative && !magnitude.is_zero() {
		Ok((!magnitude).overflowing_add(U256::one()).0)
	} else {
		Ok(magnitude)
	}
}

/// The little endian bytes of an integer value of type `p`.
pub(crate) fn to_le_bytes(p: Primitive, value: &Value) -> Result<Vec<u8>, Error> {
	let n = if p.is_unsigned() {
		unsigned(p, value)?
	} else if p.is_signed() {
		signed(p, value)?
	} else {
		return Err(Error::ShapeMismatch { expected: "integer type".into(), got: p.to_string() });
	};
	let mut bytes = [0u8; 32];
	n.to_little_endian(&mut bytes);
	Ok(bytes[..width(p)?].to_vec())
}

/// Turn little endian bytes of an integer of type `p` back into a value.
pub(crate) fn from_le_bytes(p: Primitive, bytes: &[u8]) -> Value {
	let negative = p.is_signed() && bytes.last().map_or(false, |b| b & 0x80 != 0);
	let fill = if negative { 0xff } else { 0x00 };

	if bytes.len() <= 8 {
		let mut buf = [fill; 8];
		buf[..bytes.len()].copy_from_slice(bytes);
		return if p.is_signed() { Value::Int(i64::from_le_bytes(buf)) } else { Value::UInt(u64::from_le_bytes(buf)) };
	}

	let mut buf = [fill; 32];
	buf[..bytes.len()].copy_from_slice(bytes);
	let n = U256::from_little_endian(&buf);
	if negative {
		let magnitude = (!n).overflowing_add(U256::one()).0;
		Value::Str(format!("-{}", magnitude))
	} else {
		Value::Str(n.to_string())
	}
}

/// A decoded unsigned integer as a value: `UInt` if it fits into 64 bits, a decimal string otherwise.
pub(crate) fn unsigned_value(p: Primitive, n: U256) -> Value {
	if p.byte_width().map_or(false, |w| w <= 8) {
		Value::UInt(n.low_u64())
	} else {
		Value::Str(n.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use codec::Encode;

	fn bytes(p: Primitive, value: Value) -> Vec<u8> {
		to_le_bytes(p, &value).unwrap()
	}

	#[test]
	fn matches_native_encoding() {
		assert_eq!(bytes(Primitive::U32, Value::UInt(7)), 7u32.encode());
		assert_eq!(bytes(Primitive::I16, Value::Int(-2)), (-2i16).encode());
		assert_eq!(bytes(Primitive::U128, Value::Str(u128::MAX.to_string())), u128::MAX.encode());
		assert_eq!(bytes(Primitive::I128, Value::Str(i128::MIN.to_string())), i128::MIN.encode());
		assert_eq!(bytes(Primitive::I64, Value::Int(i64::MIN)), i64::MIN.encode());
	}

	#[test]
	fn wide_values_are_decimal_strings() {
		let v = from_le_bytes(Primitive::U128, &u128::MAX.encode());
		assert_eq!(v, Value::Str(u128::MAX.to_string()));
		let v = from_le_bytes(Primitive::I128, &(-5i128).encode());
		assert_eq!(v, Value::Str("-5".into()));
		let v = from_le_bytes(Primitive::I8, &[0xff]);
		assert_eq!(v, Value::Int(-1));

		let minus_one = bytes(Primitive::I256, Value::Int(-1));
		assert_eq!(minus_one, vec![0xff; 32]);
		assert_eq!(from_le_bytes(Primitive::I256, &minus_one), Value::Str("-1".into()));
	}

	#[test]
	fn range_checks() {
		assert!(matches!(to_le_bytes(Primitive::U8, &Value::UInt(256)), Err(Error::IntegerOverflow { .. })));
		assert!(matches!(to_le_bytes(Primitive::U8, &Value::Int(-1)), Err(Error::ShapeMismatch { .. })));
		assert!(matches!(to_le_bytes(Primitive::I8, &Value::Int(128)), Err(Error::IntegerOverflow { .. })));
		assert_eq!(bytes(Primitive::I8, Value::Int(-128)), vec![0x80]);
		assert!(matches!(to_le_bytes(Primitive::U64, &Value::Str("12a".into())), Err(Error::InvalidNumber(_))));
	}
}
