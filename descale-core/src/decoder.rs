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

//! Reconstruct a [`Value`] from SCALE bytes by walking the type graph.
//!
//! Leftover input after a value is not an error here; use [`decode_exact`]
//! when the whole input is expected to be consumed.

use crate::{
	compact::{decode_compact, decode_compact_len},
	numbers, BitOrder, BitSequenceNode, ByteReader, Catalog, EnumNode, Error, IndexWidth, Node, Primitive, SetNode,
	TypeRef, Value, MAX_DEPTH, MAX_ZERO_SIZED_ITEMS,
};
use bitvec::{
	order::{Lsb0, Msb0},
	vec::BitVec,
};
use codec::Decode;

/// Decode a value of type `ty` from the front of `input`.
pub fn decode(catalog: &Catalog, ty: &TypeRef, input: &mut ByteReader) -> Result<Value, Error> {
	let node = catalog.lookup(ty)?;
	log::trace!("decoding {} at offset {}", ty, input.position());
	decode_node(catalog, node, input)
}

/// Decode a value of type `ty` from `bytes`, returning it with the number of bytes it took up.
pub fn decode_bytes(catalog: &Catalog, ty: &TypeRef, bytes: &[u8]) -> Result<(Value, usize), Error> {
	let mut input = ByteReader::new(bytes);
	let value = decode(catalog, ty, &mut input)?;
	Ok((value, input.position()))
}

/// Decode a value of type `ty` that must take up all of `bytes`.
pub fn decode_exact(catalog: &Catalog, ty: &TypeRef, bytes: &[u8]) -> Result<Value, Error> {
	let mut input = ByteReader::new(bytes);
	let value = decode(catalog, ty, &mut input)?;
	if !input.is_empty() {
		return Err(Error::TrailingBytes(input.remaining()));
	}
	Ok(value)
}

/// Decode a value shaped like `node`, resolving references through `catalog`.
pub fn decode_node(catalog: &Catalog, node: &Node, input: &mut ByteReader) -> Result<Value, Error> {
	decode_at(catalog, node, input, 0)
}

fn decode_at(catalog: &Catalog, node: &Node, input: &mut ByteReader, depth: usize) -> Result<Value, Error> {
	if depth > MAX_DEPTH {
		return Err(Error::RecursionLimit(MAX_DEPTH));
	}
	let depth = depth + 1;
	match catalog.resolve(node)? {
		Node::Primitive(p) => decode_primitive(*p, input),
		Node::Null => Ok(Value::Null),
		Node::Struct(fields) => {
			let mut map = std::collections::BTreeMap::new();
			for field in fields {
				let value = decode_at(catalog, &field.ty, input, depth)?;
				map.insert(field.name.clone(), value);
			}
			Ok(Value::Map(map))
		}
		Node::Enum(e) => decode_enum(catalog, e, input, depth),
		Node::EnumValues(cases) => {
			let index = input.read(1)?[0];
			let (_, name) =
				cases.iter().find(|(i, _)| *i == index).ok_or(Error::InvalidEnumCase { index: index as u32 })?;
			input.confirm(1)?;
			Ok(Value::Str(name.clone()))
		}
		Node::Vector(inner) => {
			let len = decode_compact_len(input)?;
			log::trace!("decoding vector of {} items", len);
			decode_items(catalog, inner, len, input, depth)
		}
		Node::FixedArray(inner, len) => {
			let len = usize::try_from(*len).unwrap_or(usize::MAX);
			decode_items(catalog, inner, len, input, depth)
		}
		Node::Tuple(types) => {
			let items =
				types.iter().map(|ty| decode_at(catalog, ty, input, depth)).collect::<Result<Vec<_>, _>>()?;
			Ok(Value::Seq(items))
		}
		Node::Option(inner) => decode_option(catalog, inner, input, depth),
		Node::Compact(inner) => decode_compact_node(catalog, inner, input, depth),
		Node::Set(set) => decode_set(set, input),
		Node::BitSequence(seq) => decode_bit_sequence(seq, input),
		Node::Alias(ty) | Node::Proxy(ty) => Err(Error::UnresolvedProxy(ty.clone())),
	}
}

/// Decode `len` items of `inner`. Lengths come from the input, so they are
/// checked against what the input could possibly hold before anything is
/// allocated.
fn decode_items(
	catalog: &Catalog,
	inner: &Node,
	len: usize,
	input: &mut ByteReader,
	depth: usize,
) -> Result<Value, Error> {
	let item_len = catalog.min_encoded_len(inner, depth)?;
	if item_len == 0 {
		if len > MAX_ZERO_SIZED_ITEMS {
			return Err(Error::TooManyItems { len, limit: MAX_ZERO_SIZED_ITEMS });
		}
	} else if len.saturating_mul(item_len) > input.remaining() {
		return Err(Error::OutOfBounds { needed: len.saturating_mul(item_len), remaining: input.remaining() });
	}
	let mut items = Vec::with_capacity(len);
	for _ in 0..len {
		items.push(decode_at(catalog, inner, input, depth)?);
	}
	Ok(Value::Seq(items))
}

fn decode_primitive(p: Primitive, input: &mut ByteReader) -> Result<Value, Error> {
	match p {
		Primitive::Bool => match input.read(1)?[0] {
			b @ (0 | 1) => {
				input.confirm(1)?;
				Ok(Value::Bool(b == 1))
			}
			b => Err(Error::InvalidBool(b)),
		},
		Primitive::Str => {
			let len = decode_compact_len(input)?;
			let bytes = input.read_and_confirm(len)?;
			let s = std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)?;
			Ok(Value::Str(s.to_string()))
		}
		Primitive::Char => {
			let n = u32::from_le_bytes(input.read_array::<4>()?);
			let c = char::from_u32(n).ok_or(Error::InvalidChar(n))?;
			Ok(Value::Str(c.to_string()))
		}
		p => {
			let width = p.byte_width().unwrap_or_default();
			let bytes = input.read_and_confirm(width)?;
			Ok(numbers::from_le_bytes(p, bytes))
		}
	}
}

fn read_index(width: IndexWidth, input: &mut ByteReader) -> Result<u32, Error> {
	let bytes = input.read(width.bytes())?;
	let index = match width {
		IndexWidth::U8 => bytes[0] as u32,
		IndexWidth::U16 => u16::from_le_bytes([bytes[0], bytes[1]]) as u32,
		IndexWidth::U32 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
	};
	Ok(index)
}

fn decode_enum(catalog: &Catalog, node: &EnumNode, input: &mut ByteReader, depth: usize) -> Result<Value, Error> {
	let index = read_index(node.width, input)?;
	let variant = node.by_index(index).ok_or(Error::InvalidEnumCase { index })?;
	input.confirm(node.width.bytes())?;
	log::trace!("decoding enum case {}", variant.name);
	let payload = decode_at(catalog, &variant.payload, input, depth)?;
	Ok(Value::variant(variant.name.clone(), payload))
}

/// `None` is [`Value::Null`]. `Some(x)` is just `x`, unless `x` could itself be
/// null (`Option<Option<T>>`, `Option<()>`); then it is wrapped as `[x]`.
fn decode_option(catalog: &Catalog, inner: &Node, input: &mut ByteReader, depth: usize) -> Result<Value, Error> {
	let tag = input.read(1)?[0];
	if let Node::Primitive(Primitive::Bool) = catalog.resolve(inner)? {
		let value = match tag {
			0 => Value::Null,
			1 => Value::Bool(false),
			2 => Value::Bool(true),
			b => return Err(Error::InvalidPrefix(b)),
		};
		input.confirm(1)?;
		return Ok(value);
	}
	match tag {
		0 => {
			input.confirm(1)?;
			Ok(Value::Null)
		}
		1 => {
			input.confirm(1)?;
			let value = decode_at(catalog, inner, input, depth)?;
			if catalog.nullable(inner)? {
				Ok(Value::Seq(vec![value]))
			} else {
				Ok(value)
			}
		}
		b => Err(Error::InvalidPrefix(b)),
	}
}

fn decode_compact_node(catalog: &Catalog, inner: &Node, input: &mut ByteReader, depth: usize) -> Result<Value, Error> {
	if depth > MAX_DEPTH {
		return Err(Error::RecursionLimit(MAX_DEPTH));
	}
	match catalog.resolve(inner)? {
		Node::Primitive(p) if p.is_unsigned() => {
			let n = decode_compact(input)?;
			let width = p.byte_width().unwrap_or(32);
			let mut bytes = [0u8; 32];
			n.to_little_endian(&mut bytes);
			if bytes[width..].iter().any(|b| *b != 0) {
				return Err(Error::IntegerOverflow { value: n.to_string(), ty: *p });
			}
			Ok(numbers::unsigned_value(*p, n))
		}
		Node::Struct(fields) if fields.len() == 1 => {
			let value = decode_compact_node(catalog, &fields[0].ty, input, depth + 1)?;
			Ok(Value::map([(fields[0].name.clone(), value)]))
		}
		Node::Tuple(types) if types.len() == 1 => {
			let value = decode_compact_node(catalog, &types[0], input, depth + 1)?;
			Ok(Value::Seq(vec![value]))
		}
		other => Err(Error::ShapeMismatch { expected: "unsigned integer to compact".into(), got: other.kind().into() }),
	}
}

fn decode_set(set: &SetNode, input: &mut ByteReader) -> Result<Value, Error> {
	if !matches!(set.bits, 8 | 16 | 32 | 64) {
		return Err(Error::InvalidBitMapping(format!("sets of {} bits are not supported", set.bits)));
	}
	let width = (set.bits / 8) as usize;
	let mut buf = [0u8; 8];
	buf[..width].copy_from_slice(input.read_and_confirm(width)?);
	let bits = u64::from_le_bytes(buf);

	let mut names = Vec::new();
	let mut covered = 0u64;
	for (name, flag) in &set.flags {
		if *flag != 0 && bits & flag == *flag {
			names.push(Value::Str(name.clone()));
			covered |= flag;
		}
	}
	if bits & !covered != 0 {
		return Err(Error::InvalidBitMapping(format!("bits {:#x} have no flag name", bits & !covered)));
	}
	Ok(Value::Seq(names))
}

fn decode_bit_sequence(seq: &BitSequenceNode, input: &mut ByteReader) -> Result<Value, Error> {
	macro_rules! decode_bits {
		($store:ty, $order:ty) => {{
			let bits = BitVec::<$store, $order>::decode(input)?;
			Ok(Value::Seq(bits.iter().by_vals().map(Value::Bool).collect()))
		}};
	}
	match (seq.store, seq.order) {
		(Primitive::U8, BitOrder::Lsb0) => decode_bits!(u8, Lsb0),
		(Primitive::U8, BitOrder::Msb0) => decode_bits!(u8, Msb0),
		(Primitive::U16, BitOrder::Lsb0) => decode_bits!(u16, Lsb0),
		(Primitive::U16, BitOrder::Msb0) => decode_bits!(u16, Msb0),
		(Primitive::U32, BitOrder::Lsb0) => decode_bits!(u32, Lsb0),
		(Primitive::U32, BitOrder::Msb0) => decode_bits!(u32, Msb0),
		(Primitive::U64, BitOrder::Lsb0) => decode_bits!(u64, Lsb0),
		(Primitive::U64, BitOrder::Msb0) => decode_bits!(u64, Msb0),
		(store, _) => Err(Error::ShapeMismatch { expected: "u8, u16, u32 or u64 bit store".into(), got: store.to_string() }),
	}
}
