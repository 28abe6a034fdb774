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

//! Turn a [`Value`] into SCALE bytes by walking the type graph.
//!
//! Errors leave whatever was already appended in the writer; callers should
//! throw the writer away if encoding fails.

use crate::{
	compact::{encode_compact, encode_compact_u64},
	numbers, BitOrder, BitSequenceNode, ByteWriter, Catalog, EnumNode, Error, Field, IndexWidth, Node, Primitive,
	SetNode, TypeRef, Value, MAX_DEPTH,
};
use bitvec::{
	order::{Lsb0, Msb0},
	vec::BitVec,
};
use codec::Encode;
use std::collections::BTreeMap;

/// Encode `value` as the type registered under `ty`.
pub fn encode(catalog: &Catalog, ty: &TypeRef, value: &Value) -> Result<Vec<u8>, Error> {
	let mut out = ByteWriter::new();
	encode_to(catalog, ty, value, &mut out)?;
	Ok(out.into_bytes())
}

/// Encode `value` as the type registered under `ty`, appending to `out`.
pub fn encode_to(catalog: &Catalog, ty: &TypeRef, value: &Value, out: &mut ByteWriter) -> Result<(), Error> {
	let node = catalog.lookup(ty)?;
	log::trace!("encoding {} as {}", value, ty);
	encode_node(catalog, node, value, out)
}

/// Encode `value` according to `node`, resolving references through `catalog`.
pub fn encode_node(catalog: &Catalog, node: &Node, value: &Value, out: &mut ByteWriter) -> Result<(), Error> {
	encode_at(catalog, node, value, out, 0)
}

fn encode_at(catalog: &Catalog, node: &Node, value: &Value, out: &mut ByteWriter, depth: usize) -> Result<(), Error> {
	if depth > MAX_DEPTH {
		return Err(Error::RecursionLimit(MAX_DEPTH));
	}
	let depth = depth + 1;
	match catalog.resolve(node)? {
		Node::Primitive(p) => encode_primitive(*p, value, out),
		Node::Null => match value {
			Value::Null => Ok(()),
			Value::Seq(items) if items.is_empty() => Ok(()),
			v => Err(Error::mismatch("null", v)),
		},
		Node::Struct(fields) => encode_struct(catalog, fields, value, out, depth),
		Node::Enum(e) => encode_enum(catalog, e, value, out, depth),
		Node::EnumValues(cases) => {
			let name = value.as_str().ok_or_else(|| Error::mismatch("enum case name", value))?;
			let (index, _) = cases
				.iter()
				.find(|(_, n)| n == name)
				.or_else(|| cases.iter().find(|(_, n)| n.eq_ignore_ascii_case(name)))
				.ok_or_else(|| unknown_case(name))?;
			out.push(*index);
			Ok(())
		}
		Node::Vector(inner) => {
			if let Some(bytes) = hex_bytes(catalog, inner, value)? {
				encode_compact_u64(bytes.len() as u64, out);
				out.append(&bytes);
				return Ok(());
			}
			let items = value.as_seq().ok_or_else(|| Error::mismatch("sequence", value))?;
			encode_compact_u64(items.len() as u64, out);
			items.iter().try_for_each(|item| encode_at(catalog, inner, item, out, depth))
		}
		Node::FixedArray(inner, len) => {
			if let Some(bytes) = hex_bytes(catalog, inner, value)? {
				check_len(*len, bytes.len())?;
				out.append(&bytes);
				return Ok(());
			}
			let items = value.as_seq().ok_or_else(|| Error::mismatch("sequence", value))?;
			check_len(*len, items.len())?;
			items.iter().try_for_each(|item| encode_at(catalog, inner, item, out, depth))
		}
		Node::Tuple(types) => match (types.len(), value) {
			(0, Value::Null) => Ok(()),
			(_, Value::Seq(items)) if items.len() == types.len() => {
				types.iter().zip(items).try_for_each(|(ty, item)| encode_at(catalog, ty, item, out, depth))
			}
			// single element tuples are often written without the brackets
			(1, v) => encode_at(catalog, &types[0], v, out, depth),
			(n, v) => Err(Error::mismatch(format!("tuple of {} elements", n), v)),
		},
		Node::Option(inner) => encode_option(catalog, inner, value, out, depth),
		Node::Compact(inner) => encode_compact_node(catalog, inner, value, out, depth),
		Node::Set(set) => encode_set(set, value, out),
		Node::BitSequence(seq) => encode_bit_sequence(seq, value, out),
		Node::Alias(ty) | Node::Proxy(ty) => Err(Error::UnresolvedProxy(ty.clone())),
	}
}

fn encode_primitive(p: Primitive, value: &Value, out: &mut ByteWriter) -> Result<(), Error> {
	match p {
		Primitive::Bool => match value {
			Value::Bool(b) => {
				out.push(*b as u8);
				Ok(())
			}
			v => Err(Error::mismatch("bool", v)),
		},
		Primitive::Str => match value {
			Value::Str(s) => {
				s.as_str().encode_to(out);
				Ok(())
			}
			v => Err(Error::mismatch("string", v)),
		},
		Primitive::Char => {
			let s = value.as_str().ok_or_else(|| Error::mismatch("char", value))?;
			let mut chars = s.chars();
			match (chars.next(), chars.next()) {
				(Some(c), None) => {
					out.append(&(c as u32).to_le_bytes());
					Ok(())
				}
				_ => Err(Error::mismatch("single character", value)),
			}
		}
		p => {
			let bytes = numbers::to_le_bytes(p, value)?;
			out.append(&bytes);
			Ok(())
		}
	}
}

fn encode_struct(
	catalog: &Catalog,
	fields: &[Field],
	value: &Value,
	out: &mut ByteWriter,
	depth: usize,
) -> Result<(), Error> {
	match value {
		Value::Map(map) => {
			for field in fields {
				let item = struct_field(map, &field.name).ok_or_else(|| Error::ShapeMismatch {
					expected: format!("a value for field `{}`", field.name),
					got: "map without it".into(),
				})?;
				encode_at(catalog, &field.ty, item, out, depth)?;
			}
			Ok(())
		}
		Value::Seq(items) if items.len() == fields.len() => {
			fields.iter().zip(items).try_for_each(|(field, item)| encode_at(catalog, &field.ty, item, out, depth))
		}
		Value::Null if fields.is_empty() => Ok(()),
		v => Err(Error::mismatch(format!("struct with {} fields", fields.len()), v)),
	}
}

/// Find a struct field by name. Casing and underscores are not significant, so
/// `free_balance`, `freeBalance` and `FreeBalance` all match.
fn struct_field<'a>(map: &'a BTreeMap<String, Value>, name: &str) -> Option<&'a Value> {
	if let Some(v) = map.get(name) {
		return Some(v);
	}
	let wanted = normalize(name);
	map.iter().find(|(k, _)| normalize(k) == wanted).map(|(_, v)| v)
}

fn normalize(name: &str) -> String {
	name.chars().filter(|c| *c != '_').flat_map(char::to_lowercase).collect()
}

fn encode_enum(catalog: &Catalog, node: &EnumNode, value: &Value, out: &mut ByteWriter, depth: usize) -> Result<(), Error> {
	let null = Value::Null;
	let (name, payload) = match value {
		Value::Str(name) => (name.as_str(), &null),
		Value::Map(map) if map.len() == 1 => {
			let (name, payload) = map.iter().next().expect("map has one entry; qed");
			(name.as_str(), payload)
		}
		Value::Seq(items) => match items.as_slice() {
			[Value::Str(name)] => (name.as_str(), &null),
			[Value::Str(name), payload] => (name.as_str(), payload),
			_ => return Err(Error::mismatch("enum case", value)),
		},
		v => return Err(Error::mismatch("enum case", v)),
	};
	let variant = node.by_name(name).ok_or_else(|| unknown_case(name))?;
	write_index(node.width, variant.index, out)?;
	encode_at(catalog, &variant.payload, payload, out, depth)
}

fn write_index(width: IndexWidth, index: u32, out: &mut ByteWriter) -> Result<(), Error> {
	let overflow = || {
		let ty = if width == IndexWidth::U8 { Primitive::U8 } else { Primitive::U16 };
		Error::IntegerOverflow { value: index.to_string(), ty }
	};
	match width {
		IndexWidth::U8 => out.push(u8::try_from(index).map_err(|_| overflow())?),
		IndexWidth::U16 => out.append(&u16::try_from(index).map_err(|_| overflow())?.to_le_bytes()),
		IndexWidth::U32 => out.append(&index.to_le_bytes()),
	}
	Ok(())
}

/// The inverse of the decoder's option shapes: `Some(x)` for an `x` that can be
/// null has to be given as `[x]`.
fn encode_option(catalog: &Catalog, inner: &Node, value: &Value, out: &mut ByteWriter, depth: usize) -> Result<(), Error> {
	if let Node::Primitive(Primitive::Bool) = catalog.resolve(inner)? {
		// `Option<bool>` packs into a single byte
		let byte = match value {
			Value::Null => 0,
			Value::Bool(false) => 1,
			Value::Bool(true) => 2,
			v => return Err(Error::mismatch("optional bool", v)),
		};
		out.push(byte);
		return Ok(());
	}
	if let Value::Null = value {
		out.push(0);
		return Ok(());
	}
	let some = if catalog.nullable(inner)? {
		match value {
			Value::Seq(items) if items.len() == 1 => &items[0],
			v => return Err(Error::mismatch("null or a one element sequence", v)),
		}
	} else {
		value
	};
	out.push(1);
	encode_at(catalog, inner, some, out, depth)
}

fn encode_compact_node(
	catalog: &Catalog,
	inner: &Node,
	value: &Value,
	out: &mut ByteWriter,
	depth: usize,
) -> Result<(), Error> {
	if depth > MAX_DEPTH {
		return Err(Error::RecursionLimit(MAX_DEPTH));
	}
	match catalog.resolve(inner)? {
		Node::Primitive(p) if p.is_unsigned() => {
			let n = numbers::unsigned(*p, value)?;
			encode_compact(n, out);
			Ok(())
		}
		// `Compact<Perbill>` and friends: a wrapper around a single integer
		Node::Struct(fields) if fields.len() == 1 => {
			let field = &fields[0];
			let item = match value {
				Value::Map(map) => struct_field(map, &field.name).unwrap_or(value),
				Value::Seq(items) if items.len() == 1 => &items[0],
				v => v,
			};
			encode_compact_node(catalog, &field.ty, item, out, depth + 1)
		}
		Node::Tuple(types) if types.len() == 1 => {
			let item = match value {
				Value::Seq(items) if items.len() == 1 => &items[0],
				v => v,
			};
			encode_compact_node(catalog, &types[0], item, out, depth + 1)
		}
		other => Err(Error::ShapeMismatch { expected: "unsigned integer to compact".into(), got: other.kind().into() }),
	}
}

fn encode_set(set: &SetNode, value: &Value, out: &mut ByteWriter) -> Result<(), Error> {
	if !matches!(set.bits, 8 | 16 | 32 | 64) {
		return Err(Error::InvalidBitMapping(format!("sets of {} bits are not supported", set.bits)));
	}
	let bits = match value {
		Value::UInt(n) => *n,
		Value::Seq(names) => {
			let mut bits = 0u64;
			for name in names {
				let name = name.as_str().ok_or_else(|| Error::mismatch("flag name", name))?;
				let (_, flag) = set
					.flags
					.iter()
					.find(|(n, _)| n == name)
					.ok_or_else(|| Error::InvalidBitMapping(format!("no flag named `{}`", name)))?;
				bits |= flag;
			}
			bits
		}
		v => return Err(Error::mismatch("sequence of flag names", v)),
	};
	let width = (set.bits / 8) as usize;
	if width < 8 && bits >> (width * 8) != 0 {
		return Err(Error::InvalidBitMapping(format!("{:#x} does not fit in {} bits", bits, set.bits)));
	}
	out.append(&bits.to_le_bytes()[..width]);
	Ok(())
}

fn encode_bit_sequence(seq: &BitSequenceNode, value: &Value, out: &mut ByteWriter) -> Result<(), Error> {
	let items = value.as_seq().ok_or_else(|| Error::mismatch("sequence of bools", value))?;
	let bits = items
		.iter()
		.map(|b| match b {
			Value::Bool(b) => Ok(*b),
			v => Err(Error::mismatch("bool", v)),
		})
		.collect::<Result<Vec<bool>, _>>()?;

	macro_rules! encode_bits {
		($store:ty, $order:ty) => {{
			bits.iter().copied().collect::<BitVec<$store, $order>>().encode_to(out);
			Ok(())
		}};
	}
	match (seq.store, seq.order) {
		(Primitive::U8, BitOrder::Lsb0) => encode_bits!(u8, Lsb0),
		(Primitive::U8, BitOrder::Msb0) => encode_bits!(u8, Msb0),
		(Primitive::U16, BitOrder::Lsb0) => encode_bits!(u16, Lsb0),
		(Primitive::U16, BitOrder::Msb0) => encode_bits!(u16, Msb0),
		(Primitive::U32, BitOrder::Lsb0) => encode_bits!(u32, Lsb0),
		(Primitive::U32, BitOrder::Msb0) => encode_bits!(u32, Msb0),
		(Primitive::U64, BitOrder::Lsb0) => encode_bits!(u64, Lsb0),
		(Primitive::U64, BitOrder::Msb0) => encode_bits!(u64, Msb0),
		(store, _) => Err(Error::ShapeMismatch { expected: "u8, u16, u32 or u64 bit store".into(), got: store.to_string() }),
	}
}

/// Byte collections may be given as a `0x` prefixed hex string.
fn hex_bytes(catalog: &Catalog, inner: &Node, value: &Value) -> Result<Option<Vec<u8>>, Error> {
	let s = match value {
		Value::Str(s) => s,
		_ => return Ok(None),
	};
	if catalog.resolve(inner)? != &Node::Primitive(Primitive::U8) {
		return Ok(None);
	}
	let hex_str = s.strip_prefix("0x").ok_or_else(|| Error::mismatch("0x prefixed hex string", value))?;
	let bytes = hex::decode(hex_str).map_err(|_| Error::mismatch("0x prefixed hex string", value))?;
	Ok(Some(bytes))
}

fn check_len(expected: u64, got: usize) -> Result<(), Error> {
	if expected != got as u64 {
		return Err(Error::ShapeMismatch { expected: format!("{} elements", expected), got: format!("{} elements", got) });
	}
	Ok(())
}

fn unknown_case(name: &str) -> Error {
	Error::ShapeMismatch { expected: "a declared enum case".into(), got: format!("`{}`", name) }
}
