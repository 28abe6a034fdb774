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

//! The type graph that the encoder and decoder walk.

use derive_more::Display;
use std::fmt;

/// The key a type is stored under in a [`crate::Catalog`].
///
/// Legacy registries name their types, scale-info registries number them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum TypeRef {
	#[display(fmt = "{}", _0)]
	Name(String),
	#[display(fmt = "#{}", _0)]
	Id(u32),
}

impl TypeRef {
	pub fn name<S: Into<String>>(name: S) -> Self {
		TypeRef::Name(name.into())
	}
}

impl From<&str> for TypeRef {
	fn from(s: &str) -> Self {
		TypeRef::Name(s.to_string())
	}
}

impl From<String> for TypeRef {
	fn from(s: String) -> Self {
		TypeRef::Name(s)
	}
}

impl From<u32> for TypeRef {
	fn from(id: u32) -> Self {
		TypeRef::Id(id)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Primitive {
	#[display(fmt = "bool")]
	Bool,
	#[display(fmt = "char")]
	Char,
	#[display(fmt = "str")]
	Str,
	#[display(fmt = "u8")]
	U8,
	#[display(fmt = "u16")]
	U16,
	#[display(fmt = "u32")]
	U32,
	#[display(fmt = "u64")]
	U64,
	#[display(fmt = "u128")]
	U128,
	#[display(fmt = "u256")]
	U256,
	#[display(fmt = "i8")]
	I8,
	#[display(fmt = "i16")]
	I16,
	#[display(fmt = "i32")]
	I32,
	#[display(fmt = "i64")]
	I64,
	#[display(fmt = "i128")]
	I128,
	#[display(fmt = "i256")]
	I256,
}

impl Primitive {
	/// Look up a primitive by its rust name. `String` and `&str` are accepted for `str`.
	pub fn from_name(name: &str) -> Option<Self> {
		let p = match name {
			"bool" => Primitive::Bool,
			"char" => Primitive::Char,
			"str" | "&str" | "String" => Primitive::Str,
			"u8" => Primitive::U8,
			"u16" => Primitive::U16,
			"u32" => Primitive::U32,
			"u64" => Primitive::U64,
			"u128" => Primitive::U128,
			"u256" => Primitive::U256,
			"i8" => Primitive::I8,
			"i16" => Primitive::I16,
			"i32" => Primitive::I32,
			"i64" => Primitive::I64,
			"i128" => Primitive::I128,
			"i256" => Primitive::I256,
			_ => return None,
		};
		Some(p)
	}

	/// Integer type of the given bit width, if there is one.
	pub fn integer(bits: u32, signed: bool) -> Option<Self> {
		let p = match (bits, signed) {
			(8, false) => Primitive::U8,
			(16, false) => Primitive::U16,
			(32, false) => Primitive::U32,
			(64, false) => Primitive::U64,
			(128, false) => Primitive::U128,
			(256, false) => Primitive::U256,
			(8, true) => Primitive::I8,
			(16, true) => Primitive::I16,
			(32, true) => Primitive::I32,
			(64, true) => Primitive::I64,
			(128, true) => Primitive::I128,
			(256, true) => Primitive::I256,
			_ => return None,
		};
		Some(p)
	}

	/// Width in bytes of fixed size primitives. `str` has no fixed width.
	pub fn byte_width(&self) -> Option<usize> {
		match self {
			Primitive::Bool | Primitive::U8 | Primitive::I8 => Some(1),
			Primitive::U16 | Primitive::I16 => Some(2),
			Primitive::Char | Primitive::U32 | Primitive::I32 => Some(4),
			Primitive::U64 | Primitive::I64 => Some(8),
			Primitive::U128 | Primitive::I128 => Some(16),
			Primitive::U256 | Primitive::I256 => Some(32),
			Primitive::Str => None,
		}
	}

	pub fn is_unsigned(&self) -> bool {
		matches!(
			self,
			Primitive::U8 | Primitive::U16 | Primitive::U32 | Primitive::U64 | Primitive::U128 | Primitive::U256
		)
	}

	pub fn is_signed(&self) -> bool {
		matches!(
			self,
			Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64 | Primitive::I128 | Primitive::I256
		)
	}
}

/// Width of an enum discriminant on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexWidth {
	#[default]
	U8,
	U16,
	U32,
}

impl IndexWidth {
	pub fn bytes(&self) -> usize {
		match self {
			IndexWidth::U8 => 1,
			IndexWidth::U16 => 2,
			IndexWidth::U32 => 4,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
	pub name: String,
	pub ty: Node,
}

impl Field {
	pub fn new<S: Into<String>>(name: S, ty: Node) -> Self {
		Self { name: name.into(), ty }
	}
}

/// One case of an [`EnumNode`]. A case without payload has [`Node::Null`] as its payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variant {
	pub index: u32,
	pub name: String,
	pub payload: Node,
}

impl Variant {
	pub fn new<S: Into<String>>(index: u32, name: S, payload: Node) -> Self {
		Self { index, name: name.into(), payload }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumNode {
	pub variants: Vec<Variant>,
	pub width: IndexWidth,
}

impl EnumNode {
	/// Cases are numbered in declaration order and indexed with a single byte.
	pub fn sequential<S: Into<String>>(cases: impl IntoIterator<Item = (S, Node)>) -> Self {
		let variants =
			cases.into_iter().enumerate().map(|(i, (name, payload))| Variant::new(i as u32, name, payload)).collect();
		Self { variants, width: IndexWidth::U8 }
	}

	pub fn by_index(&self, index: u32) -> Option<&Variant> {
		self.variants.iter().find(|v| v.index == index)
	}

	pub fn by_name(&self, name: &str) -> Option<&Variant> {
		self.variants
			.iter()
			.find(|v| v.name == name)
			.or_else(|| self.variants.iter().find(|v| v.name.eq_ignore_ascii_case(name)))
	}
}

/// Named bit flags stored in an unsigned integer of `bits` width.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SetNode {
	pub bits: u32,
	pub flags: Vec<(String, u64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitOrder {
	Lsb0,
	Msb0,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitSequenceNode {
	/// One of `U8`, `U16`, `U32` or `U64`.
	pub store: Primitive,
	pub order: BitOrder,
}

/// A type description.
///
/// Nodes own their structural children. References to other catalog entries
/// go through [`Node::Alias`] or [`Node::Proxy`], which is what lets a type
/// refer back to itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
	Primitive(Primitive),
	/// The unit type; nothing on the wire.
	Null,
	Struct(Vec<Field>),
	Enum(EnumNode),
	/// An enum whose cases carry no data.
	EnumValues(Vec<(u8, String)>),
	Vector(Box<Node>),
	FixedArray(Box<Node>, u64),
	Tuple(Vec<Node>),
	Option(Box<Node>),
	Compact(Box<Node>),
	Set(SetNode),
	BitSequence(BitSequenceNode),
	/// Another name for the referenced type.
	Alias(TypeRef),
	/// A reference to a type that may not exist yet when this node is built.
	Proxy(TypeRef),
}

impl Node {
	pub fn proxy<T: Into<TypeRef>>(ty: T) -> Self {
		Node::Proxy(ty.into())
	}

	/// Call `f` with every catalog reference reachable without leaving this node.
	pub fn for_each_ref<F: FnMut(&TypeRef)>(&self, f: &mut F) {
		match self {
			Node::Alias(ty) | Node::Proxy(ty) => f(ty),
			Node::Struct(fields) => fields.iter().for_each(|field| field.ty.for_each_ref(f)),
			Node::Enum(e) => e.variants.iter().for_each(|v| v.payload.for_each_ref(f)),
			Node::Tuple(items) => items.iter().for_each(|item| item.for_each_ref(f)),
			Node::Vector(inner) | Node::FixedArray(inner, _) | Node::Option(inner) | Node::Compact(inner) => {
				inner.for_each_ref(f)
			}
			Node::Primitive(_) | Node::Null | Node::EnumValues(_) | Node::Set(_) | Node::BitSequence(_) => {}
		}
	}

	/// A short name for the kind of node, used in error messages.
	pub fn kind(&self) -> &'static str {
		match self {
			Node::Primitive(_) => "primitive",
			Node::Null => "null",
			Node::Struct(_) => "struct",
			Node::Enum(_) => "enum",
			Node::EnumValues(_) => "enum values",
			Node::Vector(_) => "vector",
			Node::FixedArray(..) => "fixed array",
			Node::Tuple(_) => "tuple",
			Node::Option(_) => "option",
			Node::Compact(_) => "compact",
			Node::Set(_) => "set",
			Node::BitSequence(_) => "bit sequence",
			Node::Alias(_) => "alias",
			Node::Proxy(_) => "proxy",
		}
	}
}

impl fmt::Display for Node {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Node::Primitive(p) => write!(f, "{}", p),
			Node::Null => write!(f, "()"),
			Node::Struct(fields) => {
				write!(f, "{{ ")?;
				for (i, field) in fields.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{}: {}", field.name, field.ty)?;
				}
				write!(f, " }}")
			}
			Node::Enum(e) => {
				write!(f, "enum {{ ")?;
				for (i, v) in e.variants.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					match v.payload {
						Node::Null => write!(f, "{} = {}", v.name, v.index)?,
						ref payload => write!(f, "{}({}) = {}", v.name, payload, v.index)?,
					}
				}
				write!(f, " }}")
			}
			Node::EnumValues(cases) => {
				let names = cases.iter().map(|(_, n)| n.as_str()).collect::<Vec<_>>();
				write!(f, "enum {{ {} }}", names.join(", "))
			}
			Node::Vector(inner) => write!(f, "Vec<{}>", inner),
			Node::FixedArray(inner, len) => write!(f, "[{}; {}]", inner, len),
			Node::Tuple(items) => {
				let items = items.iter().map(|i| i.to_string()).collect::<Vec<_>>();
				write!(f, "({})", items.join(", "))
			}
			Node::Option(inner) => write!(f, "Option<{}>", inner),
			Node::Compact(inner) => write!(f, "Compact<{}>", inner),
			Node::Set(set) => write!(f, "Set<u{}>", set.bits),
			Node::BitSequence(seq) => write!(f, "BitVec<{}, {:?}>", seq.store, seq.order),
			Node::Alias(ty) | Node::Proxy(ty) => write!(f, "{}", ty),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_reads_like_rust() {
		let node = Node::Vector(Box::new(Node::Tuple(vec![
			Node::Primitive(Primitive::U8),
			Node::Option(Box::new(Node::proxy("AccountId"))),
		])));
		assert_eq!(node.to_string(), "Vec<(u8, Option<AccountId>)>");
		assert_eq!(Node::FixedArray(Box::new(Node::proxy(3u32)), 4).to_string(), "[#3; 4]");
	}

	#[test]
	fn collects_references() {
		let node = Node::Struct(vec![
			Field::new("a", Node::proxy("A")),
			Field::new("b", Node::Vector(Box::new(Node::Alias("B".into())))),
			Field::new("c", Node::Primitive(Primitive::U32)),
		]);
		let mut refs = Vec::new();
		node.for_each_ref(&mut |r| refs.push(r.clone()));
		assert_eq!(refs, vec![TypeRef::name("A"), TypeRef::name("B")]);
	}

	#[test]
	fn enum_lookup_falls_back_to_case_insensitive() {
		let e = EnumNode::sequential([("Fee", Node::Null), ("Misc", Node::Null)]);
		assert_eq!(e.by_name("misc").map(|v| v.index), Some(1));
		assert_eq!(e.by_index(0).map(|v| v.name.as_str()), Some("Fee"));
		assert!(e.by_index(2).is_none());
	}
}
