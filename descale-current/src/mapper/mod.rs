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

//! Mapping a scale-info type registry onto catalog nodes.
//!
//! Every type in the registry is registered under its id. References between
//! types become [`Node::Proxy`] links to ids, so recursive types need no
//! special treatment. Types with a path are also registered under their full
//! path (`sp_runtime::DispatchError`) and their bare name (`DispatchError`)
//! when no other type shares it.

mod name;
mod special;

pub use name::{CamelCaseMapper, IdentityMapper, NameMapper};
pub use special::{BitFlagsMapper, OptionMapper, TypeMapper, WrapperAliasMapper};

use crate::MetadataError;
use descale_core::{
	BitOrder, BitSequenceNode, Catalog, CatalogBuilder, EnumNode, Field, IndexWidth, Node, Primitive, TypeRef, Variant,
};
use scale_info::{form::PortableForm, PortableRegistry, Type, TypeDef, TypeDefBitSequence, TypeDefPrimitive};
use std::collections::BTreeMap;

type ScaleField = scale_info::Field<PortableForm>;

/// How registry types become nodes.
///
/// ```
/// use descale_current::{IdentityMapper, MapperConfig, WrapperAliasMapper};
///
/// // keep field names as declared and only unwrap single field structs
/// let config = MapperConfig::new().names(IdentityMapper).no_type_mappers().type_mapper(WrapperAliasMapper);
/// ```
#[derive(Debug, Clone)]
pub struct MapperConfig {
	names: Box<dyn NameMapper>,
	special: Vec<Box<dyn TypeMapper>>,
}

impl Default for MapperConfig {
	fn default() -> Self {
		Self::new()
	}
}

fn proxy(id: u32) -> Node {
	Node::Proxy(TypeRef::Id(id))
}

impl MapperConfig {
	/// Camel case field names, with the option, bit flags and wrapper mappings.
	pub fn new() -> Self {
		Self {
			names: Box::new(CamelCaseMapper),
			special: vec![Box::new(OptionMapper), Box::new(BitFlagsMapper), Box::new(WrapperAliasMapper)],
		}
	}

	pub fn names<N: NameMapper + 'static>(mut self, names: N) -> Self {
		self.names = Box::new(names);
		self
	}

	/// Append a special case mapping, tried after the ones already configured.
	pub fn type_mapper<M: TypeMapper + 'static>(mut self, mapper: M) -> Self {
		self.special.push(Box::new(mapper));
		self
	}

	pub fn no_type_mappers(mut self) -> Self {
		self.special.clear();
		self
	}

	/// Map every type of `types` into a sealed catalog.
	pub fn build_catalog(&self, types: &PortableRegistry) -> Result<Catalog, MetadataError> {
		let mut builder = CatalogBuilder::new();
		let mut names: BTreeMap<String, Vec<u32>> = BTreeMap::new();

		for ty in &types.types {
			let node = self.map_type(ty.id, &ty.ty, types)?;
			builder.register(TypeRef::Id(ty.id), node);

			let segments = &ty.ty.path.segments;
			if let Some(last) = segments.last() {
				for name in [segments.join("::"), last.clone()] {
					let ids = names.entry(name).or_default();
					if !ids.contains(&ty.id) {
						ids.push(ty.id);
					}
				}
			}
		}

		let mut named = 0;
		for (name, ids) in names {
			if let [id] = ids.as_slice() {
				builder.register(TypeRef::Name(name), Node::Alias(TypeRef::Id(*id)));
				named += 1;
			}
		}
		log::debug!("mapped {} registry types, {} of them by name", types.types.len(), named);
		Ok(builder.seal())
	}

	fn map_type(&self, id: u32, ty: &Type<PortableForm>, types: &PortableRegistry) -> Result<Node, MetadataError> {
		if let Some(node) = self.special.iter().find_map(|m| m.map(ty, types)) {
			log::trace!("type {} mapped specially to a {}", id, node.kind());
			return Ok(node);
		}
		let node = match &ty.type_def {
			TypeDef::Composite(c) => self.fields(&c.fields),
			TypeDef::Variant(v) => Node::Enum(EnumNode {
				variants: v
					.variants
					.iter()
					.map(|v| Variant::new(u32::from(v.index), v.name.clone(), self.payload(&v.fields)))
					.collect(),
				width: IndexWidth::U8,
			}),
			TypeDef::Sequence(s) => Node::Vector(Box::new(proxy(s.type_param.id))),
			TypeDef::Array(a) => Node::FixedArray(Box::new(proxy(a.type_param.id)), u64::from(a.len)),
			TypeDef::Tuple(t) if t.fields.is_empty() => Node::Null,
			TypeDef::Tuple(t) => Node::Tuple(t.fields.iter().map(|f| proxy(f.id)).collect()),
			TypeDef::Primitive(p) => Node::Primitive(primitive(p)),
			TypeDef::Compact(c) => Node::Compact(Box::new(proxy(c.type_param.id))),
			TypeDef::BitSequence(b) => Node::BitSequence(bit_sequence(id, b, types)?),
		};
		Ok(node)
	}

	/// Named fields make a struct, unnamed ones a tuple.
	fn fields(&self, fields: &[ScaleField]) -> Node {
		if fields.is_empty() {
			Node::Null
		} else if fields.iter().all(|f| f.name.is_some()) {
			Node::Struct(
				fields
					.iter()
					.map(|f| Field::new(self.names.field_name(f.name.as_deref().unwrap_or_default()), proxy(f.ty.id)))
					.collect(),
			)
		} else {
			Node::Tuple(fields.iter().map(|f| proxy(f.ty.id)).collect())
		}
	}

	/// Like [`MapperConfig::fields`], but a single unnamed field is the payload itself.
	fn payload(&self, fields: &[ScaleField]) -> Node {
		match fields {
			[only] if only.name.is_none() => proxy(only.ty.id),
			fields => self.fields(fields),
		}
	}
}

fn primitive(p: &TypeDefPrimitive) -> Primitive {
	match p {
		TypeDefPrimitive::Bool => Primitive::Bool,
		TypeDefPrimitive::Char => Primitive::Char,
		TypeDefPrimitive::Str => Primitive::Str,
		TypeDefPrimitive::U8 => Primitive::U8,
		TypeDefPrimitive::U16 => Primitive::U16,
		TypeDefPrimitive::U32 => Primitive::U32,
		TypeDefPrimitive::U64 => Primitive::U64,
		TypeDefPrimitive::U128 => Primitive::U128,
		TypeDefPrimitive::U256 => Primitive::U256,
		TypeDefPrimitive::I8 => Primitive::I8,
		TypeDefPrimitive::I16 => Primitive::I16,
		TypeDefPrimitive::I32 => Primitive::I32,
		TypeDefPrimitive::I64 => Primitive::I64,
		TypeDefPrimitive::I128 => Primitive::I128,
		TypeDefPrimitive::I256 => Primitive::I256,
	}
}

/// The store has to be an unsigned primitive and the order `Lsb0` or `Msb0`.
fn bit_sequence(
	id: u32,
	def: &TypeDefBitSequence<PortableForm>,
	types: &PortableRegistry,
) -> Result<BitSequenceNode, MetadataError> {
	let invalid = || MetadataError::InvalidBitSequence { id };
	let store = match &types.resolve(def.bit_store_type.id).ok_or_else(invalid)?.type_def {
		TypeDef::Primitive(
			p @ (TypeDefPrimitive::U8 | TypeDefPrimitive::U16 | TypeDefPrimitive::U32 | TypeDefPrimitive::U64),
		) => primitive(p),
		_ => return Err(invalid()),
	};
	let order_ty = types.resolve(def.bit_order_type.id).ok_or_else(invalid)?;
	let order = match order_ty.path.segments.last().map(String::as_str) {
		Some("Lsb0") => BitOrder::Lsb0,
		Some("Msb0") => BitOrder::Msb0,
		_ => return Err(invalid()),
	};
	Ok(BitSequenceNode { store, order })
}

#[cfg(test)]
mod tests {
	use super::*;
	use scale_info::{meta_type, Registry, TypeInfo};

	fn registry<T: TypeInfo + 'static>() -> (PortableRegistry, u32) {
		let mut registry = Registry::new();
		let id = registry.register_type(&meta_type::<T>()).id;
		(registry.into(), id)
	}

	#[allow(unused)]
	#[derive(TypeInfo)]
	struct Wrapper(u32);

	#[allow(unused)]
	#[derive(TypeInfo)]
	struct Account {
		free_balance: u128,
		nonce: Option<u32>,
		id: Wrapper,
	}

	#[allow(unused)]
	#[derive(TypeInfo)]
	enum Call {
		Remark(Vec<u8>),
		#[codec(index = 5)]
		Pair(u8, u16),
		Stop,
	}

	#[test]
	fn maps_structs_with_special_cases() {
		let (types, id) = registry::<Account>();
		let catalog = MapperConfig::new().build_catalog(&types).unwrap();

		let Node::Struct(fields) = catalog.lookup(&TypeRef::Id(id)).unwrap() else { panic!("struct expected") };
		let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
		assert_eq!(names, ["freeBalance", "nonce", "id"]);

		assert!(matches!(catalog.resolve(&fields[1].ty).unwrap(), Node::Option(_)));
		assert_eq!(catalog.resolve(&fields[2].ty).unwrap(), &Node::Primitive(Primitive::U32));
		assert_eq!(catalog.get(&"Account".into()), Some(&Node::Alias(TypeRef::Id(id))));
	}

	#[test]
	fn plain_structural_mapping() {
		let (types, id) = registry::<Account>();
		let catalog = MapperConfig::new().names(IdentityMapper).no_type_mappers().build_catalog(&types).unwrap();

		let Node::Struct(fields) = catalog.lookup(&TypeRef::Id(id)).unwrap() else { panic!("struct expected") };
		assert_eq!(fields[0].name, "free_balance");
		assert!(matches!(catalog.resolve(&fields[1].ty).unwrap(), Node::Enum(_)));
		assert!(matches!(catalog.resolve(&fields[2].ty).unwrap(), Node::Tuple(items) if items.len() == 1));
	}

	#[test]
	fn maps_variants_with_their_indexes() {
		let (types, id) = registry::<Call>();
		let catalog = MapperConfig::new().build_catalog(&types).unwrap();

		let Node::Enum(call) = catalog.lookup(&TypeRef::Id(id)).unwrap() else { panic!("enum expected") };
		assert_eq!(call.width, IndexWidth::U8);
		let indexes: Vec<_> = call.variants.iter().map(|v| (v.index, v.name.as_str())).collect();
		assert_eq!(indexes, [(0, "Remark"), (5, "Pair"), (2, "Stop")]);
		assert!(matches!(catalog.resolve(&call.variants[0].payload).unwrap(), Node::Vector(_)));
		assert!(matches!(&call.variants[1].payload, Node::Tuple(items) if items.len() == 2));
		assert_eq!(call.variants[2].payload, Node::Null);
	}

	#[test]
	fn maps_bit_sequences() {
		use bitvec::{order::Msb0, vec::BitVec};
		let (types, id) = registry::<BitVec<u16, Msb0>>();
		let catalog = MapperConfig::new().build_catalog(&types).unwrap();
		assert_eq!(
			catalog.lookup(&TypeRef::Id(id)).unwrap(),
			&Node::BitSequence(BitSequenceNode { store: Primitive::U16, order: BitOrder::Msb0 })
		);
	}
}
