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

//! Mappings for types whose generic structural shape is not the most useful one.

use descale_core::{Node, SetNode, TypeRef};
use dyn_clone::DynClone;
use scale_info::{form::PortableForm, PortableRegistry, Type, TypeDef, TypeDefPrimitive};
use std::fmt::Debug;

/// Turns a registry type into a node before the structural mapping gets to it.
pub trait TypeMapper: DynClone + Debug + Send + Sync {
	/// A node for `ty`, or `None` to leave it to the next mapper.
	fn map(&self, ty: &Type<PortableForm>, types: &PortableRegistry) -> Option<Node>;
}

dyn_clone::clone_trait_object!(TypeMapper);

/// `Option<T>` is an enum of `None` and `Some(T)` in the registry. As a
/// [`Node::Option`] it gets the single byte form for `Option<bool>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionMapper;

impl TypeMapper for OptionMapper {
	fn map(&self, ty: &Type<PortableForm>, _: &PortableRegistry) -> Option<Node> {
		if ty.path.segments.len() != 1 || ty.path.segments[0] != "Option" {
			return None;
		}
		let TypeDef::Variant(def) = &ty.type_def else { return None };
		match def.variants.as_slice() {
			[none, some]
				if none.name == "None"
					&& none.index == 0 && none.fields.is_empty()
					&& some.name == "Some" && some.index == 1
					&& some.fields.len() == 1 =>
			{
				Some(Node::Option(Box::new(Node::Proxy(TypeRef::Id(some.fields[0].ty.id)))))
			}
			_ => None,
		}
	}
}

/// `BitFlags<T>` wraps an integer whose bits are named by the cases of the
/// enum `T`. Each case's discriminant is its mask.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitFlagsMapper;

fn bit_width(ty: &Type<PortableForm>, types: &PortableRegistry) -> Option<u32> {
	match &ty.type_def {
		TypeDef::Primitive(TypeDefPrimitive::U8) => Some(8),
		TypeDef::Primitive(TypeDefPrimitive::U16) => Some(16),
		TypeDef::Primitive(TypeDefPrimitive::U32) => Some(32),
		TypeDef::Primitive(TypeDefPrimitive::U64) => Some(64),
		TypeDef::Composite(c) if c.fields.len() == 1 => bit_width(types.resolve(c.fields[0].ty.id)?, types),
		_ => None,
	}
}

impl TypeMapper for BitFlagsMapper {
	fn map(&self, ty: &Type<PortableForm>, types: &PortableRegistry) -> Option<Node> {
		if ty.path.segments.last()? != "BitFlags" {
			return None;
		}
		let flags_id = ty.type_params.first()?.ty.as_ref()?.id;
		let TypeDef::Variant(cases) = &types.resolve(flags_id)?.type_def else { return None };
		let bits = bit_width(ty, types)?;
		let flags = cases.variants.iter().map(|v| (v.name.clone(), u64::from(v.index))).collect();
		Some(Node::Set(SetNode { bits, flags }))
	}
}

/// A struct with a single unnamed field, like `AccountId32([u8; 32])`, stands
/// for its field.
#[derive(Debug, Clone, Copy, Default)]
pub struct WrapperAliasMapper;

impl TypeMapper for WrapperAliasMapper {
	fn map(&self, ty: &Type<PortableForm>, _: &PortableRegistry) -> Option<Node> {
		match &ty.type_def {
			TypeDef::Composite(c) if c.fields.len() == 1 && c.fields[0].name.is_none() => {
				Some(Node::Alias(TypeRef::Id(c.fields[0].ty.id)))
			}
			_ => None,
		}
	}
}
