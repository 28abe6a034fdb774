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

//! Building nodes out of JSON type definitions.
//!
//! A definition is either a type expression string (`"Vec<AccountId>"`),
//! `null`, an array (a tuple) or an object. Objects are structs unless they
//! carry an `_enum` or `_set` key:
//!
//! ```json
//! {
//!     "Balance": "u128",
//!     "Phase": { "_enum": { "ApplyExtrinsic": "u32", "Finalization": null } },
//!     "Reasons": { "_set": { "_bitLength": 8, "Fee": 1, "Transfer": 2 } },
//!     "Info": { "nonce": "u32", "data": "AccountData" }
//! }
//! ```
//!
//! Each [`Factory`] recognises one kind of definition. The [`FactoryChain`]
//! asks them in order and keeps the first answer.

use crate::parser::{ComponentsParser, TypeParser};
use descale_core::{EnumNode, Field, Node, SetNode};
use serde_json::{Map, Value as JsonValue};

/// Builds a node out of a definition it recognises.
pub type Factory = fn(&FactoryContext, &JsonValue) -> Option<Node>;

/// What a factory gets to work with besides the definition itself.
pub struct FactoryContext<'a> {
	pub parser: &'a TypeParser,
	chain: &'a FactoryChain,
}

impl<'a> FactoryContext<'a> {
	/// A node for a definition nested inside another one, such as a struct
	/// field or an enum payload. Names stay references to other types.
	pub fn member(&self, definition: &JsonValue) -> Option<Node> {
		match definition {
			JsonValue::String(s) => self.parser.parse(s),
			other => self.chain.build(self.parser, other),
		}
	}
}

/// An ordered list of factories.
#[derive(Debug, Clone)]
pub struct FactoryChain {
	factories: Vec<(&'static str, Factory)>,
}

impl Default for FactoryChain {
	fn default() -> Self {
		Self::empty()
			.with("null", null)
			.with("primitive", primitive)
			.with("vector", vector)
			.with("fixed array", fixed_array)
			.with("option", option)
			.with("compact", compact)
			.with("result", result)
			.with("collection", collection)
			.with("tuple", tuple)
			.with("enum values", enum_values)
			.with("enum", enumeration)
			.with("set", set)
			.with("struct", structure)
			.with("alias", alias)
	}
}

impl FactoryChain {
	pub fn empty() -> Self {
		Self { factories: Vec::new() }
	}

	/// Append a factory, asked after all the ones already in the chain.
	pub fn with(mut self, name: &'static str, factory: Factory) -> Self {
		self.factories.push((name, factory));
		self
	}

	/// Build a node from the first factory that recognises `definition`.
	pub fn build(&self, parser: &TypeParser, definition: &JsonValue) -> Option<Node> {
		let ctx = FactoryContext { parser, chain: self };
		self.factories.iter().find_map(|(name, factory)| {
			let node = factory(&ctx, definition)?;
			log::trace!("{} factory built a {}", name, node.kind());
			Some(node)
		})
	}
}

fn text(definition: &JsonValue) -> Option<String> {
	definition.as_str().map(ComponentsParser::preprocess)
}

fn null(_: &FactoryContext, definition: &JsonValue) -> Option<Node> {
	definition.is_null().then_some(Node::Null)
}

fn primitive(ctx: &FactoryContext, definition: &JsonValue) -> Option<Node> {
	ctx.parser.primitive(&text(definition)?)
}

fn vector(ctx: &FactoryContext, definition: &JsonValue) -> Option<Node> {
	ctx.parser.vector(&text(definition)?)
}

fn fixed_array(ctx: &FactoryContext, definition: &JsonValue) -> Option<Node> {
	ctx.parser.fixed_array(&text(definition)?)
}

fn option(ctx: &FactoryContext, definition: &JsonValue) -> Option<Node> {
	ctx.parser.option(&text(definition)?)
}

fn compact(ctx: &FactoryContext, definition: &JsonValue) -> Option<Node> {
	ctx.parser.compact(&text(definition)?)
}

fn result(ctx: &FactoryContext, definition: &JsonValue) -> Option<Node> {
	ctx.parser.result(&text(definition)?)
}

fn collection(ctx: &FactoryContext, definition: &JsonValue) -> Option<Node> {
	ctx.parser.collection(&text(definition)?)
}

fn tuple(ctx: &FactoryContext, definition: &JsonValue) -> Option<Node> {
	match definition {
		JsonValue::String(s) => ctx.parser.tuple(&ComponentsParser::preprocess(s)),
		JsonValue::Array(items) if items.is_empty() => Some(Node::Null),
		JsonValue::Array(items) => Some(Node::Tuple(items.iter().map(|i| ctx.member(i)).collect::<Option<_>>()?)),
		_ => None,
	}
}

fn tagged<'a>(definition: &'a JsonValue, tag: &str) -> Option<&'a JsonValue> {
	definition.as_object()?.get(tag)
}

/// `{"_enum": ["A", "B"]}`, or `{"_enum": {"A": 0, "B": 4}}` with explicit indexes.
fn enum_values(_: &FactoryContext, definition: &JsonValue) -> Option<Node> {
	let mut cases = match tagged(definition, "_enum")? {
		JsonValue::Array(names) => names
			.iter()
			.enumerate()
			.map(|(i, name)| Some((u8::try_from(i).ok()?, name.as_str()?.to_string())))
			.collect::<Option<Vec<_>>>()?,
		JsonValue::Object(cases) if cases.values().all(JsonValue::is_number) => cases
			.iter()
			.map(|(name, index)| Some((u8::try_from(index.as_u64()?).ok()?, name.clone())))
			.collect::<Option<Vec<_>>>()?,
		_ => return None,
	};
	cases.sort_by_key(|(index, _)| *index);
	Some(Node::EnumValues(cases))
}

/// `{"_enum": {"A": "u32", "B": null, "C": {"x": "u8"}}}`
fn enumeration(ctx: &FactoryContext, definition: &JsonValue) -> Option<Node> {
	let cases = tagged(definition, "_enum")?.as_object()?;
	let cases = cases.iter().map(|(name, payload)| Some((name.as_str(), ctx.member(payload)?))).collect::<Option<Vec<_>>>()?;
	Some(Node::Enum(EnumNode::sequential(cases)))
}

/// `{"_set": {"_bitLength": 64, "A": 1, "B": 2}}`. The bit length defaults to 8.
fn set(_: &FactoryContext, definition: &JsonValue) -> Option<Node> {
	let flags = tagged(definition, "_set")?.as_object()?;
	let bits = match flags.get("_bitLength") {
		Some(bits) => u32::try_from(bits.as_u64()?).ok()?,
		None => 8,
	};
	let flags = flags
		.iter()
		.filter(|(name, _)| name.as_str() != "_bitLength")
		.map(|(name, flag)| Some((name.clone(), flag.as_u64()?)))
		.collect::<Option<Vec<_>>>()?;
	Some(Node::Set(SetNode { bits, flags }))
}

/// Any other object. `_alias` and `_fallback` only matter to javascript clients and are dropped.
fn structure(ctx: &FactoryContext, definition: &JsonValue) -> Option<Node> {
	let object: &Map<String, JsonValue> = definition.as_object()?;
	if object.contains_key("_enum") || object.contains_key("_set") {
		return None;
	}
	let fields = object
		.iter()
		.filter(|(name, _)| !matches!(name.as_str(), "_alias" | "_fallback"))
		.map(|(name, ty)| Some(Field::new(name.as_str(), ctx.member(ty)?)))
		.collect::<Option<Vec<_>>>()?;
	Some(Node::Struct(fields))
}

/// A string naming another type, or one of the shapes only the full parser knows about.
fn alias(ctx: &FactoryContext, definition: &JsonValue) -> Option<Node> {
	match ctx.parser.parse(definition.as_str()?)? {
		Node::Proxy(target) => Some(Node::Alias(target)),
		node => Some(node),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use descale_core::{Primitive, TypeRef};
	use serde_json::json;

	fn build(definition: JsonValue) -> Option<Node> {
		FactoryChain::default().build(&TypeParser::new(), &definition)
	}

	#[test]
	fn strings_and_null() {
		assert_eq!(build(json!(null)), Some(Node::Null));
		assert_eq!(build(json!("u64")), Some(Node::Primitive(Primitive::U64)));
		assert_eq!(build(json!("Vec<u8>")), Some(Node::Vector(Box::new(Node::Primitive(Primitive::U8)))));
		assert_eq!(build(json!("()")), Some(Node::Null));
		assert_eq!(build(json!("Box<Call>")), Some(Node::Alias(TypeRef::name("Call"))));
		assert_eq!(build(json!("T::AccountId")), Some(Node::Alias(TypeRef::name("T::AccountId"))));
		assert_eq!(build(json!(5)), None);
	}

	#[test]
	fn enums() {
		assert_eq!(
			build(json!({"_enum": ["Normal", "Operational"]})),
			Some(Node::EnumValues(vec![(0, "Normal".into()), (1, "Operational".into())]))
		);
		assert_eq!(
			build(json!({"_enum": {"Any": 0, "Staking": 3, "NonTransfer": 1}})),
			Some(Node::EnumValues(vec![(0, "Any".into()), (1, "NonTransfer".into()), (3, "Staking".into())]))
		);
		assert_eq!(
			build(json!({"_enum": {"Idle": null, "Busy": "u32", "Done": {"at": "BlockNumber"}}})),
			Some(Node::Enum(EnumNode::sequential([
				("Idle", Node::Null),
				("Busy", Node::Primitive(Primitive::U32)),
				("Done", Node::Struct(vec![Field::new("at", Node::proxy("BlockNumber"))])),
			])))
		);
		assert_eq!(build(json!({"_enum": {"Big": 256}})), None);
	}

	#[test]
	fn sets() {
		assert_eq!(
			build(json!({"_set": {"_bitLength": 64, "Fee": 1, "Tip": 16}})),
			Some(Node::Set(SetNode { bits: 64, flags: vec![("Fee".into(), 1), ("Tip".into(), 16)] }))
		);
		assert_eq!(
			build(json!({"_set": {"A": 1}})),
			Some(Node::Set(SetNode { bits: 8, flags: vec![("A".into(), 1)] }))
		);
	}

	#[test]
	fn structs_keep_declaration_order() {
		let node = build(json!({
			"_alias": {"pays": "pays_fee"},
			"weight": "u64",
			"class": {"_enum": ["Normal"]},
			"pays": "Pays",
			"extra": ["u8", null],
		}));
		assert_eq!(
			node,
			Some(Node::Struct(vec![
				Field::new("weight", Node::Primitive(Primitive::U64)),
				Field::new("class", Node::EnumValues(vec![(0, "Normal".into())])),
				Field::new("pays", Node::proxy("Pays")),
				Field::new("extra", Node::Tuple(vec![Node::Primitive(Primitive::U8), Node::Null])),
			]))
		);
	}

	#[test]
	fn unknown_members_fail_the_whole_definition() {
		assert_eq!(build(json!({"ok": "u8", "broken": "Vec<"})), None);
		assert_eq!(build(json!(["u8", 3])), None);
	}

	#[test]
	fn chains_can_be_reduced() {
		let only_null = FactoryChain::empty().with("null", null);
		assert_eq!(only_null.build(&TypeParser::new(), &json!(null)), Some(Node::Null));
		assert_eq!(only_null.build(&TypeParser::new(), &json!("u8")), None);
	}
}
