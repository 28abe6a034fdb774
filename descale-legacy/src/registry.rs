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

use crate::{
	factory::FactoryChain,
	parser::TypeParser,
	resolver::{KnownNames, ResolverChain},
	Error, TypeBundle,
};
use descale_common::SpecVersion;
use descale_core::{
	decode_node, encode_node, ByteReader, ByteWriter, Catalog, CatalogBuilder, Node, TypeRef, Value,
};
use serde_json::{Map, Value as JsonValue};
use std::borrow::Cow;

#[cfg(feature = "default_definitions")]
mod default {
	pub const BUILTIN: &str = include_str!("./definitions/builtin.json");
}

#[cfg(feature = "default_definitions")]
fn builtin_definitions() -> Option<&'static str> {
	Some(default::BUILTIN)
}

#[cfg(not(feature = "default_definitions"))]
fn builtin_definitions() -> Option<&'static str> {
	None
}

/// Collects JSON type definitions into a catalog.
///
/// Definitions may refer to types that are registered later, or never.
/// [`LegacyTypes::seal`] settles those references with a [`ResolverChain`].
#[derive(Debug)]
pub struct LegacyTypes {
	builder: CatalogBuilder,
	parser: TypeParser,
	factories: FactoryChain,
	resolvers: ResolverChain,
	skipped: Vec<String>,
	builtins: bool,
}

impl Default for LegacyTypes {
	fn default() -> Self {
		Self::new()
	}
}

impl LegacyTypes {
	/// An empty registry. The bundled definitions are added when sealing, unless
	/// a type with the same name was registered first.
	pub fn new() -> Self {
		Self {
			builder: CatalogBuilder::new(),
			parser: TypeParser::new(),
			factories: FactoryChain::default(),
			resolvers: ResolverChain::default(),
			skipped: Vec::new(),
			builtins: builtin_definitions().is_some(),
		}
	}

	/// Do not add the bundled definitions.
	pub fn without_builtins(mut self) -> Self {
		self.builtins = false;
		self
	}

	pub fn with_resolvers(mut self, resolvers: ResolverChain) -> Self {
		self.resolvers = resolvers;
		self
	}

	pub fn with_factories(mut self, factories: FactoryChain) -> Self {
		self.factories = factories;
		self
	}

	/// Register a single definition.
	///
	/// A name that is already registered keeps its node, which is returned.
	/// A definition no factory understands registers nothing.
	pub fn register(&mut self, name: &str, definition: &JsonValue) -> Result<&Node, Error> {
		let ty = TypeRef::name(name);
		if self.builder.contains(&ty) {
			log::trace!("{} already registered", name);
			return Ok(self.builder.get(&ty).expect("checked for presence above; qed"));
		}
		let node = self
			.factories
			.build(&self.parser, definition)
			.ok_or_else(|| Error::NoMatchingFactory { name: name.to_string(), definition: definition.to_string() })?;
		Ok(self.builder.register(ty, node))
	}

	/// Register every definition in `types`, returning how many were accepted.
	/// The names of rejected definitions are kept in [`LegacyTypes::skipped`].
	pub fn register_map(&mut self, types: &Map<String, JsonValue>) -> usize {
		let mut registered = 0;
		for (name, definition) in types {
			match self.register(name, definition) {
				Ok(_) => registered += 1,
				Err(e) => {
					log::warn!("skipping type {}: {}", name, e);
					self.skipped.push(name.clone());
				}
			}
		}
		registered
	}

	/// Register definitions from JSON.
	///
	/// Accepts a flat map of names to definitions, a `{"types": {..}}` object,
	/// or a map of modules that each carry a `types` object.
	pub fn register_json(&mut self, json: &str) -> Result<usize, Error> {
		let value: JsonValue = serde_json::from_str(json)?;
		let object = value.as_object().ok_or_else(|| Error::ExpectedObject(value.to_string()))?;

		if let Some(JsonValue::Object(types)) = object.get("types") {
			return Ok(self.register_map(types));
		}
		let modules = object
			.values()
			.map(|module| match module.get("types") {
				Some(JsonValue::Object(types)) => Some(types),
				_ => None,
			})
			.collect::<Option<Vec<_>>>();
		match modules {
			Some(modules) if !modules.is_empty() => Ok(modules.into_iter().map(|types| self.register_map(types)).sum()),
			_ => Ok(self.register_map(object)),
		}
	}

	/// Register the definitions `bundle` has for `spec`.
	pub fn register_bundle(&mut self, bundle: &TypeBundle, spec: SpecVersion) -> usize {
		self.register_map(&bundle.types_for(spec))
	}

	/// Names whose definitions were rejected.
	pub fn skipped(&self) -> &[String] {
		&self.skipped
	}

	pub fn contains(&self, name: &str) -> bool {
		self.builder.contains(&TypeRef::name(name))
	}

	pub fn len(&self) -> usize {
		self.builder.len()
	}

	pub fn is_empty(&self) -> bool {
		self.builder.is_empty()
	}

	fn known(&self) -> KnownNames {
		KnownNames::new(self.builder.keys().filter_map(|ty| match ty {
			TypeRef::Name(name) => Some(name.clone()),
			TypeRef::Id(_) => None,
		}))
	}

	/// Add the bundled definitions and settle every reference to a type that
	/// is not registered, then freeze the result.
	///
	/// A missing name becomes an alias for whatever the resolvers map it to.
	/// Names the resolvers cannot map, but which are type expressions
	/// themselves (`Vec<Foo>`), are registered as what they parse to.
	/// Anything else stays missing and fails when it is used.
	pub fn seal(mut self) -> LegacyCatalog {
		if let Some(builtin) = builtin_definitions().filter(|_| self.builtins) {
			let builtin: Map<String, JsonValue> =
				serde_json::from_str(builtin).expect("bundled definitions are a JSON object; qed");
			let added = self.register_map(&builtin);
			log::debug!("added {} bundled definitions", added);
		}

		let mut unresolved: Vec<String> = Vec::new();
		loop {
			let known = self.known();
			let mut progress = false;
			for ty in self.builder.dangling() {
				let name = match &ty {
					TypeRef::Name(name) if !unresolved.contains(name) => name.clone(),
					_ => continue,
				};
				if let Some(target) = self.resolvers.resolve(&name, &known).filter(|target| *target != name) {
					log::debug!("{} resolves to {}", name, target);
					self.builder.register(ty, Node::Alias(TypeRef::Name(target)));
					progress = true;
				} else if let Some(node) = self.parser.parse(&name).filter(|node| !matches!(node, Node::Proxy(_))) {
					self.builder.register(ty, node);
					progress = true;
				} else {
					log::debug!("no definition for {}", name);
					unresolved.push(name);
				}
			}
			if !progress {
				break;
			}
		}

		let known = self.known();
		LegacyCatalog {
			catalog: self.builder.seal(),
			parser: self.parser,
			resolvers: self.resolvers,
			known,
			unresolved,
			skipped: self.skipped,
		}
	}
}

/// Sealed legacy types, looked up by name.
#[derive(Debug)]
pub struct LegacyCatalog {
	catalog: Catalog,
	parser: TypeParser,
	resolvers: ResolverChain,
	known: KnownNames,
	unresolved: Vec<String>,
	skipped: Vec<String>,
}

impl LegacyCatalog {
	pub fn catalog(&self) -> &Catalog {
		&self.catalog
	}

	/// Referenced names no definition or resolver could account for.
	pub fn unresolved(&self) -> &[String] {
		&self.unresolved
	}

	/// Names whose definitions were rejected while registering.
	pub fn skipped(&self) -> &[String] {
		&self.skipped
	}

	pub fn contains(&self, name: &str) -> bool {
		self.known.contains(name)
	}

	/// The registered name `name` stands for, if any.
	pub fn resolve_name(&self, name: &str) -> Option<String> {
		if self.known.contains(name) {
			return Some(name.to_string());
		}
		self.resolvers.resolve(name, &self.known).filter(|target| self.known.contains(target))
	}

	/// The node for a registered name, a name the resolvers map onto one, or a
	/// type expression such as `Vec<(AccountId, u32)>`.
	pub fn lookup(&self, name: &str) -> Result<Cow<'_, Node>, Error> {
		if let Some(node) = self.resolve_name(name).and_then(|name| self.catalog.get(&TypeRef::Name(name))) {
			return Ok(Cow::Borrowed(node));
		}
		match self.parser.parse(name) {
			Some(Node::Proxy(_)) | None => Err(Error::UnknownType(name.to_string())),
			Some(mut node) => {
				self.resolve_refs(&mut node);
				Ok(Cow::Owned(node))
			}
		}
	}

	/// Point references inside a freshly parsed node at registered names.
	fn resolve_refs(&self, node: &mut Node) {
		match node {
			Node::Proxy(TypeRef::Name(name)) | Node::Alias(TypeRef::Name(name)) => {
				if let Some(target) = self.resolve_name(name) {
					*name = target;
				}
			}
			Node::Struct(fields) => fields.iter_mut().for_each(|f| self.resolve_refs(&mut f.ty)),
			Node::Enum(e) => e.variants.iter_mut().for_each(|v| self.resolve_refs(&mut v.payload)),
			Node::Tuple(items) => items.iter_mut().for_each(|i| self.resolve_refs(i)),
			Node::Vector(inner) | Node::FixedArray(inner, _) | Node::Option(inner) | Node::Compact(inner) => {
				self.resolve_refs(inner)
			}
			_ => {}
		}
	}

	pub fn encode(&self, name: &str, value: &Value) -> Result<Vec<u8>, Error> {
		let node = self.lookup(name)?;
		let mut out = ByteWriter::new();
		encode_node(&self.catalog, &node, value, &mut out)?;
		Ok(out.into_bytes())
	}

	/// Decode from the front of `bytes`, returning the value and the number of bytes it took up.
	pub fn decode(&self, name: &str, bytes: &[u8]) -> Result<(Value, usize), Error> {
		let node = self.lookup(name)?;
		let mut input = ByteReader::new(bytes);
		let value = decode_node(&self.catalog, &node, &mut input)?;
		Ok((value, input.position()))
	}

	/// Decode a value that must take up all of `bytes`.
	pub fn decode_exact(&self, name: &str, bytes: &[u8]) -> Result<Value, Error> {
		let (value, consumed) = self.decode(name, bytes)?;
		if consumed != bytes.len() {
			return Err(descale_core::Error::TrailingBytes(bytes.len() - consumed).into());
		}
		Ok(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use descale_core::Primitive;
	use serde_json::json;

	#[test]
	fn registering_twice_keeps_the_first_definition() {
		let mut types = LegacyTypes::new().without_builtins();
		assert_eq!(types.register("Balance", &json!("u128")).unwrap(), &Node::Primitive(Primitive::U128));
		assert_eq!(types.register("Balance", &json!("u64")).unwrap(), &Node::Primitive(Primitive::U128));
		assert_eq!(types.len(), 1);
	}

	#[test]
	fn rejected_definitions_are_not_registered() {
		let mut types = LegacyTypes::new().without_builtins();
		let err = types.register("Broken", &json!({"field": 7})).unwrap_err();
		assert!(matches!(err, Error::NoMatchingFactory { .. }));
		assert!(!types.contains("Broken"));

		let registered = types.register_json(r#"{"Good": "u8", "Bad": "Vec<"}"#).unwrap();
		assert_eq!(registered, 1);
		assert_eq!(types.skipped(), &["Bad".to_string()]);
	}

	#[test]
	fn accepts_every_json_layout() {
		let mut flat = LegacyTypes::new().without_builtins();
		assert_eq!(flat.register_json(r#"{"A": "u8", "B": "u16"}"#).unwrap(), 2);

		let mut wrapped = LegacyTypes::new().without_builtins();
		assert_eq!(wrapped.register_json(r#"{"types": {"A": "u8"}}"#).unwrap(), 1);

		let mut modules = LegacyTypes::new().without_builtins();
		let json = r#"{"balances": {"types": {"A": "u8"}}, "system": {"types": {"B": "u8", "C": "u8"}}}"#;
		assert_eq!(modules.register_json(json).unwrap(), 3);

		assert!(matches!(LegacyTypes::new().register_json("[1]"), Err(Error::ExpectedObject(_))));
	}

	#[test]
	fn sealing_resolves_missing_names() {
		let mut types = LegacyTypes::new().without_builtins();
		types.register_json(r#"{
			"Balance": "u128",
			"Transfer": { "amount": "T::Balance", "ids": "Vec<AccountIdOf<T>>", "other": "Unknown" }
		}"#)
		.unwrap();
		let catalog = types.seal();

		assert_eq!(catalog.catalog().get(&"T::Balance".into()), Some(&Node::Alias("Balance".into())));
		// the table maps it even though `AccountId` is missing
		assert_eq!(catalog.catalog().get(&"AccountIdOf<T>".into()), Some(&Node::Alias("AccountId".into())));
		assert!(catalog.unresolved().contains(&"Unknown".to_string()));
		assert!(catalog.unresolved().contains(&"AccountId".to_string()));
	}

	#[test]
	fn looks_up_expressions() {
		let mut types = LegacyTypes::new().without_builtins();
		types.register("Balance", &json!("u128")).unwrap();
		let catalog = types.seal();

		assert_eq!(catalog.lookup("Balance").unwrap().as_ref(), &Node::Primitive(Primitive::U128));
		assert_eq!(catalog.lookup("balance").unwrap().as_ref(), &Node::Primitive(Primitive::U128));
		assert_eq!(
			catalog.lookup("Vec<T::Balance>").unwrap().into_owned(),
			Node::Vector(Box::new(Node::proxy("Balance")))
		);
		assert!(matches!(catalog.lookup("Missing"), Err(Error::UnknownType(_))));

		let bytes = catalog.encode("Vec<T::Balance>", &Value::Seq(vec![Value::UInt(1)])).unwrap();
		assert_eq!(bytes.len(), 1 + 16);
		// 128 bit integers decode to decimal strings
		assert_eq!(catalog.decode_exact("Vec<T::Balance>", &bytes).unwrap(), Value::Seq(vec![Value::Str("1".into())]));
	}

	#[cfg(feature = "default_definitions")]
	#[test]
	fn user_definitions_take_precedence_over_bundled_ones() {
		let mut types = LegacyTypes::new();
		types.register("Balance", &json!("u64")).unwrap();
		let catalog = types.seal();
		assert_eq!(catalog.lookup("Balance").unwrap().as_ref(), &Node::Primitive(Primitive::U64));
		assert!(catalog.contains("AccountInfo"));
		assert!(catalog.skipped().is_empty());
	}
}
