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

//! Owner of every node for one metadata version.

use crate::{Error, Node, TypeRef};
use std::collections::{hash_map::Entry, HashMap};

/// Collects nodes while a registry is being parsed.
///
/// Registering a key that is already present keeps the first node, so
/// parsing never has to look ahead to find out whether a type exists.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
	nodes: HashMap<TypeRef, Node>,
}

impl CatalogBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert `node` under `ty` unless something is already registered there.
	/// Returns whichever node ends up stored.
	pub fn register(&mut self, ty: TypeRef, node: Node) -> &Node {
		match self.nodes.entry(ty) {
			Entry::Occupied(entry) => {
				log::trace!("{} already registered", entry.key());
				entry.into_mut()
			}
			Entry::Vacant(entry) => entry.insert(node),
		}
	}

	pub fn get(&self, ty: &TypeRef) -> Option<&Node> {
		self.nodes.get(ty)
	}

	pub fn contains(&self, ty: &TypeRef) -> bool {
		self.nodes.contains_key(ty)
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn keys(&self) -> impl Iterator<Item = &TypeRef> {
		self.nodes.keys()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&TypeRef, &Node)> {
		self.nodes.iter()
	}

	/// References made by registered nodes that point at nothing registered.
	pub fn dangling(&self) -> Vec<TypeRef> {
		let mut missing = Vec::new();
		for node in self.nodes.values() {
			node.for_each_ref(&mut |r| {
				if !self.nodes.contains_key(r) && !missing.contains(r) {
					missing.push(r.clone());
				}
			});
		}
		missing.sort();
		missing
	}

	/// Freeze the builder. The result can be shared between threads.
	pub fn seal(self) -> Catalog {
		log::debug!("sealing catalog with {} types", self.nodes.len());
		Catalog { nodes: self.nodes }
	}
}

/// An immutable set of nodes, keyed by [`TypeRef`].
#[derive(Debug, Clone, Default)]
pub struct Catalog {
	nodes: HashMap<TypeRef, Node>,
}

impl Catalog {
	pub fn get(&self, ty: &TypeRef) -> Option<&Node> {
		self.nodes.get(ty)
	}

	pub fn contains(&self, ty: &TypeRef) -> bool {
		self.nodes.contains_key(ty)
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn keys(&self) -> impl Iterator<Item = &TypeRef> {
		self.nodes.keys()
	}

	/// Look up a type and follow it to a structural node.
	pub fn lookup(&self, ty: &TypeRef) -> Result<&Node, Error> {
		let node = self.get(ty).ok_or_else(|| Error::UnknownType(ty.clone()))?;
		self.resolve(node)
	}

	/// Whether a value of `node` can itself be [`Value::Null`](crate::Value::Null).
	pub(crate) fn nullable(&self, node: &Node) -> Result<bool, Error> {
		Ok(matches!(self.resolve(node)?, Node::Null | Node::Option(_)))
	}

	/// The fewest bytes any value of `node` encodes to.
	pub(crate) fn min_encoded_len(&self, node: &Node, depth: usize) -> Result<usize, Error> {
		if depth > crate::MAX_DEPTH {
			return Err(Error::RecursionLimit(crate::MAX_DEPTH));
		}
		let len = match self.resolve(node)? {
			Node::Primitive(p) => p.byte_width().unwrap_or(1),
			Node::Null => 0,
			Node::Struct(fields) => self.min_encoded_len_of(fields.iter().map(|f| &f.ty), depth)?,
			Node::Tuple(types) => self.min_encoded_len_of(types.iter(), depth)?,
			Node::FixedArray(inner, len) => {
				let len = usize::try_from(*len).unwrap_or(usize::MAX);
				self.min_encoded_len(inner, depth + 1)?.saturating_mul(len)
			}
			Node::Enum(e) => e.width.bytes(),
			Node::Set(set) => (set.bits / 8) as usize,
			Node::EnumValues(_) | Node::Vector(_) | Node::Option(_) | Node::Compact(_) | Node::BitSequence(_) => 1,
			Node::Alias(ty) | Node::Proxy(ty) => return Err(Error::UnresolvedProxy(ty.clone())),
		};
		Ok(len)
	}

	fn min_encoded_len_of<'a>(&self, mut types: impl Iterator<Item = &'a Node>, depth: usize) -> Result<usize, Error> {
		types.try_fold(0usize, |acc, ty| Ok(acc.saturating_add(self.min_encoded_len(ty, depth + 1)?)))
	}

	/// Follow `Alias` and `Proxy` links until a structural node is reached.
	///
	/// A chain can visit each catalog entry at most once before it must have
	/// looped, so chains longer than the catalog fail with [`Error::UnresolvedProxy`].
	pub fn resolve<'a>(&'a self, mut node: &'a Node) -> Result<&'a Node, Error> {
		let mut hops = 0;
		while let Node::Alias(ty) | Node::Proxy(ty) = node {
			if hops > self.nodes.len() {
				return Err(Error::UnresolvedProxy(ty.clone()));
			}
			node = self.get(ty).ok_or_else(|| Error::UnknownType(ty.clone()))?;
			hops += 1;
		}
		Ok(node)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Field, Primitive};

	#[test]
	fn register_keeps_the_first_node() {
		let mut builder = CatalogBuilder::new();
		builder.register("A".into(), Node::Primitive(Primitive::U8));
		let node = builder.register("A".into(), Node::Primitive(Primitive::U64));
		assert_eq!(node, &Node::Primitive(Primitive::U8));
		assert_eq!(builder.len(), 1);
	}

	#[test]
	fn resolves_alias_chains() {
		let mut builder = CatalogBuilder::new();
		builder.register("Balance".into(), Node::Primitive(Primitive::U128));
		builder.register("BalanceOf".into(), Node::Alias("Balance".into()));
		builder.register("Amount".into(), Node::Proxy("BalanceOf".into()));
		let catalog = builder.seal();
		assert_eq!(catalog.lookup(&"Amount".into()).unwrap(), &Node::Primitive(Primitive::U128));
	}

	#[test]
	fn alias_loops_are_reported() {
		let mut builder = CatalogBuilder::new();
		builder.register("A".into(), Node::Alias("B".into()));
		builder.register("B".into(), Node::Alias("A".into()));
		let catalog = builder.seal();
		assert!(matches!(catalog.lookup(&"A".into()), Err(Error::UnresolvedProxy(_))));
	}

	#[test]
	fn unknown_types_are_reported() {
		let mut builder = CatalogBuilder::new();
		builder.register("A".into(), Node::Struct(vec![Field::new("b", Node::proxy("Missing"))]));
		assert_eq!(builder.dangling(), vec![TypeRef::name("Missing")]);
		let catalog = builder.seal();
		assert!(matches!(catalog.lookup(&"Nope".into()), Err(Error::UnknownType(TypeRef::Name(n))) if n == "Nope"));
		assert!(matches!(catalog.resolve(&Node::proxy("Missing")), Err(Error::UnknownType(_))));
	}

	#[test]
	fn smallest_encodings() {
		let mut builder = CatalogBuilder::new();
		builder.register(
			"Pair".into(),
			Node::Struct(vec![
				Field::new("a", Node::Primitive(Primitive::U32)),
				Field::new("b", Node::Vector(Box::new(Node::Primitive(Primitive::U8)))),
			]),
		);
		builder.register("Loop".into(), Node::Tuple(vec![Node::proxy("Loop")]));
		let catalog = builder.seal();

		assert_eq!(catalog.min_encoded_len(&Node::proxy("Pair"), 0).unwrap(), 5);
		assert_eq!(catalog.min_encoded_len(&Node::FixedArray(Box::new(Node::proxy("Pair")), 3), 0).unwrap(), 15);
		assert_eq!(catalog.min_encoded_len(&Node::Tuple(vec![Node::Null, Node::Null]), 0).unwrap(), 0);
		assert!(matches!(catalog.min_encoded_len(&Node::proxy("Loop"), 0), Err(Error::RecursionLimit(_))));

		assert!(catalog.nullable(&Node::Option(Box::new(Node::Null))).unwrap());
		assert!(!catalog.nullable(&Node::proxy("Pair")).unwrap());
	}
}
