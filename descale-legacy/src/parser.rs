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

//! Parsing of rust-like type expressions such as `Vec<(AccountId, Balance)>`.
//!
//! [`TypeParser`] recognises the outer shape of an expression with regular
//! expressions and uses a [`ComponentsParser`] to split the inside into its
//! top level parts. Names it does not recognise become [`Node::Proxy`]
//! references, to be resolved once every type is registered.

use descale_core::{EnumNode, Node, Primitive, TypeRef};
use onig::Regex;

/// Pairs of opening and closing brackets that group parts of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketMatcher {
	pairs: Vec<(char, char)>,
}

impl Default for BracketMatcher {
	fn default() -> Self {
		Self::new(vec![('<', '>'), ('(', ')'), ('[', ']')])
	}
}

impl BracketMatcher {
	pub fn new(pairs: Vec<(char, char)>) -> Self {
		Self { pairs }
	}

	fn closing_for(&self, open: char) -> Option<char> {
		self.pairs.iter().find(|(o, _)| *o == open).map(|(_, c)| *c)
	}

	fn is_closing(&self, c: char) -> bool {
		self.pairs.iter().any(|(_, close)| *close == c)
	}

	/// Every opening bracket is closed by its own kind, in order.
	pub fn is_balanced(&self, s: &str) -> bool {
		let mut stack = Vec::new();
		for c in s.chars() {
			if let Some(close) = self.closing_for(c) {
				stack.push(close);
			} else if self.is_closing(c) && stack.pop() != Some(c) {
				return false;
			}
		}
		stack.is_empty()
	}
}

/// Splits a string on a separator, ignoring separators nested inside brackets.
///
/// `"u8, (u16, u32), Vec<u64>"` splits on `,` into `["u8", "(u16, u32)", "Vec<u64>"]`.
#[derive(Debug, Clone)]
pub struct ComponentsParser {
	brackets: BracketMatcher,
	separator: char,
}

impl ComponentsParser {
	pub fn new(brackets: BracketMatcher, separator: char) -> Self {
		Self { brackets, separator }
	}

	/// Collapse newlines and runs of whitespace, then trim.
	pub fn preprocess(s: &str) -> String {
		s.split_whitespace().collect::<Vec<_>>().join(" ")
	}

	/// Split `s` into top level components. Returns `None` when brackets do not match.
	pub fn split(&self, s: &str) -> Option<Vec<String>> {
		let s = Self::preprocess(s);
		let mut stack = Vec::new();
		let mut components = Vec::new();
		let mut current = String::new();

		for c in s.chars() {
			if c == self.separator && stack.is_empty() {
				components.push(std::mem::take(&mut current));
				continue;
			}
			if let Some(close) = self.brackets.closing_for(c) {
				stack.push(close);
			} else if self.brackets.is_closing(c) && stack.pop() != Some(c) {
				return None;
			}
			current.push(c);
		}
		if !stack.is_empty() {
			return None;
		}
		components.push(current);

		// trailing separators like `(u8,)` leave empty components behind
		Some(components.into_iter().map(|c| c.trim().to_string()).filter(|c| !c.is_empty()).collect())
	}
}

/// Turns type expressions into nodes.
pub struct TypeParser {
	brackets: BracketMatcher,
	list: ComponentsParser,
	array: ComponentsParser,
	vec: Regex,
	option: Regex,
	compact: Regex,
	boxed: Regex,
	result: Regex,
	map: Regex,
	set: Regex,
	array_decl: Regex,
	tuple: Regex,
	bit_size: Regex,
	generic: Regex,
	path: Regex,
	array_len: Regex,
}

impl std::fmt::Debug for TypeParser {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.debug_struct("TypeParser").field("brackets", &self.brackets).finish_non_exhaustive()
	}
}

impl Default for TypeParser {
	fn default() -> Self {
		Self::new()
	}
}

fn regex(pattern: &str) -> Regex {
	Regex::new(pattern).expect("Regex expressions should be infallible; qed")
}

impl TypeParser {
	pub fn new() -> Self {
		let brackets = BracketMatcher::default();
		Self {
			list: ComponentsParser::new(brackets.clone(), ','),
			array: ComponentsParser::new(brackets.clone(), ';'),
			brackets,
			vec: regex(r"^Vec<(.+)>$"),
			option: regex(r"^Option<(.+)>$"),
			compact: regex(r"^Compact<(.+)>$"),
			boxed: regex(r"^Box<(.+)>$"),
			result: regex(r"^Result<(.+)>$"),
			map: regex(r"^(?:BTreeMap|HashMap)<(.+)>$"),
			set: regex(r"^(?:BTreeSet|HashSet)<(.+)>$"),
			array_decl: regex(r"^\[(.+)\]$"),
			tuple: regex(r"^\((.*)\)$"),
			bit_size: regex(r"^(Int|UInt)<\s*(\d+)\s*(?:,\s*\w+\s*)?>$"),
			generic: regex(r"^([\w:]+)<(.+)>$"),
			path: regex(r"^(?:<[\w\s:<>,]+>::)?[\w:]+$"),
			array_len: regex(r"^\d+$"),
		}
	}

	/// The `group`th capture if `re` matches the whole of `s`.
	fn capture<'s>(re: &Regex, s: &'s str, group: usize) -> Option<&'s str> {
		re.captures(s)?.at(group)
	}

	/// The inside of a bracketed expression, when it is itself balanced.
	fn inner<'s>(&self, re: &Regex, s: &'s str) -> Option<&'s str> {
		Self::capture(re, s, 1).filter(|inner| self.brackets.is_balanced(inner))
	}

	/// Parse any type expression.
	pub fn parse(&self, s: &str) -> Option<Node> {
		let s = ComponentsParser::preprocess(s);
		if s.is_empty() {
			return None;
		}
		self.primitive(&s)
			.or_else(|| self.vector(&s))
			.or_else(|| self.option(&s))
			.or_else(|| self.compact(&s))
			.or_else(|| self.boxed(&s))
			.or_else(|| self.result(&s))
			.or_else(|| self.collection(&s))
			.or_else(|| self.fixed_array(&s))
			.or_else(|| self.tuple(&s))
			.or_else(|| self.reference(&s))
	}

	/// `u8`..`u256`, `i8`..`i256`, `bool`, `str`, and `Int<64, Name>`/`UInt<64, Name>`.
	pub fn primitive(&self, s: &str) -> Option<Node> {
		if let Some(p) = Primitive::from_name(s) {
			return Some(Node::Primitive(p));
		}
		let sign = Self::capture(&self.bit_size, s, 1)?;
		let bits = Self::capture(&self.bit_size, s, 2)?.parse::<u32>().ok()?;
		Primitive::integer(bits, sign == "Int").map(Node::Primitive)
	}

	/// `Vec<T>`
	pub fn vector(&self, s: &str) -> Option<Node> {
		let inner = self.inner(&self.vec, s)?;
		Some(Node::Vector(Box::new(self.parse(inner)?)))
	}

	/// `Option<T>`
	pub fn option(&self, s: &str) -> Option<Node> {
		let inner = self.inner(&self.option, s)?;
		Some(Node::Option(Box::new(self.parse(inner)?)))
	}

	/// `Compact<T>`
	pub fn compact(&self, s: &str) -> Option<Node> {
		let inner = self.inner(&self.compact, s)?;
		Some(Node::Compact(Box::new(self.parse(inner)?)))
	}

	/// `Box<T>` is only a memory management detail, so it parses as `T`.
	pub fn boxed(&self, s: &str) -> Option<Node> {
		let inner = self.inner(&self.boxed, s)?;
		self.parse(inner)
	}

	/// `Result<T, E>`, an enum of `Ok(T)` and `Err(E)`.
	pub fn result(&self, s: &str) -> Option<Node> {
		let inner = self.inner(&self.result, s)?;
		match self.list.split(inner)?.as_slice() {
			[ok, err] => {
				Some(Node::Enum(EnumNode::sequential([("Ok", self.parse(ok)?), ("Err", self.parse(err)?)])))
			}
			_ => None,
		}
	}

	/// Maps encode as a vector of key/value tuples, sets as a vector of items.
	pub fn collection(&self, s: &str) -> Option<Node> {
		if let Some(inner) = self.inner(&self.map, s) {
			return match self.list.split(inner)?.as_slice() {
				[k, v] => Some(Node::Vector(Box::new(Node::Tuple(vec![self.parse(k)?, self.parse(v)?])))),
				_ => None,
			};
		}
		let inner = self.inner(&self.set, s)?;
		Some(Node::Vector(Box::new(self.parse(inner)?)))
	}

	/// `[T; N]`, or `[T; N; Name]` where the trailing name is informational.
	pub fn fixed_array(&self, s: &str) -> Option<Node> {
		let inner = self.inner(&self.array_decl, s)?;
		let parts = self.array.split(inner)?;
		let (ty, len) = match parts.as_slice() {
			[ty, len] | [ty, len, _] => (ty, len),
			_ => return None,
		};
		if !self.array_len.is_match(len) {
			return None;
		}
		let len = len.parse::<u64>().ok()?;
		Some(Node::FixedArray(Box::new(self.parse(ty)?), len))
	}

	/// `(A, B, ..)`; the empty tuple `()` is [`Node::Null`].
	pub fn tuple(&self, s: &str) -> Option<Node> {
		let inner = self.inner(&self.tuple, s)?;
		let items = self.list.split(inner)?.iter().map(|c| self.parse(c)).collect::<Option<Vec<_>>>()?;
		if items.is_empty() {
			Some(Node::Null)
		} else {
			Some(Node::Tuple(items))
		}
	}

	/// A plain, path qualified or generic type name, referring to another type.
	pub fn reference(&self, s: &str) -> Option<Node> {
		self.type_name(s).map(|name| Node::Proxy(TypeRef::Name(name.to_string())))
	}

	/// Like [`TypeParser::reference`], but only checks that `s` looks like a type name.
	pub fn type_name<'s>(&self, s: &'s str) -> Option<&'s str> {
		let generic = Self::capture(&self.generic, s, 2).map_or(false, |inner| self.brackets.is_balanced(inner));
		if generic || self.path.is_match(s) {
			Some(s)
		} else {
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn prim(p: Primitive) -> Node {
		Node::Primitive(p)
	}

	fn proxy(name: &str) -> Node {
		Node::proxy(name)
	}

	#[test]
	fn splits_top_level_components() {
		let parser = ComponentsParser::new(BracketMatcher::default(), ',');
		assert_eq!(
			parser.split("u8, (u16, u32),\n  Vec<(u64, bool)>").unwrap(),
			vec!["u8".to_string(), "(u16, u32)".to_string(), "Vec<(u64, bool)>".to_string()]
		);
		assert_eq!(parser.split("u8,").unwrap(), vec!["u8".to_string()]);
		assert!(parser.split("Vec<u8").is_none());
		assert!(parser.split("(u8>").is_none());

		let arrays = ComponentsParser::new(BracketMatcher::default(), ';');
		assert_eq!(arrays.split("[u8; 2]; 4").unwrap(), vec!["[u8; 2]".to_string(), "4".to_string()]);
	}

	#[test]
	fn brackets_are_configurable() {
		let parser = ComponentsParser::new(BracketMatcher::new(vec![('{', '}')]), '|');
		assert_eq!(parser.split("a | {b | c}").unwrap(), vec!["a".to_string(), "{b | c}".to_string()]);
		assert!(BracketMatcher::default().is_balanced("Vec<(u8, [u16; 2])>"));
		assert!(!BracketMatcher::default().is_balanced("Vec<(u8>)"));
	}

	#[test]
	fn parses_primitives() {
		let parser = TypeParser::new();
		assert_eq!(parser.parse("u8"), Some(prim(Primitive::U8)));
		assert_eq!(parser.parse(" i256 "), Some(prim(Primitive::I256)));
		assert_eq!(parser.parse("String"), Some(prim(Primitive::Str)));
		assert_eq!(parser.parse("UInt<64, Balance>"), Some(prim(Primitive::U64)));
		assert_eq!(parser.parse("Int<128>"), Some(prim(Primitive::I128)));
		assert_eq!(parser.primitive("UInt<7, Odd>"), None);
	}

	#[test]
	fn parses_containers() {
		let parser = TypeParser::new();
		assert_eq!(parser.parse("Vec<u8>"), Some(Node::Vector(Box::new(prim(Primitive::U8)))));
		assert_eq!(
			parser.parse("Option<Vec<AccountId>>"),
			Some(Node::Option(Box::new(Node::Vector(Box::new(proxy("AccountId"))))))
		);
		assert_eq!(parser.parse("Compact<Balance>"), Some(Node::Compact(Box::new(proxy("Balance")))));
		assert_eq!(parser.parse("Box<T::Call>"), Some(proxy("T::Call")));
		assert_eq!(
			parser.parse("BTreeMap<Text, u32>"),
			Some(Node::Vector(Box::new(Node::Tuple(vec![proxy("Text"), prim(Primitive::U32)]))))
		);
		assert_eq!(parser.parse("BTreeSet<u16>"), Some(Node::Vector(Box::new(prim(Primitive::U16)))));
	}

	#[test]
	fn parses_results() {
		let parser = TypeParser::new();
		let expected = Node::Enum(EnumNode::sequential([
			("Ok", Node::Tuple(vec![prim(Primitive::U8), prim(Primitive::U16)])),
			("Err", proxy("DispatchError")),
		]));
		assert_eq!(parser.parse("Result<(u8, u16), DispatchError>"), Some(expected));
		assert_eq!(parser.result("Result<u8>"), None);
	}

	#[test]
	fn parses_arrays_and_tuples() {
		let parser = TypeParser::new();
		assert_eq!(parser.parse("[u8; 32]"), Some(Node::FixedArray(Box::new(prim(Primitive::U8)), 32)));
		assert_eq!(parser.parse("[u8; 20; H160]"), Some(Node::FixedArray(Box::new(prim(Primitive::U8)), 20)));
		assert_eq!(
			parser.parse("[Vec<u8>; 2]"),
			Some(Node::FixedArray(Box::new(Node::Vector(Box::new(prim(Primitive::U8)))), 2))
		);
		assert_eq!(parser.parse("[u8; N]"), None);
		assert_eq!(parser.parse("()"), Some(Node::Null));
		assert_eq!(
			parser.parse("(AccountId, [u8; 4], (bool,))"),
			Some(Node::Tuple(vec![
				proxy("AccountId"),
				Node::FixedArray(Box::new(prim(Primitive::U8)), 4),
				Node::Tuple(vec![prim(Primitive::Bool)]),
			]))
		);
	}

	#[test]
	fn parses_references() {
		let parser = TypeParser::new();
		assert_eq!(parser.parse("T::Balance"), Some(proxy("T::Balance")));
		assert_eq!(parser.parse("<T as Trait<I>>::Proposal"), Some(proxy("<T as Trait<I>>::Proposal")));
		assert_eq!(parser.parse("schedule::Period<T::BlockNumber>"), Some(proxy("schedule::Period<T::BlockNumber>")));
		assert_eq!(parser.parse("Vec<"), None);
		assert_eq!(parser.parse("!!"), None);
	}
}
