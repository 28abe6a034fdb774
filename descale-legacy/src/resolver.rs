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

//! Mapping type names used in metadata onto names that are actually defined.
//!
//! Runtime metadata refers to types the way the runtime source code spells
//! them (`T::Balance`, `<T as Trait<I>>::Proposal`, `BalanceOf<T>`), while
//! type definitions use bare names. Resolvers bridge the two.

use dyn_clone::DynClone;
use onig::{Captures, Regex};
use phf::phf_map;
use std::{
	collections::{HashMap, HashSet},
	fmt,
	sync::Arc,
};

/// The names a resolver may resolve to.
#[derive(Debug, Clone, Default)]
pub struct KnownNames {
	exact: HashSet<String>,
	lowercase: HashMap<String, String>,
}

impl KnownNames {
	pub fn new<I, S>(names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut known = Self::default();
		for name in names {
			known.insert(name.into());
		}
		known
	}

	pub fn insert(&mut self, name: String) {
		// first spelling wins when two names only differ in case
		self.lowercase.entry(name.to_lowercase()).or_insert_with(|| name.clone());
		self.exact.insert(name);
	}

	pub fn contains(&self, name: &str) -> bool {
		self.exact.contains(name)
	}

	/// The registered spelling of `name`, compared without case.
	pub fn find_ignore_case(&self, name: &str) -> Option<&str> {
		if let Some(exact) = self.exact.get(name) {
			return Some(exact);
		}
		self.lowercase.get(&name.to_lowercase()).map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.exact.len()
	}

	pub fn is_empty(&self) -> bool {
		self.exact.is_empty()
	}
}

/// Maps a type name that is not known onto one that is.
pub trait NameResolver: DynClone + fmt::Debug + Send + Sync {
	fn resolve(&self, name: &str, known: &KnownNames) -> Option<String>;
}

dyn_clone::clone_trait_object!(NameResolver);

/// `accountid` resolves to `AccountId` if that is defined.
#[derive(Debug, Clone, Default)]
pub struct CaseInsensitiveResolver;

impl NameResolver for CaseInsensitiveResolver {
	fn resolve(&self, name: &str, known: &KnownNames) -> Option<String> {
		known.find_ignore_case(name).map(ToString::to_string)
	}
}

static ALIASES: phf::Map<&'static str, &'static str> = phf_map! {
	"()" => "Null",
	"Vec<u8>" => "Bytes",
	"&[u8]" => "Bytes",
	"String" => "Text",
	"Box<str>" => "Text",
	"<Lookup as StaticLookup>::Source" => "LookupSource",
	"<T::Lookup as StaticLookup>::Source" => "LookupSource",
	"<T as Trait>::Call" => "Call",
	"<T as Config>::Call" => "Call",
	"Box<<T as Trait>::Call>" => "Call",
	"Box<<T as Config>::Call>" => "Call",
	"<T as Trait<I>>::Proposal" => "Proposal",
	"<T as Config<I>>::Proposal" => "Proposal",
	"Box<<T as Trait<I>>::Proposal>" => "Proposal",
	"Box<<T as Config<I>>::Proposal>" => "Proposal",
	"BalanceOf<T>" => "Balance",
	"BalanceOf<T, I>" => "Balance",
	"AccountIdOf<T>" => "AccountId",
	"BlockNumberFor<T>" => "BlockNumber",
	"MomentOf<T>" => "Moment",
};

/// A fixed table of well known spellings.
///
/// A name found in the table resolves to its entry, whether or not the
/// entry is known, so later resolvers never see it.
#[derive(Clone)]
pub struct TableResolver {
	table: &'static phf::Map<&'static str, &'static str>,
}

impl Default for TableResolver {
	fn default() -> Self {
		Self { table: &ALIASES }
	}
}

impl TableResolver {
	pub fn new(table: &'static phf::Map<&'static str, &'static str>) -> Self {
		Self { table }
	}
}

impl fmt::Debug for TableResolver {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("TableResolver").field("entries", &self.table.len()).finish()
	}
}

impl NameResolver for TableResolver {
	fn resolve(&self, name: &str, _: &KnownNames) -> Option<String> {
		self.table.get(name).map(|target| target.to_string())
	}
}

/// Strips generic parameters, trait qualifications and module paths off a
/// name, one step after another, until what is left is known.
#[derive(Clone)]
pub struct RegexResolver {
	steps: Arc<Vec<(Regex, usize)>>,
}

impl Default for RegexResolver {
	fn default() -> Self {
		let step = |pattern: &str, group: usize| {
			(Regex::new(pattern).expect("Regex expressions should be infallible; qed"), group)
		};
		Self {
			steps: Arc::new(vec![
				// `Period<()>` => `Period`
				step(r"^(.+)<\(\)>$", 1),
				// `<T as Trait<I>>::Proposal` => `Proposal`
				step(r"^<[^<>]+ as [\w:]+(?:<[\w\s,]*>)?>::(.+)$", 1),
				// `T::Balance`, `schedule::Period<..>` => `Balance`, `Period<..>`
				step(r"^(?:\w+::)+(.+)$", 1),
				// `Period<T::BlockNumber>` => `Period`
				step(r"^(\w+)<.*>$", 1),
			]),
		}
	}
}

impl fmt::Debug for RegexResolver {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("RegexResolver").field("steps", &self.steps.len()).finish()
	}
}

impl NameResolver for RegexResolver {
	fn resolve(&self, name: &str, known: &KnownNames) -> Option<String> {
		let mut current = name.trim().to_string();
		for (re, group) in self.steps.iter() {
			let stripped = re.replace(&current, |caps: &Captures| caps.at(*group).unwrap_or_default().to_string());
			if stripped == current {
				continue;
			}
			current = stripped;
			if let Some(found) = known.find_ignore_case(&current) {
				log::trace!("{} resolved to {}", name, found);
				return Some(found.to_string());
			}
		}
		None
	}
}

/// Resolvers asked in order; the first answer wins.
#[derive(Debug, Clone)]
pub struct ResolverChain {
	resolvers: Vec<Box<dyn NameResolver>>,
}

impl Default for ResolverChain {
	fn default() -> Self {
		Self::empty()
			.with(CaseInsensitiveResolver)
			.with(TableResolver::default())
			.with(RegexResolver::default())
	}
}

impl ResolverChain {
	pub fn empty() -> Self {
		Self { resolvers: Vec::new() }
	}

	/// Append a resolver, asked after all the ones already in the chain.
	pub fn with<R: NameResolver + 'static>(mut self, resolver: R) -> Self {
		self.resolvers.push(Box::new(resolver));
		self
	}

	pub fn len(&self) -> usize {
		self.resolvers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.resolvers.is_empty()
	}

	pub fn resolve(&self, name: &str, known: &KnownNames) -> Option<String> {
		self.resolvers.iter().find_map(|r| r.resolve(name, known))
	}
}
