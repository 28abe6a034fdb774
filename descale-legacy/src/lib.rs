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

//! Types for runtimes whose metadata predates scale-info (V13 and below).
//!
//! Such metadata only names its types, so their layout has to come from
//! hand written JSON definitions in the polkadot-js style. [`LegacyTypes`]
//! turns those definitions into nodes and, once everything is registered,
//! seals them into a [`LegacyCatalog`] that encodes and decodes by type name.

#![forbid(unsafe_code)]

mod bundle;
mod error;
mod factory;
mod parser;
mod registry;
mod resolver;

pub use bundle::{TypeBundle, VersionedTypes};
pub use error::Error;
pub use factory::{Factory, FactoryChain, FactoryContext};
pub use parser::{BracketMatcher, ComponentsParser, TypeParser};
pub use registry::{LegacyCatalog, LegacyTypes};
pub use resolver::{CaseInsensitiveResolver, KnownNames, NameResolver, RegexResolver, ResolverChain, TableResolver};
