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

use dyn_clone::DynClone;
use std::fmt::Debug;

/// Renames struct fields as they are copied out of the type registry.
///
/// Field names never reach the wire, and values are matched against fields
/// without regard to case or underscores, so this only changes how decoded
/// values look.
pub trait NameMapper: DynClone + Debug + Send + Sync {
	fn field_name(&self, name: &str) -> String;
}

dyn_clone::clone_trait_object!(NameMapper);

/// `misc_frozen` becomes `miscFrozen`, the spelling the legacy definitions use.
#[derive(Debug, Clone, Copy, Default)]
pub struct CamelCaseMapper;

impl NameMapper for CamelCaseMapper {
	fn field_name(&self, name: &str) -> String {
		let mut out = String::with_capacity(name.len());
		let mut upper = false;
		for c in name.chars() {
			if c == '_' && !out.is_empty() {
				upper = true;
			} else if upper {
				out.extend(c.to_uppercase());
				upper = false;
			} else {
				out.push(c);
			}
		}
		out
	}
}

/// Keeps names as the runtime declares them.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapper;

impl NameMapper for IdentityMapper {
	fn field_name(&self, name: &str) -> String {
		name.to_string()
	}
}
