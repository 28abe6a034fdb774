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

use crate::Error;
use descale_common::SpecVersion;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Type definitions for a chain, with overrides that only apply to some runtime versions.
///
/// ```json
/// {
///     "types": { "Weight": "u32" },
///     "versioned": [
///         { "minmax": [1050, null], "types": { "Weight": "u64" } }
///     ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBundle {
	#[serde(default)]
	pub types: Map<String, JsonValue>,
	#[serde(default)]
	pub versioned: Vec<VersionedTypes>,
}

/// Definitions for an inclusive range of spec versions. A missing bound is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedTypes {
	pub minmax: [Option<SpecVersion>; 2],
	#[serde(default)]
	pub types: Map<String, JsonValue>,
}

impl VersionedTypes {
	pub fn applies_to(&self, spec: SpecVersion) -> bool {
		match self.minmax {
			[Some(min), Some(max)] => (min..=max).contains(&spec),
			[Some(min), None] => spec >= min,
			[None, Some(max)] => spec <= max,
			[None, None] => true,
		}
	}
}

impl TypeBundle {
	pub fn from_json(json: &str) -> Result<Self, Error> {
		serde_json::from_str(json).map_err(Into::into)
	}

	/// The definitions in effect for `spec`. Overrides are applied in the
	/// order they are listed, so later ones win.
	pub fn types_for(&self, spec: SpecVersion) -> Map<String, JsonValue> {
		let mut types = self.types.clone();
		for overrides in self.versioned.iter().filter(|v| v.applies_to(spec)) {
			for (name, definition) in &overrides.types {
				types.insert(name.clone(), definition.clone());
			}
		}
		types
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	const BUNDLE: &str = r#"
	{
		"types": { "Weight": "u32", "Keys": "(AccountId, AccountId)" },
		"versioned": [
			{ "minmax": [null, 1019], "types": { "Keys": "AccountId" } },
			{ "minmax": [1050, null], "types": { "Weight": "u64" } },
			{ "minmax": [1060, 1070], "types": { "Weight": "u128" } }
		]
	}
	"#;

	#[test]
	fn picks_overrides_by_version() {
		let bundle = TypeBundle::from_json(BUNDLE).unwrap();

		let early = bundle.types_for(1000);
		assert_eq!(early["Keys"], json!("AccountId"));
		assert_eq!(early["Weight"], json!("u32"));

		assert_eq!(bundle.types_for(1049)["Weight"], json!("u32"));
		assert_eq!(bundle.types_for(1050)["Weight"], json!("u64"));
		assert_eq!(bundle.types_for(1065)["Weight"], json!("u128"));
		assert_eq!(bundle.types_for(1070)["Weight"], json!("u128"));
		assert_eq!(bundle.types_for(1071)["Weight"], json!("u64"));
		assert_eq!(bundle.types_for(1071)["Keys"], json!("(AccountId, AccountId)"));
	}

	#[test]
	fn missing_sections_are_empty() {
		let bundle = TypeBundle::from_json("{}").unwrap();
		assert!(bundle.types_for(1).is_empty());
		assert!(TypeBundle::from_json("[]").is_err());
	}
}
