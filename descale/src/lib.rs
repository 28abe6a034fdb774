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

//! Facade crate for encoding and decoding with any version of metadata (V8+)
//!
//! Runtimes that describe their types with scale-info (metadata V14 and up)
//! are registered with the metadata blob alone. Older runtimes only name
//! their types, so they are registered with JSON type definitions instead.
//!
//! ```no_run
//! # fn main() -> Result<(), descale::Error> {
//! use descale::{Decoder, Value};
//!
//! let mut decoder = Decoder::new();
//! decoder.register_version(9430, &std::fs::read("polkadot_9430.scale").expect("metadata"))?;
//! decoder.register_legacy_json(1020, r#"{ "types": { "Weight": "u32" } }"#)?;
//!
//! let (value, _) = decoder.decode(1020, "Weight", &[1, 0, 0, 0])?;
//! assert_eq!(value, Value::UInt(1));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod error;
mod kind;

use descale_core::{Catalog, TypeRef};
use descale_current::Metadata;
use descale_legacy::{LegacyCatalog, LegacyTypes};
use std::{collections::HashMap, sync::Arc};

pub use self::error::Error;
pub use self::kind::MetadataKind;
pub use descale_common::SpecVersion;
pub use descale_core::Value;
pub use descale_legacy::TypeBundle;

/// The types of one runtime version.
#[derive(Debug, Clone)]
pub enum Registered {
	Current(Arc<Metadata>),
	Legacy(Arc<LegacyCatalog>),
}

impl Registered {
	pub fn catalog(&self) -> &Catalog {
		match self {
			Registered::Current(metadata) => metadata.catalog(),
			Registered::Legacy(legacy) => legacy.catalog(),
		}
	}
}

/// Encodes and decodes values with the types of whichever runtime version
/// they belong to.
///
/// Registered versions are shared behind [`Arc`]s, so a decoder is cheap to
/// clone and a registered version can be handed to other threads.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
	versions: HashMap<SpecVersion, Registered>,
}

/// Scale-info types are found by path or by id, `"12"` being the type with id 12.
fn type_ref(ty: &str) -> TypeRef {
	ty.parse().map(TypeRef::Id).unwrap_or_else(|_| TypeRef::name(ty))
}

impl Decoder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a runtime version with the decoder.
	///
	/// Only scale-info metadata can be registered this way. Older metadata is
	/// rejected with [`Error::LegacyMetadata`]; see [`Decoder::register_version_with`]
	/// and [`Decoder::register_legacy`].
	pub fn register_version(&mut self, version: SpecVersion, metadata: &[u8]) -> Result<MetadataKind, Error> {
		let kind = MetadataKind::detect(metadata)?;
		match kind {
			MetadataKind::ScaleInfo(_) => {
				let metadata = Metadata::from_bytes(metadata)?;
				self.versions.insert(version, Registered::Current(Arc::new(metadata)));
			}
			MetadataKind::Legacy(v) => return Err(Error::LegacyMetadata(v)),
		}
		log::debug!("registered spec version {} with {:?} metadata", version, kind);
		Ok(kind)
	}

	/// Register a runtime version whatever its metadata version.
	///
	/// scale-info metadata is decoded as by [`Decoder::register_version`] and
	/// `bundle` is not used. For V13 and older the metadata carries no types, so
	/// the definitions of `bundle` that apply to `version` are registered instead.
	pub fn register_version_with(
		&mut self,
		version: SpecVersion,
		metadata: &[u8],
		bundle: &TypeBundle,
	) -> Result<MetadataKind, Error> {
		match MetadataKind::detect(metadata)? {
			MetadataKind::ScaleInfo(_) => self.register_version(version, metadata),
			kind @ MetadataKind::Legacy(_) => {
				let mut types = LegacyTypes::new();
				types.register_bundle(bundle, version);
				let unresolved = self.register_legacy(version, types);
				log::debug!(
					"registered spec version {} with {:?} metadata, {} unresolved types",
					version,
					kind,
					unresolved.len()
				);
				Ok(kind)
			}
		}
	}

	/// Register already decoded metadata, for example one built with a custom
	/// [`descale_current::MapperConfig`].
	pub fn register_metadata(&mut self, version: SpecVersion, metadata: impl Into<Arc<Metadata>>) {
		self.versions.insert(version, Registered::Current(metadata.into()));
	}

	/// Seal legacy definitions and use them for `version`. Returns the names
	/// that could not be resolved; those types fail when used.
	pub fn register_legacy(&mut self, version: SpecVersion, types: LegacyTypes) -> Vec<String> {
		let catalog = types.seal();
		let unresolved = catalog.unresolved().to_vec();
		if !unresolved.is_empty() {
			log::debug!("spec version {} leaves {} types unresolved", version, unresolved.len());
		}
		self.versions.insert(version, Registered::Legacy(Arc::new(catalog)));
		unresolved
	}

	/// Register legacy definitions from a [`TypeBundle`] JSON document,
	/// applying the overrides for `version`.
	pub fn register_legacy_json(&mut self, version: SpecVersion, json: &str) -> Result<Vec<String>, Error> {
		let bundle = TypeBundle::from_json(json)?;
		let mut types = LegacyTypes::new();
		types.register_bundle(&bundle, version);
		Ok(self.register_legacy(version, types))
	}

	fn version(&self, version: SpecVersion) -> Result<&Registered, Error> {
		self.versions.get(&version).ok_or(Error::SpecVersionNotFound(version))
	}

	/// Encode `value` as the type `ty` of runtime `version`.
	pub fn encode(&self, version: SpecVersion, ty: &str, value: &Value) -> Result<Vec<u8>, Error> {
		match self.version(version)? {
			Registered::Current(metadata) => Ok(metadata.encode(type_ref(ty), value)?),
			Registered::Legacy(legacy) => Ok(legacy.encode(ty, value)?),
		}
	}

	/// Decode a `ty` of runtime `version` from the front of `bytes`, returning
	/// it with the number of bytes it took.
	pub fn decode(&self, version: SpecVersion, ty: &str, bytes: &[u8]) -> Result<(Value, usize), Error> {
		match self.version(version)? {
			Registered::Current(metadata) => Ok(metadata.decode(type_ref(ty), bytes)?),
			Registered::Legacy(legacy) => Ok(legacy.decode(ty, bytes)?),
		}
	}

	/// Like [`Decoder::decode`], but `bytes` has to hold exactly one value.
	pub fn decode_exact(&self, version: SpecVersion, ty: &str, bytes: &[u8]) -> Result<Value, Error> {
		match self.version(version)? {
			Registered::Current(metadata) => Ok(metadata.decode_exact(type_ref(ty), bytes)?),
			Registered::Legacy(legacy) => Ok(legacy.decode_exact(ty, bytes)?),
		}
	}

	pub fn has_version(&self, version: &SpecVersion) -> bool {
		self.versions.contains_key(version)
	}

	pub fn registered(&self, version: SpecVersion) -> Option<&Registered> {
		self.versions.get(&version)
	}

	/// The scale-info metadata of `version`, if that is how it was registered.
	pub fn metadata(&self, version: SpecVersion) -> Option<&Arc<Metadata>> {
		match self.versions.get(&version)? {
			Registered::Current(metadata) => Some(metadata),
			Registered::Legacy(_) => None,
		}
	}
}
