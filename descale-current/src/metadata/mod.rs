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

//! Decode SCALE encoded runtime metadata (V14 and V15) into a table of
//! pallets and a catalog of every type it describes.

mod readonly_array;
mod storage;
mod version_14;
mod version_15;

pub use readonly_array::ReadonlyArray;
pub use storage::{StorageEntry, StorageEntryKind, StorageHasher, StorageModifier};

use crate::{MapperConfig, MetadataError};
use codec::Decode;
use descale_core::{ByteReader, Catalog, Node, TypeRef, Value, Variant};
use frame_metadata::{RuntimeMetadata, RuntimeMetadataPrefixed};
use scale_info::PortableRegistry;
use serde::Serialize;

/// Runtime metadata from a scale-info based node, ready to encode and decode
/// any type it mentions.
#[derive(Debug, Clone)]
pub struct Metadata {
	version: u32,
	types: PortableRegistry,
	catalog: Catalog,
	pallets: ReadonlyArray<PalletMetadata>,
	extrinsic: ExtrinsicMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PalletMetadata {
	pub name: String,
	pub index: u8,
	pub storage: Option<PalletStorage>,
	/// Type id of the enum of calls.
	pub calls: Option<u32>,
	pub event: Option<u32>,
	pub error: Option<u32>,
	pub constants: Vec<PalletConstant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PalletStorage {
	/// Usually, but not necessarily, the pallet name.
	pub prefix: String,
	pub entries: Vec<StorageEntry>,
}

/// A constant and its SCALE encoded value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PalletConstant {
	pub name: String,
	pub ty: u32,
	pub value: Vec<u8>,
}

/// The shape of extrinsics on the chain. V14 metadata only names the
/// extrinsic type, so the part types are taken from its type parameters
/// when they are there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtrinsicMetadata {
	pub version: u8,
	pub address: Option<u32>,
	pub call: Option<u32>,
	pub signature: Option<u32>,
	pub extra: Option<u32>,
	pub signed_extensions: Vec<SignedExtension>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedExtension {
	pub identifier: String,
	pub ty: u32,
	pub additional_signed: u32,
}

impl Metadata {
	/// Decode metadata as returned by the `state_getMetadata` RPC call,
	/// mapping its types with the default [`MapperConfig`].
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, MetadataError> {
		Self::from_bytes_with(bytes, &MapperConfig::default())
	}

	pub fn from_bytes_with(bytes: &[u8], config: &MapperConfig) -> Result<Self, MetadataError> {
		log::trace!("Decoding metadata");
		let meta = RuntimeMetadataPrefixed::decode(&mut &*bytes)?;
		Self::from_runtime_metadata(meta.1, config)
	}

	pub fn from_runtime_metadata(metadata: RuntimeMetadata, config: &MapperConfig) -> Result<Self, MetadataError> {
		match metadata {
			RuntimeMetadata::V14(meta_v14) => {
				log::trace!("V14 metadata found.");
				version_14::decode(meta_v14, config)
			}
			RuntimeMetadata::V15(meta_v15) => {
				log::trace!("V15 metadata found.");
				version_15::decode(meta_v15, config)
			}
			unsupported_meta => Err(MetadataError::UnsupportedVersion(unsupported_meta.version())),
		}
	}

	pub(crate) fn new(
		version: u32,
		types: PortableRegistry,
		pallets: Vec<PalletMetadata>,
		extrinsic: ExtrinsicMetadata,
		config: &MapperConfig,
	) -> Result<Self, MetadataError> {
		let catalog = config.build_catalog(&types)?;
		log::debug!("metadata v{} with {} pallets and {} catalog entries", version, pallets.len(), catalog.len());
		Ok(Metadata { version, types, catalog, pallets: pallets.into(), extrinsic })
	}

	/// The metadata version this was decoded from.
	pub fn version(&self) -> u32 {
		self.version
	}

	/// Return a reference to the [`scale_info`] type registry.
	pub fn types(&self) -> &PortableRegistry {
		&self.types
	}

	/// Every type of the registry, by id and by path where the path is unambiguous.
	pub fn catalog(&self) -> &Catalog {
		&self.catalog
	}

	pub fn pallets(&self) -> &[PalletMetadata] {
		&self.pallets
	}

	pub fn pallet_by_name(&self, name: &str) -> Option<&PalletMetadata> {
		self.pallets.iter().find(|p| p.name == name)
	}

	pub fn pallet_by_index(&self, index: u8) -> Option<&PalletMetadata> {
		self.pallets.iter().find(|p| p.index == index)
	}

	/// Return details about the type of extrinsic supported by this metadata.
	pub fn extrinsic(&self) -> &ExtrinsicMetadata {
		&self.extrinsic
	}

	pub fn signed_extension_identifiers(&self) -> impl Iterator<Item = &str> {
		self.extrinsic.signed_extensions.iter().map(|e| e.identifier.as_str())
	}

	/// Given the `u8` indexes of a pallet and one of its calls, return the
	/// pallet name and the call's case of the calls enum.
	pub fn call_variant(&self, pallet: u8, call: u8) -> Option<(&str, &Variant)> {
		let pallet = self.pallet_by_index(pallet)?;
		match self.catalog.lookup(&TypeRef::Id(pallet.calls?)).ok()? {
			Node::Enum(calls) => Some((pallet.name.as_str(), calls.by_index(u32::from(call))?)),
			_ => None,
		}
	}

	fn pallet(&self, name: &str) -> Result<&PalletMetadata, MetadataError> {
		self.pallet_by_name(name).ok_or_else(|| MetadataError::PalletNotFound(name.to_string()))
	}

	/// Decode the value of a pallet constant.
	pub fn constant(&self, pallet: &str, name: &str) -> Result<Value, MetadataError> {
		let constant = self.pallet(pallet)?.constants.iter().find(|c| c.name == name).ok_or_else(|| {
			MetadataError::ConstantNotFound { pallet: pallet.to_string(), name: name.to_string() }
		})?;
		Ok(descale_core::decode_exact(&self.catalog, &TypeRef::Id(constant.ty), &constant.value)?)
	}

	/// Encode `value` as the type `ty`, a type id or a type path.
	pub fn encode<T: Into<TypeRef>>(&self, ty: T, value: &Value) -> Result<Vec<u8>, MetadataError> {
		Ok(descale_core::encode(&self.catalog, &ty.into(), value)?)
	}

	/// Decode a `ty` from the front of `bytes`, also returning how many bytes it took.
	pub fn decode<T: Into<TypeRef>>(&self, ty: T, bytes: &[u8]) -> Result<(Value, usize), MetadataError> {
		Ok(descale_core::decode_bytes(&self.catalog, &ty.into(), bytes)?)
	}

	/// Like [`Metadata::decode`], failing unless `bytes` holds exactly one `ty`.
	pub fn decode_exact<T: Into<TypeRef>>(&self, ty: T, bytes: &[u8]) -> Result<Value, MetadataError> {
		Ok(descale_core::decode_exact(&self.catalog, &ty.into(), bytes)?)
	}

	pub(crate) fn decode_node_exact(&self, node: &Node, bytes: &[u8]) -> Result<Value, MetadataError> {
		let mut input = ByteReader::new(bytes);
		let value = descale_core::decode_node(&self.catalog, node, &mut input)?;
		if !input.is_empty() {
			return Err(descale_core::Error::TrailingBytes(input.remaining()).into());
		}
		Ok(value)
	}
}
