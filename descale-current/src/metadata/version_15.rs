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

use super::{ExtrinsicMetadata, Metadata, PalletConstant, PalletMetadata, PalletStorage, SignedExtension};
use super::{StorageEntry, StorageEntryKind, StorageHasher, StorageModifier};
use crate::{MapperConfig, MetadataError};
use frame_metadata::v15::{self, RuntimeMetadataV15};
use scale_info::form::PortableForm;

/// Decode V15 metadata. Runtime APIs and outer enums are not kept; the types
/// they refer to are in the catalog like any other.
pub fn decode(meta: RuntimeMetadataV15, config: &MapperConfig) -> Result<Metadata, MetadataError> {
	let extrinsic = ExtrinsicMetadata {
		version: meta.extrinsic.version,
		address: Some(meta.extrinsic.address_ty.id),
		call: Some(meta.extrinsic.call_ty.id),
		signature: Some(meta.extrinsic.signature_ty.id),
		extra: Some(meta.extrinsic.extra_ty.id),
		signed_extensions: meta
			.extrinsic
			.signed_extensions
			.into_iter()
			.map(|e| SignedExtension { identifier: e.identifier, ty: e.ty.id, additional_signed: e.additional_signed.id })
			.collect(),
	};
	log::trace!("V15 metadata lists {} runtime apis", meta.apis.len());
	let pallets = meta
		.pallets
		.into_iter()
		.map(|pallet| PalletMetadata {
			name: pallet.name,
			index: pallet.index,
			storage: pallet.storage.map(storage),
			calls: pallet.calls.map(|c| c.ty.id),
			event: pallet.event.map(|e| e.ty.id),
			error: pallet.error.map(|e| e.ty.id),
			constants: pallet
				.constants
				.into_iter()
				.map(|c| PalletConstant { name: c.name, ty: c.ty.id, value: c.value })
				.collect(),
		})
		.collect();
	Metadata::new(15, meta.types, pallets, extrinsic, config)
}

fn storage(storage: v15::PalletStorageMetadata<PortableForm>) -> PalletStorage {
	let entries = storage
		.entries
		.into_iter()
		.map(|entry| StorageEntry {
			name: entry.name,
			modifier: match entry.modifier {
				v15::StorageEntryModifier::Optional => StorageModifier::Optional,
				v15::StorageEntryModifier::Default => StorageModifier::Default,
			},
			kind: match entry.ty {
				v15::StorageEntryType::Plain(ty) => StorageEntryKind::Plain(ty.id),
				v15::StorageEntryType::Map { hashers, key, value } => StorageEntryKind::Map {
					hashers: hashers.iter().map(hasher).collect(),
					key: key.id,
					value: value.id,
				},
			},
			default: entry.default,
		})
		.collect();
	PalletStorage { prefix: storage.prefix, entries }
}

fn hasher(hasher: &v15::StorageHasher) -> StorageHasher {
	match hasher {
		v15::StorageHasher::Blake2_128 => StorageHasher::Blake2_128,
		v15::StorageHasher::Blake2_256 => StorageHasher::Blake2_256,
		v15::StorageHasher::Blake2_128Concat => StorageHasher::Blake2_128Concat,
		v15::StorageHasher::Twox128 => StorageHasher::Twox128,
		v15::StorageHasher::Twox256 => StorageHasher::Twox256,
		v15::StorageHasher::Twox64Concat => StorageHasher::Twox64Concat,
		v15::StorageHasher::Identity => StorageHasher::Identity,
	}
}
