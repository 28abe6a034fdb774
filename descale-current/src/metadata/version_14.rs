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
use frame_metadata::v14::{self, RuntimeMetadataV14};
use scale_info::{form::PortableForm, PortableRegistry};

/// Decode V14 metadata into our general Metadata struct
pub fn decode(meta: RuntimeMetadataV14, config: &MapperConfig) -> Result<Metadata, MetadataError> {
	let extrinsic = extrinsic(&meta.types, meta.extrinsic)?;
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
	Metadata::new(14, meta.types, pallets, extrinsic, config)
}

/// The address, call, signature and extra types are the type parameters of
/// `UncheckedExtrinsic`. Runtimes that use another extrinsic type may not
/// name them.
fn extrinsic(
	types: &PortableRegistry,
	extrinsic: v14::ExtrinsicMetadata<PortableForm>,
) -> Result<ExtrinsicMetadata, MetadataError> {
	let id = extrinsic.ty.id;
	let ty = types.resolve(id).ok_or(MetadataError::TypeNotFound(id))?;
	let param = |name: &str| {
		ty.type_params.iter().find(|p| p.name == name).and_then(|p| p.ty.as_ref()).map(|ty| ty.id)
	};
	Ok(ExtrinsicMetadata {
		version: extrinsic.version,
		address: param("Address"),
		call: param("Call"),
		signature: param("Signature"),
		extra: param("Extra"),
		signed_extensions: extrinsic
			.signed_extensions
			.into_iter()
			.map(|e| SignedExtension {
				identifier: e.identifier,
				ty: e.ty.id,
				additional_signed: e.additional_signed.id,
			})
			.collect(),
	})
}

fn storage(storage: v14::PalletStorageMetadata<PortableForm>) -> PalletStorage {
	let entries = storage
		.entries
		.into_iter()
		.map(|entry| StorageEntry {
			name: entry.name,
			modifier: match entry.modifier {
				v14::StorageEntryModifier::Optional => StorageModifier::Optional,
				v14::StorageEntryModifier::Default => StorageModifier::Default,
			},
			kind: match entry.ty {
				v14::StorageEntryType::Plain(ty) => StorageEntryKind::Plain(ty.id),
				v14::StorageEntryType::Map { hashers, key, value } => StorageEntryKind::Map {
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

fn hasher(hasher: &v14::StorageHasher) -> StorageHasher {
	match hasher {
		v14::StorageHasher::Blake2_128 => StorageHasher::Blake2_128,
		v14::StorageHasher::Blake2_256 => StorageHasher::Blake2_256,
		v14::StorageHasher::Blake2_128Concat => StorageHasher::Blake2_128Concat,
		v14::StorageHasher::Twox128 => StorageHasher::Twox128,
		v14::StorageHasher::Twox256 => StorageHasher::Twox256,
		v14::StorageHasher::Twox64Concat => StorageHasher::Twox64Concat,
		v14::StorageHasher::Identity => StorageHasher::Identity,
	}
}
