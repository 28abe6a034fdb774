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

//! Storage entries and the keys they live under.

use super::{Metadata, PalletStorage};
use crate::MetadataError;
use descale_common::Hasher;
use descale_core::{ByteWriter, Node, TypeRef, Value};
use serde::Serialize;

/// The hashers a storage map can apply to its keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StorageHasher {
	Blake2_128,
	Blake2_256,
	Blake2_128Concat,
	Twox128,
	Twox256,
	Twox64Concat,
	Identity,
}

impl StorageHasher {
	pub fn hasher(&self) -> Hasher {
		match self {
			StorageHasher::Blake2_128 => Hasher::Blake2_128,
			StorageHasher::Blake2_256 => Hasher::Blake2_256,
			StorageHasher::Blake2_128Concat => Hasher::Blake2_128Concat,
			StorageHasher::Twox128 => Hasher::Twox128,
			StorageHasher::Twox256 => Hasher::Twox256,
			StorageHasher::Twox64Concat => Hasher::Twox64Concat,
			StorageHasher::Identity => Hasher::Identity,
		}
	}
}

/// Whether a missing entry reads as `None` or as the default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StorageModifier {
	Optional,
	Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StorageEntryKind {
	Plain(u32),
	/// One hasher per key. With several hashers `key` is a tuple with an
	/// element for each of them.
	Map { hashers: Vec<StorageHasher>, key: u32, value: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageEntry {
	pub name: String,
	pub modifier: StorageModifier,
	pub kind: StorageEntryKind,
	/// The encoded value of the entry when it is not set.
	pub default: Vec<u8>,
}

impl StorageEntry {
	/// The type id of the stored value.
	pub fn value_ty(&self) -> u32 {
		match self.kind {
			StorageEntryKind::Plain(ty) => ty,
			StorageEntryKind::Map { value, .. } => value,
		}
	}
}

impl Metadata {
	fn storage(&self, pallet: &str, entry: &str) -> Result<(&PalletStorage, &StorageEntry), MetadataError> {
		let not_found = || MetadataError::StorageNotFound { pallet: pallet.to_string(), entry: entry.to_string() };
		let storage = self.pallet(pallet)?.storage.as_ref().ok_or_else(not_found)?;
		let found = storage.entries.iter().find(|e| e.name == entry).ok_or_else(not_found)?;
		Ok((storage, found))
	}

	pub fn storage_entry(&self, pallet: &str, entry: &str) -> Result<&StorageEntry, MetadataError> {
		self.storage(pallet, entry).map(|(_, entry)| entry)
	}

	/// Build the key of a storage entry: `twox128(prefix) ++ twox128(entry)`
	/// followed by each key encoded and hashed with its hasher.
	///
	/// Fewer keys than the map has hashers give the prefix shared by every
	/// item under the keys that were given.
	pub fn storage_key(&self, pallet: &str, entry: &str, keys: &[Value]) -> Result<Vec<u8>, MetadataError> {
		let (storage, entry) = self.storage(pallet, entry)?;
		let mut out = Hasher::Twox128.hash(storage.prefix.as_bytes());
		out.extend(Hasher::Twox128.hash(entry.name.as_bytes()));

		let (hashers, key) = match &entry.kind {
			StorageEntryKind::Plain(_) if keys.is_empty() => return Ok(out),
			StorageEntryKind::Plain(_) => return Err(MetadataError::StorageKeyCount { expected: 0, got: keys.len() }),
			StorageEntryKind::Map { hashers, key, .. } => (hashers, *key),
		};
		if keys.len() > hashers.len() {
			return Err(MetadataError::StorageKeyCount { expected: hashers.len(), got: keys.len() });
		}

		let key_types = if hashers.len() == 1 {
			vec![Node::Proxy(TypeRef::Id(key))]
		} else {
			match self.catalog.lookup(&TypeRef::Id(key))? {
				Node::Tuple(items) if items.len() == hashers.len() => items.clone(),
				other => {
					return Err(descale_core::Error::ShapeMismatch {
						expected: format!("a tuple of {} keys", hashers.len()),
						got: other.kind().to_string(),
					}
					.into())
				}
			}
		};

		for ((value, hasher), ty) in keys.iter().zip(hashers).zip(&key_types) {
			let mut encoded = ByteWriter::new();
			descale_core::encode_node(&self.catalog, ty, value, &mut encoded)?;
			out.extend(hasher.hasher().hash(encoded.as_bytes()));
		}
		log::trace!("storage key for {}.{} with {} keys", storage.prefix, entry.name, keys.len());
		Ok(out)
	}

	/// Decode the bytes stored under an entry.
	pub fn decode_storage_value(&self, pallet: &str, entry: &str, bytes: &[u8]) -> Result<Value, MetadataError> {
		let entry = self.storage_entry(pallet, entry)?;
		self.decode_exact(entry.value_ty(), bytes)
	}

	/// Decode the value an entry reads as when nothing is stored. That is
	/// [`Value::Null`] for optional entries.
	pub fn storage_default(&self, pallet: &str, entry: &str) -> Result<Value, MetadataError> {
		let entry = self.storage_entry(pallet, entry)?;
		let value = Node::Proxy(TypeRef::Id(entry.value_ty()));
		match entry.modifier {
			StorageModifier::Optional => self.decode_node_exact(&Node::Option(Box::new(value)), &entry.default),
			StorageModifier::Default => self.decode_node_exact(&value, &entry.default),
		}
	}
}
