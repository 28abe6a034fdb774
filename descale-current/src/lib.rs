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

//! Types for runtimes that describe themselves with scale-info (metadata V14 and V15).
//!
//! [`Metadata::from_bytes`] decodes the metadata blob, maps every type of its
//! registry into a [`descale_core::Catalog`] and keeps a table of the pallets,
//! their storage, constants and calls, and the extrinsic format.
//!
//! ```no_run
//! # fn main() -> Result<(), descale_current::MetadataError> {
//! let bytes = std::fs::read("node_metadata.scale").expect("metadata file");
//! let metadata = descale_current::Metadata::from_bytes(&bytes)?;
//! let existential_deposit = metadata.constant("Balances", "ExistentialDeposit")?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod error;
mod mapper;
pub mod metadata;

pub use error::MetadataError;
pub use mapper::{
	BitFlagsMapper, CamelCaseMapper, IdentityMapper, MapperConfig, NameMapper, OptionMapper, TypeMapper,
	WrapperAliasMapper,
};
pub use metadata::{
	ExtrinsicMetadata, Metadata, PalletConstant, PalletMetadata, PalletStorage, SignedExtension, StorageEntry,
	StorageEntryKind, StorageHasher, StorageModifier,
};

/// Re-exported so that callers can build registries and metadata without
/// depending on the same versions themselves.
pub use frame_metadata;
pub use scale_info;
