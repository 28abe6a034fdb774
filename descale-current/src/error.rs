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

use thiserror::Error;

/// Errors building [`crate::Metadata`] or querying it.
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
	#[error("metadata version {0} is not supported")]
	UnsupportedVersion(u32),
	#[error(transparent)]
	Codec(#[from] codec::Error),
	#[error("could not find type with ID {0}")]
	TypeNotFound(u32),
	#[error("type {id} is a bit sequence with an unsupported store or order type")]
	InvalidBitSequence { id: u32 },
	#[error("no pallet named {0}")]
	PalletNotFound(String),
	#[error("pallet {pallet} has no storage entry {entry}")]
	StorageNotFound { pallet: String, entry: String },
	#[error("pallet {pallet} has no constant {name}")]
	ConstantNotFound { pallet: String, name: String },
	#[error("storage entry takes at most {expected} keys, got {got}")]
	StorageKeyCount { expected: usize, got: usize },
	#[error(transparent)]
	Core(#[from] descale_core::Error),
}
