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

use descale_current::MetadataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Legacy(#[from] descale_legacy::Error),
	#[error(transparent)]
	Metadata(#[from] MetadataError),
	#[error("not runtime metadata: the `meta` magic is missing")]
	NotMetadata,
	#[error("metadata version {0} is not supported")]
	UnsupportedMetadata(u8),
	#[error("metadata version {0} predates scale-info; register JSON type definitions for it instead")]
	LegacyMetadata(u8),
	#[error("Spec Version {0} not registered with decoder")]
	SpecVersionNotFound(u32),
}
