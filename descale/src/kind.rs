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
use derive_more::Display;
use frame_metadata::META_RESERVED;

/// Which half of descale can read a metadata blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum MetadataKind {
	/// V13 and below: types are only named.
	#[display(fmt = "legacy (V{})", _0)]
	Legacy(u8),
	/// V14 and V15.
	#[display(fmt = "scale-info (V{})", _0)]
	ScaleInfo(u8),
}

impl MetadataKind {
	/// Read the magic number and version at the front of `bytes` without
	/// decoding the rest.
	pub fn detect(bytes: &[u8]) -> Result<Self, Error> {
		match bytes {
			[a, b, c, d, version, ..] if u32::from_le_bytes([*a, *b, *c, *d]) == META_RESERVED => match *version {
				v @ 0..=13 => Ok(MetadataKind::Legacy(v)),
				v @ (14 | 15) => Ok(MetadataKind::ScaleInfo(v)),
				v => Err(Error::UnsupportedMetadata(v)),
			},
			_ => Err(Error::NotMetadata),
		}
	}

	pub fn version(&self) -> u8 {
		match self {
			MetadataKind::Legacy(v) | MetadataKind::ScaleInfo(v) => *v,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn detects_versions() {
		assert_eq!(MetadataKind::detect(b"meta\x0e").unwrap(), MetadataKind::ScaleInfo(14));
		assert_eq!(MetadataKind::detect(b"meta\x0f\x00\x01").unwrap(), MetadataKind::ScaleInfo(15));
		assert_eq!(MetadataKind::detect(b"meta\x0c").unwrap(), MetadataKind::Legacy(12));
		assert!(matches!(MetadataKind::detect(b"meta\x10"), Err(Error::UnsupportedMetadata(16))));
		assert!(matches!(MetadataKind::detect(b"atem\x0e"), Err(Error::NotMetadata)));
		assert!(matches!(MetadataKind::detect(b"meta"), Err(Error::NotMetadata)));
		assert_eq!(MetadataKind::Legacy(9).to_string(), "legacy (V9)");
	}
}
