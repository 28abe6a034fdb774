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

use derive_more::Display;
use sp_core::hashing;

/// The hashing primitives descale needs from the outside world.
///
/// Nothing in the codec depends on these for correctness; they are only used
/// when building storage keys out of encoded values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Hasher {
	Blake2_128,
	Blake2_256,
	/// `blake2_128(data) ++ data`
	Blake2_128Concat,
	Twox128,
	Twox256,
	/// `twox_64(data) ++ data`
	Twox64Concat,
	Identity,
}

impl Hasher {
	/// Hash some bytes, returning the bytes that should appear in a storage key.
	pub fn hash(&self, data: &[u8]) -> Vec<u8> {
		match self {
			Hasher::Blake2_128 => hashing::blake2_128(data).to_vec(),
			Hasher::Blake2_256 => hashing::blake2_256(data).to_vec(),
			Hasher::Blake2_128Concat => concat(&hashing::blake2_128(data), data),
			Hasher::Twox128 => hashing::twox_128(data).to_vec(),
			Hasher::Twox256 => hashing::twox_256(data).to_vec(),
			Hasher::Twox64Concat => concat(&hashing::twox_64(data), data),
			Hasher::Identity => data.to_vec(),
		}
	}
}

fn concat(hash: &[u8], data: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(hash.len() + data.len());
	out.extend_from_slice(hash);
	out.extend_from_slice(data);
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn twox_128_matches_known_pallet_prefix() {
		assert_eq!(hex::encode(Hasher::Twox128.hash(b"Timestamp")), "f0c365c3cf59d671eb72da0e7a4113c4");
		assert_eq!(hex::encode(Hasher::Twox128.hash(b"Now")), "9f1f0515f462cdcf84e0f1d6045dfcbb");
	}

	#[test]
	fn concat_hashers_keep_the_input() {
		let key = 1000u32.to_le_bytes();
		let hashed = Hasher::Twox64Concat.hash(&key);
		assert_eq!(hex::encode(hashed), "b6ff6f7d467b87a9e8030000");

		let hashed = Hasher::Blake2_128Concat.hash(&key);
		assert_eq!(hashed.len(), 16 + 4);
		assert_eq!(&hashed[16..], &key);
	}

	#[test]
	fn hash_lengths() {
		assert_eq!(Hasher::Blake2_128.hash(b"x").len(), 16);
		assert_eq!(Hasher::Blake2_256.hash(b"x").len(), 32);
		assert_eq!(Hasher::Twox256.hash(b"x").len(), 32);
		assert_eq!(Hasher::Identity.hash(b"xyz"), b"xyz".to_vec());
	}
}
