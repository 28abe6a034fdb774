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

use crate::{Primitive, TypeRef};
use thiserror::Error;

/// Errors raised while walking a type graph to encode or decode a value.
#[derive(Debug, Clone, Error)]
pub enum Error {
	#[error("type {0} is not known")]
	UnknownType(TypeRef),
	#[error("needed {needed} bytes but only {remaining} remain")]
	OutOfBounds { needed: usize, remaining: usize },
	#[error("expected {expected}, got {got}")]
	ShapeMismatch { expected: String, got: String },
	#[error("enum case index {index} is not declared")]
	InvalidEnumCase { index: u32 },
	#[error("bit flag mapping failed: {0}")]
	InvalidBitMapping(String),
	#[error("type {0} is an alias or reference that never reaches a concrete type")]
	UnresolvedProxy(TypeRef),
	#[error("invalid option prefix {0:#04x}")]
	InvalidPrefix(u8),
	#[error("invalid boolean byte {0:#04x}")]
	InvalidBool(u8),
	#[error("{0:#x} is not a valid char")]
	InvalidChar(u32),
	#[error("string is not valid UTF-8")]
	InvalidUtf8,
	#[error("{value} does not fit into {ty}")]
	IntegerOverflow { value: String, ty: Primitive },
	#[error("could not parse {0:?} as a number")]
	InvalidNumber(String),
	#[error("type nesting is deeper than {0} levels")]
	RecursionLimit(usize),
	#[error("{len} zero sized items is more than the limit of {limit}")]
	TooManyItems { len: usize, limit: usize },
	#[error("{0} bytes left over after decoding")]
	TrailingBytes(usize),
	#[error(transparent)]
	Codec(#[from] codec::Error),
}

impl Error {
	pub(crate) fn mismatch(expected: impl Into<String>, got: &crate::Value) -> Self {
		Error::ShapeMismatch { expected: expected.into(), got: got.kind().to_string() }
	}
}
