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

//! The dynamic type graph and the SCALE codec that walks it.
//!
//! A [`Catalog`] holds every [`Node`] known for one metadata version. It is
//! built with a [`CatalogBuilder`] (by `descale-legacy` or `descale-current`)
//! and then sealed, after which any number of threads can [`encode`] and
//! [`decode`] [`Value`]s against it.
//!
//! ```
//! use descale_core::{CatalogBuilder, Node, Primitive, Value};
//!
//! let mut builder = CatalogBuilder::new();
//! builder.register("Bytes".into(), Node::Vector(Box::new(Node::Primitive(Primitive::U8))));
//! let catalog = builder.seal();
//!
//! let bytes = descale_core::encode(&catalog, &"Bytes".into(), &Value::bytes(&[1, 2, 3])).unwrap();
//! assert_eq!(bytes, vec![0x0c, 1, 2, 3]);
//!
//! let (value, consumed) = descale_core::decode_bytes(&catalog, &"Bytes".into(), &bytes).unwrap();
//! assert_eq!(value, Value::bytes(&[1, 2, 3]));
//! assert_eq!(consumed, 4);
//! ```

#![forbid(unsafe_code)]

mod catalog;
pub mod compact;
mod cursor;
mod decoder;
mod encoder;
mod error;
mod node;
mod numbers;
mod value;

pub use catalog::{Catalog, CatalogBuilder};
pub use cursor::{ByteReader, ByteWriter};
pub use decoder::{decode, decode_bytes, decode_exact, decode_node};
pub use encoder::{encode, encode_node, encode_to};
pub use error::Error;
pub use node::{BitOrder, BitSequenceNode, EnumNode, Field, IndexWidth, Node, Primitive, SetNode, TypeRef, Variant};
pub use value::Value;

/// How deep values may nest before encoding or decoding gives up with
/// [`Error::RecursionLimit`].
pub const MAX_DEPTH: usize = 256;

/// The most items a sequence of zero sized elements may claim to hold.
pub const MAX_ZERO_SIZED_ITEMS: usize = 1 << 16;

/// Bytes left to read in a cursor; zero after a value that took up all of its input.
pub fn remaining(input: &ByteReader) -> usize {
	input.remaining()
}
