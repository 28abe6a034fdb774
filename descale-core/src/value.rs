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

//! The generic value that every type is encoded from and decoded into.
//!
//! How each kind of type maps onto a [`Value`]:
//!
//! | type | value |
//! |---|---|
//! | `bool` | `Bool` |
//! | `u8`..`u64` / `i8`..`i64` | `UInt` / `Int` |
//! | `u128`, `u256`, `i128`, `i256` | decimal `Str` (integers also accepted when encoding) |
//! | `str`, `char` | `Str` |
//! | struct | `Map` of field name to value |
//! | tuple, vector, array | `Seq` (byte collections also accept a `"0x.."` string) |
//! | enum | `Str(case)` without payload, `Map { case: payload }` otherwise |
//! | set | `Seq` of flag names |
//! | bit sequence | `Seq` of `Bool` |
//! | option | `Null` or the payload; `Seq [payload]` when the payload can itself be `Null` |

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
	Null,
	Bool(bool),
	UInt(u64),
	Int(i64),
	Str(String),
	Seq(Vec<Value>),
	Map(BTreeMap<String, Value>),
}

impl Value {
	/// Build a value for an enum case.
	pub fn variant<S: Into<String>>(name: S, payload: Value) -> Self {
		match payload {
			Value::Null => Value::Str(name.into()),
			payload => Value::Map(std::iter::once((name.into(), payload)).collect()),
		}
	}

	/// Build a struct-like value from name/value pairs.
	pub fn map<K, I>(fields: I) -> Self
	where
		K: Into<String>,
		I: IntoIterator<Item = (K, Value)>,
	{
		Value::Map(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
	}

	/// A sequence of unsigned integers, one per byte.
	pub fn bytes(bytes: &[u8]) -> Self {
		Value::Seq(bytes.iter().map(|b| Value::UInt(*b as u64)).collect())
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Str(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_u64(&self) -> Option<u64> {
		match self {
			Value::UInt(n) => Some(*n),
			Value::Int(n) if *n >= 0 => Some(*n as u64),
			_ => None,
		}
	}

	pub fn as_seq(&self) -> Option<&[Value]> {
		match self {
			Value::Seq(s) => Some(s),
			_ => None,
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// A short name for the kind of value, used in error messages.
	pub fn kind(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::UInt(_) => "unsigned integer",
			Value::Int(_) => "signed integer",
			Value::Str(_) => "string",
			Value::Seq(_) => "sequence",
			Value::Map(_) => "map",
		}
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}

impl From<u64> for Value {
	fn from(n: u64) -> Self {
		Value::UInt(n)
	}
}

impl From<i64> for Value {
	fn from(n: i64) -> Self {
		Value::Int(n)
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::Str(s.to_string())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::Str(s)
	}
}

impl From<Vec<Value>> for Value {
	fn from(v: Vec<Value>) -> Self {
		Value::Seq(v)
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Value::Null => write!(f, "null"),
			Value::Bool(b) => write!(f, "{}", b),
			Value::UInt(n) => write!(f, "{}", n),
			Value::Int(n) => write!(f, "{}", n),
			Value::Str(s) => write!(f, "{:?}", s),
			Value::Seq(items) => {
				write!(f, "[")?;
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{}", item)?;
				}
				write!(f, "]")
			}
			Value::Map(fields) => {
				write!(f, "{{")?;
				for (i, (name, value)) in fields.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{}: {}", name, value)?;
				}
				write!(f, "}}")
			}
		}
	}
}
