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

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use descale::{Decoder, SpecVersion, Value};
use std::path::PathBuf;

/// Encode and decode SCALE values with the types of a runtime.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Opts {
	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Decode hex encoded bytes and print the value as JSON
	Decode {
		#[command(flatten)]
		source: Source,
		/// A type name, a type expression like `Vec<u32>`, or a scale-info type id
		ty: String,
		/// Bytes in the form 0x1a2b3c
		bytes: String,
	},
	/// Encode a JSON value and print the bytes as hex
	Encode {
		#[command(flatten)]
		source: Source,
		ty: String,
		/// The value as JSON, e.g. '{"nonce": 1}'
		value: String,
	},
	/// Print the pallets of V14/V15 metadata as JSON
	Pallets {
		/// SCALE encoded metadata blob
		metadata: PathBuf,
	},
}

#[derive(Debug, Args)]
struct Source {
	#[command(flatten)]
	input: Input,
	/// Spec version that picks the versioned overrides of `--types`
	#[arg(long, default_value_t = 0)]
	spec: SpecVersion,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct Input {
	/// SCALE encoded V14 or V15 metadata blob
	#[arg(long)]
	metadata: Option<PathBuf>,
	/// JSON type definitions for runtimes that predate V14
	#[arg(long)]
	types: Option<PathBuf>,
}

impl Source {
	fn decoder(&self) -> anyhow::Result<Decoder> {
		let mut decoder = Decoder::new();
		if let Some(path) = &self.input.metadata {
			let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
			let kind = decoder.register_version(self.spec, &bytes)?;
			log::info!("loaded {} metadata from {}", kind, path.display());
		} else if let Some(path) = &self.input.types {
			let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
			for name in decoder.register_legacy_json(self.spec, &json)? {
				log::warn!("type {} could not be resolved", name);
			}
		}
		Ok(decoder)
	}
}

fn main() -> Result<(), anyhow::Error> {
	pretty_env_logger::init();
	let opts = Opts::parse();

	match opts.command {
		Command::Decode { source, ty, bytes } => {
			let hex = match bytes.strip_prefix("0x") {
				Some(hex) => hex,
				None => anyhow::bail!("Bytes should start with 0x"),
			};
			let bytes = match hex::decode(hex) {
				Ok(bytes) => bytes,
				Err(e) => anyhow::bail!("Cannot decode hex string into bytes: {}", e),
			};
			let (value, consumed) = source.decoder()?.decode(source.spec, &ty, &bytes)?;
			if consumed < bytes.len() {
				log::warn!("{} bytes left over after decoding {}", bytes.len() - consumed, ty);
			}
			println!("{}", serde_json::to_string_pretty(&value)?);
		}
		Command::Encode { source, ty, value } => {
			let value: Value = serde_json::from_str(&value).context("value is not valid JSON")?;
			let bytes = source.decoder()?.encode(source.spec, &ty, &value)?;
			println!("0x{}", hex::encode(bytes));
		}
		Command::Pallets { metadata } => {
			let bytes = std::fs::read(&metadata).with_context(|| format!("reading {}", metadata.display()))?;
			let mut decoder = Decoder::new();
			decoder.register_version(0, &bytes)?;
			let metadata = decoder.metadata(0).context("metadata is not scale-info based")?;
			println!("{}", serde_json::to_string_pretty(metadata.pallets())?);
		}
	}
	Ok(())
}
