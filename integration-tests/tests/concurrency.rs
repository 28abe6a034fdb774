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

use crate::scale_info_types::{metadata, AccountData, AccountInfo};
use codec::Encode;
use descale::Value;
use descale_current::Metadata;
use descale_legacy::LegacyTypes;
use std::{sync::Arc, thread};

#[test]
fn sealed_catalogs_are_shared_across_threads() {
	let _ = pretty_env_logger::try_init();
	let current = Arc::new(Metadata::from_bytes(&metadata()).unwrap());
	let legacy = Arc::new(LegacyTypes::new().seal());

	let handles: Vec<_> = (0..8u32)
		.map(|i| {
			let current = Arc::clone(&current);
			let legacy = Arc::clone(&legacy);
			thread::spawn(move || {
				let data = AccountData { free: u128::from(i), reserved: 0, misc_frozen: 0, fee_frozen: 0 };
				let data_bytes = data.encode();
				let bytes = AccountInfo { nonce: i, data }.encode();
				let value = current.decode_storage_value("System", "Account", &bytes).unwrap();
				assert_eq!(current.encode("AccountInfo", &value).unwrap(), bytes);

				// the bundled legacy `AccountData` has the same layout and the same camel case names
				let Value::Map(fields) = &value else { panic!("struct decodes to a map") };
				assert_eq!(legacy.decode_exact("AccountData", &data_bytes).unwrap(), fields["data"]);

				let nonce = legacy.encode("Index", &Value::UInt(u64::from(i))).unwrap();
				assert_eq!(nonce, i.encode());
				value
			})
		})
		.collect();

	for (i, handle) in handles.into_iter().enumerate() {
		let value = handle.join().unwrap();
		let Value::Map(fields) = value else { panic!("struct decodes to a map") };
		assert_eq!(fields["nonce"], Value::UInt(i as u64));
	}
}
