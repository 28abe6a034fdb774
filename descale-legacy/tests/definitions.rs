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

use codec::{Compact, Encode};
use descale_core::Value;
use descale_legacy::{Error, LegacyTypes, TypeBundle};

const CHAIN_TYPES: &str = r#"
{
	"types": {
		"Keys": "(AccountId, AccountId)",
		"ProxyType": { "_enum": { "Any": 0, "NonTransfer": 1, "Staking": 3 } },
		"ProxyDefinition": { "delegate": "AccountId", "proxyType": "ProxyType", "delay": "T::BlockNumber" },
		"Weight": "u32"
	},
	"versioned": [
		{ "minmax": [2000, null], "types": { "Weight": "u64" } }
	]
}
"#;

fn catalog(spec: u32) -> descale_legacy::LegacyCatalog {
	let _ = pretty_env_logger::try_init();
	let bundle = TypeBundle::from_json(CHAIN_TYPES).unwrap();
	let mut types = LegacyTypes::new();
	types.register_bundle(&bundle, spec);
	types.seal()
}

#[derive(Encode)]
struct AccountData {
	free: u128,
	reserved: u128,
	misc_frozen: u128,
	fee_frozen: u128,
}

#[derive(Encode)]
struct AccountInfo {
	nonce: u32,
	consumers: u32,
	providers: u32,
	sufficients: u32,
	data: AccountData,
}

#[test]
fn bundled_account_info() {
	let catalog = catalog(1000);
	let data = AccountData { free: 10, reserved: 0, misc_frozen: 0, fee_frozen: 0 };
	let typed = AccountInfo { nonce: 1, consumers: 0, providers: 1, sufficients: 0, data };

	let value = Value::map([
		("nonce", Value::UInt(1)),
		("consumers", Value::UInt(0)),
		("providers", Value::UInt(1)),
		("sufficients", Value::UInt(0)),
		(
			"data",
			Value::map([
				("free", Value::UInt(10)),
				("reserved", Value::UInt(0)),
				("misc_frozen", Value::UInt(0)),
				("fee_frozen", Value::UInt(0)),
			]),
		),
	]);
	let bytes = catalog.encode("AccountInfo", &value).unwrap();
	assert_eq!(bytes, typed.encode());

	let decoded = catalog.decode_exact("AccountInfo", &bytes).unwrap();
	match &decoded {
		Value::Map(fields) => {
			assert_eq!(fields["nonce"], Value::UInt(1));
			let Value::Map(data) = &fields["data"] else { panic!("data is a struct") };
			// declared names are kept on the way out
			assert_eq!(data["miscFrozen"], Value::Str("0".into()));
			assert_eq!(data["free"], Value::Str("10".into()));
		}
		other => panic!("expected a map, got {}", other),
	}
}

#[test]
fn vec_u8_is_bytes() {
	let catalog = catalog(1000);
	let bytes = catalog.encode("Vec<u8>", &Value::Str("0x0102".into())).unwrap();
	assert_eq!(bytes, vec![1u8, 2].encode());
	assert_eq!(catalog.resolve_name("Vec<u8>").as_deref(), Some("Bytes"));
	assert_eq!(catalog.decode_exact("Vec<u8>", &bytes).unwrap(), Value::bytes(&[1, 2]));
}

#[test]
fn versioned_overrides() {
	let early = catalog(1000);
	let late = catalog(2000);
	assert_eq!(early.encode("Weight", &Value::UInt(7)).unwrap(), 7u32.encode());
	assert_eq!(late.encode("Weight", &Value::UInt(7)).unwrap(), 7u64.encode());
}

#[test]
fn chain_specific_types() {
	let catalog = catalog(1000);

	let proxy = Value::map([
		("delegate", Value::bytes(&[7; 32])),
		("proxy_type", Value::Str("Staking".into())),
		("delay", Value::UInt(10)),
	]);
	let bytes = catalog.encode("ProxyDefinition", &proxy).unwrap();
	assert_eq!(bytes, ([7u8; 32], 3u8, 10u32).encode());

	let keys = catalog.encode("Keys", &Value::Seq(vec![Value::bytes(&[1; 32]), Value::bytes(&[2; 32])])).unwrap();
	assert_eq!(keys, ([1u8; 32], [2u8; 32]).encode());
}

#[test]
fn bundled_enums_and_sets() {
	let catalog = catalog(1000);

	let address = Value::variant("Index", Value::UInt(42));
	assert_eq!(catalog.encode("Address", &address).unwrap(), (1u8, Compact(42u32)).encode());
	assert_eq!(catalog.encode("<T::Lookup as StaticLookup>::Source", &address).unwrap(), (1u8, Compact(42u32)).encode());

	let err = Value::variant("Err", Value::variant("Module", Value::map([("index", Value::UInt(5)), ("error", Value::UInt(2))])));
	assert_eq!(catalog.encode("DispatchResult", &err).unwrap(), vec![1, 3, 5, 2]);
	assert_eq!(catalog.decode_exact("DispatchResult", &[0]).unwrap(), Value::Str("Ok".into()));

	let reasons = Value::Seq(vec!["Transfer".into(), "Tip".into()]);
	assert_eq!(catalog.encode("WithdrawReasons", &reasons).unwrap(), vec![18]);
	assert_eq!(catalog.decode_exact("WithdrawReasons", &[18]).unwrap(), reasons);
}

#[test]
fn unknown_names_fail() {
	let catalog = catalog(1000);
	assert!(matches!(catalog.encode("NotAType", &Value::Null), Err(Error::UnknownType(_))));
	assert!(matches!(catalog.decode("u32", &[1, 2]), Err(Error::Core(descale_core::Error::OutOfBounds { .. }))));
}
