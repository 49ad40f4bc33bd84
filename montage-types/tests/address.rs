//! Property-based tests: address string and serde round-trips.

use montage_types::{addr, Address, PortAddress};
use proptest::prelude::*;

fn arb_key() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]{0,8}"
}

fn arb_address() -> impl Strategy<Value = Address> {
    proptest::collection::vec(arb_key(), 1..6)
        .prop_map(|keys| Address::from_keys(keys).expect("non-empty by construction"))
}

proptest! {
    #[test]
    fn string_form_round_trips(address in arb_address()) {
        prop_assert!(address.is_unambiguous());
        prop_assert_eq!(Address::parse(&address.to_string()), address);
    }

    #[test]
    fn serde_round_trips_any_keys(keys in proptest::collection::vec(".*", 1..5)) {
        let address = Address::from_keys(keys).expect("non-empty by construction");
        let json = serde_json::to_string(&address).unwrap();
        let back: Address = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, address);
    }

    #[test]
    fn rest_drops_exactly_the_head(address in arb_address()) {
        match address.rest() {
            Some(rest) => {
                prop_assert_eq!(rest.len(), address.len() - 1);
                prop_assert_eq!(Address::new(address.first()).join(&rest), address);
            }
            None => prop_assert_eq!(address.len(), 1),
        }
    }
}

#[test]
fn serde_form_is_the_key_list() {
    let json = serde_json::to_value(addr!("Array", 2)).unwrap();
    assert_eq!(json, serde_json::json!(["Array", "2"]));
}

#[test]
fn empty_key_list_does_not_deserialize() {
    let result: Result<Address, _> = serde_json::from_str("[]");
    assert!(result.is_err());
}

#[test]
fn port_address_serializes_both_parts() {
    let port = PortAddress::new("ptr", addr!("user", 1));
    let json = serde_json::to_value(&port).unwrap();
    assert_eq!(json["port"], "ptr");
    assert_eq!(json["address"], serde_json::json!(["user", "1"]));
}

#[test]
fn integer_keys_use_decimal_form() {
    assert_eq!(Address::from(3usize), Address::new("3"));
    assert_eq!(addr!("a", 10).to_string(), "a_10");
}
