//! Property-based tests for memtab-core using proptest.

use memtab_core::{Key, Value};
use proptest::prelude::*;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Boolean),
        (-4i32..4).prop_map(Value::Int32),
        (-4i64..4).prop_map(Value::Int64),
        prop_oneof![
            Just(f64::NAN),
            Just(0.0),
            Just(-0.0),
            (-4i32..4).prop_map(f64::from),
        ]
        .prop_map(Value::Float64),
        "[ab]{0,2}".prop_map(Value::String),
        (-4i64..4).prop_map(Value::DateTime),
        prop::collection::vec(0u8..3, 0..3).prop_map(Value::Bytes),
    ]
}

fn key_strategy() -> impl Strategy<Value = Key> {
    prop::collection::vec(value_strategy(), 1..3).prop_map(Key::new)
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

proptest! {
    /// Equal keys hash alike, so hash indexes find every equal key.
    #[test]
    fn equal_keys_hash_alike(a in key_strategy(), b in key_strategy()) {
        if a == b {
            prop_assert_eq!(hash_of(&a), hash_of(&b));
        }
    }

    /// Ordering agrees with equality, so ordered indexes find every equal key.
    #[test]
    fn ordering_agrees_with_equality(a in key_strategy(), b in key_strategy()) {
        prop_assert_eq!(a.cmp(&b) == Ordering::Equal, a == b);
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    }

    /// Ordering is transitive across mixed value types.
    #[test]
    fn ordering_is_transitive(a in value_strategy(), b in value_strategy(), c in value_strategy()) {
        if a <= b && b <= c {
            prop_assert!(a <= c);
        }
    }
}
