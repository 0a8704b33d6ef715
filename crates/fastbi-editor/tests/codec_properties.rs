//! Property-based tests for the YAML text form
//!
//! For any configuration mapping, serializing and parsing it back yields the
//! same mapping, and formatting already formatted text changes nothing.

use fastbi_editor::{deserialize, serialize, validate, Mapping};
use proptest::prelude::*;
use serde_yaml::Value;

/// Strategy for configuration keys, including ones YAML would misread unquoted
fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Z][A-Z_]{0,12}",
        "[a-z][a-z0-9_.-]{0,12}",
        Just("true".to_string()),
        Just("null".to_string()),
        Just("123".to_string()),
    ]
}

/// Strategy for leaf values
fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        (-1.0e6f64..1.0e6).prop_map(|f| Value::Number(f.into())),
        "[ -~]{0,24}".prop_map(Value::String),
        Just(Value::String("yes".to_string())),
        Just(Value::String("0755".to_string())),
        Just(Value::String("line one\nline two".to_string())),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Sequence),
            prop::collection::vec((key_strategy(), inner), 0..4).prop_map(|entries| {
                let mut mapping = Mapping::new();
                for (key, value) in entries {
                    mapping.insert(Value::String(key), value);
                }
                Value::Mapping(mapping)
            }),
        ]
    })
}

fn mapping_strategy() -> impl Strategy<Value = Mapping> {
    prop::collection::vec((key_strategy(), value_strategy()), 0..6).prop_map(|entries| {
        let mut mapping = Mapping::new();
        for (key, value) in entries {
            mapping.insert(Value::String(key), value);
        }
        mapping
    })
}

proptest! {
    #[test]
    fn prop_serialize_round_trips(content in mapping_strategy()) {
        let text = serialize(&content);
        prop_assert!(validate(&text).valid);
        prop_assert_eq!(deserialize(&text).unwrap(), content);
    }

    #[test]
    fn prop_format_is_idempotent(content in mapping_strategy()) {
        let once = serialize(&deserialize(&serialize(&content)).unwrap());
        let twice = serialize(&deserialize(&once).unwrap());
        prop_assert_eq!(once, twice);
    }
}
