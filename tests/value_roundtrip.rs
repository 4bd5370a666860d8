//! End-to-end properties of the value subsystem: text and binary round
//! trips, total ordering, hashing, and containment.

use proptest::prelude::*;
use std::cmp::Ordering;

use gval::codec::compare::{compare_values, deep_contains, hash_value};
use gval::codec::iterator::rebuild_via_tokens;
use gval::codec::Gtype;
use gval::{parse, render, GtypeValue};

// ── Strategies ─────────────────────────────────────────────────────

/// Scalars the text form can express (annotations included).
fn scalar_strategy() -> impl Strategy<Value = GtypeValue> {
    prop_oneof![
        Just(GtypeValue::Null),
        any::<bool>().prop_map(GtypeValue::Bool),
        any::<i64>().prop_map(GtypeValue::Integer),
        (-1.0e15..1.0e15f64).prop_map(GtypeValue::Float),
        any::<i64>().prop_map(|i| {
            GtypeValue::Numeric(rust_decimal::Decimal::new(i, (i.unsigned_abs() % 10) as u32))
        }),
        "[a-zA-Z0-9 _\\-]{0,24}".prop_map(GtypeValue::String),
        (-5_000_000_000_000i64..5_000_000_000_000i64).prop_map(GtypeValue::Timestamp),
        (-3000i32..3000i32).prop_map(GtypeValue::Date),
        (0i64..86_400_000_000i64).prop_map(GtypeValue::Time),
    ]
}

/// Nested values: scalars, arrays, objects.
fn value_strategy() -> impl Strategy<Value = GtypeValue> {
    scalar_strategy().prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(|elems| GtypeValue::Array {
                elems,
                raw_scalar: false,
            }),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6).prop_map(|map| {
                GtypeValue::Object(map.into_iter().collect())
            }),
        ]
    })
}

proptest! {
    #[test]
    fn prop_text_roundtrip(v in value_strategy()) {
        let text = render(&v);
        let back = parse(&text).unwrap();
        prop_assert_eq!(&back, &v, "text was {}", text);
    }

    #[test]
    fn prop_binary_roundtrip(v in value_strategy()) {
        let blob = Gtype::from_value(&v).unwrap();
        prop_assert_eq!(&blob.to_value().unwrap(), &v);
        // token-stream rebuild is byte-identical
        let rebuilt = rebuild_via_tokens(&blob).unwrap();
        prop_assert_eq!(blob.as_bytes(), rebuilt.as_bytes());
    }

    #[test]
    fn prop_compare_is_total_and_consistent(a in value_strategy(), b in value_strategy()) {
        let ab = compare_values(&a, &b);
        let ba = compare_values(&b, &a);
        prop_assert_eq!(ab, ba.reverse());
        prop_assert_eq!(ab == Ordering::Equal, a == b);
    }

    #[test]
    fn prop_compare_transitive(
        a in value_strategy(),
        b in value_strategy(),
        c in value_strategy(),
    ) {
        let mut items = [a, b, c];
        items.sort_by(compare_values);
        prop_assert_ne!(compare_values(&items[0], &items[1]), Ordering::Greater);
        prop_assert_ne!(compare_values(&items[1], &items[2]), Ordering::Greater);
        prop_assert_ne!(compare_values(&items[0], &items[2]), Ordering::Greater);
    }

    #[test]
    fn prop_hash_respects_equality(a in value_strategy(), b in value_strategy()) {
        if a == b {
            prop_assert_eq!(hash_value(&a, 7), hash_value(&b, 7));
        }
    }

    #[test]
    fn prop_self_containment(v in value_strategy()) {
        if matches!(v, GtypeValue::Object(_) | GtypeValue::Array { .. }) {
            prop_assert!(deep_contains(&v, &v));
        }
    }
}

// ── Concrete scenarios ─────────────────────────────────────────────

#[test]
fn test_parse_render_normalises() {
    let v = parse("[1, 2.0::numeric, null]").unwrap();
    assert_eq!(render(&v), "[1, 2.0::numeric, null]");
    let elems = v.as_array().unwrap();
    assert!(matches!(elems[0], GtypeValue::Integer(1)));
    assert!(matches!(elems[1], GtypeValue::Numeric(_)));
    assert!(matches!(elems[2], GtypeValue::Null));
}

#[test]
fn test_build_map_canonical_form() {
    let v = parse(r#"{"b": 2, "a": 1, "a": 3}"#).unwrap();
    let pairs = v.as_object().unwrap();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].0, "a");
    assert_eq!(pairs[0].1, GtypeValue::Integer(3));
    assert_eq!(pairs[1].0, "b");
    assert_eq!(pairs[1].1, GtypeValue::Integer(2));
    // the binary form searches the same canonical key block
    let blob = Gtype::from_value(&v).unwrap();
    assert_eq!(
        blob.root().find("a").unwrap(),
        Some(GtypeValue::Integer(3))
    );
}

#[test]
fn test_containment_through_nesting() {
    let doc = parse(r#"{"user": {"name": "ada", "tags": ["admin", "ops"]}, "n": 3}"#).unwrap();
    let pat = parse(r#"{"user": {"tags": ["ops"]}}"#).unwrap();
    assert!(deep_contains(&doc, &pat));
    let miss = parse(r#"{"user": {"tags": ["dev"]}}"#).unwrap();
    assert!(!deep_contains(&doc, &miss));
}

#[test]
fn test_containment_monotone_chain() {
    let a = parse(r#"{"x": {"y": 1, "z": 2}, "w": [1, 2, 3]}"#).unwrap();
    let b = parse(r#"{"x": {"y": 1, "z": 2}, "w": [1, 3]}"#).unwrap();
    let c = parse(r#"{"x": {"y": 1}}"#).unwrap();
    assert!(deep_contains(&a, &b));
    assert!(deep_contains(&b, &c));
    assert!(deep_contains(&a, &c));
}

#[test]
fn test_binary_roundtrip_with_extended_scalars() {
    let v = parse(
        r#"{"ts": "2023-06-01T10:00:00"::timestamp, "net": "10.0.0.0/8"::inet,
            "n": 1.25::numeric, "iv": "2 days"::interval}"#,
    )
    .unwrap();
    let blob = Gtype::from_value(&v).unwrap();
    assert_eq!(blob.to_value().unwrap(), v);
    let rebuilt = rebuild_via_tokens(&blob).unwrap();
    assert_eq!(blob.as_bytes(), rebuilt.as_bytes());
}

#[test]
fn test_error_positions() {
    let err = parse("{\n  \"a\": 1,\n  \"b\" 2\n}").unwrap_err();
    match err {
        gval::GraphError::Parse { line, .. } => assert_eq!(line, 3),
        other => panic!("expected parse error, got {:?}", other),
    }
}
