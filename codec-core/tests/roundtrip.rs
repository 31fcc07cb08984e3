//! Property-based and boundary-case round-trip tests: decoding a schema's
//! own encoded output must always reproduce the original value, byte for
//! byte and value for value.

use codec_core::node::{EnumEntry, Node, RecordChild};
use codec_core::primitive::{self, Endian, PrimitiveType};
use codec_core::value::Value;
use proptest::prelude::*;

proptest! {
    #[test]
    fn u4b_roundtrips(v in any::<u32>()) {
        let node = Node::primitive("u4b").unwrap();
        let bytes = node.encode(&Value::U64(v as u64)).unwrap();
        let (decoded, n) = node.decode(&bytes, 0).unwrap();
        prop_assert_eq!(decoded, Value::U64(v as u64));
        prop_assert_eq!(n, 4);
    }

    #[test]
    fn i4l_roundtrips(v in any::<i32>()) {
        let node = Node::primitive("i4l").unwrap();
        let bytes = node.encode(&Value::I64(v as i64)).unwrap();
        let (decoded, n) = node.decode(&bytes, 0).unwrap();
        prop_assert_eq!(decoded, Value::I64(v as i64));
        prop_assert_eq!(n, 4);
    }

    #[test]
    fn uvlq_roundtrips(v in any::<u64>()) {
        let bytes = primitive::encode_uvlq(v);
        let (decoded, n) = primitive::decode(&PrimitiveType::UVar, &bytes, 0, &[]).unwrap();
        prop_assert_eq!(decoded, Value::U64(v));
        prop_assert_eq!(n, bytes.len());
    }

    #[test]
    fn ivlq_roundtrips(v in any::<i64>()) {
        let bytes = primitive::encode_ivlq(v);
        let (decoded, n) = primitive::decode(&PrimitiveType::IVar, &bytes, 0, &[]).unwrap();
        prop_assert_eq!(decoded, Value::I64(v));
        prop_assert_eq!(n, bytes.len());
    }

    #[test]
    fn cstr_roundtrips(s in "[^\0]*") {
        let node = Node::primitive("cstr").unwrap();
        let bytes = node.encode(&Value::Str(s.clone())).unwrap();
        let (decoded, n) = node.decode(&bytes, 0).unwrap();
        prop_assert_eq!(decoded, Value::Str(s));
        prop_assert_eq!(n, bytes.len());
    }

    #[test]
    fn f8b_roundtrips(v in any::<f64>().prop_filter("NaN does not equal itself", |v| !v.is_nan())) {
        let node = Node::primitive("f8b").unwrap();
        let bytes = node.encode(&Value::F64(v)).unwrap();
        let (decoded, n) = node.decode(&bytes, 0).unwrap();
        prop_assert_eq!(decoded, Value::F64(v));
        prop_assert_eq!(n, 8);
    }
}

#[test]
fn head_array_of_zero_elements() {
    let node = Node::head_array("u1", Node::primitive("u2b").unwrap()).unwrap();
    let bytes = node.encode(&Value::Seq(vec![])).unwrap();
    assert_eq!(bytes, vec![0x00]);
    let (decoded, n) = node.decode(&bytes, 0).unwrap();
    assert_eq!(decoded, Value::Seq(vec![]));
    assert_eq!(n, 1);
}

#[test]
fn head_primitive_str_empty() {
    let node = Node::head_primitive("u1", "str").unwrap();
    let bytes = node.encode(&Value::Str(String::new())).unwrap();
    assert_eq!(bytes, vec![0x00]);
    let (decoded, n) = node.decode(&bytes, 0).unwrap();
    assert_eq!(decoded, Value::Str(String::new()));
    assert_eq!(n, 1);
}

#[test]
fn enum_longest_prefix_first_match_wins() {
    // Two entries share a prefix; the longer literal must be listed (and
    // therefore tried) first so it is not shadowed by the shorter one.
    let node = Node::enum_node(
        vec![
            EnumEntry::new(Value::Str("extended".to_string()), vec![0xFF, 0xD8, 0xFF, 0xE1]),
            EnumEntry::new(Value::Str("marker".to_string()), vec![0xFF, 0xD8]),
        ],
        None,
    )
    .unwrap();

    let (decoded, n) = node.decode(&[0xFF, 0xD8, 0xFF, 0xE1, 0x00], 0).unwrap();
    assert_eq!(decoded, Value::Str("extended".to_string()));
    assert_eq!(n, 4);

    let (decoded, n) = node.decode(&[0xFF, 0xD8, 0x00, 0x00], 0).unwrap();
    assert_eq!(decoded, Value::Str("marker".to_string()));
    assert_eq!(n, 2);
}

#[test]
fn enum_falls_through_to_default() {
    let node = Node::enum_node(
        vec![EnumEntry::new(Value::Str("soi".to_string()), vec![0xFF, 0xD8])],
        Some(Node::primitive("u1").unwrap()),
    )
    .unwrap();

    let (decoded, n) = node.decode(&[0x2A], 0).unwrap();
    assert_eq!(decoded, Value::U64(0x2A));
    assert_eq!(n, 1);
}

#[test]
fn enum_fallthrough_without_default_errors() {
    let node = Node::enum_node(
        vec![EnumEntry::new(Value::Str("soi".to_string()), vec![0xFF, 0xD8])],
        None,
    )
    .unwrap();

    assert!(node.decode(&[0x2A], 0).is_err());
}

#[test]
fn array_of_records_nested_roundtrip() {
    let element = Node::record(vec![
        RecordChild::new("tag", Node::primitive("u1").unwrap()),
        RecordChild::new("value", Node::primitive("i2b").unwrap()),
    ])
    .unwrap();
    let schema = Node::head_array("u1", element).unwrap();

    let input = Value::Seq(vec![
        Value::Map(vec![
            ("tag".to_string(), Value::U64(1)),
            ("value".to_string(), Value::I64(-2822)),
        ]),
        Value::Map(vec![
            ("tag".to_string(), Value::U64(2)),
            ("value".to_string(), Value::I64(992)),
        ]),
    ]);

    let bytes = schema.encode(&input).unwrap();
    let (decoded, n) = schema.decode(&bytes, 0).unwrap();
    assert_eq!(decoded, input);
    assert_eq!(n, bytes.len());
}

#[test]
fn big_vs_little_endian_disagree_on_byte_order() {
    let be = primitive::encode(&PrimitiveType::U2(Endian::Big), &Value::U64(0x1234)).unwrap();
    let le = primitive::encode(&PrimitiveType::U2(Endian::Little), &Value::U64(0x1234)).unwrap();
    assert_eq!(be, vec![0x12, 0x34]);
    assert_eq!(le, vec![0x34, 0x12]);
}
