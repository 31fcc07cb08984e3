//! Schema node algebra.
//!
//! [`Node`] is the single compiled representation for every node kind; there
//! is no separate "compile" step distinct from construction (unlike
//! `bitcraft`'s `Field` → `CompiledField` split), because none of these
//! kinds need bit-fragment pre-computation. Construction itself enforces
//! the per-kind invariants, returning [`CompileError`] the same way
//! `CompiledField::try_from` does in `bitcraft::compiled`.

pub mod array;
pub mod enum_node;
pub mod head;
pub mod record;
pub mod tuple;

use crate::error::{CodecError, CompileError};
use crate::primitive::{self, PrimitiveType};
use crate::value::Value;

use array::Array;
use enum_node::EnumNode;
use head::{HeadArray, HeadPrimitive};
use record::Record;
use tuple::Tuple;

/// A single primitive leaf node: a type plus an optional default used when
/// encoding with a missing value.
#[derive(Debug)]
pub struct PrimitiveNode {
    pub ty: PrimitiveType,
    pub default_value: Option<Value>,
    pub default_args: Vec<usize>,
}

impl PrimitiveNode {
    pub fn new(ty: PrimitiveType) -> Self {
        PrimitiveNode {
            ty,
            default_value: None,
            default_args: Vec::new(),
        }
    }

    pub fn with_default(ty: PrimitiveType, default_value: Value) -> Self {
        PrimitiveNode {
            ty,
            default_value: Some(default_value),
            default_args: Vec::new(),
        }
    }
}

/// A schema node: one of the kinds this engine's node algebra supports.
#[derive(Debug)]
pub enum Node {
    Primitive(PrimitiveNode),
    Record(Record),
    Tuple(Tuple),
    Array(Array),
    HeadArray(HeadArray),
    HeadPrimitive(HeadPrimitive),
    Enum(EnumNode),
}

impl Node {
    /// The registry key for this node's kind ("primitive" nodes use their
    /// parsed type name instead; see [`crate::registry`]).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Primitive(_) => "primitive",
            Node::Record(_) => "record",
            Node::Tuple(_) => "tuple",
            Node::Array(_) => "array",
            Node::HeadArray(_) => "head-array",
            Node::HeadPrimitive(_) => "head-primitive",
            Node::Enum(_) => "enum",
        }
    }

    /// The default value configured on this node, if any (only primitive
    /// nodes carry one; used by [`record::Record::encode`] when a field is
    /// absent from the input map).
    pub fn default_value(&self) -> Option<&Value> {
        match self {
            Node::Primitive(p) => p.default_value.as_ref(),
            _ => None,
        }
    }

    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        match self {
            Node::Primitive(p) => primitive::encode(&p.ty, value),
            Node::Record(r) => r.encode(value),
            Node::Tuple(t) => t.encode(value),
            Node::Array(a) => a.encode(value),
            Node::HeadArray(h) => h.encode(value),
            Node::HeadPrimitive(h) => h.encode(value),
            Node::Enum(e) => e.encode(value),
        }
    }

    pub fn decode(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), CodecError> {
        match self {
            Node::Primitive(p) => primitive::decode(&p.ty, buf, offset, &p.default_args),
            Node::Record(r) => r.decode(buf, offset),
            Node::Tuple(t) => t.decode(buf, offset),
            Node::Array(a) => {
                if a.hooks.is_some() {
                    a.decode_until_hooked(buf, offset)
                } else {
                    Err(CodecError::LengthMismatch(
                        "array node requires an explicit length; use decode_with_args or a head-array".into(),
                    ))
                }
            }
            Node::HeadArray(h) => h.decode(buf, offset),
            Node::HeadPrimitive(h) => h.decode(buf, offset),
            Node::Enum(e) => e.decode(buf, offset),
        }
    }

    /// Decodes with explicit args, used by [`record::Record`]/[`tuple::Tuple`]
    /// children whose length is supplied by a sibling or by a parent's own
    /// child-window logic.
    pub fn decode_with_args(
        &self,
        buf: &[u8],
        offset: usize,
        args: &[usize],
    ) -> Result<(Value, usize), CodecError> {
        match self {
            Node::Primitive(p) => {
                let effective = if args.is_empty() { &p.default_args } else { args };
                primitive::decode(&p.ty, buf, offset, effective)
            }
            Node::Array(a) => {
                if let Some(&length) = args.first() {
                    a.decode_len(buf, offset, length)
                } else {
                    self.decode(buf, offset)
                }
            }
            other => other.decode(buf, offset),
        }
    }
}

pub use array::Array as ArrayNode;
pub use enum_node::{EnumEntry, EnumNode as EnumNodeKind};
pub use head::{HeadArray as HeadArrayNode, HeadPrimitive as HeadPrimitiveNode};
pub use record::{ArgSource, Record as RecordNode, RecordChild};
pub use tuple::{Tuple as TupleNode, TupleChild};

/// Convenience constructors, one per node kind.
impl Node {
    pub fn primitive(type_name: &str) -> Result<Node, CompileError> {
        let ty = PrimitiveType::parse(type_name).map_err(|_| {
            CompileError::UnknownTypeName(type_name.to_string())
        })?;
        Ok(Node::Primitive(PrimitiveNode::new(ty)))
    }

    pub fn record(children: Vec<RecordChild>) -> Result<Node, CompileError> {
        Ok(Node::Record(Record::new(children)?))
    }

    pub fn tuple(children: Vec<TupleChild>) -> Node {
        Node::Tuple(Tuple::new(children))
    }

    pub fn array(element: Node) -> Node {
        Node::Array(Array::new(element))
    }

    pub fn head_array(head_type: &str, element: Node) -> Result<Node, CompileError> {
        let head_ty = PrimitiveType::parse(head_type)
            .map_err(|_| CompileError::UnknownTypeName(head_type.to_string()))?;
        Ok(Node::HeadArray(HeadArray::new(head_ty, element)))
    }

    pub fn head_primitive(head_type: &str, content_type: &str) -> Result<Node, CompileError> {
        let head_ty = PrimitiveType::parse(head_type)
            .map_err(|_| CompileError::UnknownTypeName(head_type.to_string()))?;
        let content_ty = PrimitiveType::parse(content_type)
            .map_err(|_| CompileError::UnknownTypeName(content_type.to_string()))?;
        Ok(Node::HeadPrimitive(HeadPrimitive::new(head_ty, content_ty)))
    }

    pub fn enum_node(
        entries: Vec<EnumEntry>,
        default: Option<Node>,
    ) -> Result<Node, CompileError> {
        Ok(Node::Enum(EnumNode::new(entries, default)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::record::ArgSource;

    #[test]
    fn record_dependent_length_field() {
        // { len: u4b, data: bytes(len) }
        let schema = Node::record(vec![
            RecordChild::new("len", Node::primitive("u4b").unwrap()),
            RecordChild::with_args(
                "data",
                Node::primitive("bytes").unwrap(),
                ArgSource::FromField("len".to_string()),
            ),
        ])
        .unwrap();

        let input = Value::Map(vec![
            ("len".to_string(), Value::U64(3)),
            ("data".to_string(), Value::Bytes(vec![1, 2, 3])),
        ]);

        let bytes = schema.encode(&input).unwrap();
        assert_eq!(bytes, vec![0x00, 0x00, 0x00, 0x03, 1, 2, 3]);

        let (decoded, n) = schema.decode(&bytes, 0).unwrap();
        assert_eq!(decoded, input);
        assert_eq!(n, bytes.len());
    }

    #[test]
    fn head_array_of_records() {
        // Player: { name: head-primitive(u1, str), scores: head-array(u1, u2b) }
        let player = Node::record(vec![
            RecordChild::new(
                "name",
                Node::head_primitive("u1", "str").unwrap(),
            ),
            RecordChild::new(
                "scores",
                Node::head_array("u1", Node::primitive("u2b").unwrap()).unwrap(),
            ),
        ])
        .unwrap();

        let roster = Node::head_array("u1", player).unwrap();

        let input = Value::Seq(vec![
            Value::Map(vec![
                ("name".to_string(), Value::Str("Ada".to_string())),
                (
                    "scores".to_string(),
                    Value::Seq(vec![Value::U64(10), Value::U64(20)]),
                ),
            ]),
            Value::Map(vec![
                ("name".to_string(), Value::Str("Max".to_string())),
                ("scores".to_string(), Value::Seq(vec![])),
            ]),
        ]);

        let bytes = roster.encode(&input).unwrap();
        let (decoded, n) = roster.decode(&bytes, 0).unwrap();
        assert_eq!(decoded, input);
        assert_eq!(n, bytes.len());
    }
}
