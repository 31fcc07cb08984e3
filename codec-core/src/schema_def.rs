//! JSON-deserializable schema description, reified into a live node tree.
//!
//! Grounded on `bitcraft::serde::{SchemaDef, FieldDef, FieldKindDef}`: the
//! same idea of a plain, `serde`-derived shape that a schema file on disk
//! compiles into live types, generalized from a flat field list to a
//! recursive [`NodeDef`] tree whose `children`/`element` entries are
//! themselves [`NodeDef`]s. [`NodeDef`] is a flat struct rather than an
//! internally-tagged enum so [`crate::registry::make`] can dispatch on
//! `def.kind` before knowing which of the optional fields apply, the same
//! way the registry looks a field's `FieldKindDef` tag up before
//! interpreting the rest of the description.

use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::node::record::ArgSource;
use crate::node::{EnumEntry, Node, PrimitiveNode, RecordChild, TupleChild};
use crate::value::Value;

/// A JSON-friendly stand-in for the scalar [`Value`] variants, used for
/// primitive default values and enum tags (the only places a description
/// needs to carry a literal value rather than a node).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ValueDef {
    Bool(bool),
    UInt(u64),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ValueDef {
    fn to_value(&self) -> Value {
        match self {
            ValueDef::Bool(b) => Value::Bool(*b),
            ValueDef::UInt(u) => Value::U64(*u),
            ValueDef::Int(i) => Value::I64(*i),
            ValueDef::Float(f) => Value::F64(*f),
            ValueDef::Str(s) => Value::Str(s.clone()),
        }
    }
}

/// Where a child's decode/encode args come from, mirroring
/// [`crate::node::record::ArgSource`] in a `serde`-friendly shape.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ArgSourceDef {
    #[default]
    None,
    Fixed {
        args: Vec<usize>,
    },
    FromField {
        field: String,
    },
}

impl ArgSourceDef {
    fn to_arg_source(&self) -> ArgSource {
        match self {
            ArgSourceDef::None => ArgSource::None,
            ArgSourceDef::Fixed { args } => ArgSource::Fixed(args.clone()),
            ArgSourceDef::FromField { field } => ArgSource::FromField(field.clone()),
        }
    }
}

/// One child of a record or tuple description. `name` is required for
/// record children and ignored for tuple children (tuples are positional).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChildDef {
    #[serde(default)]
    pub name: Option<String>,
    pub node: Box<NodeDef>,
    #[serde(default)]
    pub args: ArgSourceDef,
}

/// One `(tag, literal)` pair of an enum description.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnumEntryDef {
    pub tag: ValueDef,
    pub literal: Vec<u8>,
}

/// A plain structural description of a [`Node`], as reified from JSON by
/// [`crate::registry::make`]. Every field beyond `kind` is optional because
/// which ones apply depends on `kind`; each `build_*` function below
/// validates the subset it needs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeDef {
    pub kind: String,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub default: Option<ValueDef>,
    #[serde(default)]
    pub children: Vec<ChildDef>,
    #[serde(default)]
    pub element: Option<Box<NodeDef>>,
    #[serde(default)]
    pub head_type: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub entries: Vec<EnumEntryDef>,
    #[serde(default)]
    pub default_node: Option<Box<NodeDef>>,
}

fn required_str<'a>(
    field: Option<&'a str>,
    name: &str,
    kind: &str,
) -> Result<&'a str, CompileError> {
    field.ok_or_else(|| CompileError::MissingDefField(name.to_string(), kind.to_string()))
}

fn parse_type(name: &str) -> Result<crate::primitive::PrimitiveType, CompileError> {
    crate::primitive::PrimitiveType::parse(name).map_err(|_| CompileError::UnknownTypeName(name.to_string()))
}

pub fn build_primitive(def: &NodeDef) -> Result<Node, CompileError> {
    let type_name = required_str(def.type_name.as_deref(), "type_name", "primitive")?;
    let ty = parse_type(type_name)?;
    Ok(match &def.default {
        Some(v) => Node::Primitive(PrimitiveNode::with_default(ty, v.to_value())),
        None => Node::Primitive(PrimitiveNode::new(ty)),
    })
}

pub fn build_record(def: &NodeDef) -> Result<Node, CompileError> {
    let mut children = Vec::with_capacity(def.children.len());
    for child in &def.children {
        let name = required_str(child.name.as_deref(), "name", "record")?.to_string();
        let node = crate::registry::make(&child.node)?;
        children.push(RecordChild::with_args(name, node, child.args.to_arg_source()));
    }
    Node::record(children)
}

pub fn build_tuple(def: &NodeDef) -> Result<Node, CompileError> {
    let mut children = Vec::with_capacity(def.children.len());
    for child in &def.children {
        let node = crate::registry::make(&child.node)?;
        children.push(TupleChild::with_args(node, child.args.to_arg_source()));
    }
    Ok(Node::tuple(children))
}

pub fn build_array(def: &NodeDef) -> Result<Node, CompileError> {
    let element_def = def
        .element
        .as_deref()
        .ok_or_else(|| CompileError::MissingDefField("element".to_string(), "array".to_string()))?;
    let element = crate::registry::make(element_def)?;
    Ok(Node::array(element))
}

pub fn build_head_array(def: &NodeDef) -> Result<Node, CompileError> {
    let head_type = required_str(def.head_type.as_deref(), "head_type", "head-array")?;
    let element_def = def.element.as_deref().ok_or_else(|| {
        CompileError::MissingDefField("element".to_string(), "head-array".to_string())
    })?;
    let element = crate::registry::make(element_def)?;
    Node::head_array(head_type, element)
}

pub fn build_head_primitive(def: &NodeDef) -> Result<Node, CompileError> {
    let head_type = required_str(def.head_type.as_deref(), "head_type", "head-primitive")?;
    let content_type = required_str(def.content_type.as_deref(), "content_type", "head-primitive")?;
    Node::head_primitive(head_type, content_type)
}

pub fn build_enum(def: &NodeDef) -> Result<Node, CompileError> {
    let entries = def
        .entries
        .iter()
        .map(|entry| EnumEntry::new(entry.tag.to_value(), entry.literal.clone()))
        .collect();
    let default = match &def.default_node {
        Some(d) => Some(crate::registry::make(d)?),
        None => None,
    };
    Node::enum_node(entries, default)
}
