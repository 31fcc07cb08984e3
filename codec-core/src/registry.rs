//! Process-wide type registry.
//!
//! Each node kind registers itself under its type-name at first
//! instantiation; [`make`] looks a description's `kind` up and recursively
//! rebuilds a live [`crate::node::Node`] tree from a [`crate::schema_def::NodeDef`].
//! Grounded on the "class discovery by type-name" pattern, realized for a
//! statically-typed implementation as an
//! explicit function table populated at initialisation — here a
//! `HashMap<String, NodeCtor>` behind a [`std::sync::OnceLock`], written
//! only during first-use registration and read-only afterward: one-time
//! initialisation per type-name.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::error::CompileError;
use crate::node::Node;
use crate::schema_def::NodeDef;

type NodeCtor = fn(&NodeDef) -> Result<Node, CompileError>;

fn registry() -> &'static Mutex<HashMap<String, NodeCtor>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, NodeCtor>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map: HashMap<String, NodeCtor> = HashMap::new();
        map.insert("primitive".to_string(), crate::schema_def::build_primitive);
        map.insert("record".to_string(), crate::schema_def::build_record);
        map.insert("tuple".to_string(), crate::schema_def::build_tuple);
        map.insert("array".to_string(), crate::schema_def::build_array);
        map.insert("head-array".to_string(), crate::schema_def::build_head_array);
        map.insert(
            "head-primitive".to_string(),
            crate::schema_def::build_head_primitive,
        );
        map.insert("enum".to_string(), crate::schema_def::build_enum);
        Mutex::new(map)
    })
}

/// Registers a constructor under `kind`, if not already present. Node kinds
/// beyond the seven built into [`crate::schema_def`] can call this to make
/// themselves reifiable; first registration wins.
pub fn register(kind: impl Into<String>, ctor: NodeCtor) {
    let mut map = registry().lock().expect("type registry poisoned");
    map.entry(kind.into()).or_insert(ctor);
}

fn lookup(kind: &str) -> Result<NodeCtor, CompileError> {
    let map = registry().lock().expect("type registry poisoned");
    map.get(kind)
        .copied()
        .ok_or_else(|| CompileError::UnknownTypeName(kind.to_string()))
}

/// Rebuilds a live [`Node`] tree from a plain structural description,
/// dispatching on `def.kind`.
pub fn make(def: &NodeDef) -> Result<Node, CompileError> {
    let ctor = lookup(&def.kind)?;
    ctor(def)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema_def::NodeDef;
    use crate::value::Value;

    #[test]
    fn reifies_a_simple_record() {
        let def: NodeDef = serde_json::from_str(
            r#"{
                "kind": "record",
                "children": [
                    {"name": "id", "node": {"kind": "primitive", "type_name": "u4b"}}
                ]
            }"#,
        )
        .unwrap();

        let node = make(&def).unwrap();
        let bytes = node
            .encode(&Value::Map(vec![("id".to_string(), Value::U64(7))]))
            .unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 7]);
    }
}
