//! Enum-entry and enum nodes: a closed sum over byte-literal tags.
//! Grounded on `bitcraft_transform::Transform`'s `enum_map`
//! (integer-to-label lookup), generalized from label lookup to byte-literal
//! dispatch — the tagged-variant reading of an enum for a sum-typed
//! implementation.

use crate::error::CodecError;
use crate::node::Node;
use crate::value::Value;

/// A `(scalar, byte-literal)` pair.
#[derive(Debug, Clone)]
pub struct EnumEntry {
    pub tag: Value,
    pub literal: Vec<u8>,
}

impl EnumEntry {
    pub fn new(tag: Value, literal: Vec<u8>) -> Self {
        EnumEntry { tag, literal }
    }

    fn matches_bytes(&self, buf: &[u8], offset: usize) -> bool {
        buf[offset..].starts_with(self.literal.as_slice())
    }

    fn matches_value(&self, value: &Value) -> bool {
        &self.tag == value
    }
}

/// An ordered list of [`EnumEntry`] plus an optional default fallback.
///
/// Order matters: when two entries' literals share a prefix, the
/// longest-prefix entry must be listed first. This node does not itself
/// detect misordering; it is a schema-authoring obligation.
#[derive(Debug)]
pub struct EnumNode {
    pub entries: Vec<EnumEntry>,
    pub default: Option<Box<Node>>,
}

impl EnumNode {
    pub fn new(
        entries: Vec<EnumEntry>,
        default: Option<Node>,
    ) -> Result<Self, crate::error::CompileError> {
        Ok(EnumNode {
            entries,
            default: default.map(Box::new),
        })
    }

    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        for entry in &self.entries {
            if entry.matches_value(value) {
                return Ok(entry.literal.clone());
            }
        }
        match &self.default {
            Some(default) => default.encode(value),
            None => Err(CodecError::EnumFallthrough),
        }
    }

    pub fn decode(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), CodecError> {
        for entry in &self.entries {
            if offset <= buf.len() && entry.matches_bytes(buf, offset) {
                return Ok((entry.tag.clone(), entry.literal.len()));
            }
        }
        match &self.default {
            Some(default) => default.decode(buf, offset),
            None => Err(CodecError::EnumFallthrough),
        }
    }
}
