//! Record node: named, ordered children, encode/decode by field name.
//!
//! Grounded on [`crate::node`]'s general child-window shape and, for the
//! loop over children in declaration order, on `bitcraft::schema::Schema::
//! parse`'s loop over `self.fields` — generalized from a flat field list
//! (teacher) to a nested node tree whose children can depend on each other.

use crate::error::{CodecError, PathSegment};
use crate::node::Node;
use crate::value::Value;

/// Where a child's decode/encode args come from.
#[derive(Debug, Clone)]
pub enum ArgSource {
    /// No args (scalars, fixed-width primitives, nested composites with
    /// their own self-contained framing).
    None,
    /// A fixed, schema-time-known args list.
    Fixed(Vec<usize>),
    /// Use an earlier sibling's decoded value as `args[0]`. The sibling
    /// must appear before this child and decode to an unsigned integer.
    /// Canonical example: a `length` field configures the following `bytes`
    /// field.
    FromField(String),
}

/// One child of a [`Record`]: its field name, schema, and where its args
/// come from.
#[derive(Debug)]
pub struct RecordChild {
    pub name: String,
    pub node: Node,
    pub args: ArgSource,
}

impl RecordChild {
    pub fn new(name: impl Into<String>, node: Node) -> Self {
        RecordChild {
            name: name.into(),
            node,
            args: ArgSource::None,
        }
    }

    pub fn with_args(name: impl Into<String>, node: Node, args: ArgSource) -> Self {
        RecordChild {
            name: name.into(),
            node,
            args,
        }
    }
}

#[derive(Debug)]
pub struct Record {
    pub children: Vec<RecordChild>,
}

impl Record {
    pub fn new(children: Vec<RecordChild>) -> Result<Self, crate::error::CompileError> {
        let mut seen = std::collections::HashSet::new();
        for child in &children {
            if child.name.is_empty() || !seen.insert(child.name.clone()) {
                return Err(crate::error::CompileError::InvalidFieldName);
            }
        }
        Ok(Record { children })
    }

    fn resolve_args(
        &self,
        index: usize,
        decoded: &[(String, Value)],
    ) -> Result<Vec<usize>, CodecError> {
        match &self.children[index].args {
            ArgSource::None => Ok(Vec::new()),
            ArgSource::Fixed(args) => Ok(args.clone()),
            ArgSource::FromField(field) => {
                let value = decoded
                    .iter()
                    .find(|(k, _)| k == field)
                    .map(|(_, v)| v)
                    .ok_or_else(|| {
                        CodecError::LengthMismatch(format!(
                            "dependent field `{field}` not yet decoded"
                        ))
                    })?;
                let len = value.as_u64().ok_or_else(|| {
                    CodecError::LengthMismatch(format!(
                        "dependent field `{field}` is not an unsigned integer"
                    ))
                })?;
                Ok(vec![len as usize])
            }
        }
    }

    /// Decodes children in the half-open index range `[start, end)`,
    /// appending to `partial` (a "child window"). Returns the number of
    /// bytes consumed by this window.
    pub fn decode_window(
        &self,
        buf: &[u8],
        offset: usize,
        start: usize,
        end: usize,
        partial: &mut Vec<(String, Value)>,
    ) -> Result<usize, CodecError> {
        let mut cursor = offset;
        for index in start..end {
            let child = &self.children[index];
            let args = self.resolve_args(index, partial)?;
            let (value, n) = child
                .node
                .decode_with_args(buf, cursor, &args)
                .map_err(|e| e.with_segment(PathSegment::Field(child.name.clone())))?;
            partial.push((child.name.clone(), value));
            cursor += n;
        }
        Ok(cursor - offset)
    }

    pub fn decode(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), CodecError> {
        let mut partial = Vec::with_capacity(self.children.len());
        let n = self.decode_window(buf, offset, 0, self.children.len(), &mut partial)?;
        Ok((Value::Map(partial), n))
    }

    /// Encodes children `[start, end)` from `input`, looking each up by name.
    pub fn encode_window(
        &self,
        input: &Value,
        start: usize,
        end: usize,
    ) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();

        for index in start..end {
            let child = &self.children[index];
            let value = match input.field(&child.name) {
                Some(value) => value,
                None => child
                    .node
                    .default_value()
                    .ok_or_else(|| CodecError::MissingField(child.name.clone()))?,
            };
            out.extend(
                child
                    .node
                    .encode(value)
                    .map_err(|e| e.with_segment(PathSegment::Field(child.name.clone())))?,
            );
        }
        Ok(out)
    }

    pub fn encode(&self, input: &Value) -> Result<Vec<u8>, CodecError> {
        self.encode_window(input, 0, self.children.len())
    }
}
