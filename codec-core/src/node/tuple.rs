//! Tuple node: positional, anonymous children. Same shape as [`super::record::Record`]
//! without field names; same child-window support.

use crate::error::{CodecError, PathSegment};
use crate::node::record::ArgSource;
use crate::node::Node;
use crate::value::Value;

#[derive(Debug)]
pub struct TupleChild {
    pub node: Node,
    pub args: ArgSource,
}

impl TupleChild {
    pub fn new(node: Node) -> Self {
        TupleChild {
            node,
            args: ArgSource::None,
        }
    }

    pub fn with_args(node: Node, args: ArgSource) -> Self {
        TupleChild { node, args }
    }
}

#[derive(Debug)]
pub struct Tuple {
    pub children: Vec<TupleChild>,
}

impl Tuple {
    pub fn new(children: Vec<TupleChild>) -> Self {
        Tuple { children }
    }

    fn resolve_args(&self, index: usize, decoded: &[Value]) -> Result<Vec<usize>, CodecError> {
        match &self.children[index].args {
            ArgSource::None => Ok(Vec::new()),
            ArgSource::Fixed(args) => Ok(args.clone()),
            ArgSource::FromField(_) => {
                // Tuples have no names; "FromField" addresses a positional
                // index encoded as a decimal string for symmetry with Record.
                let field = match &self.children[index].args {
                    ArgSource::FromField(f) => f,
                    _ => unreachable!(),
                };
                let idx: usize = field.parse().map_err(|_| {
                    CodecError::LengthMismatch(format!(
                        "tuple dependent arg `{field}` is not a positional index"
                    ))
                })?;
                let value = decoded.get(idx).ok_or_else(|| {
                    CodecError::LengthMismatch(format!("dependent index {idx} not yet decoded"))
                })?;
                let len = value.as_u64().ok_or_else(|| {
                    CodecError::LengthMismatch(format!(
                        "dependent index {idx} is not an unsigned integer"
                    ))
                })?;
                Ok(vec![len as usize])
            }
        }
    }

    pub fn decode_window(
        &self,
        buf: &[u8],
        offset: usize,
        start: usize,
        end: usize,
        partial: &mut Vec<Value>,
    ) -> Result<usize, CodecError> {
        let mut cursor = offset;
        for index in start..end {
            let args = self.resolve_args(index, partial)?;
            let (value, n) = self.children[index]
                .node
                .decode_with_args(buf, cursor, &args)
                .map_err(|e| e.with_segment(PathSegment::Index(index)))?;
            partial.push(value);
            cursor += n;
        }
        Ok(cursor - offset)
    }

    pub fn decode(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), CodecError> {
        let mut partial = Vec::with_capacity(self.children.len());
        let n = self.decode_window(buf, offset, 0, self.children.len(), &mut partial)?;
        Ok((Value::Seq(partial), n))
    }

    pub fn encode_window(
        &self,
        values: &[Value],
        start: usize,
        end: usize,
    ) -> Result<Vec<u8>, CodecError> {
        if values.len() != self.children.len() {
            return Err(CodecError::LengthMismatch(format!(
                "tuple has {} children but {} values were supplied",
                self.children.len(),
                values.len()
            )));
        }
        let mut out = Vec::new();
        for index in start..end {
            out.extend(
                self.children[index]
                    .node
                    .encode(&values[index])
                    .map_err(|e| e.with_segment(PathSegment::Index(index)))?,
            );
        }
        Ok(out)
    }

    pub fn encode(&self, input: &Value) -> Result<Vec<u8>, CodecError> {
        let values = input
            .as_seq()
            .ok_or_else(|| CodecError::UnrepresentableValue("tuple input must be a sequence".into()))?;
        self.encode_window(values, 0, self.children.len())
    }
}
