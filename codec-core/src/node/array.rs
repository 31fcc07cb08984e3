//! Array node: one element schema repeated `length` times, with no framing
//! between elements.
//!
//! Grounded on `bitcraft::compiled::CompiledArray::assemble`'s per-index
//! loop, generalized from a fixed compile-time `count` to a runtime length
//! (explicit or supplied by a parent) and split into a single-step
//! `decode_one` so a parent composite can drive iteration with a
//! data-dependent termination condition (see [`crate::hooks`]).

use crate::error::{CodecError, PathSegment};
use crate::hooks::{ArraySequenceHooks, SequenceEncodeStep, SequenceStep};
use crate::node::Node;
use crate::value::Value;

pub struct Array {
    pub element: Box<Node>,
    pub hooks: Option<Box<dyn ArraySequenceHooks>>,
}

impl std::fmt::Debug for Array {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Array")
            .field("element", &self.element)
            .field("hooks", &self.hooks.is_some())
            .finish()
    }
}

impl Array {
    pub fn new(element: Node) -> Self {
        Array {
            element: Box::new(element),
            hooks: None,
        }
    }

    pub fn with_hooks(element: Node, hooks: Box<dyn ArraySequenceHooks>) -> Self {
        Array {
            element: Box::new(element),
            hooks: Some(hooks),
        }
    }

    /// Decodes exactly one element at `offset`, for parents that iterate
    /// with their own termination condition.
    pub fn decode_one(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), CodecError> {
        self.element.decode(buf, offset)
    }

    /// Decodes exactly `length` elements starting at `offset`.
    pub fn decode_len(
        &self,
        buf: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<(Value, usize), CodecError> {
        let mut items = Vec::with_capacity(length);
        let mut cursor = offset;

        for index in 0..length {
            if let Some(hooks) = &self.hooks {
                match hooks.before_decode(index, buf, cursor, &items)? {
                    SequenceStep::Continue => {}
                    SequenceStep::Stop { extra, extra_bytes } => {
                        items.extend(extra);
                        cursor += extra_bytes;
                        return Ok((Value::Seq(items), cursor - offset));
                    }
                }
            }
            let (value, n) = self
                .decode_one(buf, cursor)
                .map_err(|e| e.with_segment(PathSegment::Index(index)))?;
            items.push(value);
            cursor += n;
        }

        Ok((Value::Seq(items), cursor - offset))
    }

    /// Decodes elements starting at `offset` until the attached hooks signal
    /// a stop (no fixed length known ahead of time). Requires hooks.
    pub fn decode_until_hooked(
        &self,
        buf: &[u8],
        offset: usize,
    ) -> Result<(Value, usize), CodecError> {
        let hooks = self.hooks.as_ref().ok_or_else(|| {
            CodecError::LengthMismatch(
                "decode_until_hooked requires an array with sequence hooks attached".into(),
            )
        })?;

        let mut items = Vec::new();
        let mut cursor = offset;
        let mut index = 0usize;

        loop {
            match hooks.before_decode(index, buf, cursor, &items)? {
                SequenceStep::Continue => {}
                SequenceStep::Stop { extra, extra_bytes } => {
                    items.extend(extra);
                    cursor += extra_bytes;
                    break;
                }
            }
            let (value, n) = self
                .decode_one(buf, cursor)
                .map_err(|e| e.with_segment(PathSegment::Index(index)))?;
            items.push(value);
            cursor += n;
            index += 1;
        }

        Ok((Value::Seq(items), cursor - offset))
    }

    pub fn encode_window(&self, values: &[Value], start: usize, end: usize) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        for index in start..end {
            out.extend(
                self.element
                    .encode(&values[index])
                    .map_err(|e| e.with_segment(PathSegment::Index(index)))?,
            );
        }
        Ok(out)
    }

    pub fn encode(&self, input: &Value) -> Result<Vec<u8>, CodecError> {
        let values = input
            .as_seq()
            .ok_or_else(|| CodecError::UnrepresentableValue("array input must be a sequence".into()))?;

        if self.hooks.is_none() {
            return self.encode_window(values, 0, values.len());
        }

        let hooks = self.hooks.as_ref().unwrap();
        let mut out = Vec::new();
        for index in 0..values.len() {
            match hooks.before_encode(index, values) {
                SequenceEncodeStep::Continue => {
                    out.extend(
                        self.element
                            .encode(&values[index])
                            .map_err(|e| e.with_segment(PathSegment::Index(index)))?,
                    );
                }
                SequenceEncodeStep::StopWithExtra(bytes) => {
                    out.extend(bytes);
                    break;
                }
            }
        }
        Ok(out)
    }
}
