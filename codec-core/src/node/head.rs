//! Head-array and head-primitive nodes: a length/count prefix followed by
//! content whose size that prefix determines.
//!
//! Grounded on `bitcraft`'s `ArraySpec`/`CompiledArray` shape (element
//! schema + count), with the count moved from a schema-time constant to a
//! value decoded at run time.

use crate::error::CodecError;
use crate::node::array::Array;
use crate::node::Node;
use crate::primitive::{self, PrimitiveType};
use crate::value::Value;

/// An array prefixed by an integer element count.
#[derive(Debug)]
pub struct HeadArray {
    pub head_type: PrimitiveType,
    pub array: Array,
}

impl HeadArray {
    pub fn new(head_type: PrimitiveType, element: Node) -> Self {
        HeadArray {
            head_type,
            array: Array::new(element),
        }
    }

    pub fn decode(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), CodecError> {
        let (head, head_n) = primitive::decode(&self.head_type, buf, offset, &[])?;
        let count = head.as_u64().ok_or_else(|| {
            CodecError::UnrepresentableValue("head-array count is not an unsigned integer".into())
        })? as usize;
        let (value, body_n) = self.array.decode_len(buf, offset + head_n, count)?;
        Ok((value, head_n + body_n))
    }

    pub fn encode(&self, input: &Value) -> Result<Vec<u8>, CodecError> {
        let items = input
            .as_seq()
            .ok_or_else(|| CodecError::UnrepresentableValue("head-array input must be a sequence".into()))?;
        let mut out = primitive::encode(&self.head_type, &Value::U64(items.len() as u64))?;
        out.extend(self.array.encode_window(items, 0, items.len())?);
        Ok(out)
    }
}

/// A single length-bearing primitive (`str`, `bytes`, or a numeric array)
/// prefixed by an integer length.
///
/// The head value is the *element count* for array-form content and the
/// *byte count* for `str`/`bytes` content — an explicit, deliberate split
/// rather than one uniform interpretation of the prefix.
#[derive(Debug)]
pub struct HeadPrimitive {
    pub head_type: PrimitiveType,
    pub content_type: PrimitiveType,
}

impl HeadPrimitive {
    pub fn new(head_type: PrimitiveType, content_type: PrimitiveType) -> Self {
        HeadPrimitive {
            head_type,
            content_type,
        }
    }

    fn head_value(&self, value: &Value) -> Result<u64, CodecError> {
        match &self.content_type {
            PrimitiveType::Array(_) => {
                let items = value.as_seq().ok_or_else(|| {
                    CodecError::UnrepresentableValue("head-primitive array input must be a sequence".into())
                })?;
                Ok(items.len() as u64)
            }
            PrimitiveType::Str => {
                let s = value.as_str().ok_or_else(|| {
                    CodecError::UnrepresentableValue("head-primitive str input must be a string".into())
                })?;
                Ok(s.as_bytes().len() as u64)
            }
            PrimitiveType::Bytes => {
                let b = value.as_bytes().ok_or_else(|| {
                    CodecError::UnrepresentableValue("head-primitive bytes input must be bytes".into())
                })?;
                Ok(b.len() as u64)
            }
            other => Err(CodecError::UnrepresentableValue(format!(
                "head-primitive content type `{}` is not length-bearing",
                other.name()
            ))),
        }
    }

    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let head = self.head_value(value)?;
        let mut out = primitive::encode(&self.head_type, &Value::U64(head))?;
        out.extend(primitive::encode(&self.content_type, value)?);
        Ok(out)
    }

    pub fn decode(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), CodecError> {
        let (head, head_n) = primitive::decode(&self.head_type, buf, offset, &[])?;
        let len = head.as_u64().ok_or_else(|| {
            CodecError::UnrepresentableValue("head-primitive length is not an unsigned integer".into())
        })? as usize;
        let (value, body_n) = primitive::decode(&self.content_type, buf, offset + head_n, &[len])?;
        Ok((value, head_n + body_n))
    }
}
