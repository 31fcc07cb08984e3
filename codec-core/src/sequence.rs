//! Packs/unpacks a positional list of primitive `(type, value[, args])`
//! tuples into/from a contiguous byte sequence.
//!
//! This is the flat, name-free analogue of what a [`crate::node::Node`]
//! composite does for schema trees: it exists so callers that just want "a
//! handful of primitives back to back" (a numeric-header-plus-array packet, or a
//! quick wire-format prototype) don't need to build a full `Record`/`Tuple`
//! node tree first.

use crate::error::CodecError;
use crate::primitive::{self, PrimitiveType};
use crate::value::Value;

/// One entry in a sequence: a primitive type, its value (on encode) or a
/// placeholder (on decode), and optional args (length/count for
/// length-dependent primitives).
pub struct SeqEntry {
    pub ty: PrimitiveType,
    pub args: Vec<usize>,
}

impl SeqEntry {
    pub fn new(ty: PrimitiveType) -> Self {
        SeqEntry { ty, args: Vec::new() }
    }

    pub fn with_args(ty: PrimitiveType, args: Vec<usize>) -> Self {
        SeqEntry { ty, args }
    }
}

/// Encodes `values` against `entries` in order, concatenating each
/// primitive's bytes with no framing between them.
pub fn pack(entries: &[SeqEntry], values: &[Value]) -> Result<Vec<u8>, CodecError> {
    if entries.len() != values.len() {
        return Err(CodecError::LengthMismatch(format!(
            "sequence has {} entries but {} values were supplied",
            entries.len(),
            values.len()
        )));
    }

    let mut out = Vec::new();
    for (entry, value) in entries.iter().zip(values) {
        out.extend(primitive::encode(&entry.ty, value)?);
    }
    Ok(out)
}

/// Decodes `buf` starting at `offset` against `entries` in order, returning
/// the decoded values and the total bytes consumed.
pub fn unpack(
    entries: &[SeqEntry],
    buf: &[u8],
    offset: usize,
) -> Result<(Vec<Value>, usize), CodecError> {
    let mut cursor = offset;
    let mut values = Vec::with_capacity(entries.len());

    for entry in entries {
        let (value, n) = primitive::decode(&entry.ty, buf, cursor, &entry.args)?;
        values.push(value);
        cursor += n;
    }

    Ok((values, cursor - offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Endian;

    #[test]
    fn cstr_then_int_array() {
        let entries = vec![
            SeqEntry::new(PrimitiveType::CStr),
            SeqEntry::with_args(
                PrimitiveType::Array(Box::new(PrimitiveType::I2(Endian::Big))),
                vec![3],
            ),
        ];
        let values = vec![
            Value::Str("creeper".to_string()),
            Value::Seq(vec![Value::I64(-2822), Value::I64(992), Value::I64(3)]),
        ];

        let bytes = pack(&entries, &values).unwrap();
        assert_eq!(
            bytes,
            vec![
                0x63, 0x72, 0x65, 0x65, 0x70, 0x65, 0x72, 0x00, 0xF4, 0xFA, 0x03, 0xE0, 0x00, 0x03
            ]
        );

        let (decoded, n) = unpack(&entries, &bytes, 0).unwrap();
        assert_eq!(decoded, values);
        assert_eq!(n, bytes.len());
    }
}
