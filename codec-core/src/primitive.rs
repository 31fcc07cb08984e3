//! Bit-exact encoders/decoders for the primitive type-name grammar:
//! fixed-width integers and floats, variable-length integers, booleans, and
//! the three string/byte forms (`cstr`, `str`, `bytes`).
//!
//! Type names are parsed once (at node construction) into [`PrimitiveType`],
//! not re-parsed on every encode/decode call; [`PrimitiveType::name`] renders
//! the canonical string back out for the type registry and reification.

use crate::error::CodecError;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// A parsed primitive type name, e.g. `u4l`, `iv`, `str`, `u1c`, `i2b[]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveType {
    Bool,
    CStr,
    Str,
    Bytes,
    U1,
    /// `u1c`: unsigned byte, clamped to 0..=255 on encode from a signed input.
    U1Clamp,
    I1,
    U2(Endian),
    I2(Endian),
    U4(Endian),
    I4(Endian),
    U8(Endian),
    I8(Endian),
    F4(Endian),
    F8(Endian),
    UVar,
    IVar,
    /// `T[]`: a dense, separator-free sequence of `T`.
    Array(Box<PrimitiveType>),
}

impl PrimitiveType {
    /// Parses a primitive type name per the format/width/endian grammar.
    pub fn parse(name: &str) -> Result<PrimitiveType, CodecError> {
        if let Some(elem) = name.strip_suffix("[]") {
            let elem_ty = PrimitiveType::parse(elem)?;
            return Ok(PrimitiveType::Array(Box::new(elem_ty)));
        }

        Ok(match name {
            "bool" => PrimitiveType::Bool,
            "cstr" => PrimitiveType::CStr,
            "str" => PrimitiveType::Str,
            "bytes" => PrimitiveType::Bytes,
            "u1" => PrimitiveType::U1,
            "u1c" => PrimitiveType::U1Clamp,
            "i1" => PrimitiveType::I1,
            "u2l" => PrimitiveType::U2(Endian::Little),
            "u2b" => PrimitiveType::U2(Endian::Big),
            "i2l" => PrimitiveType::I2(Endian::Little),
            "i2b" => PrimitiveType::I2(Endian::Big),
            "u4l" => PrimitiveType::U4(Endian::Little),
            "u4b" => PrimitiveType::U4(Endian::Big),
            "i4l" => PrimitiveType::I4(Endian::Little),
            "i4b" => PrimitiveType::I4(Endian::Big),
            "u8l" => PrimitiveType::U8(Endian::Little),
            "u8b" => PrimitiveType::U8(Endian::Big),
            "i8l" => PrimitiveType::I8(Endian::Little),
            "i8b" => PrimitiveType::I8(Endian::Big),
            "f4l" => PrimitiveType::F4(Endian::Little),
            "f4b" => PrimitiveType::F4(Endian::Big),
            "f8l" => PrimitiveType::F8(Endian::Little),
            "f8b" => PrimitiveType::F8(Endian::Big),
            "uv" => PrimitiveType::UVar,
            "iv" => PrimitiveType::IVar,
            other => return Err(CodecError::UnknownTypeName(other.to_string())),
        })
    }

    /// Renders the canonical type-name string, the inverse of [`Self::parse`].
    pub fn name(&self) -> String {
        match self {
            PrimitiveType::Bool => "bool".into(),
            PrimitiveType::CStr => "cstr".into(),
            PrimitiveType::Str => "str".into(),
            PrimitiveType::Bytes => "bytes".into(),
            PrimitiveType::U1 => "u1".into(),
            PrimitiveType::U1Clamp => "u1c".into(),
            PrimitiveType::I1 => "i1".into(),
            PrimitiveType::U2(e) => format!("u2{}", endian_suffix(*e)),
            PrimitiveType::I2(e) => format!("i2{}", endian_suffix(*e)),
            PrimitiveType::U4(e) => format!("u4{}", endian_suffix(*e)),
            PrimitiveType::I4(e) => format!("i4{}", endian_suffix(*e)),
            PrimitiveType::U8(e) => format!("u8{}", endian_suffix(*e)),
            PrimitiveType::I8(e) => format!("i8{}", endian_suffix(*e)),
            PrimitiveType::F4(e) => format!("f4{}", endian_suffix(*e)),
            PrimitiveType::F8(e) => format!("f8{}", endian_suffix(*e)),
            PrimitiveType::UVar => "uv".into(),
            PrimitiveType::IVar => "iv".into(),
            PrimitiveType::Array(elem) => format!("{}[]", elem.name()),
        }
    }
}

fn endian_suffix(e: Endian) -> &'static str {
    match e {
        Endian::Little => "l",
        Endian::Big => "b",
    }
}

/// Encodes `value` under `ty`. `args[0]` supplies the element count for
/// array forms when the caller wants to assert it matches `value`'s length;
/// it is otherwise unused on encode (the sequence's own length drives output).
pub fn encode(ty: &PrimitiveType, value: &Value) -> Result<Vec<u8>, CodecError> {
    match ty {
        PrimitiveType::Bool => {
            let b = match value {
                Value::Bool(b) => *b,
                other => return Err(unrepresentable(ty, other)),
            };
            Ok(vec![if b { 0x01 } else { 0x00 }])
        }

        PrimitiveType::U1 => encode_unsigned(ty, value, 1),
        PrimitiveType::I1 => encode_signed(ty, value, 1),
        PrimitiveType::U1Clamp => {
            let v = signed_or_unsigned(value).ok_or_else(|| unrepresentable(ty, value))?;
            let clamped = v.clamp(0, 255) as u8;
            Ok(vec![clamped])
        }

        PrimitiveType::U2(e) => encode_unsigned_endian(ty, value, 2, *e),
        PrimitiveType::I2(e) => encode_signed_endian(ty, value, 2, *e),
        PrimitiveType::U4(e) => encode_unsigned_endian(ty, value, 4, *e),
        PrimitiveType::I4(e) => encode_signed_endian(ty, value, 4, *e),
        PrimitiveType::U8(e) => encode_unsigned_endian(ty, value, 8, *e),
        PrimitiveType::I8(e) => encode_signed_endian(ty, value, 8, *e),

        PrimitiveType::F4(e) => {
            let f = as_f64(value).ok_or_else(|| unrepresentable(ty, value))? as f32;
            let bytes = f.to_bits().to_be_bytes();
            Ok(order_bytes(&bytes, *e))
        }
        PrimitiveType::F8(e) => {
            let f = as_f64(value).ok_or_else(|| unrepresentable(ty, value))?;
            let bytes = f.to_bits().to_be_bytes();
            Ok(order_bytes(&bytes, *e))
        }

        PrimitiveType::UVar => {
            let v = value.as_u64().ok_or_else(|| unrepresentable(ty, value))?;
            Ok(encode_uvlq(v))
        }
        PrimitiveType::IVar => {
            let v = value.as_i64().ok_or_else(|| unrepresentable(ty, value))?;
            Ok(encode_ivlq(v))
        }

        PrimitiveType::CStr => {
            let s = value.as_str().ok_or_else(|| unrepresentable(ty, value))?;
            if s.as_bytes().contains(&0) {
                return Err(CodecError::InteriorNul);
            }
            let mut out = s.as_bytes().to_vec();
            out.push(0x00);
            Ok(out)
        }
        PrimitiveType::Str => {
            let s = value.as_str().ok_or_else(|| unrepresentable(ty, value))?;
            Ok(s.as_bytes().to_vec())
        }
        PrimitiveType::Bytes => {
            let b = value.as_bytes().ok_or_else(|| unrepresentable(ty, value))?;
            Ok(b.to_vec())
        }

        PrimitiveType::Array(elem) => {
            let items = value.as_seq().ok_or_else(|| unrepresentable(ty, value))?;
            let mut out = Vec::new();
            for item in items {
                out.extend(encode(elem, item)?);
            }
            Ok(out)
        }
    }
}

/// Decodes a value of `ty` from `buf` starting at `offset`. `args[0]`
/// supplies the element count for array forms (required, except `uv[]`/
/// `iv[]` which decode to the end of the buffer when absent) and the byte
/// length for `str`/`bytes` (always required).
pub fn decode(
    ty: &PrimitiveType,
    buf: &[u8],
    offset: usize,
    args: &[usize],
) -> Result<(Value, usize), CodecError> {
    match ty {
        PrimitiveType::Bool => {
            let b = read_bytes(buf, offset, 1)?;
            Ok((Value::Bool(b[0] != 0), 1))
        }

        PrimitiveType::U1 => decode_fixed_unsigned(buf, offset, 1, Endian::Big),
        PrimitiveType::I1 => decode_fixed_signed(buf, offset, 1, Endian::Big),
        PrimitiveType::U1Clamp => decode_fixed_unsigned(buf, offset, 1, Endian::Big),

        PrimitiveType::U2(e) => decode_fixed_unsigned(buf, offset, 2, *e),
        PrimitiveType::I2(e) => decode_fixed_signed(buf, offset, 2, *e),
        PrimitiveType::U4(e) => decode_fixed_unsigned(buf, offset, 4, *e),
        PrimitiveType::I4(e) => decode_fixed_signed(buf, offset, 4, *e),
        PrimitiveType::U8(e) => decode_fixed_unsigned(buf, offset, 8, *e),
        PrimitiveType::I8(e) => decode_fixed_signed(buf, offset, 8, *e),

        PrimitiveType::F4(e) => {
            let raw = read_bytes(buf, offset, 4)?;
            let be = order_bytes(raw, *e);
            let bits = u32::from_be_bytes(be.try_into().unwrap());
            Ok((Value::F64(f32::from_bits(bits) as f64), 4))
        }
        PrimitiveType::F8(e) => {
            let raw = read_bytes(buf, offset, 8)?;
            let be = order_bytes(raw, *e);
            let bits = u64::from_be_bytes(be.try_into().unwrap());
            Ok((Value::F64(f64::from_bits(bits)), 8))
        }

        PrimitiveType::UVar => decode_uvlq(buf, offset),
        PrimitiveType::IVar => decode_ivlq(buf, offset),

        PrimitiveType::CStr => {
            let mut end = offset;
            loop {
                if end >= buf.len() {
                    return Err(CodecError::BufferUnderflow {
                        offset,
                        needed: end - offset + 1,
                        available: buf.len() - offset,
                    });
                }
                if buf[end] == 0x00 {
                    break;
                }
                end += 1;
            }
            let s = std::str::from_utf8(&buf[offset..end])
                .map_err(|_| CodecError::MalformedUtf8)?
                .to_string();
            Ok((Value::Str(s), end - offset + 1))
        }
        PrimitiveType::Str => {
            let len = required_len(args)?;
            let raw = read_bytes(buf, offset, len)?;
            let s = std::str::from_utf8(raw)
                .map_err(|_| CodecError::MalformedUtf8)?
                .to_string();
            Ok((Value::Str(s), len))
        }
        PrimitiveType::Bytes => {
            let len = required_len(args)?;
            let raw = read_bytes(buf, offset, len)?;
            Ok((Value::Bytes(raw.to_vec()), len))
        }

        PrimitiveType::Array(elem) => decode_array(elem, buf, offset, args),
    }
}

fn decode_array(
    elem: &PrimitiveType,
    buf: &[u8],
    offset: usize,
    args: &[usize],
) -> Result<(Value, usize), CodecError> {
    let to_end = matches!(elem, PrimitiveType::UVar | PrimitiveType::IVar) && args.is_empty();

    let mut items = Vec::new();
    let mut cursor = offset;

    if to_end {
        while cursor < buf.len() {
            let (v, n) = decode(elem, buf, cursor, &[])?;
            items.push(v);
            cursor += n;
        }
    } else {
        let count = required_len(args)?;
        for _ in 0..count {
            let (v, n) = decode(elem, buf, cursor, &[])?;
            items.push(v);
            cursor += n;
        }
    }

    Ok((Value::Seq(items), cursor - offset))
}

fn required_len(args: &[usize]) -> Result<usize, CodecError> {
    args.first().copied().ok_or_else(|| {
        CodecError::LengthMismatch("length-dependent primitive requires an explicit length arg".into())
    })
}

fn read_bytes(buf: &[u8], offset: usize, len: usize) -> Result<&[u8], CodecError> {
    if offset.checked_add(len).map_or(true, |end| end > buf.len()) {
        return Err(CodecError::BufferUnderflow {
            offset,
            needed: len,
            available: buf.len().saturating_sub(offset),
        });
    }
    Ok(&buf[offset..offset + len])
}

/// Reorders a big-endian byte slice into `endian`'s order. A no-op for `Big`.
fn order_bytes(be_bytes: &[u8], endian: Endian) -> Vec<u8> {
    match endian {
        Endian::Big => be_bytes.to_vec(),
        Endian::Little => be_bytes.iter().rev().copied().collect(),
    }
}

fn encode_unsigned(ty: &PrimitiveType, value: &Value, width: usize) -> Result<Vec<u8>, CodecError> {
    encode_unsigned_endian(ty, value, width, Endian::Big)
}

fn encode_unsigned_endian(
    ty: &PrimitiveType,
    value: &Value,
    width: usize,
    endian: Endian,
) -> Result<Vec<u8>, CodecError> {
    let v = value.as_u64().ok_or_else(|| unrepresentable(ty, value))?;
    if width < 8 && v >= (1u128 << (width * 8)) as u64 {
        return Err(CodecError::UnrepresentableValue(format!(
            "{v} does not fit in {width} unsigned bytes"
        )));
    }
    let be = v.to_be_bytes();
    Ok(order_bytes(&be[8 - width..], endian))
}

fn encode_signed(ty: &PrimitiveType, value: &Value, width: usize) -> Result<Vec<u8>, CodecError> {
    encode_signed_endian(ty, value, width, Endian::Big)
}

fn encode_signed_endian(
    ty: &PrimitiveType,
    value: &Value,
    width: usize,
    endian: Endian,
) -> Result<Vec<u8>, CodecError> {
    let v = value.as_i64().ok_or_else(|| unrepresentable(ty, value))?;
    if width < 8 {
        let bound = 1i64 << (width * 8 - 1);
        if v < -bound || v >= bound {
            return Err(CodecError::UnrepresentableValue(format!(
                "{v} does not fit in {width} signed bytes"
            )));
        }
    }
    let be = v.to_be_bytes();
    Ok(order_bytes(&be[8 - width..], endian))
}

fn decode_fixed_unsigned(
    buf: &[u8],
    offset: usize,
    width: usize,
    endian: Endian,
) -> Result<(Value, usize), CodecError> {
    let raw = read_bytes(buf, offset, width)?;
    let be = order_bytes(raw, endian);
    let mut padded = [0u8; 8];
    padded[8 - width..].copy_from_slice(&be);
    Ok((Value::U64(u64::from_be_bytes(padded)), width))
}

fn decode_fixed_signed(
    buf: &[u8],
    offset: usize,
    width: usize,
    endian: Endian,
) -> Result<(Value, usize), CodecError> {
    let raw = read_bytes(buf, offset, width)?;
    let be = order_bytes(raw, endian);
    let sign_byte = if be[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut padded = [sign_byte; 8];
    padded[8 - width..].copy_from_slice(&be);
    Ok((Value::I64(i64::from_be_bytes(padded)), width))
}

fn signed_or_unsigned(value: &Value) -> Option<i64> {
    match value {
        Value::I64(v) => Some(*v),
        Value::U64(v) => Some(*v as i64),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::F64(v) => Some(*v),
        Value::I64(v) => Some(*v as f64),
        Value::U64(v) => Some(*v as f64),
        _ => None,
    }
}

fn unrepresentable(ty: &PrimitiveType, value: &Value) -> CodecError {
    CodecError::UnrepresentableValue(format!("{:?} is not valid for type `{}`", value, ty.name()))
}

/// Unsigned VLQ: base-128, big-endian group order, high bit marks continuation.
pub fn encode_uvlq(mut v: u64) -> Vec<u8> {
    let mut groups = vec![(v & 0x7F) as u8];
    v >>= 7;
    while v > 0 {
        groups.push((v & 0x7F) as u8);
        v >>= 7;
    }
    groups.reverse();
    let last = groups.len() - 1;
    for (i, b) in groups.iter_mut().enumerate() {
        if i != last {
            *b |= 0x80;
        }
    }
    groups
}

fn decode_uvlq(buf: &[u8], offset: usize) -> Result<(Value, usize), CodecError> {
    let mut value = 0u64;
    let mut cursor = offset;
    loop {
        let byte = *read_bytes(buf, cursor, 1)?.first().unwrap();
        value = (value << 7) | (byte & 0x7F) as u64;
        cursor += 1;
        if byte & 0x80 == 0 {
            break;
        }
    }
    Ok((Value::U64(value), cursor - offset))
}

/// Signed VLQ: same group structure as unsigned; the first byte's
/// second-highest bit is the sign, its low 6 bits are magnitude bits 0..6,
/// subsequent bytes carry 7 magnitude bits each. The encoder always emits
/// `0x00` for zero; the decoder accepts both `0x00` and `0x40`.
pub fn encode_ivlq(v: i64) -> Vec<u8> {
    let negative = v < 0;
    let mut m = v.unsigned_abs();

    // Collect base-128 groups from the least-significant end, same as
    // unsigned VLQ, but stop one group early: the leading (most
    // significant, transmitted first) group carries only 6 magnitude bits
    // to make room for the sign bit.
    let mut groups: Vec<u8> = Vec::new();
    while m >= 64 {
        groups.push((m & 0x7F) as u8);
        m >>= 7;
    }
    groups.push(m as u8); // leading group: < 64, fits in 6 bits
    groups.reverse();

    let mut first = groups[0] | if negative { 0x40 } else { 0x00 };
    if groups.len() > 1 {
        first |= 0x80;
    }

    let mut out = vec![first];
    let last = groups.len() - 1;
    for (i, b) in groups.into_iter().enumerate().skip(1) {
        out.push(if i != last { b | 0x80 } else { b });
    }
    out
}

fn decode_ivlq(buf: &[u8], offset: usize) -> Result<(Value, usize), CodecError> {
    let first = *read_bytes(buf, offset, 1)?.first().unwrap();
    let negative = first & 0x40 != 0;
    let continued = first & 0x80 != 0;
    let mut magnitude = (first & 0x3F) as u64;
    let mut cursor = offset + 1;

    if continued {
        loop {
            let byte = *read_bytes(buf, cursor, 1)?.first().unwrap();
            magnitude = (magnitude << 7) | (byte & 0x7F) as u64;
            cursor += 1;
            if byte & 0x80 == 0 {
                break;
            }
        }
    }

    let value = if negative {
        -(magnitude as i128) as i64
    } else {
        magnitude as i64
    };
    Ok((Value::I64(value), cursor - offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_render_roundtrip() {
        for name in [
            "bool", "cstr", "str", "bytes", "u1", "u1c", "i1", "u2l", "u2b", "i2l", "i2b", "u4l",
            "u4b", "i4l", "i4b", "u8l", "u8b", "i8l", "i8b", "f4l", "f4b", "f8l", "f8b", "uv", "iv",
            "i2b[]",
        ] {
            let ty = PrimitiveType::parse(name).unwrap();
            assert_eq!(ty.name(), name);
        }
    }

    #[test]
    fn u4b_roundtrip() {
        let ty = PrimitiveType::U4(Endian::Big);
        let bytes = encode(&ty, &Value::U64(0xDEADBEEF)).unwrap();
        assert_eq!(bytes, vec![0xDE, 0xAD, 0xBE, 0xEF]);
        let (v, n) = decode(&ty, &bytes, 0, &[]).unwrap();
        assert_eq!(v, Value::U64(0xDEADBEEF));
        assert_eq!(n, 4);
    }

    #[test]
    fn i2l_roundtrip_negative() {
        let ty = PrimitiveType::I2(Endian::Little);
        let bytes = encode(&ty, &Value::I64(-2822)).unwrap();
        assert_eq!(bytes, vec![0xF4, 0xFA]);
        let (v, n) = decode(&ty, &bytes, 0, &[]).unwrap();
        assert_eq!(v, Value::I64(-2822));
        assert_eq!(n, 2);
    }

    #[test]
    fn cstr_roundtrip_empty() {
        let bytes = encode(&PrimitiveType::CStr, &Value::Str(String::new())).unwrap();
        assert_eq!(bytes, vec![0x00]);
        let (v, n) = decode(&PrimitiveType::CStr, &bytes, 0, &[]).unwrap();
        assert_eq!(v, Value::Str(String::new()));
        assert_eq!(n, 1);
    }

    #[test]
    fn cstr_interior_nul_rejected() {
        let err = encode(&PrimitiveType::CStr, &Value::Str("a\0b".to_string())).unwrap_err();
        assert_eq!(err, CodecError::InteriorNul);
    }

    #[test]
    fn uvlq_table() {
        let cases: &[(u64, &[u8])] = &[
            (0, &[0x00]),
            (127, &[0x7F]),
            (128, &[0x81, 0x00]),
            (16383, &[0xFF, 0x7F]),
            (16384, &[0x81, 0x80, 0x00]),
        ];
        for (v, expected) in cases {
            let bytes = encode_uvlq(*v);
            assert_eq!(&bytes, expected, "encoding {v}");
            let (decoded, n) = decode_uvlq(&bytes, 0).unwrap();
            assert_eq!(decoded, Value::U64(*v));
            assert_eq!(n, bytes.len());
        }
    }

    #[test]
    fn ivlq_table() {
        for v in [0i64, 1, -1, 63, -63, 64, -64, 8191, -8191, i64::MAX, i64::MIN] {
            let bytes = encode_ivlq(v);
            let (decoded, n) = decode_ivlq(&bytes, 0).unwrap();
            assert_eq!(decoded, Value::I64(v), "roundtrip {v}");
            assert_eq!(n, bytes.len());
        }
        // Zero always encodes to 0x00, never 0x40.
        assert_eq!(encode_ivlq(0), vec![0x00]);
        // 63 fits in the 6-bit leading group with no continuation byte.
        assert_eq!(encode_ivlq(63), vec![0x3F]);
        assert_eq!(encode_ivlq(-63), vec![0x7F]);
        // 64 needs one continuation byte.
        assert_eq!(encode_ivlq(64), vec![0x80, 0x40]);
        assert_eq!(encode_ivlq(-64), vec![0xC0, 0x40]);
        assert_eq!(encode_ivlq(8191), vec![0xBF, 0x7F]);
    }

    #[test]
    fn ivlq_decoder_accepts_alternate_zero() {
        let (v, n) = decode_ivlq(&[0x40], 0).unwrap();
        assert_eq!(v, Value::I64(0));
        assert_eq!(n, 1);
    }

    #[test]
    fn array_form_roundtrip() {
        let ty = PrimitiveType::Array(Box::new(PrimitiveType::I2(Endian::Big)));
        let seq = Value::Seq(vec![Value::I64(-2822), Value::I64(992), Value::I64(3)]);
        let bytes = encode(&ty, &seq).unwrap();
        assert_eq!(bytes, vec![0xF4, 0xFA, 0x03, 0xE0, 0x00, 0x03]);
        let (decoded, n) = decode(&ty, &bytes, 0, &[3]).unwrap();
        assert_eq!(decoded, seq);
        assert_eq!(n, 6);
    }
}
