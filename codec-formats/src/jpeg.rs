//! JPEG segment stream: `0xFF`-prefixed markers, most carrying a
//! length-prefixed payload, with the entropy-coded scan data following an
//! `SOS` (start-of-scan) segment terminated by the next real marker rather
//! than by any length field.
//!
//! Grounded on `codec-core`'s [`codec_core::hooks::ArraySequenceHooks`], the
//! same mechanism [`super::png`] uses for its `IEND` sentinel: here the
//! per-element termination check inspects the two bytes at the read cursor
//! instead of a previously decoded sibling, since nothing in the
//! entropy-coded span itself announces its own length. A segment's
//! marker-length arithmetic (the JPEG length field counts itself, so payload
//! length is `length - 2`) is plain client code rather than a node-level
//! primitive, since it is JPEG's convention alone.

use codec_core::error::CodecError;
use codec_core::node::array::Array;
use codec_core::node::Node;
use codec_core::primitive::{self, Endian, PrimitiveType};
use codec_core::value::Value;

const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;

/// Errors specific to the JPEG segment stream.
#[derive(Debug, thiserror::Error)]
pub enum JpegError {
    #[error("expected a 0xFF marker prefix at offset {0}")]
    MissingMarkerPrefix(usize),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[derive(Debug)]
struct EntropyScanHooks;

impl codec_core::hooks::ArraySequenceHooks for EntropyScanHooks {
    fn before_decode(
        &self,
        _index: usize,
        buf: &[u8],
        offset: usize,
        _decoded_so_far: &[Value],
    ) -> Result<codec_core::hooks::SequenceStep, CodecError> {
        if offset + 1 < buf.len() && buf[offset] == 0xFF {
            let next = buf[offset + 1];
            let is_byte_stuffing = next == 0x00;
            let is_fill_byte = next == 0xFF;
            let is_restart_marker = (0xD0..=0xD7).contains(&next);
            if !is_byte_stuffing && !is_fill_byte && !is_restart_marker {
                return Ok(codec_core::hooks::SequenceStep::Stop {
                    extra: Vec::new(),
                    extra_bytes: 0,
                });
            }
        }
        Ok(codec_core::hooks::SequenceStep::Continue)
    }

    fn before_encode(&self, _index: usize, _values: &[Value]) -> codec_core::hooks::SequenceEncodeStep {
        codec_core::hooks::SequenceEncodeStep::Continue
    }
}

/// Schema for the entropy-coded scan data following an `SOS` segment: one
/// byte at a time, stopping at the next unstuffed, non-restart marker.
pub fn entropy_scan_schema() -> Node {
    Node::Array(Array::with_hooks(
        Node::primitive("u1").unwrap(),
        Box::new(EntropyScanHooks),
    ))
}

fn decode_generic_segment(buf: &[u8], offset: usize) -> Result<(Value, usize), CodecError> {
    let (length_v, len_n) = primitive::decode(&PrimitiveType::U2(Endian::Big), buf, offset, &[])?;
    let length = length_v.as_u64().expect("u2b decodes to U64") as usize;
    if length < 2 {
        return Err(CodecError::LengthMismatch(format!(
            "segment length {length} is less than the 2-byte length field itself"
        )));
    }
    let (payload_v, payload_n) = primitive::decode(
        &PrimitiveType::Bytes,
        buf,
        offset + len_n,
        &[length - 2],
    )?;
    let value = Value::Map(vec![("payload".to_string(), payload_v)]);
    Ok((value, len_n + payload_n))
}

fn encode_generic_segment(value: &Value) -> Result<Vec<u8>, CodecError> {
    let payload = value.field("payload").and_then(Value::as_bytes).ok_or_else(|| {
        CodecError::UnrepresentableValue("jpeg segment missing `payload` bytes field".into())
    })?;
    let length = payload.len() + 2;
    let mut out = primitive::encode(&PrimitiveType::U2(Endian::Big), &Value::U64(length as u64))?;
    out.extend_from_slice(payload);
    Ok(out)
}

fn bytes_from_seq(v: Value) -> Value {
    match v {
        Value::Seq(items) => {
            Value::Bytes(items.into_iter().filter_map(|i| i.as_u64().map(|u| u as u8)).collect())
        }
        other => other,
    }
}

/// The marker tag this module gives the synthetic entropy-coded-span segment
/// it inserts after every `SOS` segment. Implementation-defined; chosen to
/// read as "entropy-coded span" without colliding with any real JPEG marker
/// name.
const ECS_TAG: &str = "ECS";

/// Decodes a full marker segment stream (no JPEG file signature check; JPEG
/// streams start directly with the `SOI` marker).
///
/// The entropy-coded span following a `SOS` segment has no length field of
/// its own, so it cannot be folded into that segment's record; instead it is
/// pushed as its own synthetic segment tagged [`ECS_TAG`], immediately after
/// the `SOS` segment it belongs to.
pub fn decode_stream(buf: &[u8]) -> Result<Value, JpegError> {
    let mut segments = Vec::new();
    let mut cursor = 0usize;

    loop {
        if cursor + 1 >= buf.len() {
            return Err(JpegError::Codec(CodecError::BufferUnderflow {
                offset: cursor,
                needed: 2,
                available: buf.len().saturating_sub(cursor),
            }));
        }
        if buf[cursor] != 0xFF {
            return Err(JpegError::MissingMarkerPrefix(cursor));
        }
        let marker = buf[cursor + 1];
        cursor += 2;

        let mut fields = vec![("marker".to_string(), Value::U64(marker as u64))];

        match marker {
            SOI | EOI => {}
            _ => {
                let (body, body_n) = decode_generic_segment(buf, cursor)?;
                cursor += body_n;
                if let Value::Map(b) = body {
                    fields.extend(b);
                }
            }
        }

        let at_eoi = marker == EOI;
        segments.push(Value::Map(fields));
        if at_eoi {
            break;
        }

        if marker == SOS {
            let (entropy, entropy_n) = entropy_scan_schema().decode(buf, cursor)?;
            cursor += entropy_n;
            segments.push(Value::Map(vec![
                ("marker".to_string(), Value::Str(ECS_TAG.to_string())),
                ("payload".to_string(), bytes_from_seq(entropy)),
            ]));
        }
    }

    Ok(Value::Seq(segments))
}

/// Encodes a segment stream (as decoded by [`decode_stream`]) back into
/// bytes. A segment tagged with a string `marker` (the synthetic
/// entropy-coded span) is re-emitted verbatim, with no `0xFF` prefix and no
/// length framing.
pub fn encode_stream(value: &Value) -> Result<Vec<u8>, JpegError> {
    let segments = value
        .as_seq()
        .ok_or_else(|| JpegError::Codec(CodecError::UnrepresentableValue("jpeg stream must be a sequence of segments".into())))?;

    let mut out = Vec::new();
    for segment in segments {
        match segment.field("marker") {
            Some(Value::Str(_tag)) => {
                let payload = segment.field("payload").and_then(Value::as_bytes).ok_or_else(|| {
                    JpegError::Codec(CodecError::UnrepresentableValue(
                        "synthetic jpeg segment missing `payload` bytes field".into(),
                    ))
                })?;
                out.extend_from_slice(payload);
            }
            Some(marker_value) => {
                let marker = marker_value.as_u64().ok_or_else(|| {
                    JpegError::Codec(CodecError::UnrepresentableValue(
                        "jpeg segment `marker` field is neither a byte value nor a tag string".into(),
                    ))
                })? as u8;
                out.push(0xFF);
                out.push(marker);
                if !matches!(marker, SOI | EOI) {
                    out.extend(encode_generic_segment(segment)?);
                }
            }
            None => {
                return Err(JpegError::Codec(CodecError::UnrepresentableValue(
                    "jpeg segment missing `marker` field".into(),
                )))
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_roundtrips_with_entropy_span_and_byte_stuffing() {
        let input = Value::Seq(vec![
            Value::Map(vec![("marker".to_string(), Value::U64(SOI as u64))]),
            Value::Map(vec![
                ("marker".to_string(), Value::U64(0xDBu64)),
                ("payload".to_string(), Value::Bytes(vec![0x00, 0x10, 0x20])),
            ]),
            Value::Map(vec![
                ("marker".to_string(), Value::U64(SOS as u64)),
                ("payload".to_string(), Value::Bytes(vec![0x01, 0x02])),
            ]),
            Value::Map(vec![
                ("marker".to_string(), Value::Str(ECS_TAG.to_string())),
                (
                    "payload".to_string(),
                    Value::Bytes(vec![0xAA, 0xFF, 0x00, 0xBB, 0xD0, 0xCC]),
                ),
            ]),
            Value::Map(vec![("marker".to_string(), Value::U64(EOI as u64))]),
        ]);

        let bytes = encode_stream(&input).unwrap();
        let decoded = decode_stream(&bytes).unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn entropy_scan_stops_before_real_marker() {
        // SOS header: length=4, payload=[0x01,0x02]; entropy span
        // 0xAA 0xFF 0x00 0xBB, then the real marker 0xFF 0xD9 (EOI).
        let mut bytes = vec![0xFF, SOS, 0x00, 0x04, 0x01, 0x02];
        bytes.extend([0xAA, 0xFF, 0x00, 0xBB]);
        bytes.extend([0xFF, EOI]);

        let decoded = decode_stream(&bytes).unwrap();
        let segments = decoded.as_seq().unwrap();
        let ecs = &segments[1];
        assert_eq!(ecs.field("marker").unwrap().as_str(), Some(ECS_TAG));
        let entropy = ecs.field("payload").unwrap().as_bytes().unwrap();
        assert_eq!(entropy, &[0xAA, 0xFF, 0x00, 0xBB]);
    }

    #[test]
    fn missing_marker_prefix_errors() {
        let err = decode_stream(&[0x00, SOI]).unwrap_err();
        assert!(matches!(err, JpegError::MissingMarkerPrefix(0)));
    }
}
