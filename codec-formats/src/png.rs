//! PNG chunk stream: `length`/`type`/`data`/`crc` records terminated by an
//! `IEND` sentinel chunk, plus a secondary decode of `IHDR`'s chunk data.
//!
//! Grounded on `codec-core`'s [`codec_core::hooks::ArraySequenceHooks`]:
//! the chunk stream is an `Array` node whose termination is data-dependent
//! (stop once the previously decoded chunk's `type` field is `IEND`) rather
//! than length-prefixed. `IHDR`'s own sub-fields are not modeled in the
//! envelope schema itself; per-chunk-type dispatch is client code (this
//! module), composing a second, independent schema over the envelope's
//! `data` bytes, rather than teaching the `Record`/`Enum` node kinds about
//! chunk types they have no general reason to know about. [`decode_file`]/
//! [`encode_file`] apply that second pass to every `IHDR` chunk they see, so
//! the dispatch happens automatically at the file boundary rather than only
//! being available as a manual extra call.

use codec_core::error::CodecError;
use codec_core::node::record::ArgSource;
use codec_core::node::{array::Array, Node, RecordChild};
use codec_core::value::Value;

const IEND: &str = "IEND";
const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Errors specific to the PNG chunk stream, wrapping the underlying codec
/// failures `codec-core` reports.
#[derive(Debug, thiserror::Error)]
pub enum PngError {
    #[error("missing or invalid 8-byte PNG signature")]
    BadSignature,
    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[derive(Debug)]
struct IendSentinelHooks;

impl codec_core::hooks::ArraySequenceHooks for IendSentinelHooks {
    fn before_decode(
        &self,
        _index: usize,
        _buf: &[u8],
        _offset: usize,
        decoded_so_far: &[Value],
    ) -> Result<codec_core::hooks::SequenceStep, CodecError> {
        let at_iend = decoded_so_far
            .last()
            .and_then(|chunk| chunk.field("type"))
            .and_then(Value::as_str)
            .is_some_and(|ty| ty == IEND);
        if at_iend {
            return Ok(codec_core::hooks::SequenceStep::Stop {
                extra: Vec::new(),
                extra_bytes: 0,
            });
        }
        Ok(codec_core::hooks::SequenceStep::Continue)
    }

    fn before_encode(&self, index: usize, values: &[Value]) -> codec_core::hooks::SequenceEncodeStep {
        let past_iend = index > 0
            && values
                .get(index - 1)
                .and_then(|chunk| chunk.field("type"))
                .and_then(Value::as_str)
                .is_some_and(|ty| ty == IEND);
        if past_iend {
            codec_core::hooks::SequenceEncodeStep::StopWithExtra(Vec::new())
        } else {
            codec_core::hooks::SequenceEncodeStep::Continue
        }
    }
}

/// Schema for one chunk envelope: a 4-byte length, a 4-byte type tag, that
/// many bytes of data, and a 4-byte CRC.
pub fn chunk_envelope_schema() -> Node {
    Node::record(vec![
        RecordChild::new("length", Node::primitive("u4b").unwrap()),
        RecordChild::with_args(
            "type",
            Node::primitive("str").unwrap(),
            ArgSource::Fixed(vec![4]),
        ),
        RecordChild::with_args(
            "data",
            Node::primitive("bytes").unwrap(),
            ArgSource::FromField("length".to_string()),
        ),
        RecordChild::new("crc", Node::primitive("u4b").unwrap()),
    ])
    .unwrap()
}

/// Schema for the whole chunk stream: chunk envelopes, stopping after the
/// one whose `type` is `IEND`.
pub fn stream_schema() -> Node {
    Node::Array(Array::with_hooks(
        chunk_envelope_schema(),
        Box::new(IendSentinelHooks),
    ))
}

/// Schema for `IHDR`'s chunk data, decoded as a second pass over the
/// envelope's raw `data` bytes.
pub fn ihdr_schema() -> Node {
    Node::record(vec![
        RecordChild::new("width", Node::primitive("i4b").unwrap()),
        RecordChild::new("height", Node::primitive("i4b").unwrap()),
        RecordChild::new("bitdepth", Node::primitive("u1").unwrap()),
        RecordChild::new("colortype", Node::primitive("u1").unwrap()),
        RecordChild::new("compression", Node::primitive("u1").unwrap()),
        RecordChild::new("filter", Node::primitive("u1").unwrap()),
        RecordChild::new("interlace", Node::primitive("u1").unwrap()),
    ])
    .unwrap()
}

/// Decodes an `IHDR` chunk's `data` bytes into its sub-fields.
pub fn decode_ihdr(data: &[u8]) -> Result<Value, PngError> {
    let (value, consumed) = ihdr_schema().decode(data, 0)?;
    if consumed != data.len() {
        return Err(PngError::Codec(CodecError::LengthMismatch(format!(
            "IHDR chunk data is {} bytes, schema consumed {consumed}",
            data.len()
        ))));
    }
    Ok(value)
}

/// Encodes an `IHDR` sub-field value back into chunk `data` bytes.
pub fn encode_ihdr(value: &Value) -> Result<Vec<u8>, PngError> {
    Ok(ihdr_schema().encode(value)?)
}

fn chunk_type(chunk: &Value) -> Option<&str> {
    chunk.field("type").and_then(Value::as_str)
}

fn replace_field(fields: Vec<(String, Value)>, name: &str, new_value: Value) -> Vec<(String, Value)> {
    let mut new_value = Some(new_value);
    fields
        .into_iter()
        .map(|(k, v)| {
            if k == name {
                (k, new_value.take().expect("replace_field matches at most once"))
            } else {
                (k, v)
            }
        })
        .collect()
}

/// Replaces an `IHDR` chunk's raw `data` bytes with its decoded sub-record.
fn decode_ihdr_chunk(chunk: Value) -> Result<Value, PngError> {
    match chunk {
        Value::Map(fields) => {
            let data = fields
                .iter()
                .find(|(k, _)| k == "data")
                .and_then(|(_, v)| v.as_bytes())
                .ok_or_else(|| PngError::Codec(CodecError::MissingField("data".to_string())))?;
            let sub_record = decode_ihdr(data)?;
            Ok(Value::Map(replace_field(fields, "data", sub_record)))
        }
        other => Ok(other),
    }
}

/// Replaces an `IHDR` chunk's decoded sub-record back with raw `data` bytes.
fn encode_ihdr_chunk(chunk: &Value) -> Result<Value, PngError> {
    match chunk {
        Value::Map(fields) => {
            let sub_record = fields
                .iter()
                .find(|(k, _)| k == "data")
                .map(|(_, v)| v)
                .ok_or_else(|| PngError::Codec(CodecError::MissingField("data".to_string())))?;
            let bytes = encode_ihdr(sub_record)?;
            Ok(Value::Map(replace_field(fields.clone(), "data", Value::Bytes(bytes))))
        }
        other => Ok(other.clone()),
    }
}

/// Decodes a full `.png` file (signature plus chunk stream), further
/// decoding any `IHDR` chunk's `data` into its sub-record.
pub fn decode_file(buf: &[u8]) -> Result<Value, PngError> {
    if buf.len() < SIGNATURE.len() || buf[..SIGNATURE.len()] != SIGNATURE {
        return Err(PngError::BadSignature);
    }
    let (chunks, _consumed) = stream_schema().decode(buf, SIGNATURE.len())?;
    match chunks {
        Value::Seq(items) => {
            let items = items
                .into_iter()
                .map(|chunk| {
                    if chunk_type(&chunk) == Some("IHDR") {
                        decode_ihdr_chunk(chunk)
                    } else {
                        Ok(chunk)
                    }
                })
                .collect::<Result<Vec<_>, PngError>>()?;
            Ok(Value::Seq(items))
        }
        other => Ok(other),
    }
}

/// Encodes a chunk stream (as decoded by [`decode_file`]) back into a full
/// `.png` file, signature included, re-encoding any `IHDR` chunk's
/// sub-record back into raw `data` bytes first.
pub fn encode_file(chunks: &Value) -> Result<Vec<u8>, PngError> {
    let raw_chunks = match chunks {
        Value::Seq(items) => {
            let items = items
                .iter()
                .map(|chunk| {
                    if chunk_type(chunk) == Some("IHDR") {
                        encode_ihdr_chunk(chunk)
                    } else {
                        Ok(chunk.clone())
                    }
                })
                .collect::<Result<Vec<_>, PngError>>()?;
            Value::Seq(items)
        }
        other => other.clone(),
    };
    let mut out = SIGNATURE.to_vec();
    out.extend(stream_schema().encode(&raw_chunks)?);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(ty: &str, data: Vec<u8>) -> Value {
        let crc = 0u64; // this module does not validate chunk CRCs.
        Value::Map(vec![
            ("length".to_string(), Value::U64(data.len() as u64)),
            ("type".to_string(), Value::Str(ty.to_string())),
            ("data".to_string(), Value::Bytes(data)),
            ("crc".to_string(), Value::U64(crc)),
        ])
    }

    #[test]
    fn stream_stops_after_iend() {
        let chunks = Value::Seq(vec![
            chunk("IHDR", vec![0u8; 13]),
            chunk("IDAT", vec![1, 2, 3]),
            chunk("IEND", vec![]),
        ]);
        let bytes = stream_schema().encode(&chunks).unwrap();
        let (decoded, n) = stream_schema().decode(&bytes, 0).unwrap();
        assert_eq!(decoded, chunks);
        assert_eq!(n, bytes.len());
    }

    #[test]
    fn file_roundtrip_with_signature() {
        let chunks = Value::Seq(vec![chunk("IDAT", vec![1, 2, 3]), chunk("IEND", vec![])]);
        let file_bytes = encode_file(&chunks).unwrap();
        assert_eq!(&file_bytes[..8], &SIGNATURE);
        let decoded = decode_file(&file_bytes).unwrap();
        assert_eq!(decoded, chunks);
    }

    #[test]
    fn file_roundtrip_decodes_and_reencodes_ihdr_subrecord() {
        let ihdr = Value::Map(vec![
            ("width".to_string(), Value::I64(1)),
            ("height".to_string(), Value::I64(1)),
            ("bitdepth".to_string(), Value::U64(8)),
            ("colortype".to_string(), Value::U64(6)),
            ("compression".to_string(), Value::U64(0)),
            ("filter".to_string(), Value::U64(0)),
            ("interlace".to_string(), Value::U64(0)),
        ]);
        let chunks = Value::Seq(vec![
            Value::Map(vec![
                ("length".to_string(), Value::U64(13)),
                ("type".to_string(), Value::Str("IHDR".to_string())),
                ("data".to_string(), ihdr.clone()),
                ("crc".to_string(), Value::U64(0)),
            ]),
            chunk("IEND", vec![]),
        ]);

        let file_bytes = encode_file(&chunks).unwrap();
        assert_eq!(&file_bytes[..8], &SIGNATURE);
        let decoded = decode_file(&file_bytes).unwrap();
        assert_eq!(decoded, chunks);
        assert_eq!(decoded.as_seq().unwrap()[0].field("data"), Some(&ihdr));
    }

    #[test]
    fn rejects_missing_signature() {
        let err = decode_file(&[0u8; 4]).unwrap_err();
        assert!(matches!(err, PngError::BadSignature));
    }

    #[test]
    fn ihdr_sub_record_roundtrip() {
        let ihdr = Value::Map(vec![
            ("width".to_string(), Value::I64(1920)),
            ("height".to_string(), Value::I64(1080)),
            ("bitdepth".to_string(), Value::U64(8)),
            ("colortype".to_string(), Value::U64(6)),
            ("compression".to_string(), Value::U64(0)),
            ("filter".to_string(), Value::U64(0)),
            ("interlace".to_string(), Value::U64(0)),
        ]);
        let data = encode_ihdr(&ihdr).unwrap();
        assert_eq!(data.len(), 13);
        let decoded = decode_ihdr(&data).unwrap();
        assert_eq!(decoded, ihdr);
    }
}
