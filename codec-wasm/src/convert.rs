//! Helpers for converting JSON schema descriptions and values into core
//! `codec-core` types and JavaScript-friendly values.
//!
//! This module is internal; its functions back the public [`crate::WasmCodec`]
//! API by:
//!
//! - Converting a [`codec_core::value::Value`] into a serializable shape so
//!   `serde_wasm_bindgen` can hand it to JavaScript as a plain object.
//! - Converting a `JsValue` (received as a generic JSON value) back into a
//!   [`codec_core::value::Value`] for encoding.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use wasm_bindgen::JsValue;

use codec_core::value::Value;

/// Serializable mirror of [`Value`], in the shape `serde_wasm_bindgen` turns
/// into a plain JavaScript value. Byte buffers round-trip as `"0x..."` hex
/// strings, the one place this shape diverges from [`Value`] itself — a
/// JSON value has no separate bytes type, so a convention is needed to tell
/// a byte buffer apart from a string or a numeric array.
#[derive(Serialize)]
#[serde(untagged)]
enum JsValueOut {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Array(Vec<JsValueOut>),
    Map(OrderedMap),
}

/// A field-name to value mapping that serializes as a JS object with its
/// fields in insertion order, which a `BTreeMap`-backed conversion cannot
/// (a `BTreeMap` reorders keys alphabetically).
struct OrderedMap(Vec<(String, JsValueOut)>);

impl Serialize for OrderedMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    let digits = s.strip_prefix("0x")?;
    if digits.len() % 2 != 0 {
        return None;
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).ok())
        .collect()
}

fn value_to_js_out(value: &Value) -> JsValueOut {
    match value {
        Value::Bool(b) => JsValueOut::Bool(*b),
        Value::I64(i) => JsValueOut::Int(*i),
        Value::U64(u) => JsValueOut::UInt(*u),
        Value::F64(f) => JsValueOut::Float(*f),
        Value::Str(s) => JsValueOut::Str(s.clone()),
        Value::Bytes(b) => JsValueOut::Str(hex_encode(b)),
        Value::Seq(items) => JsValueOut::Array(items.iter().map(value_to_js_out).collect()),
        Value::Map(fields) => JsValueOut::Map(OrderedMap(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), value_to_js_out(v)))
                .collect(),
        )),
        Value::Variant { tag, .. } => value_to_js_out(tag),
    }
}

/// Converts a decoded [`Value`] into a `JsValue`, ready to hand back to
/// JavaScript from [`crate::WasmCodec::decode`].
pub fn value_to_js(value: &Value) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&value_to_js_out(value)).map_err(error_to_js)
}

/// Converts a generic JSON value (as received from `serde_wasm_bindgen`
/// unwrapping a JS object passed into [`crate::WasmCodec::encode`]) into a
/// [`Value`] for encoding.
///
/// A JSON string of the form `"0x<hex>"` becomes [`Value::Bytes`]; any other
/// string becomes [`Value::Str`]. JSON numbers become [`Value::U64`] when
/// non-negative and exactly representable, [`Value::I64`] otherwise, or
/// [`Value::F64`] when the number carries a fractional component.
pub fn json_to_value(v: serde_json::Value) -> Result<Value, JsValue> {
    Ok(match v {
        serde_json::Value::Null => {
            return Err(JsValue::from_str("null has no codec-core value representation"))
        }
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Value::U64(u)
            } else if let Some(i) = n.as_i64() {
                Value::I64(i)
            } else if let Some(f) = n.as_f64() {
                Value::F64(f)
            } else {
                return Err(JsValue::from_str("number out of range"));
            }
        }
        serde_json::Value::String(s) => match hex_decode(&s) {
            Some(bytes) => Value::Bytes(bytes),
            None => Value::Str(s),
        },
        serde_json::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(json_to_value(item)?);
            }
            Value::Seq(out)
        }
        serde_json::Value::Object(fields) => {
            let mut out = Vec::with_capacity(fields.len());
            for (k, v) in fields {
                out.push((k, json_to_value(v)?));
            }
            Value::Map(out)
        }
    })
}

/// Converts any debug-printable error into a `JsValue` with a human-readable
/// message, keeping the error surface visible to JavaScript small.
pub fn error_to_js<T>(e: T) -> JsValue
where
    T: std::fmt::Debug,
{
    JsValue::from_str(&format!("{e:?}"))
}
