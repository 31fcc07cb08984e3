//! WASM bindings for the `codec-core` declarative binary codec engine.
//!
//! This crate exposes a compact API to JavaScript for decoding and encoding
//! binary payloads according to a JSON schema description. Internally it
//! uses `codec-core`'s [`codec_core::registry`] to reify a [`codec_core::
//! node::Node`] tree from the description once, then reuses it to decode or
//! encode many payloads.
//!
//! At a high level you:
//! - **Describe your schema** in JSON using the [`codec_core::schema_def::
//!   NodeDef`] shape (node kind, children, element schema, etc.).
//! - **Compile** the schema once, and **decode**/**encode** payloads many
//!   times from JavaScript.
//!
//! ```text
//! // Pseudo TypeScript example
//! //
//! // const schemaJson = JSON.stringify({
//! //   kind: "record",
//! //   children: [
//! //     { name: "id", node: { kind: "primitive", type_name: "u4b" } },
//! //   ],
//! // });
//! //
//! // const codec = new WasmCodec(schemaJson);
//! // const result = codec.decode(someUint8Array);
//! // // result is a JS object: { id: 123 }
//! // const bytes = codec.encode(result);
//! ```
//!
//! Error values are converted to `JsValue` with a `Debug` representation,
//! which makes it easy to inspect failures from JavaScript.

mod convert;

use codec_core::schema_def::NodeDef;
use wasm_bindgen::prelude::*;

/// Compiled schema that can be used from JavaScript to decode and encode
/// binary data.
///
/// A `WasmCodec` owns a reified [`codec_core::node::Node`] tree. Building it
/// from JSON is the only fallible step; `decode`/`encode` reuse the same
/// tree for every call.
#[wasm_bindgen]
pub struct WasmCodec {
    node: codec_core::node::Node,
}

#[wasm_bindgen]
impl WasmCodec {
    /// Creates a new compiled codec from a JSON schema description.
    ///
    /// `schema_json` must deserialize into [`NodeDef`], which describes one
    /// of the seven node kinds `codec-core` supports (primitive, record,
    /// tuple, array, head-array, head-primitive, enum), recursively.
    #[wasm_bindgen(constructor)]
    pub fn new(schema_json: &str) -> Result<WasmCodec, JsValue> {
        let def: NodeDef = serde_json::from_str(schema_json).map_err(convert::error_to_js)?;
        let node = codec_core::registry::make(&def).map_err(convert::error_to_js)?;
        Ok(WasmCodec { node })
    }

    /// Decodes a binary payload according to this compiled schema.
    ///
    /// `data` is the raw byte slice (for example a `Uint8Array` passed from
    /// JS). The return value is a JavaScript value built from the decoded
    /// [`codec_core::value::Value`] tree.
    pub fn decode(&self, data: &[u8]) -> Result<JsValue, JsValue> {
        let (value, _consumed) = self.node.decode(data, 0).map_err(convert::error_to_js)?;
        convert::value_to_js(&value)
    }

    /// Encodes a JavaScript value according to this compiled schema.
    ///
    /// `obj` is converted through `serde_wasm_bindgen` into a generic JSON
    /// value and then into a [`codec_core::value::Value`] before encoding.
    pub fn encode(&self, obj: JsValue) -> Result<Vec<u8>, JsValue> {
        let json: serde_json::Value =
            serde_wasm_bindgen::from_value(obj).map_err(convert::error_to_js)?;
        let value = convert::json_to_value(json)?;
        self.node.encode(&value).map_err(convert::error_to_js)
    }
}
