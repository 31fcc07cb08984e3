//! # codec-core
//!
//! A library for declarative byte-level parsing and serialization of binary
//! formats using composable schema trees.
//!
//! Define a tree of [`node::Node`]s — primitives, records, tuples, arrays,
//! and enums — then decode a byte slice into a [`value::Value`] or encode a
//! `Value` back into bytes. Decoding and encoding are defined as inverses of
//! each other: decoding a schema's own encoded output always reproduces the
//! original value, byte for byte.
//!
//! ## Example
//!
//! ```
//! use codec_core::node::{Node, RecordChild};
//! use codec_core::value::Value;
//!
//! let point = Node::record(vec![
//!     RecordChild::new("x", Node::primitive("i2b").unwrap()),
//!     RecordChild::new("y", Node::primitive("i2b").unwrap()),
//! ])
//! .unwrap();
//!
//! let input = Value::Map(vec![
//!     ("x".to_string(), Value::I64(-2822)),
//!     ("y".to_string(), Value::I64(992)),
//! ]);
//!
//! let bytes = point.encode(&input).unwrap();
//! let (decoded, n) = point.decode(&bytes, 0).unwrap();
//! assert_eq!(decoded, input);
//! assert_eq!(n, bytes.len());
//! ```

pub mod error;
pub mod hooks;
pub mod node;
pub mod primitive;
#[cfg(feature = "serde")]
pub mod registry;
#[cfg(feature = "serde")]
pub mod schema_def;
pub mod sequence;
pub mod value;
