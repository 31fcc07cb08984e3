//! The in-memory value domain traversed by schema nodes during encode/decode.
//!
//! A [`Value`] is a recursive sum of scalars, sequences, ordered maps, and
//! tagged variants (the latter used internally by enum nodes). Field order in
//! [`Value::Map`] is significant: it is the record's encode order, so `Map`
//! is a `Vec` of pairs rather than a `HashMap`.

/// A decoded or to-be-encoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// An ordered sequence of values (tuple, array, or dynamic list).
    Seq(Vec<Value>),
    /// A field-name to value mapping; insertion order is the wire order.
    Map(Vec<(String, Value)>),
    /// Pairs a scalar with the byte literal that tagged it on the wire.
    /// Produced by enum-entry nodes; `literal` is not usually meaningful to
    /// user code beyond round-tripping.
    Variant {
        tag: Box<Value>,
        literal: Vec<u8>,
    },
}

impl Value {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U64(v) => Some(*v),
            Value::I64(v) if *v >= 0 => Some(*v as u64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            Value::U64(v) if *v <= i64::MAX as u64 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(s) => Some(s.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Map(m) => Some(m.as_slice()),
            _ => None,
        }
    }

    /// Looks up a field by name in a [`Value::Map`]. Returns `None` if this
    /// is not a map or the field is absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_map()?.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Unwraps a [`Value::Variant`] into its tag, ignoring the literal.
    pub fn into_tag(self) -> Value {
        match self {
            Value::Variant { tag, .. } => *tag,
            other => other,
        }
    }
}
