//! Error kinds the engine distinguishes, split the way `bitcraft` splits
//! `CompileError` (schema construction) from `ReadError` (decode), plus a
//! third kind for encode-time failures `bitcraft`'s read-only engine never
//! needed.

use std::fmt;

/// Identifies the child (by field name or array/tuple index) at which a
/// composite node's decode or encode failed, innermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, ".{name}"),
            PathSegment::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// Failures that can occur while building a schema tree (node construction,
/// reification via the type registry).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("unknown type name: {0}")]
    UnknownTypeName(String),
    #[error("record field names must be unique and non-empty; duplicate or missing name")]
    InvalidFieldName,
    #[error("array node must have exactly one child schema")]
    InvalidArrayChild,
    #[error("head-array node must have exactly one child schema")]
    InvalidHeadArrayChild,
    #[error("enum node has more than one default entry")]
    MultipleEnumDefaults,
    #[error("numeric type width must be 1, 2, 4, or 8 bytes, or variable-length")]
    InvalidWidth,
    #[error("float type cannot be variable-length")]
    InvalidFloatWidth,
    #[error("schema description for node kind `{1}` is missing required field `{0}`")]
    MissingDefField(String, String),
}

/// Failures that occur while encoding or decoding a value against a schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("unknown type name: {0}")]
    UnknownTypeName(String),

    #[error("buffer underflow: needed {needed} bytes at offset {offset}, have {available}")]
    BufferUnderflow {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("length mismatch: {0}")]
    LengthMismatch(String),

    #[error("missing field `{0}` on encode")]
    MissingField(String),

    #[error("unrepresentable value: {0}")]
    UnrepresentableValue(String),

    #[error("enum fallthrough: no entry matched and no default is configured")]
    EnumFallthrough,

    #[error("interior NUL byte in cstr value")]
    InteriorNul,

    #[error("malformed UTF-8")]
    MalformedUtf8,

    /// Wraps another error with the composite-node path at which it occurred.
    #[error("at {}: {source}", path.iter().map(ToString::to_string).collect::<String>())]
    AtPath {
        path: Vec<PathSegment>,
        #[source]
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// Prepends a path segment, wrapping `self` (or extending an existing
    /// [`CodecError::AtPath`]) so composite nodes can report where in the
    /// tree a failure occurred, innermost segment last.
    pub fn with_segment(self, segment: PathSegment) -> CodecError {
        match self {
            CodecError::AtPath { mut path, source } => {
                path.insert(0, segment);
                CodecError::AtPath { path, source }
            }
            other => CodecError::AtPath {
                path: vec![segment],
                source: Box::new(other),
            },
        }
    }
}

impl From<CompileError> for CodecError {
    fn from(value: CompileError) -> Self {
        match value {
            CompileError::UnknownTypeName(name) => CodecError::UnknownTypeName(name),
            other => CodecError::UnrepresentableValue(other.to_string()),
        }
    }
}
