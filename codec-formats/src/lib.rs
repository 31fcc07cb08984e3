//! Binary format codecs built on top of `codec-core`'s schema-tree engine.
//!
//! Each format module composes `codec-core` node schemas with the format's
//! own container quirks — a sentinel chunk, a data-dependent entropy span,
//! a sub-record only one tag needs — as ordinary client code rather than
//! teaching the core node algebra about any particular format.

pub mod jpeg;
pub mod png;
