//! Override points for composite nodes whose decode/encode cannot be
//! expressed as a fixed composition of the algebraic node kinds.
//!
//! Two realizations are used in this engine, chosen per the shape of the
//! dependency:
//!
//! - **Declarative.** A [`crate::node::record::ArgSource`] on a record/tuple
//!   child lets a later field's decode args be computed from an
//!   already-decoded sibling (e.g. a `bytes` field sized by an earlier `u4b`
//!   length field). No trait object needed; this is dependent fields in
//!   their simplest form.
//! - **Trait-object hooks**, defined here, for [`crate::node::array::Array`]
//!   nodes whose element count is not known ahead of time but is instead
//!   determined by a data-dependent termination condition (JPEG's
//!   entropy-coded span, PNG's `IEND` sentinel chunk): decide whether to
//!   keep consuming elements, and optionally synthesize extra ones.

use crate::error::CodecError;
use crate::value::Value;

/// What an [`ArraySequenceHooks`] implementation decides before the engine
/// would otherwise decode the next element of a dynamically-terminated
/// array.
pub enum SequenceStep {
    /// Decode the next element normally.
    Continue,
    /// Stop decoding ordinary elements. `extra` are synthetic values to
    /// fabricate and append to the result; `extra_bytes` is how many
    /// additional bytes beyond `offset` those synthetic entries consumed.
    Stop {
        extra: Vec<Value>,
        extra_bytes: usize,
    },
}

/// Mirror of [`SequenceStep`] for the encode direction.
pub enum SequenceEncodeStep {
    /// Encode the next element normally.
    Continue,
    /// Stop encoding ordinary elements; append `bytes` verbatim and finish.
    StopWithExtra(Vec<u8>),
}

/// Hooks attached to an [`crate::node::array::Array`] node to drive
/// data-dependent sequencing. The default (no hooks) is the pure algebraic
/// array: decode exactly `length` elements, stop.
pub trait ArraySequenceHooks: std::fmt::Debug {
    /// Called before decoding the element at `index`. `buf`/`offset` point
    /// at the position the next element would start at; `decoded_so_far`
    /// holds every element decoded for this array up to `index`.
    fn before_decode(
        &self,
        index: usize,
        buf: &[u8],
        offset: usize,
        decoded_so_far: &[Value],
    ) -> Result<SequenceStep, CodecError>;

    /// Called before encoding the element at `index` of `values`. Lets an
    /// override emit a synthetic trailing span (e.g. the JPEG entropy-coded
    /// span, stored as a `Value::Bytes` entry with no corresponding element
    /// schema) instead of invoking the ordinary element encoder.
    fn before_encode(&self, index: usize, values: &[Value]) -> SequenceEncodeStep;
}
