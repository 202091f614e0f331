//! Error taxonomy for schema construction, decode and encode.
//!
//! Every fallible operation in this crate returns [`Error`]. Per-field
//! failures are wrapped with [`Error::Field`] as they propagate out of a
//! nested decode or encode call, building a dotted `schema.field` trace.

use thiserror::Error;

/// Errors produced while building, decoding, or encoding a record schema.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised at schema finalization time; never at decode/encode time.
    #[error("invalid schema `{schema}`: {reason}")]
    SchemaDefinition { schema: String, reason: String },

    /// Decode requested more bits than remain in the stream.
    #[error("short buffer: requested {requested} bits, {available} available")]
    ShortBuffer { requested: usize, available: usize },

    /// A literal field decoded to something other than its required value.
    #[error("literal mismatch: expected {expected}, found {found}")]
    LiteralMismatch { expected: String, found: String },

    /// A bits/list/record value has the wrong width on encode, or a nested
    /// record did not consume exactly its declared width on decode.
    #[error("width mismatch: expected {expected} bits, found {found} bits")]
    WidthMismatch { expected: usize, found: usize },

    /// An integer value does not fit in the declared bit width, or the
    /// width itself exceeds what this crate can represent as a single
    /// mapped integer.
    #[error("value out of range: {value} does not fit in {bits} bits")]
    ValueOutOfRange { value: String, bits: u32 },

    /// A mapper's `back` conversion failed.
    #[error("mapper rejected value: {0}")]
    MapperRejected(String),

    /// Top-level `from_bits`/`from_bytes` left bits unconsumed.
    #[error("{leftover} bit(s) left over after decoding `{schema}`")]
    LeftoverBits { schema: String, leftover: usize },

    /// A `DynSelfN` resolver's return value could not be normalized into a
    /// descriptor, or its encode-side dispatch could not infer a schema
    /// from the value being encoded.
    #[error("dynamic dispatch failed in `{context}`: {reason}")]
    DynDispatch { context: String, reason: String },

    /// `to_bytes` was called on a buffer whose length isn't a multiple of 8.
    #[error("buffer of {bits} bits is not byte-aligned")]
    ByteAlignment { bits: usize },

    /// A field-level error, rewrapped with the field's name and the
    /// enclosing schema's name to form a dotted trace.
    #[error("error in field `{field}` of `{schema}`: {source}")]
    Field {
        schema: String,
        field: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wraps `self` as having occurred while decoding/encoding `field` of
    /// `schema`. Used uniformly by both interpreter traversals.
    pub fn in_field(self, schema: impl Into<String>, field: impl Into<String>) -> Error {
        Error::Field {
            schema: schema.into(),
            field: field.into(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
