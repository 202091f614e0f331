//! The field descriptor algebra (L2) and the `undisguise` normalization
//! step used wherever a dynamic resolver or builder may hand back a
//! descriptor, a schema handle, or a bare literal.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::mapper::ValueMapper;
use crate::record::RecordSchema;
use crate::value::Value;

/// A read-only view of already-decoded sibling fields, grown incrementally
/// as a record's fields are decoded in order. Also carries the record's
/// externally supplied context, if any.
pub struct SiblingView<'a> {
    fields: &'a IndexMap<String, Value>,
    context: Option<&'a Value>,
}

impl<'a> SiblingView<'a> {
    pub fn new(fields: &'a IndexMap<String, Value>, context: Option<&'a Value>) -> Self {
        SiblingView { fields, context }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn context(&self) -> Option<&Value> {
        self.context
    }
}

/// The "could be a descriptor, a schema handle, or a bare literal" union a
/// `DynSelf`/`DynSelfN` resolver returns, and a builder argument may be
/// expressed as, before normalization.
pub enum FieldSpec {
    Descriptor(FieldDescriptor),
    Schema(Arc<RecordSchema>),
    LitBytes(Vec<u8>),
    LitStr(String),
    Unit,
}

impl FieldSpec {
    /// Normalizes a [`FieldSpec`] into a concrete [`FieldDescriptor`]
    /// ("undisguise"). A schema handle becomes a `Record` descriptor sized
    /// to the schema's static length; fails if the schema has no static
    /// length. A byte/string literal becomes a `Lit` descriptor over the
    /// matching fixed-width field.
    pub fn undisguise(self) -> Result<FieldDescriptor> {
        match self {
            FieldSpec::Descriptor(d) => Ok(d),
            FieldSpec::Schema(schema) => {
                let width = schema.length().ok_or_else(|| Error::SchemaDefinition {
                    schema: schema.name().to_string(),
                    reason: "nested record descriptor requires a schema of static length".into(),
                })?;
                Ok(FieldDescriptor::Record {
                    schema,
                    width,
                    default: None,
                })
            }
            FieldSpec::LitBytes(bytes) => {
                let width = bytes.len();
                Ok(FieldDescriptor::Lit {
                    inner: Box::new(FieldDescriptor::bytes(width)),
                    value: Value::Bytes(bytes),
                })
            }
            FieldSpec::LitStr(s) => {
                let width = s.as_bytes().len();
                Ok(FieldDescriptor::Lit {
                    inner: Box::new(FieldDescriptor::str(width)),
                    value: Value::Str(s),
                })
            }
            FieldSpec::Unit => Ok(FieldDescriptor::None { default: None }),
        }
    }
}

type DynResolver = Arc<dyn Fn(&SiblingView) -> Result<FieldSpec> + Send + Sync>;
type DynResolverN = Arc<dyn Fn(&SiblingView, usize) -> Result<FieldSpec> + Send + Sync>;

/// The L2 field descriptor algebra. Built by the `bf_*` builders in
/// `builders.rs`; interpreted by the decode/encode traversals in
/// `codec.rs`.
#[derive(Clone)]
pub enum FieldDescriptor {
    /// A raw run of `width` bits.
    Bits { width: u32, default: Option<Value> },
    /// `count` contiguous repetitions of `inner`.
    List {
        inner: Box<FieldDescriptor>,
        count: usize,
        default: Option<Value>,
    },
    /// A bijective view of `inner` through `mapper`.
    Map {
        inner: Box<FieldDescriptor>,
        mapper: Arc<dyn ValueMapper>,
        default: Option<Value>,
    },
    /// `inner`, constrained to always equal `value`.
    Lit {
        inner: Box<FieldDescriptor>,
        value: Value,
    },
    /// A zero-bit absent/unit marker.
    None { default: Option<Value> },
    /// A nested record of exactly `width` bits.
    Record {
        schema: Arc<RecordSchema>,
        width: usize,
        default: Option<Value>,
    },
    /// A descriptor resolved from already-decoded sibling fields.
    DynSelf {
        resolve: DynResolver,
        default: Option<Value>,
    },
    /// A descriptor resolved from sibling fields and the number of bits
    /// remaining in the stream.
    DynSelfN {
        resolve: DynResolverN,
        default: Option<Value>,
    },
}

impl FieldDescriptor {
    pub fn int(width: u32) -> FieldDescriptor {
        FieldDescriptor::Map {
            inner: Box::new(FieldDescriptor::Bits {
                width,
                default: None,
            }),
            mapper: Arc::new(crate::mapper::IntMapper),
            default: None,
        }
    }

    /// A fixed `width`-byte block, plain (not literal-constrained).
    pub fn bytes(width: usize) -> FieldDescriptor {
        FieldDescriptor::Map {
            inner: Box::new(FieldDescriptor::List {
                inner: Box::new(FieldDescriptor::int(8)),
                count: width,
                default: None,
            }),
            mapper: Arc::new(crate::mapper::BytesMapper),
            default: None,
        }
    }

    /// A fixed `width`-byte UTF-8 string block, plain (not
    /// literal-constrained).
    pub fn str(width: usize) -> FieldDescriptor {
        FieldDescriptor::Map {
            inner: Box::new(FieldDescriptor::bytes(width)),
            mapper: Arc::new(crate::mapper::StrMapper),
            default: None,
        }
    }

    /// Static bit length, if every nested descriptor has one; `None` for
    /// any descriptor containing a dynamic dispatch.
    pub fn length(&self) -> Option<usize> {
        match self {
            FieldDescriptor::Bits { width, .. } => Some(*width as usize),
            FieldDescriptor::List { inner, count, .. } => inner.length().map(|l| l * count),
            FieldDescriptor::Map { inner, .. } => inner.length(),
            FieldDescriptor::Lit { inner, .. } => inner.length(),
            FieldDescriptor::None { .. } => Some(0),
            FieldDescriptor::Record { width, .. } => Some(*width),
            FieldDescriptor::DynSelf { .. } | FieldDescriptor::DynSelfN { .. } => None,
        }
    }

    /// True if any descriptor *nested inside* this one (not this descriptor
    /// itself) carries a default. A declared field's own, outermost
    /// descriptor is allowed a default; a default on anything underneath
    /// it would be ambiguous (whose default wins?) and is rejected at
    /// schema-build time.
    pub fn has_nested_default(&self) -> bool {
        match self {
            FieldDescriptor::List { inner, .. }
            | FieldDescriptor::Map { inner, .. }
            | FieldDescriptor::Lit { inner, .. } => {
                inner.default_value().is_some() || inner.has_nested_default()
            }
            FieldDescriptor::Bits { .. }
            | FieldDescriptor::None { .. }
            | FieldDescriptor::Record { .. }
            | FieldDescriptor::DynSelf { .. }
            | FieldDescriptor::DynSelfN { .. } => false,
        }
    }

    pub fn default_value(&self) -> Option<&Value> {
        match self {
            FieldDescriptor::Bits { default, .. }
            | FieldDescriptor::List { default, .. }
            | FieldDescriptor::Map { default, .. }
            | FieldDescriptor::None { default }
            | FieldDescriptor::Record { default, .. }
            | FieldDescriptor::DynSelf { default, .. }
            | FieldDescriptor::DynSelfN { default, .. } => default.as_ref(),
            FieldDescriptor::Lit { value, .. } => Some(value),
        }
    }

    /// Checks a declared default against this descriptor's own shape: a
    /// `List` default must supply exactly `count` items; a `Bytes`/`Str`
    /// default must match the declared byte width. Returns the mismatch
    /// reason, if any; `None` if the default is absent or its width can't
    /// be statically known (e.g. nested under a dynamic dispatch).
    pub fn default_width_mismatch(&self) -> Option<String> {
        let default = self.default_value()?;
        match (self, default) {
            (FieldDescriptor::List { count, .. }, Value::List(items)) => {
                if items.len() != *count {
                    Some(format!(
                        "default has {} item(s), expected {count}",
                        items.len()
                    ))
                } else {
                    None
                }
            }
            (_, Value::Bytes(bytes)) => {
                let bits = self.length()?;
                if bits % 8 == 0 && bytes.len() * 8 != bits {
                    Some(format!(
                        "default has {} byte(s), expected {}",
                        bytes.len(),
                        bits / 8
                    ))
                } else {
                    None
                }
            }
            (_, Value::Str(s)) => {
                let bits = self.length()?;
                let byte_len = s.as_bytes().len();
                if bits % 8 == 0 && byte_len * 8 != bits {
                    Some(format!(
                        "default is {byte_len} byte(s) when UTF-8 encoded, expected {}",
                        bits / 8
                    ))
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}
