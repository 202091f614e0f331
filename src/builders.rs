//! L5: convenience constructors lowering high-level field intents into
//! [`FieldDescriptor`]s, plus the `dyn` constructors split by resolver
//! arity (see DESIGN.md, "Dynamic dispatch arity").

use std::sync::Arc;

use crate::field::{FieldDescriptor, FieldSpec, SiblingView};
use crate::mapper::{IntEnumMapper, Scale, ValueMapper};
use crate::value::{EnumSpec, Value};

/// An unsigned integer of `width` bits.
pub fn bf_int(width: u32) -> FieldDescriptor {
    FieldDescriptor::int(width)
}

/// An unsigned integer of `width` bits, with a default used when a caller
/// constructs a record without supplying this field explicitly.
pub fn bf_int_default(width: u32, default: u128) -> FieldDescriptor {
    with_default(FieldDescriptor::int(width), Value::UInt(default))
}

/// A single bit interpreted as a bool.
pub fn bf_bool() -> FieldDescriptor {
    FieldDescriptor::Map {
        inner: Box::new(FieldDescriptor::int(1)),
        mapper: Arc::new(crate::mapper::BoolMapper),
        default: None,
    }
}

/// A `width`-bit integer mapped through a symbolic enum table. Unknown
/// integer values decode to `Value::Enum { name: None, .. }` rather than
/// failing.
pub fn bf_int_enum(width: u32, spec: Arc<EnumSpec>) -> FieldDescriptor {
    FieldDescriptor::Map {
        inner: Box::new(FieldDescriptor::int(width)),
        mapper: Arc::new(IntEnumMapper::new(spec)),
        default: None,
    }
}

/// A fixed `width`-byte block.
pub fn bf_bytes(width: usize) -> FieldDescriptor {
    FieldDescriptor::bytes(width)
}

/// A fixed `width`-byte UTF-8 string.
pub fn bf_str(width: usize) -> FieldDescriptor {
    FieldDescriptor::str(width)
}

/// `count` contiguous repetitions of `item`.
pub fn bf_list(item: FieldDescriptor, count: usize) -> FieldDescriptor {
    FieldDescriptor::List {
        inner: Box::new(item),
        count,
        default: None,
    }
}

/// An arbitrary bijective mapper over `inner`.
pub fn bf_map(inner: FieldDescriptor, mapper: Arc<dyn ValueMapper>) -> FieldDescriptor {
    FieldDescriptor::Map {
        inner: Box::new(inner),
        mapper,
        default: None,
    }
}

/// A fixed-point scale mapper over a `width`-bit integer, rounded to
/// `decimals` decimal places. The decoded value is a formatted string
/// (`Value::Str`) since the scaled quantity is not generally representable
/// as an exact integer.
pub fn bf_scaled_int(width: u32, factor: f64, decimals: i32) -> FieldDescriptor {
    bf_map(FieldDescriptor::int(width), Arc::new(Scale::new(factor, decimals)))
}

/// `inner`, constrained to always equal `value` on both decode and encode.
pub fn bf_lit(inner: FieldDescriptor, value: Value) -> FieldDescriptor {
    FieldDescriptor::Lit {
        inner: Box::new(inner),
        value,
    }
}

/// A `width`-bit literal integer field.
pub fn bf_lit_int(width: u32, value: u128) -> FieldDescriptor {
    bf_lit(FieldDescriptor::int(width), Value::UInt(value))
}

/// A zero-bit absent/unit marker.
pub fn bf_none() -> FieldDescriptor {
    FieldDescriptor::None { default: None }
}

/// A nested record of `schema`'s static width. Fails if `schema` has no
/// static length (§4.5 undisguise).
pub fn bf_record(schema: Arc<crate::record::RecordSchema>) -> crate::error::Result<FieldDescriptor> {
    FieldSpec::Schema(schema).undisguise()
}

/// A late-bound descriptor resolved from already-decoded sibling fields.
/// Split out of a single overloaded `bf_dyn` (as the source has it,
/// distinguished there by resolver arity) into this and [`bf_dyn_n`]; see
/// DESIGN.md.
pub fn bf_dyn<F>(resolve: F) -> FieldDescriptor
where
    F: Fn(&SiblingView) -> crate::error::Result<FieldSpec> + Send + Sync + 'static,
{
    FieldDescriptor::DynSelf {
        resolve: Arc::new(resolve),
        default: None,
    }
}

/// A late-bound descriptor resolved from already-decoded sibling fields
/// *and* the number of bits remaining in the stream.
pub fn bf_dyn_n<F>(resolve: F) -> FieldDescriptor
where
    F: Fn(&SiblingView, usize) -> crate::error::Result<FieldSpec> + Send + Sync + 'static,
{
    FieldDescriptor::DynSelfN {
        resolve: Arc::new(resolve),
        default: None,
    }
}

/// Adds a default value to an already-built descriptor. Only legal as the
/// outermost wrapper for a declared field; nesting it further is rejected
/// at schema-build time.
pub fn with_default(descriptor: FieldDescriptor, default: Value) -> FieldDescriptor {
    match descriptor {
        FieldDescriptor::Bits { width, .. } => FieldDescriptor::Bits {
            width,
            default: Some(default),
        },
        FieldDescriptor::List { inner, count, .. } => FieldDescriptor::List {
            inner,
            count,
            default: Some(default),
        },
        FieldDescriptor::Map { inner, mapper, .. } => FieldDescriptor::Map {
            inner,
            mapper,
            default: Some(default),
        },
        FieldDescriptor::None { .. } => FieldDescriptor::None {
            default: Some(default),
        },
        FieldDescriptor::Record { schema, width, .. } => FieldDescriptor::Record {
            schema,
            width,
            default: Some(default),
        },
        FieldDescriptor::DynSelf { resolve, .. } => FieldDescriptor::DynSelf {
            resolve,
            default: Some(default),
        },
        FieldDescriptor::DynSelfN { resolve, .. } => FieldDescriptor::DynSelfN {
            resolve,
            default: Some(default),
        },
        // A literal's required value already serves as its default.
        lit @ FieldDescriptor::Lit { .. } => lit,
    }
}
