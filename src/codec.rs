//! L3: the decode/encode interpreter over a [`FieldDescriptor`] tree.
//!
//! `decode_field` and `encode_field` are mirror traversals: both recurse
//! structurally into a descriptor, but `DynSelfN`'s encode-side dispatch is
//! asymmetric (see its arm below and SPEC_FULL.md §4.5).

use crate::error::{Error, Result};
use crate::field::{FieldDescriptor, FieldSpec, SiblingView};
use crate::stream::BitStream;
use crate::value::Value;

pub fn decode_field(
    descriptor: &FieldDescriptor,
    stream: &mut BitStream,
    sibling: &SiblingView,
    schema_name: &str,
    field_name: &str,
) -> Result<Value> {
    let result = decode_inner(descriptor, stream, sibling, schema_name, field_name);
    result.map_err(|e| e.in_field(schema_name, field_name))
}

fn decode_inner(
    descriptor: &FieldDescriptor,
    stream: &mut BitStream,
    sibling: &SiblingView,
    schema_name: &str,
    field_name: &str,
) -> Result<Value> {
    match descriptor {
        FieldDescriptor::Bits { width, .. } => {
            let bits = stream.take(*width as usize)?;
            Ok(Value::UInt(bits.to_int()?))
        }
        FieldDescriptor::List { inner, count, .. } => {
            let mut items = Vec::with_capacity(*count);
            for _ in 0..*count {
                items.push(decode_field(inner, stream, sibling, schema_name, field_name)?);
            }
            Ok(Value::List(items))
        }
        FieldDescriptor::Map { inner, mapper, .. } => {
            let raw = decode_field(inner, stream, sibling, schema_name, field_name)?;
            mapper.forward(raw)
        }
        FieldDescriptor::Lit { inner, value } => {
            let decoded = decode_field(inner, stream, sibling, schema_name, field_name)?;
            if &decoded != value {
                return Err(Error::LiteralMismatch {
                    expected: format!("{value:?}"),
                    found: format!("{decoded:?}"),
                });
            }
            Ok(decoded)
        }
        FieldDescriptor::None { .. } => Ok(Value::None),
        FieldDescriptor::Record { schema, width, .. } => {
            let sub = stream.take(*width)?;
            let mut sub_stream = BitStream::new(sub);
            let record =
                crate::record::RecordSchema::decode_from_stream(schema, &mut sub_stream, sibling.context().cloned())?;
            if sub_stream.remaining() != 0 {
                return Err(Error::WidthMismatch {
                    expected: *width,
                    found: width - sub_stream.remaining(),
                });
            }
            Ok(Value::Record(std::sync::Arc::new(record)))
        }
        FieldDescriptor::DynSelf { resolve, .. } => {
            let spec = resolve(sibling)?;
            let resolved = spec.undisguise()?;
            decode_field(&resolved, stream, sibling, schema_name, field_name)
        }
        FieldDescriptor::DynSelfN { resolve, .. } => {
            let remaining = stream.remaining();
            let spec = resolve(sibling, remaining)?;
            let resolved = spec.undisguise()?;
            decode_field(&resolved, stream, sibling, schema_name, field_name)
        }
    }
}

pub fn encode_field(
    descriptor: &FieldDescriptor,
    value: &Value,
    sibling: &SiblingView,
    schema_name: &str,
    field_name: &str,
) -> Result<crate::bits::BitBuffer> {
    let result = encode_inner(descriptor, value, sibling, schema_name, field_name);
    result.map_err(|e| e.in_field(schema_name, field_name))
}

fn encode_inner(
    descriptor: &FieldDescriptor,
    value: &Value,
    sibling: &SiblingView,
    schema_name: &str,
    field_name: &str,
) -> Result<crate::bits::BitBuffer> {
    use crate::bits::BitBuffer;

    match descriptor {
        FieldDescriptor::Bits { width, .. } => {
            let v = value.as_uint().ok_or_else(|| Error::WidthMismatch {
                expected: *width as usize,
                found: 0,
            })?;
            BitBuffer::from_int(v, *width)
        }
        FieldDescriptor::List { inner, count, .. } => {
            let items = value.as_list().ok_or_else(|| Error::WidthMismatch {
                expected: *count,
                found: 0,
            })?;
            if items.len() != *count {
                return Err(Error::WidthMismatch {
                    expected: *count,
                    found: items.len(),
                });
            }
            let mut buffer = BitBuffer::empty();
            for item in items {
                buffer = buffer.concat(&encode_field(inner, item, sibling, schema_name, field_name)?);
            }
            Ok(buffer)
        }
        FieldDescriptor::Map { inner, mapper, .. } => {
            let raw = mapper.back(value)?;
            encode_field(inner, &raw, sibling, schema_name, field_name)
        }
        FieldDescriptor::Lit { inner, value: required } => {
            if value != required {
                return Err(Error::LiteralMismatch {
                    expected: format!("{required:?}"),
                    found: format!("{value:?}"),
                });
            }
            encode_field(inner, required, sibling, schema_name, field_name)
        }
        FieldDescriptor::None { .. } => {
            if !value.is_none() {
                return Err(Error::WidthMismatch {
                    expected: 0,
                    found: 1,
                });
            }
            Ok(BitBuffer::empty())
        }
        FieldDescriptor::Record { width, .. } => {
            let record = value.as_record().ok_or_else(|| Error::WidthMismatch {
                expected: *width,
                found: 0,
            })?;
            let bits = record.to_bits(sibling.context().cloned())?;
            if bits.len() != *width {
                return Err(Error::WidthMismatch {
                    expected: *width,
                    found: bits.len(),
                });
            }
            Ok(bits)
        }
        FieldDescriptor::DynSelf { resolve, .. } => {
            let spec = resolve(sibling)?;
            let resolved = spec.undisguise()?;
            encode_field(&resolved, value, sibling, schema_name, field_name)
        }
        FieldDescriptor::DynSelfN { .. } => {
            let resolved = dyn_self_n_encode_descriptor(value, field_name)?;
            encode_field(&resolved, value, sibling, schema_name, field_name)
        }
    }
}

/// `DynSelfN`'s encode-side dispatch: unlike decode, the number of bits
/// remaining in the output is not known yet, so the descriptor is chosen
/// from the *value*'s own shape instead of from a resolver call.
fn dyn_self_n_encode_descriptor(value: &Value, field_name: &str) -> Result<FieldDescriptor> {
    match value {
        Value::Record(record) => {
            let schema = record.schema();
            let width = schema.length().ok_or_else(|| Error::DynDispatch {
                context: field_name.to_string(),
                reason: "nested record has no static length".into(),
            })?;
            Ok(FieldDescriptor::Record {
                schema,
                width,
                default: None,
            })
        }
        Value::Bytes(b) => Ok(FieldDescriptor::bytes(b.len())),
        Value::Str(s) => Ok(FieldDescriptor::str(s.as_bytes().len())),
        Value::None => Ok(FieldDescriptor::None { default: None }),
        other => Err(Error::DynDispatch {
            context: field_name.to_string(),
            reason: format!("cannot infer an encoding for {other:?}"),
        }),
    }
}
