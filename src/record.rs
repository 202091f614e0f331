//! L4: a named, ordered record schema and its decoded instances.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::bits::BitBuffer;
use crate::codec::{decode_field, encode_field};
use crate::error::{Error, Result};
use crate::field::{FieldDescriptor, FieldSpec, SiblingView};
use crate::stream::BitStream;
use crate::value::Value;

/// A schema: an ordered list of named field descriptors, an optional
/// bit-reorder permutation, and the schema's own name (used in error
/// traces).
pub struct RecordSchema {
    name: String,
    fields: IndexMap<String, FieldDescriptor>,
    reorder: Vec<usize>,
}

impl RecordSchema {
    /// Builds and validates a schema. `fields` is declaration order; each
    /// entry is undisguised into a concrete descriptor and checked for
    /// illegal nested defaults. `reorder`'s prefix must be a permutation of
    /// `0..reorder.len()` (empty means identity).
    pub fn build(
        name: impl Into<String>,
        fields: Vec<(String, FieldSpec)>,
        reorder: Vec<usize>,
    ) -> Result<Arc<RecordSchema>> {
        let name = name.into();
        BitBuffer::validate_permutation(&reorder).map_err(|e| match e {
            Error::SchemaDefinition { reason, .. } => Error::SchemaDefinition {
                schema: name.clone(),
                reason,
            },
            other => other,
        })?;

        let mut built = IndexMap::with_capacity(fields.len());
        for (field_name, spec) in fields {
            let descriptor = spec.undisguise().map_err(|e| e.in_field(&name, &field_name))?;
            if descriptor.has_nested_default() {
                return Err(Error::SchemaDefinition {
                    schema: name.clone(),
                    reason: format!(
                        "field `{field_name}` has a default on a descriptor nested inside it; only the outermost descriptor of a field (or a literal's required value) may carry a default"
                    ),
                });
            }
            if let Some(reason) = descriptor.default_width_mismatch() {
                return Err(Error::SchemaDefinition {
                    schema: name.clone(),
                    reason: format!("field `{field_name}` {reason}"),
                });
            }
            if built.insert(field_name.clone(), descriptor).is_some() {
                return Err(Error::SchemaDefinition {
                    schema: name.clone(),
                    reason: format!("duplicate field name `{field_name}`"),
                });
            }
        }

        Ok(Arc::new(RecordSchema {
            name,
            fields: built,
            reorder,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &IndexMap<String, FieldDescriptor> {
        &self.fields
    }

    /// The schema's total bit width, if every field is statically sized.
    pub fn length(&self) -> Option<usize> {
        let mut total = 0usize;
        for descriptor in self.fields.values() {
            total += descriptor.length()?;
        }
        Some(total)
    }

    /// Decodes a record from a byte string. Fails unless every bit is
    /// consumed. `schema` is the `Arc` handle shared with the decoded
    /// record, so nested/repeated decodes don't duplicate the schema.
    pub fn from_bytes(
        schema: &Arc<RecordSchema>,
        bytes: &[u8],
        context: Option<Value>,
    ) -> Result<Record> {
        Self::from_bits(schema, &BitBuffer::from_bytes(bytes)?, context)
    }

    /// Decodes a record from a bit buffer. Fails unless every bit is
    /// consumed.
    pub fn from_bits(
        schema: &Arc<RecordSchema>,
        bits: &BitBuffer,
        context: Option<Value>,
    ) -> Result<Record> {
        let mut stream = BitStream::new(bits.clone());
        let record = Self::decode_from_stream(schema, &mut stream, context)?;
        if stream.remaining() != 0 {
            return Err(Error::LeftoverBits {
                schema: schema.name.clone(),
                leftover: stream.remaining(),
            });
        }
        Ok(record)
    }

    /// Decodes a record from a stream positioned at its start, without
    /// requiring the stream to be fully consumed afterwards. Used when this
    /// schema appears as a nested `Record` descriptor, which already
    /// bounds the sub-stream to the declared width before delegating here.
    pub(crate) fn decode_from_stream(
        schema: &Arc<RecordSchema>,
        stream: &mut BitStream,
        context: Option<Value>,
    ) -> Result<Record> {
        let mut reordered = stream.reorder(&schema.reorder)?;
        let mut values: IndexMap<String, Value> = IndexMap::with_capacity(schema.fields.len());
        for (field_name, descriptor) in &schema.fields {
            let sibling = SiblingView::new(&values, context.as_ref());
            let value = decode_field(descriptor, &mut reordered, &sibling, &schema.name, field_name)?;
            values.insert(field_name.clone(), value);
        }
        *stream = reordered;
        Ok(Record {
            schema: schema.clone(),
            fields: values,
        })
    }

    /// The amount of schema-declared, pre-reorder bits a fully decoded
    /// instance of this schema occupies, if any dynamic field is present
    /// this cannot be known in advance and callers must rely on the stream
    /// cursor advancing as fields are read.
    pub fn reorder(&self) -> &[usize] {
        &self.reorder
    }
}

impl std::fmt::Debug for RecordSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordSchema")
            .field("name", &self.name)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// An instance of a [`RecordSchema`]: a named value for each declared
/// field, in declaration order.
pub struct Record {
    schema: Arc<RecordSchema>,
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Builds a record from explicit field values, filling any field absent
    /// from `fields` with its descriptor's default. Fails if a missing
    /// field has no default.
    pub fn new(schema: Arc<RecordSchema>, fields: IndexMap<String, Value>) -> Result<Self> {
        let mut filled = IndexMap::with_capacity(schema.fields.len());
        for (name, descriptor) in &schema.fields {
            let value = match fields.get(name) {
                Some(value) => value.clone(),
                None => descriptor.default_value().cloned().ok_or_else(|| Error::SchemaDefinition {
                    schema: schema.name.clone(),
                    reason: format!("missing value for field `{name}` and no default is declared"),
                })?,
            };
            filled.insert(name.clone(), value);
        }
        Ok(Record { schema, fields: filled })
    }

    pub fn schema(&self) -> Arc<RecordSchema> {
        self.schema.clone()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    pub fn to_bytes(&self, context: Option<Value>) -> Result<Vec<u8>> {
        self.to_bits(context)?.to_bytes()
    }

    pub fn to_bits(&self, context: Option<Value>) -> Result<BitBuffer> {
        let sibling = SiblingView::new(&self.fields, context.as_ref());
        let mut buffer = BitBuffer::empty();
        for (field_name, descriptor) in &self.schema.fields {
            let value = self.fields.get(field_name).expect("constructed with all fields present");
            let encoded = encode_field(descriptor, value, &sibling, &self.schema.name, field_name)?;
            buffer = buffer.concat(&encoded);
        }
        buffer.unreorder(&self.schema.reorder).map_err(|e| match e {
            Error::SchemaDefinition { reason, .. } => Error::SchemaDefinition {
                schema: self.schema.name.clone(),
                reason,
            },
            other => other,
        })
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) && self.fields == other.fields
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(self.schema.name())
            .field("fields", &self.fields)
            .finish()
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.schema.name())?;
        write!(f, " {{ ")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value:?}")?;
        }
        write!(f, " }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{bf_int, bf_lit_int};

    fn packed_int_schema() -> Arc<RecordSchema> {
        RecordSchema::build(
            "Packed",
            vec![
                ("a".into(), FieldSpec::Descriptor(bf_int(3))),
                ("b".into(), FieldSpec::Descriptor(bf_int(5))),
            ],
            vec![],
        )
        .unwrap()
    }

    mod build {
        use super::*;

        #[test]
        fn rejects_duplicate_field_names() {
            let result = RecordSchema::build(
                "Dup",
                vec![
                    ("a".into(), FieldSpec::Descriptor(bf_int(4))),
                    ("a".into(), FieldSpec::Descriptor(bf_int(4))),
                ],
                vec![],
            );
            assert!(result.is_err());
        }

        #[test]
        fn rejects_invalid_reorder_prefix() {
            let result = RecordSchema::build(
                "Bad",
                vec![("a".into(), FieldSpec::Descriptor(bf_int(8)))],
                vec![0, 0],
            );
            assert!(result.is_err());
        }

        #[test]
        fn rejects_list_default_of_wrong_length() {
            use crate::builders::{bf_list, with_default};
            use crate::value::Value;

            let result = RecordSchema::build(
                "BadListDefault",
                vec![(
                    "xs".into(),
                    FieldSpec::Descriptor(with_default(
                        bf_list(bf_int(8), 2),
                        Value::List(vec![Value::UInt(0)]),
                    )),
                )],
                vec![],
            );
            assert!(result.is_err());
        }

        #[test]
        fn rejects_bytes_default_of_wrong_width() {
            use crate::builders::{bf_bytes, with_default};
            use crate::value::Value;

            let result = RecordSchema::build(
                "BadBytesDefault",
                vec![(
                    "payload".into(),
                    FieldSpec::Descriptor(with_default(bf_bytes(4), Value::Bytes(vec![0, 1]))),
                )],
                vec![],
            );
            assert!(result.is_err());
        }
    }

    mod defaults {
        use super::*;
        use crate::builders::{bf_int_default, with_default};
        use crate::value::Value;

        #[test]
        fn missing_field_falls_back_to_its_default() {
            let schema = RecordSchema::build(
                "WithDefault",
                vec![
                    ("a".into(), FieldSpec::Descriptor(bf_int(3))),
                    ("b".into(), FieldSpec::Descriptor(bf_int_default(5, 9))),
                ],
                vec![],
            )
            .unwrap();

            let mut fields = IndexMap::new();
            fields.insert("a".to_string(), Value::UInt(5));
            let record = Record::new(schema, fields).unwrap();
            assert_eq!(record.get("b").unwrap().as_uint(), Some(9));
        }

        #[test]
        fn missing_field_without_a_default_is_rejected() {
            let schema = RecordSchema::build(
                "NoDefault",
                vec![("a".into(), FieldSpec::Descriptor(bf_int(3)))],
                vec![],
            )
            .unwrap();
            assert!(Record::new(schema, IndexMap::new()).is_err());
        }

        #[test]
        fn explicit_value_overrides_default() {
            let schema = RecordSchema::build(
                "Overridden",
                vec![("a".into(), FieldSpec::Descriptor(with_default(bf_int(4), Value::UInt(1))))],
                vec![],
            )
            .unwrap();
            let mut fields = IndexMap::new();
            fields.insert("a".to_string(), Value::UInt(7));
            let record = Record::new(schema, fields).unwrap();
            assert_eq!(record.get("a").unwrap().as_uint(), Some(7));
        }
    }

    mod roundtrip {
        use super::*;

        #[test]
        fn packed_int_record_roundtrips() {
            let schema = packed_int_schema();
            let record = RecordSchema::from_bytes(&schema, &[0xA9], None)
                .expect("0b101_01001 decodes cleanly");
            assert_eq!(record.get("a").unwrap().as_uint(), Some(5));
            assert_eq!(record.get("b").unwrap().as_uint(), Some(9));
            assert_eq!(record.to_bytes(None).unwrap(), vec![0xA9]);
        }

        #[test]
        fn leftover_bits_rejected() {
            let schema = packed_int_schema();
            let result = RecordSchema::from_bytes(&schema, &[0xA9, 0x00], None);
            assert!(result.is_err());
        }
    }

    mod literal_discipline {
        use super::*;

        #[test]
        fn literal_mismatch_is_rejected() {
            let schema = RecordSchema::build(
                "Tagged",
                vec![
                    ("tag".into(), FieldSpec::Descriptor(bf_lit_int(4, 0xA))),
                    ("payload".into(), FieldSpec::Descriptor(bf_int(4))),
                ],
                vec![],
            )
            .unwrap();
            assert!(RecordSchema::from_bytes(&schema, &[0xA7], None).is_ok());
            assert!(RecordSchema::from_bytes(&schema, &[0xB7], None).is_err());
        }
    }
}
