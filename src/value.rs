//! The runtime value domain decoded/encoded records are made of.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;
// `Deserialize` stays imported for `EnumSpec` below; `Value` only ever
// serializes (see its manual `Serialize` impl further down).

use crate::record::Record;

/// A name ↔ integer-value table for `bf_int_enum` fields, built by the
/// caller since concrete message enums are outside this crate's scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumSpec {
    name: String,
    variants: IndexMap<String, u128>,
}

impl EnumSpec {
    pub fn new(name: impl Into<String>) -> Self {
        EnumSpec {
            name: name.into(),
            variants: IndexMap::new(),
        }
    }

    pub fn with_variant(mut self, name: impl Into<String>, value: u128) -> Self {
        self.variants.insert(name.into(), value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_of(&self, value: u128) -> Option<&str> {
        self.variants
            .iter()
            .find(|(_, v)| **v == value)
            .map(|(k, _)| k.as_str())
    }

    pub fn value_of(&self, name: &str) -> Option<u128> {
        self.variants.get(name).copied()
    }

    pub fn contains(&self, value: u128) -> bool {
        self.variants.values().any(|v| *v == value)
    }
}

/// A decoded or to-be-encoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A raw, unsigned integer of up to 128 bits.
    UInt(u128),
    Bool(bool),
    Bytes(Vec<u8>),
    Str(String),
    /// A symbolic enum value: the decoded integer plus its resolved name,
    /// if the integer matched a known variant.
    Enum {
        spec: Arc<EnumSpec>,
        raw: u128,
        name: Option<String>,
    },
    List(Vec<Value>),
    Record(Arc<Record>),
    /// The zero-bit absent/unit marker (`bf_none`).
    None,
}

impl Value {
    pub fn as_uint(&self) -> Option<u128> {
        match self {
            Value::UInt(v) => Some(*v),
            Value::Enum { raw, .. } => Some(*raw),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Arc<Record>> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }
}

/// Serializes a decoded value for a host application's own purposes (JSON,
/// YAML, logs, ...). A nested record serializes as its field map, not its
/// schema; there is deliberately no `Deserialize` impl, since reconstructing
/// a `Record` would require recovering a `RecordSchema` with its resolver
/// closures and mappers, which this representation does not carry.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::UInt(v) => serializer.serialize_str(&v.to_string()),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Bytes(b) => serializer.serialize_bytes(b),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Enum { spec, raw, name } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("enum", spec.name())?;
                map.serialize_entry("raw", &raw.to_string())?;
                map.serialize_entry("name", name)?;
                map.end()
            }
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Record(record) => record.fields().serialize(serializer),
            Value::None => serializer.serialize_unit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod enum_spec {
        use super::*;

        #[test]
        fn resolves_name_by_value() {
            let spec = EnumSpec::new("Modulation")
                .with_variant("Fm", 0)
                .with_variant("Am", 1);
            assert_eq!(spec.name_of(1), Some("Am"));
            assert_eq!(spec.name_of(2), None);
            assert!(spec.contains(0));
            assert!(!spec.contains(2));
        }
    }

    mod accessors {
        use super::*;

        #[test]
        fn uint_accessor_covers_enum_too() {
            let spec = Arc::new(EnumSpec::new("X").with_variant("A", 3));
            let v = Value::Enum {
                spec,
                raw: 3,
                name: Some("A".into()),
            };
            assert_eq!(v.as_uint(), Some(3));
        }

        #[test]
        fn none_is_recognized() {
            assert!(Value::None.is_none());
            assert!(!Value::Bool(false).is_none());
        }
    }
}
