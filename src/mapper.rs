//! Bijective value mappers used by `Map` descriptors.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::value::{EnumSpec, Value};

/// A bijective conversion between a field's on-wire representation and the
/// [`Value`] a caller sees. `forward` runs at decode time, `back` at encode
/// time.
pub trait ValueMapper: Send + Sync {
    fn forward(&self, raw: Value) -> Result<Value>;
    fn back(&self, value: &Value) -> Result<Value>;
}

/// Converts a raw `UInt` to/from an unsigned integer `Value`. Also the
/// identity mapper for `bf_int`, since the underlying `Bits` decoder already
/// produces a `Value::UInt`.
pub struct IntMapper;

impl ValueMapper for IntMapper {
    fn forward(&self, raw: Value) -> Result<Value> {
        Ok(raw)
    }

    fn back(&self, value: &Value) -> Result<Value> {
        match value.as_uint() {
            Some(v) => Ok(Value::UInt(v)),
            None => Err(Error::MapperRejected(format!(
                "expected an unsigned integer, found {value:?}"
            ))),
        }
    }
}

/// Maps a 1-bit integer to/from a bool.
pub struct BoolMapper;

impl ValueMapper for BoolMapper {
    fn forward(&self, raw: Value) -> Result<Value> {
        match raw.as_uint() {
            Some(v) => Ok(Value::Bool(v == 1)),
            None => Err(Error::MapperRejected("bool mapper expects a 1-bit integer".into())),
        }
    }

    fn back(&self, value: &Value) -> Result<Value> {
        match value.as_bool() {
            Some(b) => Ok(Value::UInt(b as u128)),
            None => Err(Error::MapperRejected(format!(
                "expected a bool, found {value:?}"
            ))),
        }
    }
}

/// Maps a raw integer to/from a symbolic [`Value::Enum`] backed by an
/// [`EnumSpec`]. Unknown integer values are preserved (`name: None`) rather
/// than rejected, matching how `IntEnum` round-trips unrecognized values in
/// the protocol this crate's dynamic dispatch is modeled on.
pub struct IntEnumMapper {
    spec: Arc<EnumSpec>,
}

impl IntEnumMapper {
    pub fn new(spec: Arc<EnumSpec>) -> Self {
        IntEnumMapper { spec }
    }
}

impl ValueMapper for IntEnumMapper {
    fn forward(&self, raw: Value) -> Result<Value> {
        let raw_val = raw.as_uint().ok_or_else(|| {
            Error::MapperRejected("int-enum mapper expects an unsigned integer".into())
        })?;
        let name = self.spec.name_of(raw_val).map(|s| s.to_string());
        Ok(Value::Enum {
            spec: self.spec.clone(),
            raw: raw_val,
            name,
        })
    }

    fn back(&self, value: &Value) -> Result<Value> {
        match value {
            Value::Enum { raw, .. } => Ok(Value::UInt(*raw)),
            Value::UInt(v) => Ok(Value::UInt(*v)),
            _ => Err(Error::MapperRejected(format!(
                "expected an enum or unsigned integer, found {value:?}"
            ))),
        }
    }
}

/// Maps a list of byte-wide `UInt`s to/from a `Value::Bytes`.
pub struct BytesMapper;

impl ValueMapper for BytesMapper {
    fn forward(&self, raw: Value) -> Result<Value> {
        let items = raw
            .as_list()
            .ok_or_else(|| Error::MapperRejected("bytes mapper expects a list".into()))?;
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let byte = item
                .as_uint()
                .ok_or_else(|| Error::MapperRejected("bytes mapper expects byte-wide ints".into()))?;
            out.push(byte as u8);
        }
        Ok(Value::Bytes(out))
    }

    fn back(&self, value: &Value) -> Result<Value> {
        let bytes = value
            .as_bytes()
            .ok_or_else(|| Error::MapperRejected(format!("expected bytes, found {value:?}")))?;
        Ok(Value::List(
            bytes.iter().map(|b| Value::UInt(*b as u128)).collect(),
        ))
    }
}

/// Maps a `Value::Bytes` to/from a UTF-8 `Value::Str`. Decoding never fails
/// (invalid sequences are replaced, matching `String::from_utf8_lossy`);
/// encoding always round-trips data this library produced.
pub struct StrMapper;

impl ValueMapper for StrMapper {
    fn forward(&self, raw: Value) -> Result<Value> {
        let bytes = raw
            .as_bytes()
            .ok_or_else(|| Error::MapperRejected("str mapper expects bytes".into()))?;
        Ok(Value::Str(String::from_utf8_lossy(bytes).into_owned()))
    }

    fn back(&self, value: &Value) -> Result<Value> {
        let s = value
            .as_str()
            .ok_or_else(|| Error::MapperRejected(format!("expected a string, found {value:?}")))?;
        Ok(Value::Bytes(s.as_bytes().to_vec()))
    }
}

/// A linear scale mapper: `forward(raw) = raw * factor`, rounded to
/// `decimals` places; `back(value) = round(value / factor)`. Grounded on
/// the `Scale` mapper used for fixed-point frequency fields in the protocol
/// this crate's field algebra is modeled on.
pub struct Scale {
    factor: f64,
    decimals: i32,
}

impl Scale {
    pub fn new(factor: f64, decimals: i32) -> Self {
        Scale { factor, decimals }
    }
}

impl ValueMapper for Scale {
    fn forward(&self, raw: Value) -> Result<Value> {
        let raw_val = raw
            .as_uint()
            .ok_or_else(|| Error::MapperRejected("scale mapper expects an unsigned integer".into()))?;
        let scaled = raw_val as f64 * self.factor;
        let rounding = 10f64.powi(self.decimals);
        let rounded = (scaled * rounding).round() / rounding;
        Ok(Value::Str(format!("{rounded}")))
    }

    fn back(&self, value: &Value) -> Result<Value> {
        let s = value
            .as_str()
            .ok_or_else(|| Error::MapperRejected(format!("expected a scaled value, found {value:?}")))?;
        let parsed: f64 = s
            .parse()
            .map_err(|_| Error::MapperRejected(format!("cannot parse `{s}` as a number")))?;
        let raw = (parsed / self.factor).round();
        if raw < 0.0 {
            return Err(Error::MapperRejected(format!("scaled value {s} maps to a negative raw integer")));
        }
        Ok(Value::UInt(raw as u128))
    }
}
