#![doc = include_str!("../README.md")]

pub mod bits;
pub mod builders;
pub mod codec;
pub mod error;
pub mod field;
pub mod mapper;
pub mod record;
pub mod stream;
pub mod value;

pub use bits::BitBuffer;
pub use builders::{
    bf_bool, bf_bytes, bf_dyn, bf_dyn_n, bf_int, bf_int_default, bf_int_enum, bf_lit, bf_lit_int,
    bf_list, bf_map, bf_none, bf_record, bf_scaled_int, bf_str, with_default,
};
pub use error::{Error, Result};
pub use field::{FieldDescriptor, FieldSpec, SiblingView};
pub use mapper::{BoolMapper, BytesMapper, IntEnumMapper, IntMapper, Scale, StrMapper, ValueMapper};
pub use record::{Record, RecordSchema};
pub use stream::BitStream;
pub use value::{EnumSpec, Value};
