use ethereal_primitives::{Address, Int256, Wei};

/// A decoded (or to-be-encoded) ABI value, paired against a [`crate::Schema`]
/// by position when encoding/decoding a whole argument list.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Uint(Wei),
    Int(Int256),
    Address(Address),
    Bool(bool),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<Value>),
    Tuple(Vec<Value>),
}

impl Value {
    pub fn uint(value: impl Into<Wei>) -> Self {
        Value::Uint(value.into())
    }

    pub fn int(value: impl Into<Int256>) -> Self {
        Value::Int(value.into())
    }
}
