use std::fmt;

/// The type half of a contract ABI entry. Mirrors Solidity's type grammar
/// closely enough to encode/decode calldata, without parsing Solidity
/// source itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Schema {
    /// `uintN`, `8 <= N <= 256`, `N % 8 == 0`.
    UInt(u16),
    /// `intN`, same width constraints as `UInt`.
    Int(u16),
    Address,
    Bool,
    /// `bytesN`, `1 <= N <= 32`.
    FixedBytes(u8),
    /// `bytes`.
    DynamicBytes,
    String,
    /// `elem[]` (len = `None`) or `elem[len]` (len = `Some(len)`).
    Array(Box<Schema>, Option<usize>),
    Tuple(Vec<Schema>),
}

impl Schema {
    pub fn uint256() -> Self {
        Schema::UInt(256)
    }

    pub fn array(elem: Schema) -> Self {
        Schema::Array(Box::new(elem), None)
    }

    pub fn fixed_array(elem: Schema, len: usize) -> Self {
        Schema::Array(Box::new(elem), Some(len))
    }

    /// Whether this type's encoding is a fixed 32-byte-multiple width with
    /// no separate tail (a "head-only" encoding).
    pub fn is_static(&self) -> bool {
        match self {
            Schema::UInt(_)
            | Schema::Int(_)
            | Schema::Address
            | Schema::Bool
            | Schema::FixedBytes(_) => true,
            Schema::DynamicBytes | Schema::String => false,
            Schema::Array(elem, Some(_)) => elem.is_static(),
            Schema::Array(_, None) => false,
            Schema::Tuple(components) => components.iter().all(Schema::is_static),
        }
    }

    /// The canonical type string used to build a function signature, e.g.
    /// `uint256`, `(address,uint256)[]`.
    pub fn canonical(&self) -> String {
        match self {
            Schema::UInt(w) => format!("uint{w}"),
            Schema::Int(w) => format!("int{w}"),
            Schema::Address => "address".to_string(),
            Schema::Bool => "bool".to_string(),
            Schema::FixedBytes(n) => format!("bytes{n}"),
            Schema::DynamicBytes => "bytes".to_string(),
            Schema::String => "string".to_string(),
            Schema::Array(elem, None) => format!("{}[]", elem.canonical()),
            Schema::Array(elem, Some(len)) => format!("{}[{len}]", elem.canonical()),
            Schema::Tuple(components) => {
                let inner: Vec<String> = components.iter().map(Schema::canonical).collect();
                format!("({})", inner.join(","))
            }
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_signature_nesting() {
        let schema = Schema::array(Schema::Tuple(vec![Schema::Address, Schema::uint256()]));
        assert_eq!(schema.canonical(), "(address,uint256)[]");
    }

    #[test]
    fn fixed_array_of_static_elems_is_static() {
        let schema = Schema::fixed_array(Schema::uint256(), 4);
        assert!(schema.is_static());
    }

    #[test]
    fn dynamic_array_is_dynamic() {
        assert!(!Schema::array(Schema::uint256()).is_static());
        assert!(!Schema::DynamicBytes.is_static());
    }
}
