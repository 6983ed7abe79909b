//! Block identifier used in `eth_call`-family JSON-RPC parameters.

use crate::hex;
use std::fmt;

/// A named block tag (`"latest"`, `"pending"`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Named {
    Latest,
    Pending,
    Earliest,
    Safe,
    Finalized,
}

impl Named {
    fn as_str(self) -> &'static str {
        match self {
            Named::Latest => "latest",
            Named::Pending => "pending",
            Named::Earliest => "earliest",
            Named::Safe => "safe",
            Named::Finalized => "finalized",
        }
    }
}

/// A block specifier: either a named tag or an explicit block number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockTag {
    Named(Named),
    Number(u64),
}

impl BlockTag {
    pub const LATEST: BlockTag = BlockTag::Named(Named::Latest);
    pub const PENDING: BlockTag = BlockTag::Named(Named::Pending);
    pub const EARLIEST: BlockTag = BlockTag::Named(Named::Earliest);
    pub const SAFE: BlockTag = BlockTag::Named(Named::Safe);
    pub const FINALIZED: BlockTag = BlockTag::Named(Named::Finalized);

    pub fn number(n: u64) -> Self {
        BlockTag::Number(n)
    }

    /// The string a JSON-RPC request should carry for this tag.
    pub fn to_rpc_param(self) -> String {
        match self {
            BlockTag::Named(n) => n.as_str().to_string(),
            BlockTag::Number(n) => hex::encode_u64_quantity(n),
        }
    }
}

impl Default for BlockTag {
    fn default() -> Self {
        BlockTag::LATEST
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rpc_param())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for BlockTag {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_rpc_param())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_tags_serialize_as_strings() {
        assert_eq!(BlockTag::LATEST.to_rpc_param(), "latest");
        assert_eq!(BlockTag::PENDING.to_rpc_param(), "pending");
        assert_eq!(BlockTag::EARLIEST.to_rpc_param(), "earliest");
        assert_eq!(BlockTag::SAFE.to_rpc_param(), "safe");
        assert_eq!(BlockTag::FINALIZED.to_rpc_param(), "finalized");
    }

    #[test]
    fn numbers_serialize_as_hex_quantity() {
        assert_eq!(BlockTag::number(0).to_rpc_param(), "0x0");
        assert_eq!(BlockTag::number(255).to_rpc_param(), "0xff");
    }
}
