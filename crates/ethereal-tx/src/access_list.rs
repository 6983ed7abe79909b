use ethereal_primitives::{Address, Hash};

/// One `[address, [storage_key...]]` pair of an EIP-2930 access list.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AccessListEntry {
    pub address: Address,
    pub storage_keys: Vec<Hash>,
}

/// An EIP-2930 access list; empty is valid and common on non-2930 transactions
/// that still carry the field (post-Berlin typed envelopes).
pub type AccessList = Vec<AccessListEntry>;
