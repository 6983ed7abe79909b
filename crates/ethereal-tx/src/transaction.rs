use ethereal_crypto::{recover_address, PrivateKey, Signature};
use ethereal_primitives::{Address, Error, HexData, Result, Wei};
use ethereal_rlp::{Encodable, Item};

use crate::access_list::AccessList;

const MIN_INTRINSIC_GAS: u64 = 21_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyTx {
    pub nonce: u64,
    pub gas_price: Wei,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: Wei,
    pub data: HexData,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessListTx {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: Wei,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: Wei,
    pub data: HexData,
    pub access_list: AccessList,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eip1559Tx {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: Wei,
    pub max_fee_per_gas: Wei,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: Wei,
    pub data: HexData,
    pub access_list: AccessList,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eip4844Tx {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: Wei,
    pub max_fee_per_gas: Wei,
    pub gas_limit: u64,
    pub to: Address,
    pub value: Wei,
    pub data: HexData,
    pub access_list: AccessList,
    pub max_fee_per_blob_gas: Wei,
    pub blob_versioned_hashes: Vec<ethereal_primitives::Hash>,
}

/// A transaction envelope prior to signing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transaction {
    Legacy(LegacyTx),
    AccessList(AccessListTx),
    Eip1559(Eip1559Tx),
    Eip4844(Eip4844Tx),
}

impl Transaction {
    pub fn gas_limit(&self) -> u64 {
        match self {
            Transaction::Legacy(tx) => tx.gas_limit,
            Transaction::AccessList(tx) => tx.gas_limit,
            Transaction::Eip1559(tx) => tx.gas_limit,
            Transaction::Eip4844(tx) => tx.gas_limit,
        }
    }

    fn is_plain_value_transfer(&self) -> bool {
        let (to, data) = match self {
            Transaction::Legacy(tx) => (tx.to, tx.data.as_bytes()),
            Transaction::AccessList(tx) => (tx.to, tx.data.as_bytes()),
            Transaction::Eip1559(tx) => (tx.to, tx.data.as_bytes()),
            Transaction::Eip4844(tx) => (Some(tx.to), tx.data.as_bytes()),
        };
        to.is_some() && data.is_empty()
    }

    /// Checks the invariants spec'd for each envelope kind.
    pub fn validate(&self) -> Result<()> {
        if self.is_plain_value_transfer() && self.gas_limit() < MIN_INTRINSIC_GAS {
            return Err(Error::Transaction(format!(
                "gas_limit {} below the minimum {MIN_INTRINSIC_GAS} for a value transfer",
                self.gas_limit()
            )));
        }
        match self {
            Transaction::Eip1559(tx) => validate_fee_caps(tx.max_priority_fee_per_gas, tx.max_fee_per_gas),
            Transaction::Eip4844(tx) => {
                validate_fee_caps(tx.max_priority_fee_per_gas, tx.max_fee_per_gas)?;
                if tx.blob_versioned_hashes.is_empty() {
                    return Err(Error::Transaction(
                        "EIP-4844 transaction must carry at least one blob hash".to_string(),
                    ));
                }
                for hash in &tx.blob_versioned_hashes {
                    if !hash.is_blob_versioned() {
                        return Err(Error::Transaction(
                            "blob hash does not start with the required 0x01 version byte".to_string(),
                        ));
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// The signing preimage: `keccak`-ready bytes, before hashing.
    pub fn encode_for_signing(&self, chain_id: u64) -> Result<Vec<u8>> {
        self.validate()?;
        match self {
            Transaction::Legacy(tx) => {
                let item = Item::List(vec![
                    tx.nonce.to_rlp_item(),
                    wei_item(&tx.gas_price),
                    tx.gas_limit.to_rlp_item(),
                    address_item(tx.to),
                    wei_item(&tx.value),
                    bytes_item(tx.data.as_bytes()),
                    chain_id.to_rlp_item(),
                    0u64.to_rlp_item(),
                    0u64.to_rlp_item(),
                ]);
                Ok(ethereal_rlp::encode(&item))
            }
            Transaction::AccessList(tx) => {
                let item = Item::List(vec![
                    tx.chain_id.to_rlp_item(),
                    tx.nonce.to_rlp_item(),
                    wei_item(&tx.gas_price),
                    tx.gas_limit.to_rlp_item(),
                    address_item(tx.to),
                    wei_item(&tx.value),
                    bytes_item(tx.data.as_bytes()),
                    access_list_item(&tx.access_list),
                ]);
                Ok(prefixed(0x01, &item))
            }
            Transaction::Eip1559(tx) => {
                let item = Item::List(vec![
                    tx.chain_id.to_rlp_item(),
                    tx.nonce.to_rlp_item(),
                    wei_item(&tx.max_priority_fee_per_gas),
                    wei_item(&tx.max_fee_per_gas),
                    tx.gas_limit.to_rlp_item(),
                    address_item(tx.to),
                    wei_item(&tx.value),
                    bytes_item(tx.data.as_bytes()),
                    access_list_item(&tx.access_list),
                ]);
                Ok(prefixed(0x02, &item))
            }
            Transaction::Eip4844(tx) => {
                let item = Item::List(vec![
                    tx.chain_id.to_rlp_item(),
                    tx.nonce.to_rlp_item(),
                    wei_item(&tx.max_priority_fee_per_gas),
                    wei_item(&tx.max_fee_per_gas),
                    tx.gas_limit.to_rlp_item(),
                    address_item(Some(tx.to)),
                    wei_item(&tx.value),
                    bytes_item(tx.data.as_bytes()),
                    access_list_item(&tx.access_list),
                    wei_item(&tx.max_fee_per_blob_gas),
                    Item::List(
                        tx.blob_versioned_hashes
                            .iter()
                            .map(|h| Item::String(h.as_bytes().to_vec()))
                            .collect(),
                    ),
                ]);
                Ok(prefixed(0x03, &item))
            }
        }
    }

    /// Signs this transaction, returning the envelope bytes ready to
    /// broadcast via `eth_sendRawTransaction`.
    pub fn sign(&self, key: &PrivateKey, chain_id: u64) -> Result<Vec<u8>> {
        let preimage = self.encode_for_signing(chain_id)?;
        let digest = ethereal_primitives::keccak::hash(&preimage);
        let signature = key.sign(&digest)?;
        self.encode_as_envelope(&signature, chain_id)
    }

    /// Assembles the final signed envelope from a precomputed signature.
    pub fn encode_as_envelope(&self, signature: &Signature, chain_id: u64) -> Result<Vec<u8>> {
        let r = Item::String(strip_leading_zeros(&signature.r));
        let s = Item::String(strip_leading_zeros(&signature.s));
        match self {
            Transaction::Legacy(tx) => {
                let v = signature.eip155_v(chain_id)?;
                let item = Item::List(vec![
                    tx.nonce.to_rlp_item(),
                    wei_item(&tx.gas_price),
                    tx.gas_limit.to_rlp_item(),
                    address_item(tx.to),
                    wei_item(&tx.value),
                    bytes_item(tx.data.as_bytes()),
                    v.to_rlp_item(),
                    r,
                    s,
                ]);
                Ok(ethereal_rlp::encode(&item))
            }
            Transaction::AccessList(tx) => {
                let item = Item::List(vec![
                    tx.chain_id.to_rlp_item(),
                    tx.nonce.to_rlp_item(),
                    wei_item(&tx.gas_price),
                    tx.gas_limit.to_rlp_item(),
                    address_item(tx.to),
                    wei_item(&tx.value),
                    bytes_item(tx.data.as_bytes()),
                    access_list_item(&tx.access_list),
                    (signature.y_parity() as u64).to_rlp_item(),
                    r,
                    s,
                ]);
                Ok(prefixed(0x01, &item))
            }
            Transaction::Eip1559(tx) => {
                let item = Item::List(vec![
                    tx.chain_id.to_rlp_item(),
                    tx.nonce.to_rlp_item(),
                    wei_item(&tx.max_priority_fee_per_gas),
                    wei_item(&tx.max_fee_per_gas),
                    tx.gas_limit.to_rlp_item(),
                    address_item(tx.to),
                    wei_item(&tx.value),
                    bytes_item(tx.data.as_bytes()),
                    access_list_item(&tx.access_list),
                    (signature.y_parity() as u64).to_rlp_item(),
                    r,
                    s,
                ]);
                Ok(prefixed(0x02, &item))
            }
            Transaction::Eip4844(tx) => {
                let item = Item::List(vec![
                    tx.chain_id.to_rlp_item(),
                    tx.nonce.to_rlp_item(),
                    wei_item(&tx.max_priority_fee_per_gas),
                    wei_item(&tx.max_fee_per_gas),
                    tx.gas_limit.to_rlp_item(),
                    address_item(Some(tx.to)),
                    wei_item(&tx.value),
                    bytes_item(tx.data.as_bytes()),
                    access_list_item(&tx.access_list),
                    wei_item(&tx.max_fee_per_blob_gas),
                    Item::List(
                        tx.blob_versioned_hashes
                            .iter()
                            .map(|h| Item::String(h.as_bytes().to_vec()))
                            .collect(),
                    ),
                    (signature.y_parity() as u64).to_rlp_item(),
                    r,
                    s,
                ]);
                Ok(prefixed(0x03, &item))
            }
        }
    }

    /// Recovers the sender address of a signed preimage/signature pair.
    pub fn recover_sender(&self, signature: &Signature, chain_id: u64) -> Result<Address> {
        let preimage = self.encode_for_signing(chain_id)?;
        let digest = ethereal_primitives::keccak::hash(&preimage);
        recover_address(signature, &digest)
    }
}

fn validate_fee_caps(max_priority: Wei, max_fee: Wei) -> Result<()> {
    if max_priority > max_fee {
        return Err(Error::Transaction(format!(
            "max_priority_fee_per_gas ({max_priority}) exceeds max_fee_per_gas ({max_fee})"
        )));
    }
    Ok(())
}

fn wei_item(value: &Wei) -> Item {
    let bytes = value.to_be_bytes();
    Item::String(strip_leading_zeros(&bytes))
}

fn bytes_item(bytes: &[u8]) -> Item {
    Item::String(bytes.to_vec())
}

fn address_item(to: Option<Address>) -> Item {
    match to {
        Some(a) => Item::String(a.as_bytes().to_vec()),
        None => Item::String(Vec::new()),
    }
}

fn access_list_item(list: &AccessList) -> Item {
    Item::List(
        list.iter()
            .map(|entry| {
                Item::List(vec![
                    Item::String(entry.address.as_bytes().to_vec()),
                    Item::List(
                        entry
                            .storage_keys
                            .iter()
                            .map(|k| Item::String(k.as_bytes().to_vec()))
                            .collect(),
                    ),
                ])
            })
            .collect(),
    )
}

fn prefixed(type_byte: u8, item: &Item) -> Vec<u8> {
    let mut out = vec![type_byte];
    out.extend(ethereal_rlp::encode(item));
    out
}

fn strip_leading_zeros(bytes: &[u8; 32]) -> Vec<u8> {
    let first = bytes.iter().position(|&b| b != 0);
    match first {
        Some(i) => bytes[i..].to_vec(),
        None => Vec::new(),
    }
}
