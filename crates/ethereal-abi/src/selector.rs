use crate::schema::Schema;
use ethereal_primitives::keccak;

/// A 4-byte function selector.
pub type Selector = [u8; 4];

/// Computes `keccak256(name(type1,type2,...))[0..4]`.
pub fn selector(name: &str, params: &[Schema]) -> Selector {
    let signature = canonical_signature(name, params);
    let hash = keccak::hash(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// The canonical signature string a selector is derived from.
pub fn canonical_signature(name: &str, params: &[Schema]) -> String {
    let types: Vec<String> = params.iter().map(Schema::canonical).collect();
    format!("{name}({})", types.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_selector_matches_well_known_value() {
        let sel = selector("transfer", &[Schema::Address, Schema::uint256()]);
        assert_eq!(sel, [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn nullary_selector() {
        let sel = selector("name", &[]);
        assert_eq!(canonical_signature("name", &[]), "name()");
        // keccak256("name()")[0..4], well-known ERC-20 selector
        assert_eq!(sel, [0x06, 0xfd, 0xde, 0x03]);
    }
}
