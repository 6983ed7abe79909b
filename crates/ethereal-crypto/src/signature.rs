use ethereal_primitives::{Error, Result};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};

/// secp256k1 order `N`, big-endian.
const SECP256K1_N: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// `N / 2`, big-endian. A signature's `s` value above this threshold has a
/// low-S equivalent `(r, N - s)` with the recovery id flipped.
const SECP256K1_HALF_N: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// A recoverable ECDSA signature, always held in canonical low-S form.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// `0` or `1`, already adjusted for the low-S flip if one occurred.
    pub recovery_id: u8,
}

impl Signature {
    pub(crate) fn to_recoverable(&self) -> Result<RecoverableSignature> {
        let recid = RecoveryId::from_i32(self.recovery_id as i32)
            .map_err(|e| Error::Malformed(format!("invalid recovery id: {e}")))?;
        let mut compact = [0u8; 64];
        compact[..32].copy_from_slice(&self.r);
        compact[32..].copy_from_slice(&self.s);
        RecoverableSignature::from_compact(&compact, recid)
            .map_err(|e| Error::Malformed(format!("invalid signature: {e}")))
    }

    /// The EIP-155 `v` value for a legacy transaction on `chain_id`.
    ///
    /// Fails rather than wrapping when `chain_id` is large enough that
    /// `35 + 2*chain_id + parity` would overflow a `u64`.
    pub fn eip155_v(&self, chain_id: u64) -> Result<u64> {
        chain_id
            .checked_mul(2)
            .and_then(|doubled| doubled.checked_add(35 + self.recovery_id as u64))
            .ok_or_else(|| Error::Transaction(format!("chain id {chain_id} overflows the EIP-155 v calculation")))
    }

    /// The `yParity` field used by typed (EIP-2930/1559/4844) transactions.
    pub fn y_parity(&self) -> u8 {
        self.recovery_id
    }
}

pub(crate) fn is_high_s(s: &[u8; 32]) -> bool {
    s.as_slice() > SECP256K1_HALF_N.as_slice()
}

pub(crate) fn negate_s(s: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut borrow: i16 = 0;
    for i in (0..32).rev() {
        let diff = SECP256K1_N[i] as i16 - s[i] as i16 - borrow;
        if diff < 0 {
            out[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            out[i] = diff as u8;
            borrow = 0;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_n_is_exactly_n_over_two() {
        // N is odd, so N/2 rounds down; doubling it should land one below N.
        let doubled = negate_s(&SECP256K1_HALF_N);
        // negate_s(N/2) = N - N/2, which for odd N is N/2 + 1.
        assert!(doubled.as_slice() > SECP256K1_HALF_N.as_slice());
    }

    #[test]
    fn negate_is_involutive_under_the_order() {
        let s = SECP256K1_HALF_N;
        let negated = negate_s(&s);
        let back = negate_s(&negated);
        assert_eq!(back, s);
    }

    #[test]
    fn eip155_v_rejects_a_chain_id_that_would_overflow_u64() {
        let signature = Signature {
            r: [0u8; 32],
            s: [0u8; 32],
            recovery_id: 1,
        };
        assert!(signature.eip155_v(u64::MAX / 2).is_err());
        assert!(signature.eip155_v(1).is_ok());
    }
}
