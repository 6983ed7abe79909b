//! 256-bit non-negative integer amount, denominated in wei.

use crate::error::{Error, Result};
use crate::hex;
use std::cmp::Ordering;
use std::fmt;

/// A non-negative integer in `[0, 2^256)`, used for balances, transaction
/// values, and gas prices.
///
/// Stored as four 64-bit limbs, least-significant first (`limbs[0]` holds
/// bits 0..64).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Wei {
    limbs: [u64; 4],
}

impl Wei {
    /// `0`.
    pub const ZERO: Wei = Wei { limbs: [0; 4] };

    /// `10^18` wei, i.e. one ether.
    pub const ONE_ETHER: Wei = Wei {
        // 1_000_000_000_000_000_000 fits in a single u64 limb.
        limbs: [1_000_000_000_000_000_000, 0, 0, 0],
    };

    /// Builds a `Wei` from a `u64`.
    pub fn from_u64(value: u64) -> Self {
        Wei {
            limbs: [value, 0, 0, 0],
        }
    }

    /// Builds a `Wei` from a `u128`.
    pub fn from_u128(value: u128) -> Self {
        Wei {
            limbs: [value as u64, (value >> 64) as u64, 0, 0],
        }
    }

    /// Builds a `Wei` from a big-endian 32-byte buffer.
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let start = i * 8;
            let mut limb_bytes = [0u8; 8];
            limb_bytes.copy_from_slice(&bytes[start..start + 8]);
            // bytes[0..8] is the most-significant limb (limbs[3]).
            limbs[3 - i] = u64::from_be_bytes(limb_bytes);
        }
        Wei { limbs }
    }

    /// Builds a `Wei` from a big-endian byte slice of at most 32 bytes.
    pub fn from_be_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > 32 {
            return Err(Error::AbiDecoding(format!(
                "integer wider than 256 bits: {} bytes",
                bytes.len()
            )));
        }
        let mut buf = [0u8; 32];
        buf[32 - bytes.len()..].copy_from_slice(bytes);
        Ok(Self::from_be_bytes(&buf))
    }

    /// Parses a `0x`-prefixed (or bare) hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)?;
        Self::from_be_slice(&bytes)
    }

    /// Parses a decimal string denominated in `10^-scale` units (e.g.
    /// `scale = 18` for ether, `scale = 9` for gwei) into wei.
    ///
    /// Fails with [`Error::Transaction`] when the fractional part has more
    /// digits than `scale`.
    fn from_decimal_scaled(s: &str, scale: u32) -> Result<Self> {
        let s = s.trim();
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if frac_part.len() > scale as usize {
            return Err(Error::Transaction(format!(
                "decimal has {} fractional digits, at most {} allowed",
                frac_part.len(),
                scale
            )));
        }
        let mut value = Wei::ZERO;
        for c in int_part.chars().chain(std::iter::once('.')).chain(frac_part.chars()) {
            if c == '.' {
                continue;
            }
            let digit = c
                .to_digit(10)
                .ok_or_else(|| Error::Transaction(format!("invalid decimal digit: {c}")))?;
            value = value.checked_mul_u64(10)?;
            value = value.checked_add_u64(digit as u64)?;
        }
        let padding = scale as usize - frac_part.len();
        for _ in 0..padding {
            value = value.checked_mul_u64(10)?;
        }
        Ok(value)
    }

    /// Parses an ether-denominated decimal string (base 18).
    pub fn from_ether(s: &str) -> Result<Self> {
        Self::from_decimal_scaled(s, 18)
    }

    /// Parses a gwei-denominated decimal string (base 9).
    pub fn from_gwei(s: &str) -> Result<Self> {
        Self::from_decimal_scaled(s, 9)
    }

    /// Big-endian 32-byte representation.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for i in 0..4 {
            let limb = self.limbs[3 - i];
            out[i * 8..i * 8 + 8].copy_from_slice(&limb.to_be_bytes());
        }
        out
    }

    /// `0x`-prefixed lowercase hex, no leading zeros (`"0x0"` for zero).
    pub fn to_hex_quantity(&self) -> String {
        let bytes = self.to_be_bytes();
        let idx = match bytes.iter().position(|&b| b != 0) {
            None => return "0x0".to_string(),
            Some(idx) => idx,
        };
        let mut digits = hex::encode(&bytes[idx..]);
        if digits.starts_with('0') && digits.len() > 1 {
            digits.remove(0);
        }
        format!("0x{digits}")
    }

    /// True if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.limbs == [0; 4]
    }

    /// Tries to fit this value into a `u64`, failing if it overflows.
    pub fn try_into_u64(self) -> Result<u64> {
        if self.limbs[1] != 0 || self.limbs[2] != 0 || self.limbs[3] != 0 {
            return Err(Error::AbiDecoding("value exceeds u64 range".to_string()));
        }
        Ok(self.limbs[0])
    }

    /// Tries to fit this value into a `u128`, failing if it overflows.
    pub fn try_into_u128(self) -> Result<u128> {
        if self.limbs[2] != 0 || self.limbs[3] != 0 {
            return Err(Error::AbiDecoding("value exceeds u128 range".to_string()));
        }
        Ok((self.limbs[0] as u128) | ((self.limbs[1] as u128) << 64))
    }

    fn checked_add_u64(self, rhs: u64) -> Result<Self> {
        let mut limbs = self.limbs;
        let (sum, mut carry) = limbs[0].overflowing_add(rhs);
        limbs[0] = sum;
        for limb in limbs.iter_mut().skip(1) {
            if !carry {
                break;
            }
            let (sum, c) = limb.overflowing_add(1);
            *limb = sum;
            carry = c;
        }
        if carry {
            return Err(Error::Transaction("wei value overflowed 256 bits".to_string()));
        }
        Ok(Wei { limbs })
    }

    fn checked_mul_u64(self, rhs: u64) -> Result<Self> {
        let mut limbs = [0u64; 4];
        let mut carry: u128 = 0;
        for i in 0..4 {
            let prod = self.limbs[i] as u128 * rhs as u128 + carry;
            limbs[i] = prod as u64;
            carry = prod >> 64;
        }
        if carry != 0 {
            return Err(Error::Transaction("wei value overflowed 256 bits".to_string()));
        }
        Ok(Wei { limbs })
    }

    /// Saturating addition.
    pub fn saturating_add(self, rhs: Self) -> Self {
        let mut limbs = [0u64; 4];
        let mut carry = false;
        for i in 0..4 {
            let (sum, c1) = self.limbs[i].overflowing_add(rhs.limbs[i]);
            let (sum, c2) = sum.overflowing_add(carry as u64);
            limbs[i] = sum;
            carry = c1 || c2;
        }
        if carry {
            return Wei {
                limbs: [u64::MAX; 4],
            };
        }
        Wei { limbs }
    }

    /// Multiplies by a `u64` scalar, saturating at `2^256 - 1` on overflow.
    pub fn saturating_mul_u64(self, rhs: u64) -> Self {
        self.checked_mul_u64(rhs).unwrap_or(Wei {
            limbs: [u64::MAX; 4],
        })
    }

    /// Divides by a `u64` scalar (integer division). Panics on division by
    /// zero, matching the Rust convention for integer division.
    pub fn div_u64(self, rhs: u64) -> Self {
        assert_ne!(rhs, 0, "division by zero");
        let mut quotient = [0u64; 4];
        let mut remainder: u128 = 0;
        for i in (0..4).rev() {
            let acc = (remainder << 64) | self.limbs[i] as u128;
            quotient[i] = (acc / rhs as u128) as u64;
            remainder = acc % rhs as u128;
        }
        Wei { limbs: quotient }
    }

    /// Returns the smaller of two values.
    pub fn min(self, other: Self) -> Self {
        if self <= other {
            self
        } else {
            other
        }
    }
}

impl PartialOrd for Wei {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Wei {
    fn cmp(&self, other: &Self) -> Ordering {
        for i in (0..4).rev() {
            match self.limbs[i].cmp(&other.limbs[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl fmt::Debug for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wei({})", self.to_hex_quantity())
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_quantity())
    }
}

impl From<u64> for Wei {
    fn from(value: u64) -> Self {
        Wei::from_u64(value)
    }
}

impl From<u128> for Wei {
    fn from(value: u128) -> Self {
        Wei::from_u128(value)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Wei {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex_quantity())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Wei {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Wei::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_ether_is_1e18_wei() {
        assert_eq!(Wei::ONE_ETHER, Wei::from_ether("1").unwrap());
        assert_eq!(Wei::ONE_ETHER, Wei::from_u128(1_000_000_000_000_000_000));
    }

    #[test]
    fn ether_fraction_parses() {
        let half = Wei::from_ether("0.5").unwrap();
        assert_eq!(half, Wei::from_u128(500_000_000_000_000_000));
    }

    #[test]
    fn ether_rejects_too_many_fraction_digits() {
        let nineteen_digits = format!("1.{}", "1".repeat(19));
        assert!(Wei::from_ether(&nineteen_digits).is_err());
    }

    #[test]
    fn gwei_parses() {
        assert_eq!(Wei::from_gwei("1").unwrap(), Wei::from_u64(1_000_000_000));
    }

    #[test]
    fn max_u256_round_trips() {
        let max_bytes = [0xffu8; 32];
        let max = Wei::from_be_bytes(&max_bytes);
        assert_eq!(max.to_be_bytes(), max_bytes);
    }

    #[test]
    fn ordering_and_min() {
        let a = Wei::from_u64(5);
        let b = Wei::from_u64(10);
        assert!(a < b);
        assert_eq!(a.min(b), a);
    }

    #[test]
    fn hex_quantity_no_leading_zeros() {
        assert_eq!(Wei::ZERO.to_hex_quantity(), "0x0");
        assert_eq!(Wei::from_u64(0x10).to_hex_quantity(), "0x10");
    }
}
