//! EIP-1559 gas strategy with legacy fallback.

use ethereal_primitives::Wei;

/// Default buffer applied to a node's `eth_estimateGas` result, expressed as
/// parts-per-hundred (`120` = 1.2×).
pub const DEFAULT_GAS_BUFFER_PCT: u64 = 120;

/// Multiplies `estimate` by `buffer_pct / 100`, rounding up.
pub fn apply_gas_buffer(estimate: u64, buffer_pct: u64) -> u64 {
    let scaled = estimate as u128 * buffer_pct as u128;
    ((scaled + 99) / 100) as u64
}

/// `max_priority = min(user_default, chain_default)`;
/// `max_fee = 2*base_fee + max_priority`.
pub fn suggest_fees(base_fee: Wei, user_priority: Wei, chain_default_priority: Wei) -> (Wei, Wei) {
    let max_priority = user_priority.min(chain_default_priority);
    let max_fee = base_fee.saturating_mul_u64(2).saturating_add(max_priority);
    (max_fee, max_priority)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_rounds_up() {
        assert_eq!(apply_gas_buffer(21_000, 120), 25_200);
        assert_eq!(apply_gas_buffer(1, 120), 2);
        assert_eq!(apply_gas_buffer(100, 100), 100);
    }

    #[test]
    fn fee_suggestion_doubles_base_fee_and_adds_priority() {
        let base_fee = Wei::from_gwei("10").unwrap();
        let priority = Wei::from_gwei("2").unwrap();
        let chain_default = Wei::from_gwei("3").unwrap();
        let (max_fee, max_priority) = suggest_fees(base_fee, priority, chain_default);
        assert_eq!(max_priority, Wei::from_gwei("2").unwrap());
        assert_eq!(max_fee, Wei::from_gwei("22").unwrap());
    }

    #[test]
    fn priority_is_capped_by_chain_default() {
        let base_fee = Wei::from_gwei("10").unwrap();
        let user_priority = Wei::from_gwei("50").unwrap();
        let chain_default = Wei::from_gwei("2").unwrap();
        let (_, max_priority) = suggest_fees(base_fee, user_priority, chain_default);
        assert_eq!(max_priority, chain_default);
    }
}
