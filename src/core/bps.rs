//! Basis-Point Arithmetic
//!
//! Settlement-affecting percentages expressed in parts per ten thousand.
//! Division truncates toward zero; no fractional currency is ever produced.

/// Denominator for basis-point values.
pub const BASIS_POINTS: u16 = 10_000;

/// Default cancellation penalty (5%).
pub const DEFAULT_PENALTY_BPS: u16 = 500;

/// Default platform fee (3%).
pub const DEFAULT_PLATFORM_FEE_BPS: u16 = 300;

/// Compute `value * bps / 10_000` with truncating division.
///
/// The product is formed in `u128` so it cannot overflow; `bps` above
/// 10_000 is clamped, keeping the result at most `value`.
#[inline]
pub fn apply_bps(value: u64, bps: u16) -> u64 {
    let bps = bps.min(BASIS_POINTS);
    ((value as u128 * bps as u128) / BASIS_POINTS as u128) as u64
}

/// Platform fee owed on a pool.
#[inline]
pub fn calculate_fee(pool_amount: u64, fee_bps: u16) -> u64 {
    apply_bps(pool_amount, fee_bps)
}

/// Penalty withheld from the pool when a campaign is cancelled.
#[inline]
pub fn calculate_penalty(pool_amount: u64, penalty_bps: u16) -> u64 {
    apply_bps(pool_amount, penalty_bps)
}

/// Check a basis-point value lies in `[0, 10_000]`.
#[inline]
pub fn is_valid_bps(bps: u16) -> bool {
    bps <= BASIS_POINTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_toward_zero() {
        assert_eq!(apply_bps(100_000_000, 500), 5_000_000);
        assert_eq!(apply_bps(999, 500), 49); // 49.95
        assert_eq!(apply_bps(1, 9_999), 0);
        assert_eq!(apply_bps(0, 10_000), 0);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(apply_bps(12_345, 0), 0);
        assert_eq!(apply_bps(12_345, BASIS_POINTS), 12_345);
        assert_eq!(apply_bps(12_345, u16::MAX), 12_345);
    }

    #[test]
    fn test_no_overflow_on_large_pool() {
        assert_eq!(apply_bps(u64::MAX, BASIS_POINTS), u64::MAX);
        assert_eq!(apply_bps(u64::MAX, 5_000), u64::MAX / 2);
    }

    #[test]
    fn test_penalty_matches_floor() {
        let pool = 100_000_001u64;
        let penalty = calculate_penalty(pool, 333);
        assert_eq!(penalty, pool * 333 / 10_000);
    }

    #[test]
    fn test_fee_truncates() {
        assert_eq!(calculate_fee(100_000_000, DEFAULT_PLATFORM_FEE_BPS), 3_000_000);
        // 1001 * 300 / 10000 = 30.03
        assert_eq!(calculate_fee(1_001, 300), 30);
        assert_eq!(calculate_fee(33, 300), 0);
        assert_eq!(calculate_fee(u64::MAX, 0), 0);
    }

    #[test]
    fn test_valid_range() {
        assert!(is_valid_bps(0));
        assert!(is_valid_bps(10_000));
        assert!(!is_valid_bps(10_001));
    }
}
