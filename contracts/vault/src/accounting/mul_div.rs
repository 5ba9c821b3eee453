//! # Safe Multiplication and Division
//!
//! Overflow-safe `(x * y) / denominator` using 256-bit intermediate
//! arithmetic. Share/asset conversions multiply two `u128` quantities, which
//! would overflow a naive `u128` product long before the quotient does.
//!
//! Division always truncates toward zero. Flooring on both directions keeps
//! every conversion in the pool's favour: a deposit never mints more than it
//! paid for and a withdrawal never pays more than it burned. Whatever is cut
//! off stays in the pool as dust for the remaining holders.

use uint::construct_uint;

use crate::error::VaultError;

construct_uint! {
    pub struct U256(4);
}

/// Computes `floor(x * y / denominator)`.
///
/// # Errors
///
/// - `denominator_error` when `denominator` is zero
/// - [`VaultError::Overflow`] when the quotient does not fit in `u128`
///
/// # Example
///
/// ```ignore
/// // shares = assets * supply / total_assets
/// let shares = mul_div_floor(100_000, 1_000_000, 500_000, VaultError::ZeroBaseAsset)?;
/// assert_eq!(shares, 200_000);
/// ```
pub fn mul_div_floor(
    x: u128,
    y: u128,
    denominator: u128,
    denominator_error: VaultError,
) -> Result<u128, VaultError> {
    if denominator == 0 {
        return Err(denominator_error);
    }

    let quotient = U256::from(x) * U256::from(y) / U256::from(denominator);
    if quotient > U256::from(u128::MAX) {
        return Err(VaultError::Overflow);
    }

    Ok(quotient.as_u128())
}
