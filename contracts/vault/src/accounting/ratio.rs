//! # Ratio Accounting
//!
//! Converts between base asset and shares at the price held by a
//! [`SupplySnapshot`].
//!
//! - `shares_for_deposit`: `floor(assets * total_shares / total_base_asset)`,
//!   or `assets` unchanged on an empty pool
//! - `base_asset_for_burn`: `floor(shares * total_base_asset / total_shares)`
//!
//! Deposits arrive through `ft_on_transfer`, after the base asset has already
//! credited the pool. The snapshot passed in must therefore be the one taken
//! before the incoming amount is added to `total_base_asset`.

use crate::error::VaultError;
use crate::ledger::SupplySnapshot;

use super::mul_div::mul_div_floor;

impl SupplySnapshot {
    /// Shares minted for a deposit of `assets`, priced on this (pre-deposit)
    /// snapshot.
    pub fn shares_for_deposit(&self, assets: u128) -> Result<u128, VaultError> {
        if self.is_empty() {
            return Ok(assets);
        }

        mul_div_floor(
            assets,
            self.total_shares,
            self.total_base_asset,
            VaultError::ZeroBaseAsset,
        )
    }

    /// Base asset paid out for burning `shares`, priced on this (pre-burn)
    /// snapshot.
    pub fn base_asset_for_burn(&self, shares: u128) -> Result<u128, VaultError> {
        mul_div_floor(
            shares,
            self.total_base_asset,
            self.total_shares,
            VaultError::ZeroShareSupply,
        )
    }
}
