//! # Share Ledger Storage
//!
//! The storage primitives the accounting runs on: per-account share balances,
//! per-(owner, spender) allowances and the two supply counters.
//!
//! Every rule in [`crate::accounting`] is written against [`ShareStore`], so
//! the same code drives the on-chain [`PersistentStore`] and the in-memory
//! [`MemoryStore`].
//!
//! Stores never emit events and never validate account ids; both are the
//! caller's job.

mod memory;
mod persistent;

pub use memory::MemoryStore;
pub use persistent::PersistentStore;

use near_sdk::AccountId;

/// Key-value storage for shares, allowances and supply counters.
///
/// A missing record reads as zero. Writing zero removes the record so that
/// state stays bounded by the number of non-zero holders.
pub trait ShareStore {
    /// Share balance of `account_id`, 0 when no record exists.
    fn balance_of(&self, account_id: &AccountId) -> u128;

    /// Upserts the balance, or deletes the record when `amount` is 0.
    fn set_balance(&mut self, account_id: &AccountId, amount: u128);

    /// Quantity `spender_id` may move out of `owner_id`'s balance.
    fn allowance_of(&self, owner_id: &AccountId, spender_id: &AccountId) -> u128;

    /// Upserts the allowance, or deletes the record when `amount` is 0.
    fn set_allowance(&mut self, owner_id: &AccountId, spender_id: &AccountId, amount: u128);

    fn total_shares(&self) -> u128;

    fn set_total_shares(&mut self, amount: u128);

    fn total_base_asset(&self) -> u128;

    fn set_total_base_asset(&mut self, amount: u128);

    /// Both supply counters as of now.
    fn snapshot(&self) -> SupplySnapshot {
        SupplySnapshot {
            total_shares: self.total_shares(),
            total_base_asset: self.total_base_asset(),
        }
    }
}

/// Point-in-time view of the supply ledger.
///
/// Share price is `total_base_asset / total_shares`; conversions in
/// [`crate::accounting::ratio`] are defined on this type so the caller decides
/// exactly which instant the ratio is read at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SupplySnapshot {
    pub total_shares: u128,
    pub total_base_asset: u128,
}

impl SupplySnapshot {
    /// An empty pool has no shares outstanding and mints at 1:1.
    pub fn is_empty(&self) -> bool {
        self.total_shares == 0
    }
}
