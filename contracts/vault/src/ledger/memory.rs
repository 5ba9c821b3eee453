use std::collections::BTreeMap;

use near_sdk::AccountId;

use super::ShareStore;

/// In-memory backend for tests and off-chain simulation of the vault.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    balances: BTreeMap<AccountId, u128>,
    allowances: BTreeMap<(AccountId, AccountId), u128>,
    total_shares: u128,
    total_base_asset: u128,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-zero balance records, ordered by account id.
    pub fn balances(&self) -> impl Iterator<Item = (&AccountId, u128)> {
        self.balances.iter().map(|(id, amount)| (id, *amount))
    }

    pub fn balance_records(&self) -> usize {
        self.balances.len()
    }

    pub fn allowance_records(&self) -> usize {
        self.allowances.len()
    }
}

impl ShareStore for MemoryStore {
    fn balance_of(&self, account_id: &AccountId) -> u128 {
        self.balances.get(account_id).copied().unwrap_or(0)
    }

    fn set_balance(&mut self, account_id: &AccountId, amount: u128) {
        if amount == 0 {
            self.balances.remove(account_id);
        } else {
            self.balances.insert(account_id.clone(), amount);
        }
    }

    fn allowance_of(&self, owner_id: &AccountId, spender_id: &AccountId) -> u128 {
        self.allowances
            .get(&(owner_id.clone(), spender_id.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn set_allowance(&mut self, owner_id: &AccountId, spender_id: &AccountId, amount: u128) {
        let key = (owner_id.clone(), spender_id.clone());
        if amount == 0 {
            self.allowances.remove(&key);
        } else {
            self.allowances.insert(key, amount);
        }
    }

    fn total_shares(&self) -> u128 {
        self.total_shares
    }

    fn set_total_shares(&mut self, amount: u128) {
        self.total_shares = amount;
    }

    fn total_base_asset(&self) -> u128 {
        self.total_base_asset
    }

    fn set_total_base_asset(&mut self, amount: u128) {
        self.total_base_asset = amount;
    }
}
