use near_sdk::{near, store::LookupMap, AccountId, IntoStorageKey};

use super::ShareStore;

/// Contract-state backend: balances and allowances live in prefixed
/// `LookupMap`s, the supply counters inline in the contract struct.
#[near(serializers = [borsh])]
pub struct PersistentStore {
    balances: LookupMap<AccountId, u128>,
    allowances: LookupMap<(AccountId, AccountId), u128>,
    total_shares: u128,
    total_base_asset: u128,
}

impl PersistentStore {
    pub fn new<B, A>(balances_prefix: B, allowances_prefix: A) -> Self
    where
        B: IntoStorageKey,
        A: IntoStorageKey,
    {
        Self {
            balances: LookupMap::new(balances_prefix),
            allowances: LookupMap::new(allowances_prefix),
            total_shares: 0,
            total_base_asset: 0,
        }
    }
}

impl ShareStore for PersistentStore {
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
