//! # Storage Management
//!
//! NEP-145 registration for share holders, plus deposits for the other
//! records callers create: allowances and payment-receiver entries.
//!
//! An account must be registered before shares can be credited to it. One
//! registration pays for the registration entry and one balance entry sized
//! for the longest account id, so `min == max` and nothing is ever available
//! to withdraw.
//!
//! Costs are computed from record sizes: a `store` collection entry is the
//! one-byte prefix plus the borsh key, the value, and the runtime's
//! per-record overhead.

use near_contract_standards::storage_management::{
    StorageBalance, StorageBalanceBounds, StorageManagement,
};
use near_sdk::{assert_one_yocto, env, log, near, require, AccountId, NearToken, Promise};

use crate::accounting::ShareLedger;
use crate::error::UnwrapOrAbort;
use crate::ledger::ShareStore;
use crate::{Contract, ContractExt};

/// Bytes the runtime charges per storage record on top of key and value.
const RECORD_OVERHEAD: u64 = 40;
const PREFIX_LEN: u64 = 1;
const MAX_ACCOUNT_ID_LEN: u64 = 64;
const U128_LEN: u64 = 16;

// Borsh writes a u32 length before the account id bytes.
fn account_key_len(len: usize) -> u64 {
    4 + len as u64
}

fn registration_bytes() -> u64 {
    let key = PREFIX_LEN + 4 + MAX_ACCOUNT_ID_LEN;
    (key + RECORD_OVERHEAD) + (key + U128_LEN + RECORD_OVERHEAD)
}

/// Storage taken by one allowance entry.
pub(crate) fn allowance_record_bytes(owner_id: &AccountId, spender_id: &AccountId) -> u64 {
    PREFIX_LEN
        + account_key_len(owner_id.len())
        + account_key_len(spender_id.len())
        + U128_LEN
        + RECORD_OVERHEAD
}

/// Storage taken by one payment-receiver entry.
pub(crate) fn receiver_record_bytes(account_id: &AccountId) -> u64 {
    PREFIX_LEN + account_key_len(account_id.len()) + RECORD_OVERHEAD
}

pub(crate) fn storage_cost(bytes: u64) -> NearToken {
    env::storage_byte_cost().saturating_mul(u128::from(bytes))
}

impl Contract {
    /// Asserts that `account_id` may be credited with shares.
    pub(crate) fn require_registered(&self, account_id: &AccountId) {
        if !self.registered_accounts.contains(account_id) {
            env::panic_str(&format!("The account {} is not registered", account_id));
        }
    }

    /// Takes payment for `bytes` of new storage from the attached deposit and
    /// refunds the rest to the caller. At least 1 yoctoNEAR is always kept.
    pub(crate) fn charge_storage(&self, bytes: u64) {
        let required = storage_cost(bytes).max(NearToken::from_yoctonear(1));
        let attached = env::attached_deposit();
        if attached < required {
            env::panic_str(&format!(
                "Requires attached deposit of at least {} yoctoNEAR",
                required.as_yoctonear()
            ));
        }

        let refund = attached.saturating_sub(required);
        if !refund.is_zero() {
            Promise::new(env::predecessor_account_id())
                .transfer(refund)
                .detach();
        }
    }

    fn internal_storage_balance_of(&self, account_id: &AccountId) -> Option<StorageBalance> {
        self.registered_accounts
            .contains(account_id)
            .then(|| StorageBalance {
                total: self.storage_balance_bounds().min,
                available: NearToken::from_near(0),
            })
    }
}

#[near]
impl StorageManagement for Contract {
    /// Registers `account_id` (the caller by default). A deposit for an
    /// already registered account is refunded in full.
    #[payable]
    #[allow(unused_variables)]
    fn storage_deposit(
        &mut self,
        account_id: Option<AccountId>,
        registration_only: Option<bool>,
    ) -> StorageBalance {
        let amount = env::attached_deposit();
        let account_id = account_id.unwrap_or_else(env::predecessor_account_id);
        let min_balance = self.storage_balance_bounds().min;

        if self.registered_accounts.contains(&account_id) {
            log!("The account is already registered, refunding the deposit");
            if !amount.is_zero() {
                Promise::new(env::predecessor_account_id())
                    .transfer(amount)
                    .detach();
            }
        } else {
            require!(
                amount >= min_balance,
                "The attached deposit is less than the minimum storage balance"
            );
            self.registered_accounts.insert(account_id.clone());
            env::log_str(&format!("storage_registered account={}", account_id));

            let refund = amount.saturating_sub(min_balance);
            if !refund.is_zero() {
                Promise::new(env::predecessor_account_id())
                    .transfer(refund)
                    .detach();
            }
        }

        StorageBalance {
            total: min_balance,
            available: NearToken::from_near(0),
        }
    }

    /// Nothing is ever available above the registration cost, so only a
    /// zero (or absent) amount succeeds.
    #[payable]
    fn storage_withdraw(&mut self, amount: Option<NearToken>) -> StorageBalance {
        assert_one_yocto();
        let account_id = env::predecessor_account_id();
        let Some(balance) = self.internal_storage_balance_of(&account_id) else {
            env::panic_str(&format!("The account {} is not registered", account_id));
        };
        if amount.is_some_and(|amount| !amount.is_zero()) {
            env::panic_str("The amount is greater than the available storage balance");
        }
        balance
    }

    /// Removes the caller's registration and refunds its deposit.
    ///
    /// An account still holding shares is refused unless `force` is set, in
    /// which case the shares are burned and their base asset stays with the
    /// remaining holders.
    #[payable]
    fn storage_unregister(&mut self, force: Option<bool>) -> bool {
        assert_one_yocto();
        let account_id = env::predecessor_account_id();
        if !self.registered_accounts.contains(&account_id) {
            log!("The account {} is not registered", account_id);
            return false;
        }

        let balance = self.ledger.balance_of(&account_id);
        if balance > 0 {
            require!(
                force.unwrap_or(false),
                "Can't unregister the account with the positive balance without force"
            );
            self.ledger
                .burn(&account_id, balance, Some("Force unregister"))
                .unwrap_or_abort();
        }

        self.registered_accounts.remove(&account_id);
        env::log_str(&format!(
            "storage_unregistered account={} burned={}",
            account_id, balance
        ));

        Promise::new(account_id)
            .transfer(
                self.storage_balance_bounds()
                    .min
                    .saturating_add(NearToken::from_yoctonear(1)),
            )
            .detach();
        true
    }

    fn storage_balance_bounds(&self) -> StorageBalanceBounds {
        let required = storage_cost(registration_bytes());
        StorageBalanceBounds {
            min: required,
            max: Some(required),
        }
    }

    fn storage_balance_of(&self, account_id: AccountId) -> Option<StorageBalance> {
        self.internal_storage_balance_of(&account_id)
    }
}
