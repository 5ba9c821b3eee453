//! # Payment Receivers
//!
//! Accounts that want to be told when shares arrive register here. A
//! registered account declares it implements NEP-141 `ft_on_transfer` for
//! vault shares; the vault then calls it after every balance-changing
//! transfer or mint that credits it.
//!
//! The registry is consulted once per operation. Unregistered accounts are
//! credited silently. Each entry is paid for by the account registering it
//! and refunded when it leaves.

use near_contract_standards::fungible_token::receiver::ext_ft_receiver;
use near_sdk::{assert_one_yocto, env, json_types::U128, near, AccountId, Gas, Promise};

use crate::storage::{receiver_record_bytes, storage_cost};
use crate::{Contract, ContractExt};

/// Gas allocation for the receiver's `ft_on_transfer`.
pub const GAS_FOR_FT_ON_TRANSFER: Gas = Gas::from_tgas(35);

#[near]
impl Contract {
    /// Registers the caller as a payment receiver.
    ///
    /// The attached deposit must cover the registry entry; the excess is
    /// refunded. A caller already registered only pays 1 yoctoNEAR.
    ///
    /// # Returns
    ///
    /// `true` if the caller was not registered before.
    #[payable]
    pub fn register_payment_receiver(&mut self) -> bool {
        self.require_not_paused();
        let account_id = env::predecessor_account_id();
        let is_new = !self.payment_receivers.contains(&account_id);
        self.charge_storage(if is_new {
            receiver_record_bytes(&account_id)
        } else {
            0
        });

        env::log_str(&format!("payment_receiver_registered account={}", account_id));
        self.payment_receivers.insert(account_id)
    }

    /// Removes the caller from the payment receiver registry and refunds the
    /// entry's storage. Requires exactly 1 yoctoNEAR.
    #[payable]
    pub fn unregister_payment_receiver(&mut self) -> bool {
        assert_one_yocto();
        let account_id = env::predecessor_account_id();
        if !self.payment_receivers.remove(&account_id) {
            return false;
        }

        let refund = storage_cost(receiver_record_bytes(&account_id));
        Promise::new(account_id).transfer(refund).detach();
        true
    }

    pub fn is_payment_receiver(&self, account_id: AccountId) -> bool {
        self.payment_receivers.contains(&account_id)
    }
}

impl Contract {
    /// Calls `ft_on_transfer(sender_id, amount, msg)` on `receiver_id`.
    ///
    /// The caller chains its own resolve callback onto the returned promise;
    /// a failed notification must undo whatever credited the receiver.
    pub(crate) fn internal_notify_receiver(
        &self,
        receiver_id: AccountId,
        sender_id: AccountId,
        amount: u128,
        msg: String,
    ) -> Promise {
        ext_ft_receiver::ext(receiver_id)
            .with_static_gas(GAS_FOR_FT_ON_TRANSFER)
            .ft_on_transfer(sender_id, U128(amount), msg)
    }
}
