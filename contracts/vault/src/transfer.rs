//! # Share Transfers
//!
//! Holder-facing share surface: direct and delegated transfers, approvals
//! and balance views.
//!
//! A transfer that moves shares into a registered payment receiver is
//! finished by `resolve_transfer` once the receiver has been notified. If the
//! notification fails, the shares go back to the sender (and any consumed
//! allowance back to the spender), so the transfer as a whole did not happen.

use near_contract_standards::fungible_token::metadata::{
    FungibleTokenMetadata, FungibleTokenMetadataProvider,
};
use near_sdk::serde::Serialize;
use near_sdk::{
    assert_one_yocto, env, ext_contract, json_types::U128, near, AccountId, Gas, PromiseError,
    PromiseOrValue,
};
use schemars::JsonSchema;

use crate::accounting::events::ShareApproval;
use crate::accounting::ShareLedger;
use crate::error::UnwrapOrAbort;
use crate::ledger::{ShareStore, SupplySnapshot};
use crate::storage::allowance_record_bytes;
use crate::{Contract, ContractExt};

/// Gas allocation for `resolve_transfer`.
const GAS_FOR_RESOLVE_TRANSFER: Gas = Gas::from_tgas(10);

#[allow(dead_code)]
#[ext_contract(ext_self)]
trait ExtContract {
    fn resolve_transfer(
        &mut self,
        from_id: AccountId,
        receiver_id: AccountId,
        amount: U128,
        spender_id: Option<AccountId>,
    ) -> bool;
}

/// Supply ledger as returned by the `supply` view.
#[derive(Serialize, JsonSchema, Clone)]
#[serde(crate = "near_sdk::serde")]
pub struct SupplyView {
    pub total_shares: String,
    pub total_base_asset: String,
    pub is_empty: bool,
}

impl From<SupplySnapshot> for SupplyView {
    fn from(value: SupplySnapshot) -> Self {
        SupplyView {
            total_shares: value.total_shares.to_string(),
            total_base_asset: value.total_base_asset.to_string(),
            is_empty: value.is_empty(),
        }
    }
}

#[near]
impl Contract {
    /// Transfers `amount` shares from `from_id` to `receiver_id`.
    ///
    /// Only `from_id` itself may move its shares this way. A self-transfer or
    /// a zero amount succeeds without changing balances. Requires exactly 1
    /// yoctoNEAR.
    ///
    /// # Arguments
    ///
    /// * `from_id` - Account whose shares move; must be the caller
    /// * `receiver_id` - Account credited with the shares
    /// * `amount` - Number of shares
    /// * `memo` - Optional memo carried by the `ft_transfer` event
    /// * `msg` - Passed to the receiver's `ft_on_transfer` when it is a
    ///   registered payment receiver
    ///
    /// # Returns
    ///
    /// `false` when the balance is insufficient or the caller is not
    /// `from_id`. When the receiver is notified, the promise resolves to
    /// `false` if the notification failed and the transfer was reverted.
    ///
    /// # Panics
    ///
    /// Panics if `receiver_id` is not registered for storage.
    #[payable]
    pub fn transfer(
        &mut self,
        from_id: AccountId,
        receiver_id: AccountId,
        amount: U128,
        memo: Option<String>,
        msg: Option<String>,
    ) -> PromiseOrValue<bool> {
        assert_one_yocto();
        self.require_not_paused();
        self.require_registered(&receiver_id);

        let authorized = self.is_called_by(&from_id);
        let transferred = self
            .ledger
            .transfer(&from_id, &receiver_id, amount.0, authorized, memo.as_deref())
            .unwrap_or_abort();

        self.finish_transfer(transferred, from_id, receiver_id, amount, None, msg)
    }

    /// Transfers `amount` of `owner_id`'s shares to `receiver_id` using the
    /// caller's allowance.
    ///
    /// # Returns
    ///
    /// `false`, with the allowance untouched, when the owner's balance or the
    /// caller's allowance does not cover `amount`.
    #[payable]
    pub fn transfer_from(
        &mut self,
        owner_id: AccountId,
        receiver_id: AccountId,
        amount: U128,
        memo: Option<String>,
        msg: Option<String>,
    ) -> PromiseOrValue<bool> {
        assert_one_yocto();
        self.require_not_paused();
        self.require_registered(&receiver_id);

        let spender_id = env::predecessor_account_id();
        let transferred = self
            .ledger
            .transfer_from(&spender_id, &owner_id, &receiver_id, amount.0, memo.as_deref())
            .unwrap_or_abort();

        self.finish_transfer(
            transferred,
            owner_id,
            receiver_id,
            amount,
            Some(spender_id),
            msg,
        )
    }

    /// Sets how many of the caller's shares `spender_id` may transfer.
    /// Zero revokes the allowance.
    ///
    /// Requires at least 1 yoctoNEAR. Creating a new allowance entry also
    /// requires its storage cost; the excess is refunded.
    #[payable]
    pub fn approve(&mut self, spender_id: AccountId, amount: U128) {
        self.require_not_paused();

        let owner_id = env::predecessor_account_id();
        let creates_entry = amount.0 > 0 && self.ledger.allowance_of(&owner_id, &spender_id) == 0;
        self.charge_storage(if creates_entry {
            allowance_record_bytes(&owner_id, &spender_id)
        } else {
            0
        });

        self.ledger.set_allowance(&owner_id, &spender_id, amount.0);

        ShareApproval {
            owner_id: &owner_id,
            spender_id: &spender_id,
            amount,
        }
        .emit();
    }

    pub fn allowance(&self, owner_id: AccountId, spender_id: AccountId) -> U128 {
        U128(self.ledger.allowance_of(&owner_id, &spender_id))
    }

    pub fn ft_total_supply(&self) -> U128 {
        U128(self.ledger.total_shares())
    }

    pub fn ft_balance_of(&self, account_id: AccountId) -> U128 {
        U128(self.ledger.balance_of(&account_id))
    }

    /// Current supply ledger: shares outstanding and base asset in custody.
    pub fn supply(&self) -> SupplyView {
        self.ledger.snapshot().into()
    }

    /// Finalizes a notified transfer.
    ///
    /// On failure the shares still held by the receiver (up to `amount`) move
    /// back to `from_id`. On success any unused amount the receiver reports
    /// is refunded the same way. Consumed allowance is restored for whatever
    /// is refunded.
    #[private]
    pub fn resolve_transfer(
        &mut self,
        #[callback_result] notified: Result<U128, PromiseError>,
        from_id: AccountId,
        receiver_id: AccountId,
        amount: U128,
        spender_id: Option<AccountId>,
    ) -> bool {
        let (to_refund, succeeded) = match notified {
            Ok(unused) => (unused.0.min(amount.0), true),
            Err(_) => (amount.0, false),
        };
        if to_refund == 0 {
            return succeeded;
        }

        let memo = if succeeded {
            "Unused refund"
        } else {
            "Notification failed"
        };
        let refunded = self
            .ledger
            .refund(&receiver_id, &from_id, to_refund, Some(memo))
            .unwrap_or_abort();

        if let Some(spender_id) = spender_id {
            self.ledger
                .increase_allowance(&from_id, &spender_id, refunded)
                .unwrap_or_abort();
        }

        env::log_str(&format!(
            "transfer_refund from={} receiver={} requested={} refunded={} notified={}",
            from_id, receiver_id, to_refund, refunded, succeeded
        ));

        succeeded
    }
}

impl Contract {
    /// Notifies the receiver of a successful balance-changing transfer when
    /// it is a registered payment receiver.
    fn finish_transfer(
        &self,
        transferred: bool,
        from_id: AccountId,
        receiver_id: AccountId,
        amount: U128,
        spender_id: Option<AccountId>,
        msg: Option<String>,
    ) -> PromiseOrValue<bool> {
        if !transferred
            || from_id == receiver_id
            || amount.0 == 0
            || !self.payment_receivers.contains(&receiver_id)
        {
            return PromiseOrValue::Value(transferred);
        }

        PromiseOrValue::Promise(
            self.internal_notify_receiver(
                receiver_id.clone(),
                from_id.clone(),
                amount.0,
                msg.unwrap_or_default(),
            )
            .then(
                ext_self::ext(env::current_account_id())
                    .with_static_gas(GAS_FOR_RESOLVE_TRANSFER)
                    .resolve_transfer(from_id, receiver_id, amount, spender_id),
            ),
        )
    }
}

#[near]
impl FungibleTokenMetadataProvider for Contract {
    fn ft_metadata(&self) -> FungibleTokenMetadata {
        self.metadata.clone()
    }
}
