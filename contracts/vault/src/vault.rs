//! # Deposit/Withdrawal Controller
//!
//! Converts base asset into shares and back.
//!
//! - Deposits arrive as `ft_transfer_call` from the base asset and land in
//!   `ft_on_transfer`. Shares are priced on the supply snapshot taken before
//!   the deposit is counted.
//! - Withdrawals burn shares, then pay out the pro-rata base asset with an
//!   outbound `ft_transfer`. `resolve_withdraw` restores the burned shares if
//!   the payout fails.
//! - `sync_base_asset` re-reads the pool's balance on the base asset, which
//!   is how yield paid out-of-band becomes visible to the share price. A
//!   reading is only adopted if no payout was in flight and no base asset
//!   moved through the vault between the query and its callback.
//!
//! Every conversion rounds down, so the pool never pays out or mints more
//! than the ratio allows.

use near_contract_standards::fungible_token::core::ext_ft_core;
use near_contract_standards::fungible_token::receiver::FungibleTokenReceiver;
use near_sdk::serde::Deserialize;
use near_sdk::{
    assert_one_yocto, env, ext_contract,
    json_types::{U128, U64},
    near, require, AccountId, Gas, NearToken, Promise, PromiseError, PromiseOrValue,
};

use crate::accounting::events::{BaseAssetSync, VaultDeposit, VaultWithdraw};
use crate::accounting::ShareLedger;
use crate::error::{UnwrapOrAbort, VaultError};
use crate::ledger::ShareStore;
use crate::{Contract, ContractExt};

/// Gas allocation for the outbound `ft_transfer` of a withdrawal.
const GAS_FOR_FT_TRANSFER: Gas = Gas::from_tgas(30);
/// Gas allocation for `ft_balance_of` on the base asset.
const GAS_FOR_BALANCE_QUERY: Gas = Gas::from_tgas(10);
const GAS_FOR_RESOLVE: Gas = Gas::from_tgas(10);

#[allow(dead_code)]
#[ext_contract(ext_vault)]
trait VaultCallbacks {
    fn resolve_withdraw(&mut self, account_id: AccountId, shares: U128, payout: U128) -> U128;
    fn resolve_deposit(
        &mut self,
        owner_id: AccountId,
        shares: U128,
        locked: U128,
        assets: U128,
    ) -> U128;
    fn on_base_asset_balance(&mut self, epoch: U64) -> U128;
}

#[derive(Deserialize)]
#[serde(crate = "near_sdk::serde")]
#[serde(rename_all = "snake_case")]
pub enum FtTransferAction {
    Deposit(DepositMessage),
    Donate(DonateMessage),
}

/// Options for a deposit made with `ft_transfer_call`.
#[derive(Deserialize, Default)]
#[serde(crate = "near_sdk::serde")]
#[serde(deny_unknown_fields)]
pub struct DepositMessage {
    /// Fewer shares than this and the whole amount is handed back unused.
    pub min_shares: Option<U128>,
    /// Account credited with the shares. Defaults to the sender.
    pub receiver_id: Option<AccountId>,
    pub memo: Option<String>,
}

/// Adds base asset to the pool without minting, raising the share price.
/// Only the owner may donate.
#[derive(Deserialize, Default)]
#[serde(crate = "near_sdk::serde")]
#[serde(deny_unknown_fields)]
pub struct DonateMessage {
    pub memo: Option<String>,
}

fn parse_action(msg: &str) -> FtTransferAction {
    if msg.trim().is_empty() {
        return FtTransferAction::Deposit(DepositMessage::default());
    }
    if let Ok(action) = serde_json::from_str::<FtTransferAction>(msg) {
        return action;
    }
    // A bare deposit message is accepted too
    let deposit: DepositMessage = serde_json::from_str(msg)
        .unwrap_or_else(|_| env::panic_str("Invalid ft_on_transfer message"));
    FtTransferAction::Deposit(deposit)
}

impl Contract {
    fn handle_deposit(
        &mut self,
        sender_id: AccountId,
        amount: U128,
        msg: DepositMessage,
    ) -> PromiseOrValue<U128> {
        let owner_id = msg.receiver_id.unwrap_or_else(|| sender_id.clone());
        self.require_registered(&owner_id);

        let snapshot = self.ledger.snapshot();
        let minted = snapshot.shares_for_deposit(amount.0).unwrap_or_abort();

        if let Some(min_shares) = msg.min_shares {
            if minted < min_shares.0 {
                env::log_str(&format!(
                    "deposit_skipped sender={} assets={} shares={} min_shares={}",
                    sender_id, amount.0, minted, min_shares.0
                ));
                return PromiseOrValue::Value(amount);
            }
        }

        if minted == 0 {
            VaultError::ZeroShares { assets: amount.0 }.abort();
        }

        let locked = if snapshot.is_empty() {
            self.locked_shares
        } else {
            0
        };
        if locked > 0 {
            if minted <= locked {
                VaultError::LockedLiquidityNotCovered { minted, locked }.abort();
            }
            self.ledger
                .mint(&env::current_account_id(), locked, Some("Locked liquidity"))
                .unwrap_or_abort();
        }
        let shares = minted - locked;

        self.ledger.credit_base_asset(amount.0).unwrap_or_abort();
        self.ledger
            .mint(&owner_id, shares, Some("Deposit"))
            .unwrap_or_abort();

        VaultDeposit {
            sender_id: &sender_id,
            owner_id: &owner_id,
            assets: amount,
            shares: U128(shares),
            memo: msg.memo.as_deref(),
        }
        .emit();

        if !self.payment_receivers.contains(&owner_id) {
            return PromiseOrValue::Value(U128(0));
        }

        PromiseOrValue::Promise(
            self.internal_notify_receiver(
                owner_id.clone(),
                env::current_account_id(),
                shares,
                String::new(),
            )
            .then(
                ext_vault::ext(env::current_account_id())
                    .with_static_gas(GAS_FOR_RESOLVE)
                    .resolve_deposit(owner_id, U128(shares), U128(locked), amount),
            ),
        )
    }

    fn handle_donation(
        &mut self,
        sender_id: AccountId,
        amount: U128,
        msg: DonateMessage,
    ) -> PromiseOrValue<U128> {
        require!(sender_id == self.owner_id, "Only the owner can donate");
        require!(amount.0 > 0, "Donation amount must be positive");
        require!(
            !self.ledger.snapshot().is_empty(),
            "Cannot donate to an empty vault"
        );

        self.ledger.credit_base_asset(amount.0).unwrap_or_abort();

        VaultDeposit {
            sender_id: &sender_id,
            owner_id: &sender_id,
            assets: amount,
            shares: U128(0),
            memo: Some(msg.memo.as_deref().unwrap_or("Donate")),
        }
        .emit();

        PromiseOrValue::Value(U128(0))
    }
}

#[near]
impl Contract {
    /// Burns `shares` of `account_id` and pays out the pro-rata base asset.
    ///
    /// Requires exactly 1 yoctoNEAR. Only `account_id` itself may withdraw;
    /// any other caller gets 0 back and nothing changes.
    ///
    /// # Panics
    ///
    /// Panics if `shares` is 0, exceeds the account's balance, or is worth no
    /// base asset at the current price.
    #[payable]
    pub fn withdraw(&mut self, account_id: AccountId, shares: U128) -> PromiseOrValue<U128> {
        assert_one_yocto();
        self.require_not_paused();

        if !self.is_called_by(&account_id) {
            env::log_str(&format!(
                "withdraw_rejected caller={} account={}",
                env::predecessor_account_id(),
                account_id
            ));
            return PromiseOrValue::Value(U128(0));
        }

        if shares.0 == 0 {
            VaultError::ZeroAmount.abort();
        }
        let balance = self.ledger.balance_of(&account_id);
        if balance < shares.0 {
            VaultError::InsufficientShares {
                balance,
                requested: shares.0,
            }
            .abort();
        }

        let payout = self
            .ledger
            .snapshot()
            .base_asset_for_burn(shares.0)
            .unwrap_or_abort();
        if payout == 0 {
            VaultError::ZeroPayout { shares: shares.0 }.abort();
        }

        self.ledger
            .burn(&account_id, shares.0, Some("Withdraw"))
            .unwrap_or_abort();
        self.ledger.debit_base_asset(payout).unwrap_or_abort();
        self.pending_outflow = self
            .pending_outflow
            .checked_add(payout)
            .unwrap_or_else(|| VaultError::Overflow.abort());
        self.touch_base_asset();

        PromiseOrValue::Promise(
            ext_ft_core::ext(self.asset.clone())
                .with_attached_deposit(NearToken::from_yoctonear(1))
                .with_static_gas(GAS_FOR_FT_TRANSFER)
                .ft_transfer(account_id.clone(), U128(payout), Some("Withdraw".to_string()))
                .then(
                    ext_vault::ext(env::current_account_id())
                        .with_static_gas(GAS_FOR_RESOLVE)
                        .resolve_withdraw(account_id, shares, U128(payout)),
                ),
        )
    }

    /// Finalizes a withdrawal once the payout transfer has settled.
    ///
    /// # Returns
    ///
    /// The base asset paid out, or 0 if the transfer failed and the shares
    /// were restored.
    #[private]
    pub fn resolve_withdraw(
        &mut self,
        #[callback_result] paid: Result<(), PromiseError>,
        account_id: AccountId,
        shares: U128,
        payout: U128,
    ) -> U128 {
        self.pending_outflow = self.pending_outflow.saturating_sub(payout.0);
        self.touch_base_asset();

        match paid {
            Ok(()) => {
                VaultWithdraw {
                    owner_id: &account_id,
                    shares,
                    assets: payout,
                    memo: None,
                }
                .emit();

                payout
            }
            Err(_) => {
                self.ledger
                    .mint(&account_id, shares.0, Some("Withdrawal rollback"))
                    .unwrap_or_abort();
                self.ledger.credit_base_asset(payout.0).unwrap_or_abort();

                env::log_str(&format!(
                    "withdraw_rollback account={} shares={} assets={}",
                    account_id, shares.0, payout.0
                ));

                U128(0)
            }
        }
    }

    /// Finalizes a deposit whose share recipient was notified.
    ///
    /// A failed notification undoes the mint and returns the base asset to
    /// the sender through the base asset's refund path. Only the shares the
    /// recipient still holds can be clawed back; they are refunded at the
    /// current price. The locked liquidity is burned as well only when no
    /// other shares remain, which returns the pool to empty.
    ///
    /// # Returns
    ///
    /// The amount of base asset the base asset contract should refund.
    #[private]
    pub fn resolve_deposit(
        &mut self,
        #[callback_result] notified: Result<U128, PromiseError>,
        owner_id: AccountId,
        shares: U128,
        locked: U128,
        assets: U128,
    ) -> U128 {
        if notified.is_ok() {
            return U128(0);
        }
        self.touch_base_asset();

        let vault_id = env::current_account_id();
        let snapshot = self.ledger.snapshot();
        let clawback = shares.0.min(self.ledger.balance_of(&owner_id));
        let empties_pool = locked.0 > 0
            && snapshot.total_shares - clawback == locked.0
            && self.ledger.balance_of(&vault_id) == locked.0;

        let refund = if empties_pool {
            assets.0.min(snapshot.total_base_asset)
        } else if clawback > 0 {
            snapshot.base_asset_for_burn(clawback).unwrap_or_abort()
        } else {
            0
        };

        if clawback > 0 {
            self.ledger
                .burn(&owner_id, clawback, Some("Deposit rollback"))
                .unwrap_or_abort();
        }
        if empties_pool {
            self.ledger
                .burn(&vault_id, locked.0, Some("Deposit rollback"))
                .unwrap_or_abort();
        }
        self.ledger.debit_base_asset(refund).unwrap_or_abort();

        if clawback < shares.0 {
            env::log_str(&format!(
                "deposit_partial_rollback owner={} shares={} clawed_back={} refunded={}",
                owner_id, shares.0, clawback, refund
            ));
        }
        env::log_str(&format!(
            "deposit_rollback owner={} shares={} refunded={} lock_released={}",
            owner_id, clawback, refund, empties_pool
        ));

        U128(refund)
    }

    /// Re-reads the pool's balance on the base asset and adopts it as
    /// `total_base_asset`.
    ///
    /// # Panics
    ///
    /// Panics if caller is not the contract owner, or while a withdrawal
    /// payout has not settled.
    pub fn sync_base_asset(&mut self) -> Promise {
        self.require_owner();
        require!(
            self.pending_outflow == 0,
            "Withdrawal payouts are in flight"
        );

        ext_ft_core::ext(self.asset.clone())
            .with_static_gas(GAS_FOR_BALANCE_QUERY)
            .ft_balance_of(env::current_account_id())
            .then(
                ext_vault::ext(env::current_account_id())
                    .with_static_gas(GAS_FOR_RESOLVE)
                    .on_base_asset_balance(U64(self.base_asset_epoch)),
            )
    }

    /// Adopts the balance read by `sync_base_asset`.
    ///
    /// The reading is discarded if base asset moved through the vault after
    /// the query was issued (`epoch` no longer current) or a payout is still
    /// in flight, since the balance may then count it twice.
    #[private]
    pub fn on_base_asset_balance(
        &mut self,
        #[callback_result] balance: Result<U128, PromiseError>,
        epoch: U64,
    ) -> U128 {
        let previous = self.ledger.total_base_asset();
        let Ok(current) = balance else {
            env::log_str(&format!("base_asset_sync_failed total={}", previous));
            return U128(previous);
        };

        if epoch.0 != self.base_asset_epoch || self.pending_outflow > 0 {
            env::log_str(&format!(
                "base_asset_sync_stale observed={} total={} pending_outflow={}",
                current.0, previous, self.pending_outflow
            ));
            return U128(previous);
        }

        self.ledger.set_total_base_asset(current.0);

        BaseAssetSync {
            previous: U128(previous),
            current,
        }
        .emit();

        current
    }

    pub fn asset(&self) -> AccountId {
        self.asset.clone()
    }

    pub fn total_base_asset(&self) -> U128 {
        U128(self.ledger.total_base_asset())
    }

    /// Shares a deposit of `assets` would credit right now. 0 when the
    /// deposit would not mint.
    pub fn preview_deposit(&self, assets: U128) -> U128 {
        let snapshot = self.ledger.snapshot();
        let Ok(minted) = snapshot.shares_for_deposit(assets.0) else {
            return U128(0);
        };
        if snapshot.is_empty() {
            return U128(minted.saturating_sub(self.locked_shares));
        }
        U128(minted)
    }

    /// Base asset a withdrawal of `shares` would pay out right now.
    pub fn preview_withdraw(&self, shares: U128) -> U128 {
        let snapshot = self.ledger.snapshot();
        U128(snapshot.base_asset_for_burn(shares.0).unwrap_or(0))
    }
}

#[near]
impl FungibleTokenReceiver for Contract {
    /// Accepts base asset sent with `ft_transfer_call`.
    ///
    /// `msg` is empty for a plain deposit, a deposit message such as
    /// `{"min_shares":"100"}`, or an action: `{"deposit":{...}}` or
    /// `{"donate":{}}`.
    ///
    /// # Returns
    ///
    /// The unused amount the base asset should refund to `sender_id`.
    fn ft_on_transfer(
        &mut self,
        sender_id: AccountId,
        amount: U128,
        msg: String,
    ) -> PromiseOrValue<U128> {
        self.require_not_paused();
        require!(
            env::predecessor_account_id() == self.asset,
            "Only the base asset can call ft_on_transfer"
        );
        // Set even when the amount is handed back unused: the base asset
        // still holds it for us until its refund runs.
        self.touch_base_asset();

        match parse_action(&msg) {
            FtTransferAction::Deposit(deposit) => self.handle_deposit(sender_id, amount, deposit),
            FtTransferAction::Donate(donation) => self.handle_donation(sender_id, amount, donation),
        }
    }
}
