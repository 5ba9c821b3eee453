//! # Share Ledger Engine
//!
//! Balance-changing rules on top of any [`ShareStore`]: transfers, delegated
//! transfers, mint and burn. Each method does all of its checks before its
//! first write, so an early return or error leaves the store untouched.
//!
//! Conservation: `mint` and `burn` are the only paths that change
//! `total_shares`, and each changes one balance by the same amount.
//!
//! Every share movement emits the matching NEP-141 event (`ft_transfer`,
//! `ft_mint`, `ft_burn`). Nothing is emitted when a method reports failure.

use near_contract_standards::fungible_token::events::{FtBurn, FtMint, FtTransfer};
use near_sdk::{json_types::U128, AccountId};

use crate::error::VaultError;
use crate::ledger::ShareStore;

pub trait ShareLedger: ShareStore {
    /// Reduces `spender_id`'s allowance over `owner_id` by `amount`.
    fn decrease_allowance(
        &mut self,
        owner_id: &AccountId,
        spender_id: &AccountId,
        amount: u128,
    ) -> Result<(), VaultError> {
        let approved = self.allowance_of(owner_id, spender_id);
        if approved < amount {
            return Err(VaultError::InsufficientAllowance {
                approved,
                requested: amount,
            });
        }
        self.set_allowance(owner_id, spender_id, approved - amount);
        Ok(())
    }

    /// Raises `spender_id`'s allowance over `owner_id` by `amount`.
    fn increase_allowance(
        &mut self,
        owner_id: &AccountId,
        spender_id: &AccountId,
        amount: u128,
    ) -> Result<(), VaultError> {
        let approved = self
            .allowance_of(owner_id, spender_id)
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;
        self.set_allowance(owner_id, spender_id, approved);
        Ok(())
    }

    /// Moves `amount` shares from `from_id` to `to_id`.
    ///
    /// Returns `Ok(false)` without touching state when the sender cannot cover
    /// `amount` or the caller is not authorized to move its shares. A
    /// self-transfer or a zero amount succeeds and emits its event, but
    /// leaves every balance as it was.
    fn transfer(
        &mut self,
        from_id: &AccountId,
        to_id: &AccountId,
        amount: u128,
        authorized: bool,
        memo: Option<&str>,
    ) -> Result<bool, VaultError> {
        let from_balance = self.balance_of(from_id);
        if from_balance < amount {
            return Ok(false);
        }
        if !authorized {
            return Ok(false);
        }

        if from_id != to_id && amount != 0 {
            let to_balance = self
                .balance_of(to_id)
                .checked_add(amount)
                .ok_or(VaultError::Overflow)?;
            self.set_balance(from_id, from_balance - amount);
            self.set_balance(to_id, to_balance);
        }

        FtTransfer {
            old_owner_id: from_id,
            new_owner_id: to_id,
            amount: U128(amount),
            memo,
        }
        .emit();

        Ok(true)
    }

    /// Moves `amount` of `owner_id`'s shares to `to_id` on behalf of
    /// `spender_id`, consuming allowance.
    ///
    /// The allowance is only decremented once the transfer is certain to
    /// succeed; a `false` outcome leaves it unchanged.
    fn transfer_from(
        &mut self,
        spender_id: &AccountId,
        owner_id: &AccountId,
        to_id: &AccountId,
        amount: u128,
        memo: Option<&str>,
    ) -> Result<bool, VaultError> {
        if self.balance_of(owner_id) < amount {
            return Ok(false);
        }
        if self.allowance_of(owner_id, spender_id) < amount {
            return Ok(false);
        }

        self.decrease_allowance(owner_id, spender_id, amount)?;
        self.transfer(owner_id, to_id, amount, true, memo)
    }

    /// Moves up to `amount` shares back from `holder_id` to `refund_to`
    /// without authorization checks. Used to undo a transfer whose receiver
    /// notification failed or returned shares unused.
    ///
    /// Returns the amount actually moved, bounded by `holder_id`'s balance.
    fn refund(
        &mut self,
        holder_id: &AccountId,
        refund_to: &AccountId,
        amount: u128,
        memo: Option<&str>,
    ) -> Result<u128, VaultError> {
        let refunded = amount.min(self.balance_of(holder_id));
        if refunded == 0 {
            return Ok(0);
        }
        self.transfer(holder_id, refund_to, refunded, true, memo)?;
        Ok(refunded)
    }

    /// Credits `shares` new shares to `account_id`.
    fn mint(
        &mut self,
        account_id: &AccountId,
        shares: u128,
        memo: Option<&str>,
    ) -> Result<(), VaultError> {
        let total_shares = self
            .total_shares()
            .checked_add(shares)
            .ok_or(VaultError::Overflow)?;
        let balance = self
            .balance_of(account_id)
            .checked_add(shares)
            .ok_or(VaultError::Overflow)?;

        self.set_total_shares(total_shares);
        self.set_balance(account_id, balance);

        FtMint {
            owner_id: account_id,
            amount: U128(shares),
            memo,
        }
        .emit();

        Ok(())
    }

    /// Destroys `shares` of `account_id`'s shares.
    fn burn(
        &mut self,
        account_id: &AccountId,
        shares: u128,
        memo: Option<&str>,
    ) -> Result<(), VaultError> {
        let balance = self.balance_of(account_id);
        if balance < shares {
            return Err(VaultError::InsufficientShares {
                balance,
                requested: shares,
            });
        }
        // Unreachable while balances sum to total_shares.
        let total_shares = self
            .total_shares()
            .checked_sub(shares)
            .ok_or(VaultError::Overflow)?;

        self.set_balance(account_id, balance - shares);
        self.set_total_shares(total_shares);

        FtBurn {
            owner_id: account_id,
            amount: U128(shares),
            memo,
        }
        .emit();

        Ok(())
    }

    /// Adds `assets` to the custodied base-asset counter.
    fn credit_base_asset(&mut self, assets: u128) -> Result<(), VaultError> {
        let total = self
            .total_base_asset()
            .checked_add(assets)
            .ok_or(VaultError::Overflow)?;
        self.set_total_base_asset(total);
        Ok(())
    }

    /// Removes `assets` from the custodied base-asset counter.
    fn debit_base_asset(&mut self, assets: u128) -> Result<(), VaultError> {
        let total = self
            .total_base_asset()
            .checked_sub(assets)
            .ok_or(VaultError::Overflow)?;
        self.set_total_base_asset(total);
        Ok(())
    }
}

impl<T: ShareStore + ?Sized> ShareLedger for T {}
