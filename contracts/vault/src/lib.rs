//! # Share Vault Contract
//!
//! A NEAR smart contract that custodies a single yield-bearing NEP-141 base
//! asset and issues proportional vault shares against it.
//!
//! - **Deposits**: base asset sent with `ft_transfer_call` mints shares at the
//!   current price (1:1 on an empty pool)
//! - **Withdrawals**: burning shares pays out the pro-rata base asset,
//!   including yield accrued since deposit
//! - **Transfers**: shares move directly or through allowances, with optional
//!   notification of receiving contracts
//!
//! ## Architecture
//!
//! - [`ledger`]: storage of balances, allowances and supply counters
//! - [`accounting`]: ratio arithmetic and share movements over that storage
//! - [`transfer`]: holder-facing share surface (transfers, approvals, views)
//! - [`receivers`]: payment-receiver registry and notification callbacks
//! - [`storage`]: NEP-145 account registration and per-record deposits
//! - [`vault`]: deposit/withdrawal controller and yield sync

use near_contract_standards::fungible_token::{
    events::FtMint, metadata::FungibleTokenMetadata,
};
use near_sdk::{
    env, json_types::U128, near, require, store::LookupSet, AccountId, BorshStorageKey,
    PanicOnDefault,
};

pub mod accounting;
pub mod error;
pub mod ledger;
mod receivers;
mod storage;
mod transfer;
mod vault;

#[cfg(test)]
pub mod test_utils;

use ledger::PersistentStore;

pub use transfer::SupplyView;
pub use vault::{DepositMessage, DonateMessage, FtTransferAction};

/// Shares locked on the first deposit when `init` is not given a value.
pub const DEFAULT_LOCKED_SHARES: u128 = 1_000;

/// Storage keys for NEAR SDK collections.
#[near(serializers = [borsh])]
#[derive(BorshStorageKey)]
pub enum StorageKey {
    /// Per-account share balances.
    Balances,
    /// Per-(owner, spender) share allowances.
    Allowances,
    /// Accounts that accept share notifications.
    PaymentReceivers,
    /// Accounts registered through `storage_deposit`.
    Accounts,
}

/// Vault state: configuration, the share ledger and the receiver registry.
#[near(contract_state)]
#[derive(PanicOnDefault)]
pub struct Contract {
    /// The account authorized to pause the vault and sync its holdings.
    pub owner_id: AccountId,
    /// Whether deposits, transfers, approvals and withdrawals are blocked.
    pub is_paused: bool,
    /// Account ID of the base asset token (NEP-141). The only asset accepted.
    pub asset: AccountId,
    /// Metadata for the vault share token.
    pub metadata: FungibleTokenMetadata,
    /// Shares locked in the vault's own account on the first deposit.
    /// Never 0.
    pub locked_shares: u128,
    /// Base asset sent out by withdrawals whose payout has not settled.
    pub pending_outflow: u128,
    /// Bumped by every operation that moves base asset in or out, so a
    /// balance read taken before it can be recognized as stale.
    pub base_asset_epoch: u64,
    /// Share balances, allowances and supply counters.
    pub ledger: PersistentStore,
    /// Accounts that implement `ft_on_transfer` for vault shares.
    pub payment_receivers: LookupSet<AccountId>,
    /// Accounts that paid for their balance record and may hold shares.
    pub registered_accounts: LookupSet<AccountId>,
}

#[near]
impl Contract {
    /// Initializes the vault.
    ///
    /// # Arguments
    ///
    /// * `owner_id` - Account authorized to pause and sync the vault
    /// * `asset` - Account ID of the base asset token
    /// * `metadata` - Fungible token metadata for vault shares
    /// * `locked_shares` - Shares withheld from the first depositor and locked
    ///   in the vault's own account; defaults to [`DEFAULT_LOCKED_SHARES`]
    ///
    /// # Panics
    ///
    /// Panics if `locked_shares` is 0.
    #[init]
    #[private]
    pub fn init(
        owner_id: AccountId,
        asset: AccountId,
        metadata: FungibleTokenMetadata,
        locked_shares: Option<U128>,
    ) -> Self {
        metadata.assert_valid();
        let locked_shares = locked_shares.map_or(DEFAULT_LOCKED_SHARES, |shares| shares.0);
        require!(locked_shares > 0, "Locked shares must be positive");

        // The vault holds the locked shares itself.
        let mut registered_accounts = LookupSet::new(StorageKey::Accounts);
        registered_accounts.insert(env::current_account_id());

        FtMint {
            owner_id: &owner_id,
            amount: U128(0),
            memo: Some("Deploy"),
        }
        .emit();

        Self {
            owner_id,
            is_paused: false,
            asset,
            metadata,
            locked_shares,
            pending_outflow: 0,
            base_asset_epoch: 0,
            ledger: PersistentStore::new(StorageKey::Balances, StorageKey::Allowances),
            payment_receivers: LookupSet::new(StorageKey::PaymentReceivers),
            registered_accounts,
        }
    }

    /// Asserts that the caller is the contract owner.
    ///
    /// # Panics
    ///
    /// Panics if the predecessor account is not the owner.
    pub fn require_owner(&self) {
        require!(
            env::predecessor_account_id() == self.owner_id,
            "Only the owner can call this method"
        );
    }

    /// Asserts that the contract is not paused.
    pub fn require_not_paused(&self) {
        require!(!self.is_paused, "Contract is paused");
    }

    /// Pauses the vault. Views and pending callbacks keep working.
    ///
    /// # Panics
    ///
    /// Panics if caller is not the contract owner.
    pub fn pause(&mut self) {
        self.require_owner();
        self.is_paused = true;
    }

    /// Unpauses the vault.
    ///
    /// # Panics
    ///
    /// Panics if caller is not the contract owner.
    pub fn unpause(&mut self) {
        self.require_owner();
        self.is_paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }
}

impl Contract {
    /// Whether the current call comes directly from `account_id`.
    ///
    /// A signed call from the account itself is the only witness accepted for
    /// moving its shares; third parties go through allowances.
    pub(crate) fn is_called_by(&self, account_id: &AccountId) -> bool {
        env::predecessor_account_id() == *account_id
    }

    /// Marks a movement of base asset in or out of custody.
    pub(crate) fn touch_base_asset(&mut self) {
        self.base_asset_epoch = self.base_asset_epoch.wrapping_add(1);
    }
}
