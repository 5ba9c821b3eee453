// Test builder pattern for integration tests
// Drives the vault through its public surface the way the base asset,
// holders and the runtime would.

use near_contract_standards::fungible_token::receiver::FungibleTokenReceiver;
use near_contract_standards::storage_management::StorageManagement;
use near_sdk::json_types::{U128, U64};
use near_sdk::test_utils::get_logs;
use near_sdk::{PromiseError, PromiseOrValue};
use share_vault::Contract;

use super::*;

pub struct TestScenarioBuilder {
    locked_shares: Option<u128>,
    accounts: Vec<String>,
    receivers: Vec<String>,
}

impl TestScenarioBuilder {
    pub fn new() -> Self {
        Self {
            locked_shares: Some(LOCKED_SHARES),
            accounts: Vec::new(),
            receivers: Vec::new(),
        }
    }

    pub fn locked_shares(mut self, shares: u128) -> Self {
        self.locked_shares = Some(shares);
        self
    }

    /// Deploys with the contract's own default lock.
    pub fn default_lock(mut self) -> Self {
        self.locked_shares = None;
        self
    }

    /// Adds an account that is registered for storage once the vault is
    /// deployed.
    pub fn create_account(mut self, name: &str) -> Self {
        self.accounts.push(name.to_string());
        self
    }

    pub fn create_accounts(self, names: &[&str]) -> Self {
        names
            .iter()
            .fold(self, |builder, name| builder.create_account(name))
    }

    /// Registers `name` for storage and as a payment receiver.
    pub fn payment_receiver(mut self, name: &str) -> Self {
        self.receivers.push(name.to_string());
        self
    }

    pub fn build(self) -> TestScenario {
        let mut vault = deploy_vault(self.locked_shares);
        for name in self.accounts.iter().chain(&self.receivers) {
            set_caller(name, STORAGE_DEPOSIT);
            vault.storage_deposit(None, Some(true));
        }
        for name in &self.receivers {
            set_caller(name, STORAGE_DEPOSIT);
            vault.register_payment_receiver();
        }
        TestScenario { vault }
    }
}

pub struct TestScenario {
    pub vault: Contract,
}

impl TestScenario {
    /// Sends `amount` of base asset with `ft_transfer_call` and returns the
    /// shares credited to `sender`.
    pub fn deposit(&mut self, sender: &str, amount: u128) -> u128 {
        let before = self.balance(sender);
        let unused = expect_value(self.deposit_with_msg(sender, amount, ""), "deposit");
        assert_eq!(unused.0, 0, "deposit by {sender} returned an unused amount");
        self.balance(sender) - before
    }

    pub fn deposit_with_msg(
        &mut self,
        sender: &str,
        amount: u128,
        msg: &str,
    ) -> PromiseOrValue<U128> {
        set_caller(ASSET_ID, 0);
        self.vault
            .ft_on_transfer(account(sender), U128(amount), msg.to_string())
    }

    pub fn donate(&mut self, sender: &str, amount: u128) {
        let unused = expect_value(
            self.deposit_with_msg(sender, amount, r#"{"donate":{}}"#),
            "donate",
        );
        assert_eq!(unused.0, 0);
    }

    /// Withdraws `shares` for `holder` and settles the payout successfully.
    /// Returns the base asset paid out.
    pub fn withdraw(&mut self, holder: &str, shares: u128) -> u128 {
        let payout = self.begin_withdraw(holder, shares);
        self.settle_withdraw(holder, shares, payout, true)
    }

    /// Withdraws `shares` for `holder`, then fails the payout transfer.
    pub fn withdraw_with_failed_payout(&mut self, holder: &str, shares: u128) -> u128 {
        let payout = self.begin_withdraw(holder, shares);
        self.settle_withdraw(holder, shares, payout, false)
    }

    /// Burns the shares and returns the payout the vault debited for the
    /// outbound transfer, leaving the transfer unsettled.
    pub fn begin_withdraw(&mut self, holder: &str, shares: u128) -> u128 {
        let before = self.total_base_asset();
        set_caller(holder, 1);
        let result = self.vault.withdraw(account(holder), U128(shares));
        assert!(
            matches!(result, PromiseOrValue::Promise(_)),
            "withdraw by {holder} did not schedule a payout"
        );
        assert_eq!(self.events("ft_burn").len(), 1, "withdraw did not burn");
        before - self.total_base_asset()
    }

    /// Delivers the outcome of the payout transfer.
    pub fn settle_withdraw(
        &mut self,
        holder: &str,
        shares: u128,
        payout: u128,
        paid: bool,
    ) -> u128 {
        let outcome = if paid { Ok(()) } else { Err(PromiseError::Failed) };
        set_caller(VAULT_ID, 0);
        self.vault
            .resolve_withdraw(outcome, account(holder), U128(shares), U128(payout))
            .0
    }

    /// Owner issues a balance sync; returns the epoch carried by the query.
    pub fn begin_sync(&mut self) -> U64 {
        set_caller(OWNER_ID, 0);
        let _ = self.vault.sync_base_asset();
        U64(self.vault.base_asset_epoch)
    }

    /// Delivers the base asset's balance reading for a sync issued at `epoch`.
    pub fn finish_sync(&mut self, observed: u128, epoch: U64) -> u128 {
        set_caller(VAULT_ID, 0);
        self.vault
            .on_base_asset_balance(Ok(U128(observed)), epoch)
            .0
    }

    /// Calls `transfer` as `caller` and returns the synchronous outcome.
    pub fn transfer(&mut self, caller: &str, from: &str, to: &str, amount: u128) -> bool {
        set_caller(caller, 1);
        expect_value(
            self.vault
                .transfer(account(from), account(to), U128(amount), None, None),
            "transfer",
        )
    }

    pub fn approve(&mut self, owner: &str, spender: &str, amount: u128) {
        set_caller(owner, STORAGE_DEPOSIT);
        self.vault.approve(account(spender), U128(amount));
    }

    pub fn transfer_from(&mut self, spender: &str, owner: &str, to: &str, amount: u128) -> bool {
        set_caller(spender, 1);
        expect_value(
            self.vault
                .transfer_from(account(owner), account(to), U128(amount), None, None),
            "transfer_from",
        )
    }

    pub fn balance(&self, holder: &str) -> u128 {
        self.vault.ft_balance_of(account(holder)).0
    }

    pub fn allowance(&self, owner: &str, spender: &str) -> u128 {
        self.vault.allowance(account(owner), account(spender)).0
    }

    pub fn total_shares(&self) -> u128 {
        self.vault.ft_total_supply().0
    }

    pub fn total_base_asset(&self) -> u128 {
        self.vault.total_base_asset().0
    }

    /// Asserts that `holders`, together with the vault's locked liquidity,
    /// account for every outstanding share.
    pub fn assert_conserved(&self, holders: &[&str]) {
        let sum: u128 = holders
            .iter()
            .chain(&[VAULT_ID])
            .map(|holder| self.balance(holder))
            .sum();
        assert_eq!(
            sum,
            self.total_shares(),
            "share balances do not add up to total supply"
        );
    }

    /// Events of `kind` logged by the last call.
    pub fn events(&self, kind: &str) -> Vec<String> {
        let needle = format!(r#""event":"{kind}""#);
        get_logs()
            .into_iter()
            .filter(|log| log.contains(&needle))
            .collect()
    }
}
