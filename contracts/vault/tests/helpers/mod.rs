//! # Test Helpers Module
//!
//! Common infrastructure for integration tests. The vault runs against the
//! NEAR SDK's mocked blockchain; cross-contract calls are settled by calling
//! the matching resolve callback directly with the outcome under test.
//!
//! ## Modules
//!
//! - [`test_builder`]: Builder pattern for constructing test scenarios
//!
//! ## Key Functions
//!
//! - [`set_caller`]: Switches the predecessor for the next contract call
//! - [`deploy_vault`]: Initializes the vault contract
//! - [`account`]: Parses a test account id

#![allow(dead_code)]

use near_contract_standards::fungible_token::metadata::FungibleTokenMetadata;
use near_sdk::json_types::U128;
use near_sdk::test_utils::VMContextBuilder;
use near_sdk::{testing_env, AccountId, NearToken, PromiseOrValue};
use share_vault::Contract;

pub mod test_builder;

// ============================================================================
// Constants
// ============================================================================

/// Account the vault is deployed to.
pub const VAULT_ID: &str = "vault.test";

/// Base asset token account.
pub const ASSET_ID: &str = "bneo.test";

/// Vault owner account.
pub const OWNER_ID: &str = "owner.test";

/// Liquidity locked by the first deposit in most scenarios. Small, so the
/// arithmetic in the tests stays readable.
pub const LOCKED_SHARES: u128 = 10;

/// Attached deposit that covers any storage charge (1 NEAR).
pub const STORAGE_DEPOSIT: u128 = 1_000_000_000_000_000_000_000_000;

// ============================================================================
// Helper Functions
// ============================================================================

pub fn account(id: &str) -> AccountId {
    id.parse().unwrap()
}

/// Switches the mocked context so the next call comes from `predecessor`
/// with `deposit_yocto` attached. Contract storage is kept.
pub fn set_caller(predecessor: &str, deposit_yocto: u128) {
    let mut builder = VMContextBuilder::new();
    builder
        .current_account_id(account(VAULT_ID))
        .predecessor_account_id(account(predecessor))
        .attached_deposit(NearToken::from_yoctonear(deposit_yocto));
    testing_env!(builder.build());
}

/// Initializes the vault with sNEO share metadata.
///
/// # Arguments
///
/// * `locked_shares` - Shares locked by the first deposit; `None` takes the
///   contract default
pub fn deploy_vault(locked_shares: Option<u128>) -> Contract {
    set_caller(VAULT_ID, 0);
    let metadata = FungibleTokenMetadata {
        spec: "ft-1.0.0".to_string(),
        name: "Staked NEO Shares".to_string(),
        symbol: "sNEO".to_string(),
        icon: None,
        reference: None,
        reference_hash: None,
        decimals: 8,
    };
    Contract::init(
        account(OWNER_ID),
        account(ASSET_ID),
        metadata,
        locked_shares.map(U128),
    )
}

/// Unwraps a synchronous result, failing the test if a promise came back.
pub fn expect_value<T>(result: PromiseOrValue<T>, context: &str) -> T {
    match result {
        PromiseOrValue::Value(value) => value,
        PromiseOrValue::Promise(_) => panic!("{context}: expected a value, got a promise"),
    }
}
