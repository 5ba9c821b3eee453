//! # Test Utilities
//!
//! Provides helper functions and builders for unit testing the contract.
//! These utilities simplify test setup by handling NEAR SDK context
//! initialization and contract configuration.
//!
//! ## Modules
//!
//! - [`helpers`]: Low-level context and contract initialization
//! - [`builders`]: Builder pattern for flexible contract configuration

/// Helper functions for test context and contract initialization.
#[cfg(test)]
pub mod helpers {
    use crate::Contract;
    use near_contract_standards::fungible_token::metadata::FungibleTokenMetadata;
    use near_sdk::test_utils::VMContextBuilder;
    use near_sdk::{testing_env, AccountId, NearToken};

    /// Account the vault itself is deployed to.
    pub const VAULT: &str = "vault.test";

    /// Attached deposit that covers any storage charge in tests (1 NEAR).
    pub const STORAGE_DEPOSIT: u128 = 1_000_000_000_000_000_000_000_000;

    pub fn account(id: &str) -> AccountId {
        id.parse().unwrap()
    }

    /// Initializes the NEAR VM context for testing.
    ///
    /// Sets up the predecessor account and attached deposit for the
    /// subsequent contract calls. Contract storage carries over; logs do not.
    ///
    /// # Arguments
    ///
    /// * `predecessor` - The account ID that will be the caller
    /// * `deposit_yocto` - Amount of yoctoNEAR attached to calls
    ///
    /// # Example
    ///
    /// ```ignore
    /// init_ctx("alice.test", 1); // Alice calls with 1 yoctoNEAR
    /// contract.withdraw("alice.test".parse().unwrap(), U128(10));
    /// ```
    pub fn init_ctx(predecessor: &str, deposit_yocto: u128) {
        let mut builder = VMContextBuilder::new();
        builder
            .current_account_id(account(VAULT))
            .predecessor_account_id(account(predecessor))
            .attached_deposit(NearToken::from_yoctonear(deposit_yocto));
        testing_env!(builder.build());
    }

    /// Share token metadata used across tests.
    pub fn share_metadata() -> FungibleTokenMetadata {
        FungibleTokenMetadata {
            spec: "ft-1.0.0".to_string(),
            name: "Staked NEO Shares".to_string(),
            symbol: "sNEO".to_string(),
            icon: None,
            reference: None,
            reference_hash: None,
            decimals: 8,
        }
    }

    /// Initializes a contract with the default liquidity lock.
    ///
    /// The context is left as the owner's, and the deploy event stays in the
    /// logs.
    ///
    /// # Arguments
    ///
    /// * `owner` - The contract owner account ID
    /// * `asset` - The base asset token account ID
    pub fn init_contract(owner: &str, asset: &str) -> Contract {
        init_ctx(owner, 0);
        Contract::init(account(owner), account(asset), share_metadata(), None)
    }
}

/// Builder pattern for flexible contract configuration in tests.
#[cfg(test)]
pub mod builders {
    use crate::accounting::ShareLedger;
    use crate::ledger::ShareStore;
    use crate::test_utils::helpers::{account, init_ctx, share_metadata};
    use crate::Contract;
    use near_sdk::json_types::U128;

    /// Locked liquidity used by the builder unless a test sets its own.
    pub const TEST_LOCKED_SHARES: u128 = 10;

    /// Builder for creating test `Contract` instances with custom configuration.
    ///
    /// Holders are minted straight into the ledger, so the share price is
    /// whatever `base_asset` makes it. Holders and payment receivers are
    /// registered for storage. Setup logs are cleared by the final context
    /// switch to `predecessor`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let contract = ContractBuilder::new("owner.test", "bneo.test")
    ///     .holder("alice.test", 100)
    ///     .base_asset(110)
    ///     .predecessor("alice.test")
    ///     .attached(1)
    ///     .build();
    /// ```
    pub struct ContractBuilder {
        owner: String,
        asset: String,
        locked_shares: u128,
        registered: Vec<String>,
        holders: Vec<(String, u128)>,
        base_asset: u128,
        payment_receivers: Vec<String>,
        predecessor: Option<String>,
        attached: u128,
    }

    impl ContractBuilder {
        /// Creates a new builder with required owner and asset accounts.
        ///
        /// # Arguments
        ///
        /// * `owner` - The contract owner account ID
        /// * `asset` - The base asset token account ID
        pub fn new(owner: &str, asset: &str) -> Self {
            Self {
                owner: owner.to_string(),
                asset: asset.to_string(),
                locked_shares: TEST_LOCKED_SHARES,
                registered: Vec::new(),
                holders: Vec::new(),
                base_asset: 0,
                payment_receivers: Vec::new(),
                predecessor: Some(owner.to_string()),
                attached: 0,
            }
        }

        /// Sets the shares locked by the first deposit.
        pub fn locked_shares(mut self, n: u128) -> Self {
            self.locked_shares = n;
            self
        }

        /// Registers `id` for storage without giving it shares.
        pub fn registered(mut self, id: &str) -> Self {
            self.registered.push(id.to_string());
            self
        }

        /// Mints `shares` to `id` before the test starts.
        pub fn holder(mut self, id: &str, shares: u128) -> Self {
            self.holders.push((id.to_string(), shares));
            self
        }

        /// Sets the base asset in custody.
        pub fn base_asset(mut self, n: u128) -> Self {
            self.base_asset = n;
            self
        }

        /// Registers `id` as a payment receiver.
        pub fn payment_receiver(mut self, id: &str) -> Self {
            self.payment_receivers.push(id.to_string());
            self
        }

        /// Sets the predecessor (caller) account for subsequent calls.
        pub fn predecessor(mut self, id: &str) -> Self {
            self.predecessor = Some(id.to_string());
            self
        }

        /// Sets the attached deposit in yoctoNEAR.
        pub fn attached(mut self, yocto: u128) -> Self {
            self.attached = yocto;
            self
        }

        /// Builds and returns the configured `Contract` instance.
        pub fn build(self) -> Contract {
            init_ctx(&self.owner, 0);
            let mut c = Contract::init(
                account(&self.owner),
                account(&self.asset),
                share_metadata(),
                Some(U128(self.locked_shares)),
            );

            for id in &self.registered {
                c.registered_accounts.insert(account(id));
            }
            for (id, shares) in &self.holders {
                c.registered_accounts.insert(account(id));
                c.ledger.mint(&account(id), *shares, None).unwrap();
            }
            c.ledger.set_total_base_asset(self.base_asset);

            for id in &self.payment_receivers {
                c.registered_accounts.insert(account(id));
                c.payment_receivers.insert(account(id));
            }

            if let Some(p) = &self.predecessor {
                init_ctx(p, self.attached);
            }
            c
        }
    }
}
