//! # Vault Errors
//!
//! Failures raised by the share accounting. Business outcomes such as an
//! insufficient balance on `transfer` are not errors; they are reported as
//! `false` by the engine. Everything here aborts the enclosing call once it
//! reaches the contract boundary.

use near_sdk::env;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    #[error("Insufficient shares: balance {balance}, requested {requested}")]
    InsufficientShares { balance: u128, requested: u128 },

    #[error("Insufficient allowance: approved {approved}, requested {requested}")]
    InsufficientAllowance { approved: u128, requested: u128 },

    #[error("Division by zero: no shares outstanding")]
    ZeroShareSupply,

    #[error("Division by zero: shares outstanding but no base asset in custody")]
    ZeroBaseAsset,

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Amount must be positive")]
    ZeroAmount,

    #[error("Deposit of {assets} is too small to mint a share")]
    ZeroShares { assets: u128 },

    #[error("Withdrawal of {shares} shares pays out no base asset")]
    ZeroPayout { shares: u128 },

    #[error("First deposit mints {minted} shares, at least {locked} are locked")]
    LockedLiquidityNotCovered { minted: u128, locked: u128 },
}

impl VaultError {
    /// Aborts the current call with this error's message.
    pub(crate) fn abort(self) -> ! {
        env::panic_str(&self.to_string())
    }
}

/// Turns an accounting error into a contract abort.
pub trait UnwrapOrAbort<T> {
    fn unwrap_or_abort(self) -> T;
}

impl<T> UnwrapOrAbort<T> for Result<T, VaultError> {
    fn unwrap_or_abort(self) -> T {
        self.unwrap_or_else(|err| err.abort())
    }
}
