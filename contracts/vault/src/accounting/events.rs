//! # Vault Events
//!
//! NEP-297 event logging for the vault's own operations. Share movements
//! (mint, burn, transfer) use the NEP-141 events from
//! `near_contract_standards`; this module covers what NEP-141 has no event
//! for.
//!
//! ## Event Types
//!
//! - `VaultDeposit`: base asset deposited and shares minted
//! - `VaultWithdraw`: shares burned and base asset paid out
//! - `ShareApproval`: an owner set a spender's allowance
//! - `BaseAssetSync`: custodied base asset re-read from the asset's ledger
//!
//! ## Format
//!
//! ```json
//! {
//!   "standard": "nep621",
//!   "version": "1.0.0",
//!   "event": "vault_deposit",
//!   "data": [{ ... }]
//! }
//! ```

use near_sdk::json_types::U128;
use near_sdk::serde::Serialize;
use near_sdk::{env, AccountIdRef};

// ============================================================================
// Event Wrapper
// ============================================================================

#[derive(Serialize, Debug)]
#[serde(crate = "near_sdk::serde")]
#[serde(tag = "standard")]
#[must_use = "don't forget to `.emit()` this event"]
#[serde(rename_all = "snake_case")]
pub(crate) enum NearEvent<'a> {
    Nep621(Nep621Event<'a>),
}

impl<'a> NearEvent<'a> {
    fn to_json_string(&self) -> String {
        #[allow(clippy::redundant_closure)]
        serde_json::to_string(self)
            .ok()
            .unwrap_or_else(|| env::abort())
    }

    fn to_json_event_string(&self) -> String {
        format!("EVENT_JSON:{}", self.to_json_string())
    }

    pub(crate) fn emit(self) {
        near_sdk::env::log_str(&self.to_json_event_string());
    }
}

// ============================================================================
// Vault Deposit Event
// ============================================================================

/// Emitted when base asset is deposited and shares are minted.
#[must_use]
#[derive(Serialize, Debug, Clone)]
#[serde(crate = "near_sdk::serde")]
pub struct VaultDeposit<'a> {
    /// The account that sent the base asset.
    pub sender_id: &'a AccountIdRef,
    /// The account credited with the shares.
    pub owner_id: &'a AccountIdRef,
    pub assets: U128,
    pub shares: U128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<&'a str>,
}

impl VaultDeposit<'_> {
    pub fn emit(self) {
        Self::emit_many(&[self])
    }

    pub fn emit_many(data: &[VaultDeposit<'_>]) {
        new_621_v1(Nep621EventKind::VaultDeposit(data)).emit()
    }
}

// ============================================================================
// Vault Withdraw Event
// ============================================================================

/// Emitted once the base-asset payout of a withdrawal has landed.
#[must_use]
#[derive(Serialize, Debug, Clone)]
#[serde(crate = "near_sdk::serde")]
pub struct VaultWithdraw<'a> {
    pub owner_id: &'a AccountIdRef,
    pub shares: U128,
    pub assets: U128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<&'a str>,
}

impl VaultWithdraw<'_> {
    pub fn emit(self) {
        Self::emit_many(&[self])
    }

    pub fn emit_many(data: &[VaultWithdraw<'_>]) {
        new_621_v1(Nep621EventKind::VaultWithdraw(data)).emit()
    }
}

// ============================================================================
// Share Approval Event
// ============================================================================

#[must_use]
#[derive(Serialize, Debug, Clone)]
#[serde(crate = "near_sdk::serde")]
pub struct ShareApproval<'a> {
    pub owner_id: &'a AccountIdRef,
    pub spender_id: &'a AccountIdRef,
    pub amount: U128,
}

impl ShareApproval<'_> {
    pub fn emit(self) {
        new_621_v1(Nep621EventKind::ShareApproval(&[self])).emit()
    }
}

// ============================================================================
// Base Asset Sync Event
// ============================================================================

#[must_use]
#[derive(Serialize, Debug, Clone)]
#[serde(crate = "near_sdk::serde")]
pub struct BaseAssetSync {
    pub previous: U128,
    pub current: U128,
}

impl BaseAssetSync {
    pub fn emit(self) {
        new_621_v1(Nep621EventKind::BaseAssetSync(&[self])).emit()
    }
}

// ============================================================================
// Internal Event Structures
// ============================================================================

#[derive(Serialize, Debug)]
#[serde(crate = "near_sdk::serde")]
pub(crate) struct Nep621Event<'a> {
    version: &'static str,
    #[serde(flatten)]
    event_kind: Nep621EventKind<'a>,
}

#[derive(Serialize, Debug)]
#[serde(crate = "near_sdk::serde")]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "snake_case")]
#[allow(clippy::enum_variant_names)]
enum Nep621EventKind<'a> {
    VaultDeposit(&'a [VaultDeposit<'a>]),
    VaultWithdraw(&'a [VaultWithdraw<'a>]),
    ShareApproval(&'a [ShareApproval<'a>]),
    BaseAssetSync(&'a [BaseAssetSync]),
}

fn new_621<'a>(version: &'static str, event_kind: Nep621EventKind<'a>) -> NearEvent<'a> {
    NearEvent::Nep621(Nep621Event {
        version,
        event_kind,
    })
}

fn new_621_v1(event_kind: Nep621EventKind) -> NearEvent {
    new_621("1.0.0", event_kind)
}
