//! # Share Accounting
//!
//! Ratio arithmetic and share movements for the vault, independent of how the
//! ledger is stored.
//!
//! ## Module Organization
//!
//! - [`engine`]: transfers, delegated transfers, mint and burn over a [`crate::ledger::ShareStore`]
//! - [`events`]: NEP-297 events for deposits, withdrawals, approvals and syncs
//! - [`mul_div`]: overflow-safe floor multiplication and division
//! - [`ratio`]: share/base-asset conversions on a supply snapshot

pub mod engine;
pub mod events;
pub mod mul_div;
pub mod ratio;

pub use engine::ShareLedger;
