//! # givelock-ledger
//!
//! **Escrow plane**: the authoritative per-order state machine and the
//! protocol accounting tables.
//!
//! ## Architecture
//!
//! The [`EscrowLedger`] owns every mutation of per-order state:
//! 1. `create` — one entry per order identifier, duplicate-safe
//! 2. `patch` — monotonic escrow increases while CREATED
//! 3. `finalize_unlock` / `finalize_cancel` — the only paths out of CREATED
//!
//! Finalization yields a [`ClaimOutcome`]: settled with a payout, or a
//! recorded fault that leaves batch processing running. Actual transfers
//! are the coordinator's job and always happen *after* the status mutation.
//!
//! [`CollectedFees`] and [`UnclaimedAffiliateFees`] carry the revenue and
//! deferred-payout accounting referenced by those payouts.

pub mod collected;
pub mod escrow;

pub use collected::{CollectedFees, UnclaimedAffiliateFees};
pub use escrow::{CancelPayout, ClaimFault, ClaimOutcome, EscrowLedger, UnlockPayout};
