//! Escrow ledger — the authoritative per-order state machine.
//!
//! One [`GiveOrderState`] per order identifier, created exactly once and
//! never deleted (entries are retained for audit and replay detection).
//! All status mutations happen here; the coordinator performs the actual
//! transfers only *after* the status has moved, so a re-entrant call
//! observes the updated status and is rejected by the state-machine guard.
//!
//! Finalization distinguishes three outcomes:
//! - `Settled` — the transition happened, a payout is owed
//! - `Fault` — recorded, no mutation, the enclosing batch continues
//! - hard `Err` — integrity violation, the whole call aborts
//!
//! The asymmetry between unlock (chain-id mismatch is a recorded fault)
//! and cancel (chain-id mismatch is fatal) is intentional: a cancel is
//! about to refund the fee-inclusive escrow, so an unverified origin is
//! treated as an integrity violation rather than a skippable entry.

use std::collections::HashMap;

use chrono::Utc;
use givelock_types::{
    Address, AffiliateFee, ChainId, GiveOrderState, GivelockError, OrderGiveStatus, OrderId,
    Result,
};
use tracing::{error, warn};

/// Why a finalization was recorded as a fault instead of settling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimFault {
    /// The order was not in CREATED status (absent, or already finalized).
    UnexpectedStatus { status: OrderGiveStatus },
    /// The authenticated origin chain does not match the stored take chain.
    ChainIdMismatch { stored: ChainId, claimed: ChainId },
}

/// Per-order result of a finalization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome<P> {
    /// Status transitioned; the contained payout must now be performed.
    Settled(P),
    /// Recorded fault; no mutation, batch processing continues.
    Fault(ClaimFault),
}

impl<P> ClaimOutcome<P> {
    #[must_use]
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}

/// Funds owed after a successful unlock transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockPayout {
    /// Token the beneficiary is paid in (native sentinel for native asset).
    pub give_token: Address,
    /// Net escrowed amount plus any patch amount.
    pub amount: u128,
    /// Affiliate payout, performed non-reverting for the native asset.
    pub affiliate: Option<AffiliateFee>,
    /// Percent fee to credit as protocol revenue, in `give_token`.
    pub percent_fee: u128,
    /// Fixed fee to credit as protocol revenue, in the native asset.
    pub fixed_native_fee: u128,
}

/// Funds owed after a successful cancel transition.
///
/// Cancellation refunds everything escrowed for give-side accounting:
/// net amount, percent fee, affiliate cut, and patch, in the give token.
/// The fixed native fee is refunded separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelPayout {
    pub give_token: Address,
    /// Fee-inclusive refund amount.
    pub amount: u128,
    /// Fixed native fee refunded alongside.
    pub fixed_native_fee: u128,
}

/// The mapping from order identifier to its authoritative state.
pub struct EscrowLedger {
    /// Per-order escrow records. Never removed once inserted.
    entries: HashMap<OrderId, GiveOrderState>,
    /// Net patch amounts, kept apart from the base give amount so the
    /// creation record stays an intact audit trail.
    patches: HashMap<OrderId, u128>,
    /// Beneficiaries of unlock messages that arrived in an unexpected status.
    unexpected_claim: HashMap<OrderId, Address>,
    /// Beneficiaries of cancel messages that arrived in an unexpected status.
    unexpected_cancel: HashMap<OrderId, Address>,
}

impl EscrowLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            patches: HashMap::new(),
            unexpected_claim: HashMap::new(),
            unexpected_cancel: HashMap::new(),
        }
    }

    /// Create the escrow record for a new order.
    ///
    /// # Errors
    /// Returns [`GivelockError::DuplicateOrder`] if an entry for `id`
    /// already exists — an order with a given identifier is created at
    /// most once.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &mut self,
        id: OrderId,
        give_token: Address,
        fixed_native_fee: u128,
        take_chain_id: ChainId,
        percent_fee: u128,
        give_amount: u128,
        affiliate: Option<AffiliateFee>,
    ) -> Result<()> {
        if self.entries.contains_key(&id) {
            return Err(GivelockError::DuplicateOrder(id));
        }
        self.entries.insert(
            id,
            GiveOrderState {
                status: OrderGiveStatus::Created,
                give_token,
                fixed_native_fee,
                take_chain_id,
                percent_fee,
                give_amount,
                affiliate,
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    /// Add escrow value to an existing CREATED order.
    ///
    /// The net amount accumulates in the patch side-table; the patch fee
    /// accumulates onto the stored percent fee.
    ///
    /// # Errors
    /// - [`GivelockError::IncorrectOrderStatus`] unless status is CREATED
    /// - [`GivelockError::AmountOverflow`] on accumulator overflow
    pub fn patch(&mut self, id: OrderId, net_add: u128, add_percent_fee: u128) -> Result<()> {
        let status = self.status(&id);
        if status != OrderGiveStatus::Created {
            return Err(GivelockError::IncorrectOrderStatus {
                order_id: id,
                expected: OrderGiveStatus::Created,
                actual: status,
            });
        }
        let entry = self
            .entries
            .get_mut(&id)
            .expect("status CREATED implies entry exists");
        entry.percent_fee = entry
            .percent_fee
            .checked_add(add_percent_fee)
            .ok_or(GivelockError::AmountOverflow)?;
        let patch = self.patches.entry(id).or_insert(0);
        *patch = patch
            .checked_add(net_add)
            .ok_or(GivelockError::AmountOverflow)?;
        Ok(())
    }

    /// Finalize an authenticated unlock instruction.
    ///
    /// Non-CREATED status and chain-id mismatch are deliberately
    /// non-reverting so a batch of independent orders is never aborted by
    /// one bad entry; both are recorded for an operator to re-drive.
    pub fn finalize_unlock(
        &mut self,
        id: OrderId,
        beneficiary: &Address,
        expected_take_chain_id: ChainId,
    ) -> Result<ClaimOutcome<UnlockPayout>> {
        let status = self.status(&id);
        if status != OrderGiveStatus::Created {
            warn!(order_id = %id, %status, "unlock for order not in CREATED status");
            self.unexpected_claim.insert(id, beneficiary.clone());
            return Ok(ClaimOutcome::Fault(ClaimFault::UnexpectedStatus { status }));
        }
        let entry = self
            .entries
            .get_mut(&id)
            .expect("status CREATED implies entry exists");
        if entry.take_chain_id != expected_take_chain_id {
            // Defense in depth: a compromised or misconfigured destination
            // registration must not drain orders earmarked for another
            // chain. The order stays CREATED, eligible for a correct retry.
            error!(
                order_id = %id,
                stored = %entry.take_chain_id,
                claimed = %expected_take_chain_id,
                "critical chain-id mismatch on unlock"
            );
            return Ok(ClaimOutcome::Fault(ClaimFault::ChainIdMismatch {
                stored: entry.take_chain_id,
                claimed: expected_take_chain_id,
            }));
        }

        entry.mark_claimed_unlock()?;
        let patch = self.patches.get(&id).copied().unwrap_or(0);
        let entry = &self.entries[&id];
        let amount = entry
            .give_amount
            .checked_add(patch)
            .ok_or(GivelockError::AmountOverflow)?;
        Ok(ClaimOutcome::Settled(UnlockPayout {
            give_token: entry.give_token.clone(),
            amount,
            affiliate: entry.affiliate.clone(),
            percent_fee: entry.percent_fee,
            fixed_native_fee: entry.fixed_native_fee,
        }))
    }

    /// Finalize an authenticated cancel instruction.
    ///
    /// # Errors
    /// Returns [`GivelockError::CriticalMismatchChainId`] — aborting the
    /// whole enclosing call — when the stored take chain does not match the
    /// authenticated origin, regardless of order status. A refund must
    /// never proceed without verifying against the chain the funds were
    /// earmarked for.
    pub fn finalize_cancel(
        &mut self,
        id: OrderId,
        beneficiary: &Address,
        expected_take_chain_id: ChainId,
    ) -> Result<ClaimOutcome<CancelPayout>> {
        if let Some(entry) = self.entries.get(&id) {
            if entry.take_chain_id != expected_take_chain_id {
                return Err(GivelockError::CriticalMismatchChainId {
                    order_id: id,
                    stored: entry.take_chain_id,
                    claimed: expected_take_chain_id,
                });
            }
        }
        let status = self.status(&id);
        if status != OrderGiveStatus::Created {
            warn!(order_id = %id, %status, "cancel for order not in CREATED status");
            self.unexpected_cancel.insert(id, beneficiary.clone());
            return Ok(ClaimOutcome::Fault(ClaimFault::UnexpectedStatus { status }));
        }

        let entry = self
            .entries
            .get_mut(&id)
            .expect("status CREATED implies entry exists");
        entry.mark_claimed_cancel()?;
        let patch = self.patches.get(&id).copied().unwrap_or(0);
        let entry = &self.entries[&id];
        let affiliate_amount = entry.affiliate.as_ref().map_or(0, |a| a.amount);
        let amount = entry
            .give_amount
            .checked_add(entry.percent_fee)
            .and_then(|v| v.checked_add(affiliate_amount))
            .and_then(|v| v.checked_add(patch))
            .ok_or(GivelockError::AmountOverflow)?;
        Ok(ClaimOutcome::Settled(CancelPayout {
            give_token: entry.give_token.clone(),
            amount,
            fixed_native_fee: entry.fixed_native_fee,
        }))
    }

    /// Current status for an order id; NOT_SET when no entry exists.
    #[must_use]
    pub fn status(&self, id: &OrderId) -> OrderGiveStatus {
        self.entries
            .get(id)
            .map_or(OrderGiveStatus::NotSet, |e| e.status)
    }

    /// Look up the full escrow record.
    #[must_use]
    pub fn get(&self, id: &OrderId) -> Option<&GiveOrderState> {
        self.entries.get(id)
    }

    /// Accumulated net patch amount for an order.
    #[must_use]
    pub fn patch_amount(&self, id: &OrderId) -> u128 {
        self.patches.get(id).copied().unwrap_or(0)
    }

    /// Recorded beneficiary of an out-of-status unlock, if any.
    #[must_use]
    pub fn unexpected_claim(&self, id: &OrderId) -> Option<&Address> {
        self.unexpected_claim.get(id)
    }

    /// Recorded beneficiary of an out-of-status cancel, if any.
    #[must_use]
    pub fn unexpected_cancel(&self, id: &OrderId) -> Option<&Address> {
        self.unexpected_cancel.get(id)
    }

    /// Number of orders ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EscrowLedger {
    fn default() -> Self {
        Self::new()
    }
}
