//! Settlement coordinator — order creation and authenticated finalization.
//!
//! Orchestrates the give-side lifecycle end to end:
//! 1. `create_order` — validate destination configuration, derive the
//!    identifier, pull escrow funds, snapshot fees, write the ledger entry,
//!    emit the order-created record consumed by off-chain takers.
//! 2. `claim_*` — authenticate the inbound envelope once, then drive each
//!    order through the ledger's finalization and perform the payouts.
//!
//! Mutation order is always validate → mutate status → external transfers.
//! Every state-mutating entry point holds the reentrancy guard for its
//! full duration, so re-entrant calls from transfer callbacks are rejected
//! before they can observe intermediate state.

use std::collections::HashMap;

use givelock_ledger::{
    CancelPayout, ClaimFault, ClaimOutcome, CollectedFees, EscrowLedger, UnclaimedAffiliateFees,
    UnlockPayout,
};
use givelock_types::{
    constants, fee, Address, AffiliateFee, ChainId, Event, EventKind, FeeBreakdown,
    GiveOrderState, GivelockError, Order, OrderGiveStatus, OrderId, ProtocolConfig, Result,
};
use tracing::{info, warn};

use crate::authenticator::{CrossChainAuthenticator, InboundEnvelope};
use crate::bank::TokenBank;
use crate::guard::ReentrancyGuard;

/// Caller-supplied order parameters. The coordinator fills in the give
/// chain and the nonce before deriving the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCreation {
    pub maker: Address,
    pub give_token: Address,
    pub give_amount: u128,
    pub take_chain_id: ChainId,
    pub take_token: Address,
    pub take_amount: u128,
    pub receiver_dst: Address,
    pub order_authority_src: Address,
    pub order_authority_dst: Address,
    pub allowed_taker_dst: Option<Address>,
    pub allowed_cancel_beneficiary_src: Option<Address>,
    pub external_call: Option<Vec<u8>>,
}

impl OrderCreation {
    /// Materialize the full order as the coordinator derives it, with the
    /// give chain and nonce filled in. Needed by the patch path, which
    /// takes the complete order.
    #[must_use]
    pub fn into_order(self, give_chain_id: ChainId, maker_nonce: u64) -> Order {
        Order {
            maker: self.maker,
            give_chain_id,
            give_token: self.give_token,
            give_amount: self.give_amount,
            take_chain_id: self.take_chain_id,
            take_token: self.take_token,
            take_amount: self.take_amount,
            receiver_dst: self.receiver_dst,
            order_authority_src: self.order_authority_src,
            order_authority_dst: self.order_authority_dst,
            allowed_taker_dst: self.allowed_taker_dst,
            allowed_cancel_beneficiary_src: self.allowed_cancel_beneficiary_src,
            external_call: self.external_call,
            maker_nonce,
        }
    }
}

/// Per-item outcomes of a (batch) claim. Faults are collected instead of
/// unwinding, so one bad entry never aborts the independent rest.
#[derive(Debug, Default)]
pub struct ClaimReport {
    /// Orders that transitioned and paid out.
    pub settled: Vec<OrderId>,
    /// Orders recorded as faults, left for an operator to re-drive.
    pub faults: Vec<(OrderId, ClaimFault)>,
}

impl ClaimReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Orchestrates order creation and authenticated finalization against a
/// token bank, the escrow ledger, and the fee accumulators.
pub struct SettlementCoordinator<B: TokenBank> {
    config: ProtocolConfig,
    ledger: EscrowLedger,
    collected: CollectedFees,
    unclaimed: UnclaimedAffiliateFees,
    auth: CrossChainAuthenticator,
    bank: B,
    /// Per-maker auto-incrementing nonce for default order creation.
    master_nonces: HashMap<Address, u64>,
    guard: ReentrancyGuard,
    events: Vec<Event>,
}

impl<B: TokenBank> SettlementCoordinator<B> {
    #[must_use]
    pub fn new(config: ProtocolConfig, trusted_proxy: Address, bank: B) -> Self {
        Self {
            config,
            ledger: EscrowLedger::new(),
            collected: CollectedFees::new(),
            unclaimed: UnclaimedAffiliateFees::new(),
            auth: CrossChainAuthenticator::new(trusted_proxy),
            bank,
            master_nonces: HashMap::new(),
            guard: ReentrancyGuard::new(),
            events: Vec::new(),
        }
    }

    // =====================================================================
    // Order creation
    // =====================================================================

    /// Create a value-backed order and pull its escrow.
    ///
    /// With `salt: None` the per-maker master nonce is used and bumped;
    /// a caller-supplied salt allows deterministic id pre-computation at
    /// the risk of [`GivelockError::DuplicateOrder`] on reuse.
    ///
    /// For a native give token, `attached_native` must equal
    /// `give_amount + fixed_native_fee` exactly; for a token give, it must
    /// equal the fixed fee exactly and the (possibly empty) permit envelope
    /// is consumed before the transfer-from.
    pub fn create_order(
        &mut self,
        creation: OrderCreation,
        affiliate_payload: &[u8],
        salt: Option<u64>,
        attached_native: u128,
        permit: &[u8],
    ) -> Result<OrderId> {
        self.config.ensure_not_paused()?;
        let _span = self.guard.enter()?;

        self.validate_creation(&creation)?;
        let affiliate = AffiliateFee::decode(affiliate_payload)?;
        let affiliate_amount = affiliate.as_ref().map_or(0, |a| a.amount);

        let nonce = salt.unwrap_or_else(|| self.master_nonce(&creation.maker));
        let order = creation.into_order(self.config.give_chain_id, nonce);
        let id = order.id();
        let status = self.ledger.status(&id);
        if status != OrderGiveStatus::NotSet {
            return Err(GivelockError::DuplicateOrder(id));
        }

        // Snapshot the global schedule now; later updates must never touch
        // this order's obligations.
        let schedule = self.config.fee;
        let breakdown = fee::creation_fee(
            order.give_amount,
            schedule.transfer_fee_bps,
            affiliate_amount,
        )?;

        if order.give_token.is_native() {
            let expected = order
                .give_amount
                .checked_add(schedule.fixed_native_fee)
                .ok_or(GivelockError::AmountOverflow)?;
            if attached_native != expected {
                return Err(GivelockError::MismatchNativeGiveAmount {
                    expected,
                    attached: attached_native,
                });
            }
            self.bank.pull_native(&order.maker, attached_native)?;
        } else {
            if attached_native != schedule.fixed_native_fee {
                return Err(GivelockError::WrongFixedFee {
                    expected: schedule.fixed_native_fee,
                    attached: attached_native,
                });
            }
            self.pull_escrow(
                &order.maker,
                &order.give_token,
                order.give_amount,
                attached_native,
                permit,
            )?;
        }

        // The duplicate check above makes this infallible while the guard
        // is held; any error here is a genuine bug and propagates.
        self.ledger.create(
            id,
            order.give_token.clone(),
            schedule.fixed_native_fee,
            order.take_chain_id,
            breakdown.percent_fee,
            breakdown.net_amount,
            affiliate,
        )?;
        if salt.is_none() {
            self.bump_master_nonce(&order.maker);
        }

        info!(
            order_id = %id,
            maker = %order.maker,
            give_amount = order.give_amount,
            take_chain = %order.take_chain_id,
            "order created"
        );
        self.emit(EventKind::CreatedOrder {
            order_id: id,
            maker: order.maker.clone(),
            give_token: order.give_token.clone(),
            give_amount: order.give_amount,
            percent_fee: breakdown.percent_fee,
            fixed_native_fee: schedule.fixed_native_fee,
            take_chain_id: order.take_chain_id,
        });
        Ok(id)
    }

    /// Create a batch of orders sharing one set of terms, one per salt.
    ///
    /// Every order in the batch carries the same economic terms and the
    /// same fee snapshot; only the salt (and therefore the identifier)
    /// differs. All validation, including duplicate detection against the
    /// ledger and within the batch, runs before any funds move, so the
    /// call creates either every order or none.
    ///
    /// `attached_native` covers the whole batch: `count * (give_amount +
    /// fixed_native_fee)` for a native give token, `count *
    /// fixed_native_fee` otherwise. A token permit must cover the summed
    /// give amount.
    pub fn create_salted_order_batch(
        &mut self,
        creation: OrderCreation,
        affiliate_payload: &[u8],
        salts: &[u64],
        attached_native: u128,
        permit: &[u8],
    ) -> Result<Vec<OrderId>> {
        self.config.ensure_not_paused()?;
        let _span = self.guard.enter()?;
        Self::ensure_batch_size(salts.len())?;

        self.validate_creation(&creation)?;
        let affiliate = AffiliateFee::decode(affiliate_payload)?;
        let affiliate_amount = affiliate.as_ref().map_or(0, |a| a.amount);

        let schedule = self.config.fee;
        let breakdown = fee::creation_fee(
            creation.give_amount,
            schedule.transfer_fee_bps,
            affiliate_amount,
        )?;

        let mut ids = Vec::with_capacity(salts.len());
        for salt in salts {
            let order = creation
                .clone()
                .into_order(self.config.give_chain_id, *salt);
            let id = order.id();
            if self.ledger.status(&id) != OrderGiveStatus::NotSet || ids.contains(&id) {
                return Err(GivelockError::DuplicateOrder(id));
            }
            ids.push(id);
        }

        let count =
            u128::try_from(salts.len()).map_err(|_| GivelockError::AmountOverflow)?;
        if creation.give_token.is_native() {
            let expected = creation
                .give_amount
                .checked_add(schedule.fixed_native_fee)
                .and_then(|per_order| per_order.checked_mul(count))
                .ok_or(GivelockError::AmountOverflow)?;
            if attached_native != expected {
                return Err(GivelockError::MismatchNativeGiveAmount {
                    expected,
                    attached: attached_native,
                });
            }
            self.bank.pull_native(&creation.maker, attached_native)?;
        } else {
            let expected = schedule
                .fixed_native_fee
                .checked_mul(count)
                .ok_or(GivelockError::AmountOverflow)?;
            if attached_native != expected {
                return Err(GivelockError::WrongFixedFee {
                    expected,
                    attached: attached_native,
                });
            }
            let total_give = creation
                .give_amount
                .checked_mul(count)
                .ok_or(GivelockError::AmountOverflow)?;
            self.pull_escrow(
                &creation.maker,
                &creation.give_token,
                total_give,
                attached_native,
                permit,
            )?;
        }

        for (id, salt) in ids.iter().zip(salts) {
            self.ledger.create(
                *id,
                creation.give_token.clone(),
                schedule.fixed_native_fee,
                creation.take_chain_id,
                breakdown.percent_fee,
                breakdown.net_amount,
                affiliate.clone(),
            )?;
            info!(
                order_id = %id,
                maker = %creation.maker,
                salt,
                give_amount = creation.give_amount,
                "order created"
            );
            self.emit(EventKind::CreatedOrder {
                order_id: *id,
                maker: creation.maker.clone(),
                give_token: creation.give_token.clone(),
                give_amount: creation.give_amount,
                percent_fee: breakdown.percent_fee,
                fixed_native_fee: schedule.fixed_native_fee,
                take_chain_id: creation.take_chain_id,
            });
        }
        Ok(ids)
    }

    /// Add escrow value to an existing CREATED order.
    ///
    /// Only the order's give-side authority may patch. The patch fee uses
    /// the global schedule at patch time and accumulates onto the stored
    /// percent fee; the net increment lands in the patch side-table.
    pub fn patch_order_give(
        &mut self,
        order: &Order,
        add_amount: u128,
        attached_native: u128,
        permit: &[u8],
        caller: &Address,
    ) -> Result<()> {
        self.config.ensure_not_paused()?;
        let _span = self.guard.enter()?;

        if *caller != order.order_authority_src {
            return Err(GivelockError::NotPatchAuthority);
        }
        if add_amount == 0 {
            return Err(GivelockError::ZeroPatchAmount);
        }
        let id = order.id();
        let status = self.ledger.status(&id);
        if status != OrderGiveStatus::Created {
            return Err(GivelockError::IncorrectOrderStatus {
                order_id: id,
                expected: OrderGiveStatus::Created,
                actual: status,
            });
        }

        let breakdown = fee::patch_fee(add_amount, self.config.fee.transfer_fee_bps)?;
        if order.give_token.is_native() {
            if attached_native != add_amount {
                return Err(GivelockError::MismatchNativeGiveAmount {
                    expected: add_amount,
                    attached: attached_native,
                });
            }
            self.bank.pull_native(caller, attached_native)?;
        } else {
            if attached_native != 0 {
                return Err(GivelockError::WrongFixedFee {
                    expected: 0,
                    attached: attached_native,
                });
            }
            self.bank.apply_permit(caller, permit)?;
            self.bank.pull(&order.give_token, caller, add_amount)?;
        }
        self.ledger
            .patch(id, breakdown.net_amount, breakdown.percent_fee)?;

        info!(order_id = %id, add_amount, "give amount increased");
        self.emit(EventKind::IncreasedGiveAmount {
            order_id: id,
            add_amount,
            add_percent_fee: breakdown.percent_fee,
        });
        Ok(())
    }

    // =====================================================================
    // Finalization
    // =====================================================================

    /// Finalize a single authenticated unlock.
    pub fn claim_unlock(
        &mut self,
        envelope: &InboundEnvelope,
        order_id: OrderId,
        beneficiary: &Address,
    ) -> Result<ClaimReport> {
        self.claim_batch_unlock(envelope, &[(order_id, beneficiary.clone())])
    }

    /// Finalize a batch of authenticated unlocks. Per-order faults are
    /// collected in the report; they never abort the batch.
    pub fn claim_batch_unlock(
        &mut self,
        envelope: &InboundEnvelope,
        claims: &[(OrderId, Address)],
    ) -> Result<ClaimReport> {
        self.config.ensure_not_paused()?;
        let _span = self.guard.enter()?;
        Self::ensure_batch_size(claims.len())?;
        let origin = self.auth.authenticate(envelope)?;

        let mut report = ClaimReport::default();
        for (order_id, beneficiary) in claims {
            match self.process_unlock(*order_id, beneficiary, origin)? {
                None => report.settled.push(*order_id),
                Some(fault) => report.faults.push((*order_id, fault)),
            }
        }
        Ok(report)
    }

    /// Finalize a single authenticated cancel.
    ///
    /// # Errors
    /// Propagates [`GivelockError::CriticalMismatchChainId`] — a cancel is
    /// about to refund the fee-inclusive escrow, so an origin mismatch
    /// aborts the whole call instead of degrading to a fault.
    pub fn claim_cancel(
        &mut self,
        envelope: &InboundEnvelope,
        order_id: OrderId,
        beneficiary: &Address,
    ) -> Result<ClaimReport> {
        self.claim_batch_cancel(envelope, &[(order_id, beneficiary.clone())])
    }

    /// Finalize a batch of authenticated cancels. Out-of-status entries
    /// are collected as faults; a chain-id mismatch aborts the batch.
    pub fn claim_batch_cancel(
        &mut self,
        envelope: &InboundEnvelope,
        claims: &[(OrderId, Address)],
    ) -> Result<ClaimReport> {
        self.config.ensure_not_paused()?;
        let _span = self.guard.enter()?;
        Self::ensure_batch_size(claims.len())?;
        let origin = self.auth.authenticate(envelope)?;

        // First pass: a stored-chain mismatch anywhere in the batch aborts
        // before a single payout, so a fatal batch settles nothing.
        for (order_id, _) in claims {
            if let Some(state) = self.ledger.get(order_id) {
                if state.take_chain_id != origin {
                    return Err(GivelockError::CriticalMismatchChainId {
                        order_id: *order_id,
                        stored: state.take_chain_id,
                        claimed: origin,
                    });
                }
            }
        }

        let mut report = ClaimReport::default();
        for (order_id, beneficiary) in claims {
            match self.process_cancel(*order_id, beneficiary, origin)? {
                None => report.settled.push(*order_id),
                Some(fault) => report.faults.push((*order_id, fault)),
            }
        }
        Ok(report)
    }

    fn process_unlock(
        &mut self,
        order_id: OrderId,
        beneficiary: &Address,
        origin: ChainId,
    ) -> Result<Option<ClaimFault>> {
        match self.ledger.finalize_unlock(order_id, beneficiary, origin)? {
            ClaimOutcome::Settled(payout) => {
                self.settle_unlock(order_id, beneficiary, &payout)?;
                Ok(None)
            }
            ClaimOutcome::Fault(fault) => {
                self.emit_claim_fault(order_id, beneficiary, fault, /* cancel: */ false);
                Ok(Some(fault))
            }
        }
    }

    fn process_cancel(
        &mut self,
        order_id: OrderId,
        beneficiary: &Address,
        origin: ChainId,
    ) -> Result<Option<ClaimFault>> {
        match self.ledger.finalize_cancel(order_id, beneficiary, origin)? {
            ClaimOutcome::Settled(payout) => {
                self.settle_cancel(order_id, beneficiary, &payout)?;
                Ok(None)
            }
            ClaimOutcome::Fault(fault) => {
                self.emit_claim_fault(order_id, beneficiary, fault, /* cancel: */ true);
                Ok(Some(fault))
            }
        }
    }

    /// Payouts for a settled unlock. The status already moved, so a
    /// re-entrant call through any of these transfers hits the guard or
    /// the state-machine check, never a double payment.
    fn settle_unlock(
        &mut self,
        order_id: OrderId,
        beneficiary: &Address,
        payout: &UnlockPayout,
    ) -> Result<()> {
        self.bank.pay(&payout.give_token, beneficiary, payout.amount)?;

        if let Some(affiliate) = &payout.affiliate {
            if payout.give_token.is_native() {
                if !self.bank.try_pay_native(&affiliate.beneficiary, affiliate.amount) {
                    warn!(
                        order_id = %order_id,
                        affiliate = %affiliate.beneficiary,
                        amount = affiliate.amount,
                        "affiliate rejected native payout, deferring"
                    );
                    self.unclaimed.credit(&affiliate.beneficiary, affiliate.amount)?;
                    self.emit(EventKind::AffiliateFeeDeferred {
                        order_id,
                        beneficiary: affiliate.beneficiary.clone(),
                        amount: affiliate.amount,
                    });
                }
            } else {
                self.bank
                    .pay(&payout.give_token, &affiliate.beneficiary, affiliate.amount)?;
            }
        }

        self.collected.credit(&payout.give_token, payout.percent_fee)?;
        self.collected
            .credit(&Address::native(), payout.fixed_native_fee)?;

        info!(order_id = %order_id, beneficiary = %beneficiary, amount = payout.amount, "unlock claimed");
        self.emit(EventKind::ClaimedUnlock {
            order_id,
            beneficiary: beneficiary.clone(),
            amount: payout.amount,
        });
        Ok(())
    }

    /// Payouts for a settled cancel: the fee-inclusive give-token refund,
    /// plus the fixed native fee refunded separately.
    fn settle_cancel(
        &mut self,
        order_id: OrderId,
        beneficiary: &Address,
        payout: &CancelPayout,
    ) -> Result<()> {
        self.bank.pay(&payout.give_token, beneficiary, payout.amount)?;
        self.bank
            .pay(&Address::native(), beneficiary, payout.fixed_native_fee)?;

        info!(order_id = %order_id, beneficiary = %beneficiary, amount = payout.amount, "cancel claimed");
        self.emit(EventKind::ClaimedOrderCancel {
            order_id,
            beneficiary: beneficiary.clone(),
            amount: payout.amount,
        });
        Ok(())
    }

    fn emit_claim_fault(
        &mut self,
        order_id: OrderId,
        beneficiary: &Address,
        fault: ClaimFault,
        cancel: bool,
    ) {
        match fault {
            ClaimFault::UnexpectedStatus { status } => {
                let kind = if cancel {
                    EventKind::UnexpectedOrderStatusForCancel {
                        order_id,
                        status,
                        beneficiary: beneficiary.clone(),
                    }
                } else {
                    EventKind::UnexpectedOrderStatusForClaim {
                        order_id,
                        status,
                        beneficiary: beneficiary.clone(),
                    }
                };
                self.emit(kind);
            }
            ClaimFault::ChainIdMismatch { stored, claimed } => {
                self.emit(EventKind::CriticalMismatchChainId {
                    order_id,
                    stored,
                    claimed,
                });
            }
        }
    }

    // =====================================================================
    // Fee withdrawal and administration
    // =====================================================================

    /// Withdraw and zero the collected protocol fee for a token.
    pub fn withdraw_fee(
        &mut self,
        token: &Address,
        beneficiary: &Address,
        caller: &Address,
    ) -> Result<u128> {
        self.config.ensure_admin(caller)?;
        let _span = self.guard.enter()?;

        let amount = self.collected.withdraw(token)?;
        self.bank.pay(token, beneficiary, amount)?;

        info!(token = %token, beneficiary = %beneficiary, amount, "collected fee withdrawn");
        self.emit(EventKind::CollectedFeeWithdrawn {
            token: token.clone(),
            beneficiary: beneficiary.clone(),
            amount,
        });
        Ok(amount)
    }

    /// An affiliate claims their deferred native payouts.
    pub fn withdraw_unclaimed_affiliate_fee(&mut self, caller: &Address) -> Result<u128> {
        self.config.ensure_not_paused()?;
        let _span = self.guard.enter()?;

        let amount = self.unclaimed.claim(caller)?;
        self.bank.pay(&Address::native(), caller, amount)?;

        info!(beneficiary = %caller, amount, "unclaimed affiliate fee paid");
        self.emit(EventKind::UnclaimedAffiliatePaid {
            beneficiary: caller.clone(),
            amount,
        });
        Ok(amount)
    }

    /// Register the destination contract for a take chain. Its byte length
    /// becomes the expected address width for that chain.
    pub fn register_dst_contract(
        &mut self,
        chain_id: ChainId,
        contract: Address,
        caller: &Address,
    ) -> Result<()> {
        self.config.ensure_admin(caller)?;
        if contract.is_empty() {
            return Err(GivelockError::ZeroAddress {
                field: "dst_contract",
            });
        }
        self.auth.register_dst(chain_id, contract.clone());
        self.emit(EventKind::DstContractRegistered { chain_id, contract });
        Ok(())
    }

    /// Update the global fixed native fee. Emits only on an actual change;
    /// live orders keep their creation-time snapshot.
    pub fn update_fixed_native_fee(&mut self, fee: u128, caller: &Address) -> Result<()> {
        self.config.ensure_admin(caller)?;
        let old = self.config.fee.fixed_native_fee;
        if self.config.set_fixed_native_fee(fee) {
            self.emit(EventKind::FixedNativeFeeUpdated { old, new: fee });
        }
        Ok(())
    }

    /// Update the global transfer fee. Emits only on an actual change.
    pub fn update_transfer_fee_bps(&mut self, bps: u16, caller: &Address) -> Result<()> {
        self.config.ensure_admin(caller)?;
        let old = self.config.fee.transfer_fee_bps;
        if self.config.set_transfer_fee_bps(bps)? {
            self.emit(EventKind::TransferFeeBpsUpdated { old, new: bps });
        }
        Ok(())
    }

    /// Pause or unpause every state-mutating entry point.
    pub fn set_paused(&mut self, paused: bool, caller: &Address) -> Result<()> {
        self.config.ensure_admin(caller)?;
        self.config.paused = paused;
        info!(paused, "pause flag updated");
        Ok(())
    }

    // =====================================================================
    // Read-only validation and previews
    // =====================================================================

    /// Validate creation parameters and pre-compute the identifier the
    /// order would get, without mutating anything. Uses the supplied salt
    /// or the maker's current master nonce.
    pub fn preview_order(&self, creation: &OrderCreation, salt: Option<u64>) -> Result<OrderId> {
        self.validate_creation(creation)?;
        let nonce = salt.unwrap_or_else(|| self.master_nonce(&creation.maker));
        let order = creation.clone().into_order(self.config.give_chain_id, nonce);
        Ok(order.id())
    }

    /// Fee breakdown an order would get under the current schedule.
    pub fn preview_creation_fee(
        &self,
        give_amount: u128,
        affiliate_amount: u128,
    ) -> Result<FeeBreakdown> {
        fee::creation_fee(
            give_amount,
            self.config.fee.transfer_fee_bps,
            affiliate_amount,
        )
    }

    #[must_use]
    pub fn order_status(&self, id: &OrderId) -> OrderGiveStatus {
        self.ledger.status(id)
    }

    #[must_use]
    pub fn order_state(&self, id: &OrderId) -> Option<&GiveOrderState> {
        self.ledger.get(id)
    }

    #[must_use]
    pub fn give_patch(&self, id: &OrderId) -> u128 {
        self.ledger.patch_amount(id)
    }

    /// Current master nonce for a maker (the nonce the next default
    /// creation will use).
    #[must_use]
    pub fn master_nonce(&self, maker: &Address) -> u64 {
        self.master_nonces.get(maker).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn collected_fee(&self, token: &Address) -> u128 {
        self.collected.amount(token)
    }

    #[must_use]
    pub fn unclaimed_affiliate_balance(&self, beneficiary: &Address) -> u128 {
        self.unclaimed.balance(beneficiary)
    }

    /// The append-only audit trail.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[must_use]
    pub fn ledger(&self) -> &EscrowLedger {
        &self.ledger
    }

    #[must_use]
    pub fn bank(&self) -> &B {
        &self.bank
    }

    #[must_use]
    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    // =====================================================================
    // Internals
    // =====================================================================

    fn validate_creation(&self, creation: &OrderCreation) -> Result<()> {
        if creation.maker.is_empty() {
            return Err(GivelockError::ZeroAddress { field: "maker" });
        }
        if creation.order_authority_src.is_empty() {
            return Err(GivelockError::ZeroAddress {
                field: "order_authority_src",
            });
        }
        let expected = self
            .auth
            .expected_address_len(creation.take_chain_id)
            .ok_or(GivelockError::NotSupportedDstChain(creation.take_chain_id))?;

        Self::check_width("receiver_dst", &creation.receiver_dst, expected)?;
        Self::check_width("order_authority_dst", &creation.order_authority_dst, expected)?;
        Self::check_width("take_token", &creation.take_token, expected)?;
        if let Some(taker) = &creation.allowed_taker_dst {
            Self::check_width("allowed_taker_dst", taker, expected)?;
        }
        Ok(())
    }

    fn check_width(field: &'static str, addr: &Address, expected: usize) -> Result<()> {
        if addr.len() != expected {
            return Err(GivelockError::WrongAddressLength {
                field,
                expected,
                actual: addr.len(),
            });
        }
        Ok(())
    }

    fn ensure_batch_size(len: usize) -> Result<()> {
        if len > constants::MAX_BATCH_CLAIMS {
            return Err(GivelockError::BatchTooLarge {
                len,
                max: constants::MAX_BATCH_CLAIMS,
            });
        }
        Ok(())
    }

    /// Pull the escrow legs of a token order. The failure-prone token leg
    /// moves first; if the native leg then fails, the token leg is paid
    /// back, so an aborted creation leaves no funds in custody.
    fn pull_escrow(
        &mut self,
        maker: &Address,
        token: &Address,
        token_amount: u128,
        native_amount: u128,
        permit: &[u8],
    ) -> Result<()> {
        self.bank.apply_permit(maker, permit)?;
        self.bank.pull(token, maker, token_amount)?;
        if let Err(err) = self.bank.pull_native(maker, native_amount) {
            self.bank.pay(token, maker, token_amount)?;
            return Err(err);
        }
        Ok(())
    }

    fn bump_master_nonce(&mut self, maker: &Address) {
        *self.master_nonces.entry(maker.clone()).or_insert(0) += 1;
    }

    fn emit(&mut self, kind: EventKind) {
        self.events.push(Event::now(kind));
    }
}
