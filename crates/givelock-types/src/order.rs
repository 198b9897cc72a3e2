//! # Order model — the give-side escrow state machine
//!
//! An [`Order`] holds the immutable economic terms of a cross-chain trade.
//! Its identifier is derived by hashing the full canonical encoding, so the
//! id commits to every term: changing any field changes the identity.
//!
//! ## State Machine
//!
//! ```text
//!                       unlock claim    ┌────────────────┐
//!   ┌─────────┐      ┌────────────────▶│ CLAIMED_UNLOCK │
//!   │ NOT_SET │      │                 └────────────────┘
//!   └────┬────┘  ┌───┴─────┐
//!        └──────▶│ CREATED │
//!        create  └───┬─────┘           ┌────────────────┐
//!                    └────────────────▶│ CLAIMED_CANCEL │
//!                       cancel claim   └────────────────┘
//! ```
//!
//! Both claimed states are terminal. `NOT_SET` is the implicit status of an
//! absent ledger entry and the only state from which `CREATED` is reachable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{constants, Address, AffiliateFee, ChainId, OrderId};

/// Lifecycle status of a give-side order.
///
/// Transitions are **monotonic** (never go backwards):
/// - `NotSet → Created` (order creation)
/// - `Created → ClaimedUnlock` (authenticated unlock from the take chain)
/// - `Created → ClaimedCancel` (authenticated cancel from the take chain)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderGiveStatus {
    /// No ledger entry exists for this order id.
    NotSet,
    /// Escrow is held; awaiting an authenticated finalization message.
    Created,
    /// Unlocked: escrow paid to the taker-side beneficiary. **Terminal.**
    ClaimedUnlock,
    /// Cancelled: escrow refunded fee-inclusive. **Terminal.**
    ClaimedCancel,
}

impl OrderGiveStatus {
    /// Can this status transition to the given target status?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::NotSet, Self::Created)
                | (Self::Created, Self::ClaimedUnlock | Self::ClaimedCancel)
        )
    }

    /// Whether this status admits no further transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ClaimedUnlock | Self::ClaimedCancel)
    }
}

impl std::fmt::Display for OrderGiveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSet => write!(f, "NOT_SET"),
            Self::Created => write!(f, "CREATED"),
            Self::ClaimedUnlock => write!(f, "CLAIMED_UNLOCK"),
            Self::ClaimedCancel => write!(f, "CLAIMED_CANCEL"),
        }
    }
}

/// Immutable cross-chain trade terms, keyed by a deterministic identifier.
///
/// Every address whose chain is the take chain uses that chain's encoding
/// width; give-chain addresses use the local width. The per-maker nonce
/// (the "salt") makes structurally identical repeat orders distinct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Maker account on the give chain.
    pub maker: Address,
    /// Chain where the escrow is held (this chain).
    pub give_chain_id: ChainId,
    /// Escrowed token; the native sentinel for the native asset.
    pub give_token: Address,
    /// Raw give amount before fees.
    pub give_amount: u128,
    /// Chain where the counterpart fulfils the trade.
    pub take_chain_id: ChainId,
    /// Token the taker must deliver on the take chain.
    pub take_token: Address,
    /// Amount the taker must deliver.
    pub take_amount: u128,
    /// Receiver of the take-side funds, on the take chain.
    pub receiver_dst: Address,
    /// Give-chain authority empowered to patch this order.
    pub order_authority_src: Address,
    /// Take-chain authority empowered to act on this order there.
    pub order_authority_dst: Address,
    /// If set, only this take-chain account may fulfil the order.
    pub allowed_taker_dst: Option<Address>,
    /// If set, only this give-chain account may receive a cancel refund.
    pub allowed_cancel_beneficiary_src: Option<Address>,
    /// Opaque payload executed on the take chain after fulfilment.
    pub external_call: Option<Vec<u8>>,
    /// Per-maker nonce, either auto-incremented or caller-supplied salt.
    pub maker_nonce: u64,
}

impl Order {
    /// Canonical byte encoding of every field, length-prefixed so that no
    /// two distinct value-sets share an encoding.
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        fn put_address(buf: &mut Vec<u8>, addr: &Address) {
            buf.extend_from_slice(&(addr.len() as u32).to_le_bytes());
            buf.extend_from_slice(addr.as_bytes());
        }
        fn put_opt_address(buf: &mut Vec<u8>, addr: Option<&Address>) {
            match addr {
                None => buf.push(0),
                Some(a) => {
                    buf.push(1);
                    put_address(buf, a);
                }
            }
        }

        let mut buf = Vec::with_capacity(256);
        buf.extend_from_slice(constants::ORDER_ID_DOMAIN);
        put_address(&mut buf, &self.maker);
        buf.extend_from_slice(&self.give_chain_id.0.to_le_bytes());
        put_address(&mut buf, &self.give_token);
        buf.extend_from_slice(&self.give_amount.to_le_bytes());
        buf.extend_from_slice(&self.take_chain_id.0.to_le_bytes());
        put_address(&mut buf, &self.take_token);
        buf.extend_from_slice(&self.take_amount.to_le_bytes());
        put_address(&mut buf, &self.receiver_dst);
        put_address(&mut buf, &self.order_authority_src);
        put_address(&mut buf, &self.order_authority_dst);
        put_opt_address(&mut buf, self.allowed_taker_dst.as_ref());
        put_opt_address(&mut buf, self.allowed_cancel_beneficiary_src.as_ref());
        match &self.external_call {
            None => buf.push(0),
            Some(payload) => {
                buf.push(1);
                buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
                buf.extend_from_slice(payload);
            }
        }
        buf.extend_from_slice(&self.maker_nonce.to_le_bytes());
        buf
    }

    /// Deterministic order identifier: SHA-256 over [`Self::canonical_bytes`].
    #[must_use]
    pub fn id(&self) -> OrderId {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_bytes());
        let hash = hasher.finalize();
        let bytes: [u8; 32] = hash.into();
        OrderId::from_bytes(bytes)
    }
}

/// Mutable per-order escrow record, created once and never deleted.
///
/// The fee fields are snapshots of the global schedule at creation time, so
/// later schedule changes cannot retroactively alter an existing order's
/// obligations. `take_chain_id` is captured for cross-chain origin
/// verification at claim time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiveOrderState {
    /// Current lifecycle status.
    pub status: OrderGiveStatus,
    /// Escrowed token (native sentinel for the native asset).
    pub give_token: Address,
    /// Fixed native-asset fee charged at creation.
    pub fixed_native_fee: u128,
    /// The chain finalization messages must originate from.
    pub take_chain_id: ChainId,
    /// Accumulated basis-point fee (creation plus patches).
    pub percent_fee: u128,
    /// Give amount actually escrowed, net of percent fee and affiliate cut.
    pub give_amount: u128,
    /// Affiliate payout terms, if any.
    pub affiliate: Option<AffiliateFee>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
}

impl GiveOrderState {
    /// Attempt the `Created → ClaimedUnlock` transition.
    pub fn mark_claimed_unlock(&mut self) -> crate::Result<()> {
        self.transition(OrderGiveStatus::ClaimedUnlock)
    }

    /// Attempt the `Created → ClaimedCancel` transition.
    pub fn mark_claimed_cancel(&mut self) -> crate::Result<()> {
        self.transition(OrderGiveStatus::ClaimedCancel)
    }

    fn transition(&mut self, target: OrderGiveStatus) -> crate::Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(crate::GivelockError::Internal(format!(
                "illegal transition {} -> {target}",
                self.status
            )));
        }
        self.status = target;
        Ok(())
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    /// An order between two 20-byte-address chains with sane defaults.
    pub fn dummy(give_amount: u128, take_chain_id: ChainId, maker_nonce: u64) -> Self {
        let maker = Address::repeat(0xaa, 20);
        Self {
            maker: maker.clone(),
            give_chain_id: ChainId(1),
            give_token: Address::repeat(0x10, 20),
            give_amount,
            take_chain_id,
            take_token: Address::repeat(0x20, 20),
            take_amount: give_amount * 2,
            receiver_dst: Address::repeat(0xbb, 20),
            order_authority_src: maker,
            order_authority_dst: Address::repeat(0xcc, 20),
            allowed_taker_dst: None,
            allowed_cancel_beneficiary_src: None,
            external_call: None,
            maker_nonce,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions_valid() {
        use OrderGiveStatus::*;
        assert!(NotSet.can_transition_to(Created));
        assert!(Created.can_transition_to(ClaimedUnlock));
        assert!(Created.can_transition_to(ClaimedCancel));
    }

    #[test]
    fn status_transitions_invalid() {
        use OrderGiveStatus::*;
        assert!(!ClaimedUnlock.can_transition_to(Created));
        assert!(!ClaimedUnlock.can_transition_to(ClaimedCancel));
        assert!(!ClaimedCancel.can_transition_to(ClaimedUnlock));
        assert!(!NotSet.can_transition_to(ClaimedUnlock));
        assert!(!NotSet.can_transition_to(ClaimedCancel));
        assert!(!Created.can_transition_to(NotSet));
    }

    #[test]
    fn terminal_statuses() {
        assert!(OrderGiveStatus::ClaimedUnlock.is_terminal());
        assert!(OrderGiveStatus::ClaimedCancel.is_terminal());
        assert!(!OrderGiveStatus::Created.is_terminal());
        assert!(!OrderGiveStatus::NotSet.is_terminal());
    }

    #[test]
    fn id_is_deterministic() {
        let order = Order::dummy(1_000, ChainId(137), 5);
        assert_eq!(order.id(), order.id());
        assert_eq!(order.canonical_bytes(), order.canonical_bytes());
    }

    #[test]
    fn id_commits_to_every_field() {
        let base = Order::dummy(1_000, ChainId(137), 5);

        let mut changed = base.clone();
        changed.give_amount = 1_001;
        assert_ne!(base.id(), changed.id());

        let mut changed = base.clone();
        changed.maker_nonce = 6;
        assert_ne!(base.id(), changed.id());

        let mut changed = base.clone();
        changed.take_chain_id = ChainId(56);
        assert_ne!(base.id(), changed.id());

        let mut changed = base.clone();
        changed.allowed_taker_dst = Some(Address::repeat(0xdd, 20));
        assert_ne!(base.id(), changed.id());

        let mut changed = base.clone();
        changed.external_call = Some(vec![1, 2, 3]);
        assert_ne!(base.id(), changed.id());
    }

    #[test]
    fn length_prefix_prevents_field_bleed() {
        // Moving a byte across a field boundary must change the encoding.
        let mut a = Order::dummy(0, ChainId(2), 0);
        a.receiver_dst = Address::new(vec![1, 2, 3]);
        a.order_authority_src = Address::new(vec![4]);

        let mut b = a.clone();
        b.receiver_dst = Address::new(vec![1, 2]);
        b.order_authority_src = Address::new(vec![3, 4]);

        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn state_transition_enforced() {
        let mut state = GiveOrderState {
            status: OrderGiveStatus::Created,
            give_token: Address::repeat(0x10, 20),
            fixed_native_fee: 10,
            take_chain_id: ChainId(137),
            percent_fee: 1,
            give_amount: 949,
            affiliate: None,
            created_at: Utc::now(),
        };
        state.mark_claimed_unlock().unwrap();
        assert_eq!(state.status, OrderGiveStatus::ClaimedUnlock);
        assert!(state.mark_claimed_cancel().is_err(), "terminal is terminal");
    }

    #[test]
    fn serde_roundtrip() {
        let order = Order::dummy(42, ChainId(10), 1);
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, back);
        assert_eq!(order.id(), back.id());
    }
}
