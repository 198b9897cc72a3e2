//! Audit events for the GiveLock settlement trail.
//!
//! Every significant action appends an [`Event`] to the coordinator's
//! event log. Order-created records are what off-chain takers and relays
//! consume; the fault events exist so a privileged operator can re-drive
//! a specific order without replaying the whole history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, ChainId, OrderGiveStatus, OrderId};

/// The action an event records, with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// An order was created and its escrow pulled.
    CreatedOrder {
        order_id: OrderId,
        maker: Address,
        give_token: Address,
        give_amount: u128,
        percent_fee: u128,
        fixed_native_fee: u128,
        take_chain_id: ChainId,
    },
    /// Escrow was patched up after creation.
    IncreasedGiveAmount {
        order_id: OrderId,
        add_amount: u128,
        add_percent_fee: u128,
    },
    /// An authenticated unlock paid out the escrow.
    ClaimedUnlock {
        order_id: OrderId,
        beneficiary: Address,
        amount: u128,
    },
    /// An authenticated cancel refunded the escrow fee-inclusive.
    ClaimedOrderCancel {
        order_id: OrderId,
        beneficiary: Address,
        amount: u128,
    },
    /// Unlock arrived for an order not in CREATED status. Fault log only.
    UnexpectedOrderStatusForClaim {
        order_id: OrderId,
        status: OrderGiveStatus,
        beneficiary: Address,
    },
    /// Cancel arrived for an order not in CREATED status. Fault log only.
    UnexpectedOrderStatusForCancel {
        order_id: OrderId,
        status: OrderGiveStatus,
        beneficiary: Address,
    },
    /// Unlock origin chain did not match the stored take chain.
    CriticalMismatchChainId {
        order_id: OrderId,
        stored: ChainId,
        claimed: ChainId,
    },
    /// A native affiliate payout bounced and was credited for later claim.
    AffiliateFeeDeferred {
        order_id: OrderId,
        beneficiary: Address,
        amount: u128,
    },
    /// An affiliate withdrew their deferred balance.
    UnclaimedAffiliatePaid { beneficiary: Address, amount: u128 },
    /// Protocol revenue for a token was withdrawn and zeroed.
    CollectedFeeWithdrawn {
        token: Address,
        beneficiary: Address,
        amount: u128,
    },
    /// A destination contract was registered for a chain.
    DstContractRegistered { chain_id: ChainId, contract: Address },
    /// The global fixed native fee changed.
    FixedNativeFeeUpdated { old: u128, new: u128 },
    /// The global transfer fee changed.
    TransferFeeBpsUpdated { old: u16, new: u16 },
}

impl EventKind {
    /// Stable event name for log lines and external consumers.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreatedOrder { .. } => "CREATED_ORDER",
            Self::IncreasedGiveAmount { .. } => "INCREASED_GIVE_AMOUNT",
            Self::ClaimedUnlock { .. } => "CLAIMED_UNLOCK",
            Self::ClaimedOrderCancel { .. } => "CLAIMED_ORDER_CANCEL",
            Self::UnexpectedOrderStatusForClaim { .. } => "UNEXPECTED_ORDER_STATUS_FOR_CLAIM",
            Self::UnexpectedOrderStatusForCancel { .. } => "UNEXPECTED_ORDER_STATUS_FOR_CANCEL",
            Self::CriticalMismatchChainId { .. } => "CRITICAL_MISMATCH_CHAIN_ID",
            Self::AffiliateFeeDeferred { .. } => "AFFILIATE_FEE_DEFERRED",
            Self::UnclaimedAffiliatePaid { .. } => "UNCLAIMED_AFFILIATE_PAID",
            Self::CollectedFeeWithdrawn { .. } => "COLLECTED_FEE_WITHDRAWN",
            Self::DstContractRegistered { .. } => "DST_CONTRACT_REGISTERED",
            Self::FixedNativeFeeUpdated { .. } => "FIXED_NATIVE_FEE_UPDATED",
            Self::TransferFeeBpsUpdated { .. } => "TRANSFER_FEE_BPS_UPDATED",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A timestamped entry in the append-only audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub emitted_at: DateTime<Utc>,
}

impl Event {
    #[must_use]
    pub fn now(kind: EventKind) -> Self {
        Self {
            kind,
            emitted_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names() {
        let kind = EventKind::FixedNativeFeeUpdated { old: 1, new: 2 };
        assert_eq!(kind.name(), "FIXED_NATIVE_FEE_UPDATED");
        assert_eq!(format!("{kind}"), "FIXED_NATIVE_FEE_UPDATED");
    }

    #[test]
    fn serde_roundtrip() {
        let event = Event::now(EventKind::CriticalMismatchChainId {
            order_id: OrderId::from_bytes([9u8; 32]),
            stored: ChainId(10),
            claimed: ChainId(56),
        });
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
