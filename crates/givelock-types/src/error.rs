//! Error types for the GiveLock settlement engine.
//!
//! All errors use the `GL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order-creation input errors
//! - 2xx: State-machine errors
//! - 3xx: Authorization / guard errors
//! - 4xx: Cross-chain integrity errors
//! - 5xx: Payment / fee errors
//! - 9xx: General / internal errors
//!
//! Not every anomaly is an error: unlock-path faults (already-finalized
//! order, chain-id mismatch) are *recorded* and processing continues —
//! see `ClaimOutcome` in the ledger crate. Only the fatal branches
//! surface here.

use thiserror::Error;

use crate::{Address, ChainId, OrderGiveStatus, OrderId};

/// Central error enum for all GiveLock operations.
#[derive(Debug, Error)]
pub enum GivelockError {
    // =================================================================
    // Order-creation input errors (1xx)
    // =================================================================
    /// No destination contract is registered for the order's take chain.
    #[error("GL_ERR_100: Destination chain not supported: {0}")]
    NotSupportedDstChain(ChainId),

    /// A take-chain address field does not match the registered encoding width.
    #[error("GL_ERR_101: Wrong address length for {field}: expected {expected}, got {actual}")]
    WrongAddressLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Attached native value must equal give amount plus the fixed fee.
    #[error("GL_ERR_102: Mismatched native give amount: expected {expected}, attached {attached}")]
    MismatchNativeGiveAmount { expected: u128, attached: u128 },

    /// Attached native value must equal the fixed fee exactly.
    #[error("GL_ERR_103: Wrong fixed fee: expected {expected}, attached {attached}")]
    WrongFixedFee { expected: u128, attached: u128 },

    /// The affiliate-fee payload does not match the expected framing.
    #[error("GL_ERR_104: Wrong affiliate fee payload length: {len}")]
    WrongAffiliateFeeLength { len: usize },

    /// An address field that must name a participant was empty.
    #[error("GL_ERR_105: Zero address for {field}")]
    ZeroAddress { field: &'static str },

    /// Patch amount must be strictly positive.
    #[error("GL_ERR_106: Patch amount must be greater than zero")]
    ZeroPatchAmount,

    /// Percent fee plus affiliate amount exceeds the give amount.
    #[error(
        "GL_ERR_107: Fees exceed give amount: give {give_amount}, \
         percent {percent_fee}, affiliate {affiliate_amount}"
    )]
    FeeExceedsGiveAmount {
        give_amount: u128,
        percent_fee: u128,
        affiliate_amount: u128,
    },

    /// Configured transfer fee is above the allowed maximum.
    #[error("GL_ERR_108: Invalid transfer fee: {bps} bps")]
    InvalidTransferFeeBps { bps: u16 },

    /// Batch size exceeds the per-call maximum.
    #[error("GL_ERR_109: Batch of {len} exceeds maximum of {max}")]
    BatchTooLarge { len: usize, max: usize },

    // =================================================================
    // State-machine errors (2xx)
    // =================================================================
    /// An order with this identifier already exists in the ledger.
    #[error("GL_ERR_200: Duplicate order: {0}")]
    DuplicateOrder(OrderId),

    /// The operation requires a different order status.
    #[error("GL_ERR_201: Incorrect order status for {order_id}: expected {expected}, got {actual}")]
    IncorrectOrderStatus {
        order_id: OrderId,
        expected: OrderGiveStatus,
        actual: OrderGiveStatus,
    },

    // =================================================================
    // Authorization / guard errors (3xx)
    // =================================================================
    /// Claim caller is not the trusted call-proxy of the messaging gateway.
    #[error("GL_ERR_300: Unauthorized relay caller: {caller}")]
    UnauthorizedRelay { caller: Address },

    /// Claimed native sender does not match the registered destination contract.
    #[error("GL_ERR_301: Untrusted origin sender for {origin_chain}")]
    UntrustedOriginSender { origin_chain: ChainId },

    /// Only the order's give-side authority may patch it.
    #[error("GL_ERR_302: Caller is not the order's patch authority")]
    NotPatchAuthority,

    /// Admin-only operation called by a non-admin.
    #[error("GL_ERR_303: Caller is not the admin")]
    NotAdmin,

    /// All state-mutating entry points are paused.
    #[error("GL_ERR_304: Contract is paused")]
    ContractPaused,

    /// A nested call re-entered a guarded entry point.
    #[error("GL_ERR_305: Reentrancy detected")]
    ReentrancyDetected,

    // =================================================================
    // Cross-chain integrity errors (4xx)
    // =================================================================
    /// Cancel-path chain-id mismatch — fatal, aborts the whole call.
    #[error(
        "GL_ERR_400: Critical chain-id mismatch for {order_id}: \
         stored {stored}, claimed {claimed}"
    )]
    CriticalMismatchChainId {
        order_id: OrderId,
        stored: ChainId,
        claimed: ChainId,
    },

    // =================================================================
    // Payment / fee errors (5xx)
    // =================================================================
    /// A token or native transfer failed hard.
    #[error("GL_ERR_500: Transfer of {amount} {token} to {to} failed")]
    TransferFailed {
        token: Address,
        to: Address,
        amount: u128,
    },

    /// No collected fee is available for this token.
    #[error("GL_ERR_501: Nothing to withdraw for token {token}")]
    NothingToWithdraw { token: Address },

    /// An amount computation overflowed u128.
    #[error("GL_ERR_502: Amount overflow")]
    AmountOverflow,

    // =================================================================
    // General / internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("GL_ERR_900: Internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, GivelockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = GivelockError::NotSupportedDstChain(ChainId(7));
        let msg = format!("{err}");
        assert!(msg.starts_with("GL_ERR_100"), "Got: {msg}");
        assert!(msg.contains("chain:7"));
    }

    #[test]
    fn duplicate_order_display() {
        let err = GivelockError::DuplicateOrder(OrderId::from_bytes([1u8; 32]));
        let msg = format!("{err}");
        assert!(msg.contains("GL_ERR_200"));
        assert!(msg.contains("order:"));
    }

    #[test]
    fn critical_mismatch_display() {
        let err = GivelockError::CriticalMismatchChainId {
            order_id: OrderId::from_bytes([2u8; 32]),
            stored: ChainId(10),
            claimed: ChainId(56),
        };
        let msg = format!("{err}");
        assert!(msg.contains("GL_ERR_400"));
        assert!(msg.contains("chain:10"));
        assert!(msg.contains("chain:56"));
    }

    #[test]
    fn all_errors_have_gl_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(GivelockError::ZeroPatchAmount),
            Box::new(GivelockError::NotAdmin),
            Box::new(GivelockError::ContractPaused),
            Box::new(GivelockError::ReentrancyDetected),
            Box::new(GivelockError::AmountOverflow),
            Box::new(GivelockError::Internal("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("GL_ERR_"),
                "Error missing GL_ERR_ prefix: {msg}"
            );
        }
    }
}
