//! Protocol configuration and explicit role guards.
//!
//! Admin/ownership state is an explicit struct injected at construction;
//! role checks are guard functions, not access-control mixins. The fee
//! schedule here is the *global* one — every order snapshots it at
//! creation time into its own ledger entry.

use serde::{Deserialize, Serialize};

use crate::{constants, Address, ChainId, GivelockError, Result};

/// Global fee parameters, read atomically at order-creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Fixed native-asset fee charged on every order creation.
    pub fixed_native_fee: u128,
    /// Proportional fee on the give amount, in basis points.
    pub transfer_fee_bps: u16,
}

/// Configuration for a GiveLock settlement deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Admin account (destination registration, fee updates, withdrawal).
    pub admin: Address,
    /// The chain this deployment escrows on (the give chain).
    pub give_chain_id: ChainId,
    /// Current global fee schedule.
    pub fee: FeeSchedule,
    /// Gates every state-mutating entry point.
    pub paused: bool,
}

impl ProtocolConfig {
    #[must_use]
    pub fn new(admin: Address, give_chain_id: ChainId, fee: FeeSchedule) -> Self {
        Self {
            admin,
            give_chain_id,
            fee,
            paused: false,
        }
    }

    /// Guard: admin-only operations.
    pub fn ensure_admin(&self, caller: &Address) -> Result<()> {
        if *caller == self.admin {
            Ok(())
        } else {
            Err(GivelockError::NotAdmin)
        }
    }

    /// Guard: state-mutating entry points.
    pub fn ensure_not_paused(&self) -> Result<()> {
        if self.paused {
            Err(GivelockError::ContractPaused)
        } else {
            Ok(())
        }
    }

    /// Update the fixed native fee. Returns `true` when the value changed,
    /// so callers emit a change event only on an actual change.
    pub fn set_fixed_native_fee(&mut self, fee: u128) -> bool {
        if self.fee.fixed_native_fee == fee {
            return false;
        }
        self.fee.fixed_native_fee = fee;
        true
    }

    /// Update the transfer fee. Returns `true` when the value changed.
    ///
    /// # Errors
    /// Returns [`GivelockError::InvalidTransferFeeBps`] above the cap.
    pub fn set_transfer_fee_bps(&mut self, bps: u16) -> Result<bool> {
        if bps > constants::MAX_TRANSFER_FEE_BPS {
            return Err(GivelockError::InvalidTransferFeeBps { bps });
        }
        if self.fee.transfer_fee_bps == bps {
            return Ok(false);
        }
        self.fee.transfer_fee_bps = bps;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProtocolConfig {
        ProtocolConfig::new(
            Address::repeat(0xad, 20),
            ChainId(1),
            FeeSchedule {
                fixed_native_fee: 10,
                transfer_fee_bps: 10,
            },
        )
    }

    #[test]
    fn admin_guard() {
        let cfg = config();
        assert!(cfg.ensure_admin(&Address::repeat(0xad, 20)).is_ok());
        let err = cfg.ensure_admin(&Address::repeat(0x01, 20)).unwrap_err();
        assert!(matches!(err, GivelockError::NotAdmin));
    }

    #[test]
    fn pause_guard() {
        let mut cfg = config();
        assert!(cfg.ensure_not_paused().is_ok());
        cfg.paused = true;
        let err = cfg.ensure_not_paused().unwrap_err();
        assert!(matches!(err, GivelockError::ContractPaused));
    }

    #[test]
    fn fee_updates_report_actual_change() {
        let mut cfg = config();
        assert!(!cfg.set_fixed_native_fee(10), "same value, no change");
        assert!(cfg.set_fixed_native_fee(20));
        assert_eq!(cfg.fee.fixed_native_fee, 20);

        assert!(!cfg.set_transfer_fee_bps(10).unwrap());
        assert!(cfg.set_transfer_fee_bps(25).unwrap());
        assert_eq!(cfg.fee.transfer_fee_bps, 25);
    }

    #[test]
    fn transfer_fee_capped() {
        let mut cfg = config();
        let err = cfg
            .set_transfer_fee_bps(constants::MAX_TRANSFER_FEE_BPS + 1)
            .unwrap_err();
        assert!(matches!(err, GivelockError::InvalidTransferFeeBps { .. }));
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = config();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ProtocolConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
