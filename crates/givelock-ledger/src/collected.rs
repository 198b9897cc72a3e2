//! Protocol revenue and deferred affiliate payout accumulators.
//!
//! [`CollectedFees`] tracks per-token protocol revenue credited at unlock
//! finalization and zeroed on withdrawal. [`UnclaimedAffiliateFees`] holds
//! native payouts that a recipient rejected at settlement time, claimable
//! later by the affiliate — a hostile or incapable affiliate recipient
//! must never block the maker's core settlement.

use std::collections::HashMap;

use givelock_types::{Address, GivelockError, Result};

/// Per-token running total of protocol revenue.
pub struct CollectedFees {
    fees: HashMap<Address, u128>,
}

impl CollectedFees {
    #[must_use]
    pub fn new() -> Self {
        Self {
            fees: HashMap::new(),
        }
    }

    /// Credit revenue for a token.
    pub fn credit(&mut self, token: &Address, amount: u128) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let total = self.fees.entry(token.clone()).or_insert(0);
        *total = total
            .checked_add(amount)
            .ok_or(GivelockError::AmountOverflow)?;
        Ok(())
    }

    /// Withdraw and zero the accumulated fee for a token.
    ///
    /// # Errors
    /// Returns [`GivelockError::NothingToWithdraw`] when nothing is accrued.
    pub fn withdraw(&mut self, token: &Address) -> Result<u128> {
        match self.fees.remove(token) {
            Some(amount) if amount > 0 => Ok(amount),
            _ => Err(GivelockError::NothingToWithdraw {
                token: token.clone(),
            }),
        }
    }

    /// Currently accrued fee for a token.
    #[must_use]
    pub fn amount(&self, token: &Address) -> u128 {
        self.fees.get(token).copied().unwrap_or(0)
    }
}

impl Default for CollectedFees {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-affiliate balances of native payouts that bounced at settlement.
pub struct UnclaimedAffiliateFees {
    balances: HashMap<Address, u128>,
}

impl UnclaimedAffiliateFees {
    #[must_use]
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Credit a bounced payout for later claim.
    pub fn credit(&mut self, beneficiary: &Address, amount: u128) -> Result<()> {
        let balance = self.balances.entry(beneficiary.clone()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(GivelockError::AmountOverflow)?;
        Ok(())
    }

    /// Claim and zero the balance for an affiliate.
    ///
    /// # Errors
    /// Returns [`GivelockError::NothingToWithdraw`] when the balance is zero.
    pub fn claim(&mut self, beneficiary: &Address) -> Result<u128> {
        match self.balances.remove(beneficiary) {
            Some(amount) if amount > 0 => Ok(amount),
            _ => Err(GivelockError::NothingToWithdraw {
                token: Address::native(),
            }),
        }
    }

    /// Current claimable balance for an affiliate.
    #[must_use]
    pub fn balance(&self, beneficiary: &Address) -> u128 {
        self.balances.get(beneficiary).copied().unwrap_or(0)
    }
}

impl Default for UnclaimedAffiliateFees {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> Address {
        Address::repeat(0x10, 20)
    }

    #[test]
    fn credit_accumulates_per_token() {
        let mut fees = CollectedFees::new();
        fees.credit(&token(), 5).unwrap();
        fees.credit(&token(), 7).unwrap();
        fees.credit(&Address::native(), 10).unwrap();

        assert_eq!(fees.amount(&token()), 12);
        assert_eq!(fees.amount(&Address::native()), 10);
    }

    #[test]
    fn zero_credit_is_noop() {
        let mut fees = CollectedFees::new();
        fees.credit(&token(), 0).unwrap();
        assert_eq!(fees.amount(&token()), 0);
        assert!(fees.withdraw(&token()).is_err());
    }

    #[test]
    fn withdraw_zeroes() {
        let mut fees = CollectedFees::new();
        fees.credit(&token(), 42).unwrap();

        assert_eq!(fees.withdraw(&token()).unwrap(), 42);
        assert_eq!(fees.amount(&token()), 0);

        let err = fees.withdraw(&token()).unwrap_err();
        assert!(matches!(err, GivelockError::NothingToWithdraw { .. }));
    }

    #[test]
    fn credit_overflow_rejected() {
        let mut fees = CollectedFees::new();
        fees.credit(&token(), u128::MAX).unwrap();
        let err = fees.credit(&token(), 1).unwrap_err();
        assert!(matches!(err, GivelockError::AmountOverflow));
    }

    #[test]
    fn unclaimed_affiliate_lifecycle() {
        let mut unclaimed = UnclaimedAffiliateFees::new();
        let affiliate = Address::repeat(0xaf, 20);

        unclaimed.credit(&affiliate, 50).unwrap();
        unclaimed.credit(&affiliate, 25).unwrap();
        assert_eq!(unclaimed.balance(&affiliate), 75);

        assert_eq!(unclaimed.claim(&affiliate).unwrap(), 75);
        assert_eq!(unclaimed.balance(&affiliate), 0);
        assert!(unclaimed.claim(&affiliate).is_err());
    }
}
