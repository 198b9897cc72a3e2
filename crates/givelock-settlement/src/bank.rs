//! Token-transfer port and its in-memory implementation.
//!
//! The settlement engine consumes token balances through the narrow
//! [`TokenBank`] interface: pull into escrow custody, pay out of it, and
//! a non-reverting native payout for affiliate settlement. Non-standard
//! tokens that signal failure (or fail to signal success) must fail hard
//! — the trait contract forbids silent partial transfers.
//!
//! [`InMemoryBank`] is the reference implementation used by the test
//! suites: per-(holder, token) balances, one-time permit allowances, and
//! configurable recipients that reject native transfers.

use std::collections::{HashMap, HashSet};

use givelock_types::{Address, GivelockError, Result};

/// Narrow token-transfer interface the settlement engine runs against.
pub trait TokenBank {
    /// Pull `amount` of `token` from `from` into escrow custody.
    /// Requires a prior allowance (see [`Self::apply_permit`]). Fails hard.
    fn pull(&mut self, token: &Address, from: &Address, amount: u128) -> Result<()>;

    /// Pull attached native value from `from` into escrow custody.
    fn pull_native(&mut self, from: &Address, amount: u128) -> Result<()>;

    /// Pay `amount` of `token` out of escrow custody to `to`. Fails hard
    /// on any failure signal.
    fn pay(&mut self, token: &Address, to: &Address, amount: u128) -> Result<()>;

    /// Non-reverting native payout. Returns `false` when the recipient
    /// rejects the transfer; funds stay in custody.
    fn try_pay_native(&mut self, to: &Address, amount: u128) -> bool;

    /// Consume an opaque permit envelope granting a one-time allowance
    /// without a prior approval call. No-op when the envelope is empty.
    fn apply_permit(&mut self, owner: &Address, envelope: &[u8]) -> Result<()>;
}

/// In-memory bank. Escrow custody is a dedicated internal account.
pub struct InMemoryBank {
    /// Per-(holder, token) balances. Native asset uses the native sentinel.
    balances: HashMap<(Address, Address), u128>,
    /// One-time allowances granted to the escrow, per (owner, token).
    allowances: HashMap<(Address, Address), u128>,
    /// Recipients that reject native transfers.
    reject_native: HashSet<Address>,
    /// The custody account.
    vault: Address,
}

impl InMemoryBank {
    #[must_use]
    pub fn new(vault: Address) -> Self {
        Self {
            balances: HashMap::new(),
            allowances: HashMap::new(),
            reject_native: HashSet::new(),
            vault,
        }
    }

    /// Fund a holder. Creates the balance entry if absent.
    pub fn deposit(&mut self, holder: &Address, token: &Address, amount: u128) {
        *self
            .balances
            .entry((holder.clone(), token.clone()))
            .or_insert(0) += amount;
    }

    /// Grant the escrow a direct allowance (the non-permit approval path).
    pub fn approve(&mut self, owner: &Address, token: &Address, amount: u128) {
        self.allowances.insert((owner.clone(), token.clone()), amount);
    }

    /// Make `recipient` reject native transfers from now on.
    pub fn set_native_rejecting(&mut self, recipient: &Address) {
        self.reject_native.insert(recipient.clone());
    }

    #[must_use]
    pub fn balance(&self, holder: &Address, token: &Address) -> u128 {
        self.balances
            .get(&(holder.clone(), token.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Escrow custody balance for a token.
    #[must_use]
    pub fn vault_balance(&self, token: &Address) -> u128 {
        self.balance(&self.vault, token)
    }

    fn move_funds(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<()> {
        let from_key = (from.clone(), token.clone());
        let have = self.balances.get(&from_key).copied().unwrap_or(0);
        if have < amount {
            return Err(GivelockError::TransferFailed {
                token: token.clone(),
                to: to.clone(),
                amount,
            });
        }
        self.balances.insert(from_key, have - amount);
        *self
            .balances
            .entry((to.clone(), token.clone()))
            .or_insert(0) += amount;
        Ok(())
    }

    /// Permit envelope framing: one token-length byte, the token bytes,
    /// then a 16-byte big-endian allowance amount. Signature verification
    /// happens upstream; the envelope arrives here pre-validated.
    fn parse_permit(envelope: &[u8]) -> Result<(Address, u128)> {
        let malformed = || GivelockError::Internal("malformed permit envelope".into());
        let token_len = *envelope.first().ok_or_else(malformed)? as usize;
        if token_len == 0 || envelope.len() != 1 + token_len + 16 {
            return Err(malformed());
        }
        let token = Address::new(&envelope[1..=token_len]);
        let amount_bytes: [u8; 16] = envelope[1 + token_len..]
            .try_into()
            .map_err(|_| malformed())?;
        Ok((token, u128::from_be_bytes(amount_bytes)))
    }

    /// Build a permit envelope (test/demo convenience).
    #[must_use]
    pub fn permit_envelope(token: &Address, amount: u128) -> Vec<u8> {
        let mut envelope = Vec::with_capacity(1 + token.len() + 16);
        envelope.push(u8::try_from(token.len()).expect("address wider than 255 bytes"));
        envelope.extend_from_slice(token.as_bytes());
        envelope.extend_from_slice(&amount.to_be_bytes());
        envelope
    }
}

impl TokenBank for InMemoryBank {
    fn pull(&mut self, token: &Address, from: &Address, amount: u128) -> Result<()> {
        let key = (from.clone(), token.clone());
        let allowed = self.allowances.get(&key).copied().unwrap_or(0);
        if allowed < amount {
            return Err(GivelockError::TransferFailed {
                token: token.clone(),
                to: self.vault.clone(),
                amount,
            });
        }
        self.allowances.insert(key, allowed - amount);
        let vault = self.vault.clone();
        self.move_funds(token, from, &vault, amount)
    }

    fn pull_native(&mut self, from: &Address, amount: u128) -> Result<()> {
        let vault = self.vault.clone();
        self.move_funds(&Address::native(), from, &vault, amount)
    }

    fn pay(&mut self, token: &Address, to: &Address, amount: u128) -> Result<()> {
        let vault = self.vault.clone();
        self.move_funds(token, &vault, to, amount)
    }

    fn try_pay_native(&mut self, to: &Address, amount: u128) -> bool {
        if self.reject_native.contains(to) {
            return false;
        }
        self.pay(&Address::native(), to, amount).is_ok()
    }

    fn apply_permit(&mut self, owner: &Address, envelope: &[u8]) -> Result<()> {
        if envelope.is_empty() {
            return Ok(());
        }
        let (token, amount) = Self::parse_permit(envelope)?;
        self.approve(owner, &token, amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> Address {
        Address::repeat(0xff, 20)
    }

    fn token() -> Address {
        Address::repeat(0x10, 20)
    }

    #[test]
    fn pull_requires_allowance() {
        let mut bank = InMemoryBank::new(vault());
        let maker = Address::repeat(0xaa, 20);
        bank.deposit(&maker, &token(), 1_000);

        let err = bank.pull(&token(), &maker, 500).unwrap_err();
        assert!(matches!(err, GivelockError::TransferFailed { .. }));

        bank.approve(&maker, &token(), 500);
        bank.pull(&token(), &maker, 500).unwrap();
        assert_eq!(bank.balance(&maker, &token()), 500);
        assert_eq!(bank.vault_balance(&token()), 500);

        // Allowance was one-time.
        assert!(bank.pull(&token(), &maker, 1).is_err());
    }

    #[test]
    fn permit_grants_one_time_allowance() {
        let mut bank = InMemoryBank::new(vault());
        let maker = Address::repeat(0xaa, 20);
        bank.deposit(&maker, &token(), 1_000);

        let envelope = InMemoryBank::permit_envelope(&token(), 700);
        bank.apply_permit(&maker, &envelope).unwrap();
        bank.pull(&token(), &maker, 700).unwrap();
        assert_eq!(bank.vault_balance(&token()), 700);
    }

    #[test]
    fn empty_permit_is_noop() {
        let mut bank = InMemoryBank::new(vault());
        bank.apply_permit(&Address::repeat(0xaa, 20), &[]).unwrap();
    }

    #[test]
    fn malformed_permit_rejected() {
        let mut bank = InMemoryBank::new(vault());
        let err = bank
            .apply_permit(&Address::repeat(0xaa, 20), &[20u8, 1, 2])
            .unwrap_err();
        assert!(matches!(err, GivelockError::Internal(_)));
    }

    #[test]
    fn pay_fails_hard_on_insufficient_custody() {
        let mut bank = InMemoryBank::new(vault());
        let to = Address::repeat(0xbb, 20);
        let err = bank.pay(&token(), &to, 1).unwrap_err();
        assert!(matches!(err, GivelockError::TransferFailed { .. }));
    }

    #[test]
    fn rejecting_recipient_bounces_native() {
        let mut bank = InMemoryBank::new(vault());
        bank.deposit(&vault(), &Address::native(), 100);

        let hostile = Address::repeat(0x66, 20);
        bank.set_native_rejecting(&hostile);
        assert!(!bank.try_pay_native(&hostile, 50));
        // Funds stayed in custody.
        assert_eq!(bank.vault_balance(&Address::native()), 100);

        let friendly = Address::repeat(0x77, 20);
        assert!(bank.try_pay_native(&friendly, 50));
        assert_eq!(bank.balance(&friendly, &Address::native()), 50);
    }
}
