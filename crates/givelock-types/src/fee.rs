//! Fee arithmetic for order creation and patching.
//!
//! All fee math is pure and checked; the caller persists the results.
//! The percent fee is `floor(amount * bps / 10_000)` on the raw amount,
//! computed against the global schedule *at creation time* and snapshotted
//! into the ledger entry (later schedule changes never touch live orders).

use serde::{Deserialize, Serialize};

use crate::{constants, Address, GivelockError, Result};

/// Affiliate payout terms attached to an order at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffiliateFee {
    /// Give-chain account receiving the affiliate cut.
    pub beneficiary: Address,
    /// Cut carved out of the give amount, paid at unlock.
    pub amount: u128,
}

impl AffiliateFee {
    /// Parse the opaque affiliate payload.
    ///
    /// Framing: one length byte, the beneficiary bytes, then a 16-byte
    /// big-endian amount. An empty payload means no affiliate.
    ///
    /// # Errors
    /// Returns [`GivelockError::WrongAffiliateFeeLength`] on any other shape.
    pub fn decode(payload: &[u8]) -> Result<Option<Self>> {
        if payload.is_empty() {
            return Ok(None);
        }
        let beneficiary_len = payload[0] as usize;
        let expected = 1 + beneficiary_len + constants::AFFILIATE_AMOUNT_BYTES;
        if beneficiary_len == 0 || payload.len() != expected {
            return Err(GivelockError::WrongAffiliateFeeLength { len: payload.len() });
        }
        let beneficiary = Address::new(&payload[1..=beneficiary_len]);
        let amount_bytes: [u8; constants::AFFILIATE_AMOUNT_BYTES] = payload
            [1 + beneficiary_len..]
            .try_into()
            .map_err(|_| GivelockError::WrongAffiliateFeeLength { len: payload.len() })?;
        Ok(Some(Self {
            beneficiary,
            amount: u128::from_be_bytes(amount_bytes),
        }))
    }

    /// Inverse of [`Self::decode`].
    ///
    /// # Panics
    /// Panics if the beneficiary is wider than 255 bytes.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let len = u8::try_from(self.beneficiary.len()).expect("address wider than 255 bytes");
        let mut payload = Vec::with_capacity(1 + self.beneficiary.len() + 16);
        payload.push(len);
        payload.extend_from_slice(self.beneficiary.as_bytes());
        payload.extend_from_slice(&self.amount.to_be_bytes());
        payload
    }
}

/// Result of a fee computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// Basis-point fee on the raw amount.
    pub percent_fee: u128,
    /// Amount actually escrowed after percent fee and affiliate cut.
    pub net_amount: u128,
}

/// Fee taken at order creation.
///
/// `percent_fee = floor(give_amount * bps / 10_000)`,
/// `net_amount = give_amount - percent_fee - affiliate_amount`.
///
/// # Errors
/// - [`GivelockError::AmountOverflow`] if `give_amount * bps` overflows
/// - [`GivelockError::FeeExceedsGiveAmount`] if fee plus affiliate cut
///   leaves nothing to escrow
pub fn creation_fee(
    give_amount: u128,
    transfer_fee_bps: u16,
    affiliate_amount: u128,
) -> Result<FeeBreakdown> {
    let percent_fee = percent_of(give_amount, transfer_fee_bps)?;
    let deducted = percent_fee
        .checked_add(affiliate_amount)
        .ok_or(GivelockError::AmountOverflow)?;
    let net_amount =
        give_amount
            .checked_sub(deducted)
            .ok_or(GivelockError::FeeExceedsGiveAmount {
                give_amount,
                percent_fee,
                affiliate_amount,
            })?;
    Ok(FeeBreakdown {
        percent_fee,
        net_amount,
    })
}

/// Fee taken on a patch increment. Same formula, no affiliate cut; the
/// result accumulates additively onto the stored percent fee.
pub fn patch_fee(add_amount: u128, transfer_fee_bps: u16) -> Result<FeeBreakdown> {
    creation_fee(add_amount, transfer_fee_bps, 0)
}

fn percent_of(amount: u128, bps: u16) -> Result<u128> {
    amount
        .checked_mul(u128::from(bps))
        .map(|v| v / constants::BPS_DENOMINATOR)
        .ok_or(GivelockError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_fee_floors() {
        // 1000 * 10bps / 10000 = 1
        let fee = creation_fee(1_000, 10, 50).unwrap();
        assert_eq!(fee.percent_fee, 1);
        assert_eq!(fee.net_amount, 949);

        // 999 * 10bps / 10000 = 0.999 -> floor 0
        let fee = creation_fee(999, 10, 0).unwrap();
        assert_eq!(fee.percent_fee, 0);
        assert_eq!(fee.net_amount, 999);
    }

    #[test]
    fn zero_bps_charges_nothing() {
        let fee = creation_fee(1_000, 0, 0).unwrap();
        assert_eq!(fee.percent_fee, 0);
        assert_eq!(fee.net_amount, 1_000);
    }

    #[test]
    fn affiliate_cut_comes_off_net() {
        let fee = creation_fee(10_000, 100, 500).unwrap(); // 1% = 100
        assert_eq!(fee.percent_fee, 100);
        assert_eq!(fee.net_amount, 9_400);
    }

    #[test]
    fn fee_exceeding_amount_rejected() {
        let err = creation_fee(100, 10, 100).unwrap_err();
        assert!(matches!(err, GivelockError::FeeExceedsGiveAmount { .. }));
    }

    #[test]
    fn overflow_rejected() {
        let err = creation_fee(u128::MAX, 10, 0).unwrap_err();
        assert!(matches!(err, GivelockError::AmountOverflow));
    }

    #[test]
    fn patch_fee_matches_creation_formula() {
        let patch = patch_fee(1_000, 10).unwrap();
        let creation = creation_fee(1_000, 10, 0).unwrap();
        assert_eq!(patch, creation);
    }

    #[test]
    fn affiliate_payload_roundtrip() {
        let fee = AffiliateFee {
            beneficiary: Address::repeat(0xee, 20),
            amount: 50,
        };
        let payload = fee.encode();
        let back = AffiliateFee::decode(&payload).unwrap().unwrap();
        assert_eq!(fee, back);
    }

    #[test]
    fn empty_payload_is_no_affiliate() {
        assert_eq!(AffiliateFee::decode(&[]).unwrap(), None);
    }

    #[test]
    fn malformed_payloads_rejected() {
        // Truncated amount.
        let mut payload = AffiliateFee {
            beneficiary: Address::repeat(0xee, 20),
            amount: 50,
        }
        .encode();
        payload.pop();
        let err = AffiliateFee::decode(&payload).unwrap_err();
        assert!(matches!(err, GivelockError::WrongAffiliateFeeLength { .. }));

        // Zero-length beneficiary.
        let err = AffiliateFee::decode(&[0u8; 17]).unwrap_err();
        assert!(matches!(err, GivelockError::WrongAffiliateFeeLength { .. }));

        // Trailing garbage.
        let mut payload = AffiliateFee {
            beneficiary: Address::repeat(0xee, 32),
            amount: 1,
        }
        .encode();
        payload.push(0);
        let err = AffiliateFee::decode(&payload).unwrap_err();
        assert!(matches!(err, GivelockError::WrongAffiliateFeeLength { .. }));
    }
}
