//! Identifiers used throughout GiveLock.
//!
//! An [`OrderId`] is a deterministic 32-byte content hash of the full
//! canonical order encoding — not a random id. Two structurally identical
//! orders only differ by maker nonce, so the id commits to every term.
//! Chain-native addresses are variable-width byte strings ([`Address`]):
//! different chain engines use different encodings, and comparisons are
//! always byte-exact.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// Deterministic order identifier: SHA-256 of the canonical order encoding.
///
/// Usable as a ledger key before the order is persisted; stable across
/// calls. Collisions require a hash collision (assumed infeasible).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderId(pub [u8; 32]);

impl OrderId {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// ChainId
// ---------------------------------------------------------------------------

/// Numeric identifier of a chain engine (give chain or take chain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chain:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A chain-native account or token address.
///
/// Width varies per chain engine (20 bytes on EVM-style chains, 32 on
/// others), so this is a variable-length byte string compared exactly.
/// The empty address is the native-asset sentinel for **token** fields;
/// it is never a valid participant address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Address(pub Vec<u8>);

impl Address {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The native-asset sentinel (empty byte string).
    #[must_use]
    pub fn native() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the native-asset sentinel.
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..self.0.len().min(4)])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            write!(f, "native")
        } else {
            write!(f, "0x{}", hex::encode(&self.0))
        }
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Address {
    /// Random address of the given width.
    pub fn dummy(len: usize) -> Self {
        let bytes: Vec<u8> = (0..len).map(|_| rand::random::<u8>()).collect();
        Self(bytes)
    }

    /// Deterministic address of the given width, filled with `byte`.
    pub fn repeat(byte: u8, len: usize) -> Self {
        Self(vec![byte; len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_display_and_short() {
        let id = OrderId::from_bytes([0xab; 32]);
        assert_eq!(id.short(), "abababab");
        assert_eq!(format!("{id}"), "order:abababababababab");
    }

    #[test]
    fn native_sentinel() {
        let native = Address::native();
        assert!(native.is_native());
        assert_eq!(format!("{native}"), "native");

        let token = Address::repeat(0x11, 20);
        assert!(!token.is_native());
        assert_eq!(token.len(), 20);
    }

    #[test]
    fn address_comparison_is_byte_exact() {
        // Same leading bytes, different width: distinct addresses.
        let evm = Address::repeat(0x22, 20);
        let wide = Address::repeat(0x22, 32);
        assert_ne!(evm, wide);
    }

    #[test]
    fn chain_id_display() {
        assert_eq!(format!("{}", ChainId(137)), "chain:137");
    }

    #[test]
    fn serde_roundtrips() {
        let id = OrderId::from_bytes([7u8; 32]);
        let json = serde_json::to_string(&id).unwrap();
        let back: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);

        let addr = Address::repeat(0x33, 32);
        let json = serde_json::to_string(&addr).unwrap();
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }
}
