//! Cross-chain claim authentication.
//!
//! Unlock and cancel instructions arrive through the messaging gateway's
//! single trusted call-proxy. Provenance is established in two steps:
//! the immediate caller must be that proxy, and the proxy-reported native
//! sender must byte-exactly match the destination contract registered for
//! the reported origin chain. Address encodings differ per chain engine,
//! so the comparison is over raw variable-width bytes — a prefix match or
//! a padded match is a spoof, not a match.

use std::collections::HashMap;

use givelock_types::{Address, ChainId, GivelockError, Result};
use tracing::debug;

/// What the trusted call-proxy reports about an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEnvelope {
    /// The immediate caller delivering the instruction.
    pub caller: Address,
    /// The native-chain sender, as reported by the proxy.
    pub native_sender: Address,
    /// The chain the message claims to originate from.
    pub origin_chain_id: ChainId,
}

/// Validates that finalization instructions originate from the registered
/// destination contract on the claimed origin chain.
pub struct CrossChainAuthenticator {
    /// The one call-relay address published by the messaging gateway.
    trusted_proxy: Address,
    /// Registered destination contract per take chain.
    dst_contracts: HashMap<ChainId, Address>,
}

impl CrossChainAuthenticator {
    #[must_use]
    pub fn new(trusted_proxy: Address) -> Self {
        Self {
            trusted_proxy,
            dst_contracts: HashMap::new(),
        }
    }

    /// Register (or replace) the destination contract for a chain.
    ///
    /// The registered address's byte length also defines the expected
    /// address-encoding width for that chain, used when validating
    /// take-chain address fields at order creation.
    pub fn register_dst(&mut self, chain_id: ChainId, contract: Address) {
        debug!(%chain_id, contract = %contract, "registered destination contract");
        self.dst_contracts.insert(chain_id, contract);
    }

    /// The registered destination contract for a chain, if any.
    #[must_use]
    pub fn registered_dst(&self, chain_id: ChainId) -> Option<&Address> {
        self.dst_contracts.get(&chain_id)
    }

    /// Expected address-encoding width for a chain, if registered.
    #[must_use]
    pub fn expected_address_len(&self, chain_id: ChainId) -> Option<usize> {
        self.dst_contracts.get(&chain_id).map(Address::len)
    }

    /// Verify an inbound claim envelope.
    ///
    /// # Errors
    /// - [`GivelockError::UnauthorizedRelay`] unless the caller is the
    ///   trusted call-proxy
    /// - [`GivelockError::UntrustedOriginSender`] unless the registered
    ///   destination contract for the claimed origin chain byte-exactly
    ///   matches the reported native sender
    ///
    /// Returns the verified origin chain id, which the coordinator uses
    /// as the expected take chain for every order in the claim.
    pub fn authenticate(&self, envelope: &InboundEnvelope) -> Result<ChainId> {
        if envelope.caller != self.trusted_proxy {
            return Err(GivelockError::UnauthorizedRelay {
                caller: envelope.caller.clone(),
            });
        }
        let registered = self.dst_contracts.get(&envelope.origin_chain_id).ok_or(
            GivelockError::UntrustedOriginSender {
                origin_chain: envelope.origin_chain_id,
            },
        )?;
        if *registered != envelope.native_sender {
            return Err(GivelockError::UntrustedOriginSender {
                origin_chain: envelope.origin_chain_id,
            });
        }
        Ok(envelope.origin_chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAKE_CHAIN: ChainId = ChainId(137);

    fn proxy() -> Address {
        Address::repeat(0x99, 20)
    }

    fn dst_contract() -> Address {
        Address::repeat(0xd0, 32)
    }

    fn authenticator() -> CrossChainAuthenticator {
        let mut auth = CrossChainAuthenticator::new(proxy());
        auth.register_dst(TAKE_CHAIN, dst_contract());
        auth
    }

    fn envelope() -> InboundEnvelope {
        InboundEnvelope {
            caller: proxy(),
            native_sender: dst_contract(),
            origin_chain_id: TAKE_CHAIN,
        }
    }

    #[test]
    fn valid_envelope_authenticates() {
        let auth = authenticator();
        assert_eq!(auth.authenticate(&envelope()).unwrap(), TAKE_CHAIN);
    }

    #[test]
    fn wrong_caller_rejected() {
        let auth = authenticator();
        let mut env = envelope();
        env.caller = Address::repeat(0x01, 20);
        let err = auth.authenticate(&env).unwrap_err();
        assert!(matches!(err, GivelockError::UnauthorizedRelay { .. }));
    }

    #[test]
    fn unregistered_chain_rejected() {
        let auth = authenticator();
        let mut env = envelope();
        env.origin_chain_id = ChainId(56);
        let err = auth.authenticate(&env).unwrap_err();
        assert!(matches!(
            err,
            GivelockError::UntrustedOriginSender {
                origin_chain: ChainId(56)
            }
        ));
    }

    #[test]
    fn sender_mismatch_rejected() {
        let auth = authenticator();
        let mut env = envelope();
        env.native_sender = Address::repeat(0xd1, 32);
        let err = auth.authenticate(&env).unwrap_err();
        assert!(matches!(err, GivelockError::UntrustedOriginSender { .. }));
    }

    #[test]
    fn width_mismatch_is_not_a_match() {
        // Same leading bytes, truncated width: must not authenticate.
        let auth = authenticator();
        let mut env = envelope();
        env.native_sender = Address::new(dst_contract().as_bytes()[..20].to_vec());
        let err = auth.authenticate(&env).unwrap_err();
        assert!(matches!(err, GivelockError::UntrustedOriginSender { .. }));
    }

    #[test]
    fn registration_defines_address_width() {
        let auth = authenticator();
        assert_eq!(auth.expected_address_len(TAKE_CHAIN), Some(32));
        assert_eq!(auth.expected_address_len(ChainId(56)), None);
    }

    #[test]
    fn re_registration_replaces() {
        let mut auth = authenticator();
        let replacement = Address::repeat(0xd2, 20);
        auth.register_dst(TAKE_CHAIN, replacement.clone());
        assert_eq!(auth.registered_dst(TAKE_CHAIN), Some(&replacement));

        // Old contract no longer authenticates.
        let err = auth.authenticate(&envelope()).unwrap_err();
        assert!(matches!(err, GivelockError::UntrustedOriginSender { .. }));
    }
}
