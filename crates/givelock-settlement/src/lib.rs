//! Settlement plane for the give-side escrow engine.
//!
//! This crate wires the escrow ledger to the outside world:
//!
//! - [`coordinator`] — the [`SettlementCoordinator`] entry points for
//!   order creation, patching, authenticated claims, fee withdrawal, and
//!   administration.
//! - [`authenticator`] — provenance checks for inbound cross-chain
//!   finalization messages.
//! - [`bank`] — the [`TokenBank`] transfer port and an in-memory
//!   implementation for the test suites.
//! - [`guard`] — the scoped reentrancy guard held across every
//!   state-mutating entry point.

pub mod authenticator;
pub mod bank;
pub mod coordinator;
pub mod guard;

pub use authenticator::{CrossChainAuthenticator, InboundEnvelope};
pub use bank::{InMemoryBank, TokenBank};
pub use coordinator::{ClaimReport, OrderCreation, SettlementCoordinator};
pub use guard::{ReentrancyGuard, ReentrancySpan};
