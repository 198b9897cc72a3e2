//! # givelock-types
//!
//! Shared types, errors, and configuration for the **GiveLock** cross-chain
//! settlement engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`ChainId`], [`Address`]
//! - **Order model**: [`Order`], [`OrderGiveStatus`], [`GiveOrderState`]
//! - **Fee model**: [`FeeBreakdown`], [`AffiliateFee`], [`creation_fee`], [`patch_fee`]
//! - **Events**: [`Event`], [`EventKind`]
//! - **Configuration**: [`ProtocolConfig`], [`FeeSchedule`]
//! - **Errors**: [`GivelockError`] with `GL_ERR_` prefix codes
//! - **Constants**: basis-point denominator and framing widths

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod fee;
pub mod ids;
pub mod order;

// Re-export all primary types at crate root for ergonomic imports:
//   use givelock_types::{Order, OrderGiveStatus, Address, ...};

pub use config::*;
pub use error::*;
pub use event::*;
pub use fee::*;
pub use ids::*;
pub use order::*;

// Constants are accessed via `givelock_types::constants::FOO`
// (not re-exported to avoid name collisions).
