//! System-wide constants for the GiveLock settlement engine.

/// Denominator for basis-point fee math: `fee = amount * bps / 10_000`.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Highest transfer fee the admin may configure (10%).
pub const MAX_TRANSFER_FEE_BPS: u16 = 1_000;

/// Domain tag prepended to the canonical order encoding before hashing.
pub const ORDER_ID_DOMAIN: &[u8] = b"givelock:order:v1:";

/// Width of the big-endian amount field in an affiliate-fee payload.
pub const AFFILIATE_AMOUNT_BYTES: usize = 16;

/// Maximum orders accepted in a single batch claim.
pub const MAX_BATCH_CLAIMS: usize = 256;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "GiveLock";
