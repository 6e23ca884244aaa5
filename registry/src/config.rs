//! # Registry Configuration & Constants
//!
//! Every magic number in the registry lives here. The three timing/size
//! constants are part of the registry's external contract: clients observe
//! them through read-only accessors and build their signed messages around
//! them, so changing a default after deployment changes what counts as a
//! valid transaction.

use serde::{Deserialize, Serialize};

use crate::identity::Address;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Maximum number of associated addresses a single identity may hold.
///
/// Fifty keys per identity is generous. The cap exists so that the
/// recovery-time set hash and the poison-pill reconstruction stay bounded.
pub const DEFAULT_MAX_ASSOCIATED_ADDRESSES: usize = 50;

/// Cooldown between recovery actions, and the width of every post-recovery
/// trust window: the displaced-recovery-address grace period and the
/// poison-pill window. Two weeks, in seconds.
pub const DEFAULT_RECOVERY_TIMEOUT_SECS: u64 = 14 * 24 * 60 * 60;

/// Freshness window for timestamp-bound signatures. A signed message is
/// accepted while `timestamp <= now < timestamp + signature_timeout`.
/// One week, in seconds.
pub const DEFAULT_SIGNATURE_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

/// Human-readable prefix for Bech32-encoded Tessera addresses.
pub const ADDRESS_HRP: &str = "tess";

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

/// Deployment parameters of a registry instance.
///
/// `registry_address` identifies this instance inside every signed message.
/// A signature produced for one registry is meaningless to another, which is
/// the whole point: replaying an authorization across deployments must fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// The address identifying this registry instance in signed messages.
    pub registry_address: Address,
    /// Cap on `associated_addresses` per identity.
    pub max_associated_addresses: usize,
    /// Recovery cooldown and post-recovery window width, in seconds.
    pub recovery_timeout_secs: u64,
    /// Signature freshness window, in seconds.
    pub signature_timeout_secs: u64,
}

impl RegistryConfig {
    /// Configuration with the standard defaults for a registry deployed at
    /// the given address.
    pub fn new(registry_address: Address) -> Self {
        Self {
            registry_address,
            max_associated_addresses: DEFAULT_MAX_ASSOCIATED_ADDRESSES,
            recovery_timeout_secs: DEFAULT_RECOVERY_TIMEOUT_SECS,
            signature_timeout_secs: DEFAULT_SIGNATURE_TIMEOUT_SECS,
        }
    }
}
