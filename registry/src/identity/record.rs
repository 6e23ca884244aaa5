//! # Identity Records
//!
//! The per-identity state the registry stores: the four fields (recovery
//! address, associated addresses, providers, resolvers) plus the two
//! recovery logs that drive the grace-window and poison-pill rules.
//!
//! Records are never deleted. Recovery and the poison pill empty them; the
//! handle and its recovery address persist as an inert tombstone.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::address::Address;
use super::set::AddressSet;

// ---------------------------------------------------------------------------
// Ein
// ---------------------------------------------------------------------------

/// An identity handle.
///
/// Handles are assigned sequentially starting at 1; zero is reserved as
/// "does not exist" and is never minted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Ein(pub u64);

impl fmt::Display for Ein {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ein-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recovery logs
// ---------------------------------------------------------------------------

/// The most recent recovery-address swap for an identity.
///
/// While `timestamp + recovery_timeout` has not passed, trust extends to the
/// displaced address: it alone may trigger recovery, and no further swap may
/// be initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryAddressChange {
    /// Ledger time of the swap.
    pub timestamp: u64,
    /// The recovery address that was displaced by the swap.
    pub old_recovery_address: Address,
}

/// The most recent recovery trigger for an identity.
///
/// `evicted_hash` commits to the exact ordered associated-address set that
/// the trigger wiped. Within `timestamp + recovery_timeout`, any member of
/// that set may prove membership against the hash and fire the poison pill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveredChange {
    /// Ledger time of the trigger.
    pub timestamp: u64,
    /// BLAKE3 over the concatenated evicted addresses, in enumeration order.
    pub evicted_hash: [u8; 32],
    /// Set once a poison pill consumes this trigger's authorization. The
    /// log itself stays, because the trigger cooldown keys off `timestamp`
    /// whether or not a pill ever fired.
    pub pill_spent: bool,
}

// ---------------------------------------------------------------------------
// IdentityRecord
// ---------------------------------------------------------------------------

/// Everything the registry knows about one identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// The address empowered to reset this identity's associated addresses.
    pub recovery_address: Address,
    /// Addresses currently bound to this identity. Each address belongs to
    /// at most one identity registry-wide; the registry's reverse index
    /// mirrors this set exactly.
    pub associated_addresses: AddressSet,
    /// Addresses with delegated authority over this identity.
    pub providers: AddressSet,
    /// Attached data-resolution extensions.
    pub resolvers: AddressSet,
    /// Log of the most recent recovery-address swap, if any.
    pub recovery_address_change: Option<RecoveryAddressChange>,
    /// Log of the most recent recovery trigger, if any. Consumed by a
    /// successful poison pill.
    pub recovered_change: Option<RecoveredChange>,
}

impl IdentityRecord {
    /// A fresh record with the given recovery address and no members.
    pub fn new(recovery_address: Address) -> Self {
        Self {
            recovery_address,
            associated_addresses: AddressSet::new(),
            providers: AddressSet::new(),
            resolvers: AddressSet::new(),
            recovery_address_change: None,
            recovered_change: None,
        }
    }
}

/// Read-only snapshot of an identity's four fields, as returned by
/// [`get_details`](crate::registry::IdentityRegistry::get_details).
///
/// Collections are in enumeration order; membership is what callers should
/// compare, not ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDetails {
    /// The identity's handle.
    pub ein: Ein,
    /// Current recovery address.
    pub recovery_address: Address,
    /// Currently associated addresses.
    pub associated_addresses: Vec<Address>,
    /// Current providers.
    pub providers: Vec<Address>,
    /// Current resolvers.
    pub resolvers: Vec<Address>,
}
