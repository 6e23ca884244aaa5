//! # Notification Records
//!
//! Every successful mutation appends exactly one record to the registry's
//! event log. The log is append-only and externally observable; records are
//! never rewritten, which is what lets indexers downstream treat it as a
//! source of truth without re-reading registry state.
//!
//! State lives in enum variants, not flag soup. The `delegated` markers on
//! the provider events distinguish self-service calls from provider-relayed
//! ones without needing two event types per action.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::{Address, Ein};

/// One entry in the registry's append-only notification log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique identifier for this record.
    pub id: Uuid,
    /// Ledger time at which the mutation committed.
    pub timestamp: u64,
    /// What happened.
    pub event: Event,
}

/// The mutations external observers can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A new identity was minted.
    IdentityMinted {
        /// The freshly assigned handle.
        ein: Ein,
        /// Its recovery address.
        recovery_address: Address,
        /// Its first associated address.
        associated_address: Address,
        /// Its first provider.
        provider: Address,
        /// Resolvers attached at mint time.
        resolvers: Vec<Address>,
        /// Whether a provider submitted the mint on the address's behalf.
        delegated: bool,
    },

    /// An address joined an identity's associated set.
    AddressAdded {
        ein: Ein,
        /// The new member.
        address: Address,
        /// The already-associated address that approved the addition.
        approved_by: Address,
        /// The provider that submitted the call.
        provider: Address,
    },

    /// An address left an identity's associated set by its own signature.
    AddressRemoved {
        ein: Ein,
        /// The departed member.
        address: Address,
    },

    /// Providers were granted for an identity.
    ProvidersAdded {
        ein: Ein,
        providers: Vec<Address>,
        /// True when an existing provider made the change, false when an
        /// associated address did it for its own identity.
        delegated: bool,
    },

    /// Providers were revoked for an identity.
    ProvidersRemoved {
        ein: Ein,
        providers: Vec<Address>,
        delegated: bool,
    },

    /// Resolvers were attached to an identity.
    ResolversAdded {
        ein: Ein,
        resolvers: Vec<Address>,
    },

    /// Resolvers were detached from an identity.
    ResolversRemoved {
        ein: Ein,
        resolvers: Vec<Address>,
    },

    /// A provider swapped the identity's recovery address.
    RecoveryAddressChanged {
        ein: Ein,
        /// The displaced address, now holding the grace-window entitlement.
        old_recovery_address: Address,
        /// The newly installed address.
        new_recovery_address: Address,
    },

    /// A recovery trigger wiped and re-seeded the identity.
    RecoveryTriggered {
        ein: Ein,
        /// The address that triggered the recovery (the new recovery address).
        triggered_by: Address,
        /// The sole associated address after the wipe.
        new_associated_address: Address,
        /// The full pre-recovery associated set, in the enumeration order
        /// the eviction commitment was hashed over. Evicted holders need
        /// this exact ordering to build a poison-pill proof.
        old_associated_addresses: Vec<Address>,
    },

    /// An evicted address detonated the poison pill.
    IdentityPoisoned {
        ein: Ein,
        /// The proven-evicted caller.
        triggered_by: Address,
        /// Whether resolvers were wiped along with addresses and providers.
        resolvers_cleared: bool,
    },
}

impl EventRecord {
    /// Stamp a new record with a fresh id at the given ledger time.
    pub fn new(timestamp: u64, event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::from_bytes([n; 32])
    }

    #[test]
    fn records_get_distinct_ids() {
        let a = EventRecord::new(1, Event::AddressRemoved { ein: Ein(1), address: addr(1) });
        let b = EventRecord::new(1, Event::AddressRemoved { ein: Ein(1), address: addr(1) });
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn event_serde_roundtrip() {
        let record = EventRecord::new(
            77,
            Event::RecoveryTriggered {
                ein: Ein(4),
                triggered_by: addr(1),
                new_associated_address: addr(2),
                old_associated_addresses: vec![addr(3), addr(4)],
            },
        );
        let json = serde_json::to_string(&record).unwrap();
        let back: EventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
