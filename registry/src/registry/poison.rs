//! # Poison Pill
//!
//! The last line of defense. If a recovery trigger was itself the attack
//! (a stolen recovery key wiping out a victim's addresses), the victims are
//! exactly the addresses the trigger evicted. For one `recovery_timeout`
//! after the trigger, any one of them may detonate the identity: wipe its
//! addresses and providers (and optionally resolvers) so the attacker holds
//! an empty shell rather than a hijacked reputation.
//!
//! Membership in the evicted set is proven, not stored. The caller submits
//! the evicted list split around their own position; the registry rebuilds
//! `before ++ [caller] ++ after` and compares its hash against the
//! commitment logged at recovery time. A non-member cannot place themselves
//! anywhere in the list without changing the hash. The split arrays travel
//! in the clear, so a successful proof is observable before it commits;
//! hosts that allow transaction front-running should account for that, as
//! the scheme deliberately mirrors ledgers where the commitment is cheaper
//! than an enumerable membership record.
//!
//! Each recovery trigger arms at most one pill. Detonation marks the log
//! spent; re-arming takes another recovery.

use tracing::warn;

use crate::clock::Clock;
use crate::identity::{Address, Ein};

use super::error::RegistryError;
use super::event::Event;
use super::recovery::evicted_set_hash;
use super::store::IdentityRegistry;

impl<C: Clock> IdentityRegistry<C> {
    /// Irreversibly empty a recently-recovered identity.
    ///
    /// `addresses_before` and `addresses_after` are the evicted list split
    /// around the caller, in the exact order reported by the
    /// `RecoveryTriggered` event. On success the identity keeps only its
    /// recovery address (and resolvers, unless `clear_resolvers`).
    pub fn trigger_poison_pill(
        &mut self,
        caller: Address,
        ein: Ein,
        addresses_before: &[Address],
        addresses_after: &[Address],
        clear_resolvers: bool,
    ) -> Result<(), RegistryError> {
        let now = self.clock.now();

        let record = self.record(ein)?;
        let armed = match &record.recovered_change {
            Some(recovered)
                if !recovered.pill_spent && self.within_recovery_window(recovered.timestamp, now) =>
            {
                recovered
            }
            _ => return Err(RegistryError::RecoveryWindowClosed { ein }),
        };

        let mut reconstructed =
            Vec::with_capacity(addresses_before.len() + 1 + addresses_after.len());
        reconstructed.extend_from_slice(addresses_before);
        reconstructed.push(caller);
        reconstructed.extend_from_slice(addresses_after);
        if evicted_set_hash(&reconstructed) != armed.evicted_hash {
            return Err(RegistryError::EvictionProofMismatch { ein });
        }

        // Proof verified; detonate.
        let current = record.associated_addresses.to_vec();
        for address in &current {
            self.address_index.remove(address);
        }
        let record = self.record_mut(ein)?;
        record.associated_addresses.clear();
        record.providers.clear();
        if clear_resolvers {
            record.resolvers.clear();
        }
        if let Some(recovered) = record.recovered_change.as_mut() {
            recovered.pill_spent = true;
        }

        warn!(%ein, by = %caller, clear_resolvers, "identity poisoned");
        self.emit(
            now,
            Event::IdentityPoisoned {
                ein,
                triggered_by: caller,
                resolvers_cleared: clear_resolvers,
            },
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
