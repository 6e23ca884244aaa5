//! # Recovery
//!
//! The two-tier recovery scheme. Tier one: a provider can swap an identity's
//! recovery address, but the swap is logged and rate-limited. Tier two: the
//! recovery address can wipe and re-seed the identity's keys, with a twist
//! that protects against tier one being the attack itself.
//!
//! The twist is the grace-window tie-break. For one `recovery_timeout` after
//! a recovery-address swap, the *displaced* address holds the recovery
//! entitlement, not the new one. An attacker who compromises a provider and
//! installs their own recovery address gains nothing for two weeks, during
//! which the legitimate (displaced) holder can recover the identity out from
//! under them. After the window, the installed address is presumed
//! legitimate and the entitlement passes to it.
//!
//! A successful trigger evicts every associated address and provider. The
//! evicted set is committed to the [`RecoveredChange`] log as a hash, which
//! is what arms the poison pill (see [`super::poison`]).

use tracing::info;

use crate::clock::Clock;
use crate::crypto::hash::blake3_hash_multi;
use crate::identity::{Address, Ein, RecoveredChange, RecoveryAddressChange};

use super::error::RegistryError;
use super::event::Event;
use super::messages;
use super::store::{Authorization, IdentityRegistry};

/// The eviction commitment: BLAKE3 over the raw 32-byte addresses
/// concatenated in enumeration order.
pub(crate) fn evicted_set_hash(addresses: &[Address]) -> [u8; 32] {
    let parts: Vec<&[u8]> = addresses.iter().map(|a| a.as_bytes().as_slice()).collect();
    blake3_hash_multi(&parts)
}

impl<C: Clock> IdentityRegistry<C> {
    /// Whether a logged instant is still inside the recovery timeout.
    pub(crate) fn within_recovery_window(&self, logged: u64, now: u64) -> bool {
        now.saturating_sub(logged) < self.config.recovery_timeout_secs
    }

    /// Swap an identity's recovery address.
    ///
    /// Provider-only. Rejected while the previous swap is still inside the
    /// recovery timeout, so a compromised provider cannot chain swaps fast
    /// enough to outrun the grace-window tie-break.
    pub fn initiate_recovery_address_change(
        &mut self,
        provider: Address,
        ein: Ein,
        new_recovery_address: Address,
    ) -> Result<(), RegistryError> {
        let now = self.clock.now();

        let record = self.record(ein)?;
        if !record.providers.contains(&provider) {
            return Err(RegistryError::NotProvider {
                address: provider,
                ein,
            });
        }
        if let Some(change) = &record.recovery_address_change {
            if self.within_recovery_window(change.timestamp, now) {
                return Err(RegistryError::ChangeCooldown { ein });
            }
        }

        let record = self.record_mut(ein)?;
        let old_recovery_address = record.recovery_address;
        record.recovery_address_change = Some(RecoveryAddressChange {
            timestamp: now,
            old_recovery_address,
        });
        record.recovery_address = new_recovery_address;

        info!(%ein, old = %old_recovery_address, new = %new_recovery_address, "recovery address changed");
        self.emit(
            now,
            Event::RecoveryAddressChanged {
                ein,
                old_recovery_address,
                new_recovery_address,
            },
        );
        Ok(())
    }

    /// Reset an identity's keys after loss or compromise.
    ///
    /// The caller must be the entitled recovery address under the tie-break
    /// rule, and must carry a fresh signature from `new_associated` (over
    /// the recovery message) consenting to be installed. On success the
    /// entire associated set and all providers are evicted, the evicted
    /// set's hash is logged for the poison pill, the caller becomes the
    /// recovery address, and `new_associated` becomes the sole associated
    /// address. Resolvers are untouched.
    pub fn trigger_recovery(
        &mut self,
        caller: Address,
        ein: Ein,
        new_associated: Address,
        authorization: &Authorization,
    ) -> Result<(), RegistryError> {
        let now = self.clock.now();

        let record = self.record(ein)?;
        if let Some(&holder) = self.address_index.get(&new_associated) {
            return Err(RegistryError::AddressInUse {
                address: new_associated,
                ein: holder,
            });
        }
        if let Some(recovered) = &record.recovered_change {
            if self.within_recovery_window(recovered.timestamp, now) {
                return Err(RegistryError::RecoveryCooldown { ein });
            }
        }

        // The tie-break. A fresh recovery-address swap is itself suspect, so
        // the entitlement stays with the displaced address until the swap
        // has aged past the window.
        let entitled = match &record.recovery_address_change {
            Some(change) if self.within_recovery_window(change.timestamp, now) => {
                change.old_recovery_address
            }
            _ => record.recovery_address,
        };
        if caller != entitled {
            return Err(RegistryError::NotEntitledToRecover { caller, ein });
        }

        self.check_freshness(authorization.timestamp, now)?;
        let message = messages::trigger_recovery_message(
            &self.config.registry_address,
            ein,
            &new_associated,
            authorization.timestamp,
        );
        self.require_signed(&new_associated, &message, &authorization.attestation)?;

        // All checks passed; evict and re-seed.
        let evicted = record.associated_addresses.to_vec();
        for address in &evicted {
            self.address_index.remove(address);
        }
        let record = self.record_mut(ein)?;
        record.recovered_change = Some(RecoveredChange {
            timestamp: now,
            evicted_hash: evicted_set_hash(&evicted),
            pill_spent: false,
        });
        record.associated_addresses.clear();
        record.providers.clear();
        record.recovery_address = caller;
        record.associated_addresses.insert(new_associated);
        self.address_index.insert(new_associated, ein);

        info!(%ein, by = %caller, evicted = evicted.len(), "recovery triggered");
        self.emit(
            now,
            Event::RecoveryTriggered {
                ein,
                triggered_by: caller,
                new_associated_address: new_associated,
                old_associated_addresses: evicted,
            },
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::RegistryConfig;
    use crate::crypto::attestation::SignedAttestation;
    use crate::crypto::keys::TesseraKeypair;
    use crate::registry::error::ErrorKind;

    const T0: u64 = 1_700_000_000;

    struct Actor {
        keypair: TesseraKeypair,
        address: Address,
    }

    impl Actor {
        fn new(seed: u8) -> Self {
            let keypair = TesseraKeypair::from_seed(&[seed; 32]);
            let address = Address::from_public_key(&keypair.public_key());
            Self { keypair, address }
        }
    }

    fn addr(n: u8) -> Address {
        Address::from_bytes([n; 32])
    }

    /// Registry with one identity: recovery = `r0`, associated = `a0`,
    /// provider = 0x50.
    fn setup(
        r0: &Actor,
        a0: &Actor,
    ) -> (IdentityRegistry<ManualClock>, ManualClock, Ein) {
        let clock = ManualClock::at(T0);
        let config = RegistryConfig::new(Address::from_bytes([0xAA; 32]));
        let mut reg = IdentityRegistry::with_clock(config, clock.clone());
        let ein = reg
            .mint_identity(a0.address, r0.address, addr(0x50), &[])
            .unwrap();
        (reg, clock, ein)
    }

    /// Consent of `incoming` to be installed via recovery, at `ts`.
    fn recovery_consent(
        reg: &IdentityRegistry<ManualClock>,
        ein: Ein,
        incoming: &Actor,
        ts: u64,
    ) -> Authorization {
        let msg =
            messages::trigger_recovery_message(&reg.registry_address(), ein, &incoming.address, ts);
        Authorization {
            attestation: SignedAttestation::over_digest(&incoming.keypair, &messages::digest(&msg)),
            timestamp: ts,
        }
    }

    #[test]
    fn change_is_provider_only() {
        let (r0, a0) = (Actor::new(1), Actor::new(2));
        let (mut reg, _, ein) = setup(&r0, &a0);
        let err = reg
            .initiate_recovery_address_change(a0.address, ein, addr(0xE1))
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotProvider { .. }));
    }

    #[test]
    fn change_swaps_and_logs_the_old_address() {
        let (r0, a0) = (Actor::new(1), Actor::new(2));
        let (mut reg, _, ein) = setup(&r0, &a0);
        reg.initiate_recovery_address_change(addr(0x50), ein, addr(0xE1))
            .unwrap();
        let details = reg.get_details(ein).unwrap();
        assert_eq!(details.recovery_address, addr(0xE1));
        let change = reg.record(ein).unwrap().recovery_address_change.unwrap();
        assert_eq!(change.old_recovery_address, r0.address);
        assert_eq!(change.timestamp, T0);
    }

    #[test]
    fn second_change_inside_timeout_fails_then_succeeds_after() {
        let (r0, a0) = (Actor::new(1), Actor::new(2));
        let (mut reg, clock, ein) = setup(&r0, &a0);
        reg.initiate_recovery_address_change(addr(0x50), ein, addr(0xE1))
            .unwrap();

        clock.advance(reg.recovery_timeout() - 1);
        let err = reg
            .initiate_recovery_address_change(addr(0x50), ein, addr(0xE2))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timing);
        assert!(matches!(err, RegistryError::ChangeCooldown { .. }));

        clock.advance(1);
        reg.initiate_recovery_address_change(addr(0x50), ein, addr(0xE2))
            .unwrap();
        assert_eq!(reg.get_details(ein).unwrap().recovery_address, addr(0xE2));
    }

    #[test]
    fn trigger_by_current_recovery_address_when_no_change_pending() {
        let (r0, a0) = (Actor::new(1), Actor::new(2));
        let incoming = Actor::new(3);
        let (mut reg, _, ein) = setup(&r0, &a0);

        let auth = recovery_consent(&reg, ein, &incoming, T0);
        reg.trigger_recovery(r0.address, ein, incoming.address, &auth)
            .unwrap();

        let details = reg.get_details(ein).unwrap();
        assert_eq!(details.recovery_address, r0.address);
        assert_eq!(details.associated_addresses, vec![incoming.address]);
        assert!(details.providers.is_empty());
        assert!(!reg.has_identity(&a0.address));
        assert_eq!(reg.get_ein(&incoming.address).unwrap(), ein);
    }

    #[test]
    fn grace_window_entitles_displaced_address_only() {
        let (r0, a0) = (Actor::new(1), Actor::new(2));
        let incoming = Actor::new(3);
        let (mut reg, _, ein) = setup(&r0, &a0);
        reg.initiate_recovery_address_change(addr(0x50), ein, addr(0xE1))
            .unwrap();

        // The newly installed recovery address is not yet trusted.
        let auth = recovery_consent(&reg, ein, &incoming, T0);
        let err = reg
            .trigger_recovery(addr(0xE1), ein, incoming.address, &auth)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(matches!(err, RegistryError::NotEntitledToRecover { .. }));

        // The displaced one is.
        reg.trigger_recovery(r0.address, ein, incoming.address, &auth)
            .unwrap();
        assert_eq!(reg.get_details(ein).unwrap().recovery_address, r0.address);
    }

    #[test]
    fn after_grace_window_entitlement_passes_to_current_address() {
        let (r0, a0) = (Actor::new(1), Actor::new(2));
        let e1 = Actor::new(4);
        let incoming = Actor::new(3);
        let (mut reg, clock, ein) = setup(&r0, &a0);
        reg.initiate_recovery_address_change(addr(0x50), ein, e1.address)
            .unwrap();
        clock.advance(reg.recovery_timeout());
        let now = T0 + reg.recovery_timeout();

        // The displaced address lost its entitlement with the window.
        let auth = recovery_consent(&reg, ein, &incoming, now);
        let err = reg
            .trigger_recovery(r0.address, ein, incoming.address, &auth)
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotEntitledToRecover { .. }));

        reg.trigger_recovery(e1.address, ein, incoming.address, &auth)
            .unwrap();
        assert_eq!(reg.get_details(ein).unwrap().recovery_address, e1.address);
    }

    #[test]
    fn trigger_rejects_target_with_identity() {
        let (r0, a0) = (Actor::new(1), Actor::new(2));
        let (mut reg, _, ein) = setup(&r0, &a0);
        let other = Actor::new(5);
        reg.mint_identity(other.address, addr(0xEE), addr(0x50), &[])
            .unwrap();

        let auth = recovery_consent(&reg, ein, &other, T0);
        let err = reg
            .trigger_recovery(r0.address, ein, other.address, &auth)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn trigger_cooldown_blocks_back_to_back_recoveries() {
        let (r0, a0) = (Actor::new(1), Actor::new(2));
        let first = Actor::new(3);
        let second = Actor::new(4);
        let (mut reg, clock, ein) = setup(&r0, &a0);

        let auth = recovery_consent(&reg, ein, &first, T0);
        reg.trigger_recovery(r0.address, ein, first.address, &auth)
            .unwrap();

        clock.advance(reg.recovery_timeout() - 1);
        let now = T0 + reg.recovery_timeout() - 1;
        let auth = recovery_consent(&reg, ein, &second, now);
        let err = reg
            .trigger_recovery(r0.address, ein, second.address, &auth)
            .unwrap_err();
        assert!(matches!(err, RegistryError::RecoveryCooldown { .. }));

        clock.advance(1);
        let now = now + 1;
        let auth = recovery_consent(&reg, ein, &second, now);
        reg.trigger_recovery(r0.address, ein, second.address, &auth)
            .unwrap();
    }

    #[test]
    fn trigger_requires_valid_consent_signature() {
        let (r0, a0) = (Actor::new(1), Actor::new(2));
        let incoming = Actor::new(3);
        let mallory = Actor::new(6);
        let (mut reg, _, ein) = setup(&r0, &a0);

        // Signed by the wrong key for the incoming address.
        let msg = messages::trigger_recovery_message(
            &reg.registry_address(),
            ein,
            &incoming.address,
            T0,
        );
        let forged = Authorization {
            attestation: SignedAttestation::over_digest(&mallory.keypair, &messages::digest(&msg)),
            timestamp: T0,
        };
        let err = reg
            .trigger_recovery(r0.address, ein, incoming.address, &forged)
            .unwrap_err();
        assert!(matches!(err, RegistryError::BadSignature { .. }));
    }

    #[test]
    fn trigger_requires_fresh_consent() {
        let (r0, a0) = (Actor::new(1), Actor::new(2));
        let incoming = Actor::new(3);
        let (mut reg, clock, ein) = setup(&r0, &a0);

        let auth = recovery_consent(&reg, ein, &incoming, T0);
        clock.advance(reg.signature_timeout());
        let err = reg
            .trigger_recovery(r0.address, ein, incoming.address, &auth)
            .unwrap_err();
        assert!(matches!(err, RegistryError::StaleSignature { .. }));
    }

    #[test]
    fn trigger_leaves_resolvers_untouched_and_logs_eviction() {
        let (r0, a0) = (Actor::new(1), Actor::new(2));
        let incoming = Actor::new(3);
        let (mut reg, _, ein) = setup(&r0, &a0);
        reg.add_resolvers(addr(0x50), ein, &[addr(0x70)]).unwrap();

        let auth = recovery_consent(&reg, ein, &incoming, T0);
        reg.trigger_recovery(r0.address, ein, incoming.address, &auth)
            .unwrap();

        assert!(reg.is_resolver_for(ein, &addr(0x70)));
        let recovered = reg.record(ein).unwrap().recovered_change.unwrap();
        assert_eq!(recovered.timestamp, T0);
        assert_eq!(recovered.evicted_hash, evicted_set_hash(&[a0.address]));
        assert!(!recovered.pill_spent);

        // The event exposes the exact ordered pre-recovery list.
        let last = reg.events().last().unwrap();
        match &last.event {
            Event::RecoveryTriggered {
                old_associated_addresses,
                ..
            } => assert_eq!(old_associated_addresses, &vec![a0.address]),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn evicted_set_hash_is_order_sensitive() {
        let a = addr(1);
        let b = addr(2);
        assert_ne!(evicted_set_hash(&[a, b]), evicted_set_hash(&[b, a]));
        // An empty eviction commits to the empty-input digest.
        assert_eq!(evicted_set_hash(&[]), crate::crypto::hash::blake3_hash(b""));
    }
}
