//! # The Identity Registry
//!
//! The registry owns all state: the identity records, the reverse index
//! from address to handle, and the append-only notification log. Every
//! mutating operation is one self-contained transaction: resolve the acting
//! identity, verify the required signatures against fresh timestamp-bound
//! digests, check invariants and windows, mutate, emit one record.
//!
//! Mutations take `&mut self`. The host ledger serializes transactions
//! globally, and the exclusive borrow is the in-process image of that
//! guarantee: no two operations ever observe each other half-done.
//!
//! ## Check-then-mutate
//!
//! Every operation performs all of its precondition checks, signature
//! verification included, before the first field write. A failed check
//! returns early with the registry untouched. There are no partial commits
//! to roll back because there are no partial commits.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::RegistryConfig;
use crate::crypto::attestation::{self, SignedAttestation};
use crate::identity::{Address, Ein, IdentityDetails, IdentityRecord};

use super::error::RegistryError;
use super::event::{Event, EventRecord};
use super::messages;

/// A freshness-windowed signature: the attestation plus the timestamp the
/// signer bound into the message.
///
/// The timestamp travels outside the attestation because the registry must
/// rebuild the signed message (and so the digest) from its parts; the
/// signature only proves the signer agreed to those exact parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    /// Who signed, and the signature.
    pub attestation: SignedAttestation,
    /// The timestamp bound into the signed message.
    pub timestamp: u64,
}

/// How a caller is acting on an identity, resolved before any authorization
/// check so the provider and self-service entry points share one body.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ActingAs {
    /// An associated address acting on its own identity.
    Associated(Address),
    /// A registered provider acting on a named identity.
    Provider {
        /// The provider submitting the call.
        provider: Address,
        /// The identity it acts for.
        ein: Ein,
    },
}

/// The identity registry.
///
/// Generic over the [`Clock`] so tests can cross the two-week recovery
/// window without waiting two weeks. Production code uses the default
/// [`SystemClock`].
pub struct IdentityRegistry<C: Clock = SystemClock> {
    pub(crate) config: RegistryConfig,
    pub(crate) clock: C,
    pub(crate) identities: HashMap<Ein, IdentityRecord>,
    /// address -> EIN, valid iff the address is in that identity's
    /// associated set. Kept in lockstep with the sets: every site that
    /// mutates an associated set updates this map in the same operation.
    pub(crate) address_index: HashMap<Address, Ein>,
    /// The next handle to assign. Starts at 1; zero is never minted.
    pub(crate) next_ein: u64,
    pub(crate) events: Vec<EventRecord>,
}

impl IdentityRegistry<SystemClock> {
    /// A registry on the system clock.
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> IdentityRegistry<C> {
    /// A registry reading time from the given clock.
    pub fn with_clock(config: RegistryConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            identities: HashMap::new(),
            address_index: HashMap::new(),
            next_ein: 1,
            events: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Read-only surface
    // -----------------------------------------------------------------------

    /// Whether the handle names a minted identity.
    pub fn identity_exists(&self, ein: Ein) -> bool {
        self.identities.contains_key(&ein)
    }

    /// Whether the address is currently associated with any identity.
    pub fn has_identity(&self, address: &Address) -> bool {
        self.address_index.contains_key(address)
    }

    /// The identity an address is associated with.
    pub fn get_ein(&self, address: &Address) -> Result<Ein, RegistryError> {
        self.address_index
            .get(address)
            .copied()
            .ok_or(RegistryError::NoIdentity { address: *address })
    }

    /// Whether `address` is in the identity's associated set.
    pub fn is_address_for(&self, ein: Ein, address: &Address) -> bool {
        self.identities
            .get(&ein)
            .is_some_and(|r| r.associated_addresses.contains(address))
    }

    /// Whether `address` is a provider for the identity.
    pub fn is_provider_for(&self, ein: Ein, address: &Address) -> bool {
        self.identities
            .get(&ein)
            .is_some_and(|r| r.providers.contains(address))
    }

    /// Whether `address` is a resolver for the identity.
    pub fn is_resolver_for(&self, ein: Ein, address: &Address) -> bool {
        self.identities
            .get(&ein)
            .is_some_and(|r| r.resolvers.contains(address))
    }

    /// Snapshot of the identity's four fields.
    pub fn get_details(&self, ein: Ein) -> Result<IdentityDetails, RegistryError> {
        let record = self.record(ein)?;
        Ok(IdentityDetails {
            ein,
            recovery_address: record.recovery_address,
            associated_addresses: record.associated_addresses.to_vec(),
            providers: record.providers.to_vec(),
            resolvers: record.resolvers.to_vec(),
        })
    }

    /// Pure signature check, exposed for external collaborators that accept
    /// the same attestation format. See [`crate::crypto::is_signed`].
    pub fn is_signed(
        &self,
        address: &Address,
        digest: &[u8; 32],
        attestation: &SignedAttestation,
    ) -> bool {
        attestation::is_signed(address, digest, attestation)
    }

    /// The append-only notification log, oldest first.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// The address identifying this registry in signed messages.
    pub fn registry_address(&self) -> Address {
        self.config.registry_address
    }

    /// Cap on associated addresses per identity.
    pub fn max_associated_addresses(&self) -> usize {
        self.config.max_associated_addresses
    }

    /// Recovery cooldown and post-recovery window width, in seconds.
    pub fn recovery_timeout(&self) -> u64 {
        self.config.recovery_timeout_secs
    }

    /// Signature freshness window, in seconds.
    pub fn signature_timeout(&self) -> u64 {
        self.config.signature_timeout_secs
    }

    // -----------------------------------------------------------------------
    // Minting
    // -----------------------------------------------------------------------

    /// Mint an identity where the caller is the first associated address.
    pub fn mint_identity(
        &mut self,
        caller: Address,
        recovery_address: Address,
        provider: Address,
        resolvers: &[Address],
    ) -> Result<Ein, RegistryError> {
        self.mint(recovery_address, caller, provider, resolvers, None)
    }

    /// Mint an identity on behalf of `associated`, submitted by the provider
    /// it names and authorized by the address's own signature over the
    /// delegated-mint message.
    pub fn mint_identity_delegated(
        &mut self,
        provider: Address,
        recovery_address: Address,
        associated: Address,
        resolvers: &[Address],
        authorization: &Authorization,
    ) -> Result<Ein, RegistryError> {
        self.mint(
            recovery_address,
            associated,
            provider,
            resolvers,
            Some(authorization),
        )
    }

    fn mint(
        &mut self,
        recovery_address: Address,
        associated: Address,
        provider: Address,
        resolvers: &[Address],
        authorization: Option<&Authorization>,
    ) -> Result<Ein, RegistryError> {
        let now = self.clock.now();

        if let Some(&ein) = self.address_index.get(&associated) {
            return Err(RegistryError::AddressInUse {
                address: associated,
                ein,
            });
        }

        let delegated = authorization.is_some();
        if let Some(authorization) = authorization {
            self.check_freshness(authorization.timestamp, now)?;
            let message = messages::mint_delegated_message(
                &self.config.registry_address,
                &recovery_address,
                &associated,
                &provider,
                resolvers,
                authorization.timestamp,
            );
            self.require_signed(&associated, &message, &authorization.attestation)?;
        }

        let ein = Ein(self.next_ein);
        self.next_ein += 1;

        let mut record = IdentityRecord::new(recovery_address);
        record.associated_addresses.insert(associated);
        record.providers.insert(provider);
        for resolver in resolvers {
            record.resolvers.insert(*resolver);
        }
        self.identities.insert(ein, record);
        self.address_index.insert(associated, ein);

        info!(%ein, address = %associated, delegated, "minted identity");
        self.emit(
            now,
            Event::IdentityMinted {
                ein,
                recovery_address,
                associated_address: associated,
                provider,
                resolvers: resolvers.to_vec(),
                delegated,
            },
        );
        Ok(ein)
    }

    // -----------------------------------------------------------------------
    // Address add / remove
    // -----------------------------------------------------------------------

    /// Add an address to an identity's associated set.
    ///
    /// Only a registered provider of the identity may submit this call, and
    /// it needs two independent fresh signatures: `approval` from
    /// `approved_by` (already associated) and `consent` from the address
    /// being added. One valid signature out of two is worth exactly nothing.
    pub fn add_address(
        &mut self,
        caller: Address,
        ein: Ein,
        address_to_add: Address,
        approved_by: Address,
        approval: &Authorization,
        consent: &Authorization,
    ) -> Result<(), RegistryError> {
        let now = self.clock.now();

        let record = self.record(ein)?;
        if !record.providers.contains(&caller) {
            return Err(RegistryError::NotProvider {
                address: caller,
                ein,
            });
        }
        if !record.associated_addresses.contains(&approved_by) {
            return Err(RegistryError::NotAssociated {
                address: approved_by,
                ein,
            });
        }
        if let Some(&holder) = self.address_index.get(&address_to_add) {
            return Err(RegistryError::AddressInUse {
                address: address_to_add,
                ein: holder,
            });
        }
        if record.associated_addresses.len() >= self.config.max_associated_addresses {
            return Err(RegistryError::AddressCapReached {
                ein,
                cap: self.config.max_associated_addresses,
            });
        }

        self.check_freshness(approval.timestamp, now)?;
        self.check_freshness(consent.timestamp, now)?;

        let approval_message = messages::add_address_approval_message(
            &self.config.registry_address,
            ein,
            &address_to_add,
            approval.timestamp,
        );
        self.require_signed(&approved_by, &approval_message, &approval.attestation)?;

        let consent_message = messages::add_address_consent_message(
            &self.config.registry_address,
            ein,
            &address_to_add,
            consent.timestamp,
        );
        self.require_signed(&address_to_add, &consent_message, &consent.attestation)?;

        self.record_mut(ein)?.associated_addresses.insert(address_to_add);
        self.address_index.insert(address_to_add, ein);

        debug!(%ein, address = %address_to_add, "added associated address");
        self.emit(
            now,
            Event::AddressAdded {
                ein,
                address: address_to_add,
                approved_by,
                provider: caller,
            },
        );
        Ok(())
    }

    /// Remove an address from an identity's associated set.
    ///
    /// Callable by anyone relaying a fresh signature from the address being
    /// removed; the signer's consent is the sole authorization.
    pub fn remove_address(
        &mut self,
        ein: Ein,
        address_to_remove: Address,
        consent: &Authorization,
    ) -> Result<(), RegistryError> {
        let now = self.clock.now();

        let record = self.record(ein)?;
        if !record.associated_addresses.contains(&address_to_remove) {
            return Err(RegistryError::NotAssociated {
                address: address_to_remove,
                ein,
            });
        }

        self.check_freshness(consent.timestamp, now)?;
        let message = messages::remove_address_message(
            &self.config.registry_address,
            ein,
            &address_to_remove,
            consent.timestamp,
        );
        self.require_signed(&address_to_remove, &message, &consent.attestation)?;

        self.record_mut(ein)?.associated_addresses.remove(&address_to_remove);
        self.address_index.remove(&address_to_remove);

        debug!(%ein, address = %address_to_remove, "removed associated address");
        self.emit(
            now,
            Event::AddressRemoved {
                ein,
                address: address_to_remove,
            },
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Providers
    // -----------------------------------------------------------------------

    /// Grant providers for the caller's own identity.
    pub fn add_providers(
        &mut self,
        caller: Address,
        providers: &[Address],
    ) -> Result<(), RegistryError> {
        self.apply_providers(ActingAs::Associated(caller), providers, true)
    }

    /// Grant providers for an identity, submitted by an existing provider.
    pub fn add_providers_for(
        &mut self,
        provider: Address,
        ein: Ein,
        providers: &[Address],
    ) -> Result<(), RegistryError> {
        self.apply_providers(ActingAs::Provider { provider, ein }, providers, true)
    }

    /// Revoke providers for the caller's own identity.
    pub fn remove_providers(
        &mut self,
        caller: Address,
        providers: &[Address],
    ) -> Result<(), RegistryError> {
        self.apply_providers(ActingAs::Associated(caller), providers, false)
    }

    /// Revoke providers for an identity, submitted by an existing provider.
    pub fn remove_providers_for(
        &mut self,
        provider: Address,
        ein: Ein,
        providers: &[Address],
    ) -> Result<(), RegistryError> {
        self.apply_providers(ActingAs::Provider { provider, ein }, providers, false)
    }

    fn apply_providers(
        &mut self,
        acting: ActingAs,
        providers: &[Address],
        add: bool,
    ) -> Result<(), RegistryError> {
        let now = self.clock.now();
        let (ein, delegated) = self.resolve_acting(acting)?;

        let record = self.record_mut(ein)?;
        for provider in providers {
            if add {
                record.providers.insert(*provider);
            } else {
                record.providers.remove(provider);
            }
        }

        debug!(%ein, count = providers.len(), add, delegated, "changed providers");
        let event = if add {
            Event::ProvidersAdded {
                ein,
                providers: providers.to_vec(),
                delegated,
            }
        } else {
            Event::ProvidersRemoved {
                ein,
                providers: providers.to_vec(),
                delegated,
            }
        };
        self.emit(now, event);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Resolvers
    // -----------------------------------------------------------------------

    /// Attach resolvers to an identity. Provider-only; providers are already
    /// a trusted delegation tier, so no further signature is required.
    pub fn add_resolvers(
        &mut self,
        provider: Address,
        ein: Ein,
        resolvers: &[Address],
    ) -> Result<(), RegistryError> {
        self.apply_resolvers(provider, ein, resolvers, true)
    }

    /// Detach resolvers from an identity. Provider-only.
    pub fn remove_resolvers(
        &mut self,
        provider: Address,
        ein: Ein,
        resolvers: &[Address],
    ) -> Result<(), RegistryError> {
        self.apply_resolvers(provider, ein, resolvers, false)
    }

    fn apply_resolvers(
        &mut self,
        provider: Address,
        ein: Ein,
        resolvers: &[Address],
        add: bool,
    ) -> Result<(), RegistryError> {
        let now = self.clock.now();

        let record = self.record(ein)?;
        if !record.providers.contains(&provider) {
            return Err(RegistryError::NotProvider {
                address: provider,
                ein,
            });
        }

        let record = self.record_mut(ein)?;
        for resolver in resolvers {
            if add {
                record.resolvers.insert(*resolver);
            } else {
                record.resolvers.remove(resolver);
            }
        }

        debug!(%ein, count = resolvers.len(), add, "changed resolvers");
        let event = if add {
            Event::ResolversAdded {
                ein,
                resolvers: resolvers.to_vec(),
            }
        } else {
            Event::ResolversRemoved {
                ein,
                resolvers: resolvers.to_vec(),
            }
        };
        self.emit(now, event);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Shared internals
    // -----------------------------------------------------------------------

    pub(crate) fn record(&self, ein: Ein) -> Result<&IdentityRecord, RegistryError> {
        self.identities
            .get(&ein)
            .ok_or(RegistryError::IdentityNotFound { ein })
    }

    pub(crate) fn record_mut(&mut self, ein: Ein) -> Result<&mut IdentityRecord, RegistryError> {
        self.identities
            .get_mut(&ein)
            .ok_or(RegistryError::IdentityNotFound { ein })
    }

    /// Enforce `timestamp <= now < timestamp + signature_timeout`.
    pub(crate) fn check_freshness(&self, timestamp: u64, now: u64) -> Result<(), RegistryError> {
        let fresh = timestamp <= now && now - timestamp < self.config.signature_timeout_secs;
        if fresh {
            Ok(())
        } else {
            Err(RegistryError::StaleSignature { timestamp, now })
        }
    }

    /// Verify `attestation` over the BLAKE3 digest of `message` for
    /// `address`, or fail the transaction.
    pub(crate) fn require_signed(
        &self,
        address: &Address,
        message: &[u8],
        attestation: &SignedAttestation,
    ) -> Result<(), RegistryError> {
        let digest = messages::digest(message);
        if attestation::is_signed(address, &digest, attestation) {
            Ok(())
        } else {
            Err(RegistryError::BadSignature { address: *address })
        }
    }

    fn resolve_acting(&self, acting: ActingAs) -> Result<(Ein, bool), RegistryError> {
        match acting {
            ActingAs::Associated(address) => Ok((self.get_ein(&address)?, false)),
            ActingAs::Provider { provider, ein } => {
                let record = self.record(ein)?;
                if !record.providers.contains(&provider) {
                    return Err(RegistryError::NotProvider {
                        address: provider,
                        ein,
                    });
                }
                Ok((ein, true))
            }
        }
    }

    pub(crate) fn emit(&mut self, now: u64, event: Event) {
        self.events.push(EventRecord::new(now, event));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
