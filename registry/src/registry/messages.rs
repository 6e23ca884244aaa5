//! # Signed-Message Formats
//!
//! The exact bytes a signer commits to for each delegated operation. These
//! are wire contract: a signer that assembles the concatenation differently
//! produces a digest the registry will never accept, so every format here
//! must be reproduced byte-for-byte by client tooling.
//!
//! Common shape: the fixed purpose string, then the registry's own 32-byte
//! address (scoping the authorization to one deployment), then the
//! operation-specific fields, then the signer's chosen timestamp. Integers
//! (EIN, timestamp) are big-endian u64; addresses are their raw 32 bytes;
//! resolver lists are concatenated in argument order.
//!
//! Signatures cover the BLAKE3 digest of the message (raw or prefixed, see
//! [`crate::crypto::attestation`]).

use crate::crypto::hash::blake3_hash;
use crate::identity::{Address, Ein};

// ---------------------------------------------------------------------------
// Purpose strings
// ---------------------------------------------------------------------------

/// Purpose for a provider-submitted mint, signed by the associated address.
pub const MINT_DELEGATED_PURPOSE: &str = "I authorize the creation of an Identity on my behalf.";

/// Purpose for the approval half of a dual-signature address addition,
/// signed by an already-associated address.
pub const ADD_ADDRESS_APPROVAL_PURPOSE: &str =
    "I authorize adding this address to my Identity.";

/// Purpose for the consent half of a dual-signature address addition,
/// signed by the address being added.
pub const ADD_ADDRESS_CONSENT_PURPOSE: &str = "I authorize being added to this Identity.";

/// Purpose for an address removal, signed by the address being removed.
pub const REMOVE_ADDRESS_PURPOSE: &str = "I authorize removing this address from my Identity.";

/// Purpose for a recovery trigger, signed by the incoming associated address.
pub const TRIGGER_RECOVERY_PURPOSE: &str =
    "I authorize being added to this Identity via recovery.";

// ---------------------------------------------------------------------------
// Message builders
// ---------------------------------------------------------------------------

fn message(purpose: &str, registry: &Address, fields: &[&[u8]], timestamp: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(purpose.len() + 32 + fields.len() * 32 + 8);
    out.extend_from_slice(purpose.as_bytes());
    out.extend_from_slice(registry.as_bytes());
    for field in fields {
        out.extend_from_slice(field);
    }
    out.extend_from_slice(&timestamp.to_be_bytes());
    out
}

/// Message authorizing a provider to mint an identity for `associated`.
///
/// Binds every field of the mint: recovery address, the associated address
/// itself, the submitting provider, and the resolver list in order.
pub fn mint_delegated_message(
    registry: &Address,
    recovery_address: &Address,
    associated: &Address,
    provider: &Address,
    resolvers: &[Address],
    timestamp: u64,
) -> Vec<u8> {
    let mut fields: Vec<&[u8]> = vec![
        recovery_address.as_bytes(),
        associated.as_bytes(),
        provider.as_bytes(),
    ];
    for resolver in resolvers {
        fields.push(resolver.as_bytes());
    }
    message(MINT_DELEGATED_PURPOSE, registry, &fields, timestamp)
}

/// Message by which an associated address approves adding `address_to_add`.
pub fn add_address_approval_message(
    registry: &Address,
    ein: Ein,
    address_to_add: &Address,
    timestamp: u64,
) -> Vec<u8> {
    message(
        ADD_ADDRESS_APPROVAL_PURPOSE,
        registry,
        &[&ein.0.to_be_bytes(), address_to_add.as_bytes()],
        timestamp,
    )
}

/// Message by which `address_to_add` consents to joining the identity.
pub fn add_address_consent_message(
    registry: &Address,
    ein: Ein,
    address_to_add: &Address,
    timestamp: u64,
) -> Vec<u8> {
    message(
        ADD_ADDRESS_CONSENT_PURPOSE,
        registry,
        &[&ein.0.to_be_bytes(), address_to_add.as_bytes()],
        timestamp,
    )
}

/// Message by which an address consents to its own removal.
pub fn remove_address_message(
    registry: &Address,
    ein: Ein,
    address_to_remove: &Address,
    timestamp: u64,
) -> Vec<u8> {
    message(
        REMOVE_ADDRESS_PURPOSE,
        registry,
        &[&ein.0.to_be_bytes(), address_to_remove.as_bytes()],
        timestamp,
    )
}

/// Message by which the incoming address consents to being installed by a
/// recovery trigger.
pub fn trigger_recovery_message(
    registry: &Address,
    ein: Ein,
    new_associated: &Address,
    timestamp: u64,
) -> Vec<u8> {
    message(
        TRIGGER_RECOVERY_PURPOSE,
        registry,
        &[&ein.0.to_be_bytes(), new_associated.as_bytes()],
        timestamp,
    )
}

/// The digest a signer actually signs: BLAKE3 of the message bytes.
pub fn digest(message: &[u8]) -> [u8; 32] {
    blake3_hash(message)
}
