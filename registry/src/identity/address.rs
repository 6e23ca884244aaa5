//! # Tessera Addresses
//!
//! An address is the BLAKE3 hash of an Ed25519 public key, displayed as a
//! Bech32 string with the `tess` human-readable prefix:
//!
//! ```text
//! public_key (32 bytes)
//!     -> BLAKE3(public_key) -> 32 bytes
//!     -> Bech32("tess", hash) -> tess1qw508d6qe...
//! ```
//!
//! Bech32's checksum detects up to 4 character errors, which matters when
//! users paste addresses into recovery forms where a typo is not a bounced
//! payment but a mis-assigned identity.
//!
//! Hashing the key (rather than encoding it raw) keeps the address format
//! stable if the key scheme ever changes, and means an address alone proves
//! nothing: signature checks always require the key itself, carried in the
//! attestation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use bech32::{Bech32, Hrp};

use crate::config::ADDRESS_HRP;
use crate::crypto::keys::TesseraPublicKey;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while parsing an address string.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The Bech32 string could not be decoded.
    #[error("bech32 decode error: {0}")]
    Bech32Decode(String),

    /// The decoded address has an unexpected human-readable prefix.
    #[error("invalid HRP: expected '{expected}', got '{got}'")]
    InvalidHrp {
        /// The expected HRP.
        expected: String,
        /// The HRP that was actually found.
        got: String,
    },

    /// The decoded data has an unexpected length.
    #[error("invalid address data length: expected {expected} bytes, got {got}")]
    InvalidDataLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes.
        got: usize,
    },
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A registry address: 32 bytes of BLAKE3(public key).
///
/// `Copy` on purpose. Addresses flow through every operation signature in
/// this crate, and a 32-byte value type keeps ownership noise out of the
/// authorization logic.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    hash: [u8; 32],
}

impl Address {
    /// Derive the address of a public key.
    pub fn from_public_key(pk: &TesseraPublicKey) -> Self {
        Self {
            hash: *blake3::hash(pk.as_bytes()).as_bytes(),
        }
    }

    /// Construct an address from its raw 32-byte hash.
    pub fn from_bytes(hash: [u8; 32]) -> Self {
        Self { hash }
    }

    /// The raw 32-byte hash underlying this address.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Encode this address as a Bech32 string with the `tess` HRP.
    pub fn to_bech32(&self) -> String {
        let hrp = Hrp::parse(ADDRESS_HRP).expect("static HRP is valid");
        bech32::encode::<Bech32>(hrp, &self.hash)
            .expect("encoding a 32-byte payload should never fail")
    }

    /// Parse a Bech32-encoded address, validating HRP, checksum, and length.
    pub fn from_bech32(addr: &str) -> Result<Self, AddressError> {
        let (hrp, data) =
            bech32::decode(addr).map_err(|e| AddressError::Bech32Decode(e.to_string()))?;

        let expected_hrp = Hrp::parse(ADDRESS_HRP).expect("static HRP is valid");
        if hrp != expected_hrp {
            return Err(AddressError::InvalidHrp {
                expected: ADDRESS_HRP.to_string(),
                got: hrp.to_string(),
            });
        }

        if data.len() != 32 {
            return Err(AddressError::InvalidDataLength {
                expected: 32,
                got: data.len(),
            });
        }

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&data);
        Ok(Self { hash })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_bech32())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_bech32())
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_bech32())
        } else {
            serializer.serialize_bytes(&self.hash)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Address::from_bech32(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            if bytes.len() != 32 {
                return Err(serde::de::Error::custom(format!(
                    "expected 32-byte address hash, got {}",
                    bytes.len()
                )));
            }
            let mut hash = [0u8; 32];
            hash.copy_from_slice(&bytes);
            Ok(Address { hash })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
