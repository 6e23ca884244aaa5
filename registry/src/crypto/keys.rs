//! # Key Management
//!
//! Ed25519 keypair generation and serialization for Tessera addresses.
//!
//! Every address in the registry traces back to one of these keypairs, and
//! every authorization the registry accepts is an Ed25519 signature checked
//! against one. We use `ed25519-dalek` (RFC 8032) with strict verification.
//!
//! Security notes:
//!
//! - Private keys are zeroized on drop (thanks, ed25519-dalek).
//! - Key generation uses the OS CSPRNG. If your OS RNG is broken, you have
//!   bigger problems than an identity registry.
//! - Key bytes are never logged. If you add logging to this module, you
//!   will be asked to leave.

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors that can occur during key operations.
///
/// Intentionally vague about *why* something failed. Leaking details about
/// key material through error messages is a classic footgun.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,
}

/// A Tessera signing keypair.
///
/// Holders of registry addresses use one of these to produce the signed
/// attestations that authorize mutations. The registry itself never holds a
/// keypair; it only verifies.
///
/// ## Serialization
///
/// `TesseraKeypair` intentionally does NOT implement `Serialize` or
/// `Deserialize`. Serializing a private key should be a deliberate act, not
/// something that happens because a keypair ended up inside a JSON response.
/// Use [`secret_key_bytes`](Self::secret_key_bytes) explicitly.
pub struct TesseraKeypair {
    signing_key: SigningKey,
}

/// The public half of a keypair, safe to share.
///
/// This is what the registry hashes into an [`Address`](crate::identity::Address)
/// and what travels inside a [`SignedAttestation`](crate::crypto::SignedAttestation).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TesseraPublicKey {
    bytes: [u8; 32],
}

/// An Ed25519 signature over a message. 64 bytes, deterministic for a given
/// (key, message) pair.
///
/// Stored as `Vec<u8>` for serde compatibility. If someone hands the
/// registry a signature that is not 64 bytes, verification simply returns
/// `false`; no panics, no partial acceptance.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TesseraSignature {
    bytes: Vec<u8>,
}

impl TesseraKeypair {
    /// Generate a fresh keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Construct a keypair deterministically from a 32-byte seed.
    ///
    /// In Ed25519 the 32-byte secret key *is* the seed. A weak seed makes a
    /// weak key; use a CSPRNG or a KDF to produce the bytes.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Reconstruct a keypair from a hex-encoded secret key.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str).map_err(|_| KeyError::InvalidSecretKey)?;
        if bytes.len() != SECRET_KEY_LENGTH {
            return Err(KeyError::InvalidSecretKey);
        }
        let mut arr = [0u8; SECRET_KEY_LENGTH];
        arr.copy_from_slice(&bytes);
        Ok(Self::from_seed(&arr))
    }

    /// The public key associated with this keypair.
    pub fn public_key(&self) -> TesseraPublicKey {
        TesseraPublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Raw public key bytes (32 bytes). Safe to share.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a message.
    ///
    /// Ed25519 signatures are deterministic: same (key, message) pair, same
    /// signature. No nonce management, no k-value disasters.
    pub fn sign(&self, message: &[u8]) -> TesseraSignature {
        let sig = self.signing_key.sign(message);
        TesseraSignature {
            bytes: sig.to_bytes().to_vec(),
        }
    }

    /// Verify a signature against this keypair's public key.
    pub fn verify(&self, message: &[u8], signature: &TesseraSignature) -> bool {
        self.public_key().verify(message, signature)
    }

    /// Export the raw 32-byte secret key material.
    ///
    /// **Handle with care.** This is the only secret standing between an
    /// attacker and every identity this key is associated with.
    pub fn secret_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl Clone for TesseraKeypair {
    /// Cloning a keypair is allowed but should make you uncomfortable.
    /// Every copy of a private key is another thing to protect.
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
        }
    }
}

impl fmt::Debug for TesseraKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material in debug output. Not even partially.
        write!(f, "TesseraKeypair(pub={})", self.public_key().to_hex())
    }
}

// ---------------------------------------------------------------------------
// TesseraPublicKey
// ---------------------------------------------------------------------------

impl TesseraPublicKey {
    /// Create a public key from raw bytes.
    ///
    /// No curve validation happens here; invalid points are caught at
    /// verification time, where they fail closed.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Try to create a public key from a byte slice, validating that the
    /// bytes represent a real Ed25519 point. Catches low-order points and
    /// other degenerate cases.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        if slice.len() != 32 {
            return Err(KeyError::InvalidPublicKey);
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Verify a signature against this public key.
    ///
    /// Returns a plain boolean: malformed key bytes, malformed signature
    /// bytes, and honest verification failures all read as `false`. Callers
    /// get a yes/no answer, not an oracle.
    pub fn verify(&self, message: &[u8], signature: &TesseraSignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig_bytes: [u8; 64] = match signature.bytes.as_slice().try_into() {
            Ok(b) => b,
            Err(_) => return false,
        };
        let dalek_sig = DalekSignature::from_bytes(&sig_bytes);
        verifying_key.verify(message, &dalek_sig).is_ok()
    }

    /// Hex-encoded representation, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl Hash for TesseraPublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for TesseraPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for TesseraPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TesseraPublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// TesseraSignature
// ---------------------------------------------------------------------------

impl TesseraSignature {
    /// Create a signature from its raw 64-byte representation.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// The raw signature bytes (64 for any honestly produced signature).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hex-encoded signature, 128 characters when valid.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Parse a hex-encoded signature.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 64 {
            return Err(hex::FromHexError::OddLength);
        }
        Ok(Self { bytes })
    }
}

impl fmt::Debug for TesseraSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        if hex_str.len() >= 128 {
            write!(f, "TesseraSignature({}...{})", &hex_str[..8], &hex_str[120..])
        } else {
            write!(f, "TesseraSignature({})", hex_str)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let kp = TesseraKeypair::generate();
        let msg = b"add this address to my identity";
        let sig = kp.sign(msg);
        assert!(kp.verify(msg, &sig));
    }

    #[test]
    fn wrong_message_fails() {
        let kp = TesseraKeypair::generate();
        let sig = kp.sign(b"correct message");
        assert!(!kp.verify(b"wrong message", &sig));
    }

    #[test]
    fn wrong_key_fails() {
        let kp1 = TesseraKeypair::generate();
        let kp2 = TesseraKeypair::generate();
        let sig = kp1.sign(b"message");
        assert!(!kp2.verify(b"message", &sig));
    }

    #[test]
    fn deterministic_signatures() {
        let kp = TesseraKeypair::generate();
        let sig1 = kp.sign(b"determinism is underrated");
        let sig2 = kp.sign(b"determinism is underrated");
        assert_eq!(sig1.as_bytes(), sig2.as_bytes());
    }

    #[test]
    fn deterministic_from_seed() {
        let seed = [42u8; 32];
        let kp1 = TesseraKeypair::from_seed(&seed);
        let kp2 = TesseraKeypair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
    }

    #[test]
    fn hex_roundtrip() {
        let kp = TesseraKeypair::generate();
        let hex_str = hex::encode(kp.secret_key_bytes());
        let restored = TesseraKeypair::from_hex(&hex_str).unwrap();
        assert_eq!(kp.public_key_bytes(), restored.public_key_bytes());
    }

    #[test]
    fn invalid_hex_rejected() {
        assert!(TesseraKeypair::from_hex("deadbeef").is_err());
        assert!(TesseraKeypair::from_hex("not-hex-at-all").is_err());
    }

    #[test]
    fn try_from_slice_rejects_wrong_length() {
        assert!(TesseraPublicKey::try_from_slice(&[0u8; 16]).is_err());
    }

    #[test]
    fn verify_with_garbage_key_bytes_is_false() {
        // All-ones is not a valid curve point. Verification must fail closed,
        // not panic.
        let pk = TesseraPublicKey::from_bytes([0xFF; 32]);
        let kp = TesseraKeypair::generate();
        let sig = kp.sign(b"msg");
        assert!(!pk.verify(b"msg", &sig));
    }

    #[test]
    fn verify_with_truncated_signature_is_false() {
        let kp = TesseraKeypair::generate();
        let truncated = TesseraSignature { bytes: vec![1, 2, 3] };
        assert!(!kp.public_key().verify(b"msg", &truncated));
    }

    #[test]
    fn signature_hex_roundtrip() {
        let kp = TesseraKeypair::generate();
        let sig = kp.sign(b"test");
        let recovered = TesseraSignature::from_hex(&sig.to_hex()).unwrap();
        assert_eq!(sig, recovered);
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let kp = TesseraKeypair::generate();
        let debug_str = format!("{:?}", kp);
        assert!(debug_str.starts_with("TesseraKeypair(pub="));
        assert!(!debug_str.contains("signing_key"));
    }
}
