//! # Cryptographic Primitives
//!
//! The registry's crypto surface is deliberately small:
//!
//! 1. **Keys** — Ed25519 keypairs via `ed25519-dalek` (RFC 8032). Signers
//!    hold them; the registry only ever verifies.
//! 2. **Hashing** — BLAKE3 for message digests, address derivation, and the
//!    evicted-set commitment. One hash function for everything.
//! 3. **Attestations** — the (public key, signature) bundle that authorizes
//!    a mutation, accepted over a raw or platform-prefixed digest.

pub mod attestation;
pub mod hash;
pub mod keys;

pub use attestation::{is_signed, prefixed_digest, SignedAttestation, SIGNED_DIGEST_PREFIX};
pub use hash::{blake3_hash, blake3_hash_multi};
pub use keys::{KeyError, TesseraKeypair, TesseraPublicKey, TesseraSignature};
