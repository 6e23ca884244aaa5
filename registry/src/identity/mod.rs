//! # Identity Module
//!
//! The data layer of the registry. Layered the same way every other piece of
//! Tessera state is:
//!
//! 1. **Address** — BLAKE3 of an Ed25519 public key, Bech32-encoded with the
//!    `tess` HRP. What users see, share, and paste.
//! 2. **AddressSet** — hash-indexed dynamic array giving the three
//!    per-identity collections O(1) membership and deletion with full
//!    enumeration.
//! 3. **IdentityRecord** — the four fields plus the two recovery logs,
//!    keyed by a sequential [`Ein`] handle.

pub mod address;
pub mod record;
pub mod set;

pub use address::{Address, AddressError};
pub use record::{Ein, IdentityDetails, IdentityRecord, RecoveredChange, RecoveryAddressChange};
pub use set::AddressSet;
