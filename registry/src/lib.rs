// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Tessera Registry — Core Library
//!
//! A shared-ledger identity registry: one logical identity (an `EIN` handle)
//! bound to a recovery address, a set of associated addresses, a set of
//! authorized providers, and a set of resolvers. Every mutation is
//! authorized by cryptographic signatures over timestamp-bound messages,
//! never by session state.
//!
//! The interesting machinery is the recovery design. Linking a new address
//! takes two independent signatures (the identity approves, the newcomer
//! consents). Swapping the recovery address starts a two-week grace window
//! during which the *displaced* address, not the new one, holds the power
//! to recover, so a stolen provider key cannot immediately cash out. And if
//! a recovery was itself the attack, the evicted addresses keep a poison
//! pill: a bounded window in which any of them can prove membership in the
//! evicted set and reduce the hijacked identity to an empty shell.
//!
//! ## Architecture
//!
//! - **crypto** — Ed25519 keys, BLAKE3 digests, and the attestation bundle
//!   the registry verifies. Don't roll your own.
//! - **identity** — addresses, the enumerable address set, and the
//!   per-identity record.
//! - **registry** — the state machine itself: store, recovery, poison pill,
//!   message formats, errors, events.
//! - **clock** — injected ledger time, because "now" is consensus state,
//!   not a syscall.
//! - **config** — the three load-bearing constants and per-deployment
//!   parameters.
//!
//! The host ledger provides total ordering of mutations and durable
//! storage; this crate provides the semantics. Operations take `&mut self`
//! and either commit atomically or return an error having touched nothing.

pub mod clock;
pub mod config;
pub mod crypto;
pub mod identity;
pub mod registry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RegistryConfig;
pub use crypto::{SignedAttestation, TesseraKeypair, TesseraPublicKey, TesseraSignature};
pub use identity::{Address, AddressSet, Ein, IdentityDetails, IdentityRecord};
pub use registry::{
    Authorization, ErrorKind, Event, EventRecord, IdentityRegistry, RegistryError,
};
