//! # Registry Module
//!
//! The authorization and recovery state machine. One [`IdentityRegistry`]
//! value owns all state; its methods are the public operations, each a
//! self-contained transaction over the records, the reverse index, and the
//! notification log.
//!
//! The submodules split the machine along its trust tiers:
//!
//! - **store** — minting, dual-signature address linking, provider and
//!   resolver management, and the read-only surface.
//! - **recovery** — the rate-limited recovery-address swap and the
//!   grace-window-tie-broken recovery trigger.
//! - **poison** — the split-and-hash membership proof that lets evicted
//!   addresses destroy a hijacked identity.
//! - **messages** — the byte-exact formats signers commit to.

pub mod error;
pub mod event;
pub mod messages;
pub mod poison;
pub mod recovery;
pub mod store;

pub use error::{ErrorKind, RegistryError};
pub use event::{Event, EventRecord};
pub use store::{Authorization, IdentityRegistry};
