//! # Registry Errors
//!
//! Every failure a registry operation can surface. All of them are terminal
//! for the transaction that hit them: the operation returns before touching
//! state, nothing is retried internally, and the caller decides whether to
//! resubmit after fixing the precondition.
//!
//! Each variant classifies into one of four [`ErrorKind`] classes. The
//! variant carries the specifics; the kind is what policy code (and tests)
//! branch on.

use thiserror::Error;

use crate::identity::{Address, Ein};

/// Coarse classification of registry failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced identity or address mapping is absent.
    NotFound,
    /// The mutation collides with existing state.
    Conflict,
    /// A signature or role check failed.
    Unauthorized,
    /// A timestamp fell outside its window, or a cooldown has not elapsed.
    Timing,
}

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The referenced identity handle does not exist.
    #[error("identity {ein} does not exist")]
    IdentityNotFound {
        /// The handle that was looked up.
        ein: Ein,
    },

    /// The address is not associated with any identity.
    #[error("address {address} has no identity")]
    NoIdentity {
        /// The unassociated address.
        address: Address,
    },

    /// The address already belongs to an identity.
    #[error("address {address} is already associated with identity {ein}")]
    AddressInUse {
        /// The contested address.
        address: Address,
        /// The identity that already holds it.
        ein: Ein,
    },

    /// Adding the address would push the identity past the size cap.
    #[error("identity {ein} already holds the maximum of {cap} associated addresses")]
    AddressCapReached {
        /// The full identity.
        ein: Ein,
        /// The configured maximum.
        cap: usize,
    },

    /// The caller is not a registered provider of the identity.
    #[error("{address} is not a provider for identity {ein}")]
    NotProvider {
        /// The would-be provider.
        address: Address,
        /// The identity it claimed to act for.
        ein: Ein,
    },

    /// The approving address is not associated with the identity.
    #[error("{address} is not associated with identity {ein}")]
    NotAssociated {
        /// The address that failed the membership check.
        address: Address,
        /// The identity in question.
        ein: Ein,
    },

    /// A required signature did not verify for the claimed address.
    #[error("signature verification failed for {address}")]
    BadSignature {
        /// The address the signature claimed to speak for.
        address: Address,
    },

    /// The caller is not the address currently entitled to trigger recovery
    /// under the grace-window tie-break.
    #[error("{caller} is not entitled to trigger recovery for identity {ein}")]
    NotEntitledToRecover {
        /// The rejected caller.
        caller: Address,
        /// The identity it tried to recover.
        ein: Ein,
    },

    /// The reconstructed eviction list does not hash to the logged value.
    #[error("eviction proof mismatch for identity {ein}")]
    EvictionProofMismatch {
        /// The identity the proof was offered for.
        ein: Ein,
    },

    /// A signed message's timestamp is outside its freshness window.
    #[error("signature timestamp {timestamp} is outside the freshness window at {now}")]
    StaleSignature {
        /// The timestamp bound into the signed message.
        timestamp: u64,
        /// Ledger time at evaluation.
        now: u64,
    },

    /// A recovery-address change was attempted while the prior one is still
    /// inside the recovery timeout.
    #[error("recovery address for identity {ein} was already changed within the timeout")]
    ChangeCooldown {
        /// The identity still in cooldown.
        ein: Ein,
    },

    /// A recovery trigger was attempted while the prior one is still inside
    /// the recovery timeout.
    #[error("identity {ein} was already recovered within the timeout")]
    RecoveryCooldown {
        /// The identity still in cooldown.
        ein: Ein,
    },

    /// The poison pill was attempted with no recovery inside the window.
    #[error("no recovery within the poison window for identity {ein}")]
    RecoveryWindowClosed {
        /// The identity whose window is closed (or never opened).
        ein: Ein,
    },
}

impl RegistryError {
    /// The taxonomy class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IdentityNotFound { .. } | Self::NoIdentity { .. } => ErrorKind::NotFound,
            Self::AddressInUse { .. } | Self::AddressCapReached { .. } => ErrorKind::Conflict,
            Self::NotProvider { .. }
            | Self::NotAssociated { .. }
            | Self::BadSignature { .. }
            | Self::NotEntitledToRecover { .. }
            | Self::EvictionProofMismatch { .. } => ErrorKind::Unauthorized,
            Self::StaleSignature { .. }
            | Self::ChangeCooldown { .. }
            | Self::RecoveryCooldown { .. }
            | Self::RecoveryWindowClosed { .. } => ErrorKind::Timing,
        }
    }
}
