/*!
Shared protocol types for the secure channel core.
*/

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Handshake role, fixed at session creation. The role determines which
/// stage sequence [`synchronize`](crate::HandshakeStrategy::synchronize)
/// drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum Role {
    /// Starts the exchange by delivering the hello marker to a peer
    Initiator,
    /// Responds to an exchange opened by a peer
    Acceptor,
}

/// Overall synchronization status of a handshake. `Ready` and `Error` are
/// terminal: a strategy that has reached either must be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum SynchronizationStatus {
    /// Further synchronization rounds are expected
    Processing,
    /// The handshake completed and channel operations are available
    Ready,
    /// The handshake failed; the owning layer must tear the session down
    Error,
}

/// Outcome of verifying a signed buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum VerificationStatus {
    /// The trailing signature matches the buffer content
    Success,
    /// The signature is missing, malformed, or does not match
    Failed,
}

/// Result of one synchronization round: the updated status and the buffer to
/// send back to the peer. The buffer is empty exactly when the status is
/// `Error`, or when the acceptor has just reached `Ready` with nothing left
/// to send.
pub type SynchronizationResult = (SynchronizationStatus, Vec<u8>);
