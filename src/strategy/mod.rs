/*!
Handshake orchestration for the secure channel core.

A [`HandshakeStrategy`] is created per session with a fixed [`Role`] and a
[`ContextMode`], and drives the role's ordered stage sequence through
[`synchronize`](HandshakeStrategy::synchronize):

```text
         Stage        |            Input            |           Output            |
  Initiator:
      Initialization  | PublicKey + PrincipalRandom | PublicKey + PrincipalRandom |
      Decapsulation   | Encapsulation + SyncMessage |         SyncMessage         |
  Acceptor:
      Initialization  |            Hello            | PublicKey + PrincipalRandom |
      Encapsulation   | PublicKey + PrincipalRandom | Encapsulation + SyncMessage |
      Verification    |         SyncMessage         |            Done             |
```

Once the handshake reports [`SynchronizationStatus::Ready`], the channel
operations (`encrypt`/`decrypt`/`sign`/`verify`) become available. A
strategy that has reached `Ready` or `Error` is not reusable; callers must
discard it and create a fresh one on a reset transport session.
*/

mod acceptor;
mod initiator;

use std::sync::Arc;

use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::channel;
use crate::constants::sizes;
use crate::context::{ContextMode, QuantumSafeContext, SharedContext};
use crate::error::{Result, crypto_err};
use crate::store::KeyStore;
use crate::types::{Role, SynchronizationResult, SynchronizationStatus, VerificationStatus};

use acceptor::AcceptorMachine;
use initiator::InitiatorMachine;

/// Number of synchronization stages the initiator drives.
const INITIATOR_STAGES: u32 = 2;

/// Number of synchronization stages the acceptor drives.
const ACCEPTOR_STAGES: u32 = 3;

/// The role-specific state machine selected at construction.
enum RoleMachine {
    Initiator(InitiatorMachine),
    Acceptor(AcceptorMachine),
}

/// Orchestrates one session's handshake and, once complete, its
/// authenticated channel operations.
///
/// Each session owns its strategy exclusively; the only shared resource is
/// the optional `Application`-mode context, which is internally locked.
pub struct HandshakeStrategy {
    role: Role,
    context: SharedContext,
    store: KeyStore,
    machine: RoleMachine,
}

impl HandshakeStrategy {
    /// Create a strategy for `role`. `ContextMode::Unique` generates a
    /// private keypair for this session; `ContextMode::Application` shares
    /// the injected process-wide context.
    pub fn new(role: Role, mode: ContextMode) -> Self {
        let context = match mode {
            ContextMode::Unique => Arc::new(QuantumSafeContext::new()),
            ContextMode::Application(shared) => shared,
        };

        let machine = match role {
            Role::Initiator => RoleMachine::Initiator(InitiatorMachine::new()),
            Role::Acceptor => RoleMachine::Acceptor(AcceptorMachine::new()),
        };

        Self { role, context, store: KeyStore::new(), machine }
    }

    /// The role this strategy drives.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Number of synchronization rounds this role processes.
    pub fn synchronization_stages(&self) -> u32 {
        match self.role {
            Role::Initiator => INITIATOR_STAGES,
            Role::Acceptor => ACCEPTOR_STAGES,
        }
    }

    /// Current synchronization status.
    pub fn synchronization_status(&self) -> SynchronizationStatus {
        match &self.machine {
            RoleMachine::Initiator(machine) => machine.status(),
            RoleMachine::Acceptor(machine) => machine.status(),
        }
    }

    /// Size of this session's public key in bytes.
    pub fn public_key_size(&self) -> usize {
        self.context.public_key_size()
    }

    /// Drive one handshake round with the bytes received from the peer.
    /// Returns the updated status and the buffer to send back; the buffer
    /// is empty on error and when the acceptor completes with nothing left
    /// to send.
    ///
    /// Calling this after the handshake has reached `Ready` or `Error` is
    /// itself an error: the status becomes `Error` and no payload is
    /// returned.
    pub fn synchronize(&mut self, buffer: &[u8]) -> SynchronizationResult {
        match &mut self.machine {
            RoleMachine::Initiator(machine) => {
                machine.synchronize(&self.context, &mut self.store, buffer)
            }
            RoleMachine::Acceptor(machine) => {
                machine.synchronize(&self.context, &mut self.store, buffer)
            }
        }
    }

    /// Encrypt `buffer` with this session's content key using AES-256-CTR.
    /// The 64-bit `nonce` is placed in the low bytes of an all-zero counter
    /// block; callers must use a monotonically increasing per-session
    /// counter starting above [`VERIFICATION_NONCE`](crate::constants::VERIFICATION_NONCE)
    /// and never reuse a value within a session.
    ///
    /// # Panics
    ///
    /// Panics if called before synchronization has completed; that is a
    /// protocol-ordering violation in the caller, not a recoverable
    /// condition.
    pub fn encrypt(&self, buffer: &[u8], nonce: u64) -> Option<Vec<u8>> {
        assert!(
            self.store.has_generated_keys(),
            "cannot encrypt before synchronization is complete"
        );
        channel::encrypt(&self.store, buffer, nonce)
    }

    /// Decrypt `buffer` with the peer's content key. The `nonce` must equal
    /// the value the sender used for this message.
    ///
    /// # Panics
    ///
    /// Panics if called before synchronization has completed.
    pub fn decrypt(&self, buffer: &[u8], nonce: u64) -> Option<Vec<u8>> {
        assert!(
            self.store.has_generated_keys(),
            "cannot decrypt before synchronization is complete"
        );
        channel::decrypt(&self.store, buffer, nonce)
    }

    /// Sign `buffer` by appending an HMAC-SHA384 digest computed with this
    /// session's signature key. Returns the number of bytes appended, or 0
    /// on failure.
    ///
    /// # Panics
    ///
    /// Panics if called before synchronization has completed.
    pub fn sign(&self, buffer: &mut Vec<u8>) -> usize {
        assert!(
            self.store.has_generated_keys(),
            "cannot sign before synchronization is complete"
        );
        channel::sign(&self.store, buffer)
    }

    /// Verify the trailing HMAC-SHA384 signature of `buffer` against the
    /// peer's signature key, in constant time.
    ///
    /// # Panics
    ///
    /// Panics if called before synchronization has completed.
    pub fn verify(&self, buffer: &[u8]) -> VerificationStatus {
        assert!(
            self.store.has_generated_keys(),
            "cannot verify before synchronization is complete"
        );
        channel::verify(&self.store, buffer)
    }
}

/// Source a fresh principal random seed for session key derivation.
fn generate_principal_seed() -> Result<Vec<u8>> {
    let mut seed = vec![0u8; sizes::PRINCIPAL_RANDOM];
    if OsRng.try_fill_bytes(&mut seed).is_err() {
        return crypto_err("failed to source principal random data");
    }
    Ok(seed)
}
