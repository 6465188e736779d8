//! Initiator-side handshake state machine.

use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::channel;
use crate::constants::{VERIFICATION_NONCE, sizes};
use crate::context::QuantumSafeContext;
use crate::error::{Result, auth_err, crypto_err, format_err, internal_err};
use crate::pack;
use crate::store::KeyStore;
use crate::tracker::SynchronizationTracker;
use crate::types::{Role, SynchronizationResult, SynchronizationStatus, VerificationStatus};

/// Ordered stages the initiator moves through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum InitiatorStage {
    #[default]
    Initialization,
    Decapsulation,
    Complete,
}

pub(super) struct InitiatorMachine {
    tracker: SynchronizationTracker<InitiatorStage>,
}

impl InitiatorMachine {
    pub(super) fn new() -> Self {
        Self { tracker: SynchronizationTracker::new() }
    }

    pub(super) fn status(&self) -> SynchronizationStatus {
        self.tracker.status()
    }

    pub(super) fn synchronize(
        &mut self,
        context: &QuantumSafeContext,
        store: &mut KeyStore,
        buffer: &[u8],
    ) -> SynchronizationResult {
        // The strategy is not reusable past a terminal state.
        if self.tracker.status() != SynchronizationStatus::Processing {
            warn!("initiator synchronized after reaching a terminal state");
            self.tracker.set_error();
            return (self.tracker.status(), Vec::new());
        }

        let outcome = match self.tracker.stage() {
            InitiatorStage::Initialization => self.handle_initialization(context, store, buffer),
            InitiatorStage::Decapsulation => self.handle_decapsulation(context, store, buffer),
            // Unreachable while status is Processing; finalization switches
            // the status to Ready in the same call that sets this stage.
            InitiatorStage::Complete => internal_err("synchronized in a completed stage"),
        };

        match outcome {
            Ok(response) => (self.tracker.status(), response),
            Err(error) => {
                warn!(%error, "initiator synchronization failed");
                self.tracker.set_error();
                (self.tracker.status(), Vec::new())
            }
        }
    }

    /// Consume the acceptor's public key and principal seed, then respond
    /// with our own.
    fn handle_initialization(
        &mut self,
        context: &QuantumSafeContext,
        store: &mut KeyStore,
        buffer: &[u8],
    ) -> Result<Vec<u8>> {
        let expected = sizes::kyber::PUBLIC_KEY_BYTES + sizes::PRINCIPAL_RANDOM;
        if buffer.len() != expected {
            return format_err(format!(
                "initialization message must be {expected} bytes, received {}",
                buffer.len()
            ));
        }

        store.set_peer_public_key(&buffer[..sizes::kyber::PUBLIC_KEY_BYTES]);
        store.expand_session_seed(&buffer[sizes::kyber::PUBLIC_KEY_BYTES..]);

        let seed = super::generate_principal_seed()?;
        store.expand_session_seed(&seed);

        let mut response = context.public_key();
        response.extend_from_slice(&seed);

        // We expect the peer's shared secret encapsulation next.
        self.tracker.set_stage(InitiatorStage::Decapsulation);
        debug!("initiator advanced to the decapsulation stage");

        Ok(response)
    }

    /// Decapsulate the peer's shared secret, derive session keys, and
    /// mutually confirm them.
    fn handle_decapsulation(
        &mut self,
        context: &QuantumSafeContext,
        store: &mut KeyStore,
        buffer: &[u8],
    ) -> Result<Vec<u8>> {
        let mut cursor = buffer;
        let Some(encapsulation) = pack::unpack_chunk(&mut cursor) else {
            return format_err("encapsulation message is missing the secret chunk");
        };
        let Some(peer_verification) = pack::unpack_chunk(&mut cursor) else {
            return format_err("encapsulation message is missing the verification chunk");
        };

        let secret = context.decapsulate_secret(&encapsulation)?;
        store.generate_session_keys(Role::Initiator, &secret)?;

        // With keys in place the peer's signature over the whole message can
        // be checked; a tampered encapsulation also fails here, because the
        // derived signature keys will not agree.
        if channel::verify(store, buffer) != VerificationStatus::Success {
            return auth_err("encapsulation message failed signature verification");
        }

        let Some(decrypted) = channel::decrypt(store, &peer_verification, VERIFICATION_NONCE)
        else {
            return crypto_err("peer verification data could not be decrypted");
        };

        let Some(verification_data) = store.verification_data() else {
            return internal_err("verification data absent after key generation");
        };

        if !bool::from(verification_data.ct_eq(&decrypted)) {
            return auth_err("peer verification data does not match our session keys");
        }

        // Challenge the peer's keys with our own encrypted verification data.
        let Some(mut message) = channel::encrypt(store, verification_data, VERIFICATION_NONCE)
        else {
            return crypto_err("verification data could not be encrypted");
        };

        if channel::sign(store, &mut message) == 0 {
            return crypto_err("verification message could not be signed");
        }

        self.tracker.finalize_transaction(InitiatorStage::Complete);
        debug!("initiator synchronization complete");

        Ok(message)
    }
}
