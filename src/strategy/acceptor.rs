//! Acceptor-side handshake state machine.

use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::channel;
use crate::constants::{HELLO_MESSAGE, VERIFICATION_NONCE, sizes};
use crate::context::QuantumSafeContext;
use crate::error::{Result, auth_err, crypto_err, format_err, internal_err};
use crate::pack;
use crate::store::KeyStore;
use crate::tracker::SynchronizationTracker;
use crate::types::{Role, SynchronizationResult, SynchronizationStatus, VerificationStatus};

/// Ordered stages the acceptor moves through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum AcceptorStage {
    #[default]
    Initialization,
    Encapsulation,
    Verification,
    Complete,
}

pub(super) struct AcceptorMachine {
    tracker: SynchronizationTracker<AcceptorStage>,
}

impl AcceptorMachine {
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
            warn!("acceptor synchronized after reaching a terminal state");
            self.tracker.set_error();
            return (self.tracker.status(), Vec::new());
        }

        let outcome = match self.tracker.stage() {
            AcceptorStage::Initialization => self.handle_initialization(context, store, buffer),
            AcceptorStage::Encapsulation => self.handle_encapsulation(context, store, buffer),
            AcceptorStage::Verification => self.handle_verification(store, buffer),
            // Unreachable while status is Processing; finalization switches
            // the status to Ready in the same call that sets this stage.
            AcceptorStage::Complete => internal_err("synchronized in a completed stage"),
        };

        match outcome {
            Ok(response) => (self.tracker.status(), response),
            Err(error) => {
                warn!(%error, "acceptor synchronization failed");
                self.tracker.set_error();
                (self.tracker.status(), Vec::new())
            }
        }
    }

    /// Check the connecting peer's hello marker and respond with our public
    /// key and principal seed.
    fn handle_initialization(
        &mut self,
        context: &QuantumSafeContext,
        store: &mut KeyStore,
        buffer: &[u8],
    ) -> Result<Vec<u8>> {
        if buffer != HELLO_MESSAGE {
            return format_err("received an unrecognized hello marker");
        }

        let seed = super::generate_principal_seed()?;
        store.expand_session_seed(&seed);

        let mut response = context.public_key();
        response.extend_from_slice(&seed);

        // We expect the peer's public key and principal seed next.
        self.tracker.set_stage(AcceptorStage::Encapsulation);
        debug!("acceptor advanced to the encapsulation stage");

        Ok(response)
    }

    /// Encapsulate a shared secret against the peer's public key, derive
    /// session keys, and emit the signed encapsulation message.
    fn handle_encapsulation(
        &mut self,
        context: &QuantumSafeContext,
        store: &mut KeyStore,
        buffer: &[u8],
    ) -> Result<Vec<u8>> {
        let expected = sizes::kyber::PUBLIC_KEY_BYTES + sizes::PRINCIPAL_RANDOM;
        if buffer.len() != expected {
            return format_err(format!(
                "encapsulation request must be {expected} bytes, received {}",
                buffer.len()
            ));
        }

        store.set_peer_public_key(&buffer[..sizes::kyber::PUBLIC_KEY_BYTES]);
        store.expand_session_seed(&buffer[sizes::kyber::PUBLIC_KEY_BYTES..]);

        let Some(peer_public_key) = store.peer_public_key().map(<[u8]>::to_vec) else {
            return internal_err("peer public key absent after initialization");
        };

        let (encapsulation, secret) = context.encapsulate_secret(&peer_public_key)?;
        store.generate_session_keys(Role::Acceptor, &secret)?;

        let Some(verification_data) = store.verification_data() else {
            return internal_err("verification data absent after key generation");
        };

        // Encrypt the confirmation value so an honest peer can check its own
        // derived keys against ours.
        let Some(encrypted) = channel::encrypt(store, verification_data, VERIFICATION_NONCE)
        else {
            return crypto_err("verification data could not be encrypted");
        };

        let mut message = Vec::with_capacity(
            2 * sizes::CHUNK_PREFIX + encapsulation.len() + encrypted.len() + sizes::SIGNATURE,
        );
        pack::pack_chunk(&mut message, &encapsulation);
        pack::pack_chunk(&mut message, &encrypted);

        if channel::sign(store, &mut message) == 0 {
            return crypto_err("encapsulation message could not be signed");
        }

        // We expect the peer's signed verification data next.
        self.tracker.set_stage(AcceptorStage::Verification);
        debug!("acceptor advanced to the verification stage");

        Ok(message)
    }

    /// Confirm the initiator derived identical session keys. The handshake
    /// ends here with no further output.
    fn handle_verification(&mut self, store: &KeyStore, buffer: &[u8]) -> Result<Vec<u8>> {
        if buffer.len() != sizes::VERIFICATION_DATA + sizes::SIGNATURE {
            return format_err(format!(
                "verification message must be {} bytes, received {}",
                sizes::VERIFICATION_DATA + sizes::SIGNATURE,
                buffer.len()
            ));
        }

        if channel::verify(store, buffer) != VerificationStatus::Success {
            return auth_err("verification message failed signature verification");
        }

        let Some(decrypted) =
            channel::decrypt(store, &buffer[..sizes::VERIFICATION_DATA], VERIFICATION_NONCE)
        else {
            return crypto_err("peer verification data could not be decrypted");
        };

        let Some(verification_data) = store.verification_data() else {
            return internal_err("verification data absent after key generation");
        };

        if !bool::from(verification_data.ct_eq(&decrypted)) {
            return auth_err("peer verification data does not match our session keys");
        }

        self.tracker.finalize_transaction(AcceptorStage::Complete);
        debug!("acceptor synchronization complete");

        Ok(Vec::new())
    }
}
