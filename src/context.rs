/*!
Key encapsulation context for the secure channel core.

A [`QuantumSafeContext`] owns a Kyber-768 keypair; the private key never
leaves it. A context is either created per session (`ContextMode::Unique`) or
constructed once by the process entry point and injected into every session
factory call (`ContextMode::Application`) to amortize keypair generation
across sessions.
*/

use std::sync::Arc;

use parking_lot::RwLock;
use pqcrypto_kyber::kyber768;
use pqcrypto_traits::kem::{
    Ciphertext as KemCiphertext, PublicKey as KemPublicKey, SharedSecret as KemSharedSecret,
};
use zeroize::Zeroizing;

use crate::error::{Result, key_exchange_err};

/// Thread-safe, reference-counted handle to a process-wide context shared by
/// every session running in `Application` mode.
pub type SharedContext = Arc<QuantumSafeContext>;

/// Selects how a session obtains its key encapsulation context.
#[derive(Clone)]
pub enum ContextMode {
    /// Generate a private keypair for this session alone
    Unique,
    /// Share the injected process-wide context across sessions
    Application(SharedContext),
}

struct KeyPair {
    public: kyber768::PublicKey,
    secret: kyber768::SecretKey,
}

/// Wraps a Kyber-768 keypair and exposes public-key export, secret
/// encapsulation against a peer public key, and decapsulation of a received
/// ciphertext.
///
/// The keypair is guarded by a read/write lock; encapsulation and
/// decapsulation are read operations relative to the keypair and may run
/// concurrently from many sessions.
pub struct QuantumSafeContext {
    keypair: RwLock<KeyPair>,
}

impl QuantumSafeContext {
    /// Generate a fresh Kyber-768 keypair for this context.
    pub fn new() -> Self {
        let (public, secret) = kyber768::keypair();
        Self { keypair: RwLock::new(KeyPair { public, secret }) }
    }

    /// Construct a process-wide shared context. Calling this again produces
    /// a replacement handle; sessions still holding the previous one are
    /// unaffected.
    pub fn shared() -> SharedContext {
        Arc::new(Self::new())
    }

    /// Export the public key bytes to provide to a peer.
    pub fn public_key(&self) -> Vec<u8> {
        let keypair = self.keypair.read();
        keypair.public.as_bytes().to_vec()
    }

    /// Size of the context's public key in bytes.
    pub fn public_key_size(&self) -> usize {
        crate::constants::sizes::kyber::PUBLIC_KEY_BYTES
    }

    /// Encapsulate a fresh shared secret against the peer's public key.
    /// Returns the encapsulated ciphertext to transmit and the shared
    /// secret, or an error if the peer key bytes are malformed.
    pub fn encapsulate_secret(&self, peer_public_key: &[u8]) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>)> {
        let public_key = match kyber768::PublicKey::from_bytes(peer_public_key) {
            Ok(key) => key,
            Err(error) => return key_exchange_err(format!("peer public key rejected: {error}")),
        };

        let _keypair = self.keypair.read();
        let (secret, encapsulation) = kyber768::encapsulate(&public_key);

        Ok((
            encapsulation.as_bytes().to_vec(),
            Zeroizing::new(secret.as_bytes().to_vec()),
        ))
    }

    /// Decapsulate the shared secret from a peer-provided encapsulation.
    /// Fails if the ciphertext bytes cannot be interpreted; a tampered
    /// ciphertext of valid length instead yields a mismatched secret, which
    /// the handshake catches at signature verification.
    pub fn decapsulate_secret(&self, encapsulation: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let ciphertext = match kyber768::Ciphertext::from_bytes(encapsulation) {
            Ok(ciphertext) => ciphertext,
            Err(error) => return key_exchange_err(format!("encapsulation rejected: {error}")),
        };

        let keypair = self.keypair.read();
        let secret = kyber768::decapsulate(&ciphertext, &keypair.secret);

        Ok(Zeroizing::new(secret.as_bytes().to_vec()))
    }
}

impl Default for QuantumSafeContext {
    fn default() -> Self {
        Self::new()
    }
}
