/*!
Session key store for the secure channel core.

The [`KeyStore`] accumulates handshake entropy (the peer's public key and
both principals' random seeds) and, once a shared secret is available,
derives the four directional session keys plus the key-confirmation value.
Derivation happens exactly once per session; the derived material is zeroed
when the store is dropped.
*/

use hkdf::Hkdf;
use sha2::Sha384;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::constants::{SESSION_KEY_INFO, VERIFICATION_DATA_INFO, sizes};
use crate::error::{Result, crypto_err, internal_err};
use crate::types::Role;

/// Derived session key material. Keys are bound to the deriving role so the
/// two principals never select the same key for the same traffic direction.
#[derive(Zeroize, ZeroizeOnDrop)]
struct SessionKeys {
    content_key: [u8; sizes::ENCRYPTION_KEY],
    peer_content_key: [u8; sizes::ENCRYPTION_KEY],
    signature_key: [u8; sizes::SIGNATURE_KEY],
    peer_signature_key: [u8; sizes::SIGNATURE_KEY],
    verification_data: [u8; sizes::VERIFICATION_DATA],
}

/// Holds handshake entropy and, after derivation, the directional session
/// keys for one session. Owned exclusively by that session's strategy.
#[derive(Default)]
pub struct KeyStore {
    peer_public_key: Option<Vec<u8>>,
    session_seed: Vec<u8>,
    keys: Option<SessionKeys>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the peer's public key received during synchronization.
    pub fn set_peer_public_key(&mut self, key: &[u8]) {
        self.peer_public_key = Some(key.to_vec());
    }

    /// The peer's public key, if one has been received.
    pub fn peer_public_key(&self) -> Option<&[u8]> {
        self.peer_public_key.as_deref()
    }

    /// Append principal random data to the session seed. Each party
    /// contributes once; both sides observe the contributions in the same
    /// order (acceptor's seed first), so the derivation salt agrees.
    pub fn expand_session_seed(&mut self, seed: &[u8]) {
        self.session_seed.extend_from_slice(seed);
    }

    /// Derive the directional session keys and the key-confirmation value
    /// from the shared `secret` and the accumulated session seed.
    ///
    /// The expanded key block is split into an initiator half and an
    /// acceptor half; `role` selects which half is "ours" and which is the
    /// peer's. Fails if `secret` is empty or if keys were already generated
    /// for this session.
    pub fn generate_session_keys(&mut self, role: Role, secret: &[u8]) -> Result<()> {
        if secret.is_empty() {
            return crypto_err("cannot derive session keys from an empty shared secret");
        }

        if self.keys.is_some() {
            return internal_err("session keys have already been generated");
        }

        const KEY_BLOCK_SIZE: usize = 2 * sizes::ENCRYPTION_KEY + 2 * sizes::SIGNATURE_KEY;
        const INITIATOR_CONTENT: usize = 0;
        const ACCEPTOR_CONTENT: usize = INITIATOR_CONTENT + sizes::ENCRYPTION_KEY;
        const INITIATOR_SIGNATURE: usize = ACCEPTOR_CONTENT + sizes::ENCRYPTION_KEY;
        const ACCEPTOR_SIGNATURE: usize = INITIATOR_SIGNATURE + sizes::SIGNATURE_KEY;

        let hkdf = Hkdf::<Sha384>::new(Some(&self.session_seed), secret);

        let mut block = Zeroizing::new([0u8; KEY_BLOCK_SIZE]);
        if hkdf.expand(SESSION_KEY_INFO, &mut *block).is_err() {
            return crypto_err("session key expansion failed");
        }

        let mut verification_data = [0u8; sizes::VERIFICATION_DATA];
        if hkdf.expand(VERIFICATION_DATA_INFO, &mut verification_data).is_err() {
            return crypto_err("verification data expansion failed");
        }

        let mut initiator_content = [0u8; sizes::ENCRYPTION_KEY];
        let mut acceptor_content = [0u8; sizes::ENCRYPTION_KEY];
        let mut initiator_signature = [0u8; sizes::SIGNATURE_KEY];
        let mut acceptor_signature = [0u8; sizes::SIGNATURE_KEY];
        initiator_content.copy_from_slice(&block[INITIATOR_CONTENT..ACCEPTOR_CONTENT]);
        acceptor_content.copy_from_slice(&block[ACCEPTOR_CONTENT..INITIATOR_SIGNATURE]);
        initiator_signature.copy_from_slice(&block[INITIATOR_SIGNATURE..ACCEPTOR_SIGNATURE]);
        acceptor_signature.copy_from_slice(&block[ACCEPTOR_SIGNATURE..]);

        self.keys = Some(match role {
            Role::Initiator => SessionKeys {
                content_key: initiator_content,
                peer_content_key: acceptor_content,
                signature_key: initiator_signature,
                peer_signature_key: acceptor_signature,
                verification_data,
            },
            Role::Acceptor => SessionKeys {
                content_key: acceptor_content,
                peer_content_key: initiator_content,
                signature_key: acceptor_signature,
                peer_signature_key: initiator_signature,
                verification_data,
            },
        });

        Ok(())
    }

    /// Whether session keys have been derived. The single gate every
    /// channel operation must check.
    pub fn has_generated_keys(&self) -> bool {
        self.keys.is_some()
    }

    /// Our content encryption key, present after successful derivation.
    pub fn content_key(&self) -> Option<&[u8]> {
        self.keys.as_ref().map(|keys| keys.content_key.as_slice())
    }

    /// The peer's content encryption key, used to decrypt their traffic.
    pub fn peer_content_key(&self) -> Option<&[u8]> {
        self.keys.as_ref().map(|keys| keys.peer_content_key.as_slice())
    }

    /// Our signature key, used when signing outbound buffers.
    pub fn signature_key(&self) -> Option<&[u8]> {
        self.keys.as_ref().map(|keys| keys.signature_key.as_slice())
    }

    /// The peer's signature key, used when verifying inbound buffers.
    pub fn peer_signature_key(&self) -> Option<&[u8]> {
        self.keys.as_ref().map(|keys| keys.peer_signature_key.as_slice())
    }

    /// The key-confirmation value both parties derive independently and
    /// exchange encrypted to prove key agreement without revealing keys.
    pub fn verification_data(&self) -> Option<&[u8]> {
        self.keys.as_ref().map(|keys| keys.verification_data.as_slice())
    }
}
