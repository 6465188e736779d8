/*!
Authenticated channel primitives.

Symmetric confidentiality uses AES-256-CTR with a 128-bit counter block
derived from the caller's 64-bit nonce; message authentication uses
HMAC-SHA384 appended to the signed buffer. These helpers operate on a
[`KeyStore`] and return `None`/`Failed` when key material is absent; the
strategy layer owns the hard precondition that keys exist.
*/

use aes::Aes256;
use ctr::Ctr128BE;
use ctr::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use sha2::Sha384;

use crate::constants::sizes;
use crate::store::KeyStore;
use crate::types::VerificationStatus;

type Aes256Ctr = Ctr128BE<Aes256>;
type HmacSha384 = Hmac<Sha384>;

/// Build the CTR counter block: the 64-bit nonce occupies the low (leading)
/// bytes of an otherwise zero IV, matching the wire contract. The caller is
/// responsible for nonce uniqueness within a session.
fn nonce_iv(nonce: u64) -> [u8; sizes::ENCRYPTION_IV] {
    let mut iv = [0u8; sizes::ENCRYPTION_IV];
    iv[..8].copy_from_slice(&nonce.to_le_bytes());
    iv
}

fn apply_keystream(key: &[u8], nonce: u64, buffer: &[u8]) -> Option<Vec<u8>> {
    let iv = nonce_iv(nonce);
    let mut cipher = Aes256Ctr::new_from_slices(key, &iv).ok()?;
    let mut output = buffer.to_vec();
    cipher.apply_keystream(&mut output);
    Some(output)
}

/// Encrypt `buffer` with our content key. Returns `None` for an empty
/// buffer, missing key material, or cipher initialization failure.
pub(crate) fn encrypt(store: &KeyStore, buffer: &[u8], nonce: u64) -> Option<Vec<u8>> {
    if buffer.is_empty() {
        return None;
    }
    apply_keystream(store.content_key()?, nonce, buffer)
}

/// Decrypt `buffer` with the peer's content key. The caller must supply the
/// same nonce the sender used for this message.
pub(crate) fn decrypt(store: &KeyStore, buffer: &[u8], nonce: u64) -> Option<Vec<u8>> {
    if buffer.is_empty() {
        return None;
    }
    apply_keystream(store.peer_content_key()?, nonce, buffer)
}

fn generate_signature(key: &[u8], data: &[u8]) -> Option<Vec<u8>> {
    if data.is_empty() {
        return None;
    }
    let mut mac = HmacSha384::new_from_slice(key).ok()?;
    mac.update(data);
    Some(mac.finalize().into_bytes().to_vec())
}

/// Compute HMAC-SHA384 over `buffer` with our signature key and append the
/// digest, producing a verifiable buffer. Returns the number of bytes
/// appended, or 0 on failure.
pub(crate) fn sign(store: &KeyStore, buffer: &mut Vec<u8>) -> usize {
    let Some(key) = store.signature_key() else {
        return 0;
    };

    let Some(signature) = generate_signature(key, buffer) else {
        return 0;
    };

    buffer.extend_from_slice(&signature);
    signature.len()
}

/// Split `buffer` into content and trailing signature, recompute the
/// expected HMAC with the peer's signature key, and compare in constant
/// time. Any length mismatch or inequality is `Failed`.
pub(crate) fn verify(store: &KeyStore, buffer: &[u8]) -> VerificationStatus {
    let Some(content_size) = buffer.len().checked_sub(sizes::SIGNATURE) else {
        return VerificationStatus::Failed;
    };

    if content_size == 0 {
        return VerificationStatus::Failed;
    }

    let Some(key) = store.peer_signature_key() else {
        return VerificationStatus::Failed;
    };

    let Ok(mut mac) = HmacSha384::new_from_slice(key) else {
        return VerificationStatus::Failed;
    };

    mac.update(&buffer[..content_size]);
    match mac.verify_slice(&buffer[content_size..]) {
        Ok(()) => VerificationStatus::Success,
        Err(_) => VerificationStatus::Failed,
    }
}
