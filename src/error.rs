/*!
Error handling for the secure channel core.

Errors model the in-protocol adversarial conditions a handshake can observe:
malformed buffers, failing cryptographic primitives, and failed
authentication. The strategy collapses them to
[`SynchronizationStatus::Error`](crate::types::SynchronizationStatus) so the
peer layer can tear the session down; they are never retried internally.

Caller contract violations (for example, encrypting before the handshake has
completed) are not represented here - those panic, since retrying the same
call cannot help.
*/

use thiserror::Error;

/// Result type for the secure channel core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the secure channel core
#[derive(Error, Debug)]
pub enum Error {
    /// Received buffer has the wrong length or malformed chunk framing
    #[error("invalid message format: {0}")]
    InvalidFormat(String),

    /// A cryptographic primitive failed
    #[error("cryptographic error: {0}")]
    Crypto(String),

    /// Key encapsulation or decapsulation failed
    #[error("key exchange error: {0}")]
    KeyExchange(String),

    /// Signature verification or key confirmation failed
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convert a string to an Error::InvalidFormat
pub fn format_err<T, S: Into<String>>(msg: S) -> Result<T> {
    Err(Error::InvalidFormat(msg.into()))
}

/// Convert a string to an Error::Crypto
pub fn crypto_err<T, S: Into<String>>(msg: S) -> Result<T> {
    Err(Error::Crypto(msg.into()))
}

/// Convert a string to an Error::KeyExchange
pub fn key_exchange_err<T, S: Into<String>>(msg: S) -> Result<T> {
    Err(Error::KeyExchange(msg.into()))
}

/// Convert a string to an Error::Authentication
pub fn auth_err<T, S: Into<String>>(msg: S) -> Result<T> {
    Err(Error::Authentication(msg.into()))
}

/// Convert a string to an Error::Internal
pub fn internal_err<T, S: Into<String>>(msg: S) -> Result<T> {
    Err(Error::Internal(msg.into()))
}
