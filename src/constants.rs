/*!
Constants for the secure channel core.

This module contains the wire-contract constants: primitive sizes, the
handshake hello marker, and the key-derivation labels. All of them must stay
bit-exact for interoperability between nodes.
*/

/// Marker buffer a connecting peer delivers to open an acceptor's handshake.
pub const HELLO_MESSAGE: &[u8] = b"PQLINK SYNCHRONIZATION HELLO";

/// HKDF info label for the directional session key block.
pub const SESSION_KEY_INFO: &[u8] = b"pqlink-v1-session-keys";

/// HKDF info label for the key-confirmation value.
pub const VERIFICATION_DATA_INFO: &[u8] = b"pqlink-v1-verification-data";

/// Nonce reserved for the encrypted verification-data exchange. Application
/// traffic must start its per-session counter above this value.
pub const VERIFICATION_NONCE: u64 = 0;

/// Size constants for the secure channel
pub mod sizes {
    /// CRYSTALS-Kyber (Kyber768) constants
    pub mod kyber {
        /// Size of Kyber public key in bytes
        pub const PUBLIC_KEY_BYTES: usize = 1184;

        /// Size of Kyber ciphertext in bytes
        pub const CIPHERTEXT_BYTES: usize = 1088;

        /// Size of Kyber shared secret in bytes
        pub const SHARED_SECRET_BYTES: usize = 32;
    }

    /// Size of an AES-256-CTR content encryption key in bytes
    pub const ENCRYPTION_KEY: usize = 32;

    /// Size of the AES-256-CTR initialization vector in bytes
    pub const ENCRYPTION_IV: usize = 16;

    /// Size of an HMAC-SHA384 signature key in bytes
    pub const SIGNATURE_KEY: usize = 48;

    /// Size of an HMAC-SHA384 signature in bytes; signatures are always the
    /// trailing bytes of a signed buffer
    pub const SIGNATURE: usize = 48;

    /// Size of the random seed each principal contributes during the
    /// handshake, in bytes
    pub const PRINCIPAL_RANDOM: usize = 32;

    /// Size of the key-confirmation value exchanged by both parties, in
    /// bytes; equals the signature size
    pub const VERIFICATION_DATA: usize = SIGNATURE;

    /// Width of a length prefix in a packed handshake message, in bytes
    pub const CHUNK_PREFIX: usize = 4;
}
