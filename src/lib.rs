/*!
# pqlink

Post-quantum secure channel establishment for peer-to-peer mesh nodes.

This library implements the transport-security core of a mesh node: a
role-based (Initiator/Acceptor) multi-round handshake that derives a set of
directional session keys from a NIST-Level-3 key encapsulation mechanism
(CRYSTALS-Kyber-768), plus the authenticated-encryption and signing
primitives used to protect every subsequent application message.

## Overview

- Kyber-768 for key encapsulation
- HKDF-SHA384 for role-bound session key derivation
- AES-256-CTR for content encryption with caller-supplied nonces
- HMAC-SHA384 for message signatures and handshake verification

The handshake is driven one round at a time through
[`HandshakeStrategy::synchronize`]: the transport layer hands received bytes
in and sends the returned buffer back out. Once the strategy reports
[`SynchronizationStatus::Ready`], the [`encrypt`](HandshakeStrategy::encrypt),
[`decrypt`](HandshakeStrategy::decrypt), [`sign`](HandshakeStrategy::sign),
and [`verify`](HandshakeStrategy::verify) operations become available.

Wire transport, message framing, and peer lifecycle are deliberately out of
scope; this crate only defines the contract of the handshake and the channel
operations it unlocks.

## Example

```no_run
use pqlink::{ContextMode, HandshakeStrategy, Role, SynchronizationStatus, constants};

let mut initiator = HandshakeStrategy::new(Role::Initiator, ContextMode::Unique);
let mut acceptor = HandshakeStrategy::new(Role::Acceptor, ContextMode::Unique);

// The transport layer opens the exchange by delivering the hello marker.
let (_, response) = acceptor.synchronize(constants::HELLO_MESSAGE);
let (_, response) = initiator.synchronize(&response);
let (_, response) = acceptor.synchronize(&response);
let (status, response) = initiator.synchronize(&response);
assert_eq!(status, SynchronizationStatus::Ready);
let (status, _) = acceptor.synchronize(&response);
assert_eq!(status, SynchronizationStatus::Ready);

// Both sides may now protect application traffic.
let ciphertext = initiator.encrypt(b"ping", 1).unwrap();
let plaintext = acceptor.decrypt(&ciphertext, 1).unwrap();
assert_eq!(plaintext, b"ping");
```
*/

// Protocol constants and wire-contract sizes
pub mod constants;

// Error handling
pub mod error;

// Shared protocol types
pub mod types;

// Key encapsulation context (Kyber-768 keypair ownership)
pub mod context;

// Session key store and derivation
pub mod store;

// Synchronization bookkeeping
pub mod tracker;

// Handshake state machines and channel operations
pub mod strategy;

// Internal helpers
mod channel;
mod pack;

// Re-export commonly used types for convenience
pub use constants::HELLO_MESSAGE;
pub use context::{ContextMode, QuantumSafeContext, SharedContext};
pub use error::{Error, Result};
pub use store::KeyStore;
pub use strategy::HandshakeStrategy;
pub use types::{Role, SynchronizationResult, SynchronizationStatus, VerificationStatus};
