// Tests driving the initiator and acceptor state machines against each other
use pqlink::{
    ContextMode, HELLO_MESSAGE, HandshakeStrategy, QuantumSafeContext, Role,
    SynchronizationStatus, constants::sizes,
};

/// Run both machines in lock-step up to the acceptor's encapsulation
/// message, returning it alongside the two strategies.
fn run_to_encapsulation(
    mut initiator: HandshakeStrategy,
    mut acceptor: HandshakeStrategy,
) -> (HandshakeStrategy, HandshakeStrategy, Vec<u8>) {
    let (status, acceptor_hello) = acceptor.synchronize(HELLO_MESSAGE);
    assert_eq!(status, SynchronizationStatus::Processing);
    assert_eq!(
        acceptor_hello.len(),
        sizes::kyber::PUBLIC_KEY_BYTES + sizes::PRINCIPAL_RANDOM
    );

    let (status, initiator_response) = initiator.synchronize(&acceptor_hello);
    assert_eq!(status, SynchronizationStatus::Processing);
    assert_eq!(
        initiator_response.len(),
        sizes::kyber::PUBLIC_KEY_BYTES + sizes::PRINCIPAL_RANDOM
    );

    let (status, encapsulation) = acceptor.synchronize(&initiator_response);
    assert_eq!(status, SynchronizationStatus::Processing);

    (initiator, acceptor, encapsulation)
}

/// Complete a full handshake between two fresh strategies.
fn run_handshake(mode: ContextMode) -> (HandshakeStrategy, HandshakeStrategy) {
    let initiator = HandshakeStrategy::new(Role::Initiator, mode.clone());
    let acceptor = HandshakeStrategy::new(Role::Acceptor, mode);

    let (mut initiator, mut acceptor, encapsulation) =
        run_to_encapsulation(initiator, acceptor);

    let (status, verification) = initiator.synchronize(&encapsulation);
    assert_eq!(status, SynchronizationStatus::Ready);
    assert_eq!(
        verification.len(),
        sizes::VERIFICATION_DATA + sizes::SIGNATURE
    );

    let (status, done) = acceptor.synchronize(&verification);
    assert_eq!(status, SynchronizationStatus::Ready);
    assert!(done.is_empty(), "acceptor ends the handshake with no output");

    (initiator, acceptor)
}

#[test]
fn test_handshake_round_trip() {
    let (initiator, acceptor) = run_handshake(ContextMode::Unique);

    assert_eq!(initiator.synchronization_status(), SynchronizationStatus::Ready);
    assert_eq!(acceptor.synchronization_status(), SynchronizationStatus::Ready);

    // Traffic protected in either direction proves the directional keys
    // derived on both sides are cross-equal.
    let ciphertext = initiator.encrypt(b"initiator to acceptor", 1).unwrap();
    assert_eq!(
        acceptor.decrypt(&ciphertext, 1).unwrap(),
        b"initiator to acceptor"
    );

    let ciphertext = acceptor.encrypt(b"acceptor to initiator", 1).unwrap();
    assert_eq!(
        initiator.decrypt(&ciphertext, 1).unwrap(),
        b"acceptor to initiator"
    );
}

#[test]
fn test_handshake_with_shared_application_context() {
    let shared = QuantumSafeContext::shared();

    // Several sessions in one process may amortize keypair generation
    // through one injected context, on either side of the exchange.
    for _ in 0..2 {
        let (initiator, acceptor) =
            run_handshake(ContextMode::Application(shared.clone()));

        let ciphertext = initiator.encrypt(b"shared context traffic", 1).unwrap();
        assert_eq!(
            acceptor.decrypt(&ciphertext, 1).unwrap(),
            b"shared context traffic"
        );
    }
}

#[test]
fn test_replaced_application_context_leaves_old_sessions_intact() {
    let first = QuantumSafeContext::shared();
    let second = QuantumSafeContext::shared();

    let (initiator, acceptor) = run_handshake(ContextMode::Application(first));
    drop(second);

    let ciphertext = initiator.encrypt(b"still valid", 1).unwrap();
    assert_eq!(acceptor.decrypt(&ciphertext, 1).unwrap(), b"still valid");
}

#[test]
fn test_tampered_encapsulation_rejected() {
    // Layout of the acceptor's encapsulation output: length-prefixed KEM
    // ciphertext, length-prefixed encrypted verification data, signature.
    let message_size = 2 * sizes::CHUNK_PREFIX
        + sizes::kyber::CIPHERTEXT_BYTES
        + sizes::VERIFICATION_DATA
        + sizes::SIGNATURE;

    let probes = [
        0,                                                      // first length prefix
        sizes::CHUNK_PREFIX + 10,                               // inside the KEM ciphertext
        sizes::CHUNK_PREFIX + sizes::kyber::CIPHERTEXT_BYTES + 1, // second length prefix
        message_size - sizes::SIGNATURE - 10,                   // encrypted verification data
        message_size - 1,                                       // trailing signature byte
    ];

    for position in probes {
        let initiator = HandshakeStrategy::new(Role::Initiator, ContextMode::Unique);
        let acceptor = HandshakeStrategy::new(Role::Acceptor, ContextMode::Unique);
        let (mut initiator, _acceptor, mut encapsulation) =
            run_to_encapsulation(initiator, acceptor);
        assert_eq!(encapsulation.len(), message_size);

        encapsulation[position] ^= 0x01;

        let (status, response) = initiator.synchronize(&encapsulation);
        assert_eq!(
            status,
            SynchronizationStatus::Error,
            "flipped byte at {position} must fail the handshake"
        );
        assert!(response.is_empty(), "no payload accompanies an error status");
    }
}

#[test]
fn test_tampered_verification_message_rejected() {
    let initiator = HandshakeStrategy::new(Role::Initiator, ContextMode::Unique);
    let acceptor = HandshakeStrategy::new(Role::Acceptor, ContextMode::Unique);
    let (mut initiator, mut acceptor, encapsulation) =
        run_to_encapsulation(initiator, acceptor);

    let (status, mut verification) = initiator.synchronize(&encapsulation);
    assert_eq!(status, SynchronizationStatus::Ready);

    verification[0] ^= 0x01;

    let (status, response) = acceptor.synchronize(&verification);
    assert_eq!(status, SynchronizationStatus::Error);
    assert!(response.is_empty());
}

#[test]
fn test_unrecognized_hello_rejected() {
    let mut acceptor = HandshakeStrategy::new(Role::Acceptor, ContextMode::Unique);
    let (status, response) = acceptor.synchronize(b"NOT THE HELLO MARKER");
    assert_eq!(status, SynchronizationStatus::Error);
    assert!(response.is_empty());
}

#[test]
fn test_truncated_hello_rejected() {
    let mut acceptor = HandshakeStrategy::new(Role::Acceptor, ContextMode::Unique);
    let (status, _) = acceptor.synchronize(&HELLO_MESSAGE[..HELLO_MESSAGE.len() - 1]);
    assert_eq!(status, SynchronizationStatus::Error);
}

#[test]
fn test_wrong_length_initialization_rejected() {
    let mut initiator = HandshakeStrategy::new(Role::Initiator, ContextMode::Unique);
    let (status, response) =
        initiator.synchronize(&[0u8; sizes::kyber::PUBLIC_KEY_BYTES]); // seed missing
    assert_eq!(status, SynchronizationStatus::Error);
    assert!(response.is_empty());
}

#[test]
fn test_terminal_states_are_not_reusable() {
    let (mut initiator, mut acceptor) = run_handshake(ContextMode::Unique);

    // A completed strategy must never reactivate a prior stage.
    let (status, response) = initiator.synchronize(HELLO_MESSAGE);
    assert_eq!(status, SynchronizationStatus::Error);
    assert!(response.is_empty());

    let (status, _) = acceptor.synchronize(HELLO_MESSAGE);
    assert_eq!(status, SynchronizationStatus::Error);

    // A failed strategy stays failed.
    let (status, _) = acceptor.synchronize(HELLO_MESSAGE);
    assert_eq!(status, SynchronizationStatus::Error);
}

#[test]
fn test_strategy_reports_role_and_stage_count() {
    let initiator = HandshakeStrategy::new(Role::Initiator, ContextMode::Unique);
    let acceptor = HandshakeStrategy::new(Role::Acceptor, ContextMode::Unique);

    assert_eq!(initiator.role(), Role::Initiator);
    assert_eq!(acceptor.role(), Role::Acceptor);
    assert_eq!(initiator.synchronization_stages(), 2);
    assert_eq!(acceptor.synchronization_stages(), 3);
    assert_eq!(initiator.public_key_size(), sizes::kyber::PUBLIC_KEY_BYTES);
    assert_eq!(
        initiator.synchronization_status(),
        SynchronizationStatus::Processing
    );
}
