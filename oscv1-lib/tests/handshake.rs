//! Handshake exchange against the scripted digitizer.

mod common;

use common::*;

#[tokio::test(start_paused = true)]
async fn test_handshake_verifies_identity() {
    let mut session = Session::new(MockDigitizer::new(), test_config());

    let ident = session.handshake().await.expect("handshake must verify");
    assert_eq!(ident, "OSC_V1");
    assert_eq!(session.state(), SessionState::Idle);

    // The request byte went out exactly once.
    assert_eq!(session.port().written(), &[0x3F]);
}

#[tokio::test(start_paused = true)]
async fn test_handshake_times_out_on_truncated_reply() {
    let mock = MockDigitizer::with_handshake_fault(HandshakeFault::Truncate(5));
    let mut session = Session::new(mock, test_config());

    let err = session.handshake().await.unwrap_err();
    match err {
        Error::IncompleteResponse { expected, actual } => {
            assert_eq!(expected, HANDSHAKE_REPLY_SIZE);
            assert_eq!(actual, 5);
        }
        other => panic!("expected IncompleteResponse, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_handshake_rejects_wrong_identity() {
    let mock = MockDigitizer::with_handshake_fault(HandshakeFault::MangleIdent);
    let mut session = Session::new(mock, test_config());

    let err = session.handshake().await.unwrap_err();
    assert!(matches!(err, Error::IdentityMismatch { .. }), "got {err:?}");
}

#[tokio::test(start_paused = true)]
async fn test_handshake_rejects_wrong_checksum() {
    let mock = MockDigitizer::with_handshake_fault(HandshakeFault::MangleChecksum);
    let mut session = Session::new(mock, test_config());

    let err = session.handshake().await.unwrap_err();
    match err {
        Error::ChecksumMismatch { computed, received } => {
            assert_eq!(computed, 0x6D);
            assert_eq!(received, 0x6D ^ 0xFF);
        }
        other => panic!("expected ChecksumMismatch, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_handshake_rejected_while_running() {
    let mut session = Session::new(MockDigitizer::new(), test_config());
    session.start().await.unwrap();

    let err = session.handshake().await.unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidState {
            command: "handshake",
            state: SessionState::Running
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_handshake_discards_stale_bytes_first() {
    let mut mock = MockDigitizer::new();
    // Stale sample traffic sitting in the FIFO from before.
    mock.inject(&frame_bytes(&[1, 2, 3]));
    let mut session = Session::new(mock, test_config());

    let ident = session.handshake().await.expect("stale bytes must not corrupt the reply");
    assert_eq!(ident, "OSC_V1");
}
