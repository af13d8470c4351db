//! Integration tests for the transport: ping scenario, interest and
//! counter bookkeeping, close idempotence, asynchronous error reporting.

mod common;

use common::{next_data, next_event, open_udp};
use dgram_tokio::{Endpoint, TransportConfig, TransportEvent};
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn test_udp_ping() {
    let (sender, mut sender_events, sender_addr) = open_udp(TransportConfig::new()).await;
    let (receiver, mut receiver_events, receiver_addr) = open_udp(TransportConfig::new()).await;

    receiver.resume().await.expect("Failed to resume");
    sender
        .write(b"ping", Some(&receiver_addr))
        .await
        .expect("Failed to write");

    let (payload, source) = next_data(&mut receiver_events).await;
    assert_eq!(payload.as_ref(), b"ping");
    assert_eq!(source, Some(sender_addr));

    // Sender's queue emptied: one drain event, write counter back to zero.
    match next_event(&mut sender_events).await {
        TransportEvent::Drain => {}
        other => panic!("Expected drain, got {other:?}"),
    }
    assert_eq!(sender.activity().write, 0);

    drop(sender);
    drop(receiver);
}

#[tokio::test]
async fn test_connected_mode_write_without_destination() {
    let (sender, _sender_events, _) = open_udp(TransportConfig::new()).await;
    let (receiver, mut receiver_events, receiver_addr) = open_udp(TransportConfig::new()).await;

    receiver.resume().await.expect("Failed to resume");
    sender.connect(&receiver_addr).await.expect("Failed to connect");

    sender.write(b"no destination", None).await.expect("Failed to write");

    let (payload, _) = next_data(&mut receiver_events).await;
    assert_eq!(payload.as_ref(), b"no destination");
}

#[tokio::test]
async fn test_unconnected_write_requires_destination() {
    let (sender, _events, _) = open_udp(TransportConfig::new()).await;

    let err = sender.write(b"lost", None).await.unwrap_err();
    assert!(err.is_address(), "expected address error, got {err}");
}

#[tokio::test]
async fn test_source_tracking_disabled() {
    let (sender, _sender_events, _) = open_udp(TransportConfig::new()).await;
    let (receiver, mut receiver_events, receiver_addr) =
        open_udp(TransportConfig::new().track_source(false)).await;

    receiver.resume().await.expect("Failed to resume");
    sender
        .write(b"anonymous", Some(&receiver_addr))
        .await
        .expect("Failed to write");

    let (payload, source) = next_data(&mut receiver_events).await;
    assert_eq!(payload.as_ref(), b"anonymous");
    assert!(source.is_none());
}

#[tokio::test]
async fn test_pause_defers_delivery_until_resume() {
    let (sender, _sender_events, _) = open_udp(TransportConfig::new()).await;
    let (receiver, mut receiver_events, receiver_addr) = open_udp(TransportConfig::new()).await;

    // Never resumed: datagram waits in the kernel buffer.
    sender
        .write(b"early", Some(&receiver_addr))
        .await
        .expect("Failed to write");

    let nothing = timeout(Duration::from_millis(300), receiver_events.recv()).await;
    assert!(nothing.is_err(), "got event while paused");
    assert_eq!(receiver.activity().read, 0);

    receiver.resume().await.expect("Failed to resume");
    assert_eq!(receiver.activity().read, 1);

    let (payload, _) = next_data(&mut receiver_events).await;
    assert_eq!(payload.as_ref(), b"early");
}

#[tokio::test]
async fn test_resume_pause_counters_idempotent() {
    let (transport, _events, _) = open_udp(TransportConfig::new()).await;

    assert_eq!(transport.activity().read, 0);

    transport.resume().await.unwrap();
    transport.resume().await.unwrap();
    assert_eq!(transport.activity().read, 1, "double resume double-counted");

    transport.pause().await.unwrap();
    transport.pause().await.unwrap();
    assert_eq!(transport.activity().read, 0);
    assert!(!transport.is_active());
}

#[tokio::test]
async fn test_write_counter_single_increment() {
    let (sender, mut sender_events, _) = open_udp(TransportConfig::new()).await;
    let (_receiver, _receiver_events, receiver_addr) = open_udp(TransportConfig::new()).await;

    // Multiple writes while writable interest may already be armed must
    // never push the counter past one.
    for i in 0..8u8 {
        sender
            .write(&[i; 16], Some(&receiver_addr))
            .await
            .expect("Failed to write");
        assert!(sender.activity().write <= 1);
    }

    // Everything flushes eventually and the counter returns to zero.
    let mut drained = false;
    while !drained {
        match next_event(&mut sender_events).await {
            TransportEvent::Drain => drained = sender.activity().write == 0,
            TransportEvent::Error { message } => panic!("Unexpected error: {message}"),
            TransportEvent::Data { .. } => {}
        }
    }
}

#[tokio::test]
async fn test_send_failure_emits_single_error_event() {
    let (sender, mut sender_events, _) = open_udp(TransportConfig::new()).await;

    // Resolves fine, but an INET descriptor cannot send to an INET6
    // destination: the flush fails and surfaces as one error event.
    let mismatched = Endpoint::new("::1", 9000);
    sender
        .write(b"doomed", Some(&mismatched))
        .await
        .expect("enqueue should succeed");

    match next_event(&mut sender_events).await {
        TransportEvent::Error { message } => assert!(!message.is_empty()),
        other => panic!("Expected error event, got {other:?}"),
    }

    // Transport stays open and usable after the failure.
    assert_eq!(sender.activity().write, 0);
    let (receiver, mut receiver_events, receiver_addr) = open_udp(TransportConfig::new()).await;
    receiver.resume().await.unwrap();
    sender
        .write(b"recovered", Some(&receiver_addr))
        .await
        .expect("Failed to write after error");
    let (payload, _) = next_data(&mut receiver_events).await;
    assert_eq!(payload.as_ref(), b"recovered");
}

#[tokio::test]
async fn test_failed_head_does_not_block_queued_tail() {
    let (sender, mut sender_events, _) = open_udp(TransportConfig::new()).await;
    let (receiver, mut receiver_events, receiver_addr) = open_udp(TransportConfig::new()).await;
    receiver.resume().await.expect("Failed to resume");

    // A doomed entry followed immediately by a deliverable one: the
    // failure must dispose of the head, not wedge everything behind it.
    let mismatched = Endpoint::new("::1", 9000);
    sender
        .write(b"doomed", Some(&mismatched))
        .await
        .expect("enqueue should succeed");
    sender
        .write(b"after", Some(&receiver_addr))
        .await
        .expect("Failed to write");

    let (payload, _) = next_data(&mut receiver_events).await;
    assert_eq!(payload.as_ref(), b"after");

    // Exactly one error for the failed entry, then the queue drains.
    let mut errors = 0;
    loop {
        match next_event(&mut sender_events).await {
            TransportEvent::Error { .. } => errors += 1,
            TransportEvent::Drain => {
                if sender.activity().write == 0 {
                    break;
                }
            }
            TransportEvent::Data { .. } => {}
        }
    }
    assert_eq!(errors, 1);
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let (mut transport, _events, _) = open_udp(TransportConfig::new()).await;

    transport.close().await.expect("first close failed");
    transport.close().await.expect("second close errored");

    // Commands after close report the transport as closed.
    let err = transport.resume().await.unwrap_err();
    assert!(err.is_closed());
}

#[tokio::test]
async fn test_setup_failure_is_synchronous() {
    // Domain -1 is not a valid address family anywhere.
    let result = dgram_tokio::SocketTransport::open(-1, 2, 0, TransportConfig::new()).await;
    match result {
        Err(e) => assert!(e.is_setup(), "expected setup error, got {e}"),
        Ok(_) => panic!("open with invalid domain succeeded"),
    }
}

#[tokio::test]
async fn test_socket_options_round_trip() {
    use dgram_tokio::consts;

    let (transport, _events, _) = open_udp(TransportConfig::new()).await;

    let one = 1i32.to_ne_bytes();
    transport
        .set_option(consts::SOL_SOCKET, consts::SO_BROADCAST, &one)
        .await
        .expect("setsockopt failed");

    let value = transport
        .get_option(consts::SOL_SOCKET, consts::SO_BROADCAST)
        .await
        .expect("getsockopt failed");
    let bytes: [u8; 4] = value[..4].try_into().unwrap();
    assert_ne!(i32::from_ne_bytes(bytes), 0);
}
