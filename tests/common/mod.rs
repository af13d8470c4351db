//! Shared test helpers for transport integration tests

use dgram_tokio::{consts, Endpoint, SocketTransport, TransportConfig, TransportEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Open a UDP transport bound to an ephemeral loopback port.
pub async fn open_udp(
    config: TransportConfig,
) -> (SocketTransport, mpsc::Receiver<TransportEvent>, Endpoint) {
    let (transport, events) = SocketTransport::open(consts::AF_INET, consts::SOCK_DGRAM, 0, config)
        .await
        .expect("Failed to open transport");
    transport
        .bind(&Endpoint::new("127.0.0.1", 0))
        .await
        .expect("Failed to bind");
    let local = transport.local_addr().await.expect("Failed to get local addr");
    (transport, events, local)
}

/// Wait for the next event with a timeout.
pub async fn next_event(events: &mut mpsc::Receiver<TransportEvent>) -> TransportEvent {
    timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("Timed out waiting for event")
        .expect("Event channel closed")
}

/// Wait for the next data event, skipping drain notifications.
#[allow(dead_code)]
pub async fn next_data(
    events: &mut mpsc::Receiver<TransportEvent>,
) -> (bytes::Bytes, Option<Endpoint>) {
    loop {
        match next_event(events).await {
            TransportEvent::Data { payload, source } => return (payload, source),
            TransportEvent::Drain => continue,
            TransportEvent::Error { message } => panic!("Unexpected error event: {message}"),
        }
    }
}
