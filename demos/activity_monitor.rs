//! Demonstrates the activity counter pair a host polls for keep-alive:
//! the write counter while the outbound queue is pending, the read
//! counter across resume/pause.
//!
//! Run with: cargo run --example activity_monitor

use dgram_tokio::{consts, Endpoint, TransportConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let (mut transport, mut events) = TransportConfig::new()
        .open(consts::AF_INET, consts::SOCK_DGRAM, 0)
        .await?;
    transport.bind(&Endpoint::new("127.0.0.1", 0)).await?;

    println!("idle:          {:?}", transport.activity());

    transport.resume().await?;
    println!("after resume:  {:?}", transport.activity());

    // Writing to ourselves arms the write counter until the queue drains.
    let self_addr = transport.local_addr().await?;
    transport.write(b"to myself", Some(&self_addr)).await?;
    println!("after write:   {:?}", transport.activity());

    // Wait for the datagram to come back, then for the queue to drain.
    let mut seen_data = false;
    let mut seen_drain = false;
    while !(seen_data && seen_drain) {
        match events.recv().await.ok_or("event channel closed")? {
            dgram_tokio::TransportEvent::Data { payload, .. } => {
                println!("received:      {:?}", String::from_utf8_lossy(&payload));
                seen_data = true;
            }
            dgram_tokio::TransportEvent::Drain => seen_drain = true,
            dgram_tokio::TransportEvent::Error { message } => return Err(message.into()),
        }
    }
    println!("after drain:   {:?}", transport.activity());

    transport.pause().await?;
    println!("after pause:   {:?}", transport.activity());
    assert!(!transport.is_active());

    transport.close().await?;
    Ok(())
}
