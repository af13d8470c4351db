//! UDP echo demo: one transport echoes every datagram back to its
//! source, a second transport sends a few pings and prints the replies.
//!
//! Run with: cargo run --example udp_echo

use dgram_tokio::{consts, Endpoint, SocketTransport, TransportConfig, TransportEvent};
use std::time::Duration;
use tokio::time::timeout;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Echo server transport
    let (server, mut server_events) = TransportConfig::new()
        .open(consts::AF_INET, consts::SOCK_DGRAM, 0)
        .await?;
    server.bind(&Endpoint::new("127.0.0.1", 0)).await?;
    server.resume().await?;
    let server_addr = server.local_addr().await?;
    println!("echo server on {server_addr}");

    tokio::spawn(async move {
        while let Some(event) = server_events.recv().await {
            if let TransportEvent::Data { payload, source: Some(source) } = event {
                let _ = server.write(&payload, Some(&source)).await;
            }
        }
    });

    // Client transport
    let (mut client, mut client_events) = TransportConfig::new()
        .open(consts::AF_INET, consts::SOCK_DGRAM, 0)
        .await?;
    client.bind(&Endpoint::new("127.0.0.1", 0)).await?;
    client.resume().await?;

    for i in 0..5u32 {
        let message = format!("ping {i}");
        client.write(message.as_bytes(), Some(&server_addr)).await?;

        loop {
            let event = timeout(Duration::from_secs(2), client_events.recv())
                .await?
                .ok_or("event channel closed")?;
            match event {
                TransportEvent::Data { payload, source } => {
                    println!(
                        "echo: {:?} from {:?}",
                        String::from_utf8_lossy(&payload),
                        source.map(|s| s.to_string())
                    );
                    break;
                }
                TransportEvent::Drain => continue,
                TransportEvent::Error { message } => return Err(message.into()),
            }
        }
    }

    client.close().await?;
    println!("{}", dgram_tokio::metrics::format_metrics(&dgram_tokio::metrics::global_metrics().snapshot()));
    Ok(())
}
