//! Criterion benchmarks for address resolution and outbound queueing.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dgram_tokio::{addr, AddrFamily, Endpoint, OutboundQueue};
use rand::{Rng, SeedableRng};

fn resolve_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_format");

    group.bench_function("resolve_v4", |b| {
        b.iter(|| addr::resolve("192.168.1.42", 5000, AddrFamily::Inet).unwrap())
    });

    group.bench_function("resolve_v6", |b| {
        b.iter(|| addr::resolve("fe80::1234:5678", 5000, AddrFamily::Inet6).unwrap())
    });

    group.bench_function("format_cached", |b| {
        let raw = addr::resolve("192.168.1.42", 5000, AddrFamily::Inet).unwrap();
        b.iter(|| addr::format(&raw))
    });

    group.finish();
}

fn queue_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_add");
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5EED);

    for &count in &[16usize, 128, 1024] {
        let payload_size = 1200;
        group.throughput(Throughput::Bytes((count * payload_size) as u64));

        let payloads: Vec<Vec<u8>> = (0..count)
            .map(|_| (0..payload_size).map(|_| rng.gen()).collect())
            .collect();
        let target = Endpoint::new("127.0.0.1", 9000);

        group.bench_with_input(
            BenchmarkId::new("1200B_payloads", count),
            &payloads,
            |b, payloads| {
                b.iter(|| {
                    let mut queue = OutboundQueue::new();
                    for payload in payloads {
                        queue.add(payload, Some(&target)).unwrap();
                    }
                    queue.len()
                })
            },
        );
    }

    group.finish();
}

fn queue_add_connected(c: &mut Criterion) {
    let target = Endpoint::new("127.0.0.1", 9000);
    let payload = vec![0u8; 1200];

    c.bench_function("queue_add_connected_1024", |b| {
        b.iter(|| {
            let mut queue = OutboundQueue::new();
            queue.set_connected(true);
            for _ in 0..1024 {
                queue.add(&payload, Some(&target)).unwrap();
            }
            queue.len()
        })
    });
}

criterion_group!(benches, resolve_format, queue_add, queue_add_connected);
criterion_main!(benches);
