//! # Settlement Core Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | cn-01 State Auth | Encode + hash, sign, quorum verify |
//! | cn-03 Event Ingestion | Reactor decode + dispatch + dedup record |

use alloy_primitives::{Address, Bytes, U256};
use cn_01_state_auth::{
    sign_state, state_hash, verify_quorum, Allocation, Intent, QuorumPolicy, UnsignedState,
};
use cn_02_channel_engine::MemoryStore;
use cn_03_event_ingestion::domain::contract::ChannelCheckpointed;
use cn_tests::integration::fixtures::{channel_id, contract, reactor, seed_channel, LogFactory};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_crypto::PrivateKey;
use shared_types::{ChannelStatus, ChannelType};
use std::time::Duration;

fn state(allocations: usize) -> UnsignedState {
    UnsignedState {
        channel_id: channel_id(1),
        intent: Intent::Operate,
        version: U256::from(42u64),
        data: Bytes::from_static(b"app-data"),
        allocations: (0..allocations)
            .map(|i| Allocation {
                destination: Address::repeat_byte(i as u8),
                token: Address::repeat_byte(0x70),
                amount: U256::from(i as u64 * 1_000),
            })
            .collect(),
    }
}

// ============================================================================
// CN-01: State Authentication
// ============================================================================

fn bench_state_auth(c: &mut Criterion) {
    let mut group = c.benchmark_group("cn-01-state-auth");
    group.measurement_time(Duration::from_secs(5));

    for allocations in [2, 16, 128] {
        let state = state(allocations);
        group.bench_with_input(
            BenchmarkId::new("encode_and_hash", allocations),
            &state,
            |b, state| b.iter(|| black_box(state_hash(state))),
        );
    }

    let key = PrivateKey::from_slice(&[0x11; 32]).expect("valid key");
    let state = state(2);
    group.bench_function("sign_state", |b| {
        b.iter(|| black_box(sign_state(&state, &key).expect("signs")))
    });

    let nodes: Vec<PrivateKey> = (0x21..0x24u8)
        .map(|b| PrivateKey::from_slice(&[b; 32]).expect("valid key"))
        .collect();
    let policy =
        QuorumPolicy::new(nodes.iter().map(|k| (k.address(), 1)), 2).expect("reachable");
    let signatures: Vec<Vec<u8>> = nodes
        .iter()
        .map(|k| sign_state(&state, k).expect("signs").to_wire().to_vec())
        .collect();
    group.throughput(Throughput::Elements(signatures.len() as u64));
    group.bench_function("verify_quorum_3_signers", |b| {
        b.iter(|| black_box(verify_quorum(&state, &signatures, &policy).expect("recovers")))
    });

    group.finish();
}

// ============================================================================
// CN-03: Event Reactor
// ============================================================================

fn bench_reactor(c: &mut Criterion) {
    let mut group = c.benchmark_group("cn-03-event-reactor");
    group.measurement_time(Duration::from_secs(5));

    let store = MemoryStore::new();
    let id = channel_id(0x42);
    seed_channel(&store, id, ChannelType::Home, ChannelStatus::Open, 0);
    let reactor = reactor(&store);
    let logs = LogFactory::new(contract(), 0);

    let mut block = 0u64;
    group.throughput(Throughput::Elements(1));
    group.bench_function("checkpoint_log", |b| {
        b.iter(|| {
            block += 1;
            let log = logs.at(
                &ChannelCheckpointed {
                    channelId: id,
                    stateVersion: block,
                },
                block,
                0,
            );
            black_box(reactor.handle_log(&log))
        })
    });

    let duplicate = logs.at(
        &ChannelCheckpointed {
            channelId: id,
            stateVersion: 1,
        },
        1,
        0,
    );
    group.bench_function("duplicate_log", |b| {
        b.iter(|| black_box(reactor.handle_log(&duplicate)))
    });

    group.finish();
}

criterion_group!(benches, bench_state_auth, bench_reactor);
criterion_main!(benches);
