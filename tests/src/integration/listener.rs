//! # Listener End to End
//!
//! Backfill, live delivery and restart over `MockChainClient`, with the
//! real reactor, state machine and dedup log behind it.

use super::fixtures::{channel_id, contract, reactor, seed_channel, LogFactory, CHAIN};
use cn_02_channel_engine::MemoryStore;
use cn_03_event_ingestion::domain::contract::{
    ChannelChallenged, ChannelCheckpointed, ChannelClosed,
};
use cn_03_event_ingestion::{EventListener, ListenerConfig, ListenerError, MockChainClient};
use shared_types::{ChannelStatus, ChannelType};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

fn config(start_block: u64) -> ListenerConfig {
    ListenerConfig {
        blockchain_id: CHAIN,
        contract_address: contract(),
        start_block,
        block_step: 50,
        max_backoff_retries: 4,
        ..Default::default()
    }
}

fn start(
    config: ListenerConfig,
    client: &Arc<MockChainClient>,
    store: &MemoryStore,
) -> (CancellationToken, JoinHandle<Result<(), ListenerError>>) {
    let listener = EventListener::new(config, client.clone(), reactor(store)).unwrap();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(listener.run(cancel.clone()));
    (cancel, handle)
}

async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..2_000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

#[tokio::test(start_paused = true)]
async fn test_backfill_then_live_then_restart() {
    let id = channel_id(0x61);
    let store = MemoryStore::new();
    seed_channel(&store, id, ChannelType::Home, ChannelStatus::Open, 1);

    let client = Arc::new(MockChainClient::new(220));
    let logs = LogFactory::new(contract(), 0);
    client.push_log(logs.at(&ChannelCheckpointed { channelId: id, stateVersion: 2 }, 110, 0));
    client.push_log(logs.at(&ChannelCheckpointed { channelId: id, stateVersion: 3 }, 175, 2));
    client.push_log(logs.at(
        &ChannelChallenged { channelId: id, stateVersion: 4, challengeExpiry: 1_900_000_000 },
        219,
        0,
    ));

    // First run: seeded backfill, then one live event.
    let (cancel, handle) = start(config(100), &client, &store);
    wait_until(|| store.contract_events().len() == 3).await;
    assert_eq!(
        client.filter_calls(),
        vec![(100, 149), (150, 199), (200, 220)]
    );
    assert_eq!(store.channel(&id).unwrap().status, ChannelStatus::Challenged);

    wait_until(|| client.subscription_count() == 1).await;
    let cure = logs.at(&ChannelCheckpointed { channelId: id, stateVersion: 5 }, 221, 0);
    client.push_log(cure.clone());
    client.emit_live(cure);
    wait_until(|| store.contract_events().len() == 4).await;

    cancel.cancel();
    assert_eq!(handle.await.unwrap(), Ok(()));
    let channel = store.channel(&id).unwrap();
    assert_eq!(channel.status, ChannelStatus::Open);
    assert_eq!(channel.state_version, 5);

    // Restart: resumes at block 221, replays nothing, picks up the close.
    client.set_head(230);
    client.push_log(logs.at(&ChannelClosed { channelId: id, stateVersion: 6 }, 225, 0));

    let (cancel, handle) = start(config(100), &client, &store);
    wait_until(|| store.contract_events().len() == 5).await;
    cancel.cancel();
    assert_eq!(handle.await.unwrap(), Ok(()));

    assert_eq!(client.filter_calls().last(), Some(&(221, 230)));
    let channel = store.channel(&id).unwrap();
    assert_eq!(channel.status, ChannelStatus::Closed);
    assert_eq!(channel.state_version, 6);
}

#[tokio::test(start_paused = true)]
async fn test_provider_outage_exhausts_backoff() {
    let store = MemoryStore::new();
    let client = Arc::new(MockChainClient::new(500));
    client.fail_next_filters(u32::MAX);

    let (_cancel, handle) = start(config(400), &client, &store);
    let result = handle.await.unwrap();

    assert_eq!(result, Err(ListenerError::BackoffExhausted { retries: 4 }));
    assert!(client.filter_calls().iter().all(|call| *call == (400, 449)));
    assert!(store.contract_events().is_empty());
}
