//! # Listener Wiring
//!
//! One `EventListener` per configured contract, all feeding the same
//! channel engine and dedup log. Listeners share nothing mutable except the
//! store; a listener that dies does not stop the others.
//!
//! ## Shutdown Sequence
//!
//! 1. Shutdown signal fires (Ctrl+C in the binary)
//! 2. The shared cancellation token is cancelled
//! 3. Listeners drain, bounded by `SHUTDOWN_GRACE`
//! 4. Stragglers are aborted

use crate::config::NodeConfig;
use cn_02_channel_engine::{ChannelService, StoreTxProvider};
use cn_03_event_ingestion::{
    ChainClient, EventListener, EventReactor, EventTable, ListenerError, StoreEventLog,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Time listeners get to stop after cancellation.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// How a runtime run ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Listeners that stopped on cancellation.
    pub stopped: usize,
    /// Listeners that terminated with an error.
    pub failed: Vec<ListenerError>,
}

/// The settlement node: chain client, store and listener set.
pub struct NodeRuntime<C: ChainClient + ?Sized + 'static, P: StoreTxProvider + 'static> {
    config: NodeConfig,
    client: Arc<C>,
    store: P,
}

impl<C, P> NodeRuntime<C, P>
where
    C: ChainClient + ?Sized + 'static,
    P: StoreTxProvider + Clone + 'static,
{
    /// Assemble the runtime. `config` must already be validated.
    pub fn new(config: NodeConfig, client: Arc<C>, store: P) -> Self {
        Self {
            config,
            client,
            store,
        }
    }

    /// Node configuration.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Run every listener until `shutdown` resolves or all of them end.
    pub async fn run<S>(self, shutdown: S) -> Result<RunSummary, ListenerError>
    where
        S: Future<Output = ()>,
    {
        let cancel = CancellationToken::new();
        let table = Arc::new(EventTable::new());
        let handler = Arc::new(ChannelService::new(self.store.clone()));
        let event_log = Arc::new(StoreEventLog::new(self.store.clone()));

        let mut prepared = Vec::new();
        for listener_config in self.config.listener_configs() {
            let reactor = EventReactor::new(
                listener_config.blockchain_id,
                table.clone(),
                handler.clone(),
                event_log.clone(),
            );
            prepared.push(EventListener::new(
                listener_config,
                self.client.clone(),
                reactor,
            )?);
        }

        let mut listeners = JoinSet::new();
        for listener in prepared {
            info!(
                contract = %listener.config().contract_address,
                blockchain_id = self.config.blockchain_id,
                "Spawning event listener"
            );
            listeners.spawn(listener.run(cancel.clone()));
        }
        info!(
            listeners = listeners.len(),
            table_size = table.len(),
            "All listeners started"
        );

        let mut summary = RunSummary::default();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
                joined = listeners.join_next() => match joined {
                    Some(result) => record(&mut summary, result),
                    None => {
                        warn!("Every listener has stopped");
                        break;
                    }
                },
            }
        }

        cancel.cancel();
        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while let Some(result) = listeners.join_next().await {
                record(&mut summary, result);
            }
        })
        .await;
        if drained.is_err() {
            warn!(
                remaining = listeners.len(),
                "Listeners did not stop in time, aborting"
            );
            listeners.abort_all();
        }

        info!(
            stopped = summary.stopped,
            failed = summary.failed.len(),
            "Shutdown complete"
        );
        Ok(summary)
    }
}

fn record(
    summary: &mut RunSummary,
    result: Result<Result<(), ListenerError>, tokio::task::JoinError>,
) {
    match result {
        Ok(Ok(())) => summary.stopped += 1,
        Ok(Err(e)) => {
            error!(error = %e, "Event listener terminated");
            summary.failed.push(e);
        }
        Err(e) => {
            error!(error = %e, "Event listener task failed");
            summary.failed.push(ListenerError::Task(e.to_string()));
        }
    }
}
