//! # Event Listener
//!
//! Delivers every log of one contract on one chain to the reactor at least
//! once.
//!
//! ## Phases
//!
//! ```text
//!   historical task ──(cap 1)──┐
//!                              ├──> dispatch loop ──> EventReactor
//!   subscription pump ─(cap N)─┘         ^
//!          │                             │
//!          └──── subscription end ───────┘ (re-subscribe)
//! ```
//!
//! - **Historical**: from the last recorded `(block, index)` to the head at
//!   start, in `block_step` windows. The boundary block is re-scanned and
//!   positions at or below the resume point are skipped. A failed window is
//!   retried as-is after a backoff.
//! - **Live**: push subscription without topic filter. A broken or closed
//!   subscription is replaced without touching the backoff counter; a
//!   failed subscribe attempt backs off, a successful one resets it.
//!
//! The dispatch loop is the only caller of the reactor, so handlers for one
//! contract never run concurrently. Live and historical streams are not
//! ordered against each other; the reactor's dedup and the state machine's
//! version checks absorb the overlap.

use crate::domain::{IngestionError, ListenerConfig, ListenerError, RawLog};
use crate::ports::{ChainClient, EventLog, LogSubscription};
use crate::service::backoff::Backoff;
use crate::service::reactor::EventReactor;
use alloy_primitives::Address;
use cn_02_channel_engine::ChannelEventHandler;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Where backfill starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePoint {
    /// Continue after a recorded `(block, index)`
    After {
        /// Block of the last recorded log
        block: u64,
        /// Index of the last recorded log
        index: u64,
    },
    /// Nothing recorded; backfill from a configured block
    From {
        /// First block to scan
        block: u64,
    },
    /// Nothing recorded and no start block; live only
    LiveOnly,
}

impl ResumePoint {
    fn first_block(self) -> Option<u64> {
        match self {
            ResumePoint::After { block, .. } | ResumePoint::From { block } => Some(block),
            ResumePoint::LiveOnly => None,
        }
    }

    fn skip_through(self) -> Option<(u64, u64)> {
        match self {
            ResumePoint::After { block, index } => Some((block, index)),
            _ => None,
        }
    }
}

/// Why a subscription stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SubscriptionEnd {
    Failed(String),
    Closed,
}

/// Listener for one contract on one chain.
pub struct EventListener<C, H, L>
where
    C: ChainClient + ?Sized + 'static,
    H: ChannelEventHandler + ?Sized,
    L: EventLog + ?Sized,
{
    config: ListenerConfig,
    client: Arc<C>,
    reactor: EventReactor<H, L>,
}

impl<C, H, L> EventListener<C, H, L>
where
    C: ChainClient + ?Sized + 'static,
    H: ChannelEventHandler + ?Sized,
    L: EventLog + ?Sized,
{
    /// Create a listener. The reactor must record under the same chain.
    pub fn new(
        config: ListenerConfig,
        client: Arc<C>,
        reactor: EventReactor<H, L>,
    ) -> Result<Self, ListenerError> {
        config.validate()?;
        if reactor.blockchain_id() != config.blockchain_id {
            return Err(ListenerError::InvalidConfig(format!(
                "reactor chain {} does not match listener chain {}",
                reactor.blockchain_id(),
                config.blockchain_id
            )));
        }
        Ok(Self {
            config,
            client,
            reactor,
        })
    }

    /// Listener settings.
    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Read the dedup high-water mark.
    pub fn resume_point(&self) -> Result<ResumePoint, ListenerError> {
        let latest = self
            .reactor
            .event_log()
            .latest_position(&self.config.contract_address, self.config.blockchain_id)
            .map_err(ListenerError::Resume)?;

        Ok(match latest {
            Some((block, index)) if block > 0 => ResumePoint::After { block, index },
            _ if self.config.start_block > 0 => ResumePoint::From {
                block: self.config.start_block,
            },
            _ => ResumePoint::LiveOnly,
        })
    }

    /// Run until `cancel` fires or the backoff budget runs out.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), ListenerError> {
        let contract = self.config.contract_address;
        let resume = self.resume_point()?;
        info!(
            contract = %contract,
            blockchain_id = self.config.blockchain_id,
            resume = ?resume,
            "[cn-03] Starting event listener"
        );

        let tasks = cancel.child_token();
        let backoff = Backoff::new(self.config.max_backoff_retries, self.config.backoff_unit);

        let (hist_tx, mut hist_rx) = mpsc::channel(self.config.historical_buffer);
        let (live_tx, mut live_rx) = mpsc::channel(self.config.live_buffer);
        let (end_tx, mut end_rx) = mpsc::channel(1);

        let mut historical = match resume.first_block() {
            Some(from_block) => Some(tokio::spawn(reconcile_history(HistoryJob {
                client: self.client.clone(),
                contract,
                from_block,
                skip_through: resume.skip_through(),
                block_step: self.config.block_step,
                request_timeout: self.config.request_timeout,
                backoff: backoff.clone(),
                tx: hist_tx,
                cancel: tasks.clone(),
            }))),
            None => {
                info!(contract = %contract, "[cn-03] No resume point, skipping historical backfill");
                drop(hist_tx);
                None
            }
        };
        let mut hist_open = historical.is_some();

        let mut pump = match self.subscribe(&backoff, &tasks, &live_tx, &end_tx).await {
            Ok(pump) => pump,
            Err(e) => {
                tasks.cancel();
                return Err(e);
            }
        };

        let result = loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(contract = %contract, "[cn-03] Event listener cancelled");
                    break Ok(());
                }
                maybe = hist_rx.recv(), if hist_open => match maybe {
                    Some(log) => {
                        self.reactor.handle_log(&log);
                    }
                    None => hist_open = false,
                },
                Some(log) = live_rx.recv() => {
                    self.reactor.handle_log(&log);
                }
                Some(end) = end_rx.recv() => {
                    match end {
                        SubscriptionEnd::Failed(reason) => warn!(
                            contract = %contract,
                            reason = %reason,
                            "[cn-03] Subscription failed, re-subscribing"
                        ),
                        SubscriptionEnd::Closed => info!(
                            contract = %contract,
                            "[cn-03] Subscription closed, re-subscribing"
                        ),
                    }
                    match self.subscribe(&backoff, &tasks, &live_tx, &end_tx).await {
                        Ok(next) => pump = next,
                        Err(e) => break Err(e),
                    }
                }
                joined = join_optional(&mut historical) => {
                    historical = None;
                    match joined {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => break Err(e),
                        Err(e) => break Err(ListenerError::Task(e.to_string())),
                    }
                }
            }
        };

        tasks.cancel();
        if let Some(handle) = pump {
            handle.abort();
        }
        if let Err(e) = &result {
            error!(contract = %contract, error = %e, "[cn-03] Event listener stopped");
        }
        result
    }

    async fn subscribe(
        &self,
        backoff: &Backoff,
        cancel: &CancellationToken,
        live_tx: &mpsc::Sender<RawLog>,
        end_tx: &mpsc::Sender<SubscriptionEnd>,
    ) -> Result<Option<JoinHandle<()>>, ListenerError> {
        let contract = self.config.contract_address;
        loop {
            if cancel.is_cancelled() {
                return Ok(None);
            }
            let attempt = with_timeout(
                self.config.request_timeout,
                self.client.subscribe_logs(contract),
            )
            .await;
            match attempt {
                Ok(subscription) => {
                    backoff.reset();
                    info!(contract = %contract, "[cn-03] Subscribed to live logs");
                    return Ok(Some(tokio::spawn(pump_subscription(
                        subscription,
                        live_tx.clone(),
                        end_tx.clone(),
                        cancel.clone(),
                    ))));
                }
                Err(e) => {
                    warn!(contract = %contract, error = %e, "[cn-03] Failed to subscribe");
                    backoff.wait(cancel).await?;
                }
            }
        }
    }
}

async fn join_optional<T>(handle: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
    match handle {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

async fn with_timeout<T>(
    limit: Duration,
    request: impl Future<Output = Result<T, IngestionError>>,
) -> Result<T, IngestionError> {
    tokio::time::timeout(limit, request)
        .await
        .map_err(|_| IngestionError::Timeout(limit))?
}

async fn pump_subscription(
    mut subscription: LogSubscription,
    live_tx: mpsc::Sender<RawLog>,
    end_tx: mpsc::Sender<SubscriptionEnd>,
    cancel: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return,
            next = subscription.next() => next,
        };
        let end = match next {
            Some(Ok(log)) => {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    sent = live_tx.send(log) => {
                        if sent.is_err() {
                            return;
                        }
                    }
                }
                continue;
            }
            Some(Err(e)) => SubscriptionEnd::Failed(e.to_string()),
            None => SubscriptionEnd::Closed,
        };
        let _ = end_tx.send(end).await;
        return;
    }
}

/// Inputs of one historical reconciliation run.
struct HistoryJob<C: ChainClient + ?Sized> {
    client: Arc<C>,
    contract: Address,
    from_block: u64,
    skip_through: Option<(u64, u64)>,
    block_step: u64,
    request_timeout: Duration,
    backoff: Backoff,
    tx: mpsc::Sender<RawLog>,
    cancel: CancellationToken,
}

async fn reconcile_history<C>(job: HistoryJob<C>) -> Result<(), ListenerError>
where
    C: ChainClient + ?Sized,
{
    let head = loop {
        if job.cancel.is_cancelled() {
            return Ok(());
        }
        match with_timeout(job.request_timeout, job.client.block_number()).await {
            Ok(head) => break head,
            Err(e) => {
                warn!(contract = %job.contract, error = %e, "[cn-03] Failed to fetch head block");
                job.backoff.wait(&job.cancel).await?;
            }
        }
    };

    info!(
        contract = %job.contract,
        from_block = job.from_block,
        head,
        "[cn-03] Reconciling historical logs"
    );

    let mut from = job.from_block;
    while from <= head {
        if job.cancel.is_cancelled() {
            return Ok(());
        }
        let to = from.saturating_add(job.block_step - 1).min(head);

        // TODO: split the window on repeated failures instead of retrying it whole
        let logs = match with_timeout(
            job.request_timeout,
            job.client.filter_logs(job.contract, from, to),
        )
        .await
        {
            Ok(logs) => logs,
            Err(e) => {
                warn!(
                    contract = %job.contract,
                    from_block = from,
                    to_block = to,
                    error = %e,
                    "[cn-03] Range query failed, retrying window"
                );
                job.backoff.wait(&job.cancel).await?;
                continue;
            }
        };

        let mut logs = logs;
        logs.sort_by_key(RawLog::position);
        let mut delivered = 0usize;
        for log in logs {
            if job
                .skip_through
                .is_some_and(|last| log.position() <= last)
            {
                continue;
            }
            tokio::select! {
                _ = job.cancel.cancelled() => return Ok(()),
                sent = job.tx.send(log) => {
                    if sent.is_err() {
                        return Ok(());
                    }
                }
            }
            delivered += 1;
        }
        debug!(
            contract = %job.contract,
            from_block = from,
            to_block = to,
            delivered,
            "[cn-03] Historical window done"
        );

        match to.checked_add(1) {
            Some(next) => from = next,
            None => break,
        }
    }

    info!(contract = %job.contract, head, "[cn-03] Historical reconciliation complete");
    Ok(())
}
