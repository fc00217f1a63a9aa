//! # Event Reactor
//!
//! Turns one raw log into at most one state machine call:
//!
//! 1. Resolve topic 0 through the event table; unknown topics are skipped.
//! 2. Skip logs the dedup log already holds.
//! 3. Decode into a `ContractEvent` and dispatch it to the handler.
//! 4. Record the log as processed whether or not step 3 succeeded, so a log
//!    that can never be handled does not stall the listener.

use crate::domain::{ContractEvent, EventTable, RawLog};
use crate::ports::EventLog;
use cn_02_channel_engine::{ChannelError, ChannelEventHandler};
use shared_types::BlockchainId;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What happened to a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutcome {
    /// Topic not in the table; nothing recorded
    Ignored,
    /// Already recorded; nothing done
    Duplicate,
    /// Decoded and applied
    Applied,
    /// Decoded; the event family has no state machine behaviour yet
    Unhandled,
    /// Decode or handler failure; still recorded
    Failed,
}

/// Decoder and dispatcher for one contract on one chain.
pub struct EventReactor<H: ChannelEventHandler + ?Sized, L: EventLog + ?Sized> {
    blockchain_id: BlockchainId,
    table: Arc<EventTable>,
    handler: Arc<H>,
    event_log: Arc<L>,
}

impl<H: ChannelEventHandler + ?Sized, L: EventLog + ?Sized> EventReactor<H, L> {
    /// Create a reactor sharing `table`, `handler` and `event_log`.
    pub fn new(
        blockchain_id: BlockchainId,
        table: Arc<EventTable>,
        handler: Arc<H>,
        event_log: Arc<L>,
    ) -> Self {
        Self {
            blockchain_id,
            table,
            handler,
            event_log,
        }
    }

    /// Chain this reactor records under.
    pub fn blockchain_id(&self) -> BlockchainId {
        self.blockchain_id
    }

    /// Dedup log this reactor records into.
    pub fn event_log(&self) -> &Arc<L> {
        &self.event_log
    }

    /// Process one log.
    pub fn handle_log(&self, log: &RawLog) -> LogOutcome {
        let Some(kind) = log.topic0().and_then(|t| self.table.lookup(t)) else {
            warn!(
                block_number = log.block_number,
                tx_hash = %log.transaction_hash,
                log_index = log.log_index,
                topic = ?log.topic0(),
                "[cn-03] Unknown event topic, ignoring log"
            );
            return LogOutcome::Ignored;
        };

        let key = log.key(self.blockchain_id);
        match self.event_log.is_processed(&key) {
            Ok(true) => {
                debug!(
                    event = kind.name(),
                    block_number = log.block_number,
                    log_index = log.log_index,
                    "[cn-03] Log already processed, skipping"
                );
                return LogOutcome::Duplicate;
            }
            Ok(false) => {}
            Err(e) => {
                error!(
                    error = %e,
                    event = kind.name(),
                    block_number = log.block_number,
                    log_index = log.log_index,
                    "[cn-03] Dedup lookup failed, processing anyway"
                );
            }
        }

        let outcome = match ContractEvent::decode(kind, log) {
            Ok(event) => match event.dispatch(self.handler.as_ref()) {
                Ok(()) => LogOutcome::Applied,
                Err(ChannelError::NotImplemented(family)) => {
                    info!(
                        event = kind.name(),
                        family,
                        tx_hash = %log.transaction_hash,
                        "[cn-03] No state change defined for event"
                    );
                    LogOutcome::Unhandled
                }
                Err(e) => {
                    error!(
                        error = %e,
                        event = kind.name(),
                        block_number = log.block_number,
                        tx_hash = %log.transaction_hash,
                        log_index = log.log_index,
                        "[cn-03] Handler failed"
                    );
                    LogOutcome::Failed
                }
            },
            Err(e) => {
                error!(
                    error = %e,
                    block_number = log.block_number,
                    tx_hash = %log.transaction_hash,
                    log_index = log.log_index,
                    "[cn-03] Failed to decode log"
                );
                LogOutcome::Failed
            }
        };

        if let Err(e) = self
            .event_log
            .record(log.to_record(self.blockchain_id, kind.name()))
        {
            error!(
                error = %e,
                event = kind.name(),
                block_number = log.block_number,
                log_index = log.log_index,
                "[cn-03] Failed to record processed event"
            );
        }

        info!(
            event = kind.name(),
            block_number = log.block_number,
            tx_hash = %log.transaction_hash,
            log_index = log.log_index,
            "[cn-03] Processed event"
        );
        outcome
    }
}
