//! # Channel Engine Service
//!
//! Applies decoded chain events to persisted channels.
//!
//! ## Transition Table
//!
//! | Event | From | To | Version |
//! |-------|------|----|---------|
//! | Created / Initiated | Void | Open | max(stored, event) |
//! | Checkpointed | Open | Open | event |
//! | Checkpointed | Challenged | Open | event (cure) |
//! | Challenged | Open, Challenged | Challenged | event, or stored if the event is stale |
//! | Closed / Finalized | any but Closed | Closed | event |
//!
//! Every handler runs inside one store transaction. A missing channel, a
//! channel of the other type or a closed channel is logged and skipped; only
//! store failures and an unrepresentable expiry surface as errors.

use crate::domain::{ChannelChallengedEvent, ChannelError, ChannelVersionEvent};
use crate::ports::{ChannelEventHandler, Store, StoreTxProvider};
use chrono::{DateTime, Utc};
use shared_types::{Channel, ChannelId, ChannelStatus, ChannelType, CheckpointAction};
use tracing::{debug, info, warn};

/// Chain-observed action against one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainAction {
    Open,
    Checkpoint,
    Challenge { expiry: u64 },
    Close,
}

impl ChainAction {
    fn name(self) -> &'static str {
        match self {
            ChainAction::Open => "open",
            ChainAction::Checkpoint => "checkpoint",
            ChainAction::Challenge { .. } => "challenge",
            ChainAction::Close => "close",
        }
    }
}

/// Channel state machine over a transactional store.
pub struct ChannelService<P: StoreTxProvider> {
    store: P,
}

impl<P: StoreTxProvider> ChannelService<P> {
    /// Create a service over `store`.
    pub fn new(store: P) -> Self {
        Self { store }
    }

    /// Underlying store provider.
    pub fn store(&self) -> &P {
        &self.store
    }

    fn apply(
        &self,
        expected: ChannelType,
        channel_id: ChannelId,
        version: u64,
        action: ChainAction,
    ) -> Result<(), ChannelError> {
        self.store.transact(|store| {
            let Some(mut channel) = store.get_channel_by_id(&channel_id)? else {
                warn!(
                    channel_id = %channel_id,
                    action = action.name(),
                    "[cn-02] Channel not found, ignoring event"
                );
                return Ok(());
            };

            if channel.channel_type != expected {
                warn!(
                    channel_id = %channel_id,
                    expected = ?expected,
                    actual = ?channel.channel_type,
                    "[cn-02] Channel type mismatch, ignoring event"
                );
                return Ok(());
            }

            if channel.status.is_terminal() {
                info!(
                    channel_id = %channel_id,
                    action = action.name(),
                    "[cn-02] Channel already closed, ignoring event"
                );
                return Ok(());
            }

            let now = Utc::now();
            let changed = match action {
                ChainAction::Open => open(&mut channel, version),
                ChainAction::Checkpoint => checkpoint(&mut channel, version),
                ChainAction::Challenge { expiry } => {
                    challenge(store, &mut channel, version, expiry, now)?
                }
                ChainAction::Close => close(&mut channel, version),
            };

            if changed {
                channel.updated_at = now;
                store.update_channel(&channel)?;
                info!(
                    channel_id = %channel_id,
                    status = %channel.status,
                    state_version = channel.state_version,
                    "[cn-02] Channel updated on {}",
                    action.name()
                );
            }
            Ok(())
        })
    }
}

fn open(channel: &mut Channel, version: u64) -> bool {
    if channel.status != ChannelStatus::Void {
        debug!(
            channel_id = %channel.channel_id,
            status = %channel.status,
            "[cn-02] Channel already opened"
        );
        return false;
    }
    channel.status = ChannelStatus::Open;
    channel.state_version = channel.state_version.max(version);
    true
}

fn checkpoint(channel: &mut Channel, version: u64) -> bool {
    match channel.status {
        ChannelStatus::Void => {
            warn!(
                channel_id = %channel.channel_id,
                state_version = version,
                "[cn-02] Checkpoint on void channel, recording version only"
            );
        }
        ChannelStatus::Challenged => {
            channel.status = ChannelStatus::Open;
            channel.challenge_expires_at = None;
        }
        ChannelStatus::Open | ChannelStatus::Closed => {}
    }
    channel.state_version = version;
    true
}

fn challenge(
    store: &mut dyn Store,
    channel: &mut Channel,
    version: u64,
    expiry: u64,
    now: DateTime<Utc>,
) -> Result<bool, ChannelError> {
    if !channel.status.can_transition_to(ChannelStatus::Challenged) {
        warn!(
            channel_id = %channel.channel_id,
            status = %channel.status,
            "[cn-02] Challenge on channel that cannot be challenged, ignoring"
        );
        return Ok(false);
    }

    let expires_at = i64::try_from(expiry)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .ok_or(ChannelError::InvalidChallengeExpiry(expiry))?;

    if version < channel.state_version {
        warn!(
            channel_id = %channel.channel_id,
            challenged_version = version,
            stored_version = channel.state_version,
            "[cn-02] Challenge with stale state, scheduling checkpoint"
        );
        let state_id = store
            .get_last_channel_state(&channel.channel_id, true)?
            .map(|s| s.id);
        if state_id.is_none() {
            warn!(
                channel_id = %channel.channel_id,
                "[cn-02] No signed state held for stale challenge"
            );
        }
        store.schedule_checkpoint(CheckpointAction {
            channel_id: channel.channel_id,
            state_id,
            challenged_version: version,
            scheduled_at: now,
        })?;
    } else {
        channel.state_version = version;
    }

    channel.status = ChannelStatus::Challenged;
    channel.challenge_expires_at = Some(expires_at);
    Ok(true)
}

fn close(channel: &mut Channel, version: u64) -> bool {
    channel.status = ChannelStatus::Closed;
    channel.state_version = version;
    channel.challenge_expires_at = None;
    true
}

impl<P: StoreTxProvider> ChannelEventHandler for ChannelService<P> {
    fn handle_home_channel_created(
        &self,
        event: &ChannelVersionEvent,
    ) -> Result<(), ChannelError> {
        self.apply(
            ChannelType::Home,
            event.channel_id,
            event.state_version,
            ChainAction::Open,
        )
    }

    fn handle_home_channel_checkpointed(
        &self,
        event: &ChannelVersionEvent,
    ) -> Result<(), ChannelError> {
        self.apply(
            ChannelType::Home,
            event.channel_id,
            event.state_version,
            ChainAction::Checkpoint,
        )
    }

    fn handle_home_channel_challenged(
        &self,
        event: &ChannelChallengedEvent,
    ) -> Result<(), ChannelError> {
        self.apply(
            ChannelType::Home,
            event.channel_id,
            event.state_version,
            ChainAction::Challenge {
                expiry: event.challenge_expiry,
            },
        )
    }

    fn handle_home_channel_closed(&self, event: &ChannelVersionEvent) -> Result<(), ChannelError> {
        self.apply(
            ChannelType::Home,
            event.channel_id,
            event.state_version,
            ChainAction::Close,
        )
    }

    fn handle_escrow_deposit_initiated(
        &self,
        event: &ChannelVersionEvent,
    ) -> Result<(), ChannelError> {
        self.apply(
            ChannelType::Escrow,
            event.channel_id,
            event.state_version,
            ChainAction::Open,
        )
    }

    fn handle_escrow_deposit_challenged(
        &self,
        event: &ChannelChallengedEvent,
    ) -> Result<(), ChannelError> {
        self.apply(
            ChannelType::Escrow,
            event.channel_id,
            event.state_version,
            ChainAction::Challenge {
                expiry: event.challenge_expiry,
            },
        )
    }

    fn handle_escrow_deposit_finalized(
        &self,
        event: &ChannelVersionEvent,
    ) -> Result<(), ChannelError> {
        self.apply(
            ChannelType::Escrow,
            event.channel_id,
            event.state_version,
            ChainAction::Close,
        )
    }

    fn handle_escrow_withdrawal_initiated(
        &self,
        event: &ChannelVersionEvent,
    ) -> Result<(), ChannelError> {
        self.apply(
            ChannelType::Escrow,
            event.channel_id,
            event.state_version,
            ChainAction::Open,
        )
    }

    fn handle_escrow_withdrawal_challenged(
        &self,
        event: &ChannelChallengedEvent,
    ) -> Result<(), ChannelError> {
        self.apply(
            ChannelType::Escrow,
            event.channel_id,
            event.state_version,
            ChainAction::Challenge {
                expiry: event.challenge_expiry,
            },
        )
    }

    fn handle_escrow_withdrawal_finalized(
        &self,
        event: &ChannelVersionEvent,
    ) -> Result<(), ChannelError> {
        self.apply(
            ChannelType::Escrow,
            event.channel_id,
            event.state_version,
            ChainAction::Close,
        )
    }
}
