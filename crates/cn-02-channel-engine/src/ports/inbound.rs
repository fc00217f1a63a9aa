//! # Inbound Ports
//!
//! One method per on-chain event family. Families without state machine
//! behaviour keep the default body, which reports `NotImplemented` so a
//! placeholder is never mistaken for a finished handler.

use crate::domain::{
    ChannelChallengedEvent, ChannelError, ChannelMigratedEvent, ChannelVersionEvent,
    EscrowDepositsPurgedEvent, FundsMovedEvent,
};

/// Channel event handler - inbound port.
pub trait ChannelEventHandler: Send + Sync {
    /// Home channel opened on-chain.
    fn handle_home_channel_created(&self, event: &ChannelVersionEvent)
        -> Result<(), ChannelError>;

    /// Home channel state checkpointed.
    fn handle_home_channel_checkpointed(
        &self,
        event: &ChannelVersionEvent,
    ) -> Result<(), ChannelError>;

    /// Home channel challenged.
    fn handle_home_channel_challenged(
        &self,
        event: &ChannelChallengedEvent,
    ) -> Result<(), ChannelError>;

    /// Home channel closed.
    fn handle_home_channel_closed(&self, event: &ChannelVersionEvent) -> Result<(), ChannelError>;

    /// Escrow deposit locked.
    fn handle_escrow_deposit_initiated(
        &self,
        event: &ChannelVersionEvent,
    ) -> Result<(), ChannelError>;

    /// Escrow deposit challenged.
    fn handle_escrow_deposit_challenged(
        &self,
        event: &ChannelChallengedEvent,
    ) -> Result<(), ChannelError>;

    /// Escrow deposit released.
    fn handle_escrow_deposit_finalized(
        &self,
        event: &ChannelVersionEvent,
    ) -> Result<(), ChannelError>;

    /// Escrow withdrawal locked.
    fn handle_escrow_withdrawal_initiated(
        &self,
        event: &ChannelVersionEvent,
    ) -> Result<(), ChannelError>;

    /// Escrow withdrawal challenged.
    fn handle_escrow_withdrawal_challenged(
        &self,
        event: &ChannelChallengedEvent,
    ) -> Result<(), ChannelError>;

    /// Escrow withdrawal released.
    fn handle_escrow_withdrawal_finalized(
        &self,
        event: &ChannelVersionEvent,
    ) -> Result<(), ChannelError>;

    /// Home channel arrived from another chain.
    fn handle_home_channel_migrated_in(
        &self,
        _event: &ChannelMigratedEvent,
    ) -> Result<(), ChannelError> {
        Err(ChannelError::NotImplemented("home_channel_migrated_in"))
    }

    /// Home channel left for another chain.
    fn handle_home_channel_migrated_out(
        &self,
        _event: &ChannelMigratedEvent,
    ) -> Result<(), ChannelError> {
        Err(ChannelError::NotImplemented("home_channel_migrated_out"))
    }

    /// Direct vault deposit.
    fn handle_funds_deposited(&self, _event: &FundsMovedEvent) -> Result<(), ChannelError> {
        Err(ChannelError::NotImplemented("funds_deposited"))
    }

    /// Direct vault withdrawal.
    fn handle_funds_withdrawn(&self, _event: &FundsMovedEvent) -> Result<(), ChannelError> {
        Err(ChannelError::NotImplemented("funds_withdrawn"))
    }

    /// Settled escrow deposits removed.
    fn handle_escrow_deposits_purged(
        &self,
        _event: &EscrowDepositsPurgedEvent,
    ) -> Result<(), ChannelError> {
        Err(ChannelError::NotImplemented("escrow_deposits_purged"))
    }
}
