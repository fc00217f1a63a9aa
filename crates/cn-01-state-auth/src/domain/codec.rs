//! # State Codec
//!
//! Canonical byte encoding of a channel state as the adjudicator contract
//! sees it:
//!
//! ```text
//! (bytes32 channelId, uint8 intent, uint256 version, bytes data, Allocation[] allocations)
//! Allocation = (address destination, address token, uint256 amount)
//! ```
//!
//! The output is the Solidity ABI encoding of the tuple as function
//! parameters. Field order and widths are fixed: the same bytes are hashed
//! off-chain for signing and re-derived on-chain during disputes.

use crate::domain::errors::CodecError;
use alloy_primitives::{Bytes, B256, U256};
use alloy_sol_types::{sol, sol_data, SolType};
use serde::{Deserialize, Serialize};

sol! {
    /// One balance entry of a channel state.
    #[derive(Debug, PartialEq, Eq)]
    struct Allocation {
        address destination;
        address token;
        uint256 amount;
    }
}

/// Purpose of a signed state. Values are wire-visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Intent {
    /// Regular off-chain update
    #[default]
    Operate = 0,
    /// Funding state of a new channel
    Initialize = 1,
    /// Change of channel capacity
    Resize = 2,
    /// Final state for cooperative close
    Finalize = 3,
}

impl Intent {
    /// Wire value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Intent {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Operate),
            1 => Ok(Self::Initialize),
            2 => Ok(Self::Resize),
            3 => Ok(Self::Finalize),
            other => Err(CodecError::UnknownIntent(other)),
        }
    }
}

/// The signable part of a channel state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedState {
    /// On-chain channel identifier
    pub channel_id: B256,
    /// Purpose of the state
    pub intent: Intent,
    /// Monotonic state version
    pub version: U256,
    /// Application data, opaque to the codec
    pub data: Bytes,
    /// Balance entries
    pub allocations: Vec<Allocation>,
}

impl UnsignedState {
    /// Canonical encoding used for hashing and signing.
    pub fn encode(&self) -> Vec<u8> {
        encode_state(
            self.channel_id,
            self.intent,
            self.version,
            &self.data,
            &self.allocations,
        )
    }
}

/// Encode a state tuple.
pub fn encode_state(
    channel_id: B256,
    intent: Intent,
    version: U256,
    data: &Bytes,
    allocations: &[Allocation],
) -> Vec<u8> {
    <(
        sol_data::FixedBytes<32>,
        sol_data::Uint<8>,
        sol_data::Uint<256>,
        sol_data::Bytes,
        sol_data::Array<Allocation>,
    ) as SolType>::abi_encode_params(&(
        channel_id,
        intent.as_u8(),
        version,
        data.clone(),
        allocations.to_vec(),
    ))
}
