//! # Quorum Policy
//!
//! Network signatures over a state count toward a weighted threshold. Each
//! signer counts once no matter how many of its signatures are attached;
//! addresses outside the policy contribute nothing.

use crate::domain::errors::CodecError;
use alloy_primitives::Address;
use std::collections::{BTreeMap, BTreeSet};

/// Weighted signer set with a threshold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuorumPolicy {
    weights: BTreeMap<Address, u64>,
    threshold: u64,
}

impl QuorumPolicy {
    /// Build a policy. The threshold must be reachable and non-zero.
    pub fn new(
        weights: impl IntoIterator<Item = (Address, u64)>,
        threshold: u64,
    ) -> Result<Self, CodecError> {
        let weights: BTreeMap<Address, u64> = weights.into_iter().collect();
        let total_weight = weights.values().fold(0u64, |acc, w| acc.saturating_add(*w));

        if threshold == 0 || threshold > total_weight {
            return Err(CodecError::InvalidQuorumPolicy {
                threshold,
                total_weight,
            });
        }

        Ok(Self { weights, threshold })
    }

    /// Required weight.
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Weight of one signer (0 if unknown).
    pub fn weight_of(&self, signer: &Address) -> u64 {
        self.weights.get(signer).copied().unwrap_or(0)
    }

    /// Sum the weight of distinct known signers.
    pub fn tally<'a>(&self, signers: impl IntoIterator<Item = &'a Address>) -> QuorumOutcome {
        let counted: BTreeSet<Address> = signers
            .into_iter()
            .filter(|s| self.weights.contains_key(*s))
            .copied()
            .collect();
        let signed_weight = counted
            .iter()
            .fold(0u64, |acc, s| acc.saturating_add(self.weight_of(s)));

        QuorumOutcome {
            signed_weight,
            threshold: self.threshold,
            signers: counted.into_iter().collect(),
        }
    }
}

/// Result of a quorum check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuorumOutcome {
    /// Weight of distinct recognised signers
    pub signed_weight: u64,
    /// Required weight
    pub threshold: u64,
    /// Recognised signers, sorted
    pub signers: Vec<Address>,
}

impl QuorumOutcome {
    /// Whether the threshold was met.
    pub fn is_reached(&self) -> bool {
        self.signed_weight >= self.threshold
    }
}
