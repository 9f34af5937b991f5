use crate::{BlockNumber, HeaderVersion};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The aqua mainnet config.
pub static MAINNET: Lazy<ChainConfig> = Lazy::new(|| ChainConfig {
    chain_id: 61717561,
    homestead_block: Some(0),
    eip158_block: Some(0),
    hf: BTreeMap::from([
        (1, 3600),
        (2, 7200),
        (3, 13026),
        (4, 21800),
        (5, 22800),
        (6, 36000),
    ]),
});

/// Read-only chain configuration: activation heights of the consensus rule
/// changes.
///
/// Hard forks are numbered; `hf[k]` is the first height at which HFk rules
/// apply. All queries are pure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Network identifier.
    pub chain_id: u64,
    /// Homestead switch height, `None` for never.
    pub homestead_block: Option<BlockNumber>,
    /// EIP-158 state-clearing switch height, `None` for never.
    pub eip158_block: Option<BlockNumber>,
    /// Numbered hard-fork activation heights.
    pub hf: BTreeMap<u32, BlockNumber>,
}

impl ChainConfig {
    /// Get the activation height of hard fork `k`.
    pub fn get_hf(&self, k: u32) -> Option<BlockNumber> {
        self.hf.get(&k).copied()
    }

    /// Returns `true` if hard fork `k` is active at the given height.
    pub fn is_hf(&self, k: u32, number: BlockNumber) -> bool {
        self.get_hf(k).map(|activation| activation <= number).unwrap_or_default()
    }

    /// Returns `true` if Homestead rules apply at the given height.
    pub fn is_homestead(&self, number: BlockNumber) -> bool {
        self.homestead_block.map(|activation| activation <= number).unwrap_or_default()
    }

    /// Returns `true` if EIP-158 state clearing applies at the given height.
    pub fn is_eip158(&self, number: BlockNumber) -> bool {
        self.eip158_block.map(|activation| activation <= number).unwrap_or_default()
    }

    /// The seal algorithm family of blocks at the given height. HF5 switches
    /// the chain from the hashimoto seal to Argon2id.
    pub fn block_version(&self, number: BlockNumber) -> HeaderVersion {
        if self.is_hf(5, number) {
            HeaderVersion::Argon2id
        } else {
            HeaderVersion::Keccak256
        }
    }
}
