//! Shared fixtures for the engine tests: a map-backed chain reader, a
//! balance-collecting state writer and helpers for building linked headers.

use crate::difficulty::calc_difficulty;
use aqua_interfaces::{ChainReader, StateWriter};
use aqua_primitives::{
    constants::EMPTY_OMMER_ROOT, Address, Block, BlockNumber, ChainConfig, Header, B256, U256,
};
use std::collections::{BTreeMap, HashMap};

/// A config with Homestead rules from genesis and no hard forks scheduled.
pub(crate) fn homestead_config() -> ChainConfig {
    ChainConfig {
        chain_id: 1337,
        homestead_block: Some(0),
        eip158_block: Some(0),
        hf: BTreeMap::new(),
    }
}

/// The root of the test chains: height 0, difficulty at the floor.
pub(crate) fn genesis() -> Header {
    Header {
        number: 0,
        timestamp: U256::from(1000u64),
        difficulty: U256::from(131_072u64),
        gas_limit: 5_000_000,
        ommers_hash: EMPTY_OMMER_ROOT,
        ..Default::default()
    }
}

/// A well-formed child of `parent` mined `gap` seconds after it, linked by
/// the parent's version-adjusted hash the way the canonical chain is.
pub(crate) fn child_of(config: &ChainConfig, parent: &Header, gap: u64) -> Header {
    let timestamp = parent.timestamp + U256::from(gap);
    Header {
        number: parent.number + 1,
        parent_hash: parent.hash_with_version(config.block_version(parent.number)),
        timestamp,
        difficulty: calc_difficulty(config, timestamp.wrapping_to::<u64>(), parent),
        gas_limit: parent.gas_limit,
        ommers_hash: EMPTY_OMMER_ROOT,
        ..Default::default()
    }
}

/// `count` headers chained from genesis at the canonical 10-second gap.
pub(crate) fn linked_headers(config: &ChainConfig, count: usize) -> Vec<Header> {
    let mut headers = vec![genesis()];
    for _ in 1..count {
        let child = child_of(config, headers.last().unwrap(), 10);
        headers.push(child);
    }
    headers
}

/// Map-backed chain reader.
pub(crate) struct MockChain {
    config: ChainConfig,
    headers: HashMap<(B256, BlockNumber), Header>,
    blocks: HashMap<(B256, BlockNumber), Block>,
}

impl MockChain {
    pub(crate) fn new(config: ChainConfig) -> Self {
        Self { config, headers: HashMap::new(), blocks: HashMap::new() }
    }

    pub(crate) fn with_header(mut self, header: &Header) -> Self {
        self.insert_header(header.clone());
        self
    }

    pub(crate) fn insert_header(&mut self, header: Header) {
        self.headers.insert((header.hash(), header.number), header);
    }

    pub(crate) fn insert_block(&mut self, block: Block) {
        self.insert_header(block.header.clone());
        self.blocks.insert((block.hash(), block.number()), block);
    }

    pub(crate) fn header_by_number(&self, number: BlockNumber) -> Option<Header> {
        self.headers.values().find(|header| header.number == number).cloned()
    }
}

impl ChainReader for MockChain {
    fn config(&self) -> &ChainConfig {
        &self.config
    }

    fn header(&self, hash: B256, number: BlockNumber) -> Option<Header> {
        self.headers.get(&(hash, number)).cloned()
    }

    fn block(&self, hash: B256, number: BlockNumber) -> Option<Block> {
        self.blocks.get(&(hash, number)).cloned()
    }
}

/// State writer accumulating every credit into a balance map.
#[derive(Default)]
pub(crate) struct MockState {
    pub(crate) balances: HashMap<Address, U256>,
}

impl MockState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn balance(&self, address: Address) -> U256 {
        self.balances.get(&address).copied().unwrap_or_default()
    }
}

impl StateWriter for MockState {
    fn add_balance(&mut self, address: Address, amount: U256) {
        *self.balances.entry(address).or_default() += amount;
    }

    fn intermediate_root(&mut self, _eip158: bool) -> B256 {
        // any deterministic commitment over the balances will do for tests
        let mut balances: Vec<_> = self.balances.iter().collect();
        balances.sort();
        let mut preimage = Vec::new();
        for (address, balance) in balances {
            preimage.extend_from_slice(address.as_slice());
            preimage.extend_from_slice(&balance.to_be_bytes::<32>());
        }
        aqua_primitives::keccak256(preimage)
    }
}
