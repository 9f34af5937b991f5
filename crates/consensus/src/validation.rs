//! Header and uncle validation rules.

use crate::{difficulty::calc_difficulty, engine::Aquahash};
use aqua_interfaces::{ChainReader, ConsensusError};
use aqua_primitives::{
    constants::{
        ALLOWED_FUTURE_BLOCK_TIME, GAS_LIMIT_BOUND_DIVISOR, GAS_LIMIT_CAP, MAXIMUM_EXTRA_DATA_SIZE,
        MAX_UINT_256, MAX_UNCLES, MAX_UNCLES_HF5, MIN_GAS_LIMIT,
    },
    Block, Header, B256, U256,
};
use alloy_primitives::b256;
use std::{
    collections::{HashMap, HashSet},
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::{debug, warn};

/// Uncles that ended up on the main chain twice before the duplicate rule
/// hardened. Consensus-critical: reproduced byte for byte.
pub const DUPLICATE_UNCLE_EXEMPTIONS: [B256; 4] = [
    b256!("361262d059cbf137c9881a6fb3d671818bb45e71877e58be2a60cbd2bc2fedf7"),
    b256!("dc192e7d1bfc5aab2eab88bd1bfa39d7c5c95bc07a926d6f2a050fb05d6932d6"),
    b256!("94177d394e87a8b1e4cd58c69cfee69a67432f526092367464cf45bc1050d82a"),
    b256!("bac2283407b519ffbb8c47772d1b7cf740646dddf69744ff44219cb868b00548"),
];

/// A main-chain inclusion of an uncle that is its own ancestor.
/// Consensus-critical: reproduced byte for byte.
pub const ANCESTOR_UNCLE_EXEMPTIONS: [B256; 1] =
    [b256!("13cb01d5d3566d076b5e128e5733f17968f95329fb1777ff38db53abdcca3e4c")];

/// Uncle parent hashes outside the ancestor window that the main chain
/// accepted anyway. Matching one accepts the whole uncle set of the block.
/// Consensus-critical: reproduced byte for byte.
pub const DANGLING_UNCLE_EXEMPTIONS: [B256; 2] = [
    b256!("6b818656fb5059ab4dd070e2c2822a7774065090e74ff31515764212c88e2923"),
    b256!("0afd1b00b8e1a49652beeb860e3b58dacc865dd3e3d9d303374ed3ffdfef8eea"),
];

/// Checks whether a header conforms to the consensus rules, given its trusted
/// parent.
///
/// Uncles skip the wall-clock bound but must fit the 256-bit encoding.
pub(crate) fn validate_header(
    engine: &Aquahash,
    chain: &dyn ChainReader,
    header: &Header,
    parent: &Header,
    uncle: bool,
    seal: bool,
) -> Result<(), ConsensusError> {
    if header.extra_data.len() > MAXIMUM_EXTRA_DATA_SIZE {
        return Err(ConsensusError::ExtraDataTooLong { len: header.extra_data.len() })
    }

    // Verify the header's timestamp
    if uncle {
        if header.timestamp > MAX_UINT_256 {
            return Err(ConsensusError::LargeBlockTime)
        }
    } else {
        let present = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        let allowed = present + ALLOWED_FUTURE_BLOCK_TIME.as_secs();
        if header.timestamp > U256::from(allowed) {
            return Err(ConsensusError::FutureBlock { timestamp: header.timestamp, allowed })
        }
    }
    if header.timestamp <= parent.timestamp {
        return Err(ConsensusError::ZeroBlockTime {
            parent_timestamp: parent.timestamp,
            timestamp: header.timestamp,
        })
    }

    // Verify the difficulty against the retarget curve of the era
    let expected =
        calc_difficulty(chain.config(), header.timestamp.wrapping_to::<u64>(), parent);
    if expected != header.difficulty {
        return Err(ConsensusError::InvalidDifficulty { got: header.difficulty, expected })
    }

    // Verify the gas limit cap, the gas spend and the per-block bound
    if header.gas_limit > GAS_LIMIT_CAP {
        return Err(ConsensusError::InvalidGasLimit {
            parent_gas_limit: parent.gas_limit,
            child_gas_limit: header.gas_limit,
        })
    }
    if header.gas_used > header.gas_limit {
        return Err(ConsensusError::InvalidGasUsed {
            gas_used: header.gas_used,
            gas_limit: header.gas_limit,
        })
    }
    let limit = parent.gas_limit / GAS_LIMIT_BOUND_DIVISOR;
    if parent.gas_limit.abs_diff(header.gas_limit) >= limit || header.gas_limit < MIN_GAS_LIMIT {
        return Err(ConsensusError::InvalidGasLimit {
            parent_gas_limit: parent.gas_limit,
            child_gas_limit: header.gas_limit,
        })
    }

    if header.number.wrapping_sub(parent.number) != 1 {
        return Err(ConsensusError::InvalidNumber {
            parent_number: parent.number,
            number: header.number,
        })
    }

    if seal {
        crate::seal::verify_seal(engine, chain, header)?;
    }
    Ok(())
}

/// Checks that a block's uncles are recent, unseen and properly parented
/// inside the 7-generation ancestor window.
pub(crate) fn validate_ommers(
    engine: &Aquahash,
    chain: &dyn ChainReader,
    block: &Block,
) -> Result<(), ConsensusError> {
    let count = block.ommers().len();
    if count > MAX_UNCLES {
        return Err(ConsensusError::TooManyUncles { count, max: MAX_UNCLES })
    }
    if count > MAX_UNCLES_HF5 && chain.config().is_hf(5, block.number()) {
        return Err(ConsensusError::TooManyUncles { count, max: MAX_UNCLES_HF5 })
    }

    // Gather the set of past uncles and ancestors
    let mut ancestors: HashMap<B256, Header> = HashMap::new();
    let mut seen: HashSet<B256> = HashSet::new();

    let mut number = block.number().wrapping_sub(1);
    let mut parent_hash = block.parent_hash();
    for _ in 0..7 {
        let Some(ancestor) = chain.block(parent_hash, number) else { break };
        for ommer in ancestor.ommers() {
            let mut ommer = ommer.clone();
            seen.insert(ommer.set_version(chain.config().block_version(ommer.number)));
        }
        parent_hash = ancestor.parent_hash();
        ancestors.insert(ancestor.hash(), ancestor.header);
        number = number.wrapping_sub(1);
    }
    // the block itself blocks self-uncles
    let mut own = block.header.clone();
    let own_hash = own.set_version(chain.config().block_version(block.number()));
    ancestors.insert(own_hash, own);
    seen.insert(own_hash);

    // Verify each of the uncles that it's recent, but not an ancestor
    for ommer in block.ommers() {
        let hash = ommer.hash();

        // every uncle is rewarded only once, apart from the historical set
        if DUPLICATE_UNCLE_EXEMPTIONS.contains(&hash) {
            debug!(target: "consensus", %hash, "exempt duplicate uncle");
        } else if seen.contains(&hash) {
            return Err(ConsensusError::DuplicateUncle { hash })
        }
        seen.insert(hash);

        if ancestors.contains_key(&hash) {
            if ANCESTOR_UNCLE_EXEMPTIONS.contains(&hash) {
                debug!(target: "consensus", %hash, "exempt ancestor uncle");
            } else {
                warn!(target: "consensus", %hash, number = block.number(), "uncle is ancestor");
                return Err(ConsensusError::UncleIsAncestor { hash })
            }
        }

        if !ancestors.contains_key(&ommer.parent_hash) || ommer.parent_hash == block.parent_hash()
        {
            if DANGLING_UNCLE_EXEMPTIONS.contains(&ommer.parent_hash) {
                debug!(target: "consensus", parent = %ommer.parent_hash, "exempt dangling uncle");
                return Ok(())
            }
            return Err(ConsensusError::DanglingUncle { hash: ommer.parent_hash })
        }

        validate_header(engine, chain, ommer, &ancestors[&ommer.parent_hash], true, true)?;
    }
    Ok(())
}
