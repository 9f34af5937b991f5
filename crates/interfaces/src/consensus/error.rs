use aqua_primitives::{BlockNumber, B256, U256};

/// Errors marking a block invalid under the consensus rules.
///
/// Each failed rule maps to its own variant so callers can match on the
/// violated rule. The engine returns these at the call site; none are logged
/// or swallowed internally.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    /// The parent of the verified header is not known.
    #[error("block parent {hash} is not known")]
    UnknownAncestor {
        /// Hash of the missing parent.
        hash: B256,
    },
    /// The header's timestamp is too far ahead of the wall clock.
    #[error("block timestamp {timestamp} is too far in the future, allowed {allowed}")]
    FutureBlock {
        /// Timestamp carried by the header.
        timestamp: U256,
        /// Latest timestamp currently acceptable.
        allowed: u64,
    },
    /// An uncle's timestamp does not fit 256 bits.
    #[error("timestamp too big")]
    LargeBlockTime,
    /// The header's timestamp is not strictly later than its parent's.
    #[error("block timestamp {timestamp} is not later than parent timestamp {parent_timestamp}")]
    ZeroBlockTime {
        /// Timestamp of the parent header.
        parent_timestamp: U256,
        /// Timestamp carried by the header.
        timestamp: U256,
    },
    /// The header's height is not one above its parent's.
    #[error("block number {number} is not parent number {parent_number} + 1")]
    InvalidNumber {
        /// Height of the parent header.
        parent_number: BlockNumber,
        /// Height carried by the header.
        number: BlockNumber,
    },
    /// The header's difficulty is zero or differs from the retarget curve.
    #[error("invalid difficulty: got {got}, expected {expected}")]
    InvalidDifficulty {
        /// Difficulty carried by the header.
        got: U256,
        /// Difficulty required at this height and timestamp.
        expected: U256,
    },
    /// The gas limit violates the cap, the per-block bound or the minimum.
    #[error("invalid gas limit {child_gas_limit}, parent gas limit {parent_gas_limit}")]
    InvalidGasLimit {
        /// Gas limit of the parent header.
        parent_gas_limit: u64,
        /// Gas limit carried by the header.
        child_gas_limit: u64,
    },
    /// The header spends more gas than its gas limit.
    #[error("gas used {gas_used} exceeds gas limit {gas_limit}")]
    InvalidGasUsed {
        /// Gas spent by the block.
        gas_used: u64,
        /// Gas limit carried by the header.
        gas_limit: u64,
    },
    /// The header's extra data exceeds the protocol maximum.
    #[error("extra data too long: {len} bytes")]
    ExtraDataTooLong {
        /// Length of the header's extra data.
        len: usize,
    },
    /// The block references more uncles than allowed.
    #[error("too many uncles: {count}, maximum {max}")]
    TooManyUncles {
        /// Number of uncles referenced by the block.
        count: usize,
        /// Maximum allowed at this height.
        max: usize,
    },
    /// An uncle was already included by the block's ancestry.
    #[error("duplicate uncle {hash}")]
    DuplicateUncle {
        /// Identity hash of the offending uncle.
        hash: B256,
    },
    /// An uncle is itself an ancestor of the including block.
    #[error("uncle {hash} is an ancestor")]
    UncleIsAncestor {
        /// Identity hash of the offending uncle.
        hash: B256,
    },
    /// An uncle's parent is outside the ancestor window.
    #[error("uncle parent {hash} is not an ancestor")]
    DanglingUncle {
        /// Parent hash carried by the offending uncle.
        hash: B256,
    },
    /// The header's height is beyond the supported epoch range.
    #[error("block {number} is outside the supported epoch range")]
    NonceOutOfRange {
        /// Height carried by the header.
        number: BlockNumber,
    },
    /// The header's mix digest does not match the recomputed one.
    #[error("invalid mix digest: got {got}, expected {expected}")]
    InvalidMixDigest {
        /// Mix digest carried by the header.
        got: B256,
        /// Mix digest recomputed from the seal.
        expected: B256,
    },
    /// The proof-of-work result exceeds the difficulty target.
    #[error("invalid proof-of-work")]
    InvalidPoW,
    /// The header reached seal verification without a version stamped on it.
    /// Indicates a bug in the calling pipeline.
    #[error("header version is not set")]
    UnsetHeaderVersion,
}
