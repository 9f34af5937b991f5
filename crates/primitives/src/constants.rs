//! Protocol constants. All values here are consensus-critical: changing any
//! of them forks the chain.

use alloy_primitives::{b256, B256, U256};
use std::time::Duration;

/// Block reward in wei credited for successfully mining a block.
pub const BLOCK_REWARD: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Height at which mining rewards stop and the chain becomes fee-only.
pub const MAX_MONEY: u64 = 42_000_000;

/// Maximum number of uncles allowed in a single block.
pub const MAX_UNCLES: usize = 2;

/// Maximum number of uncles allowed in a single block once HF5 is activated.
pub const MAX_UNCLES_HF5: usize = 1;

/// Max seconds from current time allowed for blocks, before they're considered
/// future blocks.
pub const ALLOWED_FUTURE_BLOCK_TIME: Duration = Duration::from_secs(15);

/// Maximum size of the `extra_data` field of a header, in bytes.
pub const MAXIMUM_EXTRA_DATA_SIZE: usize = 32;

/// The bound divisor of the gas limit, used to bound the delta between the gas
/// limits of consecutive blocks.
pub const GAS_LIMIT_BOUND_DIVISOR: u64 = 1024;

/// Minimum gas limit a block may have.
pub const MIN_GAS_LIMIT: u64 = 5000;

/// Maximum gas limit a block may have, `2^63 - 1`.
pub const GAS_LIMIT_CAP: u64 = 0x7fff_ffff_ffff_ffff;

/// The bound divisor of the difficulty, used in every retarget curve.
pub const DIFFICULTY_BOUND_DIVISOR: U256 = U256::from_limbs([2048, 0, 0, 0]);

/// The minimum that the difficulty may ever be, up to HF5.
pub const MINIMUM_DIFFICULTY: U256 = U256::from_limbs([131_072, 0, 0, 0]);

/// Difficulty floor once HF5 activates. The seal algorithm changes at HF5, so
/// the difficulty curve restarts from this constant at the activation height.
pub const MINIMUM_DIFFICULTY_HF5: U256 = U256::from_limbs([4096, 0, 0, 0]);

/// Target block spacing in seconds, driving the retarget curves from HF2 on.
pub const DURATION_LIMIT: u64 = 240;

/// Length of the exponential difficulty period of the Homestead-era bomb.
pub const EXP_DIFF_PERIOD: u64 = 100_000;

/// Number of blocks sharing a single proof-of-work cache/dataset.
pub const EPOCH_LENGTH: u64 = 30_000;

/// Number of epochs the verification tables cover (a cap around 60M blocks).
pub const MAX_EPOCH: u64 = 2048;

/// Ommer root of an empty list, `keccak256(rlp([]))`.
pub const EMPTY_OMMER_ROOT: B256 =
    b256!("1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347");

/// The largest value representable in 256 bits, `2^256 - 1`.
pub const MAX_UINT_256: U256 = U256::MAX;
