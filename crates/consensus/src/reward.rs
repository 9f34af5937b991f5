//! Block and uncle mining reward accumulation.

use aqua_interfaces::StateWriter;
use aqua_primitives::{
    constants::{BLOCK_REWARD, MAX_MONEY},
    Header, U256,
};

/// Credits the coinbase of the given block with the mining reward. The total
/// reward consists of the static block reward and an extra share for each
/// included uncle. The coinbase of each uncle block is also rewarded, scaled
/// by how far below the block the uncle sits.
pub(crate) fn accumulate_rewards(
    state: &mut dyn StateWriter,
    header: &Header,
    ommers: &[Header],
) {
    // fees only from this height on
    if header.number >= MAX_MONEY {
        return
    }

    let mut reward = BLOCK_REWARD;
    for ommer in ommers {
        let depth_share = U256::from((ommer.number + 8).saturating_sub(header.number));
        state.add_balance(ommer.beneficiary, BLOCK_REWARD * depth_share / U256::from(8));
        reward += BLOCK_REWARD / U256::from(32);
    }
    state.add_balance(header.beneficiary, reward);
}
