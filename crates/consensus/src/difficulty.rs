//! The difficulty adjustment algorithm and its per-era curves.
//!
//! Every curve is a pure function of the candidate timestamp and the parent
//! header. The dispatch order in [`calc_difficulty`] is consensus-critical:
//! the HF5 activation height itself is a reset point, distinct from the HF5
//! regime that follows it.

use aqua_primitives::{
    constants::{
        DIFFICULTY_BOUND_DIVISOR, DURATION_LIMIT, EMPTY_OMMER_ROOT, EXP_DIFF_PERIOD,
        MINIMUM_DIFFICULTY, MINIMUM_DIFFICULTY_HF5,
    },
    ChainConfig, Header, U256,
};

/// Returns the difficulty a new block must have when created at `timestamp`
/// above the given parent.
pub fn calc_difficulty(config: &ChainConfig, timestamp: u64, parent: &Header) -> U256 {
    let next = parent.number + 1;
    if config.get_hf(5) == Some(next) {
        // the seal algorithm changes at HF5, which invalidates the prior
        // curve entirely
        return MINIMUM_DIFFICULTY_HF5
    }
    if config.is_hf(5, next) {
        calc_difficulty_hf5(timestamp, parent)
    } else if config.is_hf(3, next) {
        calc_difficulty_hf3(timestamp, parent)
    } else if config.is_hf(2, next) {
        calc_difficulty_hf2(timestamp, parent)
    } else if config.is_hf(1, next) {
        calc_difficulty_hf1(timestamp, parent)
    } else {
        calc_difficulty_homestead(timestamp, parent)
    }
}

fn parent_time(parent: &Header) -> u64 {
    parent.timestamp.wrapping_to::<u64>()
}

/// The Homestead curve: adjust by `parent_diff / 2048` scaled with how far
/// the block time strays from the 10-second window, clamped at `-99`, plus
/// the exponential ice-age component.
fn calc_difficulty_homestead(timestamp: u64, parent: &Header) -> U256 {
    let elapsed = timestamp.saturating_sub(parent_time(parent));
    let adjust = parent.difficulty / DIFFICULTY_BOUND_DIVISOR;

    // x = max(1 - elapsed/10, -99)
    let x = elapsed / 10;
    let mut diff = if x == 0 {
        parent.difficulty.saturating_add(adjust)
    } else {
        parent.difficulty.saturating_sub(adjust * U256::from((x - 1).min(99)))
    };
    if diff < MINIMUM_DIFFICULTY {
        diff = MINIMUM_DIFFICULTY;
    }

    // exponential ice-age component, doubling every 100k blocks
    let period_count = (parent.number + 1) / EXP_DIFF_PERIOD;
    if period_count > 1 {
        diff = diff.saturating_add(U256::from(1) << (period_count - 2) as usize);
    }
    diff
}

/// HF1 defused the ice age; otherwise the Homestead curve.
fn calc_difficulty_hf1(timestamp: u64, parent: &Header) -> U256 {
    let elapsed = timestamp.saturating_sub(parent_time(parent));
    let adjust = parent.difficulty / DIFFICULTY_BOUND_DIVISOR;

    let x = elapsed / 10;
    let mut diff = if x == 0 {
        parent.difficulty.saturating_add(adjust)
    } else {
        parent.difficulty.saturating_sub(adjust * U256::from((x - 1).min(99)))
    };
    if diff < MINIMUM_DIFFICULTY {
        diff = MINIMUM_DIFFICULTY;
    }
    diff
}

/// HF2 retargets toward the 240-second spacing: one step of
/// `parent_diff / 2048` up or down per block.
fn calc_difficulty_hf2(timestamp: u64, parent: &Header) -> U256 {
    let elapsed = timestamp.saturating_sub(parent_time(parent));
    let adjust = parent.difficulty / DIFFICULTY_BOUND_DIVISOR;

    let mut diff = if elapsed < DURATION_LIMIT {
        parent.difficulty.saturating_add(adjust)
    } else {
        parent.difficulty.saturating_sub(adjust)
    };
    if diff < MINIMUM_DIFFICULTY {
        diff = MINIMUM_DIFFICULTY;
    }
    diff
}

/// HF3 makes the retarget uncle-aware: a parent that carried uncles pushes
/// the target one window further out, so mined-but-orphaned work still slows
/// the curve.
fn calc_difficulty_hf3(timestamp: u64, parent: &Header) -> U256 {
    let elapsed = timestamp.saturating_sub(parent_time(parent));
    let adjust = parent.difficulty / DIFFICULTY_BOUND_DIVISOR;

    // x = max(y - elapsed/24, -99), y = 1 without uncles, 2 with
    let x = elapsed / 24;
    let y = if parent.ommers_hash == EMPTY_OMMER_ROOT { 1 } else { 2 };
    let mut diff = if x < y {
        parent.difficulty.saturating_add(adjust * U256::from(y - x))
    } else {
        parent.difficulty.saturating_sub(adjust * U256::from((x - y).min(99)))
    };
    if diff < MINIMUM_DIFFICULTY {
        diff = MINIMUM_DIFFICULTY;
    }
    diff
}

/// The HF5 regime: the HF2 retarget above the post-reset floor.
fn calc_difficulty_hf5(timestamp: u64, parent: &Header) -> U256 {
    let elapsed = timestamp.saturating_sub(parent_time(parent));
    let adjust = parent.difficulty / DIFFICULTY_BOUND_DIVISOR;

    let mut diff = if elapsed < DURATION_LIMIT {
        parent.difficulty.saturating_add(adjust)
    } else {
        parent.difficulty.saturating_sub(adjust)
    };
    if diff < MINIMUM_DIFFICULTY_HF5 {
        diff = MINIMUM_DIFFICULTY_HF5;
    }
    diff
}
