#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! The aqua proof-of-work consensus engine.
//!
//! [`Aquahash`] validates headers and uncles against the chain rules,
//! computes the multi-era difficulty, verifies seals of both hash families
//! and finalizes blocks by accumulating mining rewards.

mod batch;
mod difficulty;
mod engine;
pub mod pow;
mod reward;
mod seal;
mod validation;

#[cfg(test)]
mod test_utils;

pub use batch::AbortHandle;
pub use difficulty::calc_difficulty;
pub use engine::{Aquahash, AquahashConfig, PowMode};
pub use validation::{
    ANCESTOR_UNCLE_EXEMPTIONS, DANGLING_UNCLE_EXEMPTIONS, DUPLICATE_UNCLE_EXEMPTIONS,
};

pub use aqua_interfaces::{ChainReader, Consensus, ConsensusError, StateWriter};
