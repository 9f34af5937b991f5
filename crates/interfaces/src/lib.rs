#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! Traits and error types shared across the aqua block-processing pipeline.

/// Consensus engine trait, chain access trait and the consensus error
/// taxonomy.
pub mod consensus;

/// State mutation trait consumed by block finalization.
pub mod state;

pub use consensus::{ChainReader, Consensus, ConsensusError};
pub use state::StateWriter;
