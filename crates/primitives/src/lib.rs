#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! Commonly used types in aqua.
//!
//! This crate contains the block primitives, the chain configuration and the
//! protocol constants shared by the consensus engine and its collaborators.

mod block;
mod chain_spec;
pub mod constants;
mod header;

/// Helper functions for calculating commitment hashes.
pub mod proofs;

pub use block::{Block, Receipt, Transaction};
pub use chain_spec::{ChainConfig, MAINNET};
pub use header::{Header, HeaderVersion};

pub use alloy_primitives::{keccak256, Address, Bloom, Bytes, B256, B64, U256};

/// A block height.
pub type BlockNumber = u64;
