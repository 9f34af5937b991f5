use aqua_primitives::{
    Block, BlockNumber, ChainConfig, Header, Receipt, Transaction, B256, U256,
};
use alloy_primitives::Address;

mod error;
pub use error::ConsensusError;

/// Read access to the chain the engine validates against.
///
/// Implementations must be safe for concurrent reads; the batch verifier
/// queries them from multiple worker threads.
pub trait ChainReader: Send + Sync {
    /// The chain's configuration.
    fn config(&self) -> &ChainConfig;

    /// The header with the given identity hash at the given height, if known.
    fn header(&self, hash: B256, number: BlockNumber) -> Option<Header>;

    /// The block with the given identity hash at the given height, if known.
    fn block(&self, hash: B256, number: BlockNumber) -> Option<Block>;
}

/// A consensus engine.
///
/// Single-header operations are synchronous; the batch entry point lives on
/// the engine type itself since it spawns workers.
pub trait Consensus {
    /// The address credited as the verified author of the block.
    fn author(&self, header: &Header) -> Address;

    /// Checks whether a header conforms to the consensus rules, optionally
    /// verifying the seal.
    fn verify_header(
        &self,
        chain: &dyn ChainReader,
        header: &Header,
        seal: bool,
    ) -> Result<(), ConsensusError>;

    /// Checks that a block's uncles conform to the consensus rules.
    fn verify_uncles(&self, chain: &dyn ChainReader, block: &Block)
        -> Result<(), ConsensusError>;

    /// Checks that a header's seal satisfies the proof-of-work difficulty
    /// requirements.
    fn verify_seal(&self, chain: &dyn ChainReader, header: &Header)
        -> Result<(), ConsensusError>;

    /// The difficulty a new block should have when created at `timestamp`
    /// above the given parent.
    fn calc_difficulty(&self, chain: &dyn ChainReader, timestamp: u64, parent: &Header) -> U256;

    /// Initializes the difficulty field of a header in preparation for
    /// mining. The change is done in place.
    fn prepare(&self, chain: &dyn ChainReader, header: &mut Header)
        -> Result<(), ConsensusError>;

    /// Accumulates the block and uncle rewards, commits the final state root
    /// and assembles the block.
    fn finalize(
        &self,
        chain: &dyn ChainReader,
        header: Header,
        state: &mut dyn crate::StateWriter,
        body: Vec<Transaction>,
        ommers: Vec<Header>,
        receipts: Vec<Receipt>,
    ) -> Block;
}
