use crate::{proofs, Header, HeaderVersion};
use alloy_primitives::{Address, Bytes, B256, U256};

/// A signed transaction as carried inside a block body.
///
/// The consensus engine never interprets transactions; execution happens in
/// the state-transition layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transaction {
    /// Sender nonce.
    pub nonce: u64,
    /// Wei per gas unit.
    pub gas_price: U256,
    /// Gas budget of the transaction.
    pub gas_limit: u64,
    /// Recipient, `None` for contract creation.
    pub to: Option<Address>,
    /// Wei transferred.
    pub value: U256,
    /// Call data.
    pub input: Bytes,
}

/// Execution receipt of a single transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Receipt {
    /// Whether the transaction succeeded.
    pub success: bool,
    /// Gas used by the block up to and including this transaction.
    pub cumulative_gas_used: u64,
}

/// A full block: header, transaction body, ommers and receipts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    /// Block header.
    pub header: Header,
    /// Transactions in this block.
    pub body: Vec<Transaction>,
    /// Ommer headers referenced by this block.
    pub ommers: Vec<Header>,
    /// Receipts of the block's transactions.
    pub receipts: Vec<Receipt>,
}

impl Block {
    /// Assembles a block, committing the ommer list into the header's ommer
    /// root.
    pub fn new(
        mut header: Header,
        body: Vec<Transaction>,
        ommers: Vec<Header>,
        receipts: Vec<Receipt>,
    ) -> Self {
        header.ommers_hash = proofs::calculate_ommers_root(&ommers);
        Self { header, body, ommers, receipts }
    }

    /// Block height.
    pub fn number(&self) -> u64 {
        self.header.number
    }

    /// Identity hash of the block under the header's current version.
    pub fn hash(&self) -> B256 {
        self.header.hash()
    }

    /// Hash of the parent block.
    pub fn parent_hash(&self) -> B256 {
        self.header.parent_hash
    }

    /// The block's ommer headers.
    pub fn ommers(&self) -> &[Header] {
        &self.ommers
    }

    /// Stamps `version` onto the block's header and returns the resulting
    /// identity hash.
    pub fn set_version(&mut self, version: HeaderVersion) -> B256 {
        self.header.set_version(version)
    }
}
