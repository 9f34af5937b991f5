use alloy_primitives::{Address, B256, U256};

/// Mutation access to the world state, consumed by block finalization.
///
/// Never invoked concurrently with itself.
pub trait StateWriter {
    /// Credits `amount` wei to the given address.
    fn add_balance(&mut self, address: Address, amount: U256);

    /// Computes the state root over the pending changes, applying EIP-158
    /// empty-account clearing when requested.
    fn intermediate_root(&mut self, eip158: bool) -> B256;
}
