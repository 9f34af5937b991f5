//! Helper functions for calculating commitment hashes.

use crate::Header;
use alloy_primitives::{keccak256, B256};
use alloy_rlp::Encodable;

/// Calculates the root hash of an ommer list, `keccak256(rlp(ommers))`.
pub fn calculate_ommers_root(ommers: &[Header]) -> B256 {
    let mut payload = Vec::new();
    for ommer in ommers {
        ommer.encode(&mut payload);
    }
    let mut buf = Vec::with_capacity(payload.len() + 9);
    alloy_rlp::Header { list: true, payload_length: payload.len() }.encode(&mut buf);
    buf.extend_from_slice(&payload);
    keccak256(&buf)
}
