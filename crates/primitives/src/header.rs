use crate::BlockNumber;
use alloy_primitives::{keccak256, Address, Bloom, Bytes, B256, B64, U256};
use alloy_rlp::{length_of_length, BufMut, Encodable};

/// Seal algorithm family a header is hashed and verified under.
///
/// The version byte is not part of the wire encoding; it is derived from the
/// chain config by height and stamped onto headers as they enter the engine.
/// Versions `2..` participate in the identity hash, so restamping a header
/// changes the hash it is looked up and deduplicated by.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum HeaderVersion {
    /// No version assigned yet. Headers must never reach seal verification in
    /// this state.
    #[default]
    Unset = 0,
    /// Hashimoto seal over the epoch dataset.
    Keccak256 = 1,
    /// Argon2id seal over the 40-byte seal seed.
    Argon2id = 2,
}

impl HeaderVersion {
    /// Returns the version for a raw byte, if it maps to a known family.
    pub const fn from_u8(version: u8) -> Option<Self> {
        match version {
            0 => Some(Self::Unset),
            1 => Some(Self::Keccak256),
            2 => Some(Self::Argon2id),
            _ => None,
        }
    }

    /// The raw version byte.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<HeaderVersion> for u8 {
    fn from(version: HeaderVersion) -> Self {
        version.as_u8()
    }
}

/// A block header.
///
/// Timestamps are carried as 256-bit integers: canonical headers are bounded
/// by the wall clock during validation, but uncles may carry any value that
/// fits the encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    /// Hash of the parent header.
    pub parent_hash: B256,
    /// Ommer root of the block, `keccak256(rlp(ommers))`.
    pub ommers_hash: B256,
    /// Address credited with the mining rewards for this block.
    pub beneficiary: Address,
    /// State root after this block is applied.
    pub state_root: B256,
    /// Root of the block's transaction trie.
    pub transactions_root: B256,
    /// Root of the block's receipt trie.
    pub receipts_root: B256,
    /// Bloom filter over the logs of the block.
    pub logs_bloom: Bloom,
    /// Difficulty target this block was mined against.
    pub difficulty: U256,
    /// Block height.
    pub number: BlockNumber,
    /// Maximum gas the block may spend.
    pub gas_limit: u64,
    /// Gas spent by the block's transactions.
    pub gas_used: u64,
    /// Seconds since the unix epoch.
    pub timestamp: U256,
    /// Arbitrary byte array carried by the miner.
    pub extra_data: Bytes,
    /// Mix digest proving the dataset was accessed during nonce search.
    pub mix_hash: B256,
    /// Proof-of-work nonce.
    pub nonce: u64,
    /// Seal algorithm family, stamped from the chain config.
    pub version: HeaderVersion,
}

impl Header {
    /// Identity hash of the header under its current version.
    ///
    /// For versions `2..` the version byte prefixes the RLP preimage, so the
    /// same fields hash differently under different seal families.
    pub fn hash(&self) -> B256 {
        self.hash_with_version(self.version)
    }

    /// Identity hash the header would have under `version`, without mutating
    /// the header.
    pub fn hash_with_version(&self, version: HeaderVersion) -> B256 {
        let mut buf = Vec::with_capacity(self.length() + 1);
        if version.as_u8() >= 2 {
            buf.put_u8(version.as_u8());
        }
        self.encode_fields(&mut buf, true);
        keccak256(&buf)
    }

    /// Seal preimage: the hash of the header with `mix_hash` and `nonce`
    /// left out. Shared by both seal families.
    pub fn hash_no_nonce(&self) -> B256 {
        let mut buf = Vec::new();
        self.encode_fields(&mut buf, false);
        keccak256(&buf)
    }

    /// Stamps `version` onto the header and returns the resulting identity
    /// hash. Idempotent.
    pub fn set_version(&mut self, version: HeaderVersion) -> B256 {
        self.version = version;
        self.hash()
    }

    fn payload_length(&self, with_seal: bool) -> usize {
        let mut length = 0;
        length += self.parent_hash.length();
        length += self.ommers_hash.length();
        length += self.beneficiary.length();
        length += self.state_root.length();
        length += self.transactions_root.length();
        length += self.receipts_root.length();
        length += self.logs_bloom.length();
        length += self.difficulty.length();
        length += self.number.length();
        length += self.gas_limit.length();
        length += self.gas_used.length();
        length += self.timestamp.length();
        length += self.extra_data.length();
        if with_seal {
            length += self.mix_hash.length();
            length += B64::new(self.nonce.to_be_bytes()).length();
        }
        length
    }

    fn encode_fields(&self, out: &mut dyn BufMut, with_seal: bool) {
        let header =
            alloy_rlp::Header { list: true, payload_length: self.payload_length(with_seal) };
        header.encode(out);
        self.parent_hash.encode(out);
        self.ommers_hash.encode(out);
        self.beneficiary.encode(out);
        self.state_root.encode(out);
        self.transactions_root.encode(out);
        self.receipts_root.encode(out);
        self.logs_bloom.encode(out);
        self.difficulty.encode(out);
        self.number.encode(out);
        self.gas_limit.encode(out);
        self.gas_used.encode(out);
        self.timestamp.encode(out);
        self.extra_data.encode(out);
        if with_seal {
            self.mix_hash.encode(out);
            // the nonce encodes as a fixed 8-byte string
            B64::new(self.nonce.to_be_bytes()).encode(out);
        }
    }
}

impl Encodable for Header {
    fn encode(&self, out: &mut dyn BufMut) {
        self.encode_fields(out, true);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length(true);
        payload_length + length_of_length(payload_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Header {
        Header {
            number: 7,
            timestamp: U256::from(1_500_000_000u64),
            difficulty: U256::from(131_072u64),
            gas_limit: 5_000_000,
            nonce: 0xdeadbeef,
            ..Default::default()
        }
    }

    #[test]
    fn version_changes_identity_hash() {
        let mut h = header();
        let unversioned = h.hash();
        assert_eq!(h.set_version(HeaderVersion::Keccak256), unversioned);
        assert_ne!(h.set_version(HeaderVersion::Argon2id), unversioned);
    }

    #[test]
    fn set_version_is_idempotent() {
        let mut h = header();
        let first = h.set_version(HeaderVersion::Argon2id);
        let second = h.set_version(HeaderVersion::Argon2id);
        assert_eq!(first, second);
        assert_eq!(h.hash_with_version(HeaderVersion::Argon2id), first);
    }

    #[test]
    fn seal_preimage_ignores_seal_fields() {
        let mut h = header();
        let preimage = h.hash_no_nonce();
        h.nonce = 1;
        h.mix_hash = B256::repeat_byte(0xaa);
        assert_eq!(h.hash_no_nonce(), preimage);
        h.gas_used = 42;
        assert_ne!(h.hash_no_nonce(), preimage);
    }

    #[test]
    fn version_round_trip() {
        for version in [HeaderVersion::Unset, HeaderVersion::Keccak256, HeaderVersion::Argon2id] {
            assert_eq!(HeaderVersion::from_u8(version.as_u8()), Some(version));
        }
        assert_eq!(HeaderVersion::from_u8(3), None);
    }
}
