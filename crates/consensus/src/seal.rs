//! Seal verification: dispatches on the header version between the hashimoto
//! and Argon2id families and checks the result against the difficulty target.

use crate::{
    engine::{Aquahash, PowMode},
    pow,
};
use aqua_interfaces::{ChainReader, ConsensusError};
use aqua_primitives::{
    constants::{EPOCH_LENGTH, MAX_EPOCH, MAX_UINT_256},
    Header, HeaderVersion, B256, U256,
};
use std::thread;

/// Checks whether the given header satisfies the proof-of-work difficulty
/// requirements.
pub(crate) fn verify_seal(
    engine: &Aquahash,
    chain: &dyn ChainReader,
    header: &Header,
) -> Result<(), ConsensusError> {
    // a fake pow accepts any seal, except at the pinned failure height
    let mode = engine.config.pow_mode;
    if mode == PowMode::Fake || mode == PowMode::FullFake {
        thread::sleep(engine.fake_delay);
        if engine.fake_fail == Some(header.number) {
            return Err(ConsensusError::InvalidPoW)
        }
        return Ok(())
    }
    // a shared pow delegates verification to it
    if let Some(shared) = engine.shared {
        return verify_seal(shared, chain, header)
    }

    let number = header.number;
    if number / EPOCH_LENGTH >= MAX_EPOCH {
        return Err(ConsensusError::NonceOutOfRange { number })
    }
    if header.difficulty.is_zero() {
        return Err(ConsensusError::InvalidDifficulty {
            got: U256::ZERO,
            expected: U256::from(1),
        })
    }

    // recompute the digest and pow value from the seal fields
    let cache = engine.caches.cache(number);
    let size = if mode == PowMode::Test {
        pow::TEST_DATASET_SIZE
    } else {
        engine.caches.dataset_size(number)
    };
    let (digest, result) = match header.version {
        HeaderVersion::Unset => return Err(ConsensusError::UnsetHeaderVersion),
        HeaderVersion::Keccak256 => {
            pow::hashimoto_light(size, cache.words(), header.hash_no_nonce(), header.nonce)
        }
        HeaderVersion::Argon2id => {
            let mut seed = [0u8; 40];
            seed[..32].copy_from_slice(header.hash_no_nonce().as_slice());
            seed[32..].copy_from_slice(&header.nonce.to_le_bytes());
            (B256::ZERO, pow::argon2id(&seed))
        }
    };
    // the cache must stay resident until the light verification is done
    drop(cache);

    if header.mix_hash != digest {
        return Err(ConsensusError::InvalidMixDigest { got: header.mix_hash, expected: digest })
    }
    let target = MAX_UINT_256 / header.difficulty;
    if U256::from_be_slice(result.as_slice()) > target {
        return Err(ConsensusError::InvalidPoW)
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{homestead_config, MockChain};
    use aqua_interfaces::Consensus;
    use aqua_primitives::constants::MINIMUM_DIFFICULTY;
    use rand::Rng;

    fn sealed_keccak_header(engine: &Aquahash, nonce: u64) -> Header {
        let mut header = Header {
            number: 42,
            difficulty: U256::from(1u64),
            timestamp: U256::from(1000u64),
            version: HeaderVersion::Keccak256,
            nonce,
            ..Default::default()
        };
        let cache = engine.caches.cache(header.number);
        let (digest, _) = pow::hashimoto_light(
            pow::TEST_DATASET_SIZE,
            cache.words(),
            header.hash_no_nonce(),
            nonce,
        );
        header.mix_hash = digest;
        header
    }

    #[test]
    fn keccak_seal_round_trips() {
        let engine = Aquahash::tester();
        let chain = MockChain::new(homestead_config());
        let header = sealed_keccak_header(&engine, 12345);
        assert_eq!(engine.verify_seal(&chain, &header), Ok(()));
    }

    #[test]
    fn keccak_seal_rejects_a_flipped_nonce() {
        let engine = Aquahash::tester();
        let chain = MockChain::new(homestead_config());
        let mut header = sealed_keccak_header(&engine, 12345);
        header.nonce ^= 1;
        assert!(matches!(
            engine.verify_seal(&chain, &header),
            Err(ConsensusError::InvalidMixDigest { .. }) | Err(ConsensusError::InvalidPoW),
        ));
    }

    #[test]
    fn keccak_seal_rejects_an_unmet_target() {
        let engine = Aquahash::tester();
        let chain = MockChain::new(homestead_config());
        let mut header = sealed_keccak_header(&engine, 12345);
        // correct digest, but a target of one is all but unsatisfiable
        header.difficulty = U256::MAX;
        assert_eq!(engine.verify_seal(&chain, &header), Err(ConsensusError::InvalidPoW));
    }

    #[test]
    fn argon2id_seal_accepts_any_nonce_at_difficulty_one() {
        let engine = Aquahash::tester();
        let chain = MockChain::new(homestead_config());
        let mut rng = rand::thread_rng();
        for _ in 0..3 {
            let header = Header {
                number: 42,
                difficulty: U256::from(1u64),
                timestamp: U256::from(1000u64),
                version: HeaderVersion::Argon2id,
                mix_hash: B256::ZERO,
                nonce: rng.gen(),
                ..Default::default()
            };
            assert_eq!(engine.verify_seal(&chain, &header), Ok(()));
        }
    }

    #[test]
    fn argon2id_seal_requires_a_zero_mix_digest() {
        let engine = Aquahash::tester();
        let chain = MockChain::new(homestead_config());
        let header = Header {
            number: 42,
            difficulty: U256::from(1u64),
            version: HeaderVersion::Argon2id,
            mix_hash: B256::repeat_byte(1),
            ..Default::default()
        };
        assert!(matches!(
            engine.verify_seal(&chain, &header),
            Err(ConsensusError::InvalidMixDigest { .. }),
        ));
    }

    #[test]
    fn unset_version_is_refused() {
        let engine = Aquahash::tester();
        let chain = MockChain::new(homestead_config());
        let header =
            Header { number: 42, difficulty: MINIMUM_DIFFICULTY, ..Default::default() };
        assert_eq!(
            engine.verify_seal(&chain, &header),
            Err(ConsensusError::UnsetHeaderVersion),
        );
    }

    #[test]
    fn zero_difficulty_is_refused() {
        let engine = Aquahash::tester();
        let chain = MockChain::new(homestead_config());
        let header =
            Header { number: 42, version: HeaderVersion::Keccak256, ..Default::default() };
        assert!(matches!(
            engine.verify_seal(&chain, &header),
            Err(ConsensusError::InvalidDifficulty { .. }),
        ));
    }

    #[test]
    fn epoch_beyond_the_tables_is_refused() {
        let engine = Aquahash::tester();
        let chain = MockChain::new(homestead_config());
        let number = EPOCH_LENGTH * MAX_EPOCH;
        let header = Header {
            number,
            difficulty: U256::from(1u64),
            version: HeaderVersion::Keccak256,
            ..Default::default()
        };
        assert_eq!(
            engine.verify_seal(&chain, &header),
            Err(ConsensusError::NonceOutOfRange { number }),
        );
    }

    #[test]
    fn fake_engine_fails_only_at_the_pinned_height() {
        let engine = Aquahash::fake_failer(5);
        let chain = MockChain::new(homestead_config());
        let mut header = Header { number: 5, ..Default::default() };
        assert_eq!(engine.verify_seal(&chain, &header), Err(ConsensusError::InvalidPoW));
        header.number = 6;
        assert_eq!(engine.verify_seal(&chain, &header), Ok(()));
    }

    #[test]
    fn shared_engine_delegates_to_the_process_wide_instance() {
        let engine = Aquahash::shared();
        let chain = MockChain::new(homestead_config());
        // the shared instance runs in test mode, so a sealed header passes
        let header = sealed_keccak_header(&Aquahash::tester(), 7);
        assert_eq!(engine.verify_seal(&chain, &header), Ok(()));
    }
}
